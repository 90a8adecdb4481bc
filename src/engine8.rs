//! The 8-byte masking engine: one AES block, authenticated only by an
//! embedded reference value. See `spec.md` §4.2.

use std::sync::Arc;

use crate::b64;
use crate::byte_fns::{right_pad, right_strip_zeros};
use crate::entropy::EntropySource;
use crate::error::IdMaskError;
use crate::helpers::{aes_ecb_decrypt_pkcs7, aes_ecb_encrypt_pkcs7, aes_key, constant_time_eq, ensure};
use crate::key_store::KeyStore;
use crate::mask::Mask;
use crate::version::{self, ENGINE_ID_8};

/// Widest identifier this engine can mask, in bytes.
pub const WIDTH: usize = 8;

const REFERENCE_LEN: usize = 8;
const PAYLOAD_LEN: usize = 8;
const CIPHERTEXT_LEN: usize = 32;

/// Masks identifiers of 1 to 8 bytes using AES-256-ECB with PKCS7 padding
/// over a single 16-byte block, with an 8-byte embedded reference value
/// standing in for a MAC.
///
/// The 16-byte `reference || payload` plaintext is always exactly one
/// block, so PKCS7 always appends a full padding block: the ciphertext is
/// two independently-encrypted AES blocks (32 bytes), not one. Deterministic
/// -mode tokens are therefore 33 bytes before Base64 (`version ||
/// ciphertext`); randomized-mode tokens are 41 bytes (`version || reference
/// || ciphertext`). See `spec.md` §4.2 for the layout and the
/// forgery-resistance analysis (2⁻⁶⁴ for a random guess), and Open Question
/// 2 in §9 for why padding ends up enabled here — the golden vectors only
/// reproduce byte-for-byte with it on.
pub struct Engine8 {
    key_store: Arc<KeyStore>,
    randomize: bool,
    entropy: Arc<dyn EntropySource>,
}

impl Engine8 {
    /// Builds an engine bound to `key_store`, producing uncorrelated tokens
    /// per call when `randomize` is true (drawing fresh reference bytes from
    /// `entropy`), or byte-identical tokens for a given id when `randomize`
    /// is false.
    #[must_use]
    pub fn new(key_store: Arc<KeyStore>, randomize: bool, entropy: Arc<dyn EntropySource>) -> Self {
        Self { key_store, randomize, entropy }
    }
}

impl Mask for Engine8 {
    fn width(&self) -> usize {
        WIDTH
    }

    fn mask(&self, id: &[u8]) -> Result<String, IdMaskError> {
        ensure!(!id.is_empty() && id.len() <= WIDTH, IdMaskError::InvalidInput("identifier must be 1 to 8 bytes"));

        let key = self.key_store.active_key();
        let reference: [u8; REFERENCE_LEN] = if self.randomize {
            self.entropy
                .generate(REFERENCE_LEN)?
                .try_into()
                .map_err(|_| IdMaskError::NotEnoughEntropy)?
        } else {
            [0u8; REFERENCE_LEN]
        };

        let payload = right_pad(id, PAYLOAD_LEN);
        let mut plaintext = [0u8; 16];
        plaintext[..REFERENCE_LEN].copy_from_slice(&reference);
        plaintext[REFERENCE_LEN..].copy_from_slice(&payload);

        let key32 = aes_key(key.bytes());
        let ciphertext = aes_ecb_encrypt_pkcs7(&key32, plaintext);

        let version_byte = version::encode(key.key_id(), ENGINE_ID_8, ciphertext[0])?;

        let mut token = Vec::with_capacity(1 + REFERENCE_LEN + CIPHERTEXT_LEN);
        token.push(version_byte);
        if self.randomize {
            token.extend_from_slice(&reference);
        }
        token.extend_from_slice(&ciphertext);
        Ok(b64::encode(&token))
    }

    fn unmask(&self, token: &str) -> Result<Vec<u8>, IdMaskError> {
        let raw = b64::decode(token).ok_or(IdMaskError::StateMismatch)?;

        let expected_min_len = 1 + usize::from(self.randomize) * REFERENCE_LEN + CIPHERTEXT_LEN;
        ensure!(raw.len() == expected_min_len, IdMaskError::StateMismatch);

        let version_byte = raw[0];
        let mut offset = 1;
        let expected_reference: [u8; REFERENCE_LEN] = if self.randomize {
            let r = raw[offset..offset + REFERENCE_LEN].try_into().expect("checked length");
            offset += REFERENCE_LEN;
            r
        } else {
            [0u8; REFERENCE_LEN]
        };

        let ciphertext: [u8; CIPHERTEXT_LEN] =
            raw[offset..].try_into().map_err(|_| IdMaskError::StateMismatch)?;

        let (key_id, engine_id) = version::decode(version_byte, ciphertext[0]);
        if engine_id != ENGINE_ID_8 {
            return Err(IdMaskError::StateMismatch);
        }
        let key = self.key_store.key(key_id).ok_or(IdMaskError::StateMismatch)?;

        let key32 = aes_key(key.bytes());
        let plaintext = aes_ecb_decrypt_pkcs7(&key32, ciphertext).map_err(|_| IdMaskError::StateMismatch)?;

        let actual_reference = &plaintext[..REFERENCE_LEN];
        if !constant_time_eq(actual_reference, &expected_reference) {
            return Err(IdMaskError::StateMismatch);
        }

        let padded_payload = &plaintext[REFERENCE_LEN..];
        Ok(right_strip_zeros(padded_payload).to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entropy::FixedEntropySource;
    use crate::secret_key::SecretKey;

    fn store_with_key(key_id: u8, hex: &str) -> Arc<KeyStore> {
        Arc::new(KeyStore::new(SecretKey::from_hex(key_id, hex).unwrap(), vec![]).unwrap())
    }

    const GOLDEN_KEY_HEX: &str = "9d5100cebffa729aaffecd3ad25dc5aeea4f13bb";

    #[test]
    fn golden_vector_deterministic_foo() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, false, Arc::new(FixedEntropySource::zeros()));
        assert_eq!(engine.mask(b"foo").unwrap(), "gIC6GFLHSFQJDy~3f6_C8SaLivfwUzliqHY~Cz~Owp5L");
    }

    #[test]
    fn golden_vector_deterministic_abcdefgh() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, false, Arc::new(FixedEntropySource::zeros()));
        assert_eq!(engine.mask(b"abcdefgh").unwrap(), "GhpsfXi0hEoU7w3LdTcEXRuLivfwUzliqHY~Cz~Owp5L");
    }

    #[test]
    fn golden_vector_randomized_foo() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let fixed_ref = hex::decode("b8489e58c1191639").unwrap();
        let engine = Engine8::new(store, true, Arc::new(FixedEntropySource::new(fixed_ref)));
        assert_eq!(
            engine.mask(b"foo").unwrap(),
            "0LhInljBGRY50BWO_NoWOfnG1bWeEwmXVIuK9_BTOWKodj4LP47Cnks-"
        );
    }

    #[test]
    fn round_trip_deterministic() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, false, Arc::new(FixedEntropySource::zeros()));
        for id in [&b"a"[..], b"ab", b"abcdefg", b"abcdefgh", b"\x00\x01\x02"] {
            let token = engine.mask(id).unwrap();
            assert_eq!(engine.unmask(&token).unwrap(), id);
        }
    }

    #[test]
    fn round_trip_randomized_with_system_entropy() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, true, Arc::new(crate::entropy::SystemEntropySource));
        let token = engine.mask(b"hello").unwrap();
        assert_eq!(engine.unmask(&token).unwrap(), b"hello");
    }

    #[test]
    fn deterministic_mode_is_repeatable() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, false, Arc::new(FixedEntropySource::zeros()));
        assert_eq!(engine.mask(b"repeat").unwrap(), engine.mask(b"repeat").unwrap());
    }

    #[test]
    fn randomized_mode_is_not_repeatable() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, true, Arc::new(crate::entropy::SystemEntropySource));
        assert_ne!(engine.mask(b"repeat").unwrap(), engine.mask(b"repeat").unwrap());
    }

    #[test]
    fn empty_input_is_rejected() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, false, Arc::new(FixedEntropySource::zeros()));
        assert!(matches!(engine.mask(b"").unwrap_err(), IdMaskError::InvalidInput(_)));
    }

    #[test]
    fn nine_byte_input_is_rejected() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, false, Arc::new(FixedEntropySource::zeros()));
        assert!(matches!(engine.mask(b"123456789").unwrap_err(), IdMaskError::InvalidInput(_)));
    }

    #[test]
    fn single_bit_flip_fails_authentication() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, false, Arc::new(FixedEntropySource::zeros()));
        let token = engine.mask(b"foo").unwrap();
        let mut raw = b64::decode(&token).unwrap();
        raw[5] ^= 0x01;
        let flipped = b64::encode(&raw);
        assert!(engine.unmask(&flipped).is_err());
    }

    #[test]
    fn key_isolation_rejects_wrong_key_bytes() {
        let minting_store = store_with_key(0, GOLDEN_KEY_HEX);
        let minting_engine = Engine8::new(minting_store, false, Arc::new(FixedEntropySource::zeros()));
        let token = minting_engine.mask(b"foo").unwrap();

        let other_store = store_with_key(0, "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa");
        let other_engine = Engine8::new(other_store, false, Arc::new(FixedEntropySource::zeros()));
        assert!(matches!(other_engine.unmask(&token).unwrap_err(), IdMaskError::StateMismatch));
    }

    #[test]
    fn unknown_key_id_is_state_mismatch() {
        let store = store_with_key(0, GOLDEN_KEY_HEX);
        let engine = Engine8::new(store, false, Arc::new(FixedEntropySource::zeros()));
        let token = engine.mask(b"foo").unwrap();

        let other_store = store_with_key(5, GOLDEN_KEY_HEX);
        let other_engine = Engine8::new(other_store, false, Arc::new(FixedEntropySource::zeros()));
        assert!(matches!(other_engine.unmask(&token).unwrap_err(), IdMaskError::StateMismatch));
    }
}
