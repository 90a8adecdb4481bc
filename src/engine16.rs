//! The 16-byte masking engine: AES-CBC over one block under a per-token
//! derived key/IV, authenticated by a truncated HMAC-SHA-256 tag. See
//! `spec.md` §4.3.

use std::sync::Arc;

use crate::b64;
use crate::byte_fns::{right_pad, right_strip_zeros, xor};
use crate::entropy::EntropySource;
use crate::error::IdMaskError;
use crate::helpers::{
    aes_key, cbc_decrypt_block, cbc_encrypt_block, constant_time_eq, ensure, hkdf_expand_64,
    hmac_sha256,
};
use crate::key_store::KeyStore;
use crate::mask::Mask;
use crate::version::{self, ENGINE_ID_16};

/// Widest identifier this engine can mask, in bytes.
pub const WIDTH: usize = 16;

const ENTROPY_LEN: usize = 16;
const PAYLOAD_LEN: usize = 16;
const MAC_LEN_STANDARD: usize = 8;
const MAC_LEN_HIGH_SECURITY: usize = 16;

/// Masks identifiers of 1 to 16 bytes (e.g. a UUID) using AES-256-CBC over a
/// single block, with the IV and MAC key both derived per-token from the
/// active `SecretKey` via HKDF, the payload masked by XOR with the token's
/// entropy before encryption, and the whole thing authenticated by an
/// HMAC-SHA-256 tag truncated to 8 bytes (16 in `high_security_mode`).
///
/// Deterministic-mode tokens are `1 + 16 + mac_len` bytes before Base64
/// (`version || ciphertext || mac`); randomized-mode tokens additionally
/// carry the 16-byte entropy used to derive that token's subkeys (`version ||
/// entropy || ciphertext || mac`). See `spec.md` §4.3 for the full
/// derivation and forgery-resistance analysis.
pub struct Engine16 {
    key_store: Arc<KeyStore>,
    randomize: bool,
    entropy: Arc<dyn EntropySource>,
    high_security_mode: bool,
}

impl Engine16 {
    /// Builds an engine bound to `key_store`. `randomize` and `entropy`
    /// behave as in [`Engine8::new`](crate::engine8::Engine8::new).
    /// `high_security_mode` widens the authentication tag from 8 to 16
    /// bytes, at the cost of a longer token.
    #[must_use]
    pub fn new(
        key_store: Arc<KeyStore>, randomize: bool, entropy: Arc<dyn EntropySource>,
        high_security_mode: bool,
    ) -> Self {
        Self { key_store, randomize, entropy, high_security_mode }
    }

    fn mac_len(&self) -> usize {
        if self.high_security_mode {
            MAC_LEN_HIGH_SECURITY
        } else {
            MAC_LEN_STANDARD
        }
    }

    /// Derives the per-token `(aes_key, iv, mac_key)` triple: `okm =
    /// HKDF(hash=SHA-256, ikm=key.bytes, info=entropy, length=64)`, split as
    /// `iv = okm[16..32]`, `mac_key = okm[32..64]`. `okm[0..16]` is reserved
    /// and unused (Open Question 1 in `spec.md` §9, resolved); `aes_key` is
    /// the master key bytes directly, not a derived slice.
    fn derive_subkeys(key_bytes: &[u8], entropy: &[u8; ENTROPY_LEN]) -> ([u8; 32], [u8; 16], [u8; 32]) {
        let okm = hkdf_expand_64(key_bytes, entropy);
        let aes_key = aes_key(key_bytes);
        let iv: [u8; 16] = okm[16..32].try_into().expect("fixed slice");
        let mac_key: [u8; 32] = okm[32..64].try_into().expect("fixed slice");
        (aes_key, iv, mac_key)
    }
}

impl Mask for Engine16 {
    fn width(&self) -> usize {
        WIDTH
    }

    fn mask(&self, id: &[u8]) -> Result<String, IdMaskError> {
        ensure!(
            !id.is_empty() && id.len() <= WIDTH,
            IdMaskError::InvalidInput("identifier must be 1 to 16 bytes")
        );

        let key = self.key_store.active_key();
        let entropy: [u8; ENTROPY_LEN] = if self.randomize {
            self.entropy
                .generate(ENTROPY_LEN)?
                .try_into()
                .map_err(|_| IdMaskError::NotEnoughEntropy)?
        } else {
            [0u8; ENTROPY_LEN]
        };

        let (aes_key, iv, mac_key) = Self::derive_subkeys(key.bytes(), &entropy);

        let payload = right_pad(id, PAYLOAD_LEN);
        let masked_plain = xor(&payload, &entropy);
        let plaintext: [u8; 16] = masked_plain.try_into().expect("checked length");
        let ciphertext = cbc_encrypt_block(&aes_key, &iv, plaintext);

        let version_byte = version::encode(key.key_id(), ENGINE_ID_16, ciphertext[0])?;

        let mut mac_input = Vec::with_capacity(iv.len() + ciphertext.len() + 1);
        mac_input.extend_from_slice(&iv);
        mac_input.extend_from_slice(&ciphertext);
        mac_input.push(version_byte);
        let tag = hmac_sha256(&mac_key, &mac_input);

        let mut token = Vec::with_capacity(1 + ENTROPY_LEN + ciphertext.len() + self.mac_len());
        token.push(version_byte);
        if self.randomize {
            token.extend_from_slice(&entropy);
        }
        token.extend_from_slice(&ciphertext);
        token.extend_from_slice(&tag[..self.mac_len()]);
        Ok(b64::encode(&token))
    }

    fn unmask(&self, token: &str) -> Result<Vec<u8>, IdMaskError> {
        let raw = b64::decode(token).ok_or(IdMaskError::StateMismatch)?;

        let mac_len = self.mac_len();
        let expected_len = 1 + usize::from(self.randomize) * ENTROPY_LEN + 16 + mac_len;
        ensure!(raw.len() == expected_len, IdMaskError::StateMismatch);

        let received_tag = &raw[raw.len() - mac_len..];

        let version_byte = raw[0];
        let mut offset = 1;
        let entropy: [u8; ENTROPY_LEN] = if self.randomize {
            let e = raw[offset..offset + ENTROPY_LEN].try_into().expect("checked length");
            offset += ENTROPY_LEN;
            e
        } else {
            [0u8; ENTROPY_LEN]
        };
        let ciphertext: [u8; 16] = raw[offset..offset + 16].try_into().expect("checked length");

        let (key_id, engine_id) = version::decode(version_byte, ciphertext[0]);
        if engine_id != ENGINE_ID_16 {
            return Err(IdMaskError::StateMismatch);
        }
        let key = self.key_store.key(key_id).ok_or(IdMaskError::StateMismatch)?;

        let (aes_key, iv, mac_key) = Self::derive_subkeys(key.bytes(), &entropy);

        let mut mac_input = Vec::with_capacity(iv.len() + ciphertext.len() + 1);
        mac_input.extend_from_slice(&iv);
        mac_input.extend_from_slice(&ciphertext);
        mac_input.push(version_byte);
        let expected_tag = hmac_sha256(&mac_key, &mac_input);
        if !constant_time_eq(&expected_tag[..mac_len], received_tag) {
            return Err(IdMaskError::StateMismatch);
        }

        let plaintext = cbc_decrypt_block(&aes_key, &iv, ciphertext).map_err(|_| IdMaskError::StateMismatch)?;
        let unmasked = xor(&plaintext, &entropy);
        Ok(right_strip_zeros(&unmasked).to_vec())
    }
}
