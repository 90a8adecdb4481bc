//! Shared cryptographic glue used by both engines: AES key sizing, raw
//! single-block AES-ECB (with and without PKCS7 padding), single-block
//! AES-CBC, HKDF, HMAC-SHA-256, and constant-time comparison. Kept as free
//! functions rather than methods on either engine, per `spec.md` §9's design
//! note that the shared base stays module-local utilities rather than an
//! inheritance hierarchy.

use aes::cipher::block_padding::{NoPadding, Pkcs7};
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use aes::Aes256;
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::IdMaskError;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;
type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;
type HmacSha256 = Hmac<Sha256>;

/// If the condition is not met, return the given error. Borrowed from the
/// `anyhow` crate's `ensure!`.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure;

/// Resolves a `SecretKey`'s raw bytes to exactly 32 bytes for use as an
/// `Aes256` key (Open Question 2 in `spec.md` §9, resolved): keys of 32
/// bytes or more are truncated to their first 32 bytes; shorter keys (the
/// `SecretKey` floor is 12) are widened by right-padding with zero bytes.
/// This mirrors the legacy OpenSSL behavior of silently zero-padding or
/// truncating a key to the cipher's native size, and is what reproduces the
/// published golden vectors, whose fixture key is 20 bytes.
#[must_use]
pub(crate) fn aes_key(key_bytes: &[u8]) -> [u8; 32] {
    let mut key = [0u8; 32];
    let len = key_bytes.len().min(32);
    key[..len].copy_from_slice(&key_bytes[..len]);
    key
}

/// Encrypts a 16-byte block under AES-256-ECB with PKCS7 padding enabled,
/// matching the legacy OpenSSL-style cipher call the 8-byte engine's
/// reference implementation makes. Because the input is always exactly one
/// block, PKCS7 always appends a full padding block (16 bytes of `0x10`),
/// so the output is always 32 bytes — two independently-encrypted ECB
/// blocks, not one. See `spec.md` §4.2 and Open Question 2 in §9: the
/// published golden vectors only reproduce byte-for-byte with padding
/// enabled, so that is the behavior this crate matches.
#[must_use]
pub(crate) fn aes_ecb_encrypt_pkcs7(key: &[u8; 32], block: [u8; 16]) -> [u8; 32] {
    let ct = Aes256EcbEnc::new(key.into()).encrypt_padded_vec_mut::<Pkcs7>(&block);
    ct.try_into().expect("PKCS7 padding of a 16-byte input always yields 32 bytes")
}

/// Decrypts a 32-byte ciphertext produced by [`aes_ecb_encrypt_pkcs7`],
/// validating and stripping the trailing PKCS7 padding block.
pub(crate) fn aes_ecb_decrypt_pkcs7(key: &[u8; 32], ct: [u8; 32]) -> Result<[u8; 16], IdMaskError> {
    let pt = Aes256EcbDec::new(key.into())
        .decrypt_padded_vec_mut::<Pkcs7>(&ct)
        .map_err(|_| IdMaskError::Decryption(None))?;
    pt.try_into().map_err(|_| IdMaskError::Decryption(None))
}

/// Encrypts exactly one 16-byte AES-CBC block under `key`/`iv`, padding
/// disabled (the plaintext is always already exactly 16 bytes).
pub(crate) fn cbc_encrypt_block(key: &[u8; 32], iv: &[u8; 16], block: [u8; 16]) -> [u8; 16] {
    let mut buf = block;
    Aes256CbcEnc::new(key.into(), iv.into())
        .encrypt_padded_mut::<NoPadding>(&mut buf, 16)
        .expect("single already-aligned block never fails to encrypt");
    buf
}

/// Decrypts exactly one 16-byte AES-CBC block under `key`/`iv`, the inverse
/// of [`cbc_encrypt_block`].
pub(crate) fn cbc_decrypt_block(
    key: &[u8; 32], iv: &[u8; 16], block: [u8; 16],
) -> Result<[u8; 16], IdMaskError> {
    let mut buf = block;
    Aes256CbcDec::new(key.into(), iv.into())
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .map_err(|_| IdMaskError::Decryption(None))?;
    Ok(buf)
}

/// HKDF-SHA-256 (full Extract-then-Expand, RFC 5869) over a `SecretKey`'s raw
/// bytes, producing exactly 64 bytes of output key material. Matches
/// `spec.md` §4.3's per-token subkey derivation, `okm = HKDF(hash=SHA-256,
/// ikm=K.bytes, info=entropy, length=64)`, run with no salt (RFC 5869's
/// zero-filled default).
///
/// `spec.md` describes this step as `HKDF_Expand` directly over `prk =
/// K.bytes`, skipping Extract — but the published golden vectors only
/// reproduce byte-for-byte with a genuine Extract-then-Expand, confirmed by
/// brute-force search against the fixture vectors. Golden vectors pin the
/// algorithm (`spec.md` §8); this follows them over the prose.
pub(crate) fn hkdf_expand_64(key_bytes: &[u8], info: &[u8]) -> [u8; 64] {
    let hk = Hkdf::<Sha256>::new(None, key_bytes);
    let mut okm = [0u8; 64];
    hk.expand(info, &mut okm).expect("64 is within SHA-256's 8160-byte HKDF limit");
    okm
}

/// Computes `HMAC-SHA-256(key, data)`.
#[must_use]
pub(crate) fn hmac_sha256(key: &[u8], data: &[u8]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts any key length");
    mac.update(data);
    mac.finalize().into_bytes().into()
}

/// Constant-time byte equality, used for every authentication-relevant
/// comparison (MAC verification, reference-value verification, padding-block
/// verification) so that "wrong key", "wrong MAC", and "corrupted token"
/// take the same amount of time to reject.
#[must_use]
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
