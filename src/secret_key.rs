//! Validated, zeroizing key material: an id plus a byte string that has
//! passed the length, non-zero, and Shannon-entropy checks in `spec.md` §4.5.

use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::entropy::EntropySource;
use crate::error::IdMaskError;

/// Largest value a 4-bit key id can hold; also the largest id a
/// [`crate::key_store::KeyStore`] will accept.
pub const MAX_KEY_ID: u8 = 15;

const MIN_KEY_LEN: usize = 12;
const MAX_KEY_LEN: usize = 64;
const MIN_ENTROPY_BITS_PER_BYTE: f64 = 2.5;

/// Validated key material: an id in `0..=MAX_KEY_ID` plus a byte string that
/// has passed the length and entropy checks below. Once constructed, a
/// `SecretKey` is immutable; its bytes are zeroized on drop, mirroring the
/// `Zeroize`/`ZeroizeOnDrop` discipline the teacher crate applies to
/// `SharedSecretKey`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    #[zeroize(skip)]
    key_id: u8,
    bytes: Vec<u8>,
}

impl SecretKey {
    /// Builds a `SecretKey` from raw bytes, validating length, non-zero
    /// content, and Shannon entropy.
    ///
    /// # Errors
    /// Returns [`IdMaskError::InvalidArgument`] if `key_id > MAX_KEY_ID`, if
    /// `bytes.len()` falls outside `[12, 64]`, if `bytes` is entirely zero,
    /// or if its Shannon entropy is below 2.5 bits/byte.
    pub fn new(key_id: u8, bytes: impl Into<Vec<u8>>) -> Result<Self, IdMaskError> {
        let bytes = bytes.into();
        Self::validate(key_id, &bytes)?;
        Ok(Self { key_id, bytes })
    }

    /// Builds a `SecretKey` from a hex-encoded byte string, applying the
    /// same validation as [`SecretKey::new`].
    ///
    /// # Errors
    /// Returns [`IdMaskError::InvalidArgument`] if `hex_str` is not valid hex,
    /// or if the decoded bytes fail the `SecretKey` invariants.
    pub fn from_hex(key_id: u8, hex_str: &str) -> Result<Self, IdMaskError> {
        let bytes = decode_hex(hex_str)
            .ok_or(IdMaskError::InvalidArgument("key material is not valid hex"))?;
        Self::new(key_id, bytes)
    }

    /// Generates a fresh `SecretKey` of `(12 + 64) / 2 = 38` bytes using the
    /// supplied entropy source.
    ///
    /// # Errors
    /// Propagates [`IdMaskError::NotEnoughEntropy`] from the entropy source,
    /// or (astronomically unlikely) [`IdMaskError::InvalidArgument`] if the
    /// sampled bytes somehow fail the entropy floor.
    pub fn generate(key_id: u8, entropy: &dyn EntropySource) -> Result<Self, IdMaskError> {
        const GENERATED_LEN: usize = (MIN_KEY_LEN + MAX_KEY_LEN) / 2;
        let bytes = entropy.generate(GENERATED_LEN)?;
        Self::new(key_id, bytes)
    }

    /// This key's 4-bit id within its key store.
    #[must_use]
    pub fn key_id(&self) -> u8 {
        self.key_id
    }

    /// The validated key material. Exposed as a slice rather than an owned
    /// `Vec` so callers cannot accidentally leave a stray, non-zeroizing copy
    /// lying around.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn validate(key_id: u8, bytes: &[u8]) -> Result<(), IdMaskError> {
        if key_id > MAX_KEY_ID {
            return Err(IdMaskError::InvalidArgument("key id exceeds MAX_KEY_ID"));
        }
        if !(MIN_KEY_LEN..=MAX_KEY_LEN).contains(&bytes.len()) {
            return Err(IdMaskError::InvalidArgument("key length outside [12, 64] bytes"));
        }
        if bytes.iter().all(|&b| b == 0) {
            return Err(IdMaskError::InvalidArgument("key material is all-zero"));
        }
        if shannon_entropy(bytes) < MIN_ENTROPY_BITS_PER_BYTE {
            return Err(IdMaskError::InvalidArgument("key material has insufficient entropy"));
        }
        Ok(())
    }
}

// Comparison only ever matters for tests and diagnostics; the hot paths
// compare key *ids*, not key bytes, via the key store's map lookup. Still,
// constant-time here costs nothing and avoids a footgun if a caller ever
// does compare two keys directly.
impl PartialEq for SecretKey {
    fn eq(&self, other: &Self) -> bool {
        self.key_id == other.key_id && self.bytes.ct_eq(&other.bytes).into()
    }
}

/// Shannon entropy of a byte string's histogram, in bits/byte:
/// `H = -sum(p(b) * log2(p(b)))` over the observed byte distribution.
///
/// This catches degenerate keys (all one byte, short repeating patterns) but
/// is a sanity floor, not a strength proof — a key can clear 2.5 bits/byte
/// and still be far from uniformly random.
#[must_use]
pub(crate) fn shannon_entropy(bytes: &[u8]) -> f64 {
    if bytes.is_empty() {
        return 0.0;
    }
    let mut counts = [0u32; 256];
    for &b in bytes {
        counts[b as usize] += 1;
    }
    let len = bytes.len() as f64;
    counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = f64::from(c) / len;
            -p * p.log2()
        })
        .sum()
}

fn decode_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).ok())
        .collect()
}
