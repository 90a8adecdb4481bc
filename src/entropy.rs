//! Cryptographically random byte generation, injected into engines the same
//! way the teacher crate injects a `CryptoRngCore` into `try_keygen_with_rng`
//! and friends: callers that want determinism supply their own source rather
//! than the crate reaching for a global RNG.

use rand_core::RngCore;

#[cfg(feature = "default-rng")]
use rand_core::OsRng;

use crate::error::IdMaskError;

/// Produces cryptographically random byte strings on demand.
///
/// Implementations are expected to be stateless from the caller's point of
/// view: repeated calls with the same `len` carry no relationship to one
/// another (aside from the fixed/test variant below, which is explicitly
/// exempt from that expectation).
pub trait EntropySource: Send + Sync {
    /// Returns exactly `len` fresh random bytes, or
    /// [`IdMaskError::NotEnoughEntropy`] if the underlying generator is
    /// exhausted or otherwise fails.
    fn generate(&self, len: usize) -> Result<Vec<u8>, IdMaskError>;
}

/// The default entropy source, backed by the operating system's random
/// number generator.
#[cfg(feature = "default-rng")]
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemEntropySource;

#[cfg(feature = "default-rng")]
impl EntropySource for SystemEntropySource {
    fn generate(&self, len: usize) -> Result<Vec<u8>, IdMaskError> {
        let mut buf = vec![0u8; len];
        OsRng.try_fill_bytes(&mut buf).map_err(|_| IdMaskError::NotEnoughEntropy)?;
        Ok(buf)
    }
}

/// An entropy source that always returns a fixed byte string, truncated or
/// cycled to the requested length.
///
/// Exists solely so that deterministic-mode golden vectors and
/// randomized-mode golden vectors (which pin a *specific* random value) can
/// be reproduced in tests; it must never be wired into a production engine.
#[derive(Clone, Debug)]
pub struct FixedEntropySource {
    bytes: Vec<u8>,
}

impl FixedEntropySource {
    /// Creates a fixed source that repeats `bytes` (cycling if `len` in
    /// `generate` exceeds `bytes.len()`) on every call.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        let bytes = bytes.into();
        assert!(!bytes.is_empty(), "FixedEntropySource requires at least one byte");
        Self { bytes }
    }

    /// Creates a fixed source that always returns zero bytes, matching the
    /// deterministic-mode reference/entropy value used throughout the
    /// engines.
    #[must_use]
    pub fn zeros() -> Self {
        Self { bytes: vec![0u8] }
    }
}

impl EntropySource for FixedEntropySource {
    fn generate(&self, len: usize) -> Result<Vec<u8>, IdMaskError> {
        Ok(self.bytes.iter().copied().cycle().take(len).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_source_repeats_pattern_to_requested_length() {
        let src = FixedEntropySource::new(vec![0xAB, 0xCD]);
        assert_eq!(src.generate(5).unwrap(), vec![0xAB, 0xCD, 0xAB, 0xCD, 0xAB]);
    }

    #[test]
    fn fixed_source_zeros_fills_with_zero_bytes() {
        let src = FixedEntropySource::zeros();
        assert_eq!(src.generate(8).unwrap(), vec![0u8; 8]);
    }

    #[cfg(feature = "default-rng")]
    #[test]
    fn system_source_produces_requested_length() {
        let src = SystemEntropySource;
        assert_eq!(src.generate(16).unwrap().len(), 16);
    }

    #[cfg(feature = "default-rng")]
    #[test]
    fn system_source_is_not_constant() {
        let src = SystemEntropySource;
        let a = src.generate(16).unwrap();
        let b = src.generate(16).unwrap();
        assert_ne!(a, b);
    }
}
