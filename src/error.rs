//! The single error type every fallible operation in this crate returns.

use thiserror::Error;

/// The single error type surfaced by every fallible operation in this crate.
///
/// Variants map directly onto the failure categories a masking engine can
/// produce: malformed caller input, misconfigured ids, RNG exhaustion, and
/// the authentication failures that `unmask` folds together under
/// [`IdMaskError::StateMismatch`] so that "wrong key", "wrong MAC", and
/// "corrupted token" are indistinguishable to a caller.
#[derive(Error, Debug)]
pub enum IdMaskError {
    /// The identifier handed to `mask` was empty or longer than the engine's
    /// supported width.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    /// A key id fell outside `0..=MAX_KEY_ID` at masking time, or referred to
    /// a key absent from the bound key store.
    #[error("invalid key id: {0}")]
    InvalidKeyId(u8),

    /// An engine id fell outside `0..=MAX_KEY_ID`; this indicates an internal
    /// misconfiguration rather than anything a caller did.
    #[error("invalid engine id: {0}")]
    InvalidEngineId(u8),

    /// The bound entropy source could not produce the requested number of
    /// random bytes.
    #[error("not enough entropy available")]
    NotEnoughEntropy,

    /// The underlying AES/HMAC primitive rejected the operation during
    /// masking.
    #[error("encryption failed")]
    Encryption(#[source] Option<Box<dyn std::error::Error + Send + Sync>>),

    /// The underlying AES/HMAC primitive rejected the operation during
    /// unmasking.
    #[error("decryption failed")]
    Decryption(#[source] Option<Box<dyn std::error::Error + Send + Sync>>),

    /// Authentication failed: the version byte named an engine other than
    /// the one asked to decode it, named a key id absent from the key store,
    /// the 8-byte engine's reference check did not match, the 16-byte
    /// engine's MAC did not verify, or the token was not valid Base64 of the
    /// expected length. These are intentionally indistinguishable.
    #[error("token failed authentication")]
    StateMismatch,

    /// A construction-time invariant was violated: a malformed `SecretKey`,
    /// or a `KeyStore` built with a duplicate key id.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
}
