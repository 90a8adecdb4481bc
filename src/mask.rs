//! The shared capability set implemented by both masking engines.
//!
//! `spec.md` §9 calls for "a trait (capability set) rather than an
//! inheritance hierarchy" here: [`Engine8`](crate::engine8::Engine8) and
//! [`Engine16`](crate::engine16::Engine16) share no state or behavior beyond
//! this interface, so a trait object (`Box<dyn Mask>` / `Arc<dyn Mask>`) is
//! enough for callers that need to hold either engine without knowing which.

use crate::error::IdMaskError;

/// Reversibly masks a raw identifier into an opaque, URL-safe token, and
/// back.
pub trait Mask {
    /// The widest identifier, in bytes, this implementation accepts.
    fn width(&self) -> usize;

    /// Masks `id` into an opaque token.
    ///
    /// # Errors
    /// Returns [`IdMaskError::InvalidInput`] if `id` is empty or longer than
    /// [`width`](Mask::width), and [`IdMaskError::NotEnoughEntropy`] if a
    /// randomized engine's entropy source fails.
    fn mask(&self, id: &[u8]) -> Result<String, IdMaskError>;

    /// Recovers the original identifier from a token produced by
    /// [`mask`](Mask::mask).
    ///
    /// # Errors
    /// Returns [`IdMaskError::StateMismatch`] for any token that fails to
    /// decode, authenticate, or that names an unknown key or the wrong
    /// engine.
    fn unmask(&self, token: &str) -> Result<Vec<u8>, IdMaskError>;
}
