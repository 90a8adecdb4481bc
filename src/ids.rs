//! Thin typed wrappers around the byte-level `Mask` API, for callers who
//! have an integer, a UUID, or already-raw bytes rather than a `&[u8]` they
//! have to assemble themselves. No cryptography lives here; every method is
//! a pack/unpack around [`Mask::mask`]/[`Mask::unmask`].

use uuid::Uuid;

use crate::error::IdMaskError;
use crate::mask::Mask;

/// Masks an integer by round-tripping it through its decimal-string bytes.
///
/// This is a deliberately odd encoding — not a binary `u64::to_be_bytes`
/// pack — kept because it is the documented behavior of the raw engine API:
/// `mask` accepts arbitrary bytes, and the most natural bytes for "an
/// integer identifier" a caller hands across a text-based boundary (a URL,
/// a log line) are its decimal digits. Callers who want a compact binary
/// integer encoding should pack the bytes themselves and call
/// [`crate::mask::Mask::mask`] directly.
pub struct IntegerId;

impl IntegerId {
    /// Masks `id` as the bytes of its decimal string representation.
    ///
    /// # Errors
    /// Propagates [`IdMaskError::InvalidInput`] if the decimal representation
    /// is wider than `engine`'s `width()` (20 digits is too wide for an
    /// 8-byte engine holding a `u64` such as `18446744073709551615`; every
    /// `u64` fits a 16-byte engine).
    pub fn mask(engine: &dyn Mask, id: u64) -> Result<String, IdMaskError> {
        engine.mask(id.to_string().as_bytes())
    }

    /// Recovers an integer previously masked by [`IntegerId::mask`].
    ///
    /// # Errors
    /// Propagates `engine.unmask`'s errors, plus
    /// [`IdMaskError::InvalidArgument`] if the recovered bytes are not a
    /// valid decimal `u64` (e.g. the token was minted by
    /// [`BytesId`] or [`UuidId`] instead).
    pub fn unmask(engine: &dyn Mask, token: &str) -> Result<u64, IdMaskError> {
        let bytes = engine.unmask(token)?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|_| IdMaskError::InvalidArgument("masked bytes are not valid UTF-8"))?;
        text.parse()
            .map_err(|_| IdMaskError::InvalidArgument("masked text is not a decimal integer"))
    }
}

/// Masks a UUID's raw 16 bytes. Requires a 16-byte-wide engine
/// ([`crate::engine16::Engine16`]); using an 8-byte engine always fails with
/// [`IdMaskError::InvalidInput`], since no UUID fits in 8 bytes.
pub struct UuidId;

impl UuidId {
    /// Masks `id`'s 16 raw bytes.
    ///
    /// # Errors
    /// Returns [`IdMaskError::InvalidInput`] if `engine.width() < 16`.
    pub fn mask(engine: &dyn Mask, id: Uuid) -> Result<String, IdMaskError> {
        engine.mask(id.as_bytes())
    }

    /// Recovers a UUID previously masked by [`UuidId::mask`].
    ///
    /// # Errors
    /// Propagates `engine.unmask`'s errors, plus
    /// [`IdMaskError::InvalidArgument`] if the recovered bytes are not
    /// exactly 16 bytes.
    pub fn unmask(engine: &dyn Mask, token: &str) -> Result<Uuid, IdMaskError> {
        let bytes = engine.unmask(token)?;
        let array: [u8; 16] = bytes
            .try_into()
            .map_err(|_| IdMaskError::InvalidArgument("masked bytes are not 16 bytes"))?;
        Ok(Uuid::from_bytes(array))
    }
}

/// A passthrough wrapper for callers who already hold raw identifier bytes
/// and would rather call a typed method than `engine.mask(&bytes)` directly.
pub struct BytesId;

impl BytesId {
    /// Masks `id` unchanged.
    ///
    /// # Errors
    /// Propagates `engine.mask`'s errors (empty or over-width input).
    pub fn mask(engine: &dyn Mask, id: &[u8]) -> Result<String, IdMaskError> {
        engine.mask(id)
    }

    /// Recovers the raw bytes previously masked by [`BytesId::mask`].
    ///
    /// # Errors
    /// Propagates `engine.unmask`'s errors.
    pub fn unmask(engine: &dyn Mask, token: &str) -> Result<Vec<u8>, IdMaskError> {
        engine.unmask(token)
    }
}
