//! URL-safe Base64: a character substitution over standard (padded) Base64.
//! `+ -> ~`, `/ -> _`, `=` (padding) `-> -`. The substitution runs after
//! standard encoding and before standard decoding, so it must be byte-exact
//! for tokens to be portable across independent implementations — the
//! golden vectors in `spec.md` pin this exactly.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Encodes `bytes` as standard Base64, then substitutes `+`, `/`, and `=`
/// for the URL-safe alphabet used by this crate's tokens.
#[must_use]
pub(crate) fn encode(bytes: &[u8]) -> String {
    STANDARD
        .encode(bytes)
        .chars()
        .map(|c| match c {
            '+' => '~',
            '/' => '_',
            '=' => '-',
            other => other,
        })
        .collect()
}

/// Reverses [`encode`]: substitutes the URL-safe alphabet back to standard
/// Base64, then decodes. Returns `None` on any malformed input (wrong
/// length, invalid character) rather than propagating a decode error type,
/// since the caller folds any Base64 failure into `StateMismatch`.
#[must_use]
pub(crate) fn decode(token: &str) -> Option<Vec<u8>> {
    let standard: String = token
        .chars()
        .map(|c| match c {
            '~' => '+',
            '_' => '/',
            '-' => '=',
            other => other,
        })
        .collect();
    STANDARD.decode(standard).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_arbitrary_bytes() {
        let data = b"\x00\x01\xFF\xFE some mixed bytes \x7F";
        assert_eq!(decode(&encode(data)).unwrap(), data);
    }

    #[test]
    fn substitutes_url_unsafe_characters() {
        // These three bytes base64-encode to "/+8=" under the standard
        // alphabet, exercising all three substituted characters at once.
        let data = [0xFF, 0xEF];
        let encoded = encode(&data);
        assert!(!encoded.contains('+'));
        assert!(!encoded.contains('/'));
        assert!(!encoded.contains('='));
    }

    #[test]
    fn decode_rejects_malformed_input() {
        assert!(decode("not valid base64 at all !!!").is_none());
    }
}
