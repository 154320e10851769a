//! The WHATWG `TextEncoder`: text to UTF-8.

/// Progress reported by [`TextEncoder::encode_into`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
pub struct EncodeIntoResult {
    /// UTF-16 code units of the source that were consumed.
    pub read: usize,
    /// Bytes written to the destination.
    pub written: usize,
}

/// Encodes text as UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextEncoder;

impl TextEncoder {
    /// Creates an encoder.
    #[must_use]
    pub fn new() -> Self {
        TextEncoder
    }

    /// Always `"utf-8"`.
    #[must_use]
    pub fn encoding(&self) -> &'static str {
        "utf-8"
    }

    /// Encodes `input`.
    #[must_use]
    pub fn encode(&self, input: &str) -> Vec<u8> {
        input.as_bytes().to_vec()
    }

    /// Encodes as much of `source` as fits in `destination`, never splitting
    /// a scalar value.
    ///
    /// ```rust
    /// use charcodec::{EncodeIntoResult, TextEncoder};
    ///
    /// let mut buffer = [0; 4];
    /// let result = TextEncoder::new().encode_into("a\u{1F600}", &mut buffer);
    /// assert_eq!(result, EncodeIntoResult { read: 1, written: 1 });
    /// ```
    pub fn encode_into(&self, source: &str, destination: &mut [u8]) -> EncodeIntoResult {
        let mut result = EncodeIntoResult::default();
        for c in source.chars() {
            let end = result.written + c.len_utf8();
            if end > destination.len() {
                break;
            }
            c.encode_utf8(&mut destination[result.written..end]);
            result.read += c.len_utf16();
            result.written = end;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_into_counts_utf16_units() {
        let encoder = TextEncoder::new();
        let mut buffer = [0; 16];
        let result = encoder.encode_into("\u{1F600}\u{E9}", &mut buffer);
        assert_eq!(result, EncodeIntoResult { read: 3, written: 6 });
        assert_eq!(&buffer[..6], "\u{1F600}\u{E9}".as_bytes());
    }

    #[test]
    fn encode_into_stops_at_a_scalar_boundary() {
        let encoder = TextEncoder::new();
        let mut buffer = [0; 3];
        let result = encoder.encode_into("ab\u{E9}", &mut buffer);
        assert_eq!(result, EncodeIntoResult { read: 2, written: 2 });
        let result = encoder.encode_into("", &mut buffer);
        assert_eq!(result, EncodeIntoResult::default());
    }

    #[test]
    fn encode() {
        assert_eq!(TextEncoder::new().encode("\u{20AC}"), b"\xe2\x82\xac");
        assert_eq!(TextEncoder.encoding(), "utf-8");
    }
}
