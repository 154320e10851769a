/// Options fixed when a [`TextDecoder`](crate::TextDecoder) is created.
///
/// # Examples
///
/// ```rust
/// use charcodec::{DecoderOptions, TextDecoder};
///
/// let decoder = TextDecoder::new(
///     "utf-8",
///     DecoderOptions {
///         fatal: true,
///         ..Default::default()
///     },
/// )
/// .unwrap();
/// assert!(decoder.fatal());
/// ```
///
/// # Default
///
/// All options default to `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(test, feature = "serde"), serde(default))]
pub struct DecoderOptions {
    /// Whether malformed input is an error.
    ///
    /// When `false`, every malformed sequence decodes to U+FFFD REPLACEMENT
    /// CHARACTER. When `true`, the first malformed sequence fails the whole
    /// call with [`Error::Malformed`](crate::Error::Malformed) and none of
    /// its output is returned.
    ///
    /// # Default
    ///
    /// `false`
    pub fatal: bool,

    /// Whether a leading byte order mark is kept.
    ///
    /// Only UTF-8 and UTF-16 have a byte order mark. When `false`, a U+FEFF
    /// at the very start of a session is dropped from the output, even when
    /// its bytes arrive over several streaming calls.
    ///
    /// # Default
    ///
    /// `false`
    #[cfg_attr(any(test, feature = "serde"), serde(rename = "ignoreBOM"))]
    pub ignore_bom: bool,
}

/// Options for a single [`TextDecoder::decode`](crate::TextDecoder::decode)
/// call.
///
/// # Default
///
/// `stream` defaults to `false`, so a call decodes a complete document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
#[cfg_attr(any(test, feature = "serde"), derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(any(test, feature = "serde"), serde(default))]
pub struct DecodeOptions {
    /// Whether more input follows this call.
    ///
    /// When `true`, an unfinished sequence at the end of the input is held
    /// back and completed by the next call. When `false`, it is flushed
    /// (as U+FFFD, or an error if the decoder is fatal) and the decoder
    /// returns to its initial state, ready for a new document.
    ///
    /// # Default
    ///
    /// `false`
    pub stream: bool,
}

impl DecodeOptions {
    /// Options for a call that will be followed by more input.
    pub const STREAM: DecodeOptions = DecodeOptions { stream: true };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serde_field_names() {
        let options = DecoderOptions {
            fatal: true,
            ignore_bom: true,
        };
        let json = serde_json::to_string(&options).unwrap();
        assert_eq!(json, r#"{"fatal":true,"ignoreBOM":true}"#);
        let partial: DecoderOptions = serde_json::from_str(r#"{"fatal":true}"#).unwrap();
        assert_eq!(partial, DecoderOptions { fatal: true, ignore_bom: false });
        let stream: DecodeOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(stream, DecodeOptions::default());
    }
}
