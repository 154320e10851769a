//! The WHATWG `TextDecoder`: one streaming session over any encoding.
//!
//! Unicode encodings are decoded here, with the unfinished tail of each
//! streaming call buffered until the next one. Legacy multi-byte encodings
//! delegate to a [`MultibyteDecoder`], which keeps its own state. Single-byte
//! encodings have no state at all.
//!
//! Invariants
//! - The buffered tail is at most three bytes and only exists between
//!   streaming calls.
//! - A U+FEFF is only ever dropped as the first code point of a session.
//! - A call that fails returns no output.

use std::borrow::Cow;

use crate::{
    DecodeOptions, DecoderOptions, Encoding, Error, MultibyteDecoder,
    encoding::Family,
    single_byte, unicode,
};

const BOM: char = '\u{FEFF}';

/// A stateful decoder from bytes in one encoding to text.
///
/// ```rust
/// use charcodec::{DecodeOptions, DecoderOptions, TextDecoder};
///
/// let mut decoder = TextDecoder::new("utf-8", DecoderOptions::default()).unwrap();
/// let mut text = decoder.decode(b"\xef\xbb", DecodeOptions::STREAM).unwrap();
/// text += &decoder.decode(b"\xbfcaf\xc3", DecodeOptions::STREAM).unwrap();
/// text += &decoder.decode(b"\xa9", DecodeOptions::default()).unwrap();
/// assert_eq!(text, "caf\u{e9}");
/// ```
#[derive(Debug, Clone)]
pub struct TextDecoder {
    encoding: Encoding,
    fatal: bool,
    ignore_bom: bool,
    /// No code point has been produced yet in this session.
    can_bom: bool,
    tail: Option<Vec<u8>>,
    legacy: Option<MultibyteDecoder>,
}

impl TextDecoder {
    /// Creates a decoder for the encoding named by `label`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownEncoding`] when the label is not a WHATWG label, or
    /// names the `replacement` encoding.
    pub fn new(label: &str, options: DecoderOptions) -> Result<Self, Error> {
        Encoding::for_label(label)
            .filter(|&encoding| encoding != Encoding::Replacement)
            .map(|encoding| Self::with_encoding(encoding, options))
            .ok_or_else(|| Error::UnknownEncoding(label.to_owned()))
    }

    /// Creates a decoder for an already resolved encoding.
    #[must_use]
    pub fn with_encoding(encoding: Encoding, options: DecoderOptions) -> Self {
        let DecoderOptions { fatal, ignore_bom } = options;
        Self {
            encoding,
            fatal,
            ignore_bom,
            can_bom: true,
            tail: None,
            legacy: encoding
                .legacy()
                .map(|legacy| MultibyteDecoder::new(legacy, fatal)),
        }
    }

    /// The encoding's name, lowercased, e.g. `"shift_jis"`.
    #[must_use]
    pub fn encoding(&self) -> String {
        self.encoding.name().to_ascii_lowercase()
    }

    /// Whether malformed input is an error.
    #[must_use]
    pub fn fatal(&self) -> bool {
        self.fatal
    }

    /// Whether a leading byte order mark is kept in the output.
    #[must_use]
    pub fn ignore_bom(&self) -> bool {
        self.ignore_bom
    }

    /// Decodes `input`, continuing where the previous streaming call left
    /// off.
    ///
    /// # Errors
    ///
    /// [`Error::Malformed`] when the decoder is fatal and the input is
    /// malformed, including an unfinished sequence at the end of a
    /// non-streaming call.
    pub fn decode(
        &mut self,
        input: impl AsRef<[u8]>,
        options: DecodeOptions,
    ) -> Result<String, Error> {
        let input = input.as_ref();
        let DecodeOptions { stream } = options;
        let result = match self.encoding.family() {
            Family::Utf8 | Family::Utf16 { .. } => self.decode_unicode(input, stream),
            Family::SingleByte(slot) => {
                single_byte::decode(slot, input, self.fatal).ok_or_else(|| self.malformed())
            }
            Family::XUserDefined => Ok(single_byte::decode_x_user_defined(input)),
            Family::Legacy(_) => match self.legacy.as_mut() {
                Some(legacy) => legacy.decode(input, stream),
                None => Err(self.malformed()),
            },
            Family::Replacement => self.decode_replacement(input),
        };
        if !stream {
            self.reset();
        }
        result
    }

    /// Drops any buffered input and starts a new session.
    pub fn reset(&mut self) {
        trace!(encoding = self.encoding.name(), "decoder session reset");
        self.can_bom = true;
        self.tail = None;
        if let Some(legacy) = self.legacy.as_mut() {
            legacy.reset();
        }
    }

    fn malformed(&self) -> Error {
        debug!(encoding = self.encoding.name(), "malformed input");
        Error::Malformed {
            encoding: self.encoding.name(),
        }
    }

    fn decode_unicode(&mut self, input: &[u8], stream: bool) -> Result<String, Error> {
        let bytes = match self.tail.take() {
            Some(mut buffered) => {
                buffered.extend_from_slice(input);
                Cow::Owned(buffered)
            }
            None => Cow::Borrowed(input),
        };
        let (tail_len, decoded) = match self.encoding.family() {
            Family::Utf16 { big_endian } => {
                let tail_len = unicode::utf16_tail_len(&bytes, big_endian);
                let complete = &bytes[..bytes.len() - tail_len];
                (tail_len, unicode::decode_utf16(complete, big_endian, self.fatal))
            }
            _ => {
                let tail_len = unicode::utf8_tail_len(&bytes);
                let complete = &bytes[..bytes.len() - tail_len];
                (tail_len, unicode::decode_utf8(complete, self.fatal))
            }
        };
        let mut text = decoded.ok_or_else(|| self.malformed())?;
        if tail_len > 0 {
            let tail = &bytes[bytes.len() - tail_len..];
            if stream {
                self.tail = Some(tail.to_vec());
            } else if self.fatal {
                return Err(self.malformed());
            } else {
                text.push(char::REPLACEMENT_CHARACTER);
            }
        }
        if self.can_bom && !text.is_empty() {
            self.can_bom = false;
            if !self.ignore_bom && text.starts_with(BOM) {
                text.drain(..BOM.len_utf8());
            }
        }
        Ok(text)
    }

    /// The `replacement` encoding: any input at all is one error.
    fn decode_replacement(&mut self, input: &[u8]) -> Result<String, Error> {
        if input.is_empty() || !self.can_bom {
            return Ok(String::new());
        }
        self.can_bom = false;
        if self.fatal {
            Err(self.malformed())
        } else {
            Ok(char::REPLACEMENT_CHARACTER.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(label: &str, fatal: bool) -> TextDecoder {
        TextDecoder::new(
            label,
            DecoderOptions {
                fatal,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn rejects_unknown_and_replacement_labels() {
        for label in ["klingon", "iso-2022-kr", "replacement"] {
            let error = TextDecoder::new(label, DecoderOptions::default()).unwrap_err();
            assert_eq!(error, Error::UnknownEncoding(label.to_owned()));
            assert_eq!(error.kind(), crate::ErrorKind::Range);
        }
    }

    #[test]
    fn accessors() {
        let session = TextDecoder::new(
            " SJIS ",
            DecoderOptions {
                fatal: true,
                ignore_bom: true,
            },
        )
        .unwrap();
        assert_eq!(session.encoding(), "shift_jis");
        assert!(session.fatal());
        assert!(session.ignore_bom());
        assert_eq!(open("latin1", false).encoding(), "windows-1252");
    }

    #[test]
    fn bom_split_across_calls() {
        let mut decoder = open("utf-8", false);
        assert_eq!(decoder.decode(b"\xef", DecodeOptions::STREAM).unwrap(), "");
        assert_eq!(decoder.decode(b"\xbb", DecodeOptions::STREAM).unwrap(), "");
        assert_eq!(decoder.decode(b"\xbfA", DecodeOptions::default()).unwrap(), "A");
    }

    #[test]
    fn only_the_first_bom_is_dropped() {
        let mut decoder = open("utf-8", false);
        let text = decoder
            .decode(b"\xef\xbb\xbf\xef\xbb\xbfA", DecodeOptions::STREAM)
            .unwrap();
        assert_eq!(text, "\u{FEFF}A");
        let text = decoder.decode(b"\xef\xbb\xbf", DecodeOptions::default()).unwrap();
        assert_eq!(text, "\u{FEFF}");
        // A non-streaming call starts a new session.
        let text = decoder.decode(b"\xef\xbb\xbfB", DecodeOptions::default()).unwrap();
        assert_eq!(text, "B");
    }

    #[test]
    fn ignore_bom_keeps_it() {
        let mut decoder = TextDecoder::new(
            "utf-16le",
            DecoderOptions {
                ignore_bom: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(decoder.decode(b"\xff\xfeA\x00", DecodeOptions::default()).unwrap(), "\u{FEFF}A");
    }

    #[test]
    fn utf16be_bom_and_surrogates_over_calls() {
        let mut decoder = open("utf-16be", true);
        let mut text = decoder.decode(b"\xfe\xff\xd8", DecodeOptions::STREAM).unwrap();
        text += &decoder.decode(b"\x3d\xde", DecodeOptions::STREAM).unwrap();
        text += &decoder.decode(b"\x00", DecodeOptions::default()).unwrap();
        assert_eq!(text, "\u{1F600}");
    }

    #[test]
    fn unfinished_tail_at_end() {
        let mut loose = open("utf-8", false);
        assert_eq!(loose.decode(b"a\xe2\x82", DecodeOptions::default()).unwrap(), "a\u{FFFD}");
        let mut loose = open("utf-16le", false);
        assert_eq!(loose.decode(b"\x3d\xd8\x00", DecodeOptions::default()).unwrap(), "\u{FFFD}");

        let mut fatal = open("utf-8", true);
        assert!(fatal.decode(b"a\xe2", DecodeOptions::STREAM).is_ok());
        assert_eq!(
            fatal.decode(b"", DecodeOptions::default()),
            Err(Error::Malformed { encoding: "UTF-8" })
        );
        // The failed call ended the session.
        assert_eq!(fatal.decode(b"\x82\xac", DecodeOptions::STREAM).ok(), None);
    }

    #[test]
    fn fatal_error_clears_the_buffered_tail() {
        let mut decoder = open("utf-8", true);
        assert_eq!(decoder.decode(b"\xe2\x82", DecodeOptions::STREAM).unwrap(), "");
        assert!(decoder.decode(b"\xff", DecodeOptions::STREAM).is_err());
        assert_eq!(decoder.decode(b"ok", DecodeOptions::default()).unwrap(), "ok");
    }

    #[test]
    fn legacy_sessions() {
        let mut decoder = open("gb18030", true);
        assert_eq!(decoder.decode(b"\x84\x31", DecodeOptions::STREAM).unwrap(), "");
        assert_eq!(decoder.decode(b"\xa4\x37", DecodeOptions::default()).unwrap(), "\u{FFFD}");
        // Byte order marks belong to Unicode encodings only.
        let mut decoder = open("windows-1252", false);
        assert_eq!(decoder.decode(b"\xef\xbb\xbf", DecodeOptions::default()).unwrap(), "\u{EF}\u{BB}\u{BF}");
    }

    #[test]
    fn single_byte_and_x_user_defined() {
        let mut decoder = open("windows-874", true);
        assert!(decoder.decode(b"\xdb", DecodeOptions::default()).is_err());
        let mut decoder = open("x-user-defined", true);
        assert_eq!(decoder.decode(b"\xff", DecodeOptions::default()).unwrap(), "\u{F7FF}");
    }

    #[test]
    fn replacement_decoding() {
        let mut decoder = TextDecoder::with_encoding(Encoding::Replacement, DecoderOptions::default());
        assert_eq!(decoder.decode(b"abc", DecodeOptions::STREAM).unwrap(), "\u{FFFD}");
        assert_eq!(decoder.decode(b"def", DecodeOptions::default()).unwrap(), "");
        assert_eq!(decoder.decode(b"", DecodeOptions::default()).unwrap(), "");
    }

    #[test]
    fn sessions_are_send() {
        fn assert_send<T: Send>() {}
        assert_send::<TextDecoder>();
    }
}
