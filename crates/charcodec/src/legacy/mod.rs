//! Legacy multi-byte encodings: the decoder driver and the encoder.
//!
//! [`MultibyteDecoder`] owns one lazily created [`StateMachine`] and its
//! [`Pushback`] queue. Input is fed one byte at a time, with pushed-back
//! bytes always taking priority over new input; an idle machine for an
//! ASCII-compatible encoding lets ASCII runs through without stepping.
//!
//! Invariants
//! - At most one state machine per decoder; it is dropped at the end of
//!   every non-streaming call.
//! - A fatal error leaves the pushback queue empty. The machine itself is
//!   kept for streaming callers, so ISO-2022-JP keeps its current mode.

mod decoder;
mod encoder;
mod pushback;

use decoder::{Signal, StateMachine};
use encoder::{Encoded, EncoderMachine};
use pushback::Pushback;

use crate::{Encoding, Error};

/// The legacy multi-byte encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
pub enum LegacyEncoding {
    /// Shift_JIS (Windows-31J flavour).
    ShiftJis,
    /// EUC-JP, including JIS X 0212 on decode.
    EucJp,
    /// ISO-2022-JP; the only one that is not an ASCII superset.
    Iso2022Jp,
    /// EUC-KR (Windows-949 flavour).
    EucKr,
    /// Big5 with HKSCS.
    Big5,
    /// GBK: gb18030 decoding, two-byte only encoding.
    Gbk,
    /// gb18030.
    Gb18030,
}

impl LegacyEncoding {
    /// Every legacy multi-byte encoding.
    pub const ALL: [LegacyEncoding; 7] = [
        LegacyEncoding::ShiftJis,
        LegacyEncoding::EucJp,
        LegacyEncoding::Iso2022Jp,
        LegacyEncoding::EucKr,
        LegacyEncoding::Big5,
        LegacyEncoding::Gbk,
        LegacyEncoding::Gb18030,
    ];

    /// The registry entry for this encoding.
    #[must_use]
    pub const fn encoding(self) -> Encoding {
        match self {
            LegacyEncoding::ShiftJis => Encoding::ShiftJis,
            LegacyEncoding::EucJp => Encoding::EucJp,
            LegacyEncoding::Iso2022Jp => Encoding::Iso2022Jp,
            LegacyEncoding::EucKr => Encoding::EucKr,
            LegacyEncoding::Big5 => Encoding::Big5,
            LegacyEncoding::Gbk => Encoding::Gbk,
            LegacyEncoding::Gb18030 => Encoding::Gb18030,
        }
    }

    /// The canonical WHATWG name.
    #[must_use]
    pub fn name(self) -> &'static str {
        self.encoding().name()
    }

    /// A fresh decoder for this encoding.
    #[must_use]
    pub fn new_decoder(self, fatal: bool) -> MultibyteDecoder {
        MultibyteDecoder::new(self, fatal)
    }

    /// A fresh encoder for this encoding.
    #[must_use]
    pub fn new_encoder(self) -> MultibyteEncoder {
        MultibyteEncoder::new(self)
    }
}

/// Incremental decoder for one legacy multi-byte encoding.
///
/// ```
/// use charcodec::{LegacyEncoding, MultibyteDecoder};
///
/// let mut decoder = MultibyteDecoder::new(LegacyEncoding::ShiftJis, false);
/// let mut text = decoder.decode(b"caf\x82", true).unwrap();
/// text += &decoder.decode(b"\xa0!", false).unwrap();
/// assert_eq!(text, "caf\u{3042}!");
/// ```
#[derive(Debug, Clone)]
pub struct MultibyteDecoder {
    encoding: LegacyEncoding,
    fatal: bool,
    machine: Option<StateMachine>,
    pushback: Pushback,
}

impl MultibyteDecoder {
    /// Creates a decoder. With `fatal` set, malformed input is an error
    /// instead of U+FFFD.
    #[must_use]
    pub fn new(encoding: LegacyEncoding, fatal: bool) -> Self {
        Self {
            encoding,
            fatal,
            machine: None,
            pushback: Pushback::default(),
        }
    }

    /// The encoding being decoded.
    #[must_use]
    pub fn encoding(&self) -> LegacyEncoding {
        self.encoding
    }

    /// Whether malformed input is an error.
    #[must_use]
    pub fn fatal(&self) -> bool {
        self.fatal
    }

    /// Drops any pending state.
    pub fn reset(&mut self) {
        self.machine = None;
        self.pushback.clear();
    }

    /// Decodes `input`. With `stream` set, an unfinished trailing sequence is
    /// held back for the next call; otherwise it is flushed and the decoder
    /// returns to its initial state.
    ///
    /// # Errors
    ///
    /// [`Error::Malformed`] on the first malformed sequence when the decoder
    /// is fatal. Output decoded before the error is discarded.
    pub fn decode(&mut self, input: &[u8], stream: bool) -> Result<String, Error> {
        let mut output = String::with_capacity(input.len());
        let result = self.decode_into(input, stream, &mut output);
        if !stream {
            self.reset();
        }
        result.map(|()| output)
    }

    /// Whether an ASCII run may bypass the state machine.
    fn fast_path(&self) -> bool {
        self.encoding != LegacyEncoding::Iso2022Jp
            && self.pushback.is_empty()
            && self.machine.as_ref().is_none_or(StateMachine::is_idle)
    }

    fn decode_into(&mut self, input: &[u8], stream: bool, output: &mut String) -> Result<(), Error> {
        let encoding = self.encoding;
        let mut rest = input;
        loop {
            if self.fast_path() {
                let ascii = rest.iter().take_while(|b| b.is_ascii()).count();
                output.extend(rest[..ascii].iter().copied().map(char::from));
                rest = &rest[ascii..];
            }
            let byte = match self.pushback.pop() {
                Some(byte) => Some(byte),
                None => match rest.split_first() {
                    Some((&byte, tail)) => {
                        rest = tail;
                        Some(byte)
                    }
                    None if stream || self.machine.is_none() => break,
                    None => None,
                },
            };
            let machine = self
                .machine
                .get_or_insert_with(|| StateMachine::new(encoding));
            match machine.step(byte, &mut self.pushback) {
                Signal::Emit(c) => output.push(c),
                Signal::EmitPair(base, mark) => {
                    output.push(base);
                    output.push(mark);
                }
                Signal::Continue => {}
                Signal::Error if self.fatal => {
                    self.pushback.clear();
                    debug!(
                        encoding = encoding.name(),
                        offset = input.len() - rest.len(),
                        "malformed input"
                    );
                    return Err(Error::Malformed {
                        encoding: encoding.name(),
                    });
                }
                Signal::Error => output.push(char::REPLACEMENT_CHARACTER),
                Signal::Finished => break,
            }
        }
        Ok(())
    }
}

/// Strict encoder for one legacy multi-byte encoding.
///
/// ```
/// use charcodec::{LegacyEncoding, MultibyteEncoder};
///
/// let mut encoder = MultibyteEncoder::new(LegacyEncoding::Iso2022Jp);
/// assert_eq!(encoder.encode("\u{65ED}").unwrap(), b"\x1b$B00\x1b(B");
/// ```
#[derive(Debug, Clone)]
pub struct MultibyteEncoder {
    encoding: LegacyEncoding,
    machine: EncoderMachine,
}

impl MultibyteEncoder {
    /// Creates an encoder in its initial state.
    #[must_use]
    pub fn new(encoding: LegacyEncoding) -> Self {
        Self {
            encoding,
            machine: EncoderMachine::new(encoding),
        }
    }

    /// The encoding being produced.
    #[must_use]
    pub fn encoding(&self) -> LegacyEncoding {
        self.encoding
    }

    /// Encodes `text`, ending in the initial shift state.
    ///
    /// # Errors
    ///
    /// [`Error::Unmappable`] for the first code point the encoding cannot
    /// represent. The encoder is back in its initial state afterwards.
    pub fn encode(&mut self, text: &str) -> Result<Vec<u8>, Error> {
        let mut output = Vec::with_capacity(text.len());
        for code_point in text.chars().map(Some).chain([None]) {
            match self.machine.step(code_point, &mut output) {
                Encoded::Continue => {}
                Encoded::Finished => break,
                Encoded::Unmappable(code_point) => {
                    self.machine.reset();
                    trace!(
                        encoding = self.encoding.name(),
                        code_point = u32::from(code_point),
                        "unmappable code point"
                    );
                    return Err(Error::Unmappable {
                        encoding: self.encoding.name(),
                        code_point,
                    });
                }
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_bypasses_the_machine() {
        let mut decoder = MultibyteDecoder::new(LegacyEncoding::EucKr, true);
        assert_eq!(decoder.decode(b"plain ascii", true).unwrap(), "plain ascii");
        assert!(decoder.machine.is_none());
    }

    #[test]
    fn streaming_holds_a_lead_byte() {
        let mut decoder = MultibyteDecoder::new(LegacyEncoding::EucKr, true);
        assert_eq!(decoder.decode(b"a\xb0", true).unwrap(), "a");
        assert!(decoder.machine.as_ref().is_some_and(|m| !m.is_idle()));
        assert_eq!(decoder.decode(b"\xa1b", false).unwrap(), "\u{AC00}b");
        assert!(decoder.machine.is_none());
    }

    #[test]
    fn non_streaming_flushes_a_lead_byte() {
        let mut decoder = MultibyteDecoder::new(LegacyEncoding::Big5, false);
        assert_eq!(decoder.decode(b"x\xa4", false).unwrap(), "x\u{FFFD}");
        let mut decoder = MultibyteDecoder::new(LegacyEncoding::Big5, true);
        assert_eq!(
            decoder.decode(b"x\xa4", false),
            Err(Error::Malformed { encoding: "Big5" })
        );
    }

    #[test]
    fn fatal_error_clears_pushback() {
        let mut decoder = MultibyteDecoder::new(LegacyEncoding::ShiftJis, true);
        assert!(decoder.decode(b"\x81 ", true).is_err());
        assert!(decoder.pushback.is_empty());
        // The space that was pushed back is gone.
        assert_eq!(decoder.decode(b"z", false).unwrap(), "z");
    }

    #[test]
    fn late_pushback_is_drained_on_flush() {
        let mut decoder = MultibyteDecoder::new(LegacyEncoding::Gb18030, false);
        assert_eq!(decoder.decode(b"\x81\x30\x81", true).unwrap(), "");
        assert_eq!(decoder.decode(b"A", false).unwrap(), "\u{FFFD}0\u{4E02}");
    }

    #[test]
    fn iso_2022_jp_mode_survives_fatal_error() {
        let mut decoder = MultibyteDecoder::new(LegacyEncoding::Iso2022Jp, true);
        assert_eq!(decoder.decode(b"\x1b$B", true).unwrap(), "");
        assert!(decoder.decode(b"\x0a", true).is_err());
        assert_eq!(decoder.decode(b"00", true).unwrap(), "\u{65ED}");
    }

    #[test]
    fn encoder_reports_unmappable_and_recovers() {
        let mut encoder = MultibyteEncoder::new(LegacyEncoding::Iso2022Jp);
        assert_eq!(
            encoder.encode("\u{65ED}\u{00E9}"),
            Err(Error::Unmappable {
                encoding: "ISO-2022-JP",
                code_point: '\u{00E9}'
            })
        );
        assert_eq!(encoder.encode("a").unwrap(), b"a");
    }

    #[test]
    fn names() {
        assert_eq!(LegacyEncoding::ShiftJis.name(), "Shift_JIS");
        assert_eq!(LegacyEncoding::Gbk.name(), "GBK");
        assert_eq!(LegacyEncoding::Gb18030.new_decoder(true).encoding(), LegacyEncoding::Gb18030);
        assert!(LegacyEncoding::EucJp.new_decoder(true).fatal());
        assert_eq!(LegacyEncoding::Big5.new_encoder().encoding(), LegacyEncoding::Big5);
    }
}
