//! Per-code-point encoder state machines for the legacy multi-byte encodings.
//!
//! All encoders are stateless except ISO-2022-JP, which tracks the character
//! set the output is currently switched into and must be flushed with
//! end-of-queue to return to ASCII.
//!
//! Reference: <https://encoding.spec.whatwg.org/#shift_jis-encoder>

use super::LegacyEncoding;
use crate::tables::{self, Reverse};

/// Outcome of feeding one code point to an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Encoded {
    /// Bytes were appended to the output.
    Continue,
    /// The code point has no representation.
    Unmappable(char),
    /// End-of-queue was reached and the state is flushed.
    Finished,
}

/// Shift state of the ISO-2022-JP encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Iso2022JpMode {
    #[default]
    Ascii,
    Roman,
    Jis0208,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum EncoderMachine {
    ShiftJis,
    EucJp,
    EucKr,
    Big5,
    Gb18030 { gbk: bool },
    Iso2022Jp { mode: Iso2022JpMode },
}

#[inline]
#[allow(clippy::cast_possible_truncation)]
fn byte(value: usize) -> u8 {
    value as u8
}

impl EncoderMachine {
    pub(crate) fn new(encoding: LegacyEncoding) -> EncoderMachine {
        match encoding {
            LegacyEncoding::ShiftJis => EncoderMachine::ShiftJis,
            LegacyEncoding::EucJp => EncoderMachine::EucJp,
            LegacyEncoding::EucKr => EncoderMachine::EucKr,
            LegacyEncoding::Big5 => EncoderMachine::Big5,
            LegacyEncoding::Gbk => EncoderMachine::Gb18030 { gbk: true },
            LegacyEncoding::Gb18030 => EncoderMachine::Gb18030 { gbk: false },
            LegacyEncoding::Iso2022Jp => EncoderMachine::Iso2022Jp {
                mode: Iso2022JpMode::Ascii,
            },
        }
    }

    /// Returns to the initial shift state.
    pub(crate) fn reset(&mut self) {
        if let EncoderMachine::Iso2022Jp { mode } = self {
            *mode = Iso2022JpMode::Ascii;
        }
    }

    pub(crate) fn step(&mut self, code_point: Option<char>, output: &mut Vec<u8>) -> Encoded {
        let Some(c) = code_point else {
            if let EncoderMachine::Iso2022Jp { mode } = self {
                if *mode != Iso2022JpMode::Ascii {
                    *mode = Iso2022JpMode::Ascii;
                    output.extend_from_slice(b"\x1b(B");
                }
            }
            return Encoded::Finished;
        };
        if c.is_ascii() && !matches!(self, EncoderMachine::Iso2022Jp { .. }) {
            output.push(byte(c as usize));
            return Encoded::Continue;
        }
        let mapped = match self {
            EncoderMachine::ShiftJis => shift_jis(c, output),
            EncoderMachine::EucJp => euc_jp(c, output),
            EncoderMachine::EucKr => euc_kr(c, output),
            EncoderMachine::Big5 => big5(c, output),
            EncoderMachine::Gb18030 { gbk } => gb18030(*gbk, c, output),
            EncoderMachine::Iso2022Jp { mode } => iso_2022_jp(mode, c, output),
        };
        if mapped {
            Encoded::Continue
        } else {
            Encoded::Unmappable(c)
        }
    }
}

/// Pointers addressable by a 94 x 94 two-byte code.
const JIS0208_GRID: usize = 94 * 94;

/// `c` with U+2212 MINUS SIGN folded onto U+FF0D FULLWIDTH HYPHEN-MINUS.
#[inline]
fn fold_minus(c: char) -> char {
    if c == '\u{2212}' { '\u{FF0D}' } else { c }
}

fn shift_jis(c: char, output: &mut Vec<u8>) -> bool {
    match c {
        '\u{0080}' => output.push(0x80),
        '\u{00A5}' => output.push(0x5C),
        '\u{203E}' => output.push(0x7E),
        '\u{FF61}'..='\u{FF9F}' => output.push(byte(c as usize - 0xFF61 + 0xA1)),
        _ => {
            let Some(pointer) = tables::pointer(Reverse::ShiftJis, fold_minus(c)) else {
                return false;
            };
            let (lead, trail) = (pointer / 188, pointer % 188);
            let lead_offset = if lead < 0x1F { 0x81 } else { 0xC1 };
            let offset = if trail < 0x3F { 0x40 } else { 0x41 };
            output.extend_from_slice(&[byte(lead + lead_offset), byte(trail + offset)]);
        }
    }
    true
}

fn euc_jp(c: char, output: &mut Vec<u8>) -> bool {
    match c {
        '\u{00A5}' => output.push(0x5C),
        '\u{203E}' => output.push(0x7E),
        '\u{FF61}'..='\u{FF9F}' => {
            output.extend_from_slice(&[0x8E, byte(c as usize - 0xFF61 + 0xA1)]);
        }
        _ => {
            let Some(pointer) = tables::pointer(Reverse::Jis0208, fold_minus(c))
                .filter(|&pointer| pointer < JIS0208_GRID)
            else {
                return false;
            };
            output.extend_from_slice(&[byte(pointer / 94 + 0xA1), byte(pointer % 94 + 0xA1)]);
        }
    }
    true
}

fn euc_kr(c: char, output: &mut Vec<u8>) -> bool {
    let Some(pointer) = tables::pointer(Reverse::EucKr, c) else {
        return false;
    };
    output.extend_from_slice(&[byte(pointer / 190 + 0x81), byte(pointer % 190 + 0x41)]);
    true
}

fn big5(c: char, output: &mut Vec<u8>) -> bool {
    let Some(pointer) = tables::pointer(Reverse::Big5, c) else {
        return false;
    };
    let (lead, trail) = (pointer / 157 + 0x81, pointer % 157);
    if lead < 0xA1 {
        return false;
    }
    let offset = if trail < 0x3F { 0x40 } else { 0x62 };
    output.extend_from_slice(&[byte(lead), byte(trail + offset)]);
    true
}

/// Private-use code points that keep a two-byte code although the index
/// now maps those pointers elsewhere. Decoding them does not round-trip.
const GB18030_PUA_TWO_BYTE: [(char, [u8; 2]); 18] = [
    ('\u{E78D}', [0xA6, 0xD9]),
    ('\u{E78E}', [0xA6, 0xDA]),
    ('\u{E78F}', [0xA6, 0xDB]),
    ('\u{E790}', [0xA6, 0xDC]),
    ('\u{E791}', [0xA6, 0xDD]),
    ('\u{E792}', [0xA6, 0xDE]),
    ('\u{E793}', [0xA6, 0xDF]),
    ('\u{E794}', [0xA6, 0xEC]),
    ('\u{E795}', [0xA6, 0xED]),
    ('\u{E796}', [0xA6, 0xF3]),
    ('\u{E81E}', [0xFE, 0x59]),
    ('\u{E826}', [0xFE, 0x61]),
    ('\u{E82B}', [0xFE, 0x66]),
    ('\u{E82C}', [0xFE, 0x67]),
    ('\u{E832}', [0xFE, 0x6D]),
    ('\u{E843}', [0xFE, 0x7E]),
    ('\u{E854}', [0xFE, 0x90]),
    ('\u{E864}', [0xFE, 0xA0]),
];

fn gb18030(gbk: bool, c: char, output: &mut Vec<u8>) -> bool {
    if c == '\u{E5E5}' {
        return false;
    }
    if gbk && c == '\u{20AC}' {
        output.push(0x80);
        return true;
    }
    if let Ok(at) = GB18030_PUA_TWO_BYTE.binary_search_by_key(&c, |&(code_point, _)| code_point) {
        output.extend_from_slice(&GB18030_PUA_TWO_BYTE[at].1);
        return true;
    }
    if let Some(pointer) = tables::pointer(Reverse::Gb18030, c) {
        let (lead, trail) = (pointer / 190 + 0x81, pointer % 190);
        let offset = if trail < 0x3F { 0x40 } else { 0x41 };
        output.extend_from_slice(&[byte(lead), byte(trail + offset)]);
        return true;
    }
    if gbk {
        return false;
    }
    let Some(pointer) = tables::gb18030_ranges().pointer(c) else {
        return false;
    };
    output.extend_from_slice(&tables::four_byte_sequence(pointer));
    true
}

/// Switches `mode` to `target`, writing the escape sequence if it changes.
fn shift(mode: &mut Iso2022JpMode, target: Iso2022JpMode, output: &mut Vec<u8>) {
    if *mode == target {
        return;
    }
    *mode = target;
    output.extend_from_slice(match target {
        Iso2022JpMode::Ascii => b"\x1b(B",
        Iso2022JpMode::Roman => b"\x1b(J",
        Iso2022JpMode::Jis0208 => b"\x1b$B",
    });
}

fn iso_2022_jp(mode: &mut Iso2022JpMode, c: char, output: &mut Vec<u8>) -> bool {
    // Shift codes would let the output escape the three supported sets.
    if matches!(c, '\u{0E}' | '\u{0F}' | '\u{1B}') {
        return false;
    }
    match (*mode, c) {
        (Iso2022JpMode::Roman, '\u{00A5}') => output.push(0x5C),
        (Iso2022JpMode::Roman, '\u{203E}') => output.push(0x7E),
        (Iso2022JpMode::Ascii | Iso2022JpMode::Roman, _)
            if c.is_ascii() && !(*mode == Iso2022JpMode::Roman && matches!(c, '\\' | '~')) =>
        {
            output.push(byte(c as usize));
        }
        (_, _) if c.is_ascii() => {
            shift(mode, Iso2022JpMode::Ascii, output);
            output.push(byte(c as usize));
        }
        (_, '\u{00A5}' | '\u{203E}') => {
            shift(mode, Iso2022JpMode::Roman, output);
            output.push(if c == '\u{00A5}' { 0x5C } else { 0x7E });
        }
        _ => {
            let wide = tables::widen_katakana(fold_minus(c));
            let Some(pointer) =
                tables::pointer(Reverse::Jis0208, wide).filter(|&pointer| pointer < JIS0208_GRID)
            else {
                return false;
            };
            shift(mode, Iso2022JpMode::Jis0208, output);
            output.extend_from_slice(&[byte(pointer / 94 + 0x21), byte(pointer % 94 + 0x21)]);
        }
    }
    true
}
