//! Per-byte decoder state machines for the legacy multi-byte encodings.
//!
//! Each machine consumes one byte, or `None` for end-of-queue, and answers
//! with a [`Signal`]. Machines never fail: a malformed sequence is reported
//! as [`Signal::Error`] after any bytes that must be read again have been
//! queued on the [`Pushback`]. Whether that becomes U+FFFD or an error is the
//! driver's decision.
//!
//! The rules are those of the WHATWG Encoding Standard decoders.
//! Reference: <https://encoding.spec.whatwg.org/#legacy-multi-byte-chinese-(simplified)-encodings>

use core::mem;

use super::{LegacyEncoding, pushback::Pushback};
use crate::tables::{self, Index, IndexEntry};

/// Outcome of feeding one byte to a state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Signal {
    /// One code point was decoded.
    Emit(char),
    /// Two code points were decoded (Big5 pairs).
    EmitPair(char, char),
    /// The byte was absorbed into a pending sequence.
    Continue,
    /// The sequence was malformed.
    Error,
    /// End-of-queue was reached with nothing pending.
    Finished,
}

impl From<IndexEntry> for Signal {
    fn from(entry: IndexEntry) -> Self {
        match entry {
            IndexEntry::Missing => Signal::Error,
            IndexEntry::Scalar(c) => Signal::Emit(c),
            IndexEntry::Pair(base, mark) => Signal::EmitPair(base, mark),
        }
    }
}

#[inline]
fn emit(code_point: u32) -> Signal {
    char::from_u32(code_point).map_or(Signal::Error, Signal::Emit)
}

/// Reports a miss on a two-byte sequence, re-queueing an ASCII trail byte.
#[inline]
fn trail_miss(byte: u8, pushback: &mut Pushback) -> Signal {
    if byte.is_ascii() {
        pushback.extend(&[byte]);
    }
    Signal::Error
}

/// A decoder state machine for one legacy encoding.
///
/// A zero lead byte means no lead is pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StateMachine {
    ShiftJis { lead: u8 },
    EucJp { lead: u8, jis0212: bool },
    EucKr { lead: u8 },
    Big5 { lead: u8 },
    Gb18030 { first: u8, second: u8, third: u8 },
    Iso2022Jp(Iso2022Jp),
}

impl StateMachine {
    pub(crate) fn new(encoding: LegacyEncoding) -> StateMachine {
        match encoding {
            LegacyEncoding::ShiftJis => StateMachine::ShiftJis { lead: 0 },
            LegacyEncoding::EucJp => StateMachine::EucJp {
                lead: 0,
                jis0212: false,
            },
            LegacyEncoding::EucKr => StateMachine::EucKr { lead: 0 },
            LegacyEncoding::Big5 => StateMachine::Big5 { lead: 0 },
            LegacyEncoding::Gbk | LegacyEncoding::Gb18030 => StateMachine::Gb18030 {
                first: 0,
                second: 0,
                third: 0,
            },
            LegacyEncoding::Iso2022Jp => StateMachine::Iso2022Jp(Iso2022Jp::default()),
        }
    }

    /// Whether no partial sequence is pending.
    pub(crate) fn is_idle(&self) -> bool {
        match *self {
            StateMachine::ShiftJis { lead }
            | StateMachine::EucJp { lead, .. }
            | StateMachine::EucKr { lead }
            | StateMachine::Big5 { lead } => lead == 0,
            StateMachine::Gb18030 { first, .. } => first == 0,
            StateMachine::Iso2022Jp(ref machine) => machine.is_idle(),
        }
    }

    pub(crate) fn step(&mut self, byte: Option<u8>, pushback: &mut Pushback) -> Signal {
        match self {
            StateMachine::ShiftJis { lead } => shift_jis(lead, byte, pushback),
            StateMachine::EucJp { lead, jis0212 } => euc_jp(lead, jis0212, byte, pushback),
            StateMachine::EucKr { lead } => euc_kr(lead, byte, pushback),
            StateMachine::Big5 { lead } => big5(lead, byte, pushback),
            StateMachine::Gb18030 {
                first,
                second,
                third,
            } => gb18030([first, second, third], byte, pushback),
            StateMachine::Iso2022Jp(machine) => machine.step(byte, pushback),
        }
    }
}

/// End-of-queue with an optional pending lead.
#[inline]
fn end_of_queue(lead: &mut u8) -> Signal {
    if mem::take(lead) == 0 {
        Signal::Finished
    } else {
        Signal::Error
    }
}

fn shift_jis(lead: &mut u8, byte: Option<u8>, pushback: &mut Pushback) -> Signal {
    let Some(byte) = byte else {
        return end_of_queue(lead);
    };
    if *lead != 0 {
        let lead = mem::take(lead);
        if matches!(byte, 0x40..=0x7E | 0x80..=0xFC) {
            let lead_offset = if lead < 0xA0 { 0x81 } else { 0xC1 };
            let offset = if byte < 0x7F { 0x40 } else { 0x41 };
            let pointer = usize::from(lead - lead_offset) * 188 + usize::from(byte - offset);
            if (8836..=10715).contains(&pointer) {
                #[allow(clippy::cast_possible_truncation)]
                return emit(0xE000 + (pointer - 8836) as u32);
            }
            if let Some(c) = tables::lookup(Index::Jis0208, pointer).scalar() {
                return Signal::Emit(c);
            }
        }
        return trail_miss(byte, pushback);
    }
    match byte {
        0x00..=0x80 => Signal::Emit(char::from(byte)),
        0xA1..=0xDF => emit(0xFF61 + u32::from(byte - 0xA1)),
        0x81..=0x9F | 0xE0..=0xFC => {
            *lead = byte;
            Signal::Continue
        }
        _ => Signal::Error,
    }
}

fn euc_jp(lead: &mut u8, jis0212: &mut bool, byte: Option<u8>, pushback: &mut Pushback) -> Signal {
    let Some(byte) = byte else {
        *jis0212 = false;
        return end_of_queue(lead);
    };
    match (*lead, byte) {
        (0x8E, 0xA1..=0xDF) => {
            *lead = 0;
            emit(0xFF61 + u32::from(byte - 0xA1))
        }
        (0x8F, 0xA1..=0xFE) => {
            *jis0212 = true;
            *lead = byte;
            Signal::Continue
        }
        (0, _) => match byte {
            0x00..=0x7F => Signal::Emit(char::from(byte)),
            0x8E | 0x8F | 0xA1..=0xFE => {
                *lead = byte;
                Signal::Continue
            }
            _ => Signal::Error,
        },
        (pending, _) => {
            *lead = 0;
            let index = if mem::take(jis0212) {
                Index::Jis0212
            } else {
                Index::Jis0208
            };
            if matches!(pending, 0xA1..=0xFE) && matches!(byte, 0xA1..=0xFE) {
                let pointer = usize::from(pending - 0xA1) * 94 + usize::from(byte - 0xA1);
                if let Some(c) = tables::lookup(index, pointer).scalar() {
                    return Signal::Emit(c);
                }
            }
            trail_miss(byte, pushback)
        }
    }
}

fn euc_kr(lead: &mut u8, byte: Option<u8>, pushback: &mut Pushback) -> Signal {
    let Some(byte) = byte else {
        return end_of_queue(lead);
    };
    if *lead != 0 {
        let lead = mem::take(lead);
        if matches!(byte, 0x41..=0xFE) {
            let pointer = usize::from(lead - 0x81) * 190 + usize::from(byte - 0x41);
            if let Some(c) = tables::lookup(Index::EucKr, pointer).scalar() {
                return Signal::Emit(c);
            }
        }
        return trail_miss(byte, pushback);
    }
    match byte {
        0x00..=0x7F => Signal::Emit(char::from(byte)),
        0x81..=0xFE => {
            *lead = byte;
            Signal::Continue
        }
        _ => Signal::Error,
    }
}

fn big5(lead: &mut u8, byte: Option<u8>, pushback: &mut Pushback) -> Signal {
    let Some(byte) = byte else {
        return end_of_queue(lead);
    };
    if *lead != 0 {
        let lead = mem::take(lead);
        if matches!(byte, 0x40..=0x7E | 0xA1..=0xFE) {
            let offset = if byte < 0x7F { 0x40 } else { 0x62 };
            let pointer = usize::from(lead - 0x81) * 157 + usize::from(byte - offset);
            let entry = tables::lookup(Index::Big5, pointer);
            if entry != IndexEntry::Missing {
                return entry.into();
            }
        }
        return trail_miss(byte, pushback);
    }
    match byte {
        0x00..=0x7F => Signal::Emit(char::from(byte)),
        0x81..=0xFE => {
            *lead = byte;
            Signal::Continue
        }
        _ => Signal::Error,
    }
}

/// GBK and gb18030 share this machine; GBK only differs when encoding.
fn gb18030([first, second, third]: [&mut u8; 3], byte: Option<u8>, pushback: &mut Pushback) -> Signal {
    let Some(byte) = byte else {
        let pending = *first | *second | *third;
        (*first, *second, *third) = (0, 0, 0);
        return if pending == 0 {
            Signal::Finished
        } else {
            Signal::Error
        };
    };
    if *third != 0 {
        let bytes = [*first, *second, *third];
        (*first, *second, *third) = (0, 0, 0);
        if !matches!(byte, 0x30..=0x39) {
            pushback.extend(&[bytes[1], bytes[2], byte]);
            return Signal::Error;
        }
        let pointer = u32::from(bytes[0] - 0x81) * (10 * 126 * 10)
            + u32::from(bytes[1] - 0x30) * (10 * 126)
            + u32::from(bytes[2] - 0x81) * 10
            + u32::from(byte - 0x30);
        return tables::gb18030_ranges()
            .code_point(pointer)
            .map_or(Signal::Error, Signal::Emit);
    }
    if *second != 0 {
        if matches!(byte, 0x81..=0xFE) {
            *third = byte;
            return Signal::Continue;
        }
        pushback.extend(&[*second, byte]);
        (*first, *second) = (0, 0);
        return Signal::Error;
    }
    if *first != 0 {
        if matches!(byte, 0x30..=0x39) {
            *second = byte;
            return Signal::Continue;
        }
        let lead = mem::take(first);
        if matches!(byte, 0x40..=0x7E | 0x80..=0xFE) {
            let offset = if byte < 0x7F { 0x40 } else { 0x41 };
            let pointer = usize::from(lead - 0x81) * 190 + usize::from(byte - offset);
            if let Some(c) = tables::lookup(Index::Gb18030, pointer).scalar() {
                return Signal::Emit(c);
            }
        }
        return trail_miss(byte, pushback);
    }
    match byte {
        0x00..=0x7F => Signal::Emit(char::from(byte)),
        0x80 => Signal::Emit('\u{20AC}'),
        0x81..=0xFE => {
            *first = byte;
            Signal::Continue
        }
        _ => Signal::Error,
    }
}

/// Character set an ISO-2022-JP stream is switched into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Iso2022JpState {
    #[default]
    Ascii,
    Roman,
    Katakana,
    Lead,
    Trail,
    EscapeStart,
    Escape,
}

/// The ISO-2022-JP decoder: the only machine with state outside a pending
/// sequence, so its mode carries over between streaming calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Iso2022Jp {
    state: Iso2022JpState,
    output_state: Iso2022JpState,
    lead: u8,
    /// Set right after an escape sequence; a second escape with no output
    /// in between is an error.
    output: bool,
}

const ESC: u8 = 0x1B;

impl Iso2022Jp {
    #[cfg(test)]
    pub(crate) fn state(&self) -> Iso2022JpState {
        self.state
    }

    fn is_idle(&self) -> bool {
        !matches!(
            self.state,
            Iso2022JpState::Trail | Iso2022JpState::EscapeStart | Iso2022JpState::Escape
        )
    }

    /// Clears the output flag and emits `code_point`.
    #[inline]
    fn output(&mut self, code_point: u32) -> Signal {
        self.output = false;
        emit(code_point)
    }

    #[inline]
    fn fail(&mut self) -> Signal {
        self.output = false;
        Signal::Error
    }

    fn step(&mut self, byte: Option<u8>, pushback: &mut Pushback) -> Signal {
        use Iso2022JpState as S;

        match (self.state, byte) {
            (S::Ascii | S::Roman | S::Katakana | S::Lead, Some(ESC)) => {
                self.state = S::EscapeStart;
                Signal::Continue
            }
            (S::Ascii | S::Roman | S::Katakana | S::Lead, None) => Signal::Finished,
            (S::Ascii, Some(b @ 0x00..=0x7F)) if !matches!(b, 0x0E | 0x0F) => {
                self.output(u32::from(b))
            }
            (S::Roman, Some(0x5C)) => self.output(0xA5),
            (S::Roman, Some(0x7E)) => self.output(0x203E),
            (S::Roman, Some(b @ 0x00..=0x7F)) if !matches!(b, 0x0E | 0x0F) => {
                self.output(u32::from(b))
            }
            (S::Katakana, Some(b @ 0x21..=0x5F)) => self.output(0xFF61 + u32::from(b - 0x21)),
            (S::Lead, Some(b @ 0x21..=0x7E)) => {
                self.output = false;
                self.lead = b;
                self.state = S::Trail;
                Signal::Continue
            }
            (S::Ascii | S::Roman | S::Katakana | S::Lead, Some(_)) => self.fail(),
            (S::Trail, Some(ESC)) => {
                self.state = S::EscapeStart;
                Signal::Error
            }
            (S::Trail, Some(b @ 0x21..=0x7E)) => {
                self.state = S::Lead;
                let pointer = usize::from(self.lead - 0x21) * 94 + usize::from(b - 0x21);
                tables::lookup(Index::Jis0208, pointer)
                    .scalar()
                    .map_or(Signal::Error, Signal::Emit)
            }
            (S::Trail, _) => {
                self.state = S::Lead;
                Signal::Error
            }
            (S::EscapeStart, Some(b @ (0x24 | 0x28))) => {
                self.lead = b;
                self.state = S::Escape;
                Signal::Continue
            }
            (S::EscapeStart, _) => {
                if let Some(b) = byte {
                    pushback.extend(&[b]);
                }
                self.state = self.output_state;
                self.fail()
            }
            (S::Escape, _) => {
                let lead = mem::take(&mut self.lead);
                let switch = match (lead, byte) {
                    (0x28, Some(0x42)) => Some(S::Ascii),
                    (0x28, Some(0x4A)) => Some(S::Roman),
                    (0x28, Some(0x49)) => Some(S::Katakana),
                    (0x24, Some(0x40 | 0x42)) => Some(S::Lead),
                    _ => None,
                };
                if let Some(state) = switch {
                    self.state = state;
                    self.output_state = state;
                    if mem::replace(&mut self.output, true) {
                        Signal::Error
                    } else {
                        Signal::Continue
                    }
                } else {
                    match byte {
                        Some(b) => pushback.extend(&[lead, b]),
                        None => pushback.extend(&[lead]),
                    }
                    self.state = self.output_state;
                    self.fail()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    /// Runs `bytes` plus end-of-queue through a fresh machine, rendering
    /// errors as U+FFFD.
    fn run(encoding: LegacyEncoding, bytes: &[u8]) -> String {
        let mut machine = StateMachine::new(encoding);
        let mut pushback = Pushback::default();
        let mut input = bytes.iter().copied();
        let mut out = String::new();
        loop {
            let byte = pushback.pop().or_else(|| input.next());
            assert!(pushback.len() < Pushback::CAPACITY);
            match machine.step(byte, &mut pushback) {
                Signal::Emit(c) => out.push(c),
                Signal::EmitPair(a, b) => {
                    out.push(a);
                    out.push(b);
                }
                Signal::Continue => {}
                Signal::Error => out.push('\u{FFFD}'),
                Signal::Finished => break,
            }
        }
        out
    }

    #[rstest]
    #[case::shift_jis_kanji(LegacyEncoding::ShiftJis, b"\x88\x9f", "\u{4E9C}")]
    #[case::shift_jis_halfwidth(LegacyEncoding::ShiftJis, b"\xb1", "\u{FF71}")]
    #[case::shift_jis_0x80(LegacyEncoding::ShiftJis, b"\x80", "\u{0080}")]
    #[case::shift_jis_pua(LegacyEncoding::ShiftJis, b"\xf0\x40", "\u{E000}")]
    #[case::shift_jis_ascii_trail(LegacyEncoding::ShiftJis, b"\x81 ", "\u{FFFD} ")]
    #[case::shift_jis_truncated(LegacyEncoding::ShiftJis, b"\x88", "\u{FFFD}")]
    #[case::euc_jp_kanji(LegacyEncoding::EucJp, b"\xb0\xa1", "\u{4E9C}")]
    #[case::euc_jp_halfwidth(LegacyEncoding::EucJp, b"\x8e\xb1", "\u{FF71}")]
    #[case::euc_jp_jis0212(LegacyEncoding::EucJp, b"\x8f\xb0\xa1", "\u{4E02}")]
    #[case::euc_jp_bad_katakana(LegacyEncoding::EucJp, b"\x8eA", "\u{FFFD}A")]
    #[case::euc_kr_hangul(LegacyEncoding::EucKr, b"\xb0\xa1", "\u{AC00}")]
    #[case::euc_kr_ascii_trail(LegacyEncoding::EucKr, b"\xb0!", "\u{FFFD}!")]
    #[case::big5_hanzi(LegacyEncoding::Big5, b"\xa4\x40", "\u{4E00}")]
    #[case::big5_pair(LegacyEncoding::Big5, b"\x88\x62", "\u{00CA}\u{0304}")]
    #[case::big5_box(LegacyEncoding::Big5, b"\xf9\xf9", "\u{2550}")]
    #[case::gbk_euro(LegacyEncoding::Gbk, b"\x80", "\u{20AC}")]
    #[case::gb18030_two_byte(LegacyEncoding::Gb18030, b"\xd6\xd0", "\u{4E2D}")]
    #[case::gb18030_four_byte(LegacyEncoding::Gb18030, b"\x81\x30\x81\x30", "\u{0080}")]
    #[case::gb18030_astral(LegacyEncoding::Gb18030, b"\x90\x30\x81\x30", "\u{10000}")]
    #[case::gb18030_replacement(LegacyEncoding::Gb18030, b"\x84\x31\xa4\x37", "\u{FFFD}")]
    #[case::gb18030_ff(LegacyEncoding::Gb18030, b"\xff", "\u{FFFD}")]
    #[case::gb18030_bad_third(LegacyEncoding::Gb18030, b"\x81\x30AB", "\u{FFFD}0AB")]
    #[case::gb18030_bad_fourth(LegacyEncoding::Gb18030, b"\x81\x30\x81A", "\u{FFFD}0\u{4E02}")]
    #[case::gb18030_unassigned(LegacyEncoding::Gb18030, b"\x84\x31\xa5\x30", "\u{FFFD}")]
    fn decodes(#[case] encoding: LegacyEncoding, #[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(run(encoding, bytes), expected);
    }

    #[rstest]
    #[case::jis0208(b"\x1b$B00\x1b(B", "\u{65ED}")]
    #[case::roman(b"\x1b(J\\~", "\u{00A5}\u{203E}")]
    #[case::katakana(b"\x1b(I1", "\u{FF71}")]
    #[case::shift_out_is_error(b"\x0e", "\u{FFFD}")]
    #[case::double_escape(b"\x1b(J\x1b(B", "\u{FFFD}")]
    #[case::bad_escape(b"\x1b(XA", "\u{FFFD}(XA")]
    #[case::truncated_escape(b"\x1b$", "\u{FFFD}$")]
    #[case::escape_in_trail(b"\x1b$B0\x1b(BA", "\u{FFFD}A")]
    #[case::lone_lead(b"\x1b$B0", "\u{FFFD}")]
    fn decodes_iso_2022_jp(#[case] bytes: &[u8], #[case] expected: &str) {
        assert_eq!(run(LegacyEncoding::Iso2022Jp, bytes), expected);
    }

    #[test]
    fn iso_2022_jp_idleness() {
        let mut machine = Iso2022Jp::default();
        let mut pushback = Pushback::default();
        assert!(machine.is_idle());
        assert_eq!(machine.step(Some(ESC), &mut pushback), Signal::Continue);
        assert!(!machine.is_idle());
        assert_eq!(machine.step(Some(b'$'), &mut pushback), Signal::Continue);
        assert_eq!(machine.step(Some(b'B'), &mut pushback), Signal::Continue);
        assert_eq!(machine.state(), Iso2022JpState::Lead);
        assert!(machine.is_idle());
    }
}
