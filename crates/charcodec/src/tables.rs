//! Index tables: pointer to code point lookups and their reverses.
//!
//! Every table is a flat array sized to its encoding's pointer space, built
//! the first time it is touched and shared read-only for the rest of the
//! process. The entries are materialised by probing [`encoding_rs`] with the
//! byte sequence that addresses each pointer, so the decoders in this crate
//! only ever see the logical `lookup(index, pointer)` contract.
//!
//! Invariants
//! - A built table is never mutated; concurrent first use is serialised by
//!   `OnceLock`.
//! - Reverse indexes are sorted by code point and hold exactly one pointer per
//!   code point (the first, or the last where an encoder asks for it).

use std::sync::OnceLock;

use crate::encoding::{Encoding, SINGLE_BYTE};

/// The multi-byte index tables of the WHATWG Encoding Standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Index {
    /// JIS X 0208 with the IBM and NEC extensions; used by Shift_JIS, EUC-JP
    /// and ISO-2022-JP.
    Jis0208,
    /// JIS X 0212; reachable only through EUC-JP `0x8F` sequences.
    Jis0212,
    /// KS X 1001 with the Unified Hangul Code extensions.
    EucKr,
    /// Big5 with the HKSCS extensions.
    Big5,
    /// The two-byte part of gb18030.
    Gb18030,
}

impl Index {
    /// Number of pointers addressable by the encodings using this index.
    #[must_use]
    pub const fn pointers(self) -> usize {
        match self {
            // Shift_JIS lead 0xFC, trail 0xFC
            Index::Jis0208 => 60 * 188,
            Index::Jis0212 => 94 * 94,
            Index::EucKr | Index::Gb18030 => 126 * 190,
            Index::Big5 => 126 * 157,
        }
    }

    /// The index name used by the standard, e.g. `"jis0208"`.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Index::Jis0208 => "jis0208",
            Index::Jis0212 => "jis0212",
            Index::EucKr => "euc-kr",
            Index::Big5 => "big5",
            Index::Gb18030 => "gb18030",
        }
    }

    /// The byte sequence whose decoding yields the entry at `pointer`, or
    /// `None` for pointers that never consult the table.
    fn probe_bytes(self, pointer: usize) -> Option<(Encoding, [u8; 3], usize)> {
        #[allow(clippy::cast_possible_truncation)]
        let bytes = match self {
            Index::Jis0208 => {
                // Shift_JIS maps this range straight to the private use area.
                if (8836..=10715).contains(&pointer) {
                    return None;
                }
                let (lead, trail) = (pointer / 188, pointer % 188);
                let lead = lead + if lead < 0x1F { 0x81 } else { 0xC1 };
                let trail = trail + if trail < 0x3F { 0x40 } else { 0x41 };
                (Encoding::ShiftJis, [lead as u8, trail as u8, 0], 2)
            }
            Index::Jis0212 => {
                let lead = pointer / 94 + 0xA1;
                let trail = pointer % 94 + 0xA1;
                (Encoding::EucJp, [0x8F, lead as u8, trail as u8], 3)
            }
            Index::EucKr => {
                let lead = pointer / 190 + 0x81;
                let trail = pointer % 190 + 0x41;
                (Encoding::EucKr, [lead as u8, trail as u8, 0], 2)
            }
            Index::Big5 => {
                let (lead, trail) = (pointer / 157, pointer % 157);
                let trail = trail + if trail < 0x3F { 0x40 } else { 0x62 };
                (Encoding::Big5, [(lead + 0x81) as u8, trail as u8, 0], 2)
            }
            Index::Gb18030 => {
                let (lead, trail) = (pointer / 190, pointer % 190);
                let trail = trail + if trail < 0x3F { 0x40 } else { 0x41 };
                (Encoding::Gb18030, [(lead + 0x81) as u8, trail as u8, 0], 2)
            }
        };
        Some(bytes)
    }
}

/// One slot of an index table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexEntry {
    /// The pointer has no mapping.
    #[default]
    Missing,
    /// The pointer maps to one scalar value.
    Scalar(char),
    /// The pointer maps to a base character plus a combining mark (Big5 only).
    Pair(char, char),
}

impl IndexEntry {
    /// The single scalar value, if this entry is one.
    #[must_use]
    pub fn scalar(self) -> Option<char> {
        match self {
            IndexEntry::Scalar(c) => Some(c),
            IndexEntry::Missing | IndexEntry::Pair(..) => None,
        }
    }

    fn from_text(text: &str) -> IndexEntry {
        let mut chars = text.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(c), None, _) => IndexEntry::Scalar(c),
            (Some(base), Some(mark), None) => IndexEntry::Pair(base, mark),
            _ => IndexEntry::Missing,
        }
    }
}

/// Big5 pointers whose entries are two code points.
const BIG5_PAIRS: [(usize, char, char); 4] = [
    (1133, '\u{00CA}', '\u{0304}'),
    (1135, '\u{00CA}', '\u{030C}'),
    (1164, '\u{00EA}', '\u{0304}'),
    (1166, '\u{00EA}', '\u{030C}'),
];

/// A built index table.
#[derive(Debug)]
pub struct CodepointTable {
    index: Index,
    entries: Box<[IndexEntry]>,
}

impl CodepointTable {
    fn build(index: Index) -> CodepointTable {
        let mut entries = vec![IndexEntry::Missing; index.pointers()].into_boxed_slice();
        for (pointer, slot) in entries.iter_mut().enumerate() {
            if let Some((encoding, bytes, len)) = index.probe_bytes(pointer) {
                *slot = probe(encoding, &bytes[..len]);
            }
        }
        if index == Index::Big5 {
            for (pointer, base, mark) in BIG5_PAIRS {
                entries[pointer] = IndexEntry::Pair(base, mark);
            }
        }
        debug!(
            index = index.name(),
            mapped = entries.iter().filter(|e| **e != IndexEntry::Missing).count(),
            "built index table"
        );
        CodepointTable { index, entries }
    }

    /// Which index this is.
    #[must_use]
    pub fn index(&self) -> Index {
        self.index
    }

    /// The entry at `pointer`; out-of-range pointers are [`IndexEntry::Missing`].
    #[must_use]
    #[inline]
    pub fn get(&self, pointer: usize) -> IndexEntry {
        self.entries.get(pointer).copied().unwrap_or_default()
    }

    /// Iterates `(pointer, entry)` over every mapped pointer in pointer order.
    pub fn mapped(&self) -> impl Iterator<Item = (usize, IndexEntry)> + '_ {
        self.entries
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, entry)| *entry != IndexEntry::Missing)
    }
}

fn probe(encoding: Encoding, bytes: &[u8]) -> IndexEntry {
    let Some(source) = encoding_rs::Encoding::for_label(encoding.name().as_bytes()) else {
        return IndexEntry::Missing;
    };
    source
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map_or(IndexEntry::Missing, |text| IndexEntry::from_text(&text))
}

static TABLES: [OnceLock<CodepointTable>; 5] = [const { OnceLock::new() }; 5];

/// The process-wide table for `index`, built on first use.
#[must_use]
pub fn table(index: Index) -> &'static CodepointTable {
    let slot = match index {
        Index::Jis0208 => 0,
        Index::Jis0212 => 1,
        Index::EucKr => 2,
        Index::Big5 => 3,
        Index::Gb18030 => 4,
    };
    TABLES[slot].get_or_init(|| CodepointTable::build(index))
}

/// `lookup(index, pointer)`: the entry at `pointer` in `index`.
#[must_use]
#[inline]
pub fn lookup(index: Index, pointer: usize) -> IndexEntry {
    table(index).get(pointer)
}

// ------------------------------------------------------------------------------------------------
// gb18030 ranges
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct Range {
    pointer: u32,
    code_point: u32,
    len: u32,
}

/// The `gb18030-ranges` table: linear runs of four-byte pointers.
#[derive(Debug)]
pub struct Gb18030Ranges {
    by_pointer: Box<[Range]>,
    by_code_point: Box<[Range]>,
}

/// Highest four-byte pointer inside the BMP ranges.
const GB18030_BMP_LAST: u32 = 39419;
/// First four-byte pointer of the supplementary planes.
const GB18030_ASTRAL_FIRST: u32 = 189_000;
/// Last four-byte pointer of the supplementary planes (U+10FFFF).
const GB18030_ASTRAL_LAST: u32 = 1_237_575;

impl Gb18030Ranges {
    fn build() -> Gb18030Ranges {
        let Some(source) = encoding_rs::Encoding::for_label(b"gb18030") else {
            return Gb18030Ranges {
                by_pointer: Box::default(),
                by_code_point: Box::default(),
            };
        };
        let mut ranges: Vec<Range> = Vec::new();
        for pointer in 0..=GB18030_BMP_LAST {
            let bytes = four_byte_sequence(pointer);
            let Some(c) = source
                .decode_without_bom_handling_and_without_replacement(&bytes)
                .and_then(|text| IndexEntry::from_text(&text).scalar())
            else {
                continue;
            };
            let code_point = u32::from(c);
            match ranges.last_mut() {
                Some(run)
                    if run.pointer + run.len == pointer
                        && run.code_point + run.len == code_point =>
                {
                    run.len += 1;
                }
                _ => ranges.push(Range {
                    pointer,
                    code_point,
                    len: 1,
                }),
            }
        }
        let by_pointer = ranges.clone().into_boxed_slice();
        ranges.sort_by_key(|run| run.code_point);
        debug!(ranges = by_pointer.len(), "built gb18030 ranges");
        Gb18030Ranges {
            by_pointer,
            by_code_point: ranges.into_boxed_slice(),
        }
    }

    /// The code point for a four-byte `pointer`, or `None` for unassigned
    /// pointers.
    #[must_use]
    pub fn code_point(&self, pointer: u32) -> Option<char> {
        if pointer > GB18030_ASTRAL_LAST {
            return None;
        }
        if pointer >= GB18030_ASTRAL_FIRST {
            return char::from_u32(0x1_0000 + pointer - GB18030_ASTRAL_FIRST);
        }
        if pointer > GB18030_BMP_LAST {
            return None;
        }
        let at = self.by_pointer.partition_point(|run| run.pointer <= pointer);
        let run = self.by_pointer.get(at.checked_sub(1)?)?;
        let offset = pointer - run.pointer;
        if offset >= run.len {
            return None;
        }
        char::from_u32(run.code_point + offset)
    }

    /// The four-byte pointer for `c`; `None` only for code points the ranges
    /// do not cover (those reachable through the two-byte index).
    #[must_use]
    pub fn pointer(&self, c: char) -> Option<u32> {
        let code_point = u32::from(c);
        if code_point >= 0x1_0000 {
            return Some(GB18030_ASTRAL_FIRST + code_point - 0x1_0000);
        }
        let at = self
            .by_code_point
            .partition_point(|run| run.code_point <= code_point);
        let run = self.by_code_point.get(at.checked_sub(1)?)?;
        let offset = code_point - run.code_point;
        (offset < run.len).then_some(run.pointer + offset)
    }
}

/// The four bytes addressing a gb18030 four-byte `pointer`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn four_byte_sequence(pointer: u32) -> [u8; 4] {
    let b1 = pointer / (10 * 126 * 10);
    let rest = pointer % (10 * 126 * 10);
    let b2 = rest / (10 * 126);
    let rest = rest % (10 * 126);
    let b3 = rest / 10;
    let b4 = rest % 10;
    [
        (b1 + 0x81) as u8,
        (b2 + 0x30) as u8,
        (b3 + 0x81) as u8,
        (b4 + 0x30) as u8,
    ]
}

static GB18030_RANGES: OnceLock<Gb18030Ranges> = OnceLock::new();

/// The process-wide `gb18030-ranges` table.
#[must_use]
pub fn gb18030_ranges() -> &'static Gb18030Ranges {
    GB18030_RANGES.get_or_init(Gb18030Ranges::build)
}

// ------------------------------------------------------------------------------------------------
// Reverse indexes
// ------------------------------------------------------------------------------------------------

/// Code point to pointer lookups, one flavour per encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reverse {
    /// `index jis0208` pointer: first pointer over the whole index.
    Jis0208,
    /// `index Shift_JIS` pointer: jis0208 without pointers 8272..=8835.
    ShiftJis,
    /// `index euc-kr` pointer.
    EucKr,
    /// `index Big5` pointer: no pointers below 5024, last pointer for a
    /// handful of duplicated box-drawing and CJK characters.
    Big5,
    /// `index gb18030` pointer.
    Gb18030,
}

/// Code points whose Big5 encoding uses the last of their pointers.
const BIG5_LAST_POINTER: [char; 6] = [
    '\u{2550}', '\u{255E}', '\u{2561}', '\u{256A}', '\u{5341}', '\u{5345}',
];

/// First Big5 pointer the encoder may produce: `(0xA1 - 0x81) * 157`.
pub(crate) const BIG5_ENCODABLE_FIRST: usize = (0xA1 - 0x81) * 157;

#[derive(Debug)]
struct ReverseIndex {
    entries: Box<[(char, u16)]>,
}

impl ReverseIndex {
    fn build(flavour: Reverse) -> ReverseIndex {
        let (index, keep): (Index, fn(usize) -> bool) = match flavour {
            Reverse::Jis0208 => (Index::Jis0208, |_| true),
            Reverse::ShiftJis => (Index::Jis0208, |p| !(8272..=8835).contains(&p)),
            Reverse::EucKr => (Index::EucKr, |_| true),
            Reverse::Big5 => (Index::Big5, |p| p >= BIG5_ENCODABLE_FIRST),
            Reverse::Gb18030 => (Index::Gb18030, |_| true),
        };
        let mut entries: Vec<(char, u16)> = table(index)
            .mapped()
            .filter(|&(pointer, _)| keep(pointer))
            .filter_map(|(pointer, entry)| {
                let pointer = u16::try_from(pointer).ok()?;
                Some((entry.scalar()?, pointer))
            })
            .collect();
        // Stable: equal code points stay in pointer order.
        entries.sort_by_key(|&(c, _)| c);
        let mut unique: Vec<(char, u16)> = Vec::with_capacity(entries.len());
        for (c, pointer) in entries {
            match unique.last_mut() {
                Some(last) if last.0 == c => {
                    if flavour == Reverse::Big5 && BIG5_LAST_POINTER.contains(&c) {
                        last.1 = pointer;
                    }
                }
                _ => unique.push((c, pointer)),
            }
        }
        trace!(index = index.name(), code_points = unique.len(), "built reverse index");
        ReverseIndex {
            entries: unique.into_boxed_slice(),
        }
    }

    fn pointer(&self, c: char) -> Option<usize> {
        self.entries
            .binary_search_by_key(&c, |&(k, _)| k)
            .ok()
            .map(|at| usize::from(self.entries[at].1))
    }
}

static REVERSE: [OnceLock<ReverseIndex>; 5] = [const { OnceLock::new() }; 5];

/// The pointer an encoder should use for `c`, if the index maps it.
#[must_use]
pub fn pointer(flavour: Reverse, c: char) -> Option<usize> {
    let slot = match flavour {
        Reverse::Jis0208 => 0,
        Reverse::ShiftJis => 1,
        Reverse::EucKr => 2,
        Reverse::Big5 => 3,
        Reverse::Gb18030 => 4,
    };
    REVERSE[slot]
        .get_or_init(|| ReverseIndex::build(flavour))
        .pointer(c)
}

// ------------------------------------------------------------------------------------------------
// iso-2022-jp katakana
// ------------------------------------------------------------------------------------------------

/// `index ISO-2022-JP katakana`: half-width U+FF61..=U+FF9F to full-width.
#[rustfmt::skip]
const ISO_2022_JP_KATAKANA: [char; 63] = [
    '\u{3002}', '\u{300C}', '\u{300D}', '\u{3001}', '\u{30FB}', '\u{30F2}', '\u{30A1}', '\u{30A3}',
    '\u{30A5}', '\u{30A7}', '\u{30A9}', '\u{30E3}', '\u{30E5}', '\u{30E7}', '\u{30C3}', '\u{30FC}',
    '\u{30A2}', '\u{30A4}', '\u{30A6}', '\u{30A8}', '\u{30AA}', '\u{30AB}', '\u{30AD}', '\u{30AF}',
    '\u{30B1}', '\u{30B3}', '\u{30B5}', '\u{30B7}', '\u{30B9}', '\u{30BB}', '\u{30BD}', '\u{30BF}',
    '\u{30C1}', '\u{30C4}', '\u{30C6}', '\u{30C8}', '\u{30CA}', '\u{30CB}', '\u{30CC}', '\u{30CD}',
    '\u{30CE}', '\u{30CF}', '\u{30D2}', '\u{30D5}', '\u{30D8}', '\u{30DB}', '\u{30DE}', '\u{30DF}',
    '\u{30E0}', '\u{30E1}', '\u{30E2}', '\u{30E4}', '\u{30E6}', '\u{30E8}', '\u{30E9}', '\u{30EA}',
    '\u{30EB}', '\u{30EC}', '\u{30ED}', '\u{30EF}', '\u{30F3}', '\u{309B}', '\u{309C}',
];

/// Widens a half-width katakana code point; other code points pass through.
#[must_use]
pub fn widen_katakana(c: char) -> char {
    match u32::from(c).checked_sub(0xFF61) {
        Some(offset) if offset < 63 => ISO_2022_JP_KATAKANA[offset as usize],
        _ => c,
    }
}

// ------------------------------------------------------------------------------------------------
// Single-byte tables
// ------------------------------------------------------------------------------------------------

/// Upper half (`0x80..=0xFF`) of a single-byte encoding, plus its reverse.
#[derive(Debug)]
pub(crate) struct SingleByteTable {
    upper: [Option<char>; 128],
    reverse: Box<[(char, u8)]>,
}

impl SingleByteTable {
    fn build(encoding: Encoding) -> SingleByteTable {
        let mut upper = [None; 128];
        if let Some(source) = encoding_rs::Encoding::for_label(encoding.name().as_bytes()) {
            for (byte, slot) in (0x80..=0xFF_u8).zip(upper.iter_mut()) {
                *slot = source
                    .decode_without_bom_handling_and_without_replacement(&[byte])
                    .and_then(|text| IndexEntry::from_text(&text).scalar());
            }
        }
        let mut reverse: Vec<(char, u8)> = (0x80..=0xFF_u8)
            .zip(upper.iter())
            .filter_map(|(byte, c)| Some(((*c)?, byte)))
            .collect();
        reverse.sort_by_key(|&(c, _)| c);
        reverse.dedup_by_key(|&mut (c, _)| c);
        trace!(encoding = encoding.name(), "built single-byte table");
        SingleByteTable {
            upper,
            reverse: reverse.into_boxed_slice(),
        }
    }

    #[inline]
    pub(crate) fn decode(&self, byte: u8) -> Option<char> {
        if byte < 0x80 {
            Some(char::from(byte))
        } else {
            self.upper[usize::from(byte - 0x80)]
        }
    }

    pub(crate) fn encode(&self, c: char) -> Option<u8> {
        if c.is_ascii() {
            #[allow(clippy::cast_possible_truncation)]
            return Some(c as u8);
        }
        self.reverse
            .binary_search_by_key(&c, |&(k, _)| k)
            .ok()
            .map(|at| self.reverse[at].1)
    }
}

static SINGLE_BYTE_TABLES: [OnceLock<SingleByteTable>; SINGLE_BYTE.len()] =
    [const { OnceLock::new() }; SINGLE_BYTE.len()];

/// The table for the single-byte encoding in `slot` of [`SINGLE_BYTE`].
pub(crate) fn single_byte(slot: usize) -> &'static SingleByteTable {
    SINGLE_BYTE_TABLES[slot].get_or_init(|| SingleByteTable::build(SINGLE_BYTE[slot]))
}
