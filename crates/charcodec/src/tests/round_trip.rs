//! Every mapped index entry survives encode then decode, apart from the
//! pointers the encoders are defined to skip.

use crate::{
    Encoding, Error, LegacyEncoding, MultibyteDecoder, MultibyteEncoder,
    tables::{self, Index, IndexEntry},
};

/// Whether `encoding` may refuse the text at `pointer` of its index.
fn may_refuse(encoding: LegacyEncoding, pointer: usize, text: &str) -> bool {
    match encoding {
        LegacyEncoding::Big5 => pointer < (0xA1 - 0x81) * 157,
        LegacyEncoding::ShiftJis => (8272..=8835).contains(&pointer),
        LegacyEncoding::Gbk | LegacyEncoding::Gb18030 => text == "\u{E5E5}",
        LegacyEncoding::EucJp | LegacyEncoding::Iso2022Jp | LegacyEncoding::EucKr => false,
    }
}

fn check(encoding: LegacyEncoding, index: Index) {
    let mut decoder = MultibyteDecoder::new(encoding, true);
    let mut encoder = MultibyteEncoder::new(encoding);
    let mut refused = 0;
    for (pointer, entry) in tables::table(index).mapped() {
        let text: String = match entry {
            IndexEntry::Scalar(c) => c.into(),
            IndexEntry::Pair(base, mark) => [base, mark].into_iter().collect(),
            IndexEntry::Missing => unreachable!(),
        };
        match encoder.encode(&text) {
            Ok(bytes) => assert_eq!(
                decoder.decode(&bytes, false).as_deref(),
                Ok(text.as_str()),
                "{} pointer {pointer}",
                encoding.name()
            ),
            Err(Error::Unmappable { .. }) if may_refuse(encoding, pointer, &text) => refused += 1,
            Err(error) => panic!("{} pointer {pointer}: {error}", encoding.name()),
        }
    }
    assert!(refused < tables::table(index).mapped().count());
}

#[test]
fn shift_jis() {
    check(LegacyEncoding::ShiftJis, Index::Jis0208);
}

#[test]
fn euc_jp() {
    // Only the JIS X 0208 grid is reachable through EUC-JP two-byte codes.
    let mut decoder = MultibyteDecoder::new(LegacyEncoding::EucJp, true);
    let mut encoder = MultibyteEncoder::new(LegacyEncoding::EucJp);
    for (pointer, entry) in tables::table(Index::Jis0208).mapped() {
        let Some(c) = entry.scalar() else { continue };
        if pointer >= 94 * 94 {
            continue;
        }
        let bytes = encoder.encode(&c.to_string()).unwrap();
        assert_eq!(decoder.decode(&bytes, false).unwrap(), c.to_string(), "pointer {pointer}");
    }
}

#[test]
fn iso_2022_jp() {
    let mut decoder = MultibyteDecoder::new(LegacyEncoding::Iso2022Jp, true);
    let mut encoder = MultibyteEncoder::new(LegacyEncoding::Iso2022Jp);
    for (pointer, entry) in tables::table(Index::Jis0208).mapped() {
        let Some(c) = entry.scalar() else { continue };
        if pointer >= 94 * 94 {
            continue;
        }
        let text = format!("a{c}b");
        let bytes = encoder.encode(&text).unwrap();
        assert_eq!(decoder.decode(&bytes, false).unwrap(), text, "pointer {pointer}");
    }
}

#[test]
fn euc_kr() {
    check(LegacyEncoding::EucKr, Index::EucKr);
}

#[test]
fn big5() {
    check(LegacyEncoding::Big5, Index::Big5);
}

#[test]
fn gbk_and_gb18030() {
    check(LegacyEncoding::Gbk, Index::Gb18030);
    check(LegacyEncoding::Gb18030, Index::Gb18030);
}

/// Private-use code points whose fixed two-byte codes decode to other
/// characters, plus the one the encoder refuses.
const ONE_WAY: [u32; 19] = [
    0xE5E5, 0xE78D, 0xE78E, 0xE78F, 0xE790, 0xE791, 0xE792, 0xE793, 0xE794, 0xE795, 0xE796, 0xE81E,
    0xE826, 0xE82B, 0xE82C, 0xE832, 0xE843, 0xE854, 0xE864,
];

#[test]
fn gb18030_covers_every_scalar() {
    let mut decoder = MultibyteDecoder::new(LegacyEncoding::Gb18030, true);
    let text: String = (0x80..=0xFFFF_u32)
        .chain([0x1_0000, 0x1_F600, 0x10_FFFF])
        .filter(|code_point| !ONE_WAY.contains(code_point))
        .filter_map(char::from_u32)
        .collect();
    let bytes = Encoding::Gb18030.encode(&text).unwrap();
    assert_eq!(decoder.decode(&bytes, false).unwrap(), text);
}

#[test]
fn one_way_private_use_points_encode_but_decode_elsewhere() {
    let mut decoder = MultibyteDecoder::new(LegacyEncoding::Gb18030, true);
    for code_point in ONE_WAY.into_iter().filter(|&c| c != 0xE5E5).filter_map(char::from_u32) {
        let text = code_point.to_string();
        let bytes = Encoding::Gb18030.encode(&text).unwrap();
        assert_eq!(bytes.len(), 2, "U+{:04X}", u32::from(code_point));
        assert_eq!(Encoding::Gbk.encode(&text).unwrap(), bytes);
        assert_ne!(decoder.decode(&bytes, false).unwrap(), text);
    }
}
