//! Encoding registry: the WHATWG encodings, their names and their labels.
//!
//! Label resolution follows the WHATWG "get an encoding" algorithm: strip
//! leading and trailing ASCII whitespace, compare ASCII case-insensitively
//! against the label table. Reference: <https://encoding.spec.whatwg.org/#names-and-labels>

use crate::{Error, legacy::LegacyEncoding, single_byte, unicode};

/// One of the encodings defined by the WHATWG Encoding Standard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "fuzzing", derive(arbitrary::Arbitrary))]
#[allow(missing_docs)]
pub enum Encoding {
    Utf8,
    Ibm866,
    Iso8859_2,
    Iso8859_3,
    Iso8859_4,
    Iso8859_5,
    Iso8859_6,
    Iso8859_7,
    Iso8859_8,
    Iso8859_8I,
    Iso8859_10,
    Iso8859_13,
    Iso8859_14,
    Iso8859_15,
    Iso8859_16,
    Koi8R,
    Koi8U,
    Macintosh,
    Windows874,
    Windows1250,
    Windows1251,
    Windows1252,
    Windows1253,
    Windows1254,
    Windows1255,
    Windows1256,
    Windows1257,
    Windows1258,
    XMacCyrillic,
    Gbk,
    Gb18030,
    Big5,
    EucJp,
    Iso2022Jp,
    ShiftJis,
    EucKr,
    Replacement,
    Utf16Be,
    Utf16Le,
    XUserDefined,
}

/// How an encoding is decoded and encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Family {
    Utf8,
    Utf16 { big_endian: bool },
    /// Slot in [`SINGLE_BYTE`].
    SingleByte(usize),
    XUserDefined,
    Legacy(LegacyEncoding),
    Replacement,
}

/// Single-byte encodings backed by a 128-entry upper-half table, in slot order.
pub(crate) const SINGLE_BYTE: [Encoding; 28] = [
    Encoding::Ibm866,
    Encoding::Iso8859_2,
    Encoding::Iso8859_3,
    Encoding::Iso8859_4,
    Encoding::Iso8859_5,
    Encoding::Iso8859_6,
    Encoding::Iso8859_7,
    Encoding::Iso8859_8,
    Encoding::Iso8859_8I,
    Encoding::Iso8859_10,
    Encoding::Iso8859_13,
    Encoding::Iso8859_14,
    Encoding::Iso8859_15,
    Encoding::Iso8859_16,
    Encoding::Koi8R,
    Encoding::Koi8U,
    Encoding::Macintosh,
    Encoding::Windows874,
    Encoding::Windows1250,
    Encoding::Windows1251,
    Encoding::Windows1252,
    Encoding::Windows1253,
    Encoding::Windows1254,
    Encoding::Windows1255,
    Encoding::Windows1256,
    Encoding::Windows1257,
    Encoding::Windows1258,
    Encoding::XMacCyrillic,
];

impl Encoding {
    /// Every encoding, in the order the standard lists them.
    pub const ALL: [Encoding; 40] = [
        Encoding::Utf8,
        Encoding::Ibm866,
        Encoding::Iso8859_2,
        Encoding::Iso8859_3,
        Encoding::Iso8859_4,
        Encoding::Iso8859_5,
        Encoding::Iso8859_6,
        Encoding::Iso8859_7,
        Encoding::Iso8859_8,
        Encoding::Iso8859_8I,
        Encoding::Iso8859_10,
        Encoding::Iso8859_13,
        Encoding::Iso8859_14,
        Encoding::Iso8859_15,
        Encoding::Iso8859_16,
        Encoding::Koi8R,
        Encoding::Koi8U,
        Encoding::Macintosh,
        Encoding::Windows874,
        Encoding::Windows1250,
        Encoding::Windows1251,
        Encoding::Windows1252,
        Encoding::Windows1253,
        Encoding::Windows1254,
        Encoding::Windows1255,
        Encoding::Windows1256,
        Encoding::Windows1257,
        Encoding::Windows1258,
        Encoding::XMacCyrillic,
        Encoding::Gbk,
        Encoding::Gb18030,
        Encoding::Big5,
        Encoding::EucJp,
        Encoding::Iso2022Jp,
        Encoding::ShiftJis,
        Encoding::EucKr,
        Encoding::Replacement,
        Encoding::Utf16Be,
        Encoding::Utf16Le,
        Encoding::XUserDefined,
    ];

    /// Resolves a label such as `"sjis"` or `" Latin1 "` to its encoding.
    ///
    /// Returns `None` for labels the standard does not define.
    ///
    /// ```rust
    /// use charcodec::Encoding;
    ///
    /// assert_eq!(Encoding::for_label("ms932"), Some(Encoding::ShiftJis));
    /// assert_eq!(Encoding::for_label("\tLATIN1\n"), Some(Encoding::Windows1252));
    /// assert_eq!(Encoding::for_label("cp932"), None);
    /// ```
    #[must_use]
    pub fn for_label(label: &str) -> Option<Encoding> {
        let label = label
            .trim_matches(|c: char| matches!(c, '\t' | '\n' | '\x0C' | '\r' | ' '))
            .to_ascii_lowercase();
        Some(match label.as_str() {
            "unicode-1-1-utf-8" | "unicode11utf8" | "unicode20utf8" | "utf-8" | "utf8"
            | "x-unicode20utf8" => Encoding::Utf8,

            // -- Legacy single-byte encodings -------------------------
            "866" | "cp866" | "csibm866" | "ibm866" => Encoding::Ibm866,
            "csisolatin2" | "iso-8859-2" | "iso-ir-101" | "iso8859-2" | "iso88592" | "iso_8859-2"
            | "iso_8859-2:1987" | "l2" | "latin2" => Encoding::Iso8859_2,
            "csisolatin3" | "iso-8859-3" | "iso-ir-109" | "iso8859-3" | "iso88593" | "iso_8859-3"
            | "iso_8859-3:1988" | "l3" | "latin3" => Encoding::Iso8859_3,
            "csisolatin4" | "iso-8859-4" | "iso-ir-110" | "iso8859-4" | "iso88594" | "iso_8859-4"
            | "iso_8859-4:1988" | "l4" | "latin4" => Encoding::Iso8859_4,
            "csisolatincyrillic" | "cyrillic" | "iso-8859-5" | "iso-ir-144" | "iso8859-5"
            | "iso88595" | "iso_8859-5" | "iso_8859-5:1988" => Encoding::Iso8859_5,
            "arabic" | "asmo-708" | "csiso88596e" | "csiso88596i" | "csisolatinarabic"
            | "ecma-114" | "iso-8859-6" | "iso-8859-6-e" | "iso-8859-6-i" | "iso-ir-127"
            | "iso8859-6" | "iso88596" | "iso_8859-6" | "iso_8859-6:1987" => Encoding::Iso8859_6,
            "csisolatingreek" | "ecma-118" | "elot_928" | "greek" | "greek8" | "iso-8859-7"
            | "iso-ir-126" | "iso8859-7" | "iso88597" | "iso_8859-7" | "iso_8859-7:1987"
            | "sun_eu_greek" => Encoding::Iso8859_7,
            "csiso88598e" | "csisolatinhebrew" | "hebrew" | "iso-8859-8" | "iso-8859-8-e"
            | "iso-ir-138" | "iso8859-8" | "iso88598" | "iso_8859-8" | "iso_8859-8:1988"
            | "visual" => Encoding::Iso8859_8,
            "csiso88598i" | "iso-8859-8-i" | "logical" => Encoding::Iso8859_8I,
            "csisolatin6" | "iso-8859-10" | "iso-ir-157" | "iso8859-10" | "iso885910" | "l6"
            | "latin6" => Encoding::Iso8859_10,
            "iso-8859-13" | "iso8859-13" | "iso885913" => Encoding::Iso8859_13,
            "iso-8859-14" | "iso8859-14" | "iso885914" => Encoding::Iso8859_14,
            "csisolatin9" | "iso-8859-15" | "iso8859-15" | "iso885915" | "iso_8859-15" | "l9" => {
                Encoding::Iso8859_15
            }
            "iso-8859-16" => Encoding::Iso8859_16,
            "cskoi8r" | "koi" | "koi8" | "koi8-r" | "koi8_r" => Encoding::Koi8R,
            "koi8-ru" | "koi8-u" => Encoding::Koi8U,
            "csmacintosh" | "mac" | "macintosh" | "x-mac-roman" => Encoding::Macintosh,
            "dos-874" | "iso-8859-11" | "iso8859-11" | "iso885911" | "tis-620" | "windows-874" => {
                Encoding::Windows874
            }
            "cp1250" | "windows-1250" | "x-cp1250" => Encoding::Windows1250,
            "cp1251" | "windows-1251" | "x-cp1251" => Encoding::Windows1251,
            // ascii and iso-8859-1 deliberately alias windows-1252
            "ansi_x3.4-1968" | "ascii" | "cp1252" | "cp819" | "csisolatin1" | "ibm819"
            | "iso-8859-1" | "iso-ir-100" | "iso8859-1" | "iso88591" | "iso_8859-1"
            | "iso_8859-1:1987" | "l1" | "latin1" | "us-ascii" | "windows-1252" | "x-cp1252" => {
                Encoding::Windows1252
            }
            "cp1253" | "windows-1253" | "x-cp1253" => Encoding::Windows1253,
            "cp1254" | "csisolatin5" | "iso-8859-9" | "iso-ir-148" | "iso8859-9" | "iso88599"
            | "iso_8859-9" | "iso_8859-9:1989" | "l5" | "latin5" | "windows-1254" | "x-cp1254" => {
                Encoding::Windows1254
            }
            "cp1255" | "windows-1255" | "x-cp1255" => Encoding::Windows1255,
            "cp1256" | "windows-1256" | "x-cp1256" => Encoding::Windows1256,
            "cp1257" | "windows-1257" | "x-cp1257" => Encoding::Windows1257,
            "cp1258" | "windows-1258" | "x-cp1258" => Encoding::Windows1258,
            "x-mac-cyrillic" | "x-mac-ukrainian" => Encoding::XMacCyrillic,

            // -- Legacy multi-byte encodings --------------------------
            "chinese" | "csgb2312" | "csiso58gb231280" | "gb2312" | "gb_2312" | "gb_2312-80"
            | "gbk" | "iso-ir-58" | "x-gbk" => Encoding::Gbk,
            "gb18030" => Encoding::Gb18030,
            "big5" | "big5-hkscs" | "cn-big5" | "csbig5" | "x-x-big5" => Encoding::Big5,
            "cseucpkdfmtjapanese" | "euc-jp" | "x-euc-jp" => Encoding::EucJp,
            "csiso2022jp" | "iso-2022-jp" => Encoding::Iso2022Jp,
            "csshiftjis" | "ms932" | "ms_kanji" | "shift-jis" | "shift_jis" | "sjis"
            | "windows-31j" | "x-sjis" => Encoding::ShiftJis,
            "cseuckr" | "csksc56011987" | "euc-kr" | "iso-ir-149" | "korean"
            | "ks_c_5601-1987" | "ks_c_5601-1989" | "ksc5601" | "ksc_5601" | "windows-949" => {
                Encoding::EucKr
            }

            // -- Everything else --------------------------------------
            "csiso2022kr" | "hz-gb-2312" | "iso-2022-cn" | "iso-2022-cn-ext" | "iso-2022-kr"
            | "replacement" => Encoding::Replacement,
            "unicodefffe" | "utf-16be" => Encoding::Utf16Be,
            "csunicode" | "iso-10646-ucs-2" | "ucs-2" | "unicode" | "unicodefeff" | "utf-16"
            | "utf-16le" => Encoding::Utf16Le,
            "x-user-defined" => Encoding::XUserDefined,

            _ => return None,
        })
    }

    /// The canonical WHATWG name, e.g. `"Shift_JIS"` or `"windows-1252"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Ibm866 => "IBM866",
            Encoding::Iso8859_2 => "ISO-8859-2",
            Encoding::Iso8859_3 => "ISO-8859-3",
            Encoding::Iso8859_4 => "ISO-8859-4",
            Encoding::Iso8859_5 => "ISO-8859-5",
            Encoding::Iso8859_6 => "ISO-8859-6",
            Encoding::Iso8859_7 => "ISO-8859-7",
            Encoding::Iso8859_8 => "ISO-8859-8",
            Encoding::Iso8859_8I => "ISO-8859-8-I",
            Encoding::Iso8859_10 => "ISO-8859-10",
            Encoding::Iso8859_13 => "ISO-8859-13",
            Encoding::Iso8859_14 => "ISO-8859-14",
            Encoding::Iso8859_15 => "ISO-8859-15",
            Encoding::Iso8859_16 => "ISO-8859-16",
            Encoding::Koi8R => "KOI8-R",
            Encoding::Koi8U => "KOI8-U",
            Encoding::Macintosh => "macintosh",
            Encoding::Windows874 => "windows-874",
            Encoding::Windows1250 => "windows-1250",
            Encoding::Windows1251 => "windows-1251",
            Encoding::Windows1252 => "windows-1252",
            Encoding::Windows1253 => "windows-1253",
            Encoding::Windows1254 => "windows-1254",
            Encoding::Windows1255 => "windows-1255",
            Encoding::Windows1256 => "windows-1256",
            Encoding::Windows1257 => "windows-1257",
            Encoding::Windows1258 => "windows-1258",
            Encoding::XMacCyrillic => "x-mac-cyrillic",
            Encoding::Gbk => "GBK",
            Encoding::Gb18030 => "gb18030",
            Encoding::Big5 => "Big5",
            Encoding::EucJp => "EUC-JP",
            Encoding::Iso2022Jp => "ISO-2022-JP",
            Encoding::ShiftJis => "Shift_JIS",
            Encoding::EucKr => "EUC-KR",
            Encoding::Replacement => "replacement",
            Encoding::Utf16Be => "UTF-16BE",
            Encoding::Utf16Le => "UTF-16LE",
            Encoding::XUserDefined => "x-user-defined",
        }
    }

    /// Whether every byte below `0x80` decodes to the identical ASCII code
    /// point. Only ISO-2022-JP, UTF-16 and `replacement` are not.
    #[must_use]
    pub fn is_ascii_superset(self) -> bool {
        !matches!(
            self,
            Encoding::Iso2022Jp | Encoding::Utf16Be | Encoding::Utf16Le | Encoding::Replacement
        )
    }

    /// The multi-byte engine behind this encoding, if it has one.
    #[must_use]
    pub fn legacy(self) -> Option<LegacyEncoding> {
        match self.family() {
            Family::Legacy(legacy) => Some(legacy),
            _ => None,
        }
    }

    pub(crate) fn family(self) -> Family {
        match self {
            Encoding::Utf8 => Family::Utf8,
            Encoding::Utf16Be => Family::Utf16 { big_endian: true },
            Encoding::Utf16Le => Family::Utf16 { big_endian: false },
            Encoding::XUserDefined => Family::XUserDefined,
            Encoding::Replacement => Family::Replacement,
            Encoding::Gbk => Family::Legacy(LegacyEncoding::Gbk),
            Encoding::Gb18030 => Family::Legacy(LegacyEncoding::Gb18030),
            Encoding::Big5 => Family::Legacy(LegacyEncoding::Big5),
            Encoding::EucJp => Family::Legacy(LegacyEncoding::EucJp),
            Encoding::Iso2022Jp => Family::Legacy(LegacyEncoding::Iso2022Jp),
            Encoding::ShiftJis => Family::Legacy(LegacyEncoding::ShiftJis),
            Encoding::EucKr => Family::Legacy(LegacyEncoding::EucKr),
            single => match SINGLE_BYTE.iter().position(|&e| e == single) {
                Some(slot) => Family::SingleByte(slot),
                None => unreachable!("{} has no family", single.name()),
            },
        }
    }

    /// Encodes `text` strictly, failing on the first unmappable code point.
    ///
    /// UTF-16 encodings produce code units without a byte order mark.
    ///
    /// # Errors
    ///
    /// [`Error::Unmappable`] when a code point has no representation, and
    /// for every input to the `replacement` encoding.
    pub fn encode(self, text: &str) -> Result<Vec<u8>, Error> {
        match self.family() {
            Family::Utf8 => Ok(text.as_bytes().to_vec()),
            Family::Utf16 { big_endian } => Ok(unicode::encode_utf16(text, big_endian)),
            Family::SingleByte(slot) => single_byte::encode(slot, text),
            Family::XUserDefined => single_byte::encode_x_user_defined(text),
            Family::Legacy(legacy) => legacy.new_encoder().encode(text),
            Family::Replacement => match text.chars().next() {
                Some(code_point) => Err(Error::Unmappable {
                    encoding: self.name(),
                    code_point,
                }),
                None => Ok(Vec::new()),
            },
        }
    }
}

impl core::fmt::Display for Encoding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

// Serialized as the canonical name; deserialized through label resolution.
#[cfg(any(test, feature = "serde"))]
mod serde_impls {
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

    use super::Encoding;

    impl Serialize for Encoding {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.name())
        }
    }

    impl<'de> Deserialize<'de> for Encoding {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            let label = String::deserialize(deserializer)?;
            Encoding::for_label(&label)
                .ok_or_else(|| de::Error::custom(format_args!("unknown encoding label {label:?}")))
        }
    }
}
