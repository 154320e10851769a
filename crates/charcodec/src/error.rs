use thiserror::Error;

/// The JavaScript error class a failure surfaces as in the WHATWG API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// `RangeError`: the requested encoding does not exist.
    Range,
    /// `TypeError`: malformed input or an unmappable code point.
    Type,
}

/// Errors produced while resolving encodings, decoding or encoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The label does not name a supported encoding.
    #[error("the encoding label provided ('{0}') is invalid")]
    UnknownEncoding(String),

    /// Fatal mode met a byte sequence with no valid interpretation.
    #[error("the encoded data was not valid for encoding {encoding}")]
    Malformed {
        /// WHATWG name of the encoding being decoded.
        encoding: &'static str,
    },

    /// The code point has no representation in the target encoding.
    #[error("code point U+{:04X} is not representable in {encoding}", u32::from(*.code_point))]
    Unmappable {
        /// WHATWG name of the encoding being encoded to.
        encoding: &'static str,
        /// The offending scalar value.
        code_point: char,
    },
}

impl Error {
    /// Returns the JavaScript error class this error maps to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownEncoding(_) => ErrorKind::Range,
            Error::Malformed { .. } | Error::Unmappable { .. } => ErrorKind::Type,
        }
    }
}
