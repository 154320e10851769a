//! WHATWG-compatible text decoding and encoding.
//!
//! `charcodec` implements the encodings of the
//! [WHATWG Encoding Standard](https://encoding.spec.whatwg.org/): UTF-8,
//! UTF-16LE/BE, the single-byte legacy encodings, and the legacy multi-byte
//! encodings Shift_JIS, EUC-JP, ISO-2022-JP, EUC-KR, Big5, GBK and gb18030.
//!
//! The entry points are:
//! - [`TextDecoder`], a streaming session that accepts input in chunks split
//!   at arbitrary byte boundaries and produces the same text as a single
//!   call would.
//! - [`TextEncoder`] and [`Encoding::encode`] for the reverse direction.
//! - [`MultibyteDecoder`] and [`MultibyteEncoder`] for direct use of the
//!   legacy multi-byte engines.
//!
//! ```rust
//! use charcodec::{DecodeOptions, DecoderOptions, Encoding, TextDecoder};
//!
//! let mut decoder = TextDecoder::new("sjis", DecoderOptions::default())?;
//! let mut text = decoder.decode(b"\x93\xfa", DecodeOptions::STREAM)?;
//! text += &decoder.decode(b"\x96", DecodeOptions::STREAM)?;
//! text += &decoder.decode(b"\x7b", DecodeOptions::default())?;
//! assert_eq!(text, "\u{65E5}\u{672C}");
//!
//! assert_eq!(Encoding::ShiftJis.encode(&text)?, b"\x93\xfa\x96\x7b");
//! # Ok::<(), charcodec::Error>(())
//! ```
//!
//! # Features
//!
//! - `serde`: `Serialize`/`Deserialize` for [`Encoding`] and the option
//!   structs.
//! - `tracing`: debug events for table construction and decode failures.
//! - `fuzzing`: `arbitrary::Arbitrary` for the public enums and options.

#[macro_use]
mod trace;

mod encoding;
mod error;
mod legacy;
mod options;
mod single_byte;
pub mod tables;
mod text_decoder;
mod text_encoder;
mod unicode;

#[cfg(test)]
mod tests;

pub use encoding::Encoding;
pub use error::{Error, ErrorKind};
pub use legacy::{LegacyEncoding, MultibyteDecoder, MultibyteEncoder};
pub use options::{DecodeOptions, DecoderOptions};
pub use text_decoder::TextDecoder;
pub use text_encoder::{EncodeIntoResult, TextEncoder};
