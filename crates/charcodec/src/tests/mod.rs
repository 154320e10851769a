mod property_streaming;
mod round_trip;

use crate::{DecodeOptions, DecoderOptions, Encoding, Error, TextDecoder};

/// Encodings a `TextDecoder` can be opened for.
pub(crate) fn decodable() -> impl Iterator<Item = Encoding> {
    Encoding::ALL
        .into_iter()
        .filter(|&encoding| encoding != Encoding::Replacement)
}

pub(crate) fn open(encoding: Encoding, fatal: bool) -> TextDecoder {
    TextDecoder::with_encoding(
        encoding,
        DecoderOptions {
            fatal,
            ..Default::default()
        },
    )
}

/// Decodes `bytes` in one non-streaming call.
pub(crate) fn decode_whole(encoding: Encoding, fatal: bool, bytes: &[u8]) -> Result<String, Error> {
    open(encoding, fatal).decode(bytes, DecodeOptions::default())
}

/// Decodes `bytes` as streaming chunks cut according to `splits`, followed
/// by an empty non-streaming call. Stops at the first error.
pub(crate) fn decode_chunked(
    encoding: Encoding,
    fatal: bool,
    bytes: &[u8],
    splits: &[usize],
) -> Result<String, Error> {
    let mut decoder = open(encoding, fatal);
    let mut text = String::new();
    let mut rest = bytes;
    for &split in splits {
        if rest.is_empty() {
            break;
        }
        let (chunk, tail) = rest.split_at(split % (rest.len() + 1));
        text += &decoder.decode(chunk, DecodeOptions::STREAM)?;
        rest = tail;
    }
    text += &decoder.decode(rest, DecodeOptions::STREAM)?;
    text += &decoder.decode(b"", DecodeOptions::default())?;
    Ok(text)
}

/// Quickcheck iteration count, scaled up on CI.
pub(crate) fn iterations() -> u64 {
    #[cfg(not(any(miri, feature = "test-fast")))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(any(miri, feature = "test-fast"))]
    let tests = 10;
    tests
}
