//! UTF-8 and UTF-16 codecs.
//!
//! Decoding is split in two: the caller first asks how many trailing bytes
//! form an unfinished sequence (a "tail") and then decodes the complete part.
//! A tail is never longer than three bytes.

use bstr::ByteSlice;

/// Length of the unfinished UTF-8 sequence at the end of `bytes`.
///
/// Only a prefix that could still become a valid scalar value counts; a
/// sequence that is already ill-formed is left to the decoder, which will
/// replace it regardless of what follows.
#[must_use]
pub(crate) fn utf8_tail_len(bytes: &[u8]) -> usize {
    for back in 1..=bytes.len().min(3) {
        let start = bytes.len() - back;
        let lead = bytes[start];
        if (0x80..=0xBF).contains(&lead) {
            continue;
        }
        let needed = match lead {
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => return 0,
        };
        if back >= needed {
            return 0;
        }
        let second = match lead {
            0xE0 => 0xA0..=0xBF,
            0xED => 0x80..=0x9F,
            0xF0 => 0x90..=0xBF,
            0xF4 => 0x80..=0x8F,
            _ => 0x80..=0xBF,
        };
        let continuation = &bytes[start + 1..];
        let valid = continuation.first().is_none_or(|b| second.contains(b))
            && continuation.iter().skip(1).all(|b| (0x80..=0xBF).contains(b));
        return if valid { back } else { 0 };
    }
    0
}

/// Decodes complete UTF-8. Ill-formed input yields `None` when `fatal`, and
/// one U+FFFD per maximal ill-formed subpart otherwise.
#[must_use]
pub(crate) fn decode_utf8(bytes: &[u8], fatal: bool) -> Option<String> {
    if fatal {
        bytes.to_str().ok().map(str::to_owned)
    } else {
        Some(bytes.to_str_lossy().into_owned())
    }
}

#[inline]
fn code_units(bytes: &[u8], big_endian: bool) -> impl Iterator<Item = u16> + '_ {
    bytes.chunks_exact(2).map(move |pair| {
        let pair = [pair[0], pair[1]];
        if big_endian {
            u16::from_be_bytes(pair)
        } else {
            u16::from_le_bytes(pair)
        }
    })
}

/// Length of the unfinished UTF-16 sequence at the end of `bytes`: an odd
/// byte, plus a trailing high surrogate still waiting for its pair.
#[must_use]
pub(crate) fn utf16_tail_len(bytes: &[u8], big_endian: bool) -> usize {
    let odd = bytes.len() % 2;
    let complete = &bytes[..bytes.len() - odd];
    let pending_surrogate = complete.len() >= 2
        && code_units(&complete[complete.len() - 2..], big_endian)
            .next()
            .is_some_and(|unit| (0xD800..=0xDBFF).contains(&unit));
    odd + if pending_surrogate { 2 } else { 0 }
}

/// Decodes UTF-16 code units; a trailing odd byte is ignored. Unpaired
/// surrogates yield `None` when `fatal` and U+FFFD otherwise.
#[must_use]
pub(crate) fn decode_utf16(bytes: &[u8], big_endian: bool, fatal: bool) -> Option<String> {
    let mut output = String::with_capacity(bytes.len() / 2);
    for decoded in char::decode_utf16(code_units(bytes, big_endian)) {
        match decoded {
            Ok(c) => output.push(c),
            Err(_) if fatal => return None,
            Err(_) => output.push(char::REPLACEMENT_CHARACTER),
        }
    }
    Some(output)
}

/// Encodes `text` as UTF-16 code units without a byte order mark.
#[must_use]
pub(crate) fn encode_utf16(text: &str, big_endian: bool) -> Vec<u8> {
    let mut output = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        output.extend_from_slice(&if big_endian {
            unit.to_be_bytes()
        } else {
            unit.to_le_bytes()
        });
    }
    output
}
