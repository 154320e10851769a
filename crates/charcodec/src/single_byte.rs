//! Single-byte encodings and `x-user-defined`.

use crate::{Error, encoding::SINGLE_BYTE, tables};

/// Decodes `bytes` with the single-byte encoding in `slot`. Unmapped bytes
/// yield `None` when `fatal` and U+FFFD otherwise.
pub(crate) fn decode(slot: usize, bytes: &[u8], fatal: bool) -> Option<String> {
    let table = tables::single_byte(slot);
    let mut output = String::with_capacity(bytes.len());
    for &byte in bytes {
        match table.decode(byte) {
            Some(c) => output.push(c),
            None if fatal => return None,
            None => output.push(char::REPLACEMENT_CHARACTER),
        }
    }
    Some(output)
}

/// Encodes `text` with the single-byte encoding in `slot`.
pub(crate) fn encode(slot: usize, text: &str) -> Result<Vec<u8>, Error> {
    let table = tables::single_byte(slot);
    text.chars()
        .map(|code_point| {
            table.encode(code_point).ok_or(Error::Unmappable {
                encoding: SINGLE_BYTE[slot].name(),
                code_point,
            })
        })
        .collect()
}

/// `x-user-defined` maps `0x80..=0xFF` onto U+F780..=U+F7FF.
#[inline]
pub(crate) fn decode_x_user_defined(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&byte| {
            if byte.is_ascii() {
                char::from(byte)
            } else {
                char::from_u32(0xF780 + u32::from(byte - 0x80))
                    .unwrap_or(char::REPLACEMENT_CHARACTER)
            }
        })
        .collect()
}

#[allow(clippy::cast_possible_truncation)]
pub(crate) fn encode_x_user_defined(text: &str) -> Result<Vec<u8>, Error> {
    text.chars()
        .map(|code_point| match u32::from(code_point) {
            ascii @ 0x00..=0x7F => Ok(ascii as u8),
            user @ 0xF780..=0xF7FF => Ok((user - 0xF780 + 0x80) as u8),
            _ => Err(Error::Unmappable {
                encoding: "x-user-defined",
                code_point,
            }),
        })
        .collect()
}
