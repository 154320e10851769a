use quickcheck::QuickCheck;

use super::{decodable, decode_chunked, decode_whole, iterations};
use crate::Encoding;

/// Property: cutting the input into streaming chunks at arbitrary byte
/// boundaries produces the same text, or the same failure, as decoding it
/// in one call.
#[test]
fn chunked_equals_whole_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(selector: u8, fatal: bool, bytes: Vec<u8>, splits: Vec<usize>) -> bool {
        let encodings: Vec<Encoding> = decodable().collect();
        let encoding = encodings[usize::from(selector) % encodings.len()];
        let whole = decode_whole(encoding, fatal, &bytes);
        let chunked = decode_chunked(encoding, fatal, &bytes, &splits);
        match (whole, chunked) {
            (Ok(whole), Ok(chunked)) => whole == chunked,
            (Err(whole), Err(chunked)) => whole == chunked,
            _ => false,
        }
    }

    QuickCheck::new()
        .tests(iterations())
        .quickcheck(prop as fn(u8, bool, Vec<u8>, Vec<usize>) -> bool);
}

/// Inputs biased towards lead bytes and escape sequences, which random
/// bytes rarely complete.
#[test]
fn chunked_equals_whole_on_structured_input() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(selector: u8, pieces: Vec<u8>, splits: Vec<usize>) -> bool {
        const PIECES: [&[u8]; 12] = [
            b"\x1b$B",
            b"\x1b(B",
            b"\x1b(J",
            b"\x1b(I",
            b"\x1b",
            b"0",
            b"\x81",
            b"\x30",
            b"\xa1",
            b"\xef\xbb\xbf",
            b"\xff\xfe",
            b"\xd8",
        ];
        let encodings: Vec<Encoding> = decodable().collect();
        let encoding = encodings[usize::from(selector) % encodings.len()];
        let bytes: Vec<u8> = pieces
            .iter()
            .flat_map(|&piece| PIECES[usize::from(piece) % PIECES.len()].iter().copied())
            .collect();
        [false, true].into_iter().all(|fatal| {
            decode_whole(encoding, fatal, &bytes) == decode_chunked(encoding, fatal, &bytes, &splits)
        })
    }

    QuickCheck::new()
        .tests(iterations())
        .quickcheck(prop as fn(u8, Vec<u8>, Vec<usize>) -> bool);
}

#[test]
fn byte_at_a_time() {
    let cases: [(Encoding, &[u8]); 5] = [
        (Encoding::Gb18030, b"a\x81\x30\x81\x30\xd6\xd0\x84\x31\xa4\x37"),
        (Encoding::Iso2022Jp, b"\x1b$B00\x1b(J\\\x1b(B!"),
        (Encoding::Big5, b"\x88\x62\xf9\xf9\xa4"),
        (Encoding::Utf16Le, b"\xff\xfe\x3d\xd8\x00\xde\x41"),
        (Encoding::Utf8, b"\xef\xbb\xbf\xf0\x9f\x98\x80\xe2\x82"),
    ];
    for (encoding, bytes) in cases {
        let splits = vec![1; bytes.len()];
        for fatal in [false, true] {
            assert_eq!(
                decode_whole(encoding, fatal, bytes),
                decode_chunked(encoding, fatal, bytes, &splits),
                "{encoding} fatal={fatal}"
            );
        }
    }
}
