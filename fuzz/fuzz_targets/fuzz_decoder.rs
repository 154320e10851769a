#![no_main]
use std::cell::RefCell;

use arbitrary::{Arbitrary, Unstructured};
use charcodec::{DecodeOptions, DecoderOptions, Encoding, Error, TextDecoder};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

const HEADER: usize = 16; // encoding, options and split seed

thread_local! {
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

/// Byte sequences that reach the deeper states of the decoders: escape
/// sequences, four-byte gb18030 codes, Big5 pairs, byte order marks and
/// surrogate pairs.
static FRAGMENTS: &[&[u8]] = &[
    b"\x1b$B",
    b"\x1b$@",
    b"\x1b(B",
    b"\x1b(J",
    b"\x1b(I",
    b"\x1b",
    b"00",
    b"\x81\x30\x81\x30",
    b"\x84\x31\xa4\x37",
    b"\x90\x30\x81\x30",
    b"\x88\x62",
    b"\xf9\xf9",
    b"\x8f\xb0\xa1",
    b"\x8e\xb1",
    b"\x93\xfa",
    b"\xef\xbb\xbf",
    b"\xff\xfe",
    b"\xfe\xff",
    b"\x3d\xd8\x00\xde",
    b"\xf0\x9f\x98\x80",
    b"\xe2\x82",
];

fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if max_size <= HEADER {
        return fuzzer_mutate(data, size, max_size);
    }
    if size < HEADER || seed.is_multiple_of(10) {
        with_rng(|rng| rng.fill_bytes(&mut data[..HEADER]));
        let target = with_rng(|rng| rng.random_range(HEADER..=max_size));
        let mut len = HEADER;
        while len < target {
            let written = append_fragment(&mut data[len..target]);
            if written == 0 {
                break;
            }
            len += written;
        }
        len
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Appends one fragment, or one random byte, if it fits in `buf`.
fn append_fragment(buf: &mut [u8]) -> usize {
    with_rng(|rng| {
        if buf.is_empty() {
            return 0;
        }
        if rng.random_bool(0.25) {
            buf[0] = rng.random();
            return 1;
        }
        let fragment = FRAGMENTS[rng.random_range(0..FRAGMENTS.len())];
        if fragment.len() > buf.len() {
            return 0;
        }
        buf[..fragment.len()].copy_from_slice(fragment);
        fragment.len()
    })
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

fn decoder(data: &[u8]) {
    let mut u = Unstructured::new(data);
    let Ok((encoding, options, split_seed)) = <(Encoding, DecoderOptions, u64)>::arbitrary(&mut u)
    else {
        return;
    };
    let bytes = u.take_rest();

    let whole = TextDecoder::with_encoding(encoding, options).decode(bytes, DecodeOptions::default());

    let chunked = decode_chunked(
        TextDecoder::with_encoding(encoding, options),
        bytes,
        split_seed,
    );

    assert_eq!(whole, chunked, "{encoding} {options:?}");

    if let Ok(text) = whole {
        // Encoders must refuse cleanly, never panic.
        let _ = encoding.encode(&text);
    }
}

fuzz_target!(|data: &[u8]| decoder(data));

/// Streams `bytes` through `session` and flushes it, stopping at the first
/// error.
fn decode_chunked(mut session: TextDecoder, bytes: &[u8], split_seed: u64) -> Result<String, Error> {
    let mut text = String::new();
    for chunk in split_into_chunks(bytes, split_seed) {
        text += &session.decode(chunk, DecodeOptions::STREAM)?;
    }
    text += &session.decode(b"", DecodeOptions::default())?;
    Ok(text)
}

/// Split `bytes` into chunks of at least one byte, sized by `split_seed`.
fn split_into_chunks(bytes: &[u8], split_seed: u64) -> Vec<&[u8]> {
    let mut chunks = Vec::new();
    let mut rest = bytes;
    let mut seed = split_seed;
    while !rest.is_empty() {
        let size = (seed as usize % rest.len()) + 1;
        let (chunk, tail) = rest.split_at(size);
        chunks.push(chunk);
        rest = tail;
        seed = seed.rotate_left(7) ^ 0x9E37_79B9_7F4A_7C15;
    }
    chunks
}
