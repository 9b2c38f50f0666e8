#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

//! Property-based tests: decode ∘ encode is the identity.

use cachette_stego::{decode, decode_chunked, encode, encode_chunked, Raster};
use proptest::prelude::*;

fn flat_cover(width: u32, height: u32) -> Raster {
    Raster::filled(width, height, [100, 110, 120, 255]).expect("cover should build")
}

proptest! {
    /// Any payload that fits a 100x100 cover survives the roundtrip.
    #[test]
    fn encode_decode_identity(payload in proptest::collection::vec(any::<u8>(), 0..1500)) {
        let stego = encode(&flat_cover(100, 100), &payload).unwrap();
        let decoded = decode(&stego).unwrap();
        prop_assert_eq!(decoded, payload);
    }

    /// Chunked encode/decode is the identity whenever enough covers exist.
    #[test]
    fn chunked_identity(
        payload in proptest::collection::vec(any::<u8>(), 0..600),
        chunk_size in 50usize..300,
    ) {
        let needed = payload.len().div_ceil(chunk_size).max(1);
        let covers: Vec<Raster> = (0..needed).map(|_| flat_cover(64, 64)).collect();

        let stegos = encode_chunked(&payload, &covers, chunk_size).unwrap();
        prop_assert_eq!(stegos.len(), needed);

        let decoded = decode_chunked(&stegos).unwrap();
        prop_assert_eq!(decoded, payload);
    }

    /// The carrier never drifts more than one LSB per channel byte.
    #[test]
    fn carrier_stays_within_one_lsb(payload in proptest::collection::vec(any::<u8>(), 0..800)) {
        let cover = flat_cover(80, 80);
        let stego = encode(&cover, &payload).unwrap();
        for (before, after) in cover.pixels().iter().zip(stego.pixels()) {
            prop_assert!(before ^ after <= 1);
        }
    }

    /// Dimensions are always preserved.
    #[test]
    fn dimensions_preserved(width in 20u32..60, height in 20u32..60) {
        let cover = flat_cover(width, height);
        let stego = encode(&cover, b"dim").unwrap();
        prop_assert_eq!(stego.width(), width);
        prop_assert_eq!(stego.height(), height);
    }
}
