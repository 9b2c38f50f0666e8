//! Single-image LSB encode/decode.
//!
//! The embedded stream is `u32le(|C|) ‖ C` where `C` is the
//! zlib-compressed payload. Bits are taken MSB-first from each byte and
//! written to the least significant bit of the R, G, and B channels in
//! raster-scan order; alpha bytes are skipped and preserved verbatim.

use crate::error::StegoError;
use crate::raster::{Raster, CHANNELS, LSB_CHANNELS};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

/// Bytes of the little-endian length prefix.
const LENGTH_PREFIX_LEN: usize = 4;

/// Embed a payload into a copy of the cover raster.
///
/// Only channel LSBs change: for every byte of the output,
/// `out ^ cover ∈ {0, 1}`, so the result is visually indistinguishable
/// from the cover.
///
/// # Errors
///
/// Returns [`StegoError::CompressionFailed`] if zlib fails and
/// [`StegoError::ImageTooSmall`] if the prefixed compressed stream does
/// not fit in `3 · W · H` bits.
pub fn encode(cover: &Raster, payload: &[u8]) -> Result<Raster, StegoError> {
    let compressed = compress(payload)?;
    let prefix = u32::try_from(compressed.len()).map_err(|_| {
        StegoError::CompressionFailed("compressed payload exceeds u32 range".into())
    })?;

    let mut embedded = Vec::with_capacity(LENGTH_PREFIX_LEN.saturating_add(compressed.len()));
    embedded.extend_from_slice(&prefix.to_le_bytes());
    embedded.extend_from_slice(&compressed);

    let needed_bits = embedded.len().saturating_mul(8);
    if needed_bits > cover.capacity_bits() {
        return Err(StegoError::ImageTooSmall(format!(
            "payload needs {needed_bits} bits but the cover holds {}",
            cover.capacity_bits()
        )));
    }

    let mut pixels = cover.pixels().to_vec();
    for (channel, bit) in lsb_channels_mut(&mut pixels).zip(msb_bits(&embedded)) {
        *channel = (*channel & !1) | bit;
    }
    Raster::new(cover.width(), cover.height(), pixels)
}

/// Extract a payload embedded by [`encode`].
///
/// # Errors
///
/// Returns [`StegoError::DataExtractionFailed`] if the raster is too
/// small for the length prefix, the prefix points past the raster's
/// capacity, or the extracted bytes do not inflate as a zlib stream.
pub fn decode(stego: &Raster) -> Result<Vec<u8>, StegoError> {
    let mut bits = lsb_channels(stego.pixels()).map(|channel| channel & 1);

    let prefix = take_bytes(&mut bits, LENGTH_PREFIX_LEN).ok_or_else(|| {
        StegoError::DataExtractionFailed("raster too small for length prefix".into())
    })?;
    let compressed_len = usize::try_from(u32::from_le_bytes([
        prefix[0], prefix[1], prefix[2], prefix[3],
    ]))
    .map_err(|_| StegoError::DataExtractionFailed("length prefix exceeds usize".into()))?;

    // Bound the claimed length against the raster before allocating.
    let needed_bits = LENGTH_PREFIX_LEN
        .saturating_add(compressed_len)
        .saturating_mul(8);
    if needed_bits > stego.capacity_bits() {
        return Err(StegoError::DataExtractionFailed(format!(
            "length prefix claims {compressed_len} bytes beyond raster capacity"
        )));
    }

    let compressed = take_bytes(&mut bits, compressed_len).ok_or_else(|| {
        StegoError::DataExtractionFailed("bit stream ended before the declared length".into())
    })?;

    decompress(&compressed)
}

// ---------------------------------------------------------------------------
// Bit plumbing
// ---------------------------------------------------------------------------

/// Payload bits, MSB-first within each byte.
fn msb_bits(bytes: &[u8]) -> impl Iterator<Item = u8> + '_ {
    const MASKS: [u8; 8] = [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01];
    bytes
        .iter()
        .flat_map(|&byte| MASKS.iter().map(move |&mask| u8::from(byte & mask != 0)))
}

/// R, G, B channel bytes in raster-scan order, skipping alpha.
fn lsb_channels(pixels: &[u8]) -> impl Iterator<Item = u8> + '_ {
    pixels
        .chunks_exact(CHANNELS)
        .flat_map(|px| px.iter().take(LSB_CHANNELS).copied())
}

/// Mutable variant of [`lsb_channels`].
fn lsb_channels_mut(pixels: &mut [u8]) -> impl Iterator<Item = &mut u8> {
    pixels
        .chunks_exact_mut(CHANNELS)
        .flat_map(|px| px.iter_mut().take(LSB_CHANNELS))
}

/// Assemble `count` bytes from a bit stream, MSB-first. `None` if the
/// stream runs dry.
fn take_bytes(bits: &mut impl Iterator<Item = u8>, count: usize) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte = (byte << 1) | bits.next()?;
        }
        out.push(byte);
    }
    Some(out)
}

// ---------------------------------------------------------------------------
// Compression
// ---------------------------------------------------------------------------

fn compress(payload: &[u8]) -> Result<Vec<u8>, StegoError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(payload)
        .map_err(|e| StegoError::CompressionFailed(format!("zlib deflate failed: {e}")))?;
    encoder
        .finish()
        .map_err(|e| StegoError::CompressionFailed(format!("zlib finish failed: {e}")))
}

fn decompress(compressed: &[u8]) -> Result<Vec<u8>, StegoError> {
    let mut payload = Vec::new();
    ZlibDecoder::new(compressed)
        .read_to_end(&mut payload)
        .map_err(|e| StegoError::DataExtractionFailed(format!("zlib inflate failed: {e}")))?;
    Ok(payload)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn cover(width: u32, height: u32) -> Raster {
        Raster::filled(width, height, [120, 130, 140, 255]).expect("cover should build")
    }

    #[test]
    fn encode_decode_roundtrip() {
        let payload = b"the quick brown fox jumps over the lazy dog";
        let stego = encode(&cover(64, 64), payload).expect("encode should succeed");
        let decoded = decode(&stego).expect("decode should succeed");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn empty_payload_roundtrip() {
        let stego = encode(&cover(16, 16), &[]).expect("encode should succeed");
        let decoded = decode(&stego).expect("decode should succeed");
        assert!(decoded.is_empty());
    }

    #[test]
    fn encode_changes_only_lsbs() {
        let original = cover(32, 32);
        let stego = encode(&original, b"lsb discipline").expect("encode should succeed");
        for (before, after) in original.pixels().iter().zip(stego.pixels()) {
            assert_eq!(before & !1, after & !1, "only the LSB may change");
        }
    }

    #[test]
    fn encode_preserves_alpha() {
        let original = cover(32, 32);
        let stego = encode(&original, b"alpha untouched").expect("encode should succeed");
        for (before, after) in original
            .pixels()
            .chunks_exact(CHANNELS)
            .zip(stego.pixels().chunks_exact(CHANNELS))
        {
            assert_eq!(before[3], after[3]);
        }
    }

    #[test]
    fn encode_preserves_dimensions() {
        let stego = encode(&cover(20, 30), b"dims").expect("encode should succeed");
        assert_eq!(stego.width(), 20);
        assert_eq!(stego.height(), 30);
    }

    #[test]
    fn first_32_lsbs_are_the_little_endian_length() {
        let payload = b"length prefix check";
        let compressed_len = compress(payload).expect("compress should succeed").len();

        let stego = encode(&cover(32, 32), payload).expect("encode should succeed");
        let mut bits = lsb_channels(stego.pixels()).map(|c| c & 1);
        let prefix = take_bytes(&mut bits, LENGTH_PREFIX_LEN).expect("prefix should be present");
        let embedded_len = u32::from_le_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]);

        assert_eq!(embedded_len as usize, compressed_len);
    }

    #[test]
    fn oversized_payload_is_rejected() {
        // 4x4 → 48 bits of capacity; even an empty zlib stream plus the
        // 32-bit prefix needs more.
        let err = encode(&cover(4, 4), &[0u8; 64]).expect_err("payload should not fit");
        assert!(matches!(err, StegoError::ImageTooSmall(_)));
    }

    #[test]
    fn decode_rejects_raster_smaller_than_prefix() {
        let tiny = Raster::filled(2, 2, [0, 0, 0, 255]).expect("raster should build");
        let err = decode(&tiny).expect_err("12 bits cannot hold a 32-bit prefix");
        assert!(matches!(err, StegoError::DataExtractionFailed(_)));
    }

    #[test]
    fn decode_rejects_length_beyond_capacity() {
        // All-0xFF pixels decode to an enormous length prefix.
        let bogus = Raster::filled(8, 8, [0xFF, 0xFF, 0xFF, 0xFF]).expect("raster should build");
        let err = decode(&bogus).expect_err("length prefix should exceed capacity");
        assert!(matches!(err, StegoError::DataExtractionFailed(_)));
    }

    #[test]
    fn decode_rejects_non_zlib_bits() {
        // A zero length prefix with no stream behind it: zlib sees an
        // empty input and fails to find a header.
        let flat = Raster::filled(8, 8, [0, 0, 0, 255]).expect("raster should build");
        let err = decode(&flat).expect_err("empty zlib stream should fail");
        assert!(matches!(err, StegoError::DataExtractionFailed(_)));
    }

    #[test]
    fn compressible_payload_fits_tight_cover() {
        // 8 KiB of zeros deflates to well under the 16x16 capacity of
        // 768 bits = 96 bytes.
        let payload = vec![0u8; 8192];
        let stego = encode(&cover(16, 16), &payload).expect("compressible payload should fit");
        assert_eq!(decode(&stego).expect("decode should succeed"), payload);
    }

    #[test]
    fn msb_first_bit_order() {
        let bits: Vec<u8> = msb_bits(&[0b1010_0001]).collect();
        assert_eq!(bits, vec![1, 0, 1, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn channel_iterator_skips_alpha() {
        let pixels = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let channels: Vec<u8> = lsb_channels(&pixels).collect();
        assert_eq!(channels, vec![1, 2, 3, 5, 6, 7]);
    }
}
