//! Multi-image chunking.
//!
//! Payloads larger than one cover's capacity are split into fixed-size
//! chunks, one per cover, each embedded with the single-image codec.
//! Chunks carry no header: reassembly relies entirely on the caller
//! preserving list order between encode and decode.

use crate::codec;
use crate::error::StegoError;
use crate::raster::Raster;

/// Default chunk size in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 200_000;

/// Split a payload into `chunk_size`-byte chunks and embed the k-th chunk
/// into the k-th cover. Returns exactly as many rasters as there are
/// chunks; surplus covers are left unused.
///
/// An empty payload still produces one carrier so that decode recovers an
/// empty payload rather than nothing.
///
/// # Errors
///
/// Returns [`StegoError::DataTooLarge`] if `chunk_size` is zero or the
/// chunk count exceeds the number of covers, and any single-image
/// [`codec::encode`] error unchanged.
pub fn encode_chunked(
    payload: &[u8],
    covers: &[Raster],
    chunk_size: usize,
) -> Result<Vec<Raster>, StegoError> {
    if chunk_size == 0 {
        return Err(StegoError::DataTooLarge(
            "chunk size must be greater than zero".into(),
        ));
    }

    let empty: &[u8] = &[];
    let chunks: Vec<&[u8]> = if payload.is_empty() {
        vec![empty]
    } else {
        payload.chunks(chunk_size).collect()
    };

    if chunks.len() > covers.len() {
        return Err(StegoError::DataTooLarge(format!(
            "payload needs {} carrier images but only {} were provided",
            chunks.len(),
            covers.len()
        )));
    }

    chunks
        .iter()
        .zip(covers)
        .map(|(chunk, cover)| codec::encode(cover, chunk))
        .collect()
}

/// Concatenate the single-image decodes of `stegos` in order.
///
/// # Errors
///
/// Propagates the first [`codec::decode`] failure unchanged.
pub fn decode_chunked(stegos: &[Raster]) -> Result<Vec<u8>, StegoError> {
    let mut payload = Vec::new();
    for stego in stegos {
        payload.extend_from_slice(&codec::decode(stego)?);
    }
    Ok(payload)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
