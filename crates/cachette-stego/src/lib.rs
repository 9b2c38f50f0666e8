//! `cachette-stego` — least-significant-bit raster steganography.
//!
//! Embeds arbitrary bytes into the LSBs of an RGBA8 raster's R, G, and B
//! channels: the payload is zlib-compressed, prefixed with a 32-bit
//! little-endian length, and written MSB-first in raster-scan order.
//! Payloads larger than one cover chunk across an ordered list of covers.
//!
//! The codec only works on lossless carriers — if the host re-encodes the
//! resulting raster with a lossy format (JPEG), every embedded bit is
//! destroyed. No I/O, no image container parsing, no logging.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod chunking;
pub mod codec;
pub mod error;
pub mod raster;

pub use chunking::{decode_chunked, encode_chunked, DEFAULT_CHUNK_SIZE};
pub use codec::{decode, encode};
pub use error::StegoError;
pub use raster::{Raster, CHANNELS, LSB_CHANNELS};
