//! Fixed container byte layout.
//!
//! ```text
//! offset   size    field
//! 0        32      DeviceTag   (keyed BLAKE3 of bytes 32..)
//! 32       1024    SaltTable   (64 × 16)
//! 1056     524288  BlockTable  (64 × 8192)
//! total    525344
//! ```
//!
//! The layout is headerless and size-invariant: every container is exactly
//! [`CONTAINER_LEN`] bytes no matter how many slots carry payloads. Each
//! block slot holds either a full-width sealed frame
//! (`nonce(24) ‖ ciphertext(8152) ‖ tag(16)`) or 8192 uniformly random
//! decoy bytes; nothing in the layout distinguishes the two.

use crate::device::DEVICE_TAG_LEN;
use crate::error::ContainerError;
use crate::kdf::SALT_LEN;
use crate::symmetric::{NONCE_LEN, TAG_LEN};

/// Number of salt slots and block slots.
pub const SLOT_COUNT: usize = 64;

/// Size of one block slot in bytes.
pub const BLOCK_SIZE: usize = 8192;

/// Size of the salt table in bytes.
pub const SALT_TABLE_LEN: usize = SLOT_COUNT * SALT_LEN;

/// Size of the block table in bytes.
pub const BLOCK_TABLE_LEN: usize = SLOT_COUNT * BLOCK_SIZE;

/// Exact size of a container in bytes.
pub const CONTAINER_LEN: usize = DEVICE_TAG_LEN + SALT_TABLE_LEN + BLOCK_TABLE_LEN;

/// Maximum plaintext length per slot: the sealed frame must fill the
/// block exactly, so the message (after zero-padding) plus nonce and tag
/// equals [`BLOCK_SIZE`].
pub const MAX_MESSAGE_LEN: usize = BLOCK_SIZE - NONCE_LEN - TAG_LEN;

/// Borrowed view over a container's three regions.
#[derive(Clone, Copy, Debug)]
pub struct ContainerView<'a> {
    device_tag: &'a [u8; DEVICE_TAG_LEN],
    body: &'a [u8],
}

impl<'a> ContainerView<'a> {
    /// Split container bytes into tag and body regions.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::Corrupted`] unless the input is exactly
    /// [`CONTAINER_LEN`] bytes.
    pub fn parse(container: &'a [u8]) -> Result<Self, ContainerError> {
        if container.len() != CONTAINER_LEN {
            return Err(ContainerError::Corrupted(format!(
                "container must be exactly {CONTAINER_LEN} bytes, got {}",
                container.len()
            )));
        }

        let (tag, body) = container.split_at(DEVICE_TAG_LEN);
        let device_tag: &[u8; DEVICE_TAG_LEN] = tag
            .try_into()
            .map_err(|_| ContainerError::Corrupted("device tag region unreadable".into()))?;

        Ok(Self { device_tag, body })
    }

    /// The 32-byte device tag.
    #[must_use]
    pub const fn device_tag(&self) -> &'a [u8; DEVICE_TAG_LEN] {
        self.device_tag
    }

    /// The MAC input: `SaltTable ‖ BlockTable`.
    #[must_use]
    pub const fn body(&self) -> &'a [u8] {
        self.body
    }

    /// The 64 × 16-byte salt table.
    #[must_use]
    pub fn salt_table(&self) -> &'a [u8] {
        &self.body[..SALT_TABLE_LEN]
    }

    /// The 64 × 8192-byte block table.
    #[must_use]
    pub fn block_table(&self) -> &'a [u8] {
        &self.body[SALT_TABLE_LEN..]
    }

    /// Iterate over the 64 salts in slot order.
    pub fn salts(&self) -> impl Iterator<Item = &'a [u8]> {
        self.salt_table().chunks_exact(SALT_LEN)
    }

    /// Iterate over the 64 blocks in slot order.
    pub fn blocks(&self) -> impl Iterator<Item = &'a [u8]> {
        self.block_table().chunks_exact(BLOCK_SIZE)
    }

    /// The salt at `index`, or `None` if out of range.
    #[must_use]
    pub fn salt(&self, index: usize) -> Option<&'a [u8]> {
        self.salts().nth(index)
    }

    /// The block at `index`, or `None` if out of range.
    #[must_use]
    pub fn block(&self, index: usize) -> Option<&'a [u8]> {
        self.blocks().nth(index)
    }
}

/// Concatenate the three regions into fresh container bytes.
///
/// # Errors
///
/// Returns [`ContainerError::Corrupted`] if either table has the wrong
/// length.
pub fn assemble(
    device_tag: &[u8; DEVICE_TAG_LEN],
    salt_table: &[u8],
    block_table: &[u8],
) -> Result<Vec<u8>, ContainerError> {
    if salt_table.len() != SALT_TABLE_LEN {
        return Err(ContainerError::Corrupted(format!(
            "salt table must be {SALT_TABLE_LEN} bytes, got {}",
            salt_table.len()
        )));
    }
    if block_table.len() != BLOCK_TABLE_LEN {
        return Err(ContainerError::Corrupted(format!(
            "block table must be {BLOCK_TABLE_LEN} bytes, got {}",
            block_table.len()
        )));
    }

    let mut out = Vec::with_capacity(CONTAINER_LEN);
    out.extend_from_slice(device_tag);
    out.extend_from_slice(salt_table);
    out.extend_from_slice(block_table);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
