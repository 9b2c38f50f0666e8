//! Deniable container operations.
//!
//! This module provides the stateless public API:
//! - [`create`] — seal up to 64 `(password, message)` payloads into a
//!   fixed-size container, remaining slots filled with decoys
//! - [`decrypt`] — constant-work sweep over all salt × block pairs
//! - [`update`] — re-salt and re-seal one previously located payload
//! - [`reseal`] — rebind a container to the current device key
//! - [`verify_device`] — check the device tag without touching payloads
//!
//! # Deniability model
//!
//! A container always holds 64 salts and 64 blocks. Payload blocks are
//! full-width sealed frames; the rest are uniform random bytes. Salt order
//! is shuffled and block placement is drawn independently, so nothing in
//! the byte layout, and nothing in the work performed by [`decrypt`],
//! reveals which slots are occupied or how many payloads exist.

use crate::device::{self, DeviceKeyProvider, DEVICE_TAG_LEN};
use crate::error::ContainerError;
use crate::kdf::{self, Argon2idParams, SALT_LEN};
use crate::layout::{self, ContainerView, BLOCK_SIZE, MAX_MESSAGE_LEN, SLOT_COUNT};
use crate::memory::SecretKey;
use crate::symmetric;
use rand::rngs::OsRng;
use rand::seq::index;
use rand::seq::SliceRandom;
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use zeroize::Zeroizing;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One `(password, message)` pair to seal into a container.
pub struct PayloadEntry {
    /// Password this payload is derived from.
    pub password: SecretString,
    /// UTF-8 message to seal. At most [`MAX_MESSAGE_LEN`] bytes; must not
    /// end with a NUL byte (trailing NULs are padding and are stripped on
    /// decrypt).
    pub message: SecretString,
}

impl PayloadEntry {
    /// Build an entry from plain strings.
    #[must_use]
    pub fn new(password: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            password: SecretString::from(password.into()),
            message: SecretString::from(message.into()),
        }
    }
}

/// Outcome classification of a [`decrypt`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecryptStatus {
    /// Exactly one `(salt, block)` pair opened under the password.
    Valid,
    /// The device tag does not match the current device key.
    InvalidDevice,
    /// No pair opened — the password matches no payload.
    InvalidPassword,
    /// The container bytes are structurally invalid.
    Corrupted,
}

/// Result of a [`decrypt`] sweep.
///
/// `salt_index` and `block_index` are only meaningful when `status` is
/// [`DecryptStatus::Valid`]; they are the coordinates to hand to
/// [`update`]. The recovered message is wrapped so it is wiped on drop
/// and masked in debug output.
#[derive(Debug)]
pub struct DecryptOutcome {
    /// Sweep classification.
    pub status: DecryptStatus,
    /// Salt slot that derived the successful key.
    pub salt_index: usize,
    /// Block slot that opened.
    pub block_index: usize,
    /// Recovered plaintext (empty unless `status` is `Valid`).
    pub message: SecretString,
}

impl DecryptOutcome {
    fn miss(status: DecryptStatus) -> Self {
        Self {
            status,
            salt_index: 0,
            block_index: 0,
            message: SecretString::from(String::new()),
        }
    }
}

/// Result of a [`verify_device`] check.
#[derive(Clone, Debug)]
pub struct DeviceCheck {
    /// Whether the device tag matches the current device key.
    pub valid: bool,
    /// Human-readable reason when invalid; empty when valid. Never
    /// contains secret material.
    pub reason: String,
}

impl DeviceCheck {
    fn valid() -> Self {
        Self {
            valid: true,
            reason: String::new(),
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

/// Maximum message length per payload, in bytes.
#[must_use]
pub const fn max_message_size() -> usize {
    MAX_MESSAGE_LEN
}

/// Build a container from up to 64 payload entries.
///
/// Every remaining slot is filled with decoy material: random salts and
/// fully random blocks. Salt order is uniformly shuffled; each payload's
/// block slot is a uniformly random unused index drawn independently of
/// its salt position.
///
/// Entries should use distinct passwords: a repeated password derives a
/// key for every matching slot, and the sweep in [`decrypt`] reports only
/// one of them.
///
/// # Errors
///
/// - [`ContainerError::TooManyEntries`] for more than 64 entries
/// - [`ContainerError::OversizedMessage`] if any message exceeds
///   [`max_message_size`]
/// - [`ContainerError::ProviderUnavailable`] if the provider yields no key
/// - [`ContainerError::KeyDerivation`] / [`ContainerError::Crypto`] on
///   primitive failure
///
/// No partial container is ever returned.
pub fn create(
    entries: &[PayloadEntry],
    provider: &impl DeviceKeyProvider,
    params: &Argon2idParams,
) -> Result<Vec<u8>, ContainerError> {
    if entries.len() > SLOT_COUNT {
        return Err(ContainerError::TooManyEntries {
            count: entries.len(),
            max: SLOT_COUNT,
        });
    }
    for entry in entries {
        let len = entry.message.expose_secret().len();
        if len > MAX_MESSAGE_LEN {
            return Err(ContainerError::OversizedMessage {
                len,
                max: MAX_MESSAGE_LEN,
            });
        }
    }

    let device_key = provider
        .device_integrity_key()
        .ok_or(ContainerError::ProviderUnavailable)?;

    // Seal each payload under a fresh salt.
    let mut salts: Vec<[u8; SALT_LEN]> = Vec::with_capacity(SLOT_COUNT);
    let mut frames: Vec<Vec<u8>> = Vec::with_capacity(entries.len());
    for entry in entries {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        let key = kdf::derive(entry.password.expose_secret().as_bytes(), &salt, params)?;
        frames.push(seal_block(entry.message.expose_secret(), &key)?);
        salts.push(salt);
    }

    // Decoy salts for the unoccupied slots, then a uniform shuffle. The
    // sweep in decrypt tries every salt anyway, so payload salts need no
    // positional bookkeeping.
    while salts.len() < SLOT_COUNT {
        let mut salt = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut salt);
        salts.push(salt);
    }
    salts.shuffle(&mut OsRng);

    // Block table starts fully random; payload frames overwrite distinct
    // uniformly chosen slots.
    let mut block_table = vec![0u8; layout::BLOCK_TABLE_LEN];
    OsRng.fill_bytes(&mut block_table);
    let placements = index::sample(&mut OsRng, SLOT_COUNT, frames.len());
    for (frame, slot) in frames.iter().zip(placements.iter()) {
        if let Some(block) = block_table.chunks_exact_mut(BLOCK_SIZE).nth(slot) {
            block.copy_from_slice(frame);
        }
    }

    let salt_table: Vec<u8> = salts.iter().flat_map(|s| s.iter().copied()).collect();
    assemble_tagged(&device_key, &salt_table, &block_table)
}

/// Check whether a container is bound to the current device.
///
/// Infallible by design: provider absence and malformed input are reported
/// through the `reason` field rather than an error, so callers can always
/// show a diagnosis.
pub fn verify_device(container: &[u8], provider: &impl DeviceKeyProvider) -> DeviceCheck {
    let view = match ContainerView::parse(container) {
        Ok(view) => view,
        Err(e) => return DeviceCheck::invalid(e.to_string()),
    };
    let Some(device_key) = provider.device_integrity_key() else {
        return DeviceCheck::invalid("device key provider unavailable");
    };
    if device::verify_tag(&device_key, view.body(), view.device_tag()) {
        DeviceCheck::valid()
    } else {
        DeviceCheck::invalid("device tag does not match the current device key")
    }
}

/// Attempt to decrypt a container with a candidate password.
///
/// The sweep is constant-work by contract: all 64 keys are derived first,
/// then every one of the 64 × 64 `(key, block)` open attempts runs to
/// completion — no short-circuit on success, no skipped derivations. An
/// observer timing this call learns nothing about whether, or where, the
/// password matched. The single success (unique for an honest container)
/// is reported with its coordinates for use by [`update`].
///
/// # Errors
///
/// Returns [`ContainerError::ProviderUnavailable`] if the tag must be
/// checked but the provider yields no key, and
/// [`ContainerError::KeyDerivation`] if Argon2id fails. All other failure
/// modes are statuses in the returned [`DecryptOutcome`].
pub fn decrypt(
    container: &[u8],
    password: &str,
    ignore_device_integrity: bool,
    provider: &impl DeviceKeyProvider,
    params: &Argon2idParams,
) -> Result<DecryptOutcome, ContainerError> {
    let Ok(view) = ContainerView::parse(container) else {
        return Ok(DecryptOutcome::miss(DecryptStatus::Corrupted));
    };

    if !ignore_device_integrity {
        let device_key = provider
            .device_integrity_key()
            .ok_or(ContainerError::ProviderUnavailable)?;
        if !device::verify_tag(&device_key, view.body(), view.device_tag()) {
            return Ok(DecryptOutcome::miss(DecryptStatus::InvalidDevice));
        }
    }

    // Derive all 64 keys up front, then sweep every block with every key.
    let mut keys: Vec<SecretKey> = Vec::with_capacity(SLOT_COUNT);
    for salt in view.salts() {
        keys.push(kdf::derive(password.as_bytes(), salt, params)?);
    }

    let mut hit: Option<(usize, usize, SecretString)> = None;
    for (salt_index, key) in keys.iter().enumerate() {
        for (block_index, block) in view.blocks().enumerate() {
            if let Ok(plaintext) = symmetric::open(block, key) {
                if let Some(message) = unpad_message(&plaintext) {
                    hit = Some((salt_index, block_index, message));
                }
            }
        }
    }

    Ok(hit.map_or_else(
        || DecryptOutcome::miss(DecryptStatus::InvalidPassword),
        |(salt_index, block_index, message)| DecryptOutcome {
            status: DecryptStatus::Valid,
            salt_index,
            block_index,
            message,
        },
    ))
}

/// Replace one payload in place.
///
/// `salt_index` and `block_index` are the coordinates reported by a prior
/// [`decrypt`]. The slot is re-salted and re-sealed under a fresh nonce;
/// no other slot is touched, no shuffle happens, and the output length is
/// unchanged. The device tag is always recomputed with the current device
/// key — `allow_device_change` only waives verification of the incoming
/// tag (the import-then-update flow).
///
/// # Errors
///
/// - [`ContainerError::Corrupted`] for malformed input bytes
/// - [`ContainerError::ProviderUnavailable`] if the provider yields no key
/// - [`ContainerError::InvalidDevice`] if the incoming tag fails and
///   `allow_device_change` is false
/// - [`ContainerError::SlotIndexOutOfRange`] /
///   [`ContainerError::OversizedMessage`] on invalid arguments
pub fn update(
    container: &[u8],
    password: &str,
    salt_index: usize,
    block_index: usize,
    new_message: &str,
    allow_device_change: bool,
    provider: &impl DeviceKeyProvider,
    params: &Argon2idParams,
) -> Result<Vec<u8>, ContainerError> {
    let view = ContainerView::parse(container)?;

    let device_key = provider
        .device_integrity_key()
        .ok_or(ContainerError::ProviderUnavailable)?;
    if !allow_device_change && !device::verify_tag(&device_key, view.body(), view.device_tag()) {
        return Err(ContainerError::InvalidDevice);
    }

    if salt_index >= SLOT_COUNT || block_index >= SLOT_COUNT {
        return Err(ContainerError::SlotIndexOutOfRange {
            salt_index,
            block_index,
        });
    }
    if new_message.len() > MAX_MESSAGE_LEN {
        return Err(ContainerError::OversizedMessage {
            len: new_message.len(),
            max: MAX_MESSAGE_LEN,
        });
    }

    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    let key = kdf::derive(password.as_bytes(), &salt, params)?;
    let frame = seal_block(new_message, &key)?;

    let mut salt_table = view.salt_table().to_vec();
    let mut block_table = view.block_table().to_vec();
    if let Some(slot) = salt_table.chunks_exact_mut(SALT_LEN).nth(salt_index) {
        slot.copy_from_slice(&salt);
    }
    if let Some(slot) = block_table.chunks_exact_mut(BLOCK_SIZE).nth(block_index) {
        slot.copy_from_slice(&frame);
    }

    assemble_tagged(&device_key, &salt_table, &block_table)
}

/// Rebind a container to the current device key.
///
/// Discards the incoming tag, recomputes it over the unchanged salt and
/// block tables, and re-prepends it. Requires no password — re-sealing an
/// imported container must not force the holder to reveal one.
///
/// # Errors
///
/// Returns [`ContainerError::Corrupted`] for malformed input and
/// [`ContainerError::ProviderUnavailable`] if the provider yields no key.
pub fn reseal(
    container: &[u8],
    provider: &impl DeviceKeyProvider,
) -> Result<Vec<u8>, ContainerError> {
    let view = ContainerView::parse(container)?;
    let device_key = provider
        .device_integrity_key()
        .ok_or(ContainerError::ProviderUnavailable)?;
    let tag = device::compute_tag(&device_key, view.body());
    layout::assemble(&tag, view.salt_table(), view.block_table())
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Seal a message into a full-width 8192-byte frame.
///
/// The plaintext is zero-padded to [`MAX_MESSAGE_LEN`] before sealing so
/// the frame fills its block slot exactly and carries no length structure.
/// The caller has already bounds-checked the message.
fn seal_block(message: &str, key: &SecretKey) -> Result<Vec<u8>, ContainerError> {
    let mut padded = Zeroizing::new(vec![0u8; MAX_MESSAGE_LEN]);
    padded[..message.len()].copy_from_slice(message.as_bytes());
    let frame = symmetric::seal(&padded, key)?;
    debug_assert_eq!(frame.len(), BLOCK_SIZE);
    Ok(frame)
}

/// Recover the message from a padded plaintext: strip trailing NULs,
/// require valid UTF-8. Returns `None` for non-UTF-8 content (possible
/// only under a forged or colliding open, never for an honest container).
fn unpad_message(padded: &[u8]) -> Option<SecretString> {
    let end = padded
        .iter()
        .rposition(|&b| b != 0)
        .map_or(0, |i| i.saturating_add(1));
    let message = std::str::from_utf8(&padded[..end]).ok()?;
    Some(SecretString::from(message.to_owned()))
}

/// Assemble `tag ‖ salt_table ‖ block_table` with a freshly computed tag.
fn assemble_tagged(
    device_key: &SecretKey,
    salt_table: &[u8],
    block_table: &[u8],
) -> Result<Vec<u8>, ContainerError> {
    let mut out = layout::assemble(&[0u8; DEVICE_TAG_LEN], salt_table, block_table)?;
    let tag = device::compute_tag(device_key, &out[DEVICE_TAG_LEN..]);
    out[..DEVICE_TAG_LEN].copy_from_slice(&tag);
    Ok(out)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
