//! Device-bound integrity tag.
//!
//! A container carries a leading 32-byte keyed BLAKE3 tag over its salt
//! and block tables, keyed by a per-device secret obtained from a
//! [`DeviceKeyProvider`]. The tag binds the container to the device that
//! sealed it: it proves nothing about payloads and reveals nothing about
//! occupancy, it only detects that the bytes were produced (or re-sealed)
//! under the current device key.

use crate::memory::{SecretKey, KEY_LEN};

/// Device tag length in bytes.
pub const DEVICE_TAG_LEN: usize = 32;

/// Device secret length in bytes.
pub const DEVICE_KEY_LEN: usize = KEY_LEN;

/// Source of the per-device integrity secret.
///
/// The provider is an external collaborator: how the secret is generated,
/// stored, and protected (keychain, TPM, flat file) is entirely its
/// concern. The container core uses the secret only as a MAC key and
/// never persists it.
pub trait DeviceKeyProvider {
    /// Return the 32-byte device secret, or `None` if it is unavailable.
    fn device_integrity_key(&self) -> Option<SecretKey>;
}

/// A raw 32-byte array acts as its own provider. Convenient for tests and
/// for hosts that manage key custody elsewhere.
impl DeviceKeyProvider for [u8; DEVICE_KEY_LEN] {
    fn device_integrity_key(&self) -> Option<SecretKey> {
        Some(SecretKey::new(*self))
    }
}

/// Compute the device tag over a container body (`SaltTable ‖ BlockTable`).
#[must_use]
pub fn compute_tag(device_key: &SecretKey, body: &[u8]) -> [u8; DEVICE_TAG_LEN] {
    *blake3::keyed_hash(device_key.expose(), body).as_bytes()
}

/// Verify a device tag in constant time.
#[must_use]
pub fn verify_tag(device_key: &SecretKey, body: &[u8], tag: &[u8; DEVICE_TAG_LEN]) -> bool {
    // blake3::Hash equality is constant-time.
    blake3::keyed_hash(device_key.expose(), body) == *tag
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
