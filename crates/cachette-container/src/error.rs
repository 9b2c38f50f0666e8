//! Error types for `cachette-container`.

use thiserror::Error;

/// Errors produced by container operations.
///
/// Decrypt's four-way outcome (valid / invalid device / invalid password /
/// corrupted) is deliberately NOT an error — it travels in
/// [`crate::container::DecryptOutcome`] after the full constant-work sweep.
/// The variants below cover input validation and primitive failures, which
/// abort the call.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Key derivation failed (Argon2id parameter validation, memory allocation).
    #[error("key derivation failed: {0}")]
    KeyDerivation(String),

    /// AEAD primitive failure (XChaCha20-Poly1305). Fatal for the call.
    #[error("crypto failure: {0}")]
    Crypto(String),

    /// A plaintext exceeds the fixed per-slot capacity.
    #[error("message of {len} bytes exceeds the maximum of {max}")]
    OversizedMessage {
        /// Offending plaintext length in bytes.
        len: usize,
        /// Maximum plaintext length per slot.
        max: usize,
    },

    /// More payload entries than slots.
    #[error("{count} entries exceed the {max} available slots")]
    TooManyEntries {
        /// Number of entries supplied.
        count: usize,
        /// Number of slots in a container.
        max: usize,
    },

    /// The device key provider returned no key.
    #[error("device key provider unavailable")]
    ProviderUnavailable,

    /// The device tag does not match the current device key.
    #[error("container is bound to a different device")]
    InvalidDevice,

    /// Container length or structure invalid.
    #[error("corrupted container: {0}")]
    Corrupted(String),

    /// A salt or block index is outside `[0, 64)`.
    #[error("slot indices out of range: salt {salt_index}, block {block_index}")]
    SlotIndexOutOfRange {
        /// Requested salt slot.
        salt_index: usize,
        /// Requested block slot.
        block_index: usize,
    },

    /// Secure memory allocation or CSPRNG failure.
    #[error("secure memory error: {0}")]
    SecureMemory(String),
}
