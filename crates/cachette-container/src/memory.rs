//! Secure handling of 32-byte key material.
//!
//! Every key in this crate — Argon2id-derived payload keys and the device
//! integrity key — is a [`SecretKey`]: zeroed on drop via [`zeroize`],
//! best-effort `mlock`'d so it cannot be swapped to disk, and masked in
//! `Debug`/`Display` output. Passwords and recovered messages travel as
//! `secrecy::SecretString` at the API boundary and `zeroize::Zeroizing`
//! buffers internally.

use crate::error::ContainerError;
use rand::rngs::OsRng;
use rand::RngCore;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Length of every key handled by this crate, in bytes.
pub const KEY_LEN: usize = 32;

// ---------------------------------------------------------------------------
// Page locking
// ---------------------------------------------------------------------------

/// RAII guard over an `mlock`'d memory region; `munlock`s on drop.
///
/// Locking is best-effort: if `mlock` fails (privileges, RLIMIT_MEMLOCK),
/// the key still works — it just loses the no-swap guarantee. Zeroize on
/// drop is independent of lock status.
struct LockedRegion {
    ptr: *const u8,
    len: usize,
    locked: bool,
}

// SAFETY: the pointer is used only for mlock/munlock syscalls; the
// pointed-to bytes are owned by SecretKey and never read through this.
unsafe impl Send for LockedRegion {}
unsafe impl Sync for LockedRegion {}

impl LockedRegion {
    fn try_lock(ptr: *const u8, len: usize) -> Self {
        let locked = platform::try_mlock(ptr, len);
        Self { ptr, len, locked }
    }

    const fn unlocked() -> Self {
        Self {
            ptr: std::ptr::null(),
            len: 0,
            locked: false,
        }
    }
}

impl Drop for LockedRegion {
    fn drop(&mut self) {
        if self.locked {
            platform::try_munlock(self.ptr, self.len);
        }
    }
}

// ---------------------------------------------------------------------------
// SecretKey
// ---------------------------------------------------------------------------

/// A 32-byte symmetric key, wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    bytes: [u8; KEY_LEN],
    // Unlock order relative to zeroization does not matter; munlock on an
    // already-wiped region is harmless.
    #[zeroize(skip)]
    lock: LockedRegion,
}

impl SecretKey {
    /// Take ownership of raw key bytes. The source array is moved in;
    /// callers holding another copy should zeroize it.
    ///
    /// The lock is taken after the bytes reach their field address, so a
    /// later move of the whole `SecretKey` leaves the lock pointing at the
    /// old address — acceptable, since `munlock` on a stale address is a
    /// no-op and zeroization does not depend on the lock.
    #[must_use]
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        let mut key = Self {
            bytes,
            lock: LockedRegion::unlocked(),
        };
        key.lock = LockedRegion::try_lock(key.bytes.as_ptr(), KEY_LEN);
        key
    }

    /// Generate a fresh random key from the system CSPRNG.
    ///
    /// # Errors
    ///
    /// Returns [`ContainerError::SecureMemory`] if the CSPRNG fails.
    pub fn random() -> Result<Self, ContainerError> {
        let mut bytes = [0u8; KEY_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| ContainerError::SecureMemory(format!("CSPRNG fill failed: {e}")))?;
        Ok(Self::new(bytes))
    }

    /// Expose the raw bytes for a cryptographic operation. Keep the
    /// exposure to a single expression where possible.
    #[must_use]
    pub const fn expose(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl From<[u8; KEY_LEN]> for SecretKey {
    fn from(bytes: [u8; KEY_LEN]) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

impl fmt::Display for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(***)")
    }
}

// ---------------------------------------------------------------------------
// Core dump disabling
// ---------------------------------------------------------------------------

/// Disable core dumps for the current process.
///
/// On Unix this sets `RLIMIT_CORE` to 0; elsewhere it is a no-op. Hosts
/// embedding the container core should call this once at startup.
///
/// # Errors
///
/// Returns [`ContainerError::SecureMemory`] if `setrlimit` fails.
pub fn disable_core_dumps() -> Result<(), ContainerError> {
    platform::disable_core_dumps_impl()
}

// ---------------------------------------------------------------------------
// Platform shims
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod platform {
    use crate::error::ContainerError;

    pub(super) fn try_mlock(ptr: *const u8, len: usize) -> bool {
        if len == 0 {
            return true;
        }
        // SAFETY: mlock accepts any valid pointer/length pair; failure is
        // reported via the return value.
        unsafe { libc::mlock(ptr.cast(), len) == 0 }
    }

    pub(super) fn try_munlock(ptr: *const u8, len: usize) {
        if len == 0 {
            return;
        }
        // SAFETY: munlock failure is non-critical.
        unsafe {
            libc::munlock(ptr.cast(), len);
        }
    }

    pub(super) fn disable_core_dumps_impl() -> Result<(), ContainerError> {
        let limit = libc::rlimit {
            rlim_cur: 0,
            rlim_max: 0,
        };
        // SAFETY: setrlimit with RLIMIT_CORE is a standard POSIX call.
        let ret = unsafe { libc::setrlimit(libc::RLIMIT_CORE, &raw const limit) };
        if ret != 0 {
            return Err(ContainerError::SecureMemory(
                "failed to disable core dumps via RLIMIT_CORE".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(not(unix))]
mod platform {
    use crate::error::ContainerError;

    pub(super) fn try_mlock(_ptr: *const u8, _len: usize) -> bool {
        false
    }

    pub(super) fn try_munlock(_ptr: *const u8, _len: usize) {}

    pub(super) fn disable_core_dumps_impl() -> Result<(), ContainerError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_and_expose_roundtrip() {
        let key = SecretKey::new([0xAB; KEY_LEN]);
        assert_eq!(key.expose(), &[0xAB; KEY_LEN]);
    }

    #[test]
    fn random_keys_differ() {
        let a = SecretKey::random().expect("random should succeed");
        let b = SecretKey::random().expect("random should succeed");
        assert_ne!(a.expose(), b.expose());
    }

    #[test]
    fn random_key_is_non_zero() {
        let key = SecretKey::random().expect("random should succeed");
        assert!(key.expose().iter().any(|&b| b != 0));
    }

    #[test]
    fn debug_is_masked() {
        let key = SecretKey::new([0xFF; KEY_LEN]);
        let debug = format!("{key:?}");
        assert_eq!(debug, "SecretKey(***)");
        assert!(!debug.to_lowercase().contains("ff"));
    }

    #[test]
    fn display_is_masked() {
        let key = SecretKey::new([0x11; KEY_LEN]);
        assert_eq!(format!("{key}"), "SecretKey(***)");
    }

    #[test]
    fn from_array() {
        let key: SecretKey = [0x42; KEY_LEN].into();
        assert_eq!(key.expose(), &[0x42; KEY_LEN]);
    }

    #[cfg(unix)]
    #[test]
    fn disable_core_dumps_sets_rlimit() {
        disable_core_dumps().expect("disable_core_dumps should succeed");

        let mut limit = libc::rlimit {
            rlim_cur: 1,
            rlim_max: 1,
        };
        let ret = unsafe { libc::getrlimit(libc::RLIMIT_CORE, &raw mut limit) };
        assert_eq!(ret, 0);
        assert_eq!(limit.rlim_cur, 0);
    }
}
