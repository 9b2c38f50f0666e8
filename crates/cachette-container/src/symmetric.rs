//! XChaCha20-Poly1305 authenticated encryption.
//!
//! Frames are combined-mode: `nonce (24) ‖ ciphertext ‖ tag (16)`, with a
//! fresh random nonce per seal. The 24-byte extended nonce makes random
//! nonce generation safe without any per-key counter state, which matters
//! here because every block slot is sealed under its own single-use key.
//! No associated data is used.

use crate::error::ContainerError;
use crate::memory::SecretKey;
use chacha20poly1305::aead::{Aead, KeyInit};
use chacha20poly1305::{XChaCha20Poly1305, XNonce};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroizing;

/// XChaCha20 nonce length in bytes (192 bits).
pub const NONCE_LEN: usize = 24;

/// Poly1305 tag length in bytes (128 bits).
pub const TAG_LEN: usize = 16;

/// Minimum valid frame: nonce + empty ciphertext + tag.
pub const MIN_FRAME_LEN: usize = NONCE_LEN + TAG_LEN;

/// Seal a plaintext into a combined frame under a fresh random nonce.
///
/// The output is `NONCE_LEN + plaintext.len() + TAG_LEN` bytes and is
/// indistinguishable from uniform random bytes to anyone without the key.
///
/// # Errors
///
/// Returns [`ContainerError::Crypto`] if the AEAD primitive fails.
pub fn seal(plaintext: &[u8], key: &SecretKey) -> Result<Vec<u8>, ContainerError> {
    let cipher = XChaCha20Poly1305::new_from_slice(key.expose())
        .map_err(|_| ContainerError::Crypto("invalid XChaCha20-Poly1305 key length".into()))?;

    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(XNonce::from_slice(&nonce), plaintext)
        .map_err(|_| ContainerError::Crypto("XChaCha20-Poly1305 encryption failed".into()))?;

    let mut frame = Vec::with_capacity(NONCE_LEN.saturating_add(ciphertext.len()));
    frame.extend_from_slice(&nonce);
    frame.extend_from_slice(&ciphertext);
    Ok(frame)
}

/// Open a combined frame, returning the plaintext in a zeroize-on-drop
/// buffer.
///
/// # Errors
///
/// Returns [`ContainerError::Crypto`] if the frame is shorter than
/// [`MIN_FRAME_LEN`] or authentication fails (wrong key or tampered
/// bytes). During a container sweep a failed open is the expected case
/// and is not surfaced to callers.
pub fn open(frame: &[u8], key: &SecretKey) -> Result<Zeroizing<Vec<u8>>, ContainerError> {
    if frame.len() < MIN_FRAME_LEN {
        return Err(ContainerError::Crypto(format!(
            "frame too short: {} bytes (minimum {MIN_FRAME_LEN})",
            frame.len()
        )));
    }

    let cipher = XChaCha20Poly1305::new_from_slice(key.expose())
        .map_err(|_| ContainerError::Crypto("invalid XChaCha20-Poly1305 key length".into()))?;

    let (nonce, body) = frame.split_at(NONCE_LEN);
    let plaintext = cipher
        .decrypt(XNonce::from_slice(nonce), body)
        .map_err(|_| ContainerError::Crypto("authentication failed".into()))?;

    Ok(Zeroizing::new(plaintext))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> SecretKey {
        SecretKey::new([0xAA; 32])
    }

    fn wrong_key() -> SecretKey {
        SecretKey::new([0xBB; 32])
    }

    #[test]
    fn frame_has_expected_length() {
        let plaintext = b"hello, container";
        let frame = seal(plaintext, &test_key()).expect("seal should succeed");
        assert_eq!(frame.len(), NONCE_LEN + plaintext.len() + TAG_LEN);
    }

    #[test]
    fn seal_open_roundtrip() {
        let plaintext = b"deniable payload bytes";
        let frame = seal(plaintext, &test_key()).expect("seal should succeed");
        let opened = open(&frame, &test_key()).expect("open should succeed");
        assert_eq!(opened.as_slice(), plaintext);
    }

    #[test]
    fn open_fails_with_wrong_key() {
        let frame = seal(b"payload", &test_key()).expect("seal should succeed");
        assert!(open(&frame, &wrong_key()).is_err());
    }

    #[test]
    fn open_fails_on_tampered_ciphertext() {
        let mut frame = seal(b"payload", &test_key()).expect("seal should succeed");
        frame[NONCE_LEN] ^= 0xFF;
        assert!(open(&frame, &test_key()).is_err());
    }

    #[test]
    fn open_fails_on_tampered_tag() {
        let mut frame = seal(b"payload", &test_key()).expect("seal should succeed");
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        assert!(open(&frame, &test_key()).is_err());
    }

    #[test]
    fn open_fails_on_tampered_nonce() {
        let mut frame = seal(b"payload", &test_key()).expect("seal should succeed");
        frame[0] ^= 0xFF;
        assert!(open(&frame, &test_key()).is_err());
    }

    #[test]
    fn open_rejects_short_frame() {
        let err = open(&[0u8; MIN_FRAME_LEN - 1], &test_key())
            .expect_err("short frame should be rejected");
        assert!(format!("{err}").contains("frame too short"));
    }

    #[test]
    fn empty_plaintext_roundtrip() {
        let frame = seal(&[], &test_key()).expect("seal should succeed");
        assert_eq!(frame.len(), MIN_FRAME_LEN);
        let opened = open(&frame, &test_key()).expect("open should succeed");
        assert!(opened.is_empty());
    }

    #[test]
    fn two_seals_produce_different_frames() {
        let a = seal(b"same plaintext", &test_key()).expect("seal should succeed");
        let b = seal(b"same plaintext", &test_key()).expect("seal should succeed");
        assert_ne!(a, b, "fresh nonces must differ");
        assert_ne!(&a[..NONCE_LEN], &b[..NONCE_LEN]);
    }
}
