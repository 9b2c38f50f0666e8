//! Argon2id key derivation.
//!
//! Every payload key is derived from `(password, salt)` with Argon2id at
//! the fixed interactive limits. Decryption derives a key for every one of
//! the 64 salts with identical parameters, so the per-attempt work is the
//! same whether a salt belongs to a payload or is a decoy — this constancy
//! is part of the deniability contract, not an optimization target.

use crate::error::ContainerError;
use crate::memory::{SecretKey, KEY_LEN};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Salt length in bytes. Exact — the container layout stores 16-byte slots.
pub const SALT_LEN: usize = 16;

/// Interactive memory limit in KiB (64 MiB).
const MEMORY_INTERACTIVE: u32 = 65_536;

/// Argon2id parameter set, in `argon2` crate conventions:
/// `m_cost` in KiB, `t_cost` iterations, `p_cost` lanes.
///
/// One container uses one parameter set for every slot. The container
/// itself is headerless, so the set in force is a convention between the
/// application's create and decrypt sides; [`Argon2idParams::interactive`]
/// is the default convention.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2idParams {
    /// Memory cost in kibibytes.
    pub m_cost: u32,
    /// Number of iterations.
    pub t_cost: u32,
    /// Degree of parallelism.
    pub p_cost: u32,
}

impl Argon2idParams {
    /// The fixed interactive limits: 64 MiB, 2 iterations, 1 lane.
    #[must_use]
    pub const fn interactive() -> Self {
        Self {
            m_cost: MEMORY_INTERACTIVE,
            t_cost: 2,
            p_cost: 1,
        }
    }
}

impl Default for Argon2idParams {
    fn default() -> Self {
        Self::interactive()
    }
}

/// Derive a 256-bit key from a password and a 16-byte salt.
///
/// The intermediate output buffer is zeroized after the key is moved into
/// its [`SecretKey`].
///
/// # Errors
///
/// Returns [`ContainerError::KeyDerivation`] if the salt is not exactly
/// 16 bytes, the parameters are rejected by `argon2`, or the derivation
/// itself fails (e.g. memory allocation).
pub fn derive(
    password: &[u8],
    salt: &[u8],
    params: &Argon2idParams,
) -> Result<SecretKey, ContainerError> {
    if salt.len() != SALT_LEN {
        return Err(ContainerError::KeyDerivation(format!(
            "salt must be exactly {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }

    let argon2_params =
        argon2::Params::new(params.m_cost, params.t_cost, params.p_cost, Some(KEY_LEN))
            .map_err(|e| ContainerError::KeyDerivation(format!("invalid argon2 params: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon2_params,
    );

    let mut output = [0u8; KEY_LEN];
    argon2
        .hash_password_into(password, salt, &mut output)
        .map_err(|e| ContainerError::KeyDerivation(format!("argon2id derivation failed: {e}")))?;

    let key = SecretKey::new(output);
    output.zeroize();
    Ok(key)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
