//! `cachette-container` — deniable multi-payload encrypted container.
//!
//! A container is a fixed 525 344-byte blob holding up to 64 independently
//! decryptable payloads among indistinguishable decoys: a 32-byte
//! device-binding tag, 64 shuffled Argon2id salts, and 64 × 8192-byte
//! block slots sealed with XChaCha20-Poly1305 or filled with random bytes.
//!
//! This crate is an audit target: zero network, zero async, zero I/O, no
//! logging. All operations are pure functions over immutable inputs and
//! may run concurrently on the same bytes without coordination.

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::arithmetic_side_effects))]

pub mod container;
pub mod device;
pub mod error;
pub mod kdf;
pub mod layout;
pub mod memory;
pub mod symmetric;

pub use container::{
    create, decrypt, max_message_size, reseal, update, verify_device, DecryptOutcome,
    DecryptStatus, DeviceCheck, PayloadEntry,
};
pub use device::{compute_tag, verify_tag, DeviceKeyProvider, DEVICE_KEY_LEN, DEVICE_TAG_LEN};
pub use error::ContainerError;
pub use kdf::{derive, Argon2idParams, SALT_LEN};
pub use layout::{
    ContainerView, BLOCK_SIZE, BLOCK_TABLE_LEN, CONTAINER_LEN, MAX_MESSAGE_LEN, SALT_TABLE_LEN,
    SLOT_COUNT,
};
pub use memory::{disable_core_dumps, SecretKey};
