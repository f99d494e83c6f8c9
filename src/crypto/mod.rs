//! Cryptographic primitives for FileVault.
//!
//! This module provides:
//! - AES-256-GCM with a detached tag for V2 content (`encryption`)
//! - AES-256-CBC for legacy V1 content and key-slot wrapping (`cbc_mode`)
//! - PBKDF2-HMAC-SHA256 password-based key derivation (`kdf`)
//! - Random data keys and IVs (`keys`)

pub mod cbc_mode;
pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{derive_key, generate_salt, DataKey, ...};
pub use kdf::{derive_key, generate_salt, KdfParams, DEFAULT_ITERATIONS};
pub use keys::{generate_iv, DataKey};
