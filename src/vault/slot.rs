//! KeySlot and KeySlotInfo types stored inside a V2 vault.
//!
//! Each slot holds one password's wrapped copy of the data key plus the
//! parameters needed to re-derive that password's key-encryption key.
//! Binary fields use custom serde helpers so they serialize as hex
//! strings in JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::format::{hex_decode, hex_encode};

/// A single key slot: the data key wrapped under one password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySlot {
    /// Stable identifier (UUID v4), unique within a vault.
    pub id: String,

    /// Key derivation algorithm (always `pbkdf2-sha256` today).
    pub algorithm: String,

    /// PBKDF2 iteration count this slot's key was derived with.
    pub iterations: u32,

    /// Per-slot PBKDF2 salt (32 bytes).
    #[serde(serialize_with = "hex_encode", deserialize_with = "hex_decode")]
    pub salt: Vec<u8>,

    /// The data key, AES-256-CBC encrypted under this slot's derived key.
    #[serde(
        rename = "encryptedDEK",
        serialize_with = "hex_encode",
        deserialize_with = "hex_decode"
    )]
    pub encrypted_dek: Vec<u8>,

    /// CBC IV used to wrap the data key (16 bytes).
    #[serde(serialize_with = "hex_encode", deserialize_with = "hex_decode")]
    pub iv: Vec<u8>,

    /// When this slot was added.
    pub created_at: DateTime<Utc>,

    /// Optional human-readable label (e.g. "Alice").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Public metadata about a key slot (no key material).
///
/// Returned by `list_keys` so callers can display and pick slots
/// without ever seeing salts, IVs or wrapped keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySlotInfo {
    pub id: String,
    pub algorithm: String,
    pub created_at: DateTime<Utc>,
    pub label: Option<String>,
}

impl From<&KeySlot> for KeySlotInfo {
    fn from(slot: &KeySlot) -> Self {
        Self {
            id: slot.id.clone(),
            algorithm: slot.algorithm.clone(),
            created_at: slot.created_at,
            label: slot.label.clone(),
        }
    }
}
