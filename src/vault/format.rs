//! Textual vault container formats and their strict codec.
//!
//! Both formats are newline-joined fields starting with a header literal.
//!
//! ```text
//! V1 (legacy):  HEADER_V1 \n hex(salt) \n hex(iv) \n hex(ciphertext)
//! V2 (envelope): HEADER_V2 \n metadata JSON \n key slots JSON \n hex(content IV) \n hex(auth tag) \n hex(ciphertext)
//! ```
//!
//! - **V1**: content encrypted with AES-256-CBC directly under the
//!   password-derived key.  No integrity tag.
//! - **V2**: content encrypted once with AES-256-GCM under a random data
//!   key; every password wraps a copy of that key in its own key slot.
//!
//! Hex is written lowercase and accepted in either case.  Unpacking
//! validates every field before any cryptographic work happens.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::slot::KeySlot;
use crate::crypto::cbc_mode::BLOCK_LEN;
use crate::crypto::encryption::{IV_LEN, TAG_LEN};
use crate::crypto::kdf::{KDF_ALGORITHM, MAX_ITERATIONS, SALT_LEN};
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// First line of every legacy (V1) vault.
pub const HEADER_V1: &str = "FILEVAULT:V1:AES256-CBC:PBKDF2";

/// First line of every envelope (V2) vault.
pub const HEADER_V2: &str = "FILEVAULT:V2:AES256-GCM:ENVELOPE";

/// Value of `metadata.formatVersion` in V2 vaults.
pub const FORMAT_VERSION: u32 = 2;

/// Value of `metadata.algorithm` in V2 vaults.
pub const CONTENT_ALGORITHM: &str = "aes-256-gcm";

const V1_FIELDS: usize = 4;
const V2_FIELDS: usize = 6;

// ---------------------------------------------------------------------------
// Container types
// ---------------------------------------------------------------------------

/// A parsed legacy vault.  The content key is the password-derived key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerV1 {
    pub salt: [u8; SALT_LEN],
    pub iv: [u8; BLOCK_LEN],
    pub ciphertext: Vec<u8>,
}

/// Metadata stored in the second field of a V2 vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Format version (currently `2`).
    pub format_version: u32,

    /// Content cipher identifier.
    pub algorithm: String,

    /// When the vault was first created.
    pub created_at: DateTime<Utc>,

    /// When the content or key slots last changed.
    pub modified_at: DateTime<Utc>,
}

impl Metadata {
    /// Fresh metadata for a vault created right now.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            format_version: FORMAT_VERSION,
            algorithm: CONTENT_ALGORITHM.to_string(),
            created_at: now,
            modified_at: now,
        }
    }

    /// Refresh `modified_at` after a key-slot mutation.
    pub fn touch(&mut self) {
        self.modified_at = Utc::now();
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

/// A parsed envelope vault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerV2 {
    pub metadata: Metadata,
    pub key_slots: Vec<KeySlot>,
    pub content_iv: [u8; IV_LEN],
    pub auth_tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

impl ContainerV2 {
    /// Position of the slot with the given id, if present.
    pub fn slot_index(&self, id: &str) -> Option<usize> {
        self.key_slots.iter().position(|slot| slot.id == id)
    }
}

// ---------------------------------------------------------------------------
// V1 codec
// ---------------------------------------------------------------------------

/// Serialize a legacy vault to its four-line text form.
pub fn pack_v1(container: &ContainerV1) -> String {
    [
        HEADER_V1.to_string(),
        hex::encode(container.salt),
        hex::encode(container.iv),
        hex::encode(&container.ciphertext),
    ]
    .join("\n")
}

/// Parse and validate a legacy vault.
pub fn unpack_v1(text: &str) -> Result<ContainerV1> {
    let fields = split_fields(text, V1_FIELDS, "V1")?;

    if fields[0] != HEADER_V1 {
        return Err(VaultError::Validation(
            "missing V1 vault header".into(),
        ));
    }

    let salt = decode_fixed::<SALT_LEN>("salt", fields[1])?;
    let iv = decode_fixed::<BLOCK_LEN>("IV", fields[2])?;
    let ciphertext = decode_hex("ciphertext", fields[3])?;

    if ciphertext.is_empty() {
        return Err(VaultError::Validation("ciphertext is empty".into()));
    }
    if ciphertext.len() % BLOCK_LEN != 0 {
        return Err(VaultError::Validation(format!(
            "ciphertext length {} is not a multiple of the {BLOCK_LEN}-byte block size",
            ciphertext.len()
        )));
    }

    Ok(ContainerV1 {
        salt,
        iv,
        ciphertext,
    })
}

// ---------------------------------------------------------------------------
// V2 codec
// ---------------------------------------------------------------------------

/// Serialize an envelope vault to its six-line text form.
///
/// JSON is written compactly, so labels containing newlines are escaped
/// and never split a field.
pub fn pack_v2(container: &ContainerV2) -> Result<String> {
    let metadata = serde_json::to_string(&container.metadata)
        .map_err(|e| VaultError::SerializationError(format!("metadata: {e}")))?;
    let key_slots = serde_json::to_string(&container.key_slots)
        .map_err(|e| VaultError::SerializationError(format!("key slots: {e}")))?;

    Ok([
        HEADER_V2.to_string(),
        metadata,
        key_slots,
        hex::encode(container.content_iv),
        hex::encode(container.auth_tag),
        hex::encode(&container.ciphertext),
    ]
    .join("\n"))
}

/// Parse and validate an envelope vault.
pub fn unpack_v2(text: &str) -> Result<ContainerV2> {
    let fields = split_fields(text, V2_FIELDS, "V2")?;

    if fields[0] != HEADER_V2 {
        return Err(VaultError::Validation(
            "missing V2 vault header".into(),
        ));
    }

    let metadata: Metadata = serde_json::from_str(fields[1])
        .map_err(|e| VaultError::Validation(format!("metadata JSON is invalid: {e}")))?;
    validate_metadata(&metadata)?;

    let key_slots: Vec<KeySlot> = serde_json::from_str(fields[2])
        .map_err(|e| VaultError::Validation(format!("key slots JSON is invalid: {e}")))?;
    validate_key_slots(&key_slots)?;

    let content_iv = decode_fixed::<IV_LEN>("content IV", fields[3])?;
    let auth_tag = decode_fixed::<TAG_LEN>("auth tag", fields[4])?;
    // GCM has no padding, so empty content encrypts to an empty field.
    let ciphertext = decode_hex("ciphertext", fields[5])?;

    Ok(ContainerV2 {
        metadata,
        key_slots,
        content_iv,
        auth_tag,
        ciphertext,
    })
}

fn validate_metadata(metadata: &Metadata) -> Result<()> {
    if metadata.format_version != FORMAT_VERSION {
        return Err(VaultError::Validation(format!(
            "unsupported formatVersion {}, expected {FORMAT_VERSION}",
            metadata.format_version
        )));
    }
    if !metadata.algorithm.eq_ignore_ascii_case(CONTENT_ALGORITHM) {
        return Err(VaultError::Validation(format!(
            "unsupported content algorithm '{}'",
            metadata.algorithm
        )));
    }
    Ok(())
}

fn validate_key_slots(slots: &[KeySlot]) -> Result<()> {
    if slots.is_empty() {
        return Err(VaultError::Validation(
            "vault has no key slots".into(),
        ));
    }

    let mut seen = HashSet::with_capacity(slots.len());
    for (index, slot) in slots.iter().enumerate() {
        if slot.id.trim().is_empty() {
            return Err(VaultError::Validation(format!(
                "key slot {index}: id is empty"
            )));
        }
        if !seen.insert(slot.id.as_str()) {
            return Err(VaultError::Validation(format!(
                "key slot {index}: duplicate id '{}'",
                slot.id
            )));
        }
        if !slot.algorithm.eq_ignore_ascii_case(KDF_ALGORITHM) {
            return Err(VaultError::Validation(format!(
                "key slot {index}: unsupported algorithm '{}'",
                slot.algorithm
            )));
        }
        if slot.iterations < 1 || slot.iterations > MAX_ITERATIONS {
            return Err(VaultError::Validation(format!(
                "key slot {index}: iterations must be between 1 and {MAX_ITERATIONS}, got {}",
                slot.iterations
            )));
        }
        if slot.salt.len() != SALT_LEN {
            return Err(VaultError::Validation(format!(
                "key slot {index}: salt must be {SALT_LEN} bytes, got {}",
                slot.salt.len()
            )));
        }
        if slot.iv.len() != BLOCK_LEN {
            return Err(VaultError::Validation(format!(
                "key slot {index}: iv must be {BLOCK_LEN} bytes, got {}",
                slot.iv.len()
            )));
        }
        if slot.encrypted_dek.is_empty() || slot.encrypted_dek.len() % BLOCK_LEN != 0 {
            return Err(VaultError::Validation(format!(
                "key slot {index}: encryptedDEK must be a non-empty multiple of {BLOCK_LEN} bytes, got {}",
                slot.encrypted_dek.len()
            )));
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Field helpers
// ---------------------------------------------------------------------------

/// Split `text` into exactly `count` fields.
///
/// Anything after the last required field must be empty, which tolerates
/// a trailing newline but rejects extra data.
fn split_fields<'a>(text: &'a str, count: usize, format: &str) -> Result<Vec<&'a str>> {
    let fields: Vec<&str> = text.split('\n').collect();

    if fields.len() < count {
        return Err(VaultError::Validation(format!(
            "{format} vault must have {count} newline-separated fields, found {}",
            fields.len()
        )));
    }
    if fields[count..].iter().any(|extra| !extra.is_empty()) {
        return Err(VaultError::Validation(format!(
            "{format} vault has unexpected data after field {count}"
        )));
    }

    Ok(fields[..count].to_vec())
}

fn decode_hex(name: &str, value: &str) -> Result<Vec<u8>> {
    hex::decode(value).map_err(|e| VaultError::Validation(format!("{name} is not valid hex: {e}")))
}

fn decode_fixed<const N: usize>(name: &str, value: &str) -> Result<[u8; N]> {
    let bytes = decode_hex(name, value)?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        VaultError::Validation(format!("{name} must be {N} bytes, got {len}"))
    })
}

// ---------------------------------------------------------------------------
// Serde helpers for hex-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

pub(crate) fn hex_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&hex::encode(data))
}

pub(crate) fn hex_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    hex::decode(&s).map_err(serde::de::Error::custom)
}
