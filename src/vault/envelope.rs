//! Envelope (V2) encryption and key-slot lifecycle.
//!
//! The content is encrypted once with AES-256-GCM under a random data key
//! (DEK).  Every password gets its own key slot holding the DEK wrapped
//! with AES-256-CBC under a PBKDF2-derived key-encryption key (KEK).
//! Adding or removing a password only touches the slot list; the content
//! ciphertext is never re-encrypted.
//!
//! Every operation takes a whole container text and returns a new one.
//! Nothing here mutates shared state or touches the filesystem.

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeroize::{Zeroize, Zeroizing};

use super::format::{self, ContainerV2, Metadata};
use super::slot::{KeySlot, KeySlotInfo};
use crate::crypto::cbc_mode::{self, BLOCK_LEN};
use crate::crypto::encryption::{self, IV_LEN};
use crate::crypto::kdf::{derive_key, generate_salt, KdfParams, KDF_ALGORITHM};
use crate::crypto::keys::{generate_iv, DataKey, DEK_LEN};
use crate::errors::{AuthFailure, InvariantViolation, Result, VaultError};

/// The two containers produced by a password rotation.
///
/// Rotation is an add followed by a remove.  A caller that persists
/// between the two steps should write `intermediate` first; if it stops
/// there, both the old and the new password still open the vault.
#[derive(Debug, Clone)]
pub struct Rotation {
    /// Vault after the new slot was added (old and new password both valid).
    pub intermediate: String,
    /// Vault after the old slot was removed (only the new password valid).
    pub container: String,
    pub added_slot_id: String,
    pub removed_slot_id: String,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Encrypt `plaintext` into a new V2 vault that opens under each password.
///
/// `labels` is aligned with `passwords` by index and may be shorter; an
/// empty label counts as no label.
pub fn encrypt(
    plaintext: &str,
    passwords: &[&str],
    labels: Option<&[&str]>,
    params: &KdfParams,
) -> Result<String> {
    if passwords.is_empty() {
        return Err(VaultError::Validation(
            "at least one password is required".into(),
        ));
    }
    for (index, password) in passwords.iter().enumerate() {
        ensure_password(password, &format!("password {}", index + 1))?;
    }
    let labels = labels.unwrap_or_default();
    if labels.len() > passwords.len() {
        return Err(VaultError::Validation(format!(
            "{} labels given for {} passwords",
            labels.len(),
            passwords.len()
        )));
    }

    let dek = DataKey::generate();
    let content_iv = generate_iv::<IV_LEN>();
    let sealed = encryption::encrypt(dek.as_bytes(), &content_iv, plaintext.as_bytes())?;

    let key_slots = passwords
        .iter()
        .enumerate()
        .map(|(index, password)| new_slot(&dek, password, labels.get(index).copied(), params))
        .collect::<Result<Vec<_>>>()?;

    info!(slots = key_slots.len(), "created envelope vault");

    format::pack_v2(&ContainerV2 {
        metadata: Metadata::new(),
        key_slots,
        content_iv,
        auth_tag: sealed.tag,
        ciphertext: sealed.ciphertext,
    })
}

/// Decrypt a V2 vault with any one of its passwords.
pub fn decrypt(text: &str, password: &str) -> Result<String> {
    ensure_password(password, "password")?;
    let container = format::unpack_v2(text)?;

    let (_, plaintext) = open_content(&container, password)?;
    into_text(plaintext)
}

/// Add a key slot for `new_password`, authorised by `existing_password`.
///
/// Authorisation only requires that `existing_password` unwraps some slot
/// to a key of the right length.  Unlike `remove_key`, the content is not
/// decrypted to confirm the key.
pub fn add_key(
    text: &str,
    existing_password: &str,
    new_password: &str,
    label: Option<&str>,
    params: &KdfParams,
) -> Result<String> {
    ensure_password(existing_password, "existing password")?;
    ensure_password(new_password, "new password")?;
    let mut container = format::unpack_v2(text)?;

    let dek = unlock_data_key(&container, existing_password)?;
    let slot = new_slot(&dek, new_password, label, params)?;
    info!(slot = %slot.id, "added key slot");

    container.key_slots.push(slot);
    container.metadata.touch();
    format::pack_v2(&container)
}

/// Remove the key slot `slot_id`, authorised by `auth_password`.
///
/// `auth_password` must fully decrypt and authenticate the content.  The
/// last remaining slot can never be removed.
pub fn remove_key(text: &str, auth_password: &str, slot_id: &str) -> Result<String> {
    ensure_password(auth_password, "password")?;
    if slot_id.trim().is_empty() {
        return Err(VaultError::Validation("key slot id is empty".into()));
    }
    let mut container = format::unpack_v2(text)?;

    open_content(&container, auth_password)?;

    if container.key_slots.len() <= 1 {
        return Err(VaultError::InvariantViolation(
            InvariantViolation::CannotRemoveLastKey,
        ));
    }
    let index = container.slot_index(slot_id).ok_or_else(|| {
        VaultError::InvariantViolation(InvariantViolation::KeySlotNotFound(slot_id.to_string()))
    })?;

    container.key_slots.remove(index);
    container.metadata.touch();
    info!(slot = %slot_id, remaining = container.key_slots.len(), "removed key slot");

    format::pack_v2(&container)
}

/// Public metadata for every key slot, in slot order.
pub fn list_keys(text: &str) -> Result<Vec<KeySlotInfo>> {
    let container = format::unpack_v2(text)?;
    Ok(container.key_slots.iter().map(KeySlotInfo::from).collect())
}

/// Id of the first slot whose key authenticates the content under `password`.
pub fn find_key_slot(text: &str, password: &str) -> Result<String> {
    ensure_password(password, "password")?;
    let container = format::unpack_v2(text)?;

    let (index, _) = open_content(&container, password)?;
    Ok(container.key_slots[index].id.clone())
}

/// Replace `old_password` with `new_password`: add a slot, then remove the old one.
pub fn rotate_key(
    text: &str,
    old_password: &str,
    new_password: &str,
    label: Option<&str>,
    params: &KdfParams,
) -> Result<Rotation> {
    let removed_slot_id = find_key_slot(text, old_password)?;

    let intermediate = add_key(text, old_password, new_password, label, params)?;
    let added_slot_id = format::unpack_v2(&intermediate)?
        .key_slots
        .last()
        .map(|slot| slot.id.clone())
        .ok_or_else(|| VaultError::SerializationError("rotation lost its new key slot".into()))?;

    let container = remove_key(&intermediate, new_password, &removed_slot_id)?;

    Ok(Rotation {
        intermediate,
        container,
        added_slot_id,
        removed_slot_id,
    })
}

// ---------------------------------------------------------------------------
// Slot helpers
// ---------------------------------------------------------------------------

/// Reject empty passwords before any key derivation happens.
pub(crate) fn ensure_password(password: &str, what: &str) -> Result<()> {
    if password.is_empty() {
        return Err(VaultError::Validation(format!("{what} cannot be empty")));
    }
    Ok(())
}

/// Wrap `dek` under a fresh KEK derived from `password`.
fn new_slot(
    dek: &DataKey,
    password: &str,
    label: Option<&str>,
    params: &KdfParams,
) -> Result<KeySlot> {
    let salt = generate_salt();
    let iv = generate_iv::<BLOCK_LEN>();

    let kek = derive_key(password.as_bytes(), &salt, params)?;
    let encrypted_dek = cbc_mode::encrypt(kek.as_slice(), &iv, dek.as_bytes())?;

    Ok(KeySlot {
        id: Uuid::new_v4().to_string(),
        algorithm: KDF_ALGORITHM.to_string(),
        iterations: params.iterations,
        salt: salt.to_vec(),
        encrypted_dek,
        iv: iv.to_vec(),
        created_at: Utc::now(),
        label: label.filter(|l| !l.is_empty()).map(str::to_string),
    })
}

/// Unwrap one slot's DEK bytes under `password`.
///
/// `DecryptionFailed` means the padding did not verify; any other error
/// is an internal failure.
fn unwrap_slot(slot: &KeySlot, password: &str) -> Result<Zeroizing<Vec<u8>>> {
    let params = KdfParams {
        iterations: slot.iterations,
    };
    let kek = derive_key(password.as_bytes(), &slot.salt, &params)?;

    cbc_mode::decrypt(kek.as_slice(), &slot.iv, &slot.encrypted_dek).map(Zeroizing::new)
}

/// Every slot that unwraps cleanly, paired with its index.
fn candidate_keys(
    container: &ContainerV2,
    password: &str,
) -> Result<Vec<(usize, Zeroizing<Vec<u8>>)>> {
    let mut candidates = Vec::new();

    for (index, slot) in container.key_slots.iter().enumerate() {
        match unwrap_slot(slot, password) {
            Ok(key) => candidates.push((index, key)),
            Err(VaultError::DecryptionFailed) => {
                debug!(slot = %slot.id, "key slot did not unwrap");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(candidates)
}

/// Find a candidate DEK that authenticates the content and decrypt it.
///
/// Returns the winning slot index and the plaintext bytes.  A candidate of
/// full DEK length that still fails authentication points at tampered
/// content rather than a wrong password, and is reported as `Integrity`.
///
/// A wrong password usually fails the padding check (`NoMatchingKeySlot`),
/// but about 1 in 256 slots unwraps to a short garbage key instead, giving
/// `ContentAuthenticationFailed`.  Callers should not rely on which.
fn open_content(
    container: &ContainerV2,
    password: &str,
) -> Result<(usize, Zeroizing<Vec<u8>>)> {
    let candidates = candidate_keys(container, password)?;
    if candidates.is_empty() {
        return Err(VaultError::Authentication(AuthFailure::NoMatchingKeySlot));
    }

    let mut verified_key_rejected = false;
    for (index, key) in &candidates {
        match encryption::decrypt(
            key,
            &container.content_iv,
            &container.ciphertext,
            &container.auth_tag,
        ) {
            Ok(plaintext) => {
                debug!(slot = %container.key_slots[*index].id, "content authenticated");
                return Ok((*index, Zeroizing::new(plaintext)));
            }
            Err(_) => verified_key_rejected |= key.len() == DEK_LEN,
        }
    }

    if verified_key_rejected {
        warn!("data key unwrapped but content failed authentication");
        Err(VaultError::Integrity)
    } else {
        Err(VaultError::Authentication(
            AuthFailure::ContentAuthenticationFailed,
        ))
    }
}

/// First slot that unwraps to a DEK-length key under `password`.
fn unlock_data_key(container: &ContainerV2, password: &str) -> Result<DataKey> {
    for slot in &container.key_slots {
        match unwrap_slot(slot, password) {
            Ok(bytes) => match DataKey::from_slice(&bytes) {
                Some(dek) => return Ok(dek),
                None => debug!(slot = %slot.id, len = bytes.len(), "unwrapped key has wrong length"),
            },
            Err(VaultError::DecryptionFailed) => {
                debug!(slot = %slot.id, "key slot did not unwrap");
            }
            Err(e) => return Err(e),
        }
    }

    Err(VaultError::Authentication(AuthFailure::NoMatchingKeySlot))
}

/// Convert decrypted bytes into text, wiping them if they are not UTF-8.
pub(crate) fn into_text(mut plaintext: Zeroizing<Vec<u8>>) -> Result<String> {
    String::from_utf8(std::mem::take(&mut *plaintext)).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        VaultError::Validation("decrypted content is not valid UTF-8 text".into())
    })
}
