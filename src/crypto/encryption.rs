//! AES-256-GCM authenticated encryption with a detached tag.
//!
//! The V2 container stores the IV, tag and ciphertext as separate fields,
//! so unlike a nonce-prefixed blob this module takes the IV explicitly and
//! hands back the tag on its own.  The IV is 16 bytes (not the usual 12);
//! GCM derives its counter block from it via GHASH.
//!
//! Decryption verifies the tag before releasing any plaintext.

use aes_gcm::aead::consts::U16;
use aes_gcm::aead::{AeadInPlace, KeyInit};
use aes_gcm::{AesGcm, Nonce, Tag};

use crate::errors::{Result, VaultError};

/// AES-256-GCM with a 128-bit IV.
type Aes256Gcm16 = AesGcm<aes::Aes256, U16>;

/// Size of the content IV in bytes.
pub const IV_LEN: usize = 16;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Output of `encrypt`: ciphertext (same length as the plaintext) plus tag.
#[derive(Debug, Clone)]
pub struct Sealed {
    pub ciphertext: Vec<u8>,
    pub tag: [u8; TAG_LEN],
}

/// Encrypt `plaintext` with a 32-byte `key` under the given 16-byte `iv`.
pub fn encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Sealed> {
    if iv.len() != IV_LEN {
        return Err(VaultError::EncryptionFailed(format!(
            "IV must be {IV_LEN} bytes, got {}",
            iv.len()
        )));
    }

    let cipher = Aes256Gcm16::new_from_slice(key)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid key length: {e}")))?;

    let mut buffer = plaintext.to_vec();
    let tag = cipher
        .encrypt_in_place_detached(Nonce::<U16>::from_slice(iv), b"", &mut buffer)
        .map_err(|e| VaultError::EncryptionFailed(format!("encryption error: {e}")))?;

    let mut tag_bytes = [0u8; TAG_LEN];
    tag_bytes.copy_from_slice(&tag);

    Ok(Sealed {
        ciphertext: buffer,
        tag: tag_bytes,
    })
}

/// Decrypt and authenticate data produced by `encrypt`.
///
/// Any change to the ciphertext, tag, IV or key fails with
/// `DecryptionFailed` and yields no output.
pub fn decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8], tag: &[u8]) -> Result<Vec<u8>> {
    if iv.len() != IV_LEN || tag.len() != TAG_LEN {
        return Err(VaultError::DecryptionFailed);
    }

    let cipher = Aes256Gcm16::new_from_slice(key).map_err(|_| VaultError::DecryptionFailed)?;

    let mut buffer = ciphertext.to_vec();
    cipher
        .decrypt_in_place_detached(
            Nonce::<U16>::from_slice(iv),
            b"",
            &mut buffer,
            Tag::from_slice(tag),
        )
        .map_err(|_| VaultError::DecryptionFailed)?;

    Ok(buffer)
}
