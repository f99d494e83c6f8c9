//! Legacy (V1) single-password vaults.
//!
//! The content is AES-256-CBC encrypted directly under the PBKDF2 key.
//! There is no authentication tag: a wrong password is caught when the
//! padding or the UTF-8 decoding fails, and a tampered vault may decrypt
//! to altered text without any error.  V1 stays readable so existing
//! vaults can be opened and upgraded to V2.

use tracing::info;
use zeroize::{Zeroize, Zeroizing};

use super::envelope::{self, ensure_password};
use super::format::{self, ContainerV1};
use crate::crypto::cbc_mode::{self, BLOCK_LEN};
use crate::crypto::kdf::{derive_key, generate_salt, KdfParams};
use crate::crypto::keys::generate_iv;
use crate::errors::{AuthFailure, Result, VaultError};

/// Encrypt `plaintext` into a V1 vault under a single password.
pub fn encrypt(plaintext: &str, password: &str, params: &KdfParams) -> Result<String> {
    ensure_password(password, "password")?;

    let salt = generate_salt();
    let iv = generate_iv::<BLOCK_LEN>();
    let key = derive_key(password.as_bytes(), &salt, params)?;
    let ciphertext = cbc_mode::encrypt(key.as_slice(), &iv, plaintext.as_bytes())?;

    Ok(format::pack_v1(&ContainerV1 {
        salt,
        iv,
        ciphertext,
    }))
}

/// Decrypt a V1 vault.
///
/// V1 vaults do not record their iteration count, so `params` must match
/// the count the vault was written with.
pub fn decrypt(text: &str, password: &str, params: &KdfParams) -> Result<String> {
    ensure_password(password, "password")?;
    let container = format::unpack_v1(text)?;

    let key = derive_key(password.as_bytes(), &container.salt, params)?;
    let plaintext = cbc_mode::decrypt(key.as_slice(), &container.iv, &container.ciphertext)
        .map_err(|_| VaultError::Authentication(AuthFailure::NoMatchingKeySlot))?;

    String::from_utf8(plaintext).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        VaultError::Authentication(AuthFailure::ContentAuthenticationFailed)
    })
}

/// Re-encrypt a V1 vault as a single-slot V2 vault under the same password.
pub fn upgrade(
    text: &str,
    password: &str,
    label: Option<&str>,
    params: &KdfParams,
) -> Result<String> {
    let plaintext = Zeroizing::new(decrypt(text, password, params)?);
    let labels: Vec<&str> = label.into_iter().collect();

    let upgraded = envelope::encrypt(&plaintext, &[password], Some(labels.as_slice()), params)?;
    info!("upgraded V1 vault to V2");
    Ok(upgraded)
}
