//! `VaultEngine`: the stateless entry point used by every collaborator.
//!
//! The engine holds nothing but configuration.  Each method takes a whole
//! container text plus credentials and returns a fresh value; a failed
//! call produces no container at all, so the caller's copy is never
//! half-changed.
//!
//! ```no_run
//! use filevault::vault::{VaultConfig, VaultEngine};
//!
//! let engine = VaultEngine::new(VaultConfig::default());
//! let sealed = engine.encrypt("db_password=hunter2", &["alice-pw", "bob-pw"], None)?;
//! assert_eq!(engine.decrypt(&sealed, "bob-pw")?, "db_password=hunter2");
//! # Ok::<(), filevault::errors::VaultError>(())
//! ```

use super::detect::{get_vault_version, VaultVersion};
use super::envelope::{self, Rotation};
use super::legacy;
use super::slot::KeySlotInfo;
use crate::crypto::kdf::KdfParams;
use crate::errors::{Result, VaultError};

/// Runtime configuration for the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VaultConfig {
    /// Key derivation parameters for new slots and for V1 vaults.
    pub kdf: KdfParams,
}

impl VaultConfig {
    /// Configuration with a specific PBKDF2 iteration count.
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            kdf: KdfParams { iterations },
        }
    }
}

/// Stateless vault engine parameterized by `VaultConfig`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultEngine {
    config: VaultConfig,
}

impl VaultEngine {
    pub fn new(config: VaultConfig) -> Self {
        Self { config }
    }

    /// Encrypt `plaintext` into a V2 vault that opens under each password.
    pub fn encrypt(
        &self,
        plaintext: &str,
        passwords: &[&str],
        labels: Option<&[&str]>,
    ) -> Result<String> {
        envelope::encrypt(plaintext, passwords, labels, &self.config.kdf)
    }

    /// Encrypt `plaintext` into a legacy V1 vault.
    pub fn encrypt_legacy(&self, plaintext: &str, password: &str) -> Result<String> {
        legacy::encrypt(plaintext, password, &self.config.kdf)
    }

    /// Decrypt a V1 or V2 vault, picking the format from its header.
    pub fn decrypt(&self, container: &str, password: &str) -> Result<String> {
        match get_vault_version(container) {
            VaultVersion::V1 => legacy::decrypt(container, password, &self.config.kdf),
            VaultVersion::V2 => envelope::decrypt(container, password),
            VaultVersion::NotAVault => Err(VaultError::Validation(
                "not a vault: missing FileVault header".into(),
            )),
        }
    }

    /// Add a key slot for `new_password` to a V2 vault.
    pub fn add_key(
        &self,
        container: &str,
        existing_password: &str,
        new_password: &str,
        label: Option<&str>,
    ) -> Result<String> {
        require_v2(container)?;
        envelope::add_key(
            container,
            existing_password,
            new_password,
            label,
            &self.config.kdf,
        )
    }

    /// Remove a key slot from a V2 vault.
    pub fn remove_key(&self, container: &str, auth_password: &str, slot_id: &str) -> Result<String> {
        require_v2(container)?;
        envelope::remove_key(container, auth_password, slot_id)
    }

    /// List the key slots of a V2 vault.
    pub fn list_keys(&self, container: &str) -> Result<Vec<KeySlotInfo>> {
        require_v2(container)?;
        envelope::list_keys(container)
    }

    /// Id of the slot that `password` opens.
    pub fn find_key_slot(&self, container: &str, password: &str) -> Result<String> {
        require_v2(container)?;
        envelope::find_key_slot(container, password)
    }

    /// Swap `old_password` for `new_password` in two steps (add, then remove).
    pub fn rotate_key(
        &self,
        container: &str,
        old_password: &str,
        new_password: &str,
        label: Option<&str>,
    ) -> Result<Rotation> {
        require_v2(container)?;
        envelope::rotate_key(
            container,
            old_password,
            new_password,
            label,
            &self.config.kdf,
        )
    }

    /// Upgrade a V1 vault to a single-slot V2 vault.
    pub fn upgrade(&self, container: &str, password: &str, label: Option<&str>) -> Result<String> {
        match get_vault_version(container) {
            VaultVersion::V1 => legacy::upgrade(container, password, label, &self.config.kdf),
            VaultVersion::V2 => Err(VaultError::Validation(
                "vault is already in V2 format".into(),
            )),
            VaultVersion::NotAVault => Err(VaultError::Validation(
                "not a vault: missing FileVault header".into(),
            )),
        }
    }
}

/// Key slots only exist in V2 vaults.
fn require_v2(container: &str) -> Result<()> {
    match get_vault_version(container) {
        VaultVersion::V2 => Ok(()),
        VaultVersion::V1 => Err(VaultError::Validation(
            "key slots are only supported by V2 vaults; upgrade this V1 vault first".into(),
        )),
        VaultVersion::NotAVault => Err(VaultError::Validation(
            "not a vault: missing FileVault header".into(),
        )),
    }
}
