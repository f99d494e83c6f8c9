use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::crypto::kdf::{DEFAULT_ITERATIONS, MAX_ITERATIONS};
use crate::errors::{Result, VaultError};
use crate::vault::VaultConfig;

/// Container format written by `encrypt` when no flag overrides it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatChoice {
    /// Legacy single-password format.
    V1,
    /// Envelope format with key slots.
    #[default]
    V2,
}

/// Project-level configuration, loaded from `.filevault.toml`.
///
/// Every field has a sensible default so FileVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// PBKDF2 iteration count for new key slots and V1 vaults (default: 10 000).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Format written by `encrypt` (default: v2).
    #[serde(default)]
    pub default_format: FormatChoice,

    /// Extension appended to encrypted files, without the dot (default: vault).
    #[serde(default = "default_vault_extension")]
    pub vault_extension: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_pbkdf2_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_vault_extension() -> String {
    "vault".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            pbkdf2_iterations: default_pbkdf2_iterations(),
            default_format: FormatChoice::default(),
            vault_extension: default_vault_extension(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the project root.
    const FILE_NAME: &'static str = ".filevault.toml";

    /// Load settings from `<project_dir>/.filevault.toml`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let config_path = project_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.pbkdf2_iterations < 1 || self.pbkdf2_iterations > MAX_ITERATIONS {
            return Err(VaultError::ConfigError(format!(
                "pbkdf2_iterations must be between 1 and {MAX_ITERATIONS}, got {}",
                self.pbkdf2_iterations
            )));
        }
        if self.pbkdf2_iterations < DEFAULT_ITERATIONS {
            warn!(
                iterations = self.pbkdf2_iterations,
                recommended = DEFAULT_ITERATIONS,
                "pbkdf2_iterations below recommended value"
            );
        }
        if self.vault_extension.is_empty() || self.vault_extension.contains(['.', '/', '\\']) {
            return Err(VaultError::ConfigError(format!(
                "vault_extension '{}' must be a non-empty name without dots or slashes",
                self.vault_extension
            )));
        }
        Ok(())
    }

    /// Path an encrypted copy of `plain` is written to.
    ///
    /// Example: `notes.txt` -> `notes.txt.vault`
    pub fn vault_path_for(&self, plain: &Path) -> PathBuf {
        let mut name = plain.as_os_str().to_os_string();
        name.push(".");
        name.push(&self.vault_extension);
        PathBuf::from(name)
    }

    /// Path a decrypted copy of `vault` is written to.
    ///
    /// Strips the vault extension when present, otherwise appends
    /// `.decrypted`.  Example: `notes.txt.vault` -> `notes.txt`
    pub fn plain_path_for(&self, vault: &Path) -> PathBuf {
        if vault
            .extension()
            .is_some_and(|ext| ext == self.vault_extension.as_str())
        {
            return vault.with_extension("");
        }
        let mut name = vault.as_os_str().to_os_string();
        name.push(".decrypted");
        PathBuf::from(name)
    }

    /// Convert the settings into engine configuration.
    pub fn vault_config(&self) -> VaultConfig {
        VaultConfig::with_iterations(self.pbkdf2_iterations)
    }
}

// ── Tests ────────────────────────────────────────────────────────────
