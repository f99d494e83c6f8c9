use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in FileVault.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Input / container shape ---
    #[error("Invalid input: {0}")]
    Validation(String),

    // --- Credential errors ---
    #[error("Authentication failed: wrong password or corrupted data")]
    Authentication(AuthFailure),

    #[error("Integrity check failed: the vault content was tampered with or is corrupted")]
    Integrity,

    #[error("Key slot operation rejected: {0}")]
    InvariantViolation(InvariantViolation),

    // --- Crypto primitives ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Files ---
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("File already exists at {0} (use --force to overwrite)")]
    FileAlreadyExists(PathBuf),

    #[error("Not a vault file: {0}")]
    NotAVault(PathBuf),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Why a password failed to open a vault.
///
/// Both reasons are reported to users as the same authentication error;
/// they stay separate here so diagnostics can tell them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    /// No key slot unwrapped cleanly under the password.
    #[error("no key slot matches the password")]
    NoMatchingKeySlot,

    /// At least one slot unwrapped, but no candidate key authenticated the content.
    #[error("a key slot unwrapped but the content did not authenticate")]
    ContentAuthenticationFailed,
}

/// Key-slot invariants that a mutation would break.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("cannot remove the last remaining key slot")]
    CannotRemoveLastKey,

    #[error("key slot '{0}' not found")]
    KeySlotNotFound(String),
}

impl VaultError {
    /// The underlying reason for an authentication failure, if this is one.
    pub fn auth_failure(&self) -> Option<AuthFailure> {
        match self {
            Self::Authentication(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Convenience type alias for FileVault results.
pub type Result<T> = std::result::Result<T, VaultError>;
