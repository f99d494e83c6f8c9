//! Vault format detection by header inspection.
//!
//! Works on any byte or text blob, so callers can classify a file before
//! knowing whether it is even UTF-8.

use std::fmt;

use super::format::{HEADER_V1, HEADER_V2};

/// Which container format a blob holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VaultVersion {
    NotAVault = 0,
    V1 = 1,
    V2 = 2,
}

impl VaultVersion {
    /// Numeric form: `0` for "not a vault", otherwise the format version.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<VaultVersion> for u8 {
    fn from(version: VaultVersion) -> Self {
        version.as_u8()
    }
}

impl fmt::Display for VaultVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAVault => write!(f, "not a vault"),
            Self::V1 => write!(f, "V1 (legacy, single password)"),
            Self::V2 => write!(f, "V2 (envelope, multi-password)"),
        }
    }
}

/// `true` if `data` starts with the legacy V1 header.
pub fn is_vault_file(data: impl AsRef<[u8]>) -> bool {
    data.as_ref().starts_with(HEADER_V1.as_bytes())
}

/// `true` if `data` starts with the envelope V2 header.
pub fn is_vault_file_v2(data: impl AsRef<[u8]>) -> bool {
    data.as_ref().starts_with(HEADER_V2.as_bytes())
}

/// Classify `data` as not-a-vault, V1 or V2.
pub fn get_vault_version(data: impl AsRef<[u8]>) -> VaultVersion {
    let data = data.as_ref();
    if is_vault_file_v2(data) {
        VaultVersion::V2
    } else if is_vault_file(data) {
        VaultVersion::V1
    } else {
        VaultVersion::NotAVault
    }
}
