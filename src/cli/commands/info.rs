//! `filevault info` — report the container format of a file.

use std::path::Path;

use crate::cli::{load_engine, output};
use crate::errors::{Result, VaultError};
use crate::vault::{get_vault_version, VaultVersion};

/// Execute the `info` command.
pub fn execute(file: &str) -> Result<()> {
    let path = Path::new(file);
    if !path.exists() {
        return Err(VaultError::FileNotFound(path.to_path_buf()));
    }

    // Detection works on raw bytes so binary files are reported, not rejected.
    let bytes = std::fs::read(path)?;
    let version = get_vault_version(&bytes);

    match version {
        VaultVersion::NotAVault => {
            output::info(&format!("{file}: not a FileVault vault"));
        }
        VaultVersion::V1 => {
            output::info(&format!("{file}: {version}, AES-256-CBC"));
            output::tip("Run `filevault migrate <vault>` to upgrade to V2.");
        }
        VaultVersion::V2 => {
            let (_, engine) = load_engine()?;
            let text = String::from_utf8(bytes).map_err(|_| {
                VaultError::Validation(format!("{file} is not valid UTF-8 text"))
            })?;
            let slots = engine.list_keys(&text)?;
            output::info(&format!(
                "{file}: {version}, AES-256-GCM, {} key slot(s)",
                slots.len()
            ));
        }
    }

    Ok(())
}
