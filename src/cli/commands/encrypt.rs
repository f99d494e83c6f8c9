//! `filevault encrypt` — seal a plaintext file into a vault.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_engine, prompt_new_password, PASSWORD_ENV};
use crate::config::FormatChoice;
use crate::errors::{Result, VaultError};
use crate::vault::{get_vault_version, store, VaultVersion};

/// Execute the `encrypt` command.
pub fn execute(
    file: &str,
    output_path: Option<&str>,
    label: Option<&str>,
    legacy: bool,
    force: bool,
) -> Result<()> {
    let (settings, engine) = load_engine()?;
    let source = Path::new(file);

    // 1. Read the plaintext.  Refuse to double-encrypt a vault.
    let plaintext = Zeroizing::new(store::read_to_string(source)?);
    if get_vault_version(plaintext.as_str()) != VaultVersion::NotAVault {
        return Err(VaultError::CommandFailed(format!(
            "{file} is already a vault"
        )));
    }

    // 2. Decide where the vault goes.
    let dest = output_path.map_or_else(|| settings.vault_path_for(source), PathBuf::from);
    if store::exists(&dest) && !force {
        return Err(VaultError::FileAlreadyExists(dest));
    }

    // 3. Choose the password and seal.
    let password = prompt_new_password(PASSWORD_ENV)?;
    let use_legacy = legacy || settings.default_format == FormatChoice::V1;

    let container = if use_legacy {
        if label.is_some() {
            output::warning("Labels are not stored in V1 vaults; ignoring --label.");
        }
        engine.encrypt_legacy(&plaintext, &password)?
    } else {
        let labels: Vec<&str> = label.into_iter().collect();
        engine.encrypt(&plaintext, &[password.as_str()], Some(labels.as_slice()))?
    };

    // 4. Persist atomically.
    store::write_atomic(&dest, &container)?;

    let format = if use_legacy { "V1" } else { "V2" };
    output::success(&format!("Encrypted {file} -> {} ({format})", dest.display()));
    if !use_legacy {
        output::tip("Run `filevault add-key <vault>` to let another password open it.");
    }

    Ok(())
}
