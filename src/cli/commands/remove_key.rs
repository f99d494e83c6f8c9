//! `filevault remove-key` — revoke one key slot.

use std::path::Path;

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{load_engine, prompt_password};
use crate::errors::{Result, VaultError};
use crate::vault::VaultFile;

/// Execute the `remove-key` command.
pub fn execute(file: &str, slot_id: &str, force: bool) -> Result<()> {
    let (_, engine) = load_engine()?;
    let mut vault = VaultFile::open(Path::new(file))?;

    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Remove key slot {slot_id}? Its password will no longer open the vault"
            ))
            .default(false)
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            return Err(VaultError::UserCancelled);
        }
    }

    let password = prompt_password("Vault password")?;
    let updated = engine.remove_key(vault.contents(), &password, slot_id)?;
    vault.replace(updated)?;

    output::success(&format!(
        "Removed key slot {slot_id} from {}",
        vault.path().display()
    ));

    Ok(())
}
