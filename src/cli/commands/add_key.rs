//! `filevault add-key` — let another password open a vault.

use std::path::Path;

use crate::cli::output;
use crate::cli::{load_engine, prompt_new_password, prompt_password, NEW_PASSWORD_ENV};
use crate::errors::Result;
use crate::vault::VaultFile;

/// Execute the `add-key` command.
pub fn execute(file: &str, label: Option<&str>) -> Result<()> {
    let (_, engine) = load_engine()?;
    let mut vault = VaultFile::open(Path::new(file))?;

    let existing = prompt_password("Existing vault password")?;
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    let updated = engine.add_key(vault.contents(), &existing, &new_password, label)?;
    vault.replace(updated)?;

    // New slots are appended, so the last one is ours.
    let slots = engine.list_keys(vault.contents())?;
    let new_id = slots.last().map(|slot| slot.id.as_str()).unwrap_or_default();
    output::success(&format!(
        "Added key slot {new_id} to {} ({} slots)",
        vault.path().display(),
        slots.len()
    ));

    Ok(())
}
