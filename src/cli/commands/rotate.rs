//! `filevault rotate-key` — replace one password with another.
//!
//! Rotation is an add followed by a remove.  Each step is written to disk
//! on its own, so an interrupted rotation leaves a vault that both the
//! old and the new password open.

use std::path::Path;

use tracing::info;

use crate::cli::output;
use crate::cli::{load_engine, prompt_new_password, prompt_password, NEW_PASSWORD_ENV};
use crate::errors::Result;
use crate::vault::VaultFile;

/// Execute the `rotate-key` command.
pub fn execute(file: &str, label: Option<&str>) -> Result<()> {
    let (_, engine) = load_engine()?;
    let mut vault = VaultFile::open(Path::new(file))?;

    let old_password = prompt_password("Current vault password")?;
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    let rotation = engine.rotate_key(vault.contents(), &old_password, &new_password, label)?;

    vault.replace(rotation.intermediate)?;
    info!(slot = %rotation.added_slot_id, "new key slot written");
    vault.replace(rotation.container)?;

    output::success(&format!(
        "Rotated key for {}: slot {} replaced by {}",
        vault.path().display(),
        rotation.removed_slot_id,
        rotation.added_slot_id
    ));
    output::tip("The old password no longer opens this vault.");

    Ok(())
}
