//! `filevault migrate` — upgrade a V1 vault to the V2 envelope format.

use std::path::Path;

use crate::cli::output;
use crate::cli::{load_engine, prompt_password};
use crate::errors::Result;
use crate::vault::{VaultFile, VaultVersion};

/// Execute the `migrate` command.
pub fn execute(file: &str, label: Option<&str>) -> Result<()> {
    let (_, engine) = load_engine()?;
    let mut vault = VaultFile::open(Path::new(file))?;

    if vault.version() == VaultVersion::V2 {
        output::info(&format!("{} is already a V2 vault", vault.path().display()));
        return Ok(());
    }

    let password = prompt_password("Vault password")?;
    let upgraded = engine.upgrade(vault.contents(), &password, label)?;
    vault.replace(upgraded)?;

    output::success(&format!("Upgraded {} to V2", vault.path().display()));
    output::tip("Run `filevault add-key <vault>` to add more passwords.");

    Ok(())
}
