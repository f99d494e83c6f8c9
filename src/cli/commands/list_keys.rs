//! `filevault list-keys` — show key slots without any password.

use std::path::Path;

use crate::cli::{load_engine, output};
use crate::errors::Result;
use crate::vault::VaultFile;

/// Execute the `list-keys` command.
pub fn execute(file: &str) -> Result<()> {
    let (_, engine) = load_engine()?;
    let vault = VaultFile::open(Path::new(file))?;

    let slots = engine.list_keys(vault.contents())?;
    output::print_key_slots_table(&slots);
    output::info(&format!("{} key slot(s)", slots.len()));

    Ok(())
}
