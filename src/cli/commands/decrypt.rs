//! `filevault decrypt` — open a vault and recover the plaintext.

use std::path::{Path, PathBuf};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{load_engine, prompt_password};
use crate::errors::{Result, VaultError};
use crate::vault::{store, VaultFile};

/// Execute the `decrypt` command.
pub fn execute(file: &str, output_path: Option<&str>, to_stdout: bool, force: bool) -> Result<()> {
    let (settings, engine) = load_engine()?;
    let vault = VaultFile::open(Path::new(file))?;

    // Check the destination before asking for a password.
    let dest = if to_stdout {
        None
    } else {
        let dest = output_path.map_or_else(|| settings.plain_path_for(vault.path()), PathBuf::from);
        if store::exists(&dest) && !force {
            return Err(VaultError::FileAlreadyExists(dest));
        }
        Some(dest)
    };

    let password = prompt_password("Vault password")?;
    let plaintext = Zeroizing::new(engine.decrypt(vault.contents(), &password)?);

    match dest {
        None => print!("{}", plaintext.as_str()),
        Some(dest) => {
            store::write_atomic(&dest, &plaintext)?;
            output::success(&format!(
                "Decrypted {} ({}) -> {}",
                vault.path().display(),
                vault.version(),
                dest.display()
            ));
        }
    }

    Ok(())
}
