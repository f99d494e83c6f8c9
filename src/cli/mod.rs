//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

use crate::config::Settings;
use crate::errors::{Result, VaultError};
use crate::vault::VaultEngine;

/// Minimum length for passwords chosen through the CLI.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable holding an existing vault password (CI/CD).
pub const PASSWORD_ENV: &str = "FILEVAULT_PASSWORD";

/// Environment variable holding the password being added or rotated in.
pub const NEW_PASSWORD_ENV: &str = "FILEVAULT_NEW_PASSWORD";

/// Environment variable with a `tracing` filter directive.
pub const LOG_ENV: &str = "FILEVAULT_LOG";

/// FileVault CLI: password-protected file vaults.
#[derive(Parser)]
#[command(
    name = "filevault",
    about = "Password-protected file vaults with multiple keys",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt a file into a vault
    Encrypt {
        /// File to encrypt
        file: String,
        /// Output path (default: <file>.vault)
        #[arg(short, long)]
        output: Option<String>,
        /// Label for the first key slot (e.g. your name)
        #[arg(short, long)]
        label: Option<String>,
        /// Write the legacy single-password V1 format
        #[arg(long)]
        legacy: bool,
        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Decrypt a vault back to plaintext
    Decrypt {
        /// Vault file to decrypt
        file: String,
        /// Output path (default: vault path without its extension)
        #[arg(short, long, conflicts_with = "stdout")]
        output: Option<String>,
        /// Print the plaintext instead of writing a file
        #[arg(long)]
        stdout: bool,
        /// Overwrite the output file if it exists
        #[arg(short, long)]
        force: bool,
    },

    /// Add another password to a vault
    AddKey {
        /// Vault file
        file: String,
        /// Label for the new key slot
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Remove a password's key slot from a vault
    RemoveKey {
        /// Vault file
        file: String,
        /// Id of the key slot to remove (see `list-keys`)
        slot_id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// List the key slots of a vault
    ListKeys {
        /// Vault file
        file: String,
    },

    /// Replace one password with another
    RotateKey {
        /// Vault file
        file: String,
        /// Label for the new key slot
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Upgrade a legacy V1 vault to the V2 format
    Migrate {
        /// Vault file
        file: String,
        /// Label for the key slot
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Show which format a file is in
    Info {
        /// File to inspect
        file: String,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Install the stderr log subscriber.
///
/// `FILEVAULT_LOG` takes precedence; otherwise `--verbose` selects
/// `debug` and the default is `warn`.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (e.g. in tests) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Load `.filevault.toml` from the working directory and build an engine.
pub fn load_engine() -> Result<(Settings, VaultEngine)> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let engine = VaultEngine::new(settings.vault_config());
    Ok((settings, engine))
}

/// Get an existing vault password, trying in order:
/// 1. `FILEVAULT_PASSWORD` env var (CI/CD)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password(prompt: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt(prompt)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new password with confirmation.
///
/// Respects `env_var` for scripted/CI usage and enforces a minimum
/// password length.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            validate_new_password(&pw)?;
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose a new password")
            .with_confirmation("Confirm the new password", "Passwords do not match, try again")
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if let Err(e) = validate_new_password(&password) {
            output::warning(&format!("{e}. Try again."));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Enforce the CLI password policy for newly chosen passwords.
fn validate_new_password(password: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(VaultError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
