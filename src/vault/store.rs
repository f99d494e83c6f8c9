//! Whole-file storage for vault containers.
//!
//! The engine itself only works on in-memory text.  This module is the
//! storage side used by the CLI: read a file whole, write one atomically,
//! and keep track of which format a vault file holds.
//!
//! There is no locking.  Two processes mutating the same vault at once
//! can lose an update (last writer wins).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::detect::{get_vault_version, VaultVersion};
use crate::errors::{Result, VaultError};

/// `true` if something exists at `path`.
pub fn exists(path: &Path) -> bool {
    path.exists()
}

/// Read a whole file as UTF-8 text.
pub fn read_to_string(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(VaultError::FileNotFound(path.to_path_buf()));
    }

    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| {
        VaultError::Validation(format!("{} is not valid UTF-8 text", path.display()))
    })
}

/// Write `contents` to `path` **atomically**.
///
/// Writes to a per-process temp file in the same directory, then renames
/// it over the target, so readers never see a half-written file.  The temp
/// file is removed if any step fails.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let tmp_path = parent.join(format!(
        ".{}.{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy(),
        std::process::id()
    ));

    if let Err(e) = write_then_rename(&tmp_path, path, contents) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    debug!(path = %path.display(), bytes = contents.len(), "wrote file");

    Ok(())
}

fn write_then_rename(tmp_path: &Path, path: &Path, contents: &str) -> Result<()> {
    fs::write(tmp_path, contents)?;

    // Vault files and decrypted output are owner-only on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp_path, fs::Permissions::from_mode(0o600))?;
    }

    fs::rename(tmp_path, path)?;
    Ok(())
}

/// A vault container loaded from disk.
pub struct VaultFile {
    /// Path to the vault file on disk.
    path: PathBuf,

    /// The container text exactly as stored.
    contents: String,

    /// Format detected from the header.
    version: VaultVersion,
}

impl VaultFile {
    /// Load the vault at `path`.  Fails with `NotAVault` if the file has
    /// no FileVault header.
    pub fn open(path: &Path) -> Result<Self> {
        let contents = read_to_string(path)?;
        let version = get_vault_version(&contents);

        if version == VaultVersion::NotAVault {
            return Err(VaultError::NotAVault(path.to_path_buf()));
        }

        Ok(Self {
            path: path.to_path_buf(),
            contents,
            version,
        })
    }

    /// Commit a new container produced by the engine.
    ///
    /// Only call this with the result of a successful engine operation;
    /// the file on disk is replaced in one rename.
    pub fn replace(&mut self, contents: String) -> Result<()> {
        write_atomic(&self.path, &contents)?;
        self.version = get_vault_version(&contents);
        self.contents = contents;
        Ok(())
    }

    /// Returns the path to the vault file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the container text.
    pub fn contents(&self) -> &str {
        &self.contents
    }

    /// Returns the detected format.
    pub fn version(&self) -> VaultVersion {
        self.version
    }
}
