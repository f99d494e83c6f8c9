//! Password-based key derivation using PBKDF2-HMAC-SHA256.
//!
//! PBKDF2 is deliberately slow: every guess costs `iterations` HMAC
//! rounds.  The iteration count is configurable via `KdfParams` so tests
//! can run with a reduced count while production uses the default.

use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// Iteration count used when nothing else is configured.
pub const DEFAULT_ITERATIONS: u32 = 10_000;

/// Largest iteration count accepted from a vault file or config.
pub const MAX_ITERATIONS: u32 = 5_000_000;

/// Identifier written into every key slot's `algorithm` field.
pub const KDF_ALGORITHM: &str = "pbkdf2-sha256";

/// Configurable PBKDF2 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Number of HMAC-SHA256 rounds (default: 10 000).
    pub iterations: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

/// Derive a 32-byte key from a password and salt.
///
/// The same password + salt + params will always produce the same key.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    params: &KdfParams,
) -> Result<Zeroizing<[u8; KEY_LEN]>> {
    if params.iterations < 1 || params.iterations > MAX_ITERATIONS {
        return Err(VaultError::KeyDerivationFailed(format!(
            "PBKDF2 iterations must be between 1 and {MAX_ITERATIONS}, got {}",
            params.iterations
        )));
    }

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    pbkdf2::pbkdf2::<Hmac<Sha256>>(password, salt, params.iterations, key.as_mut_slice())
        .map_err(|e| VaultError::KeyDerivationFailed(format!("PBKDF2 failed: {e}")))?;

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: KdfParams = KdfParams { iterations: 1_000 };

    #[test]
    fn zero_iterations_rejected() {
        let result = derive_key(b"pw", &[0u8; SALT_LEN], &KdfParams { iterations: 0 });
        assert!(matches!(result, Err(VaultError::KeyDerivationFailed(_))));
    }

    #[test]
    fn iterations_above_maximum_rejected() {
        let params = KdfParams {
            iterations: MAX_ITERATIONS + 1,
        };
        let result = derive_key(b"pw", &[0u8; SALT_LEN], &params);
        assert!(matches!(result, Err(VaultError::KeyDerivationFailed(_))));
    }

    #[test]
    fn iteration_count_changes_the_key() {
        let salt = [0x11u8; SALT_LEN];
        let a = derive_key(b"pw", &salt, &FAST).unwrap();
        let b = derive_key(b"pw", &salt, &KdfParams { iterations: 1_001 }).unwrap();
        assert_ne!(*a, *b);
    }

    #[test]
    fn matches_rfc7914_pbkdf2_sha256_vector() {
        // RFC 7914 section 11: P="passwd", S="salt", c=1, dkLen=64 (first 32 bytes).
        let key = derive_key(b"passwd", b"salt", &KdfParams { iterations: 1 }).unwrap();
        assert_eq!(
            hex::encode(*key),
            "55ac046e56e3089fec1691c22544b605f94185216dde0465e68b9d57c20dacbc"
        );
    }

    #[test]
    fn salts_are_fresh() {
        assert_ne!(generate_salt(), generate_salt());
    }
}
