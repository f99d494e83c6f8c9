//! Random key material: the data encryption key (DEK) and IVs.
//!
//! A V2 vault encrypts its content once under a random DEK.  The DEK is
//! never derived from a password; each password only wraps a copy of it
//! inside a key slot.

use rand::RngCore;
use zeroize::Zeroize;

/// Length of the data encryption key (256 bits).
pub const DEK_LEN: usize = 32;

/// A wrapper around a 32-byte data encryption key that automatically
/// zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DataKey {
    bytes: [u8; DEK_LEN],
}

impl DataKey {
    /// Generate a fresh random DEK.
    pub fn generate() -> Self {
        let mut bytes = [0u8; DEK_LEN];
        rand::rng().fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Rebuild a DEK from unwrapped key-slot bytes.
    ///
    /// Returns `None` unless `bytes` is exactly `DEK_LEN` long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let bytes: [u8; DEK_LEN] = bytes.try_into().ok()?;
        Some(Self { bytes })
    }

    /// Access the raw key bytes (e.g. to pass to encryption).
    pub fn as_bytes(&self) -> &[u8; DEK_LEN] {
        &self.bytes
    }
}

/// Generate a random IV of `N` bytes.
pub fn generate_iv<const N: usize>() -> [u8; N] {
    let mut iv = [0u8; N];
    rand::rng().fill_bytes(&mut iv);
    iv
}
