//! AES-256-CBC with PKCS#7 padding.
//!
//! Used for two things: the legacy V1 content cipher, and wrapping the
//! data key inside each V2 key slot.  CBC carries no authentication tag,
//! so a wrong key is only noticed when the padding fails to verify.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::errors::{Result, VaultError};

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES block size in bytes.  Also the required IV length.
pub const BLOCK_LEN: usize = 16;

/// Encrypt `plaintext` under a 32-byte `key` and 16-byte `iv`.
pub fn encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    let cipher = Aes256CbcEnc::new_from_slices(key, iv)
        .map_err(|e| VaultError::EncryptionFailed(format!("invalid CBC key or IV length: {e}")))?;

    Ok(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Decrypt and unpad data produced by `encrypt`.
///
/// Fails with `DecryptionFailed` when the padding does not verify, which
/// is how a wrong key usually shows up.  A wrong key can still pass the
/// padding check by chance and return garbage.
pub fn decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    let cipher =
        Aes256CbcDec::new_from_slices(key, iv).map_err(|_| VaultError::DecryptionFailed)?;

    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| VaultError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_pads_to_block_size() {
        let key = [0x42u8; 32];
        let iv = [0x07u8; BLOCK_LEN];

        let ct = encrypt(&key, &iv, b"hello vault").unwrap();
        assert_eq!(ct.len(), BLOCK_LEN);
        assert_eq!(decrypt(&key, &iv, &ct).unwrap(), b"hello vault");
    }

    #[test]
    fn full_block_input_gains_a_padding_block() {
        let key = [0x42u8; 32];
        let iv = [0x07u8; BLOCK_LEN];

        let ct = encrypt(&key, &iv, &[0u8; 32]).unwrap();
        assert_eq!(ct.len(), 48);
    }

    #[test]
    fn truncated_ciphertext_fails() {
        let key = [0x42u8; 32];
        let iv = [0x07u8; BLOCK_LEN];
        let ct = encrypt(&key, &iv, b"some text").unwrap();

        assert!(decrypt(&key, &iv, &ct[..10]).is_err());
    }

    #[test]
    fn wrong_key_length_is_an_error_not_a_panic() {
        assert!(encrypt(&[0u8; 16], &[0u8; BLOCK_LEN], b"x").is_err());
        assert!(decrypt(&[0u8; 32], &[0u8; 8], &[0u8; 16]).is_err());
    }
}
