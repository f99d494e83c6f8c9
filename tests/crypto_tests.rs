//! Integration tests for the FileVault crypto module.

use filevault::crypto::encryption::{self, IV_LEN, TAG_LEN};
use filevault::crypto::kdf::{KEY_LEN, SALT_LEN};
use filevault::crypto::{cbc_mode, derive_key, generate_iv, generate_salt, DataKey, KdfParams};
use filevault::errors::VaultError;

// ---------------------------------------------------------------------------
// AES-256-GCM (V2 content)
// ---------------------------------------------------------------------------

#[test]
fn gcm_encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let iv = [0x01u8; IV_LEN];
    let plaintext = b"DATABASE_URL=postgres://localhost/mydb";

    let sealed = encryption::encrypt(&key, &iv, plaintext).expect("encrypt should succeed");

    // GCM is a stream mode: no padding, tag kept separately.
    assert_eq!(sealed.ciphertext.len(), plaintext.len());
    assert_eq!(sealed.tag.len(), TAG_LEN);

    let recovered =
        encryption::decrypt(&key, &iv, &sealed.ciphertext, &sealed.tag).expect("decrypt");
    assert_eq!(recovered, plaintext);
}

#[test]
fn gcm_empty_plaintext_still_has_a_tag() {
    let key = [0x11u8; 32];
    let iv = generate_iv::<IV_LEN>();

    let sealed = encryption::encrypt(&key, &iv, b"").unwrap();
    assert!(sealed.ciphertext.is_empty());

    let recovered = encryption::decrypt(&key, &iv, &sealed.ciphertext, &sealed.tag).unwrap();
    assert!(recovered.is_empty());
}

#[test]
fn gcm_different_ivs_give_different_output() {
    let key = [0xCDu8; 32];
    let plaintext = b"SECRET=hello";

    let a = encryption::encrypt(&key, &generate_iv::<IV_LEN>(), plaintext).unwrap();
    let b = encryption::encrypt(&key, &generate_iv::<IV_LEN>(), plaintext).unwrap();

    assert_ne!(a.ciphertext, b.ciphertext, "fresh IVs must change the ciphertext");
}

#[test]
fn gcm_wrong_key_fails() {
    let iv = [0x02u8; IV_LEN];
    let sealed = encryption::encrypt(&[0x01u8; 32], &iv, b"top secret").unwrap();

    let result = encryption::decrypt(&[0x02u8; 32], &iv, &sealed.ciphertext, &sealed.tag);
    assert!(matches!(result, Err(VaultError::DecryptionFailed)));
}

#[test]
fn gcm_tampered_ciphertext_fails() {
    let key = [0x42u8; 32];
    let iv = [0x03u8; IV_LEN];
    let mut sealed = encryption::encrypt(&key, &iv, b"do not touch").unwrap();

    sealed.ciphertext[0] ^= 0x01;
    assert!(encryption::decrypt(&key, &iv, &sealed.ciphertext, &sealed.tag).is_err());
}

#[test]
fn gcm_tampered_tag_fails() {
    let key = [0x42u8; 32];
    let iv = [0x03u8; IV_LEN];
    let mut sealed = encryption::encrypt(&key, &iv, b"do not touch").unwrap();

    sealed.tag[TAG_LEN - 1] ^= 0x80;
    assert!(encryption::decrypt(&key, &iv, &sealed.ciphertext, &sealed.tag).is_err());
}

#[test]
fn gcm_rejects_bad_lengths_without_panicking() {
    let sealed = encryption::encrypt(&[0u8; 32], &[0u8; IV_LEN], b"x").unwrap();

    // Short key, short IV and short tag are all errors.
    assert!(encryption::encrypt(&[0u8; 16], &[0u8; IV_LEN], b"x").is_err());
    assert!(encryption::encrypt(&[0u8; 32], &[0u8; 12], b"x").is_err());
    assert!(encryption::decrypt(&[0u8; 32], &[0u8; IV_LEN], &sealed.ciphertext, &[0u8; 8]).is_err());
}

// ---------------------------------------------------------------------------
// AES-256-CBC (V1 content and key wrapping)
// ---------------------------------------------------------------------------

#[test]
fn cbc_wraps_a_data_key_into_three_blocks() {
    let kek = [0x07u8; 32];
    let iv = generate_iv::<16>();
    let dek = DataKey::generate();

    let wrapped = cbc_mode::encrypt(&kek, &iv, dek.as_bytes()).unwrap();
    // 32 key bytes plus one full block of PKCS#7 padding.
    assert_eq!(wrapped.len(), 48);

    let unwrapped = cbc_mode::decrypt(&kek, &iv, &wrapped).unwrap();
    assert_eq!(unwrapped.as_slice(), dek.as_bytes());
}

#[test]
fn cbc_empty_plaintext_is_one_padding_block() {
    let ct = cbc_mode::encrypt(&[0x01u8; 32], &[0u8; 16], b"").unwrap();
    assert_eq!(ct.len(), 16);
}

// ---------------------------------------------------------------------------
// Key derivation
// ---------------------------------------------------------------------------

#[test]
fn derive_key_is_deterministic() {
    let salt = [0x55u8; SALT_LEN];
    let params = KdfParams { iterations: 1_000 };

    let a = derive_key(b"my-password", &salt, &params).unwrap();
    let b = derive_key(b"my-password", &salt, &params).unwrap();

    assert_eq!(a.len(), KEY_LEN);
    assert_eq!(*a, *b);
}

#[test]
fn different_passwords_give_different_keys() {
    let salt = generate_salt();
    let params = KdfParams { iterations: 1_000 };

    let a = derive_key(b"password-one", &salt, &params).unwrap();
    let b = derive_key(b"password-two", &salt, &params).unwrap();
    assert_ne!(*a, *b);
}

#[test]
fn different_salts_give_different_keys() {
    let params = KdfParams { iterations: 1_000 };

    let a = derive_key(b"same-password", &generate_salt(), &params).unwrap();
    let b = derive_key(b"same-password", &generate_salt(), &params).unwrap();
    assert_ne!(*a, *b);
}

#[test]
fn default_params_use_ten_thousand_iterations() {
    assert_eq!(KdfParams::default().iterations, 10_000);
}
