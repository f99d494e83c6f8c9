//! Integration tests for the vault text codec.
//!
//! Every malformed container must be rejected as a validation error
//! before any key derivation runs.

use filevault::errors::VaultError;
use filevault::vault::format::{pack_v1, pack_v2, unpack_v1, unpack_v2, ContainerV1};
use filevault::vault::{VaultConfig, VaultEngine, HEADER_V1, HEADER_V2};

fn engine() -> VaultEngine {
    VaultEngine::new(VaultConfig::with_iterations(1_000))
}

fn sample_v2() -> String {
    engine()
        .encrypt("format test", &["first-pw", "second-pw"], Some(&["One"][..]))
        .unwrap()
}

fn sample_v1() -> String {
    engine().encrypt_legacy("format test", "legacy-pw").unwrap()
}

/// Helper: replace one newline-separated field.
fn with_field(container: &str, index: usize, value: &str) -> String {
    let mut fields: Vec<&str> = container.split('\n').collect();
    fields[index] = value;
    fields.join("\n")
}

/// Helper: rewrite the key slots JSON through `serde_json::Value`.
fn with_slot_json(container: &str, edit: impl FnOnce(&mut serde_json::Value)) -> String {
    let fields: Vec<&str> = container.split('\n').collect();
    let mut slots: serde_json::Value = serde_json::from_str(fields[2]).unwrap();
    edit(&mut slots);
    with_field(container, 2, &slots.to_string())
}

fn assert_invalid(result: Result<impl std::fmt::Debug, VaultError>, needle: &str) {
    match result {
        Err(VaultError::Validation(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} should mention {needle:?}")
        }
        other => panic!("expected a validation error mentioning {needle:?}, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// V1
// ---------------------------------------------------------------------------

#[test]
fn v1_pack_unpack_preserves_fields() {
    let container = ContainerV1 {
        salt: [0x11; 32],
        iv: [0x22; 16],
        ciphertext: vec![0x33; 32],
    };
    let text = pack_v1(&container);

    assert_eq!(text.lines().next(), Some(HEADER_V1));
    assert_eq!(unpack_v1(&text).unwrap(), container);
}

#[test]
fn v1_too_few_fields() {
    let text = sample_v1();
    let truncated: Vec<&str> = text.split('\n').take(3).collect();
    assert_invalid(unpack_v1(&truncated.join("\n")), "4 newline-separated fields");
}

#[test]
fn v1_extra_data_rejected_but_trailing_newline_accepted() {
    let text = sample_v1();
    assert_invalid(unpack_v1(&format!("{text}\nextra")), "unexpected data");
    assert!(unpack_v1(&format!("{text}\n")).is_ok());
}

#[test]
fn v1_bad_salt_and_iv_lengths() {
    let text = sample_v1();
    assert_invalid(unpack_v1(&with_field(&text, 1, "abcd")), "salt must be 32 bytes");
    assert_invalid(unpack_v1(&with_field(&text, 2, &"00".repeat(12))), "IV must be 16 bytes");
}

#[test]
fn v1_bad_hex() {
    let text = sample_v1();
    assert_invalid(unpack_v1(&with_field(&text, 3, "zz")), "ciphertext is not valid hex");
}

#[test]
fn v1_ciphertext_must_be_whole_blocks() {
    let text = sample_v1();
    assert_invalid(unpack_v1(&with_field(&text, 3, "")), "ciphertext is empty");
    assert_invalid(unpack_v1(&with_field(&text, 3, &"00".repeat(20))), "multiple");
}

#[test]
fn v1_wrong_header() {
    let text = sample_v1();
    assert_invalid(unpack_v1(&with_field(&text, 0, HEADER_V2)), "header");
}

// ---------------------------------------------------------------------------
// V2
// ---------------------------------------------------------------------------

#[test]
fn v2_pack_unpack_is_stable() {
    let text = sample_v2();
    let container = unpack_v2(&text).unwrap();
    assert_eq!(pack_v2(&container).unwrap(), text);
}

#[test]
fn v2_uses_documented_json_field_names() {
    let text = sample_v2();
    let fields: Vec<&str> = text.split('\n').collect();
    assert_eq!(fields.len(), 6);

    let metadata: serde_json::Value = serde_json::from_str(fields[1]).unwrap();
    assert_eq!(metadata["formatVersion"], 2);
    assert_eq!(metadata["algorithm"], "aes-256-gcm");
    assert!(metadata["createdAt"].is_string());
    assert!(metadata["modifiedAt"].is_string());

    let slots: serde_json::Value = serde_json::from_str(fields[2]).unwrap();
    let first = &slots[0];
    assert_eq!(first["algorithm"], "pbkdf2-sha256");
    assert_eq!(first["iterations"], 1_000);
    assert_eq!(first["salt"].as_str().unwrap().len(), 64);
    assert_eq!(first["iv"].as_str().unwrap().len(), 32);
    assert_eq!(first["encryptedDEK"].as_str().unwrap().len(), 96);
    assert_eq!(first["label"], "One");
    // Unlabelled slots omit the field entirely.
    assert!(slots[1].get("label").is_none());

    assert_eq!(fields[3].len(), 32);
    assert_eq!(fields[4].len(), 32);
}

#[test]
fn v2_hex_is_case_insensitive() {
    let text = sample_v2();
    let upper = with_field(&text, 5, &text.split('\n').nth(5).unwrap().to_uppercase());
    let upper = with_field(&upper, 3, &upper.split('\n').nth(3).unwrap().to_uppercase());

    assert_eq!(engine().decrypt(&upper, "first-pw").unwrap(), "format test");
}

#[test]
fn v2_trailing_newline_tolerated() {
    let text = format!("{}\n", sample_v2());
    assert_eq!(engine().decrypt(&text, "second-pw").unwrap(), "format test");
}

#[test]
fn v2_too_few_fields() {
    let text = sample_v2();
    let truncated: Vec<&str> = text.split('\n').take(5).collect();
    assert_invalid(unpack_v2(&truncated.join("\n")), "6 newline-separated fields");
}

#[test]
fn v2_extra_data_rejected() {
    assert_invalid(unpack_v2(&format!("{}\n00", sample_v2())), "unexpected data");
}

#[test]
fn v2_wrong_header() {
    assert_invalid(unpack_v2(&with_field(&sample_v2(), 0, HEADER_V1)), "header");
}

#[test]
fn v2_malformed_metadata() {
    let text = sample_v2();
    assert_invalid(unpack_v2(&with_field(&text, 1, "{not json")), "metadata JSON");

    let wrong_version = text.split('\n').nth(1).unwrap().replace("\"formatVersion\":2", "\"formatVersion\":3");
    assert_invalid(unpack_v2(&with_field(&text, 1, &wrong_version)), "formatVersion");

    let wrong_algo = text.split('\n').nth(1).unwrap().replace("aes-256-gcm", "chacha20");
    assert_invalid(unpack_v2(&with_field(&text, 1, &wrong_algo)), "content algorithm");
}

#[test]
fn v2_malformed_slot_list() {
    let text = sample_v2();
    assert_invalid(unpack_v2(&with_field(&text, 2, "[")), "key slots JSON");
    assert_invalid(unpack_v2(&with_field(&text, 2, "[]")), "no key slots");
    assert_invalid(unpack_v2(&with_field(&text, 2, "{}")), "key slots JSON");
}

#[test]
fn v2_slot_field_checks() {
    let text = sample_v2();

    let empty_id = with_slot_json(&text, |s| s[1]["id"] = "".into());
    assert_invalid(unpack_v2(&empty_id), "key slot 1: id is empty");

    let duplicate = with_slot_json(&text, |s| {
        let first_id = s[0]["id"].clone();
        s[1]["id"] = first_id;
    });
    assert_invalid(unpack_v2(&duplicate), "duplicate id");

    let algo = with_slot_json(&text, |s| s[0]["algorithm"] = "scrypt".into());
    assert_invalid(unpack_v2(&algo), "unsupported algorithm");

    let zero_iter = with_slot_json(&text, |s| s[0]["iterations"] = 0.into());
    assert_invalid(unpack_v2(&zero_iter), "iterations");

    let huge_iter = with_slot_json(&text, |s| s[1]["iterations"] = u32::MAX.into());
    assert_invalid(unpack_v2(&huge_iter), "key slot 1: iterations must be between 1 and 5000000");

    let short_salt = with_slot_json(&text, |s| s[0]["salt"] = "00ff".into());
    assert_invalid(unpack_v2(&short_salt), "key slot 0: salt must be 32 bytes, got 2");

    let short_iv = with_slot_json(&text, |s| s[0]["iv"] = "00".repeat(8).into());
    assert_invalid(unpack_v2(&short_iv), "iv must be 16 bytes");

    let ragged_dek = with_slot_json(&text, |s| s[0]["encryptedDEK"] = "00".repeat(20).into());
    assert_invalid(unpack_v2(&ragged_dek), "encryptedDEK");

    let missing = with_slot_json(&text, |s| {
        s[0].as_object_mut().unwrap().remove("salt");
    });
    assert_invalid(unpack_v2(&missing), "key slots JSON");

    let bad_hex = with_slot_json(&text, |s| s[0]["salt"] = "xyz".into());
    assert_invalid(unpack_v2(&bad_hex), "key slots JSON");
}

#[test]
fn v2_content_field_checks() {
    let text = sample_v2();
    assert_invalid(unpack_v2(&with_field(&text, 3, "00")), "content IV must be 16 bytes");
    assert_invalid(unpack_v2(&with_field(&text, 4, &"00".repeat(12))), "auth tag must be 16 bytes");
    assert_invalid(unpack_v2(&with_field(&text, 5, "0g")), "ciphertext is not valid hex");
}

#[test]
fn excessive_iterations_rejected_before_any_derivation() {
    let mut container = unpack_v2(&sample_v2()).unwrap();
    container.key_slots[0].iterations = u32::MAX;
    let crafted = pack_v2(&container).unwrap();

    // Returns at once instead of running billions of PBKDF2 rounds.
    assert_invalid(engine().decrypt(&crafted, "wrong-password"), "iterations");
    assert_invalid(engine().add_key(&crafted, "first-pw", "other-pw", None), "iterations");
    assert_invalid(engine().find_key_slot(&crafted, "first-pw"), "iterations");
}

#[test]
fn malformed_container_fails_before_password_check() {
    // Wrong password plus broken container: the shape error wins.
    let broken = with_field(&sample_v2(), 3, "");
    assert!(matches!(
        engine().decrypt(&broken, "not-the-password"),
        Err(VaultError::Validation(_))
    ));
}
