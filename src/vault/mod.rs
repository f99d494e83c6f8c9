//! Vault module: container formats and the encryption engine.
//!
//! This module provides:
//! - V1 / V2 container types and the strict text codec (`format`)
//! - `KeySlot` and `KeySlotInfo` types (`slot`)
//! - Header-based format detection (`detect`)
//! - Envelope (V2) encryption and key-slot lifecycle (`envelope`)
//! - Legacy (V1) encryption and V1 to V2 upgrade (`legacy`)
//! - The stateless `VaultEngine` facade (`engine`)
//! - Whole-file storage helpers (`store`)

pub mod detect;
pub mod engine;
pub mod envelope;
pub mod format;
pub mod legacy;
pub mod slot;
pub mod store;

// Re-export the most commonly used items.
pub use detect::{get_vault_version, is_vault_file, is_vault_file_v2, VaultVersion};
pub use engine::{VaultConfig, VaultEngine};
pub use envelope::Rotation;
pub use format::{ContainerV1, ContainerV2, Metadata, HEADER_V1, HEADER_V2};
pub use slot::{KeySlot, KeySlotInfo};
pub use store::VaultFile;
