//! Project configuration loaded from `.filevault.toml`.

pub mod settings;

pub use settings::{FormatChoice, Settings};
