//! One module per subcommand, each exposing `execute`.

pub mod add_key;
pub mod decrypt;
pub mod encrypt;
pub mod info;
pub mod list_keys;
pub mod migrate;
pub mod remove_key;
pub mod rotate;
