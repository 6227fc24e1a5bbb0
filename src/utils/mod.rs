//! Shared utilities: error types, identifier generation, font name handling.

pub mod error;
pub mod ident;
pub mod names;

pub use error::{RefontError, Result};
pub use ident::{SessionIds, add_hash_suffix, generate_hash};
pub use names::fix_name;
