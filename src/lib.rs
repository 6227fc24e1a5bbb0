//! # Refont
//!
//! A font override engine: it scans a document's stylesheets, classifies
//! every rule that resolves to a generic font category, and injects a
//! single stylesheet that rewrites those rules to the user's chosen
//! families, with live replacement for elements added later.
//!
//! ## Architecture
//!
//! - **utils**: session identifiers, font name normalization, errors
//! - **cache**: LRU cache and memoization, sync and shared-async
//! - **dom**: lightweight document model and style tag management
//! - **network**: stylesheet fetching for cross-origin sheets
//! - **scan**: raw CSS splitting and generic-family classification
//! - **rules**: override stylesheet assembly and the hosted catalog
//! - **replace**: debounced live replacement on rendered elements
//! - **engine**: orchestration, settings, and message handling

pub mod cache;
pub mod dom;
pub mod engine;
pub mod network;
pub mod replace;
pub mod rules;
pub mod scan;
pub mod settings;
pub mod utils;

pub use engine::{ActiveRoles, FontEngine};
pub use utils::{RefontError, Result, SessionIds, add_hash_suffix, fix_name};

/// Version of the engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the engine
pub const NAME: &str = "Refont";
