//! Session-unique identifiers for injected CSS names
//!
//! Injected class names and the style tag id must never collide with the
//! page's own CSS, so every name carries a random alphanumeric suffix
//! regenerated once per session. 62^6 possibilities is plenty for a page
//! lifetime; nothing here is cryptographic.

use std::hash::{BuildHasher, Hasher, RandomState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

const SYMBOLS: &[u8; 62] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

static COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate `length` random alphanumeric symbols.
///
/// # Panics
///
/// Panics if `length` is zero; that is a programming error, not a runtime
/// condition.
pub fn generate_hash(length: usize) -> String {
    assert!(length > 0, "invalid length for hash generation: {length}");

    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;
    // The counter keeps back-to-back calls distinct even on a coarse clock.
    let salt = COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut state = {
        let mut hasher = RandomState::new().build_hasher();
        hasher.write_u64(nanos ^ salt.rotate_left(32));
        hasher.finish() | 1
    };

    (0..length)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            SYMBOLS[(state % SYMBOLS.len() as u64) as usize] as char
        })
        .collect()
}

/// Append a 6-symbol random suffix: `prefix` becomes `prefix__aoKdiK`.
pub fn add_hash_suffix(prefix: &str) -> String {
    format!("{prefix}__{}", generate_hash(6))
}

/// Generated CSS identifiers owned by one engine instance.
///
/// Regenerated per session, so external code must discover the injected
/// style tag by content, not by a fixed id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIds {
    /// Custom property holding the emoji fallback stack
    pub fallback_class: String,
    /// Custom property holding the user's sans/default font stack
    pub sans_class: String,
    /// Custom property holding the user's monospace font stack
    pub monospace_class: String,
    /// Id of the injected `<style>` element
    pub style_tag_id: String,
}

impl SessionIds {
    /// Generate a fresh set of identifiers for a new session.
    pub fn generate() -> Self {
        Self {
            fallback_class: add_hash_suffix("fallback"),
            sans_class: add_hash_suffix("sans"),
            monospace_class: add_hash_suffix("monospace"),
            style_tag_id: add_hash_suffix("style"),
        }
    }

    /// `var(--sans__xxxxxx)` reference to the sans custom property.
    pub fn sans_var(&self) -> String {
        format!("var(--{})", self.sans_class)
    }

    /// `var(--monospace__xxxxxx)` reference to the monospace custom property.
    pub fn monospace_var(&self) -> String {
        format!("var(--{})", self.monospace_class)
    }
}
