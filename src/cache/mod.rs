//! Bounded memoization for the expensive, pure parts of the pipeline
//!
//! Style scanning and rule building are recomputed on every settings change
//! and every preview; identical argument tuples must not redo the work.
//! Keys are value-based: the `serde_json` serialization of the full
//! argument list.

mod lru;
mod memo;

pub use lru::LruCache;
pub use memo::{DEFAULT_CACHE_SIZE, Memo, SharedComputation, SharedMemo};
