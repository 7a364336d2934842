// Cache module for the per-account JSON document.
// Covers path resolution, the unified store, and legacy migration.

mod migrate;
pub mod paths;
pub mod store;
pub mod version;

pub use paths::cache_root;
pub use store::{CacheDocument, CacheStore, LoadedCache};
