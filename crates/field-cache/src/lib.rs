//! Persistent hour-bucketed storage for assembled wind fields.
//!
//! The cache has no explicit TTL: keys embed the wall-clock hour, so a new
//! hour means a new key and the previous entry simply goes stale. The file
//! store adds an eviction sweep since stale entries would otherwise
//! accumulate indefinitely.

pub mod entry;
pub mod file;
pub mod key;
pub mod memory;
pub mod store;

pub use entry::CacheEntry;
pub use file::FileFieldCache;
pub use key::{CacheKey, WIND_KEY_PREFIX};
pub use memory::{CacheStats, MemoryFieldCache};
pub use store::{CacheError, FieldCache};
