// Persistent cache slot for the projects gallery
// One key, one timestamped payload, overwritten wholesale

pub mod cache;
pub mod snapshot;

pub use cache::{CacheError, MemoryStore, SnapshotStore, SqliteStore};
pub use snapshot::{Snapshot, SnapshotCache, DEFAULT_TTL_SECS};
