use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::debug;

use crate::cache::SnapshotStore;

/// Default time-to-live of a cached result set
pub const DEFAULT_TTL_SECS: i64 = 60 * 60;

/// A timestamped result set, stored wholesale
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot<T> {
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub data: Vec<T>,
}

impl<T> Snapshot<T> {
    pub fn new(data: Vec<T>, taken_at: DateTime<Utc>) -> Self {
        Self {
            timestamp: taken_at.timestamp_millis(),
            data,
        }
    }

    /// Time since the snapshot was taken; `None` if the stored timestamp
    /// is too far from `now` to measure
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        now.timestamp_millis()
            .checked_sub(self.timestamp)
            .and_then(Duration::try_milliseconds)
    }

    /// A snapshot written "in the future" counts as fresh; an unmeasurable
    /// age never does
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age(now).is_some_and(|age| age <= ttl)
    }
}

#[derive(Serialize)]
struct SnapshotRef<'a, T> {
    timestamp: i64,
    data: &'a [T],
}

/// Typed TTL cache over a single store slot
///
/// Every failure (missing slot, unreadable store, corrupt JSON) reads as a
/// miss and every failed write is dropped. Caching only saves requests.
pub struct SnapshotCache<S> {
    store: S,
    ttl: Duration,
}

impl<S: SnapshotStore> SnapshotCache<S> {
    pub fn new(store: S) -> Self {
        Self::with_ttl(store, Duration::seconds(DEFAULT_TTL_SECS))
    }

    pub fn with_ttl(store: S, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load whatever snapshot is stored, however old
    pub fn load<T: DeserializeOwned>(&self) -> Option<Snapshot<T>> {
        let payload = match self.store.read() {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("Cache miss - slot is empty");
                return None;
            }
            Err(e) => {
                debug!("Cache read failed: {}", e);
                return None;
            }
        };

        match serde_json::from_str(&payload) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                debug!("Cached payload is unreadable: {}", e);
                None
            }
        }
    }

    /// Load the stored snapshot only if it is within the TTL at `now`
    pub fn read_fresh<T: DeserializeOwned>(&self, now: DateTime<Utc>) -> Option<Vec<T>> {
        self.load::<T>()
            .filter(|snapshot| snapshot.is_fresh(now, self.ttl))
            .map(|snapshot| snapshot.data)
    }

    /// Overwrite the slot with `data` stamped at `now`
    pub fn write<T: Serialize>(&self, data: &[T], now: DateTime<Utc>) {
        let snapshot = SnapshotRef {
            timestamp: now.timestamp_millis(),
            data,
        };

        let payload = match serde_json::to_string(&snapshot) {
            Ok(payload) => payload,
            Err(e) => {
                debug!("Failed to serialize snapshot: {}", e);
                return;
            }
        };

        if let Err(e) = self.store.write(&payload) {
            debug!("Failed to persist snapshot: {}", e);
        }
    }

    pub fn clear(&self) -> crate::cache::Result<()> {
        self.store.clear()
    }
}
