// ── Snapshot cache ──
//
// Short-lived cache in front of the aggregator for presentation
// consumers. Owned by whoever constructs it and injected explicitly;
// two aggregators only share a cache if handed the same `Arc`.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use tokio::time::Instant;
use tracing::trace;

use crate::model::HealthSnapshot;

struct Entry {
    stored_at: Instant,
    snapshot: Arc<HealthSnapshot>,
}

/// Holds the most recent snapshot for at most `ttl`.
///
/// Lock-free reads via `ArcSwapOption`. A zero TTL disables caching.
pub struct SnapshotCache {
    ttl: Duration,
    slot: ArcSwapOption<Entry>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: ArcSwapOption::empty(),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cached snapshot, if one exists and is younger than the TTL.
    pub fn get(&self) -> Option<Arc<HealthSnapshot>> {
        let guard = self.slot.load();
        let entry = guard.as_ref()?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(Arc::clone(&entry.snapshot))
        } else {
            trace!("cached snapshot expired");
            None
        }
    }

    /// Store `snapshot`, replacing any previous entry.
    pub fn insert(&self, snapshot: HealthSnapshot) -> Arc<HealthSnapshot> {
        let snapshot = Arc::new(snapshot);
        self.slot.store(Some(Arc::new(Entry {
            stored_at: Instant::now(),
            snapshot: Arc::clone(&snapshot),
        })));
        snapshot
    }

    /// Drop the cached snapshot so the next read recomputes.
    pub fn invalidate(&self) {
        self.slot.store(None);
    }

    /// Age of the cached entry, expired or not.
    pub fn age(&self) -> Option<Duration> {
        self.slot.load().as_ref().map(|e| e.stored_at.elapsed())
    }
}

impl std::fmt::Debug for SnapshotCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotCache")
            .field("ttl", &self.ttl)
            .field("age", &self.age())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;
    use std::net::IpAddr;

    use chrono::Utc;

    use super::*;
    use crate::model::{ConnectivityTest, OverallStatus};

    fn snapshot() -> HealthSnapshot {
        let host: IpAddr = "192.168.1.10".parse().unwrap();
        HealthSnapshot {
            timestamp: Utc::now(),
            overall_status: OverallStatus::Inactive,
            controller_authenticated: false,
            devices: None,
            network_health: None,
            client_health: None,
            tunnel: BTreeMap::new(),
            connectivity: ConnectivityTest::failed(host, host, 5, "not probed"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = SnapshotCache::new(Duration::from_secs(30));
        assert!(cache.get().is_none());

        let stored = cache.insert(snapshot());
        assert!(Arc::ptr_eq(&cache.get().unwrap(), &stored));

        tokio::time::advance(Duration::from_secs(29)).await;
        assert!(cache.get().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get().is_none());
        assert!(cache.age().unwrap() >= Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_drops_entry() {
        let cache = SnapshotCache::new(Duration::from_secs(30));
        cache.insert(snapshot());
        cache.invalidate();
        assert!(cache.get().is_none());
        assert_eq!(cache.age(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_ttl_never_hits() {
        let cache = SnapshotCache::new(Duration::ZERO);
        cache.insert(snapshot());
        assert!(cache.get().is_none());
    }
}
