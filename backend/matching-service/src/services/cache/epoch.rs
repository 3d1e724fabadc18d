//! Per-viewer invalidation epochs
//!
//! Every invalidation stamps the viewer with a fresh value from a global
//! clock. A writer snapshots the viewer's epoch before it starts and only
//! keeps its result if the epoch is unchanged afterwards.
//!
//! Entries older than the horizon are pruned once the map grows past the
//! prune threshold. A pruned viewer reads as the clock value at the last
//! prune, which is at least as large as any value that was dropped, so a
//! snapshot taken before a dropped stamp never matches again.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

pub(crate) const DEFAULT_PRUNE_THRESHOLD: usize = 4096;

#[derive(Debug)]
pub(crate) struct EpochTracker {
    clock: AtomicU64,
    floor: AtomicU64,
    stamps: DashMap<Uuid, (u64, Instant)>,
    horizon: Duration,
    prune_threshold: usize,
    next_prune_at: AtomicUsize,
}

impl EpochTracker {
    pub(crate) fn new(horizon: Duration, prune_threshold: usize) -> Self {
        let prune_threshold = prune_threshold.max(1);
        Self {
            clock: AtomicU64::new(0),
            floor: AtomicU64::new(0),
            stamps: DashMap::new(),
            horizon,
            prune_threshold,
            next_prune_at: AtomicUsize::new(prune_threshold),
        }
    }

    pub(crate) fn current(&self, viewer_id: Uuid) -> u64 {
        match self.stamps.get(&viewer_id) {
            Some(stamp) => stamp.0,
            None => self.floor.load(Ordering::SeqCst),
        }
    }

    pub(crate) fn bump(&self, viewer_id: Uuid) {
        let next = self.clock.fetch_add(1, Ordering::SeqCst) + 1;
        self.stamps.insert(viewer_id, (next, Instant::now()));

        if self.stamps.len() > self.next_prune_at.load(Ordering::Relaxed) {
            self.prune();
        }
    }

    pub(crate) fn tracked(&self) -> usize {
        self.stamps.len()
    }

    fn prune(&self) {
        // Floor first: anything removed below was stamped before this load.
        self.floor
            .store(self.clock.load(Ordering::SeqCst), Ordering::SeqCst);

        let before = self.stamps.len();
        let horizon = self.horizon;
        self.stamps.retain(|_, (_, at)| at.elapsed() < horizon);
        let after = self.stamps.len();

        self.next_prune_at
            .store(self.prune_threshold.max(after * 2), Ordering::Relaxed);
        debug!(before, after, "Pruned viewer invalidation epochs");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_changes_epoch() {
        let epochs = EpochTracker::new(Duration::from_secs(900), DEFAULT_PRUNE_THRESHOLD);
        let viewer = Uuid::new_v4();
        let other = Uuid::new_v4();

        let before = epochs.current(viewer);
        epochs.bump(viewer);
        assert_ne!(epochs.current(viewer), before);
        assert_eq!(epochs.current(other), 0);
    }

    #[test]
    fn test_many_invalidated_viewers_stay_bounded() {
        let epochs = EpochTracker::new(Duration::ZERO, 8);
        for _ in 0..1000 {
            epochs.bump(Uuid::new_v4());
        }
        assert!(epochs.tracked() <= 9, "tracked {}", epochs.tracked());
    }

    #[test]
    fn test_pruned_viewer_never_matches_an_older_snapshot() {
        let epochs = EpochTracker::new(Duration::ZERO, 2);
        let viewer = Uuid::new_v4();

        let snapshot = epochs.current(viewer);
        epochs.bump(viewer);
        for _ in 0..10 {
            epochs.bump(Uuid::new_v4());
        }

        assert_ne!(epochs.current(viewer), snapshot);
    }

    #[test]
    fn test_fresh_stamps_survive_pruning() {
        let epochs = EpochTracker::new(Duration::from_secs(900), 2);
        let viewers: Vec<Uuid> = (0..5).map(|_| Uuid::new_v4()).collect();
        for viewer in &viewers {
            epochs.bump(*viewer);
        }
        let stamps: Vec<u64> = viewers.iter().map(|v| epochs.current(*v)).collect();
        assert_eq!(stamps, vec![1, 2, 3, 4, 5]);
    }
}
