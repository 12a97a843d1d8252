//! Persistent presence cache.
//!
//! # Reconciliation
//!
//! Each record of an inventory batch is folded into the cache by the first
//! rule that applies:
//!
//! 1. **Match**: an entry with the same identifier is refreshed. If it had
//!    gone unseen for at least the expiry, its announced flag is cleared so
//!    the tag is reported again.
//! 2. **Stale reuse**: the oldest entry that has expired is overwritten.
//! 3. **Append**: the record is appended, evicting the oldest entry first if
//!    the cache is full.
//!
//! ```text
//!   Unknown --capture--> Present/unannounced --consumer--> Present/announced
//!                               ^                                |
//!                               +------- re-seen after expiry ---+
//!
//!   any state --overwritten or evicted--> Unknown
//! ```

use std::time::Duration;

use serde::Serialize;
use tagwatch_core::{
    RingBuffer, TagId, TagRecord, Timestamp,
    constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_EXPIRY},
};
use tracing::{debug, trace};

/// Outcome counters of one [`PresenceCache::reconcile`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Matched entries whose timestamp was refreshed.
    pub refreshed: usize,
    /// Matched entries that had expired and were re-armed for announcement.
    pub rearmed: usize,
    /// New records written over an expired entry.
    pub reused: usize,
    /// New records appended.
    pub appended: usize,
    /// Entries dropped to make room for an append.
    pub evicted: usize,
}

impl ReconcileReport {
    /// Number of batch records folded into the cache.
    pub fn processed(&self) -> usize {
        self.refreshed + self.reused + self.appended
    }

    /// Whether any tag became eligible for announcement.
    pub fn has_new_presence(&self) -> bool {
        self.rearmed + self.reused + self.appended > 0
    }
}

/// Bounded set of tags currently considered present.
///
/// Holds at most `N` records, oldest first. Defaults to
/// [`DEFAULT_CACHE_CAPACITY`] slots.
#[derive(Debug, Clone)]
pub struct PresenceCache<const N: usize = DEFAULT_CACHE_CAPACITY> {
    store: RingBuffer<TagRecord, N>,
    expiry: Duration,
}

impl<const N: usize> PresenceCache<N> {
    /// Create an empty cache whose entries expire after `expiry`.
    pub fn new(expiry: Duration) -> Self {
        Self {
            store: RingBuffer::new(),
            expiry,
        }
    }

    /// Create an empty cache with the reader's default expiry.
    pub fn with_default_expiry() -> Self {
        Self::new(DEFAULT_EXPIRY)
    }

    /// Fold a captured batch into the cache at time `now`.
    ///
    /// Records are processed in batch order, so a tag reported twice in one
    /// batch matches the entry its first occurrence created.
    pub fn reconcile<'a, I>(&mut self, batch: I, now: Timestamp) -> ReconcileReport
    where
        I: IntoIterator<Item = &'a TagRecord>,
    {
        let mut report = ReconcileReport::default();

        for record in batch {
            self.fold(record, now, &mut report);
        }

        debug!(
            refreshed = report.refreshed,
            rearmed = report.rearmed,
            reused = report.reused,
            appended = report.appended,
            evicted = report.evicted,
            cached = self.store.len(),
            "batch reconciled"
        );
        report
    }

    fn fold(&mut self, record: &TagRecord, now: Timestamp, report: &mut ReconcileReport) {
        let expiry = self.expiry;

        if let Some(index) = self.store.position(|entry| entry.id == record.id) {
            let entry = &mut self.store[index];
            if entry.is_stale(now, expiry) {
                entry.announced = false;
                report.rearmed += 1;
                trace!(tag = %entry.id, "expired tag seen again");
            }
            entry.last_seen = now;
            report.refreshed += 1;
            return;
        }

        if let Some(index) = self.store.position(|entry| entry.is_stale(now, expiry)) {
            let entry = &mut self.store[index];
            trace!(old = %entry.id, new = %record.id, slot = index, "reusing stale slot");
            *entry = TagRecord::new(record.id, now);
            report.reused += 1;
            return;
        }

        if let Some(evicted) = self.store.enqueue_evicting(*record) {
            trace!(tag = %evicted.id, "cache full, evicted oldest");
            report.evicted += 1;
        }
        report.appended += 1;
    }

    /// Records from oldest to newest.
    pub fn records(&self) -> impl ExactSizeIterator<Item = &TagRecord> + Clone {
        self.store.iter()
    }

    /// Records still waiting to be announced, oldest first.
    pub fn pending_mut(&mut self) -> impl Iterator<Item = &mut TagRecord> {
        self.store.iter_mut().filter(|record| !record.announced)
    }

    /// Number of records waiting to be announced.
    pub fn pending_len(&self) -> usize {
        self.records().filter(|record| !record.announced).count()
    }

    /// Look up the record for `id`.
    pub fn get(&self, id: &TagId) -> Option<&TagRecord> {
        self.records().find(|record| record.id == *id)
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn capacity(&self) -> usize {
        N
    }

    pub fn expiry(&self) -> Duration {
        self.expiry
    }

    /// Forget every record.
    pub fn clear(&mut self) {
        self.store.clear();
    }
}

impl<const N: usize> Default for PresenceCache<N> {
    fn default() -> Self {
        Self::with_default_expiry()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> TagId {
        TagId::new(&[0xE2, byte]).unwrap()
    }

    fn at(ms: u32) -> Timestamp {
        Timestamp::from_millis(ms)
    }

    fn seen(byte: u8, ms: u32) -> TagRecord {
        TagRecord::new(id(byte), at(ms))
    }

    #[test]
    fn test_new_cache() {
        let cache: PresenceCache = PresenceCache::with_default_expiry();
        assert!(cache.is_empty());
        assert_eq!(cache.capacity(), DEFAULT_CACHE_CAPACITY);
        assert_eq!(cache.expiry(), Duration::from_millis(5000));
    }

    #[test]
    fn test_first_sighting_appends() {
        let mut cache: PresenceCache<4> = PresenceCache::default();

        let report = cache.reconcile(&[seen(1, 0)], at(0));

        assert_eq!(report.appended, 1);
        assert!(report.has_new_presence());
        let record = cache.get(&id(1)).unwrap();
        assert!(!record.announced);
        assert_eq!(record.last_seen, at(0));
    }

    #[test]
    fn test_match_refreshes_without_rearming() {
        let mut cache: PresenceCache<4> = PresenceCache::default();
        cache.reconcile(&[seen(1, 0)], at(0));
        cache.pending_mut().for_each(TagRecord::mark_announced);

        let report = cache.reconcile(&[seen(1, 4999)], at(4999));

        assert_eq!(report.refreshed, 1);
        assert_eq!(report.rearmed, 0);
        assert!(!report.has_new_presence());
        assert!(cache.get(&id(1)).unwrap().announced);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_match_after_expiry_rearms() {
        let mut cache: PresenceCache<4> = PresenceCache::default();
        cache.reconcile(&[seen(1, 0)], at(0));
        cache.pending_mut().for_each(TagRecord::mark_announced);

        let report = cache.reconcile(&[seen(1, 5000)], at(5000));

        assert_eq!(report.refreshed, 1);
        assert_eq!(report.rearmed, 1);
        let record = cache.get(&id(1)).unwrap();
        assert!(!record.announced);
        assert_eq!(record.last_seen, at(5000));
    }

    #[test]
    fn test_duplicate_in_batch_matches_first_occurrence() {
        let mut cache: PresenceCache<4> = PresenceCache::default();

        let report = cache.reconcile(&[seen(1, 0), seen(1, 0)], at(0));

        assert_eq!(report.appended, 1);
        assert_eq!(report.refreshed, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_match_wins_over_stale_reuse() {
        let mut cache: PresenceCache<4> = PresenceCache::default();
        cache.reconcile(&[seen(1, 0), seen(2, 0)], at(0));

        // Both entries are stale; the matching one is refreshed, not the first.
        let report = cache.reconcile(&[seen(2, 9000)], at(9000));

        assert_eq!(report.refreshed, 1);
        assert_eq!(report.reused, 0);
        assert_eq!(cache.get(&id(1)).unwrap().last_seen, at(0));
        assert_eq!(cache.get(&id(2)).unwrap().last_seen, at(9000));
    }

    #[test]
    fn test_stale_reuse_before_append() {
        let mut cache: PresenceCache<4> = PresenceCache::default();
        cache.reconcile(&[seen(1, 0), seen(2, 3000)], at(3000));

        let report = cache.reconcile(&[seen(3, 6000)], at(6000));

        // Entry 1 (last seen at 0) is stale even though the cache has room.
        assert_eq!(report.reused, 1);
        assert_eq!(report.appended, 0);
        let ids: Vec<TagId> = cache.records().map(|r| r.id).collect();
        assert_eq!(ids, vec![id(3), id(2)]);
    }

    #[test]
    fn test_pending_mut_skips_announced() {
        let mut cache: PresenceCache<4> = PresenceCache::default();
        cache.reconcile(&[seen(1, 0), seen(2, 0)], at(0));
        if let Some(first) = cache.pending_mut().next() {
            first.mark_announced();
        }

        assert_eq!(cache.pending_len(), 1);
        let pending: Vec<TagId> = cache.pending_mut().map(|r| r.id).collect();
        assert_eq!(pending, vec![id(2)]);
    }

    #[test]
    fn test_clear() {
        let mut cache: PresenceCache<4> = PresenceCache::default();
        cache.reconcile(&[seen(1, 0)], at(0));
        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.get(&id(1)).is_none());
    }

    #[test]
    fn test_report_processed() {
        let report = ReconcileReport {
            refreshed: 2,
            rearmed: 1,
            reused: 1,
            appended: 3,
            evicted: 2,
        };
        assert_eq!(report.processed(), 6);
    }
}
