//! Per-series tombstone storage.
//!
//! [`MemTombstones`] keeps one [`RangeSet`] per series and folds new deletion
//! requests into it with [`RangeSet::add`]. Writes to the same store are
//! serialized by an internal lock; readers always receive an owned copy, so a
//! read pass never observes a set changing underneath it.
//!
//! How tombstones are persisted is up to the caller. [`MemTombstones::snapshot`]
//! returns a serde-serializable map for that purpose, and
//! [`MemTombstones::from_snapshot`] loads one back.

use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{PoisonError, RwLock},
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::range::{Range, RangeSet};

/// Opaque reference to a series.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SeriesRef(pub u64);

impl fmt::Display for SeriesRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read access to stored tombstones.
pub trait TombstoneReader {
    /// Deleted ranges for `series`; empty if nothing was deleted.
    fn get(&self, series: SeriesRef) -> RangeSet;

    /// All series with at least one deleted range, ordered by series.
    fn snapshot(&self) -> BTreeMap<SeriesRef, RangeSet>;

    /// Total number of stored ranges across all series.
    fn total(&self) -> u64;
}

/// In-memory tombstone store.
#[derive(Debug, Default)]
pub struct MemTombstones {
    series: RwLock<HashMap<SeriesRef, RangeSet>>,
}

impl MemTombstones {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from a previously taken [`TombstoneReader::snapshot`].
    ///
    /// Sets deserialized through serde have already been checked for
    /// ordering and bounds (see [`RangeSet::try_from_ranges`]).
    pub fn from_snapshot(snapshot: BTreeMap<SeriesRef, RangeSet>) -> Self {
        let series = snapshot
            .into_iter()
            .filter(|(_, ranges)| !ranges.is_empty())
            .collect();
        Self {
            series: RwLock::new(series),
        }
    }

    /// Record that `range` of `series` is deleted.
    pub fn add_interval(&self, series: SeriesRef, range: Range) {
        self.add_intervals(series, [range]);
    }

    /// Record several deleted ranges for `series`, in order.
    pub fn add_intervals<I>(&self, series: SeriesRef, ranges: I)
    where
        I: IntoIterator<Item = Range>,
    {
        let mut guard = self.series.write().unwrap_or_else(PoisonError::into_inner);
        let set = guard.entry(series).or_default();
        for range in ranges {
            set.add(range);
            debug!(
                "series {series}: tombstone [{}, {}] recorded ({} range(s) stored)",
                range.min,
                range.max,
                set.len()
            );
        }
        if set.is_empty() {
            guard.remove(&series);
        }
    }

    /// True if `t` is deleted for `series`.
    pub fn is_deleted(&self, series: SeriesRef, t: i64) -> bool {
        let guard = self.series.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(&series).is_some_and(|set| set.covers(t))
    }

    /// Number of series with at least one deleted range.
    pub fn num_series(&self) -> usize {
        self.series
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl TombstoneReader for MemTombstones {
    fn get(&self, series: SeriesRef) -> RangeSet {
        let guard = self.series.read().unwrap_or_else(PoisonError::into_inner);
        guard.get(&series).cloned().unwrap_or_default()
    }

    fn snapshot(&self) -> BTreeMap<SeriesRef, RangeSet> {
        let guard = self.series.read().unwrap_or_else(PoisonError::into_inner);
        guard
            .iter()
            .map(|(series, ranges)| (*series, ranges.clone()))
            .collect()
    }

    fn total(&self) -> u64 {
        let guard = self.series.read().unwrap_or_else(PoisonError::into_inner);
        guard.values().map(|set| set.len() as u64).sum()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use super::*;

    #[test]
    fn series_are_independent() {
        let store = MemTombstones::new();
        store.add_interval(SeriesRef(1), Range::new(1, 10));
        store.add_interval(SeriesRef(2), Range::new(5, 6));
        store.add_interval(SeriesRef(1), Range::new(10, 15));

        assert_eq!(store.get(SeriesRef(1)).as_slice(), &[Range::new(1, 15)]);
        assert_eq!(store.get(SeriesRef(2)).as_slice(), &[Range::new(5, 6)]);
        assert!(store.get(SeriesRef(3)).is_empty());
        assert_eq!(store.total(), 2);
        assert_eq!(store.num_series(), 2);
    }

    #[test]
    fn add_intervals_follows_first_match_merging() {
        let store = MemTombstones::new();
        store.add_intervals(
            SeriesRef(7),
            [
                Range::new(1, 10),
                Range::new(12, 20),
                Range::new(25, 30),
                Range::new(9, 23),
            ],
        );

        assert_eq!(
            store.get(SeriesRef(7)).as_slice(),
            &[Range::new(1, 23), Range::new(12, 20), Range::new(25, 30)]
        );
        assert!(store.is_deleted(SeriesRef(7), 22));
        assert!(!store.is_deleted(SeriesRef(7), 24));
    }

    #[test]
    fn empty_add_does_not_register_series() {
        let store = MemTombstones::new();
        store.add_intervals(SeriesRef(1), []);
        assert_eq!(store.num_series(), 0);
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn readers_get_independent_copies() {
        let store = MemTombstones::new();
        store.add_interval(SeriesRef(1), Range::new(1, 2));

        let before = store.get(SeriesRef(1));
        store.add_interval(SeriesRef(1), Range::new(5, 6));

        assert_eq!(before.len(), 1);
        assert_eq!(store.get(SeriesRef(1)).len(), 2);
    }

    #[test]
    fn snapshot_reloads_through_json() {
        let store = MemTombstones::new();
        store.add_interval(SeriesRef(2), Range::new(100, 200));
        store.add_interval(SeriesRef(1), Range::new(-5, 5));

        let json = serde_json::to_string(&store.snapshot()).unwrap();
        assert_eq!(
            json,
            r#"{"1":[{"min":-5,"max":5}],"2":[{"min":100,"max":200}]}"#
        );

        let snapshot: BTreeMap<SeriesRef, RangeSet> = serde_json::from_str(&json).unwrap();
        let reloaded = MemTombstones::from_snapshot(snapshot);
        assert_eq!(reloaded.snapshot(), store.snapshot());
    }

    #[test]
    fn snapshot_with_unsorted_or_inverted_ranges_fails_to_load() {
        let unsorted = r#"{"1":[{"min":50,"max":60},{"min":10,"max":20}]}"#;
        let err = serde_json::from_str::<BTreeMap<SeriesRef, RangeSet>>(unsorted).unwrap_err();
        assert!(err.to_string().contains("not sorted by min"), "{err}");

        let inverted = r#"{"1":[{"min":10,"max":20},{"min":50,"max":60},{"min":90,"max":3}]}"#;
        let err = serde_json::from_str::<BTreeMap<SeriesRef, RangeSet>>(inverted).unwrap_err();
        assert!(err.to_string().contains("Inverted range bounds"), "{err}");
    }

    #[test]
    fn concurrent_writers_on_distinct_series() {
        let store = Arc::new(MemTombstones::new());

        let handles: Vec<_> = (0..4u64)
            .map(|s| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..50 {
                        store.add_interval(SeriesRef(s), Range::new(i * 10, i * 10 + 5));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(store.num_series(), 4);
        assert_eq!(store.total(), 200);
        for s in 0..4 {
            assert!(store.get(SeriesRef(s)).is_well_formed());
        }
    }
}
