//! Closed time ranges and ordered range sets.
//!
//! A [`Range`] is an inclusive `[min, max]` interval of timestamps. A
//! [`RangeSet`] is the ordered list of deleted ranges recorded for a single
//! series or chunk.
//!
//! `RangeSet` only grows through [`RangeSet::add`] (see [`crate::merge`]),
//! which keeps the set sorted by `min`. Sets built that way are also free of
//! overlapping or touching neighbours, except in the one case documented on
//! [`crate::merge::merge_first_match`].
//!
//! ```
//! use timeseries_tombstones_core::range::{Range, RangeSet};
//!
//! let mut deleted = RangeSet::new();
//! deleted.add(Range::new(1, 10));
//! deleted.add(Range::new(8, 12));
//!
//! assert_eq!(deleted.as_slice(), &[Range::new(1, 12)]);
//! assert!(deleted.covers(12));
//! assert!(!deleted.covers(13));
//! ```

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::merge::merge_first_match;

/// Errors raised when ranges loaded from outside the merger break the
/// [`RangeSet`] ordering contract.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum RangeError {
    /// A range has `min > max`.
    #[snafu(display("Inverted range bounds: min={min} > max={max}"))]
    InvertedBounds {
        /// Lower bound as supplied.
        min: i64,
        /// Upper bound as supplied.
        max: i64,
    },

    /// A range starts before the one preceding it.
    #[snafu(display(
        "Ranges not sorted by min: range {index} starts at {min}, before previous start {prev_min}"
    ))]
    Unsorted {
        /// Position of the offending range.
        index: usize,
        /// `min` of the range at `index - 1`.
        prev_min: i64,
        /// `min` of the range at `index`.
        min: i64,
    },
}

/// Inclusive interval `[min, max]` of timestamps.
///
/// Deserializing rejects `min > max` with [`RangeError::InvertedBounds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct Range {
    /// First deleted timestamp (inclusive).
    pub min: i64,
    /// Last deleted timestamp (inclusive).
    pub max: i64,
}

impl Range {
    /// Build a range from inclusive bounds.
    ///
    /// Requires `min <= max`; this is checked with a debug assertion only.
    /// Use [`Range::try_new`] for bounds coming from untrusted input.
    pub fn new(min: i64, max: i64) -> Self {
        debug_assert!(min <= max, "Range::new expects min <= max; got [{min}, {max}]");
        Self { min, max }
    }

    /// Build a range, returning `None` when `min > max`.
    pub fn try_new(min: i64, max: i64) -> Option<Self> {
        (min <= max).then_some(Self { min, max })
    }

    /// True iff `min <= t <= max`.
    pub fn in_bounds(&self, t: i64) -> bool {
        self.min <= t && t <= self.max
    }

    /// True if the two closed intervals share at least one timestamp.
    ///
    /// Ranges that only share an endpoint (for example `[1, 5]` and `[5, 9]`)
    /// overlap. Ranges that are merely adjacent in integer space (`[1, 4]` and
    /// `[5, 9]`) do not.
    pub fn overlaps(&self, other: &Range) -> bool {
        self.min <= other.max && self.max >= other.min
    }

    /// True if every timestamp of `self` also lies in `other`.
    pub fn is_subrange_of(&self, other: &Range) -> bool {
        other.min <= self.min && self.max <= other.max
    }

    /// Number of integer timestamps in the range, saturating at `u64::MAX`.
    pub fn span(&self) -> u64 {
        let width = i128::from(self.max) - i128::from(self.min) + 1;
        u64::try_from(width).unwrap_or(u64::MAX)
    }
}

#[derive(Deserialize)]
struct RawRange {
    min: i64,
    max: i64,
}

impl TryFrom<RawRange> for Range {
    type Error = RangeError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Range::try_new(raw.min, raw.max).context(InvertedBoundsSnafu {
            min: raw.min,
            max: raw.max,
        })
    }
}

impl From<RangeInclusive<i64>> for Range {
    fn from(r: RangeInclusive<i64>) -> Self {
        Range::new(*r.start(), *r.end())
    }
}

impl From<Range> for RangeInclusive<i64> {
    fn from(r: Range) -> Self {
        r.min..=r.max
    }
}

/// Ordered sequence of deleted ranges for one series or chunk.
///
/// Serializes as a plain list of `{"min": .., "max": ..}` objects.
/// Deserializing goes through [`RangeSet::try_from_ranges`], so a persisted
/// set that is unsorted or holds inverted bounds fails to load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Range>", into = "Vec<Range>")]
pub struct RangeSet {
    ranges: Vec<Range>,
}

impl RangeSet {
    /// An empty set (nothing deleted).
    pub fn new() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Wrap ranges as given, after checking they can be read back safely.
    ///
    /// Ranges are not merged or reordered. Overlaps are accepted, since the
    /// merger itself produces them; only the ordering contract the overlay
    /// relies on is enforced.
    ///
    /// # Errors
    ///
    /// - [`RangeError::InvertedBounds`] if any range has `min > max`.
    /// - [`RangeError::Unsorted`] if ranges are not sorted by `min`.
    pub fn try_from_ranges(ranges: Vec<Range>) -> Result<Self, RangeError> {
        for (index, r) in ranges.iter().enumerate() {
            ensure!(r.min <= r.max, InvertedBoundsSnafu { min: r.min, max: r.max });
            if let Some(prev) = index.checked_sub(1).map(|i| ranges[i]) {
                ensure!(
                    prev.min <= r.min,
                    UnsortedSnafu {
                        index,
                        prev_min: prev.min,
                        min: r.min,
                    }
                );
            }
        }
        Ok(Self { ranges })
    }

    /// Wrap ranges as given, without merging, reordering or checking.
    ///
    /// Callers are responsible for passing ranges sorted by `min`. Use
    /// [`RangeSet::try_from_ranges`] for ranges from untrusted input.
    pub fn from_ranges(ranges: Vec<Range>) -> Self {
        debug_assert!(
            ranges.windows(2).all(|w| w[0].min <= w[1].min),
            "RangeSet::from_ranges expects ranges sorted by min"
        );
        Self { ranges }
    }

    /// Fold `range` into the set using first-match merging.
    ///
    /// See [`crate::merge::merge_first_match`] for the exact semantics.
    pub fn add(&mut self, range: Range) {
        merge_first_match(&mut self.ranges, range);
    }

    /// Borrow the stored ranges in order.
    pub fn as_slice(&self) -> &[Range] {
        &self.ranges
    }

    /// Consume the set and return the stored ranges.
    pub fn into_vec(self) -> Vec<Range> {
        self.ranges
    }

    /// Iterate the stored ranges in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Range> {
        self.ranges.iter()
    }

    /// Number of stored ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True when nothing has been deleted.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// True if any stored range contains `t`.
    pub fn covers(&self, t: i64) -> bool {
        self.ranges.iter().any(|r| r.in_bounds(t))
    }

    /// True if `range` lies entirely inside a single stored range.
    pub fn is_subrange(&self, range: Range) -> bool {
        self.ranges.iter().any(|r| range.is_subrange_of(r))
    }

    /// True if the ranges are strictly increasing and no two neighbours
    /// overlap or share an endpoint.
    ///
    /// Sets produced by repeated [`RangeSet::add`] calls only fail this check
    /// after an insert that spans more than one existing range.
    pub fn is_well_formed(&self) -> bool {
        self.ranges.iter().all(|r| r.min <= r.max)
            && self.ranges.windows(2).all(|w| w[0].max < w[1].min)
    }
}

impl TryFrom<Vec<Range>> for RangeSet {
    type Error = RangeError;

    fn try_from(ranges: Vec<Range>) -> Result<Self, Self::Error> {
        RangeSet::try_from_ranges(ranges)
    }
}

impl From<RangeSet> for Vec<Range> {
    fn from(set: RangeSet) -> Self {
        set.ranges
    }
}

impl FromIterator<Range> for RangeSet {
    /// Collect by adding each range in turn, so the result follows the same
    /// merge rules as [`RangeSet::add`].
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Range>,
    {
        let mut set = RangeSet::new();
        for r in iter {
            set.add(r);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = &'a Range;
    type IntoIter = std::slice::Iter<'a, Range>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl IntoIterator for RangeSet {
    type Item = Range;
    type IntoIter = std::vec::IntoIter<Range>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter()
    }
}
