//! Folding new deletion requests into an existing [`RangeSet`].
//!
//! The merge is a single left-to-right scan:
//!
//! - The first stored range that overlaps the new one (shared endpoints
//!   count) is widened to cover both. Nothing else is touched.
//! - If no stored range overlaps, the new range is spliced in before the
//!   first range with a larger `min`, or appended.
//!
//! This is deliberately not a general interval union. An insert that spans
//! several stored ranges only widens the first of them, and the ranges it
//! swallows stay in the set:
//!
//! ```
//! use timeseries_tombstones_core::merge::insert;
//! use timeseries_tombstones_core::range::{Range, RangeSet};
//!
//! let existing = RangeSet::from_ranges(vec![
//!     Range::new(1, 10),
//!     Range::new(12, 20),
//!     Range::new(25, 30),
//! ]);
//!
//! let merged = insert(&existing, Range::new(9, 23));
//! assert_eq!(
//!     merged.as_slice(),
//!     &[Range::new(1, 23), Range::new(12, 20), Range::new(25, 30)]
//! );
//! ```
//!
//! Readers stay correct on such sets because the deletion overlay only needs
//! the ranges sorted by `min`.

use log::debug;

use crate::range::{Range, RangeSet};

/// Return the union of `existing` and `new` as a fresh set.
///
/// `existing` is left untouched. Use [`RangeSet::add`] to merge in place.
pub fn insert(existing: &RangeSet, new: Range) -> RangeSet {
    let mut out = existing.clone();
    out.add(new);
    out
}

/// Merge `new` into `ranges` in place with first-match semantics.
///
/// `ranges` must be sorted by `min`. Only the first overlapping range absorbs
/// `new`; later ranges that now fall inside the widened range are kept as-is.
/// Callers rely on this lenient behaviour, so it must not be turned into a
/// full union without migrating them.
pub fn merge_first_match(ranges: &mut Vec<Range>, new: Range) {
    for i in 0..ranges.len() {
        let r = ranges[i];

        if r.overlaps(&new) {
            let merged = Range {
                min: r.min.min(new.min),
                max: r.max.max(new.max),
            };
            ranges[i] = merged;

            let shadowed = ranges[i + 1..]
                .iter()
                .take_while(|next| next.min <= merged.max)
                .count();
            if shadowed > 0 {
                debug!(
                    "tombstone [{}, {}] merged into [{}, {}]; {shadowed} later range(s) left inside it",
                    new.min, new.max, merged.min, merged.max
                );
            }
            return;
        }

        if new.min < r.min {
            ranges.insert(i, new);
            return;
        }
    }

    ranges.push(new);
}
