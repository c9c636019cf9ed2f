//! Deletion-aware iteration over a chunk's samples.
//!
//! [`DeletedIterator`] wraps a [`SampleCursor`] together with the deleted
//! ranges of the chunk and yields only the samples that fall outside every
//! range. It implements [`SampleCursor`] itself, so it can be used anywhere a
//! plain cursor is expected.
//!
//! The overlay takes a private copy of the ranges and consumes it front to
//! back. A range is dropped as soon as the cursor moves past its `max`, so
//! one pass costs `O(samples + ranges)` range checks. Because the copy is
//! consumed, an overlay cannot be rewound; build a new one per read pass.
//!
//! ```
//! use timeseries_tombstones_core::chunk::{Chunk, MemChunk};
//! use timeseries_tombstones_core::cursor::SampleCursor;
//! use timeseries_tombstones_core::overlay::DeletedIterator;
//! use timeseries_tombstones_core::range::{Range, RangeSet};
//!
//! let mut chunk = MemChunk::new();
//! for t in 0..10 {
//!     chunk.append(t, t as f64).unwrap();
//! }
//!
//! let deleted = RangeSet::from_ranges(vec![Range::new(2, 4), Range::new(8, 20)]);
//! let visible: Vec<i64> = DeletedIterator::new(chunk.cursor(), &deleted)
//!     .samples()
//!     .map(|s| s.timestamp)
//!     .collect();
//!
//! assert_eq!(visible, vec![0, 1, 5, 6, 7]);
//! ```

use std::collections::VecDeque;

use log::trace;

use crate::{
    cursor::{DecodeError, Sample, SampleCursor},
    range::{Range, RangeSet},
};

/// Lifecycle of a [`DeletedIterator`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayState {
    /// Constructed, `advance` not called yet.
    Ready,
    /// Holding a visible sample.
    Positioned,
    /// The underlying cursor ran out of samples.
    Exhausted,
    /// The underlying cursor reported a decode error.
    Errored,
}

/// A [`SampleCursor`] that skips samples inside deleted ranges.
#[derive(Debug)]
pub struct DeletedIterator<C> {
    inner: C,
    pending: VecDeque<Range>,
    state: OverlayState,
    current: Option<Sample>,
    range_checks: u64,
}

impl<C: SampleCursor> DeletedIterator<C> {
    /// Overlay `deleted` on `inner`.
    ///
    /// The ranges are copied; `deleted` is never modified.
    pub fn new(inner: C, deleted: &RangeSet) -> Self {
        Self::from_ranges(inner, deleted.iter().copied())
    }

    /// Overlay an ordered sequence of ranges on `inner`.
    ///
    /// `ranges` must be sorted by `min`. Overlapping ranges are fine.
    pub fn from_ranges<I>(inner: C, ranges: I) -> Self
    where
        I: IntoIterator<Item = Range>,
    {
        let pending: VecDeque<Range> = ranges.into_iter().collect();
        debug_assert!(
            pending.iter().zip(pending.iter().skip(1)).all(|(a, b)| a.min <= b.min),
            "DeletedIterator expects ranges sorted by min"
        );

        Self {
            inner,
            pending,
            state: OverlayState::Ready,
            current: None,
            range_checks: 0,
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> OverlayState {
        self.state
    }

    /// Number of ranges not yet passed by the cursor.
    pub fn remaining_ranges(&self) -> usize {
        self.pending.len()
    }

    /// Return the wrapped cursor.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Range comparisons performed so far.
    #[cfg(test)]
    pub(crate) fn range_checks(&self) -> u64 {
        self.range_checks
    }

    /// Retire ranges that end before `t` and report whether the first
    /// remaining one covers it.
    ///
    /// Ranges are sorted by `min`, so if the front range does not cover `t`
    /// and has not ended yet, it starts after `t` and so does every later one.
    fn is_deleted(&mut self, t: i64) -> bool {
        while let Some(front) = self.pending.front() {
            self.range_checks += 1;
            if front.max < t {
                trace!("retiring tombstone [{}, {}] at t={t}", front.min, front.max);
                self.pending.pop_front();
                continue;
            }
            return front.in_bounds(t);
        }
        false
    }
}

impl<C: SampleCursor> SampleCursor for DeletedIterator<C> {
    fn advance(&mut self) -> bool {
        if matches!(self.state, OverlayState::Exhausted | OverlayState::Errored) {
            return false;
        }

        loop {
            if !self.inner.advance() {
                self.current = None;
                self.state = if self.inner.error().is_some() {
                    OverlayState::Errored
                } else {
                    OverlayState::Exhausted
                };
                return false;
            }

            let sample = self.inner.current();
            if self.is_deleted(sample.timestamp) {
                continue;
            }

            self.current = Some(sample);
            self.state = OverlayState::Positioned;
            return true;
        }
    }

    fn current(&self) -> Sample {
        match (self.state, self.current) {
            (OverlayState::Positioned, Some(sample)) => sample,
            (state, _) => panic!("DeletedIterator::current called in state {state:?}"),
        }
    }

    fn error(&self) -> Option<&DecodeError> {
        match self.state {
            OverlayState::Errored => self.inner.error(),
            _ => None,
        }
    }
}
