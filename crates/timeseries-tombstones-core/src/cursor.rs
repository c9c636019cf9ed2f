//! Pull-based sample cursors.
//!
//! A [`SampleCursor`] yields `(timestamp, value)` pairs from one chunk in
//! strictly increasing timestamp order. Callers drive it with
//! [`SampleCursor::advance`] until it returns `false`, reading each sample
//! with [`SampleCursor::current`]. Once `advance` has returned `false` it
//! keeps returning `false`; [`SampleCursor::error`] then tells exhaustion
//! apart from a decode failure.
//!
//! [`Samples`] adapts any cursor into a standard [`Iterator`].

use snafu::prelude::*;

/// A single data point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Sample timestamp.
    pub timestamp: i64,
    /// Sample value.
    pub value: f64,
}

impl Sample {
    /// Build a sample.
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl From<(i64, f64)> for Sample {
    fn from((timestamp, value): (i64, f64)) -> Self {
        Self { timestamp, value }
    }
}

impl From<Sample> for (i64, f64) {
    fn from(s: Sample) -> Self {
        (s.timestamp, s.value)
    }
}

/// Failure to decode further samples from an encoded chunk.
///
/// Samples yielded before the failure remain valid.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DecodeError {
    /// The encoded data ended in the middle of a sample.
    #[snafu(display("Truncated chunk data at byte offset {offset}"))]
    Truncated {
        /// Byte offset at which more data was expected.
        offset: usize,
    },

    /// The encoded data could not be interpreted.
    #[snafu(display("Corrupt chunk data at byte offset {offset}: {message}"))]
    Corrupt {
        /// Byte offset of the offending data.
        offset: usize,
        /// Description of what was wrong.
        message: String,
    },
}

/// Forward-only source of samples in strictly increasing timestamp order.
pub trait SampleCursor {
    /// Move to the next sample. Returns `false` on exhaustion or error, and
    /// keeps returning `false` after that.
    fn advance(&mut self) -> bool;

    /// The sample at the current position.
    ///
    /// Only valid after `advance` returned `true`. Implementations panic
    /// otherwise.
    fn current(&self) -> Sample;

    /// The decode error that stopped the cursor, if any.
    fn error(&self) -> Option<&DecodeError>;

    /// Turn the cursor into an [`Iterator`] over its samples.
    fn samples(self) -> Samples<Self>
    where
        Self: Sized,
    {
        Samples::new(self)
    }
}

impl<C: SampleCursor + ?Sized> SampleCursor for Box<C> {
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn current(&self) -> Sample {
        (**self).current()
    }

    fn error(&self) -> Option<&DecodeError> {
        (**self).error()
    }
}

impl<C: SampleCursor + ?Sized> SampleCursor for &mut C {
    fn advance(&mut self) -> bool {
        (**self).advance()
    }

    fn current(&self) -> Sample {
        (**self).current()
    }

    fn error(&self) -> Option<&DecodeError> {
        (**self).error()
    }
}

/// [`Iterator`] adapter over a [`SampleCursor`].
///
/// Iteration stops on exhaustion and on error alike; check
/// [`Samples::error`] afterwards to tell them apart.
#[derive(Debug)]
pub struct Samples<C> {
    cursor: C,
}

impl<C: SampleCursor> Samples<C> {
    /// Wrap a cursor.
    pub fn new(cursor: C) -> Self {
        Self { cursor }
    }

    /// The error that ended iteration, if any.
    pub fn error(&self) -> Option<&DecodeError> {
        self.cursor.error()
    }

    /// Return the wrapped cursor.
    pub fn into_inner(self) -> C {
        self.cursor
    }
}

impl<C: SampleCursor> Iterator for Samples<C> {
    type Item = Sample;

    fn next(&mut self) -> Option<Sample> {
        if self.cursor.advance() {
            Some(self.cursor.current())
        } else {
            None
        }
    }
}
