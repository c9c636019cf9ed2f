//! Chunk collaborators consumed by the read path.
//!
//! The tombstone layer does not know how chunks are encoded. It only needs:
//!
//! - [`Chunk`]: something that can hand out a [`SampleCursor`] over its
//!   samples.
//! - [`ChunkReader`]: something that resolves an opaque [`ChunkRef`] to a
//!   chunk, failing with [`ChunkError::NotFound`] when it cannot.
//!
//! [`MemChunk`] and [`MemChunkReader`] are small in-memory implementations
//! used by tests and by callers that keep recent data uncompressed.

use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::{
    cursor::{DecodeError, Sample, SampleCursor},
    range::Range,
};

/// Opaque reference to a chunk, as handed out by the index.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ChunkRef(pub u64);

impl fmt::Display for ChunkRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Errors raised by chunk readers and in-memory chunks.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ChunkError {
    /// The requested chunk reference does not resolve.
    #[snafu(display("Chunk with ref {chunk_ref} not found"))]
    NotFound {
        /// The reference that failed to resolve.
        chunk_ref: ChunkRef,
    },

    /// The reader was closed before the lookup.
    #[snafu(display("Chunk reader is closed"))]
    Closed,

    /// A sample was appended with a timestamp not after the previous one.
    #[snafu(display(
        "Out-of-order append: timestamp {timestamp} is not after last timestamp {last}"
    ))]
    OutOfOrder {
        /// Timestamp that was rejected.
        timestamp: i64,
        /// Timestamp of the last sample already in the chunk.
        last: i64,
    },
}

/// An immutable block of consecutive samples for one series.
pub trait Chunk: fmt::Debug + Send + Sync {
    /// A fresh cursor positioned before the first sample.
    fn cursor(&self) -> Box<dyn SampleCursor + '_>;

    /// Number of samples stored in the chunk.
    fn num_samples(&self) -> usize;

    /// Inclusive `[first, last]` timestamp bounds, or `None` for an empty
    /// chunk.
    fn time_bounds(&self) -> Option<Range>;
}

/// Resolves chunk references to chunks.
pub trait ChunkReader {
    /// Look up the chunk behind `chunk_ref`.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::NotFound`] if `chunk_ref` does not resolve, or
    /// [`ChunkError::Closed`] if the reader has been closed.
    fn chunk(&self, chunk_ref: ChunkRef) -> Result<Arc<dyn Chunk>, ChunkError>;

    /// Release resources held by the reader.
    fn close(&self) -> Result<(), ChunkError>;
}

/// Uncompressed, append-only chunk held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemChunk {
    samples: Vec<Sample>,
}

impl MemChunk {
    /// An empty chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sample. Timestamps must be strictly increasing.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::OutOfOrder`] if `timestamp` is not after the last
    /// stored timestamp. The chunk is left unchanged.
    pub fn append(&mut self, timestamp: i64, value: f64) -> Result<(), ChunkError> {
        if let Some(last) = self.samples.last() {
            ensure!(
                timestamp > last.timestamp,
                OutOfOrderSnafu {
                    timestamp,
                    last: last.timestamp,
                }
            );
        }
        self.samples.push(Sample::new(timestamp, value));
        Ok(())
    }

    /// Borrow the stored samples.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }
}

impl Chunk for MemChunk {
    fn cursor(&self) -> Box<dyn SampleCursor + '_> {
        Box::new(MemChunkCursor::new(&self.samples))
    }

    fn num_samples(&self) -> usize {
        self.samples.len()
    }

    fn time_bounds(&self) -> Option<Range> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        Some(Range::new(first.timestamp, last.timestamp))
    }
}

/// Cursor over the samples of a [`MemChunk`]. Never fails.
#[derive(Debug)]
pub struct MemChunkCursor<'a> {
    samples: &'a [Sample],
    // Index of the current sample plus one; 0 before the first advance.
    pos: usize,
}

impl<'a> MemChunkCursor<'a> {
    /// Cursor positioned before `samples[0]`.
    pub fn new(samples: &'a [Sample]) -> Self {
        Self { samples, pos: 0 }
    }
}

impl SampleCursor for MemChunkCursor<'_> {
    fn advance(&mut self) -> bool {
        if self.pos < self.samples.len() {
            self.pos += 1;
            true
        } else {
            self.pos = self.samples.len() + 1;
            false
        }
    }

    fn current(&self) -> Sample {
        match self.pos.checked_sub(1).and_then(|i| self.samples.get(i)) {
            Some(sample) => *sample,
            None => panic!("MemChunkCursor::current called while not positioned"),
        }
    }

    fn error(&self) -> Option<&DecodeError> {
        None
    }
}

/// In-memory [`ChunkReader`] backed by a map.
#[derive(Debug, Default)]
pub struct MemChunkReader {
    chunks: HashMap<ChunkRef, Arc<dyn Chunk>>,
    closed: AtomicBool,
}

impl MemChunkReader {
    /// A reader with no chunks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `chunk` under `chunk_ref`, replacing any previous entry.
    pub fn insert(&mut self, chunk_ref: ChunkRef, chunk: impl Chunk + 'static) {
        self.chunks.insert(chunk_ref, Arc::new(chunk));
    }

    /// Number of registered chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True if no chunks are registered.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

impl ChunkReader for MemChunkReader {
    fn chunk(&self, chunk_ref: ChunkRef) -> Result<Arc<dyn Chunk>, ChunkError> {
        ensure!(!self.closed.load(Ordering::Acquire), ClosedSnafu);
        self.chunks
            .get(&chunk_ref)
            .cloned()
            .context(NotFoundSnafu { chunk_ref })
    }

    fn close(&self) -> Result<(), ChunkError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
