//! Reading the visible samples of a chunk.
//!
//! A read pass resolves a chunk reference, overlays the series' deleted ranges
//! on the chunk's cursor and drains it. Errors are split the same way the
//! collaborators split them:
//!
//! - A reference that does not resolve is returned as `Err(ChunkError)`.
//! - A decode failure part-way through the chunk is *not* an `Err`: the pass
//!   returns the samples read so far together with the [`DecodeError`], and
//!   the query layer decides whether a partial result is acceptable.
//!
//! Nothing here retries.

use log::{debug, warn};

use crate::{
    chunk::{ChunkError, ChunkReader, ChunkRef},
    cursor::{DecodeError, Sample, SampleCursor},
    overlay::DeletedIterator,
    range::RangeSet,
    tombstones::{SeriesRef, TombstoneReader},
};

/// Options controlling a read pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Return an empty pass without opening a cursor when the chunk's time
    /// bounds lie inside a single deleted range.
    ///
    /// The chunk is never decoded in that case, so a corrupt chunk that is
    /// entirely deleted reports no [`DecodeError`]. Disable this to have every
    /// read pass surface decode failures, at the cost of decoding chunks whose
    /// samples are all discarded.
    pub skip_fully_deleted: bool,
    /// Initial capacity of the output buffer. Defaults to the chunk's sample
    /// count.
    pub capacity_hint: Option<usize>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            skip_fully_deleted: true,
            capacity_hint: None,
        }
    }
}

impl ReadOptions {
    /// Set [`ReadOptions::skip_fully_deleted`].
    pub fn with_skip_fully_deleted(mut self, skip: bool) -> Self {
        self.skip_fully_deleted = skip;
        self
    }

    /// Set [`ReadOptions::capacity_hint`].
    pub fn with_capacity_hint(mut self, capacity: usize) -> Self {
        self.capacity_hint = Some(capacity);
        self
    }
}

/// Result of one read pass over a chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadPass {
    /// Visible samples, in timestamp order. Valid even when `error` is set.
    pub samples: Vec<Sample>,
    /// Decode error that cut the pass short, if any.
    pub error: Option<DecodeError>,
}

impl ReadPass {
    /// True if the whole chunk was read.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Discard partial results: the samples if complete, else the error.
    pub fn into_result(self) -> Result<Vec<Sample>, DecodeError> {
        match self.error {
            None => Ok(self.samples),
            Some(err) => Err(err),
        }
    }
}

/// Read the samples of `chunk_ref` that are not covered by `deleted`.
///
/// # Arguments
///
/// * `reader` - Resolves `chunk_ref` to a chunk.
/// * `chunk_ref` - The chunk to read.
/// * `deleted` - Deleted ranges, sorted by `min`. Copied, not consumed.
/// * `opts` - Read pass options.
///
/// # Returns
///
/// The visible samples in timestamp order. If the chunk fails to decode
/// part-way, [`ReadPass::error`] holds the failure and `samples` holds what
/// was read before it.
///
/// # Errors
///
/// Returns the reader's [`ChunkError`] unchanged if the lookup fails, for
/// example [`ChunkError::NotFound`] or [`ChunkError::Closed`].
pub fn read_chunk<R>(
    reader: &R,
    chunk_ref: ChunkRef,
    deleted: &RangeSet,
    opts: &ReadOptions,
) -> Result<ReadPass, ChunkError>
where
    R: ChunkReader + ?Sized,
{
    let chunk = reader
        .chunk(chunk_ref)
        .inspect_err(|e| debug!("chunk lookup for {chunk_ref} failed: {e}"))?;

    if opts.skip_fully_deleted
        && let Some(bounds) = chunk.time_bounds()
        && deleted.is_subrange(bounds)
    {
        debug!(
            "chunk {chunk_ref} [{}, {}] fully deleted; skipping decode",
            bounds.min, bounds.max
        );
        return Ok(ReadPass::default());
    }

    let capacity = opts.capacity_hint.unwrap_or_else(|| chunk.num_samples());
    let mut samples = Vec::with_capacity(capacity);

    let mut it = DeletedIterator::new(chunk.cursor(), deleted);
    while it.advance() {
        samples.push(it.current());
    }

    let error = it.error().cloned();
    if let Some(err) = &error {
        warn!(
            "chunk {chunk_ref}: decode failed after {} visible sample(s): {err}",
            samples.len()
        );
    }

    Ok(ReadPass { samples, error })
}

/// Read `chunk_ref` of `series`, using the tombstones recorded for `series`.
///
/// Same as [`read_chunk`] with `deleted` taken from `tombstones`.
///
/// # Errors
///
/// Returns the reader's [`ChunkError`] unchanged if the lookup fails.
pub fn read_series_chunk<R, T>(
    reader: &R,
    tombstones: &T,
    series: SeriesRef,
    chunk_ref: ChunkRef,
    opts: &ReadOptions,
) -> Result<ReadPass, ChunkError>
where
    R: ChunkReader + ?Sized,
    T: TombstoneReader + ?Sized,
{
    let deleted = tombstones.get(series);
    read_chunk(reader, chunk_ref, &deleted, opts)
}
