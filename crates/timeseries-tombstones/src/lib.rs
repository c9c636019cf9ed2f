//! # timeseries-tombstones
//!
//! Logical deletion of time ranges from immutable time-series chunks.
//!
//! This crate is the supported public entry point and re-exports a small,
//! stable surface of `timeseries-tombstones-core`.
//!
//! ## Example
//!
//! ```rust
//! use timeseries_tombstones::prelude::*;
//!
//! let mut chunk = MemChunk::new();
//! for t in 0..100 {
//!     chunk.append(t, t as f64).unwrap();
//! }
//! let mut reader = MemChunkReader::new();
//! reader.insert(ChunkRef(1), chunk);
//!
//! let tombstones = MemTombstones::new();
//! tombstones.add_interval(SeriesRef(1), Range::new(10, 89));
//!
//! let pass = read_series_chunk(
//!     &reader,
//!     &tombstones,
//!     SeriesRef(1),
//!     ChunkRef(1),
//!     &ReadOptions::default(),
//! )
//! .unwrap();
//! assert_eq!(pass.samples.len(), 20);
//! ```

/// Convenience prelude with the stable, supported surface.
pub mod prelude;

pub use timeseries_tombstones_core::chunk::{
    Chunk, ChunkError, ChunkReader, ChunkRef, MemChunk, MemChunkReader,
};
pub use timeseries_tombstones_core::cursor::{DecodeError, Sample, SampleCursor, Samples};
pub use timeseries_tombstones_core::merge::insert;
pub use timeseries_tombstones_core::overlay::{DeletedIterator, OverlayState};
pub use timeseries_tombstones_core::range::{Range, RangeError, RangeSet};
pub use timeseries_tombstones_core::read::{ReadOptions, ReadPass, read_chunk, read_series_chunk};
pub use timeseries_tombstones_core::tombstones::{MemTombstones, SeriesRef, TombstoneReader};
