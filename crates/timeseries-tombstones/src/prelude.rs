//! Wrapper prelude.
//!
//! Downstream code should prefer importing from this prelude instead of
//! depending on internal core module paths.

pub use crate::{
    Chunk, ChunkError, ChunkReader, ChunkRef, DecodeError, DeletedIterator, MemChunk,
    MemChunkReader, MemTombstones, OverlayState, Range, RangeError, RangeSet, ReadOptions,
    ReadPass, Sample, SampleCursor, Samples, SeriesRef, TombstoneReader, insert, read_chunk,
    read_series_chunk,
};
