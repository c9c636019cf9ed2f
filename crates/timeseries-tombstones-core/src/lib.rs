//! Core engine for logical deletion in time-series chunks.
//!
//! Chunks are immutable once written, so deleting a time range does not
//! rewrite them. Instead the engine records *tombstones*: per-series sets of
//! deleted `[min, max]` ranges, and filters samples against them at read time.
//!
//! - `range`: the [`Range`](range::Range) and [`RangeSet`](range::RangeSet)
//!   value types.
//! - `merge`: folding a new deletion into an existing set.
//! - `cursor`: the pull-based [`SampleCursor`](cursor::SampleCursor) contract
//!   chunks expose.
//! - `overlay`: [`DeletedIterator`](overlay::DeletedIterator), a cursor that
//!   skips deleted samples.
//! - `chunk`: chunk and chunk-reader traits plus in-memory implementations.
//! - `tombstones`: an in-memory, per-series tombstone store.
//! - `read`: a read pass tying lookup, tombstones and the overlay together.
//!
//! Physically dropping deleted samples (compaction) and the on-disk tombstone
//! format live outside this crate.
#![deny(missing_docs)]
pub mod chunk;
pub mod cursor;
pub mod merge;
pub mod overlay;
pub mod range;
pub mod read;
pub mod tombstones;
