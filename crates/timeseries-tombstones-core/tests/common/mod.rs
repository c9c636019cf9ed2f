#![allow(dead_code)]

use timeseries_tombstones_core::{
    chunk::Chunk,
    cursor::{DecodeError, Sample, SampleCursor},
    range::Range,
};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

const SAMPLE_LEN: usize = 16;

/// Fixed-width encoded chunk: each sample is `timestamp` then `value`, both
/// little-endian 8-byte words. Lets tests cut the buffer to force decode
/// failures.
#[derive(Debug, Clone, Default)]
pub struct FixedWidthChunk {
    bytes: Vec<u8>,
}

impl FixedWidthChunk {
    pub fn encode(samples: &[Sample]) -> Self {
        let mut bytes = Vec::with_capacity(samples.len() * SAMPLE_LEN);
        for s in samples {
            bytes.extend_from_slice(&s.timestamp.to_le_bytes());
            bytes.extend_from_slice(&s.value.to_le_bytes());
        }
        Self { bytes }
    }

    /// Drop the last `n` bytes.
    pub fn truncated(mut self, n: usize) -> Self {
        let keep = self.bytes.len().saturating_sub(n);
        self.bytes.truncate(keep);
        self
    }

    fn decode_at(&self, offset: usize) -> Option<Sample> {
        let word = |at: usize| -> Option<[u8; 8]> { self.bytes.get(at..at + 8)?.try_into().ok() };
        let ts = i64::from_le_bytes(word(offset)?);
        let v = f64::from_le_bytes(word(offset + 8)?);
        Some(Sample::new(ts, v))
    }
}

impl Chunk for FixedWidthChunk {
    fn cursor(&self) -> Box<dyn SampleCursor + '_> {
        Box::new(FixedWidthCursor {
            chunk: self,
            offset: 0,
            current: None,
            err: None,
            done: false,
        })
    }

    fn num_samples(&self) -> usize {
        self.bytes.len() / SAMPLE_LEN
    }

    fn time_bounds(&self) -> Option<Range> {
        let n = self.num_samples();
        if n == 0 {
            return None;
        }
        let first = self.decode_at(0)?;
        let last = self.decode_at((n - 1) * SAMPLE_LEN)?;
        Range::try_new(first.timestamp, last.timestamp)
    }
}

struct FixedWidthCursor<'a> {
    chunk: &'a FixedWidthChunk,
    offset: usize,
    current: Option<Sample>,
    err: Option<DecodeError>,
    done: bool,
}

impl SampleCursor for FixedWidthCursor<'_> {
    fn advance(&mut self) -> bool {
        if self.done {
            return false;
        }
        if self.offset == self.chunk.bytes.len() {
            self.done = true;
            self.current = None;
            return false;
        }
        let Some(sample) = self.chunk.decode_at(self.offset) else {
            self.err = Some(DecodeError::Truncated {
                offset: self.offset,
            });
            self.done = true;
            self.current = None;
            return false;
        };
        if let Some(prev) = self.current {
            if sample.timestamp <= prev.timestamp {
                self.err = Some(DecodeError::Corrupt {
                    offset: self.offset,
                    message: format!(
                        "timestamp {} does not follow {}",
                        sample.timestamp, prev.timestamp
                    ),
                });
                self.done = true;
                self.current = None;
                return false;
            }
        }
        self.offset += SAMPLE_LEN;
        self.current = Some(sample);
        true
    }

    fn current(&self) -> Sample {
        self.current.expect("cursor not positioned")
    }

    fn error(&self) -> Option<&DecodeError> {
        self.err.as_ref()
    }
}

pub fn samples_upto(n: i64) -> Vec<Sample> {
    (0..n).map(|t| Sample::new(t, t as f64 * 1.5)).collect()
}
