mod common;

use common::{FixedWidthChunk, samples_upto};
use proptest::prelude::*;
use timeseries_tombstones_core::{
    chunk::Chunk,
    cursor::SampleCursor,
    overlay::{DeletedIterator, OverlayState},
    range::{Range, RangeSet},
};

fn arb_range_set() -> impl Strategy<Value = RangeSet> {
    proptest::collection::vec((0i64..1100, 0i64..60), 0..30).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(min, width)| Range::new(min, min + width))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn overlay_yields_exactly_uncovered_timestamps(deleted in arb_range_set()) {
        let chunk = FixedWidthChunk::encode(&samples_upto(1000));
        let mut it = DeletedIterator::new(chunk.cursor(), &deleted);

        let mut got = Vec::new();
        while it.advance() {
            got.push(it.current().timestamp);
        }

        let expected: Vec<i64> = (0..1000).filter(|t| !deleted.covers(*t)).collect();
        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(it.state(), OverlayState::Exhausted);
        prop_assert!(it.error().is_none());
    }

    #[test]
    fn truncated_chunk_yields_visible_prefix_then_error(
        deleted in arb_range_set(),
        cut in 1usize..16,
    ) {
        let chunk = FixedWidthChunk::encode(&samples_upto(200)).truncated(cut);
        let mut it = DeletedIterator::new(chunk.cursor(), &deleted);

        let mut got = Vec::new();
        while it.advance() {
            got.push(it.current().timestamp);
        }

        let expected: Vec<i64> = (0..199).filter(|t| !deleted.covers(*t)).collect();
        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(it.state(), OverlayState::Errored);
        prop_assert!(it.error().is_some());
    }
}
