//! Chunk planning.
//!
//! Maps a total byte length and a chunk-size threshold to an ordered list of
//! contiguous byte ranges. Inputs at or below the threshold produce a single
//! range covering the whole buffer; larger inputs are cut into full-size
//! chunks with the remainder in the last one.

use std::num::NonZeroUsize;
use std::ops::Range;

/// A contiguous slice of the input, expressed as offset and length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRange {
    /// Byte offset of the first byte in the chunk.
    pub offset: usize,
    /// Number of bytes in the chunk. Zero only for the empty-input plan.
    pub length: usize,
}

impl ChunkRange {
    /// Create a range.
    pub const fn new(offset: usize, length: usize) -> Self {
        Self { offset, length }
    }

    /// Exclusive end offset.
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }

    /// The range as a `std::ops::Range` for slicing.
    pub const fn as_range(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Borrow this chunk's bytes out of `bytes`.
    ///
    /// Returns `None` if the range falls outside the buffer.
    pub fn slice<'a>(&self, bytes: &'a [u8]) -> Option<&'a [u8]> {
        bytes.get(self.as_range())
    }
}

/// Ordered, non-empty sequence of chunk ranges covering an input exactly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChunkPlan {
    ranges: Vec<ChunkRange>,
}

impl ChunkPlan {
    /// Number of chunks in the plan (always at least one).
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Always `false`; a plan holds at least one range.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Whether the input fits in a single request.
    pub fn is_single(&self) -> bool {
        self.ranges.len() == 1
    }

    /// All ranges, in input order.
    pub fn ranges(&self) -> &[ChunkRange] {
        &self.ranges
    }

    /// Iterate ranges in input order.
    pub fn iter(&self) -> std::slice::Iter<'_, ChunkRange> {
        self.ranges.iter()
    }

    /// Sum of all range lengths.
    pub fn total_bytes(&self) -> usize {
        self.ranges.iter().map(|r| r.length).sum()
    }
}

impl<'a> IntoIterator for &'a ChunkPlan {
    type Item = &'a ChunkRange;
    type IntoIter = std::slice::Iter<'a, ChunkRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

/// Compute the chunk plan for `total_bytes` with the given threshold.
///
/// Pure and infallible. `total_bytes == 0` yields a single empty range.
pub fn plan(total_bytes: usize, chunk_size: NonZeroUsize) -> ChunkPlan {
    let size = chunk_size.get();
    if total_bytes <= size {
        return ChunkPlan {
            ranges: vec![ChunkRange::new(0, total_bytes)],
        };
    }

    let ranges = (0..total_bytes)
        .step_by(size)
        .map(|offset| ChunkRange::new(offset, size.min(total_bytes - offset)))
        .collect();
    ChunkPlan { ranges }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn small_input_is_single_range() {
        let p = plan(10, nz(40));
        assert!(p.is_single());
        assert_eq!(p.ranges(), &[ChunkRange::new(0, 10)]);
    }

    #[test]
    fn exact_threshold_is_single_range() {
        let p = plan(40, nz(40));
        assert_eq!(p.ranges(), &[ChunkRange::new(0, 40)]);
    }

    #[test]
    fn empty_input_is_single_empty_range() {
        let p = plan(0, nz(40));
        assert_eq!(p.ranges(), &[ChunkRange::new(0, 0)]);
        assert!(!p.is_empty());
    }

    #[test]
    fn remainder_lands_in_last_chunk() {
        let p = plan(100, nz(40));
        assert_eq!(
            p.ranges(),
            &[
                ChunkRange::new(0, 40),
                ChunkRange::new(40, 40),
                ChunkRange::new(80, 20),
            ]
        );
    }

    #[test]
    fn even_division_keeps_full_last_chunk() {
        let p = plan(120, nz(40));
        assert_eq!(p.len(), 3);
        assert_eq!(p.ranges()[2], ChunkRange::new(80, 40));
    }

    #[test]
    fn one_byte_over_threshold() {
        let p = plan(41, nz(40));
        assert_eq!(p.ranges(), &[ChunkRange::new(0, 40), ChunkRange::new(40, 1)]);
    }

    #[test]
    fn slice_borrows_chunk_bytes() {
        let bytes: Vec<u8> = (0..10).collect();
        let r = ChunkRange::new(3, 4);
        assert_eq!(r.slice(&bytes), Some(&[3u8, 4, 5, 6][..]));
        assert_eq!(ChunkRange::new(8, 4).slice(&bytes), None);
    }

    proptest! {
        #[test]
        fn at_or_below_threshold_covers_whole_buffer(size in 1usize..10_000, frac in 0.0f64..=1.0) {
            let total = (size as f64 * frac) as usize;
            let p = plan(total, nz(size));
            prop_assert_eq!(p.ranges(), &[ChunkRange::new(0, total)]);
        }

        #[test]
        fn above_threshold_is_contiguous_and_exact(size in 1usize..2_000, extra in 1usize..50_000) {
            let total = size + extra;
            let p = plan(total, nz(size));

            prop_assert!(p.len() > 1);
            prop_assert_eq!(p.total_bytes(), total);

            let mut expected_offset = 0;
            for r in &p {
                prop_assert_eq!(r.offset, expected_offset);
                prop_assert!(r.length > 0);
                expected_offset = r.end();
            }
            prop_assert_eq!(expected_offset, total);

            let (last, rest) = p.ranges().split_last().unwrap();
            prop_assert!(rest.iter().all(|r| r.length == size));
            prop_assert!(last.length <= size);
        }
    }
}
