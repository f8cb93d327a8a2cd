use std::{iter::FusedIterator, num::NonZeroU32};

use itertools::iproduct;

use crate::geometry::{ScreenBlock, ScreenPoint, ScreenSize};

pub trait ScreenBlockExt {
    fn from_size(size: ScreenSize) -> Self;
    fn is_empty(&self) -> bool;
    fn area(&self) -> u32;
    fn contains_point(&self, p: &ScreenPoint) -> bool;
    fn internal_points(&self) -> InternalPoints;
    fn tile_ordering(&self, tile_size: NonZeroU32) -> Vec<ScreenBlock>;
}

impl ScreenBlockExt for ScreenBlock {
    /// Block starting at the origin.
    fn from_size(size: ScreenSize) -> Self {
        ScreenBlock::new(ScreenPoint::origin(), ScreenPoint::from(size))
    }

    fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    fn area(&self) -> u32 {
        if self.is_empty() {
            0
        } else {
            self.width() * self.height()
        }
    }

    fn contains_point(&self, p: &ScreenPoint) -> bool {
        p.x >= self.min.x && p.x < self.max.x && p.y >= self.min.y && p.y < self.max.y
    }

    /// Create an iterator over coordinates (x, y) pairs inside the block,
    /// in C order (x changes first, then y)
    fn internal_points(&self) -> InternalPoints {
        if self.is_empty() {
            InternalPoints::empty()
        } else {
            InternalPoints {
                min_x: self.min.x,
                max: self.max,

                cursor: self.min,
            }
        }
    }

    /// Splits the block into `tile_size` squares, ordered by their distance from the middle tile
    /// so that the center of the image is done first.
    /// Tiles on the bottom and right side are clipped if the tile size doesn't divide the block size.
    fn tile_ordering(&self, tile_size: NonZeroU32) -> Vec<ScreenBlock> {
        if self.is_empty() {
            return Vec::new();
        }

        let tile_size = tile_size.get();
        let tile_count = self.size().map(|x| x.div_ceil(tile_size));
        let middle = tile_count / 2;

        let mut tiles = iproduct!(0..tile_count.y, 0..tile_count.x)
            .map(|(j, i)| ScreenPoint::new(i, j))
            .collect::<Vec<_>>();
        // Stable sort, tiles at the same distance stay in row order
        tiles.sort_by_key(|tile| tile.x.abs_diff(middle.x).max(tile.y.abs_diff(middle.y)));

        tiles
            .into_iter()
            .map(|tile| {
                let min = self.min + tile.coords * tile_size;
                ScreenBlock::new(
                    min,
                    ScreenPoint::new(
                        self.max.x.min(min.x + tile_size),
                        self.max.y.min(min.y + tile_size),
                    ),
                )
            })
            .collect()
    }
}

#[derive(Copy, Clone, Debug)]
pub struct InternalPoints {
    min_x: u32,
    max: ScreenPoint,

    cursor: ScreenPoint,
}

impl InternalPoints {
    /// Construct an iterator over internal points that returns no points
    fn empty() -> Self {
        InternalPoints {
            min_x: 1,
            max: ScreenPoint::origin(),

            cursor: ScreenPoint::origin(),
        }
    }
}

impl Iterator for InternalPoints {
    type Item = ScreenPoint;

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.len();
        (len, Some(len))
    }

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.y >= self.max.y {
            return None;
        }

        let ret = self.cursor;

        debug_assert!(self.cursor.x < self.max.x);
        self.cursor.x += 1;
        if self.cursor.x >= self.max.x {
            self.cursor.x = self.min_x;
            self.cursor.y += 1;
        }

        Some(ret)
    }
}

impl ExactSizeIterator for InternalPoints {
    fn len(&self) -> usize {
        if self.cursor.y >= self.max.y {
            0
        } else {
            let whole_rows = (self.max.x - self.min_x) * (self.max.y - self.cursor.y - 1);
            let current_row = self.max.x - self.cursor.x;
            (whole_rows + current_row) as usize
        }
    }
}

impl FusedIterator for InternalPoints {}

#[cfg(test)]
mod test {
    use super::*;

    use assert2::assert;
    use proptest::prelude::*;
    use test_strategy::proptest;

    #[derive(Copy, Clone, Debug)]
    struct ScreenBlockWrapper(ScreenBlock);

    impl std::ops::Deref for ScreenBlockWrapper {
        type Target = ScreenBlock;
        fn deref(&self) -> &ScreenBlock {
            &self.0
        }
    }

    impl Arbitrary for ScreenBlockWrapper {
        type Parameters = ();
        type Strategy = proptest::strategy::BoxedStrategy<Self>;
        fn arbitrary_with(_args: Self::Parameters) -> Self::Strategy {
            const RANGE: std::ops::Range<u32> = 0..100u32;
            (RANGE, RANGE, RANGE, RANGE)
                .prop_map(|coords| {
                    ScreenBlockWrapper(ScreenBlock::new(
                        ScreenPoint::new(coords.0, coords.1),
                        ScreenPoint::new(coords.2, coords.3),
                    ))
                })
                .boxed()
        }
    }

    fn tile_size(tile_size_minus_one: u8) -> NonZeroU32 {
        NonZeroU32::MIN.saturating_add(tile_size_minus_one as u32)
    }

    /// Goes through the whole iterator and checks that at every step iterator's size hint is equal
    /// to its reported length and equal to the expected number of elements.
    fn check_exact_length<T: ExactSizeIterator>(mut iterator: T, expected_length: usize) {
        let mut remaining = expected_length;
        loop {
            assert!(iterator.len() == remaining);
            assert!(iterator.size_hint() == (remaining, Some(remaining)));
            if iterator.next().is_none() {
                break;
            }
            remaining -= 1;
        }
        assert!(remaining == 0);
    }

    /// Check that all pixels in the block are covered by a pixel iterator exactly once
    fn check_pixel_iterator_covers_block(
        pixel_iterator: impl Iterator<Item = ScreenPoint>,
        block: ScreenBlock,
    ) {
        let mut covered = vec![false; block.area() as usize];
        for p in pixel_iterator {
            assert!(block.contains_point(&p));
            let index = (p.x - block.min.x) + (p.y - block.min.y) * block.width();
            assert!(!covered[index as usize]);
            covered[index as usize] = true;
        }
        assert!(covered.into_iter().all(|v| v));
    }

    #[test]
    fn from_size() {
        let block = ScreenBlock::from_size(ScreenSize::new(640, 480));
        assert!(block.min == ScreenPoint::new(0, 0));
        assert!(block.max == ScreenPoint::new(640, 480));
        assert!(block.area() == 640 * 480);
    }

    #[test]
    fn tile_ordering_starts_in_the_middle() {
        let block = ScreenBlock::from_size(ScreenSize::new(100, 60));
        let tiles = block.tile_ordering(NonZeroU32::new(20).unwrap());

        assert!(tiles.len() == 5 * 3);
        assert!(tiles[0] == ScreenBlock::new(ScreenPoint::new(40, 20), ScreenPoint::new(60, 40)));
    }

    #[test]
    fn clipped_tiles() {
        let block = ScreenBlock::from_size(ScreenSize::new(50, 10));
        let tiles = block.tile_ordering(NonZeroU32::new(16).unwrap());

        assert!(tiles.len() == 4);
        assert!(tiles.iter().map(|t| t.area()).sum::<u32>() == 500);
        assert!(tiles.iter().any(|t| t.width() == 2));
    }

    /// Tests that pixel iterator covers all pixels in a block
    #[proptest]
    fn pixel_iterator_covers_all(block: ScreenBlockWrapper) {
        check_pixel_iterator_covers_block(block.internal_points(), *block);
    }

    /// Tests that pixel iterator is a well behaved exact length iterator
    #[proptest]
    fn pixel_iterator_exact_length(block: ScreenBlockWrapper) {
        check_exact_length(block.internal_points(), block.area() as usize);
    }

    #[proptest]
    fn tiles_cover_all(block: ScreenBlockWrapper, tile_size_minus_one: u8) {
        check_pixel_iterator_covers_block(
            block
                .tile_ordering(tile_size(tile_size_minus_one))
                .into_iter()
                .flat_map(|tile| tile.internal_points()),
            *block,
        );
    }

    /// Tiles get further away from the first one, in squares of increasing size.
    #[proptest]
    fn tiles_go_outwards(block: ScreenBlockWrapper, tile_size_minus_one: u8) {
        let tiles = block.tile_ordering(tile_size(tile_size_minus_one));

        if let Some(first) = tiles.first() {
            let mut prev_distance = 0;
            for tile in &tiles[1..] {
                let distance = first
                    .min
                    .x
                    .abs_diff(tile.min.x)
                    .max(first.min.y.abs_diff(tile.min.y));
                assert!(distance >= prev_distance);
                prev_distance = distance;
            }
        }
    }
}
