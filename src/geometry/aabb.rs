use num_traits::One;
use std::ops::{Add, Sub};

use nalgebra::{ClosedAddAssign, ClosedDivAssign, Point, Point2, Scalar};

use super::{FloatType, WorldBox, WorldPoint, WorldVector};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct AABB<Point> {
    pub min: Point,
    pub max: Point,
}

impl<Point> AABB<Point> {
    pub fn new(min: Point, max: Point) -> AABB<Point> {
        AABB { min, max }
    }

    pub fn with_size<S>(min: Point, size: &S) -> AABB<Point>
    where
        for<'a> &'a Point: Add<&'a S, Output = Point>,
    {
        let max = &min + size;
        AABB { min, max }
    }
}

impl<Point: Sub + Copy> AABB<Point> {
    pub fn size(&self) -> Point::Output {
        self.max - self.min
    }
}

impl<T: Scalar + Copy + Sub> AABB<Point2<T>> {
    pub fn width(&self) -> T::Output {
        self.max[0] - self.min[0]
    }

    pub fn height(&self) -> T::Output {
        self.max[1] - self.min[1]
    }
}

impl<T: Scalar + ClosedAddAssign + ClosedDivAssign + One, const D: usize> AABB<Point<T, D>> {
    pub fn center(&self) -> Point<T, D> {
        let two = T::one() + T::one();
        let avg_coords = (&self.min.coords + &self.max.coords) / two;
        Point::from(avg_coords)
    }
}

impl WorldBox {
    /// Smallest box containing all the points, None if the iterator is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a WorldPoint>) -> Option<WorldBox> {
        points.into_iter().fold(None, |acc, p| match acc {
            None => Some(WorldBox::new(*p, *p)),
            Some(b) => Some(WorldBox::new(b.min.inf(p), b.max.sup(p))),
        })
    }

    /// Returns the box grown by `margin` in every direction.
    pub fn padded(&self, margin: FloatType) -> WorldBox {
        let margin = WorldVector::repeat(margin);
        WorldBox::new(self.min - margin, self.max + margin)
    }

    /// Closed interval test on all three axes.
    pub fn contains(&self, p: &WorldPoint) -> bool {
        (0..3).all(|axis| p[axis] >= self.min[axis] && p[axis] <= self.max[axis])
    }

    pub fn volume(&self) -> FloatType {
        self.size().product()
    }

    /// Iterates the eight corners of the box.
    pub fn corners(&self) -> impl Iterator<Item = WorldPoint> {
        let (min, max) = (self.min, self.max);
        (0..8u8).map(move |i| {
            WorldPoint::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        })
    }
}
