use std::ops::{Index, Mul, Sub};

use nalgebra::{
    ClosedAddAssign, ClosedDivAssign, ClosedMulAssign, ClosedSubAssign, DefaultAllocator, DimName,
    OPoint, OVector, Scalar, allocator::Allocator,
};
use num_traits::{One, Zero};

/// Three vertices of a triangle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle<Point>([Point; 3]);

impl<Point> Triangle<Point> {
    pub fn new(a: Point, b: Point, c: Point) -> Triangle<Point> {
        Triangle([a, b, c])
    }

    pub fn iter<'a>(&'a self) -> impl Iterator<Item = &'a Point> {
        self.0.iter()
    }
}

impl<Point> Index<usize> for Triangle<Point> {
    type Output = Point;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl<Point> Triangle<Point> {
    pub fn map<Point2, F: FnMut(&Point) -> Point2>(&self, mut f: F) -> Triangle<Point2> {
        Triangle([f(&self[0]), f(&self[1]), f(&self[2])])
    }
}

impl<T: Scalar, D: DimName> Triangle<OPoint<T, D>>
where
    DefaultAllocator: Allocator<D>,
    T: ClosedAddAssign + ClosedDivAssign + Zero + From<u16>,
{
    pub fn centroid(&self) -> OPoint<T, D> {
        OPoint {
            coords: self.0.iter().map(|p| &p.coords).sum::<OVector<T, D>>()
                / T::from(self.0.len() as u16),
        }
    }
}

impl<T: Scalar, D: DimName> Triangle<OPoint<T, D>>
where
    DefaultAllocator: Allocator<D>,
    for<'a> &'a OPoint<T, D>: Sub<Output = OVector<T, D>>,
{
    /// Returns edge vectors, coming from self[0]
    pub fn edges(&self) -> [OVector<T, D>; 2] {
        [&self.0[1] - &self.0[0], &self.0[2] - &self.0[0]]
    }
}

impl<T: Scalar, D: DimName> Triangle<OPoint<T, D>>
where
    DefaultAllocator: Allocator<D>,
    for<'a> &'a OPoint<T, D>: Sub<Output = OVector<T, D>>,
    T: ClosedAddAssign + ClosedSubAssign + ClosedMulAssign,
{
    /// Returns a normal vector of the triangle, not normalized.
    pub fn normal(&self) -> OVector<T, D> {
        let [e1, e2] = self.edges();
        e1.cross(&e2)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct BarycentricCoordinates<T> {
    pub u: T,
    pub v: T,
}

impl<T> BarycentricCoordinates<T>
where
    T: One + Copy + Sub<Output = T>,
{
    pub fn interpolate<T2>(&self, a: &T2, b: &T2, c: &T2) -> T2
    where
        for<'a> &'a T2: Mul<T, Output = T2>,
        T2: std::ops::Add<Output = T2>,
    {
        let w = T::one() - self.u - self.v;
        a * w + b * self.u + c * self.v
    }
}
