use std::iter::FusedIterator;

use index_vec::IndexSlice;
use nalgebra::Vector3;

use crate::{
    geometry::{FloatType, Ray, WorldPoint, WorldVector},
    scene::{PreparedTriangle, TriangleIdx},
};

use super::{CellCoords, GridHit, UniformGrid};

/// One step of the grid walk.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CellVisit {
    pub coords: CellCoords,
    /// Ray distance at which the walk leaves this cell.
    pub exit_t: FloatType,
}

/// Iterator over the cells pierced by a ray, in the order the ray passes them (3D DDA).
#[derive(Clone, Debug)]
pub struct CellWalk {
    resolution: CellCoords,
    current: Option<CellCoords>,
    /// Ray distance of the last boundary plane crossed on each axis.
    t: WorldVector,
    /// Ray distance needed to cross one cell on each axis.
    dt: WorldVector,
    step: Vector3<isize>,
}

impl UniformGrid {
    /// Starts a walk through the grid at cell `start`.
    /// The start cell is usually obtained from [`UniformGrid::find_entry_cell`].
    pub fn cell_walk(&self, ray: &Ray, start: CellCoords) -> CellWalk {
        assert2::assert!(self.contains_cell(&start), "{start:?}");

        let cell_box = self.cell_box(&start);
        let mut t = WorldVector::zeros();
        let mut dt = WorldVector::repeat(FloatType::MAX);
        let mut step = Vector3::repeat(-1);

        for axis in 0..3 {
            if ray.direction[axis] == 0.0 {
                // The walk never steps along this axis
                continue;
            }
            let inv = ray.inv_direction[axis];
            let t1 = (cell_box.min[axis] - ray.origin[axis]) * inv;
            let t2 = (cell_box.max[axis] - ray.origin[axis]) * inv;
            t[axis] = t1.min(t2);
            dt[axis] = self.cell_size[axis] * inv.abs();
            if ray.direction[axis] > 0.0 {
                step[axis] = 1;
            }
        }

        CellWalk {
            resolution: self.resolution,
            current: Some(start),
            t,
            dt,
            step,
        }
    }

    /// Finds the nearest triangle hit by the ray, walking the grid from `start`.
    ///
    /// Only hits in front of the origin and before the exit of the current cell are accepted,
    /// so the first cell with an accepted hit holds the nearest one.
    /// `excluded` is skipped, it is meant for the triangle a secondary ray starts on.
    /// Equally distant hits are resolved in favor of the lower triangle index.
    pub fn traverse(
        &self,
        triangles: &IndexSlice<TriangleIdx, [PreparedTriangle]>,
        ray: &Ray,
        excluded: Option<TriangleIdx>,
        start: CellCoords,
    ) -> Option<GridHit> {
        self.cell_walk(ray, start).find_map(|visit| {
            self.cell(&visit.coords)
                .triangles()
                .iter()
                .filter(|index| Some(**index) != excluded)
                .filter_map(|index| {
                    let intersection = triangles[*index].vertices.intersect(ray)?;
                    (intersection.t > 0.0 && intersection.t < visit.exit_t)
                        .then_some((*index, intersection))
                })
                .min_by(|a, b| a.1.t.total_cmp(&b.1.t))
                .map(|(triangle, intersection)| {
                    let v = &triangles[triangle].vertices;
                    GridHit {
                        triangle,
                        t: intersection.t,
                        point: WorldPoint::from(intersection.uv.interpolate(
                            &v[0].coords,
                            &v[1].coords,
                            &v[2].coords,
                        )),
                        uv: intersection.uv,
                    }
                })
        })
    }

    /// Entry cell resolution followed by traversal.
    pub fn intersect(
        &self,
        triangles: &IndexSlice<TriangleIdx, [PreparedTriangle]>,
        ray: &Ray,
        excluded: Option<TriangleIdx>,
    ) -> Option<GridHit> {
        let start = self.find_entry_cell(ray)?;
        self.traverse(triangles, ray, excluded, start)
    }
}

impl CellWalk {
    /// Axis whose next boundary plane is the nearest.
    /// Ties go to the later axis.
    fn next_axis(exit: &WorldVector) -> usize {
        if exit.x < exit.y && exit.x < exit.z {
            0
        } else if exit.y < exit.z {
            1
        } else {
            2
        }
    }
}

impl Iterator for CellWalk {
    type Item = CellVisit;

    fn next(&mut self) -> Option<CellVisit> {
        let coords = self.current?;

        let exit = self.t + self.dt;
        let axis = Self::next_axis(&exit);
        self.t[axis] = exit[axis];

        self.current = coords[axis]
            .checked_add_signed(self.step[axis])
            .filter(|index| *index < self.resolution[axis])
            .map(|index| {
                let mut next = coords;
                next[axis] = index;
                next
            });

        Some(CellVisit {
            coords,
            exit_t: exit[axis],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.current {
            None => (0, Some(0)),
            Some(_) => (1, Some(self.resolution.sum())),
        }
    }
}

impl FusedIterator for CellWalk {}
