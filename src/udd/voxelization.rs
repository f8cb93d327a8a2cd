use index_vec::IndexSlice;
use itertools::iproduct;

use crate::{
    geometry::{Triangle, WorldBox, WorldPoint},
    scene::{PreparedTriangle, TriangleIdx},
};

use super::{CellCoords, GridError, UniformGrid};

impl UniformGrid {
    /// Adds each triangle to all cells that its plane crosses within the triangle's bounding range.
    ///
    /// The test is conservative, a triangle may end up in cells that only its plane touches.
    /// It never misses a cell that the triangle overlaps.
    /// An error leaves the grid partially filled and it should be discarded.
    pub fn voxelize(
        &mut self,
        triangles: &IndexSlice<TriangleIdx, [PreparedTriangle]>,
    ) -> Result<(), GridError> {
        for (index, triangle) in triangles.iter_enumerated() {
            let (min, max) = self.candidate_range(&triangle.vertices);

            if min == max {
                self.add_triangle(&min, index)?;
                continue;
            }

            for (i, j, k) in iproduct!(min.x..=max.x, min.y..=max.y, min.z..=max.z) {
                let coords = CellCoords::new(i, j, k);
                if plane_misses_box(triangle, &self.cell_box(&coords)) {
                    continue;
                }
                self.add_triangle(&coords, index)?;
            }
        }

        Ok(())
    }

    /// Inclusive range of cells touched by the bounding box of the triangle.
    /// Vertices lying exactly on a cell boundary touch the cells on both sides.
    fn candidate_range(&self, vertices: &Triangle<WorldPoint>) -> (CellCoords, CellCoords) {
        let lower = vertices.map(|v| self.clamped_lower_point_cell(v));
        let upper = vertices.map(|v| self.clamped_point_cell(v));
        let min = lower[0].zip_zip_map(&lower[1], &lower[2], |a, b, c| a.min(b).min(c));
        let max = upper[0].zip_zip_map(&upper[1], &upper[2], |a, b, c| a.max(b).max(c));
        (min, max)
    }

    /// Like `clamped_point_cell`, but a point on the boundary between two cells
    /// belongs to the lower one.
    fn clamped_lower_point_cell(&self, p: &WorldPoint) -> CellCoords {
        CellCoords::from_fn(|axis, _| {
            let index = ((p[axis] - self.bounds.min[axis]) / self.cell_size[axis]).ceil() - 1.0;
            (index as usize).min(self.resolution[axis] - 1)
        })
    }

    fn add_triangle(&mut self, coords: &CellCoords, triangle: TriangleIdx) -> Result<(), GridError> {
        let index = self.cell_index(coords);
        self.cells[index]
            .push(triangle, self.cell_growth)
            .map_err(|source| GridError::CellGrowth {
                cell: (*coords).into(),
                source,
            })
    }
}

/// Returns true if all corners of the box lie strictly on one side of the triangle's plane.
/// Corners on the plane, or a triangle without a valid plane, never prove a miss.
fn plane_misses_box(triangle: &PreparedTriangle, b: &WorldBox) -> bool {
    let (below, above) = b.corners().fold((0, 0), |(below, above), corner| {
        let distance = triangle.plane_distance(&corner);
        (
            below + (distance < 0.0) as usize,
            above + (distance > 0.0) as usize,
        )
    });
    below == 8 || above == 8
}
