use arrayvec::ArrayVec;

use crate::geometry::{FloatType, Ray};

use super::{CellCoords, UniformGrid};

impl UniformGrid {
    /// Finds the first cell of the grid that the ray enters.
    ///
    /// Rays starting inside the grid (boundary included) start in the cell of their origin.
    /// Otherwise the ray is intersected with the six boundary planes and the crossings
    /// are checked from the nearest one.
    /// Returns None if the ray misses the grid or points away from it.
    pub fn find_entry_cell(&self, ray: &Ray) -> Option<CellCoords> {
        if self.bounds.contains(&ray.origin) {
            return Some(self.clamped_point_cell(&ray.origin));
        }

        // (distance, axis, plane coordinate)
        let mut crossings = ArrayVec::<(FloatType, usize, FloatType), 6>::new();
        for axis in 0..3 {
            if ray.direction[axis] == 0.0 {
                continue;
            }
            for plane in [self.bounds.min[axis], self.bounds.max[axis]] {
                let t = (plane - ray.origin[axis]) * ray.inv_direction[axis];
                if t > 0.0 {
                    crossings.push((t, axis, plane));
                }
            }
        }
        crossings.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

        crossings.into_iter().find_map(|(t, axis, plane)| {
            let mut p = ray.point_at(t);
            p[axis] = plane;
            self.bounds
                .contains(&p)
                .then(|| self.clamped_point_cell(&p))
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        geometry::{WorldPoint, WorldVector},
        udd::test::unit_box_grid,
    };

    use assert2::{assert, let_assert};
    use proptest::prelude::*;
    use test_case::test_case;
    use test_strategy::proptest;

    #[test_case([0.3, 0.6, 0.9], [1.0, 0.0, 0.0], [1, 2, 3] ; "inside")]
    #[test_case([0.3, 0.6, 0.9], [-1.0, -1.0, 0.0], [1, 2, 3] ; "inside_pointing_out")]
    #[test_case([1.0, 0.5, 0.5], [-1.0, 0.0, 0.0], [3, 2, 2] ; "on_max_face")]
    #[test_case([0.0, 0.0, 0.0], [1.0, 1.0, 1.0], [0, 0, 0] ; "on_min_corner")]
    #[test_case([-1.0, 0.3, 0.6], [1.0, 0.0, 0.0], [0, 1, 2] ; "through_min_face")]
    #[test_case([2.0, 0.3, 0.6], [-1.0, 0.0, 0.0], [3, 1, 2] ; "through_max_face")]
    #[test_case([0.6, 5.0, 0.1], [0.0, -1.0, 0.0], [2, 3, 0] ; "from_above")]
    #[test_case([-0.5, 0.2, -0.1], [1.0, 0.0, 1.0], [0, 0, 1] ; "two_axes_outside")]
    #[test_case([-0.5, -0.6, -0.95], [1.0, 1.0, 1.0], [1, 1, 0] ; "three_axes_outside")]
    fn entry_cell(origin: [FloatType; 3], direction: [FloatType; 3], expected: [usize; 3]) {
        let grid = unit_box_grid(4);
        let ray = Ray::new(WorldPoint::from(origin), WorldVector::from(direction));

        let_assert!(Some(cell) = grid.find_entry_cell(&ray));
        assert!(cell == CellCoords::from(expected));
    }

    #[test_case([-1.0, 2.0, 0.5], [1.0, 0.0, 0.0] ; "passes_beside")]
    #[test_case([-1.0, 0.5, 0.5], [-1.0, 0.0, 0.0] ; "points_away")]
    #[test_case([-0.5, -0.5, 3.0], [1.0, 1.0, 0.0] ; "parallel_above")]
    #[test_case([-1.0, -1.0, -1.0], [1.0, -1.0, 1.0] ; "diverging")]
    fn no_entry(origin: [FloatType; 3], direction: [FloatType; 3]) {
        let grid = unit_box_grid(4);
        let ray = Ray::new(WorldPoint::from(origin), WorldVector::from(direction));

        assert!(grid.find_entry_cell(&ray).is_none());
    }

    fn point_in(range: std::ops::Range<FloatType>) -> impl Strategy<Value = WorldPoint> {
        (range.clone(), range.clone(), range).prop_map(|(x, y, z)| WorldPoint::new(x, y, z))
    }

    /// Rays aimed at a point inside the grid always find an entry cell,
    /// and the cell contains the point where the ray crosses into the grid.
    #[proptest]
    fn entry_cell_contains_slab_entry(
        #[strategy(point_in(-3.0..3.0))] origin: WorldPoint,
        #[strategy(point_in(0.1..0.9))] target: WorldPoint,
        #[strategy(1usize..8)] resolution: usize,
    ) {
        prop_assume!((target - origin).norm() > 1e-3);
        let grid = unit_box_grid(resolution);
        let ray = Ray::new(origin, target - origin);

        let_assert!(Some(cell) = grid.find_entry_cell(&ray));

        let t_enter = (0..3)
            .filter(|axis| ray.direction[*axis] != 0.0)
            .map(|axis| {
                let t1 = (grid.bounds().min[axis] - ray.origin[axis]) * ray.inv_direction[axis];
                let t2 = (grid.bounds().max[axis] - ray.origin[axis]) * ray.inv_direction[axis];
                t1.min(t2)
            })
            .fold(0.0, FloatType::max);

        let entry_point = ray.point_at(t_enter);
        let cell_box = grid.cell_box(&cell).padded(1e-4);
        assert!(cell_box.contains(&entry_point), "{entry_point:?} not in {cell:?}");
    }
}
