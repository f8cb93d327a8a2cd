use index_vec::{IndexSlice, IndexVec};

use crate::{
    geometry::{FloatType, WorldBox},
    scene::{PreparedTriangle, TriangleIdx},
};

use super::{Cell, CellCoords, CellIdx, GridError, GridSettings, UniformGrid};

impl UniformGrid {
    /// Creates an empty grid covering `scene_bounds` (padded by `settings.padding`),
    /// with resolution chosen so that there is roughly one cell per triangle.
    pub fn build(
        scene_bounds: &WorldBox,
        triangle_count: usize,
        settings: &GridSettings,
    ) -> Result<UniformGrid, GridError> {
        let bounds = scene_bounds.padded(settings.padding);
        let domain_size = bounds.size();

        // Number of cells per unit of length
        let density =
            (triangle_count as FloatType / bounds.volume()).cbrt() + settings.density_epsilon;
        let resolution: CellCoords =
            domain_size.map(|size| ((size * density).ceil() as usize).max(1));
        let cell_size = domain_size.zip_map(&resolution, |size, n| size / n as FloatType);

        let cell_count = resolution
            .iter()
            .try_fold(1usize, |acc, n| acc.checked_mul(*n))
            .filter(|count| count - 1 <= CellIdx::MAX_INDEX)
            .ok_or(GridError::TooManyCells {
                resolution: resolution.into(),
            })?;

        let mut cells = Vec::new();
        cells
            .try_reserve_exact(cell_count)
            .map_err(|source| GridError::GridAllocation { cell_count, source })?;
        cells.resize_with(cell_count, Cell::default);

        Ok(UniformGrid {
            bounds,
            cell_size,
            resolution,
            cells: IndexVec::from_vec(cells),
            cell_growth: settings.cell_growth,
        })
    }

    /// Builds and voxelizes a grid around the given triangles.
    pub fn with_triangles(
        triangles: &IndexSlice<TriangleIdx, [PreparedTriangle]>,
        settings: &GridSettings,
    ) -> Result<UniformGrid, GridError> {
        let scene_bounds =
            WorldBox::from_points(triangles.iter().flat_map(|t| t.vertices.iter()))
                .unwrap_or_default();

        let mut grid = Self::build(&scene_bounds, triangles.len(), settings)?;
        grid.voxelize(triangles)?;
        Ok(grid)
    }
}
