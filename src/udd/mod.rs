//! Uniform domain division (UDD) of a triangle scene.
//!
//! The padded bounding box of the scene is split into `resolution.x * resolution.y * resolution.z`
//! equally sized cells, each cell lists the triangles whose plane crosses it.
//! Rays then walk the grid cell by cell and only test the triangles of the cells they pass.
//!
//! The grid is built in two steps, [`UniformGrid::build`] allocates empty cells and
//! [`UniformGrid::voxelize`] fills them. After that the grid is read only and can be shared
//! between any number of tracing threads.

mod building;
mod cell;
mod entry;
mod printing;
mod traversal;
mod voxelization;

use std::{collections::TryReserveError, num::NonZeroUsize};

use index_vec::IndexVec;
use nalgebra::Vector3;
use thiserror::Error;

use crate::{
    geometry::{BarycentricCoordinates, FloatType, WorldBox, WorldPoint, WorldVector},
    scene::TriangleIdx,
};

pub use cell::Cell;
pub use printing::GridStatistics;
pub use traversal::{CellVisit, CellWalk};

/// Integer (i, j, k) coordinates of a cell in the grid.
pub type CellCoords = Vector3<usize>;

index_vec::define_index_type! {
    pub struct CellIdx = u32;
}

const DEFAULT_CELL_GROWTH: NonZeroUsize = NonZeroUsize::new(10).unwrap();

#[derive(Copy, Clone, Debug, PartialEq, bon::Builder)]
pub struct GridSettings {
    /// Distance by which the scene bounding box is grown in every direction,
    /// so that no vertex lies on the grid boundary.
    #[builder(default = 0.001)]
    pub padding: FloatType,

    /// Added to the cell density, so that even a nearly empty scene gets at least one cell per axis.
    #[builder(default = 0.001)]
    pub density_epsilon: FloatType,

    /// Number of triangle slots added to a cell whenever its list is full.
    #[builder(default = DEFAULT_CELL_GROWTH)]
    pub cell_growth: NonZeroUsize,
}

impl Default for GridSettings {
    fn default() -> Self {
        GridSettings::builder().build()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UniformGrid {
    /// Padded scene bounding box, exactly covered by the cells.
    bounds: WorldBox,
    cell_size: WorldVector,
    resolution: CellCoords,
    cells: IndexVec<CellIdx, Cell>,
    cell_growth: NonZeroUsize,
}

/// Nearest intersection found by the grid traversal.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GridHit {
    pub triangle: TriangleIdx,
    /// Distance along the ray
    pub t: FloatType,
    pub point: WorldPoint,
    pub uv: BarycentricCoordinates<FloatType>,
}

#[derive(Debug, Error)]
pub enum GridError {
    #[error("Grid resolution {resolution:?} has too many cells")]
    TooManyCells { resolution: [usize; 3] },

    #[error("Failed to allocate {cell_count} grid cells: {source}")]
    GridAllocation {
        cell_count: usize,
        source: TryReserveError,
    },

    #[error("Failed to grow triangle list of cell {cell:?}: {source}")]
    CellGrowth {
        cell: [usize; 3],
        source: TryReserveError,
    },
}

impl UniformGrid {
    pub fn bounds(&self) -> &WorldBox {
        &self.bounds
    }

    pub fn cell_size(&self) -> &WorldVector {
        &self.cell_size
    }

    /// Number of cells along each axis.
    pub fn resolution(&self) -> &CellCoords {
        &self.resolution
    }

    pub fn cells(&self) -> &IndexVec<CellIdx, Cell> {
        &self.cells
    }

    /// Flat index of the cell, panics if the coordinates are outside of the grid.
    pub fn cell_index(&self, coords: &CellCoords) -> CellIdx {
        assert2::assert!(self.contains_cell(coords), "{coords:?}");
        CellIdx::from_usize(
            (coords.x * self.resolution.y + coords.y) * self.resolution.z + coords.z,
        )
    }

    pub fn cell(&self, coords: &CellCoords) -> &Cell {
        &self.cells[self.cell_index(coords)]
    }

    pub fn contains_cell(&self, coords: &CellCoords) -> bool {
        coords.iter().zip(self.resolution.iter()).all(|(c, n)| c < n)
    }

    /// World space box covered by the cell.
    pub fn cell_box(&self, coords: &CellCoords) -> WorldBox {
        let min = self.bounds.min + coords.map(|c| c as FloatType).component_mul(&self.cell_size);
        WorldBox::with_size(min, &self.cell_size)
    }

    /// Cell containing the point, None if the point is outside of the grid.
    /// Cells are half open intervals, points on the upper boundary of the grid are outside.
    pub fn point_cell(&self, p: &WorldPoint) -> Option<CellCoords> {
        let mut coords = CellCoords::zeros();
        for axis in 0..3 {
            let index = ((p[axis] - self.bounds.min[axis]) / self.cell_size[axis]).floor();
            if !(index >= 0.0 && index < self.resolution[axis] as FloatType) {
                return None;
            }
            coords[axis] = index as usize;
        }
        Some(coords)
    }

    /// Cell containing the point, with coordinates clamped to the grid.
    fn clamped_point_cell(&self, p: &WorldPoint) -> CellCoords {
        CellCoords::from_fn(|axis, _| {
            let index = ((p[axis] - self.bounds.min[axis]) / self.cell_size[axis]).floor();
            // Float to int casts saturate, negative values end up as zero.
            (index as usize).min(self.resolution[axis] - 1)
        })
    }
}
