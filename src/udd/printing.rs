use crate::{geometry::WorldVector, util::Stats};

use super::{CellCoords, UniformGrid};

/// Summary of the grid shape and of how triangles are spread over the cells.
#[derive(Clone, Debug, PartialEq)]
pub struct GridStatistics {
    pub resolution: CellCoords,
    pub cell_size: WorldVector,
    pub cell_count: usize,
    pub empty_cells: usize,
    /// Triangle count of non-empty cells.
    /// `occupancy.sum` is larger than the triangle count when triangles span cells.
    pub occupancy: Stats,
}

impl UniformGrid {
    pub fn statistics(&self) -> GridStatistics {
        let occupancy: Stats = self
            .cells
            .iter()
            .filter(|cell| !cell.is_empty())
            .map(|cell| cell.len())
            .collect();

        GridStatistics {
            resolution: self.resolution,
            cell_size: self.cell_size,
            cell_count: self.cells.len(),
            empty_cells: self.cells.len() - occupancy.count,
            occupancy,
        }
    }

    pub fn print_statistics(&self) {
        let stats = self.statistics();
        println!(
            "Grid resolution: {} x {} x {} ({} cells)",
            stats.resolution.x, stats.resolution.y, stats.resolution.z, stats.cell_count
        );
        println!(
            "Cell size: {:.4} x {:.4} x {:.4}",
            stats.cell_size.x, stats.cell_size.y, stats.cell_size.z
        );
        println!(
            "Empty cells: {} ({:.1}%)",
            stats.empty_cells,
            100.0 * stats.empty_cells as f32 / stats.cell_count as f32
        );
        println!("Non-empty cell fill: {}", stats.occupancy);
        println!("Triangle references: {}", stats.occupancy.sum);
    }
}
