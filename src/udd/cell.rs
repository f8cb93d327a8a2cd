use std::{collections::TryReserveError, num::NonZeroUsize};

use crate::scene::TriangleIdx;

/// Single grid cell, a list of triangles that may overlap it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    triangles: Vec<TriangleIdx>,
}

impl Cell {
    pub fn triangles(&self) -> &[TriangleIdx] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Number of triangles that can still be added before the list has to grow.
    pub fn spare_capacity(&self) -> usize {
        self.triangles.capacity() - self.triangles.len()
    }

    /// Appends a triangle, growing the list by exactly `growth` slots when it is full.
    /// On failure the cell is left unchanged.
    pub fn push(&mut self, triangle: TriangleIdx, growth: NonZeroUsize) -> Result<(), TryReserveError> {
        if self.spare_capacity() == 0 {
            self.triangles.try_reserve_exact(growth.get())?;
        }
        self.triangles.push(triangle);
        Ok(())
    }
}
