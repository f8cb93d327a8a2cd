use index_vec::IndexVec;

use crate::geometry::{FloatType, Triangle, WorldPoint, WorldVector};

use super::{Scene, SurfaceIdx, TriangleIdx};

/// Triangle with its plane equation, ready to be voxelized and traced.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PreparedTriangle {
    pub vertices: Triangle<WorldPoint>,
    pub surface: SurfaceIdx,
    /// Unit normal, pointing along the direction from the viewpoint to the triangle.
    /// Not finite for degenerate triangles.
    pub normal: WorldVector,
    /// Plane constant, `normal.dot(p) + d == 0` for points on the triangle's plane.
    pub d: FloatType,
}

impl PreparedTriangle {
    pub fn new(vertices: Triangle<WorldPoint>, surface: SurfaceIdx, viewpoint: &WorldPoint) -> Self {
        let mut normal = vertices.normal().normalize();
        if (vertices[0] - viewpoint).dot(&normal) < 0.0 {
            normal = -normal;
        }
        let d = -vertices[0].coords.dot(&normal);

        PreparedTriangle {
            vertices,
            surface,
            normal,
            d,
        }
    }

    /// Evaluates the plane equation, the sign tells the side of the plane.
    pub fn plane_distance(&self, p: &WorldPoint) -> FloatType {
        self.normal.dot(&p.coords) + self.d
    }
}

impl Scene {
    /// Calculates plane equations of all triangles.
    /// Normals are oriented relative to `viewpoint`, moving the viewpoint requires running
    /// this again (and rebuilding the grid).
    pub fn preprocess(&self, viewpoint: &WorldPoint) -> IndexVec<TriangleIdx, PreparedTriangle> {
        self.triangles
            .iter()
            .map(|t| PreparedTriangle::new(t.vertices, t.surface, viewpoint))
            .collect()
    }
}
