mod obj;
mod preprocessing;

use index_vec::IndexVec;

use crate::geometry::{FloatType, Triangle, WorldBox, WorldPoint};

pub use obj::ObjOpenError;
pub use preprocessing::PreparedTriangle;

index_vec::define_index_type! {
    pub struct TriangleIdx = u32;
}

index_vec::define_index_type! {
    pub struct SurfaceIdx = u32;
}

/// Material description of a group of triangles.
/// The intersection core never looks at these, they are carried for the shading code.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Surface {
    /// Color components, 0..1
    pub color: [FloatType; 3],
    /// Diffusion factor
    pub kd: FloatType,
    /// Mirroring factor
    pub ks: FloatType,
    /// Glitter factor
    pub g: FloatType,
    /// Ambient light factor
    pub ka: FloatType,
    pub kt: FloatType,
    /// Refractive index
    pub eta: FloatType,
    /// Refraction factor
    pub kr: FloatType,
}

impl Default for Surface {
    fn default() -> Self {
        Surface {
            color: [1.0, 1.0, 1.0],
            kd: 1.0,
            ks: 0.0,
            g: 0.0,
            ka: 0.0,
            kt: 0.0,
            eta: 1.0,
            kr: 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SceneTriangle {
    pub vertices: Triangle<WorldPoint>,
    pub surface: SurfaceIdx,
}

/// Geometry of the scene, as provided by the loaders.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    pub triangles: IndexVec<TriangleIdx, SceneTriangle>,
    pub surfaces: IndexVec<SurfaceIdx, Surface>,
}

impl Scene {
    /// Creates a scene where all triangles share a single default surface.
    pub fn with_triangles(triangles: impl IntoIterator<Item = Triangle<WorldPoint>>) -> Scene {
        let mut surfaces = IndexVec::new();
        let surface = surfaces.push(Surface::default());
        Scene {
            triangles: triangles
                .into_iter()
                .map(|vertices| SceneTriangle { vertices, surface })
                .collect(),
            surfaces,
        }
    }

    /// Bounding box of all triangle vertices (not padded), None for an empty scene.
    pub fn bounding_box(&self) -> Option<WorldBox> {
        WorldBox::from_points(self.triangles.iter().flat_map(|t| t.vertices.iter()))
    }

    pub fn surface(&self, triangle: TriangleIdx) -> &Surface {
        &self.surfaces[self.triangles[triangle].surface]
    }
}
