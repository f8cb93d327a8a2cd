use std::{fs, path::Path};

use thiserror::Error;

use crate::geometry::{Triangle, WorldPoint};

use super::Scene;

impl Scene {
    pub fn with_obj(p: impl AsRef<Path>) -> Result<Scene, ObjOpenError> {
        let content = fs::read_to_string(p)?;
        Self::from_obj_str(content)
    }

    /// Loads triangle geometry from OBJ file content.
    /// Texture coordinates, normals and materials are ignored, all triangles get the default surface.
    pub fn from_obj_str(content: impl Into<String>) -> Result<Scene, ObjOpenError> {
        let parsed = wavefront_obj::obj::parse(content.into())?;
        Ok(Self::with_triangles(load_obj(parsed)))
    }
}

fn load_obj(obj: wavefront_obj::obj::ObjSet) -> Vec<Triangle<WorldPoint>> {
    let mut triangles = Vec::new();

    for o in obj.objects.into_iter() {
        let position = |vtindex: (usize, Option<usize>, Option<usize>)| {
            let vertex = &o.vertices[vtindex.0];
            WorldPoint::new(vertex.x as f32, vertex.y as f32, vertex.z as f32)
        };

        for geometry in o.geometry.iter() {
            for shape in geometry.shapes.iter() {
                let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                    eprintln!("non-triangle primitive in object {:?}, skipping", o.name);
                    continue;
                };

                triangles.push(Triangle::new(position(a), position(b), position(c)));
            }
        }
    }

    triangles
}

#[derive(Debug, Error)]
pub enum ObjOpenError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseError(#[from] wavefront_obj::ParseError),
}
