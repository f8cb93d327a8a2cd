use index_vec::IndexVec;

use crate::{
    geometry::{Ray, WorldPoint},
    scene::{PreparedTriangle, Scene, TriangleIdx},
    udd::{GridError, GridHit, GridSettings, UniformGrid},
};

/// Scene ready for tracing: preprocessed triangles and the grid built over them.
/// Immutable once built, shared by all render threads.
#[derive(Clone, Debug)]
pub struct TracedScene {
    scene: Scene,
    triangles: IndexVec<TriangleIdx, PreparedTriangle>,
    grid: UniformGrid,
}

impl TracedScene {
    /// Preprocesses the scene for `viewpoint` and builds its grid.
    pub fn new(
        scene: Scene,
        viewpoint: &WorldPoint,
        settings: &GridSettings,
    ) -> Result<TracedScene, GridError> {
        let triangles = scene.preprocess(viewpoint);
        let grid = UniformGrid::with_triangles(&triangles, settings)?;
        Ok(TracedScene {
            scene,
            triangles,
            grid,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn triangles(&self) -> &IndexVec<TriangleIdx, PreparedTriangle> {
        &self.triangles
    }

    pub fn grid(&self) -> &UniformGrid {
        &self.grid
    }

    /// Nearest hit of a primary ray.
    pub fn intersect(&self, ray: &Ray) -> Option<GridHit> {
        self.grid.intersect(&self.triangles, ray, None)
    }

    /// Nearest hit of a ray leaving the surface of triangle `from`.
    pub fn intersect_from(&self, ray: &Ray, from: TriangleIdx) -> Option<GridHit> {
        self.grid.intersect(&self.triangles, ray, Some(from))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Triangle, WorldVector};

    use assert2::{assert, let_assert};

    /// Two facing unit squares at z = 0 and z = 1.
    fn box_sides() -> Scene {
        let square = |z| {
            [
                Triangle::new(
                    WorldPoint::new(0.0, 0.0, z),
                    WorldPoint::new(1.0, 0.0, z),
                    WorldPoint::new(1.0, 1.0, z),
                ),
                Triangle::new(
                    WorldPoint::new(0.0, 0.0, z),
                    WorldPoint::new(1.0, 1.0, z),
                    WorldPoint::new(0.0, 1.0, z),
                ),
            ]
        };
        Scene::with_triangles(square(0.0).into_iter().chain(square(1.0)))
    }

    #[test]
    fn primary_and_secondary_rays() {
        let viewpoint = WorldPoint::new(0.5, 0.5, 5.0);
        let_assert!(
            Ok(traced) = TracedScene::new(box_sides(), &viewpoint, &GridSettings::default())
        );
        assert!(traced.triangles().len() == 4);
        assert!(traced.triangles().iter().all(|t| t.normal.z < 0.0));

        let ray = Ray::new(viewpoint, WorldVector::new(0.05, 0.02, -1.0));
        let_assert!(Some(hit) = traced.intersect(&ray));
        assert!(hit.triangle.index() >= 2);
        assert!((hit.point.z - 1.0).abs() < 1e-5);

        // Secondary ray continuing down from the top square
        let bounce = Ray::new(hit.point, WorldVector::new(0.0, 0.0, -1.0));
        let_assert!(Some(below) = traced.intersect_from(&bounce, hit.triangle));
        assert!(below.triangle.index() < 2);
        assert!((below.t - 1.0).abs() < 1e-4);

        // And up again, away from everything
        let up = Ray::new(below.point, WorldVector::new(0.0, 0.0, 1.0));
        let_assert!(Some(top) = traced.intersect_from(&up, below.triangle));
        assert!(top.triangle.index() >= 2);
        assert!(traced.intersect(&Ray::new(viewpoint, WorldVector::new(0.0, 0.0, 1.0))).is_none());
    }

    #[test]
    fn empty_scene_never_hits() {
        let_assert!(
            Ok(traced) =
                TracedScene::new(Scene::default(), &WorldPoint::origin(), &GridSettings::default())
        );
        let ray = Ray::new(WorldPoint::new(0.0, 0.0, -1.0), WorldVector::new(0.0, 0.0, 1.0));
        assert!(traced.intersect(&ray).is_none());
    }
}
