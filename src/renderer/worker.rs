use image::Luma;

use crate::{
    camera::Camera,
    geometry::{ScreenBlock, ScreenPoint},
    renderer::DepthImage,
    screen_block::ScreenBlockExt,
    traced_scene::TracedScene,
};

#[derive(Default)]
pub struct Worker {
    traced_rays: usize,
    hits: usize,
}

impl Worker {
    /// Traces the tile into the top left corner of `buffer`.
    pub fn render_tile(
        &mut self,
        scene: &TracedScene,
        camera: &Camera,
        tile: &ScreenBlock,
        buffer: &mut DepthImage,
    ) {
        for point in tile.internal_points() {
            let depth = self.trace_pixel(scene, camera, &point);

            let buffer_position = point - tile.min;
            buffer.put_pixel(buffer_position.x, buffer_position.y, Luma([depth]));
        }
    }

    /// Number of traced rays and of rays that hit a triangle.
    pub fn counters(&self) -> (usize, usize) {
        (self.traced_rays, self.hits)
    }

    fn trace_pixel(&mut self, scene: &TracedScene, camera: &Camera, point: &ScreenPoint) -> f32 {
        let ray = camera.primary_ray(point);
        self.traced_rays += 1;

        match scene.intersect(&ray) {
            Some(hit) => {
                self.hits += 1;
                hit.t
            }
            None => f32::INFINITY,
        }
    }
}
