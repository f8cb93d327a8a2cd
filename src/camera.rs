use assert2::assert;
use bon::bon;
use nalgebra::Unit;

use crate::geometry::{EPSILON, FloatType, Ray, ScreenPoint, ScreenSize, WorldPoint, WorldVector};

/// Pinhole camera, rays start at the observer and pass through a rectangular screen
/// placed in the scene.
#[derive(Copy, Clone, Debug)]
pub struct Camera {
    observer: WorldPoint,

    resolution: ScreenSize,

    /// Upper left corner of the screen
    screen_origin: WorldPoint,
    /// Upper left to upper right corner
    screen_right: WorldVector,
    /// Upper left to bottom left corner
    screen_down: WorldVector,
}

#[bon]
impl Camera {
    #[builder]
    pub fn new(
        observer: WorldPoint,
        screen_upper_left: WorldPoint,
        screen_upper_right: WorldPoint,
        screen_bottom_left: WorldPoint,
        resolution: ScreenSize,
    ) -> Self {
        assert!(resolution.x > 0);
        assert!(resolution.y > 0);

        let screen_right = screen_upper_right - screen_upper_left;
        let screen_down = screen_bottom_left - screen_upper_left;
        assert!(
            screen_right.cross(&screen_down).norm() > EPSILON,
            "Screen corners must span a rectangle"
        );

        Camera {
            observer,
            resolution,
            screen_origin: screen_upper_left,
            screen_right,
            screen_down,
        }
    }

    /// Places the screen one unit in front of `center`, perpendicular to `forward`.
    /// `horizontal_fov` is the full horizontal opening angle in radians.
    #[builder]
    pub fn look_at(
        center: WorldPoint,
        forward: WorldVector,
        up: WorldVector,
        resolution: ScreenSize,
        horizontal_fov: FloatType,
    ) -> Self {
        let forward = Unit::try_new(forward, EPSILON).expect("Forward vector must be non-zero");
        let up = Unit::try_new(up, EPSILON).expect("Up vector must be non-zero");
        let right = Unit::try_new(forward.cross(&up), EPSILON)
            .expect("`up` and `forward` must be linearly independent");
        let up = Unit::new_normalize(right.cross(&forward));

        assert!(horizontal_fov > 0.0 && horizontal_fov < std::f32::consts::PI);

        let half_width = (horizontal_fov / 2.0).tan();
        let half_height = half_width * resolution.y as FloatType / resolution.x as FloatType;
        let screen_center = center + forward.as_ref();
        let upper_left =
            screen_center - right.as_ref() * half_width + up.as_ref() * half_height;

        Camera::builder()
            .observer(center)
            .screen_upper_left(upper_left)
            .screen_upper_right(upper_left + right.as_ref() * (2.0 * half_width))
            .screen_bottom_left(upper_left - up.as_ref() * (2.0 * half_height))
            .resolution(resolution)
            .build()
    }
}

impl Camera {
    pub fn get_resolution(&self) -> ScreenSize {
        self.resolution
    }

    pub fn observer(&self) -> &WorldPoint {
        &self.observer
    }

    /// Ray from the observer through the center of the given pixel.
    pub fn primary_ray(&self, point: &ScreenPoint) -> Ray {
        let u = (point.x as FloatType + 0.5) / self.resolution.x as FloatType;
        let v = (point.y as FloatType + 0.5) / self.resolution.y as FloatType;
        let screen_point = self.screen_origin + self.screen_right * u + self.screen_down * v;

        Ray::new(self.observer, screen_point - self.observer)
    }
}
