mod camera;
pub mod geometry;
mod renderer;
pub mod scene;
mod screen_block;
mod traced_scene;
pub mod udd;
mod util;

pub use crate::renderer::{DepthImage, RenderProgress, RenderSettings, RenderStatistics, render};
pub use camera::Camera;
pub use scene::Scene;
pub use traced_scene::TracedScene;
pub use util::Stats;
