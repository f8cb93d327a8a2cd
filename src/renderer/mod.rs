mod machinery;
mod worker;

use std::num::NonZeroU32;

pub use crate::renderer::machinery::{DepthImage, RenderProgress, RenderStatistics, render};

const DEFAULT_TILE_SIZE: NonZeroU32 = NonZeroU32::new(64).unwrap();

#[derive(Copy, Clone, Debug)]
pub struct RenderSettings {
    pub tile_size: NonZeroU32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}
