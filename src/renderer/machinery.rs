use std::{
    ops::Deref as _,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::{self, JoinHandle},
};

use image::{GenericImage, GenericImageView, ImageBuffer, Luma};

use crate::{
    camera::Camera,
    geometry::ScreenBlock,
    renderer::{RenderSettings, worker::Worker},
    screen_block::ScreenBlockExt,
    traced_scene::TracedScene,
};

/// Distance from the observer to the nearest surface for every pixel,
/// infinity where the primary ray hits nothing.
pub type DepthImage = ImageBuffer<Luma<f32>, Vec<f32>>;

pub fn render<
    F1: Fn(ScreenBlock) + Send + Sync + 'static,
    F2: Fn(ScreenBlock) + Send + Sync + 'static,
>(
    scene: TracedScene,
    camera: Camera,
    settings: RenderSettings,
    started_tile_callback: F1,
    finished_tile_callback: F2,
) -> anyhow::Result<RenderProgress> {
    let image = DepthImage::new(camera.get_resolution().x, camera.get_resolution().y);
    let state = Arc::new(RenderState {
        scene,
        camera,

        image: Mutex::new(image),

        tile_ordering: ScreenBlock::from_size(camera.get_resolution())
            .tile_ordering(settings.tile_size),
        next_tile_index: AtomicUsize::new(0),
        traced_rays: AtomicUsize::new(0),
        hits: AtomicUsize::new(0),
    });
    let started_tile_callback = Arc::new(started_tile_callback);
    let finished_tile_callback = Arc::new(finished_tile_callback);

    // Pin workers to cores when the core list is available, otherwise let the OS schedule them
    let cores = match core_affinity::get_core_ids() {
        Some(ids) => ids.into_iter().map(Some).collect::<Vec<_>>(),
        None => vec![None; num_cpus::get()],
    };

    let threads = cores
        .into_iter()
        .enumerate()
        .map(|(worker_id, core)| {
            let state = Arc::clone(&state);
            let started_tile_callback = Arc::clone(&started_tile_callback);
            let finished_tile_callback = Arc::clone(&finished_tile_callback);

            thread::Builder::new()
                .name(format!("worker{worker_id}"))
                .spawn(move || {
                    if let Some(core) = core {
                        core_affinity::set_for_current(core);
                    }

                    let mut worker = Worker::default();
                    let mut buffer =
                        DepthImage::new(settings.tile_size.into(), settings.tile_size.into());

                    while let Some(tile) = state.get_next_tile() {
                        (started_tile_callback)(*tile);

                        worker.render_tile(&state.scene, &state.camera, tile, &mut buffer);
                        state
                            .image
                            .lock()
                            .expect("Poisoned lock!")
                            .copy_from(
                                buffer.view(0, 0, tile.width(), tile.height()).deref(),
                                tile.min.x,
                                tile.min.y,
                            )
                            .unwrap_or_else(|_| {
                                unreachable!("The buffer should always fit into the output")
                            });

                        (finished_tile_callback)(*tile);
                    }

                    let (traced_rays, hits) = worker.counters();
                    state.traced_rays.fetch_add(traced_rays, Ordering::Relaxed);
                    state.hits.fetch_add(hits, Ordering::Relaxed);
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RenderProgress {
        render_state: state,
        threads,
    })
}

/// Ray counts of a finished render.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RenderStatistics {
    pub traced_rays: usize,
    pub hits: usize,
}

pub struct RenderProgress {
    render_state: Arc<RenderState>,
    threads: Vec<JoinHandle<()>>,
}

impl RenderProgress {
    /// Return number of processed and total tiles.
    pub fn progress(&self) -> (usize, usize) {
        let total = self.render_state.tile_ordering.len();
        let processed = self
            .render_state
            .next_tile_index
            .load(Ordering::Acquire)
            .min(total);
        (processed, total)
    }

    pub fn is_finished(&self) -> bool {
        self.threads.iter().all(|handle| handle.is_finished())
    }

    /// Signal the workers to abort.
    /// Any running workers will still finish their tiles, but no new ones will be started.
    pub fn abort(&self) {
        self.render_state
            .next_tile_index
            .store(self.render_state.tile_ordering.len(), Ordering::Release);
    }

    /// Block until all workers finish.
    pub fn wait(&mut self) -> anyhow::Result<()> {
        for handle in self.threads.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_owned();
            handle
                .join()
                .map_err(|_| anyhow::anyhow!("Render thread {name} panicked"))?;
        }
        Ok(())
    }

    pub fn image(&self) -> &Mutex<DepthImage> {
        &self.render_state.image
    }

    /// Ray counts of the workers that have already finished.
    pub fn statistics(&self) -> RenderStatistics {
        RenderStatistics {
            traced_rays: self.render_state.traced_rays.load(Ordering::Relaxed),
            hits: self.render_state.hits.load(Ordering::Relaxed),
        }
    }
}

struct RenderState {
    scene: TracedScene,
    camera: Camera,

    image: Mutex<DepthImage>,

    tile_ordering: Vec<ScreenBlock>,
    next_tile_index: AtomicUsize,

    traced_rays: AtomicUsize,
    hits: AtomicUsize,
}

impl RenderState {
    fn get_next_tile(&self) -> Option<&ScreenBlock> {
        let id = self.next_tile_index.fetch_add(1, Ordering::AcqRel);
        self.tile_ordering.get(id)
    }
}
