use std::{
    num::{NonZeroU32, NonZeroUsize},
    path::PathBuf,
    time::Instant,
};

use anyhow::Context as _;
use clap::Parser;
use image::{GrayImage, Luma};
use indicatif::ProgressBar;

use uddtrace::{
    Camera, DepthImage, RenderSettings, Scene, TracedScene,
    geometry::{FloatType, ScreenSize, WorldVector},
    render,
    udd::GridSettings,
};

#[derive(Parser)]
#[command(name = "uddtrace-cli")]
#[command(about = "Renders a depth image of a triangle mesh using a uniform grid", long_about = None)]
struct Cli {
    /// Input mesh in Wavefront OBJ format
    input: PathBuf,

    /// Output image (PNG), nearer surfaces are brighter
    #[arg(short, long, default_value = "depth.png")]
    output: PathBuf,

    #[arg(long, default_value_t = 1024)]
    width: u32,

    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 60.0)]
    fov: FloatType,

    /// Edge length of the render tiles in pixels
    #[arg(long, default_value = "64")]
    tile_size: NonZeroU32,

    /// Number of triangle slots added to a grid cell whenever it fills up
    #[arg(long, default_value = "10")]
    cell_growth: NonZeroUsize,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let scene = Scene::with_obj(&cli.input)
        .with_context(|| format!("Loading {}", cli.input.display()))?;
    let bounds = scene
        .bounding_box()
        .with_context(|| format!("{} contains no triangles", cli.input.display()))?;
    println!("Triangles: {}", scene.triangles.len());

    // Look at the whole scene from the +z side
    let radius = bounds.size().norm() / 2.0;
    let fov = cli.fov.to_radians();
    let distance = radius / (fov / 2.0).tan() + radius;
    let camera = Camera::look_at()
        .center(bounds.center() + WorldVector::new(0.0, 0.0, distance))
        .forward(WorldVector::new(0.0, 0.0, -1.0))
        .up(WorldVector::new(0.0, 1.0, 0.0))
        .resolution(ScreenSize::new(cli.width, cli.height))
        .horizontal_fov(fov)
        .call();

    let grid_settings = GridSettings::builder().cell_growth(cli.cell_growth).build();
    let build_start = Instant::now();
    let traced_scene = TracedScene::new(scene, camera.observer(), &grid_settings)?;
    println!("Grid built in {:.2?}", build_start.elapsed());
    traced_scene.grid().print_statistics();

    let settings = RenderSettings {
        tile_size: cli.tile_size,
    };

    let bar = ProgressBar::no_length();
    let render_start = Instant::now();
    let mut render_progress = render(traced_scene, camera, settings, |_| {}, {
        let bar = bar.clone();
        move |_| bar.inc(1)
    })?;
    bar.set_length(render_progress.progress().1 as u64);

    render_progress.wait()?;
    bar.finish();

    let statistics = render_progress.statistics();
    println!(
        "Traced {} rays in {:.2?}, {} hits",
        statistics.traced_rays,
        render_start.elapsed(),
        statistics.hits
    );

    let depth = render_progress
        .image()
        .lock()
        .map_err(|_| anyhow::anyhow!("Render thread panicked while holding the image"))?;
    depth_to_grayscale(&depth)
        .save(&cli.output)
        .with_context(|| format!("Writing {}", cli.output.display()))?;

    Ok(())
}

/// Maps the finite depth range to 255 (nearest) .. 1 (farthest), misses are black.
fn depth_to_grayscale(depth: &DepthImage) -> GrayImage {
    let (near, far) = depth
        .pixels()
        .map(|p| p.0[0])
        .filter(|d| d.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(near, far), d| {
            (near.min(d), far.max(d))
        });
    let range = (far - near).max(f32::EPSILON);

    GrayImage::from_fn(depth.width(), depth.height(), |x, y| {
        let d = depth.get_pixel(x, y).0[0];
        if d.is_finite() {
            Luma([(255.0 - 254.0 * (d - near) / range).round() as u8])
        } else {
            Luma([0])
        }
    })
}
