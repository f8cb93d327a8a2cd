use std::time::Duration;

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use uddtrace::{
    Camera, RenderSettings, Scene, TracedScene,
    geometry::{FloatType, ScreenPoint, ScreenSize, Triangle, WorldPoint, WorldVector},
    render,
    udd::{GridSettings, UniformGrid},
};

const TERRAIN_SIZE: usize = 200;

/// Rolling height field over [0, 1] x [0, 1], two triangles per grid square.
fn terrain() -> Scene {
    let height = |i: usize, j: usize| {
        let x = i as FloatType / TERRAIN_SIZE as FloatType;
        let y = j as FloatType / TERRAIN_SIZE as FloatType;
        WorldPoint::new(
            x,
            y,
            0.05 * (x * 17.0).sin() * (y * 11.0).cos() + 0.02 * (x * y * 40.0).sin(),
        )
    };

    Scene::with_triangles(
        itertools::iproduct!(0..TERRAIN_SIZE, 0..TERRAIN_SIZE).flat_map(|(i, j)| {
            [
                Triangle::new(height(i, j), height(i + 1, j), height(i + 1, j + 1)),
                Triangle::new(height(i, j), height(i + 1, j + 1), height(i, j + 1)),
            ]
        }),
    )
}

fn camera() -> Camera {
    Camera::look_at()
        .center(WorldPoint::new(0.5, -0.6, 0.8))
        .forward(WorldVector::new(0.0, 1.0, -0.7))
        .up(WorldVector::new(0.0, 0.0, 1.0))
        .resolution(ScreenSize::new(640, 480))
        .horizontal_fov(1.0)
        .call()
}

fn criterion_benchmark(c: &mut Criterion) {
    let scene = terrain();
    let camera = camera();
    let triangles = scene.preprocess(camera.observer());
    let settings = GridSettings::default();

    c.bench_function("build_grid", |b| {
        b.iter(|| UniformGrid::with_triangles(&triangles, &settings).unwrap())
    });

    let traced_scene = TracedScene::new(scene, camera.observer(), &settings).unwrap();

    c.bench_function("trace_primary_rays", |b| {
        let rays = itertools::iproduct!((0..480).step_by(8), (0..640).step_by(8))
            .map(|(y, x)| camera.primary_ray(&ScreenPoint::new(x, y)))
            .collect::<Vec<_>>();
        b.iter(|| {
            rays.iter()
                .filter(|ray| traced_scene.intersect(ray).is_some())
                .count()
        })
    });

    c.bench_function("render_terrain", |b| {
        b.iter_batched(
            || traced_scene.clone(),
            |traced_scene| {
                let mut render_progress = render(
                    traced_scene,
                    camera,
                    RenderSettings::default(),
                    |_| {},
                    |_| {},
                )
                .unwrap();
                render_progress.wait().unwrap();
            },
            BatchSize::LargeInput,
        )
    });
}

criterion_group! {
    name = benches;
    config = Criterion::default().sample_size(20).measurement_time(Duration::from_secs(20));
    targets = criterion_benchmark
}
criterion_main!(benches);
