use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use traxis::{blackness_over_arc, fit_circle, FittedCircle, TrackPoint};

fn make_track_points(n: usize) -> Vec<TrackPoint> {
    let cx = 960.0f64;
    let cy = 540.0f64;
    let r = 420.0f64;
    let mut rng = StdRng::seed_from_u64(12345);

    (0..n)
        .map(|i| {
            let t = (20.0 + 100.0 * i as f64 / (n - 1) as f64).to_radians();
            let x = cx + r * t.cos() + rng.gen_range(-0.5f64..0.5f64);
            let y = cy - r * t.sin() + rng.gen_range(-0.5f64..0.5f64);
            TrackPoint::new(x, y)
        })
        .collect()
}

fn make_film(width: u32, height: u32, seed: u64) -> GrayImage {
    let mut rng = StdRng::seed_from_u64(seed);
    GrayImage::from_fn(width, height, |_, _| Luma([rng.gen_range(120u8..=255u8)]))
}

fn bench_circle_fit(c: &mut Criterion) {
    let few = make_track_points(12);
    let many = make_track_points(200);
    c.bench_function("circle_fit_12pts", |b| {
        b.iter(|| black_box(fit_circle(black_box(&few))))
    });
    c.bench_function("circle_fit_200pts", |b| {
        b.iter(|| black_box(fit_circle(black_box(&many))))
    });
}

fn bench_blackness(c: &mut Criterion) {
    let film = make_film(1920, 1080, 7);
    let circle = FittedCircle {
        center_x: 960.0,
        center_y: 540.0,
        center_x_err: 0.0,
        center_y_err: 0.0,
        radius: 420.0,
        radius_err: 0.0,
    };
    c.bench_function("blackness_r420_span100_dl10", |b| {
        b.iter(|| {
            let res = blackness_over_arc(&film, black_box(&circle), 10.0, 20.0, 100.0)
                .expect("fixture strip is valid");
            black_box(res)
        })
    });
}

criterion_group!(hotpaths, bench_circle_fit, bench_blackness);
criterion_main!(hotpaths);
