//! Shared synthetic fixtures for unit tests: markers sampled on a circle and
//! small grayscale films.

use image::{GrayImage, Luma};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geometry::unit_from_display_deg;
use crate::track::TrackPoint;

/// `n` markers evenly spaced on a circle from `start_deg` to `end_deg`
/// (screen counter-clockwise).
pub(crate) fn circle_points(
    center: [f64; 2],
    radius: f64,
    start_deg: f64,
    end_deg: f64,
    n: usize,
) -> Vec<TrackPoint> {
    noisy_circle_points(center, radius, start_deg, end_deg, n, 0.0, 0)
}

/// Like [`circle_points`] with uniform `[-noise, noise]` jitter on both axes.
pub(crate) fn noisy_circle_points(
    center: [f64; 2],
    radius: f64,
    start_deg: f64,
    end_deg: f64,
    n: usize,
    noise: f64,
    seed: u64,
) -> Vec<TrackPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    let denom = (n.max(2) - 1) as f64;
    (0..n)
        .map(|i| {
            let deg = start_deg + (end_deg - start_deg) * i as f64 / denom;
            let u = unit_from_display_deg(deg);
            let (jx, jy) = if noise > 0.0 {
                (rng.gen_range(-noise..=noise), rng.gen_range(-noise..=noise))
            } else {
                (0.0, 0.0)
            };
            TrackPoint::new(center[0] + radius * u[0] + jx, center[1] + radius * u[1] + jy)
        })
        .collect()
}

/// Uniform film of gray value `value`.
pub(crate) fn solid_image(w: u32, h: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(w, h, Luma([value]))
}

/// White film with a black ring `inner..=outer` pixels around `center`.
pub(crate) fn black_annulus_image(
    w: u32,
    h: u32,
    center: (i32, i32),
    inner: i32,
    outer: i32,
) -> GrayImage {
    let mut img = solid_image(w, h, 255);
    imageproc::drawing::draw_filled_circle_mut(&mut img, center, outer, Luma([0u8]));
    imageproc::drawing::draw_filled_circle_mut(&mut img, center, inner, Luma([255u8]));
    img
}
