//! Film blackness integrated over the annular strip swept by the track arc.
//!
//! The strip is the sector `r ± dl/2` of the fitted circle between the arc
//! start and end angles. It is walked on a polar grid fine enough that no
//! pixel inside the strip is skipped; every pixel whose center lies in the
//! strip is counted exactly once.

use image::GrayImage;
use serde::{Deserialize, Serialize};

use crate::calibration::TrackLength;
use crate::circle::FittedCircle;
use crate::error::{ensure_finite, MeasureError};
use crate::geometry::{display_angle_deg, norm, normalize_deg, sub, unit_from_display_deg};

/// Read-only 8-bit grayscale raster.
///
/// Implemented for [`image::GrayImage`]; callers holding pixels in another
/// container can implement it directly instead of copying.
pub trait GrayRaster {
    /// `(width, height)` in pixels.
    fn dimensions(&self) -> (u32, u32);
    /// Gray value at column `x`, row `y`. Only called in bounds.
    fn luma(&self, x: u32, y: u32) -> u8;
}

impl GrayRaster for GrayImage {
    fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    #[inline]
    fn luma(&self, x: u32, y: u32) -> u8 {
        self.get_pixel(x, y)[0]
    }
}

/// Sampling and error model of the blackness integral.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlacknessConfig {
    /// Grid spacing along and across the arc (pixels, `0 < step <= 1`).
    pub sample_step_px: f64,
    /// One-sigma intensity noise of a single pixel (gray levels).
    pub pixel_noise: f64,
    /// Gray value of unexposed film; a pixel contributes `white_level - gray`.
    pub white_level: f64,
}

impl Default for BlacknessConfig {
    fn default() -> Self {
        Self {
            sample_step_px: 0.5,
            pixel_noise: 1.0,
            white_level: 255.0,
        }
    }
}

impl BlacknessConfig {
    pub fn validate(&self) -> Result<(), MeasureError> {
        ensure_finite("sample_step_px", self.sample_step_px)?;
        ensure_finite("pixel_noise", self.pixel_noise)?;
        ensure_finite("white_level", self.white_level)?;
        if !(self.sample_step_px > 0.0 && self.sample_step_px <= 1.0) {
            return Err(MeasureError::invalid(format!(
                "sample_step_px must be in (0, 1], got {}",
                self.sample_step_px
            )));
        }
        if self.pixel_noise < 0.0 {
            return Err(MeasureError::invalid("pixel_noise must be non-negative"));
        }
        if self.white_level <= 0.0 {
            return Err(MeasureError::invalid("white_level must be positive"));
        }
        Ok(())
    }
}

/// Total blackness of the strip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalDensityResult {
    /// Sum of per-pixel contributions (gray levels).
    pub blackness: f64,
    /// Counting error, `pixel_noise · sqrt(n_pixels)`.
    pub blackness_error: f64,
    /// Number of distinct image pixels summed.
    pub n_pixels: usize,
}

/// Blackness per unit track length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticalDensity {
    /// Blackness per centimetre of track (1/cm).
    pub density: f64,
    pub density_error: f64,
}

impl OpticalDensity {
    /// `density = blackness / length` with independent relative errors
    /// added in quadrature.
    pub fn from_blackness(
        blackness: &OpticalDensityResult,
        length: &TrackLength,
    ) -> Result<Self, MeasureError> {
        ensure_finite("track length", length.cm)?;
        ensure_finite("track length error", length.cm_error)?;
        if length.cm <= 0.0 {
            return Err(MeasureError::invalid("track length is zero"));
        }
        if !(blackness.blackness > 0.0) || !blackness.blackness.is_finite() {
            return Err(MeasureError::invalid(
                "blackness is zero; density error is undefined",
            ));
        }
        let density = blackness.blackness / length.cm;
        let rel_len = length.cm_error / length.cm;
        let rel_black = blackness.blackness_error / blackness.blackness;
        Ok(Self {
            density,
            density_error: density * (rel_len * rel_len + rel_black * rel_black).sqrt(),
        })
    }
}

/// Blackness over the strip of width `dl` pixels centered on `circle`,
/// from `start_angle` sweeping `span_angle` degrees.
pub fn blackness_over_arc<R: GrayRaster + ?Sized>(
    image: &R,
    circle: &FittedCircle,
    dl: f64,
    start_angle: f64,
    span_angle: f64,
) -> Result<OpticalDensityResult, MeasureError> {
    blackness_over_arc_with(image, circle, dl, start_angle, span_angle, &BlacknessConfig::default())
}

/// [`blackness_over_arc`] with an explicit sampling/error model.
pub fn blackness_over_arc_with<R: GrayRaster + ?Sized>(
    image: &R,
    circle: &FittedCircle,
    dl: f64,
    start_angle: f64,
    span_angle: f64,
    config: &BlacknessConfig,
) -> Result<OpticalDensityResult, MeasureError> {
    config.validate()?;
    ensure_finite("dl", dl)?;
    ensure_finite("start_angle", start_angle)?;
    ensure_finite("span_angle", span_angle)?;
    ensure_finite("radius", circle.radius)?;
    ensure_finite("center_x", circle.center_x)?;
    ensure_finite("center_y", circle.center_y)?;
    if dl <= 0.0 {
        return Err(MeasureError::invalid(format!("dl must be positive, got {}", dl)));
    }
    if span_angle == 0.0 {
        return Err(MeasureError::invalid("arc span is zero"));
    }

    let strip = Strip::new(circle, dl, start_angle, span_angle);
    let pixels = strip.pixels(image, config.sample_step_px);

    let blackness: f64 = pixels
        .iter()
        .map(|&(y, x)| (config.white_level - f64::from(image.luma(x, y))).max(0.0))
        .sum();
    let n_pixels = pixels.len();
    Ok(OpticalDensityResult {
        blackness,
        blackness_error: config.pixel_noise * (n_pixels as f64).sqrt(),
        n_pixels,
    })
}

/// Annular sector `r_in..=r_out` between two polar angles.
struct Strip {
    center: [f64; 2],
    r_in: f64,
    r_out: f64,
    start_angle: f64,
    span_angle: f64,
}

impl Strip {
    fn new(circle: &FittedCircle, dl: f64, start_angle: f64, span_angle: f64) -> Self {
        Self {
            center: circle.center(),
            r_in: (circle.radius - 0.5 * dl).max(0.0),
            r_out: circle.radius + 0.5 * dl,
            start_angle: normalize_deg(start_angle),
            span_angle: span_angle.clamp(-360.0, 360.0),
        }
    }

    fn contains(&self, p: [f64; 2]) -> bool {
        let d = sub(p, self.center);
        let rho = norm(d);
        if rho < self.r_in || rho > self.r_out {
            return false;
        }
        if self.span_angle.abs() >= 360.0 || rho == 0.0 {
            return true;
        }
        let a = display_angle_deg(d);
        if self.span_angle > 0.0 {
            normalize_deg(a - self.start_angle) <= self.span_angle
        } else {
            normalize_deg(self.start_angle - a) <= -self.span_angle
        }
    }

    /// Distinct in-bounds pixels `(row, col)` whose centers lie in the strip,
    /// sorted row-major.
    ///
    /// Samples are marked in a bitmap over the strip's bounding box clipped to
    /// the image, so memory never exceeds the image area.
    fn pixels<R: GrayRaster + ?Sized>(&self, image: &R, step: f64) -> Vec<(u32, u32)> {
        let (w, h) = image.dimensions();
        let x0 = (self.center[0] - self.r_out).floor().max(0.0);
        let x1 = (self.center[0] + self.r_out).floor().min(f64::from(w) - 1.0);
        let y0 = (self.center[1] - self.r_out).floor().max(0.0);
        let y1 = (self.center[1] + self.r_out).floor().min(f64::from(h) - 1.0);
        if x1 < x0 || y1 < y0 {
            return Vec::new();
        }
        let box_w = (x1 - x0) as usize + 1;
        let box_h = (y1 - y0) as usize + 1;
        let mut hit = vec![false; box_w * box_h];

        let n_theta = ((self.span_angle.abs().to_radians() * self.r_out) / step)
            .ceil()
            .max(1.0) as usize;
        let n_rho = ((self.r_out - self.r_in) / step).ceil().max(1.0) as usize;
        for i in 0..=n_theta {
            let theta = self.start_angle + self.span_angle * i as f64 / n_theta as f64;
            let u = unit_from_display_deg(theta);
            for j in 0..=n_rho {
                let rho = self.r_in + (self.r_out - self.r_in) * j as f64 / n_rho as f64;
                let x = (self.center[0] + rho * u[0]).floor();
                let y = (self.center[1] + rho * u[1]).floor();
                if x < x0 || y < y0 || x > x1 || y > y1 {
                    continue;
                }
                hit[(y - y0) as usize * box_w + (x - x0) as usize] = true;
            }
        }

        let (x0, y0) = (x0 as u32, y0 as u32);
        let mut pixels = Vec::new();
        for (idx, _) in hit.iter().enumerate().filter(|(_, marked)| **marked) {
            let y = y0 + (idx / box_w) as u32;
            let x = x0 + (idx % box_w) as u32;
            if self.contains([f64::from(x) + 0.5, f64::from(y) + 0.5]) {
                pixels.push((y, x));
            }
        }
        pixels
    }
}
