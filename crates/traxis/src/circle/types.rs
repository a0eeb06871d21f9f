//! Fitted circle record and fit configuration.

use serde::{Deserialize, Serialize};

use crate::geometry::{display_angle_deg, norm, sub, unit_from_display_deg};

/// Circle fitted to track markers, in image pixel units.
///
/// Produced once per fit and never mutated afterwards. Conversion to
/// physical units goes through [`crate::Calibration`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FittedCircle {
    /// Center x (pixels).
    pub center_x: f64,
    /// Center y (pixels).
    pub center_y: f64,
    /// One-sigma uncertainty of `center_x`.
    pub center_x_err: f64,
    /// One-sigma uncertainty of `center_y`.
    pub center_y_err: f64,
    /// Radius (pixels), always positive.
    pub radius: f64,
    /// One-sigma uncertainty of `radius`, never negative.
    pub radius_err: f64,
}

impl FittedCircle {
    #[inline]
    pub fn center(&self) -> [f64; 2] {
        [self.center_x, self.center_y]
    }

    /// Point on the circumference at `angle_deg` (screen counter-clockwise from +x).
    pub fn point_at(&self, angle_deg: f64) -> [f64; 2] {
        let u = unit_from_display_deg(angle_deg);
        [
            self.center_x + self.radius * u[0],
            self.center_y + self.radius * u[1],
        ]
    }

    /// Polar angle of `point` about the center, or `None` at the center itself.
    pub fn angle_of(&self, point: [f64; 2]) -> Option<f64> {
        let d = sub(point, self.center());
        if d[0] == 0.0 && d[1] == 0.0 {
            return None;
        }
        Some(display_angle_deg(d))
    }

    /// Closest point on the circumference to `point`.
    pub fn project(&self, point: [f64; 2]) -> Option<[f64; 2]> {
        let d = sub(point, self.center());
        let n = norm(d);
        if !(n > 0.0) {
            return None;
        }
        Some([
            self.center_x + d[0] / n * self.radius,
            self.center_y + d[1] / n * self.radius,
        ])
    }

    /// Signed distance of `point` from the circumference (positive outside).
    #[inline]
    pub fn radial_residual(&self, point: [f64; 2]) -> f64 {
        norm(sub(point, self.center())) - self.radius
    }

    /// Arc length in pixels swept by `span_deg` degrees.
    #[inline]
    pub fn arc_length_px(&self, span_deg: f64) -> f64 {
        self.radius * span_deg.abs().to_radians()
    }
}

/// Tuning for the algebraic circle fit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FitConfig {
    /// Smallest accepted ratio of the smallest to the largest eigenvalue of
    /// the normalized normal-equation matrix. Point sets below this are
    /// treated as collinear.
    pub min_condition: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            min_condition: 1e-12,
        }
    }
}
