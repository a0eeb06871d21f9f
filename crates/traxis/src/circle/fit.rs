//! Algebraic least-squares circle fit (Kåsa) with residual-based uncertainties.

use nalgebra::{Matrix3, SymmetricEigen, Vector3};

use super::types::{FitConfig, FittedCircle};
use crate::error::MeasureError;
use crate::track::TrackPoint;

/// Minimum number of markers that determine a circle.
pub const MIN_FIT_POINTS: usize = 3;

/// Fit a circle to track markers with the default [`FitConfig`].
pub fn fit_circle(points: &[TrackPoint]) -> Result<FittedCircle, MeasureError> {
    fit_circle_with(points, &FitConfig::default())
}

/// Fit a circle to track markers.
///
/// Minimizes `Σ (x² + y² + D·x + E·y + F)²` over `(D, E, F)`, then recovers
/// center `(-D/2, -E/2)` and radius `sqrt(cx² + cy² - F)`. Marker order and
/// designations are ignored.
pub fn fit_circle_with(
    points: &[TrackPoint],
    config: &FitConfig,
) -> Result<FittedCircle, MeasureError> {
    let xy: Vec<[f64; 2]> = points.iter().map(TrackPoint::xy).collect();
    fit_circle_xy(&xy, config)
}

fn fit_circle_xy(
    points: &[[f64; 2]],
    config: &FitConfig,
) -> Result<FittedCircle, MeasureError> {
    let n = points.len();
    if n < MIN_FIT_POINTS {
        return Err(MeasureError::InsufficientPoints {
            needed: MIN_FIT_POINTS,
            got: n,
        });
    }
    if points.iter().any(|p| !p[0].is_finite() || !p[1].is_finite()) {
        return Err(MeasureError::invalid("marker coordinates must be finite"));
    }

    // Work in centroid-shifted, isotropically scaled coordinates so that the
    // normal equations stay well conditioned for large pixel offsets.
    let (mean_x, mean_y, scale) = normalization_params(points);

    let mut normal = Matrix3::<f64>::zeros();
    let mut rhs = Vector3::<f64>::zeros();
    for &[px, py] in points {
        let u = (px - mean_x) * scale;
        let v = (py - mean_y) * scale;
        let row = Vector3::new(u, v, 1.0);
        normal += row * row.transpose();
        rhs -= row * (u * u + v * v);
    }

    let eig = SymmetricEigen::new(normal).eigenvalues;
    let eig_max = eig.max();
    let eig_min = eig.min();
    if !(eig_max > 0.0) || eig_min / eig_max < config.min_condition {
        return Err(MeasureError::DegenerateGeometry);
    }

    let sol = normal
        .lu()
        .solve(&rhs)
        .ok_or(MeasureError::DegenerateGeometry)?;
    let cu = -0.5 * sol[0];
    let cv = -0.5 * sol[1];
    let r2 = cu * cu + cv * cv - sol[2];
    if !(r2 > 0.0) || !r2.is_finite() {
        return Err(MeasureError::DegenerateGeometry);
    }

    let center_x = mean_x + cu / scale;
    let center_y = mean_y + cv / scale;
    let radius = r2.sqrt() / scale;
    if !(radius > 0.0) || !radius.is_finite() {
        return Err(MeasureError::DegenerateGeometry);
    }

    let [center_x_err, center_y_err, radius_err] =
        fit_uncertainties(points, center_x, center_y, radius);

    Ok(FittedCircle {
        center_x,
        center_y,
        center_x_err,
        center_y_err,
        radius,
        radius_err,
    })
}

/// One-sigma uncertainties of `(cx, cy, r)` from the radial residual scatter.
///
/// The residual variance `σ² = Σ dᵢ² / max(n − 3, 1)` is propagated through
/// the geometric-distance Jacobian `Jᵢ = [−cos φᵢ, −sin φᵢ, −1]`, giving
/// `cov = σ² (JᵀJ)⁻¹`. Errors grow with the residuals, shrink roughly as
/// `1/√n`, and widen for markers covering only a short arc.
fn fit_uncertainties(points: &[[f64; 2]], cx: f64, cy: f64, r: f64) -> [f64; 3] {
    let n = points.len();
    let mut sum_sq = 0.0f64;
    let mut jtj = Matrix3::<f64>::zeros();
    for &[x, y] in points {
        let dx = x - cx;
        let dy = y - cy;
        let dist = dx.hypot(dy);
        let d = dist - r;
        sum_sq += d * d;
        let (c, s) = if dist > 0.0 {
            (dx / dist, dy / dist)
        } else {
            (0.0, 0.0)
        };
        let j = Vector3::new(-c, -s, -1.0);
        jtj += j * j.transpose();
    }
    let dof = n.saturating_sub(3).max(1) as f64;
    let sigma2 = sum_sq / dof;

    match jtj.try_inverse() {
        Some(inv) => [
            (sigma2 * inv[(0, 0)]).max(0.0).sqrt(),
            (sigma2 * inv[(1, 1)]).max(0.0).sqrt(),
            (sigma2 * inv[(2, 2)]).max(0.0).sqrt(),
        ],
        None => {
            let iso = (sigma2 / n as f64).sqrt();
            [iso, iso, iso]
        }
    }
}

/// Compute normalization parameters for a point set.
/// Returns (mean_x, mean_y, scale).
fn normalization_params(points: &[[f64; 2]]) -> (f64, f64, f64) {
    let n = points.len() as f64;
    let mean_x: f64 = points.iter().map(|p| p[0]).sum::<f64>() / n;
    let mean_y: f64 = points.iter().map(|p| p[1]).sum::<f64>() / n;

    let mean_dist: f64 = points
        .iter()
        .map(|p| (p[0] - mean_x).hypot(p[1] - mean_y))
        .sum::<f64>()
        / n;

    let scale = if mean_dist > 1e-15 {
        std::f64::consts::SQRT_2 / mean_dist
    } else {
        1.0
    };

    (mean_x, mean_y, scale)
}

/// RMS radial distance of markers from the fitted circumference.
pub fn rms_radial_residual(circle: &FittedCircle, points: &[TrackPoint]) -> f64 {
    if points.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = points
        .iter()
        .map(|p| {
            let d = circle.radial_residual(p.xy());
            d * d
        })
        .sum();
    (sum_sq / points.len() as f64).sqrt()
}
