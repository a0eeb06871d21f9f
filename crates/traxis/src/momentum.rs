//! Track momentum from the fitted curvature radius.

use serde::{Deserialize, Serialize};

use crate::calibration::Calibration;
use crate::error::{ensure_finite, MeasureError};

/// Momentum with statistical and calibration errors kept apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MomentumResult {
    /// Momentum (MeV/c).
    pub momentum: f64,
    /// Propagated from the radius uncertainty.
    pub stat_error: f64,
    /// Systematic term from the calibration constant.
    pub cal_error: f64,
}

/// Momentum `p = C·r` for a radius of `radius ± radius_err` pixels.
///
/// `stat_error = C·σr` and `cal_error = C·r·f`; the two are never combined.
pub fn momentum(
    radius: f64,
    radius_err: f64,
    calibration: &Calibration,
) -> Result<MomentumResult, MeasureError> {
    calibration.validate()?;
    ensure_finite("radius", radius)?;
    ensure_finite("radius_err", radius_err)?;
    if radius < 0.0 {
        return Err(MeasureError::invalid(format!(
            "radius must be non-negative, got {}",
            radius
        )));
    }
    if radius_err < 0.0 {
        return Err(MeasureError::invalid(format!(
            "radius_err must be non-negative, got {}",
            radius_err
        )));
    }
    let c = calibration.momentum_per_px;
    Ok(MomentumResult {
        momentum: c * radius,
        stat_error: c * radius_err,
        cal_error: c * radius * calibration.momentum_cal_fraction,
    })
}
