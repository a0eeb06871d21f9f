//! Device calibration constants and pixel-to-physical conversions.

use serde::{Deserialize, Serialize};

use crate::circle::FittedCircle;
use crate::error::{ensure_finite, MeasureError};

/// Calibration of one chamber/camera setup.
///
/// All values are opaque linear factors; nothing here is process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    /// Length of one image pixel on the chamber plane (cm/px).
    pub cm_per_px: f64,
    /// Absolute uncertainty of `cm_per_px` (cm/px).
    pub cm_per_px_error: f64,
    /// Momentum per pixel of curvature radius (MeV/c per px). Embeds the
    /// magnetic field and the pixel scale.
    pub momentum_per_px: f64,
    /// Fractional systematic uncertainty of `momentum_per_px`.
    pub momentum_cal_fraction: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            cm_per_px: 1.0,
            cm_per_px_error: 0.0,
            momentum_per_px: 1.0,
            momentum_cal_fraction: 0.0,
        }
    }
}

/// Radius on the chamber plane with separated error terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusCm {
    pub value: f64,
    /// From the fit scatter.
    pub stat_error: f64,
    /// From the pixel-scale calibration.
    pub cal_error: f64,
}

/// Arc length of the measured track segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackLength {
    /// Arc length in image pixels.
    pub pixels: f64,
    /// Arc length on the chamber plane (cm).
    pub cm: f64,
    /// Calibration uncertainty of `cm`.
    pub cm_error: f64,
}

impl Calibration {
    /// Check that every constant is finite and in its domain.
    pub fn validate(&self) -> Result<(), MeasureError> {
        for (name, v) in [
            ("cm_per_px", self.cm_per_px),
            ("cm_per_px_error", self.cm_per_px_error),
            ("momentum_per_px", self.momentum_per_px),
            ("momentum_cal_fraction", self.momentum_cal_fraction),
        ] {
            ensure_finite(name, v)?;
        }
        if self.cm_per_px <= 0.0 {
            return Err(MeasureError::invalid("cm_per_px must be positive"));
        }
        if self.momentum_per_px <= 0.0 {
            return Err(MeasureError::invalid("momentum_per_px must be positive"));
        }
        if self.cm_per_px_error < 0.0 || self.momentum_cal_fraction < 0.0 {
            return Err(MeasureError::invalid(
                "calibration uncertainties must be non-negative",
            ));
        }
        Ok(())
    }

    /// Parse one calibration value typed by the operator.
    ///
    /// Unparseable or non-finite text is reported, never replaced by a default.
    pub fn parse_value(field: &str, text: &str) -> Result<f64, MeasureError> {
        let v: f64 = text.trim().parse().map_err(|e| {
            MeasureError::invalid(format!("{}: cannot parse {:?} as a number ({})", field, text, e))
        })?;
        ensure_finite(field, v)
    }

    /// Fitted radius converted to centimetres.
    pub fn radius_cm(&self, circle: &FittedCircle) -> RadiusCm {
        RadiusCm {
            value: circle.radius * self.cm_per_px,
            stat_error: circle.radius_err * self.cm_per_px,
            cal_error: circle.radius * self.cm_per_px_error,
        }
    }

    /// Length of the arc swept by `span_deg` on `circle`.
    pub fn track_length(&self, circle: &FittedCircle, span_deg: f64) -> TrackLength {
        let pixels = circle.arc_length_px(span_deg);
        TrackLength {
            pixels,
            cm: pixels * self.cm_per_px,
            cm_error: pixels * self.cm_per_px_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn circle(radius: f64, radius_err: f64) -> FittedCircle {
        FittedCircle {
            center_x: 0.0,
            center_y: 0.0,
            center_x_err: 0.0,
            center_y_err: 0.0,
            radius,
            radius_err,
        }
    }

    #[test]
    fn radius_conversion_keeps_errors_separate() {
        let cal = Calibration {
            cm_per_px: 0.02,
            cm_per_px_error: 0.001,
            ..Default::default()
        };
        let r = cal.radius_cm(&circle(500.0, 2.0));
        assert_relative_eq!(r.value, 10.0, epsilon = 1e-12);
        assert_relative_eq!(r.stat_error, 0.04, epsilon = 1e-12);
        assert_relative_eq!(r.cal_error, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn track_length_uses_absolute_span() {
        let cal = Calibration {
            cm_per_px: 0.5,
            cm_per_px_error: 0.01,
            ..Default::default()
        };
        let c = circle(100.0, 0.0);
        let l = cal.track_length(&c, -90.0);
        assert_relative_eq!(l.pixels, 50.0 * std::f64::consts::PI, epsilon = 1e-12);
        assert_relative_eq!(l.cm, 25.0 * std::f64::consts::PI, epsilon = 1e-12);
        assert_relative_eq!(l.cm_error, 0.5 * std::f64::consts::PI, epsilon = 1e-12);
    }

    #[test]
    fn validate_rejects_bad_constants() {
        assert!(Calibration::default().validate().is_ok());
        let neg = Calibration {
            cm_per_px: -1.0,
            ..Default::default()
        };
        assert!(neg.validate().is_err());
        let nan = Calibration {
            momentum_cal_fraction: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(nan.validate(), Err(MeasureError::InvalidInput(_))));
        let neg_err = Calibration {
            cm_per_px_error: -0.1,
            ..Default::default()
        };
        assert!(neg_err.validate().is_err());
    }

    #[test]
    fn parse_value_reports_instead_of_defaulting() {
        assert_eq!(Calibration::parse_value("dl", " 2.5 ").unwrap(), 2.5);
        let err = Calibration::parse_value("dl", "2,5").unwrap_err();
        assert!(err.to_string().contains("dl"));
        assert!(Calibration::parse_value("dl", "inf").is_err());
        assert!(Calibration::parse_value("dl", "").is_err());
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cal: Calibration = serde_json::from_str(r#"{"cm_per_px": 0.0125}"#).unwrap();
        assert_eq!(cal.cm_per_px, 0.0125);
        assert_eq!(cal.momentum_per_px, 1.0);
    }
}
