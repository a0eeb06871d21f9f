//! High-level measurement API.
//!
//! [`TrackAnalyzer`] is the primary entry point. It holds an
//! [`AnalysisConfig`] and chains the fit, span, momentum, angle and density
//! calculators the way an operator session uses them.

use serde::{Deserialize, Serialize};

use crate::angle::{tangent_at, AngleResult, TangentEnvelope};
use crate::arc::ArcSpan;
use crate::calibration::{RadiusCm, TrackLength};
use crate::circle::{fit_circle_with, rms_radial_residual, FittedCircle};
use crate::config::AnalysisConfig;
use crate::density::{blackness_over_arc_with, GrayRaster, OpticalDensity, OpticalDensityResult};
use crate::error::MeasureError;
use crate::momentum::{momentum, MomentumResult};
use crate::track::{start_point, Designation, ReferenceLine, TrackPoint};

/// Fit and derived quantities for one set of markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackMeasurement {
    pub circle: FittedCircle,
    /// RMS distance of the markers from the fitted circumference (pixels).
    pub rms_residual: f64,
    pub radius_cm: RadiusCm,
    pub momentum: MomentumResult,
    /// Present when both a start and an end marker are designated.
    pub arc: Option<ArcSpan>,
    /// Present together with `arc`.
    pub length: Option<TrackLength>,
}

/// Tangent at the start marker and its angle to the reference line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleMeasurement {
    /// Oriented along the direction of travel from start to end.
    pub envelope: TangentEnvelope,
    pub angle: AngleResult,
}

/// Blackness of the strip around the measured arc and the density per cm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityMeasurement {
    /// Strip width used (pixels).
    pub dl: f64,
    pub blackness: OpticalDensityResult,
    pub density: OpticalDensity,
}

/// Primary measurement interface.
///
/// Create once per calibration, measure many tracks.
///
/// # Examples
///
/// ```
/// use traxis::{Designation, TrackAnalyzer, TrackPoint};
///
/// let points = vec![
///     TrackPoint::designated(110.0, 0.0, Designation::Start),
///     TrackPoint::new(0.0, 110.0),
///     TrackPoint::designated(-110.0, 0.0, Designation::End),
/// ];
/// let analyzer = TrackAnalyzer::new();
/// let track = analyzer.measure(&points).unwrap();
/// assert!((track.circle.radius - 110.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct TrackAnalyzer {
    config: AnalysisConfig,
}

impl TrackAnalyzer {
    /// Analyzer with unit calibration and default fit/sampling settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with full config control.
    pub fn with_config(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Mutable access to configuration for post-construction tuning.
    pub fn config_mut(&mut self) -> &mut AnalysisConfig {
        &mut self.config
    }

    /// Fit a circle to `points` and derive radius, momentum and, when the
    /// start and end markers are designated, the arc span and track length.
    pub fn measure(&self, points: &[TrackPoint]) -> Result<TrackMeasurement, MeasureError> {
        let cal = &self.config.calibration;
        cal.validate()?;

        let circle = fit_circle_with(points, &self.config.fit)?;
        let rms_residual = rms_radial_residual(&circle, points);
        tracing::debug!(
            "circle fit: center=({:.2}, {:.2}) r={:.3}±{:.3} rms={:.3} n={}",
            circle.center_x,
            circle.center_y,
            circle.radius,
            circle.radius_err,
            rms_residual,
            points.len()
        );

        let radius_cm = cal.radius_cm(&circle);
        let momentum = momentum(circle.radius, circle.radius_err, cal)?;

        let arc = match ArcSpan::from_markers(&circle, points) {
            Ok(arc) => Some(arc),
            Err(MeasureError::MissingDesignation(d)) => {
                tracing::debug!("no {} marker; skipping arc span and length", d);
                None
            }
            Err(e) => return Err(e),
        };
        let length = arc.map(|a| cal.track_length(&circle, a.span_angle));

        tracing::info!(
            "track measured: p={:.3} MeV/c (stat {:.3}, cal {:.3}), span={}",
            momentum.momentum,
            momentum.stat_error,
            momentum.cal_error,
            arc.map_or_else(|| "n/a".to_string(), |a| format!("{:.2} deg", a.span_angle))
        );

        Ok(TrackMeasurement {
            circle,
            rms_residual,
            radius_cm,
            momentum,
            arc,
            length,
        })
    }

    /// Tangent at the designated start marker, oriented toward the end
    /// marker, and its opening angle to `reference`.
    pub fn opening_angle(
        &self,
        track: &TrackMeasurement,
        points: &[TrackPoint],
        reference: &ReferenceLine,
    ) -> Result<AngleMeasurement, MeasureError> {
        let start = start_point(points).ok_or(MeasureError::MissingDesignation(Designation::Start))?;
        let direction = track.arc.map_or(1.0, |a| a.direction());
        let envelope = tangent_at(&track.circle, start)?.oriented(direction);
        let angle = envelope.opening_angle(reference)?;
        tracing::info!("opening angle: {:.3} ± {:.3} deg", angle.angle, angle.error);
        Ok(AngleMeasurement { envelope, angle })
    }

    /// Blackness over the strip of width `dl` around the measured arc and
    /// the resulting density per centimetre of track.
    pub fn optical_density<R: GrayRaster + ?Sized>(
        &self,
        track: &TrackMeasurement,
        image: &R,
        dl: f64,
    ) -> Result<DensityMeasurement, MeasureError> {
        let (arc, length) = match (track.arc, track.length) {
            (Some(arc), Some(length)) => (arc, length),
            _ => {
                return Err(MeasureError::MissingDesignation(Designation::End));
            }
        };
        let blackness = blackness_over_arc_with(
            image,
            &track.circle,
            dl,
            arc.start_angle,
            arc.span_angle,
            &self.config.blackness,
        )?;
        tracing::debug!(
            "blackness {:.1} ± {:.1} over {} px (dl={})",
            blackness.blackness,
            blackness.blackness_error,
            blackness.n_pixels,
            dl
        );
        let density = OpticalDensity::from_blackness(&blackness, &length)?;
        tracing::info!(
            "optical density: {:.5} ± {:.5} 1/cm",
            density.density,
            density.density_error
        );
        Ok(DensityMeasurement {
            dl,
            blackness,
            density,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::Calibration;
    use crate::test_utils::{black_annulus_image, circle_points, noisy_circle_points};
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    fn designate(mut pts: Vec<TrackPoint>) -> Vec<TrackPoint> {
        let last = pts.len() - 1;
        pts[0].designation = Designation::Start;
        pts[last].designation = Designation::End;
        pts
    }

    fn analyzer() -> TrackAnalyzer {
        TrackAnalyzer::with_config(AnalysisConfig {
            calibration: Calibration {
                cm_per_px: 0.01,
                cm_per_px_error: 0.0005,
                momentum_per_px: 0.3,
                momentum_cal_fraction: 0.05,
            },
            ..Default::default()
        })
    }

    #[test]
    fn measure_chains_fit_span_and_momentum() {
        let pts = designate(circle_points([300.0, 300.0], 200.0, 30.0, 120.0, 10));
        let track = analyzer().measure(&pts).unwrap();
        assert_abs_diff_eq!(track.circle.radius, 200.0, epsilon = 1e-6);
        assert_abs_diff_eq!(track.rms_residual, 0.0, epsilon = 1e-6);
        assert_relative_eq!(track.momentum.momentum, 60.0, max_relative = 1e-9);
        assert_relative_eq!(track.momentum.cal_error, 3.0, max_relative = 1e-9);
        assert_relative_eq!(track.radius_cm.value, 2.0, max_relative = 1e-9);

        let arc = track.arc.unwrap();
        assert_abs_diff_eq!(arc.start_angle, 30.0, epsilon = 1e-6);
        assert_abs_diff_eq!(arc.span_angle, 90.0, epsilon = 1e-6);
        let len = track.length.unwrap();
        assert_relative_eq!(len.pixels, 100.0 * std::f64::consts::PI, max_relative = 1e-6);
        assert_relative_eq!(len.cm, std::f64::consts::PI, max_relative = 1e-6);
    }

    #[test]
    fn measure_without_designations_still_fits() {
        let pts = circle_points([0.0, 0.0], 50.0, 0.0, 90.0, 6);
        let track = analyzer().measure(&pts).unwrap();
        assert!(track.arc.is_none());
        assert!(track.length.is_none());
        let img = black_annulus_image(10, 10, (5, 5), 1, 2);
        assert_eq!(
            analyzer().optical_density(&track, &img, 4.0),
            Err(MeasureError::MissingDesignation(Designation::End))
        );
    }

    #[test]
    fn opening_angle_follows_direction_of_travel() {
        let reference = ReferenceLine::new([0.0, 0.0], [100.0, 0.0]);

        // Counter-clockwise track starting at the right of the circle heads up.
        let ccw = designate(circle_points([300.0, 300.0], 200.0, 0.0, 60.0, 8));
        let track = analyzer().measure(&ccw).unwrap();
        let res = analyzer().opening_angle(&track, &ccw, &reference).unwrap();
        assert_abs_diff_eq!(res.angle.angle, 90.0, epsilon = 1e-6);
        assert_abs_diff_eq!(res.angle.error, 0.0, epsilon = 1e-6);

        // The same markers walked clockwise head down.
        let cw = designate(circle_points([300.0, 300.0], 200.0, 0.0, -60.0, 8));
        let track = analyzer().measure(&cw).unwrap();
        assert!(track.arc.unwrap().span_angle < 0.0);
        let res = analyzer().opening_angle(&track, &cw, &reference).unwrap();
        assert_abs_diff_eq!(res.angle.angle, 270.0, epsilon = 1e-6);
    }

    #[test]
    fn noisy_markers_give_a_finite_error_cone() {
        let pts = designate(noisy_circle_points([400.0, 400.0], 300.0, 200.0, 280.0, 20, 0.8, 5));
        let track = analyzer().measure(&pts).unwrap();
        let res = analyzer()
            .opening_angle(&track, &pts, &ReferenceLine::polar_axis())
            .unwrap();
        assert!(res.angle.error > 0.0 && res.angle.error < 10.0);
        assert!((0.0..360.0).contains(&res.angle.angle));
    }

    #[test]
    fn density_over_drawn_track() {
        let pts = designate(circle_points([150.0, 150.0], 100.0, 10.0, 130.0, 12));
        let track = analyzer().measure(&pts).unwrap();
        let img = black_annulus_image(300, 300, (150, 150), 80, 120);
        let res = analyzer().optical_density(&track, &img, 20.0).unwrap();
        assert_eq!(res.blackness.blackness, 255.0 * res.blackness.n_pixels as f64);
        let len = track.length.unwrap();
        assert_relative_eq!(res.density.density, res.blackness.blackness / len.cm);
        assert!(res.density.density_error > 0.0);
    }

    #[test]
    fn invalid_calibration_is_reported() {
        let mut a = analyzer();
        a.config_mut().calibration.momentum_per_px = f64::NAN;
        let pts = designate(circle_points([0.0, 0.0], 10.0, 0.0, 90.0, 5));
        assert!(matches!(a.measure(&pts), Err(MeasureError::InvalidInput(_))));
    }
}
