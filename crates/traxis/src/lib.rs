//! traxis: track measurement on bubble-chamber photographs.
//!
//! An operator places markers along a particle track; this crate turns them
//! into physics quantities. The stages are:
//!
//! 1. **Circle** – algebraic least-squares circle fit with uncertainties.
//! 2. **Momentum** – `p = C·r` with statistical and calibration errors kept apart.
//! 3. **Angle** – tangent at a marker, its error cone, and the opening angle
//!    against a reference line.
//! 4. **Density** – film blackness over an annular strip around the arc and
//!    the density per unit track length.
//!
//! Every calculator is a pure function of its inputs. [`TrackAnalyzer`] holds
//! an [`AnalysisConfig`] and chains them for a measurement session.
//!
//! # Conventions
//! Coordinates are image pixels with the y axis pointing down. Angles are in
//! degrees, measured counter-clockwise as seen on screen, in `[0, 360)`.

mod angle;
mod api;
mod arc;
mod calibration;
mod circle;
mod config;
mod density;
mod error;
mod geometry;
mod momentum;
mod track;

#[cfg(test)]
pub(crate) mod test_utils;

pub use angle::{opening_angle, tangent_at, AngleResult, TangentEnvelope, TangentLine};
pub use api::{AngleMeasurement, DensityMeasurement, TrackAnalyzer, TrackMeasurement};
pub use arc::ArcSpan;
pub use calibration::{Calibration, RadiusCm, TrackLength};
pub use circle::{
    fit_circle, fit_circle_with, rms_radial_residual, FitConfig, FittedCircle, MIN_FIT_POINTS,
};
pub use config::AnalysisConfig;
pub use density::{
    blackness_over_arc, blackness_over_arc_with, BlacknessConfig, GrayRaster, OpticalDensity,
    OpticalDensityResult,
};
pub use error::MeasureError;
pub use geometry::{angle_between_deg, display_angle_deg, normalize_deg, wrapped_diff_deg};
pub use momentum::{momentum, MomentumResult};
pub use track::{end_point, start_point, Designation, ReferenceLine, TrackPoint};
