//! Circle fitting primitives.
//!
//! Implements:
//! - Algebraic least-squares circle fit (Kåsa, 1976) on normalized coordinates.
//! - Residual-based uncertainties for center and radius.
//! - Geometric helpers on the fitted circle (projection, polar angles, arc length).

mod fit;
mod types;

pub use fit::{fit_circle, fit_circle_with, rms_radial_residual, MIN_FIT_POINTS};
pub use types::{FitConfig, FittedCircle};
