//! Error type shared by all measurement stages.

use crate::track::Designation;

/// Errors returned by the fitting and measurement functions.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasureError {
    /// Too few markers for a circle fit.
    InsufficientPoints {
        /// Required minimum number of points.
        needed: usize,
        /// Provided number of points.
        got: usize,
    },
    /// Markers are (nearly) collinear or coincident; no stable circle exists.
    DegenerateGeometry,
    /// A numeric input is non-finite or outside its domain.
    InvalidInput(String),
    /// The reference line has an initial point but no final point yet.
    IncompleteReference,
    /// No marker carries the designation the measurement needs.
    MissingDesignation(Designation),
}

impl MeasureError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

impl std::fmt::Display for MeasureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientPoints { needed, got } => {
                write!(f, "too few points: need {}, got {}", needed, got)
            }
            Self::DegenerateGeometry => {
                write!(f, "points are too close to collinear to fit a circle")
            }
            Self::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            Self::IncompleteReference => write!(f, "reference line is not fully drawn"),
            Self::MissingDesignation(d) => write!(f, "no marker designated as {} point", d),
        }
    }
}

impl std::error::Error for MeasureError {}

/// Reject non-finite values with a named [`MeasureError::InvalidInput`].
pub(crate) fn ensure_finite(name: &str, value: f64) -> Result<f64, MeasureError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(MeasureError::invalid(format!("{} must be finite, got {}", name, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_missing_designation() {
        let e = MeasureError::MissingDesignation(Designation::Start);
        assert_eq!(e.to_string(), "no marker designated as start point");
    }

    #[test]
    fn ensure_finite_rejects_nan_and_inf() {
        assert!(ensure_finite("x", 1.5).is_ok());
        assert!(matches!(
            ensure_finite("x", f64::NAN),
            Err(MeasureError::InvalidInput(_))
        ));
        assert!(ensure_finite("x", f64::INFINITY).is_err());
    }
}
