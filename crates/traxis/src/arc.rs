//! Angular extent of the measured track segment on the fitted circle.

use serde::{Deserialize, Serialize};

use crate::circle::FittedCircle;
use crate::error::MeasureError;
use crate::geometry::normalize_deg;
use crate::track::{end_point, start_point, Designation, TrackPoint};

/// Arc from the start marker to the end marker about the fitted center.
///
/// Angles are in degrees, screen counter-clockwise from +x. A negative
/// `span_angle` sweeps clockwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSpan {
    pub start_angle: f64,
    pub span_angle: f64,
}

impl ArcSpan {
    pub fn new(start_angle: f64, span_angle: f64) -> Self {
        Self {
            start_angle,
            span_angle,
        }
    }

    /// Angle at which the arc ends, in `[0, 360)`.
    pub fn end_angle(&self) -> f64 {
        normalize_deg(self.start_angle + self.span_angle)
    }

    /// `+1.0` for a counter-clockwise sweep, `-1.0` for clockwise.
    pub fn direction(&self) -> f64 {
        if self.span_angle < 0.0 {
            -1.0
        } else {
            1.0
        }
    }

    /// Span between the designated start and end markers.
    ///
    /// Of the two arcs joining start and end, the one holding the majority
    /// of the undesignated markers is taken; ties sweep counter-clockwise.
    pub fn from_markers(circle: &FittedCircle, points: &[TrackPoint]) -> Result<Self, MeasureError> {
        let start = start_point(points).ok_or(MeasureError::MissingDesignation(Designation::Start))?;
        let end = end_point(points).ok_or(MeasureError::MissingDesignation(Designation::End))?;
        let center = circle.center();

        let start_angle = start
            .angle_about(center, None)
            .ok_or_else(|| MeasureError::invalid("start marker coincides with the fitted center"))?;
        let ccw_span = end
            .angle_about(center, Some(start.xy()))
            .ok_or_else(|| MeasureError::invalid("end marker coincides with the fitted center"))?;

        let mut inside = 0usize;
        let mut outside = 0usize;
        for p in points.iter().filter(|p| p.designation == Designation::None) {
            match p.angle_about(center, Some(start.xy())) {
                Some(a) if a <= ccw_span => inside += 1,
                Some(_) => outside += 1,
                None => {}
            }
        }

        let span_angle = if outside > inside && ccw_span > 0.0 {
            ccw_span - 360.0
        } else {
            ccw_span
        };
        Ok(Self {
            start_angle,
            span_angle,
        })
    }
}
