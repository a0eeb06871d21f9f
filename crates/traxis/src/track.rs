//! Operator-placed track markers and the angle reference line.

use serde::{Deserialize, Serialize};

use crate::error::MeasureError;
use crate::geometry::{angle_between_deg, sub};

/// Role of a marker along the track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Designation {
    /// Ordinary track marker.
    #[default]
    None,
    /// First point of the measured track segment.
    Start,
    /// Last point of the measured track segment.
    End,
}

impl std::fmt::Display for Designation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Start => write!(f, "start"),
            Self::End => write!(f, "end"),
        }
    }
}

/// A marker placed on the photograph, in image pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub x: f64,
    pub y: f64,
    #[serde(default, deserialize_with = "designation_or_none")]
    pub designation: Designation,
}

/// Accept `null` as an undesignated marker.
fn designation_or_none<'de, D>(deserializer: D) -> Result<Designation, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Designation>::deserialize(deserializer)?.unwrap_or_default())
}

impl TrackPoint {
    /// Undesignated marker at `(x, y)`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            designation: Designation::None,
        }
    }

    /// Marker at `(x, y)` carrying `designation`.
    pub fn designated(x: f64, y: f64, designation: Designation) -> Self {
        Self { x, y, designation }
    }

    #[inline]
    pub fn xy(&self) -> [f64; 2] {
        [self.x, self.y]
    }

    /// Polar angle of this marker about `origin`, in degrees `[0, 360)`.
    ///
    /// Measured counter-clockwise on screen from the horizontal axis through
    /// `origin`, or from the direction `origin -> reference` when a reference
    /// point is given. Returns `None` when the marker (or reference) coincides
    /// with `origin`.
    pub fn angle_about(&self, origin: [f64; 2], reference: Option<[f64; 2]>) -> Option<f64> {
        let axis = match reference {
            Some(r) => sub(r, origin),
            None => [1.0, 0.0],
        };
        angle_between_deg(axis, sub(self.xy(), origin))
    }
}

/// First marker designated as the start point.
pub fn start_point(points: &[TrackPoint]) -> Option<&TrackPoint> {
    points.iter().find(|p| p.designation == Designation::Start)
}

/// First marker designated as the end point.
pub fn end_point(points: &[TrackPoint]) -> Option<&TrackPoint> {
    points.iter().find(|p| p.designation == Designation::End)
}

/// Operator-drawn angle reference line.
///
/// The line is drawn with a press (initial point) and a release (final
/// point); either may still be missing while the operator is drawing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ReferenceLine {
    #[serde(default)]
    pub initial_point: Option<[f64; 2]>,
    #[serde(default)]
    pub final_point: Option<[f64; 2]>,
}

impl ReferenceLine {
    /// Fully drawn line from `initial` to `fin`.
    pub fn new(initial: [f64; 2], fin: [f64; 2]) -> Self {
        Self {
            initial_point: Some(initial),
            final_point: Some(fin),
        }
    }

    /// No line drawn; angles are taken against the horizontal axis.
    pub fn polar_axis() -> Self {
        Self::default()
    }

    /// Direction vector of the reference.
    ///
    /// With no endpoints the reference is the polar axis `+x`. A line whose
    /// final point is not set yet is [`MeasureError::IncompleteReference`].
    pub fn direction(&self) -> Result<[f64; 2], MeasureError> {
        match (self.initial_point, self.final_point) {
            (None, None) => Ok([1.0, 0.0]),
            (Some(a), Some(b)) => {
                if !(a[0].is_finite() && a[1].is_finite() && b[0].is_finite() && b[1].is_finite())
                {
                    return Err(MeasureError::invalid("reference line endpoints must be finite"));
                }
                let d = sub(b, a);
                if d[0] == 0.0 && d[1] == 0.0 {
                    return Err(MeasureError::invalid(
                        "reference line endpoints coincide",
                    ));
                }
                Ok(d)
            }
            _ => Err(MeasureError::IncompleteReference),
        }
    }
}
