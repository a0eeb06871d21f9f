//! Tangent at a track point and its opening angle against a reference line.

use serde::{Deserialize, Serialize};

use crate::circle::FittedCircle;
use crate::error::MeasureError;
use crate::geometry::{angle_between_deg, display_angle_deg, norm, sub, wrapped_diff_deg};
use crate::track::{ReferenceLine, TrackPoint};

/// Line through a point on the circle with a unit direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangentLine {
    /// Touching point on the circumference (pixels).
    pub point: [f64; 2],
    /// Unit direction vector.
    pub direction: [f64; 2],
}

impl TangentLine {
    /// Direction in degrees, screen counter-clockwise from +x.
    pub fn angle_deg(&self) -> f64 {
        display_angle_deg(self.direction)
    }

    /// Same line traversed the other way.
    pub fn reversed(&self) -> Self {
        Self {
            point: self.point,
            direction: [-self.direction[0], -self.direction[1]],
        }
    }

    /// Segment of length `2·half_length` centered on the touching point, for drawing.
    pub fn segment(&self, half_length: f64) -> [[f64; 2]; 2] {
        let [dx, dy] = self.direction;
        let [px, py] = self.point;
        [
            [px - dx * half_length, py - dy * half_length],
            [px + dx * half_length, py + dy * half_length],
        ]
    }
}

/// Nominal tangent with the two boundary tangents of its uncertainty cone.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangentEnvelope {
    pub tangent: TangentLine,
    pub err_a: TangentLine,
    pub err_b: TangentLine,
}

impl TangentEnvelope {
    /// Flip all three lines when `direction` is negative (clockwise travel).
    pub fn oriented(self, direction: f64) -> Self {
        if direction < 0.0 {
            Self {
                tangent: self.tangent.reversed(),
                err_a: self.err_a.reversed(),
                err_b: self.err_b.reversed(),
            }
        } else {
            self
        }
    }

    /// Half-width of the cone in degrees.
    pub fn half_width_deg(&self) -> f64 {
        let a = self.tangent.angle_deg();
        wrapped_diff_deg(a, self.err_a.angle_deg()).max(wrapped_diff_deg(a, self.err_b.angle_deg()))
    }

    /// Opening angle of the nominal tangent against `reference`.
    pub fn opening_angle(&self, reference: &ReferenceLine) -> Result<AngleResult, MeasureError> {
        opening_angle(&self.tangent, &self.err_a, &self.err_b, reference)
    }
}

/// Opening angle in degrees with its uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleResult {
    /// Counter-clockwise angle from the reference to the tangent, `[0, 360)`.
    pub angle: f64,
    /// Largest deviation produced by the boundary tangents, never negative.
    pub error: f64,
}

/// Tangent to `circle` at the marker `point`.
///
/// The marker is first projected onto the circumference. The nominal
/// direction is counter-clockwise travel around the center. The boundary
/// tangents come from shifting the center by its uncertainty along the
/// tangent direction, both ways, which tilts the radius vector the most.
pub fn tangent_at(circle: &FittedCircle, point: &TrackPoint) -> Result<TangentEnvelope, MeasureError> {
    let touch = circle
        .project(point.xy())
        .ok_or_else(|| MeasureError::invalid("tangent point coincides with the circle center"))?;
    let center = circle.center();
    let tangent = tangent_through(touch, center)?;

    let [tx, ty] = tangent.direction;
    let sigma_t = ((circle.center_x_err * tx).powi(2) + (circle.center_y_err * ty).powi(2)).sqrt();
    let shifted_a = [center[0] + sigma_t * tx, center[1] + sigma_t * ty];
    let shifted_b = [center[0] - sigma_t * tx, center[1] - sigma_t * ty];

    Ok(TangentEnvelope {
        tangent,
        err_a: tangent_through(touch, shifted_a)?,
        err_b: tangent_through(touch, shifted_b)?,
    })
}

/// Counter-clockwise tangent at `touch` for a circle centered at `center`.
fn tangent_through(touch: [f64; 2], center: [f64; 2]) -> Result<TangentLine, MeasureError> {
    let radial = sub(touch, center);
    let n = norm(radial);
    if !(n > 0.0) || !n.is_finite() {
        return Err(MeasureError::DegenerateGeometry);
    }
    let [rx, ry] = [radial[0] / n, radial[1] / n];
    // Quarter turn counter-clockwise on screen (y axis down).
    Ok(TangentLine {
        point: touch,
        direction: [ry, -rx],
    })
}

/// Opening angle between `reference` and `tangent`.
///
/// `angle` is swept counter-clockwise from the reference direction to the
/// tangent direction; `error` is the larger wrapped deviation of the angles
/// taken against `err_a` and `err_b`.
pub fn opening_angle(
    tangent: &TangentLine,
    err_a: &TangentLine,
    err_b: &TangentLine,
    reference: &ReferenceLine,
) -> Result<AngleResult, MeasureError> {
    let axis = reference.direction()?;
    let measure = |line: &TangentLine| {
        angle_between_deg(axis, line.direction)
            .ok_or_else(|| MeasureError::invalid("tangent direction has zero length"))
    };
    let angle = measure(tangent)?;
    let a = measure(err_a)?;
    let b = measure(err_b)?;
    Ok(AngleResult {
        angle,
        error: wrapped_diff_deg(angle, a).max(wrapped_diff_deg(angle, b)),
    })
}
