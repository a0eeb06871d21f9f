//! Planar angle helpers in the image display convention.
//!
//! Image coordinates grow right (+x) and down (+y). Angles are reported the
//! way an operator reads them off the screen: counter-clockwise positive,
//! zero along +x, normalized into `[0°, 360°)`.

/// Relative tolerance under which two directions count as exactly collinear.
const COLLINEAR_EPS: f64 = 1e-12;

#[inline]
pub(crate) fn sub(a: [f64; 2], b: [f64; 2]) -> [f64; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

#[inline]
pub(crate) fn norm(v: [f64; 2]) -> f64 {
    v[0].hypot(v[1])
}

/// Fold any angle in degrees into `[0, 360)`.
pub fn normalize_deg(angle: f64) -> f64 {
    let a = angle.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if a >= 360.0 {
        0.0
    } else {
        a + 0.0
    }
}

/// Direction of `v` in degrees, counter-clockwise on screen from +x.
pub fn display_angle_deg(v: [f64; 2]) -> f64 {
    normalize_deg((-v[1]).atan2(v[0]).to_degrees())
}

/// Angle swept counter-clockwise (on screen) from `from` to `to`, in `[0, 360)`.
///
/// Exactly parallel directions give `0`, exactly antiparallel ones `180`.
/// Returns `None` if either vector has zero length.
pub fn angle_between_deg(from: [f64; 2], to: [f64; 2]) -> Option<f64> {
    let scale = norm(from) * norm(to);
    if !(scale > 0.0) || !scale.is_finite() {
        return None;
    }
    // Flip y so that the usual right-handed cross product is screen-ccw.
    let cross = from[1] * to[0] - from[0] * to[1];
    let dot = from[0] * to[0] + from[1] * to[1];
    if cross.abs() <= COLLINEAR_EPS * scale {
        return Some(if dot > 0.0 { 0.0 } else { 180.0 });
    }
    Some(normalize_deg(cross.atan2(dot).to_degrees()))
}

/// Smallest absolute difference between two angles in degrees, in `[0, 180]`.
pub fn wrapped_diff_deg(a: f64, b: f64) -> f64 {
    let d = normalize_deg(a - b);
    d.min(360.0 - d)
}

/// Unit vector pointing at `angle_deg` (screen counter-clockwise from +x).
#[inline]
pub(crate) fn unit_from_display_deg(angle_deg: f64) -> [f64; 2] {
    let t = angle_deg.to_radians();
    [t.cos(), -t.sin()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn screen_up_is_ninety_degrees() {
        assert_abs_diff_eq!(display_angle_deg([1.0, 0.0]), 0.0);
        assert_abs_diff_eq!(display_angle_deg([0.0, -1.0]), 90.0, epsilon = 1e-12);
        assert_abs_diff_eq!(display_angle_deg([-1.0, 0.0]), 180.0, epsilon = 1e-12);
        assert_abs_diff_eq!(display_angle_deg([0.0, 1.0]), 270.0, epsilon = 1e-12);
    }

    #[test]
    fn angle_between_tie_breaks() {
        assert_eq!(angle_between_deg([3.0, 0.0], [1.0, 0.0]), Some(0.0));
        assert_eq!(angle_between_deg([3.0, 0.0], [-1.0, 0.0]), Some(180.0));
        assert_eq!(angle_between_deg([1.0, 1.0], [-2.0, -2.0]), Some(180.0));
        assert_eq!(angle_between_deg([0.0, 0.0], [1.0, 0.0]), None);
    }

    #[test]
    fn angle_between_is_counter_clockwise_on_screen() {
        let a = angle_between_deg([1.0, 0.0], [0.0, -1.0]).unwrap();
        assert_abs_diff_eq!(a, 90.0, epsilon = 1e-12);
        let b = angle_between_deg([1.0, 0.0], [0.0, 1.0]).unwrap();
        assert_abs_diff_eq!(b, 270.0, epsilon = 1e-12);
        let c = angle_between_deg([0.0, -1.0], [1.0, 0.0]).unwrap();
        assert_abs_diff_eq!(c, 270.0, epsilon = 1e-12);
    }

    #[test]
    fn normalize_never_returns_360() {
        assert_eq!(normalize_deg(-1e-300), 0.0);
        assert_abs_diff_eq!(normalize_deg(-90.0), 270.0);
        assert_abs_diff_eq!(normalize_deg(725.0), 5.0, epsilon = 1e-12);
        assert!(normalize_deg(-0.0).is_sign_positive());
    }

    #[test]
    fn wrapped_diff_crosses_zero() {
        assert_abs_diff_eq!(wrapped_diff_deg(359.0, 1.0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(wrapped_diff_deg(10.0, 190.0), 180.0, epsilon = 1e-12);
    }

    #[test]
    fn unit_vector_roundtrips_through_display_angle() {
        for deg in [0.0, 33.0, 90.0, 181.5, 300.0] {
            let u = unit_from_display_deg(deg);
            assert_abs_diff_eq!(display_angle_deg(u), deg, epsilon = 1e-9);
        }
    }
}
