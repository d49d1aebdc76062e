//! Angle helpers shared by the geometry and warp code.

/// Wraps an angle in degrees to the range [-180, 180).
pub(crate) fn wrap_deg(angle_deg: f64) -> f64 {
    let mut wrapped = angle_deg % 360.0;
    if wrapped < -180.0 {
        wrapped += 360.0;
    }
    if wrapped >= 180.0 {
        wrapped -= 360.0;
    }
    wrapped
}

/// Computes sine and cosine for an angle in degrees.
pub(crate) fn sin_cos_deg(angle_deg: f64) -> (f64, f64) {
    angle_deg.to_radians().sin_cos()
}

/// Halves a dimension with integer division, as an offset in pixels.
#[inline]
pub(crate) fn half(len: usize) -> f64 {
    (len / 2) as f64
}

#[cfg(test)]
mod tests {
    use super::{half, sin_cos_deg, wrap_deg};

    #[test]
    fn wrap_deg_maps_to_expected_range() {
        assert!((wrap_deg(181.0) + 179.0).abs() < 1e-9);
        assert!((wrap_deg(-181.0) - 179.0).abs() < 1e-9);
        assert!((wrap_deg(540.0) + 180.0).abs() < 1e-9);
        assert!((wrap_deg(180.5) + 179.5).abs() < 1e-9);
    }

    #[test]
    fn sin_cos_deg_matches_quadrants() {
        let (sin, cos) = sin_cos_deg(90.0);
        assert!(sin > 0.999_999);
        assert!(cos.abs() < 1e-12);
    }

    #[test]
    fn half_truncates_odd_sizes() {
        assert_eq!(half(25), 12.0);
        assert_eq!(half(400), 200.0);
    }
}
