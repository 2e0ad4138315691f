//! Degree-based angle helpers.

/// Fold an angle difference into `(-180, 180]` degrees.
///
/// Values `>= 180` lose 360, then values `<= -180` gain 360, so exactly 180
/// maps back onto itself. Differences of two angles already in `[-180, 180]`
/// always land in range. NaN passes through.
#[inline]
#[must_use]
pub fn wrap_degrees(diff: f64) -> f64 {
    let mut wrapped = diff;
    if wrapped >= 180.0 {
        wrapped -= 360.0;
    }
    if wrapped <= -180.0 {
        wrapped += 360.0;
    }
    wrapped
}

/// `atan2(dy, dx)` in degrees.
#[inline]
#[must_use]
pub fn atan2_degrees(dy: f64, dx: f64) -> f64 {
    dy.atan2(dx).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wrap_degrees() {
        assert_relative_eq!(wrap_degrees(190.0), -170.0);
        assert_relative_eq!(wrap_degrees(-190.0), 170.0);
        assert_relative_eq!(wrap_degrees(180.0), 180.0);
        assert_relative_eq!(wrap_degrees(-180.0), 180.0);
        assert_relative_eq!(wrap_degrees(45.0), 45.0);
        assert!(wrap_degrees(f64::NAN).is_nan());
    }

    #[test]
    fn test_atan2_degrees() {
        assert_relative_eq!(atan2_degrees(1.0, 0.0), 90.0);
        assert_relative_eq!(atan2_degrees(0.0, -1.0), 180.0);
        assert_relative_eq!(atan2_degrees(-1.0, 1.0), -45.0);
    }
}
