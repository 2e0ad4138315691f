//! NaN-aware reductions over sample slices.
//!
//! Missing samples are stored as NaN. The `nan_*` reductions skip them and
//! return NaN only when nothing is left; [`mean`] propagates them.

/// Mean that propagates NaN (any missing sample makes the result NaN).
///
/// Returns NaN for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean over the non-NaN samples, NaN if there are none.
#[must_use]
pub fn nan_mean<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    let (sum, count) = values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, count), &v| (sum + v, count + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

/// Minimum over the non-NaN samples, NaN if there are none.
#[must_use]
pub fn nan_min<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(f64::NAN, |acc, &v| if acc.is_nan() || v < acc { v } else { acc })
}

/// Maximum over the non-NaN samples, NaN if there are none.
#[must_use]
pub fn nan_max<'a, I>(values: I) -> f64
where
    I: IntoIterator<Item = &'a f64>,
{
    values
        .into_iter()
        .filter(|v| !v.is_nan())
        .fold(f64::NAN, |acc, &v| if acc.is_nan() || v > acc { v } else { acc })
}

/// Pearson correlation over the pairs where neither sample is NaN.
///
/// Returns NaN when fewer than two pairs remain or either side is constant.
#[must_use]
pub fn nan_pearson(a: &[f64], b: &[f64]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b.iter())
        .filter(|(x, y)| !x.is_nan() && !y.is_nan())
        .map(|(&x, &y)| (x, y))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for &(x, y) in &pairs {
        let dx = x - mean_a;
        let dy = y - mean_b;
        cov += dx * dy;
        var_a += dx * dx;
        var_b += dy * dy;
    }

    if var_a == 0.0 || var_b == 0.0 {
        return f64::NAN;
    }
    cov / (var_a * var_b).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_propagates_nan() {
        assert_relative_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert!(mean(&[1.0, f64::NAN]).is_nan());
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_nan_mean_skips_nan() {
        assert_relative_eq!(nan_mean(&[1.0, f64::NAN, 3.0]), 2.0);
        assert!(nan_mean(&[f64::NAN, f64::NAN]).is_nan());
    }

    #[test]
    fn test_nan_min_max() {
        let values = [f64::NAN, 4.0, -2.0, f64::NAN, 7.5];
        assert_eq!(nan_min(&values), -2.0);
        assert_eq!(nan_max(&values), 7.5);
        assert!(nan_min(&[f64::NAN]).is_nan());
        assert!(nan_max(&[] as &[f64]).is_nan());
    }

    #[test]
    fn test_pearson() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        assert_relative_eq!(nan_pearson(&a, &b), 1.0, epsilon = 1e-12);

        let c = [4.0, 3.0, 2.0, 1.0];
        assert_relative_eq!(nan_pearson(&a, &c), -1.0, epsilon = 1e-12);

        // NaN pairs are dropped, leaving a perfect fit
        let d = [2.0, f64::NAN, 6.0, 8.0];
        assert_relative_eq!(nan_pearson(&a, &d), 1.0, epsilon = 1e-12);

        assert!(nan_pearson(&[1.0, 1.0], &[2.0, 3.0]).is_nan());
    }
}
