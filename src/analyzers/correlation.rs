use crate::utils::constants::MIN_CORRELATION_PAIRS;

/// Pearson correlation coefficient of paired observations.
///
/// Returns `None` when there are fewer than two pairs or either side has
/// zero variance. A series paired with itself yields exactly 1.0.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < MIN_CORRELATION_PAIRS {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut syy = 0.0;
    let mut sxy = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxx += dx * dx;
        syy += dy * dy;
        sxy += dx * dy;
    }

    if sxx <= 0.0 || syy <= 0.0 {
        return None;
    }
    if sxx == syy && sxy == sxx {
        return Some(1.0);
    }

    let r = sxy / (sxx.sqrt() * syy.sqrt());
    if r.is_finite() {
        Some(r.clamp(-1.0, 1.0))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_positive_and_negative() {
        let up: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
        let down: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, -3.0 * i as f64)).collect();

        assert!((pearson(&up).unwrap() - 1.0).abs() < 1e-12);
        assert!((pearson(&down).unwrap() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_self_correlation_is_exactly_one() {
        let values = [3.7, -1.2, 8.9, 0.1, 4.4, 12.25];
        let pairs: Vec<(f64, f64)> = values.iter().map(|v| (*v, *v)).collect();

        assert_eq!(pearson(&pairs), Some(1.0));
    }

    #[test]
    fn test_known_coefficient() {
        let pairs = [(1.0, 2.0), (2.0, 4.0), (3.0, 5.0), (4.0, 4.0), (5.0, 5.0)];
        let r = pearson(&pairs).unwrap();
        assert!((r - 0.7745966692414834).abs() < 1e-12);
    }

    #[test]
    fn test_undefined_cases() {
        // Fewer than two joint observations
        assert_eq!(pearson(&[]), None);
        assert_eq!(pearson(&[(1.0, 2.0)]), None);

        // Constant series
        assert_eq!(pearson(&[(1.0, 2.0), (1.0, 3.0), (1.0, 4.0)]), None);
    }
}
