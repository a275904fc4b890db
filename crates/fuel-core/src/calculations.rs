use crate::error::{InsightsError, Result};
use crate::models::RegressionResult;

// ── Mean ──────────────────────────────────────────────────────────────────────

/// Arithmetic mean of the defined values in `values`.
///
/// Returns `None` when no value is defined.
pub fn mean_defined<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

// ── Moving average ────────────────────────────────────────────────────────────

/// Trailing rolling mean over `window` consecutive slots.
///
/// Slot `i` is defined only when every value in `values[i + 1 - window ..= i]`
/// is defined, so the first `window - 1` slots are always `None`.
pub fn moving_average(values: &[Option<f64>], window: usize) -> Result<Vec<Option<f64>>> {
    if window == 0 {
        return Err(InsightsError::DegenerateInput(
            "moving average window must be at least 1".to_string(),
        ));
    }

    let averages = (0..values.len())
        .map(|i| {
            if i + 1 < window {
                return None;
            }
            let slice = &values[i + 1 - window..=i];
            let sum = slice.iter().copied().sum::<Option<f64>>()?;
            Some(sum / window as f64)
        })
        .collect();

    Ok(averages)
}

// ── Linear regression ─────────────────────────────────────────────────────────

/// Fit `y = slope * x + intercept` by ordinary least squares.
///
/// Fails with [`InsightsError::DegenerateInput`] when the series differ in
/// length, hold fewer than two points, contain non-finite values, or when `x`
/// has zero variance (the slope would be undefined).
///
/// When `y` itself has zero variance the fit is exact and `r_squared` is 1.
pub fn fit_linear_regression(x: &[f64], y: &[f64]) -> Result<RegressionResult> {
    if x.len() != y.len() {
        return Err(InsightsError::DegenerateInput(format!(
            "series lengths differ: x has {}, y has {}",
            x.len(),
            y.len()
        )));
    }
    let n = x.len();
    if n < 2 {
        return Err(InsightsError::DegenerateInput(format!(
            "need at least 2 points, got {n}"
        )));
    }
    if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
        return Err(InsightsError::DegenerateInput(
            "series contain non-finite values".to_string(),
        ));
    }

    let n_f = n as f64;
    let mean_x = x.iter().sum::<f64>() / n_f;
    let mean_y = y.iter().sum::<f64>() / n_f;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        sxx += dx * dx;
        sxy += dx * (yi - mean_y);
    }

    if sxx == 0.0 {
        return Err(InsightsError::DegenerateInput(
            "x has zero variance; slope is undefined".to_string(),
        ));
    }

    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let predicted_values: Vec<f64> = x.iter().map(|xi| slope * xi + intercept).collect();

    let ss_res: f64 = y
        .iter()
        .zip(&predicted_values)
        .map(|(yi, pi)| (yi - pi).powi(2))
        .sum();
    let ss_tot: f64 = y.iter().map(|yi| (yi - mean_y).powi(2)).sum();

    let root_mean_squared_error = (ss_res / n_f).sqrt();
    let r_squared = if ss_tot == 0.0 {
        1.0
    } else {
        1.0 - ss_res / ss_tot
    };

    Ok(RegressionResult {
        slope,
        intercept,
        predicted_values,
        root_mean_squared_error,
        r_squared,
    })
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── mean_defined ─────────────────────────────────────────────────────────

    #[test]
    fn test_mean_skips_undefined() {
        let m = mean_defined(vec![Some(1.0), None, Some(3.0)]).unwrap();
        assert!((m - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_mean_all_undefined() {
        assert_eq!(mean_defined(vec![None, None]), None);
        assert_eq!(mean_defined(Vec::<Option<f64>>::new()), None);
    }

    // ── moving_average ───────────────────────────────────────────────────────

    #[test]
    fn test_moving_average_leading_slots_undefined() {
        let values: Vec<Option<f64>> = (1..=6).map(|v| Some(v as f64)).collect();
        let avg = moving_average(&values, 3).unwrap();

        assert_eq!(avg.len(), 6);
        assert_eq!(avg[0], None);
        assert_eq!(avg[1], None);
        assert!((avg[2].unwrap() - 2.0).abs() < 1e-12);
        assert!((avg[5].unwrap() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_window_touching_gap_is_undefined() {
        // MPG series: first fill-up has no baseline.
        let values = vec![None, Some(30.0), Some(32.0), Some(34.0)];
        let avg = moving_average(&values, 2).unwrap();
        assert_eq!(avg[1], None);
        assert!((avg[2].unwrap() - 31.0).abs() < 1e-12);
        assert!((avg[3].unwrap() - 33.0).abs() < 1e-12);
    }

    #[test]
    fn test_moving_average_window_one_is_identity() {
        let values = vec![Some(1.5), None, Some(2.5)];
        assert_eq!(moving_average(&values, 1).unwrap(), values);
    }

    #[test]
    fn test_moving_average_window_longer_than_series() {
        let values = vec![Some(1.0), Some(2.0)];
        assert_eq!(moving_average(&values, 5).unwrap(), vec![None, None]);
    }

    #[test]
    fn test_moving_average_zero_window_rejected() {
        let err = moving_average(&[Some(1.0)], 0).unwrap_err();
        assert!(matches!(err, InsightsError::DegenerateInput(_)));
    }

    // ── fit_linear_regression ────────────────────────────────────────────────

    #[test]
    fn test_regression_perfect_line() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v + 2.0).collect();
        let fit = fit_linear_regression(&x, &y).unwrap();

        assert!((fit.slope - 3.0).abs() < 1e-9);
        assert!((fit.intercept - 2.0).abs() < 1e-9);
        assert!(fit.root_mean_squared_error.abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-9);
        assert_eq!(fit.predicted_values.len(), 5);
        assert!((fit.predicted_values[4] - 17.0).abs() < 1e-9);
    }

    #[test]
    fn test_regression_noisy_statistics() {
        // y = [2, 4, 5, 4, 5] against x = 1..=5:
        // slope 0.6, intercept 2.2, SS_res 2.4, SS_tot 6.0.
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [2.0, 4.0, 5.0, 4.0, 5.0];
        let fit = fit_linear_regression(&x, &y).unwrap();

        assert!((fit.slope - 0.6).abs() < 1e-9);
        assert!((fit.intercept - 2.2).abs() < 1e-9);
        assert!((fit.r_squared - 0.6).abs() < 1e-9);
        assert!((fit.root_mean_squared_error - (2.4_f64 / 5.0).sqrt()).abs() < 1e-9);
        assert!((fit.predicted_values[4] - 5.2).abs() < 1e-9);
    }

    #[test]
    fn test_regression_is_deterministic() {
        let x = [10_000.0, 10_300.0, 10_610.0, 10_870.0];
        let y = [30.1, 29.4, 31.7, 28.9];
        let a = fit_linear_regression(&x, &y).unwrap();
        let b = fit_linear_regression(&x, &y).unwrap();
        assert_eq!(a.slope.to_bits(), b.slope.to_bits());
        assert_eq!(a.intercept.to_bits(), b.intercept.to_bits());
        assert_eq!(a.predicted_values, b.predicted_values);
    }

    #[test]
    fn test_regression_zero_variance_x() {
        let err = fit_linear_regression(&[5.0, 5.0, 5.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, InsightsError::DegenerateInput(_)));
    }

    #[test]
    fn test_regression_too_few_points() {
        let err = fit_linear_regression(&[1.0], &[1.0]).unwrap_err();
        assert!(matches!(err, InsightsError::DegenerateInput(_)));
    }

    #[test]
    fn test_regression_length_mismatch() {
        let err = fit_linear_regression(&[1.0, 2.0, 3.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, InsightsError::DegenerateInput(_)));
    }

    #[test]
    fn test_regression_non_finite() {
        let err = fit_linear_regression(&[1.0, f64::NAN], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, InsightsError::DegenerateInput(_)));
    }

    #[test]
    fn test_regression_constant_y_is_exact_fit() {
        let fit = fit_linear_regression(&[1.0, 2.0, 3.0], &[4.0, 4.0, 4.0]).unwrap();
        assert!(fit.slope.abs() < 1e-12);
        assert!((fit.intercept - 4.0).abs() < 1e-12);
        assert_eq!(fit.r_squared, 1.0);
    }
}
