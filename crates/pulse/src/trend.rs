//! Least-squares trend lines over evenly spaced series.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A fitted line `y = slope * x + intercept` where `x` is the series index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    /// A horizontal line at `value`
    pub fn flat(value: f64) -> Self {
        Self {
            slope: 0.0,
            intercept: value,
        }
    }

    /// Fit an ordinary least-squares line to `values` at indices `0..n`.
    ///
    /// Uses the closed-form normal equations. An empty series yields the flat
    /// line at zero; a single point (the only case where the denominator
    /// vanishes for integer indices) yields the flat line at the mean, so the
    /// result is always finite for finite input.
    ///
    /// ```
    /// use pulse::trend::TrendLine;
    ///
    /// let line = TrendLine::fit(&[1.0, 3.0, 5.0, 7.0]);
    /// assert!((line.slope - 2.0).abs() < 1e-9);
    /// assert!((line.evaluate(4.0) - 9.0).abs() < 1e-9);
    /// ```
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::flat(0.0);
        }

        let n = values.len() as f64;
        let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
        for (i, &y) in values.iter().enumerate() {
            let x = i as f64;
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_xx += x * x;
        }

        let denominator = n * sum_xx - sum_x * sum_x;
        if denominator == 0.0 {
            return Self::flat(sum_y / n);
        }

        let slope = (n * sum_xy - sum_x * sum_y) / denominator;
        let intercept = (sum_y - slope * sum_x) / n;
        Self { slope, intercept }
    }

    /// Predicted value at index `x`. No sign guarantee; callers clamp.
    pub fn evaluate(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recovers_exact_linear_series() {
        let values: Vec<f64> = (0..12).map(|i| 3.0 * i as f64 + 7.0).collect();
        let line = TrendLine::fit(&values);

        assert!((line.slope - 3.0).abs() < 1e-9);
        assert!((line.intercept - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_series_is_flat_zero() {
        assert_eq!(TrendLine::fit(&[]), TrendLine::flat(0.0));
    }

    #[test]
    fn test_single_point_is_flat_at_value() {
        let line = TrendLine::fit(&[42.0]);
        assert_eq!(line, TrendLine::flat(42.0));
        assert!(line.slope.is_finite());
        assert_eq!(line.evaluate(12.0), 42.0);
    }

    #[test]
    fn test_constant_series_has_zero_slope() {
        let line = TrendLine::fit(&[10.0; 12]);
        assert_eq!(line.slope, 0.0);
        assert_eq!(line.intercept, 10.0);
    }

    #[test]
    fn test_declining_series_extrapolates_negative() {
        let line = TrendLine::fit(&[5.0, 4.0, 3.0, 2.0, 1.0]);
        assert!((line.slope + 1.0).abs() < 1e-9);
        // Fitter itself does not clamp
        assert!(line.evaluate(10.0) < 0.0);
    }

    #[test]
    fn test_noisy_series_least_squares() {
        let line = TrendLine::fit(&[0.0, 2.0, 2.0, 4.0]);
        assert!((line.slope - 1.2).abs() < 1e-9);
        assert!((line.intercept - 0.2).abs() < 1e-9);
    }
}
