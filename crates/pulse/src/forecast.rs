//! Backlog projection under a what-if scenario.
//!
//! The forecaster rebuilds the historical backlog from twelve monthly
//! buckets, fits independent trend lines to the creation and resolution
//! series, scales them by the scenario (incoming rate for creation, the
//! capacity multiplier for resolution) and rolls the backlog forward
//! [`FORECAST_HORIZON`] periods. Everything is a pure function of its inputs.

use crate::capacity::EfficiencyBreakdown;
use crate::domain::{ForecastPoint, MonthlyStat, ScenarioError, SimulationConfig};
use crate::trend::TrendLine;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of monthly buckets the forecaster expects
pub const HISTORY_LEN: usize = 12;
/// Number of projected periods
pub const FORECAST_HORIZON: usize = 3;

/// Errors that can occur when projecting the backlog
#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    /// History does not have exactly one bucket per calendar month
    #[error("expected {expected} monthly buckets, got {actual}")]
    HistoryLength { expected: usize, actual: usize },
    #[error("invalid scenario: {0}")]
    InvalidScenario(#[from] ScenarioError),
}

/// A projection together with the numbers it was derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioOutcome {
    /// Twelve historical points followed by the projected ones
    pub points: Vec<ForecastPoint>,
    pub created_trend: TrendLine,
    pub resolved_trend: TrendLine,
    pub efficiency: EfficiencyBreakdown,
    pub scenario: SimulationConfig,
}

impl ScenarioOutcome {
    /// Backlog level at the last historical point
    pub fn current_backlog(&self) -> u64 {
        self.points
            .iter()
            .filter_map(ForecastPoint::historical_open)
            .last()
            .unwrap_or(0)
    }

    /// Backlog level at the end of the horizon
    pub fn final_backlog(&self) -> u64 {
        self.points
            .iter()
            .filter_map(ForecastPoint::projected_open)
            .last()
            .unwrap_or_else(|| self.current_backlog())
    }
}

fn check_history(history: &[MonthlyStat]) -> Result<(), ForecastError> {
    if history.len() != HISTORY_LEN {
        return Err(ForecastError::HistoryLength {
            expected: HISTORY_LEN,
            actual: history.len(),
        });
    }
    Ok(())
}

/// Cumulative `created - resolved`, floored at zero after every step.
pub fn historical_backlog(history: &[MonthlyStat]) -> Vec<u64> {
    history
        .iter()
        .scan(0u64, |backlog, month| {
            *backlog = backlog.saturating_add(month.created).saturating_sub(month.resolved);
            Some(*backlog)
        })
        .collect()
}

/// Project the backlog and keep the fitted trends and capacity factors.
pub fn simulate(
    history: &[MonthlyStat],
    config: &SimulationConfig,
) -> Result<ScenarioOutcome, ForecastError> {
    check_history(history)?;
    config.validate()?;

    let backlog = historical_backlog(history);
    let mut points: Vec<ForecastPoint> = history
        .iter()
        .zip(&backlog)
        .map(|(month, &open)| ForecastPoint::Historical {
            name: month.name.clone(),
            historical_open: open,
        })
        .collect();

    let created: Vec<f64> = history.iter().map(|m| m.created as f64).collect();
    let resolved: Vec<f64> = history.iter().map(|m| m.resolved as f64).collect();
    let created_trend = TrendLine::fit(&created);
    let resolved_trend = TrendLine::fit(&resolved);
    let efficiency = EfficiencyBreakdown::from_config(config);

    let mut running = backlog.last().copied().unwrap_or(0) as f64;
    for step in 0..FORECAST_HORIZON {
        let x = (HISTORY_LEN + step) as f64;
        let incoming = (created_trend.evaluate(x) * config.incoming_issue_rate).max(0.0);
        let outgoing = (resolved_trend.evaluate(x) * efficiency.combined).max(0.0);
        running = (running + incoming - outgoing).max(0.0);

        points.push(ForecastPoint::Projected {
            name: format!("Next {}", step + 1),
            projected_open: running.round() as u64,
        });
    }

    tracing::debug!(
        created_slope = created_trend.slope,
        resolved_slope = resolved_trend.slope,
        efficiency = efficiency.combined,
        projected = running,
        "projected backlog"
    );

    Ok(ScenarioOutcome {
        points,
        created_trend,
        resolved_trend,
        efficiency,
        scenario: *config,
    })
}

/// Project the backlog: twelve historical points then [`FORECAST_HORIZON`]
/// projected ones.
///
/// Fails fast when `history` does not hold exactly twelve buckets or the
/// scenario is invalid.
///
/// # Examples
///
/// ```
/// use pulse::domain::{MonthlyStat, SimulationConfig, MONTH_NAMES};
/// use pulse::forecast::forecast;
///
/// let history: Vec<MonthlyStat> = MONTH_NAMES
///     .iter()
///     .map(|m| MonthlyStat::new(*m, 10, 8))
///     .collect();
///
/// let points = forecast(&history, &SimulationConfig::default()).unwrap();
/// assert_eq!(points.len(), 15);
/// assert_eq!(points[11].historical_open(), Some(24));
/// assert!(points[14].projected_open().unwrap() > 24);
/// ```
pub fn forecast(
    history: &[MonthlyStat],
    config: &SimulationConfig,
) -> Result<Vec<ForecastPoint>, ForecastError> {
    simulate(history, config).map(|outcome| outcome.points)
}
