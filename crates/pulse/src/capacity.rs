//! Team capacity model.
//!
//! Converts a [`SimulationConfig`] into a single throughput multiplier applied
//! to the fitted resolution trend. Three independent factors are multiplied:
//! meeting load, code review latency and headcount change. The baseline
//! scenario (6 meeting hours, 24 hour reviews, no headcount change) yields
//! exactly 1.0.

use crate::domain::SimulationConfig;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Hours in a standard working week
pub const WORK_WEEK_HOURS: f64 = 40.0;
/// Weekly meeting hours in the historical baseline
pub const BASELINE_MEETING_HOURS: f64 = 6.0;
/// Productive hours never drop below this, however many meetings
pub const MIN_PRODUCTIVE_HOURS: f64 = 10.0;
/// Review latency in the historical baseline
pub const BASELINE_REVIEW_HOURS: f64 = 24.0;
/// Velocity change per hour of review latency versus baseline
pub const REVIEW_SENSITIVITY: f64 = 0.005;
/// Output gained per added developer
pub const HIRE_GAIN: f64 = 0.15;
/// Output lost per removed developer
pub const DEPARTURE_COST: f64 = 0.18;
/// Lowest headcount factor, however many developers leave
pub const MIN_HEADCOUNT_FACTOR: f64 = 0.1;

/// Remaining productive hours relative to the baseline week.
pub fn meeting_factor(weekly_meeting_hours: f64) -> f64 {
    let productive = (WORK_WEEK_HOURS - weekly_meeting_hours).max(MIN_PRODUCTIVE_HOURS);
    productive / (WORK_WEEK_HOURS - BASELINE_MEETING_HOURS)
}

/// Each hour faster than baseline adds 0.5%, each hour slower removes 0.5%.
/// Uncapped in both directions.
pub fn review_factor(code_review_avg_hours: f64) -> f64 {
    1.0 + (BASELINE_REVIEW_HOURS - code_review_avg_hours) * REVIEW_SENSITIVITY
}

/// Linear gain per hire, linear loss per departure floored at
/// [`MIN_HEADCOUNT_FACTOR`].
pub fn headcount_factor(developer_count_change: i32) -> f64 {
    let change = f64::from(developer_count_change);
    if developer_count_change >= 0 {
        1.0 + change * HIRE_GAIN
    } else {
        (1.0 + change * DEPARTURE_COST).max(MIN_HEADCOUNT_FACTOR)
    }
}

/// Combined throughput multiplier for a scenario.
///
/// ```
/// use pulse::capacity::efficiency_multiplier;
/// use pulse::domain::SimulationConfig;
///
/// assert_eq!(efficiency_multiplier(&SimulationConfig::default()), 1.0);
/// ```
pub fn efficiency_multiplier(config: &SimulationConfig) -> f64 {
    EfficiencyBreakdown::from_config(config).combined
}

/// The individual capacity factors of a scenario and their product.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EfficiencyBreakdown {
    pub meeting: f64,
    pub review: f64,
    pub headcount: f64,
    pub combined: f64,
}

impl EfficiencyBreakdown {
    pub fn from_config(config: &SimulationConfig) -> Self {
        let meeting = meeting_factor(config.weekly_meeting_hours);
        let review = review_factor(config.code_review_avg_hours);
        let headcount = headcount_factor(config.developer_count_change);
        Self {
            meeting,
            review,
            headcount,
            combined: meeting * review * headcount,
        }
    }
}
