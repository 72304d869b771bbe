//! Issue analytics aggregation and backlog forecasting.
//!
//! The engine is a set of pure, synchronous functions:
//!
//! - [`normalize`](mod@normalize) maps raw issue records onto the canonical [`Item`]
//! - [`aggregate`](mod@aggregate) produces counts, monthly trends and label statistics
//! - [`trend`](mod@trend) fits least-squares lines to numeric series
//! - [`capacity`](mod@capacity) turns a scenario into a throughput multiplier
//! - [`forecast`](mod@forecast) projects the open backlog three periods ahead
//!
//! The remaining modules support the `pulse` binary.

pub mod aggregate;
pub mod capacity;
pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod forecast;
pub mod normalize;
pub mod output;
pub mod schema;
pub mod source;
pub mod telemetry;
pub mod trend;

#[cfg(test)]
mod engine_proptests;

// Re-export commonly used types
pub use aggregate::aggregate;
pub use domain::{
    AnalyticsSummary, ForecastPoint, Item, ItemId, MonthlyStat, Priority, SimulationConfig, Status,
};
pub use forecast::{forecast, simulate, ScenarioOutcome};
pub use output::{ExitCode, JsonError, JsonOutput};
pub use schema::CommandSchema;
