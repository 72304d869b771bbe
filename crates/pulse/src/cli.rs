//! Command-line interface definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_ENV;
use crate::domain::SimulationConfig;

/// Issue analytics and backlog forecasting
///
/// Reads a JSON export of issues, aggregates monthly creation/resolution
/// counts and label statistics, and projects the open backlog three periods
/// ahead under a what-if scenario.
///
/// Exit Codes:
///   0  - Command succeeded
///   1  - Generic error occurred
///   2  - Invalid arguments, scenario or configuration
///   3  - Items file not found
///   4  - Item records failed validation
///   5  - Permission denied
///  10  - I/O failure reading input
#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(about = "Issue analytics and backlog forecasting", long_about = None)]
pub struct Cli {
    /// Suppress non-essential output (for scripting)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); RUST_LOG wins
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: ./pulse.toml)
    #[arg(long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Export the JSON Schema of every command payload
    #[arg(long)]
    pub schema: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate historical statistics from an items file
    Stats {
        /// JSON file with item records ('-' for stdin)
        items: PathBuf,

        /// Number of labels to list in text mode (overrides [report] top_labels)
        #[arg(long)]
        top: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Project the open backlog under a scenario
    Forecast {
        /// JSON file with item records ('-' for stdin)
        items: PathBuf,

        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the capacity multiplier a scenario produces
    Efficiency {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Scenario overrides; unset flags fall back to the config file, then the baseline.
#[derive(Args, Debug, Clone, Default)]
pub struct ScenarioArgs {
    /// Headcount change (e.g. 2 or -1)
    #[arg(long, allow_hyphen_values = true)]
    pub developer_change: Option<i32>,

    /// Multiplier on incoming issues (1.0 = unchanged)
    #[arg(long)]
    pub incoming_rate: Option<f64>,

    /// Meeting hours per developer per week (baseline 6)
    #[arg(long)]
    pub meeting_hours: Option<f64>,

    /// Mean hours to merge a reviewed change (baseline 24)
    #[arg(long)]
    pub review_hours: Option<f64>,
}

impl ScenarioArgs {
    /// Apply the set flags on top of `base`.
    pub fn apply(&self, base: SimulationConfig) -> SimulationConfig {
        SimulationConfig {
            developer_count_change: self
                .developer_change
                .unwrap_or(base.developer_count_change),
            incoming_issue_rate: self.incoming_rate.unwrap_or(base.incoming_issue_rate),
            weekly_meeting_hours: self.meeting_hours.unwrap_or(base.weekly_meeting_hours),
            code_review_avg_hours: self.review_hours.unwrap_or(base.code_review_avg_hours),
        }
    }
}
