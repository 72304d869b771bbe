//! Configuration file loading and parsing.
//!
//! Pulse reads an optional `pulse.toml` from the working directory (or the
//! path given by `--config` / `PULSE_CONFIG`). If no config file exists, the
//! baseline scenario and default report settings are used.
//!
//! ```toml
//! [scenario]
//! developer_count_change = 2
//! incoming_issue_rate = 1.2
//! weekly_meeting_hours = 8
//! code_review_avg_hours = 18
//!
//! [report]
//! top_labels = 5
//! ```

use crate::domain::SimulationConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default config file name, looked up in the working directory.
pub const CONFIG_FILE: &str = "pulse.toml";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PULSE_CONFIG";

/// Labels shown in text reports when not configured.
pub const DEFAULT_TOP_LABELS: usize = 10;

/// A config file named explicitly with `--config` or `PULSE_CONFIG` is missing.
#[derive(Debug, Error, PartialEq)]
#[error("config file not found: {}", path.display())]
pub struct MissingConfig {
    pub path: PathBuf,
}

/// Root configuration structure loaded from `pulse.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PulseConfig {
    /// Scenario defaults (optional).
    pub scenario: Option<ScenarioToml>,
    /// Text report settings (optional).
    pub report: Option<ReportConfig>,
}

/// Scenario parameters; any omitted field keeps its baseline value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioToml {
    pub developer_count_change: Option<i32>,
    pub incoming_issue_rate: Option<f64>,
    pub weekly_meeting_hours: Option<f64>,
    pub code_review_avg_hours: Option<f64>,
}

impl ScenarioToml {
    /// Apply the set fields on top of `base`.
    pub fn apply(&self, base: SimulationConfig) -> SimulationConfig {
        SimulationConfig {
            developer_count_change: self
                .developer_count_change
                .unwrap_or(base.developer_count_change),
            incoming_issue_rate: self.incoming_issue_rate.unwrap_or(base.incoming_issue_rate),
            weekly_meeting_hours: self
                .weekly_meeting_hours
                .unwrap_or(base.weekly_meeting_hours),
            code_review_avg_hours: self
                .code_review_avg_hours
                .unwrap_or(base.code_review_avg_hours),
        }
    }
}

/// Text report configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// How many labels to list in text mode (default: 10).
    pub top_labels: Option<usize>,
}

impl PulseConfig {
    /// Load configuration from `path` if it exists.
    ///
    /// Returns an empty config (all fields None) if the file doesn't exist.
    /// Returns an error if the file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(PulseConfig::default());
        }

        Self::read(path)
    }

    /// Load configuration from a path the user named explicitly.
    ///
    /// Unlike [`PulseConfig::load`], a missing file is a [`MissingConfig`] error.
    pub fn load_required(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(MissingConfig {
                path: path.to_path_buf(),
            }
            .into());
        }

        Self::read(path)
    }

    fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: PulseConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(config)
    }

    /// Scenario from the file layered over the baseline.
    pub fn scenario(&self) -> SimulationConfig {
        self.scenario
            .as_ref()
            .map(|s| s.apply(SimulationConfig::default()))
            .unwrap_or_default()
    }

    /// Get the number of labels to show with default fallback.
    pub fn top_labels(&self) -> usize {
        self.report
            .as_ref()
            .and_then(|r| r.top_labels)
            .unwrap_or(DEFAULT_TOP_LABELS)
    }
}
