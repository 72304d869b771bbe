//! Actionable error formatting for the command line.
//!
//! Library errors are typed (`NormalizeError`, `AggregateError`,
//! `ForecastError`, ...). At the CLI boundary they are classified into an
//! exit code, a JSON error code and an [`ActionableError`] that lists
//! possible causes and remediation steps.

use crate::aggregate::AggregateError;
use crate::config::MissingConfig;
use crate::domain::ScenarioError;
use crate::forecast::ForecastError;
use crate::normalize::NormalizeError;
use crate::output::{ErrorCode, ExitCode};
use std::fmt;

/// An error with diagnostic context and remediation steps.
///
/// # Example
///
/// ```
/// use pulse::errors::ActionableError;
///
/// let error = ActionableError::new("Items file not found: items.json")
///     .with_cause("The path may be relative to a different directory")
///     .with_remedy("Pass an absolute path, or '-' to read from stdin");
///
/// eprintln!("{}", error);
/// ```
#[derive(Debug, Clone)]
pub struct ActionableError {
    /// The main error message
    error: String,
    /// Possible causes (diagnostic hints)
    causes: Vec<String>,
    /// Remediation steps (how to fix)
    remediation: Vec<String>,
}

impl ActionableError {
    /// Create a new actionable error with the given message.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            causes: Vec::new(),
            remediation: Vec::new(),
        }
    }

    /// Add a possible cause (diagnostic hint).
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        self.causes.push(cause.into());
        self
    }

    /// Add a remediation step (actionable fix).
    pub fn with_remedy(mut self, remedy: impl Into<String>) -> Self {
        self.remediation.push(remedy.into());
        self
    }

    pub fn message(&self) -> &str {
        &self.error
    }

    pub fn remedies(&self) -> &[String] {
        &self.remediation
    }

    /// Convert to a formatted error message suitable for display.
    pub fn to_error_message(&self) -> String {
        let mut msg = format!("Error: {}\n", self.error);

        if !self.causes.is_empty() {
            msg.push_str("\nPossible causes:\n");
            for cause in &self.causes {
                msg.push_str(&format!("  • {}\n", cause));
            }
        }

        if !self.remediation.is_empty() {
            msg.push_str("\nTo fix:\n");
            for remedy in &self.remediation {
                msg.push_str(&format!("  • {}\n", remedy));
            }
        }

        msg
    }
}

impl fmt::Display for ActionableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_error_message())
    }
}

impl std::error::Error for ActionableError {}

/// Items file could not be found or opened.
pub fn items_unreadable(detail: &str) -> ActionableError {
    ActionableError::new(detail)
        .with_cause("The path may be relative to a different working directory")
        .with_cause("The export step may not have produced the file yet")
        .with_remedy("Check the path: ls -l <items.json>")
        .with_remedy("Pipe records on stdin instead: pulse stats - < items.json")
}

/// Item records violate the canonical item contract.
pub fn invalid_items(detail: &str) -> ActionableError {
    ActionableError::new(detail)
        .with_cause("A closed record is missing its closure timestamp")
        .with_cause("A record is missing its id or creation timestamp")
        .with_cause("Two records share the same id")
        .with_remedy("Every record needs 'id' (or 'number') and 'createdAt' (or 'created_at')")
        .with_remedy("Closed records need 'closedAt' (or 'closed_at') at or after creation")
}

/// Scenario parameters are out of range.
pub fn invalid_scenario(detail: &str) -> ActionableError {
    ActionableError::new(detail)
        .with_cause("A scenario flag or a [scenario] value in pulse.toml is out of range")
        .with_remedy("incoming_issue_rate and code_review_avg_hours must be > 0")
        .with_remedy("weekly_meeting_hours must be >= 0")
}

/// Configuration file exists but cannot be parsed.
pub fn malformed_config(detail: &str) -> ActionableError {
    ActionableError::new(detail)
        .with_cause("pulse.toml contains a syntax error or an unknown key")
        .with_remedy("Valid sections are [scenario] and [report]")
        .with_remedy("Point to another file with --config or PULSE_CONFIG")
}

/// A config file named on the command line or in the environment is missing.
pub fn config_not_found(detail: &str) -> ActionableError {
    ActionableError::new(detail)
        .with_cause("--config or PULSE_CONFIG points at a path that does not exist")
        .with_remedy("Check the path for typos")
        .with_remedy("Unset PULSE_CONFIG to use ./pulse.toml or the baseline scenario")
}

/// Monthly history has the wrong shape.
pub fn invalid_history(detail: &str) -> ActionableError {
    ActionableError::new(detail)
        .with_cause("The monthly history must contain exactly one bucket per calendar month")
}

/// Failure classification at the CLI boundary.
#[derive(Debug, Clone)]
pub struct Classified {
    pub exit_code: ExitCode,
    pub code: &'static str,
    pub actionable: ActionableError,
}

/// Classify an error by walking its cause chain for known error types.
pub fn classify(error: &anyhow::Error) -> Classified {
    let detail = format!("{:#}", error);

    for cause in error.chain() {
        if cause.downcast_ref::<NormalizeError>().is_some()
            || cause.downcast_ref::<AggregateError>().is_some()
        {
            return Classified {
                exit_code: ExitCode::ValidationFailed,
                code: ErrorCode::INVALID_ITEMS,
                actionable: invalid_items(&detail),
            };
        }
        if cause.downcast_ref::<MissingConfig>().is_some() {
            return Classified {
                exit_code: ExitCode::NotFound,
                code: ErrorCode::CONFIG_ERROR,
                actionable: config_not_found(&detail),
            };
        }
        if cause.downcast_ref::<ScenarioError>().is_some() {
            return Classified {
                exit_code: ExitCode::InvalidArgument,
                code: ErrorCode::INVALID_SCENARIO,
                actionable: invalid_scenario(&detail),
            };
        }
        if let Some(forecast_error) = cause.downcast_ref::<ForecastError>() {
            return match forecast_error {
                ForecastError::InvalidScenario(_) => Classified {
                    exit_code: ExitCode::InvalidArgument,
                    code: ErrorCode::INVALID_SCENARIO,
                    actionable: invalid_scenario(&detail),
                },
                ForecastError::HistoryLength { .. } => Classified {
                    exit_code: ExitCode::ValidationFailed,
                    code: ErrorCode::VALIDATION_FAILED,
                    actionable: invalid_history(&detail),
                },
            };
        }
        if cause.downcast_ref::<toml::de::Error>().is_some() {
            return Classified {
                exit_code: ExitCode::InvalidArgument,
                code: ErrorCode::CONFIG_ERROR,
                actionable: malformed_config(&detail),
            };
        }
        if cause.downcast_ref::<serde_json::Error>().is_some() {
            return Classified {
                exit_code: ExitCode::ValidationFailed,
                code: ErrorCode::PARSE_ERROR,
                actionable: invalid_items(&detail),
            };
        }
        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            let (exit_code, code) = match io_error.kind() {
                std::io::ErrorKind::NotFound => (ExitCode::NotFound, ErrorCode::NOT_FOUND),
                std::io::ErrorKind::PermissionDenied => {
                    (ExitCode::PermissionDenied, ErrorCode::IO_ERROR)
                }
                _ => (ExitCode::ExternalError, ErrorCode::IO_ERROR),
            };
            return Classified {
                exit_code,
                code,
                actionable: items_unreadable(&detail),
            };
        }
    }

    Classified {
        exit_code: ExitCode::GenericError,
        code: ErrorCode::GENERIC,
        actionable: ActionableError::new(detail),
    }
}
