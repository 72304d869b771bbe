//! Structured output formatting for CLI commands.
//!
//! This module provides consistent JSON output formatting for both success
//! and error cases, plain-text rendering of statistics and projections, and
//! the exit codes the binary reports.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Serialize, Serializer};
use std::fmt::{Display, Write as _};
use std::io::{self, Write};

use crate::capacity::EfficiencyBreakdown;
use crate::domain::{AnalyticsSummary, ForecastPoint};
use crate::forecast::ScenarioOutcome;

/// Version of the JSON output format
const OUTPUT_VERSION: &str = "0.1.0";

// ============================================================================
// Output Context for Quiet Mode
// ============================================================================

/// Context for controlling output verbosity
pub struct OutputContext {
    quiet: bool,
    json: bool,
}

impl OutputContext {
    /// Create a new output context
    pub fn new(quiet: bool, json: bool) -> Self {
        Self { quiet, json }
    }

    /// Print essential output (always shown unless --json)
    pub fn print_data(&self, msg: impl Display) -> io::Result<()> {
        if !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print informational message (suppressed by --quiet or --json)
    pub fn print_info(&self, msg: impl Display) -> io::Result<()> {
        if !self.quiet && !self.json {
            writeln_safe(&format!("{}", msg))
        } else {
            Ok(())
        }
    }

    /// Print a JSON document (only in --json mode)
    pub fn print_json<T: Serialize>(&self, output: &JsonOutput<T>) -> io::Result<()> {
        if self.json {
            let json = output.to_json_string().map_err(io::Error::other)?;
            writeln_safe(&json)
        } else {
            Ok(())
        }
    }

    /// Print a standalone pretty JSON document regardless of mode
    pub fn print_document<T: Serialize>(&self, document: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(document).map_err(io::Error::other)?;
        writeln_safe(&json)
    }

    /// Print a JSON error document to stdout, where scripts read results
    pub fn print_json_error(&self, error: &JsonError) -> io::Result<()> {
        let json = error.to_json_string().map_err(io::Error::other)?;
        writeln_safe(&json)
    }

    /// Print error (always shown to stderr)
    pub fn print_error(&self, msg: impl Display) -> io::Result<()> {
        writeln_safe_stderr(&format!("{}", msg))
    }

    /// Check if JSON mode is enabled
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Safe println that handles broken pipes gracefully
fn writeln_safe(msg: &str) -> io::Result<()> {
    match writeln!(io::stdout(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            // Silently exit on broken pipe (expected when piping to head, etc.)
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

/// Safe eprintln that handles broken pipes gracefully
fn writeln_safe_stderr(msg: &str) -> io::Result<()> {
    match writeln!(io::stderr(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => std::process::exit(0),
        Err(e) => Err(e),
    }
}

// ============================================================================
// JSON Output Types
// ============================================================================

/// Wrapper for successful command output with metadata
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub metadata: Metadata,
}

impl<T: Serialize> JsonOutput<T> {
    /// Create a new successful output with the given data
    pub fn success(data: T, command: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            metadata: Metadata::new(command),
        }
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Wrapper for error output with suggestions
#[derive(Debug, Serialize)]
pub struct JsonError {
    pub success: bool,
    pub error: ErrorDetail,
    pub metadata: Metadata,
}

impl JsonError {
    /// Create a new error output
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                suggestions: Vec::new(),
            },
            metadata: Metadata::new(command),
        }
    }

    /// Add multiple suggestions to the error
    pub fn with_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.error.suggestions.extend(suggestions);
        self
    }

    /// Serialize to JSON string with pretty formatting
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Error details including code, message, and suggestions
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Error code (e.g., "INVALID_ITEMS", "NOT_FOUND")
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Suggested actions to resolve the error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

/// Metadata included in all responses
#[derive(Debug, Serialize)]
pub struct Metadata {
    /// Timestamp when the response was generated
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: chrono::DateTime<Utc>,
    /// Version of the output format
    pub version: String,
    /// Command that generated this response
    pub command: String,
}

impl Metadata {
    fn new(command: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            version: OUTPUT_VERSION.to_string(),
            command: command.into(),
        }
    }
}

/// Serialize timestamp in ISO 8601 format
fn serialize_timestamp<S>(dt: &chrono::DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&dt.to_rfc3339())
}

// ============================================================================
// Exit Codes
// ============================================================================

/// Standardized exit codes for the pulse CLI
///
/// # Examples
///
/// ```rust
/// use pulse::ExitCode;
///
/// assert_eq!(ExitCode::NotFound.code(), 3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,

    /// Generic error (1)
    GenericError = 1,

    /// Invalid arguments, scenario or config (2)
    InvalidArgument = 2,

    /// Items file not found (3)
    NotFound = 3,

    /// Item records violate the item contract (4)
    ValidationFailed = 4,

    /// Permission denied (5)
    PermissionDenied = 5,

    /// I/O failure other than not-found (10)
    ExternalError = 10,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Get a description of what this exit code means
    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Command succeeded",
            ExitCode::GenericError => "Generic error occurred",
            ExitCode::InvalidArgument => "Invalid arguments, scenario or configuration",
            ExitCode::NotFound => "Items file not found",
            ExitCode::ValidationFailed => "Item records failed validation",
            ExitCode::PermissionDenied => "Permission denied",
            ExitCode::ExternalError => "I/O failure reading input",
        }
    }
}

// ============================================================================
// Error Codes (String constants for JSON responses)
// ============================================================================

/// Standard error codes for JSON error responses
pub struct ErrorCode;

impl ErrorCode {
    pub const GENERIC: &'static str = "ERROR";
    pub const NOT_FOUND: &'static str = "NOT_FOUND";
    pub const INVALID_ITEMS: &'static str = "INVALID_ITEMS";
    pub const INVALID_SCENARIO: &'static str = "INVALID_SCENARIO";
    pub const VALIDATION_FAILED: &'static str = "VALIDATION_FAILED";
    pub const CONFIG_ERROR: &'static str = "CONFIG_ERROR";
    pub const IO_ERROR: &'static str = "IO_ERROR";
    pub const PARSE_ERROR: &'static str = "PARSE_ERROR";
}

// ============================================================================
// Response Types
// ============================================================================

/// Payload of `pulse forecast --json`
#[derive(Debug, Serialize, JsonSchema)]
pub struct ForecastResponse {
    /// Backlog at the last historical month
    pub current_backlog: u64,
    /// Backlog at the end of the projection horizon
    pub final_backlog: u64,
    #[serde(flatten)]
    pub outcome: ScenarioOutcome,
}

impl From<ScenarioOutcome> for ForecastResponse {
    fn from(outcome: ScenarioOutcome) -> Self {
        Self {
            current_backlog: outcome.current_backlog(),
            final_backlog: outcome.final_backlog(),
            outcome,
        }
    }
}

// ============================================================================
// Text Rendering
// ============================================================================

/// Render aggregated statistics as plain text, listing at most `top_labels` labels.
pub fn render_summary(summary: &AnalyticsSummary, top_labels: usize) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Items: {} total, {} open, {} closed",
        summary.total, summary.open, summary.closed
    );
    let _ = writeln!(
        out,
        "Average resolution: {} days",
        summary.avg_resolution_days
    );

    out.push_str("\nMonth  Created  Resolved\n");
    for month in &summary.monthly_trends {
        let _ = writeln!(
            out,
            "{:<5}  {:>7}  {:>8}",
            month.name, month.created, month.resolved
        );
    }

    if !summary.category_distribution.is_empty() {
        out.push_str("\nCategories:\n");
        for category in &summary.category_distribution {
            let _ = writeln!(out, "  {:<20} {}", category.name, category.value);
        }
    }

    if !summary.label_stats.is_empty() {
        out.push_str("\nLabels (count, avg days to close):\n");
        for label in summary.label_stats.iter().take(top_labels) {
            let _ = writeln!(
                out,
                "  {:<20} {:>5}  {:>6.1}",
                label.name, label.count, label.avg_resolution_days
            );
        }
        let hidden = summary.label_stats.len().saturating_sub(top_labels);
        if hidden > 0 {
            let _ = writeln!(out, "  ... {} more", hidden);
        }
    }

    out
}

/// Render capacity factors as plain text.
pub fn render_efficiency(efficiency: &EfficiencyBreakdown) -> String {
    format!(
        "Efficiency: {:.3} (meetings {:.3} x review {:.3} x headcount {:.3})",
        efficiency.combined, efficiency.meeting, efficiency.review, efficiency.headcount
    )
}

/// Render a backlog projection as plain text.
pub fn render_forecast(outcome: &ScenarioOutcome) -> String {
    let mut out = String::new();
    out.push_str("Period   Backlog\n");
    for point in &outcome.points {
        match point {
            ForecastPoint::Historical {
                name,
                historical_open,
            } => {
                let _ = writeln!(out, "{:<7}  {:>7}", name, historical_open);
            }
            ForecastPoint::Projected {
                name,
                projected_open,
            } => {
                let _ = writeln!(out, "{:<7}  {:>7}  (projected)", name, projected_open);
            }
        }
    }
    let _ = writeln!(out, "\n{}", render_efficiency(&outcome.efficiency));
    let _ = writeln!(
        out,
        "Backlog {} -> {} over {} periods",
        outcome.current_backlog(),
        outcome.final_backlog(),
        outcome.points.iter().filter(|p| p.is_projected()).count()
    );
    out
}
