//! Core domain types for the analytics engine.
//!
//! This module defines the canonical item shape every other module works on,
//! the statistics produced by aggregation, and the scenario and forecast
//! types consumed and produced by the forecaster.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Calendar month labels used for the twelve fixed trend buckets.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Item identity, either numeric (remote trackers) or free-form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum ItemId {
    Number(u64),
    Text(String),
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemId::Number(n) => write!(f, "{}", n),
            ItemId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        ItemId::Number(n)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        ItemId::Text(s.to_string())
    }
}

/// Item lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Reported, nobody working on it
    Open,
    /// Being worked on
    InProgress,
    /// Resolved
    Closed,
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "open" | "todo" | "new" => Ok(Status::Open),
            "in_progress" | "inprogress" | "in-progress" | "in progress" => Ok(Status::InProgress),
            "closed" | "done" | "resolved" => Ok(Status::Closed),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Status::Open => "open",
            Status::InProgress => "in_progress",
            Status::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Item priority level
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    /// Fallback when nothing else is known
    #[default]
    Medium,
    High,
    Critical,
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" | "normal" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(format!("Invalid priority: {}", s)),
        }
    }
}

/// Lifecycle invariant violations on a canonical item.
#[derive(Debug, Error, PartialEq)]
pub enum ItemError {
    #[error("item {id} is closed but has no closure timestamp")]
    MissingClosedAt { id: ItemId },
    #[error("item {id} is {status} but carries a closure timestamp")]
    UnexpectedClosedAt { id: ItemId, status: Status },
    #[error("item {id} was closed at {closed_at} before it was created at {created_at}")]
    ClosedBeforeCreated {
        id: ItemId,
        created_at: DateTime<Utc>,
        closed_at: DateTime<Utc>,
    },
    #[error("item {id} carries label '{label}' more than once")]
    DuplicateLabel { id: ItemId, label: String },
}

/// A tracked unit of work in canonical form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Item {
    pub id: ItemId,
    pub title: String,
    pub status: Status,
    pub priority: Priority,
    /// Free-form classification (e.g. "Bug", "Feature")
    pub category: String,
    /// Deduplicated label names in first-seen order
    pub labels: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Present iff `status == Closed`
    pub closed_at: Option<DateTime<Utc>>,
    pub assignee: Option<String>,
}

impl Item {
    /// Create an open item with default priority and no labels
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            status: Status::Open,
            priority: Priority::default(),
            category: "Other".to_string(),
            labels: Vec::new(),
            created_at,
            closed_at: None,
            assignee: None,
        }
    }

    /// Mark the item closed at the given instant
    pub fn closed(mut self, closed_at: DateTime<Utc>) -> Self {
        self.status = Status::Closed;
        self.closed_at = Some(closed_at);
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Add a label, ignoring duplicates
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
        self
    }

    /// Check the lifecycle invariants.
    ///
    /// A closed item must carry `closed_at`, any other item must not, and
    /// closure can never precede creation. Labels form a set.
    pub fn validate(&self) -> Result<(), ItemError> {
        let mut seen = HashSet::with_capacity(self.labels.len());
        if let Some(label) = self.labels.iter().find(|l| !seen.insert(l.as_str())) {
            return Err(ItemError::DuplicateLabel {
                id: self.id.clone(),
                label: label.clone(),
            });
        }

        match (self.status, self.closed_at) {
            (Status::Closed, None) => Err(ItemError::MissingClosedAt {
                id: self.id.clone(),
            }),
            (Status::Closed, Some(closed_at)) if closed_at < self.created_at => {
                Err(ItemError::ClosedBeforeCreated {
                    id: self.id.clone(),
                    created_at: self.created_at,
                    closed_at,
                })
            }
            (Status::Closed, Some(_)) => Ok(()),
            (status, Some(_)) => Err(ItemError::UnexpectedClosedAt {
                id: self.id.clone(),
                status,
            }),
            (_, None) => Ok(()),
        }
    }

    /// Open and in-progress items both count toward the backlog
    pub fn is_open(&self) -> bool {
        matches!(self.status, Status::Open | Status::InProgress)
    }

    /// Fractional days from creation to closure, `None` while unresolved
    pub fn resolution_days(&self) -> Option<f64> {
        self.closed_at
            .map(|closed_at| (closed_at - self.created_at).num_milliseconds() as f64 / MILLIS_PER_DAY)
    }
}

/// Creation/resolution counts for one calendar month (all years merged)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyStat {
    /// Month label ("Jan".."Dec")
    pub name: String,
    pub created: u64,
    pub resolved: u64,
}

impl MonthlyStat {
    pub fn new(name: impl Into<String>, created: u64, resolved: u64) -> Self {
        Self {
            name: name.into(),
            created,
            resolved,
        }
    }

    /// Twelve zeroed buckets, January first
    pub fn empty_year() -> Vec<MonthlyStat> {
        MONTH_NAMES
            .iter()
            .map(|name| MonthlyStat::new(*name, 0, 0))
            .collect()
    }
}

/// Frequency and resolution latency for one label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LabelStat {
    pub name: String,
    /// Items carrying the label
    pub count: u64,
    /// Mean days to close over closed items with the label, one decimal, 0 if none closed
    pub avg_resolution_days: f64,
}

/// Item count for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CategoryStat {
    pub name: String,
    pub value: u64,
}

/// Aggregated historical statistics over an item collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalyticsSummary {
    pub total: u64,
    /// Open plus in-progress
    pub open: u64,
    pub closed: u64,
    /// Whole days, 0 when nothing is closed
    pub avg_resolution_days: u64,
    /// Exactly twelve buckets, January first
    pub monthly_trends: Vec<MonthlyStat>,
    pub category_distribution: Vec<CategoryStat>,
    /// Sorted by descending count, ties in first-seen order
    pub label_stats: Vec<LabelStat>,
}

/// One point of the backlog curve, either observed or projected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ForecastPoint {
    Historical { name: String, historical_open: u64 },
    Projected { name: String, projected_open: u64 },
}

impl ForecastPoint {
    pub fn name(&self) -> &str {
        match self {
            ForecastPoint::Historical { name, .. } | ForecastPoint::Projected { name, .. } => name,
        }
    }

    pub fn historical_open(&self) -> Option<u64> {
        match self {
            ForecastPoint::Historical {
                historical_open, ..
            } => Some(*historical_open),
            ForecastPoint::Projected { .. } => None,
        }
    }

    pub fn projected_open(&self) -> Option<u64> {
        match self {
            ForecastPoint::Projected { projected_open, .. } => Some(*projected_open),
            ForecastPoint::Historical { .. } => None,
        }
    }

    pub fn is_projected(&self) -> bool {
        matches!(self, ForecastPoint::Projected { .. })
    }
}

/// Invalid "what-if" scenario parameters.
#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("incoming_issue_rate must be positive, got {0}")]
    NonPositiveIncomingRate(f64),
    #[error("weekly_meeting_hours must not be negative, got {0}")]
    NegativeMeetingHours(f64),
    #[error("code_review_avg_hours must be positive, got {0}")]
    NonPositiveReviewHours(f64),
}

/// A hypothetical operating scenario evaluated against the historical trend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SimulationConfig {
    /// Headcount delta (signed)
    pub developer_count_change: i32,
    /// Multiplier on the fitted creation trend (1.0 = unchanged)
    pub incoming_issue_rate: f64,
    /// Meeting hours per developer per week
    pub weekly_meeting_hours: f64,
    /// Mean hours from review request to merge
    pub code_review_avg_hours: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            developer_count_change: 0,
            incoming_issue_rate: 1.0,
            weekly_meeting_hours: 6.0,
            code_review_avg_hours: 24.0,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let fields = [
            ("incoming_issue_rate", self.incoming_issue_rate),
            ("weekly_meeting_hours", self.weekly_meeting_hours),
            ("code_review_avg_hours", self.code_review_avg_hours),
        ];
        if let Some((field, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ScenarioError::NotFinite {
                field: *field,
                value: *value,
            });
        }
        if self.incoming_issue_rate <= 0.0 {
            return Err(ScenarioError::NonPositiveIncomingRate(
                self.incoming_issue_rate,
            ));
        }
        if self.weekly_meeting_hours < 0.0 {
            return Err(ScenarioError::NegativeMeetingHours(
                self.weekly_meeting_hours,
            ));
        }
        if self.code_review_avg_hours <= 0.0 {
            return Err(ScenarioError::NonPositiveReviewHours(
                self.code_review_avg_hours,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_closed_item_requires_timestamp() {
        let item = Item::new(1u64, "crash", at(2024, 1, 1)).with_status(Status::Closed);
        assert_eq!(
            item.validate(),
            Err(ItemError::MissingClosedAt { id: ItemId::Number(1) })
        );
    }

    #[test]
    fn test_repeated_label_rejected() {
        let mut item = Item::new(4u64, "dup", at(2024, 1, 1)).with_label("bug");
        item.labels.push("bug".to_string());
        assert_eq!(
            item.validate(),
            Err(ItemError::DuplicateLabel {
                id: ItemId::Number(4),
                label: "bug".to_string()
            })
        );
    }

    #[test]
    fn test_open_item_rejects_closed_at() {
        let mut item = Item::new("abc", "wip", at(2024, 1, 1)).with_status(Status::InProgress);
        item.closed_at = Some(at(2024, 1, 2));
        assert!(matches!(
            item.validate(),
            Err(ItemError::UnexpectedClosedAt {
                status: Status::InProgress,
                ..
            })
        ));
    }

    #[test]
    fn test_closure_before_creation_rejected() {
        let item = Item::new(7u64, "time travel", at(2024, 3, 1)).closed(at(2024, 2, 1));
        assert!(matches!(
            item.validate(),
            Err(ItemError::ClosedBeforeCreated { .. })
        ));
    }

    #[test]
    fn test_resolution_days_fractional() {
        let created = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let closed = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let item = Item::new(1u64, "x", created).closed(closed);
        assert_eq!(item.resolution_days(), Some(1.5));
        assert!(item.validate().is_ok());
        assert!(!item.is_open());
    }

    #[test]
    fn test_with_label_deduplicates() {
        let item = Item::new(1u64, "x", at(2024, 1, 1))
            .with_label("bug")
            .with_label("ui")
            .with_label("bug");
        assert_eq!(item.labels, vec!["bug", "ui"]);
    }

    #[test]
    fn test_status_and_priority_parse() {
        assert_eq!("In-Progress".parse::<Status>(), Ok(Status::InProgress));
        assert_eq!("done".parse::<Status>(), Ok(Status::Closed));
        assert!("stuck".parse::<Status>().is_err());
        assert_eq!("CRITICAL".parse::<Priority>(), Ok(Priority::Critical));
        assert_eq!("normal".parse::<Priority>(), Ok(Priority::Medium));
        assert!("p9".parse::<Priority>().is_err());
    }

    #[test]
    fn test_item_id_untagged_serde() {
        let ids: Vec<ItemId> = serde_json::from_str(r#"[42, "PROJ-7"]"#).unwrap();
        assert_eq!(ids, vec![ItemId::Number(42), ItemId::Text("PROJ-7".into())]);
        assert_eq!(ids[1].to_string(), "PROJ-7");
    }

    #[test]
    fn test_forecast_point_is_tagged_union() {
        let point = ForecastPoint::Projected {
            name: "Next 1".into(),
            projected_open: 4,
        };
        let json = serde_json::to_value(&point).unwrap();
        assert_eq!(json["kind"], "projected");
        assert_eq!(json["projected_open"], 4);
        assert!(json.get("historical_open").is_none());
        assert_eq!(point.historical_open(), None);
        assert_eq!(point.projected_open(), Some(4));
    }

    #[test]
    fn test_default_scenario_is_valid_baseline() {
        let config = SimulationConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.weekly_meeting_hours, 6.0);
        assert_eq!(config.code_review_avg_hours, 24.0);
    }

    #[test]
    fn test_scenario_validation() {
        let bad_rate = SimulationConfig {
            incoming_issue_rate: 0.0,
            ..Default::default()
        };
        assert_eq!(
            bad_rate.validate(),
            Err(ScenarioError::NonPositiveIncomingRate(0.0))
        );

        let bad_meetings = SimulationConfig {
            weekly_meeting_hours: -1.0,
            ..Default::default()
        };
        assert!(bad_meetings.validate().is_err());

        let nan_review = SimulationConfig {
            code_review_avg_hours: f64::NAN,
            ..Default::default()
        };
        assert!(matches!(
            nan_review.validate(),
            Err(ScenarioError::NotFinite {
                field: "code_review_avg_hours",
                ..
            })
        ));
    }

    #[test]
    fn test_empty_year_has_twelve_named_buckets() {
        let year = MonthlyStat::empty_year();
        assert_eq!(year.len(), 12);
        assert_eq!(year[0].name, "Jan");
        assert_eq!(year[11].name, "Dec");
    }
}
