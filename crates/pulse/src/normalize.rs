//! Normalization of raw item records into the canonical [`Item`] shape.
//!
//! Raw records arrive in two shapes: the synthetic shape produced by the data
//! generator (`id`, `status`, `createdAt`, plain string labels) and the shape
//! returned by remote issue trackers (`number`, `state`, `created_at`, label
//! objects). Both deserialize into [`RawItem`]. Priority, category and
//! in-progress status are inferred from label names only when the record does
//! not state them explicitly, and every inference has an explicit fallback.

use crate::domain::{Item, ItemId, Priority, Status};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::OnceLock;
use thiserror::Error;

/// Category assigned when no label matches a known category.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Errors raised while normalizing a raw record.
#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("record #{index} has no id or number")]
    MissingId { index: usize },
    #[error("item {id} has no creation timestamp")]
    MissingCreatedAt { id: ItemId },
    #[error("item {id} is closed but has no closure timestamp")]
    MissingClosedAt { id: ItemId },
    #[error("item {id} was closed before it was created")]
    ClosedBeforeCreated { id: ItemId },
    #[error("item {id}: invalid {field} '{value}'")]
    InvalidField {
        id: ItemId,
        field: &'static str,
        value: String,
    },
    #[error("duplicate item id {0}")]
    DuplicateId(ItemId),
}

/// A label either as a bare string or as a tracker label object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawLabel {
    Name(String),
    Object { name: String },
}

impl RawLabel {
    fn name(&self) -> &str {
        match self {
            RawLabel::Name(name) | RawLabel::Object { name } => name,
        }
    }
}

/// An assignee either as a bare name or as a tracker user object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawAssignee {
    Name(String),
    User { login: String },
}

/// A heterogeneous item record prior to normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    /// Tracker-facing issue number; preferred over `id` when both are present
    #[serde(default)]
    pub number: Option<ItemId>,
    #[serde(default)]
    pub title: Option<String>,
    /// Explicit lifecycle status (synthetic records)
    #[serde(default)]
    pub status: Option<String>,
    /// Remote tracker state, `open` or `closed`
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub labels: Vec<RawLabel>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "closedAt")]
    pub closed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub assignee: Option<RawAssignee>,
}

fn critical_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(critical|urgent|blocker|p0|sev[-_ ]?[01])\b")
            .expect("critical priority regex should compile")
    })
}

fn high_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(high|important|p1|sev[-_ ]?2)\b")
            .expect("high priority regex should compile")
    })
}

fn low_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(low|minor|trivial|p3|p4|nice[-_ ]to[-_ ]have)\b")
            .expect("low priority regex should compile")
    })
}

fn in_progress_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(in[-_ ]?progress|wip|doing|started)\b")
            .expect("in-progress regex should compile")
    })
}

/// Category rules, checked in order; first match wins.
fn category_rules() -> &'static [(Regex, &'static str)] {
    static RULES: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    RULES.get_or_init(|| {
        [
            (r"(?i)\b(bug|defect|crash|regression)\b", "Bug"),
            (r"(?i)\b(feature|enhancement|feature[-_ ]request)\b", "Feature"),
            (r"(?i)\b(docs?|documentation)\b", "Documentation"),
            (r"(?i)\b(question|support|help[-_ ]wanted)\b", "Support"),
            (
                r"(?i)\b(chore|refactor|maintenance|tech[-_ ]debt|ci|dependencies)\b",
                "Maintenance",
            ),
        ]
        .into_iter()
        .map(|(pattern, category)| {
            (
                Regex::new(pattern).expect("category regex should compile"),
                category,
            )
        })
        .collect()
    })
}

/// Infer a priority from label names.
///
/// The most severe match wins; items with no matching label get
/// [`Priority::Medium`].
///
/// # Examples
///
/// ```
/// use pulse::domain::Priority;
/// use pulse::normalize::classify_priority;
///
/// assert_eq!(classify_priority(&["bug", "P0"]), Priority::Critical);
/// assert_eq!(classify_priority(&["good first issue", "minor"]), Priority::Low);
/// assert_eq!(classify_priority(&["ui"]), Priority::Medium);
/// ```
pub fn classify_priority<S: AsRef<str>>(labels: &[S]) -> Priority {
    let matches = |re: &Regex| labels.iter().any(|l| re.is_match(l.as_ref()));

    if matches(critical_regex()) {
        Priority::Critical
    } else if matches(high_regex()) {
        Priority::High
    } else if matches(low_regex()) {
        Priority::Low
    } else {
        Priority::Medium
    }
}

/// Infer a category from label names, falling back to [`FALLBACK_CATEGORY`].
///
/// ```
/// use pulse::normalize::classify_category;
///
/// assert_eq!(classify_category(&["area:ui", "bug"]), "Bug");
/// assert_eq!(classify_category(&["enhancement"]), "Feature");
/// assert_eq!(classify_category::<&str>(&[]), "Other");
/// ```
pub fn classify_category<S: AsRef<str>>(labels: &[S]) -> String {
    category_rules()
        .iter()
        .find(|(re, _)| labels.iter().any(|l| re.is_match(l.as_ref())))
        .map(|(_, category)| category.to_string())
        .unwrap_or_else(|| FALLBACK_CATEGORY.to_string())
}

/// Resolve the lifecycle status of a record.
///
/// An explicit status string wins. Otherwise a closed tracker state means
/// [`Status::Closed`], an open one with an in-progress label means
/// [`Status::InProgress`], and anything else is [`Status::Open`].
pub fn classify_status<S: AsRef<str>>(
    explicit: Option<&str>,
    state: Option<&str>,
    labels: &[S],
) -> Result<Status, String> {
    if let Some(status) = explicit {
        return status.parse();
    }

    match state.map(|s| s.trim().to_lowercase()) {
        Some(state) if state == "closed" => Ok(Status::Closed),
        Some(state) if state != "open" => Err(format!("Invalid state: {}", state)),
        _ if labels
            .iter()
            .any(|l| in_progress_regex().is_match(l.as_ref())) =>
        {
            Ok(Status::InProgress)
        }
        _ => Ok(Status::Open),
    }
}

/// Trimmed, non-empty label names with duplicates removed, first occurrence kept.
fn dedup_labels(raw: &[RawLabel]) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.iter()
        .map(|l| l.name().trim())
        .filter(|name| !name.is_empty())
        .filter(|name| seen.insert(name.to_string()))
        .map(str::to_string)
        .collect()
}

/// Normalize a single record. `index` is its position in the input, used
/// only to identify records that have no id.
pub fn normalize_item(raw: RawItem, index: usize) -> Result<Item, NormalizeError> {
    let id = raw
        .number
        .or(raw.id)
        .ok_or(NormalizeError::MissingId { index })?;
    let created_at = raw
        .created_at
        .ok_or_else(|| NormalizeError::MissingCreatedAt { id: id.clone() })?;
    let labels = dedup_labels(&raw.labels);

    let status = classify_status(raw.status.as_deref(), raw.state.as_deref(), &labels).map_err(
        |_| NormalizeError::InvalidField {
            id: id.clone(),
            field: "status",
            value: raw
                .status
                .clone()
                .or_else(|| raw.state.clone())
                .unwrap_or_default(),
        },
    )?;

    let priority = match raw.priority.as_deref() {
        Some(p) => p.parse().map_err(|_| NormalizeError::InvalidField {
            id: id.clone(),
            field: "priority",
            value: p.to_string(),
        })?,
        None => classify_priority(&labels),
    };

    let category = raw
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| classify_category(&labels));

    // Reopened tracker issues drop their old closure timestamp
    let closed_at = match status {
        Status::Closed => {
            let closed_at = raw
                .closed_at
                .ok_or_else(|| NormalizeError::MissingClosedAt { id: id.clone() })?;
            if closed_at < created_at {
                return Err(NormalizeError::ClosedBeforeCreated { id });
            }
            Some(closed_at)
        }
        Status::Open | Status::InProgress => None,
    };

    let assignee = raw.assignee.map(|a| match a {
        RawAssignee::Name(name) => name,
        RawAssignee::User { login } => login,
    });

    Ok(Item {
        id,
        title: raw.title.unwrap_or_default(),
        status,
        priority,
        category,
        labels,
        created_at,
        closed_at,
        assignee,
    })
}

/// Normalize a whole collection, rejecting duplicate ids.
pub fn normalize_items(raws: Vec<RawItem>) -> Result<Vec<Item>, NormalizeError> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(raws.len());

    for (index, raw) in raws.into_iter().enumerate() {
        let item = normalize_item(raw, index)?;
        if !seen.insert(item.id.clone()) {
            return Err(NormalizeError::DuplicateId(item.id));
        }
        items.push(item);
    }

    tracing::debug!(count = items.len(), "normalized items");
    Ok(items)
}
