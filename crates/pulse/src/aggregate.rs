//! Pure aggregation over item collections.
//!
//! [`aggregate`] turns a slice of canonical items into an [`AnalyticsSummary`]:
//! status counts, resolution latency, twelve calendar-month creation and
//! resolution buckets, the category distribution and per-label statistics.
//! Nothing is cached between calls.

use crate::domain::{
    AnalyticsSummary, CategoryStat, Item, ItemError, ItemId, LabelStat, MonthlyStat,
};
use chrono::Datelike;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during aggregation
#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    /// An item violates the lifecycle invariants
    #[error("invalid item {id}: {source}")]
    InvalidItem {
        id: ItemId,
        #[source]
        source: ItemError,
    },
}

/// Running sums for one label
#[derive(Debug, Default)]
struct LabelAccumulator {
    count: u64,
    closed_count: u64,
    total_days: f64,
}

/// Round to one decimal place
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Aggregate an item collection in a single pass.
///
/// Every item is validated first; a closed item without a closure timestamp
/// (or an open one with a closure timestamp) is a contract violation and
/// fails the whole call. Months are calendar buckets with no year dimension,
/// so items from different years land in the same bucket.
///
/// # Examples
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use pulse::aggregate::aggregate;
/// use pulse::domain::Item;
///
/// let created = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
/// let closed = Utc.with_ymd_and_hms(2024, 2, 4, 0, 0, 0).unwrap();
/// let items = vec![
///     Item::new(1u64, "crash", created).with_label("bug").closed(closed),
///     Item::new(2u64, "typo", created).with_label("docs"),
/// ];
///
/// let summary = aggregate(&items).unwrap();
/// assert_eq!(summary.total, 2);
/// assert_eq!(summary.open, 1);
/// assert_eq!(summary.avg_resolution_days, 3);
/// assert_eq!(summary.monthly_trends[1].created, 2);
/// ```
pub fn aggregate(items: &[Item]) -> Result<AnalyticsSummary, AggregateError> {
    let mut monthly = MonthlyStat::empty_year();
    let mut open = 0u64;
    let mut closed = 0u64;
    let mut total_days = 0.0f64;

    // Vec + index map keeps first-encounter order deterministic
    let mut categories: Vec<CategoryStat> = Vec::new();
    let mut category_index: HashMap<&str, usize> = HashMap::new();
    let mut label_order: Vec<&str> = Vec::new();
    let mut label_sums: HashMap<&str, LabelAccumulator> = HashMap::new();

    for item in items {
        item.validate()
            .map_err(|source| AggregateError::InvalidItem {
                id: item.id.clone(),
                source,
            })?;

        monthly[item.created_at.month0() as usize].created += 1;

        let resolution_days = item.resolution_days();
        match (resolution_days, item.closed_at) {
            (Some(days), Some(closed_at)) => {
                closed += 1;
                total_days += days;
                monthly[closed_at.month0() as usize].resolved += 1;
            }
            _ if item.is_open() => open += 1,
            _ => {}
        }

        match category_index.get(item.category.as_str()) {
            Some(&idx) => categories[idx].value += 1,
            None => {
                category_index.insert(&item.category, categories.len());
                categories.push(CategoryStat {
                    name: item.category.clone(),
                    value: 1,
                });
            }
        }

        for label in &item.labels {
            let sums = label_sums.entry(label.as_str()).or_insert_with(|| {
                label_order.push(label.as_str());
                LabelAccumulator::default()
            });
            sums.count += 1;
            if let Some(days) = resolution_days {
                sums.closed_count += 1;
                sums.total_days += days;
            }
        }
    }

    let avg_resolution_days = if closed > 0 {
        (total_days / closed as f64).round() as u64
    } else {
        0
    };

    let mut label_stats: Vec<LabelStat> = label_order
        .iter()
        .map(|name| {
            let sums = &label_sums[name];
            let avg = if sums.closed_count > 0 {
                round_one_decimal(sums.total_days / sums.closed_count as f64)
            } else {
                0.0
            };
            LabelStat {
                name: name.to_string(),
                count: sums.count,
                avg_resolution_days: avg,
            }
        })
        .collect();
    // Stable: equal counts keep first-encounter order
    label_stats.sort_by(|a, b| b.count.cmp(&a.count));

    tracing::debug!(
        total = items.len(),
        open,
        closed,
        labels = label_stats.len(),
        categories = categories.len(),
        "aggregated items"
    );

    Ok(AnalyticsSummary {
        total: items.len() as u64,
        open,
        closed,
        avg_resolution_days,
        monthly_trends: monthly,
        category_distribution: categories,
        label_stats,
    })
}
