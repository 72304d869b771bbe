//! Property-based tests for the aggregation and forecasting engine
//!
//! Randomly generated item collections and histories exercise the counting
//! and flooring invariants that the example-based tests only spot-check.

use crate::aggregate::aggregate;
use crate::capacity::efficiency_multiplier;
use crate::domain::{Item, MonthlyStat, SimulationConfig, Status, MONTH_NAMES};
use crate::forecast::{forecast, historical_backlog, HISTORY_LEN};
use crate::trend::TrendLine;
use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

const LABELS: [&str; 5] = ["bug", "feature", "docs", "perf", "ui"];

// Generator for a single valid item: creation within 2024, optional closure
// up to ~90 days later, up to three labels from a small pool
type ItemSpec = (u32, Option<u32>, Vec<usize>, bool);

fn item_strategy() -> impl Strategy<Value = ItemSpec> {
    (
        0u32..365 * 24,
        prop::option::of(0u32..90 * 24),
        prop::collection::vec(0usize..LABELS.len(), 0..4),
        any::<bool>(),
    )
}

fn build_items(specs: Vec<ItemSpec>) -> Vec<Item> {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    specs
        .into_iter()
        .enumerate()
        .map(|(idx, (created_hours, closed_after, labels, in_progress))| {
            let created = start + Duration::hours(i64::from(created_hours));
            let mut item = Item::new(idx as u64, format!("item {}", idx), created);
            for label in labels {
                item = item.with_label(LABELS[label]);
            }
            match closed_after {
                Some(hours) => item.closed(created + Duration::hours(i64::from(hours))),
                None if in_progress => item.with_status(Status::InProgress),
                None => item,
            }
        })
        .collect()
}

fn history_strategy() -> impl Strategy<Value = Vec<MonthlyStat>> {
    prop::collection::vec((0u64..200, 0u64..200), HISTORY_LEN).prop_map(|counts| {
        MONTH_NAMES
            .iter()
            .zip(counts)
            .map(|(name, (created, resolved))| MonthlyStat::new(*name, created, resolved))
            .collect()
    })
}

fn scenario_strategy() -> impl Strategy<Value = SimulationConfig> {
    (-10i32..10, 0.1f64..3.0, 0.0f64..40.0, 1.0f64..200.0).prop_map(
        |(developers, rate, meetings, reviews)| SimulationConfig {
            developer_count_change: developers,
            incoming_issue_rate: rate,
            weekly_meeting_hours: meetings,
            code_review_avg_hours: reviews,
        },
    )
}

proptest! {
    /// Property: status counts partition the collection
    #[test]
    fn prop_open_and_closed_partition_total(
        specs in prop::collection::vec(item_strategy(), 0..60)
    ) {
        let items = build_items(specs);
        let summary = aggregate(&items).unwrap();

        prop_assert_eq!(summary.total, items.len() as u64);
        prop_assert!(summary.open + summary.closed <= summary.total);
        prop_assert_eq!(summary.open + summary.closed, summary.total);
    }

    /// Property: monthly buckets account for every creation and resolution
    #[test]
    fn prop_monthly_buckets_sum_to_counts(
        specs in prop::collection::vec(item_strategy(), 0..60)
    ) {
        let items = build_items(specs);
        let summary = aggregate(&items).unwrap();

        prop_assert_eq!(summary.monthly_trends.len(), 12);
        let created: u64 = summary.monthly_trends.iter().map(|m| m.created).sum();
        let resolved: u64 = summary.monthly_trends.iter().map(|m| m.resolved).sum();
        prop_assert_eq!(created, summary.total);
        prop_assert_eq!(resolved, summary.closed);
    }

    /// Property: label counts equal total label occurrences and are sorted
    #[test]
    fn prop_label_counts_match_occurrences(
        specs in prop::collection::vec(item_strategy(), 0..60)
    ) {
        let items = build_items(specs);
        let summary = aggregate(&items).unwrap();

        let occurrences: usize = items.iter().map(|i| i.labels.len()).sum();
        let counted: u64 = summary.label_stats.iter().map(|l| l.count).sum();
        prop_assert_eq!(counted, occurrences as u64);

        for pair in summary.label_stats.windows(2) {
            prop_assert!(pair[0].count >= pair[1].count);
        }
        for label in &summary.label_stats {
            prop_assert!(label.avg_resolution_days >= 0.0);
        }

        let categorized: u64 = summary.category_distribution.iter().map(|c| c.value).sum();
        prop_assert_eq!(categorized, summary.total);
    }

    /// Property: aggregation is a pure function of its input
    #[test]
    fn prop_aggregate_idempotent(
        specs in prop::collection::vec(item_strategy(), 0..40)
    ) {
        let items = build_items(specs);
        prop_assert_eq!(aggregate(&items).unwrap(), aggregate(&items).unwrap());
    }

    /// Property: no historical or projected backlog value is ever negative,
    /// and the historical part matches the cumulative backlog
    #[test]
    fn prop_forecast_shape_and_floor(
        history in history_strategy(),
        scenario in scenario_strategy()
    ) {
        let points = forecast(&history, &scenario).unwrap();
        prop_assert_eq!(points.len(), 15);

        let backlog = historical_backlog(&history);
        for (point, expected) in points.iter().zip(&backlog) {
            prop_assert!(!point.is_projected());
            prop_assert_eq!(point.historical_open(), Some(*expected));
        }
        for (step, point) in points[12..].iter().enumerate() {
            prop_assert!(point.is_projected());
            prop_assert_eq!(point.name(), format!("Next {}", step + 1));
            prop_assert!(point.projected_open().is_some());
        }
    }

    /// Property: forecasting is deterministic
    #[test]
    fn prop_forecast_idempotent(
        history in history_strategy(),
        scenario in scenario_strategy()
    ) {
        prop_assert_eq!(
            forecast(&history, &scenario).unwrap(),
            forecast(&history, &scenario).unwrap()
        );
    }

    /// Property: the multiplier is positive for any valid scenario
    #[test]
    fn prop_efficiency_positive(scenario in scenario_strategy()) {
        prop_assert!(efficiency_multiplier(&scenario) > 0.0);
    }

    /// Property: least squares recovers an exact line
    #[test]
    fn prop_trend_recovers_line(
        slope in -50i32..50,
        intercept in -100i32..100,
        len in 2usize..24
    ) {
        let values: Vec<f64> = (0..len)
            .map(|x| f64::from(slope) * x as f64 + f64::from(intercept))
            .collect();
        let line = TrendLine::fit(&values);

        prop_assert!((line.slope - f64::from(slope)).abs() < 1e-6);
        prop_assert!((line.intercept - f64::from(intercept)).abs() < 1e-6);
    }
}

#[test]
fn test_baseline_efficiency_is_one() {
    assert_eq!(efficiency_multiplier(&SimulationConfig::default()), 1.0);
}
