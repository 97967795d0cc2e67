//! Query and aggregation over an in-memory project collection.
//!
//! Nothing here touches the table; callers load once and query the result.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Days, NaiveDate, Weekday};
use serde::Serialize;

use crate::errors::ValidationError;
use crate::project::{ProjectRecord, ProjectStatus};

/// Filter value meaning "no filter".
pub const ALL: &str = "All";

/// Projects due within this many days (inclusive) are flagged as due soon.
pub const DEFAULT_DUE_SOON_DAYS: u32 = 3;

// ─────────────────────────────────────────────────────────────────────────────
// Filtering
// ─────────────────────────────────────────────────────────────────────────────

/// Owner/status filter. `None` on either side means "All".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub owner: Option<String>,
    pub status: Option<ProjectStatus>,
}

impl ProjectFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a filter from UI selections, where exactly `All` disables that
    /// side of the filter.
    pub fn parse(owner: &str, status: &str) -> Result<Self, ValidationError> {
        let owner = (owner != ALL).then(|| owner.to_string());
        let status = if status == ALL {
            None
        } else {
            Some(status.parse()?)
        };
        Ok(Self { owner, status })
    }

    pub fn matches(&self, record: &ProjectRecord) -> bool {
        self.owner.as_ref().is_none_or(|o| record.owner == *o)
            && self.status.is_none_or(|s| record.status == s)
    }
}

/// Records matching both sides of `filter`, in input order.
pub fn filter(records: &[ProjectRecord], filter: &ProjectFilter) -> Vec<ProjectRecord> {
    records
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect()
}

/// Distinct non-empty owners, sorted. These are the owner filter choices.
pub fn owners(records: &[ProjectRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.owner.as_str())
        .filter(|o| !o.trim().is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Project names in table order (duplicates kept).
pub fn project_names(records: &[ProjectRecord]) -> Vec<String> {
    records.iter().map(|r| r.name.clone()).collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Deadlines
// ─────────────────────────────────────────────────────────────────────────────

/// Whole days from `today` to the deadline. Negative when overdue.
pub fn days_left(record: &ProjectRecord, today: NaiveDate) -> i64 {
    record.deadline.signed_duration_since(today).num_days()
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    None,
    DueSoon,
    Overdue,
}

impl Highlight {
    pub fn for_days_left(days_left: i64, due_soon_days: u32) -> Self {
        if days_left < 0 {
            Highlight::Overdue
        } else if days_left <= i64::from(due_soon_days) {
            Highlight::DueSoon
        } else {
            Highlight::None
        }
    }
}

/// A list-view row: the record plus its deadline standing.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProjectRow {
    #[serde(flatten)]
    pub record: ProjectRecord,
    pub days_left: i64,
    pub highlight: Highlight,
}

pub fn rows(records: &[ProjectRecord], today: NaiveDate, due_soon_days: u32) -> Vec<ProjectRow> {
    records
        .iter()
        .map(|record| {
            let days_left = days_left(record, today);
            ProjectRow {
                record: record.clone(),
                days_left,
                highlight: Highlight::for_days_left(days_left, due_soon_days),
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Aggregates
// ─────────────────────────────────────────────────────────────────────────────

/// Count of records per status. Statuses with no records are absent.
pub fn status_counts(records: &[ProjectRecord]) -> BTreeMap<ProjectStatus, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.status).or_insert(0) += 1;
    }
    counts
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusShare {
    pub status: ProjectStatus,
    pub count: usize,
    /// Share of all records, 0.0 – 100.0.
    pub percent: f64,
}

pub fn status_shares(counts: &BTreeMap<ProjectStatus, usize>) -> Vec<StatusShare> {
    let total: usize = counts.values().sum();
    if total == 0 {
        return Vec::new();
    }
    counts
        .iter()
        .map(|(&status, &count)| StatusShare {
            status,
            count,
            percent: count as f64 * 100.0 / total as f64,
        })
        .collect()
}

/// Monday of the ISO week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date.week(Weekday::Mon).first_day()
}

/// `YYYY-MM-DD/YYYY-MM-DD` for the Monday–Sunday week starting at `start`.
pub fn week_label(start: NaiveDate) -> String {
    let end = start.checked_add_days(Days::new(6)).unwrap_or(start);
    format!("{}/{}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d"))
}

/// Number of deadlines per ISO week, keyed by week start, ascending.
pub fn due_by_week(records: &[ProjectRecord]) -> BTreeMap<NaiveDate, usize> {
    let mut weeks = BTreeMap::new();
    for record in records {
        *weeks.entry(week_start(record.deadline)).or_insert(0) += 1;
    }
    weeks
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct WeeklyDue {
    pub week_start: NaiveDate,
    pub label: String,
    pub count: usize,
}

/// Everything the analytics view shows.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Analytics {
    pub total: usize,
    pub status_counts: Vec<StatusShare>,
    pub due_by_week: Vec<WeeklyDue>,
}

impl Analytics {
    pub fn compute(records: &[ProjectRecord]) -> Self {
        let due_by_week = due_by_week(records)
            .into_iter()
            .map(|(week_start, count)| WeeklyDue {
                week_start,
                label: week_label(week_start),
                count,
            })
            .collect();
        Self {
            total: records.len(),
            status_counts: status_shares(&status_counts(records)),
            due_by_week,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(
        name: &str,
        owner: &str,
        status: ProjectStatus,
        deadline: NaiveDate,
    ) -> ProjectRecord {
        ProjectRecord {
            name: name.to_string(),
            owner: owner.to_string(),
            status,
            start_date: None,
            end_date: None,
            deadline,
            last_updated: date(2026, 10, 1),
            extra: Vec::new(),
        }
    }

    fn sample() -> Vec<ProjectRecord> {
        vec![
            record("Atlas", "alice", ProjectStatus::NotStarted, date(2026, 10, 19)),
            record("Beacon", "bob", ProjectStatus::InProgress, date(2026, 10, 25)),
            record("Comet", "alice", ProjectStatus::InProgress, date(2026, 10, 26)),
            record("Drift", "carol", ProjectStatus::Completed, date(2026, 10, 12)),
        ]
    }

    #[test]
    fn all_all_filter_returns_input_unchanged() {
        let records = sample();
        let filter_all = ProjectFilter::parse("All", "All").unwrap();
        assert_eq!(filter_all, ProjectFilter::all());
        assert_eq!(filter(&records, &filter_all), records);
    }

    #[test]
    fn owner_and_status_filters_combine() {
        let records = sample();
        let by_owner = ProjectFilter::parse("alice", "All").unwrap();
        assert_eq!(
            project_names(&filter(&records, &by_owner)),
            vec!["Atlas", "Comet"]
        );

        let both = ProjectFilter::parse("alice", "In Progress").unwrap();
        assert_eq!(project_names(&filter(&records, &both)), vec!["Comet"]);

        let none = ProjectFilter::parse("bob", "Completed").unwrap();
        assert!(filter(&records, &none).is_empty());
    }

    #[test]
    fn only_exact_all_disables_the_owner_filter() {
        let mut records = sample();
        records.push(record("Echo", "all", ProjectStatus::NotStarted, date(2026, 11, 1)));

        let by_owner = ProjectFilter::parse("all", "All").unwrap();
        assert_eq!(by_owner.owner.as_deref(), Some("all"));
        assert_eq!(project_names(&filter(&records, &by_owner)), vec!["Echo"]);
        assert_eq!(
            filter(&records, &ProjectFilter::parse("ALL", "All").unwrap()),
            Vec::new()
        );
    }

    #[test]
    fn filter_parse_rejects_unknown_status() {
        assert_eq!(
            ProjectFilter::parse("All", "blocked"),
            Err(ValidationError::InvalidStatus("blocked".to_string()))
        );
    }

    #[test]
    fn owner_filter_is_exact() {
        let records = sample();
        let filter_alice = ProjectFilter::parse("Alice", "All").unwrap();
        assert!(filter(&records, &filter_alice).is_empty());
    }

    #[test]
    fn days_left_is_signed() {
        let today = date(2026, 10, 18);
        let ahead = record("A", "a", ProjectStatus::NotStarted, date(2026, 10, 23));
        let behind = record("B", "b", ProjectStatus::NotStarted, date(2026, 10, 16));
        assert_eq!(days_left(&ahead, today), 5);
        assert_eq!(days_left(&behind, today), -2);
    }

    #[test]
    fn highlight_policy_boundaries() {
        assert_eq!(Highlight::for_days_left(-1, 3), Highlight::Overdue);
        assert_eq!(Highlight::for_days_left(0, 3), Highlight::DueSoon);
        assert_eq!(Highlight::for_days_left(3, 3), Highlight::DueSoon);
        assert_eq!(Highlight::for_days_left(4, 3), Highlight::None);
    }

    #[test]
    fn rows_carry_days_left_and_highlight() {
        let rows = rows(&sample(), date(2026, 10, 18), DEFAULT_DUE_SOON_DAYS);
        let summary: Vec<(&str, i64, Highlight)> = rows
            .iter()
            .map(|r| (r.record.name.as_str(), r.days_left, r.highlight))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Atlas", 1, Highlight::DueSoon),
                ("Beacon", 7, Highlight::None),
                ("Comet", 8, Highlight::None),
                ("Drift", -6, Highlight::Overdue),
            ]
        );
    }

    #[test]
    fn status_counts_by_status() {
        let counts = status_counts(&sample());
        assert_eq!(
            counts,
            BTreeMap::from([
                (ProjectStatus::NotStarted, 1),
                (ProjectStatus::InProgress, 2),
                (ProjectStatus::Completed, 1),
            ])
        );
    }

    #[test]
    fn status_shares_sum_to_hundred() {
        let shares = status_shares(&status_counts(&sample()));
        let percents: Vec<f64> = shares.iter().map(|s| s.percent).collect();
        assert_eq!(percents, vec![25.0, 50.0, 25.0]);
        assert!(status_shares(&BTreeMap::new()).is_empty());
    }

    #[test]
    fn week_start_is_monday() {
        // 2026-10-18 is a Sunday; its ISO week starts Monday 2026-10-12.
        assert_eq!(week_start(date(2026, 10, 18)), date(2026, 10, 12));
        assert_eq!(week_start(date(2026, 10, 12)), date(2026, 10, 12));
        assert_eq!(week_label(date(2026, 10, 12)), "2026-10-12/2026-10-18");
    }

    #[test]
    fn due_by_week_buckets_chronologically() {
        let weeks = due_by_week(&sample());
        assert_eq!(
            weeks.into_iter().collect::<Vec<_>>(),
            vec![
                (date(2026, 10, 12), 1),
                (date(2026, 10, 19), 2),
                (date(2026, 10, 26), 1),
            ]
        );
    }

    #[test]
    fn due_by_week_spans_the_year_boundary() {
        let records = vec![
            record("Atlas", "alice", ProjectStatus::NotStarted, date(2026, 12, 28)),
            record("Beacon", "bob", ProjectStatus::NotStarted, date(2027, 1, 1)),
            record("Comet", "carol", ProjectStatus::NotStarted, date(2027, 1, 3)),
            record("Drift", "dave", ProjectStatus::NotStarted, date(2027, 1, 4)),
        ];
        assert_eq!(week_start(date(2027, 1, 1)), date(2026, 12, 28));
        assert_eq!(week_label(date(2026, 12, 28)), "2026-12-28/2027-01-03");
        assert_eq!(
            due_by_week(&records).into_iter().collect::<Vec<_>>(),
            vec![(date(2026, 12, 28), 3), (date(2027, 1, 4), 1)]
        );
    }

    #[test]
    fn owners_are_distinct_and_sorted() {
        let mut records = sample();
        records.push(record("Echo", "", ProjectStatus::NotStarted, date(2026, 11, 1)));
        assert_eq!(owners(&records), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn analytics_bundles_aggregates() {
        let analytics = Analytics::compute(&sample());
        assert_eq!(analytics.total, 4);
        assert_eq!(analytics.status_counts.len(), 3);
        assert_eq!(analytics.due_by_week[1].label, "2026-10-19/2026-10-25");
        assert_eq!(analytics.due_by_week[1].count, 2);

        let empty = Analytics::compute(&[]);
        assert_eq!(empty.total, 0);
        assert!(empty.status_counts.is_empty());
        assert!(empty.due_by_week.is_empty());
    }

    #[test]
    fn row_serializes_flat() {
        let row = rows(&sample()[..1], date(2026, 10, 18), DEFAULT_DUE_SOON_DAYS).remove(0);
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["name"], "Atlas");
        assert_eq!(json["status"], "Not Started");
        assert_eq!(json["deadline"], "2026-10-19");
        assert_eq!(json["days_left"], 1);
        assert_eq!(json["highlight"], "due_soon");
    }
}
