// src/services/status.rs
//
// The single place where a progress row becomes a status color. SQL views
// only count; every chart, table and suggestion reads the result of `derive`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::models::dashboard::{DocProgress, DocProgressRow, StatusColor};

const SECONDS_PER_DAY: i64 = 86_400;

pub const DEFAULT_AMBER_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPolicy {
    /// Incomplete rows due within this many days (or already overdue and
    /// not critical) are amber.
    pub amber_window_days: i64,
}

impl Default for StatusPolicy {
    fn default() -> Self {
        Self {
            amber_window_days: DEFAULT_AMBER_WINDOW_DAYS,
        }
    }
}

/// The inputs the classification depends on.
#[derive(Debug, Clone, Copy)]
pub struct StatusInput {
    pub required_count: i64,
    pub approved_count: i64,
    pub planned_due_date: Option<NaiveDate>,
    pub is_critical: bool,
}

impl From<&DocProgressRow> for StatusInput {
    fn from(row: &DocProgressRow) -> Self {
        Self {
            required_count: row.required_count as i64,
            approved_count: row.approved_count,
            planned_due_date: row.planned_due_date,
            is_critical: row.is_critical,
        }
    }
}

/// Due dates are compared at 00:00 UTC of the due day.
pub fn due_instant(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// ceil((to - from) / 1 day).
pub fn days_between_ceil(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    let secs = (to - from).num_seconds();
    // integer division truncates toward zero, which is already ceil for negatives
    let days = secs / SECONDS_PER_DAY;
    if secs > 0 && secs % SECONDS_PER_DAY != 0 { days + 1 } else { days }
}

/// Days past the due date; `None` unless strictly positive.
pub fn overdue_days(due: Option<NaiveDate>, now: DateTime<Utc>) -> Option<i64> {
    let due = due?;
    let days = days_between_ceil(due_instant(due), now);
    (days > 0).then_some(days)
}

/// Days until the due date; negative once overdue.
pub fn due_in_days(due: Option<NaiveDate>, now: DateTime<Utc>) -> Option<i64> {
    due.map(|d| days_between_ceil(now, due_instant(d)))
}

/// approved / required, 0 when nothing is required. May exceed 1.
pub fn completion_ratio(approved: i64, required: i64) -> f64 {
    if required <= 0 {
        0.0
    } else {
        approved as f64 / required as f64
    }
}

/// Rounded percentage for display, capped at 100.
pub fn completion_percent(approved: i64, required: i64) -> u32 {
    let pct = (completion_ratio(approved, required) * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}

pub fn status_color(input: &StatusInput, now: DateTime<Utc>, policy: &StatusPolicy) -> StatusColor {
    if input.required_count <= 0 {
        return StatusColor::NotApplicable;
    }
    if input.approved_count >= input.required_count {
        return StatusColor::Green;
    }
    if input.is_critical && overdue_days(input.planned_due_date, now).is_some() {
        return StatusColor::Red;
    }
    match due_in_days(input.planned_due_date, now) {
        Some(days) if days <= policy.amber_window_days => StatusColor::Amber,
        _ => StatusColor::Neutral,
    }
}

pub fn derive(row: DocProgressRow, now: DateTime<Utc>, policy: &StatusPolicy) -> DocProgress {
    let input = StatusInput::from(&row);
    DocProgress {
        completion_percent: completion_percent(input.approved_count, input.required_count),
        status_color: status_color(&input, now, policy),
        overdue_days: overdue_days(row.planned_due_date, now),
        due_in_days: due_in_days(row.planned_due_date, now),
        row,
    }
}

pub fn derive_all(
    rows: Vec<DocProgressRow>,
    now: DateTime<Utc>,
    policy: &StatusPolicy,
) -> Vec<DocProgress> {
    rows.into_iter().map(|r| derive(r, now, policy)).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use uuid::Uuid;

    pub(crate) fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    pub(crate) fn row(
        required: i32,
        approved: i64,
        due: Option<NaiveDate>,
        critical: bool,
    ) -> DocProgressRow {
        DocProgressRow {
            contractor_id: Uuid::nil(),
            contractor_name: "An Phát".into(),
            doc_type_id: Uuid::nil(),
            doc_code: "HSE-01".into(),
            doc_name: "Kế hoạch an toàn".into(),
            category: Some("Kế hoạch".into()),
            is_critical: critical,
            weight: Decimal::ONE,
            required_count: required,
            approved_count: approved,
            submitted_count: 0,
            first_submitted_at: None,
            first_approved_at: None,
            planned_due_date: due,
        }
    }

    fn input(required: i64, approved: i64, due: Option<NaiveDate>, critical: bool) -> StatusInput {
        StatusInput {
            required_count: required,
            approved_count: approved,
            planned_due_date: due,
            is_critical: critical,
        }
    }

    fn default_color(input: &StatusInput, now: DateTime<Utc>) -> StatusColor {
        status_color(input, now, &StatusPolicy::default())
    }

    #[test]
    fn overdue_critical_scenario() {
        let overdue = row(3, 1, Some(day(2024, 1, 1)), true);
        let derived = derive(overdue, at(2024, 1, 10), &StatusPolicy::default());

        assert_eq!(derived.overdue_days, Some(9));
        assert_eq!(derived.due_in_days, Some(-9));
        assert_eq!(derived.status_color, StatusColor::Red);
        assert_eq!(derived.completion_percent, 33);
    }

    #[test]
    fn zero_required_is_never_red() {
        let policy = StatusPolicy::default();
        let now = at(2024, 6, 1);
        for due in [None, Some(day(2020, 1, 1)), Some(day(2024, 6, 2)), Some(day(2030, 1, 1))] {
            for critical in [true, false] {
                for approved in [0, 1, 5] {
                    let color = status_color(&input(0, approved, due, critical), now, &policy);
                    assert_eq!(color, StatusColor::NotApplicable);
                }
            }
        }
    }

    #[test]
    fn complete_rows_are_green_even_when_late() {
        let now = at(2024, 6, 1);
        let late = input(2, 2, Some(day(2024, 1, 1)), true);
        assert_eq!(default_color(&late, now), StatusColor::Green);
        assert_eq!(default_color(&input(2, 5, None, false), now), StatusColor::Green);
    }

    #[test]
    fn overdue_non_critical_is_amber() {
        let color = default_color(&input(2, 0, Some(day(2024, 1, 1)), false), at(2024, 3, 1));
        assert_eq!(color, StatusColor::Amber);
    }

    #[test]
    fn amber_window_boundary() {
        let policy = StatusPolicy { amber_window_days: 7 };
        let now = at(2024, 1, 1);
        let in_seven = input(1, 0, Some(day(2024, 1, 8)), true);
        let in_eight = input(1, 0, Some(day(2024, 1, 9)), true);
        assert_eq!(status_color(&in_seven, now, &policy), StatusColor::Amber);
        assert_eq!(status_color(&in_eight, now, &policy), StatusColor::Neutral);

        let narrow = StatusPolicy { amber_window_days: 3 };
        assert_eq!(status_color(&in_seven, now, &narrow), StatusColor::Neutral);
    }

    #[test]
    fn due_today_is_amber_not_red() {
        let color = default_color(&input(1, 0, Some(day(2024, 1, 1)), true), at(2024, 1, 1));
        assert_eq!(color, StatusColor::Amber);
    }

    #[test]
    fn no_due_date_is_neutral() {
        let color = default_color(&input(4, 1, None, true), at(2024, 1, 1));
        assert_eq!(color, StatusColor::Neutral);
    }

    #[test]
    fn overdue_days_absent_for_future_or_missing_dates() {
        let now = at(2024, 1, 10);
        assert_eq!(overdue_days(None, now), None);
        assert_eq!(overdue_days(Some(day(2024, 1, 20)), now), None);
        assert_eq!(overdue_days(Some(day(2024, 1, 10)), now), None);
        assert_eq!(due_in_days(None, now), None);
    }

    #[test]
    fn partial_days_round_up() {
        let now = Utc.with_ymd_and_hms(2024, 1, 10, 6, 0, 0).unwrap();
        assert_eq!(overdue_days(Some(day(2024, 1, 1)), now), Some(10));
        assert_eq!(due_in_days(Some(day(2024, 1, 12)), now), Some(2));
        assert_eq!(due_in_days(Some(day(2024, 1, 9)), now), Some(-1));
    }

    #[test]
    fn completion_ratio_and_percent() {
        assert_eq!(completion_ratio(1, 0), 0.0);
        assert_eq!(completion_ratio(6, 3), 2.0);
        assert_eq!(completion_percent(6, 3), 100);
        assert_eq!(completion_percent(2, 3), 67);
        assert_eq!(completion_percent(0, 0), 0);
    }
}
