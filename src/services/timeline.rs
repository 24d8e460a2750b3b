// src/services/timeline.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    dashboard::{DocProgressRow, ProcessingReport, ProcessingStats},
    submission::{Submission, SubmissionEvent, TimelineEvent, TimelineEventKind},
};

const UNCATEGORIZED: &str = "Khác";

/// Fractional days between submission and approval; `None` if either is
/// missing or the approval predates the submission.
pub fn processing_days(
    submitted: Option<DateTime<Utc>>,
    approved: Option<DateTime<Utc>>,
) -> Option<f64> {
    let (s, a) = (submitted?, approved?);
    let secs = (a - s).num_seconds();
    (secs >= 0).then(|| secs as f64 / 86_400.0)
}

// Linear interpolation between closest ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (rank - lo as f64)
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub fn stats(durations: &[f64]) -> Option<ProcessingStats> {
    if durations.is_empty() {
        return None;
    }
    let mut sorted = durations.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mean = sorted.iter().sum::<f64>() / sorted.len() as f64;

    Some(ProcessingStats {
        count: sorted.len(),
        mean_days: round2(mean),
        median_days: round2(percentile(&sorted, 0.5)),
        p90_days: round2(percentile(&sorted, 0.9)),
        min_days: round2(sorted[0]),
        max_days: round2(sorted[sorted.len() - 1]),
    })
}

/// Processing time per progress row, overall and grouped by doc category.
pub fn processing_report(rows: &[DocProgressRow]) -> ProcessingReport {
    let mut all = Vec::new();
    let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for row in rows {
        if let Some(days) = processing_days(row.first_submitted_at, row.first_approved_at) {
            all.push(days);
            let category = row.category.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());
            grouped.entry(category).or_default().push(days);
        }
    }

    ProcessingReport {
        overall: stats(&all),
        by_category: grouped
            .into_iter()
            .filter_map(|(category, durations)| stats(&durations).map(|s| (category, s)))
            .collect(),
    }
}

/// Creation of each submission plus its recorded workflow steps, oldest first.
pub fn build_timeline(
    submissions: &[Submission],
    events: &[SubmissionEvent],
) -> Vec<TimelineEvent> {
    let cnt_of: HashMap<Uuid, i32> = submissions.iter().map(|s| (s.id, s.cnt)).collect();

    let created = submissions.iter().map(|s| TimelineEvent {
        submission_id: s.id,
        kind: TimelineEventKind::Created,
        at: s.created_at,
        cnt: s.cnt,
        note: s.note.clone(),
    });
    let steps = events.iter().filter_map(|e| {
        let cnt = *cnt_of.get(&e.submission_id)?;
        Some(TimelineEvent {
            submission_id: e.submission_id,
            kind: e.kind.into(),
            at: e.occurred_at,
            cnt,
            note: e.note.clone(),
        })
    });

    let mut timeline: Vec<TimelineEvent> = created.chain(steps).collect();
    // stable: same-instant events keep their lifecycle order
    timeline.sort_by_key(|e| e.at);
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::submission::{SubmissionEventKind, SubmissionStatus},
        services::status::tests::{at, row},
    };
    use chrono::Duration;

    fn submission(created: DateTime<Utc>) -> Submission {
        Submission {
            id: Uuid::new_v4(),
            contractor_id: Uuid::nil(),
            doc_type_id: Uuid::nil(),
            status: SubmissionStatus::Prepared,
            cnt: 1,
            note: None,
            review_note: None,
            reviewed_by: None,
            created_at: created,
            submitted_at: None,
            approved_at: None,
            updated_at: created,
        }
    }

    fn event(
        submission: &Submission,
        kind: SubmissionEventKind,
        occurred_at: DateTime<Utc>,
        note: Option<&str>,
    ) -> SubmissionEvent {
        SubmissionEvent {
            submission_id: submission.id,
            kind,
            actor: None,
            note: note.map(str::to_string),
            occurred_at,
        }
    }

    #[test]
    fn processing_days_requires_both_ends_in_order() {
        let s = at(2024, 1, 1);
        assert_eq!(processing_days(Some(s), Some(s + Duration::hours(36))), Some(1.5));
        assert_eq!(processing_days(None, Some(s)), None);
        assert_eq!(processing_days(Some(s), None), None);
        assert_eq!(processing_days(Some(s), Some(s - Duration::days(1))), None);
    }

    #[test]
    fn stats_over_known_distribution() {
        let st = stats(&[4.0, 1.0, 3.0, 2.0, 10.0]).unwrap();
        assert_eq!(st.count, 5);
        assert_eq!(st.mean_days, 4.0);
        assert_eq!(st.median_days, 3.0);
        assert_eq!(st.min_days, 1.0);
        assert_eq!(st.max_days, 10.0);
        assert_eq!(st.p90_days, 7.6);

        assert!(stats(&[]).is_none());
        assert_eq!(stats(&[2.5]).unwrap().p90_days, 2.5);
    }

    #[test]
    fn report_groups_by_category() {
        let mut a = row(1, 1, None, true);
        a.first_submitted_at = Some(at(2024, 1, 1));
        a.first_approved_at = Some(at(2024, 1, 3));

        let mut b = row(1, 1, None, false);
        b.category = None;
        b.first_submitted_at = Some(at(2024, 1, 1));
        b.first_approved_at = Some(at(2024, 1, 5));

        let pending = row(1, 0, None, false);

        let report = processing_report(&[a, b, pending]);
        assert_eq!(report.overall.as_ref().unwrap().count, 2);
        assert_eq!(report.overall.as_ref().unwrap().mean_days, 3.0);
        assert_eq!(report.by_category["Kế hoạch"].count, 1);
        assert_eq!(report.by_category[UNCATEGORIZED].max_days, 4.0);
    }

    #[test]
    fn timeline_is_chronological() {
        let first = submission(at(2024, 1, 1));
        let second = submission(at(2024, 1, 3));

        let events = vec![
            event(&first, SubmissionEventKind::Submitted, at(2024, 1, 2), None),
            event(&second, SubmissionEventKind::Submitted, at(2024, 1, 3), None),
            event(&second, SubmissionEventKind::Revision, at(2024, 1, 4), Some("Thiếu chữ ký")),
            event(&first, SubmissionEventKind::Approved, at(2024, 1, 5), None),
        ];

        let timeline = build_timeline(&[first, second], &events);
        let kinds: Vec<_> = timeline.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TimelineEventKind::Created,
                TimelineEventKind::Submitted,
                TimelineEventKind::Created,
                TimelineEventKind::Submitted,
                TimelineEventKind::Revision,
                TimelineEventKind::Approved,
            ]
        );
        assert_eq!(timeline[4].note.as_deref(), Some("Thiếu chữ ký"));
    }

    #[test]
    fn resubmitted_row_keeps_every_step() {
        let mut s = submission(at(2024, 1, 1));
        s.note = Some("Bản scan lần 1".into());

        let events = vec![
            event(&s, SubmissionEventKind::Submitted, at(2024, 1, 1), None),
            event(&s, SubmissionEventKind::Revision, at(2024, 1, 5), Some("Thiếu trang 2")),
            event(&s, SubmissionEventKind::Submitted, at(2024, 1, 20), None),
            event(&s, SubmissionEventKind::Approved, at(2024, 1, 21), None),
        ];

        let timeline = build_timeline(std::slice::from_ref(&s), &events);
        let kinds: Vec<_> = timeline.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TimelineEventKind::Created,
                TimelineEventKind::Submitted,
                TimelineEventKind::Revision,
                TimelineEventKind::Submitted,
                TimelineEventKind::Approved,
            ]
        );
        // the contractor's note stays on creation, the reviewer's on the revision
        assert_eq!(timeline[0].note.as_deref(), Some("Bản scan lần 1"));
        assert_eq!(timeline[1].note, None);
        assert_eq!(timeline[2].note.as_deref(), Some("Thiếu trang 2"));
    }

    #[test]
    fn events_of_unknown_submissions_are_dropped() {
        let s = submission(at(2024, 1, 1));
        let stray = submission(at(2024, 1, 1));
        let events = vec![event(&stray, SubmissionEventKind::Submitted, at(2024, 1, 2), None)];

        let timeline = build_timeline(&[s], &events);
        assert_eq!(timeline.len(), 1);
        assert_eq!(timeline[0].kind, TimelineEventKind::Created);
    }
}
