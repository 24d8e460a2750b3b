// src/services/suggestions.rs

use crate::models::dashboard::{DocProgress, StatusColor};

/// Overdue past this many days escalates to work suspension.
const ESCALATION_DAYS: i64 = 14;

const URGENT_MEETING: &str = "Tổ chức họp khẩn với nhà thầu";
const WARNING_EMAIL: &str = "Gửi email cảnh báo cho nhà thầu";
const SUSPEND_WORK: &str = "Xem xét tạm dừng hạng mục công việc liên quan";
const DAILY_FOLLOW_UP: &str = "Theo dõi tiến độ hằng ngày";
const REMINDER_EMAIL: &str = "Gửi email nhắc nhở hoàn thành hồ sơ trước hạn";
const SET_DUE_DATE: &str = "Thiết lập hạn nộp cho hồ sơ";
const PERIODIC_FOLLOW_UP: &str = "Theo dõi định kỳ";

/// Ordered, human-readable actions for one progress row.
pub fn suggest_actions(
    color: StatusColor,
    is_critical: bool,
    overdue_days: Option<i64>,
    due_in_days: Option<i64>,
) -> Vec<String> {
    let mut actions: Vec<&str> = Vec::new();

    match color {
        StatusColor::Green | StatusColor::NotApplicable => {}
        StatusColor::Red => {
            actions.push(URGENT_MEETING);
            actions.push(WARNING_EMAIL);
            if overdue_days.is_some_and(|d| d > ESCALATION_DAYS) {
                actions.push(SUSPEND_WORK);
            }
        }
        StatusColor::Amber => {
            if overdue_days.is_some() {
                actions.push(WARNING_EMAIL);
            } else {
                actions.push(REMINDER_EMAIL);
            }
            if is_critical {
                actions.push(DAILY_FOLLOW_UP);
            }
        }
        StatusColor::Neutral => {
            if due_in_days.is_none() {
                actions.push(SET_DUE_DATE);
            }
            actions.push(PERIODIC_FOLLOW_UP);
        }
    }

    actions.into_iter().map(String::from).collect()
}

pub fn suggest_for(progress: &DocProgress) -> Vec<String> {
    suggest_actions(
        progress.status_color,
        progress.row.is_critical,
        progress.overdue_days,
        progress.due_in_days,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn green_and_not_applicable_have_no_actions() {
        assert!(suggest_actions(StatusColor::Green, true, None, Some(3)).is_empty());
        assert!(suggest_actions(StatusColor::Green, false, Some(30), Some(-30)).is_empty());
        assert!(suggest_actions(StatusColor::NotApplicable, true, Some(5), Some(-5)).is_empty());
    }

    #[test]
    fn red_escalates_after_two_weeks() {
        let short = suggest_actions(StatusColor::Red, true, Some(9), Some(-9));
        assert_eq!(short, vec![URGENT_MEETING, WARNING_EMAIL]);

        let long = suggest_actions(StatusColor::Red, true, Some(15), Some(-15));
        assert_eq!(long, vec![URGENT_MEETING, WARNING_EMAIL, SUSPEND_WORK]);
    }

    #[test]
    fn amber_depends_on_criticality_and_lateness() {
        assert_eq!(
            suggest_actions(StatusColor::Amber, true, None, Some(2)),
            vec![REMINDER_EMAIL, DAILY_FOLLOW_UP]
        );
        assert_eq!(
            suggest_actions(StatusColor::Amber, false, None, Some(2)),
            vec![REMINDER_EMAIL]
        );
        assert_eq!(
            suggest_actions(StatusColor::Amber, false, Some(4), Some(-4)),
            vec![WARNING_EMAIL]
        );
    }

    #[test]
    fn neutral_without_due_date_asks_for_one() {
        assert_eq!(
            suggest_actions(StatusColor::Neutral, false, None, None),
            vec![SET_DUE_DATE, PERIODIC_FOLLOW_UP]
        );
        assert_eq!(
            suggest_actions(StatusColor::Neutral, true, None, Some(40)),
            vec![PERIODIC_FOLLOW_UP]
        );
    }
}
