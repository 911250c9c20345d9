//! Shortfall detection: which occurrences of a week need a reason.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounting::{DayStatus, day_status, week_summary};
use crate::model::{ActionLogIndex, Frequency, Output, ShortfallAnchor};

/// An occurrence (or flexible week) that fell short and may be tagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortfallCandidate {
    pub output_id: Uuid,
    pub anchor: ShortfallAnchor,
    pub status: DayStatus,
    /// Display label, e.g. `Wed 2/25 (red)` or `Weekly target shortfall (1/3)`.
    pub label: String,
}

/// Shortfall candidates for one output over one week.
///
/// Flexible outputs yield at most one week-level candidate keyed by
/// `week_start`; daily and fixed outputs yield one candidate per red or
/// yellow day. Grey days never yield a candidate.
pub fn shortfalls_for(
    output: &Output,
    days: &[Date; 7],
    logs: &ActionLogIndex,
    week_start: Date,
) -> Vec<ShortfallCandidate> {
    match output.frequency {
        Frequency::FlexibleWeekly { .. } => {
            let summary = week_summary(output, days, logs);
            if summary.status == DayStatus::Green {
                return Vec::new();
            }
            vec![ShortfallCandidate {
                output_id: output.id,
                anchor: ShortfallAnchor::Week(week_start),
                status: summary.status,
                label: format!(
                    "Weekly target shortfall ({}/{})",
                    summary.completed, summary.target
                ),
            }]
        }
        Frequency::Daily | Frequency::FixedWeekly { .. } => days
            .iter()
            .filter_map(|day| {
                let status = day_status(output, *day, logs.get(output.id, *day));
                status.is_shortfall().then(|| ShortfallCandidate {
                    output_id: output.id,
                    anchor: ShortfallAnchor::Occurrence(*day),
                    status,
                    label: format!("{} ({status})", day_label(*day)),
                })
            })
            .collect(),
    }
}

/// Short day label: `Mon 2/23`.
pub fn day_label(day: Date) -> String {
    format!("{} {}/{}", day.strftime("%a"), day.month(), day.day())
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use jiff::civil::date;

    use crate::model::{ActionLog, OutputStatus};
    use crate::week::{WeekStart, WeekWindow};

    fn output(frequency: Frequency) -> Output {
        Output {
            id: Uuid::new_v4(),
            outcome_id: Uuid::nil(),
            description: "Practice".into(),
            frequency,
            is_starter: false,
            status: OutputStatus::Active,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn fixed_schedule_only_considers_scheduled_days_in_window() {
        // Anchored on Thursday 2026-02-26 with Monday weeks.
        let window = WeekWindow::containing(date(2026, 2, 26), WeekStart::Monday);
        assert_eq!(window.start, date(2026, 2, 23));
        assert_eq!(window.end, date(2026, 3, 1));

        let mwf = output(Frequency::FixedWeekly {
            weekdays: vec![1, 3, 5],
        });
        let days = window.days();
        let logs: ActionLogIndex = [ActionLog::new(mwf.id, date(2026, 2, 25), 1, 2, "")]
            .into_iter()
            .collect();

        let candidates = shortfalls_for(&mwf, &days, &logs, window.start);
        let anchors: Vec<_> = candidates.iter().map(|c| c.anchor).collect();
        assert_eq!(
            anchors,
            vec![
                ShortfallAnchor::Occurrence(date(2026, 2, 23)),
                ShortfallAnchor::Occurrence(date(2026, 2, 25)),
                ShortfallAnchor::Occurrence(date(2026, 2, 27)),
            ]
        );
        assert_eq!(candidates[0].label, "Mon 2/23 (red)");
        assert_eq!(candidates[1].label, "Wed 2/25 (yellow)");
        assert_eq!(candidates[1].status, DayStatus::Yellow);
    }

    #[test]
    fn completed_days_are_not_candidates() {
        let daily = output(Frequency::Daily);
        let window = WeekWindow::containing(date(2026, 2, 23), WeekStart::Monday);
        let logs: ActionLogIndex = window
            .days()
            .iter()
            .map(|d| ActionLog::new(daily.id, *d, 1, 1, ""))
            .collect();

        assert!(shortfalls_for(&daily, &window.days(), &logs, window.start).is_empty());
    }

    #[test]
    fn flexible_short_week_yields_one_week_candidate() {
        let flex = output(Frequency::FlexibleWeekly { times: 3 });
        let window = WeekWindow::containing(date(2026, 2, 23), WeekStart::Monday);
        let logs: ActionLogIndex = [ActionLog::new(flex.id, date(2026, 2, 24), 1, 1, "")]
            .into_iter()
            .collect();

        let candidates = shortfalls_for(&flex, &window.days(), &logs, window.start);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].anchor, ShortfallAnchor::Week(window.start));
        assert_eq!(candidates[0].label, "Weekly target shortfall (1/3)");
    }

    #[test]
    fn flexible_met_week_yields_nothing() {
        let flex = output(Frequency::FlexibleWeekly { times: 1 });
        let window = WeekWindow::containing(date(2026, 2, 23), WeekStart::Monday);
        let logs: ActionLogIndex = [ActionLog::new(flex.id, date(2026, 2, 24), 1, 1, "")]
            .into_iter()
            .collect();

        assert!(shortfalls_for(&flex, &window.days(), &logs, window.start).is_empty());
    }
}
