//! Daily dashboard: what is due today and how each output's week is going.

use jiff::ToSpan;
use jiff::civil::Date;
use serde::Serialize;

use crate::accounting::{DayStatus, WeeklyProgress, day_status, weekly_progress};
use crate::model::{ActionLog, ActionLogIndex, Frequency, Outcome, OutcomeStatus, Output, OutputStatus};
use crate::schedule::is_scheduled;
use crate::week::{WeekStart, WeekWindow};

#[derive(Debug, Clone, Serialize)]
pub struct DailyDashboard {
    pub date: Date,
    pub week: WeekWindow,
    pub outcomes: Vec<OutcomeDay>,
    /// Daily and fixed outputs that were due yesterday and got nothing.
    pub missed_yesterday_count: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeDay {
    pub outcome: Outcome,
    pub outputs: Vec<OutputDay>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputDay {
    pub output: Output,
    /// Always false for flexible outputs, which can still be logged any day.
    pub scheduled_today: bool,
    pub today_log: Option<ActionLog>,
    pub progress: WeeklyProgress,
}

/// The date range whose records [`daily_dashboard`] reads: the week
/// containing `date`, extended back to include yesterday.
pub fn log_range(date: Date, week_start: WeekStart) -> (Date, Date) {
    let week = WeekWindow::containing(date, week_start);
    (week.start.min(yesterday(date)), week.end)
}

/// Builds the dashboard for `date`.
///
/// Only active outcomes and their active outputs appear, in the order
/// given. `logs` should cover [`log_range`].
pub fn daily_dashboard(
    date: Date,
    week_start: WeekStart,
    outcomes: &[Outcome],
    outputs: &[Output],
    logs: &ActionLogIndex,
) -> DailyDashboard {
    let week = WeekWindow::containing(date, week_start);
    let days = week.days();
    let yesterday = yesterday(date);

    let mut missed_yesterday_count = 0;
    let outcomes = outcomes
        .iter()
        .filter(|outcome| outcome.status == OutcomeStatus::Active)
        .map(|outcome| {
            let outputs = outputs
                .iter()
                .filter(|o| o.outcome_id == outcome.id && o.status == OutputStatus::Active)
                .map(|output| {
                    if missed(output, yesterday, logs) {
                        missed_yesterday_count += 1;
                    }
                    OutputDay {
                        output: output.clone(),
                        scheduled_today: is_scheduled(&output.frequency, date),
                        today_log: logs.get(output.id, date).cloned(),
                        progress: weekly_progress(output, &days, logs),
                    }
                })
                .collect();
            OutcomeDay {
                outcome: outcome.clone(),
                outputs,
            }
        })
        .collect();

    DailyDashboard {
        date,
        week,
        outcomes,
        missed_yesterday_count,
    }
}

fn missed(output: &Output, day: Date, logs: &ActionLogIndex) -> bool {
    match output.frequency {
        Frequency::FlexibleWeekly { .. } => false,
        Frequency::Daily | Frequency::FixedWeekly { .. } => {
            day_status(output, day, logs.get(output.id, day)) == DayStatus::Red
        }
    }
}

fn yesterday(date: Date) -> Date {
    date.saturating_sub(1.day())
}
