//! Completion accounting: turning raw records into statuses and rates.
//!
//! Everything here is a pure reducer over outputs, dates, and an
//! [`ActionLogIndex`]. The caller is responsible for only supplying records
//! that fall inside the week being evaluated.

use std::fmt;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use crate::model::{ActionLog, ActionLogIndex, Frequency, Output};
use crate::schedule::is_scheduled;

/// Color-coded status of one day or one week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatus {
    /// Not applicable: nothing was due.
    Grey,
    /// Due, nothing done.
    Red,
    /// Due, partially done.
    Yellow,
    /// Due, fully done.
    Green,
}

impl DayStatus {
    /// Whether this status needs a shortfall explanation.
    pub fn is_shortfall(self) -> bool {
        matches!(self, Self::Red | Self::Yellow)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Grey => "grey",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Green => "green",
        }
    }
}

impl fmt::Display for DayStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one output on one day.
///
/// A record with `total == 0` but `completed > 0` is yellow: progress was
/// made against a target that was never stated.
pub fn day_status(output: &Output, date: Date, log: Option<&ActionLog>) -> DayStatus {
    if !is_scheduled(&output.frequency, date) {
        return DayStatus::Grey;
    }
    match log {
        None => DayStatus::Red,
        Some(log) if log.completed == 0 => DayStatus::Red,
        Some(log) if log.total > 0 && log.completed >= log.total => DayStatus::Green,
        Some(_) => DayStatus::Yellow,
    }
}

/// Week-level tally for a flexible weekly output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekSummary {
    pub status: DayStatus,
    pub completed: u32,
    pub target: u32,
}

/// Sums a week's completions against the output's frequency value.
///
/// Only meaningful for flexible weekly outputs.
pub fn week_summary(output: &Output, days: &[Date; 7], logs: &ActionLogIndex) -> WeekSummary {
    let completed = days
        .iter()
        .filter_map(|day| logs.get(output.id, *day))
        .map(|log| log.completed)
        .fold(0_u32, u32::saturating_add);
    let target = u32::from(output.frequency.value());

    let status = if completed >= target {
        DayStatus::Green
    } else if completed > 0 {
        DayStatus::Yellow
    } else {
        DayStatus::Red
    };

    WeekSummary {
        status,
        completed,
        target,
    }
}

/// Completion percentage (0..=100) across all outputs of one outcome.
///
/// Flexible outputs contribute one capped unit total against their target;
/// daily and fixed outputs contribute one unit per scheduled day, with
/// partial days counted fractionally. No scheduled work means 0%.
pub fn outcome_completion_rate<'a>(
    outputs: impl IntoIterator<Item = &'a Output>,
    days: &[Date; 7],
    logs: &ActionLogIndex,
) -> u8 {
    let mut completed_units = 0.0_f64;
    let mut target_units = 0_u32;

    for output in outputs {
        match output.frequency {
            Frequency::FlexibleWeekly { .. } => {
                let summary = week_summary(output, days, logs);
                completed_units += f64::from(summary.completed.min(summary.target));
                target_units += summary.target;
            }
            Frequency::Daily | Frequency::FixedWeekly { .. } => {
                for day in days {
                    if !is_scheduled(&output.frequency, *day) {
                        continue;
                    }
                    target_units += 1;
                    completed_units += logs
                        .get(output.id, *day)
                        .map_or(0.0, day_fraction);
                }
            }
        }
    }

    percent(completed_units, target_units)
}

/// Fraction of a day's target that was met, capped at 1.
fn day_fraction(log: &ActionLog) -> f64 {
    if log.completed == 0 || log.total == 0 {
        return 0.0;
    }
    (f64::from(log.completed) / f64::from(log.total)).min(1.0)
}

/// `round(100 * done / target)`, or 0 when there is no target.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent(done: f64, target: u32) -> u8 {
    if target == 0 {
        return 0;
    }
    // `done <= target`, so the result is within 0..=100.
    (100.0 * done / f64::from(target)).round().clamp(0.0, 100.0) as u8
}

/// Dashboard progress of one output over a week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyProgress {
    pub completed: u32,
    pub target: u32,
    pub rate: u8,
    pub target_met: bool,
}

/// Progress of one output over a week.
///
/// Flexible outputs count completions against their weekly target; daily
/// and fixed outputs count fully completed (green) days against scheduled
/// days.
pub fn weekly_progress(output: &Output, days: &[Date; 7], logs: &ActionLogIndex) -> WeeklyProgress {
    let (completed, target) = match output.frequency {
        Frequency::FlexibleWeekly { .. } => {
            let summary = week_summary(output, days, logs);
            (summary.completed, summary.target)
        }
        Frequency::Daily | Frequency::FixedWeekly { .. } => {
            let mut completed = 0;
            let mut target = 0;
            for day in days {
                match day_status(output, *day, logs.get(output.id, *day)) {
                    DayStatus::Grey => {}
                    DayStatus::Green => {
                        completed += 1;
                        target += 1;
                    }
                    DayStatus::Red | DayStatus::Yellow => target += 1,
                }
            }
            (completed, target)
        }
    };

    WeeklyProgress {
        completed,
        target,
        rate: percent(f64::from(completed.min(target)), target),
        target_met: target > 0 && completed >= target,
    }
}
