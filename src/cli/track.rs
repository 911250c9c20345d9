//! Recording commands: log, tag, reflect.

use jiff::civil::Date;
use uuid::Uuid;

use cadence::model::{
    ActionLog, Frequency, Reflection, ReflectionResponses, ShortfallAnchor, ShortfallReason,
    ShortfallTag,
};
use cadence::shortfall::{day_label, shortfalls_for};
use cadence::storage::Storage;
use cadence::week::WeekWindow;

use super::format::short_id;
use super::skill::{RatingArg, rating_drafts, report_graduations};
use super::{resolve_outcome, resolve_output};

pub(super) fn cmd_log(
    storage: &Storage,
    output_ref: &str,
    date: Date,
    completed: i64,
    total: i64,
    notes: &str,
    ratings: &[RatingArg],
) -> Result<(), String> {
    let output = resolve_output(storage, output_ref)?;
    let log = ActionLog::new(output.id, date, completed, total, notes);
    if log.completed == 0 && !ratings.is_empty() {
        return Err("skill ratings need at least one completed unit".to_string());
    }
    let drafts = rating_drafts(storage, ratings)?;
    storage
        .upsert_action_log(&log)
        .map_err(|e| format!("failed to log: {e}"))?;

    eprintln!(
        "Logged {}/{} for {} on {}",
        log.completed,
        log.total,
        short_id(output.id),
        day_label(date)
    );

    if !drafts.is_empty() {
        let created = storage
            .replace_skill_logs(output.id, date, &drafts)
            .map_err(|e| format!("failed to save skill ratings: {e}"))?;
        eprintln!("Rated {} skill(s), {} new", drafts.len(), created.len());
        let rated: Vec<Uuid> = drafts.iter().map(|d| d.skill_id).collect();
        report_graduations(storage, &rated)?;
    }
    Ok(())
}

pub(super) fn cmd_tag(
    storage: &Storage,
    output_ref: &str,
    date: Date,
    reason: ShortfallReason,
    note: &str,
) -> Result<(), String> {
    let output = resolve_output(storage, output_ref)?;
    let settings = storage
        .load_settings()
        .map_err(|e| format!("failed to load settings: {e}"))?;
    let week = WeekWindow::containing(date, settings.week_start);
    let logs = storage
        .action_log_index(&[output.id], week)
        .map_err(|e| format!("failed to load logs: {e}"))?;

    let anchor = match output.frequency {
        Frequency::FlexibleWeekly { .. } => ShortfallAnchor::Week(week.start),
        Frequency::Daily | Frequency::FixedWeekly { .. } => ShortfallAnchor::Occurrence(date),
    };
    let candidate = shortfalls_for(&output, &week.days(), &logs, week.start)
        .into_iter()
        .find(|c| c.anchor == anchor)
        .ok_or_else(|| match anchor {
            ShortfallAnchor::Week(start) => format!("no weekly shortfall for the week of {start}"),
            ShortfallAnchor::Occurrence(day) => {
                format!("no shortfall on {}: nothing was missed", day_label(day))
            }
        })?;

    let tag = ShortfallTag::new(output.id, anchor, reason, note).map_err(|e| e.to_string())?;
    storage
        .save_shortfall_tag(&tag)
        .map_err(|e| format!("failed to save tag: {e}"))?;

    eprintln!("Tagged {}: {reason}", candidate.label);
    Ok(())
}

pub(super) fn cmd_reflect(
    storage: &Storage,
    outcome_ref: &str,
    date: Date,
    worked: &str,
    didnt: &str,
    change: &str,
) -> Result<(), String> {
    let outcome = resolve_outcome(storage, outcome_ref)?;
    let settings = storage
        .load_settings()
        .map_err(|e| format!("failed to load settings: {e}"))?;
    let week = WeekWindow::containing(date, settings.week_start);

    let responses = ReflectionResponses {
        what_worked: worked.trim().to_string(),
        what_didnt: didnt.trim().to_string(),
        what_to_change: change.trim().to_string(),
    };
    if responses == ReflectionResponses::default() {
        return Err("pass at least one of --worked, --didnt, --change".to_string());
    }

    let reflection = Reflection {
        id: Uuid::new_v4(),
        outcome_id: outcome.id,
        week_start: week.start,
        responses,
    };
    storage
        .save_reflection(&reflection)
        .map_err(|e| format!("failed to save reflection: {e}"))?;

    eprintln!("Reflection saved for {} ({week})", outcome.title);
    Ok(())
}
