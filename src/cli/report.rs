//! Read-only views: today and review.

use jiff::civil::Date;
use uuid::Uuid;

use cadence::dashboard::{daily_dashboard, log_range};
use cadence::model::{ActionLogIndex, Outcome, OutcomeStatus, Output, OutputStatus};
use cadence::review::weekly_review;
use cadence::storage::Storage;
use cadence::week::WeekWindow;

use super::format::{format_dashboard, format_review};

/// Active outcomes and their active outputs.
fn load_active(storage: &Storage) -> Result<(Vec<Outcome>, Vec<Output>), String> {
    let outcomes = storage
        .list_outcomes(Some(OutcomeStatus::Active))
        .map_err(|e| format!("failed to list outcomes: {e}"))?;
    let ids: Vec<Uuid> = outcomes.iter().map(|o| o.id).collect();
    let outputs = storage
        .list_outputs(Some(&ids), Some(OutputStatus::Active))
        .map_err(|e| format!("failed to list outputs: {e}"))?;
    Ok((outcomes, outputs))
}

pub(super) fn cmd_today(storage: &Storage, date: Date) -> Result<(), String> {
    let settings = storage
        .load_settings()
        .map_err(|e| format!("failed to load settings: {e}"))?;
    let (outcomes, outputs) = load_active(storage)?;

    let ids: Vec<Uuid> = outputs.iter().map(|o| o.id).collect();
    let (from, to) = log_range(date, settings.week_start);
    let logs: ActionLogIndex = storage
        .load_action_logs(&ids, from, to)
        .map_err(|e| format!("failed to load logs: {e}"))?
        .into_iter()
        .collect();

    let dash = daily_dashboard(date, settings.week_start, &outcomes, &outputs, &logs);
    println!("{}", format_dashboard(&dash));
    Ok(())
}

pub(super) fn cmd_review(storage: &Storage, date: Date) -> Result<(), String> {
    let settings = storage
        .load_settings()
        .map_err(|e| format!("failed to load settings: {e}"))?;
    let (outcomes, outputs) = load_active(storage)?;

    let week = WeekWindow::containing(date, settings.week_start);
    let ids: Vec<Uuid> = outputs.iter().map(|o| o.id).collect();
    let logs = storage
        .action_log_index(&ids, week)
        .map_err(|e| format!("failed to load logs: {e}"))?;
    let tags = storage
        .load_shortfall_tags(&ids, week)
        .map_err(|e| format!("failed to load tags: {e}"))?;
    let reflections = storage
        .load_reflections(week.start)
        .map_err(|e| format!("failed to load reflections: {e}"))?;

    let outcome_ids: Vec<Uuid> = outcomes.iter().map(|o| o.id).collect();
    let skills = storage
        .list_skills(Some(&outcome_ids), false)
        .map_err(|e| format!("failed to list skills: {e}"))?;
    let skill_ids: Vec<Uuid> = skills.iter().map(|s| s.id).collect();
    let skill_logs = storage
        .load_skill_logs(&skill_ids, Some(week.end))
        .map_err(|e| format!("failed to load skill ratings: {e}"))?;

    let review = weekly_review(
        date,
        settings.week_start,
        &outcomes,
        &outputs,
        &logs,
        &tags,
        &reflections,
    )
    .with_skills(&skills, &skill_logs);
    println!("{}", format_review(&review));
    Ok(())
}
