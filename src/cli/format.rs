//! Output formatting for CLI display.

use uuid::Uuid;

use cadence::accounting::{DayStatus, WeeklyProgress};
use cadence::dashboard::DailyDashboard;
use cadence::metric::MetricTrend;
use cadence::model::{
    Frequency, FrequencyDraft, Metric, MetricEntry, Outcome, Reflection, SkillItem, SkillLog,
    SkillTarget,
};
use cadence::review::{OutputReview, OutputWeek, WeeklyReview};
use cadence::skill::SkillSummary;

/// First 8 characters of an ID, enough to use as a prefix reference.
pub(super) fn short_id(id: Uuid) -> String {
    id.to_string()[..8].to_string()
}

pub(super) fn format_frequency_draft(draft: &FrequencyDraft) -> String {
    Frequency::from_draft(draft).map_or_else(|e| format!("invalid ({e})"), |f| f.to_string())
}

/// One-character day marker: `#` green, `+` yellow, `x` red, `.` grey.
pub(super) fn status_mark(status: DayStatus) -> char {
    match status {
        DayStatus::Green => '#',
        DayStatus::Yellow => '+',
        DayStatus::Red => 'x',
        DayStatus::Grey => '.',
    }
}

pub(super) fn format_progress(progress: &WeeklyProgress) -> String {
    let met = if progress.target_met { "  met" } else { "" };
    format!(
        "{}/{} ({}%){met}",
        progress.completed, progress.target, progress.rate
    )
}

fn outcome_heading(outcome: &Outcome) -> String {
    match &outcome.category {
        Some(c) => format!("{} ({c})", outcome.title),
        None => outcome.title.clone(),
    }
}

pub(super) fn format_dashboard(dash: &DailyDashboard) -> String {
    let mut lines = vec![format!(
        "{} {}  (week {})",
        dash.date.strftime("%A"),
        dash.date,
        dash.week
    )];
    if dash.missed_yesterday_count > 0 {
        lines.push(format!("Missed yesterday: {}", dash.missed_yesterday_count));
    }
    if dash.outcomes.is_empty() {
        lines.push("No active outcomes".to_string());
    }

    for outcome in &dash.outcomes {
        lines.push(String::new());
        lines.push(outcome_heading(&outcome.outcome));
        if outcome.outputs.is_empty() {
            lines.push("  (no active outputs)".to_string());
        }
        for day in &outcome.outputs {
            let due = match day.output.frequency {
                Frequency::FlexibleWeekly { .. } => "any day",
                _ if day.scheduled_today => "due today",
                _ => "not due",
            };
            let logged = day
                .today_log
                .as_ref()
                .map_or_else(|| "not logged".to_string(), |l| format!("logged {}/{}", l.completed, l.total));
            lines.push(format!(
                "  {}  {}  [{}]  {due}  {logged}  week {}",
                short_id(day.output.id),
                day.output.description,
                day.output.frequency,
                format_progress(&day.progress),
            ));
        }
    }

    lines.join("\n")
}

pub(super) fn format_review(review: &WeeklyReview) -> String {
    let mut lines = vec![format!("Week {}", review.week)];
    if review.outcomes.is_empty() {
        lines.push("No active outcomes".to_string());
    }
    let header: String = review
        .week
        .days()
        .iter()
        .map(|d| d.strftime("%a").to_string()[..2].to_string())
        .collect::<Vec<_>>()
        .join(" ");

    for outcome in &review.outcomes {
        lines.push(String::new());
        lines.push(format!(
            "{}  {}%",
            outcome_heading(&outcome.outcome),
            outcome.completion_rate
        ));
        for output in &outcome.outputs {
            format_output_review(output, &header, &mut lines);
        }
        if let Some(skills) = format_skill_summary(&outcome.skills) {
            lines.push(format!("  {skills}"));
        }
        match &outcome.reflection {
            Some(reflection) => format_reflection(reflection, &mut lines),
            None => lines.push("  Reflection: not yet written".to_string()),
        }
    }

    lines.join("\n")
}

fn format_output_review(output: &OutputReview, header: &str, lines: &mut Vec<String>) {
    lines.push(format!(
        "  {}  {}  [{}]",
        short_id(output.output.id),
        output.output.description,
        output.output.frequency
    ));
    match output.week {
        OutputWeek::Days { statuses } => {
            let marks: Vec<String> = statuses
                .iter()
                .map(|s| format!("{} ", status_mark(*s)))
                .collect();
            lines.push(format!("    {header}"));
            lines.push(format!("    {}", marks.join(" ").trim_end()));
        }
        OutputWeek::Flexible { summary } => {
            lines.push(format!(
                "    {}/{} this week ({})",
                summary.completed, summary.target, summary.status
            ));
        }
    }
    for shortfall in &output.shortfalls {
        let reason = shortfall.tag.as_ref().map_or_else(
            || "untagged".to_string(),
            |t| match &t.other_text {
                Some(text) => format!("{}: {text}", t.reason),
                None => t.reason.to_string(),
            },
        );
        lines.push(format!("    {}  {reason}", shortfall.candidate.label));
    }
    for tag in &output.stale_tags {
        lines.push(format!("    (earlier tag kept: {})", tag.reason));
    }
}

fn format_skill_summary(summary: &SkillSummary) -> Option<String> {
    let delta = summary.average_confidence_delta?;
    Some(format!(
        "Skills: {} worked, confidence {delta:+.1} on average",
        summary.skills_worked_count
    ))
}

/// One block character per value, scaled between the lowest and highest.
pub(super) fn sparkline(values: &[f64]) -> String {
    const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    values
        .iter()
        .map(|v| {
            if hi <= lo {
                return BARS[3];
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let step = (((v - lo) / (hi - lo)) * 7.0).round() as usize;
            BARS[step.min(7)]
        })
        .collect()
}

fn with_unit(value: f64, unit: &str) -> String {
    if unit.is_empty() {
        format!("{value}")
    } else {
        format!("{value} {unit}")
    }
}

pub(super) fn format_metric_entries(
    metric: &Metric,
    entries: &[MetricEntry],
    trend: Option<&MetricTrend>,
) -> String {
    let primary = if metric.is_primary { "  (primary)" } else { "" };
    let mut lines = vec![format!("{}{primary}", metric.name)];
    let Some(trend) = trend else {
        lines.push("  No entries".to_string());
        return lines.join("\n");
    };

    for entry in entries {
        lines.push(format!("  {}  {}", entry.date, with_unit(entry.value, &metric.unit)));
    }
    let values: Vec<f64> = entries.iter().map(|e| e.value).collect();
    lines.push(String::new());
    lines.push(format!("  {}", sparkline(&values)));
    lines.push(format!(
        "  {} -> {} ({:+}) over {} entries, range {} .. {}",
        trend.first,
        with_unit(trend.latest, &metric.unit),
        trend.change,
        trend.count,
        trend.min,
        trend.max,
    ));
    lines.join("\n")
}

fn format_target(target: &SkillTarget) -> String {
    match (&target.label, target.value) {
        (Some(label), Some(value)) => format!("  target {value} {label}"),
        (None, Some(value)) => format!("  target {value}"),
        (Some(label), None) => format!("  target: {label}"),
        (None, None) => String::new(),
    }
}

/// `logs` are newest first and may cover other skills.
pub(super) fn format_skill_line(skill: &SkillItem, logs: &[SkillLog], ready: bool) -> String {
    let latest = logs
        .iter()
        .find(|l| l.skill_id == skill.id)
        .map_or(skill.initial_confidence, |l| l.confidence);
    let ready = if ready { "  ready to graduate" } else { "" };
    format!(
        "{}  [{}]  {}  confidence {latest}/5{}{ready}",
        short_id(skill.id),
        skill.stage,
        skill.name,
        format_target(&skill.target),
    )
}

pub(super) fn format_skill_history(skill: &SkillItem, logs: &[SkillLog]) -> String {
    let mut lines = vec![format!(
        "{}  [{}]  started at {}/5{}",
        skill.name,
        skill.stage,
        skill.initial_confidence,
        format_target(&skill.target)
    )];
    if logs.is_empty() {
        lines.push("  No ratings yet".to_string());
    }
    for log in logs {
        let result = log
            .target_result
            .map(|r| format!("  result {r}"))
            .unwrap_or_default();
        lines.push(format!(
            "  {}  {}/5{result}  output {}",
            log.action_date,
            log.confidence,
            short_id(log.output_id)
        ));
    }
    lines.join("\n")
}

fn format_reflection(reflection: &Reflection, lines: &mut Vec<String>) {
    let r = &reflection.responses;
    lines.push("  Reflection:".to_string());
    for (label, answer) in [
        ("worked", &r.what_worked),
        ("didn't", &r.what_didnt),
        ("change", &r.what_to_change),
    ] {
        if !answer.is_empty() {
            lines.push(format!("    {label}: {answer}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use jiff::civil::date;

    use cadence::dashboard::daily_dashboard;
    use cadence::model::{ActionLog, ActionLogIndex, Output, OutputStatus};
    use cadence::review::weekly_review;
    use cadence::week::WeekStart;

    fn output(outcome: &Outcome, frequency: Frequency) -> Output {
        Output {
            id: Uuid::new_v4(),
            outcome_id: outcome.id,
            description: "Run".into(),
            frequency,
            is_starter: false,
            status: OutputStatus::Active,
            created_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn short_id_is_eight_chars() {
        let id = Uuid::parse_str("a3b0fc12-0000-4000-8000-000000000000").unwrap();
        assert_eq!(short_id(id), "a3b0fc12");
    }

    #[test]
    fn progress_marks_met_targets() {
        let progress = WeeklyProgress {
            completed: 3,
            target: 3,
            rate: 100,
            target_met: true,
        };
        assert_eq!(format_progress(&progress), "3/3 (100%)  met");
    }

    #[test]
    fn frequency_draft_is_shown_normalized() {
        assert_eq!(
            format_frequency_draft(&FrequencyDraft::fixed_weekly(vec![5, 1, 3])),
            "weekly on Mon/Wed/Fri"
        );
        assert_eq!(format_frequency_draft(&FrequencyDraft::flexible_weekly(3)), "3x/week");
    }

    #[test]
    fn dashboard_lists_outputs_under_outcomes() {
        let goal = Outcome::new("Get fit", Some("health"));
        let run = output(&goal, Frequency::Daily);
        let logs: ActionLogIndex = [ActionLog::new(run.id, date(2026, 2, 26), 1, 1, "")]
            .into_iter()
            .collect();
        let dash = daily_dashboard(date(2026, 2, 26), WeekStart::Monday, &[goal], &[run], &logs);

        let text = format_dashboard(&dash);
        assert!(text.starts_with("Thursday 2026-02-26  (week 2026-02-23 .. 2026-03-01)"));
        assert!(text.contains("Missed yesterday: 1"));
        assert!(text.contains("Get fit (health)"));
        assert!(text.contains("due today  logged 1/1  week 1/7 (14%)"));
    }

    #[test]
    fn review_shows_day_marks_and_untagged_shortfalls() {
        let goal = Outcome::new("Get fit", None);
        let run = output(&goal, Frequency::FixedWeekly { weekdays: vec![1, 3] });
        let logs: ActionLogIndex = [ActionLog::new(run.id, date(2026, 2, 23), 1, 1, "")]
            .into_iter()
            .collect();
        let review = weekly_review(date(2026, 2, 23), WeekStart::Monday, &[goal], &[run], &logs, &[], &[]);

        let text = format_review(&review);
        assert!(text.contains("Get fit  50%"));
        assert!(text.contains("Mo Tu We Th Fr Sa Su"));
        assert!(text.contains("#  .  x  .  .  .  ."));
        assert!(text.contains("Wed 2/25 (red)  untagged"));
        assert!(text.contains("Reflection: not yet written"));
    }

    #[test]
    fn sparkline_scales_between_extremes() {
        assert_eq!(sparkline(&[1.0, 5.0, 3.0]), "▁█▅");
        assert_eq!(sparkline(&[2.0, 2.0]), "▄▄");
        assert_eq!(sparkline(&[]), "");
    }

    #[test]
    fn metric_entries_show_values_and_trend() {
        let metric = Metric::new(Uuid::nil(), "Weight", "kg", true).unwrap();
        let entries = [
            MetricEntry::new(metric.id, date(2026, 2, 23), 74.0).unwrap(),
            MetricEntry::new(metric.id, date(2026, 2, 24), 73.0).unwrap(),
        ];
        let trend = cadence::metric::trend(&entries);

        let text = format_metric_entries(&metric, &entries, trend.as_ref());
        assert!(text.starts_with("Weight  (primary)"));
        assert!(text.contains("2026-02-24  73 kg"));
        assert!(text.contains("74 -> 73 kg (-1) over 2 entries, range 73 .. 74"));

        assert!(format_metric_entries(&metric, &[], None).contains("No entries"));
    }

    #[test]
    fn skill_line_uses_latest_rating_and_flags_graduation() {
        let target = SkillTarget::new(Some("bpm"), Some(120.0)).unwrap();
        let skill = SkillItem::new(Uuid::nil(), "Strumming", 2, target).unwrap();
        let log = SkillLog {
            id: Uuid::new_v4(),
            skill_id: skill.id,
            output_id: Uuid::nil(),
            action_date: date(2026, 2, 23),
            confidence: 4,
            target_result: Some(118.0),
            logged_at: Timestamp::UNIX_EPOCH,
        };

        let line = format_skill_line(&skill, &[log.clone()], true);
        assert!(line.ends_with("[active]  Strumming  confidence 4/5  target 120 bpm  ready to graduate"));
        assert!(format_skill_line(&skill, &[], false).contains("confidence 2/5"));

        let history = format_skill_history(&skill, &[log]);
        assert!(history.contains("2026-02-23  4/5  result 118  output 00000000"));
    }

    #[test]
    fn review_reports_skill_activity() {
        let summary = SkillSummary {
            skills_worked_count: 2,
            average_confidence_delta: Some(0.5),
        };
        assert_eq!(
            format_skill_summary(&summary).unwrap(),
            "Skills: 2 worked, confidence +0.5 on average"
        );
        assert_eq!(format_skill_summary(&SkillSummary::default()), None);
    }
}
