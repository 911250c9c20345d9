//! CLI interface for Cadence.
//!
//! Each subcommand is non-interactive: arguments in, plain text out.
//!
//! - `cadence outcome ...` and `cadence output ...` manage goals and the
//!   recurring actions that serve them.
//! - `cadence log`, `tag`, and `reflect` record what happened.
//! - `cadence today` and `review` show where things stand.
//! - `cadence metric ...` and `skill ...` track what the outputs move.
//!
//! Outcome, output, metric, and skill references take a full UUID or an
//! unambiguous prefix.

mod format;
mod metric;
mod outcome;
mod output;
mod remind;
mod report;
mod settings;
mod skill;
mod track;

use clap::{Args, Parser, Subcommand, ValueEnum};
use jiff::civil::Date;
use uuid::Uuid;

use cadence::config::Config;
use cadence::model::{
    FrequencyDraft, FrequencyKind, Metric, Outcome, Output, ShortfallReason, SkillItem,
};
use cadence::reminder;
use cadence::storage::Storage;

use metric::MetricCommand;
use outcome::OutcomeCommand;
use output::OutputCommand;
use settings::SettingsCommand;
use skill::{RatingArg, SkillCommand};

/// Cadence: outcomes, outputs, and the weeks in between.
#[derive(Debug, Parser)]
#[command(name = "cadence", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r"Workflow: a new habit
  1. cadence outcome new 'Get fit' --category health
     → prints an outcome ID (e.g. a3b0fc12)
  2. cadence output add --outcome a3b 'Run 20 minutes' --on mon,wed,fri
  3. cadence log 7c1 --completed 1 --total 1
  4. cadence today
  5. cadence review
  6. cadence tag 7c1 --date 2026-02-25 --reason energy
  7. cadence reflect a3b --worked 'mornings' --didnt 'late nights' --change 'earlier bedtime'

Tracking what moves
  cadence metric add --outcome a3b Weight --unit kg --primary
  cadence metric log 5d2 72.4
  cadence skill add --outcome a3b 'Hill pacing' --confidence 2
  cadence log 7c1 --skill 9e4=3";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage outcomes: the goals outputs serve.
    Outcome {
        #[command(subcommand)]
        command: OutcomeCommand,
    },

    /// Manage outputs: the recurring actions that serve an outcome.
    Output {
        #[command(subcommand)]
        command: OutputCommand,
    },

    /// Record completion for one output on one day.
    ///
    /// Logging the same output and day again replaces the earlier record.
    Log {
        /// Output ID: full UUID or unambiguous prefix.
        output: String,

        /// Day being logged (defaults to today).
        #[arg(long)]
        date: Option<Date>,

        /// Units done. Negative values are treated as 0.
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        completed: i64,

        /// Units planned. Negative values are treated as 0.
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        total: i64,

        /// Free-text note.
        #[arg(long, default_value = "")]
        notes: String,

        /// Rate a practiced skill as `SKILL=CONFIDENCE[:RESULT]`, e.g.
        /// `9e4=4` or `9e4=4:110`. Repeatable. Replaces the day's ratings.
        #[arg(long = "skill", value_parser = skill::parse_rating)]
        skills: Vec<RatingArg>,
    },

    /// Show today's outputs and this week's progress.
    Today {
        /// Show another day instead.
        #[arg(long)]
        date: Option<Date>,
    },

    /// Show the weekly review: statuses, shortfalls, and reflections.
    Review {
        /// Any day in the week to review (defaults to today).
        #[arg(long)]
        date: Option<Date>,
    },

    /// Attach a reason to a shortfall.
    ///
    /// Daily and fixed outputs are tagged per day; flexible outputs are
    /// tagged once for the week containing `--date`.
    Tag {
        /// Output ID: full UUID or unambiguous prefix.
        output: String,

        /// The missed day, or any day in the missed week (defaults to today).
        #[arg(long)]
        date: Option<Date>,

        /// time, energy, motivation, external_blocker, forgot, or other.
        #[arg(long)]
        reason: ShortfallReason,

        /// Explanation; required when the reason is `other`.
        #[arg(long, default_value = "")]
        note: String,
    },

    /// Record the weekly reflection for an outcome.
    Reflect {
        /// Outcome ID: full UUID or unambiguous prefix.
        outcome: String,

        /// Any day in the week being reflected on (defaults to today).
        #[arg(long)]
        date: Option<Date>,

        /// What worked.
        #[arg(long, default_value = "")]
        worked: String,

        /// What didn't.
        #[arg(long, default_value = "")]
        didnt: String,

        /// What to change next week.
        #[arg(long, default_value = "")]
        change: String,
    },

    /// Manage metrics: dated measures of an outcome.
    Metric {
        #[command(subcommand)]
        command: MetricCommand,
    },

    /// Manage skills: abilities an outcome builds, rated as you practice.
    Skill {
        #[command(subcommand)]
        command: SkillCommand,
    },

    /// Show or change week start and reminder settings.
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },

    /// Run the reminder scheduler, printing reminders as they fire.
    ///
    /// Requires reminders enabled in settings and `notifications = "granted"`
    /// in the config file.
    Remind {
        /// Check once and exit instead of polling.
        #[arg(long)]
        once: bool,
    },
}

/// Recurrence flags shared by `output add` and `output edit`.
///
/// The kind is inferred when omitted: `--on` means fixed weekly, `--times`
/// means flexible weekly.
#[derive(Debug, Clone, Default, Args)]
pub struct FrequencyArgs {
    /// Recurrence kind.
    #[arg(long, value_enum)]
    every: Option<KindArg>,

    /// Weekdays for a fixed weekly schedule, e.g. `mon,wed,fri` or `1,3,5`.
    #[arg(long, value_delimiter = ',', value_parser = parse_weekday)]
    on: Vec<u8>,

    /// Times per week for a flexible weekly schedule.
    #[arg(long, allow_negative_numbers = true)]
    times: Option<i64>,
}

impl FrequencyArgs {
    /// The draft these flags describe, or `None` if no recurrence flag was
    /// given.
    fn to_draft(&self) -> Option<FrequencyDraft> {
        let kind = match self.every {
            Some(kind) => kind.to_domain(),
            None if !self.on.is_empty() => FrequencyKind::FixedWeekly,
            None if self.times.is_some() => FrequencyKind::FlexibleWeekly,
            None => return None,
        };
        Some(FrequencyDraft {
            kind,
            value: self.times.unwrap_or(1),
            weekdays: self.on.clone(),
        })
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    /// Every day.
    Daily,
    /// Specific weekdays (`--on`).
    Weekly,
    /// N times per week, any days (`--times`).
    Flexible,
}

impl KindArg {
    fn to_domain(self) -> FrequencyKind {
        match self {
            Self::Daily => FrequencyKind::Daily,
            Self::Weekly => FrequencyKind::FixedWeekly,
            Self::Flexible => FrequencyKind::FlexibleWeekly,
        }
    }
}

/// Parses a weekday name or number (0 = Sunday).
///
/// Out-of-range numbers pass through so validation can report them.
fn parse_weekday(s: &str) -> Result<u8, String> {
    const NAMES: [&str; 7] = ["sun", "mon", "tue", "wed", "thu", "fri", "sat"];
    let lower = s.trim().to_ascii_lowercase();
    if let Ok(n) = lower.parse::<u8>() {
        return Ok(n);
    }
    NAMES
        .iter()
        .position(|name| lower.starts_with(name))
        .and_then(|i| u8::try_from(i).ok())
        .ok_or_else(|| format!("unknown weekday '{s}'"))
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Outcome { command } => outcome::run(&storage, command),
        Command::Output { command } => output::run(&storage, command),
        Command::Log {
            output,
            date,
            completed,
            total,
            notes,
            skills,
        } => track::cmd_log(
            &storage,
            &output,
            resolve_date(date),
            completed,
            total,
            &notes,
            &skills,
        ),
        Command::Today { date } => report::cmd_today(&storage, resolve_date(date)),
        Command::Review { date } => report::cmd_review(&storage, resolve_date(date)),
        Command::Tag {
            output,
            date,
            reason,
            note,
        } => track::cmd_tag(&storage, &output, resolve_date(date), reason, &note),
        Command::Reflect {
            outcome,
            date,
            worked,
            didnt,
            change,
        } => track::cmd_reflect(&storage, &outcome, resolve_date(date), &worked, &didnt, &change),
        Command::Metric { command } => metric::run(&storage, command),
        Command::Skill { command } => skill::run(&storage, command),
        Command::Settings { command } => settings::run(&storage, command),
        Command::Remind { once } => remind::cmd_remind(config, storage, once),
    }
}

/// The given date, or today in local time.
fn resolve_date(date: Option<Date>) -> Date {
    date.unwrap_or_else(|| reminder::local_now().date())
}

/// Resolve an outcome reference (full UUID or unambiguous prefix).
fn resolve_outcome(storage: &Storage, reference: &str) -> Result<Outcome, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_outcome(id)
            .map_err(|e| format!("outcome not found: {e}"));
    }
    let outcomes = storage
        .list_outcomes(None)
        .map_err(|e| format!("failed to list outcomes: {e}"))?;
    resolve_prefix(reference, outcomes, |o| o.id, "outcome")
}

/// Resolve an output reference (full UUID or unambiguous prefix).
fn resolve_output(storage: &Storage, reference: &str) -> Result<Output, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_output(id)
            .map_err(|e| format!("output not found: {e}"));
    }
    let outputs = storage
        .list_outputs(None, None)
        .map_err(|e| format!("failed to list outputs: {e}"))?;
    resolve_prefix(reference, outputs, |o| o.id, "output")
}

fn resolve_metric(storage: &Storage, reference: &str) -> Result<Metric, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_metric(id)
            .map_err(|e| format!("metric not found: {e}"));
    }
    let metrics = storage
        .list_metrics(None)
        .map_err(|e| format!("failed to list metrics: {e}"))?;
    resolve_prefix(reference, metrics, |m| m.id, "metric")
}

fn resolve_skill(storage: &Storage, reference: &str) -> Result<SkillItem, String> {
    if let Ok(id) = reference.parse::<Uuid>() {
        return storage
            .load_skill(id)
            .map_err(|e| format!("skill not found: {e}"));
    }
    let skills = storage
        .list_skills(None, false)
        .map_err(|e| format!("failed to list skills: {e}"))?;
    resolve_prefix(reference, skills, |s| s.id, "skill")
}

fn resolve_prefix<T>(
    reference: &str,
    candidates: Vec<T>,
    id: impl Fn(&T) -> Uuid,
    what: &str,
) -> Result<T, String> {
    let mut matches: Vec<T> = candidates
        .into_iter()
        .filter(|c| id(c).to_string().starts_with(reference))
        .collect();

    match matches.len() {
        0 => Err(format!("no {what} matching '{reference}'")),
        1 => Ok(matches.remove(0)),
        n => {
            let ids: Vec<String> = matches.iter().map(|c| format::short_id(id(c))).collect();
            Err(format!(
                "'{reference}' is ambiguous: matches {n} {what}s: {}",
                ids.join(", ")
            ))
        }
    }
}
