//! Settings commands: show, set, purge.

use clap::{Subcommand, ValueEnum};

use cadence::model::{ReminderTime, Settings};
use cadence::storage::Storage;
use cadence::week::WeekStart;

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print current settings.
    Show,

    /// Change settings. Unspecified values are left alone.
    Set {
        /// First day of the week.
        #[arg(long, value_enum)]
        week_start: Option<WeekStartArg>,

        /// Turn reminders on or off.
        #[arg(long)]
        reminders: Option<bool>,

        /// Daily reminder time as HH:MM, or `none` to clear.
        #[arg(long)]
        daily_time: Option<String>,

        /// Weekly review reminder time as HH:MM, or `none` to clear.
        /// Fires on the last day of the week.
        #[arg(long)]
        weekly_time: Option<String>,
    },

    /// Delete all outcomes, outputs, records, and settings.
    Purge {
        /// Confirm. Nothing is deleted without it.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum WeekStartArg {
    Sunday,
    Monday,
}

impl WeekStartArg {
    fn to_domain(self) -> WeekStart {
        match self {
            Self::Sunday => WeekStart::Sunday,
            Self::Monday => WeekStart::Monday,
        }
    }
}

pub(super) fn run(storage: &Storage, command: SettingsCommand) -> Result<(), String> {
    let load = || {
        storage
            .load_settings()
            .map_err(|e| format!("failed to load settings: {e}"))
    };

    match command {
        SettingsCommand::Show => {
            println!("{}", format_settings(&load()?));
            Ok(())
        }
        SettingsCommand::Set {
            week_start,
            reminders,
            daily_time,
            weekly_time,
        } => {
            let mut updated = load()?;
            if let Some(start) = week_start {
                updated.week_start = start.to_domain();
            }
            if let Some(enabled) = reminders {
                updated.reminders_enabled = enabled;
            }
            if let Some(time) = daily_time {
                updated.daily_reminder_time = parse_optional_time(&time)?;
            }
            if let Some(time) = weekly_time {
                updated.weekly_review_time = parse_optional_time(&time)?;
            }

            storage
                .save_settings(&updated)
                .map_err(|e| format!("failed to save settings: {e}"))?;
            println!("{}", format_settings(&updated));
            Ok(())
        }
        SettingsCommand::Purge { yes } => cmd_purge(storage, yes),
    }
}

fn cmd_purge(storage: &Storage, yes: bool) -> Result<(), String> {
    if !yes {
        return Err("this deletes all data; pass --yes to confirm".to_string());
    }
    storage
        .purge_all()
        .map_err(|e| format!("failed to purge: {e}"))?;
    eprintln!("All data deleted");
    Ok(())
}

/// `none` (or empty) clears; anything else must be `HH:MM`.
fn parse_optional_time(s: &str) -> Result<Option<ReminderTime>, String> {
    let s = s.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    s.parse().map(Some).map_err(|e| format!("{e}"))
}

fn format_settings(settings: &Settings) -> String {
    let time = |t: Option<ReminderTime>| t.map_or_else(|| "off".to_string(), |t| t.to_string());
    format!(
        "week-start: {}\nreminders: {}\ndaily-time: {}\nweekly-time: {}",
        settings.week_start,
        if settings.reminders_enabled { "on" } else { "off" },
        time(settings.daily_reminder_time),
        time(settings.weekly_review_time),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_clears_a_time() {
        assert_eq!(parse_optional_time("none").unwrap(), None);
        assert_eq!(parse_optional_time(" ").unwrap(), None);
        assert_eq!(
            parse_optional_time("07:30").unwrap().unwrap().to_string(),
            "07:30"
        );
        assert!(parse_optional_time("7pm").is_err());
    }

    #[test]
    fn purge_requires_confirmation() {
        let dir = tempfile::TempDir::new().unwrap();
        let storage = Storage::open(Storage::db_path(dir.path())).unwrap();
        let outcome = cadence::model::Outcome::new("Keep me", None);
        storage.create_outcome(&outcome).unwrap();

        assert!(cmd_purge(&storage, false).unwrap_err().contains("--yes"));
        assert_eq!(storage.list_outcomes(None).unwrap().len(), 1);

        cmd_purge(&storage, true).unwrap();
        assert!(storage.list_outcomes(None).unwrap().is_empty());
    }

    #[test]
    fn default_settings_render() {
        assert_eq!(
            format_settings(&Settings::default()),
            "week-start: monday\nreminders: off\ndaily-time: off\nweekly-time: off"
        );
    }
}
