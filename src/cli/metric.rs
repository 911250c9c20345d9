//! Metric commands: add, list, edit, rm, log, unlog, entries.

use clap::Subcommand;
use jiff::civil::Date;

use cadence::metric::trend;
use cadence::model::{Metric, MetricEntry};
use cadence::storage::Storage;

use super::format::{format_metric_entries, short_id};
use super::{resolve_date, resolve_metric, resolve_outcome};

#[derive(Debug, Subcommand)]
pub enum MetricCommand {
    /// Track a new measure for an outcome. Prints the metric ID.
    Add {
        /// Outcome ID: full UUID or unambiguous prefix.
        #[arg(long)]
        outcome: String,

        /// What is measured, e.g. "Weight".
        name: String,

        /// Unit shown next to values, e.g. "kg".
        #[arg(long, default_value = "")]
        unit: String,

        /// Make this the outcome's headline metric.
        #[arg(long)]
        primary: bool,
    },

    /// List metrics, newest first.
    List {
        /// Only metrics for this outcome.
        #[arg(long)]
        outcome: Option<String>,
    },

    /// Change a metric's name, unit, or primary flag.
    Edit {
        /// Metric ID: full UUID or unambiguous prefix.
        metric: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        unit: Option<String>,

        /// `true` to make it primary, `false` to clear.
        #[arg(long)]
        primary: Option<bool>,
    },

    /// Delete a metric and all of its entries.
    Rm {
        /// Metric ID: full UUID or unambiguous prefix.
        metric: String,
    },

    /// Record a value. Logging the same day again replaces it.
    Log {
        /// Metric ID: full UUID or unambiguous prefix.
        metric: String,

        #[arg(allow_negative_numbers = true)]
        value: f64,

        /// Day of the reading (defaults to today).
        #[arg(long)]
        date: Option<Date>,
    },

    /// Remove the value recorded for a day.
    Unlog {
        /// Metric ID: full UUID or unambiguous prefix.
        metric: String,

        /// Day to clear (defaults to today).
        #[arg(long)]
        date: Option<Date>,
    },

    /// Show entries and the trend.
    Entries {
        /// Metric ID: full UUID or unambiguous prefix.
        metric: String,

        /// Only entries on or after this day.
        #[arg(long)]
        since: Option<Date>,
    },
}

pub(super) fn run(storage: &Storage, command: MetricCommand) -> Result<(), String> {
    match command {
        MetricCommand::Add {
            outcome,
            name,
            unit,
            primary,
        } => cmd_add(storage, &outcome, &name, &unit, primary),
        MetricCommand::List { outcome } => cmd_list(storage, outcome.as_deref()),
        MetricCommand::Edit {
            metric,
            name,
            unit,
            primary,
        } => {
            let metric = resolve_metric(storage, &metric)?;
            let edited = metric
                .edit(name.as_deref(), unit.as_deref(), primary)
                .map_err(|e| e.to_string())?;
            storage
                .update_metric(&edited)
                .map_err(|e| format!("failed to update metric: {e}"))?;
            eprintln!("Metric {} updated", short_id(edited.id));
            Ok(())
        }
        MetricCommand::Rm { metric } => {
            let metric = resolve_metric(storage, &metric)?;
            storage
                .delete_metric(metric.id)
                .map_err(|e| format!("failed to delete metric: {e}"))?;
            eprintln!("Metric {} deleted", metric.name);
            Ok(())
        }
        MetricCommand::Log { metric, value, date } => {
            let metric = resolve_metric(storage, &metric)?;
            let entry = MetricEntry::new(metric.id, resolve_date(date), value).map_err(|e| e.to_string())?;
            storage
                .upsert_metric_entry(&entry)
                .map_err(|e| format!("failed to log metric: {e}"))?;
            eprintln!("{}: {} {} on {}", metric.name, entry.value, metric.unit, entry.date);
            Ok(())
        }
        MetricCommand::Unlog { metric, date } => {
            let metric = resolve_metric(storage, &metric)?;
            let date = resolve_date(date);
            let removed = storage
                .delete_metric_entry(metric.id, date)
                .map_err(|e| format!("failed to remove entry: {e}"))?;
            if !removed {
                return Err(format!("no {} entry on {date}", metric.name));
            }
            eprintln!("Removed {} entry on {date}", metric.name);
            Ok(())
        }
        MetricCommand::Entries { metric, since } => {
            let metric = resolve_metric(storage, &metric)?;
            let entries = storage
                .load_metric_entries(metric.id, since)
                .map_err(|e| format!("failed to load entries: {e}"))?;
            println!("{}", format_metric_entries(&metric, &entries, trend(&entries).as_ref()));
            Ok(())
        }
    }
}

fn cmd_add(storage: &Storage, outcome_ref: &str, name: &str, unit: &str, primary: bool) -> Result<(), String> {
    let outcome = resolve_outcome(storage, outcome_ref)?;
    let metric = Metric::new(outcome.id, name, unit, primary).map_err(|e| e.to_string())?;
    storage
        .create_metric(&metric)
        .map_err(|e| format!("failed to create metric: {e}"))?;
    println!("{}", metric.id);
    Ok(())
}

fn cmd_list(storage: &Storage, outcome_ref: Option<&str>) -> Result<(), String> {
    let outcome_id = outcome_ref
        .map(|r| resolve_outcome(storage, r).map(|o| o.id))
        .transpose()?;
    let metrics = storage
        .list_metrics(outcome_id)
        .map_err(|e| format!("failed to list metrics: {e}"))?;

    if metrics.is_empty() {
        println!("No metrics");
        return Ok(());
    }
    for m in &metrics {
        let primary = if m.is_primary { "  primary" } else { "" };
        let unit = if m.unit.is_empty() {
            String::new()
        } else {
            format!(" ({})", m.unit)
        };
        println!(
            "{}  {}{unit}  outcome {}{primary}",
            short_id(m.id),
            m.name,
            short_id(m.outcome_id)
        );
    }
    Ok(())
}
