//! Outcome lifecycle commands: new, list, rename, archive, retire.

use clap::Subcommand;

use cadence::model::{Outcome, OutcomeStatus};
use cadence::storage::Storage;

use super::format::short_id;
use super::resolve_outcome;

#[derive(Debug, Subcommand)]
pub enum OutcomeCommand {
    /// Create a new outcome. Prints the outcome ID.
    New {
        /// What you want to achieve.
        title: String,

        /// Optional grouping, e.g. "health".
        #[arg(long)]
        category: Option<String>,
    },

    /// List outcomes, newest first.
    List {
        /// Include archived and retired outcomes.
        #[arg(long)]
        all: bool,
    },

    /// Change an outcome's title.
    Rename {
        /// Outcome ID: full UUID or unambiguous prefix.
        outcome: String,

        /// The new title.
        title: String,
    },

    /// Archive an outcome. It disappears from today and review.
    Archive {
        /// Outcome ID: full UUID or unambiguous prefix.
        outcome: String,
    },

    /// Retire an outcome for good.
    Retire {
        /// Outcome ID: full UUID or unambiguous prefix.
        outcome: String,
    },
}

pub(super) fn run(storage: &Storage, command: OutcomeCommand) -> Result<(), String> {
    match command {
        OutcomeCommand::New { title, category } => cmd_new(storage, &title, category.as_deref()),
        OutcomeCommand::List { all } => cmd_list(storage, all),
        OutcomeCommand::Rename { outcome, title } => {
            let outcome = resolve_outcome(storage, &outcome)?;
            cmd_rename(storage, outcome, &title)
        }
        OutcomeCommand::Archive { outcome } => {
            let outcome = resolve_outcome(storage, &outcome)?;
            cmd_set_status(storage, &outcome, OutcomeStatus::Archived)
        }
        OutcomeCommand::Retire { outcome } => {
            let outcome = resolve_outcome(storage, &outcome)?;
            cmd_set_status(storage, &outcome, OutcomeStatus::Retired)
        }
    }
}

fn cmd_new(storage: &Storage, title: &str, category: Option<&str>) -> Result<(), String> {
    let outcome = Outcome::new(title, category);
    if outcome.title.is_empty() {
        return Err("outcome title cannot be empty".to_string());
    }

    storage
        .create_outcome(&outcome)
        .map_err(|e| format!("failed to create outcome: {e}"))?;

    println!("{}", outcome.id);
    Ok(())
}

fn cmd_list(storage: &Storage, all: bool) -> Result<(), String> {
    let filter = (!all).then_some(OutcomeStatus::Active);
    let outcomes = storage
        .list_outcomes(filter)
        .map_err(|e| format!("failed to list outcomes: {e}"))?;

    if outcomes.is_empty() {
        println!("No outcomes");
        return Ok(());
    }

    for o in &outcomes {
        let category = o
            .category
            .as_deref()
            .map(|c| format!(" ({c})"))
            .unwrap_or_default();
        println!("{}  [{}]  {}{category}", short_id(o.id), o.status, o.title);
    }

    Ok(())
}

fn cmd_rename(storage: &Storage, mut outcome: Outcome, title: &str) -> Result<(), String> {
    let title = title.trim();
    if title.is_empty() {
        return Err("outcome title cannot be empty".to_string());
    }
    outcome.title = title.to_string();
    storage
        .update_outcome(&outcome)
        .map_err(|e| format!("failed to update outcome: {e}"))?;

    eprintln!("Outcome {} renamed", short_id(outcome.id));
    Ok(())
}

fn cmd_set_status(storage: &Storage, outcome: &Outcome, status: OutcomeStatus) -> Result<(), String> {
    if outcome.status == status {
        return Err(format!(
            "outcome {} is already {status}",
            short_id(outcome.id)
        ));
    }
    storage
        .set_outcome_status(outcome.id, status)
        .map_err(|e| format!("failed to update outcome: {e}"))?;

    eprintln!("Outcome {} {status}", short_id(outcome.id));
    Ok(())
}
