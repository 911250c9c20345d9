//! Output commands: add, list, edit, pause, resume, retire.

use clap::Subcommand;

use cadence::model::{Frequency, FrequencyDraft, Output, OutputDraft, OutputStatus, validate};
use cadence::starter::suggest_starter;
use cadence::storage::Storage;

use super::format::{format_frequency_draft, short_id};
use super::{FrequencyArgs, resolve_outcome, resolve_output};

#[derive(Debug, Subcommand)]
pub enum OutputCommand {
    /// Add an output to an outcome. Prints the output ID.
    ///
    /// Defaults to daily. The first output of an outcome may get a starter
    /// suggestion; pass `--accept-starter` to use it.
    Add {
        /// Outcome ID: full UUID or unambiguous prefix.
        #[arg(long)]
        outcome: String,

        /// What you will do.
        description: String,

        #[command(flatten)]
        frequency: FrequencyArgs,

        /// Use the starter suggestion instead of the requested schedule.
        #[arg(long)]
        accept_starter: bool,
    },

    /// List outputs, oldest first.
    List {
        /// Only outputs of this outcome.
        #[arg(long)]
        outcome: Option<String>,

        /// Include paused and retired outputs.
        #[arg(long)]
        all: bool,
    },

    /// Change an output's description or schedule.
    ///
    /// Schedule changes are recorded with the optional `--reason`.
    Edit {
        /// Output ID: full UUID or unambiguous prefix.
        output: String,

        /// New description.
        #[arg(long)]
        description: Option<String>,

        #[command(flatten)]
        frequency: FrequencyArgs,

        /// Why the schedule changed.
        #[arg(long)]
        reason: Option<String>,
    },

    /// Pause an output. Paused outputs are not counted.
    Pause {
        /// Output ID: full UUID or unambiguous prefix.
        output: String,
    },

    /// Resume a paused output.
    Resume {
        /// Output ID: full UUID or unambiguous prefix.
        output: String,
    },

    /// Retire an output for good.
    Retire {
        /// Output ID: full UUID or unambiguous prefix.
        output: String,
    },
}

pub(super) fn run(storage: &Storage, command: OutputCommand) -> Result<(), String> {
    match command {
        OutputCommand::Add {
            outcome,
            description,
            frequency,
            accept_starter,
        } => {
            let draft = OutputDraft::new(
                description,
                frequency.to_draft().unwrap_or_else(FrequencyDraft::daily),
            );
            cmd_add(storage, &outcome, draft, accept_starter)
        }
        OutputCommand::List { outcome, all } => cmd_list(storage, outcome.as_deref(), all),
        OutputCommand::Edit {
            output,
            description,
            frequency,
            reason,
        } => {
            let output = resolve_output(storage, &output)?;
            cmd_edit(
                storage,
                &output,
                description.as_deref(),
                frequency.to_draft(),
                reason.as_deref(),
            )
        }
        OutputCommand::Pause { output } => {
            let output = resolve_output(storage, &output)?;
            cmd_set_status(storage, &output, OutputStatus::Paused)
        }
        OutputCommand::Resume { output } => {
            let output = resolve_output(storage, &output)?;
            if output.status == OutputStatus::Retired {
                return Err(format!("output {} is retired", short_id(output.id)));
            }
            cmd_set_status(storage, &output, OutputStatus::Active)
        }
        OutputCommand::Retire { output } => {
            let output = resolve_output(storage, &output)?;
            cmd_set_status(storage, &output, OutputStatus::Retired)
        }
    }
}

fn cmd_add(
    storage: &Storage,
    outcome_ref: &str,
    draft: OutputDraft,
    accept_starter: bool,
) -> Result<(), String> {
    let outcome = resolve_outcome(storage, outcome_ref)?;
    if draft.description.trim().is_empty() {
        return Err("output description cannot be empty".to_string());
    }
    validate(&draft.frequency).map_err(|e| format!("invalid schedule: {e}"))?;

    let is_first = storage
        .count_outputs(outcome.id)
        .map_err(|e| format!("failed to count outputs: {e}"))?
        == 0;

    let draft = match is_first.then(|| suggest_starter(&draft)).flatten() {
        Some(suggestion) if accept_starter => {
            eprintln!(
                "Starter applied: {}",
                format_frequency_draft(&suggestion.draft.frequency)
            );
            suggestion.draft
        }
        Some(suggestion) => {
            eprintln!(
                "Starter suggestion: {} ({})\n{}\nRe-run with --accept-starter to use it.",
                format_frequency_draft(&suggestion.draft.frequency),
                suggestion.draft.description,
                suggestion.reason,
            );
            draft
        }
        None => draft,
    };

    let output = Output::from_draft(outcome.id, &draft).map_err(|e| format!("invalid schedule: {e}"))?;
    storage
        .create_output(&output)
        .map_err(|e| format!("failed to create output: {e}"))?;

    println!("{}", output.id);
    Ok(())
}

fn cmd_list(storage: &Storage, outcome_ref: Option<&str>, all: bool) -> Result<(), String> {
    let outcome_ids = outcome_ref
        .map(|r| resolve_outcome(storage, r).map(|o| vec![o.id]))
        .transpose()?;
    let status = (!all).then_some(OutputStatus::Active);
    let outputs = storage
        .list_outputs(outcome_ids.as_deref(), status)
        .map_err(|e| format!("failed to list outputs: {e}"))?;

    if outputs.is_empty() {
        println!("No outputs");
        return Ok(());
    }

    for o in &outputs {
        let starter = if o.is_starter { "  (starter)" } else { "" };
        println!(
            "{}  [{}]  {}  {}{starter}",
            short_id(o.id),
            o.status,
            o.frequency,
            o.description
        );
    }

    Ok(())
}

fn cmd_edit(
    storage: &Storage,
    output: &Output,
    description: Option<&str>,
    frequency: Option<FrequencyDraft>,
    reason: Option<&str>,
) -> Result<(), String> {
    if description.is_none() && frequency.is_none() {
        return Err("nothing to change: pass --description or a schedule flag".to_string());
    }

    // Validate everything before writing anything.
    if description.is_some_and(|d| d.trim().is_empty()) {
        return Err("output description cannot be empty".to_string());
    }
    let frequency = frequency
        .map(|draft| Frequency::from_draft(&draft))
        .transpose()
        .map_err(|e| format!("invalid schedule: {e}"))?;

    if let Some(description) = description {
        storage
            .update_output_description(output.id, description)
            .map_err(|e| format!("failed to update output: {e}"))?;
    }
    if let Some(frequency) = frequency {
        let updated = storage
            .update_output_frequency(output.id, &frequency, reason)
            .map_err(|e| format!("failed to update output: {e}"))?;
        eprintln!("Schedule: {}", updated.frequency);
    }

    eprintln!("Output {} updated", short_id(output.id));
    Ok(())
}

fn cmd_set_status(storage: &Storage, output: &Output, status: OutputStatus) -> Result<(), String> {
    if output.status == status {
        return Err(format!("output {} is already {status}", short_id(output.id)));
    }
    storage
        .set_output_status(output.id, status)
        .map_err(|e| format!("failed to update output: {e}"))?;

    eprintln!("Output {} {status}", short_id(output.id));
    Ok(())
}
