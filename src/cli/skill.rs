//! Skill commands: add, list, edit, stage, suppress, show. Ratings are
//! attached through `cadence log --skill`.

use clap::{Subcommand, ValueEnum};
use jiff::Timestamp;
use uuid::Uuid;

use cadence::model::{SkillItem, SkillLogDraft, SkillStage, SkillTarget};
use cadence::skill::graduation_eligible;
use cadence::storage::Storage;

use super::format::{format_skill_history, format_skill_line, short_id};
use super::{resolve_outcome, resolve_skill};

#[derive(Debug, Subcommand)]
pub enum SkillCommand {
    /// Add a skill to an outcome. Prints the skill ID.
    Add {
        /// Outcome ID: full UUID or unambiguous prefix.
        #[arg(long)]
        outcome: String,

        name: String,

        /// Starting confidence, 1 to 5.
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        confidence: i64,

        /// What the target measures, e.g. "bpm".
        #[arg(long)]
        target_label: Option<String>,

        /// Value to reach, e.g. 120.
        #[arg(long)]
        target: Option<f64>,
    },

    /// List skills with their latest confidence.
    List {
        /// Only skills for this outcome.
        #[arg(long)]
        outcome: Option<String>,

        /// Include archived skills.
        #[arg(long)]
        all: bool,
    },

    /// Change name, starting confidence, or target.
    Edit {
        /// Skill ID: full UUID or unambiguous prefix.
        skill: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long, allow_negative_numbers = true)]
        confidence: Option<i64>,

        /// New target label, or empty to clear.
        #[arg(long)]
        target_label: Option<String>,

        #[arg(long)]
        target: Option<f64>,

        /// Remove the target value.
        #[arg(long, conflicts_with = "target")]
        clear_target: bool,
    },

    /// Move a skill to another stage. `review` graduates it.
    Stage {
        /// Skill ID: full UUID or unambiguous prefix.
        skill: String,

        #[arg(value_enum)]
        stage: StageArg,
    },

    /// Dismiss the graduation prompt until three more strong ratings.
    Suppress {
        /// Skill ID: full UUID or unambiguous prefix.
        skill: String,
    },

    /// Show a skill's rating history.
    Show {
        /// Skill ID: full UUID or unambiguous prefix.
        skill: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StageArg {
    Active,
    Review,
    Archived,
}

impl StageArg {
    fn to_domain(self) -> SkillStage {
        match self {
            Self::Active => SkillStage::Active,
            Self::Review => SkillStage::Review,
            Self::Archived => SkillStage::Archived,
        }
    }
}

/// A `--skill` rating on `cadence log`: `REF=CONFIDENCE[:RESULT]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RatingArg {
    pub skill: String,
    pub confidence: i64,
    pub result: Option<f64>,
}

pub(super) fn parse_rating(s: &str) -> Result<RatingArg, String> {
    let (skill, rest) = s
        .split_once('=')
        .ok_or_else(|| format!("expected SKILL=CONFIDENCE[:RESULT], got '{s}'"))?;
    let (confidence, result) = match rest.split_once(':') {
        Some((c, r)) => (c, Some(r)),
        None => (rest, None),
    };
    let skill = skill.trim();
    if skill.is_empty() {
        return Err(format!("missing skill in '{s}'"));
    }
    Ok(RatingArg {
        skill: skill.to_string(),
        confidence: confidence
            .trim()
            .parse()
            .map_err(|_| format!("invalid confidence in '{s}'"))?,
        result: result
            .map(|r| r.trim().parse::<f64>())
            .transpose()
            .map_err(|_| format!("invalid result in '{s}'"))?,
    })
}

/// Resolves ratings into drafts for the action log being written.
pub(super) fn rating_drafts(storage: &Storage, ratings: &[RatingArg]) -> Result<Vec<SkillLogDraft>, String> {
    ratings
        .iter()
        .map(|r| {
            let skill = resolve_skill(storage, &r.skill)?;
            SkillLogDraft::new(skill.id, r.confidence, r.result).map_err(|e| e.to_string())
        })
        .collect()
}

/// Prints a hint for each newly rated skill that is ready to graduate.
pub(super) fn report_graduations(storage: &Storage, skill_ids: &[Uuid]) -> Result<(), String> {
    let logs = storage
        .load_skill_logs(skill_ids, None)
        .map_err(|e| format!("failed to load ratings: {e}"))?;
    for id in skill_ids {
        let skill = storage
            .load_skill(*id)
            .map_err(|e| format!("failed to load skill: {e}"))?;
        if graduation_eligible(&skill, &logs) {
            eprintln!(
                "{} is ready to graduate: cadence skill stage {} review (or `skill suppress` to keep practicing)",
                skill.name,
                short_id(skill.id)
            );
        }
    }
    Ok(())
}

pub(super) fn run(storage: &Storage, command: SkillCommand) -> Result<(), String> {
    match command {
        SkillCommand::Add {
            outcome,
            name,
            confidence,
            target_label,
            target,
        } => {
            let outcome = resolve_outcome(storage, &outcome)?;
            let target = SkillTarget::new(target_label.as_deref(), target).map_err(|e| e.to_string())?;
            let skill = SkillItem::new(outcome.id, &name, confidence, target).map_err(|e| e.to_string())?;
            storage
                .create_skill(&skill)
                .map_err(|e| format!("failed to create skill: {e}"))?;
            println!("{}", skill.id);
            Ok(())
        }
        SkillCommand::List { outcome, all } => cmd_list(storage, outcome.as_deref(), all),
        SkillCommand::Edit {
            skill,
            name,
            confidence,
            target_label,
            target,
            clear_target,
        } => {
            let skill = resolve_skill(storage, &skill)?;
            let new_target = if target_label.is_some() || target.is_some() || clear_target {
                let label = target_label.as_deref().or(skill.target.label.as_deref());
                let value = if clear_target { None } else { target.or(skill.target.value) };
                Some(SkillTarget::new(label, value).map_err(|e| e.to_string())?)
            } else {
                None
            };
            let edited = skill
                .edit(name.as_deref(), confidence, new_target)
                .map_err(|e| e.to_string())?;
            storage
                .update_skill(&edited)
                .map_err(|e| format!("failed to update skill: {e}"))?;
            eprintln!("Skill {} updated", short_id(edited.id));
            Ok(())
        }
        SkillCommand::Stage { skill, stage } => {
            let skill = resolve_skill(storage, &skill)?;
            let moved = storage
                .set_skill_stage(skill.id, stage.to_domain())
                .map_err(|e| format!("failed to change stage: {e}"))?;
            eprintln!("{} is now {}", moved.name, moved.stage);
            Ok(())
        }
        SkillCommand::Suppress { skill } => {
            let skill = resolve_skill(storage, &skill)?;
            storage
                .suppress_graduation(skill.id, Timestamp::now())
                .map_err(|e| format!("failed to suppress: {e}"))?;
            eprintln!("Graduation prompt dismissed for {}", skill.name);
            Ok(())
        }
        SkillCommand::Show { skill } => {
            let skill = resolve_skill(storage, &skill)?;
            let logs = storage
                .load_skill_logs(&[skill.id], None)
                .map_err(|e| format!("failed to load ratings: {e}"))?;
            println!("{}", format_skill_history(&skill, &logs));
            Ok(())
        }
    }
}

fn cmd_list(storage: &Storage, outcome_ref: Option<&str>, all: bool) -> Result<(), String> {
    let outcome_ids = outcome_ref
        .map(|r| resolve_outcome(storage, r).map(|o| vec![o.id]))
        .transpose()?;
    let skills = storage
        .list_skills(outcome_ids.as_deref(), !all)
        .map_err(|e| format!("failed to list skills: {e}"))?;
    if skills.is_empty() {
        println!("No skills");
        return Ok(());
    }

    let ids: Vec<Uuid> = skills.iter().map(|s| s.id).collect();
    let logs = storage
        .load_skill_logs(&ids, None)
        .map_err(|e| format!("failed to load ratings: {e}"))?;
    for skill in &skills {
        println!("{}", format_skill_line(skill, &logs, graduation_eligible(skill, &logs)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_with_and_without_result() {
        assert_eq!(
            parse_rating("a3b=4").unwrap(),
            RatingArg {
                skill: "a3b".into(),
                confidence: 4,
                result: None,
            }
        );
        assert_eq!(parse_rating("a3b=5:112.5").unwrap().result, Some(112.5));
    }

    #[test]
    fn malformed_ratings_are_rejected() {
        assert!(parse_rating("a3b").is_err());
        assert!(parse_rating("=4").is_err());
        assert!(parse_rating("a3b=high").is_err());
        assert!(parse_rating("a3b=4:fast").is_err());
    }
}
