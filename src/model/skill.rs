//! Skills: abilities an outcome builds, rated by confidence each time they
//! are practiced.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_CONFIDENCE: u8 = 1;
pub const MAX_CONFIDENCE: u8 = 5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkillError {
    #[error("skill name is required")]
    EmptyName,

    #[error("confidence must be between {MIN_CONFIDENCE} and {MAX_CONFIDENCE}, got {0}")]
    ConfidenceOutOfRange(i64),

    #[error("target and result values must be finite numbers, got {0}")]
    NonFiniteValue(f64),

    #[error("unknown skill stage: {0}")]
    UnknownStage(String),
}

/// Where a skill is in its progression.
///
/// `Active` skills are being practiced. `Review` skills have graduated and
/// only need occasional practice. Active and review skills are "live": a
/// live name is unique within its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillStage {
    Active,
    Review,
    Archived,
}

impl SkillStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Review => "review",
            Self::Archived => "archived",
        }
    }

    pub fn is_live(self) -> bool {
        matches!(self, Self::Active | Self::Review)
    }
}

impl FromStr for SkillStage {
    type Err = SkillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "review" => Ok(Self::Review),
            "archived" => Ok(Self::Archived),
            other => Err(SkillError::UnknownStage(other.to_string())),
        }
    }
}

impl fmt::Display for SkillStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An optional measurable goal, e.g. `bpm` at `120`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillTarget {
    pub label: Option<String>,
    pub value: Option<f64>,
}

impl SkillTarget {
    /// Blank labels become `None`.
    pub fn new(label: Option<&str>, value: Option<f64>) -> Result<Self, SkillError> {
        if let Some(v) = value.filter(|v| !v.is_finite()) {
            return Err(SkillError::NonFiniteValue(v));
        }
        Ok(Self {
            label: label
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from),
            value,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillItem {
    pub id: Uuid,
    pub outcome_id: Uuid,
    pub name: String,
    pub stage: SkillStage,
    pub target: SkillTarget,
    /// Self-rated confidence when the skill was added.
    pub initial_confidence: u8,
    /// Set when the user dismisses a graduation prompt. Only logs after
    /// this moment count toward the next one.
    pub graduation_suppressed_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl SkillItem {
    pub fn new(
        outcome_id: Uuid,
        name: &str,
        initial_confidence: i64,
        target: SkillTarget,
    ) -> Result<Self, SkillError> {
        Ok(Self {
            id: Uuid::new_v4(),
            outcome_id,
            name: skill_name(name)?,
            stage: SkillStage::Active,
            target,
            initial_confidence: confidence(initial_confidence)?,
            graduation_suppressed_at: None,
            created_at: Timestamp::now(),
        })
    }

    /// Applies an edit to name, confidence, and target. Stage and
    /// suppression are changed separately.
    pub fn edit(
        &self,
        name: Option<&str>,
        initial_confidence: Option<i64>,
        target: Option<SkillTarget>,
    ) -> Result<Self, SkillError> {
        Ok(Self {
            name: skill_name(name.unwrap_or(&self.name))?,
            initial_confidence: initial_confidence
                .map_or(Ok(self.initial_confidence), confidence)?,
            target: target.unwrap_or_else(|| self.target.clone()),
            ..self.clone()
        })
    }
}

/// One practice rating, attached to the action log of an output and day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillLog {
    pub id: Uuid,
    pub skill_id: Uuid,
    pub output_id: Uuid,
    pub action_date: Date,
    pub confidence: u8,
    pub target_result: Option<f64>,
    pub logged_at: Timestamp,
}

/// A rating to attach to an action log.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillLogDraft {
    pub skill_id: Uuid,
    pub confidence: u8,
    pub target_result: Option<f64>,
}

impl SkillLogDraft {
    pub fn new(skill_id: Uuid, confidence_level: i64, target_result: Option<f64>) -> Result<Self, SkillError> {
        if let Some(v) = target_result.filter(|v| !v.is_finite()) {
            return Err(SkillError::NonFiniteValue(v));
        }
        Ok(Self {
            skill_id,
            confidence: confidence(confidence_level)?,
            target_result,
        })
    }
}

fn skill_name(name: &str) -> Result<String, SkillError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SkillError::EmptyName);
    }
    Ok(name.to_string())
}

fn confidence(level: i64) -> Result<u8, SkillError> {
    u8::try_from(level)
        .ok()
        .filter(|c| (MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(c))
        .ok_or(SkillError::ConfidenceOutOfRange(level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_skill_normalizes_name_and_blank_target() {
        let target = SkillTarget::new(Some("  "), None).unwrap();
        let skill = SkillItem::new(Uuid::nil(), "  Barre Chords ", 2, target).unwrap();

        assert_eq!(skill.name, "Barre Chords");
        assert_eq!(skill.stage, SkillStage::Active);
        assert_eq!(skill.target, SkillTarget::default());
        assert_eq!(skill.initial_confidence, 2);
    }

    #[test]
    fn confidence_must_be_one_to_five() {
        for bad in [0, 6, -1, 300] {
            assert_eq!(
                SkillItem::new(Uuid::nil(), "Scales", bad, SkillTarget::default()).unwrap_err(),
                SkillError::ConfidenceOutOfRange(bad)
            );
        }
        assert!(SkillLogDraft::new(Uuid::nil(), 5, Some(110.0)).is_ok());
        assert!(SkillLogDraft::new(Uuid::nil(), 0, None).is_err());
    }

    #[test]
    fn edit_keeps_stage_and_suppression() {
        let mut skill = SkillItem::new(Uuid::nil(), "Scales", 1, SkillTarget::default()).unwrap();
        skill.stage = SkillStage::Review;
        skill.graduation_suppressed_at = Some(Timestamp::UNIX_EPOCH);

        let target = SkillTarget::new(Some("bpm"), Some(120.0)).unwrap();
        let edited = skill.edit(Some("Fingerpicking"), Some(4), Some(target.clone())).unwrap();
        assert_eq!(edited.id, skill.id);
        assert_eq!(edited.name, "Fingerpicking");
        assert_eq!(edited.initial_confidence, 4);
        assert_eq!(edited.target, target);
        assert_eq!(edited.stage, SkillStage::Review);
        assert_eq!(edited.graduation_suppressed_at, Some(Timestamp::UNIX_EPOCH));
    }

    #[test]
    fn non_finite_target_is_rejected() {
        assert!(matches!(
            SkillTarget::new(Some("bpm"), Some(f64::NAN)),
            Err(SkillError::NonFiniteValue(_))
        ));
    }

    #[test]
    fn stage_parses_and_reports_liveness() {
        assert_eq!("review".parse::<SkillStage>().unwrap(), SkillStage::Review);
        assert!("done".parse::<SkillStage>().is_err());
        assert!(SkillStage::Active.is_live());
        assert!(!SkillStage::Archived.is_live());
    }
}
