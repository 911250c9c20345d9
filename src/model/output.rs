//! Output types: a recurring commitment under an outcome.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::frequency::{Frequency, FrequencyDraft, FrequencyError};

/// A recurring user-defined action under an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    pub id: Uuid,
    pub outcome_id: Uuid,
    pub description: String,
    pub frequency: Frequency,
    /// Created from an accepted starter suggestion.
    pub is_starter: bool,
    pub status: OutputStatus,
    pub created_at: Timestamp,
}

impl Output {
    /// Builds an active output from a draft, validating and normalizing
    /// its recurrence.
    pub fn from_draft(outcome_id: Uuid, draft: &OutputDraft) -> Result<Self, FrequencyError> {
        Ok(Self {
            id: Uuid::new_v4(),
            outcome_id,
            description: draft.description.trim().to_string(),
            frequency: Frequency::from_draft(&draft.frequency)?,
            is_starter: draft.starter_applied,
            status: OutputStatus::Active,
            created_at: Timestamp::now(),
        })
    }
}

/// An output as entered on creation, before validation.
///
/// Immutable value: the starter advisor returns a new draft rather than
/// editing this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDraft {
    pub description: String,
    pub frequency: FrequencyDraft,
    pub starter_applied: bool,
}

impl OutputDraft {
    pub fn new(description: impl Into<String>, frequency: FrequencyDraft) -> Self {
        Self {
            description: description.into(),
            frequency,
            starter_applied: false,
        }
    }
}

/// Lifecycle of an output. Retired is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStatus {
    Active,
    Paused,
    Retired,
}

impl OutputStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Retired => "retired",
        }
    }
}

impl FromStr for OutputStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "paused" => Ok(Self::Paused),
            "retired" => Ok(Self::Retired),
            other => Err(format!("unknown output status: {other}")),
        }
    }
}

impl fmt::Display for OutputStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An audited edit of an output's recurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChange {
    pub output_id: Uuid,
    pub change_type: String,
    pub old_value: Frequency,
    pub new_value: Frequency,
    pub reason: Option<String>,
    pub changed_at: Timestamp,
}
