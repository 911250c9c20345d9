//! Outcome types: the goal a set of outputs serves.

use std::fmt;
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A goal grouping one or more outputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub id: Uuid,
    pub title: String,
    pub category: Option<String>,
    pub status: OutcomeStatus,
    pub created_at: Timestamp,
}

impl Outcome {
    /// Creates an active outcome. Title and category are trimmed; an empty
    /// category becomes `None`.
    pub fn new(title: &str, category: Option<&str>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.trim().to_string(),
            category: category
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from),
            status: OutcomeStatus::Active,
            created_at: Timestamp::now(),
        }
    }
}

/// Where an outcome stands in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Active,
    Archived,
    Retired,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
            Self::Retired => "retired",
        }
    }
}

impl FromStr for OutcomeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "archived" => Ok(Self::Archived),
            "retired" => Ok(Self::Retired),
            other => Err(format!("unknown outcome status: {other}")),
        }
    }
}

impl fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_outcome_trims_and_drops_blank_category() {
        let outcome = Outcome::new("  Run a marathon ", Some("   "));
        assert_eq!(outcome.title, "Run a marathon");
        assert_eq!(outcome.category, None);
        assert_eq!(outcome.status, OutcomeStatus::Active);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [
            OutcomeStatus::Active,
            OutcomeStatus::Archived,
            OutcomeStatus::Retired,
        ] {
            assert_eq!(status.as_str().parse::<OutcomeStatus>().unwrap(), status);
        }
    }
}
