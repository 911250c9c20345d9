//! Weekly reflections: free-text answers per outcome per week.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Answers to the weekly review prompts for one outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionResponses {
    pub what_worked: String,
    pub what_didnt: String,
    pub what_to_change: String,
}

/// A reflection, unique per `(outcome, week_start)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    pub id: Uuid,
    pub outcome_id: Uuid,
    pub week_start: Date,
    pub responses: ReflectionResponses,
}
