//! Core data model for Cadence.
//!
//! Outcomes group outputs; outputs recur on a [`Frequency`]; completion is
//! recorded per day in an [`ActionLog`]; shortfalls and reflections are the
//! user's commentary on a week. Metrics and skills track what the outputs
//! are meant to move.

mod action_log;
mod frequency;
mod metric;
mod outcome;
mod output;
mod reflection;
mod settings;
mod shortfall;
mod skill;

pub use action_log::{ActionLog, ActionLogIndex};
pub use frequency::{
    Frequency, FrequencyDraft, FrequencyError, FrequencyKind, MAX_TIMES_PER_WEEK, MAX_WEEKDAY,
    normalize, validate, weekday_abbrev,
};
pub use metric::{Metric, MetricEntry, MetricError};
pub use outcome::{Outcome, OutcomeStatus};
pub use output::{Output, OutputChange, OutputDraft, OutputStatus};
pub use reflection::{Reflection, ReflectionResponses};
pub use settings::{ReminderTime, Settings, SettingsError};
pub use shortfall::{ShortfallAnchor, ShortfallError, ShortfallReason, ShortfallTag};
pub use skill::{
    MAX_CONFIDENCE, MIN_CONFIDENCE, SkillError, SkillItem, SkillLog, SkillLogDraft, SkillStage,
    SkillTarget,
};
