//! Recurrence: how often an output is due.
//!
//! A recurrence arrives as a [`FrequencyDraft`] (whatever the user typed),
//! is checked by [`validate`], corrected by [`normalize`], and only then
//! becomes a [`Frequency`], the shape every evaluator matches on.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Highest meaningful weekday number (Saturday). Sunday is 0.
pub const MAX_WEEKDAY: u8 = 6;

/// Upper bound for a flexible weekly target.
pub const MAX_TIMES_PER_WEEK: u8 = 7;

/// Errors from checking a recurrence draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrequencyError {
    #[error("a fixed weekly schedule needs at least one weekday")]
    NoWeekdays,

    #[error("weekday {0} is out of range (0 = Sunday .. 6 = Saturday)")]
    WeekdayOutOfRange(u8),

    #[error("weekly target {0} is out of range (1..=7)")]
    TimesOutOfRange(i64),

    #[error("unknown frequency type: {0}")]
    UnknownKind(String),
}

/// A validated, normalized recurrence.
///
/// Adding a variant here forces the evaluator, accounting, and starter
/// advisor to handle it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Frequency {
    /// Due every calendar day.
    Daily,

    /// Due on specific weekdays. Sorted, deduplicated, each in `0..=6`.
    FixedWeekly { weekdays: Vec<u8> },

    /// Due `times` times per week, on any days. Always in `1..=7`.
    FlexibleWeekly { times: u8 },
}

impl Frequency {
    pub fn kind(&self) -> FrequencyKind {
        match self {
            Self::Daily => FrequencyKind::Daily,
            Self::FixedWeekly { .. } => FrequencyKind::FixedWeekly,
            Self::FlexibleWeekly { .. } => FrequencyKind::FlexibleWeekly,
        }
    }

    /// The stored frequency value: 1 for daily, the weekday count for
    /// fixed weekly, the target for flexible weekly.
    pub fn value(&self) -> u8 {
        match self {
            Self::Daily => 1,
            Self::FixedWeekly { weekdays } => u8::try_from(weekdays.len()).unwrap_or(u8::MAX),
            Self::FlexibleWeekly { times } => *times,
        }
    }

    /// Scheduled weekdays. Empty unless fixed weekly.
    pub fn weekdays(&self) -> &[u8] {
        match self {
            Self::FixedWeekly { weekdays } => weekdays,
            Self::Daily | Self::FlexibleWeekly { .. } => &[],
        }
    }

    /// Checks and normalizes a draft into a recurrence.
    pub fn from_draft(draft: &FrequencyDraft) -> Result<Self, FrequencyError> {
        validate(draft)?;
        let draft = normalize(draft);
        Ok(match draft.kind {
            FrequencyKind::Daily => Self::Daily,
            FrequencyKind::FixedWeekly => Self::FixedWeekly {
                weekdays: draft.weekdays,
            },
            FrequencyKind::FlexibleWeekly => Self::FlexibleWeekly {
                // In range after validate + normalize.
                times: u8::try_from(draft.value).unwrap_or(MAX_TIMES_PER_WEEK),
            },
        })
    }

    /// The draft this recurrence would be edited from.
    pub fn to_draft(&self) -> FrequencyDraft {
        FrequencyDraft {
            kind: self.kind(),
            value: i64::from(self.value()),
            weekdays: self.weekdays().to_vec(),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "daily"),
            Self::FixedWeekly { weekdays } => {
                let names: Vec<&str> = weekdays.iter().map(|d| weekday_abbrev(*d)).collect();
                write!(f, "weekly on {}", names.join("/"))
            }
            Self::FlexibleWeekly { times } => write!(f, "{times}x/week"),
        }
    }
}

/// The three recurrence kinds, without their parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyKind {
    Daily,
    FixedWeekly,
    FlexibleWeekly,
}

impl FrequencyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::FixedWeekly => "fixed_weekly",
            Self::FlexibleWeekly => "flexible_weekly",
        }
    }
}

impl FromStr for FrequencyKind {
    type Err = FrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "fixed_weekly" => Ok(Self::FixedWeekly),
            "flexible_weekly" => Ok(Self::FlexibleWeekly),
            other => Err(FrequencyError::UnknownKind(other.to_string())),
        }
    }
}

impl fmt::Display for FrequencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurrence as entered, before any correction.
///
/// `value` is signed and unbounded so out-of-range input survives long
/// enough to be reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrequencyDraft {
    pub kind: FrequencyKind,
    pub value: i64,
    pub weekdays: Vec<u8>,
}

impl FrequencyDraft {
    pub fn daily() -> Self {
        Self {
            kind: FrequencyKind::Daily,
            value: 1,
            weekdays: Vec::new(),
        }
    }

    pub fn fixed_weekly(weekdays: impl Into<Vec<u8>>) -> Self {
        let weekdays = weekdays.into();
        Self {
            kind: FrequencyKind::FixedWeekly,
            value: i64::try_from(weekdays.len()).unwrap_or(i64::MAX),
            weekdays,
        }
    }

    pub fn flexible_weekly(times: i64) -> Self {
        Self {
            kind: FrequencyKind::FlexibleWeekly,
            value: times,
            weekdays: Vec::new(),
        }
    }
}

/// Rejects drafts that must be re-entered rather than corrected.
///
/// Only the fields meaningful for the draft's kind are checked; stray
/// weekdays on a daily draft are left for [`normalize`] to drop.
pub fn validate(draft: &FrequencyDraft) -> Result<(), FrequencyError> {
    match draft.kind {
        FrequencyKind::Daily => Ok(()),
        FrequencyKind::FixedWeekly => {
            if let Some(day) = draft.weekdays.iter().find(|d| **d > MAX_WEEKDAY) {
                return Err(FrequencyError::WeekdayOutOfRange(*day));
            }
            if draft.weekdays.is_empty() {
                return Err(FrequencyError::NoWeekdays);
            }
            Ok(())
        }
        FrequencyKind::FlexibleWeekly => {
            if !(1..=i64::from(MAX_TIMES_PER_WEEK)).contains(&draft.value) {
                return Err(FrequencyError::TimesOutOfRange(draft.value));
            }
            Ok(())
        }
    }
}

/// Corrects a draft so it satisfies the per-kind invariants.
///
/// Total and idempotent. A fixed weekly draft with no weekdays stays
/// empty with value 0, which evaluates as never due.
pub fn normalize(draft: &FrequencyDraft) -> FrequencyDraft {
    match draft.kind {
        FrequencyKind::Daily => FrequencyDraft::daily(),
        FrequencyKind::FixedWeekly => {
            let mut weekdays = draft.weekdays.clone();
            weekdays.sort_unstable();
            weekdays.dedup();
            FrequencyDraft::fixed_weekly(weekdays)
        }
        FrequencyKind::FlexibleWeekly => FrequencyDraft::flexible_weekly(
            draft.value.clamp(1, i64::from(MAX_TIMES_PER_WEEK)),
        ),
    }
}

/// Three-letter English name for a weekday number.
pub fn weekday_abbrev(day: u8) -> &'static str {
    match day {
        0 => "Sun",
        1 => "Mon",
        2 => "Tue",
        3 => "Wed",
        4 => "Thu",
        5 => "Fri",
        6 => "Sat",
        _ => "???",
    }
}
