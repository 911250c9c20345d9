//! Shortfall tags: the user's reason for an incomplete occurrence or week.

use std::fmt;
use std::str::FromStr;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Errors from the shortfall tag write contract.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShortfallError {
    #[error("either an occurrence date or a week start is required")]
    MissingAnchor,

    #[error("a shortfall tag attaches to an occurrence date or a week start, not both")]
    BothAnchors,

    #[error("reason \"other\" requires a note")]
    MissingOtherText,

    #[error("unknown shortfall reason: {0}")]
    UnknownReason(String),
}

/// Why an occurrence or week fell short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortfallReason {
    Time,
    Energy,
    Motivation,
    ExternalBlocker,
    Forgot,
    Other,
}

impl ShortfallReason {
    pub const ALL: [Self; 6] = [
        Self::Time,
        Self::Energy,
        Self::Motivation,
        Self::ExternalBlocker,
        Self::Forgot,
        Self::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Time => "time",
            Self::Energy => "energy",
            Self::Motivation => "motivation",
            Self::ExternalBlocker => "external_blocker",
            Self::Forgot => "forgot",
            Self::Other => "other",
        }
    }
}

impl FromStr for ShortfallReason {
    type Err = ShortfallError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| ShortfallError::UnknownReason(s.to_string()))
    }
}

impl fmt::Display for ShortfallReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a shortfall is about: one scheduled day, or a whole flexible week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "date", rename_all = "camelCase")]
pub enum ShortfallAnchor {
    /// A single occurrence of a daily or fixed weekly output.
    Occurrence(Date),

    /// The week beginning on this date, for a flexible weekly output.
    Week(Date),
}

impl ShortfallAnchor {
    /// Builds an anchor from the two optional columns, requiring exactly one.
    pub fn from_parts(
        occurrence_date: Option<Date>,
        week_start: Option<Date>,
    ) -> Result<Self, ShortfallError> {
        match (occurrence_date, week_start) {
            (Some(date), None) => Ok(Self::Occurrence(date)),
            (None, Some(date)) => Ok(Self::Week(date)),
            (None, None) => Err(ShortfallError::MissingAnchor),
            (Some(_), Some(_)) => Err(ShortfallError::BothAnchors),
        }
    }

    pub fn occurrence_date(self) -> Option<Date> {
        match self {
            Self::Occurrence(date) => Some(date),
            Self::Week(_) => None,
        }
    }

    pub fn week_start(self) -> Option<Date> {
        match self {
            Self::Week(date) => Some(date),
            Self::Occurrence(_) => None,
        }
    }
}

/// A saved reason for a shortfall.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortfallTag {
    pub id: Uuid,
    pub output_id: Uuid,
    pub anchor: ShortfallAnchor,
    pub reason: ShortfallReason,
    /// Set only when `reason` is [`ShortfallReason::Other`].
    pub other_text: Option<String>,
}

impl ShortfallTag {
    /// Checks the write contract and builds a tag.
    ///
    /// `other_text` is kept (trimmed) only for [`ShortfallReason::Other`],
    /// where it must be non-blank.
    pub fn new(
        output_id: Uuid,
        anchor: ShortfallAnchor,
        reason: ShortfallReason,
        other_text: &str,
    ) -> Result<Self, ShortfallError> {
        let other_text = other_text.trim();
        let other_text = match reason {
            ShortfallReason::Other if other_text.is_empty() => {
                return Err(ShortfallError::MissingOtherText);
            }
            ShortfallReason::Other => Some(other_text.to_string()),
            _ => None,
        };
        Ok(Self {
            id: Uuid::new_v4(),
            output_id,
            anchor,
            reason,
            other_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    #[test]
    fn anchor_requires_exactly_one_date() {
        let d = date(2026, 2, 23);
        assert_eq!(
            ShortfallAnchor::from_parts(Some(d), None).unwrap(),
            ShortfallAnchor::Occurrence(d)
        );
        assert_eq!(
            ShortfallAnchor::from_parts(None, Some(d)).unwrap(),
            ShortfallAnchor::Week(d)
        );
        assert_eq!(
            ShortfallAnchor::from_parts(None, None).unwrap_err(),
            ShortfallError::MissingAnchor
        );
        assert_eq!(
            ShortfallAnchor::from_parts(Some(d), Some(d)).unwrap_err(),
            ShortfallError::BothAnchors
        );
    }

    #[test]
    fn other_reason_requires_text() {
        let anchor = ShortfallAnchor::Occurrence(date(2026, 2, 23));
        let err = ShortfallTag::new(Uuid::new_v4(), anchor, ShortfallReason::Other, "  ")
            .unwrap_err();
        assert_eq!(err, ShortfallError::MissingOtherText);

        let tag = ShortfallTag::new(Uuid::new_v4(), anchor, ShortfallReason::Other, " sick ")
            .unwrap();
        assert_eq!(tag.other_text.as_deref(), Some("sick"));
    }

    #[test]
    fn other_text_dropped_for_fixed_reasons() {
        let anchor = ShortfallAnchor::Week(date(2026, 2, 23));
        let tag = ShortfallTag::new(Uuid::new_v4(), anchor, ShortfallReason::Energy, "tired")
            .unwrap();
        assert_eq!(tag.other_text, None);
    }

    #[test]
    fn reason_parses_stored_names() {
        assert_eq!(
            "external_blocker".parse::<ShortfallReason>().unwrap(),
            ShortfallReason::ExternalBlocker
        );
        assert!(matches!(
            "lazy".parse::<ShortfallReason>(),
            Err(ShortfallError::UnknownReason(_))
        ));
    }
}
