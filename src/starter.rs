//! Starter mode: a gentler first schedule for a new outcome.
//!
//! Only consulted when creating the first output of an outcome. Every rule
//! lands on a draft that no rule fires on again, so accepting a suggestion
//! and re-checking it yields nothing.

use crate::model::{FrequencyDraft, FrequencyKind, OutputDraft};

/// Largest schedule the advisor leaves alone.
const STARTER_TIMES: i64 = 3;

/// A proposed replacement draft and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarterSuggestion {
    pub draft: OutputDraft,
    pub reason: &'static str,
}

/// Proposes a lower-intensity draft, or `None` if the draft is already
/// modest enough. Pure: the input is never modified.
///
/// Flexible targets above 3 are halved (rounding up) and then capped at 3,
/// so 7 per week becomes 3, not 4.
pub fn suggest_starter(draft: &OutputDraft) -> Option<StarterSuggestion> {
    let frequency = &draft.frequency;
    let (revised, reason) = match frequency.kind {
        FrequencyKind::Daily => (
            FrequencyDraft::flexible_weekly(STARTER_TIMES),
            "Daily commitments are often too aggressive at the start. Try 3x/week first.",
        ),
        FrequencyKind::FixedWeekly => {
            let mut weekdays = frequency.weekdays.clone();
            weekdays.sort_unstable();
            weekdays.dedup();
            if i64::try_from(weekdays.len()).unwrap_or(i64::MAX) <= STARTER_TIMES {
                return None;
            }
            weekdays.truncate(3);
            (
                FrequencyDraft::fixed_weekly(weekdays),
                "A smaller fixed schedule is easier to sustain while building consistency.",
            )
        }
        FrequencyKind::FlexibleWeekly => {
            if frequency.value <= STARTER_TIMES {
                return None;
            }
            let halved = (frequency.value + 1) / 2;
            (
                FrequencyDraft::flexible_weekly(halved.clamp(1, STARTER_TIMES)),
                "Reducing weekly target helps avoid early burnout.",
            )
        }
    };

    Some(StarterSuggestion {
        draft: OutputDraft {
            description: draft.description.clone(),
            frequency: revised,
            starter_applied: true,
        },
        reason,
    })
}
