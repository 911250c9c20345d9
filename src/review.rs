//! Weekly review: per-outcome rates, per-output week views, shortfalls
//! waiting for a reason, skill activity, and the week's reflection.
//!
//! Tags are matched to candidates by `(output, anchor)`. A tag whose
//! candidate no longer exists (the week was completed after tagging) is
//! kept and reported as stale rather than dropped.

use jiff::civil::Date;
use serde::Serialize;
use uuid::Uuid;

use crate::accounting::{DayStatus, WeekSummary, day_status, outcome_completion_rate, week_summary};
use crate::model::{
    ActionLogIndex, Frequency, Outcome, OutcomeStatus, Output, OutputStatus, Reflection, ShortfallTag,
    SkillItem, SkillLog,
};
use crate::shortfall::{ShortfallCandidate, shortfalls_for};
use crate::skill::{SkillSummary, weekly_summaries};
use crate::week::{WeekStart, WeekWindow};

#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReview {
    pub week: WeekWindow,
    pub outcomes: Vec<OutcomeReview>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutcomeReview {
    pub outcome: Outcome,
    pub completion_rate: u8,
    pub outputs: Vec<OutputReview>,
    pub reflection: Option<Reflection>,
    /// Empty until [`WeeklyReview::with_skills`] is applied.
    pub skills: SkillSummary,
}

impl WeeklyReview {
    /// Attaches each outcome's skill activity for the week. `logs` should
    /// reach back before the week so prior confidence is known.
    #[must_use]
    pub fn with_skills(mut self, skills: &[SkillItem], logs: &[SkillLog]) -> Self {
        let ids: Vec<Uuid> = self.outcomes.iter().map(|o| o.outcome.id).collect();
        let summaries = weekly_summaries(&ids, self.week, skills, logs);
        for outcome in &mut self.outcomes {
            if let Some(summary) = summaries.get(&outcome.outcome.id) {
                outcome.skills = *summary;
            }
        }
        self
    }
}

impl OutcomeReview {
    /// Shortfalls that still have no reason attached.
    pub fn untagged_count(&self) -> usize {
        self.outputs
            .iter()
            .flat_map(|o| &o.shortfalls)
            .filter(|s| s.tag.is_none())
            .count()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OutputReview {
    pub output: Output,
    pub week: OutputWeek,
    pub shortfalls: Vec<TaggedShortfall>,
    /// Tags saved for this week that match no current candidate.
    pub stale_tags: Vec<ShortfallTag>,
}

/// How one output's week is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputWeek {
    Days { statuses: [DayStatus; 7] },
    Flexible { summary: WeekSummary },
}

#[derive(Debug, Clone, Serialize)]
pub struct TaggedShortfall {
    pub candidate: ShortfallCandidate,
    pub tag: Option<ShortfallTag>,
}

/// Builds the review for the week containing `anchor`.
///
/// `logs`, `tags`, and `reflections` should already be limited to that
/// week; tags and reflections outside it are ignored.
pub fn weekly_review(
    anchor: Date,
    week_start: WeekStart,
    outcomes: &[Outcome],
    outputs: &[Output],
    logs: &ActionLogIndex,
    tags: &[ShortfallTag],
    reflections: &[Reflection],
) -> WeeklyReview {
    let week = WeekWindow::containing(anchor, week_start);
    let days = week.days();

    let outcomes = outcomes
        .iter()
        .filter(|outcome| outcome.status == OutcomeStatus::Active)
        .map(|outcome| {
            let active: Vec<&Output> = outputs
                .iter()
                .filter(|o| o.outcome_id == outcome.id && o.status == OutputStatus::Active)
                .collect();

            OutcomeReview {
                outcome: outcome.clone(),
                completion_rate: outcome_completion_rate(active.iter().copied(), &days, logs),
                outputs: active
                    .iter()
                    .map(|output| review_output(output, &days, logs, tags, week.start))
                    .collect(),
                reflection: reflections
                    .iter()
                    .find(|r| r.outcome_id == outcome.id && r.week_start == week.start)
                    .cloned(),
                skills: SkillSummary::default(),
            }
        })
        .collect();

    WeeklyReview { week, outcomes }
}

fn review_output(
    output: &Output,
    days: &[Date; 7],
    logs: &ActionLogIndex,
    tags: &[ShortfallTag],
    week_start: Date,
) -> OutputReview {
    let view = match output.frequency {
        Frequency::FlexibleWeekly { .. } => OutputWeek::Flexible {
            summary: week_summary(output, days, logs),
        },
        Frequency::Daily | Frequency::FixedWeekly { .. } => OutputWeek::Days {
            statuses: (*days).map(|day| day_status(output, day, logs.get(output.id, day))),
        },
    };

    let candidates = shortfalls_for(output, days, logs, week_start);
    let own_tags: Vec<&ShortfallTag> = tags
        .iter()
        .filter(|t| t.output_id == output.id && in_week(t, days, week_start))
        .collect();

    let stale_tags = own_tags
        .iter()
        .filter(|t| !candidates.iter().any(|c| c.anchor == t.anchor))
        .map(|t| (*t).clone())
        .collect();
    let shortfalls = candidates
        .into_iter()
        .map(|candidate| TaggedShortfall {
            tag: own_tags
                .iter()
                .find(|t| t.anchor == candidate.anchor)
                .map(|t| (*t).clone()),
            candidate,
        })
        .collect();

    OutputReview {
        output: output.clone(),
        week: view,
        shortfalls,
        stale_tags,
    }
}

fn in_week(tag: &ShortfallTag, days: &[Date; 7], week_start: Date) -> bool {
    match tag.anchor.occurrence_date() {
        Some(date) => days.contains(&date),
        None => tag.anchor.week_start() == Some(week_start),
    }
}
