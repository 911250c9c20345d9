//! Skill progression: when a skill is ready to graduate, and how skills
//! moved over a week.
//!
//! Recency is by practice day first, then by when the rating was saved.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::model::{SkillItem, SkillLog, SkillStage};
use crate::week::WeekWindow;

/// Consecutive recent ratings needed to graduate.
pub const GRADUATION_STREAK: usize = 3;

/// Lowest confidence that counts toward graduation.
pub const GRADUATION_CONFIDENCE: u8 = 4;

/// Whether an active skill has earned a move to review.
///
/// The last [`GRADUATION_STREAK`] ratings since any suppression must all
/// be at least [`GRADUATION_CONFIDENCE`], and must meet the target value
/// when the skill has one. `logs` may include other skills' logs.
pub fn graduation_eligible(skill: &SkillItem, logs: &[SkillLog]) -> bool {
    if skill.stage != SkillStage::Active {
        return false;
    }

    let mut recent: Vec<&SkillLog> = logs
        .iter()
        .filter(|l| l.skill_id == skill.id)
        .filter(|l| {
            skill
                .graduation_suppressed_at
                .is_none_or(|at| l.logged_at > at)
        })
        .collect();
    if recent.len() < GRADUATION_STREAK {
        return false;
    }
    sort_newest_first(&mut recent);

    recent.iter().take(GRADUATION_STREAK).all(|log| {
        log.confidence >= GRADUATION_CONFIDENCE
            && skill
                .target
                .value
                .is_none_or(|target| log.target_result.is_some_and(|r| r >= target))
    })
}

/// Skill activity for one outcome over one week.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SkillSummary {
    /// Skills with at least one rating dated inside the week.
    pub skills_worked_count: usize,
    /// Mean change from each worked skill's prior confidence to its latest
    /// rating in the week. `None` when nothing was worked.
    pub average_confidence_delta: Option<f64>,
}

/// Summaries for every outcome in `outcome_ids`, including those with no
/// skills.
///
/// A skill's prior confidence is its latest rating dated before the week,
/// or its initial confidence if it has none.
pub fn weekly_summaries(
    outcome_ids: &[Uuid],
    week: WeekWindow,
    skills: &[SkillItem],
    logs: &[SkillLog],
) -> HashMap<Uuid, SkillSummary> {
    let mut by_skill: HashMap<Uuid, Vec<&SkillLog>> = HashMap::new();
    for log in logs {
        by_skill.entry(log.skill_id).or_default().push(log);
    }
    for list in by_skill.values_mut() {
        sort_newest_first(list);
    }

    outcome_ids
        .iter()
        .map(|&outcome_id| {
            let deltas: Vec<f64> = skills
                .iter()
                .filter(|s| s.outcome_id == outcome_id)
                .filter_map(|skill| {
                    let logs = by_skill.get(&skill.id)?;
                    let latest = logs.iter().find(|l| week.contains(l.action_date))?;
                    let prior = logs
                        .iter()
                        .find(|l| l.action_date < week.start)
                        .map_or(skill.initial_confidence, |l| l.confidence);
                    Some(f64::from(latest.confidence) - f64::from(prior))
                })
                .collect();

            let summary = SkillSummary {
                skills_worked_count: deltas.len(),
                average_confidence_delta: mean(&deltas),
            };
            (outcome_id, summary)
        })
        .collect()
}

fn sort_newest_first(logs: &mut [&SkillLog]) {
    logs.sort_by(|a, b| {
        (b.action_date, b.logged_at).cmp(&(a.action_date, a.logged_at))
    });
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> Option<f64> {
    (!values.is_empty()).then(|| values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::{Date, date};
    use jiff::tz::TimeZone;
    use jiff::{Timestamp, ToSpan};

    use crate::model::SkillTarget;
    use crate::week::WeekStart;

    fn skill(target: Option<f64>) -> SkillItem {
        let target = SkillTarget::new(Some("bpm"), target).unwrap();
        SkillItem::new(Uuid::new_v4(), "Barre chords", 2, target).unwrap()
    }

    fn rating(skill: &SkillItem, day: Date, confidence: u8, result: Option<f64>) -> SkillLog {
        let noon = day.at(12, 0, 0, 0).to_zoned(TimeZone::UTC).unwrap().timestamp();
        SkillLog {
            id: Uuid::new_v4(),
            skill_id: skill.id,
            output_id: Uuid::nil(),
            action_date: day,
            confidence,
            target_result: result,
            logged_at: noon,
        }
    }

    #[test]
    fn three_strong_ratings_graduate() {
        let s = skill(None);
        let logs = [
            rating(&s, date(2026, 2, 20), 2, None),
            rating(&s, date(2026, 2, 21), 4, None),
            rating(&s, date(2026, 2, 22), 5, None),
            rating(&s, date(2026, 2, 23), 4, None),
        ];
        assert!(graduation_eligible(&s, &logs));
        assert!(!graduation_eligible(&s, &logs[..3]));
    }

    #[test]
    fn target_must_be_met_on_each_rating() {
        let s = skill(Some(120.0));
        let mut logs = vec![
            rating(&s, date(2026, 2, 21), 5, Some(120.0)),
            rating(&s, date(2026, 2, 22), 5, Some(125.0)),
            rating(&s, date(2026, 2, 23), 5, None),
        ];
        assert!(!graduation_eligible(&s, &logs));

        logs[2].target_result = Some(130.0);
        assert!(graduation_eligible(&s, &logs));
    }

    #[test]
    fn suppression_resets_the_streak() {
        let mut s = skill(None);
        let logs: Vec<SkillLog> = (21..=23)
            .map(|d| rating(&s, date(2026, 2, d), 5, None))
            .collect();
        s.graduation_suppressed_at = Some(logs[1].logged_at);
        assert!(!graduation_eligible(&s, &logs));

        s.graduation_suppressed_at = Some(logs[0].logged_at - 1.hour());
        assert!(graduation_eligible(&s, &logs));
    }

    #[test]
    fn only_active_skills_graduate() {
        let mut s = skill(None);
        let logs: Vec<SkillLog> = (21..=23)
            .map(|d| rating(&s, date(2026, 2, d), 5, None))
            .collect();
        s.stage = SkillStage::Review;
        assert!(!graduation_eligible(&s, &logs));
    }

    #[test]
    fn weekly_summary_measures_change_from_prior_rating() {
        let week = WeekWindow::containing(date(2026, 2, 25), WeekStart::Monday);
        let worked = skill(None);
        let fresh = SkillItem {
            outcome_id: worked.outcome_id,
            ..skill(None)
        };
        let idle = SkillItem {
            outcome_id: worked.outcome_id,
            ..skill(None)
        };
        let logs = [
            rating(&worked, date(2026, 2, 20), 2, None),
            rating(&worked, date(2026, 2, 24), 3, None),
            rating(&worked, date(2026, 2, 26), 4, None),
            // Initial confidence 2, now 3.
            rating(&fresh, date(2026, 2, 23), 3, None),
            rating(&idle, date(2026, 2, 16), 5, None),
        ];
        let empty_outcome = Uuid::new_v4();

        let summaries = weekly_summaries(
            &[worked.outcome_id, empty_outcome],
            week,
            &[worked.clone(), fresh, idle],
            &logs,
        );

        let summary = summaries[&worked.outcome_id];
        assert_eq!(summary.skills_worked_count, 2);
        assert_eq!(summary.average_confidence_delta, Some(1.5));
        assert_eq!(summaries[&empty_outcome], SkillSummary::default());
    }

    #[test]
    fn same_day_ratings_use_save_time() {
        let s = skill(None);
        let day = date(2026, 2, 23);
        let mut later = rating(&s, day, 1, None);
        later.logged_at = Timestamp::from_second(later.logged_at.as_second() + 60).unwrap();
        let earlier = rating(&s, day, 5, None);

        let week = WeekWindow::containing(day, WeekStart::Monday);
        let summaries = weekly_summaries(&[s.outcome_id], week, &[s.clone()], &[earlier, later]);
        assert_eq!(summaries[&s.outcome_id].average_confidence_delta, Some(-1.0));
    }
}
