//! Skill storage: skill items per outcome and the confidence ratings
//! attached to action logs.
//!
//! Ratings are keyed by `(skill, output, action date)`, so each action log
//! holds at most one rating per skill.

use std::collections::HashMap;

use jiff::Timestamp;
use jiff::civil::Date;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use uuid::Uuid;

use crate::model::{SkillItem, SkillLog, SkillLogDraft, SkillStage, SkillTarget};

use super::{
    Result, Storage, StorageError, parse_date, parse_timestamp, parse_uuid, placeholders,
    timestamp_text,
};

const COLUMNS: &str = "id, outcome_id, name, stage, target_label, target_value, \
                       initial_confidence, graduation_suppressed_at, created_at";

const LOG_COLUMNS: &str = "id, skill_id, output_id, action_date, confidence, target_result, logged_at";

impl Storage {
    /// Inserts a skill. Fails if the outcome is missing or already has a
    /// live skill with the same name.
    pub fn create_skill(&self, skill: &SkillItem) -> Result<()> {
        self.load_outcome(skill.outcome_id)?;
        self.check_live_name(skill)?;
        self.conn.execute(
            &format!("INSERT INTO skill ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                skill.id.to_string(),
                skill.outcome_id.to_string(),
                &skill.name,
                skill.stage.as_str(),
                &skill.target.label,
                skill.target.value,
                skill.initial_confidence,
                skill.graduation_suppressed_at.map(timestamp_text),
                timestamp_text(skill.created_at),
            ],
        )?;
        tracing::debug!(id = %skill.id, outcome = %skill.outcome_id, "skill created");
        Ok(())
    }

    pub fn load_skill(&self, id: Uuid) -> Result<SkillItem> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM skill WHERE id = ?1"),
                [id.to_string()],
                read_row,
            )
            .optional()?;
        into_skill(row.ok_or(StorageError::SkillNotFound(id))?)
    }

    /// Lists skills, oldest first.
    ///
    /// `outcome_ids` restricts to those outcomes when given; `live_only`
    /// keeps active and review skills.
    pub fn list_skills(&self, outcome_ids: Option<&[Uuid]>, live_only: bool) -> Result<Vec<SkillItem>> {
        let mut conditions = Vec::new();
        let mut args: Vec<String> = Vec::new();
        if live_only {
            conditions.push("stage IN ('active', 'review')".to_string());
        }
        if let Some(ids) = outcome_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            conditions.push(format!("outcome_id IN ({})", placeholders(1, ids.len())));
            args.extend(ids.iter().map(Uuid::to_string));
        }
        let mut sql = format!("SELECT {COLUMNS} FROM skill");
        if !conditions.is_empty() {
            sql.push_str(&format!(" WHERE {}", conditions.join(" AND ")));
        }
        sql.push_str(" ORDER BY created_at ASC, rowid ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), read_row)?;
        let mut skills = Vec::new();
        for row in rows {
            skills.push(into_skill(row?)?);
        }
        Ok(skills)
    }

    /// Saves name, target, and initial confidence.
    pub fn update_skill(&self, skill: &SkillItem) -> Result<()> {
        self.check_live_name(skill)?;
        let rows = self.conn.execute(
            "UPDATE skill
             SET name = ?1, target_label = ?2, target_value = ?3, initial_confidence = ?4
             WHERE id = ?5",
            params![
                &skill.name,
                &skill.target.label,
                skill.target.value,
                skill.initial_confidence,
                skill.id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StorageError::SkillNotFound(skill.id));
        }
        Ok(())
    }

    /// Moves a skill to `stage`. Moving to review clears any graduation
    /// suppression.
    pub fn set_skill_stage(&self, id: Uuid, stage: SkillStage) -> Result<SkillItem> {
        let mut skill = self.load_skill(id)?;
        skill.stage = stage;
        if stage == SkillStage::Review {
            skill.graduation_suppressed_at = None;
        }
        if stage.is_live() {
            self.check_live_name(&skill)?;
        }
        self.conn.execute(
            "UPDATE skill SET stage = ?1, graduation_suppressed_at = ?2 WHERE id = ?3",
            params![
                stage.as_str(),
                skill.graduation_suppressed_at.map(timestamp_text),
                id.to_string(),
            ],
        )?;
        tracing::debug!(%id, %stage, "skill stage changed");
        Ok(skill)
    }

    /// Dismisses the current graduation prompt. Only ratings saved after
    /// `at` count toward the next one.
    pub fn suppress_graduation(&self, id: Uuid, at: Timestamp) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE skill SET graduation_suppressed_at = ?1 WHERE id = ?2",
            [timestamp_text(at), id.to_string()],
        )?;
        if rows == 0 {
            return Err(StorageError::SkillNotFound(id));
        }
        Ok(())
    }

    /// Makes the ratings on one action log exactly `entries`.
    ///
    /// Existing ratings for listed skills are updated in place, new ones are
    /// inserted, and ratings for skills not listed are deleted. Returns the
    /// skills that got a new rating. Fails if nothing is logged for the
    /// output on that day.
    pub fn replace_skill_logs(
        &self,
        output_id: Uuid,
        action_date: Date,
        entries: &[SkillLogDraft],
    ) -> Result<Vec<Uuid>> {
        let logged: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM action_log WHERE output_id = ?1 AND action_date = ?2",
                [output_id.to_string(), action_date.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        if logged.is_none() {
            return Err(StorageError::ActionLogNotFound {
                output_id,
                date: action_date,
            });
        }
        for entry in entries {
            self.load_skill(entry.skill_id)?;
        }

        let tx = self.conn.unchecked_transaction()?;
        let mut existing: HashMap<Uuid, Uuid> = logs_for_action(&tx, output_id, action_date)?
            .into_iter()
            .map(|log| (log.skill_id, log.id))
            .collect();

        let now = Timestamp::now();
        let mut created = Vec::new();
        for entry in entries {
            if let Some(id) = existing.get(&entry.skill_id) {
                tx.execute(
                    "UPDATE skill_log SET confidence = ?1, target_result = ?2 WHERE id = ?3",
                    params![entry.confidence, entry.target_result, id.to_string()],
                )?;
            } else {
                let id = Uuid::new_v4();
                tx.execute(
                    &format!("INSERT INTO skill_log ({LOG_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                    params![
                        id.to_string(),
                        entry.skill_id.to_string(),
                        output_id.to_string(),
                        action_date.to_string(),
                        entry.confidence,
                        entry.target_result,
                        timestamp_text(now),
                    ],
                )?;
                existing.insert(entry.skill_id, id);
                created.push(entry.skill_id);
            }
        }

        for (skill_id, id) in &existing {
            if !entries.iter().any(|e| e.skill_id == *skill_id) {
                tx.execute("DELETE FROM skill_log WHERE id = ?1", [id.to_string()])?;
            }
        }
        tx.commit()?;
        tracing::debug!(output = %output_id, date = %action_date, rated = entries.len(), "skill ratings replaced");
        Ok(created)
    }

    /// Ratings attached to one action log.
    pub fn load_skill_logs_for_action(&self, output_id: Uuid, action_date: Date) -> Result<Vec<SkillLog>> {
        logs_for_action(&self.conn, output_id, action_date)
    }

    /// Ratings for the given skills, newest practice day first. `until`
    /// bounds the action date when given.
    pub fn load_skill_logs(&self, skill_ids: &[Uuid], until: Option<Date>) -> Result<Vec<SkillLog>> {
        if skill_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {LOG_COLUMNS} FROM skill_log
             WHERE (?1 IS NULL OR action_date <= ?1) AND skill_id IN ({})
             ORDER BY action_date DESC, logged_at DESC",
            placeholders(2, skill_ids.len())
        );
        let args = std::iter::once(until.map(|d| d.to_string()))
            .chain(skill_ids.iter().map(|id| Some(id.to_string())));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), read_log_row)?;
        let mut logs = Vec::new();
        for row in rows {
            logs.push(into_skill_log(row?)?);
        }
        Ok(logs)
    }

    /// Fails if another live skill under the same outcome has this name.
    fn check_live_name(&self, skill: &SkillItem) -> Result<()> {
        if !skill.stage.is_live() {
            return Ok(());
        }
        let clash: Option<String> = self
            .conn
            .query_row(
                "SELECT id FROM skill
                 WHERE outcome_id = ?1 AND name = ?2 AND id <> ?3
                   AND stage IN ('active', 'review')",
                [skill.outcome_id.to_string(), skill.name.clone(), skill.id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        match clash {
            Some(_) => Err(StorageError::DuplicateSkillName(skill.name.clone())),
            None => Ok(()),
        }
    }
}

/// Deletes every rating on one action log. Runs inside the caller's
/// transaction.
pub(super) fn delete_logs_for_action(conn: &Connection, output_id: Uuid, action_date: Date) -> Result<usize> {
    Ok(conn.execute(
        "DELETE FROM skill_log WHERE output_id = ?1 AND action_date = ?2",
        [output_id.to_string(), action_date.to_string()],
    )?)
}

fn logs_for_action(conn: &Connection, output_id: Uuid, action_date: Date) -> Result<Vec<SkillLog>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {LOG_COLUMNS} FROM skill_log
         WHERE output_id = ?1 AND action_date = ?2
         ORDER BY logged_at ASC"
    ))?;
    let rows = stmt.query_map(
        [output_id.to_string(), action_date.to_string()],
        read_log_row,
    )?;
    let mut logs = Vec::new();
    for row in rows {
        logs.push(into_skill_log(row?)?);
    }
    Ok(logs)
}

type SkillRow = (
    String,
    String,
    String,
    String,
    Option<String>,
    Option<f64>,
    i64,
    Option<String>,
    String,
);

fn read_row(row: &Row<'_>) -> rusqlite::Result<SkillRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
    ))
}

fn into_skill(
    (id, outcome_id, name, stage, label, value, confidence, suppressed_at, created_at): SkillRow,
) -> Result<SkillItem> {
    Ok(SkillItem {
        id: parse_uuid(&id, "skill id")?,
        outcome_id: parse_uuid(&outcome_id, "skill outcome_id")?,
        name,
        stage: stage.parse()?,
        target: SkillTarget { label, value },
        initial_confidence: confidence_column(confidence)?,
        graduation_suppressed_at: suppressed_at
            .map(|s| parse_timestamp(&s, "skill graduation_suppressed_at"))
            .transpose()?,
        created_at: parse_timestamp(&created_at, "skill created_at")?,
    })
}

type SkillLogRow = (String, String, String, String, i64, Option<f64>, String);

fn read_log_row(row: &Row<'_>) -> rusqlite::Result<SkillLogRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
    ))
}

fn into_skill_log(
    (id, skill_id, output_id, action_date, confidence, target_result, logged_at): SkillLogRow,
) -> Result<SkillLog> {
    Ok(SkillLog {
        id: parse_uuid(&id, "skill log id")?,
        skill_id: parse_uuid(&skill_id, "skill log skill_id")?,
        output_id: parse_uuid(&output_id, "skill log output_id")?,
        action_date: parse_date(&action_date, "skill log action_date")?,
        confidence: confidence_column(confidence)?,
        target_result,
        logged_at: parse_timestamp(&logged_at, "skill log logged_at")?,
    })
}

fn confidence_column(n: i64) -> Result<u8> {
    u8::try_from(n).map_err(|_| StorageError::Corrupt(format!("invalid confidence: {n}")))
}
