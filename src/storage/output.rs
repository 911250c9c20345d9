//! Output storage: create, load, list, edit recurrence, and change status.
//!
//! Recurrence edits are audited in `output_change` with the old and new
//! values serialized as JSON.

use jiff::Timestamp;
use rusqlite::{OptionalExtension, Row, params, params_from_iter};
use uuid::Uuid;

use crate::model::{Frequency, FrequencyDraft, Output, OutputChange, OutputStatus};

use super::{
    Result, Storage, StorageError, parse_timestamp, parse_uuid, placeholders, timestamp_text,
};

const COLUMNS: &str = "id, outcome_id, description, frequency_type, frequency_value, \
                       schedule_weekdays, is_starter, status, created_at";

impl Storage {
    /// Inserts an output. Fails if its outcome does not exist.
    pub fn create_output(&self, output: &Output) -> Result<()> {
        self.load_outcome(output.outcome_id)?;
        let weekdays = weekdays_column(&output.frequency)?;
        self.conn.execute(
            &format!("INSERT INTO output ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"),
            params![
                output.id.to_string(),
                output.outcome_id.to_string(),
                &output.description,
                output.frequency.kind().as_str(),
                output.frequency.value(),
                weekdays,
                output.is_starter,
                output.status.as_str(),
                timestamp_text(output.created_at),
            ],
        )?;
        tracing::debug!(id = %output.id, outcome = %output.outcome_id, "output created");
        Ok(())
    }

    pub fn load_output(&self, id: Uuid) -> Result<Output> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM output WHERE id = ?1"),
                [id.to_string()],
                read_row,
            )
            .optional()?;
        into_output(row.ok_or(StorageError::OutputNotFound(id))?)
    }

    /// Lists outputs, oldest first.
    ///
    /// `outcome_ids` restricts to those outcomes when given; `status`
    /// filters when given.
    pub fn list_outputs(
        &self,
        outcome_ids: Option<&[Uuid]>,
        status: Option<OutputStatus>,
    ) -> Result<Vec<Output>> {
        let mut sql = format!("SELECT {COLUMNS} FROM output WHERE (?1 IS NULL OR status = ?1)");
        let mut args: Vec<Option<String>> = vec![status.map(|s| s.as_str().to_string())];
        if let Some(ids) = outcome_ids {
            if ids.is_empty() {
                return Ok(Vec::new());
            }
            sql.push_str(&format!(" AND outcome_id IN ({})", placeholders(2, ids.len())));
            args.extend(ids.iter().map(|id| Some(id.to_string())));
        }
        sql.push_str(" ORDER BY created_at ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), read_row)?;
        let mut outputs = Vec::new();
        for row in rows {
            outputs.push(into_output(row?)?);
        }
        Ok(outputs)
    }

    /// Number of outputs under an outcome, in any status.
    pub fn count_outputs(&self, outcome_id: Uuid) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM output WHERE outcome_id = ?1",
            [outcome_id.to_string()],
            |row| row.get(0),
        )?;
        usize::try_from(count).map_err(|e| StorageError::Corrupt(format!("invalid count: {e}")))
    }

    /// Replaces an output's recurrence and records the change.
    ///
    /// Returns the updated output. No write happens if nothing changed.
    pub fn update_output_frequency(
        &self,
        id: Uuid,
        frequency: &Frequency,
        reason: Option<&str>,
    ) -> Result<Output> {
        let mut output = self.load_output(id)?;
        if output.frequency == *frequency {
            return Ok(output);
        }

        let change = OutputChange {
            output_id: id,
            change_type: "frequency".to_string(),
            old_value: output.frequency.clone(),
            new_value: frequency.clone(),
            reason: reason.map(str::trim).filter(|r| !r.is_empty()).map(String::from),
            changed_at: Timestamp::now(),
        };

        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "UPDATE output
             SET frequency_type = ?1, frequency_value = ?2, schedule_weekdays = ?3
             WHERE id = ?4",
            params![
                frequency.kind().as_str(),
                frequency.value(),
                weekdays_column(frequency)?,
                id.to_string(),
            ],
        )?;
        tx.execute(
            "INSERT INTO output_change
                 (output_id, change_type, old_value, new_value, reason, changed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.to_string(),
                &change.change_type,
                serde_json::to_string(&change.old_value)?,
                serde_json::to_string(&change.new_value)?,
                &change.reason,
                timestamp_text(change.changed_at),
            ],
        )?;
        tx.commit()?;

        tracing::debug!(%id, old = %change.old_value, new = %change.new_value, "output frequency changed");
        output.frequency = change.new_value;
        Ok(output)
    }

    pub fn update_output_description(&self, id: Uuid, description: &str) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE output SET description = ?1 WHERE id = ?2",
            params![description.trim(), id.to_string()],
        )?;
        if rows == 0 {
            return Err(StorageError::OutputNotFound(id));
        }
        Ok(())
    }

    pub fn set_output_status(&self, id: Uuid, status: OutputStatus) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE output SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.to_string()],
        )?;
        if rows == 0 {
            return Err(StorageError::OutputNotFound(id));
        }
        tracing::debug!(%id, %status, "output status changed");
        Ok(())
    }

    /// Audit trail for one output, oldest first.
    pub fn list_output_changes(&self, output_id: Uuid) -> Result<Vec<OutputChange>> {
        let mut stmt = self.conn.prepare(
            "SELECT change_type, old_value, new_value, reason, changed_at
             FROM output_change WHERE output_id = ?1 ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([output_id.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut changes = Vec::new();
        for row in rows {
            let (change_type, old_value, new_value, reason, changed_at) = row?;
            changes.push(OutputChange {
                output_id,
                change_type,
                old_value: serde_json::from_str(&old_value)?,
                new_value: serde_json::from_str(&new_value)?,
                reason,
                changed_at: parse_timestamp(&changed_at, "output change changed_at")?,
            });
        }
        Ok(changes)
    }
}

/// `schedule_weekdays` is a JSON array for fixed weekly outputs and NULL
/// otherwise.
fn weekdays_column(frequency: &Frequency) -> Result<Option<String>> {
    match frequency {
        Frequency::FixedWeekly { weekdays } => Ok(Some(serde_json::to_string(weekdays)?)),
        Frequency::Daily | Frequency::FlexibleWeekly { .. } => Ok(None),
    }
}

type OutputRow = (
    String,
    String,
    String,
    String,
    i64,
    Option<String>,
    bool,
    String,
    String,
);

fn read_row(row: &Row<'_>) -> rusqlite::Result<OutputRow> {
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

/// Parses raw column values into an output, re-validating the recurrence.
fn into_output(
    (id, outcome_id, description, kind, value, weekdays, is_starter, status, created_at): OutputRow,
) -> Result<Output> {
    let id = parse_uuid(&id, "output id")?;
    let weekdays: Vec<u8> = match weekdays {
        Some(json) => serde_json::from_str(&json)?,
        None => Vec::new(),
    };
    let draft = FrequencyDraft {
        kind: kind.parse()?,
        value,
        weekdays,
    };
    let frequency = Frequency::from_draft(&draft)
        .map_err(|e| StorageError::Corrupt(format!("output {id} has invalid frequency: {e}")))?;

    Ok(Output {
        id,
        outcome_id: parse_uuid(&outcome_id, "output outcome_id")?,
        description,
        frequency,
        is_starter,
        status: status.parse().map_err(StorageError::Corrupt)?,
        created_at: parse_timestamp(&created_at, "output created_at")?,
    })
}
