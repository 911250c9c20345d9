//! Completion records, one per `(output, date)`.

use jiff::civil::Date;
use rusqlite::{params, params_from_iter};
use uuid::Uuid;

use crate::model::{ActionLog, ActionLogIndex};
use crate::week::WeekWindow;

use super::skill::delete_logs_for_action;
use super::{Result, Storage, StorageError, parse_date, parse_uuid, placeholders};

impl Storage {
    /// Writes a completion record, replacing any record for the same
    /// output and date.
    ///
    /// A record with nothing completed drops the skill ratings attached to
    /// it.
    pub fn upsert_action_log(&self, log: &ActionLog) -> Result<()> {
        self.load_output(log.output_id)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO action_log (output_id, action_date, completed, total, notes)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (output_id, action_date) DO UPDATE SET
                 completed = excluded.completed,
                 total = excluded.total,
                 notes = excluded.notes",
            params![
                log.output_id.to_string(),
                log.date.to_string(),
                log.completed,
                log.total,
                &log.notes,
            ],
        )?;
        if log.completed == 0 {
            let dropped = delete_logs_for_action(&tx, log.output_id, log.date)?;
            if dropped > 0 {
                tracing::debug!(output = %log.output_id, date = %log.date, dropped, "skill ratings dropped");
            }
        }
        tx.commit()?;
        tracing::debug!(output = %log.output_id, date = %log.date, completed = log.completed, total = log.total, "action logged");
        Ok(())
    }

    /// All records for the given outputs with dates in `from..=to`.
    pub fn load_action_logs(
        &self,
        output_ids: &[Uuid],
        from: Date,
        to: Date,
    ) -> Result<Vec<ActionLog>> {
        if output_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT output_id, action_date, completed, total, notes
             FROM action_log
             WHERE action_date BETWEEN ?1 AND ?2 AND output_id IN ({})
             ORDER BY action_date ASC",
            placeholders(3, output_ids.len())
        );
        let args = [from.to_string(), to.to_string()]
            .into_iter()
            .chain(output_ids.iter().map(Uuid::to_string));

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(args), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i64>(2)?,
                row.get::<_, i64>(3)?,
                row.get::<_, Option<String>>(4)?,
            ))
        })?;

        let mut logs = Vec::new();
        for row in rows {
            let (output_id, date, completed, total, notes) = row?;
            logs.push(ActionLog {
                output_id: parse_uuid(&output_id, "action log output_id")?,
                date: parse_date(&date, "action log date")?,
                completed: count(completed)?,
                total: count(total)?,
                notes,
            });
        }
        Ok(logs)
    }

    /// Records for one week, keyed for accounting lookups.
    pub fn action_log_index(&self, output_ids: &[Uuid], week: WeekWindow) -> Result<ActionLogIndex> {
        Ok(self
            .load_action_logs(output_ids, week.start, week.end)?
            .into_iter()
            .collect())
    }
}

fn count(n: i64) -> Result<u32> {
    u32::try_from(n).map_err(|_| StorageError::Corrupt(format!("invalid action count: {n}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::model::FrequencyDraft;
    use crate::storage::test_support::{sample_outcome, sample_output, test_storage};
    use crate::week::WeekStart;

    #[test]
    fn upsert_replaces_same_day_record() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let output = sample_output(&storage, &outcome, FrequencyDraft::daily());
        let day = date(2026, 2, 23);

        storage
            .upsert_action_log(&ActionLog::new(output.id, day, 1, 3, "slow start"))
            .unwrap();
        storage
            .upsert_action_log(&ActionLog::new(output.id, day, 3, 3, ""))
            .unwrap();

        let logs = storage.load_action_logs(&[output.id], day, day).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].completed, 3);
        assert_eq!(logs[0].notes, None);
    }

    #[test]
    fn load_is_bounded_by_dates_and_outputs() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let a = sample_output(&storage, &outcome, FrequencyDraft::daily());
        let b = sample_output(&storage, &outcome, FrequencyDraft::daily());

        for day in [date(2026, 2, 22), date(2026, 2, 23), date(2026, 3, 1), date(2026, 3, 2)] {
            storage.upsert_action_log(&ActionLog::new(a.id, day, 1, 1, "")).unwrap();
        }
        storage
            .upsert_action_log(&ActionLog::new(b.id, date(2026, 2, 24), 1, 1, ""))
            .unwrap();

        let week = WeekWindow::containing(date(2026, 2, 26), WeekStart::Monday);
        let index = storage.action_log_index(&[a.id], week).unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.get(a.id, date(2026, 2, 23)).is_some());
        assert!(index.get(a.id, date(2026, 3, 1)).is_some());
        assert!(index.get(b.id, date(2026, 2, 24)).is_none());

        assert!(storage.load_action_logs(&[], week.start, week.end).unwrap().is_empty());
    }

    #[test]
    fn upsert_for_missing_output_fails() {
        let (_dir, storage) = test_storage();
        let log = ActionLog::new(Uuid::new_v4(), date(2026, 2, 23), 1, 1, "");
        assert!(matches!(
            storage.upsert_action_log(&log).unwrap_err(),
            StorageError::OutputNotFound(_)
        ));
    }
}
