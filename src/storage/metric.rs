//! Metric storage: definitions per outcome and dated entries per metric.
//!
//! Saving a metric as primary clears the flag on its siblings in the same
//! transaction; a partial unique index backs this up.

use jiff::civil::Date;
use rusqlite::{OptionalExtension, Row, params};
use uuid::Uuid;

use crate::model::{Metric, MetricEntry};

use super::{Result, Storage, StorageError, parse_date, parse_timestamp, parse_uuid, timestamp_text};

const COLUMNS: &str = "id, outcome_id, name, unit, is_primary, created_at";

impl Storage {
    /// Inserts a metric. Fails if its outcome does not exist.
    pub fn create_metric(&self, metric: &Metric) -> Result<()> {
        self.load_outcome(metric.outcome_id)?;
        let tx = self.conn.unchecked_transaction()?;
        if metric.is_primary {
            clear_primary(&tx, metric.outcome_id, metric.id)?;
        }
        tx.execute(
            &format!("INSERT INTO metric ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                metric.id.to_string(),
                metric.outcome_id.to_string(),
                &metric.name,
                &metric.unit,
                metric.is_primary,
                timestamp_text(metric.created_at),
            ],
        )?;
        tx.commit()?;
        tracing::debug!(id = %metric.id, outcome = %metric.outcome_id, primary = metric.is_primary, "metric created");
        Ok(())
    }

    pub fn load_metric(&self, id: Uuid) -> Result<Metric> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM metric WHERE id = ?1"),
                [id.to_string()],
                read_row,
            )
            .optional()?;
        into_metric(row.ok_or(StorageError::MetricNotFound(id))?)
    }

    /// Lists metrics, newest first, optionally for one outcome.
    pub fn list_metrics(&self, outcome_id: Option<Uuid>) -> Result<Vec<Metric>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM metric
             WHERE ?1 IS NULL OR outcome_id = ?1
             ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([outcome_id.map(|id| id.to_string())], read_row)?;
        let mut metrics = Vec::new();
        for row in rows {
            metrics.push(into_metric(row?)?);
        }
        Ok(metrics)
    }

    /// Updates name, unit, and the primary flag.
    pub fn update_metric(&self, metric: &Metric) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        if metric.is_primary {
            clear_primary(&tx, metric.outcome_id, metric.id)?;
        }
        let rows = tx.execute(
            "UPDATE metric SET name = ?1, unit = ?2, is_primary = ?3 WHERE id = ?4",
            params![&metric.name, &metric.unit, metric.is_primary, metric.id.to_string()],
        )?;
        if rows == 0 {
            return Err(StorageError::MetricNotFound(metric.id));
        }
        tx.commit()?;
        Ok(())
    }

    /// Deletes a metric and all of its entries.
    pub fn delete_metric(&self, id: Uuid) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM metric_entry WHERE metric_id = ?1", [id.to_string()])?;
        let rows = tx.execute("DELETE FROM metric WHERE id = ?1", [id.to_string()])?;
        if rows == 0 {
            return Err(StorageError::MetricNotFound(id));
        }
        tx.commit()?;
        tracing::debug!(%id, "metric deleted");
        Ok(())
    }

    /// Writes an entry, replacing any entry for the same metric and date.
    pub fn upsert_metric_entry(&self, entry: &MetricEntry) -> Result<()> {
        self.load_metric(entry.metric_id)?;
        self.conn.execute(
            "INSERT INTO metric_entry (metric_id, entry_date, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (metric_id, entry_date) DO UPDATE SET value = excluded.value",
            params![entry.metric_id.to_string(), entry.date.to_string(), entry.value],
        )?;
        tracing::debug!(metric = %entry.metric_id, date = %entry.date, value = entry.value, "metric entry saved");
        Ok(())
    }

    /// Entries for a metric, oldest first. `since` bounds the start date.
    pub fn load_metric_entries(&self, metric_id: Uuid, since: Option<Date>) -> Result<Vec<MetricEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT metric_id, entry_date, value FROM metric_entry
             WHERE metric_id = ?1 AND (?2 IS NULL OR entry_date >= ?2)
             ORDER BY entry_date ASC",
        )?;
        let rows = stmt.query_map(
            params![metric_id.to_string(), since.map(|d| d.to_string())],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, f64>(2)?,
                ))
            },
        )?;

        let mut entries = Vec::new();
        for row in rows {
            let (metric_id, date, value) = row?;
            entries.push(MetricEntry {
                metric_id: parse_uuid(&metric_id, "metric entry metric_id")?,
                date: parse_date(&date, "metric entry date")?,
                value,
            });
        }
        Ok(entries)
    }

    /// Removes the entry for a date. Returns whether one existed.
    pub fn delete_metric_entry(&self, metric_id: Uuid, date: Date) -> Result<bool> {
        let rows = self.conn.execute(
            "DELETE FROM metric_entry WHERE metric_id = ?1 AND entry_date = ?2",
            [metric_id.to_string(), date.to_string()],
        )?;
        Ok(rows > 0)
    }
}

fn clear_primary(conn: &rusqlite::Connection, outcome_id: Uuid, keep: Uuid) -> Result<()> {
    conn.execute(
        "UPDATE metric SET is_primary = 0 WHERE outcome_id = ?1 AND id <> ?2",
        [outcome_id.to_string(), keep.to_string()],
    )?;
    Ok(())
}

type MetricRow = (String, String, String, String, bool, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<MetricRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
    ))
}

fn into_metric((id, outcome_id, name, unit, is_primary, created_at): MetricRow) -> Result<Metric> {
    Ok(Metric {
        id: parse_uuid(&id, "metric id")?,
        outcome_id: parse_uuid(&outcome_id, "metric outcome_id")?,
        name,
        unit,
        is_primary,
        created_at: parse_timestamp(&created_at, "metric created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::civil::date;

    use crate::storage::test_support::{sample_outcome, test_storage};

    fn primaries(storage: &Storage, outcome_id: Uuid) -> Vec<String> {
        storage
            .list_metrics(Some(outcome_id))
            .unwrap()
            .into_iter()
            .filter(|m| m.is_primary)
            .map(|m| m.name)
            .collect()
    }

    #[test]
    fn new_primary_clears_the_previous_one() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let weight = Metric::new(outcome.id, "Weight", "kg", true).unwrap();
        let pace = Metric::new(outcome.id, "Pace", "min/km", true).unwrap();

        storage.create_metric(&weight).unwrap();
        storage.create_metric(&pace).unwrap();
        assert_eq!(primaries(&storage, outcome.id), ["Pace"]);

        storage
            .update_metric(&weight.edit(None, None, Some(true)).unwrap())
            .unwrap();
        assert_eq!(primaries(&storage, outcome.id), ["Weight"]);
    }

    #[test]
    fn primary_is_per_outcome() {
        let (_dir, storage) = test_storage();
        let fit = sample_outcome(&storage);
        let read = sample_outcome(&storage);

        storage.create_metric(&Metric::new(fit.id, "Weight", "kg", true).unwrap()).unwrap();
        storage.create_metric(&Metric::new(read.id, "Pages", "", true).unwrap()).unwrap();

        assert_eq!(primaries(&storage, fit.id), ["Weight"]);
        assert_eq!(primaries(&storage, read.id), ["Pages"]);
    }

    #[test]
    fn edit_persists_name_and_unit() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let metric = Metric::new(outcome.id, "Weight", "kg", false).unwrap();
        storage.create_metric(&metric).unwrap();

        let edited = metric.edit(Some("Body weight"), Some("lb"), None).unwrap();
        storage.update_metric(&edited).unwrap();

        assert_eq!(storage.load_metric(metric.id).unwrap(), edited);
    }

    #[test]
    fn entry_upsert_replaces_value_for_same_date() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let metric = Metric::new(outcome.id, "Weight", "kg", true).unwrap();
        storage.create_metric(&metric).unwrap();

        for (day, value) in [(24, 72.4), (23, 73.0), (24, 72.1)] {
            storage
                .upsert_metric_entry(&MetricEntry::new(metric.id, date(2026, 2, day), value).unwrap())
                .unwrap();
        }

        let entries = storage.load_metric_entries(metric.id, None).unwrap();
        let values: Vec<(Date, f64)> = entries.iter().map(|e| (e.date, e.value)).collect();
        assert_eq!(values, [(date(2026, 2, 23), 73.0), (date(2026, 2, 24), 72.1)]);

        let since = storage
            .load_metric_entries(metric.id, Some(date(2026, 2, 24)))
            .unwrap();
        assert_eq!(since.len(), 1);
    }

    #[test]
    fn entry_delete_reports_whether_it_existed() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let metric = Metric::new(outcome.id, "Weight", "kg", true).unwrap();
        storage.create_metric(&metric).unwrap();
        let day = date(2026, 2, 23);
        storage
            .upsert_metric_entry(&MetricEntry::new(metric.id, day, 73.0).unwrap())
            .unwrap();

        assert!(storage.delete_metric_entry(metric.id, day).unwrap());
        assert!(!storage.delete_metric_entry(metric.id, day).unwrap());
        assert!(storage.load_metric_entries(metric.id, None).unwrap().is_empty());
    }

    #[test]
    fn delete_metric_removes_its_entries() {
        let (_dir, storage) = test_storage();
        let outcome = sample_outcome(&storage);
        let metric = Metric::new(outcome.id, "Weight", "kg", true).unwrap();
        storage.create_metric(&metric).unwrap();
        storage
            .upsert_metric_entry(&MetricEntry::new(metric.id, date(2026, 2, 23), 73.0).unwrap())
            .unwrap();

        storage.delete_metric(metric.id).unwrap();

        assert!(matches!(
            storage.load_metric(metric.id).unwrap_err(),
            StorageError::MetricNotFound(_)
        ));
        assert!(storage.load_metric_entries(metric.id, None).unwrap().is_empty());
        assert!(matches!(
            storage.delete_metric(metric.id).unwrap_err(),
            StorageError::MetricNotFound(_)
        ));
    }

    #[test]
    fn metric_for_missing_outcome_or_entry_for_missing_metric_fails() {
        let (_dir, storage) = test_storage();
        let orphan = Metric::new(Uuid::new_v4(), "Weight", "kg", false).unwrap();
        assert!(matches!(
            storage.create_metric(&orphan).unwrap_err(),
            StorageError::OutcomeNotFound(_)
        ));

        let entry = MetricEntry::new(orphan.id, date(2026, 2, 23), 1.0).unwrap();
        assert!(matches!(
            storage.upsert_metric_entry(&entry).unwrap_err(),
            StorageError::MetricNotFound(_)
        ));
    }
}
