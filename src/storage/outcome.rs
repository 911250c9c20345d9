//! Outcome storage: create, load, list, rename, and change status.

use rusqlite::{OptionalExtension, Row, params};
use uuid::Uuid;

use crate::model::{Outcome, OutcomeStatus};

use super::{Result, Storage, StorageError, parse_timestamp, parse_uuid, timestamp_text};

const COLUMNS: &str = "id, title, category, status, created_at";

impl Storage {
    pub fn create_outcome(&self, outcome: &Outcome) -> Result<()> {
        self.conn.execute(
            "INSERT INTO outcome (id, title, category, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                outcome.id.to_string(),
                &outcome.title,
                &outcome.category,
                outcome.status.as_str(),
                timestamp_text(outcome.created_at),
            ],
        )?;
        tracing::debug!(id = %outcome.id, "outcome created");
        Ok(())
    }

    pub fn load_outcome(&self, id: Uuid) -> Result<Outcome> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {COLUMNS} FROM outcome WHERE id = ?1"),
                [id.to_string()],
                read_row,
            )
            .optional()?;
        into_outcome(row.ok_or(StorageError::OutcomeNotFound(id))?)
    }

    /// Lists outcomes, newest first. `status` filters when given.
    pub fn list_outcomes(&self, status: Option<OutcomeStatus>) -> Result<Vec<Outcome>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {COLUMNS} FROM outcome
             WHERE ?1 IS NULL OR status = ?1
             ORDER BY created_at DESC"
        ))?;
        let rows = stmt.query_map([status.map(OutcomeStatus::as_str)], read_row)?;
        let mut outcomes = Vec::new();
        for row in rows {
            outcomes.push(into_outcome(row?)?);
        }
        Ok(outcomes)
    }

    /// Updates title and category.
    pub fn update_outcome(&self, outcome: &Outcome) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE outcome SET title = ?1, category = ?2 WHERE id = ?3",
            params![&outcome.title, &outcome.category, outcome.id.to_string()],
        )?;
        if rows == 0 {
            return Err(StorageError::OutcomeNotFound(outcome.id));
        }
        Ok(())
    }

    pub fn set_outcome_status(&self, id: Uuid, status: OutcomeStatus) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE outcome SET status = ?1 WHERE id = ?2",
            params![status.as_str(), id.to_string()],
        )?;
        if rows == 0 {
            return Err(StorageError::OutcomeNotFound(id));
        }
        tracing::debug!(%id, %status, "outcome status changed");
        Ok(())
    }
}

type OutcomeRow = (String, String, Option<String>, String, String);

fn read_row(row: &Row<'_>) -> rusqlite::Result<OutcomeRow> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

/// Parses raw column values into an outcome.
fn into_outcome(
    (id, title, category, status, created_at): OutcomeRow,
) -> Result<Outcome> {
    Ok(Outcome {
        id: parse_uuid(&id, "outcome id")?,
        title,
        category,
        status: status.parse().map_err(StorageError::Corrupt)?,
        created_at: parse_timestamp(&created_at, "outcome created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;

    use crate::storage::test_support::test_storage;

    #[test]
    fn create_and_load_outcome() {
        let (_dir, storage) = test_storage();
        let outcome = Outcome::new("Learn Spanish", Some("language"));

        storage.create_outcome(&outcome).unwrap();
        let loaded = storage.load_outcome(outcome.id).unwrap();

        assert_eq!(loaded, outcome);
    }

    #[test]
    fn load_nonexistent_outcome_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_outcome(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::OutcomeNotFound(_)));
    }

    #[test]
    fn list_outcomes_newest_first_with_filter() {
        let (_dir, storage) = test_storage();

        let mut first = Outcome::new("First", None);
        first.created_at = Timestamp::new(1_000_000_000, 0).unwrap();
        let mut second = Outcome::new("Second", None);
        second.created_at = Timestamp::new(2_000_000_000, 0).unwrap();

        storage.create_outcome(&first).unwrap();
        storage.create_outcome(&second).unwrap();
        storage
            .set_outcome_status(first.id, OutcomeStatus::Archived)
            .unwrap();

        let all = storage.list_outcomes(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "Second");
        assert_eq!(all[1].title, "First");

        let active = storage.list_outcomes(Some(OutcomeStatus::Active)).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].title, "Second");
    }

    #[test]
    fn outcomes_within_one_second_keep_time_order() {
        let (_dir, storage) = test_storage();

        let mut first = Outcome::new("First", None);
        first.created_at = Timestamp::new(1_700_000_000, 120_000_000).unwrap();
        let mut second = Outcome::new("Second", None);
        second.created_at = Timestamp::new(1_700_000_000, 123_000_000).unwrap();

        storage.create_outcome(&second).unwrap();
        storage.create_outcome(&first).unwrap();

        let titles: Vec<String> = storage
            .list_outcomes(None)
            .unwrap()
            .into_iter()
            .map(|o| o.title)
            .collect();
        assert_eq!(titles, ["Second", "First"]);
    }

    #[test]
    fn update_outcome_renames() {
        let (_dir, storage) = test_storage();
        let mut outcome = Outcome::new("Old", None);
        storage.create_outcome(&outcome).unwrap();

        outcome.title = "New".into();
        outcome.category = Some("misc".into());
        storage.update_outcome(&outcome).unwrap();

        let loaded = storage.load_outcome(outcome.id).unwrap();
        assert_eq!(loaded.title, "New");
        assert_eq!(loaded.category.as_deref(), Some("misc"));
    }

    #[test]
    fn status_change_on_missing_outcome_fails() {
        let (_dir, storage) = test_storage();
        let err = storage
            .set_outcome_status(Uuid::new_v4(), OutcomeStatus::Retired)
            .unwrap_err();
        assert!(matches!(err, StorageError::OutcomeNotFound(_)));
    }
}
