//! Reminder fire markers, so each reminder fires once per day or week.

use rusqlite::{OptionalExtension, params};

use crate::reminder::MarkerStore;

use super::{Result, Storage, StorageError};

impl Storage {
    pub fn get_marker(&self, key: &str) -> Result<Option<String>> {
        Ok(self
            .conn
            .query_row(
                "SELECT value FROM reminder_marker WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?)
    }

    pub fn set_marker(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO reminder_marker (key, value) VALUES (?1, ?2)
             ON CONFLICT (key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }
}

impl MarkerStore for Storage {
    type Error = StorageError;

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.get_marker(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.set_marker(key, value)
    }
}
