//! The single settings row. A missing row reads as defaults.

use rusqlite::{OptionalExtension, params};

use crate::model::{ReminderTime, Settings};
use crate::week::WeekStart;

use super::{Result, Storage, StorageError};

impl Storage {
    pub fn load_settings(&self) -> Result<Settings> {
        let row = self
            .conn
            .query_row(
                "SELECT start_of_week, reminders_enabled, daily_reminder_time, weekly_review_time
                 FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, u8>(0)?,
                        row.get::<_, bool>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .optional()?;

        let Some((start, reminders_enabled, daily, weekly)) = row else {
            return Ok(Settings::default());
        };
        Ok(Settings {
            week_start: WeekStart::from_number(start)
                .ok_or_else(|| StorageError::Corrupt(format!("invalid start_of_week: {start}")))?,
            reminders_enabled,
            daily_reminder_time: parse_time(daily)?,
            weekly_review_time: parse_time(weekly)?,
        })
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.conn.execute(
            "INSERT INTO settings
                 (id, start_of_week, reminders_enabled, daily_reminder_time, weekly_review_time)
             VALUES (1, ?1, ?2, ?3, ?4)
             ON CONFLICT (id) DO UPDATE SET
                 start_of_week = excluded.start_of_week,
                 reminders_enabled = excluded.reminders_enabled,
                 daily_reminder_time = excluded.daily_reminder_time,
                 weekly_review_time = excluded.weekly_review_time",
            params![
                settings.week_start.number(),
                settings.reminders_enabled,
                settings.daily_reminder_time.map(|t| t.to_string()),
                settings.weekly_review_time.map(|t| t.to_string()),
            ],
        )?;
        tracing::debug!(week_start = %settings.week_start, reminders = settings.reminders_enabled, "settings saved");
        Ok(())
    }
}

fn parse_time(value: Option<String>) -> Result<Option<ReminderTime>> {
    value
        .map(|s| s.parse().map_err(|e| StorageError::Corrupt(format!("{e}"))))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::storage::test_support::test_storage;

    #[test]
    fn missing_row_reads_as_defaults() {
        let (_dir, storage) = test_storage();
        assert_eq!(storage.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn save_then_load() {
        let (_dir, storage) = test_storage();
        let settings = Settings {
            week_start: WeekStart::Sunday,
            reminders_enabled: true,
            daily_reminder_time: Some("08:30".parse().unwrap()),
            weekly_review_time: None,
        };
        storage.save_settings(&settings).unwrap();
        assert_eq!(storage.load_settings().unwrap(), settings);

        let updated = Settings {
            reminders_enabled: false,
            ..settings
        };
        storage.save_settings(&updated).unwrap();
        assert_eq!(storage.load_settings().unwrap(), updated);
    }
}
