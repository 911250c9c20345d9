//! Weekly reflections, one per outcome per week.

use jiff::civil::Date;
use rusqlite::params;

use crate::model::{Reflection, ReflectionResponses};

use super::{Result, Storage, parse_date, parse_uuid};

impl Storage {
    /// Saves a reflection, replacing the responses of any existing one for
    /// the same outcome and week.
    pub fn save_reflection(&self, reflection: &Reflection) -> Result<()> {
        self.load_outcome(reflection.outcome_id)?;
        let ReflectionResponses {
            what_worked,
            what_didnt,
            what_to_change,
        } = &reflection.responses;
        self.conn.execute(
            "INSERT INTO reflection
                 (id, outcome_id, week_start, what_worked, what_didnt, what_to_change)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT (outcome_id, week_start) DO UPDATE SET
                 what_worked = excluded.what_worked,
                 what_didnt = excluded.what_didnt,
                 what_to_change = excluded.what_to_change",
            params![
                reflection.id.to_string(),
                reflection.outcome_id.to_string(),
                reflection.week_start.to_string(),
                what_worked,
                what_didnt,
                what_to_change,
            ],
        )?;
        tracing::debug!(outcome = %reflection.outcome_id, week = %reflection.week_start, "reflection saved");
        Ok(())
    }

    /// Every reflection recorded for the week starting on `week_start`.
    pub fn load_reflections(&self, week_start: Date) -> Result<Vec<Reflection>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, outcome_id, week_start, what_worked, what_didnt, what_to_change
             FROM reflection WHERE week_start = ?1",
        )?;
        let rows = stmt.query_map([week_start.to_string()], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                ReflectionResponses {
                    what_worked: row.get(3)?,
                    what_didnt: row.get(4)?,
                    what_to_change: row.get(5)?,
                },
            ))
        })?;

        let mut reflections = Vec::new();
        for row in rows {
            let (id, outcome_id, week_start, responses) = row?;
            reflections.push(Reflection {
                id: parse_uuid(&id, "reflection id")?,
                outcome_id: parse_uuid(&outcome_id, "reflection outcome_id")?,
                week_start: parse_date(&week_start, "reflection week_start")?,
                responses,
            });
        }
        Ok(reflections)
    }
}
