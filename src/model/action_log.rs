//! Completion records: one per output per calendar day.

use std::collections::HashMap;

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A per-day tally of units completed against a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    pub output_id: Uuid,
    pub date: Date,
    pub completed: u32,
    pub total: u32,
    pub notes: Option<String>,
}

impl ActionLog {
    /// Builds a record from raw input: negative counts become 0, notes are
    /// trimmed and blank notes dropped.
    pub fn new(output_id: Uuid, date: Date, completed: i64, total: i64, notes: &str) -> Self {
        let notes = notes.trim();
        Self {
            output_id,
            date,
            completed: clamp_count(completed),
            total: clamp_count(total),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        }
    }
}

fn clamp_count(n: i64) -> u32 {
    u32::try_from(n.max(0)).unwrap_or(u32::MAX)
}

/// Records keyed by `(output, date)` for constant-time lookup.
///
/// Later records for the same key replace earlier ones, matching the
/// upsert semantics of storage.
#[derive(Debug, Clone, Default)]
pub struct ActionLogIndex {
    by_key: HashMap<(Uuid, Date), ActionLog>,
}

impl ActionLogIndex {
    pub fn get(&self, output_id: Uuid, date: Date) -> Option<&ActionLog> {
        self.by_key.get(&(output_id, date))
    }

    pub fn insert(&mut self, log: ActionLog) {
        self.by_key.insert((log.output_id, log.date), log);
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

impl FromIterator<ActionLog> for ActionLogIndex {
    fn from_iter<I: IntoIterator<Item = ActionLog>>(iter: I) -> Self {
        let mut index = Self::default();
        for log in iter {
            index.insert(log);
        }
        index
    }
}
