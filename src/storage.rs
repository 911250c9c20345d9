//! Local persistence for outcomes, outputs, and their records.
//!
//! Everything lives in a single `SQLite` file:
//!
//! ```text
//! <data-dir>/cadence.sqlite
//! ```
//!
//! Writes are last-write-wins upserts keyed the same way the accounting
//! engine keys its lookups: `(output, date)` for completion records,
//! `(output, occurrence date)` or `(output, week start)` for shortfall tags.

mod action_log;
mod marker;
mod metric;
mod outcome;
mod output;
mod reflection;
mod settings;
mod shortfall;
mod skill;

use std::{fs, io, path::Path, path::PathBuf};

use jiff::Timestamp;
use jiff::civil::Date;
use rusqlite::Connection;
use uuid::Uuid;

use crate::model::{FrequencyError, MetricError, ShortfallError, SkillError};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("outcome not found: {0}")]
    OutcomeNotFound(Uuid),

    #[error("output not found: {0}")]
    OutputNotFound(Uuid),

    #[error("no action logged for output {output_id} on {date}")]
    ActionLogNotFound { output_id: Uuid, date: Date },

    #[error("metric not found: {0}")]
    MetricNotFound(Uuid),

    #[error("skill not found: {0}")]
    SkillNotFound(Uuid),

    #[error("a live skill named \"{0}\" already exists for this outcome")]
    DuplicateSkillName(String),

    #[error("corrupt data: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Frequency(#[from] FrequencyError),

    #[error(transparent)]
    Shortfall(#[from] ShortfallError),

    #[error(transparent)]
    Metric(#[from] MetricError),

    #[error(transparent)]
    Skill(#[from] SkillError),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

const DB_FILE: &str = "cadence.sqlite";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS outcome (
    id          TEXT PRIMARY KEY,
    title       TEXT NOT NULL,
    category    TEXT,
    status      TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS output (
    id                 TEXT PRIMARY KEY,
    outcome_id         TEXT NOT NULL REFERENCES outcome(id),
    description        TEXT NOT NULL,
    frequency_type     TEXT NOT NULL,
    frequency_value    INTEGER NOT NULL,
    schedule_weekdays  TEXT,
    is_starter         INTEGER NOT NULL,
    status             TEXT NOT NULL,
    created_at         TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS output_change (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    output_id    TEXT NOT NULL REFERENCES output(id),
    change_type  TEXT NOT NULL,
    old_value    TEXT NOT NULL,
    new_value    TEXT NOT NULL,
    reason       TEXT,
    changed_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS action_log (
    output_id    TEXT NOT NULL REFERENCES output(id),
    action_date  TEXT NOT NULL,
    completed    INTEGER NOT NULL,
    total        INTEGER NOT NULL,
    notes        TEXT,
    PRIMARY KEY (output_id, action_date)
);

CREATE TABLE IF NOT EXISTS shortfall_tag (
    id               TEXT PRIMARY KEY,
    output_id        TEXT NOT NULL REFERENCES output(id),
    occurrence_date  TEXT,
    week_start       TEXT,
    reason           TEXT NOT NULL,
    other_text       TEXT,
    CHECK ((occurrence_date IS NULL) <> (week_start IS NULL)),
    UNIQUE (output_id, occurrence_date),
    UNIQUE (output_id, week_start)
);

CREATE TABLE IF NOT EXISTS reflection (
    id              TEXT PRIMARY KEY,
    outcome_id      TEXT NOT NULL REFERENCES outcome(id),
    week_start      TEXT NOT NULL,
    what_worked     TEXT NOT NULL,
    what_didnt      TEXT NOT NULL,
    what_to_change  TEXT NOT NULL,
    UNIQUE (outcome_id, week_start)
);

CREATE TABLE IF NOT EXISTS metric (
    id          TEXT PRIMARY KEY,
    outcome_id  TEXT NOT NULL REFERENCES outcome(id),
    name        TEXT NOT NULL,
    unit        TEXT NOT NULL,
    is_primary  INTEGER NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS metric_one_primary
    ON metric (outcome_id) WHERE is_primary = 1;

CREATE TABLE IF NOT EXISTS metric_entry (
    metric_id   TEXT NOT NULL REFERENCES metric(id),
    entry_date  TEXT NOT NULL,
    value       REAL NOT NULL,
    PRIMARY KEY (metric_id, entry_date)
);

CREATE TABLE IF NOT EXISTS skill (
    id                        TEXT PRIMARY KEY,
    outcome_id                TEXT NOT NULL REFERENCES outcome(id),
    name                      TEXT NOT NULL,
    stage                     TEXT NOT NULL,
    target_label              TEXT,
    target_value              REAL,
    initial_confidence        INTEGER NOT NULL,
    graduation_suppressed_at  TEXT,
    created_at                TEXT NOT NULL
);

CREATE UNIQUE INDEX IF NOT EXISTS skill_live_name
    ON skill (outcome_id, name) WHERE stage IN ('active', 'review');

CREATE TABLE IF NOT EXISTS skill_log (
    id             TEXT PRIMARY KEY,
    skill_id       TEXT NOT NULL REFERENCES skill(id),
    output_id      TEXT NOT NULL,
    action_date    TEXT NOT NULL,
    confidence     INTEGER NOT NULL,
    target_result  REAL,
    logged_at      TEXT NOT NULL,
    FOREIGN KEY (output_id, action_date) REFERENCES action_log(output_id, action_date),
    UNIQUE (skill_id, output_id, action_date)
);

CREATE TABLE IF NOT EXISTS settings (
    id                   INTEGER PRIMARY KEY CHECK (id = 1),
    start_of_week        INTEGER NOT NULL,
    reminders_enabled    INTEGER NOT NULL,
    daily_reminder_time  TEXT,
    weekly_review_time   TEXT
);

CREATE TABLE IF NOT EXISTS reminder_marker (
    key    TEXT PRIMARY KEY,
    value  TEXT NOT NULL
);
";

const PURGE_ORDER: [&str; 12] = [
    "skill_log",
    "skill",
    "metric_entry",
    "metric",
    "shortfall_tag",
    "reflection",
    "action_log",
    "output_change",
    "output",
    "outcome",
    "settings",
    "reminder_marker",
];

/// `SQLite`-backed storage.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Opens (or creates) the database file and ensures the schema exists.
    ///
    /// Parent directories are created if missing.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA)?;
        tracing::debug!(path = %path.display(), "storage opened");
        Ok(Self { conn })
    }

    /// Deletes every record, settings and reminder markers included, in
    /// one transaction. The schema is kept.
    pub fn purge_all(&self) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        // Children before parents.
        for table in PURGE_ORDER {
            tx.execute(&format!("DELETE FROM {table}"), [])?;
        }
        tx.commit()?;
        tracing::info!("all data purged");
        Ok(())
    }

    /// The database file inside a data directory.
    pub fn db_path(data_dir: &Path) -> PathBuf {
        data_dir.join(DB_FILE)
    }

    /// Returns the default data directory: `~/.cadence/`.
    pub fn default_data_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".cadence"))
    }
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid> {
    s.parse::<Uuid>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}

fn parse_date(s: &str, what: &str) -> Result<Date> {
    s.parse::<Date>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}

fn parse_timestamp(s: &str, what: &str) -> Result<Timestamp> {
    s.parse::<Timestamp>()
        .map_err(|e| StorageError::Corrupt(format!("invalid {what}: {e}")))
}

/// Timestamps are stored with all nine fractional digits so that text
/// order matches time order.
fn timestamp_text(ts: Timestamp) -> String {
    format!("{ts:.9}")
}

/// Builds `?1, ?2, ...` for an `IN (...)` clause starting at `first`.
fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
pub(crate) mod test_support {
    use tempfile::TempDir;

    use super::Storage;
    use crate::model::{FrequencyDraft, Outcome, Output, OutputDraft};

    pub(crate) fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::open(Storage::db_path(dir.path())).unwrap();
        (dir, storage)
    }

    pub(crate) fn sample_outcome(storage: &Storage) -> Outcome {
        let outcome = Outcome::new("Get fit", Some("health"));
        storage.create_outcome(&outcome).unwrap();
        outcome
    }

    pub(crate) fn sample_output(storage: &Storage, outcome: &Outcome, freq: FrequencyDraft) -> Output {
        let output = Output::from_draft(outcome.id, &OutputDraft::new("Run", freq)).unwrap();
        storage.create_output(&output).unwrap();
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    #[test]
    fn open_creates_parent_dirs_and_is_reopenable() {
        let dir = TempDir::new().unwrap();
        let path = Storage::db_path(&dir.path().join("nested").join("data"));

        drop(Storage::open(&path).unwrap());
        assert!(path.exists());

        // Schema creation is idempotent.
        Storage::open(&path).unwrap();
    }

    #[test]
    fn purge_all_empties_every_table() {
        use jiff::civil::date;

        use crate::model::{
            ActionLog, FrequencyDraft, Metric, MetricEntry, Settings, SkillItem, SkillLogDraft,
            SkillTarget,
        };
        use crate::storage::test_support::{sample_outcome, sample_output};

        let (_dir, storage) = test_support::test_storage();
        let outcome = sample_outcome(&storage);
        let output = sample_output(&storage, &outcome, FrequencyDraft::daily());
        let day = date(2026, 2, 23);
        storage
            .upsert_action_log(&ActionLog::new(output.id, day, 1, 1, ""))
            .unwrap();
        let metric = Metric::new(outcome.id, "Weight", "kg", true).unwrap();
        storage.create_metric(&metric).unwrap();
        storage
            .upsert_metric_entry(&MetricEntry::new(metric.id, day, 72.0).unwrap())
            .unwrap();
        let skill = SkillItem::new(outcome.id, "Pacing", 2, SkillTarget::default()).unwrap();
        storage.create_skill(&skill).unwrap();
        storage
            .replace_skill_logs(output.id, day, &[SkillLogDraft::new(skill.id, 3, None).unwrap()])
            .unwrap();
        storage
            .save_settings(&Settings {
                reminders_enabled: true,
                ..Settings::default()
            })
            .unwrap();

        storage.purge_all().unwrap();

        for table in PURGE_ORDER {
            let count: i64 = storage
                .conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
                .unwrap();
            assert_eq!(count, 0, "{table} not empty");
        }
        assert_eq!(storage.load_settings().unwrap(), Settings::default());
    }

    #[test]
    fn purge_order_covers_the_schema() {
        let (_dir, storage) = test_support::test_storage();
        let mut stmt = storage
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'")
            .unwrap();
        let mut tables: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<rusqlite::Result<_>>()
            .unwrap();
        tables.sort();
        let mut purged: Vec<String> = PURGE_ORDER.iter().map(ToString::to_string).collect();
        purged.sort();
        assert_eq!(tables, purged);
    }

    #[test]
    fn timestamp_text_sorts_like_time() {
        let earlier = Timestamp::new(1_700_000_000, 120_000_000).unwrap();
        let later = Timestamp::new(1_700_000_000, 123_000_000).unwrap();

        assert_eq!(timestamp_text(earlier), "2023-11-14T22:13:20.120000000Z");
        assert!(timestamp_text(earlier) < timestamp_text(later));
        assert_eq!(parse_timestamp(&timestamp_text(later), "t").unwrap(), later);
    }

    #[test]
    fn placeholders_are_numbered_from_first() {
        assert_eq!(placeholders(3, 3), "?3, ?4, ?5");
        assert_eq!(placeholders(1, 0), "");
    }
}
