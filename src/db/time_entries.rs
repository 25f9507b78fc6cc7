//! Append-only ledger of completed time spans.
//!
//! Entries are immutable once appended; there is no update path. Revenue and
//! totals downstream only ever read this table.

use crate::db::db::Db;
use crate::libs::error::{Result, TimerError};
use crate::libs::timer::TimeEntry;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

const SCHEMA_TIME_ENTRIES: &str = "CREATE TABLE IF NOT EXISTS time_entries (
    id INTEGER NOT NULL PRIMARY KEY,
    task_id TEXT NOT NULL,
    start TIMESTAMP NOT NULL,
    finish TIMESTAMP NOT NULL,
    duration INTEGER NOT NULL,
    is_manual INTEGER NOT NULL DEFAULT 0,
    description TEXT
)";

const INSERT_ENTRY: &str = "INSERT INTO time_entries (task_id, start, finish, duration, is_manual, description) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";
const SELECT_ENTRIES: &str = "SELECT id, task_id, start, finish, duration, is_manual, description FROM time_entries";
const CLEAR_TIMER_SLOT: &str = "DELETE FROM timer_state WHERE slot = 1";
const WHERE_TASK: &str = "WHERE task_id = ?1";
const WHERE_DATE: &str = "WHERE date(start) = date(?1)";
const SUM_TASK_MINUTES: &str = "SELECT COALESCE(SUM(duration), 0) FROM time_entries WHERE task_id = ?1";

#[derive(Clone)]
pub struct TimeEntries {
    conn: Arc<Mutex<Connection>>,
}

impl TimeEntries {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_db(Db::new()?)
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Self::from_db(Db::open(path)?)
    }

    fn from_db(db: Db) -> anyhow::Result<Self> {
        db.conn.execute(SCHEMA_TIME_ENTRIES, [])?;
        Ok(TimeEntries {
            conn: Arc::new(Mutex::new(db.conn)),
        })
    }

    /// Appends a completed span and returns the entry with its assigned id.
    pub fn append(&self, entry: &TimeEntry) -> Result<TimeEntry> {
        let conn = self.conn.lock();
        conn.execute(
            INSERT_ENTRY,
            params![
                entry.task_id,
                encode(entry.start),
                encode(entry.end),
                entry.duration_minutes,
                entry.is_manual,
                entry.description,
            ],
        )?;
        let mut stored = entry.clone();
        stored.id = Some(conn.last_insert_rowid());
        Ok(stored)
    }

    /// Durable half of a timer stop: appends the completed span and clears
    /// the active timer slot in one transaction. Both tables live in the same
    /// database file, so a failure of either statement leaves the ledger and
    /// the slot exactly as they were, and the stop can be retried without
    /// double-counting the span.
    pub fn record_stop(&self, entry: &TimeEntry) -> Result<TimeEntry> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        tx.execute(
            INSERT_ENTRY,
            params![
                entry.task_id,
                encode(entry.start),
                encode(entry.end),
                entry.duration_minutes,
                entry.is_manual,
                entry.description,
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(CLEAR_TIMER_SLOT, [])?;
        tx.commit()?;

        let mut stored = entry.clone();
        stored.id = Some(id);
        Ok(stored)
    }

    pub fn fetch_all(&self) -> Result<Vec<TimeEntry>> {
        self.fetch(SELECT_ENTRIES, [])
    }

    pub fn fetch_by_task(&self, task_id: &str) -> Result<Vec<TimeEntry>> {
        self.fetch(&format!("{SELECT_ENTRIES} {WHERE_TASK}"), params![task_id])
    }

    pub fn fetch_by_date(&self, date: NaiveDate) -> Result<Vec<TimeEntry>> {
        let date_str = date.format("%Y-%m-%d").to_string();
        self.fetch(&format!("{SELECT_ENTRIES} {WHERE_DATE}"), params![date_str])
    }

    /// Sum of ledger durations for one task, in minutes. This is the read
    /// surface downstream aggregation (totals, revenue) consumes.
    pub fn total_minutes(&self, task_id: &str) -> Result<i64> {
        let conn = self.conn.lock();
        let total = conn.query_row(SUM_TASK_MINUTES, params![task_id], |row| row.get(0))?;
        Ok(total)
    }

    fn fetch<P: rusqlite::Params>(&self, sql: &str, params: P) -> Result<Vec<TimeEntry>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let entry_iter = stmt.query_map(params, |row| {
            let start: String = row.get(2)?;
            let end: String = row.get(3)?;
            Ok(TimeEntry {
                id: row.get(0)?,
                task_id: row.get(1)?,
                start: decode(&start).unwrap_or_default(),
                end: decode(&end).unwrap_or_default(),
                duration_minutes: row.get(4)?,
                is_manual: row.get(5)?,
                description: row.get(6)?,
            })
        })?;
        let mut entries = Vec::new();
        for entry in entry_iter {
            entries.push(entry?);
        }
        Ok(entries)
    }
}

fn encode(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode(raw: &str) -> std::result::Result<DateTime<Utc>, TimerError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| TimerError::Protocol(format!("bad timestamp {raw:?}: {e}")))
}
