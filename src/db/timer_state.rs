//! Durable single-slot store for the active timer record.
//!
//! The table holds at most one row, pinned to `slot = 1` by a CHECK
//! constraint. Upserting against that fixed key makes "write the active
//! timer" an atomic replace at the database level, so the single-active-timer
//! invariant cannot be violated by two writers racing on inserts: the last
//! durable write wins and there is still exactly one record.

use crate::db::db::Db;
use crate::libs::error::{Result, TimerError};
use crate::libs::timer::TimerState;
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

const SCHEMA_TIMER_STATE: &str = "CREATE TABLE IF NOT EXISTS timer_state (
    slot INTEGER NOT NULL PRIMARY KEY CHECK (slot = 1),
    task_id TEXT NOT NULL,
    start TIMESTAMP NOT NULL,
    last_update TIMESTAMP NOT NULL
)";

const UPSERT_STATE: &str = "INSERT INTO timer_state (slot, task_id, start, last_update) VALUES (1, ?1, ?2, ?3)
    ON CONFLICT(slot) DO UPDATE SET task_id = excluded.task_id, start = excluded.start, last_update = excluded.last_update";
const SELECT_STATE: &str = "SELECT task_id, start, last_update FROM timer_state WHERE slot = 1";
const DELETE_STATE: &str = "DELETE FROM timer_state WHERE slot = 1";
const TOUCH_STATE: &str = "UPDATE timer_state SET last_update = ?1 WHERE slot = 1";

#[derive(Clone)]
pub struct TimerStateStore {
    conn: Arc<Mutex<Connection>>,
}

impl TimerStateStore {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_db(Db::new()?)
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Self::from_db(Db::open(path)?)
    }

    fn from_db(db: Db) -> anyhow::Result<Self> {
        db.conn.execute(SCHEMA_TIMER_STATE, [])?;
        Ok(TimerStateStore {
            conn: Arc::new(Mutex::new(db.conn)),
        })
    }

    /// Idempotent upsert of the active timer record. Re-applying the same
    /// values is a no-op; a different record replaces the old one atomically.
    pub fn put(&self, state: &TimerState) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            UPSERT_STATE,
            params![state.task_id, encode(state.start), encode(state.last_update)],
        )?;
        Ok(())
    }

    /// Reads the active timer record, or `None` when the system is idle.
    pub fn get(&self) -> Result<Option<TimerState>> {
        let conn = self.conn.lock();
        let state = conn
            .query_row(SELECT_STATE, [], |row| {
                let task_id: String = row.get(0)?;
                let start: String = row.get(1)?;
                let last_update: String = row.get(2)?;
                Ok((task_id, start, last_update))
            })
            .optional()?;

        match state {
            Some((task_id, start, last_update)) => Ok(Some(TimerState {
                task_id,
                start: decode(&start)?,
                last_update: decode(&last_update)?,
            })),
            None => Ok(None),
        }
    }

    /// Clears the slot. Deleting an absent record is a no-op, not an error.
    pub fn delete(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(DELETE_STATE, [])?;
        Ok(())
    }

    /// Heartbeat: rewrites `last_update` on the existing record. Returns
    /// whether a record was present to touch.
    pub fn touch(&self, now: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn.lock();
        let updated = conn.execute(TOUCH_STATE, params![encode(now)])?;
        Ok(updated > 0)
    }
}

fn encode(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn decode(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| TimerError::Protocol(format!("bad timestamp {raw:?}: {e}")))
}
