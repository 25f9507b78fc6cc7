//! Minimal task registry backing the `has_task` collaborator check.
//!
//! Task management proper (names, boards, clients) lives outside the timer
//! core; timers only reference tasks by id. This table is just enough for
//! start validation and for seeding tasks from the CLI.

use crate::db::db::Db;
use crate::libs::error::Result;
use crate::libs::task_lookup::TaskLookup;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

const SCHEMA_TASKS: &str = "CREATE TABLE IF NOT EXISTS tasks (
    id TEXT NOT NULL PRIMARY KEY,
    name TEXT NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
)";

const INSERT_TASK: &str = "INSERT OR IGNORE INTO tasks (id, name) VALUES (?1, ?2)";
const EXISTS_TASK: &str = "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ?1)";

#[derive(Clone)]
pub struct Tasks {
    conn: Arc<Mutex<Connection>>,
}

impl Tasks {
    pub fn new() -> anyhow::Result<Self> {
        Self::from_db(Db::new()?)
    }

    pub fn open(path: &Path) -> anyhow::Result<Self> {
        Self::from_db(Db::open(path)?)
    }

    fn from_db(db: Db) -> anyhow::Result<Self> {
        db.conn.execute(SCHEMA_TASKS, [])?;
        Ok(Tasks {
            conn: Arc::new(Mutex::new(db.conn)),
        })
    }

    pub fn insert(&self, id: &str, name: &str) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(INSERT_TASK, params![id, name])?;
        Ok(())
    }

    pub fn exists(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let exists = conn.query_row(EXISTS_TASK, params![id], |row| row.get(0))?;
        Ok(exists)
    }
}

impl TaskLookup for Tasks {
    fn has_task(&self, task_id: &str) -> Result<bool> {
        self.exists(task_id)
    }
}
