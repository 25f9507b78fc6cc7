use crate::libs::data_storage::DataStorage;
use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "tracket.db";

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the application database in the platform data directory.
    pub fn new() -> Result<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        Self::open(&db_file_path)
    }

    /// Opens a database at an explicit path. Tests point this at a temp dir.
    pub fn open(path: &Path) -> Result<Db> {
        let conn = Connection::open(path)?;
        Ok(Db { conn })
    }
}
