use super::migrations::init_with_migrations;
use crate::libs::data_storage::DataStorage;
use crate::libs::error::GeofenceResult;
use rusqlite::Connection;
use std::path::Path;

pub const DB_FILE_NAME: &str = "museo.db";

pub struct Db {
    pub conn: Connection,
}

impl Db {
    /// Opens the database in the platform data directory.
    pub fn new() -> GeofenceResult<Db> {
        let db_file_path = DataStorage::new().get_path(DB_FILE_NAME)?;
        Self::open(&db_file_path)
    }

    /// Opens (or creates) a database file and applies pending migrations.
    pub fn open(path: &Path) -> GeofenceResult<Db> {
        let mut conn = Connection::open(path)?;
        init_with_migrations(&mut conn)?;
        Ok(Db { conn })
    }
}
