use super::db::Db;
use crate::libs::error::GeofenceResult;
use crate::libs::store::KeyValueStore;
use chrono::NaiveDateTime;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

const UPSERT: &str = "INSERT INTO flags (key, value, updated_at) VALUES (?1, ?2, datetime(CURRENT_TIMESTAMP, 'localtime'))
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at";
const DELETE: &str = "DELETE FROM flags WHERE key = ?1";
const SELECT_BY_KEY: &str = "SELECT key, value, updated_at FROM flags WHERE key = ?1";

#[derive(Debug, Clone, PartialEq)]
pub struct Flag {
    pub key: String,
    pub value: String,
    pub updated_at: NaiveDateTime,
}

/// SQLite-backed [`KeyValueStore`]; values survive restarts.
pub struct FlagStore {
    conn: Mutex<Connection>,
}

impl FlagStore {
    pub fn new() -> GeofenceResult<Self> {
        Ok(Self::from_db(Db::new()?))
    }

    pub fn open(path: &Path) -> GeofenceResult<Self> {
        Ok(Self::from_db(Db::open(path)?))
    }

    fn from_db(db: Db) -> Self {
        FlagStore { conn: Mutex::new(db.conn) }
    }

    pub fn fetch(&self, key: &str) -> GeofenceResult<Option<Flag>> {
        let flag = self
            .conn
            .lock()
            .query_row(SELECT_BY_KEY, [key], |row| {
                Ok(Flag {
                    key: row.get(0)?,
                    value: row.get(1)?,
                    updated_at: row.get(2)?,
                })
            })
            .optional()?;
        Ok(flag)
    }

    pub fn upsert(&self, key: &str, value: &str) -> GeofenceResult<()> {
        self.conn.lock().execute(UPSERT, [key, value])?;
        Ok(())
    }

    pub fn remove(&self, key: &str) -> GeofenceResult<()> {
        self.conn.lock().execute(DELETE, [key])?;
        Ok(())
    }
}

impl KeyValueStore for FlagStore {
    async fn get(&self, key: &str) -> GeofenceResult<Option<String>> {
        Ok(self.fetch(key)?.map(|flag| flag.value))
    }

    async fn set(&self, key: &str, value: &str) -> GeofenceResult<()> {
        self.upsert(key, value)
    }

    async fn delete(&self, key: &str) -> GeofenceResult<()> {
        self.remove(key)
    }
}
