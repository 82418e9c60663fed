//! Database layer for the museo watcher.
//!
//! A small SQLite database in the application data directory holds the
//! persisted flags (currently only the "visitor already greeted" flag).
//! Schema changes go through [`migrations`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use museo::db::flags::FlagStore;
//!
//! let store = FlagStore::new()?;
//! store.upsert("haEntradoMuseo6", "true")?;
//! assert!(store.fetch("haEntradoMuseo6")?.is_some());
//! # Ok::<(), museo::libs::error::GeofenceError>(())
//! ```

pub mod db;
pub mod flags;
pub mod migrations;
