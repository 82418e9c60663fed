//! Core library modules for the museo watcher.
//!
//! ## Features
//!
//! - **Core Infrastructure**: Configuration, data storage, error type, messaging
//! - **Geofencing**: Coordinates, distance formulas, the polling monitor
//! - **Device Capabilities**: Location providers, notification sinks, key-value stores
//! - **Process Management**: Background watcher lifecycle
//!
//! ## Usage
//!
//! ```rust,no_run
//! use museo::libs::config::GeofenceConfig;
//! use museo::libs::location::FixedLocation;
//! use museo::libs::monitor::GeofenceMonitor;
//! use museo::libs::notifier::{ConsoleNotifier, Notification};
//! use museo::libs::store::MemoryStore;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = GeofenceConfig::default();
//! let mut monitor = GeofenceMonitor::new(
//!     config.clone(),
//!     Notification::welcome("Welcome!", "Enjoy the collection"),
//!     FixedLocation::new(config.target),
//!     ConsoleNotifier::new(true),
//!     MemoryStore::new(),
//! )?;
//! monitor.activate().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod daemon;
pub mod data_storage;
pub mod error;
pub mod geo;
pub mod location;
pub mod messages;
pub mod monitor;
pub mod notifier;
pub mod store;
pub mod view;
