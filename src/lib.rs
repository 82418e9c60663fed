//! # Museo - geofence welcome watcher
//!
//! Watches the visitor's position and greets them once when they walk
//! into the digital museum.
//!
//! ## Features
//!
//! - **Geofence Monitoring**: Periodic position polling with entry/exit detection
//! - **One Welcome Per Visit**: Persisted entry flag survives restarts and is cleared on exit
//! - **Pluggable Capabilities**: Location providers, notification sinks and key-value stores
//! - **Background Watcher**: Detached daemon with PID file and graceful shutdown
//!
//! ## Usage
//!
//! ```rust,no_run
//! use museo::commands::Cli;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     Cli::menu().await
//! }
//! ```

pub mod commands;
pub mod db;
pub mod libs;
