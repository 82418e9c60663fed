//! Geofence monitor: polls the visitor's position and greets them once per visit.
//!
//! ## State machine
//!
//! ```text
//!             activate (denied)
//!            ┌──────────────┐
//!            ▼              │
//!       ┌──────────┐  activate (granted)  ┌──────────────────┐
//!       │ Inactive │ ───────────────────▶ │ Active { false } │
//!       └──────────┘                      └──────────────────┘
//!            ▲                              │ tick  ▲ tick (outside)
//!            │ deactivate         (inside)  ▼       │ + handle_exit
//!            │                            ┌──────────────────┐
//!            └─────────────────────────── │ Active { true }  │
//!                                         └──────────────────┘
//!                                           + handle_entry
//! ```
//!
//! The "inside" state lives only in memory and starts as `false`. The entry
//! flag in the key-value store survives restarts, so restarting the watcher
//! while still inside the museum does not greet the visitor a second time.
//!
//! Every failure (position query, notification, storage) is logged and
//! swallowed; the timer keeps running.

use super::config::GeofenceConfig;
use super::error::GeofenceResult;
use super::location::{LocationProvider, Permission};
use super::messages::Message;
use super::notifier::{Notification, NotificationSink};
use super::store::KeyValueStore;
use crate::{msg_debug, msg_error, msg_info, msg_warning};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};

/// Value stored under the entry flag key while the visitor has been greeted.
pub const ENTRY_FLAG_VALUE: &str = "true";

/// Result of [`GeofenceMonitor::activate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Started,
    /// The monitor was already running; nothing changed.
    AlreadyActive,
    /// Location permission was refused (or could not be requested); no timer runs.
    LocationDenied,
}

/// Result of a single poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// The position could not be read; state untouched.
    Skipped,
    Unchanged { distance: f64, inside: bool },
    Entered { distance: f64 },
    Left { distance: f64 },
}

/// Clears the entry flag so the next entry greets the visitor again.
pub async fn reset_entry_flag<S: KeyValueStore>(store: &S, key: &str) -> GeofenceResult<()> {
    store.delete(key).await
}

/// Whether the entry flag is currently set.
pub async fn entry_flag_set<S: KeyValueStore>(store: &S, key: &str) -> GeofenceResult<bool> {
    Ok(store.get(key).await?.as_deref() == Some(ENTRY_FLAG_VALUE))
}

/// State shared between the monitor handle and its timer task.
struct Tracker<L, N, S> {
    config: GeofenceConfig,
    welcome: Notification,
    location: L,
    notifier: N,
    store: S,
    // Held for the whole poll, so a direct tick() never interleaves with a timer tick.
    is_inside: Mutex<bool>,
    notifications_allowed: AtomicBool,
}

impl<L, N, S> Tracker<L, N, S>
where
    L: LocationProvider,
    N: NotificationSink,
    S: KeyValueStore,
{
    async fn tick(&self) -> TickOutcome {
        let mut is_inside = self.is_inside.lock().await;

        let position = match self.location.current_position().await {
            Ok(position) => position,
            Err(e) => {
                msg_error!(Message::LocationUnavailable(e.to_string()));
                return TickOutcome::Skipped;
            }
        };

        let distance = self.config.distance_formula.distance(position, self.config.target);
        msg_debug!(Message::DistanceToTarget(distance));

        let was_inside = *is_inside;
        let now_inside = distance <= self.config.radius_meters;
        *is_inside = now_inside;

        match (was_inside, now_inside) {
            (false, true) => {
                msg_info!(Message::VisitorEntered(distance));
                self.handle_entry().await;
                TickOutcome::Entered { distance }
            }
            (true, false) => {
                self.handle_exit().await;
                TickOutcome::Left { distance }
            }
            _ => TickOutcome::Unchanged {
                distance,
                inside: now_inside,
            },
        }
    }

    async fn handle_entry(&self) {
        let key = self.config.entry_flag_key.as_str();

        match entry_flag_set(&self.store, key).await {
            Ok(true) => {
                msg_info!(Message::WelcomeAlreadyShown);
                return;
            }
            Ok(false) => {}
            Err(e) => {
                msg_error!(Message::EntryFlagReadFailed(e.to_string()));
                return;
            }
        }

        if self.notifications_allowed.load(Ordering::Acquire) {
            // Without a delivered greeting the flag stays clear, so the next entry retries.
            if let Err(e) = self.notifier.schedule(&self.welcome).await {
                msg_error!(Message::WelcomeSendFailed(e.to_string()));
                return;
            }
            msg_info!(Message::WelcomeSent);
        }

        if let Err(e) = self.store.set(key, ENTRY_FLAG_VALUE).await {
            msg_error!(Message::EntryFlagWriteFailed(e.to_string()));
        }
    }

    async fn handle_exit(&self) {
        match reset_entry_flag(&self.store, &self.config.entry_flag_key).await {
            Ok(()) => msg_info!(Message::VisitorLeft),
            Err(e) => msg_error!(Message::EntryFlagResetFailed(e.to_string())),
        }
    }
}

struct Timer {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Polls a [`LocationProvider`] on a fixed interval and reacts to geofence transitions.
pub struct GeofenceMonitor<L, N, S> {
    tracker: Arc<Tracker<L, N, S>>,
    timer: Option<Timer>,
}

impl<L, N, S> GeofenceMonitor<L, N, S>
where
    L: LocationProvider + 'static,
    N: NotificationSink + 'static,
    S: KeyValueStore + 'static,
{
    /// Creates an inactive monitor. Fails if `config` breaks its invariants.
    pub fn new(config: GeofenceConfig, welcome: Notification, location: L, notifier: N, store: S) -> GeofenceResult<Self> {
        config.validate()?;
        let tracker = Tracker {
            config,
            welcome,
            location,
            notifier,
            store,
            is_inside: Mutex::new(false),
            notifications_allowed: AtomicBool::new(false),
        };
        Ok(GeofenceMonitor {
            tracker: Arc::new(tracker),
            timer: None,
        })
    }

    pub fn is_active(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| !timer.handle.is_finished())
    }

    pub async fn is_inside(&self) -> bool {
        *self.tracker.is_inside.lock().await
    }

    pub fn notifications_allowed(&self) -> bool {
        self.tracker.notifications_allowed.load(Ordering::Acquire)
    }

    /// Requests permissions and starts polling.
    ///
    /// The first poll happens one full interval after activation. Calling
    /// this while active is a no-op.
    pub async fn activate(&mut self) -> Activation {
        if self.is_active() {
            msg_info!(Message::MonitorAlreadyActive);
            return Activation::AlreadyActive;
        }

        match self.tracker.location.request_permission().await {
            Ok(Permission::Granted) => {}
            Ok(Permission::Denied) => {
                msg_warning!(Message::LocationPermissionDenied);
                return Activation::LocationDenied;
            }
            Err(e) => {
                msg_error!(Message::LocationPermissionRequestFailed(e.to_string()));
                return Activation::LocationDenied;
            }
        }

        let notifications_allowed = match self.tracker.notifier.request_permission().await {
            Ok(permission) => permission.is_granted(),
            Err(e) => {
                msg_error!(Message::NotificationPermissionRequestFailed(e.to_string()));
                false
            }
        };
        if !notifications_allowed {
            msg_warning!(Message::NotificationPermissionDenied);
        }
        self.tracker.notifications_allowed.store(notifications_allowed, Ordering::Release);

        let period = Duration::from_millis(self.tracker.config.poll_interval_ms);
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let tracker = Arc::clone(&self.tracker);

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    // A dropped sender also ends the loop.
                    _ = shutdown_rx.changed() => break,
                    _ = interval.tick() => {
                        tracker.tick().await;
                    }
                }
            }
        });

        self.timer = Some(Timer { shutdown, handle });
        msg_info!(Message::MonitorStarted {
            radius: self.tracker.config.radius_meters,
            poll_interval: self.tracker.config.poll_interval_ms,
        });
        Activation::Started
    }

    /// Runs one poll immediately, independent of the timer.
    pub async fn tick(&self) -> TickOutcome {
        self.tracker.tick().await
    }

    /// Stops the timer. A poll already in progress finishes before this returns;
    /// no new poll starts afterwards. The entry flag is left as it is.
    pub async fn deactivate(&mut self) {
        let Some(timer) = self.timer.take() else {
            return;
        };

        let _ = timer.shutdown.send(true);
        if let Err(e) = timer.handle.await {
            if e.is_panic() {
                msg_error!(Message::MonitorTaskPanicked(e.to_string()));
            }
        }
        msg_info!(Message::MonitorStopped);
    }
}
