//! Display implementation for museo application messages.
//!
//! All user-facing and log text is defined here so that wording stays
//! consistent between the console output and the `tracing` records.

use super::types::Message;
use std::fmt;

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            // === MONITOR MESSAGES ===
            Message::MonitorStarted { radius, poll_interval } => {
                format!("Geofence watcher started with radius {}m, poll interval {}ms", radius, poll_interval)
            }
            Message::MonitorAlreadyActive => "Geofence watcher is already active".to_string(),
            Message::MonitorStopped => "Geofence watcher stopped".to_string(),
            Message::MonitorShuttingDown => "Shutting down geofence watcher...".to_string(),
            Message::MonitorTaskPanicked(error) => format!("Geofence watcher task panicked: {}", error),
            Message::DistanceToTarget(distance) => format!("Distance to the museum: {:.2}m", distance),

            // === PERMISSION MESSAGES ===
            Message::LocationPermissionDenied => "Location permission denied, the watcher will not start".to_string(),
            Message::LocationPermissionRequestFailed(error) => format!("Failed to request location permission: {}", error),
            Message::NotificationPermissionDenied => {
                "Notification permission denied, tracking the visitor without notifications".to_string()
            }
            Message::NotificationPermissionRequestFailed(error) => {
                format!("Failed to request notification permission: {}", error)
            }

            // === GEOFENCE MESSAGES ===
            Message::LocationUnavailable(error) => format!("Error obtaining location: {}", error),
            Message::VisitorEntered(distance) => format!("Visitor entered the museum ({:.2}m from the center)", distance),
            Message::VisitorLeft => "Visitor left the museum, welcome notification reset".to_string(),
            Message::WelcomeAlreadyShown => "Welcome notification was already shown during this visit".to_string(),
            Message::WelcomeSent => "Welcome notification sent".to_string(),
            Message::WelcomeSendFailed(error) => format!("Error sending welcome notification: {}", error),
            Message::WelcomeNotification { title, body } => format!("🔔 {}\n   {}", title, body),
            Message::EntryFlagReadFailed(error) => format!("Failed to read the entry flag: {}", error),
            Message::EntryFlagWriteFailed(error) => format!("Failed to store the entry flag: {}", error),
            Message::EntryFlagResetFailed(error) => format!("Failed to reset the entry flag: {}", error),
            Message::EntryFlagReset => "Entry flag reset, the next visit will be greeted again".to_string(),
            Message::PositionInside { distance, radius } => {
                format!("Inside the museum: {:.2}m from the center (radius {}m)", distance, radius)
            }
            Message::PositionOutside { distance, radius } => {
                format!("Outside the museum: {:.2}m from the center (radius {}m)", distance, radius)
            }

            // === WATCHER MESSAGES ===
            Message::WatcherStarted(pid) => format!("Watcher started in the background (PID: {}).", pid),
            Message::WatcherStopped(pid) => format!("Watcher process (PID: {}) stopped successfully.", pid),
            Message::WatcherNotRunning => "Watcher is not running.".to_string(),
            Message::WatcherStartingForeground => "Starting watcher in foreground... Press Ctrl+C to exit.".to_string(),
            Message::WatcherStoppingExisting(pid) => format!("Stopping existing watcher (PID: {})...", pid),
            Message::WatcherFailedToStopExisting(error) => format!("Failed to stop existing watcher: {}", error),
            Message::WatcherFailedToStop(pid) => format!("Failed to stop watcher process (PID: {})", pid),
            Message::WatcherReceivedSigterm => "Received SIGTERM, shutting down gracefully...".to_string(),
            Message::WatcherReceivedSigint => "Received SIGINT, shutting down gracefully...".to_string(),
            Message::WatcherReceivedCtrlC => "Received Ctrl+C, shutting down gracefully...".to_string(),
            Message::WatcherSignalHandlingNotSupported => "Signal handling not supported on this platform".to_string(),
            Message::DaemonModeNotSupported => "Daemon mode is not supported on this platform".to_string(),
            Message::InvalidPidFileContent => "Invalid PID file content".to_string(),
            Message::FailedToOpenProcess(code) => format!("Failed to open process (error code {})", code),
            Message::FailedToTerminateProcess(code) => format!("Failed to terminate process (error code {})", code),
            Message::ProcessTerminationNotSupported => "Process termination is not supported on this platform".to_string(),

            // === CONFIGURATION MESSAGES ===
            Message::ConfigSaved => "Configuration saved successfully".to_string(),
            Message::ConfigDeleted => "Configuration removed".to_string(),
            Message::ConfigNotFound => "No configuration file to remove".to_string(),
            Message::ConfigModuleGeofence => "Geofence settings".to_string(),
            Message::ConfigModuleLocation => "Location source settings".to_string(),
            Message::ConfigModuleNotifications => "Notification settings".to_string(),
            Message::PromptSelectModules => "Select modules to configure".to_string(),
            Message::PromptTargetLatitude => "Museum latitude (degrees)".to_string(),
            Message::PromptTargetLongitude => "Museum longitude (degrees)".to_string(),
            Message::PromptRadius => "Geofence radius (meters)".to_string(),
            Message::PromptPollInterval => "Poll interval (milliseconds)".to_string(),
            Message::PromptDistanceFormula => "Distance formula".to_string(),
            Message::PromptLocationSource => "Where should the visitor's position come from?".to_string(),
            Message::PromptLocationLatitude => "Fixed position latitude (degrees)".to_string(),
            Message::PromptLocationLongitude => "Fixed position longitude (degrees)".to_string(),
            Message::PromptReplayPath => "Path to the recorded track (JSON array of coordinates)".to_string(),
            Message::PromptLocationUrl => "Position endpoint URL".to_string(),
            Message::PromptNotificationsEnabled => "Send welcome notifications?".to_string(),
            Message::PromptNotificationTitle => "Welcome notification title".to_string(),
            Message::PromptNotificationBody => "Welcome notification body".to_string(),
            Message::PromptWebhookUrl => "Webhook URL (leave empty to print to the console)".to_string(),
            Message::PromptPlaySound => "Play a sound with the notification?".to_string(),
            Message::InvalidRadius(radius) => format!("Geofence radius must be greater than zero, got {}", radius),
            Message::InvalidPollInterval => "Poll interval must be greater than zero".to_string(),
            Message::InvalidEnvValue { name, value } => format!("Invalid value '{}' for environment variable {}", value, name),

            // === STATUS MESSAGES ===
            Message::StatusNotSet => "not set".to_string(),
            Message::StatusNotRunning => "not running".to_string(),

            // === MIGRATION MESSAGES ===
            Message::RunningMigration(version, name) => format!("Running migration v{}: {}", version, name),
            Message::MigrationFailed(version, error) => format!("Migration v{} failed: {}", version, error),
        };

        write!(f, "{}", text)
    }
}
