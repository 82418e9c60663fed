#[derive(Debug, Clone)]
pub enum Message {
    // === MONITOR MESSAGES ===
    MonitorStarted {
        radius: f64,
        poll_interval: u64,
    },
    MonitorAlreadyActive,
    MonitorStopped,
    MonitorShuttingDown,
    MonitorTaskPanicked(String),
    DistanceToTarget(f64),

    // === PERMISSION MESSAGES ===
    LocationPermissionDenied,
    LocationPermissionRequestFailed(String),
    NotificationPermissionDenied,
    NotificationPermissionRequestFailed(String),

    // === GEOFENCE MESSAGES ===
    LocationUnavailable(String),
    VisitorEntered(f64), // distance
    VisitorLeft,
    WelcomeAlreadyShown,
    WelcomeSent,
    WelcomeSendFailed(String),
    WelcomeNotification {
        title: String,
        body: String,
    },
    EntryFlagReadFailed(String),
    EntryFlagWriteFailed(String),
    EntryFlagResetFailed(String),
    EntryFlagReset,
    PositionInside {
        distance: f64,
        radius: f64,
    },
    PositionOutside {
        distance: f64,
        radius: f64,
    },

    // === WATCHER MESSAGES ===
    WatcherStarted(u32),
    WatcherStopped(u32),
    WatcherNotRunning,
    WatcherStartingForeground,
    WatcherStoppingExisting(String),
    WatcherFailedToStopExisting(String),
    WatcherFailedToStop(u32),
    WatcherReceivedSigterm,
    WatcherReceivedSigint,
    WatcherReceivedCtrlC,
    WatcherSignalHandlingNotSupported,
    DaemonModeNotSupported,
    InvalidPidFileContent,
    FailedToOpenProcess(u32),
    FailedToTerminateProcess(u32),
    ProcessTerminationNotSupported,

    // === CONFIGURATION MESSAGES ===
    ConfigSaved,
    ConfigDeleted,
    ConfigNotFound,
    ConfigModuleGeofence,
    ConfigModuleLocation,
    ConfigModuleNotifications,
    PromptSelectModules,
    PromptTargetLatitude,
    PromptTargetLongitude,
    PromptRadius,
    PromptPollInterval,
    PromptDistanceFormula,
    PromptLocationSource,
    PromptLocationLatitude,
    PromptLocationLongitude,
    PromptReplayPath,
    PromptLocationUrl,
    PromptNotificationsEnabled,
    PromptNotificationTitle,
    PromptNotificationBody,
    PromptWebhookUrl,
    PromptPlaySound,
    InvalidRadius(f64),
    InvalidPollInterval,
    InvalidEnvValue {
        name: String,
        value: String,
    },

    // === STATUS MESSAGES ===
    StatusNotSet,
    StatusNotRunning,

    // === MIGRATION MESSAGES ===
    RunningMigration(u32, String),
    MigrationFailed(u32, String),
}
