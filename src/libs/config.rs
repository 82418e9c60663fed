//! Configuration management for the museo watcher.
//!
//! Settings live in `config.json` inside the platform data directory and are
//! grouped into optional modules:
//!
//! - **Geofence**: museum coordinates, radius, poll interval, distance formula
//! - **Location**: where the visitor's position comes from
//! - **Notifications**: welcome text and delivery channel
//!
//! Missing modules fall back to defaults. After the file is read, `MUSEO_*`
//! environment variables (optionally loaded from `.env`) override the
//! geofence values:
//!
//! | variable | field |
//! |---|---|
//! | `MUSEO_LAT` | target latitude |
//! | `MUSEO_LON` | target longitude |
//! | `MUSEO_RADIUS` | radius in meters |
//! | `MUSEO_POLL_INTERVAL` | poll interval in milliseconds |
//! | `MUSEO_DISTANCE_FORMULA` | `planar` or `haversine` |
//!
//! ## Usage Examples
//!
//! ```rust,no_run
//! use museo::libs::config::Config;
//!
//! let config = Config::load()?;
//! let geofence = config.geofence_config()?;
//! println!("Watching {} within {}m", geofence.target, geofence.radius_meters);
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use super::error::{GeofenceError, GeofenceResult};
use super::geo::{Coordinate, DistanceFormula};
use super::location::{FixedLocation, HttpLocation, LocationSource, ReplayLocation};
use super::messages::Message;
use super::notifier::{ConsoleNotifier, Notification, NotificationPresentation, NotifierKind, WebhookNotifier};
use crate::msg_print;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, MultiSelect, Select};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Configuration file name inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Storage key of the persisted entry flag.
pub const DEFAULT_ENTRY_FLAG_KEY: &str = "haEntradoMuseo6";

pub const DEFAULT_LATITUDE: f64 = -31.4201;
pub const DEFAULT_LONGITUDE: f64 = -64.1888;
pub const DEFAULT_RADIUS_METERS: f64 = 100.0;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10_000;

pub const DEFAULT_WELCOME_TITLE: &str = "Welcome to the Digital Museum!";
pub const DEFAULT_WELCOME_BODY: &str = "Explore our collection and discover art in a unique way";

/// A configurable module offered by the setup wizard.
#[derive(Debug, Clone)]
pub struct ConfigModule {
    pub key: String,
    pub name: String,
}

/// Geofence parameters. Immutable for the lifetime of a monitor.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GeofenceConfig {
    /// Center of the geofence.
    pub target: Coordinate,

    /// Entry/exit threshold in meters. Must be positive.
    pub radius_meters: f64,

    /// Time between two position polls. Must be positive.
    pub poll_interval_ms: u64,

    #[serde(default)]
    pub distance_formula: DistanceFormula,

    /// Storage key of the "already greeted during this visit" flag.
    #[serde(default = "default_entry_flag_key")]
    pub entry_flag_key: String,
}

fn default_entry_flag_key() -> String {
    DEFAULT_ENTRY_FLAG_KEY.to_string()
}

impl Default for GeofenceConfig {
    fn default() -> Self {
        GeofenceConfig {
            target: Coordinate::new(DEFAULT_LATITUDE, DEFAULT_LONGITUDE),
            radius_meters: DEFAULT_RADIUS_METERS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            distance_formula: DistanceFormula::Planar,
            entry_flag_key: default_entry_flag_key(),
        }
    }
}

impl GeofenceConfig {
    /// Checks the invariants the monitor relies on.
    pub fn validate(&self) -> GeofenceResult<()> {
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(GeofenceError::InvalidConfig(Message::InvalidRadius(self.radius_meters).to_string()));
        }
        if self.poll_interval_ms == 0 {
            return Err(GeofenceError::InvalidConfig(Message::InvalidPollInterval.to_string()));
        }
        if !self.target.latitude.is_finite() || !self.target.longitude.is_finite() {
            return Err(GeofenceError::InvalidConfig(format!("invalid target coordinate {}", self.target)));
        }
        Ok(())
    }
}

/// Where the visitor's position comes from.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum LocationConfig {
    /// A constant position, mostly useful for demos.
    Fixed { latitude: f64, longitude: f64 },
    /// A recorded track replayed one point per poll.
    Replay { path: PathBuf },
    /// An HTTP endpoint returning the current position as JSON.
    Http { url: String },
}

impl LocationConfig {
    pub fn build(&self) -> GeofenceResult<LocationSource> {
        Ok(match self {
            LocationConfig::Fixed { latitude, longitude } => {
                LocationSource::Fixed(FixedLocation::new(Coordinate::new(*latitude, *longitude)))
            }
            LocationConfig::Replay { path } => LocationSource::Replay(ReplayLocation::from_file(path)?),
            LocationConfig::Http { url } => LocationSource::Http(HttpLocation::new(url.clone())?),
        })
    }
}

/// Welcome notification settings.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NotificationsConfig {
    /// When false the watcher tracks the visitor but never notifies.
    pub enabled: bool,
    pub title: String,
    pub body: String,
    pub play_sound: bool,
    /// Deliver to this webhook instead of the console.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        NotificationsConfig {
            enabled: true,
            title: DEFAULT_WELCOME_TITLE.to_string(),
            body: DEFAULT_WELCOME_BODY.to_string(),
            play_sound: true,
            webhook_url: None,
        }
    }
}

impl NotificationsConfig {
    pub fn welcome(&self) -> Notification {
        Notification::welcome(self.title.clone(), self.body.clone())
    }

    pub fn presentation(&self) -> NotificationPresentation {
        NotificationPresentation {
            play_sound: self.play_sound,
            ..NotificationPresentation::default()
        }
    }

    pub fn build(&self) -> GeofenceResult<NotifierKind> {
        Ok(match self.webhook_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => NotifierKind::Webhook(WebhookNotifier::new(url, self.enabled)?),
            _ => NotifierKind::Console(ConsoleNotifier::new(self.enabled)),
        })
    }
}

/// Root configuration. Every module is optional.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geofence: Option<GeofenceConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationConfig>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationsConfig>,
}

impl Config {
    /// Path of the configuration file in the platform data directory.
    pub fn path() -> Result<PathBuf> {
        Ok(DataStorage::new().get_path(CONFIG_FILE_NAME)?)
    }

    /// Reads the configuration file, returning defaults when it does not exist.
    pub fn read() -> Result<Config> {
        Self::read_from(&Self::path()?)
    }

    pub fn read_from(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_str)?;
        Ok(config)
    }

    /// Reads the configuration file and applies `MUSEO_*` environment overrides.
    pub fn load() -> Result<Config> {
        let _ = dotenv::dotenv();
        let mut config = Self::read()?;
        config.apply_env_overrides(|name| env::var(name).ok())?;
        Ok(config)
    }

    /// Overrides geofence values from variables resolved by `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> GeofenceResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let geofence = self.geofence.get_or_insert_with(GeofenceConfig::default);

        if let Some(latitude) = parse_env(&lookup, "MUSEO_LAT")? {
            geofence.target.latitude = latitude;
        }
        if let Some(longitude) = parse_env(&lookup, "MUSEO_LON")? {
            geofence.target.longitude = longitude;
        }
        if let Some(radius) = parse_env(&lookup, "MUSEO_RADIUS")? {
            geofence.radius_meters = radius;
        }
        if let Some(poll_interval) = parse_env(&lookup, "MUSEO_POLL_INTERVAL")? {
            geofence.poll_interval_ms = poll_interval;
        }
        if let Some(formula) = parse_env::<DistanceFormula, _>(&lookup, "MUSEO_DISTANCE_FORMULA")? {
            geofence.distance_formula = formula;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let config_file = File::create(path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Removes the configuration file. Returns whether a file was removed.
    pub fn delete() -> Result<bool> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(path)?;
        Ok(true)
    }

    /// Validated geofence parameters, defaults when the module is absent.
    pub fn geofence_config(&self) -> GeofenceResult<GeofenceConfig> {
        let geofence = self.geofence.clone().unwrap_or_default();
        geofence.validate()?;
        Ok(geofence)
    }

    /// Location source; without a configured one the visitor stands at the museum.
    pub fn location_config(&self) -> LocationConfig {
        self.location.clone().unwrap_or_else(|| {
            let target = self.geofence.clone().unwrap_or_default().target;
            LocationConfig::Fixed {
                latitude: target.latitude,
                longitude: target.longitude,
            }
        })
    }

    pub fn notifications_config(&self) -> NotificationsConfig {
        self.notifications.clone().unwrap_or_default()
    }

    /// Runs the interactive setup wizard, starting from the current file.
    pub fn init() -> Result<Self> {
        let mut config = Self::read().unwrap_or_default();

        let modules = vec![
            ConfigModule {
                key: "geofence".to_string(),
                name: Message::ConfigModuleGeofence.to_string(),
            },
            ConfigModule {
                key: "location".to_string(),
                name: Message::ConfigModuleLocation.to_string(),
            },
            ConfigModule {
                key: "notifications".to_string(),
                name: Message::ConfigModuleNotifications.to_string(),
            },
        ];

        let selected = MultiSelect::with_theme(&ColorfulTheme::default())
            .with_prompt(Message::PromptSelectModules.to_string())
            .items(&modules.iter().map(|module| &module.name).collect::<Vec<_>>())
            .interact()?;

        for &selection in &selected {
            match modules[selection].key.as_str() {
                "geofence" => config.geofence = Some(Self::init_geofence(&config.geofence)?),
                "location" => config.location = Some(Self::init_location(&config)?),
                "notifications" => config.notifications = Some(Self::init_notifications(&config.notifications)?),
                _ => {}
            }
        }

        Ok(config)
    }

    fn init_geofence(current: &Option<GeofenceConfig>) -> Result<GeofenceConfig> {
        let default = current.clone().unwrap_or_default();
        let theme = ColorfulTheme::default();
        msg_print!(Message::ConfigModuleGeofence);

        let latitude = Input::with_theme(&theme)
            .with_prompt(Message::PromptTargetLatitude.to_string())
            .default(default.target.latitude)
            .interact_text()?;
        let longitude = Input::with_theme(&theme)
            .with_prompt(Message::PromptTargetLongitude.to_string())
            .default(default.target.longitude)
            .interact_text()?;
        let radius_meters = Input::with_theme(&theme)
            .with_prompt(Message::PromptRadius.to_string())
            .default(default.radius_meters)
            .validate_with(|radius: &f64| if *radius > 0.0 { Ok(()) } else { Err(Message::InvalidRadius(*radius).to_string()) })
            .interact_text()?;
        let poll_interval_ms = Input::with_theme(&theme)
            .with_prompt(Message::PromptPollInterval.to_string())
            .default(default.poll_interval_ms)
            .validate_with(|interval: &u64| if *interval > 0 { Ok(()) } else { Err(Message::InvalidPollInterval.to_string()) })
            .interact_text()?;

        let formulas = DistanceFormula::all();
        let formula_index = Select::with_theme(&theme)
            .with_prompt(Message::PromptDistanceFormula.to_string())
            .items(&formulas.iter().map(|formula| formula.to_string()).collect::<Vec<_>>())
            .default(formulas.iter().position(|formula| *formula == default.distance_formula).unwrap_or(0))
            .interact()?;

        Ok(GeofenceConfig {
            target: Coordinate::new(latitude, longitude),
            radius_meters,
            poll_interval_ms,
            distance_formula: formulas[formula_index],
            entry_flag_key: default.entry_flag_key,
        })
    }

    fn init_location(config: &Config) -> Result<LocationConfig> {
        let theme = ColorfulTheme::default();
        let current = config.location_config();
        msg_print!(Message::ConfigModuleLocation);

        let sources = ["fixed", "replay", "http"];
        let current_index = match current {
            LocationConfig::Fixed { .. } => 0,
            LocationConfig::Replay { .. } => 1,
            LocationConfig::Http { .. } => 2,
        };
        let source = Select::with_theme(&theme)
            .with_prompt(Message::PromptLocationSource.to_string())
            .items(&sources)
            .default(current_index)
            .interact()?;

        Ok(match sources[source] {
            "replay" => {
                let default_path = match &current {
                    LocationConfig::Replay { path } => path.to_string_lossy().to_string(),
                    _ => String::new(),
                };
                let path: String = Input::with_theme(&theme)
                    .with_prompt(Message::PromptReplayPath.to_string())
                    .default(default_path)
                    .interact_text()?;
                LocationConfig::Replay { path: PathBuf::from(path) }
            }
            "http" => {
                let default_url = match &current {
                    LocationConfig::Http { url } => url.clone(),
                    _ => String::new(),
                };
                let url = Input::with_theme(&theme)
                    .with_prompt(Message::PromptLocationUrl.to_string())
                    .default(default_url)
                    .interact_text()?;
                LocationConfig::Http { url }
            }
            _ => {
                let default = match current {
                    LocationConfig::Fixed { latitude, longitude } => Coordinate::new(latitude, longitude),
                    _ => config.geofence.clone().unwrap_or_default().target,
                };
                LocationConfig::Fixed {
                    latitude: Input::with_theme(&theme)
                        .with_prompt(Message::PromptLocationLatitude.to_string())
                        .default(default.latitude)
                        .interact_text()?,
                    longitude: Input::with_theme(&theme)
                        .with_prompt(Message::PromptLocationLongitude.to_string())
                        .default(default.longitude)
                        .interact_text()?,
                }
            }
        })
    }

    fn init_notifications(current: &Option<NotificationsConfig>) -> Result<NotificationsConfig> {
        let default = current.clone().unwrap_or_default();
        let theme = ColorfulTheme::default();
        msg_print!(Message::ConfigModuleNotifications);

        let enabled = Confirm::with_theme(&theme)
            .with_prompt(Message::PromptNotificationsEnabled.to_string())
            .default(default.enabled)
            .interact()?;
        let title = Input::with_theme(&theme)
            .with_prompt(Message::PromptNotificationTitle.to_string())
            .default(default.title)
            .interact_text()?;
        let body = Input::with_theme(&theme)
            .with_prompt(Message::PromptNotificationBody.to_string())
            .default(default.body)
            .interact_text()?;
        let play_sound = Confirm::with_theme(&theme)
            .with_prompt(Message::PromptPlaySound.to_string())
            .default(default.play_sound)
            .interact()?;
        let webhook_url: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptWebhookUrl.to_string())
            .default(default.webhook_url.unwrap_or_default())
            .allow_empty(true)
            .interact_text()?;

        Ok(NotificationsConfig {
            enabled,
            title,
            body,
            play_sound,
            webhook_url: Some(webhook_url).filter(|url| !url.trim().is_empty()),
        })
    }
}

fn parse_env<T, F>(lookup: &F, name: &str) -> GeofenceResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            GeofenceError::InvalidConfig(
                Message::InvalidEnvValue {
                    name: name.to_string(),
                    value: raw.clone(),
                }
                .to_string(),
            )
        }),
    }
}
