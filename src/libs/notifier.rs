//! Notification sinks and process-wide presentation settings.
//!
//! Presentation (alert, sound, badge) is configured once per process with
//! [`configure_presentation`] before the watcher activates; sinks read it
//! when they deliver a notification.

use super::error::{GeofenceError, GeofenceResult};
use super::location::Permission;
use super::messages::Message;
use crate::msg_print;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::io::Write;
use std::sync::OnceLock;
use std::time::Duration;

/// Value of the `type` data field attached to the welcome notification.
pub const WELCOME_NOTIFICATION_TYPE: &str = "museum_entry";

const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

static PRESENTATION: OnceLock<NotificationPresentation> = OnceLock::new();

/// How a delivered notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPresentation {
    pub show_alert: bool,
    pub play_sound: bool,
    pub set_badge: bool,
}

impl Default for NotificationPresentation {
    fn default() -> Self {
        Self {
            show_alert: true,
            play_sound: true,
            set_badge: false,
        }
    }
}

/// Sets the process-wide presentation. Only the first call has an effect;
/// returns whether this call was the one that set it.
pub fn configure_presentation(presentation: NotificationPresentation) -> bool {
    PRESENTATION.set(presentation).is_ok()
}

/// The configured presentation, or the default when nothing was configured.
pub fn presentation() -> NotificationPresentation {
    PRESENTATION.get().copied().unwrap_or_default()
}

/// A notification delivered immediately, without a delay trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            data: BTreeMap::new(),
        }
    }

    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// The greeting sent when the visitor walks in.
    pub fn welcome(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(title, body).with_data("type", WELCOME_NOTIFICATION_TYPE)
    }
}

pub trait NotificationSink: Send + Sync {
    fn request_permission(&self) -> impl Future<Output = GeofenceResult<Permission>> + Send;

    /// Delivers the notification right away.
    fn schedule(&self, notification: &Notification) -> impl Future<Output = GeofenceResult<()>> + Send;
}

/// Prints notifications through the message system.
#[derive(Debug, Clone)]
pub struct ConsoleNotifier {
    enabled: bool,
}

impl ConsoleNotifier {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl NotificationSink for ConsoleNotifier {
    async fn request_permission(&self) -> GeofenceResult<Permission> {
        Ok(if self.enabled { Permission::Granted } else { Permission::Denied })
    }

    async fn schedule(&self, notification: &Notification) -> GeofenceResult<()> {
        let presentation = presentation();
        if presentation.show_alert {
            msg_print!(Message::WelcomeNotification {
                title: notification.title.clone(),
                body: notification.body.clone(),
            });
        }
        if presentation.play_sound {
            let mut stdout = std::io::stdout();
            stdout.write_all(b"\x07")?;
            stdout.flush()?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    title: &'a str,
    body: &'a str,
    data: &'a BTreeMap<String, String>,
    presentation: NotificationPresentation,
}

/// POSTs notifications as JSON to a webhook.
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    url: String,
    enabled: bool,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, enabled: bool) -> GeofenceResult<Self> {
        let client = Client::builder().timeout(WEBHOOK_TIMEOUT).build()?;
        Ok(Self {
            client,
            url: url.into(),
            enabled,
        })
    }
}

impl NotificationSink for WebhookNotifier {
    async fn request_permission(&self) -> GeofenceResult<Permission> {
        Ok(if self.enabled && !self.url.trim().is_empty() {
            Permission::Granted
        } else {
            Permission::Denied
        })
    }

    async fn schedule(&self, notification: &Notification) -> GeofenceResult<()> {
        let payload = WebhookPayload {
            title: &notification.title,
            body: &notification.body,
            data: &notification.data,
            presentation: presentation(),
        };
        let res = self.client.post(&self.url).json(&payload).send().await?;
        if !res.status().is_success() {
            return Err(GeofenceError::Notification(format!("webhook answered {}", res.status())));
        }
        Ok(())
    }
}

/// Sink selected from the configuration.
#[derive(Debug, Clone)]
pub enum NotifierKind {
    Console(ConsoleNotifier),
    Webhook(WebhookNotifier),
}

impl NotificationSink for NotifierKind {
    async fn request_permission(&self) -> GeofenceResult<Permission> {
        match self {
            NotifierKind::Console(sink) => sink.request_permission().await,
            NotifierKind::Webhook(sink) => sink.request_permission().await,
        }
    }

    async fn schedule(&self, notification: &Notification) -> GeofenceResult<()> {
        match self {
            NotifierKind::Console(sink) => sink.schedule(notification).await,
            NotifierKind::Webhook(sink) => sink.schedule(notification).await,
        }
    }
}
