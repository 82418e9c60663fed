//! Location providers.
//!
//! A provider answers two questions: may we track the visitor at all, and
//! where are they right now. The watcher picks one implementation from the
//! configuration through [`LocationSource`].

use super::error::{GeofenceError, GeofenceResult};
use super::geo::Coordinate;
use reqwest::{Client, StatusCode};
use std::future::Future;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Timeout for a single position request against an HTTP endpoint.
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

impl Permission {
    pub fn is_granted(self) -> bool {
        self == Permission::Granted
    }
}

pub trait LocationProvider: Send + Sync {
    /// Asks for permission to read the position (foreground only).
    fn request_permission(&self) -> impl Future<Output = GeofenceResult<Permission>> + Send;

    /// Reads the current position. May fail; the caller treats a failure as a skipped poll.
    fn current_position(&self) -> impl Future<Output = GeofenceResult<Coordinate>> + Send;
}

/// Always reports the same position.
#[derive(Debug, Clone)]
pub struct FixedLocation {
    position: Coordinate,
}

impl FixedLocation {
    pub fn new(position: Coordinate) -> Self {
        Self { position }
    }
}

impl LocationProvider for FixedLocation {
    async fn request_permission(&self) -> GeofenceResult<Permission> {
        Ok(Permission::Granted)
    }

    async fn current_position(&self) -> GeofenceResult<Coordinate> {
        Ok(self.position)
    }
}

/// Replays a recorded track, one coordinate per poll.
///
/// Once the track is exhausted the last coordinate is repeated.
#[derive(Debug)]
pub struct ReplayLocation {
    track: Vec<Coordinate>,
    cursor: AtomicUsize,
}

impl ReplayLocation {
    pub fn new(track: Vec<Coordinate>) -> GeofenceResult<Self> {
        if track.is_empty() {
            return Err(GeofenceError::InvalidConfig("replay track is empty".to_string()));
        }
        Ok(Self {
            track,
            cursor: AtomicUsize::new(0),
        })
    }

    /// Loads a track from a JSON array of `{ "latitude": .., "longitude": .. }` objects.
    pub fn from_file(path: &Path) -> GeofenceResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let track: Vec<Coordinate> = serde_json::from_str(&raw)?;
        Self::new(track)
    }

    pub fn len(&self) -> usize {
        self.track.len()
    }

    pub fn is_empty(&self) -> bool {
        self.track.is_empty()
    }
}

impl LocationProvider for ReplayLocation {
    async fn request_permission(&self) -> GeofenceResult<Permission> {
        Ok(Permission::Granted)
    }

    async fn current_position(&self) -> GeofenceResult<Coordinate> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed);
        Ok(self.track[index.min(self.track.len() - 1)])
    }
}

/// Reads the position from an HTTP endpoint returning `{ "latitude": .., "longitude": .. }`.
///
/// The endpoint refusing access (401/403) is interpreted as a denied permission.
#[derive(Debug, Clone)]
pub struct HttpLocation {
    client: Client,
    url: String,
}

impl HttpLocation {
    pub fn new(url: impl Into<String>) -> GeofenceResult<Self> {
        let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
        Ok(Self { client, url: url.into() })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl LocationProvider for HttpLocation {
    async fn request_permission(&self) -> GeofenceResult<Permission> {
        let res = self.client.get(&self.url).send().await?;
        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Ok(Permission::Denied),
            status if status.is_success() => Ok(Permission::Granted),
            status => Err(GeofenceError::HttpStatus(status)),
        }
    }

    async fn current_position(&self) -> GeofenceResult<Coordinate> {
        let res = self.client.get(&self.url).send().await?;
        if !res.status().is_success() {
            return Err(GeofenceError::HttpStatus(res.status()));
        }
        let position = res.json::<Coordinate>().await?;
        if !position.latitude.is_finite() || !position.longitude.is_finite() {
            return Err(GeofenceError::Location(format!("invalid coordinate {}", position)));
        }
        Ok(position)
    }
}

/// Provider selected from the configuration.
#[derive(Debug)]
pub enum LocationSource {
    Fixed(FixedLocation),
    Replay(ReplayLocation),
    Http(HttpLocation),
}

impl LocationProvider for LocationSource {
    async fn request_permission(&self) -> GeofenceResult<Permission> {
        match self {
            LocationSource::Fixed(provider) => provider.request_permission().await,
            LocationSource::Replay(provider) => provider.request_permission().await,
            LocationSource::Http(provider) => provider.request_permission().await,
        }
    }

    async fn current_position(&self) -> GeofenceResult<Coordinate> {
        match self {
            LocationSource::Fixed(provider) => provider.current_position().await,
            LocationSource::Replay(provider) => provider.current_position().await,
            LocationSource::Http(provider) => provider.current_position().await,
        }
    }
}
