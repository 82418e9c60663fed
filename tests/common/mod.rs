//! Test doubles for the geofence monitor collaborators.
//!
//! Each double is a cheap handle around shared state, so a test can keep a
//! clone for assertions after moving the original into the monitor.
//! [`CannedServer`] stands in for the HTTP endpoints.
#![allow(dead_code)]

use museo::libs::error::{GeofenceError, GeofenceResult};
use museo::libs::geo::Coordinate;
use museo::libs::location::{LocationProvider, Permission};
use museo::libs::notifier::{Notification, NotificationSink};
use museo::libs::store::KeyValueStore;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Roughly 1.1 km east of (0, 0).
pub const FAR_AWAY: Coordinate = Coordinate {
    latitude: 0.0,
    longitude: 0.01,
};
pub const ORIGIN: Coordinate = Coordinate {
    latitude: 0.0,
    longitude: 0.0,
};

#[derive(Default)]
struct LocationState {
    script: VecDeque<Option<Coordinate>>,
    current: Option<Coordinate>,
}

/// Plays a script of positions (`None` = failed query), then keeps the last position.
#[derive(Clone)]
pub struct ScriptedLocation {
    permission: Permission,
    state: Arc<Mutex<LocationState>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedLocation {
    pub fn at(position: Coordinate) -> Self {
        let location = Self::denied();
        location.state.lock().current = Some(position);
        Self {
            permission: Permission::Granted,
            ..location
        }
    }

    pub fn scripted(script: Vec<Option<Coordinate>>) -> Self {
        let location = Self::at(ORIGIN);
        location.state.lock().script = script.into();
        location
    }

    pub fn denied() -> Self {
        Self {
            permission: Permission::Denied,
            state: Arc::new(Mutex::new(LocationState::default())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn move_to(&self, position: Coordinate) {
        self.state.lock().current = Some(position);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LocationProvider for ScriptedLocation {
    async fn request_permission(&self) -> GeofenceResult<Permission> {
        Ok(self.permission)
    }

    async fn current_position(&self) -> GeofenceResult<Coordinate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut state = self.state.lock();
        match state.script.pop_front() {
            Some(Some(position)) => {
                state.current = Some(position);
                Ok(position)
            }
            Some(None) => Err(GeofenceError::Location("gps timeout".to_string())),
            None => state.current.ok_or_else(|| GeofenceError::Location("no fix".to_string())),
        }
    }
}

/// Records every delivered notification.
#[derive(Clone)]
pub struct RecordingNotifier {
    permission: Permission,
    fail: Arc<AtomicBool>,
    sent: Arc<Mutex<Vec<Notification>>>,
}

impl RecordingNotifier {
    pub fn granted() -> Self {
        Self {
            permission: Permission::Granted,
            fail: Arc::new(AtomicBool::new(false)),
            sent: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn denied() -> Self {
        Self {
            permission: Permission::Denied,
            ..Self::granted()
        }
    }

    pub fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }
}

impl NotificationSink for RecordingNotifier {
    async fn request_permission(&self) -> GeofenceResult<Permission> {
        Ok(self.permission)
    }

    async fn schedule(&self, notification: &Notification) -> GeofenceResult<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(GeofenceError::Notification("sink offline".to_string()));
        }
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

/// In-memory store that counts operations and can be told to fail.
#[derive(Clone, Default)]
pub struct RecordingStore {
    values: Arc<Mutex<HashMap<String, String>>>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
    deletes: Arc<AtomicUsize>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    pub fn preset(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }

    /// Total number of operations, successful or not.
    pub fn touched(&self) -> usize {
        self.reads.load(Ordering::SeqCst) + self.writes() + self.deletes()
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl KeyValueStore for RecordingStore {
    async fn get(&self, key: &str) -> GeofenceResult<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(GeofenceError::Io(std::io::Error::other("storage unavailable")));
        }
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> GeofenceResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GeofenceError::Io(std::io::Error::other("storage unavailable")));
        }
        self.preset(key, value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> GeofenceResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(GeofenceError::Io(std::io::Error::other("storage unavailable")));
        }
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Local HTTP server answering every request with the same status and JSON body.
pub struct CannedServer {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl CannedServer {
    pub async fn start(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason(status),
            body.len(),
            body
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await;
                recorded.lock().push(request);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self { url, requests }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// JSON body of the most recent request.
    pub fn last_body(&self) -> serde_json::Value {
        let requests = self.requests.lock();
        let request = requests.last().expect("no request received");
        let body = request.split_once("\r\n\r\n").map(|(_, body)| body).unwrap_or("");
        serde_json::from_str(body).unwrap()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        403 => "Forbidden",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut raw = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let read = match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(read) => read,
        };
        raw.extend_from_slice(&chunk[..read]);

        if let Some(end) = raw.windows(4).position(|window| window == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&raw[..end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if raw.len() >= end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&raw).to_string()
}
