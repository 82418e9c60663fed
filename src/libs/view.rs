use super::config::{GeofenceConfig, LocationConfig};
use super::messages::Message;
use crate::db::flags::Flag;
use prettytable::{row, Table};

pub struct View {}

impl View {
    pub fn status(geofence: &GeofenceConfig, location: &LocationConfig, flag: Option<&Flag>, pid: Option<u32>) {
        let mut table = Table::new();

        let source = match location {
            LocationConfig::Fixed { latitude, longitude } => format!("fixed ({}, {})", latitude, longitude),
            LocationConfig::Replay { path } => format!("replay ({})", path.display()),
            LocationConfig::Http { url } => format!("http ({})", url),
        };
        let entry_flag = match flag {
            Some(flag) => format!("{} (since {})", flag.value, flag.updated_at.format("%Y-%m-%d %H:%M:%S")),
            None => Message::StatusNotSet.to_string(),
        };
        let watcher = match pid {
            Some(pid) => format!("PID {}", pid),
            None => Message::StatusNotRunning.to_string(),
        };

        table.add_row(row!["TARGET", geofence.target]);
        table.add_row(row!["RADIUS", format!("{}m", geofence.radius_meters)]);
        table.add_row(row!["POLL INTERVAL", format!("{}ms", geofence.poll_interval_ms)]);
        table.add_row(row!["FORMULA", geofence.distance_formula]);
        table.add_row(row!["LOCATION", source]);
        table.add_row(row![format!("ENTRY FLAG ({})", geofence.entry_flag_key), entry_flag]);
        table.add_row(row!["WATCHER", watcher]);
        table.printstd();
    }
}
