use crate::db::flags::FlagStore;
use crate::libs::config::Config;
use crate::libs::daemon;
use crate::libs::view::View;
use anyhow::Result;

pub fn cmd() -> Result<()> {
    let config = Config::load()?;
    let geofence = config.geofence_config()?;
    let flag = FlagStore::new()?.fetch(&geofence.entry_flag_key)?;
    let pid = daemon::active_pid().unwrap_or(None);

    View::status(&geofence, &config.location_config(), flag.as_ref(), pid);
    Ok(())
}
