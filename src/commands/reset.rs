use crate::db::flags::FlagStore;
use crate::libs::config::Config;
use crate::libs::messages::Message;
use crate::libs::monitor::reset_entry_flag;
use crate::msg_success;
use anyhow::Result;

pub async fn cmd() -> Result<()> {
    let geofence = Config::load()?.geofence_config()?;
    let store = FlagStore::new()?;
    reset_entry_flag(&store, &geofence.entry_flag_key).await?;
    msg_success!(Message::EntryFlagReset);
    Ok(())
}
