use crate::libs::daemon;
use crate::libs::messages::Message;
use crate::msg_info;
use anyhow::Result;
use clap::Args;

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Run in the current terminal instead of detaching
    #[arg(short, long)]
    foreground: bool,

    /// Stop the background watcher
    #[arg(long, conflicts_with = "foreground")]
    stop: bool,

    /// Internal: entry point of the detached process
    #[arg(long, hide = true)]
    daemon_run: bool,
}

pub async fn cmd(args: WatchArgs) -> Result<()> {
    if args.daemon_run {
        return daemon::run_with_signal_handling().await;
    }
    if args.stop {
        return daemon::stop();
    }
    if args.foreground {
        msg_info!(Message::WatcherStartingForeground);
        return daemon::run_monitor().await;
    }
    daemon::spawn()
}
