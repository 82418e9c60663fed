pub mod check;
pub mod init;
pub mod reset;
pub mod status;
pub mod watch;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Configuration initialization")]
    Init(init::InitArgs),
    #[command(about = "Watch the visitor's position and greet them on arrival")]
    Watch(watch::WatchArgs),
    #[command(about = "Check whether a position is inside the museum geofence")]
    Check(check::CheckArgs),
    #[command(about = "Show geofence settings, entry flag and watcher state")]
    Status,
    #[command(about = "Clear the entry flag so the next visit is greeted again")]
    Reset,
}

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub async fn menu() -> Result<()> {
        let cli = Self::parse();
        match cli.command {
            Commands::Init(args) => init::cmd(args),
            Commands::Watch(args) => watch::cmd(args).await,
            Commands::Check(args) => check::cmd(args),
            Commands::Status => status::cmd(),
            Commands::Reset => reset::cmd().await,
        }
    }
}
