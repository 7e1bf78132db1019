use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "commitwatch")]
#[command(about = "Polls hosted repositories for new commits and relays them to a chat channel")]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the tracking state file (overrides config)
    #[arg(long)]
    pub state_file: Option<PathBuf>,

    /// Poll interval in seconds (overrides config)
    #[arg(long)]
    pub interval: Option<u64>,

    /// Address for the HTTP endpoint (overrides config)
    #[arg(long)]
    pub bind: Option<String>,

    /// Log announcements instead of delivering them
    #[arg(long)]
    pub dry_run: bool,

    /// Run a single reconciliation cycle and exit
    #[arg(long)]
    pub once: bool,
}
