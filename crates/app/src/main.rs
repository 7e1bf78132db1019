use anyhow::Result;
use clap::Parser;
use commitwatch::cli::CliArgs;
use commitwatch::config::Config;
use commitwatch::{daemon, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let config = Config::from_cli_and_file(&cli_args)?;

    logging::init_tracing(&config.log_level);

    daemon::run(config, cli_args.once).await
}
