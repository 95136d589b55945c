use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use classify_app::{run_app, ClientConfig, LogSetting};
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "classify_app", about = "Classify images with a remote classification server")]
struct Cli {
    /// Base URL of the classification server.
    #[arg(long)]
    endpoint: Option<String>,
    /// RON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Where log output goes.
    #[arg(long, value_enum)]
    log: Option<LogSetting>,
    /// Log at debug level.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = ClientConfig::load_or_default(cli.config.as_deref())?;
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(log) = cli.log {
        config.log = log;
    }
    config.validate().context("invalid configuration")?;

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    client_logging::initialize(config.log.into(), level, &config.log_file);

    run_app(&config)
}
