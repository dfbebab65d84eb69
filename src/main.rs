//! `misty` command line.
//!
//! Reads the robot address from `~/.config/misty/misty.yml` (or `--config`)
//! and sends a single command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use misty_http::{
    version::{APPLICATION_DESC, APPLICATION_NAME},
    CallContext, ConfigFile, VersionInfo,
};

#[derive(Debug, Parser)]
#[command(name = APPLICATION_NAME, about = APPLICATION_DESC, version = version_banner())]
struct Cli {
    /// Config file (default is ~/.config/misty/misty.yml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Change the color of the LED
    ChangeLed {
        #[arg(long, default_value_t = 255)]
        red: u8,
        #[arg(long, default_value_t = 0)]
        green: u8,
        #[arg(long, default_value_t = 0)]
        blue: u8,
    },
}

fn version_banner() -> String {
    VersionInfo::current().to_string()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();

    let config = ConfigFile::load(cli.config.as_deref()).context("cannot load config")?;
    tracing::debug!(path = %config.path().display(), "loaded config");
    let client = config.config().client()?;

    match cli.command {
        Commands::ChangeLed { red, green, blue } => {
            let result = client
                .display()
                .change_led(&CallContext::new(), red, green, blue)
                .await;
            match &result {
                Ok(()) => tracing::info!(red, green, blue, "led changed"),
                Err(err) => tracing::error!(error = %err, "cannot change led color"),
            }
            result?;
        }
    }

    Ok(())
}
