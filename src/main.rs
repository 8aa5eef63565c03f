use anyhow::{Context, Result};
use clap::Parser;
use std::fs::{self, File, OpenOptions};
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::writer::BoxMakeWriter, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

mod api;
mod cli;
mod config;
mod core;
mod http_client;
mod tui;

use cli::{Cli, Commands};
use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing. The TUI owns the terminal, so its logs go to a file.
    let writer = match cli.command {
        Some(_) => BoxMakeWriter::new(std::io::stderr),
        None => BoxMakeWriter::new(Mutex::new(open_log_file()?)),
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(cli.command.is_some())
                .with_writer(writer),
        )
        .init();

    // Load or create config
    let mut config = Config::load_or_create()?;

    match cli.command {
        Some(Commands::Generate(args)) => {
            cli::commands::generate::run(args, &config).await?;
        }
        Some(Commands::Config(args)) => {
            cli::commands::config::run(args, &mut config)?;
        }
        None => {
            // Launch TUI
            tui::run(&config).await?;
        }
    }

    Ok(())
}

/// Log file of the interactive form, next to the config file
fn open_log_file() -> Result<File> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir).context("Failed to create config directory")?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("gerador.log"))
        .context("Failed to open log file")
}
