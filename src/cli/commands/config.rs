use anyhow::Result;
use clap::{Args, Subcommand};
use colored::Colorize;

use crate::config::{Config, SERVER_URL_ENV};

const BASE_URL_KEY: &str = "server.base_url";

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show every setting, grouped by section
    Show,

    /// Print the value in effect for one key
    Get {
        /// Setting key, e.g. server.base_url or output.display
        key: String,
    },

    /// Validate and store a value in the config file
    Set {
        /// Setting key, e.g. server.base_url or output.display
        key: String,
        /// New value
        value: String,
    },

    /// Print where the config file lives
    Path,

    /// Restore the file to its defaults
    Reset {
        /// Required, reset does nothing without it
        #[arg(short, long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, config: &mut Config) -> Result<()> {
    match args.command.unwrap_or(ConfigCommand::Show) {
        ConfigCommand::Show => show(config),
        ConfigCommand::Get { key } => get(config, &key)?,
        ConfigCommand::Set { key, value } => set(config, &key, &value)?,
        ConfigCommand::Path => println!("{}", config.config_path.display()),
        ConfigCommand::Reset { force } => reset(config, force)?,
    }
    Ok(())
}

/// Value of `key` as it should be displayed, with the override marked.
fn describe(config: &Config, key: &str) -> Option<String> {
    let stored = config.get(key)?;
    match (&config.server_url_override, key) {
        (Some(url), BASE_URL_KEY) => Some(format!(
            "{} {}",
            url,
            format!("(from {}, file has {})", SERVER_URL_ENV, stored).dimmed()
        )),
        _ => Some(stored),
    }
}

fn show(config: &Config) {
    println!("{}", "Configuration".cyan().bold());
    println!("{}", "=".repeat(50));

    let mut section = "";
    for key in Config::keys() {
        let Some((group, name)) = key.split_once('.') else {
            continue;
        };
        if group != section {
            println!();
            println!("[{}]", group.yellow());
            section = group;
        }
        if let Some(value) = describe(config, key) {
            println!("  {} = {}", name.bold(), value);
        }
    }

    println!();
    println!("{}", format!("Endpoint: {}", config.endpoint_url()).dimmed());
    println!("{}", format!("Config file: {}", config.config_path.display()).dimmed());
}

fn get(config: &Config, key: &str) -> Result<()> {
    if key == BASE_URL_KEY {
        println!("{}", config.base_url());
        return Ok(());
    }

    match config.get(key) {
        Some(value) => {
            println!("{}", value);
            Ok(())
        }
        None => {
            eprintln!("{}: Unknown config key '{}'", "Error".red().bold(), key);
            eprintln!("Available keys: {}", Config::keys().join(", "));
            anyhow::bail!("Unknown config key: {}", key)
        }
    }
}

fn set(config: &mut Config, key: &str, value: &str) -> Result<()> {
    config.set(key, value)?;
    config.save()?;
    println!("{} Set {} = {}", "✓".green(), key.cyan(), value);

    if key == BASE_URL_KEY {
        warn_overridden(config);
    }
    Ok(())
}

fn reset(config: &mut Config, force: bool) -> Result<()> {
    if !force {
        eprintln!(
            "{}: This will reset all configuration to defaults. Use --force to confirm.",
            "Warning".yellow().bold()
        );
        return Ok(());
    }

    config.reset();
    config.save()?;
    println!("{} Configuration reset to defaults", "✓".green());
    warn_overridden(config);
    Ok(())
}

fn warn_overridden(config: &Config) {
    if let Some(url) = &config.server_url_override {
        eprintln!(
            "{}: {} is set, the client keeps using {}",
            "Note".yellow().bold(),
            SERVER_URL_ENV,
            url
        );
    }
}
