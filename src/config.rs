use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Environment variable overriding `server.base_url`
pub const SERVER_URL_ENV: &str = "GERADOR_SERVER_URL";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tui: TuiConfig,

    #[serde(skip)]
    pub config_path: PathBuf,

    /// `GERADOR_SERVER_URL`, if set. Never written back to the file.
    #[serde(skip)]
    pub server_url_override: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_true")]
    pub auto_download: bool,
    #[serde(default = "default_display")]
    pub display: DisplayMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TuiConfig {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_prompt_max_height")]
    pub prompt_max_height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Terminal,
    None,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Terminal => "terminal",
            DisplayMode::None => "none",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "terminal" => Some(DisplayMode::Terminal),
            "none" => Some(DisplayMode::None),
            _ => None,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["terminal", "none"]
    }
}

// Default value functions
fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_endpoint() -> String {
    "/gerar-imagem".to_string()
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_output_directory() -> String {
    "./gerador-output".to_string()
}

fn default_true() -> bool {
    true
}

fn default_display() -> DisplayMode {
    DisplayMode::Terminal
}

fn default_theme() -> String {
    "dark".to_string()
}

fn default_prompt_max_height() -> u16 {
    12
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            endpoint: default_endpoint(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            auto_download: true,
            display: DisplayMode::Terminal,
        }
    }
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            prompt_max_height: default_prompt_max_height(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            output: OutputConfig::default(),
            tui: TuiConfig::default(),
            config_path: PathBuf::new(),
            server_url_override: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "gerador", "gerador")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file or create default
    pub fn load_or_create() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            let mut config: Config = toml::from_str(&content)
                .context("Failed to parse config file")?;
            config.config_path = config_path;
            config
        } else {
            let mut config = Config::default();
            config.config_path = config_path;
            config.save()?;
            config
        };

        config.apply_env();
        Ok(config)
    }

    /// Environment variable takes precedence over the file
    fn apply_env(&mut self) {
        self.server_url_override = std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty());
    }

    /// Server address in effect: the environment override, else the file value
    pub fn base_url(&self) -> &str {
        self.server_url_override
            .as_deref()
            .unwrap_or(&self.server.base_url)
    }

    /// Defaults, keeping the file location and any environment override
    pub fn reset(&mut self) {
        *self = Config {
            config_path: std::mem::take(&mut self.config_path),
            server_url_override: self.server_url_override.take(),
            ..Config::default()
        };
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&self.config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Full URL of the generation endpoint
    pub fn endpoint_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url().trim_end_matches('/'),
            self.server.endpoint.trim_start_matches('/')
        )
    }

    /// Set a config value by key path (e.g., "server.base_url", "tui.theme")
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "server.base_url" => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    anyhow::bail!("Base URL must start with http:// or https://");
                }
                self.server.base_url = value.to_string();
            }
            "server.endpoint" => {
                if !value.starts_with('/') {
                    anyhow::bail!("Endpoint must start with '/'");
                }
                self.server.endpoint = value.to_string();
            }
            "server.connect_timeout_secs" => {
                self.server.connect_timeout_secs = value.parse()
                    .context("Invalid number of seconds")?;
            }
            "output.directory" => self.output.directory = value.to_string(),
            "output.auto_download" => {
                self.output.auto_download = value.parse()
                    .context("Invalid boolean value")?;
            }
            "output.display" => {
                self.output.display = DisplayMode::parse(value).with_context(|| {
                    format!("Invalid display mode. Valid values: {}", DisplayMode::variants().join(", "))
                })?;
            }
            "tui.theme" => {
                let valid = Self::themes();
                if valid.contains(&value) {
                    self.tui.theme = value.to_string();
                } else {
                    anyhow::bail!("Invalid theme. Valid values: {}", valid.join(", "));
                }
            }
            "tui.prompt_max_height" => {
                let height: u16 = value.parse().context("Invalid height")?;
                if height < 3 {
                    anyhow::bail!("Prompt height must be at least 3 rows");
                }
                self.tui.prompt_max_height = height;
            }
            _ => anyhow::bail!("Unknown config key: {}", key),
        }
        Ok(())
    }

    /// Get a config value by key path
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "server.base_url" => Some(self.server.base_url.clone()),
            "server.endpoint" => Some(self.server.endpoint.clone()),
            "server.connect_timeout_secs" => Some(self.server.connect_timeout_secs.to_string()),
            "output.directory" => Some(self.output.directory.clone()),
            "output.auto_download" => Some(self.output.auto_download.to_string()),
            "output.display" => Some(self.output.display.as_str().to_string()),
            "tui.theme" => Some(self.tui.theme.clone()),
            "tui.prompt_max_height" => Some(self.tui.prompt_max_height.to_string()),
            _ => None,
        }
    }

    /// Get all config keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "server.base_url",
            "server.endpoint",
            "server.connect_timeout_secs",
            "output.directory",
            "output.auto_download",
            "output.display",
            "tui.theme",
            "tui.prompt_max_height",
        ]
    }

    /// Available themes
    pub fn themes() -> &'static [&'static str] {
        &["dark", "light"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_roundtrip_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.server.endpoint, "/gerar-imagem");
        assert_eq!(parsed.tui.prompt_max_height, 12);
    }

    #[test]
    fn test_partial_file_gets_defaults() {
        let parsed: Config = toml::from_str("[server]\nbase_url = \"http://gen:8080\"\n").unwrap();
        assert_eq!(parsed.server.base_url, "http://gen:8080");
        assert_eq!(parsed.server.endpoint, "/gerar-imagem");
        assert_eq!(parsed.output.display, DisplayMode::Terminal);
    }

    #[test]
    fn test_endpoint_url_joins_slashes() {
        let mut config = Config::default();
        config.server.base_url = "http://localhost:5000/".to_string();
        assert_eq!(config.endpoint_url(), "http://localhost:5000/gerar-imagem");
    }

    #[test]
    fn test_set_and_get() {
        let mut config = Config::default();
        config.set("tui.theme", "light").unwrap();
        config.set("output.display", "none").unwrap();
        config.set("tui.prompt_max_height", "6").unwrap();
        assert_eq!(config.get("tui.theme").as_deref(), Some("light"));
        assert_eq!(config.get("output.display").as_deref(), Some("none"));
        assert_eq!(config.get("tui.prompt_max_height").as_deref(), Some("6"));

        assert!(config.set("tui.theme", "sepia").is_err());
        assert!(config.set("server.base_url", "localhost").is_err());
        assert!(config.set("tui.prompt_max_height", "1").is_err());
        assert!(config.set("nope", "x").is_err());
    }

    #[test]
    fn test_env_override_is_not_saved() {
        let dir = std::env::temp_dir().join(format!("gerador-config-{}", std::process::id()));
        let mut config = Config {
            config_path: dir.join("config.toml"),
            server_url_override: Some("http://temp-host:9".to_string()),
            ..Config::default()
        };

        assert_eq!(config.base_url(), "http://temp-host:9");
        assert_eq!(config.endpoint_url(), "http://temp-host:9/gerar-imagem");

        config.set("tui.theme", "light").unwrap();
        config.save().unwrap();

        let text = fs::read_to_string(&config.config_path).unwrap();
        let saved: Config = toml::from_str(&text).unwrap();
        assert_eq!(saved.server.base_url, "http://127.0.0.1:5000");
        assert_eq!(saved.tui.theme, "light");
        assert!(!text.contains("temp-host"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_reset_keeps_path_and_override() {
        let mut config = Config {
            config_path: PathBuf::from("/tmp/gerador/config.toml"),
            server_url_override: Some("http://gpu-box:5000".to_string()),
            ..Config::default()
        };
        config.set("server.base_url", "http://other:5000").unwrap();
        config.set("tui.theme", "light").unwrap();

        config.reset();
        assert_eq!(config.server.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.tui.theme, "dark");
        assert_eq!(config.config_path, PathBuf::from("/tmp/gerador/config.toml"));
        assert_eq!(config.base_url(), "http://gpu-box:5000");
    }

    #[test]
    fn test_every_key_is_readable() {
        let config = Config::default();
        for key in Config::keys() {
            assert!(config.get(key).is_some(), "missing key {}", key);
        }
    }
}
