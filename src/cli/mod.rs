pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "gerador",
    version,
    about = "Gerador - prompt-to-image client for the gerar-imagem endpoint",
    long_about = r#"Gerador - prompt-to-image client for the gerar-imagem endpoint

Sends a text prompt, and optionally a base image, to an image generation
server and shows or downloads the generated image.
Run without arguments to launch the interactive form.

SETUP:
  Point the client at your server via environment variable or config:
    export GERADOR_SERVER_URL=http://127.0.0.1:5000
    gerador config set server.base_url http://127.0.0.1:5000

EXAMPLES:
  Generate an image:
    gerador generate "a lighthouse at dusk, oil painting"
    gerador g "isometric city block" --format json

  Start from a base image:
    gerador generate "same scene in winter" --base photo.jpg

  Manage configuration:
    gerador config show
    gerador config set output.directory ~/Pictures/gerador

  Launch the interactive form:
    gerador

OUTPUT FORMATS:
  --format text   Human-readable output (default)
  --format json   Machine-readable JSON
  --format quiet  Minimal output, just the saved path or image URL"#,
    after_help = r#"CONFIGURATION:
  Config file: ~/.config/gerador/config.toml (Linux)
  Logging: set RUST_LOG=debug to see requests and responses"#
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an image from a text prompt
    ///
    /// Sends the prompt, plus the base image if given, to the generation
    /// endpoint. The image is saved to the configured output directory by default.
    #[command(
        alias = "g",
        after_help = r#"EXAMPLES:
  Basic generation:
    gerador generate "a red apple on a wooden table"

  With a base image:
    gerador generate "turn it into a watercolor" --base apple.png

  Custom output directory:
    gerador generate "logo design" --output ./logos

  Only print the URL:
    gerador generate "abstract art" --no-download --format quiet"#
    )]
    Generate(commands::generate::GenerateArgs),

    /// View or modify configuration
    ///
    /// Changes are saved to the config file immediately.
    #[command(
        alias = "c",
        after_help = r#"EXAMPLES:
  Show all settings:
    gerador config show

  Set values:
    gerador config set server.base_url http://gpu-box:5000
    gerador config set tui.theme light

  Reset to defaults:
    gerador config reset --force

AVAILABLE SETTINGS:
  server.base_url             - Generation server address
  server.endpoint             - Generation path (default /gerar-imagem)
  server.connect_timeout_secs - Connect timeout in seconds
  output.directory            - Where to save images
  output.auto_download        - Download the result automatically (true/false)
  output.display              - Show images in the terminal (terminal/none)
  tui.theme                   - Starting theme (dark/light)
  tui.prompt_max_height       - Maximum prompt box height in rows"#
    )]
    Config(commands::config::ConfigArgs),
}
