use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::api::GeneratorClient;
use crate::config::{Config, DisplayMode};
use crate::core::{Controller, GenerationResult, GeradorError, Thumbnail, View};

#[derive(Args)]
pub struct GenerateArgs {
    /// The prompt describing the image to generate
    #[arg(required = true)]
    pub prompt: String,

    /// Base image to guide the generation (img2img)
    #[arg(short, long, value_name = "PATH")]
    pub base: Option<PathBuf>,

    /// Output directory for the downloaded image
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Don't download the image
    #[arg(long)]
    pub no_download: bool,

    /// Output format (text, json, quiet)
    #[arg(short, long, default_value = "text")]
    pub format: String,
}

/// Console rendering of the controller's view: spinner for loading, stderr for alerts
struct ConsoleView {
    format: String,
    display: DisplayMode,
    spinner: Option<ProgressBar>,
    alerts: Vec<String>,
}

impl ConsoleView {
    fn new(format: &str, display: DisplayMode) -> Self {
        Self {
            format: format.to_string(),
            display,
            spinner: None,
            alerts: Vec::new(),
        }
    }

    fn is_text(&self) -> bool {
        self.format == "text"
    }
}

impl View for ConsoleView {
    fn set_file_name(&mut self, name: &str) {
        if self.is_text() && !name.is_empty() {
            println!("{}: {}", "Base image".cyan().bold(), name);
        }
    }

    fn set_file_info_visible(&mut self, _visible: bool) {}

    fn set_preview(&mut self, preview: Option<&Thumbnail>) {
        let Some(thumb) = preview else {
            return;
        };
        if !self.is_text() {
            return;
        }

        println!("{}: {}x{}", "Size".cyan().bold(), thumb.width, thumb.height);
        if self.display == DisplayMode::Terminal {
            let conf = viuer::Config {
                width: Some(thumb.pixels.width()),
                absolute_offset: false,
                ..Default::default()
            };
            if let Err(e) = viuer::print(&DynamicImage::ImageRgb8(thumb.pixels.clone()), &conf) {
                tracing::debug!("Failed to display preview in terminal: {}", e);
            }
        }
    }

    fn reset_file_picker(&mut self) {}

    fn show_loading(&mut self) {
        if !self.is_text() {
            return;
        }
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.yellow} {msg}") {
            pb.set_style(style);
        }
        pb.set_message("Generating image...");
        pb.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(pb);
    }

    fn hide_loading(&mut self) {
        if let Some(pb) = self.spinner.take() {
            pb.finish_and_clear();
        }
    }

    fn show_result(&mut self, result: &GenerationResult) {
        if self.is_text() {
            println!(
                "{} {}",
                "✓".green(),
                result.message.as_deref().unwrap_or("Image generated")
            );
        }
    }

    fn alert(&mut self, message: &str) {
        if self.format != "json" {
            eprintln!("{}: {}", "Error".red().bold(), message);
        }
        self.alerts.push(message.to_string());
    }
}

pub async fn run(args: GenerateArgs, config: &Config) -> Result<()> {
    let client = GeneratorClient::from_config(config)?;
    let mut controller = Controller::new(client);
    let mut view = ConsoleView::new(&args.format, config.output.display);

    if let Some(base) = &args.base {
        if let Err(e) = controller
            .select_base_image(std::slice::from_ref(base), &mut view)
            .await
        {
            exit_reported(&view, &e);
        }
    }

    let result = match controller.submit_generation(&args.prompt, &mut view).await {
        Ok(result) => result,
        Err(e) => exit_reported(&view, &e),
    };

    // Download image
    let output_dir = args
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.directory));

    let saved = if !args.no_download && config.output.auto_download {
        let path = controller
            .generator()
            .download(&result.download_url, &output_dir)
            .await
            .context("Failed to download generated image")?;
        Some(path)
    } else {
        None
    };

    // Display based on format
    match args.format.as_str() {
        "json" => {
            let output = serde_json::json!({
                "status": "completed",
                "prompt": args.prompt.trim(),
                "base_image": controller.upload().base_image().map(|i| i.name.clone()),
                "result": result,
                "path": saved.as_ref().map(|p| p.to_string_lossy().to_string()),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        "quiet" => match &saved {
            Some(path) => println!("{}", path.display()),
            None => println!("{}", result.image_url),
        },
        _ => {
            println!();
            println!("{}: {}", "Prompt".cyan().bold(), args.prompt.trim());
            println!("{}: {}", "Image".cyan().bold(), result.image_url);
            println!("{}: {}", "Download".cyan().bold(), result.download_url);

            if let Some(path) = &saved {
                println!("{}: {}", "Saved".cyan().bold(), path.display());

                // Try to display image in terminal
                if config.output.display == DisplayMode::Terminal {
                    println!();
                    display_image_terminal(path);
                }
            }
        }
    }

    Ok(())
}

/// Exit after a failure the view has already shown, so it is not printed twice.
fn exit_reported(view: &ConsoleView, err: &GeradorError) -> ! {
    if view.format == "json" {
        let failure = serde_json::json!({
            "status": "failed",
            "error": view.alerts.last().cloned().unwrap_or_else(|| err.to_string()),
        });
        if let Ok(text) = serde_json::to_string_pretty(&failure) {
            println!("{}", text);
        }
    }
    std::process::exit(1);
}

/// Display an image in the terminal using viuer
fn display_image_terminal(path: &std::path::Path) {
    let conf = viuer::Config {
        width: Some(80),
        height: Some(30),
        absolute_offset: false,
        ..Default::default()
    };

    if let Err(e) = viuer::print_from_file(path, &conf) {
        tracing::debug!("Failed to display image in terminal: {}", e);
    }
}
