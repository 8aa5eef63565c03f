use async_channel::{Receiver, Sender};
use std::path::PathBuf;

use super::prompt_area::{AutoGrow, PromptInput};
use super::theme::ThemeToggle;
use crate::api::GeneratorClient;
use crate::config::Config;
use crate::core::{
    Controller, GeneratedImage, GenerationResult, GeradorError, Thumbnail, View,
};

/// Outcome of a generation running on a background task
pub type Outcome = Result<GeneratedImage, GeradorError>;

/// Outcome of a download running on a background task
pub type DownloadOutcome = Result<PathBuf, GeradorError>;

/// Application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    /// Editing the prompt
    Prompt,
    /// Typing a path into the file picker
    PickFile,
}

/// Everything the controller can show, as rendered by the TUI
#[derive(Debug, Default)]
pub struct Screen {
    /// Filename label
    pub file_name: String,

    /// Whether the attached-file box is shown
    pub file_info_visible: bool,

    /// Thumbnail of the base image
    pub preview: Option<Thumbnail>,

    /// Current value of the file picker
    pub picker_value: String,

    /// Loading modal
    pub loading: bool,

    /// Result modal
    pub result: Option<GenerationResult>,

    /// Alert modal
    pub alert: Option<String>,

    /// Status line message
    pub status_message: Option<String>,
}

impl View for Screen {
    fn set_file_name(&mut self, name: &str) {
        self.file_name = name.to_string();
    }

    fn set_file_info_visible(&mut self, visible: bool) {
        self.file_info_visible = visible;
    }

    fn set_preview(&mut self, preview: Option<&Thumbnail>) {
        self.preview = preview.cloned();
    }

    fn reset_file_picker(&mut self) {
        self.picker_value.clear();
    }

    fn show_loading(&mut self) {
        self.loading = true;
        self.result = None;
    }

    fn hide_loading(&mut self) {
        self.loading = false;
    }

    fn show_result(&mut self, result: &GenerationResult) {
        self.result = Some(result.clone());
    }

    fn alert(&mut self, message: &str) {
        self.alert = Some(message.to_string());
    }
}

/// TUI application state
pub struct App {
    /// Current mode
    pub mode: AppMode,

    /// Configuration
    pub config: Config,

    /// Upload state and request lifecycle
    pub controller: Controller<GeneratorClient>,

    /// What the controller last told us to show
    pub screen: Screen,

    /// Prompt text area
    pub prompt: PromptInput,

    pub auto_grow: AutoGrow,

    pub theme: ThemeToggle,

    /// Edit buffer of the file picker
    pub picker_draft: String,

    /// Where the last result was saved
    pub downloaded: Option<PathBuf>,

    /// A download task is running
    pub downloading: bool,

    /// Whether to quit
    pub should_quit: bool,

    /// Frame counter for the spinner
    pub tick: usize,

    pub outcome_tx: Sender<Outcome>,
    pub outcome_rx: Receiver<Outcome>,

    pub download_tx: Sender<DownloadOutcome>,
    pub download_rx: Receiver<DownloadOutcome>,
}

impl App {
    pub fn new(config: Config, client: GeneratorClient) -> Self {
        let (outcome_tx, outcome_rx) = async_channel::bounded(1);
        let (download_tx, download_rx) = async_channel::bounded(1);
        Self {
            mode: AppMode::Prompt,
            auto_grow: AutoGrow::new(config.tui.prompt_max_height),
            theme: ThemeToggle::from_name(&config.tui.theme),
            config,
            controller: Controller::new(client),
            screen: Screen::default(),
            prompt: PromptInput::default(),
            picker_draft: String::new(),
            downloaded: None,
            downloading: false,
            should_quit: false,
            tick: 0,
            outcome_tx,
            outcome_rx,
            download_tx,
            download_rx,
        }
    }

    /// Generate is disabled while a request is in flight
    pub fn can_submit(&self) -> bool {
        !self.controller.phase().is_loading()
    }

    /// Any modal on top of the form
    pub fn has_overlay(&self) -> bool {
        self.screen.alert.is_some() || self.screen.loading || self.screen.result.is_some()
    }

    /// Set status message
    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.screen.status_message = Some(msg.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BaseImage;

    #[tokio::test]
    async fn test_screen_tracks_file_info() {
        let mut screen = Screen::default();
        screen.picker_value = "/tmp/a.png".to_string();

        screen.set_file_name("a.png");
        screen.set_file_info_visible(true);
        assert_eq!(screen.file_name, "a.png");

        let image = BaseImage::new("a.png", crate::core::upload::tests::png_bytes(2, 2), "image/png");
        let thumb = Thumbnail::decode(&image).await.unwrap();
        screen.set_preview(Some(&thumb));
        assert!(screen.preview.is_some());

        screen.reset_file_picker();
        screen.set_file_name("");
        screen.set_file_info_visible(false);
        screen.set_preview(None);
        assert!(screen.picker_value.is_empty());
        assert!(screen.file_name.is_empty());
        assert!(!screen.file_info_visible);
        assert!(screen.preview.is_none());
    }

    #[test]
    fn test_loading_clears_previous_result() {
        let mut screen = Screen::default();
        screen.show_result(&GenerationResult::new("/a.png", None));
        screen.show_loading();
        assert!(screen.loading);
        assert!(screen.result.is_none());

        screen.hide_loading();
        screen.alert("boom");
        assert!(!screen.loading);
        assert_eq!(screen.alert.as_deref(), Some("boom"));
    }

    #[test]
    fn test_app_starts_from_config() {
        let mut config = Config::default();
        config.tui.theme = "light".to_string();
        config.tui.prompt_max_height = 5;
        let client = GeneratorClient::from_config(&config).unwrap();

        let app = App::new(config, client);
        assert!(!app.theme.is_dark());
        assert_eq!(app.auto_grow.max_height(), 5);
        assert!(app.can_submit());
        assert!(!app.has_overlay());
        assert_eq!(app.mode, AppMode::Prompt);
    }
}
