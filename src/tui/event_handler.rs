use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::BaseDirs;
use std::path::{Path, PathBuf};

use super::app::{App, AppMode};
use crate::core::{AttachmentKind, Generator};

/// Route a key press to the topmost modal, or to the form
pub async fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    if app.screen.alert.is_some() {
        handle_alert_input(app, key);
    } else if app.screen.loading {
        // Loading modal swallows input
    } else if app.screen.result.is_some() {
        handle_result_input(app, key);
    } else {
        match app.mode {
            AppMode::Prompt => handle_prompt_input(app, key),
            AppMode::PickFile => handle_picker_input(app, key).await?,
        }
    }
    Ok(())
}

/// Handle input in the prompt text area
pub fn handle_prompt_input(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

    match key.code {
        KeyCode::Char('o') if ctrl => {
            app.picker_draft = app.screen.picker_value.clone();
            app.mode = AppMode::PickFile;
        }

        KeyCode::Char('x') if ctrl => {
            app.controller
                .remove_base_image(AttachmentKind::Base.as_str(), &mut app.screen);
        }

        KeyCode::Char('t') if ctrl => {
            app.theme.toggle();
        }

        KeyCode::Char('n') if ctrl => {
            app.prompt.insert('\n');
        }

        KeyCode::Enter => start_generation(app),

        KeyCode::Esc => {
            app.should_quit = true;
        }

        KeyCode::Char(c) if !ctrl => app.prompt.insert(c),
        KeyCode::Backspace => app.prompt.backspace(),
        KeyCode::Delete => app.prompt.delete(),
        KeyCode::Left => app.prompt.left(),
        KeyCode::Right => app.prompt.right(),
        KeyCode::Home => app.prompt.home(),
        KeyCode::End => app.prompt.end(),

        _ => {}
    }
}

/// Handle input while typing a path into the file picker
pub async fn handle_picker_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            app.picker_draft.clear();
            app.mode = AppMode::Prompt;
        }

        KeyCode::Enter => {
            let draft = std::mem::take(&mut app.picker_draft);
            app.mode = AppMode::Prompt;

            let files: Vec<PathBuf> = match draft.trim() {
                "" => Vec::new(),
                path => vec![expand_home(path)],
            };

            if app
                .controller
                .select_base_image(&files, &mut app.screen)
                .await
                .is_ok()
                && !files.is_empty()
            {
                app.screen.picker_value = draft.trim().to_string();
            }
        }

        KeyCode::Char(c) => app.picker_draft.push(c),

        KeyCode::Backspace => {
            app.picker_draft.pop();
        }

        _ => {}
    }
    Ok(())
}

/// Handle input on the result modal
pub fn handle_result_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('d') => start_download(app),

        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
            app.screen.result = None;
        }

        _ => {}
    }
}

/// Dismiss the alert modal
pub fn handle_alert_input(app: &mut App, key: KeyEvent) {
    if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
        app.screen.alert = None;
    }
}

/// Validate, show loading and run the request on a background task.
fn start_generation(app: &mut App) {
    if !app.can_submit() {
        return;
    }

    let prompt = app.prompt.text().to_string();
    let Ok(request) = app.controller.begin_submission(&prompt, &mut app.screen) else {
        return;
    };

    app.downloaded = None;
    app.set_status(format!("Generating ({})...", request.mode()));

    let generator = app.controller.generator();
    let tx = app.outcome_tx.clone();
    tokio::spawn(async move {
        let outcome = generator.generate(&request).await;
        if tx.send(outcome).await.is_err() {
            tracing::debug!("Generation finished after the UI closed");
        }
    });
}

/// Apply finished background work: a generation outcome, then a download.
pub fn poll_outcome(app: &mut App) {
    if let Ok(outcome) = app.outcome_rx.try_recv() {
        match app.controller.finish_submission(outcome, &mut app.screen) {
            Ok(_) => {
                app.set_status("Image generated");
                if app.config.output.auto_download {
                    start_download(app);
                }
            }
            Err(_) => app.set_status("Generation failed"),
        }
    }

    if let Ok(outcome) = app.download_rx.try_recv() {
        app.downloading = false;
        match outcome {
            Ok(path) => {
                app.set_status(format!("Saved to {}", path.display()));
                app.downloaded = Some(path);
            }
            Err(e) => {
                tracing::debug!("Download failed: {}", e);
                app.set_status("Download failed");
                app.screen.alert = Some(format!("Download failed: {}", e));
            }
        }
    }
}

/// Save the current result on a background task.
fn start_download(app: &mut App) {
    if app.downloading {
        return;
    }
    let Some(url) = app.screen.result.as_ref().map(|r| r.download_url.clone()) else {
        return;
    };

    app.downloading = true;
    app.set_status("Downloading...");

    let output_dir = PathBuf::from(&app.config.output.directory);
    let generator = app.controller.generator();
    let tx = app.download_tx.clone();
    tokio::spawn(async move {
        let outcome = generator.download(&url, &output_dir).await;
        if tx.send(outcome).await.is_err() {
            tracing::debug!("Download finished after the UI closed");
        }
    });
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(dirs) = BaseDirs::new() {
            return dirs.home_dir().join(rest);
        }
    }
    Path::new(path).to_path_buf()
}
