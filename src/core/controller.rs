use std::path::PathBuf;
use std::sync::Arc;

use super::error::GeradorError;
use super::generator::{GeneratedImage, Generator};
use super::request::{GenerationRequest, GenerationResult};
use super::upload::{AttachmentKind, BaseImage, Thumbnail, UploadState};
use super::view::View;

/// Per-submission state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Resulted,
    Failed,
}

impl Phase {
    pub fn is_loading(&self) -> bool {
        matches!(self, Phase::Loading)
    }
}

/// Mediates between the base-image picker, the prompt and the generation backend.
///
/// All handlers take the [`View`] they should update; the controller itself
/// holds only the upload state and the submission phase.
pub struct Controller<G> {
    upload: UploadState,
    phase: Phase,
    generator: Arc<G>,
}

impl<G: Generator> Controller<G> {
    pub fn new(generator: G) -> Self {
        Self::with_shared(Arc::new(generator))
    }

    pub fn with_shared(generator: Arc<G>) -> Self {
        Self {
            upload: UploadState::new(),
            phase: Phase::Idle,
            generator,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn upload(&self) -> &UploadState {
        &self.upload
    }

    /// Handle to the backend, for running a request off the UI task
    pub fn generator(&self) -> Arc<G> {
        Arc::clone(&self.generator)
    }

    /// Attach the first of `files` as the base image and preview it.
    ///
    /// An empty list is a no-op. A file that can be read but not decoded is
    /// detached again before the error is reported.
    pub async fn select_base_image<V: View>(
        &mut self,
        files: &[PathBuf],
        view: &mut V,
    ) -> Result<(), GeradorError> {
        let Some(path) = files.first() else {
            return Ok(());
        };

        let image = match BaseImage::load(path).await {
            Ok(image) => image,
            Err(e) => {
                tracing::debug!("Failed to read {}: {}", path.display(), e);
                let err = GeradorError::UnreadableImage {
                    name: path.display().to_string(),
                    reason: e.to_string(),
                };
                view.alert(&err.alert_message());
                return Err(err);
            }
        };

        tracing::debug!("Selected base image {} ({} bytes)", image.name, image.bytes.len());
        view.set_file_name(&image.name);
        view.set_file_info_visible(true);
        self.upload.set_base_image(image);

        let decoded = match self.upload.base_image() {
            Some(image) => Thumbnail::decode(image).await,
            None => return Ok(()),
        };

        match decoded {
            Ok(thumbnail) => {
                view.set_preview(Some(&thumbnail));
                Ok(())
            }
            Err(e) => {
                tracing::debug!("Base image rejected: {}", e);
                self.remove_base_image(AttachmentKind::Base.as_str(), view);
                view.alert(&e.alert_message());
                Err(e)
            }
        }
    }

    /// Detach the file identified by `kind`. Unknown tags are ignored.
    pub fn remove_base_image<V: View>(&mut self, kind: &str, view: &mut V) {
        let Some(kind) = AttachmentKind::from_tag(kind) else {
            tracing::debug!("Ignoring remove for unknown attachment '{}'", kind);
            return;
        };

        if let Some(image) = self.upload.clear(kind) {
            tracing::debug!("Removed {} image {}", kind.as_str(), image.name);
        }

        view.reset_file_picker();
        view.set_file_name("");
        view.set_file_info_visible(false);
        view.set_preview(None);
    }

    /// Validate the prompt, build the request and show the loading view.
    ///
    /// Rejected while a previous submission is still loading.
    pub fn begin_submission<V: View>(
        &mut self,
        prompt: &str,
        view: &mut V,
    ) -> Result<GenerationRequest, GeradorError> {
        if self.phase.is_loading() {
            tracing::debug!("Submission ignored, generation already in progress");
            return Err(GeradorError::Busy);
        }

        let request = match GenerationRequest::new(prompt, self.upload.base_image().cloned()) {
            Ok(request) => request,
            Err(e) => {
                view.alert(&e.alert_message());
                return Err(e);
            }
        };

        tracing::info!("Submitting {} request", request.mode());
        self.phase = Phase::Loading;
        view.show_loading();
        Ok(request)
    }

    /// Apply the outcome of a request started with [`Self::begin_submission`].
    pub fn finish_submission<V: View>(
        &mut self,
        outcome: Result<GeneratedImage, GeradorError>,
        view: &mut V,
    ) -> Result<GenerationResult, GeradorError> {
        match outcome {
            Ok(image) => {
                let result = GenerationResult::new(&image.url, image.message);
                view.hide_loading();
                view.show_result(&result);
                self.phase = Phase::Resulted;
                Ok(result)
            }
            Err(e) => {
                tracing::debug!("Generation failed: {}", e);
                view.hide_loading();
                view.alert(&e.alert_message());
                self.phase = Phase::Failed;
                Err(e)
            }
        }
    }

    /// Run one full submission: validate, request, then show the result or the error.
    pub async fn submit_generation<V: View>(
        &mut self,
        prompt: &str,
        view: &mut V,
    ) -> Result<GenerationResult, GeradorError> {
        let request = self.begin_submission(prompt, view)?;
        let outcome = self.generator.generate(&request).await;
        self.finish_submission(outcome, view)
    }
}
