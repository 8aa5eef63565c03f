use async_trait::async_trait;

use super::error::GeradorError;
use super::request::GenerationRequest;

/// What a successful call to the generation endpoint returns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Path or URL of the generated image, as sent by the server
    pub url: String,
    pub message: Option<String>,
}

/// Backend that turns a request into a generated image.
#[async_trait]
pub trait Generator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, GeradorError>;
}
