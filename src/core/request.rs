use chrono::Utc;
use serde::Serialize;

use super::error::GeradorError;
use super::upload::BaseImage;

/// Form field carrying the prompt text
pub const PROMPT_FIELD: &str = "prompt";
/// Form field carrying the optional base image
pub const BASE_IMAGE_FIELD: &str = "imagem_base";

/// A single generation request: trimmed prompt plus optional base image
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub prompt: String,
    pub base_image: Option<BaseImage>,
}

impl GenerationRequest {
    /// Validate and trim the prompt. Whitespace-only prompts are rejected.
    pub fn new(prompt: &str, base_image: Option<BaseImage>) -> Result<Self, GeradorError> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(GeradorError::EmptyPrompt);
        }
        Ok(Self {
            prompt: prompt.to_string(),
            base_image,
        })
    }

    /// Generation mode the server will pick for this request
    pub fn mode(&self) -> &'static str {
        if self.base_image.is_some() {
            "img2img"
        } else {
            "text2img"
        }
    }

    /// Multipart body for the generation endpoint
    pub fn to_form(&self) -> Result<reqwest::multipart::Form, GeradorError> {
        let mut form = reqwest::multipart::Form::new().text(PROMPT_FIELD, self.prompt.clone());

        if let Some(image) = &self.base_image {
            let part = reqwest::multipart::Part::bytes(image.bytes.clone())
                .file_name(image.name.clone())
                .mime_str(&image.mime_type)?;
            form = form.part(BASE_IMAGE_FIELD, part);
        }

        Ok(form)
    }
}

/// What the result view shows after a successful generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    /// Source of the result image, cache-busted
    pub image_url: String,
    /// Target of the download link, same as `image_url`
    pub download_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GenerationResult {
    pub fn new(url: &str, message: Option<String>) -> Self {
        let busted = cache_busted(url, Utc::now().timestamp_millis());
        Self {
            image_url: busted.clone(),
            download_url: busted,
            message,
        }
    }
}

/// Append a `t=<timestamp>` query parameter so the image is never served from cache.
pub fn cache_busted(url: &str, timestamp: i64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, sep, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_trimmed() {
        let req = GenerationRequest::new("  a red fox \n", None).unwrap();
        assert_eq!(req.prompt, "a red fox");
        assert_eq!(req.mode(), "text2img");
    }

    #[test]
    fn test_blank_prompt_rejected() {
        assert!(matches!(
            GenerationRequest::new("", None),
            Err(GeradorError::EmptyPrompt)
        ));
        assert!(matches!(
            GenerationRequest::new(" \t\n ", None),
            Err(GeradorError::EmptyPrompt)
        ));
    }

    #[test]
    fn test_mode_with_base_image() {
        let image = BaseImage::new("base.png", vec![0], "image/png");
        let req = GenerationRequest::new("cat", Some(image)).unwrap();
        assert_eq!(req.mode(), "img2img");
        assert!(req.to_form().is_ok());
    }

    #[test]
    fn test_cache_bust() {
        assert_eq!(cache_busted("/images/out.png", 42), "/images/out.png?t=42");
        assert_eq!(cache_busted("/img.png?v=2", 7), "/img.png?v=2&t=7");
    }

    #[test]
    fn test_result_urls_match() {
        let result = GenerationResult::new("/images/out.png", None);
        assert!(result.image_url.starts_with("/images/out.png?t="));
        assert_eq!(result.image_url, result.download_url);
        let ts = result.image_url.trim_start_matches("/images/out.png?t=");
        assert!(ts.parse::<i64>().is_ok());
    }
}
