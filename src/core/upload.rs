use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use image::{imageops::FilterType, ImageFormat, RgbImage};
use std::path::Path;
use tokio::fs;

use super::error::GeradorError;

/// Largest thumbnail edge, in pixels. Two pixel rows fit in one terminal cell.
const THUMBNAIL_MAX_WIDTH: u32 = 32;
const THUMBNAIL_MAX_HEIGHT: u32 = 24;

/// Which attached file a remove action targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Base,
}

impl AttachmentKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "base" => Some(AttachmentKind::Base),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::Base => "base",
        }
    }
}

/// The single optional reference image sent along with a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseImage {
    /// File name as shown to the user and sent in the multipart part
    pub name: String,
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl BaseImage {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Read a file from disk. Only the bytes are read here, decoding happens later.
    pub async fn load(path: &Path) -> Result<Self, GeradorError> {
        let bytes = fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let mime_type = mime_type_for(path, &bytes);
        Ok(Self::new(name, bytes, mime_type))
    }

    /// `data:` URL of the file contents
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, BASE64.encode(&self.bytes))
    }
}

/// Sniff the MIME type from the content, falling back to the extension.
fn mime_type_for(path: &Path, bytes: &[u8]) -> String {
    let format = image::guess_format(bytes)
        .ok()
        .or_else(|| ImageFormat::from_path(path).ok());

    let mime = match format {
        Some(ImageFormat::Png) => "image/png",
        Some(ImageFormat::Jpeg) => "image/jpeg",
        Some(ImageFormat::WebP) => "image/webp",
        Some(ImageFormat::Gif) => "image/gif",
        Some(ImageFormat::Bmp) => "image/bmp",
        Some(ImageFormat::Tiff) => "image/tiff",
        _ => "application/octet-stream",
    };
    mime.to_string()
}

/// Displayable form of a decoded base image
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data_url: String,
    /// Source dimensions
    pub width: u32,
    pub height: u32,
    /// Downscaled pixels for terminal rendering
    pub pixels: RgbImage,
}

impl Thumbnail {
    /// Decode the image off the async runtime.
    pub async fn decode(image: &BaseImage) -> Result<Self, GeradorError> {
        let name = image.name.clone();
        let bytes = image.bytes.clone();
        let data_url = image.data_url();

        let decoded = tokio::task::spawn_blocking(move || {
            let img = image::load_from_memory(&bytes)?;
            let pixels = img
                .resize(THUMBNAIL_MAX_WIDTH, THUMBNAIL_MAX_HEIGHT, FilterType::Triangle)
                .to_rgb8();
            Ok::<_, image::ImageError>((img.width(), img.height(), pixels))
        })
        .await
        .map_err(|e| GeradorError::UnreadableImage {
            name: name.clone(),
            reason: e.to_string(),
        })?;

        let (width, height, pixels) = decoded.map_err(|e| GeradorError::UnreadableImage {
            name,
            reason: e.to_string(),
        })?;

        Ok(Self {
            data_url,
            width,
            height,
            pixels,
        })
    }
}

/// Client-side upload state: at most one base image
#[derive(Debug, Default)]
pub struct UploadState {
    base_image: Option<BaseImage>,
}

impl UploadState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_image(&self) -> Option<&BaseImage> {
        self.base_image.as_ref()
    }

    /// Store a base image, replacing any previous one.
    pub fn set_base_image(&mut self, image: BaseImage) {
        self.base_image = Some(image);
    }

    /// Returns the removed image, if there was one.
    pub fn clear(&mut self, kind: AttachmentKind) -> Option<BaseImage> {
        match kind {
            AttachmentKind::Base => self.base_image.take(),
        }
    }

    pub fn has_base_image(&self) -> bool {
        self.base_image.is_some()
    }
}
