use serde::Deserialize;

/// Body returned by the generation endpoint.
///
/// Success carries `url` (and usually `message`), failure carries `error`.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}
