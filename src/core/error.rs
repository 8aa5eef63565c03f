use thiserror::Error;

/// Fallback shown when the server rejects a request without saying why.
pub const GENERIC_FAILURE: &str = "Failed to generate image";

#[derive(Error, Debug)]
pub enum GeradorError {
    #[error("Please enter a text prompt.")]
    EmptyPrompt,

    #[error("A generation is already in progress")]
    Busy,

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{message}")]
    Transport {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Invalid server response: {0}")]
    InvalidResponse(String),

    #[error("Could not read image '{name}': {reason}")]
    UnreadableImage { name: String, reason: String },

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl GeradorError {
    /// Build a server error from the optional `error` field of a failure body.
    pub fn server(status: u16, message: Option<String>) -> Self {
        GeradorError::Server {
            status,
            message: message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
        }
    }

    /// Text shown to the user in an alert.
    pub fn alert_message(&self) -> String {
        match self {
            GeradorError::EmptyPrompt | GeradorError::Busy => self.to_string(),
            GeradorError::UnreadableImage { .. } => self.to_string(),
            _ => format!("An error occurred while processing your request: {}", self),
        }
    }
}

impl From<reqwest::Error> for GeradorError {
    fn from(err: reqwest::Error) -> Self {
        GeradorError::Transport {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_uses_body_message() {
        let err = GeradorError::server(400, Some("bad prompt".to_string()));
        assert_eq!(err.to_string(), "bad prompt");
        assert!(err.alert_message().contains("bad prompt"));
    }

    #[test]
    fn test_server_error_falls_back_to_generic() {
        assert_eq!(GeradorError::server(500, None).to_string(), GENERIC_FAILURE);
        assert_eq!(
            GeradorError::server(500, Some("  ".to_string())).to_string(),
            GENERIC_FAILURE
        );
    }

    #[test]
    fn test_validation_alert_is_not_prefixed() {
        assert_eq!(
            GeradorError::EmptyPrompt.alert_message(),
            "Please enter a text prompt."
        );
    }
}
