mod types;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{Client, StatusCode, Url};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio::io::AsyncWriteExt;

pub use types::*;

use crate::config::Config;
use crate::core::{GeneratedImage, GenerationRequest, Generator, GeradorError};
use crate::http_client;

/// File name used when the result URL has no usable last segment
const FALLBACK_FILE_NAME: &str = "imagem_gerada.png";

/// Client for the `gerar-imagem` endpoint
pub struct GeneratorClient {
    base_url: Url,
    endpoint_url: String,
    http: &'static Client,
}

impl GeneratorClient {
    /// Create a new client from config
    pub fn from_config(config: &Config) -> Result<Self, GeradorError> {
        let base_url = Url::parse(config.base_url()).map_err(|e| {
            GeradorError::ConfigError(format!("invalid server address '{}': {}", config.base_url(), e))
        })?;
        let http = http_client::shared(Duration::from_secs(config.server.connect_timeout_secs))?;

        Ok(Self {
            base_url,
            endpoint_url: config.endpoint_url(),
            http,
        })
    }

    /// Absolute form of a result URL, which the server usually sends as a path
    pub fn resolve(&self, url: &str) -> Result<Url, GeradorError> {
        self.base_url
            .join(url)
            .map_err(|e| GeradorError::InvalidResponse(format!("bad image URL '{}': {}", url, e)))
    }

    /// Stream the image at `url` into `output_dir` and return where it was saved.
    pub async fn download(&self, url: &str, output_dir: &Path) -> Result<PathBuf, GeradorError> {
        let url = self.resolve(url)?;
        fs::create_dir_all(output_dir).await?;
        let path = output_dir.join(file_name_for(&url));

        tracing::debug!("Downloading {} to {}", url, path.display());

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeradorError::server(
                status.as_u16(),
                Some(format!("download of {} failed with status {}", url, status)),
            ));
        }

        let mut file = fs::File::create(&path).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;

        tracing::info!("Saved image to: {}", path.display());
        Ok(path)
    }
}

#[async_trait]
impl Generator for GeneratorClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, GeradorError> {
        tracing::debug!(
            "Sending {} request to: {} (prompt: {} chars)",
            request.mode(),
            self.endpoint_url,
            request.prompt.chars().count()
        );

        let response = self
            .http
            .post(&self.endpoint_url)
            .multipart(request.to_form()?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        tracing::debug!("Response status: {}", status);
        tracing::debug!("Response body: {}", body);

        interpret_response(status, &body)
    }
}

/// Map status and body of a generation response to a result.
pub fn interpret_response(status: StatusCode, body: &str) -> Result<GeneratedImage, GeradorError> {
    let parsed = serde_json::from_str::<GenerateResponse>(body);

    if !status.is_success() {
        let message = parsed.ok().and_then(|r| r.error);
        return Err(GeradorError::server(status.as_u16(), message));
    }

    let response = parsed
        .map_err(|e| GeradorError::InvalidResponse(format!("expected JSON body: {}", e)))?;

    match response.url {
        Some(url) if !url.trim().is_empty() => Ok(GeneratedImage {
            url,
            message: response.message,
        }),
        _ => Err(GeradorError::InvalidResponse(
            "response has no image url".to_string(),
        )),
    }
}

/// Last path segment of `url`, ignoring any query
fn file_name_for(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

/// Single-request HTTP server on a loopback port
#[cfg(test)]
pub(crate) mod stub {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::oneshot;

    pub(crate) struct StubServer {
        pub base_url: String,
        /// Raw text of the request the server answered
        pub request: oneshot::Receiver<String>,
    }

    /// Answer the next request with `status` and `body`, then stop listening.
    pub(crate) async fn serve_once(status: u16, body: impl Into<String>) -> StubServer {
        let body = body.into();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(request);
        });

        StubServer { base_url, request: rx }
    }

    /// Address nothing listens on
    pub(crate) async fn refused_url() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    async fn read_request(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let head = String::from_utf8_lossy(&buf[..head_end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + body_len {
                break;
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::upload::tests::png_bytes;
    use crate::core::BaseImage;

    fn client(base: &str) -> GeneratorClient {
        let mut config = Config::default();
        config.server.base_url = base.to_string();
        GeneratorClient::from_config(&config).unwrap()
    }

    #[test]
    fn test_success_body() {
        let body = r#"{"message": "Imagem gerada com sucesso", "url": "/static/imagens/imagem_gerada.png"}"#;
        let image = interpret_response(StatusCode::OK, body).unwrap();
        assert_eq!(image.url, "/static/imagens/imagem_gerada.png");
        assert_eq!(image.message.as_deref(), Some("Imagem gerada com sucesso"));
    }

    #[test]
    fn test_error_body_message_is_used() {
        let err = interpret_response(StatusCode::BAD_REQUEST, r#"{"error": "bad prompt"}"#).unwrap_err();
        match err {
            GeradorError::Server { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "bad prompt");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_error_without_json_falls_back() {
        let err = interpret_response(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>").unwrap_err();
        assert_eq!(err.to_string(), crate::core::error::GENERIC_FAILURE);

        let err = interpret_response(StatusCode::BAD_GATEWAY, r#"{"detail": "x"}"#).unwrap_err();
        assert_eq!(err.to_string(), crate::core::error::GENERIC_FAILURE);
    }

    #[test]
    fn test_success_without_url_is_invalid() {
        let err = interpret_response(StatusCode::OK, r#"{"message": "ok"}"#).unwrap_err();
        assert!(matches!(err, GeradorError::InvalidResponse(_)));

        let err = interpret_response(StatusCode::OK, "not json").unwrap_err();
        assert!(matches!(err, GeradorError::InvalidResponse(_)));
    }

    #[test]
    fn test_resolve_relative_url() {
        let client = client("http://127.0.0.1:5000");
        let url = client.resolve("/static/imagens/out.png?t=1").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/static/imagens/out.png?t=1");

        let absolute = client.resolve("https://cdn.example.com/a.png").unwrap();
        assert_eq!(absolute.host_str(), Some("cdn.example.com"));
    }

    #[test]
    fn test_file_name_ignores_query() {
        let url = Url::parse("http://h/static/imagens/out.png?t=99").unwrap();
        assert_eq!(file_name_for(&url), "out.png");

        let url = Url::parse("http://h/").unwrap();
        assert_eq!(file_name_for(&url), FALLBACK_FILE_NAME);
    }

    #[test]
    fn test_bad_base_url_is_config_error() {
        let mut config = Config::default();
        config.server.base_url = "not a url".to_string();
        assert!(matches!(
            GeneratorClient::from_config(&config),
            Err(GeradorError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_posts_multipart_fields() {
        let server = stub::serve_once(
            200,
            r#"{"message": "Imagem gerada com sucesso", "url": "/static/imagens/out.png"}"#,
        )
        .await;
        let client = client(&server.base_url);

        let base = BaseImage::new("b.png", png_bytes(1, 1), "image/png");
        let request = GenerationRequest::new("  a cat ", Some(base)).unwrap();
        let image = client.generate(&request).await.unwrap();
        assert_eq!(image.url, "/static/imagens/out.png");
        assert_eq!(image.message.as_deref(), Some("Imagem gerada com sucesso"));

        let raw = server.request.await.unwrap();
        let lower = raw.to_lowercase();
        assert!(raw.starts_with("POST /gerar-imagem HTTP/1.1\r\n"));
        assert!(lower.contains("content-type: multipart/form-data; boundary="));
        assert!(lower.contains("content-disposition: form-data; name=\"prompt\"\r\n\r\na cat\r\n"));
        assert!(lower.contains("content-disposition: form-data; name=\"imagem_base\"; filename=\"b.png\""));
        assert!(lower.contains("content-type: image/png"));
    }

    #[tokio::test]
    async fn test_generate_without_base_image_sends_prompt_only() {
        let server = stub::serve_once(200, r#"{"url": "/static/imagens/out.png"}"#).await;
        let client = client(&server.base_url);

        let request = GenerationRequest::new("a cat", None).unwrap();
        client.generate(&request).await.unwrap();

        let raw = server.request.await.unwrap().to_lowercase();
        assert!(raw.contains("name=\"prompt\""));
        assert!(!raw.contains("imagem_base"));
    }

    #[tokio::test]
    async fn test_generate_bad_request_carries_server_error() {
        let server = stub::serve_once(400, r#"{"error": "bad prompt"}"#).await;
        let client = client(&server.base_url);

        let request = GenerationRequest::new("a cat", None).unwrap();
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, GeradorError::Server { status: 400, .. }));
        assert_eq!(
            err.alert_message(),
            "An error occurred while processing your request: bad prompt"
        );
    }

    #[tokio::test]
    async fn test_generate_connection_refused_is_transport_error() {
        let client = client(&stub::refused_url().await);

        let request = GenerationRequest::new("a cat", None).unwrap();
        let err = client.generate(&request).await.unwrap_err();
        assert!(matches!(err, GeradorError::Transport { .. }));
        assert!(err
            .alert_message()
            .starts_with("An error occurred while processing your request: "));
    }

    #[tokio::test]
    async fn test_download_streams_body_to_file() {
        let server = stub::serve_once(200, "fake image bytes").await;
        let client = client(&server.base_url);
        let dir = std::env::temp_dir().join(format!("gerador-download-{}", std::process::id()));

        let path = client.download("/static/imagens/out.png?t=5", &dir).await.unwrap();
        assert_eq!(path, dir.join("out.png"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "fake image bytes");

        let raw = server.request.await.unwrap();
        assert!(raw.starts_with("GET /static/imagens/out.png?t=5 HTTP/1.1\r\n"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
