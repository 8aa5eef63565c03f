use once_cell::sync::OnceCell;
use reqwest::Client;
use std::time::Duration;

use crate::core::GeradorError;

static HTTP_CLIENT: OnceCell<Client> = OnceCell::new();

/// Shared HTTP client with connection pooling.
///
/// Only connecting is bounded; a generation may take as long as the server needs.
/// The timeout of the first call wins.
pub fn shared(connect_timeout: Duration) -> Result<&'static Client, GeradorError> {
    HTTP_CLIENT.get_or_try_init(|| {
        Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(5)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .build()
            .map_err(GeradorError::from)
    })
}
