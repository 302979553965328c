//! # HTTP Transport
//!
//! Blocking HTTP implementation of the core `Transport` trait.
//!
//! The client does not decode `Content-Encoding`: the remote files are gzip
//! archives and the core fetcher decompresses them itself.

use genrenet_core::{DatasetHandle, GenreNetError, Transport};
use std::time::Duration;

/// Default timeout of a single resource download.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

/// Downloads dataset resources over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, GenreNetError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("genrenet/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GenreNetError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self { http })
    }
}

impl Transport for HttpTransport {
    fn get(&self, handle: &DatasetHandle) -> Result<Vec<u8>, GenreNetError> {
        tracing::info!(resource = handle.name(), url = handle.locator(), "Downloading");

        let transport_error = |status: String| GenreNetError::Transport {
            resource: handle.name().to_string(),
            status,
        };

        let response = self
            .http
            .get(handle.locator())
            .send()
            .map_err(|e| transport_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(transport_error(format!("HTTP {}", status)));
        }

        let body = response
            .bytes()
            .map_err(|e| transport_error(format!("reading body: {}", e)))?;

        tracing::debug!(resource = handle.name(), bytes = body.len(), "Downloaded");
        Ok(body.to_vec())
    }
}
