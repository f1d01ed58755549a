//! Tile transport.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::endpoints::redact_token;

/// Transport-level failures of a single tile fetch.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("empty response body from {url}")]
    EmptyBody { url: String },

    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),
}

/// Fetches the raw bytes of one tile.
#[async_trait]
pub trait TileFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Configuration for [`HttpTileFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetchConfig {
    /// HTTP request timeout
    pub request_timeout: Duration,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Idle connections kept per host
    pub pool_max_idle_per_host: usize,
    pub user_agent: String,
}

impl Default for HttpFetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_max_idle_per_host: 8,
            user_agent: format!("terrain-gis-ingest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpFetchConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("GIS_HTTP_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.request_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(val) = std::env::var("GIS_HTTP_CONNECT_TIMEOUT_SECS") {
            if let Ok(secs) = val.parse() {
                config.connect_timeout = Duration::from_secs(secs);
            }
        }

        config
    }
}

/// [`TileFetcher`] over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpTileFetcher {
    client: Client,
}

impl HttpTileFetcher {
    pub fn new(config: &HttpFetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(config.user_agent.clone())
            .tcp_nodelay(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl TileFetcher for HttpTileFetcher {
    #[instrument(skip(self, url), fields(url = %redact_token(url)))]
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Request(e.without_url().to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: redact_token(url),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Request(e.without_url().to_string()))?;

        if body.is_empty() {
            return Err(FetchError::EmptyBody {
                url: redact_token(url),
            });
        }

        debug!(bytes = body.len(), "Fetched tile");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpFetchConfig::default();
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("terrain-gis-ingest/"));
    }

    #[test]
    fn test_client_builds() {
        assert!(HttpTileFetcher::new(&HttpFetchConfig::default()).is_ok());
    }

    #[test]
    fn test_error_messages() {
        let err = FetchError::Status {
            status: 404,
            url: "https://tiles.test/1/0/0.png".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404 from https://tiles.test/1/0/0.png");

        let err = FetchError::EmptyBody {
            url: "https://tiles.test/1/0/0.png".to_string(),
        };
        assert!(err.to_string().starts_with("empty response body"));
    }
}
