//! HTTP transport for the streaming search endpoint.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::Client;
use url::Url;

use super::{ByteStream, SearchTransport, TransportError};
use crate::models::SearchFilters;

const STREAM_PATH: &str = "api/search/stream";

/// Transport backed by a shared reqwest client.
///
/// Only a connect timeout is set: the search stream stays open for the whole
/// backend pipeline, so a total request timeout would cut long sessions
/// short. End conditions are stream completion, an error, or cancellation.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport with default settings against the given base URL.
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        Self::with_settings(
            base_url,
            concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")),
            Duration::from_secs(10),
        )
    }

    /// Create a transport with a custom user agent and connect timeout.
    pub fn with_settings(
        base_url: &str,
        user_agent: &str,
        connect_timeout: Duration,
    ) -> Result<Self, TransportError> {
        // A trailing slash keeps Url::join from replacing the last path
        // segment of the base.
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }
        let endpoint = Url::parse(&base)
            .and_then(|base| base.join(STREAM_PATH))
            .map_err(|err| TransportError::InvalidEndpoint(format!("{base_url}: {err}")))?;

        let client = Client::builder()
            .user_agent(user_agent)
            .connect_timeout(connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(Self { client, endpoint })
    }

    /// The resolved stream endpoint.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn open(&self, filters: &SearchFilters) -> Result<ByteStream, TransportError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(ACCEPT, "text/event-stream")
            .json(filters)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TransportError::BadResponse(format!(
                "status {}",
                response.status()
            )));
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|err| TransportError::Read(err.to_string())));
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_with_and_without_trailing_slash() {
        let a = HttpTransport::new("http://localhost:8000").unwrap();
        let b = HttpTransport::new("http://localhost:8000/").unwrap();
        assert_eq!(a.endpoint().as_str(), "http://localhost:8000/api/search/stream");
        assert_eq!(a.endpoint(), b.endpoint());
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let err = HttpTransport::new("not a url").unwrap_err();
        assert!(matches!(err, TransportError::InvalidEndpoint(_)));
    }
}
