//! Transport seam between the session controller and the search backend.
//!
//! The controller only sees a stream of byte chunks; where those bytes come
//! from is behind the [`SearchTransport`] trait. [`HttpTransport`] talks to
//! the real backend, [`MockTransport`] replays scripted responses in tests.

mod http;
mod mock;

pub use http::HttpTransport;
pub use mock::{MockTransport, StreamHandle};

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::Stream;
use std::pin::Pin;
use thiserror::Error;

use crate::models::SearchFilters;

/// Byte chunks of one streaming search response.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, TransportError>> + Send>>;

/// Errors surfaced by a transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The backend answered with a non-success status or an unusable body.
    #[error("bad response from search backend: {0}")]
    BadResponse(String),

    /// The configured endpoint could not be constructed.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// Request-level network or HTTP failure.
    #[error("network error: {0}")]
    Network(String),

    /// Mid-stream read failure.
    #[error("stream read error: {0}")]
    Read(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Network(err.to_string())
    }
}

/// A source of streaming search responses.
///
/// `open` issues one request with the filters as an opaque body and resolves
/// once the response body stream is available. Cancellation is cooperative:
/// dropping the returned stream (or the future) tears the request down.
#[async_trait]
pub trait SearchTransport: Send + Sync {
    async fn open(&self, filters: &SearchFilters) -> Result<ByteStream, TransportError>;
}
