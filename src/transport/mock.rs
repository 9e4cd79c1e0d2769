//! Mock transport for testing purposes.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream;
use tokio::sync::mpsc;

use super::{ByteStream, SearchTransport, TransportError};
use crate::models::SearchFilters;

/// Scripted response for one `open` call.
enum Scripted {
    Chunks(Vec<Result<Bytes, TransportError>>),
    BadResponse(String),
    Channel(mpsc::UnboundedReceiver<Result<Bytes, TransportError>>),
}

/// A mock transport that replays scripted responses in call order.
///
/// An `open` with nothing scripted yields an empty body, i.e. a stream that
/// ends immediately.
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<VecDeque<Scripted>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response made of the given body chunks.
    pub fn push_chunks<I, B>(&self, chunks: I)
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let chunks = chunks.into_iter().map(|chunk| Ok(chunk.into())).collect();
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Chunks(chunks));
    }

    /// Queue a response that yields `chunks` and then fails mid-stream.
    pub fn push_chunks_then_fail<I, B>(&self, chunks: I, detail: &str)
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        let mut chunks: Vec<_> = chunks.into_iter().map(|chunk| Ok(chunk.into())).collect();
        chunks.push(Err(TransportError::Read(detail.to_string())));
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Chunks(chunks));
    }

    /// Queue a failed open (non-success response or missing body).
    pub fn push_bad_response(&self, detail: &str) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::BadResponse(detail.to_string()));
    }

    /// Queue a response whose chunks are fed live through the returned
    /// handle. The stream stays open until the handle is dropped, which lets
    /// tests hold a session mid-stream.
    pub fn push_channel(&self) -> StreamHandle {
        let (tx, rx) = mpsc::unbounded_channel();
        self.responses
            .lock()
            .unwrap()
            .push_back(Scripted::Channel(rx));
        StreamHandle { tx }
    }
}

/// Feeds chunks into a channel-backed mock stream.
pub struct StreamHandle {
    tx: mpsc::UnboundedSender<Result<Bytes, TransportError>>,
}

impl StreamHandle {
    /// Send one body chunk. Returns `false` when the reading session is gone.
    pub fn send(&self, chunk: impl Into<Bytes>) -> bool {
        self.tx.send(Ok(chunk.into())).is_ok()
    }

    /// Fail the stream with a read error.
    pub fn fail(&self, detail: &str) -> bool {
        self.tx.send(Err(TransportError::Read(detail.to_string()))).is_ok()
    }
}

#[async_trait]
impl SearchTransport for MockTransport {
    async fn open(&self, _filters: &SearchFilters) -> Result<ByteStream, TransportError> {
        let scripted = self.responses.lock().unwrap().pop_front();
        match scripted {
            None => Ok(Box::pin(stream::empty())),
            Some(Scripted::Chunks(chunks)) => Ok(Box::pin(stream::iter(chunks))),
            Some(Scripted::BadResponse(detail)) => Err(TransportError::BadResponse(detail)),
            Some(Scripted::Channel(mut rx)) => Ok(Box::pin(async_stream::stream! {
                while let Some(item) = rx.recv().await {
                    yield item;
                }
            })),
        }
    }
}
