//! Where chunked response bodies come from.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::{Client, StatusCode};
use tracing::debug;

use crate::client::error::StreamError;

/// Body chunks in arrival order.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Bytes, StreamError>> + Send>>;

/// Issues a generation request and hands back its body as a chunk stream.
///
/// `HttpChunkSource` is the production implementation; tests script chunks
/// directly.
#[async_trait]
pub trait ChunkSource: Send + Sync {
    async fn open(&self, endpoint: &str, body: &serde_json::Value) -> Result<ChunkStream, StreamError>;
}

/// POSTs JSON to the generation API and streams the response body.
#[derive(Clone)]
pub struct HttpChunkSource {
    client: Client,
    base_url: String,
}

impl HttpChunkSource {
    /// No request timeout is set here; the aggregator bounds the whole read.
    pub fn new(base_url: &str) -> Result<Self, StreamError> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChunkSource for HttpChunkSource {
    async fn open(&self, endpoint: &str, body: &serde_json::Value) -> Result<ChunkStream, StreamError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.post(&url).json(body).send().await?;

        let status = response.status();
        if !status.is_success() {
            debug!("POST {url} returned {status}");
            return Err(StreamError::Http {
                status: status.as_u16(),
            });
        }
        if status == StatusCode::NO_CONTENT || response.content_length() == Some(0) {
            return Err(StreamError::EmptyBody);
        }

        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(StreamError::from)),
        ))
    }
}
