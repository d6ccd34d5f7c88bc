//! Streaming session client.
//!
//! Consumes the chunked generation endpoints, keeps the per-session message
//! history and question list, and drives the interview and test lifecycles.
//! All state lives in an explicit `SessionContext` owned by the caller.

use std::time::Duration;

pub mod aggregator;
pub mod cover_letter;
pub mod error;
pub mod interview;
pub mod session;
pub mod source;

pub use aggregator::{Aggregated, Slot, StreamAggregator};
pub use error::{SessionError, StreamError};
pub use session::SessionContext;
pub use source::{ChunkSource, ChunkStream, HttpChunkSource};

use crate::models::requests::DEFAULT_MAX_INTERVIEW_MESSAGES;

pub const NEW_COVER_LETTER_ENDPOINT: &str = "/api/newCoverLetter";
pub const REFINE_COVER_LETTER_ENDPOINT: &str = "/api/refineCoverLetter";
pub const INTERVIEW_ENDPOINT: &str = "/api/interview";
pub const VALIDATE_TEST_RESPONSE_ENDPOINT: &str = "/api/validateTestResponse";
pub const GET_QUESTION_ENDPOINT: &str = "/api/getQuestion";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the generation API, e.g. `http://localhost:8080`.
    pub base_url: String,
    /// Upper bound for one request, from send to the last chunk.
    pub stream_timeout: Duration,
    /// Interview completes once the history reaches this many messages.
    pub max_interview_messages: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            stream_timeout: Duration::from_secs(90),
            max_interview_messages: DEFAULT_MAX_INTERVIEW_MESSAGES,
        }
    }
}
