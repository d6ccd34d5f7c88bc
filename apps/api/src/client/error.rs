use std::time::Duration;

use thiserror::Error;

use crate::chat::{FlowError, QuestionError};
use crate::client::aggregator::Slot;

/// Failure of one stream aggregation.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("{0:?} already has a request in flight")]
    SlotBusy(Slot),

    #[error("request failed with status {status}")]
    Http { status: u16 },

    #[error("response has no body")]
    EmptyBody,

    #[error("transport error: {0}")]
    Transport(String),

    #[error("stream timed out after {0:?}")]
    Timeout(Duration),
}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        StreamError::Transport(err.to_string())
    }
}

/// Failure of a session operation. Every variant is recoverable: the
/// session stays usable and the action can be retried.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error("malformed question payload: {0}")]
    MalformedQuestion(String),

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("there is no user message to retry")]
    NothingToRetry,

    #[error("no cover letter has been generated yet")]
    NoCoverLetter,

    #[error("question {0} has not been explained yet")]
    QuestionPending(u32),
}
