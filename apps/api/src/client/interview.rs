//! Interview simulation over `/api/interview`.

use tracing::info;

use crate::chat::{FlowState, StoredMessage};
use crate::client::error::SessionError;
use crate::client::session::{converse, SessionContext, TurnInput};
use crate::client::INTERVIEW_ENDPOINT;
use crate::models::requests::{InterviewRequest, InterviewType};

/// Result of one interviewer turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterviewTurn {
    pub reply: String,
    /// This turn moved the interview to `Completed`.
    pub completed: bool,
}

impl SessionContext {
    pub fn interview_state(&self) -> FlowState {
        self.interview.flow.state()
    }

    pub fn interview_type(&self) -> Option<InterviewType> {
        self.interview.kind
    }

    pub fn interview_messages(&self) -> &[StoredMessage] {
        self.interview.conversation.messages()
    }

    /// Starts a new interview of the given type, discarding any previous one.
    pub fn start_interview(&mut self, kind: InterviewType) -> Result<(), SessionError> {
        self.reset_interview();
        self.interview.kind = Some(kind);
        self.interview.flow.start()?;
        info!("Session {}: {:?} interview started", self.id(), kind);
        Ok(())
    }

    /// Sends the applicant's message and streams the interviewer's reply.
    ///
    /// With `retry_without_duplicate` set, `text` is ignored and the last user
    /// message already in history is answered again.
    pub async fn send_message(
        &mut self,
        text: &str,
        retry_without_duplicate: bool,
    ) -> Result<InterviewTurn, SessionError> {
        self.interview.flow.ensure_in_progress("send a message")?;

        let context = self.application.clone();
        let interview_type = self.interview.kind.unwrap_or(InterviewType::General);
        let max_messages = self.config.max_interview_messages;

        let aggregated = converse(
            &self.interview.aggregator,
            self.source.as_ref(),
            &mut self.interview.conversation,
            &mut self.interview.pending,
            TurnInput::from_flag(text, retry_without_duplicate),
            INTERVIEW_ENDPOINT,
            |messages| {
                Ok(serde_json::to_value(InterviewRequest {
                    context,
                    interview_type,
                    messages,
                    max_messages,
                })?)
            },
        )
        .await?;

        let reached_limit = self.interview.conversation.len() >= max_messages;
        let completed = if aggregated.closed_flow || reached_limit {
            self.interview.flow.complete()?
        } else {
            false
        };
        if completed {
            info!(
                "Session {}: interview completed after {} messages",
                self.id(),
                self.interview.conversation.len()
            );
        }

        Ok(InterviewTurn {
            reply: aggregated.text,
            completed,
        })
    }

    /// Re-requests the reply to the last user message.
    pub async fn retry_last_message(&mut self) -> Result<InterviewTurn, SessionError> {
        self.send_message("", true).await
    }

    pub fn reset_interview(&mut self) {
        self.interview.conversation.reset();
        self.interview.flow.reset();
        self.interview.kind = None;
        self.interview.pending = None;
        self.interview.aggregator.clear();
    }
}
