//! Session-scoped state container.
//!
//! One `SessionContext` per user session. Feature operations are implemented
//! in `cover_letter.rs`, `interview.rs` and `knowledge_test.rs`; this file holds
//! the shared pieces.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::{Conversation, FlowMachine, Message, MessageId, QuestionSet, Role};
use crate::client::aggregator::{Aggregated, Slot, StreamAggregator};
use crate::client::error::{SessionError, StreamError};
use crate::client::source::{ChunkSource, HttpChunkSource};
use crate::client::ClientConfig;
use crate::models::application::ApplicationContext;
use crate::models::requests::InterviewType;

/// A generated cover letter. `revision` is 1 for the first draft and grows
/// with every applied refinement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverLetterDraft {
    pub text: String,
    pub revision: u32,
}

pub(crate) struct CoverLetterState {
    pub(crate) aggregator: StreamAggregator,
    pub(crate) draft: Option<CoverLetterDraft>,
    pub(crate) refinements: Conversation,
    pub(crate) pending: Option<MessageId>,
}

pub(crate) struct InterviewState {
    pub(crate) aggregator: StreamAggregator,
    pub(crate) kind: Option<InterviewType>,
    pub(crate) conversation: Conversation,
    pub(crate) flow: FlowMachine,
    pub(crate) pending: Option<MessageId>,
}

pub(crate) struct TestState {
    pub(crate) aggregator: StreamAggregator,
    pub(crate) topic: String,
    pub(crate) questions: QuestionSet,
    pub(crate) flow: FlowMachine,
}

pub struct SessionContext {
    id: Uuid,
    pub(crate) config: ClientConfig,
    pub(crate) source: Arc<dyn ChunkSource>,
    pub(crate) application: ApplicationContext,
    pub(crate) cover_letter: CoverLetterState,
    pub(crate) interview: InterviewState,
    pub(crate) test: TestState,
}

impl SessionContext {
    /// Session talking to the generation API at `config.base_url`.
    pub fn new(config: ClientConfig, application: ApplicationContext) -> Result<Self, StreamError> {
        let source = Arc::new(HttpChunkSource::new(&config.base_url)?);
        Ok(Self::with_source(config, application, source))
    }

    pub fn with_source(
        config: ClientConfig,
        application: ApplicationContext,
        source: Arc<dyn ChunkSource>,
    ) -> Self {
        let timeout = config.stream_timeout;
        let id = Uuid::new_v4();
        info!("Session {id} created");
        Self {
            id,
            config,
            source,
            application,
            cover_letter: CoverLetterState {
                aggregator: StreamAggregator::new(Slot::CoverLetter, timeout),
                draft: None,
                refinements: Conversation::new(),
                pending: None,
            },
            interview: InterviewState {
                aggregator: StreamAggregator::new(Slot::Interview, timeout),
                kind: None,
                conversation: Conversation::new(),
                flow: FlowMachine::new(),
                pending: None,
            },
            test: TestState {
                aggregator: StreamAggregator::new(Slot::Test, timeout),
                topic: String::new(),
                questions: QuestionSet::new(),
                flow: FlowMachine::new(),
            },
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn application(&self) -> &ApplicationContext {
        &self.application
    }

    /// Switches to another application. Everything generated for the previous
    /// one is dropped.
    pub fn set_application(&mut self, application: ApplicationContext) {
        info!(
            "Session {}: switching to {} at {}",
            self.id, application.job.title, application.job.company
        );
        self.application = application;
        self.reset_cover_letter();
        self.reset_interview();
        self.reset_test();
    }

    /// Aggregator of a slot, for observing `is_loading`, `is_error` and live text.
    pub fn aggregator(&self, slot: Slot) -> &StreamAggregator {
        match slot {
            Slot::CoverLetter => &self.cover_letter.aggregator,
            Slot::Interview => &self.interview.aggregator,
            Slot::Test => &self.test.aggregator,
        }
    }
}

/// What to send for one conversational turn.
pub(crate) enum TurnInput<'a> {
    /// Append this user message and request a reply.
    New(&'a str),
    /// Re-request a reply to the last user message without appending it again.
    Retry,
}

impl<'a> TurnInput<'a> {
    pub(crate) fn from_flag(text: &'a str, retry_without_duplicate: bool) -> Self {
        if retry_without_duplicate {
            TurnInput::Retry
        } else {
            TurnInput::New(text)
        }
    }
}

/// Runs one request/reply turn against `conversation`.
///
/// The assistant placeholder is appended before the request, follows the live
/// text while chunks arrive, and is removed if the request fails. The user
/// message stays in place on failure so the turn can be retried.
pub(crate) async fn converse<B>(
    aggregator: &StreamAggregator,
    source: &dyn ChunkSource,
    conversation: &mut Conversation,
    pending: &mut Option<MessageId>,
    input: TurnInput<'_>,
    endpoint: &str,
    build_body: B,
) -> Result<Aggregated, SessionError>
where
    B: FnOnce(Vec<Message>) -> Result<serde_json::Value, SessionError>,
{
    if aggregator.is_loading() {
        return Err(StreamError::SlotBusy(aggregator.slot()).into());
    }

    // Placeholder left behind by an abandoned attempt.
    if let Some(stale) = pending.take() {
        conversation.remove(stale);
    }

    match input {
        TurnInput::New(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Err(SessionError::EmptyMessage);
            }
            conversation.append(Role::User, text);
        }
        TurnInput::Retry => {
            // only a user message still waiting for its reply can be retried
            let last_id = conversation.last().map(|m| m.id);
            match conversation.last_user_message() {
                Some(user) if Some(user.id) == last_id => {
                    debug!("Retrying reply to message {:?}", user.id);
                }
                _ => return Err(SessionError::NothingToRetry),
            }
        }
    }

    let body = build_body(conversation.history())?;
    let placeholder = conversation.append(Role::Assistant, "");
    *pending = Some(placeholder);

    let result = aggregator
        .run_observed(source, endpoint, &body, |live| {
            conversation.update(placeholder, live);
        })
        .await;

    *pending = None;
    match result {
        Ok(aggregated) => {
            conversation.update(placeholder, aggregated.text.as_str());
            Ok(aggregated)
        }
        Err(e) => {
            conversation.remove(placeholder);
            Err(e.into())
        }
    }
}
