//! Cover-letter drafting and refinement.

use tracing::info;

use crate::chat::StoredMessage;
use crate::client::error::SessionError;
use crate::client::session::{converse, CoverLetterDraft, SessionContext, TurnInput};
use crate::client::{NEW_COVER_LETTER_ENDPOINT, REFINE_COVER_LETTER_ENDPOINT};
use crate::models::requests::{NewCoverLetterRequest, RefineCoverLetterRequest};

impl SessionContext {
    pub fn cover_letter(&self) -> Option<&CoverLetterDraft> {
        self.cover_letter.draft.as_ref()
    }

    /// Refinement requests and the revised letters they produced.
    pub fn refinement_messages(&self) -> &[StoredMessage] {
        self.cover_letter.refinements.messages()
    }

    /// Generates a fresh letter for the current application.
    ///
    /// Returns the draft so the caller can persist it. A failed attempt leaves
    /// any previous draft untouched.
    pub async fn generate_cover_letter(
        &mut self,
        instructions: Option<String>,
    ) -> Result<CoverLetterDraft, SessionError> {
        let body = serde_json::to_value(NewCoverLetterRequest {
            context: self.application.clone(),
            instructions,
        })?;

        let aggregated = self
            .cover_letter
            .aggregator
            .run(self.source.as_ref(), NEW_COVER_LETTER_ENDPOINT, &body)
            .await?;

        let draft = CoverLetterDraft {
            text: aggregated.text,
            revision: 1,
        };
        self.cover_letter.refinements.reset();
        self.cover_letter.pending = None;
        self.cover_letter.draft = Some(draft.clone());
        info!(
            "Session {}: cover letter generated ({} chars)",
            self.id(),
            draft.text.len()
        );
        Ok(draft)
    }

    /// Applies a refinement request to the current letter. Earlier requests
    /// travel with it as history.
    pub async fn refine_cover_letter(
        &mut self,
        instruction: &str,
        retry_without_duplicate: bool,
    ) -> Result<CoverLetterDraft, SessionError> {
        let current = self
            .cover_letter
            .draft
            .clone()
            .ok_or(SessionError::NoCoverLetter)?;
        let context = self.application.clone();

        let aggregated = converse(
            &self.cover_letter.aggregator,
            self.source.as_ref(),
            &mut self.cover_letter.refinements,
            &mut self.cover_letter.pending,
            TurnInput::from_flag(instruction, retry_without_duplicate),
            REFINE_COVER_LETTER_ENDPOINT,
            |messages| {
                Ok(serde_json::to_value(RefineCoverLetterRequest {
                    context,
                    cover_letter: current.text,
                    messages,
                })?)
            },
        )
        .await?;

        let draft = CoverLetterDraft {
            text: aggregated.text,
            revision: current.revision + 1,
        };
        self.cover_letter.draft = Some(draft.clone());
        Ok(draft)
    }

    pub fn reset_cover_letter(&mut self) {
        self.cover_letter.draft = None;
        self.cover_letter.refinements.reset();
        self.cover_letter.pending = None;
        self.cover_letter.aggregator.clear();
    }
}
