//! Request bodies of the generation endpoints. Shared by the axum handlers and
//! the session client so both sides agree on the wire shape.

use serde::{Deserialize, Serialize};

use crate::chat::{Message, Question};
use crate::models::application::ApplicationContext;

/// Default number of messages after which an interview is wrapped up.
pub const DEFAULT_MAX_INTERVIEW_MESSAGES: usize = 20;

/// POST /api/newCoverLetter
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCoverLetterRequest {
    #[serde(flatten)]
    pub context: ApplicationContext,
    /// Free-form extra guidance, e.g. "keep it under 250 words".
    #[serde(default)]
    pub instructions: Option<String>,
}

/// POST /api/refineCoverLetter
///
/// `messages` is the refinement history; the last user message is the
/// instruction being applied now.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineCoverLetterRequest {
    #[serde(flatten)]
    pub context: ApplicationContext,
    pub cover_letter: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewType {
    Behavioral,
    Technical,
    General,
}

/// POST /api/interview
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewRequest {
    #[serde(flatten)]
    pub context: ApplicationContext,
    pub interview_type: InterviewType,
    pub messages: Vec<Message>,
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

fn default_max_messages() -> usize {
    DEFAULT_MAX_INTERVIEW_MESSAGES
}

/// POST /api/getQuestion
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionRequest {
    pub topic: String,
    /// Question texts already asked in this test, to avoid repeats.
    #[serde(default)]
    pub previous: Vec<String>,
}

/// POST /api/validateTestResponse
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateAnswerRequest {
    pub topic: String,
    pub question: Question,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::Role;

    #[test]
    fn test_interview_request_flattens_context() {
        let json = serde_json::json!({
            "applicant": { "fullName": "Ada" },
            "job": { "title": "Engineer", "company": "Acme" },
            "interviewType": "technical",
            "messages": [{ "role": "user", "content": "Hi" }]
        });
        let request: InterviewRequest = serde_json::from_value(json).unwrap();
        assert_eq!(request.interview_type, InterviewType::Technical);
        assert_eq!(request.context.job.company, "Acme");
        assert_eq!(request.messages[0].role, Role::User);
        assert_eq!(request.max_messages, DEFAULT_MAX_INTERVIEW_MESSAGES);
    }

    #[test]
    fn test_refine_request_uses_camel_case() {
        let request = RefineCoverLetterRequest {
            context: ApplicationContext::default(),
            cover_letter: "Dear team".to_string(),
            messages: vec![Message::user("shorter")],
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["coverLetter"], "Dear team");
        assert!(value.get("applicant").is_some());
    }
}
