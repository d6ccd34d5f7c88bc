//! Knowledge-test question generation and answer explanation.

use tracing::{info, warn};

use crate::chat::{Message, Question};
use crate::errors::AppError;
use crate::generation::cover_letter::PromptPlan;
use crate::generation::prompts::{EXPLANATION_SYSTEM_TEMPLATE, QUESTION_SYSTEM_TEMPLATE};
use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, PLAIN_TEXT_INSTRUCTION};
use crate::llm_client::{parse_json_reply, CompletionProvider};
use crate::models::requests::{QuestionRequest, ValidateAnswerRequest};

/// Max LLM retries when the generated question is not valid JSON or has a bad shape.
const MAX_QUESTION_RETRIES: u32 = 2;

fn question_system_prompt(request: &QuestionRequest) -> String {
    let previous = if request.previous.is_empty() {
        "(none)".to_string()
    } else {
        request
            .previous
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n")
    };
    QUESTION_SYSTEM_TEMPLATE
        .replace("{json_only}", JSON_ONLY_SYSTEM)
        .replace("{topic}", &request.topic)
        .replace("{previous}", &previous)
}

/// Generates one new question for the test. Retries up to MAX_QUESTION_RETRIES
/// times if the reply does not parse or validate.
pub async fn generate_question(
    llm: &dyn CompletionProvider,
    request: &QuestionRequest,
) -> Result<Question, AppError> {
    if request.topic.trim().is_empty() {
        return Err(AppError::Validation("topic cannot be empty".to_string()));
    }

    let system = question_system_prompt(request);
    let messages = [Message::user("Write the next question.")];

    for attempt in 0..=MAX_QUESTION_RETRIES {
        let reply = llm.complete(&system, &messages).await?;

        let parsed = parse_json_reply::<Question>(&reply)
            .map_err(|e| e.to_string())
            .and_then(|q| q.validate().map(|_| q).map_err(|e| e.to_string()));

        match parsed {
            Ok(mut question) => {
                question.id = request.previous.len() as u32 + 1;
                question.provided_answer = None;
                question.explanation = None;
                info!("Generated question {} on '{}'", question.id, request.topic);
                return Ok(question);
            }
            Err(reason) => warn!(
                "Question attempt {}/{} rejected: {}",
                attempt + 1,
                MAX_QUESTION_RETRIES + 1,
                reason
            ),
        }
    }

    Err(AppError::Llm(format!(
        "Question generation failed after {} attempts",
        MAX_QUESTION_RETRIES + 1
    )))
}

pub fn plan_explanation(request: &ValidateAnswerRequest) -> Result<PromptPlan, AppError> {
    let question = &request.question;
    question
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let provided = question
        .provided_answer
        .ok_or_else(|| AppError::Validation("question has no providedAnswer".to_string()))?;
    let provided_text = question.answers.get(provided).ok_or_else(|| {
        AppError::Validation(format!("providedAnswer {provided} is out of range"))
    })?;

    let answers = question
        .answers
        .iter()
        .enumerate()
        .map(|(i, a)| format!("{}. {a}", i + 1))
        .collect::<Vec<_>>()
        .join("\n");

    let system = EXPLANATION_SYSTEM_TEMPLATE
        .replace("{plain_text_instruction}", PLAIN_TEXT_INSTRUCTION)
        .replace("{topic}", &request.topic)
        .replace("{question}", &question.question)
        .replace("{answers}", &answers)
        .replace("{correct}", &question.answers[question.correct_answer])
        .replace("{provided}", provided_text);

    Ok(PromptPlan {
        system,
        messages: vec![Message::user("Explain my answer.")],
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::llm_client::{LlmError, TextStream};

    /// Replies with canned completions in order.
    struct Canned(Mutex<Vec<&'static str>>);

    #[async_trait]
    impl CompletionProvider for Canned {
        async fn complete(&self, _system: &str, _messages: &[Message]) -> Result<String, LlmError> {
            let mut replies = self.0.lock().unwrap();
            if replies.is_empty() {
                return Err(LlmError::EmptyContent);
            }
            Ok(replies.remove(0).to_string())
        }

        async fn stream(&self, _system: &str, _messages: &[Message]) -> Result<TextStream, LlmError> {
            Err(LlmError::Stream("not used".into()))
        }
    }

    const GOOD: &str = r#"```json
{"id": 7, "question": "What does `?` do?", "answers": ["panics", "propagates errors", "clones", "nothing"], "correctAnswer": 1}
```"#;

    fn request(previous: usize) -> QuestionRequest {
        QuestionRequest {
            topic: "Rust".into(),
            previous: (0..previous).map(|i| format!("q{i}")).collect(),
        }
    }

    #[tokio::test]
    async fn test_generate_question_assigns_sequential_id() {
        let llm = Canned(Mutex::new(vec![GOOD]));
        let question = generate_question(&llm, &request(3)).await.unwrap();
        assert_eq!(question.id, 4);
        assert_eq!(question.correct_answer, 1);
    }

    #[tokio::test]
    async fn test_generate_question_retries_on_malformed_reply() {
        let llm = Canned(Mutex::new(vec![
            "not json",
            r#"{"id":1,"question":"q","answers":["a"],"correctAnswer":0}"#,
            GOOD,
        ]));
        let question = generate_question(&llm, &request(0)).await.unwrap();
        assert_eq!(question.id, 1);
    }

    #[tokio::test]
    async fn test_generate_question_gives_up() {
        let llm = Canned(Mutex::new(vec!["x", "y", "z"]));
        let result = generate_question(&llm, &request(0)).await;
        assert!(matches!(result, Err(AppError::Llm(_))));
    }

    #[test]
    fn test_previous_questions_listed_in_prompt() {
        let prompt = question_system_prompt(&request(2));
        assert!(prompt.contains("- q0\n- q1"));
        assert!(question_system_prompt(&request(0)).contains("(none)"));
    }

    #[test]
    fn test_explanation_requires_provided_answer() {
        let mut question: Question = parse_json_reply(GOOD).unwrap();
        let mut request = ValidateAnswerRequest {
            topic: "Rust".into(),
            question: question.clone(),
        };
        assert!(plan_explanation(&request).is_err());

        question.provided_answer = Some(0);
        request.question = question;
        let plan = plan_explanation(&request).unwrap();
        assert!(plan.system.contains("Correct answer: propagates errors"));
        assert!(plan.system.contains("The user chose: panics"));
    }
}
