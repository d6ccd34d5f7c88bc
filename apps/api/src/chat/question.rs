//! Multiple-choice test questions and the per-session question list.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of explained questions that completes a knowledge test.
pub const MAX_TEST_QUESTIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: u32,
    pub question: String,
    pub answers: Vec<String>,
    pub correct_answer: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provided_answer: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    /// Checks the shape a generated question must have before it is shown.
    pub fn validate(&self) -> Result<(), QuestionError> {
        if self.question.trim().is_empty() {
            return Err(QuestionError::Invalid("question text is empty".to_string()));
        }
        if self.answers.len() < 2 {
            return Err(QuestionError::Invalid(format!(
                "expected at least 2 answers, got {}",
                self.answers.len()
            )));
        }
        if self.correct_answer >= self.answers.len() {
            return Err(QuestionError::Invalid(format!(
                "correct answer index {} out of range",
                self.correct_answer
            )));
        }
        Ok(())
    }

    pub fn is_answered(&self) -> bool {
        self.provided_answer.is_some()
    }

    pub fn is_explained(&self) -> bool {
        self.explanation.as_deref().is_some_and(|e| !e.is_empty())
    }

    pub fn is_correct(&self) -> Option<bool> {
        self.provided_answer.map(|a| a == self.correct_answer)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question {0} not found")]
    NotFound(u32),

    #[error("question {0} has already been answered")]
    AlreadyAnswered(u32),

    #[error("question {0} has not been answered yet")]
    NotAnswered(u32),

    #[error("answer {answer} out of range for question {id}")]
    AnswerOutOfRange { id: u32, answer: usize },

    #[error("invalid question: {0}")]
    Invalid(String),
}

/// Questions fetched during one test, in fetch order.
#[derive(Debug, Default, Clone)]
pub struct QuestionSet {
    questions: Vec<Question>,
}

impl QuestionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a freshly fetched question. Ids are assigned here so they stay
    /// unique within the session whatever the generator returned; answer and
    /// explanation fields from the payload are discarded.
    pub fn push(&mut self, mut question: Question) -> u32 {
        let id = self.questions.len() as u32 + 1;
        question.id = id;
        question.provided_answer = None;
        question.explanation = None;
        self.questions.push(question);
        id
    }

    pub fn get(&self, id: u32) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    fn get_mut(&mut self, id: u32) -> Result<&mut Question, QuestionError> {
        self.questions
            .iter_mut()
            .find(|q| q.id == id)
            .ok_or(QuestionError::NotFound(id))
    }

    /// Records the user's answer. An answered question is never changed again.
    pub fn add_test_answer(&mut self, id: u32, answer: usize) -> Result<(), QuestionError> {
        let question = self.get_mut(id)?;
        if question.provided_answer.is_some() {
            return Err(QuestionError::AlreadyAnswered(id));
        }
        if answer >= question.answers.len() {
            return Err(QuestionError::AnswerOutOfRange { id, answer });
        }
        question.provided_answer = Some(answer);
        Ok(())
    }

    /// Attaches the explanation for an answered question. The first
    /// explanation wins.
    pub fn set_explanation(&mut self, id: u32, explanation: String) -> Result<bool, QuestionError> {
        let question = self.get_mut(id)?;
        if !question.is_answered() {
            return Err(QuestionError::NotAnswered(id));
        }
        if question.is_explained() {
            return Ok(false);
        }
        question.explanation = Some(explanation);
        Ok(true)
    }

    pub fn explained_count(&self) -> usize {
        self.questions.iter().filter(|q| q.is_explained()).count()
    }

    pub fn correct_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|q| q.is_correct() == Some(true))
            .count()
    }

    /// The most recent question, if it still awaits an answer or explanation.
    pub fn current(&self) -> Option<&Question> {
        self.questions.last().filter(|q| !q.is_explained())
    }

    pub fn all(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn reset(&mut self) {
        self.questions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(text: &str) -> Question {
        Question {
            id: 0,
            question: text.to_string(),
            answers: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_answer: 2,
            provided_answer: None,
            explanation: None,
        }
    }

    #[test]
    fn test_question_wire_format_is_camel_case() {
        let json = r#"{"id":3,"question":"What is ownership?","answers":["a","b"],"correctAnswer":1}"#;
        let question: Question = serde_json::from_str(json).unwrap();
        assert_eq!(question.correct_answer, 1);
        assert!(question.provided_answer.is_none());

        let out = serde_json::to_value(&question).unwrap();
        assert_eq!(out["correctAnswer"], 1);
        assert!(out.get("providedAnswer").is_none());
    }

    #[test]
    fn test_validate_rejects_bad_shapes() {
        let mut q = sample("q");
        q.correct_answer = 4;
        assert!(q.validate().is_err());

        let mut q = sample("q");
        q.answers.truncate(1);
        q.correct_answer = 0;
        assert!(q.validate().is_err());

        assert!(sample("  ").validate().is_err());
        assert!(sample("fine").validate().is_ok());
    }

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut set = QuestionSet::new();
        let mut payload = sample("one");
        payload.id = 99;
        payload.provided_answer = Some(1);
        assert_eq!(set.push(payload), 1);
        assert_eq!(set.push(sample("two")), 2);
        assert!(!set.get(1).unwrap().is_answered());
    }

    #[test]
    fn test_answer_is_immutable_after_first_submission() {
        let mut set = QuestionSet::new();
        let id = set.push(sample("q"));
        set.add_test_answer(id, 1).unwrap();
        assert_eq!(
            set.add_test_answer(id, 3),
            Err(QuestionError::AlreadyAnswered(id))
        );
        assert_eq!(set.get(id).unwrap().provided_answer, Some(1));
    }

    #[test]
    fn test_answer_out_of_range_leaves_question_unanswered() {
        let mut set = QuestionSet::new();
        let id = set.push(sample("q"));
        assert!(set.add_test_answer(id, 9).is_err());
        assert!(!set.get(id).unwrap().is_answered());
    }

    #[test]
    fn test_explanation_requires_answer_and_is_set_once() {
        let mut set = QuestionSet::new();
        let id = set.push(sample("q"));
        assert_eq!(
            set.set_explanation(id, "why".into()),
            Err(QuestionError::NotAnswered(id))
        );
        set.add_test_answer(id, 2).unwrap();
        assert_eq!(set.set_explanation(id, "first".into()), Ok(true));
        assert_eq!(set.set_explanation(id, "second".into()), Ok(false));
        assert_eq!(set.get(id).unwrap().explanation.as_deref(), Some("first"));
        assert_eq!(set.explained_count(), 1);
        assert_eq!(set.correct_count(), 1);
    }

    #[test]
    fn test_empty_explanation_does_not_count() {
        let mut set = QuestionSet::new();
        let id = set.push(sample("q"));
        set.add_test_answer(id, 0).unwrap();
        set.set_explanation(id, String::new()).unwrap();
        assert_eq!(set.explained_count(), 0);
    }

    #[test]
    fn test_current_tracks_unexplained_last_question() {
        let mut set = QuestionSet::new();
        assert!(set.current().is_none());
        let id = set.push(sample("q"));
        assert_eq!(set.current().unwrap().id, id);
        set.add_test_answer(id, 0).unwrap();
        set.set_explanation(id, "because".into()).unwrap();
        assert!(set.current().is_none());
    }
}
