// Generation API: cover letters, interview turns, knowledge-test questions.
// All LLM calls go through llm_client — no direct OpenAI calls here.

pub mod cover_letter;
pub mod handlers;
pub mod interview;
pub mod prompts;
pub mod test_questions;
