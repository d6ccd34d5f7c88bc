//! HirePrep: cover-letter, interview and knowledge-test generation.
//!
//! `routes`/`generation` serve the streaming generation API; `client` is the
//! session-side protocol that consumes it.

pub mod chat;
pub mod client;
pub mod config;
pub mod errors;
pub mod generation;
pub mod llm_client;
pub mod models;
pub mod routes;
pub mod state;
