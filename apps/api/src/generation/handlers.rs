//! Axum route handlers for the Generation API.
//!
//! Streaming endpoints answer with a chunked `text/plain` body whose chunks,
//! concatenated, are the generated text. Errors detected before the first
//! chunk come back as a JSON error with a non-2xx status; a failure mid-stream
//! aborts the body.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use tracing::{error, info};

use crate::chat::Message;
use crate::errors::AppError;
use crate::generation::cover_letter::{plan_new_cover_letter, plan_refine_cover_letter, PromptPlan};
use crate::generation::interview::plan_interview_turn;
use crate::generation::test_questions::{generate_question, plan_explanation};
use crate::llm_client::TextStream;
use crate::models::requests::{
    InterviewRequest, NewCoverLetterRequest, QuestionRequest, RefineCoverLetterRequest,
    ValidateAnswerRequest,
};
use crate::state::AppState;

fn text_stream_response(stream: TextStream) -> Response {
    let stream = stream.inspect(|item| {
        if let Err(e) = item {
            error!("Generation stream aborted: {e}");
        }
    });
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(stream),
    )
        .into_response()
}

async fn stream_plan(state: &AppState, plan: PromptPlan) -> Result<Response, AppError> {
    let stream = state.llm.stream(&plan.system, &plan.messages).await?;
    Ok(text_stream_response(stream))
}

/// POST /api/newCoverLetter
pub async fn handle_new_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<NewCoverLetterRequest>,
) -> Result<Response, AppError> {
    let plan = plan_new_cover_letter(&request)?;
    info!(
        "Drafting cover letter for {} at {}",
        request.context.job.title, request.context.job.company
    );
    stream_plan(&state, plan).await
}

/// POST /api/refineCoverLetter
pub async fn handle_refine_cover_letter(
    State(state): State<AppState>,
    Json(request): Json<RefineCoverLetterRequest>,
) -> Result<Response, AppError> {
    let plan = plan_refine_cover_letter(&request)?;
    info!("Refining cover letter ({} messages)", request.messages.len());
    stream_plan(&state, plan).await
}

/// POST /api/interview
///
/// Streams the interviewer's next turn. The final turn ends with the
/// end-of-interview marker.
pub async fn handle_interview(
    State(state): State<AppState>,
    Json(request): Json<InterviewRequest>,
) -> Result<Response, AppError> {
    let plan = plan_interview_turn(&request)?;
    info!(
        "Interview turn: type={:?} messages={}/{}",
        request.interview_type,
        request.messages.len(),
        request.max_messages
    );
    stream_plan(&state, plan).await
}

/// POST /api/validateTestResponse
///
/// Streams the explanation for a submitted answer.
pub async fn handle_validate_test_response(
    State(state): State<AppState>,
    Json(request): Json<ValidateAnswerRequest>,
) -> Result<Response, AppError> {
    let plan = plan_explanation(&request)?;
    stream_plan(&state, plan).await
}

/// POST /api/getQuestion
///
/// Returns `{ role, content }` where `content` is the JSON-encoded question.
pub async fn handle_get_question(
    State(state): State<AppState>,
    Json(request): Json<QuestionRequest>,
) -> Result<Json<Message>, AppError> {
    let question = generate_question(state.llm.as_ref(), &request).await?;
    let content = serde_json::to_string(&question)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize question: {e}")))?;
    Ok(Json(Message::assistant(content)))
}
