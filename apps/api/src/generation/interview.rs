//! Prompt assembly for interview simulation.

use crate::chat::{Role, END_OF_INTERVIEW};
use crate::errors::AppError;
use crate::generation::cover_letter::PromptPlan;
use crate::generation::prompts::{
    BEHAVIORAL_STYLE, GENERAL_STYLE, INTERVIEW_SYSTEM_TEMPLATE, TECHNICAL_STYLE,
    WRAP_UP_INSTRUCTION,
};
use crate::models::requests::{InterviewRequest, InterviewType};

fn style_for(kind: InterviewType) -> &'static str {
    match kind {
        InterviewType::Behavioral => BEHAVIORAL_STYLE,
        InterviewType::Technical => TECHNICAL_STYLE,
        InterviewType::General => GENERAL_STYLE,
    }
}

/// True when the reply to `history_len` messages is the last one allowed.
pub fn should_wrap_up(history_len: usize, max_messages: usize) -> bool {
    history_len + 1 >= max_messages
}

pub fn plan_interview_turn(request: &InterviewRequest) -> Result<PromptPlan, AppError> {
    if request.max_messages < 2 {
        return Err(AppError::Validation("maxMessages must be at least 2".to_string()));
    }
    if request
        .messages
        .iter()
        .any(|m| m.role == Role::System)
    {
        return Err(AppError::Validation(
            "system messages are not accepted from clients".to_string(),
        ));
    }
    if let Some(last) = request.messages.last() {
        if last.role != Role::User {
            return Err(AppError::Validation(
                "interview history must end with the applicant's message".to_string(),
            ));
        }
    }

    let wrap_up = if should_wrap_up(request.messages.len(), request.max_messages) {
        WRAP_UP_INSTRUCTION
    } else {
        ""
    };

    let system = INTERVIEW_SYSTEM_TEMPLATE
        .replace("{interview_style}", style_for(request.interview_type))
        .replace("{sentinel}", END_OF_INTERVIEW)
        .replace("{wrap_up}", wrap_up)
        .replace("{application}", &request.context.summary());

    Ok(PromptPlan {
        system,
        messages: request.messages.clone(),
    })
}
