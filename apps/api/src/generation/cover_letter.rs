//! Prompt assembly for cover-letter drafting and refinement.

use crate::chat::{Message, Role};
use crate::errors::AppError;
use crate::generation::prompts::{COVER_LETTER_SYSTEM_TEMPLATE, REFINE_SYSTEM_TEMPLATE};
use crate::llm_client::prompts::{GROUNDING_INSTRUCTION, PLAIN_TEXT_INSTRUCTION};
use crate::models::requests::{NewCoverLetterRequest, RefineCoverLetterRequest};

/// A system prompt plus the conversation sent after it.
#[derive(Debug, Clone)]
pub struct PromptPlan {
    pub system: String,
    pub messages: Vec<Message>,
}

pub fn plan_new_cover_letter(request: &NewCoverLetterRequest) -> Result<PromptPlan, AppError> {
    if !request.context.is_complete() {
        return Err(AppError::Validation(
            "applicant name, job title and company are required".to_string(),
        ));
    }

    let instructions = request
        .instructions
        .as_deref()
        .map(|i| format!("Additional instructions from the applicant: {i}"))
        .unwrap_or_default();

    let system = COVER_LETTER_SYSTEM_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{plain_text_instruction}", PLAIN_TEXT_INSTRUCTION)
        .replace("{instructions}", &instructions)
        .replace("{application}", &request.context.summary());

    Ok(PromptPlan {
        system,
        messages: vec![Message::user("Write the cover letter.")],
    })
}

pub fn plan_refine_cover_letter(request: &RefineCoverLetterRequest) -> Result<PromptPlan, AppError> {
    if request.cover_letter.trim().is_empty() {
        return Err(AppError::Validation("coverLetter cannot be empty".to_string()));
    }
    match request.messages.last() {
        Some(last) if last.role == Role::User && !last.content.trim().is_empty() => {}
        _ => {
            return Err(AppError::Validation(
                "messages must end with a non-empty user refinement request".to_string(),
            ))
        }
    }

    let system = REFINE_SYSTEM_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{plain_text_instruction}", PLAIN_TEXT_INSTRUCTION)
        .replace("{cover_letter}", &request.cover_letter)
        .replace("{application}", &request.context.summary());

    Ok(PromptPlan {
        system,
        messages: request.messages.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::application::{ApplicantProfile, ApplicationContext, JobPosting};

    fn context() -> ApplicationContext {
        ApplicationContext {
            applicant: ApplicantProfile {
                full_name: "Grace Hopper".into(),
                ..Default::default()
            },
            job: JobPosting {
                title: "Compiler Engineer".into(),
                company: "Navy".into(),
                description: String::new(),
            },
        }
    }

    #[test]
    fn test_new_letter_prompt_fills_template() {
        let plan = plan_new_cover_letter(&NewCoverLetterRequest {
            context: context(),
            instructions: Some("under 200 words".into()),
        })
        .unwrap();
        assert!(plan.system.contains("Grace Hopper"));
        assert!(plan.system.contains("under 200 words"));
        assert!(!plan.system.contains('{'));
        assert_eq!(plan.messages.len(), 1);
    }

    #[test]
    fn test_new_letter_requires_complete_context() {
        let result = plan_new_cover_letter(&NewCoverLetterRequest {
            context: ApplicationContext::default(),
            instructions: None,
        });
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_refine_requires_trailing_user_message() {
        let mut request = RefineCoverLetterRequest {
            context: context(),
            cover_letter: "Dear team".into(),
            messages: vec![Message::user("more formal"), Message::assistant("Dear Sir")],
        };
        assert!(plan_refine_cover_letter(&request).is_err());

        request.messages.push(Message::user("shorter"));
        let plan = plan_refine_cover_letter(&request).unwrap();
        assert_eq!(plan.messages.len(), 3);
        assert!(plan.system.contains("Dear team"));
    }
}
