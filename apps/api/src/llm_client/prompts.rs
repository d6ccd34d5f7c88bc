// Shared prompt constants and prompt-building utilities.
// Each service that needs LLM calls defines its own prompts alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Common instruction appended to all prompts that use applicant data.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Only use facts present in the applicant profile provided below. \
    Do NOT invent employers, degrees, metrics or skills. \
    If the profile does not support a claim, leave it out.";

/// Instruction for plain-text replies that are streamed straight to the user.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Reply in plain text. Do NOT use markdown headings or code fences.";
