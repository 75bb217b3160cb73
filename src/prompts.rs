//! Prompt text sent to the hosted LLM.
//!
//! Kept in one place so tests can inspect the exact wording and so a prompt
//! change never touches transport or parsing code.

/// System message for structured extraction.
pub const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are an expert at extracting information from documents.";

/// System message for the chat passthrough.
pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Human message embedding the OCR text for extraction.
pub fn extraction_user_message(text: &str) -> String {
    format!(
        "Extract the following information from the text below:\n\n{}",
        text
    )
}
