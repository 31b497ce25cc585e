//! Stripping of fenced code blocks from model answers.
//!
//! Vision models frequently wrap a requested JSON object in ``` or ```json
//! fences; the structured parse wants the bare body.

/// Strip a single surrounding fenced code block, if present.
///
/// Returns the input (trimmed) unchanged when it is not fully fenced.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(body) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = body.strip_suffix("```") else {
        return trimmed;
    };
    // The opening fence may carry a language tag on its own line.
    let body = match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => body,
    };
    body.trim()
}
