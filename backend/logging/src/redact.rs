//! Log Redaction Layer
//!
//! Scrubs API keys, bearer tokens, and webhook secrets from strings prior to
//! logging. Upload batches and relay errors may echo request headers or URLs;
//! nothing secret should survive into the NDJSON files.

use regex::Regex;
use std::sync::LazyLock;

static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});

static WEBHOOK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/hooks/[a-zA-Z0-9]{10,}").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_TOKEN]");
    WEBHOOK_RE
        .replace_all(&redacted, "/hooks/[REDACTED_WEBHOOK]")
        .to_string()
}
