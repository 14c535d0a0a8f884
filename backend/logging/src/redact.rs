//! Log Redaction Layer
//!
//! Scrubs bearer tokens, API keys and email addresses from strings prior to
//! logging. Digit runs are left alone: ticket rows and bonus numbers are
//! exactly what a failed-extraction log needs to show.

use regex::Regex;
use std::sync::LazyLock;

static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9\-\._~+/]+=*").unwrap());
static SECRET_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk-[a-zA-Z0-9_\-]{20,}").unwrap());
static QUERY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&](?:key|api_key|token)=)[^&\s]+").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BEARER_RE.replace_all(input, "[REDACTED_TOKEN]");
    let redacted = SECRET_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    let redacted = QUERY_KEY_RE.replace_all(&redacted, "${1}[REDACTED_KEY]");
    EMAIL_RE.replace_all(&redacted, "[REDACTED_EMAIL]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Auth: Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 for user@example.com";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(!clean.contains("user@example.com"));
        assert!(clean.contains("[REDACTED_TOKEN]"));
        assert!(clean.contains("[REDACTED_EMAIL]"));
    }

    #[test]
    fn redacts_api_keys() {
        let clean = redact_sensitive_data(
            "POST https://example.com/v1/accounts:lookup?key=AIzaSyD-abc123&alt=json with sk-proj_ABCDEFGHIJKLMNOPQRSTUV",
        );
        assert!(clean.contains("?key=[REDACTED_KEY]&alt=json"));
        assert!(!clean.contains("AIzaSyD-abc123"));
        assert!(!clean.contains("sk-proj_ABCDEFGHIJKLMNOPQRSTUV"));
    }

    #[test]
    fn ticket_numbers_survive() {
        let raw = r#"{"sanceNumber":"089229","winningNumbers":["05 21 32 36 38 46 NT","555 123 4567"]}"#;
        assert_eq!(redact_sensitive_data(raw), raw);
    }
}
