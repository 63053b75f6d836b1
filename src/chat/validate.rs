//! Boundary checks for caller-supplied identifiers and message text.

use crate::config::MatchingConfig;
use crate::error::SessionError;

/// Longest accepted user or session identifier, in characters.
pub const MAX_ID_CHARS: usize = 128;

fn identifier<'a>(field: &str, raw: &'a str) -> Result<&'a str, SessionError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(SessionError::InvalidArgument(format!(
            "{field} must not be empty"
        )));
    }
    if value.chars().count() > MAX_ID_CHARS {
        return Err(SessionError::InvalidArgument(format!(
            "{field} must be at most {MAX_ID_CHARS} characters"
        )));
    }
    if value.chars().any(char::is_control) {
        return Err(SessionError::InvalidArgument(format!(
            "{field} must not contain control characters"
        )));
    }
    Ok(value)
}

pub fn session_id(raw: &str) -> Result<&str, SessionError> {
    identifier("session_id", raw)
}

/// A human participant id. The automated prefix is reserved.
pub fn user_id<'a>(raw: &'a str, matching: &MatchingConfig) -> Result<&'a str, SessionError> {
    let value = identifier("user_id", raw)?;
    if value.starts_with(&matching.automated_id_prefix) {
        return Err(SessionError::InvalidArgument(format!(
            "user_id must not start with the reserved prefix '{}'",
            matching.automated_id_prefix
        )));
    }
    Ok(value)
}

/// Message text is relayed exactly as written; surrounding whitespace only
/// counts against emptiness.
pub fn message_text<'a>(raw: &'a str, matching: &MatchingConfig) -> Result<&'a str, SessionError> {
    if raw.trim().is_empty() {
        return Err(SessionError::InvalidArgument(
            "text must not be empty".into(),
        ));
    }
    if raw.chars().count() > matching.max_message_chars {
        return Err(SessionError::InvalidArgument(format!(
            "text must be at most {} characters",
            matching.max_message_chars
        )));
    }
    Ok(raw)
}
