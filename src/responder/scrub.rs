use std::borrow::Cow;

const MAX_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Markers after which a credential-shaped token is redacted.
const SECRET_MARKERS: [&str; 8] = [
    "sk-",
    "Bearer ",
    "bearer ",
    "api_key=",
    "key=",
    "\"api_key\":\"",
    "\"access_token\":\"",
    "\"token\":\"",
];

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | ':' | '+' | '/' | '=')
}

fn redact_after(text: &mut String, marker: &str) {
    let mut cursor = 0;
    while let Some(found) = text[cursor..].find(marker) {
        let value_start = cursor + found + marker.len();
        let value_len: usize = text[value_start..]
            .chars()
            .take_while(|c| is_token_char(*c))
            .map(char::len_utf8)
            .sum();

        if value_len == 0 {
            cursor = value_start;
            continue;
        }

        let start = cursor + found;
        text.replace_range(start..value_start + value_len, REDACTED);
        cursor = start + REDACTED.len();
    }
}

/// Redact API keys and bearer tokens echoed back in provider error bodies.
pub fn scrub_secret_patterns(input: &str) -> Cow<'_, str> {
    if !SECRET_MARKERS.iter().any(|marker| input.contains(marker)) {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in SECRET_MARKERS {
        redact_after(&mut scrubbed, marker);
    }
    Cow::Owned(scrubbed)
}

/// Scrub secrets and cap the length of an upstream error before it is logged.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_secret_patterns(input);
    if scrubbed.chars().count() <= MAX_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let truncated: String = scrubbed.chars().take(MAX_ERROR_CHARS).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_borrowed() {
        let input = "model overloaded, try again";
        assert!(matches!(scrub_secret_patterns(input), Cow::Borrowed(_)));
    }

    #[test]
    fn redacts_prefixed_keys_and_bearer_tokens() {
        let input = "invalid key sk-abc123XYZ sent as Authorization: Bearer or-v1-secret";
        let output = scrub_secret_patterns(input);

        assert!(!output.contains("abc123XYZ"));
        assert!(!output.contains("v1-secret"));
        assert!(output.contains(REDACTED));
        assert!(output.starts_with("invalid key "));
    }

    #[test]
    fn redacts_json_fields() {
        let input = r#"{"error":"bad","api_key":"raw-secret-123"}"#;
        let output = scrub_secret_patterns(input);

        assert!(!output.contains("raw-secret-123"));
        assert!(output.contains(REDACTED));
    }

    #[test]
    fn bare_marker_is_left_alone() {
        let input = "expected header Bearer  but none given";
        assert_eq!(scrub_secret_patterns(input), input);
    }

    #[test]
    fn long_errors_are_truncated_on_char_boundaries() {
        let input = "é".repeat(MAX_ERROR_CHARS + 50);
        let output = sanitize_api_error(&input);

        assert!(output.ends_with("..."));
        assert_eq!(output.chars().count(), MAX_ERROR_CHARS + 3);
    }
}
