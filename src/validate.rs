use axum::http::HeaderValue;

pub const MIN_FIELD_LENGTH: usize = 3;

pub const DEFAULT_REDIRECT: &str = "/jokes";

/// Returns `message` when `value` is shorter than [`MIN_FIELD_LENGTH`] characters.
pub fn validate_length(value: &str, message: &str) -> Option<String> {
    if value.chars().count() < MIN_FIELD_LENGTH {
        Some(message.to_string())
    } else {
        None
    }
}

/// Only local paths are accepted as redirect targets; anything else falls
/// back to [`DEFAULT_REDIRECT`].
pub fn safe_redirect(to: Option<&str>) -> String {
    match to {
        Some(to) if is_local_path(to) => to.to_string(),
        _ => DEFAULT_REDIRECT.to_string(),
    }
}

/// Browsers read `/\host` as `//host`, so a backslash after the leading slash
/// is off-site too. The target must also survive as a `Location` header.
fn is_local_path(to: &str) -> bool {
    let mut chars = to.chars();
    chars.next() == Some('/')
        && !matches!(chars.next(), Some('/' | '\\'))
        && !to.chars().any(char::is_control)
        && HeaderValue::from_str(to).is_ok_and(|v| v.to_str().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_length() {
        assert_eq!(validate_length("Hi", "too short"), Some("too short".to_string()));
        assert_eq!(validate_length("", "too short"), Some("too short".to_string()));
        assert_eq!(validate_length("Pun", "too short"), None);

        // counted in characters, not bytes
        assert_eq!(validate_length("éé", "too short"), Some("too short".to_string()));
    }

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(Some("/jokes/new")), "/jokes/new");
        assert_eq!(safe_redirect(Some("//evil.example")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("https://evil.example")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/\\evil.example")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/jokes\nLocation: //evil")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/jokes\r")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/\u{7f}")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/é")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(Some("/jokes?page=2")), "/jokes?page=2");
        assert_eq!(safe_redirect(Some("")), DEFAULT_REDIRECT);
        assert_eq!(safe_redirect(None), DEFAULT_REDIRECT);
    }
}
