//! Small shared helpers.

/// Sanitize a book title for use as an attachment filename.
///
/// Keeps ASCII alphanumerics plus space, underscore, dot, and hyphen;
/// everything else becomes `_`. The result is truncated to 200
/// characters and falls back to `"book"` when empty.
pub(crate) fn sanitize_filename(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '.' | '-') {
                c
            } else {
                '_'
            }
        })
        .take(200)
        .collect();

    if sanitized.is_empty() {
        "book".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_filename("My Guide"), "My Guide");
        assert_eq!(sanitize_filename("draft_v2.final-1"), "draft_v2.final-1");
    }

    #[test]
    fn test_sanitize_replaces_unsafe_characters() {
        assert_eq!(sanitize_filename("a/b:c?d"), "a_b_c_d");
        assert_eq!(sanitize_filename("Ünïcode"), "_n_code");
    }

    #[test]
    fn test_sanitize_truncates() {
        let long = "x".repeat(300);
        assert_eq!(sanitize_filename(&long).len(), 200);
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "book");
    }
}
