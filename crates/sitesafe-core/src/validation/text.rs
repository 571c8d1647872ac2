//! Input normalization for submitted records.

/// Normalize a hard-hat number to its exact token form.
///
/// Every character outside `[A-Za-z0-9_-]` is dropped, including whitespace.
/// Visually different inputs may normalize to the same token.
pub fn normalize_hard_hat(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

/// Trim a required text field. Blank input becomes the empty string so that
/// length validation rejects it.
pub fn required_text(raw: &str) -> String {
    raw.trim().to_string()
}

/// Trim an optional text field; blank values become `None`.
pub fn optional_text(raw: Option<String>) -> Option<String> {
    raw.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hard_hat_strips_disallowed_characters() {
        assert_eq!(normalize_hard_hat(" 117 "), "117");
        assert_eq!(normalize_hard_hat("HH-42_b"), "HH-42_b");
        assert_eq!(normalize_hard_hat("HH 42/b!"), "HH42b");
        assert_eq!(normalize_hard_hat("#@!"), "");
    }

    #[test]
    fn hard_hat_normalization_is_idempotent() {
        for input in ["117", " a b-c_d ", "Ünïcödé-7", "../../etc", "", "--__--"] {
            let once = normalize_hard_hat(input);
            assert_eq!(normalize_hard_hat(&once), once);
        }
    }

    #[test]
    fn distinct_inputs_may_collide() {
        assert_eq!(normalize_hard_hat("1 17"), normalize_hard_hat("117"));
    }

    #[test]
    fn optional_text_drops_blank() {
        assert_eq!(optional_text(Some("  ".to_string())), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(optional_text(Some(" Acme ".to_string())), Some("Acme".to_string()));
    }
}
