//! Header canonicalization.

/// Canonical form of a header for comparison.
///
/// Lower-cases, drops every character that is not a letter, digit or
/// whitespace, collapses whitespace runs to one space and trims. Total:
/// any input, including the empty string, yields a (possibly empty) string.
pub fn normalize_header(header: &str) -> String {
    let kept: String = header
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();

    kept.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowercases_and_trims() {
        assert_eq!(normalize_header("  Email Address "), "email address");
    }

    #[test]
    fn test_strips_punctuation_without_inserting_space() {
        assert_eq!(normalize_header("full_name"), "fullname");
        assert_eq!(normalize_header("Created (UTC)"), "created utc");
        assert_eq!(normalize_header("Ticket #"), "ticket");
        assert_eq!(normalize_header("e-mail"), "email");
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(normalize_header("Start \t Date  &  Time"), "start date time");
    }

    #[test]
    fn test_empty_and_symbol_only() {
        assert_eq!(normalize_header(""), "");
        assert_eq!(normalize_header("#$%"), "");
        assert_eq!(normalize_header("   "), "");
    }

    #[test]
    fn test_keeps_non_ascii_letters() {
        assert_eq!(normalize_header("Montant Payé"), "montant payé");
    }

    #[test]
    fn test_idempotent() {
        let once = normalize_header(" Amount (USD) - Net ");
        assert_eq!(normalize_header(&once), once);
    }
}
