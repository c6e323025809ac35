//! Email Helpers

use regex::Regex;
use std::sync::OnceLock;

pub use storage::normalize_email;

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\S+@\S+\.\S+$").expect("static email pattern"))
}

/// Loose email shape check used by the form (`something@host.tld`)
pub fn is_email_like(value: &str) -> bool {
    email_pattern().is_match(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_email_like() {
        assert!(is_email_like("ana@x.com"));
        assert!(is_email_like("p.arent+1@school.edu.au"));
        assert!(!is_email_like("ana@x"));
        assert!(!is_email_like("ana x@y.com"));
        assert!(!is_email_like(""));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Dup@X.com "), "dup@x.com");
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(raw in "\\PC{0,32}") {
            let once = normalize_email(&raw);
            prop_assert_eq!(normalize_email(&once), once);
        }

        #[test]
        fn generated_addresses_are_email_like(
            user in "[a-z0-9._]{1,12}",
            host in "[a-z0-9]{1,12}",
            tld in "[a-z]{2,6}",
        ) {
            let address = format!("{user}@{host}.{tld}");
            prop_assert!(is_email_like(&address));
        }
    }
}
