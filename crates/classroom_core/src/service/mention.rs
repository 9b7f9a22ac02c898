//! Mention grammar for notification text.
//!
//! A mention is a literal `@` immediately followed by a token of the shape
//! `<non-whitespace>@<non-whitespace>.<non-whitespace>`. The token (without the
//! leading marker) is the candidate email:
//!
//! ```text
//! "Hello @s1@student.com and @s2@student.com"  -> ["s1@student.com", "s2@student.com"]
//! "Hello @student.com"                         -> []
//! "Hello @ s1@student.com"                     -> []
//! ```
//!
//! Clients rely on this exact shape, trailing punctuation included.

use crate::model::user::normalize_email;
use once_cell::sync::Lazy;
use regex::Regex;

static MENTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(\S+@\S+\.\S+)").expect("valid mention regex"));

/// Extracts normalized candidate emails in order of appearance.
///
/// Duplicates are kept; callers treat the result as a set.
pub fn extract_mentions(text: &str) -> Vec<String> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| normalize_email(m.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::extract_mentions;

    #[test]
    fn extracts_marked_tokens_and_lowercases() {
        assert_eq!(
            extract_mentions("Hello @S1@Student.com and @s2@student.com"),
            vec!["s1@student.com".to_string(), "s2@student.com".to_string()]
        );
    }

    #[test]
    fn ignores_tokens_without_full_shape() {
        assert!(extract_mentions("Hello @student.com").is_empty());
        assert!(extract_mentions("Hello @ s1@student.com").is_empty());
        assert!(extract_mentions("mail s1@student.com directly").is_empty());
        assert!(extract_mentions("@s1@student").is_empty());
    }

    #[test]
    fn keeps_trailing_punctuation_inside_token() {
        assert_eq!(
            extract_mentions("hi @s1@student.com, bye"),
            vec!["s1@student.com,".to_string()]
        );
    }

    #[test]
    fn mention_at_start_and_newline_separated() {
        assert_eq!(
            extract_mentions("@a@x.io\n@b@y.io"),
            vec!["a@x.io".to_string(), "b@y.io".to_string()]
        );
    }
}
