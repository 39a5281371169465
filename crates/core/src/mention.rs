//! `@mention` token grammar and recipient resolution.
//!
//! Free text is scanned for two token shapes:
//!
//! - `@user@domain.tld` -- an email-shaped token, used as a recipient
//!   address directly.
//! - `@First Last` -- a display-name run of letters and spaces, up to
//!   [`MAX_NAME_LENGTH`] characters, terminated at end-of-input or before
//!   punctuation.
//!
//! Name tokens capture greedily across spaces, so the resolver matches
//! them against workspace member names longest-prefix-first: for the text
//! `@John Smith please`, the candidate `John Smith please` fails, then
//! `John Smith` matches the member. Unmatched names are silently dropped.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Maximum length of a display-name mention, in characters.
pub const MAX_NAME_LENGTH: usize = 48;

/// Matches `@email` or `@Name Run` tokens. The email alternative comes
/// first so `@jane@co.com` is not half-consumed by the name arm.
const MENTION_PATTERN: &str =
    r"@([A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,})|@([A-Za-z][A-Za-z ]{0,47})";

/// Compiled mention regex. Compiled once, reused forever.
static MENTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(MENTION_PATTERN).expect("valid regex"));

/// A raw mention token scanned out of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionToken {
    /// `@user@domain.tld` -- treated directly as a recipient address.
    Email(String),
    /// `@Display Name` -- resolved against the workspace member list.
    Name(String),
}

/// A workspace member the resolver can match name tokens against.
#[derive(Debug, Clone)]
pub struct MentionTarget {
    pub name: String,
    pub email: String,
}

/// Scan free text for mention tokens, in order of appearance.
pub fn parse_mentions(text: &str) -> Vec<MentionToken> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|cap| {
            if let Some(email) = cap.get(1) {
                Some(MentionToken::Email(email.as_str().to_string()))
            } else {
                let name = cap.get(2)?.as_str().trim().to_string();
                if name.is_empty() {
                    None
                } else {
                    Some(MentionToken::Name(name))
                }
            }
        })
        .collect()
}

/// Resolve parsed tokens to recipient email addresses.
///
/// Email tokens pass through as-is. Name tokens are matched against member
/// display names case-insensitively, dropping trailing words until a
/// member matches or nothing is left. Recipients are deduplicated
/// case-insensitively, and the author is excluded so nobody is notified
/// about mentioning themselves.
pub fn resolve_recipients(
    tokens: &[MentionToken],
    members: &[MentionTarget],
    author_email: &str,
) -> Vec<String> {
    let author = author_email.to_lowercase();
    let mut seen: HashSet<String> = HashSet::new();
    let mut recipients = Vec::new();

    for token in tokens {
        let email = match token {
            MentionToken::Email(email) => Some(email.clone()),
            MentionToken::Name(name) => resolve_name(name, members),
        };
        let Some(email) = email else { continue };

        let key = email.to_lowercase();
        if key == author || !seen.insert(key) {
            continue;
        }
        recipients.push(email);
    }

    recipients
}

/// Match a captured name run against member names, longest prefix first.
fn resolve_name(raw: &str, members: &[MentionTarget]) -> Option<String> {
    let mut words: Vec<&str> = raw.split_whitespace().collect();
    while !words.is_empty() {
        let candidate = words.join(" ").to_lowercase();
        if let Some(member) = members
            .iter()
            .find(|m| m.name.to_lowercase() == candidate)
        {
            return Some(member.email.clone());
        }
        words.pop();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> Vec<MentionTarget> {
        vec![
            MentionTarget {
                name: "John Smith".to_string(),
                email: "john@co.com".to_string(),
            },
            MentionTarget {
                name: "Jane Doe".to_string(),
                email: "jane@co.com".to_string(),
            },
        ]
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parses_email_token() {
        let tokens = parse_mentions("ping @jane@co.com about this");
        assert_eq!(tokens[0], MentionToken::Email("jane@co.com".to_string()));
    }

    #[test]
    fn parses_name_token_across_spaces() {
        let tokens = parse_mentions("cc @John Smith");
        assert_eq!(tokens, vec![MentionToken::Name("John Smith".to_string())]);
    }

    #[test]
    fn name_terminates_at_punctuation() {
        let tokens = parse_mentions("thanks @John Smith, appreciated");
        assert_eq!(tokens, vec![MentionToken::Name("John Smith".to_string())]);
    }

    #[test]
    fn name_capture_is_capped() {
        let long = format!("@{}", "a".repeat(100));
        let tokens = parse_mentions(&long);
        match &tokens[0] {
            MentionToken::Name(name) => assert_eq!(name.len(), MAX_NAME_LENGTH),
            other => panic!("expected name token, got {other:?}"),
        }
    }

    #[test]
    fn text_without_mentions_yields_nothing() {
        assert!(parse_mentions("no at-signs here").is_empty());
        assert!(parse_mentions("").is_empty());
    }

    #[test]
    fn multiple_tokens_in_order() {
        let tokens = parse_mentions("@jane@co.com and @John Smith please");
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0], MentionToken::Email("jane@co.com".to_string()));
        assert_eq!(
            tokens[1],
            MentionToken::Name("John Smith please".to_string())
        );
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    #[test]
    fn resolves_email_and_name_recipients() {
        let tokens = parse_mentions("ping @jane@co.com and @John Smith please");
        let recipients = resolve_recipients(&tokens, &members(), "author@co.com");
        assert_eq!(recipients, vec!["jane@co.com", "john@co.com"]);
    }

    #[test]
    fn name_resolution_is_case_insensitive() {
        let tokens = parse_mentions("cc @john smith");
        let recipients = resolve_recipients(&tokens, &members(), "author@co.com");
        assert_eq!(recipients, vec!["john@co.com"]);
    }

    #[test]
    fn unmatched_name_is_dropped() {
        let tokens = parse_mentions("cc @Nobody Here");
        let recipients = resolve_recipients(&tokens, &members(), "author@co.com");
        assert!(recipients.is_empty());
    }

    #[test]
    fn author_self_mention_is_excluded() {
        let tokens = parse_mentions("note to self @jane@co.com");
        let recipients = resolve_recipients(&tokens, &members(), "Jane@Co.Com");
        assert!(recipients.is_empty());
    }

    #[test]
    fn recipients_are_deduplicated_case_insensitively() {
        let tokens = parse_mentions("@jane@co.com again @Jane Doe and @JANE@CO.COM");
        let recipients = resolve_recipients(&tokens, &members(), "author@co.com");
        assert_eq!(recipients, vec!["jane@co.com"]);
    }
}
