//! Placeholder token grammar.
//!
//! A placeholder is any `{{...}}` run inside a text field. The inner text is
//! the variable name verbatim: all ASCII digits makes it positional, anything
//! else makes it named. Unterminated or empty braces never match.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{([^}]+)\}\}").expect("placeholder pattern is valid");
}

/// How a placeholder is addressed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// `{{1}}`, `{{2}}`, ... addressed by position
    Positional,
    /// `{{first_name}}` addressed by `parameter_name`
    Named,
}

/// A single `{{name}}` occurrence borrowed from its source text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    name: &'a str,
    raw: &'a str,
}

impl<'a> Placeholder<'a> {
    /// Inner text between the braces
    pub fn name(&self) -> &'a str {
        self.name
    }

    /// The full token including braces, e.g. `{{1}}`
    pub fn raw(&self) -> &'a str {
        self.raw
    }

    pub fn kind(&self) -> TokenKind {
        if self.name.bytes().all(|b| b.is_ascii_digit()) {
            TokenKind::Positional
        } else {
            TokenKind::Named
        }
    }

    /// Name to send as `parameter_name`; positional tokens never carry one.
    pub fn parameter_name(&self) -> Option<&'a str> {
        match self.kind() {
            TokenKind::Positional => None,
            TokenKind::Named => Some(self.name),
        }
    }

    /// 1-based position for positional tokens.
    pub fn position(&self) -> Option<usize> {
        match self.kind() {
            TokenKind::Positional => self.name.parse().ok(),
            TokenKind::Named => None,
        }
    }
}

fn scan(text: &str) -> impl Iterator<Item = Placeholder<'_>> {
    PLACEHOLDER.captures_iter(text).filter_map(|caps| {
        let raw = caps.get(0)?.as_str();
        let name = caps.get(1)?.as_str();
        Some(Placeholder { name, raw })
    })
}

/// Distinct placeholders of a field in first-occurrence order.
pub fn placeholders(text: &str) -> Vec<Placeholder<'_>> {
    let mut found: Vec<Placeholder<'_>> = Vec::new();
    for token in scan(text) {
        if !found.iter().any(|seen| seen.name == token.name) {
            found.push(token);
        }
    }
    found
}

/// The first placeholder of a field, if any.
pub fn first_placeholder(text: &str) -> Option<Placeholder<'_>> {
    scan(text).next()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_and_named() {
        let tokens = placeholders("Hello {{1}}, meet {{friend_name}}.");
        assert_eq!(tokens.len(), 2);

        assert_eq!(tokens[0].name(), "1");
        assert_eq!(tokens[0].raw(), "{{1}}");
        assert_eq!(tokens[0].kind(), TokenKind::Positional);
        assert_eq!(tokens[0].parameter_name(), None);
        assert_eq!(tokens[0].position(), Some(1));

        assert_eq!(tokens[1].name(), "friend_name");
        assert_eq!(tokens[1].kind(), TokenKind::Named);
        assert_eq!(tokens[1].parameter_name(), Some("friend_name"));
        assert_eq!(tokens[1].position(), None);
    }

    #[test]
    fn test_first_occurrence_order_and_dedup() {
        let tokens = placeholders("{{2}} then {{1}} then {{2}} again");
        let names: Vec<_> = tokens.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["2", "1"]);
    }

    #[test]
    fn test_malformed_braces_are_ignored() {
        assert!(placeholders("no tokens here").is_empty());
        assert!(placeholders("broken {{name").is_empty());
        assert!(placeholders("broken name}}").is_empty());
        assert!(placeholders("empty {{}} braces").is_empty());
        assert!(placeholders("single {name} braces").is_empty());
    }

    #[test]
    fn test_mixed_digits_are_named() {
        let tokens = placeholders("{{1a}} {{ 1}}");
        assert!(tokens.iter().all(|t| t.kind() == TokenKind::Named));
    }

    #[test]
    fn test_first_placeholder() {
        let first = first_placeholder("https://shop.example/{{order}}/{{2}}").unwrap();
        assert_eq!(first.name(), "order");
        assert!(first_placeholder("https://shop.example/static").is_none());
    }
}
