//! Split a free-text entry into description and amount
//!
//! `"bakso 15rb"`, `"15rb bakso"` and `"beli bakso 15.000 tadi"` all
//! become `{ description: "bakso…", amount: 15000 }`. The amount token may
//! sit anywhere in the entry.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::amount::{compile, parse_amount};
use crate::error::ParseError;
use crate::models::ParsedInput;

/// Token extractors in priority order. The first extractor with any match
/// wins, and its leftmost match is taken as the amount.
fn extractors() -> &'static [Regex; 4] {
    static RE: OnceLock<[Regex; 4]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            // Suffix must end the word: "15 kopi" is not "15k"
            compile(r"(?i)[0-9]+(?:[.,][0-9]+)?\s*(?:juta|jt)\b"),
            compile(r"(?i)[0-9]+(?:[.,][0-9]+)?\s*(?:ribu|rb|k)\b"),
            compile(r"[0-9]{1,3}(?:[.,][0-9]{3})+"),
            // Bare digits need two or more and whole-word boundaries
            compile(r"\b[0-9]{2,}\b"),
        ]
    })
}

/// Characters trimmed off both ends of the description
fn is_edge_punctuation(c: char) -> bool {
    matches!(c, ',' | '.' | '-' | ':') || c.is_whitespace()
}

/// Split an entry, reporting why it failed
pub fn try_split_input(raw: &str) -> Result<ParsedInput, ParseError> {
    let token = extractors()
        .iter()
        .find_map(|re| re.find(raw))
        .ok_or(ParseError::NoAmountFound)?;

    let amount = parse_amount(token.as_str())?;

    let remainder = format!("{} {}", &raw[..token.start()], &raw[token.end()..]);
    let description = remainder
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(is_edge_punctuation)
        .to_string();

    if description.is_empty() {
        return Err(ParseError::EmptyDescription);
    }
    if amount <= 0 {
        return Err(ParseError::NonPositiveAmount);
    }

    debug!(
        token = token.as_str(),
        amount, description = %description, "Split entry"
    );

    Ok(ParsedInput {
        description,
        amount,
    })
}

/// Split an entry into description and amount
///
/// Returns `None` when no amount is present, the amount is not positive,
/// or nothing is left to describe the transaction.
pub fn split_input(raw: &str) -> Option<ParsedInput> {
    try_split_input(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(description: &str, amount: i64) -> Option<ParsedInput> {
        Some(ParsedInput {
            description: description.to_string(),
            amount,
        })
    }

    #[test]
    fn test_amount_after_description() {
        assert_eq!(split_input("bakso 15rb"), parsed("bakso", 15_000));
    }

    #[test]
    fn test_amount_before_description() {
        assert_eq!(split_input("15rb bakso"), parsed("bakso", 15_000));
    }

    #[test]
    fn test_amount_in_the_middle() {
        assert_eq!(
            split_input("beli bensin 50rb di pom"),
            parsed("beli bensin di pom", 50_000)
        );
    }

    #[test]
    fn test_million_suffix_wins_over_bare_digits() {
        assert_eq!(
            split_input("servis motor 2024 1.5jt"),
            parsed("servis motor 2024", 1_500_000)
        );
    }

    #[test]
    fn test_grouped_thousands() {
        assert_eq!(split_input("makan siang 25.000"), parsed("makan siang", 25_000));
        assert_eq!(split_input("listrik 1.250.000"), parsed("listrik", 1_250_000));
    }

    #[test]
    fn test_bare_digits() {
        assert_eq!(split_input("parkir 5000"), parsed("parkir", 5_000));
    }

    #[test]
    fn test_single_digit_is_not_an_amount() {
        assert_eq!(
            try_split_input("kopi 2 gelas"),
            Err(ParseError::NoAmountFound)
        );
    }

    #[test]
    fn test_digits_inside_words_are_ignored() {
        assert_eq!(
            try_split_input("pulsa xl4g"),
            Err(ParseError::NoAmountFound)
        );
    }

    #[test]
    fn test_suffix_must_end_the_word() {
        // "2 kopi" must not be read as 2k
        assert_eq!(split_input("2 kopi 30rb"), parsed("2 kopi", 30_000));
    }

    #[test]
    fn test_case_insensitive_suffix() {
        assert_eq!(split_input("Gaji 5JT"), parsed("Gaji", 5_000_000));
    }

    #[test]
    fn test_edge_punctuation_is_stripped() {
        assert_eq!(split_input("bakso, 15rb"), parsed("bakso", 15_000));
        assert_eq!(split_input("15rb - bakso"), parsed("bakso", 15_000));
        assert_eq!(split_input("bakso: 15rb."), parsed("bakso", 15_000));
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        assert_eq!(
            split_input("  nasi   15rb   goreng  "),
            parsed("nasi goreng", 15_000)
        );
    }

    #[test]
    fn test_no_amount() {
        assert_eq!(split_input("bakso enak"), None);
        assert_eq!(try_split_input("bakso enak"), Err(ParseError::NoAmountFound));
    }

    #[test]
    fn test_amount_only() {
        assert_eq!(split_input("15rb"), None);
        assert_eq!(try_split_input("15rb"), Err(ParseError::EmptyDescription));
        assert_eq!(try_split_input("  15rb .  "), Err(ParseError::EmptyDescription));
    }

    #[test]
    fn test_zero_amount() {
        assert_eq!(
            try_split_input("kopi 00"),
            Err(ParseError::NonPositiveAmount)
        );
        assert_eq!(try_split_input("kopi 0rb"), Err(ParseError::NonPositiveAmount));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(try_split_input(""), Err(ParseError::NoAmountFound));
    }

    #[test]
    fn test_non_ascii_digits_are_not_amounts() {
        assert_eq!(
            try_split_input("kopi 1.1११११११jt"),
            Err(ParseError::NoAmountFound)
        );
        assert_eq!(try_split_input("kopi ١٥"), Err(ParseError::NoAmountFound));
        assert_eq!(split_input("kopi ١٥"), None);
    }
}
