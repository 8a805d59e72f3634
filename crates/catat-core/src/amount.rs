//! Indonesian shorthand amount notation
//!
//! Turns tokens like `15rb`, `1.5jt`, `15.000` or `250` into whole rupiah.
//! The grammars overlap, so they are tried in a fixed order:
//!
//! 1. million suffix (`jt`, `juta`)
//! 2. thousand suffix (`rb`, `ribu`, `k`)
//! 3. grouped thousands (`15.000`, `1.500.000`, `15,000`)
//! 4. plain digits
//! 5. decimal (`1.5`, `2,25`), rounded to a whole unit
//!
//! Every grammar is anchored, so the whole token has to match.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::ParseError;

const MILLION: i64 = 1_000_000;
const THOUSAND: i64 = 1_000;

fn million_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^([0-9]+)(?:[.,]([0-9]+))?\s*(?:juta|jt)$"))
}

fn thousand_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^([0-9]+)(?:[.,]([0-9]+))?\s*(?:ribu|rb|k)$"))
}

fn grouped() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^[0-9]{1,3}(?:[.,][0-9]{3})+$"))
}

fn plain() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^[0-9]+$"))
}

fn decimal() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"^([0-9]+)[.,]([0-9]+)$"))
}

pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("static amount pattern must compile")
}

/// Parse an amount token into whole rupiah
///
/// The token is trimmed and lowercased first. Fails with
/// [`ParseError::NotNumeric`] when no grammar consumes the whole token.
pub fn parse_amount(token: &str) -> Result<i64, ParseError> {
    let token = token.trim().to_lowercase();
    if token.is_empty() {
        return Err(ParseError::NotNumeric);
    }

    if let Some(caps) = million_suffix().captures(&token) {
        let fraction = caps.get(2).map(|m| m.as_str());
        return scaled(&caps[1], fraction, MILLION);
    }

    if let Some(caps) = thousand_suffix().captures(&token) {
        let fraction = caps.get(2).map(|m| m.as_str());
        return scaled(&caps[1], fraction, THOUSAND);
    }

    if grouped().is_match(&token) {
        return digits_only(&token);
    }

    if plain().is_match(&token) {
        return parse_digits(&token);
    }

    if let Some(caps) = decimal().captures(&token) {
        let fraction = &caps[2];
        if fraction.len() >= 3 {
            // Malformed grouping like "1234.567": treat the separator as noise
            return digits_only(&token);
        }
        return scaled(&caps[1], Some(fraction), 1);
    }

    Err(ParseError::NotNumeric)
}

/// `whole[.fraction] * multiplier`, rounded to the nearest whole unit
fn scaled(whole: &str, fraction: Option<&str>, multiplier: i64) -> Result<i64, ParseError> {
    let base = parse_digits(whole)?
        .checked_mul(multiplier)
        .ok_or(ParseError::AmountTooLarge)?;

    let fraction = match fraction {
        Some(f) if !f.is_empty() => f,
        _ => return Ok(base),
    };

    // Integer rounding, half up; digits past the 18th cannot move the result
    let fraction: String = fraction.chars().take(18).collect();
    let numerator: u128 = fraction.parse::<u128>().map_err(|_| ParseError::NotNumeric)?
        * multiplier as u128;
    let denominator = 10u128.pow(fraction.chars().count() as u32);
    let extra = ((numerator + denominator / 2) / denominator) as i64;

    base.checked_add(extra).ok_or(ParseError::AmountTooLarge)
}

fn digits_only(token: &str) -> Result<i64, ParseError> {
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    parse_digits(&digits)
}

fn parse_digits(digits: &str) -> Result<i64, ParseError> {
    if digits.is_empty() {
        return Err(ParseError::NotNumeric);
    }
    digits.parse::<i64>().map_err(|_| ParseError::AmountTooLarge)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thousand_suffixes() {
        assert_eq!(parse_amount("15rb"), Ok(15_000));
        assert_eq!(parse_amount("15ribu"), Ok(15_000));
        assert_eq!(parse_amount("15k"), Ok(15_000));
        assert_eq!(parse_amount("15 rb"), Ok(15_000));
        assert_eq!(parse_amount("15RB"), Ok(15_000));
        for n in [1_i64, 7, 25, 100, 999] {
            assert_eq!(parse_amount(&format!("{}rb", n)), Ok(n * 1_000));
            assert_eq!(parse_amount(&format!("{}k", n)), Ok(n * 1_000));
        }
    }

    #[test]
    fn test_million_suffixes() {
        assert_eq!(parse_amount("2jt"), Ok(2_000_000));
        assert_eq!(parse_amount("2 juta"), Ok(2_000_000));
        assert_eq!(parse_amount("1.5jt"), Ok(1_500_000));
        assert_eq!(parse_amount("1,25jt"), Ok(1_250_000));
        assert_eq!(parse_amount("0.75 juta"), Ok(750_000));
    }

    #[test]
    fn test_fractional_thousands() {
        assert_eq!(parse_amount("2.5rb"), Ok(2_500));
        assert_eq!(parse_amount("1,5k"), Ok(1_500));
        // Sub-rupiah remainders round to the nearest unit
        assert_eq!(parse_amount("1.2345rb"), Ok(1_235));
    }

    #[test]
    fn test_grouped_thousands() {
        assert_eq!(parse_amount("15.000"), Ok(15_000));
        assert_eq!(parse_amount("15,000"), Ok(15_000));
        assert_eq!(parse_amount("1.500.000"), Ok(1_500_000));
        assert_eq!(parse_amount("1,500,000"), Ok(1_500_000));
    }

    #[test]
    fn test_plain_digits() {
        assert_eq!(parse_amount("250"), Ok(250));
        assert_eq!(parse_amount(" 15000 "), Ok(15_000));
    }

    #[test]
    fn test_decimal_fallback() {
        assert_eq!(parse_amount("1.5"), Ok(2));
        assert_eq!(parse_amount("12,25"), Ok(12));
        assert_eq!(parse_amount("99.99"), Ok(100));
    }

    #[test]
    fn test_long_fraction_is_treated_as_grouping() {
        assert_eq!(parse_amount("1234.567"), Ok(1_234_567));
        assert_eq!(parse_amount("12.3456"), Ok(123_456));
    }

    #[test]
    fn test_not_numeric() {
        assert_eq!(parse_amount(""), Err(ParseError::NotNumeric));
        assert_eq!(parse_amount("   "), Err(ParseError::NotNumeric));
        assert_eq!(parse_amount("bakso"), Err(ParseError::NotNumeric));
        assert_eq!(parse_amount("15rbx"), Err(ParseError::NotNumeric));
        assert_eq!(parse_amount("rb"), Err(ParseError::NotNumeric));
        assert_eq!(parse_amount("1.2.3"), Err(ParseError::NotNumeric));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(
            parse_amount("99999999999999999999"),
            Err(ParseError::AmountTooLarge)
        );
        assert_eq!(
            parse_amount("9999999999999jt"),
            Err(ParseError::AmountTooLarge)
        );
    }

    #[test]
    fn test_parse_is_repeatable() {
        for token in ["15rb", "1.5jt", "15.000", "42", "1,5"] {
            assert_eq!(parse_amount(token), parse_amount(token));
        }
    }

    #[test]
    fn test_non_ascii_digits_are_not_numeric() {
        // Devanagari and Arabic-Indic digits
        assert_eq!(parse_amount("1.1११११११jt"), Err(ParseError::NotNumeric));
        assert_eq!(parse_amount("१५rb"), Err(ParseError::NotNumeric));
        assert_eq!(parse_amount("١٥"), Err(ParseError::NotNumeric));
    }
}
