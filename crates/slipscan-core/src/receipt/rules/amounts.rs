//! Amount parsing and display.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

/// Parse a captured amount such as `"2,080.00"`.
///
/// Thousands separators are dropped and the longest leading numeric prefix
/// is used, so `"2080.00PHP"` still parses. Returns `None` when no digits
/// lead the value.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();

    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in cleaned.char_indices() {
        match c {
            '-' | '+' if i == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return None;
    }

    let number = cleaned[..end].trim_end_matches('.');
    let number = number.strip_prefix('+').unwrap_or(number);
    let number = if number.starts_with('.') {
        format!("0{}", number)
    } else if number.starts_with("-.") {
        format!("-0{}", &number[1..])
    } else {
        number.to_string()
    };

    Decimal::from_str(&number).ok()
}

/// Format an amount with two decimals and thousands separators.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, frac) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("2,080.00"), Some(dec("2080.00")));
        assert_eq!(parse_amount(" 999 "), Some(dec("999")));
        assert_eq!(parse_amount("2080.00PHP"), Some(dec("2080.00")));
        assert_eq!(parse_amount("150."), Some(dec("150")));
        assert_eq!(parse_amount(".50"), Some(dec("0.50")));
    }

    #[test]
    fn test_parse_amount_without_digits() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount(","), None);
        assert_eq!(parse_amount("PHP"), None);
        assert_eq!(parse_amount("."), None);
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(dec("2080")), "2,080.00");
        assert_eq!(format_amount(dec("1234567.891")), "1,234,567.89");
        assert_eq!(format_amount(dec("-50.5")), "-50.50");
        assert_eq!(format_amount(dec("0")), "0.00");
    }
}
