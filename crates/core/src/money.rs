//! Integer-cent money helpers.
//!
//! Prices travel as `i64` cents everywhere; decimal strings only appear at
//! the edges (CSV import, email bodies).

use crate::error::CoreError;

/// Parse a decimal amount such as `"19.99"` into cents.
///
/// Accepts an optional fraction of at most two digits. Negative values,
/// signs, exponents and empty input are rejected.
pub fn parse_price_cents(input: &str) -> Result<i64, CoreError> {
    let raw = input.trim();
    let invalid = || CoreError::Validation(format!("Invalid price '{raw}'"));

    if raw.is_empty() {
        return Err(invalid());
    }

    let (whole, fraction) = match raw.split_once('.') {
        Some((w, f)) => (w, f),
        None => (raw, ""),
    };

    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > 2 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if raw.ends_with('.') {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let fraction_cents: i64 = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(fraction_cents))
        .ok_or_else(invalid)
}

/// Render cents as a plain decimal string (`1999` -> `"19.99"`).
pub fn format_cents(cents: i64) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs = cents.unsigned_abs();
    format!("{sign}{}.{:02}", abs / 100, abs % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_whole_and_fractional_amounts() {
        assert_eq!(parse_price_cents("19.99").unwrap(), 1999);
        assert_eq!(parse_price_cents("20").unwrap(), 2000);
        assert_eq!(parse_price_cents("5.5").unwrap(), 550);
        assert_eq!(parse_price_cents(" 0.05 ").unwrap(), 5);
        assert_eq!(parse_price_cents("0").unwrap(), 0);
    }

    #[test]
    fn rejects_malformed_amounts() {
        for bad in ["", "abc", "-1", "1.234", "1.", ".5", "1e3", "+2", "12,50"] {
            assert!(parse_price_cents(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn formats_cents() {
        assert_eq!(format_cents(1999), "19.99");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(-250), "-2.50");
    }
}
