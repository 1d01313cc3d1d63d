//! # Display Formatting
//!
//! Turkish number formatting for amounts: `.` groups thousands, `,` marks
//! the decimals, always two decimal places.
//!
//! ```rust
//! use kredi_core::format::format_currency;
//!
//! assert_eq!(format_currency(1_234_567.891), "1.234.567,89");
//! assert_eq!(format_currency(-50.0), "-50,00");
//! ```

/// Format an amount the way `tr-TR` locales do, with two decimals.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let rounds_to_zero = fixed.bytes().all(|b| b == b'0' || b == b'.');
    let sign = if value < 0.0 && !rounds_to_zero { "-" } else { "" };
    format!("{}{},{}", sign, grouped, fraction)
}

/// Amount followed by the currency sign, e.g. `"9.455,96 TL"`
pub fn format_lira(value: f64) -> String {
    format!("{} TL", format_currency(value))
}

/// Percentage with two decimals and a leading `%`, Turkish style: `%2,50`
pub fn format_percent(value: f64) -> String {
    format!("%{}", format_currency(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping() {
        assert_eq!(format_currency(0.0), "0,00");
        assert_eq!(format_currency(999.0), "999,00");
        assert_eq!(format_currency(1_000.0), "1.000,00");
        assert_eq!(format_currency(12_000.5), "12.000,50");
        assert_eq!(format_currency(100_000.0), "100.000,00");
        assert_eq!(format_currency(9_999_999.0), "9.999.999,00");
    }

    #[test]
    fn test_rounding() {
        assert_eq!(format_currency(9455.959662), "9.455,96");
        assert_eq!(format_currency(0.004), "0,00");
        assert_eq!(format_currency(1.999), "2,00");
    }

    #[test]
    fn test_negative_values() {
        assert_eq!(format_currency(-1_500.25), "-1.500,25");
        // rounds to zero, no negative zero
        assert_eq!(format_currency(-0.001), "0,00");
    }

    #[test]
    fn test_huge_values_are_not_truncated() {
        assert_eq!(format_currency(1e20), "100.000.000.000.000.000.000,00");
    }

    #[test]
    fn test_lira_and_percent() {
        assert_eq!(format_lira(1000.0), "1.000,00 TL");
        assert_eq!(format_percent(2.5), "%2,50");
    }
}
