//! # Form Input Parsing
//!
//! Amount and term fields arrive as free text ("250.000", "36 ay"). These
//! helpers turn them into numbers or an error carrying the message the
//! site shows to visitors.

use crate::calculations::loan::MAX_TERM_MONTHS;
use crate::errors::{KrediError, KrediResult};

/// Message shown when the amount or term cannot be used
pub const INVALID_REQUEST_MESSAGE: &str = "Lütfen geçerli bir kredi tutarı ve vade girin.";

/// Parse a TL amount typed by a visitor.
///
/// Everything but ASCII digits is dropped, so thousands separators and a
/// trailing "TL" are fine. Kuruş are not supported: "1.500,50" reads as
/// 150050.
///
/// ```rust
/// use kredi_core::input::parse_amount;
///
/// assert_eq!(parse_amount("250.000 TL").unwrap(), 250_000.0);
/// assert!(parse_amount("abc").is_err());
/// ```
pub fn parse_amount(raw: &str) -> KrediResult<f64> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let amount: f64 = digits
        .parse()
        .map_err(|_| KrediError::invalid_input("amount", raw, INVALID_REQUEST_MESSAGE))?;

    if !amount.is_finite() || amount <= 0.0 {
        return Err(KrediError::invalid_input("amount", raw, INVALID_REQUEST_MESSAGE));
    }
    Ok(amount)
}

/// Parse a term in months, between 1 and [`MAX_TERM_MONTHS`]. Leading and
/// trailing whitespace and a trailing unit word ("36 ay") are accepted.
pub fn parse_term(raw: &str) -> KrediResult<u32> {
    let leading = raw.split_whitespace().next().unwrap_or_default();

    match leading.parse::<u32>() {
        Ok(term) if (1..=MAX_TERM_MONTHS).contains(&term) => Ok(term),
        _ => Err(KrediError::invalid_input("term_months", raw, INVALID_REQUEST_MESSAGE)),
    }
}

/// Parse both fields of a loan search form.
pub fn parse_request(amount: &str, term: &str) -> KrediResult<(f64, u32)> {
    Ok((parse_amount(amount)?, parse_term(term)?))
}
