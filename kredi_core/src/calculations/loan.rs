//! # Loan Cost Calculator
//!
//! Fixed-payment (annuity) loan pricing with a month-by-month amortization
//! schedule and a flat BSMV/KKDF surcharge on total interest.
//!
//! ## Model
//!
//! - Monthly payment: `P · r(1+r)ⁿ / ((1+r)ⁿ − 1)` with `r = rate% / 100`,
//!   or `P / n` when the rate is zero. Evaluated as `P · r / (1 − (1+r)⁻ⁿ)`
//!   so long terms stay finite.
//! - Schedule: interest on the running balance, principal is the payment
//!   minus interest. The last month pays off whatever balance is left, so
//!   the final remaining balance is exactly zero.
//! - Taxes: `total_interest · (bsmv + kkdf)`, added once on top of the
//!   total. Taxes are not spread over the schedule.
//!
//! Term 0, a term above [`MAX_TERM_MONTHS`] or a non-positive principal is
//! not an error: every figure comes back as zero so half-typed form input
//! never breaks a page.
//!
//! ## Example
//!
//! ```rust
//! use kredi_core::calculations::loan::{calculate, LoanInput};
//! use kredi_core::taxes::TaxRates;
//!
//! let input = LoanInput {
//!     principal: 100_000.0,
//!     monthly_rate_percent: 2.0,
//!     term_months: 12,
//!     taxes: TaxRates::new(0.15, 0.15),
//! };
//!
//! let quote = calculate(&input);
//! assert!((quote.monthly_payment - 9455.96).abs() < 0.01);
//! assert_eq!(quote.schedule.len(), 12);
//! assert_eq!(quote.schedule.last().unwrap().remaining_balance, 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{KrediError, KrediResult};
use crate::taxes::TaxRates;

/// Longest term accepted, in months (50 years)
pub const MAX_TERM_MONTHS: u32 = 600;

/// Input parameters for a loan quote.
///
/// ## JSON Example
///
/// ```json
/// {
///   "principal": 250000.0,
///   "monthly_rate_percent": 3.29,
///   "term_months": 36,
///   "taxes": { "bsmv": 0.15, "kkdf": 0.15 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanInput {
    /// Requested amount in TL
    pub principal: f64,

    /// Bank-quoted monthly interest rate as a percentage (2.5 = 2.5%)
    pub monthly_rate_percent: f64,

    /// Number of monthly installments
    pub term_months: u32,

    /// BSMV/KKDF rates applied to total interest
    #[serde(default)]
    pub taxes: TaxRates,
}

impl LoanInput {
    /// Validate user-supplied values before quoting.
    ///
    /// `calculate` accepts anything and degrades to zeros; this is for
    /// callers that want to reject bad input with a message instead.
    pub fn validate(&self) -> KrediResult<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(KrediError::invalid_input(
                "principal",
                self.principal.to_string(),
                "Amount must be a positive number",
            ));
        }
        if self.term_months == 0 {
            return Err(KrediError::invalid_input(
                "term_months",
                "0",
                "Term must be at least one month",
            ));
        }
        if self.term_months > MAX_TERM_MONTHS {
            return Err(KrediError::invalid_input(
                "term_months",
                self.term_months.to_string(),
                format!("Term must be at most {} months", MAX_TERM_MONTHS),
            ));
        }
        if !self.monthly_rate_percent.is_finite() || self.monthly_rate_percent < 0.0 {
            return Err(KrediError::invalid_input(
                "monthly_rate_percent",
                self.monthly_rate_percent.to_string(),
                "Rate must be zero or a positive percentage",
            ));
        }
        self.taxes.validate()
    }

    fn is_degenerate(&self) -> bool {
        is_degenerate(self.principal, self.term_months)
    }
}

fn is_degenerate(principal: f64, term_months: u32) -> bool {
    term_months == 0 || term_months > MAX_TERM_MONTHS || principal <= 0.0
}

/// One month of the amortization schedule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Installment number, starting at 1
    pub month: u32,
    /// Principal repaid this month
    pub principal: f64,
    /// Interest charged this month
    pub interest: f64,
    /// Balance left after this installment
    pub remaining_balance: f64,
}

/// Interest, tax and grand totals derived from a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoanTotals {
    pub total_interest: f64,
    pub total_taxes: f64,
    pub total_payment: f64,
}

/// A fully priced loan. Computed on demand and never stored.
///
/// ## JSON Example
///
/// ```json
/// {
///   "principal": 12000.0,
///   "monthly_rate_percent": 0.0,
///   "term_months": 12,
///   "taxes": { "bsmv": 0.15, "kkdf": 0.15 },
///   "monthly_payment": 1000.0,
///   "monthly_payment_with_taxes": 1000.0,
///   "total_principal_interest_payment": 12000.0,
///   "total_interest": 0.0,
///   "total_taxes": 0.0,
///   "total_payment": 12000.0,
///   "schedule": [ { "month": 1, "principal": 1000.0, "interest": 0.0, "remaining_balance": 11000.0 } ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanQuote {
    // === Inputs ===
    pub principal: f64,
    pub monthly_rate_percent: f64,
    pub term_months: u32,
    pub taxes: TaxRates,

    // === Installments ===
    /// Principal + interest installment
    pub monthly_payment: f64,

    /// `total_payment / term_months`, the per-month figure shown on listings
    pub monthly_payment_with_taxes: f64,

    // === Totals ===
    /// `monthly_payment * term_months`
    pub total_principal_interest_payment: f64,

    /// Sum of the schedule's interest components
    pub total_interest: f64,

    /// `total_interest * (bsmv + kkdf)`
    pub total_taxes: f64,

    /// `principal + total_interest + total_taxes`
    pub total_payment: f64,

    /// Month-by-month breakdown
    pub schedule: Vec<ScheduleEntry>,
}

impl LoanQuote {
    fn zero(input: &LoanInput) -> Self {
        LoanQuote {
            principal: input.principal,
            monthly_rate_percent: input.monthly_rate_percent,
            term_months: input.term_months,
            taxes: input.taxes,
            monthly_payment: 0.0,
            monthly_payment_with_taxes: 0.0,
            total_principal_interest_payment: 0.0,
            total_interest: 0.0,
            total_taxes: 0.0,
            total_payment: 0.0,
            schedule: Vec::new(),
        }
    }

    /// Cost composition for charts: principal, interest, taxes.
    pub fn cost_breakdown(&self) -> [(&'static str, f64); 3] {
        [
            ("Ana Para", self.principal),
            ("Faiz", self.total_interest),
            ("Vergiler (BSMV+KKDF)", self.total_taxes),
        ]
    }

    /// Interest plus taxes, i.e. everything paid beyond the principal
    pub fn total_cost(&self) -> f64 {
        self.total_interest + self.total_taxes
    }
}

/// Fixed monthly installment for an amortizing loan.
///
/// Returns `0.0` for a zero term or a non-positive principal. A zero rate
/// gives straight-line repayment `principal / term_months`.
///
/// # Example
///
/// ```rust
/// use kredi_core::calculations::loan::compute_monthly_payment;
///
/// assert_eq!(compute_monthly_payment(12_000.0, 0.0, 12), 1000.0);
/// assert_eq!(compute_monthly_payment(12_000.0, 2.0, 0), 0.0);
/// ```
pub fn compute_monthly_payment(principal: f64, monthly_rate_percent: f64, term_months: u32) -> f64 {
    if term_months == 0 || principal <= 0.0 {
        return 0.0;
    }

    let n = f64::from(term_months);
    let r = monthly_rate_percent / 100.0;
    if r == 0.0 {
        return principal / n;
    }

    // discounted form: (1+r)^-n underflows to 0 instead of overflowing
    let discount = (1.0 + r).powf(-n);
    principal * r / (1.0 - discount)
}

/// Month-by-month split of each installment into principal and interest.
///
/// The final month's principal is forced to the remaining balance, which
/// makes its `remaining_balance` exactly zero and the principal parts sum
/// back to `principal`. Degenerate inputs (including terms above
/// [`MAX_TERM_MONTHS`]) give an empty schedule.
pub fn build_amortization_schedule(principal: f64, monthly_rate_percent: f64, term_months: u32) -> Vec<ScheduleEntry> {
    if is_degenerate(principal, term_months) {
        return Vec::new();
    }

    let payment = compute_monthly_payment(principal, monthly_rate_percent, term_months);
    let r = monthly_rate_percent / 100.0;

    let mut schedule = Vec::with_capacity(term_months as usize);
    let mut balance = principal;

    for month in 1..=term_months {
        let interest = balance * r;

        let mut principal_part = if month == term_months {
            balance
        } else {
            payment - interest
        };

        // fp drift near the end can overshoot the balance
        if principal_part > balance {
            principal_part = balance;
        }

        let new_balance = balance - principal_part;

        schedule.push(ScheduleEntry {
            month,
            principal: principal_part,
            interest,
            remaining_balance: if new_balance > 0.0 { new_balance } else { 0.0 },
        });

        balance = new_balance;
    }

    schedule
}

/// Total interest of a schedule plus the flat BSMV/KKDF surcharge.
pub fn apply_taxes_and_totals(schedule: &[ScheduleEntry], principal: f64, taxes: TaxRates) -> LoanTotals {
    let total_interest: f64 = schedule.iter().map(|entry| entry.interest).sum();
    let total_taxes = total_interest * taxes.combined();

    LoanTotals {
        total_interest,
        total_taxes,
        total_payment: principal + total_interest + total_taxes,
    }
}

/// Price a loan: installment, schedule and tax-adjusted totals.
///
/// This never fails. Use [`LoanInput::validate`] first if bad input should
/// be reported rather than quoted as zeros.
pub fn calculate(input: &LoanInput) -> LoanQuote {
    if input.is_degenerate() {
        return LoanQuote::zero(input);
    }

    let monthly_payment = compute_monthly_payment(input.principal, input.monthly_rate_percent, input.term_months);
    let schedule = build_amortization_schedule(input.principal, input.monthly_rate_percent, input.term_months);
    let totals = apply_taxes_and_totals(&schedule, input.principal, input.taxes);
    let n = f64::from(input.term_months);

    LoanQuote {
        principal: input.principal,
        monthly_rate_percent: input.monthly_rate_percent,
        term_months: input.term_months,
        taxes: input.taxes,
        monthly_payment,
        monthly_payment_with_taxes: totals.total_payment / n,
        total_principal_interest_payment: monthly_payment * n,
        total_interest: totals.total_interest,
        total_taxes: totals.total_taxes,
        total_payment: totals.total_payment,
        schedule,
    }
}
