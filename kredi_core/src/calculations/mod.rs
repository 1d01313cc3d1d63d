//! # Calculations
//!
//! Each calculation follows the same pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable)
//! - `*Result` / `*Quote` - Calculation results (JSON-serializable)
//! - `calculate(input)` - Pure calculation function
//!
//! ## Available Calculations
//!
//! - [`loan`] - Annuity loan pricing with amortization schedule and BSMV/KKDF
//! - [`deposit`] - Time deposit return with withholding tax
//! - [`comparison`] - Quote every catalog product for one loan request

pub mod comparison;
pub mod deposit;
pub mod loan;

// Re-export commonly used types
pub use comparison::{compare_loans, LoanOffer, OfferRequest};
pub use deposit::{rank_deposits, DepositInput, DepositOffer, DepositResult};
pub use loan::{
    apply_taxes_and_totals, build_amortization_schedule, compute_monthly_payment, LoanInput, LoanQuote,
    LoanTotals, ScheduleEntry,
};
