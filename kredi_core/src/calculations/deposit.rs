//! # Time Deposit Return
//!
//! Simple-interest return on a time deposit, with the withholding tax
//! (stopaj) banks deduct from interest before paying it out.
//!
//! ```text
//! gross interest = principal × rate/100 × days/365
//! withholding    = gross interest × stopaj/100
//! net interest   = gross interest − withholding
//! ```
//!
//! ## Example
//!
//! ```rust
//! use kredi_core::calculations::deposit::{calculate, DepositInput};
//!
//! let input = DepositInput::new(100_000.0, 36.5, 365);
//! let result = calculate(&input);
//! assert!((result.gross_interest - 36_500.0).abs() < 1e-6);
//! assert!((result.net_interest - 34_675.0).abs() < 1e-6);
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::errors::{KrediError, KrediResult};
use crate::products::Currency;

/// Day-count basis for deposit interest
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Default withholding tax on deposit interest, in percent
pub const DEFAULT_WITHHOLDING_PERCENT: f64 = 5.0;

/// Input parameters for a deposit return calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositInput {
    /// Amount deposited
    pub principal: f64,

    /// Annual gross rate as a percentage
    pub annual_rate_percent: f64,

    /// Deposit term in days
    pub term_days: u32,

    /// Withholding tax in percent (5.0 = 5%)
    #[serde(default = "default_withholding")]
    pub withholding_percent: f64,
}

fn default_withholding() -> f64 {
    DEFAULT_WITHHOLDING_PERCENT
}

impl DepositInput {
    pub fn new(principal: f64, annual_rate_percent: f64, term_days: u32) -> Self {
        DepositInput {
            principal,
            annual_rate_percent,
            term_days,
            withholding_percent: DEFAULT_WITHHOLDING_PERCENT,
        }
    }

    pub fn with_withholding(mut self, withholding_percent: f64) -> Self {
        self.withholding_percent = withholding_percent;
        self
    }

    pub fn validate(&self) -> KrediResult<()> {
        if !self.principal.is_finite() || self.principal <= 0.0 {
            return Err(KrediError::invalid_input(
                "principal",
                self.principal.to_string(),
                "Amount must be a positive number",
            ));
        }
        if self.term_days == 0 {
            return Err(KrediError::invalid_input("term_days", "0", "Term must be at least one day"));
        }
        if !self.annual_rate_percent.is_finite() || self.annual_rate_percent < 0.0 {
            return Err(KrediError::invalid_input(
                "annual_rate_percent",
                self.annual_rate_percent.to_string(),
                "Rate must be zero or a positive percentage",
            ));
        }
        if !(0.0..=100.0).contains(&self.withholding_percent) {
            return Err(KrediError::invalid_input(
                "withholding_percent",
                self.withholding_percent.to_string(),
                "Withholding must be between 0 and 100 percent",
            ));
        }
        Ok(())
    }
}

/// Deposit return figures.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DepositResult {
    pub gross_interest: f64,
    pub withholding_tax: f64,
    pub net_interest: f64,
    /// Principal plus gross interest
    pub total_amount: f64,
    /// Principal plus net interest, what actually lands in the account
    pub net_total: f64,
}

/// Compute a deposit's return. Degenerate inputs give zero interest.
pub fn calculate(input: &DepositInput) -> DepositResult {
    if input.principal <= 0.0 || input.term_days == 0 {
        return DepositResult {
            total_amount: input.principal.max(0.0),
            net_total: input.principal.max(0.0),
            ..DepositResult::default()
        };
    }

    let gross_interest =
        input.principal * (input.annual_rate_percent / 100.0) * (f64::from(input.term_days) / DAYS_PER_YEAR);
    let withholding_tax = gross_interest * input.withholding_percent / 100.0;
    let net_interest = gross_interest - withholding_tax;

    DepositResult {
        gross_interest,
        withholding_tax,
        net_interest,
        total_amount: input.principal + gross_interest,
        net_total: input.principal + net_interest,
    }
}

/// One bank's deposit offer for a given amount, term and currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositOffer {
    pub product_id: Uuid,
    pub bank_id: Uuid,
    pub bank_name: String,
    pub currency: Currency,
    pub annual_rate_percent: f64,
    pub result: DepositResult,
}

/// Rank every catalog deposit product, highest rate first.
///
/// Uses the catalog's withholding setting. Products whose bank is missing
/// are skipped.
pub fn rank_deposits(
    catalog: &Catalog,
    principal: f64,
    term_days: u32,
    currency: Currency,
) -> KrediResult<Vec<DepositOffer>> {
    let withholding = catalog.settings.deposit_withholding_percent;
    DepositInput::new(principal, 0.0, term_days)
        .with_withholding(withholding)
        .validate()?;

    let mut offers: Vec<DepositOffer> = catalog
        .deposit_products
        .iter()
        .filter_map(|(id, product)| {
            let bank = catalog.get_bank(&product.bank_id)?;
            let rate = product.rate_for(currency);
            let input = DepositInput::new(principal, rate, term_days).with_withholding(withholding);
            Some(DepositOffer {
                product_id: *id,
                bank_id: product.bank_id,
                bank_name: bank.name.clone(),
                currency,
                annual_rate_percent: rate,
                result: calculate(&input),
            })
        })
        .collect();

    offers.sort_by(|a, b| {
        b.annual_rate_percent
            .partial_cmp(&a.annual_rate_percent)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.bank_name.cmp(&b.bank_name))
    });

    Ok(offers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::{Bank, DepositProduct};

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_simple_interest_over_partial_year() {
        // 50,000 TL at 45% for 32 days
        let result = calculate(&DepositInput::new(50_000.0, 45.0, 32));
        let expected_gross = 50_000.0 * 0.45 * 32.0 / 365.0;
        assert!(approx_eq(result.gross_interest, expected_gross, 1e-9));
        assert!(approx_eq(result.withholding_tax, expected_gross * 0.05, 1e-9));
        assert!(approx_eq(result.net_interest, expected_gross * 0.95, 1e-9));
        assert!(approx_eq(result.total_amount, 50_000.0 + expected_gross, 1e-9));
        assert!(result.net_total < result.total_amount);
    }

    #[test]
    fn test_custom_withholding() {
        let result = calculate(&DepositInput::new(10_000.0, 10.0, 365).with_withholding(15.0));
        assert!(approx_eq(result.net_interest, 850.0, 1e-9));
    }

    #[test]
    fn test_degenerate_deposit() {
        let result = calculate(&DepositInput::new(10_000.0, 40.0, 0));
        assert_eq!(result.gross_interest, 0.0);
        assert_eq!(result.total_amount, 10_000.0);

        let result = calculate(&DepositInput::new(-5.0, 40.0, 30));
        assert_eq!(result, DepositResult::default());
    }

    #[test]
    fn test_validate() {
        assert!(DepositInput::new(1_000.0, 40.0, 32).validate().is_ok());
        assert!(DepositInput::new(0.0, 40.0, 32).validate().is_err());
        assert!(DepositInput::new(1_000.0, -1.0, 32).validate().is_err());
        assert!(DepositInput::new(1_000.0, 40.0, 0).validate().is_err());
        assert!(DepositInput::new(1_000.0, 40.0, 32).with_withholding(120.0).validate().is_err());
    }

    #[test]
    fn test_rank_deposits_by_rate() {
        let mut catalog = Catalog::new("admin");
        let low = catalog.add_bank(Bank::new("Düşük Bank")).unwrap();
        let high = catalog.add_bank(Bank::new("Yüksek Bank")).unwrap();
        catalog.add_deposit_product(DepositProduct::new(low, 38.0, 3.0, 1.0)).unwrap();
        catalog.add_deposit_product(DepositProduct::new(high, 47.0, 1.5, 2.0)).unwrap();

        let offers = rank_deposits(&catalog, 50_000.0, 32, Currency::Try).unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].bank_name, "Yüksek Bank");
        assert_eq!(offers[0].annual_rate_percent, 47.0);

        let offers = rank_deposits(&catalog, 50_000.0, 32, Currency::Usd).unwrap();
        assert_eq!(offers[0].bank_name, "Düşük Bank");
    }

    #[test]
    fn test_rank_uses_catalog_withholding() {
        let mut catalog = Catalog::new("admin");
        catalog.settings.deposit_withholding_percent = 10.0;
        let bank = catalog.add_bank(Bank::new("Banka")).unwrap();
        catalog.add_deposit_product(DepositProduct::new(bank, 36.5, 0.0, 0.0)).unwrap();

        let offers = rank_deposits(&catalog, 100_000.0, 365, Currency::Try).unwrap();
        assert!(approx_eq(offers[0].result.net_interest, 32_850.0, 1e-6));
    }

    #[test]
    fn test_rank_rejects_bad_amount() {
        let catalog = Catalog::new("admin");
        assert!(rank_deposits(&catalog, 0.0, 32, Currency::Try).is_err());
    }
}
