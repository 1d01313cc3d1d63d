//! # Loan Offer Comparison
//!
//! Quotes every catalog product of one loan kind for a requested amount and
//! term, the way the listing pages show "what each bank would charge you".
//!
//! ## Product limits
//!
//! - Consumer, commercial and housing listings **clamp** the request to the
//!   product's limits: asking for 600,000 TL from a product capped at
//!   500,000 TL quotes 500,000 TL. Housing products without limits use
//!   9,999,999 TL and 180 months.
//! - Vehicle listings **filter**: only products whose limits cover the
//!   request (and whose condition matches, when one is asked for) appear.
//!
//! Taxes are resolved per bank with [`TaxRates::resolve`](crate::taxes::TaxRates::resolve).
//! Offers come back cheapest first by tax-inclusive monthly payment.
//!
//! ## Example
//!
//! ```rust
//! use kredi_core::catalog::Catalog;
//! use kredi_core::calculations::comparison::{compare_loans, OfferRequest};
//! use kredi_core::products::{Bank, LoanProduct};
//! use kredi_core::taxes::LoanKind;
//!
//! let mut catalog = Catalog::new("admin");
//! let bank = catalog.add_bank(Bank::new("Örnek Bank")).unwrap();
//! catalog
//!     .add_loan_product(
//!         LoanProduct::new(bank, LoanKind::Commercial, "KOBİ", 3.0).with_limits(Some(500_000.0), Some(36)),
//!     )
//!     .unwrap();
//!
//! let request = OfferRequest::new(LoanKind::Commercial, 750_000.0, 48);
//! let offers = compare_loans(&catalog, &request).unwrap();
//! assert_eq!(offers[0].quote.principal, 500_000.0);
//! assert_eq!(offers[0].quote.term_months, 36);
//! ```

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::calculations::loan::{calculate, LoanInput, LoanQuote, MAX_TERM_MONTHS};
use crate::catalog::Catalog;
use crate::errors::{KrediError, KrediResult};
use crate::products::{Bank, LoanProduct, VehicleCondition};
use crate::taxes::LoanKind;

/// Housing products without a published ceiling lend up to this amount
pub const HOUSING_FALLBACK_MAX_AMOUNT: f64 = 9_999_999.0;

/// Housing products without a published ceiling lend up to this term
pub const HOUSING_FALLBACK_MAX_TERM: u32 = 180;

/// What the visitor typed into the search form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfferRequest {
    pub kind: LoanKind,
    pub amount: f64,
    pub term_months: u32,

    /// Vehicle searches only
    #[serde(default)]
    pub vehicle_condition: Option<VehicleCondition>,
}

impl OfferRequest {
    pub fn new(kind: LoanKind, amount: f64, term_months: u32) -> Self {
        OfferRequest {
            kind,
            amount,
            term_months,
            vehicle_condition: None,
        }
    }

    pub fn with_vehicle_condition(mut self, condition: VehicleCondition) -> Self {
        self.vehicle_condition = Some(condition);
        self
    }

    pub fn validate(&self) -> KrediResult<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(KrediError::invalid_input(
                "amount",
                self.amount.to_string(),
                "Amount must be a positive number",
            ));
        }
        if self.term_months == 0 || self.term_months > MAX_TERM_MONTHS {
            return Err(KrediError::invalid_input(
                "term_months",
                self.term_months.to_string(),
                format!("Term must be between 1 and {} months", MAX_TERM_MONTHS),
            ));
        }
        Ok(())
    }
}

/// One bank's priced answer to an [`OfferRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanOffer {
    pub product_id: Uuid,
    pub bank_id: Uuid,
    pub bank_name: String,
    pub product_name: String,
    #[serde(default)]
    pub application_url: Option<String>,

    /// True when the product's limits reduced the requested amount or term
    pub clamped: bool,

    pub quote: LoanQuote,
}

/// Quote all matching products for a request.
///
/// Products whose bank is missing from the catalog are skipped.
pub fn compare_loans(catalog: &Catalog, request: &OfferRequest) -> KrediResult<Vec<LoanOffer>> {
    request.validate()?;

    let mut offers: Vec<LoanOffer> = catalog
        .loan_products_of(request.kind)
        .filter_map(|(id, product)| {
            let bank = catalog.get_bank(&product.bank_id)?;
            price_product(*id, product, bank, request)
        })
        .collect();

    offers.sort_by(|a, b| {
        a.quote
            .monthly_payment_with_taxes
            .partial_cmp(&b.quote.monthly_payment_with_taxes)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.bank_name.cmp(&b.bank_name))
            .then_with(|| a.product_name.cmp(&b.product_name))
    });

    debug!(kind = %request.kind, amount = request.amount, term = request.term_months, offers = offers.len(), "compared loan offers");
    Ok(offers)
}

fn price_product(product_id: Uuid, product: &LoanProduct, bank: &Bank, request: &OfferRequest) -> Option<LoanOffer> {
    let (amount, term_months) = match request.kind {
        LoanKind::Vehicle => {
            if !vehicle_product_covers(product, request) {
                return None;
            }
            (request.amount, request.term_months)
        }
        LoanKind::Housing => clamp_to_limits(
            request,
            Some(product.max_amount.unwrap_or(HOUSING_FALLBACK_MAX_AMOUNT)),
            Some(product.max_term_months.unwrap_or(HOUSING_FALLBACK_MAX_TERM)),
        ),
        LoanKind::Consumer | LoanKind::Commercial => {
            clamp_to_limits(request, product.max_amount, product.max_term_months)
        }
    };

    let input = LoanInput {
        principal: amount,
        monthly_rate_percent: product.monthly_rate_percent,
        term_months,
        taxes: bank.tax_rates_for(product.kind),
    };

    Some(LoanOffer {
        product_id,
        bank_id: product.bank_id,
        bank_name: bank.name.clone(),
        product_name: product.name.clone(),
        application_url: product.application_url.clone(),
        clamped: amount != request.amount || term_months != request.term_months,
        quote: calculate(&input),
    })
}

fn clamp_to_limits(request: &OfferRequest, max_amount: Option<f64>, max_term: Option<u32>) -> (f64, u32) {
    let amount = max_amount.map_or(request.amount, |max| request.amount.min(max));
    let term = max_term.map_or(request.term_months, |max| request.term_months.min(max));
    (amount, term)
}

fn vehicle_product_covers(product: &LoanProduct, request: &OfferRequest) -> bool {
    if let Some(wanted) = request.vehicle_condition {
        if product.vehicle_condition != Some(wanted) {
            return false;
        }
    }
    let amount_ok = product.max_amount.map_or(true, |max| max >= request.amount);
    let term_ok = product.max_term_months.map_or(true, |max| max >= request.term_months);
    amount_ok && term_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxes::TaxRates;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    fn add_bank(catalog: &mut Catalog, name: &str) -> Uuid {
        catalog.add_bank(Bank::new(name)).unwrap()
    }

    #[test]
    fn test_invalid_request_is_rejected() {
        let catalog = Catalog::new("admin");
        assert!(compare_loans(&catalog, &OfferRequest::new(LoanKind::Consumer, 0.0, 12)).is_err());
        assert!(compare_loans(&catalog, &OfferRequest::new(LoanKind::Consumer, 10_000.0, 0)).is_err());
        assert!(compare_loans(&catalog, &OfferRequest::new(LoanKind::Consumer, 10_000.0, u32::MAX)).is_err());
    }

    #[test]
    fn test_clamps_to_product_limits() {
        let mut catalog = Catalog::new("admin");
        let bank = add_bank(&mut catalog, "A Bank");
        catalog
            .add_loan_product(
                LoanProduct::new(bank, LoanKind::Consumer, "İhtiyaç", 3.0).with_limits(Some(100_000.0), Some(24)),
            )
            .unwrap();

        let offers = compare_loans(&catalog, &OfferRequest::new(LoanKind::Consumer, 150_000.0, 36)).unwrap();
        assert_eq!(offers.len(), 1);
        assert!(offers[0].clamped);
        assert_eq!(offers[0].quote.principal, 100_000.0);
        assert_eq!(offers[0].quote.term_months, 24);

        let offers = compare_loans(&catalog, &OfferRequest::new(LoanKind::Consumer, 50_000.0, 12)).unwrap();
        assert!(!offers[0].clamped);
    }

    #[test]
    fn test_housing_fallback_limits_and_exemption() {
        let mut catalog = Catalog::new("admin");
        let bank = add_bank(&mut catalog, "Konut Bank");
        catalog
            .add_loan_product(LoanProduct::new(bank, LoanKind::Housing, "Konut", 2.5))
            .unwrap();

        let offers = compare_loans(&catalog, &OfferRequest::new(LoanKind::Housing, 12_000_000.0, 240)).unwrap();
        let quote = &offers[0].quote;
        assert_eq!(quote.principal, HOUSING_FALLBACK_MAX_AMOUNT);
        assert_eq!(quote.term_months, HOUSING_FALLBACK_MAX_TERM);
        assert_eq!(quote.taxes, TaxRates::exempt());
        assert_eq!(quote.total_taxes, 0.0);
    }

    #[test]
    fn test_commercial_uses_default_taxes() {
        let mut catalog = Catalog::new("admin");
        let bank = add_bank(&mut catalog, "Ticari Bank");
        catalog
            .add_loan_product(LoanProduct::new(bank, LoanKind::Commercial, "KOBİ", 2.0))
            .unwrap();

        let offers = compare_loans(&catalog, &OfferRequest::new(LoanKind::Commercial, 100_000.0, 12)).unwrap();
        let quote = &offers[0].quote;
        assert_eq!(quote.taxes, TaxRates::new(0.15, 0.15));
        assert!(approx_eq(quote.total_taxes, quote.total_interest * 0.30, 1e-6));
    }

    #[test]
    fn test_vehicle_products_are_filtered_not_clamped() {
        let mut catalog = Catalog::new("admin");
        let bank = add_bank(&mut catalog, "Oto Bank");
        catalog
            .add_loan_product(
                LoanProduct::new(bank, LoanKind::Vehicle, "Sıfır Araç", 2.8)
                    .with_limits(Some(1_000_000.0), Some(24))
                    .with_vehicle_condition(VehicleCondition::New),
            )
            .unwrap();
        catalog
            .add_loan_product(
                LoanProduct::new(bank, LoanKind::Vehicle, "İkinci El", 3.1)
                    .with_limits(Some(400_000.0), Some(12))
                    .with_vehicle_condition(VehicleCondition::Used),
            )
            .unwrap();

        let request = OfferRequest::new(LoanKind::Vehicle, 500_000.0, 12);
        let offers = compare_loans(&catalog, &request).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].product_name, "Sıfır Araç");
        assert!(!offers[0].clamped);

        let used = request.clone().with_vehicle_condition(VehicleCondition::Used);
        assert!(compare_loans(&catalog, &used).unwrap().is_empty());

        let too_long = OfferRequest::new(LoanKind::Vehicle, 100_000.0, 36);
        assert!(compare_loans(&catalog, &too_long).unwrap().is_empty());
    }

    #[test]
    fn test_offers_sorted_cheapest_first() {
        let mut catalog = Catalog::new("admin");
        let expensive = add_bank(&mut catalog, "Pahalı Bank");
        let cheap = add_bank(&mut catalog, "Ucuz Bank");
        catalog
            .add_loan_product(LoanProduct::new(expensive, LoanKind::Consumer, "Kredi", 4.5))
            .unwrap();
        catalog
            .add_loan_product(LoanProduct::new(cheap, LoanKind::Consumer, "Kredi", 2.5))
            .unwrap();

        let offers = compare_loans(&catalog, &OfferRequest::new(LoanKind::Consumer, 50_000.0, 12)).unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].bank_name, "Ucuz Bank");
        assert!(offers[0].quote.monthly_payment_with_taxes < offers[1].quote.monthly_payment_with_taxes);
    }

    #[test]
    fn test_products_of_missing_bank_are_skipped() {
        let mut catalog = Catalog::new("admin");
        let bank = add_bank(&mut catalog, "Var Bank");
        catalog
            .add_loan_product(LoanProduct::new(bank, LoanKind::Consumer, "Kredi", 3.0))
            .unwrap();
        catalog.loan_products.insert(
            Uuid::new_v4(),
            LoanProduct::new(Uuid::new_v4(), LoanKind::Consumer, "Yetim", 1.0),
        );

        let offers = compare_loans(&catalog, &OfferRequest::new(LoanKind::Consumer, 50_000.0, 12)).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].bank_name, "Var Bank");
    }

    #[test]
    fn test_other_kinds_are_ignored() {
        let mut catalog = Catalog::new("admin");
        let bank = add_bank(&mut catalog, "Banka");
        catalog
            .add_loan_product(LoanProduct::new(bank, LoanKind::Housing, "Konut", 2.5))
            .unwrap();
        let offers = compare_loans(&catalog, &OfferRequest::new(LoanKind::Consumer, 50_000.0, 12)).unwrap();
        assert!(offers.is_empty());
    }
}
