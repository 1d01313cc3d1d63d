//! # Loan Kinds and Tax Rates
//!
//! Turkish consumer credit carries two flat-rate charges on interest:
//! BSMV (Banking and Insurance Transactions Tax) and KKDF (Resource
//! Utilization Support Fund). Banks publish their own rates; when a bank
//! leaves a rate empty (or zero) the marketplace falls back to a default
//! that depends on the loan kind.
//!
//! | Kind       | Default BSMV | Default KKDF |
//! |------------|--------------|--------------|
//! | Consumer   | 0.15         | 0.15         |
//! | Vehicle    | 0.15         | 0.15         |
//! | Commercial | 0.15         | 0.15         |
//! | Housing    | 0.00         | 0.00         |
//!
//! The loan calculator never applies these defaults itself; it only takes
//! explicit rates. Defaulting happens here, on the caller side.
//!
//! ## Example
//!
//! ```rust
//! use kredi_core::taxes::{LoanKind, TaxRates};
//!
//! // Bank publishes BSMV but leaves KKDF empty
//! let rates = TaxRates::resolve(Some(0.05), None, LoanKind::Consumer);
//! assert_eq!(rates.bsmv, 0.05);
//! assert_eq!(rates.kkdf, 0.15);
//!
//! // Housing loans are tax exempt by default
//! let housing = TaxRates::resolve(None, None, LoanKind::Housing);
//! assert_eq!(housing.combined(), 0.0);
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{KrediError, KrediResult};

/// Fallback BSMV/KKDF rate for taxed loan kinds.
pub const DEFAULT_TAX_RATE: f64 = 0.15;

/// Loan product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoanKind {
    /// General purpose consumer loan (ihtiyaç kredisi)
    Consumer,
    /// Mortgage (konut kredisi)
    Housing,
    /// Car loan (taşıt kredisi)
    Vehicle,
    /// Business loan (ticari kredi)
    Commercial,
}

impl LoanKind {
    /// All loan kinds, in display order
    pub const ALL: [LoanKind; 4] = [
        LoanKind::Consumer,
        LoanKind::Housing,
        LoanKind::Vehicle,
        LoanKind::Commercial,
    ];

    /// Tax rates used when a bank does not publish its own.
    pub fn default_tax_rates(self) -> TaxRates {
        match self {
            LoanKind::Housing => TaxRates::exempt(),
            LoanKind::Consumer | LoanKind::Vehicle | LoanKind::Commercial => {
                TaxRates::new(DEFAULT_TAX_RATE, DEFAULT_TAX_RATE)
            }
        }
    }

    /// Short identifier used on the command line and in JSON
    pub fn slug(self) -> &'static str {
        match self {
            LoanKind::Consumer => "consumer",
            LoanKind::Housing => "housing",
            LoanKind::Vehicle => "vehicle",
            LoanKind::Commercial => "commercial",
        }
    }

    /// Turkish display name
    pub fn display_name(self) -> &'static str {
        match self {
            LoanKind::Consumer => "İhtiyaç Kredisi",
            LoanKind::Housing => "Konut Kredisi",
            LoanKind::Vehicle => "Taşıt Kredisi",
            LoanKind::Commercial => "Ticari Kredi",
        }
    }
}

impl fmt::Display for LoanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for LoanKind {
    type Err = KrediError;

    /// Accepts English slugs as well as the Turkish URL names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "consumer" | "ihtiyac" | "ihtiyac-kredisi" => Ok(LoanKind::Consumer),
            "housing" | "konut" | "konut-kredisi" => Ok(LoanKind::Housing),
            "vehicle" | "tasit" | "tasit-kredisi" => Ok(LoanKind::Vehicle),
            "commercial" | "ticari" | "ticari-kredi" => Ok(LoanKind::Commercial),
            other => Err(KrediError::invalid_input(
                "kind",
                other,
                "Expected one of: consumer, housing, vehicle, commercial",
            )),
        }
    }
}

/// BSMV and KKDF rates as fractions (0.15 = 15%).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TaxRates {
    /// Banking and Insurance Transactions Tax
    pub bsmv: f64,
    /// Resource Utilization Support Fund
    pub kkdf: f64,
}

impl TaxRates {
    pub fn new(bsmv: f64, kkdf: f64) -> Self {
        TaxRates { bsmv, kkdf }
    }

    /// No taxes at all
    pub fn exempt() -> Self {
        TaxRates::new(0.0, 0.0)
    }

    /// Sum of both rates; the surcharge factor applied to total interest
    pub fn combined(&self) -> f64 {
        self.bsmv + self.kkdf
    }

    /// Resolve the rates for a bank and loan kind.
    ///
    /// A bank rate that is missing or exactly zero is replaced by the
    /// kind's default. Housing defaults are zero, so a housing loan stays
    /// exempt unless the bank publishes a positive rate.
    pub fn resolve(bank_bsmv: Option<f64>, bank_kkdf: Option<f64>, kind: LoanKind) -> Self {
        let defaults = kind.default_tax_rates();
        TaxRates {
            bsmv: pick_rate(bank_bsmv, defaults.bsmv),
            kkdf: pick_rate(bank_kkdf, defaults.kkdf),
        }
    }

    /// Both rates must be fractions between 0 and 1.
    pub fn validate(&self) -> KrediResult<()> {
        validate_fraction("bsmv", self.bsmv)?;
        validate_fraction("kkdf", self.kkdf)
    }
}

fn pick_rate(bank_rate: Option<f64>, fallback: f64) -> f64 {
    match bank_rate {
        Some(rate) if rate != 0.0 => rate,
        _ => fallback,
    }
}

/// Check that a tax rate is a fraction in 0–1.
pub fn validate_fraction(field: &str, rate: f64) -> KrediResult<()> {
    if !(0.0..=1.0).contains(&rate) {
        return Err(KrediError::invalid_input(
            field,
            rate.to_string(),
            "Tax rate must be a fraction between 0 and 1 (0.15 = 15%)",
        ));
    }
    Ok(())
}
