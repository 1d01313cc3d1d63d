//! # Catalog Records
//!
//! Banks, loan products, deposit products, credit cards and zero-interest
//! campaigns as the admin screens maintain them. These are plain records:
//! besides field storage they only check that required fields are present
//! and values are in range. Referential checks (a product's bank must
//! exist) live in [`crate::catalog`].
//!
//! ## Example
//!
//! ```rust
//! use kredi_core::products::{Bank, LoanProduct};
//! use kredi_core::taxes::LoanKind;
//! use uuid::Uuid;
//!
//! let bank = Bank::new("Örnek Bank").with_tax_rates(0.05, 0.15);
//! assert!(bank.validate().is_ok());
//!
//! let product = LoanProduct::new(Uuid::new_v4(), LoanKind::Consumer, "Hızlı Kredi", 3.29)
//!     .with_limits(Some(250_000.0), Some(36));
//! assert!(product.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculations::loan::MAX_TERM_MONTHS;
use crate::errors::{KrediError, KrediResult};
use crate::taxes::{validate_fraction, LoanKind, TaxRates};

/// A bank listed on the marketplace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    /// Display name (required)
    pub name: String,

    /// Logo path or URL
    #[serde(default)]
    pub logo: Option<String>,

    /// Brand color, e.g. "#ff3d00"
    #[serde(default)]
    pub color: Option<String>,

    /// BSMV rate as a fraction; `None` or 0 means "use the loan kind default"
    #[serde(default)]
    pub bsmv_rate: Option<f64>,

    /// KKDF rate as a fraction; `None` or 0 means "use the loan kind default"
    #[serde(default)]
    pub kkdf_rate: Option<f64>,
}

impl Bank {
    pub fn new(name: impl Into<String>) -> Self {
        Bank {
            name: name.into(),
            logo: None,
            color: None,
            bsmv_rate: None,
            kkdf_rate: None,
        }
    }

    pub fn with_tax_rates(mut self, bsmv: f64, kkdf: f64) -> Self {
        self.bsmv_rate = Some(bsmv);
        self.kkdf_rate = Some(kkdf);
        self
    }

    /// Set logo and brand color; `None` leaves the current value
    pub fn with_branding(mut self, logo: Option<String>, color: Option<String>) -> Self {
        if logo.is_some() {
            self.logo = logo;
        }
        if color.is_some() {
            self.color = color;
        }
        self
    }

    /// Effective BSMV/KKDF rates for a product of the given kind
    pub fn tax_rates_for(&self, kind: LoanKind) -> TaxRates {
        TaxRates::resolve(self.bsmv_rate, self.kkdf_rate, kind)
    }

    pub fn validate(&self) -> KrediResult<()> {
        require_text("name", &self.name)?;
        if let Some(rate) = self.bsmv_rate {
            validate_fraction("bsmv_rate", rate)?;
        }
        if let Some(rate) = self.kkdf_rate {
            validate_fraction("kkdf_rate", rate)?;
        }
        Ok(())
    }
}

/// Whether a vehicle loan is for a new (0 km) or second-hand car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleCondition {
    New,
    Used,
}

impl fmt::Display for VehicleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VehicleCondition::New => f.write_str("0 km"),
            VehicleCondition::Used => f.write_str("2. el"),
        }
    }
}

impl FromStr for VehicleCondition {
    type Err = KrediError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "new" | "0" | "0km" | "sifir" => Ok(VehicleCondition::New),
            "used" | "1" | "2" | "ikinci-el" => Ok(VehicleCondition::Used),
            other => Err(KrediError::invalid_input(
                "vehicle_condition",
                other,
                "Expected 'new' or 'used'",
            )),
        }
    }
}

/// A loan offer published by a bank.
///
/// ## JSON Example
///
/// ```json
/// {
///   "bank_id": "2c5ea4c0-4067-11e9-8bad-9b1deb4d3b7d",
///   "kind": "vehicle",
///   "name": "Sıfır Araç Kredisi",
///   "monthly_rate_percent": 2.89,
///   "max_amount": 1500000.0,
///   "max_term_months": 24,
///   "vehicle_condition": "new"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanProduct {
    /// Owning bank
    pub bank_id: Uuid,

    pub kind: LoanKind,

    /// Product name (required)
    pub name: String,

    /// Monthly interest rate as a percentage
    pub monthly_rate_percent: f64,

    /// Largest amount the bank lends under this product
    #[serde(default)]
    pub max_amount: Option<f64>,

    /// Longest term in months
    #[serde(default)]
    pub max_term_months: Option<u32>,

    /// Vehicle loans only
    #[serde(default)]
    pub vehicle_condition: Option<VehicleCondition>,

    /// Where the "Başvur" button leads
    #[serde(default)]
    pub application_url: Option<String>,
}

impl LoanProduct {
    pub fn new(bank_id: Uuid, kind: LoanKind, name: impl Into<String>, monthly_rate_percent: f64) -> Self {
        LoanProduct {
            bank_id,
            kind,
            name: name.into(),
            monthly_rate_percent,
            max_amount: None,
            max_term_months: None,
            vehicle_condition: None,
            application_url: None,
        }
    }

    pub fn with_limits(mut self, max_amount: Option<f64>, max_term_months: Option<u32>) -> Self {
        self.max_amount = max_amount;
        self.max_term_months = max_term_months;
        self
    }

    pub fn with_vehicle_condition(mut self, condition: VehicleCondition) -> Self {
        self.vehicle_condition = Some(condition);
        self
    }

    pub fn with_application_url(mut self, url: impl Into<String>) -> Self {
        self.application_url = Some(url.into());
        self
    }

    pub fn validate(&self) -> KrediResult<()> {
        require_text("name", &self.name)?;
        require_rate("monthly_rate_percent", self.monthly_rate_percent)?;

        if let Some(max_amount) = self.max_amount {
            if !max_amount.is_finite() || max_amount <= 0.0 {
                return Err(KrediError::invalid_input(
                    "max_amount",
                    max_amount.to_string(),
                    "Maximum amount must be positive",
                ));
            }
        }
        if let Some(max_term) = self.max_term_months {
            if max_term == 0 || max_term > MAX_TERM_MONTHS {
                return Err(KrediError::invalid_input(
                    "max_term_months",
                    max_term.to_string(),
                    format!("Maximum term must be between 1 and {} months", MAX_TERM_MONTHS),
                ));
            }
        }
        if self.vehicle_condition.is_some() && self.kind != LoanKind::Vehicle {
            return Err(KrediError::invalid_input(
                "vehicle_condition",
                self.kind.slug(),
                "Only vehicle loans have a vehicle condition",
            ));
        }
        Ok(())
    }
}

/// Deposit currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "TL")]
    Try,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::Try => f.write_str("TL"),
            Currency::Usd => f.write_str("USD"),
            Currency::Eur => f.write_str("EUR"),
        }
    }
}

impl FromStr for Currency {
    type Err = KrediError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TL" | "TRY" => Ok(Currency::Try),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            other => Err(KrediError::invalid_input("currency", other, "Expected TL, USD or EUR")),
        }
    }
}

/// A time-deposit offer with one annual rate per currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositProduct {
    pub bank_id: Uuid,

    /// Annual rate (%) for TL deposits
    pub rate_try: f64,

    /// Annual rate (%) for USD deposits
    #[serde(default)]
    pub rate_usd: f64,

    /// Annual rate (%) for EUR deposits
    #[serde(default)]
    pub rate_eur: f64,
}

impl DepositProduct {
    pub fn new(bank_id: Uuid, rate_try: f64, rate_usd: f64, rate_eur: f64) -> Self {
        DepositProduct {
            bank_id,
            rate_try,
            rate_usd,
            rate_eur,
        }
    }

    pub fn rate_for(&self, currency: Currency) -> f64 {
        match currency {
            Currency::Try => self.rate_try,
            Currency::Usd => self.rate_usd,
            Currency::Eur => self.rate_eur,
        }
    }

    pub fn validate(&self) -> KrediResult<()> {
        require_rate("rate_try", self.rate_try)?;
        require_rate("rate_usd", self.rate_usd)?;
        require_rate("rate_eur", self.rate_eur)
    }
}

/// Most features a card may highlight on its listing tile
pub const MAX_PRIMARY_FEATURES: usize = 3;

/// Credit card listing category; each has its own listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    #[serde(rename = "extra_card")]
    Extra,
    #[serde(rename = "fee_free")]
    FeeFree,
    #[serde(rename = "student_card")]
    Student,
    #[serde(rename = "commercial_card")]
    Commercial,
}

impl CardType {
    pub fn display_name(self) -> &'static str {
        match self {
            CardType::Extra => "Ekstralı Kartlar",
            CardType::FeeFree => "Aidatsız Kartlar",
            CardType::Student => "Öğrenci Kartları",
            CardType::Commercial => "Ticari Kartlar",
        }
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for CardType {
    type Err = KrediError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "extra" | "extra_card" | "extrali" => Ok(CardType::Extra),
            "fee_free" | "fee-free" | "aidatsiz" => Ok(CardType::FeeFree),
            "student" | "student_card" | "ogrenci" => Ok(CardType::Student),
            "commercial" | "commercial_card" | "ticari" => Ok(CardType::Commercial),
            other => Err(KrediError::invalid_input(
                "card_type",
                other,
                "Expected extra, fee_free, student or commercial",
            )),
        }
    }
}

/// One selling point of a card, e.g. "Taksitli nakit avans".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardFeature {
    pub feature: String,

    /// Shown on the listing tile, not only on the detail view
    #[serde(default)]
    pub is_primary: bool,
}

/// A credit card offered by a bank.
///
/// ## JSON Example
///
/// ```json
/// {
///   "bank_id": "2c5ea4c0-4067-11e9-8bad-9b1deb4d3b7d",
///   "card_type": "fee_free",
///   "name": "Aidatsız Kart",
///   "annual_fee": null,
///   "features": [{ "feature": "Ömür boyu aidatsız", "is_primary": true }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditCard {
    pub bank_id: Uuid,

    pub card_type: CardType,

    /// Card name (required)
    pub name: String,

    /// Yearly fee in TL; `None` when the bank lists none
    #[serde(default)]
    pub annual_fee: Option<f64>,

    /// Monthly purchase interest (%)
    #[serde(default)]
    pub interest_rate: Option<f64>,

    #[serde(default)]
    pub extra_advantage: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub apply_url: Option<String>,

    /// Inactive cards stay in the catalog but are not listed
    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(default)]
    pub features: Vec<CardFeature>,
}

fn default_active() -> bool {
    true
}

impl CreditCard {
    pub fn new(bank_id: Uuid, card_type: CardType, name: impl Into<String>) -> Self {
        CreditCard {
            bank_id,
            card_type,
            name: name.into(),
            annual_fee: None,
            interest_rate: None,
            extra_advantage: None,
            image_url: None,
            apply_url: None,
            is_active: true,
            features: Vec::new(),
        }
    }

    pub fn with_annual_fee(mut self, fee: f64) -> Self {
        self.annual_fee = Some(fee);
        self
    }

    pub fn with_feature(mut self, feature: impl Into<String>, is_primary: bool) -> Self {
        self.features.push(CardFeature {
            feature: feature.into(),
            is_primary,
        });
        self
    }

    /// Features shown on the listing tile
    pub fn primary_features(&self) -> impl Iterator<Item = &CardFeature> {
        self.features.iter().filter(|f| f.is_primary)
    }

    pub fn validate(&self) -> KrediResult<()> {
        require_text("name", &self.name)?;
        if let Some(fee) = self.annual_fee {
            if !fee.is_finite() || fee < 0.0 {
                return Err(KrediError::invalid_input(
                    "annual_fee",
                    fee.to_string(),
                    "Annual fee must be zero or positive",
                ));
            }
        }
        if let Some(rate) = self.interest_rate {
            require_rate("interest_rate", rate)?;
        }

        let mut seen: Vec<String> = Vec::with_capacity(self.features.len());
        for feature in &self.features {
            require_text("features", &feature.feature)?;
            let key = feature.feature.trim().to_lowercase();
            if seen.contains(&key) {
                return Err(KrediError::invalid_input(
                    "features",
                    feature.feature.as_str(),
                    "Feature listed twice",
                ));
            }
            seen.push(key);
        }

        let primary = self.primary_features().count();
        if primary > MAX_PRIMARY_FEATURES {
            return Err(KrediError::invalid_input(
                "features",
                primary.to_string(),
                format!("At most {} primary features", MAX_PRIMARY_FEATURES),
            ));
        }
        Ok(())
    }
}

/// A zero-interest ("faizsiz") campaign.
///
/// Campaigns are free text copied from bank announcements and name their
/// bank directly instead of referencing a catalog bank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZeroInterestOffer {
    /// Required
    pub bank_name: String,

    /// Required, e.g. "3 ay vadeli 50.000 TL'ye kadar faizsiz"
    pub offer_description: String,

    #[serde(default)]
    pub offer_link: Option<String>,

    #[serde(default)]
    pub bank_logo: Option<String>,

    #[serde(default)]
    pub bank_color: Option<String>,

    /// Eligibility notes
    #[serde(default)]
    pub criteria: Option<String>,
}

impl ZeroInterestOffer {
    pub fn new(bank_name: impl Into<String>, offer_description: impl Into<String>) -> Self {
        ZeroInterestOffer {
            bank_name: bank_name.into(),
            offer_description: offer_description.into(),
            offer_link: None,
            bank_logo: None,
            bank_color: None,
            criteria: None,
        }
    }

    /// Copy logo and color from a catalog bank
    pub fn with_bank_branding(mut self, bank: &Bank) -> Self {
        self.bank_logo = bank.logo.clone();
        self.bank_color = bank.color.clone();
        self
    }

    pub fn validate(&self) -> KrediResult<()> {
        require_text("bank_name", &self.bank_name)?;
        require_text("offer_description", &self.offer_description)
    }
}

fn require_text(field: &str, value: &str) -> KrediResult<()> {
    if value.trim().is_empty() {
        return Err(KrediError::missing_field(field));
    }
    Ok(())
}

fn require_rate(field: &str, rate: f64) -> KrediResult<()> {
    if !rate.is_finite() || rate < 0.0 {
        return Err(KrediError::invalid_input(
            field,
            rate.to_string(),
            "Rate must be zero or a positive percentage",
        ));
    }
    Ok(())
}
