//! # Product Catalog
//!
//! The `Catalog` is the root container for everything the admin screens
//! manage: banks, loan products, deposit products, credit cards and
//! zero-interest campaigns. Catalogs serialize to
//! `.krd` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Catalog
//! ├── meta: CatalogMetadata (version, owner, timestamps)
//! ├── settings: CatalogSettings (withholding rate, term options)
//! ├── banks: HashMap<Uuid, Bank>
//! ├── loan_products: HashMap<Uuid, LoanProduct>
//! ├── deposit_products: HashMap<Uuid, DepositProduct>
//! ├── credit_cards: HashMap<Uuid, CreditCard>
//! └── zero_interest_offers: HashMap<Uuid, ZeroInterestOffer>
//! ```
//!
//! Every mutation validates the record, checks that referenced banks exist
//! and bumps `meta.modified`.
//!
//! ## Example
//!
//! ```rust
//! use kredi_core::catalog::Catalog;
//! use kredi_core::products::{Bank, LoanProduct};
//! use kredi_core::taxes::LoanKind;
//!
//! let mut catalog = Catalog::new("admin");
//! let bank_id = catalog.add_bank(Bank::new("Örnek Bank")).unwrap();
//! let product_id = catalog
//!     .add_loan_product(LoanProduct::new(bank_id, LoanKind::Consumer, "İhtiyaç", 3.29))
//!     .unwrap();
//!
//! assert!(catalog.get_loan_product(&product_id).is_some());
//! // A bank with products cannot be removed
//! assert!(catalog.remove_bank(&bank_id).is_err());
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::{KrediError, KrediResult};
use crate::products::{Bank, CardType, CreditCard, DepositProduct, LoanProduct, ZeroInterestOffer};
use crate::taxes::LoanKind;

/// Current schema version for .krd files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root catalog container.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub meta: CatalogMetadata,

    #[serde(default)]
    pub settings: CatalogSettings,

    #[serde(default)]
    pub banks: HashMap<Uuid, Bank>,

    #[serde(default)]
    pub loan_products: HashMap<Uuid, LoanProduct>,

    #[serde(default)]
    pub deposit_products: HashMap<Uuid, DepositProduct>,

    #[serde(default)]
    pub credit_cards: HashMap<Uuid, CreditCard>,

    #[serde(default)]
    pub zero_interest_offers: HashMap<Uuid, ZeroInterestOffer>,
}

impl Catalog {
    /// Create a new empty catalog.
    pub fn new(owner: impl Into<String>) -> Self {
        let now = Utc::now();
        Catalog {
            meta: CatalogMetadata {
                version: SCHEMA_VERSION.to_string(),
                owner: owner.into(),
                created: now,
                modified: now,
            },
            settings: CatalogSettings::default(),
            banks: HashMap::new(),
            loan_products: HashMap::new(),
            deposit_products: HashMap::new(),
            credit_cards: HashMap::new(),
            zero_interest_offers: HashMap::new(),
        }
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    // ------------------------------------------------------------------
    // Banks
    // ------------------------------------------------------------------

    /// Add a bank. Returns the UUID assigned to it.
    pub fn add_bank(&mut self, bank: Bank) -> KrediResult<Uuid> {
        bank.validate()?;
        let id = Uuid::new_v4();
        debug!(%id, name = %bank.name, "adding bank");
        self.banks.insert(id, bank);
        self.touch();
        Ok(id)
    }

    /// Replace an existing bank record.
    pub fn update_bank(&mut self, id: &Uuid, bank: Bank) -> KrediResult<()> {
        bank.validate()?;
        let slot = self
            .banks
            .get_mut(id)
            .ok_or_else(|| KrediError::not_found("Bank", id))?;
        *slot = bank;
        self.touch();
        Ok(())
    }

    /// Remove a bank that no product references any more.
    pub fn remove_bank(&mut self, id: &Uuid) -> KrediResult<Bank> {
        if !self.banks.contains_key(id) {
            return Err(KrediError::not_found("Bank", id));
        }

        let references = self.loan_products.values().filter(|p| p.bank_id == *id).count()
            + self.deposit_products.values().filter(|d| d.bank_id == *id).count()
            + self.credit_cards.values().filter(|c| c.bank_id == *id).count();
        if references > 0 {
            return Err(KrediError::in_use(
                "Bank",
                id,
                format!("{} product(s) still reference this bank", references),
            ));
        }

        let bank = self
            .banks
            .remove(id)
            .ok_or_else(|| KrediError::not_found("Bank", id))?;
        debug!(%id, name = %bank.name, "removed bank");
        self.touch();
        Ok(bank)
    }

    pub fn get_bank(&self, id: &Uuid) -> Option<&Bank> {
        self.banks.get(id)
    }

    /// Case-insensitive lookup by display name
    pub fn find_bank_by_name(&self, name: &str) -> Option<(Uuid, &Bank)> {
        let needle = name.trim().to_lowercase();
        self.banks
            .iter()
            .find(|(_, bank)| bank.name.to_lowercase() == needle)
            .map(|(id, bank)| (*id, bank))
    }

    fn require_bank(&self, id: &Uuid) -> KrediResult<()> {
        if self.banks.contains_key(id) {
            Ok(())
        } else {
            Err(KrediError::not_found("Bank", id))
        }
    }

    // ------------------------------------------------------------------
    // Loan products
    // ------------------------------------------------------------------

    pub fn add_loan_product(&mut self, product: LoanProduct) -> KrediResult<Uuid> {
        product.validate()?;
        self.require_bank(&product.bank_id)?;
        let id = Uuid::new_v4();
        debug!(%id, kind = %product.kind, name = %product.name, "adding loan product");
        self.loan_products.insert(id, product);
        self.touch();
        Ok(id)
    }

    pub fn update_loan_product(&mut self, id: &Uuid, product: LoanProduct) -> KrediResult<()> {
        product.validate()?;
        self.require_bank(&product.bank_id)?;
        let slot = self
            .loan_products
            .get_mut(id)
            .ok_or_else(|| KrediError::not_found("LoanProduct", id))?;
        *slot = product;
        self.touch();
        Ok(())
    }

    pub fn remove_loan_product(&mut self, id: &Uuid) -> KrediResult<LoanProduct> {
        let product = self
            .loan_products
            .remove(id)
            .ok_or_else(|| KrediError::not_found("LoanProduct", id))?;
        self.touch();
        Ok(product)
    }

    pub fn get_loan_product(&self, id: &Uuid) -> Option<&LoanProduct> {
        self.loan_products.get(id)
    }

    /// All loan products of one kind, in no particular order
    pub fn loan_products_of(&self, kind: LoanKind) -> impl Iterator<Item = (&Uuid, &LoanProduct)> {
        self.loan_products.iter().filter(move |(_, p)| p.kind == kind)
    }

    // ------------------------------------------------------------------
    // Deposit products
    // ------------------------------------------------------------------

    pub fn add_deposit_product(&mut self, product: DepositProduct) -> KrediResult<Uuid> {
        product.validate()?;
        self.require_bank(&product.bank_id)?;
        let id = Uuid::new_v4();
        debug!(%id, bank_id = %product.bank_id, "adding deposit product");
        self.deposit_products.insert(id, product);
        self.touch();
        Ok(id)
    }

    pub fn update_deposit_product(&mut self, id: &Uuid, product: DepositProduct) -> KrediResult<()> {
        product.validate()?;
        self.require_bank(&product.bank_id)?;
        let slot = self
            .deposit_products
            .get_mut(id)
            .ok_or_else(|| KrediError::not_found("DepositProduct", id))?;
        *slot = product;
        self.touch();
        Ok(())
    }

    pub fn remove_deposit_product(&mut self, id: &Uuid) -> KrediResult<DepositProduct> {
        let product = self
            .deposit_products
            .remove(id)
            .ok_or_else(|| KrediError::not_found("DepositProduct", id))?;
        debug!(%id, "removed deposit product");
        self.touch();
        Ok(product)
    }

    // ------------------------------------------------------------------
    // Credit cards
    // ------------------------------------------------------------------

    pub fn add_credit_card(&mut self, card: CreditCard) -> KrediResult<Uuid> {
        card.validate()?;
        self.require_bank(&card.bank_id)?;
        let id = Uuid::new_v4();
        debug!(%id, card_type = ?card.card_type, name = %card.name, "adding credit card");
        self.credit_cards.insert(id, card);
        self.touch();
        Ok(id)
    }

    pub fn update_credit_card(&mut self, id: &Uuid, card: CreditCard) -> KrediResult<()> {
        card.validate()?;
        self.require_bank(&card.bank_id)?;
        let slot = self
            .credit_cards
            .get_mut(id)
            .ok_or_else(|| KrediError::not_found("CreditCard", id))?;
        *slot = card;
        self.touch();
        Ok(())
    }

    pub fn remove_credit_card(&mut self, id: &Uuid) -> KrediResult<CreditCard> {
        let card = self
            .credit_cards
            .remove(id)
            .ok_or_else(|| KrediError::not_found("CreditCard", id))?;
        debug!(%id, name = %card.name, "removed credit card");
        self.touch();
        Ok(card)
    }

    pub fn get_credit_card(&self, id: &Uuid) -> Option<&CreditCard> {
        self.credit_cards.get(id)
    }

    /// Active cards of one type, in no particular order
    pub fn active_cards_of(&self, card_type: CardType) -> impl Iterator<Item = (&Uuid, &CreditCard)> {
        self.credit_cards
            .iter()
            .filter(move |(_, c)| c.is_active && c.card_type == card_type)
    }

    // ------------------------------------------------------------------
    // Zero-interest campaigns
    // ------------------------------------------------------------------

    pub fn add_zero_interest_offer(&mut self, offer: ZeroInterestOffer) -> KrediResult<Uuid> {
        offer.validate()?;
        let id = Uuid::new_v4();
        debug!(%id, bank = %offer.bank_name, "adding zero-interest offer");
        self.zero_interest_offers.insert(id, offer);
        self.touch();
        Ok(id)
    }

    pub fn update_zero_interest_offer(&mut self, id: &Uuid, offer: ZeroInterestOffer) -> KrediResult<()> {
        offer.validate()?;
        let slot = self
            .zero_interest_offers
            .get_mut(id)
            .ok_or_else(|| KrediError::not_found("ZeroInterestOffer", id))?;
        *slot = offer;
        self.touch();
        Ok(())
    }

    pub fn remove_zero_interest_offer(&mut self, id: &Uuid) -> KrediResult<ZeroInterestOffer> {
        let offer = self
            .zero_interest_offers
            .remove(id)
            .ok_or_else(|| KrediError::not_found("ZeroInterestOffer", id))?;
        self.touch();
        Ok(offer)
    }

    /// Total number of records of all types
    pub fn record_count(&self) -> usize {
        self.banks.len()
            + self.loan_products.len()
            + self.deposit_products.len()
            + self.credit_cards.len()
            + self.zero_interest_offers.len()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Catalog::new("")
    }
}

/// Catalog metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Who maintains this catalog
    pub owner: String,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Site-wide settings edited on the admin "Ayarlar" screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    /// Withholding tax (stopaj) on deposit interest, in percent
    pub deposit_withholding_percent: f64,

    /// Term choices offered on loan forms, in months
    pub term_options: Vec<u32>,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            deposit_withholding_percent: 5.0,
            term_options: vec![12, 24, 36, 48, 60, 120],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::products::{CardType, VehicleCondition};

    fn catalog_with_bank() -> (Catalog, Uuid) {
        let mut catalog = Catalog::new("admin");
        let bank_id = catalog.add_bank(Bank::new("Örnek Bank")).unwrap();
        (catalog, bank_id)
    }

    #[test]
    fn test_catalog_creation() {
        let catalog = Catalog::new("admin");
        assert_eq!(catalog.meta.owner, "admin");
        assert_eq!(catalog.meta.version, SCHEMA_VERSION);
        assert_eq!(catalog.settings.deposit_withholding_percent, 5.0);
        assert_eq!(catalog.record_count(), 0);
    }

    #[test]
    fn test_product_requires_existing_bank() {
        let mut catalog = Catalog::new("admin");
        let product = LoanProduct::new(Uuid::new_v4(), LoanKind::Consumer, "Kredi", 2.0);
        let err = catalog.add_loan_product(product).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");
        assert!(catalog.loan_products.is_empty());
    }

    #[test]
    fn test_invalid_bank_is_rejected() {
        let mut catalog = Catalog::new("admin");
        assert!(catalog.add_bank(Bank::new("")).is_err());
        assert!(catalog.banks.is_empty());
    }

    #[test]
    fn test_add_update_remove_product() {
        let (mut catalog, bank_id) = catalog_with_bank();
        let id = catalog
            .add_loan_product(LoanProduct::new(bank_id, LoanKind::Vehicle, "Taşıt", 2.9))
            .unwrap();

        let updated = LoanProduct::new(bank_id, LoanKind::Vehicle, "Taşıt", 2.5)
            .with_vehicle_condition(VehicleCondition::New);
        catalog.update_loan_product(&id, updated).unwrap();
        assert_eq!(catalog.get_loan_product(&id).unwrap().monthly_rate_percent, 2.5);

        catalog.remove_loan_product(&id).unwrap();
        assert!(catalog.get_loan_product(&id).is_none());
        assert!(catalog.remove_loan_product(&id).is_err());
    }

    #[test]
    fn test_update_unknown_product_fails() {
        let (mut catalog, bank_id) = catalog_with_bank();
        let product = LoanProduct::new(bank_id, LoanKind::Consumer, "Kredi", 2.0);
        assert!(catalog.update_loan_product(&Uuid::new_v4(), product).is_err());
    }

    #[test]
    fn test_bank_in_use_cannot_be_removed() {
        let (mut catalog, bank_id) = catalog_with_bank();
        let deposit_id = catalog
            .add_deposit_product(DepositProduct::new(bank_id, 42.0, 2.0, 1.5))
            .unwrap();

        let err = catalog.remove_bank(&bank_id).unwrap_err();
        assert_eq!(err.error_code(), "IN_USE");

        catalog.remove_deposit_product(&deposit_id).unwrap();
        let removed = catalog.remove_bank(&bank_id).unwrap();
        assert_eq!(removed.name, "Örnek Bank");
    }

    #[test]
    fn test_update_bank() {
        let (mut catalog, bank_id) = catalog_with_bank();
        let renamed = Bank::new("Yeni Bank").with_tax_rates(0.05, 0.15);
        catalog.update_bank(&bank_id, renamed).unwrap();
        assert_eq!(catalog.get_bank(&bank_id).unwrap().name, "Yeni Bank");
        assert_eq!(catalog.get_bank(&bank_id).unwrap().bsmv_rate, Some(0.05));

        let err = catalog.update_bank(&Uuid::new_v4(), Bank::new("Hayalet")).unwrap_err();
        assert_eq!(err.error_code(), "NOT_FOUND");

        let err = catalog.update_bank(&bank_id, Bank::new("")).unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
        assert_eq!(catalog.get_bank(&bank_id).unwrap().name, "Yeni Bank");
    }

    #[test]
    fn test_update_deposit_product() {
        let (mut catalog, bank_id) = catalog_with_bank();
        let id = catalog
            .add_deposit_product(DepositProduct::new(bank_id, 42.0, 2.0, 1.5))
            .unwrap();

        catalog
            .update_deposit_product(&id, DepositProduct::new(bank_id, 45.0, 2.0, 1.5))
            .unwrap();
        assert_eq!(catalog.deposit_products[&id].rate_try, 45.0);

        assert!(catalog
            .update_deposit_product(&id, DepositProduct::new(bank_id, -1.0, 0.0, 0.0))
            .is_err());
        assert!(catalog
            .update_deposit_product(&id, DepositProduct::new(Uuid::new_v4(), 40.0, 0.0, 0.0))
            .is_err());
        assert!(catalog
            .update_deposit_product(&Uuid::new_v4(), DepositProduct::new(bank_id, 40.0, 0.0, 0.0))
            .is_err());
        assert_eq!(catalog.deposit_products[&id].rate_try, 45.0);
    }

    #[test]
    fn test_credit_card_crud() {
        let (mut catalog, bank_id) = catalog_with_bank();
        let id = catalog
            .add_credit_card(CreditCard::new(bank_id, CardType::FeeFree, "Aidatsız Kart"))
            .unwrap();
        assert_eq!(catalog.active_cards_of(CardType::FeeFree).count(), 1);
        assert_eq!(catalog.active_cards_of(CardType::Student).count(), 0);

        let mut inactive = catalog.get_credit_card(&id).unwrap().clone();
        inactive.is_active = false;
        catalog.update_credit_card(&id, inactive).unwrap();
        assert_eq!(catalog.active_cards_of(CardType::FeeFree).count(), 0);

        // cards keep their bank in use
        assert_eq!(catalog.remove_bank(&bank_id).unwrap_err().error_code(), "IN_USE");

        catalog.remove_credit_card(&id).unwrap();
        assert!(catalog.remove_credit_card(&id).is_err());
        assert!(catalog.remove_bank(&bank_id).is_ok());
    }

    #[test]
    fn test_credit_card_requires_existing_bank() {
        let mut catalog = Catalog::new("admin");
        let card = CreditCard::new(Uuid::new_v4(), CardType::Extra, "Kart");
        assert_eq!(catalog.add_credit_card(card).unwrap_err().error_code(), "NOT_FOUND");
    }

    #[test]
    fn test_zero_interest_offer_crud() {
        let mut catalog = Catalog::new("admin");
        let id = catalog
            .add_zero_interest_offer(ZeroInterestOffer::new("Örnek Bank", "3 ay faizsiz"))
            .unwrap();

        let err = catalog
            .update_zero_interest_offer(&id, ZeroInterestOffer::new("Örnek Bank", ""))
            .unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");

        catalog
            .update_zero_interest_offer(&id, ZeroInterestOffer::new("Örnek Bank", "6 ay faizsiz"))
            .unwrap();
        assert_eq!(catalog.zero_interest_offers[&id].offer_description, "6 ay faizsiz");
        assert_eq!(catalog.record_count(), 1);

        catalog.remove_zero_interest_offer(&id).unwrap();
        assert!(catalog.zero_interest_offers.is_empty());
    }

    #[test]
    fn test_find_bank_by_name_ignores_case() {
        let (catalog, bank_id) = catalog_with_bank();
        let (found, _) = catalog.find_bank_by_name("örnek bank").unwrap();
        assert_eq!(found, bank_id);
        assert!(catalog.find_bank_by_name("Başka Bank").is_none());
    }

    #[test]
    fn test_loan_products_of_kind() {
        let (mut catalog, bank_id) = catalog_with_bank();
        catalog
            .add_loan_product(LoanProduct::new(bank_id, LoanKind::Housing, "Konut", 2.4))
            .unwrap();
        catalog
            .add_loan_product(LoanProduct::new(bank_id, LoanKind::Consumer, "İhtiyaç", 3.2))
            .unwrap();
        assert_eq!(catalog.loan_products_of(LoanKind::Housing).count(), 1);
        assert_eq!(catalog.loan_products_of(LoanKind::Commercial).count(), 0);
    }

    #[test]
    fn test_mutation_touches_modified() {
        let mut catalog = Catalog::new("admin");
        let before = catalog.meta.modified;
        catalog.add_bank(Bank::new("Banka")).unwrap();
        assert!(catalog.meta.modified >= before);
    }

    #[test]
    fn test_catalog_serialization() {
        let (catalog, _) = catalog_with_bank();
        let json = serde_json::to_string_pretty(&catalog).unwrap();
        assert!(json.contains("Örnek Bank"));
        assert!(json.contains("deposit_withholding_percent"));

        let roundtrip: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.banks.len(), 1);
        assert_eq!(roundtrip.settings, CatalogSettings::default());
    }
}
