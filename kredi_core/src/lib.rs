//! # kredi_core - Credit Marketplace Calculation Engine
//!
//! `kredi_core` prices loans and deposits for a Turkish credit comparison
//! site and keeps the catalog of banks and products the prices come from.
//! All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: Calculations are pure functions that take input and return results
//! - **Never crash the page**: Degenerate loan inputs quote as zeros, not errors
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types for validation and catalog work
//!
//! ## Quick Start
//!
//! ```rust
//! use kredi_core::calculations::loan::{calculate, LoanInput};
//! use kredi_core::taxes::{LoanKind, TaxRates};
//!
//! let input = LoanInput {
//!     principal: 100_000.0,
//!     monthly_rate_percent: 2.0,
//!     term_months: 12,
//!     taxes: TaxRates::resolve(None, None, LoanKind::Consumer),
//! };
//!
//! let quote = calculate(&input);
//! println!("Aylık taksit: {}", kredi_core::format::format_lira(quote.monthly_payment));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - Loan, deposit and comparison calculations
//! - [`taxes`] - Loan kinds and BSMV/KKDF rate resolution
//! - [`products`] - Bank, loan product and deposit product records
//! - [`catalog`] - Catalog container with CRUD and referential checks
//! - [`file_io`] - Catalog files with atomic saves and locking
//! - [`input`] - Parsing of form-entered amounts and terms
//! - [`format`] - Turkish currency formatting
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod catalog;
pub mod errors;
pub mod file_io;
pub mod format;
pub mod input;
pub mod products;
pub mod taxes;

// Re-export commonly used types at crate root for convenience
pub use catalog::{Catalog, CatalogMetadata, CatalogSettings};
pub use errors::{KrediError, KrediResult};
pub use file_io::{load_catalog, save_catalog, FileLock};
pub use taxes::{LoanKind, TaxRates};
