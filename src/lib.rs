//! Provider-agnostic sales tax calculation library.
//!
//! Exposes a unified request/response model for calculating sales tax on an
//! order and fetching tax rates for a location, and delegates the actual
//! computation to a pluggable [`SalesTaxCalculator`] implementation: the live
//! TaxJar client ([`TaxJarCalculator`]) or an in-memory fixture
//! ([`StubTaxCalculator`]) for tests and offline use.
//!
//! All operations are synchronous; every failure mode short of a
//! misconfiguration at construction time is folded into the returned result
//! value rather than surfaced as an error.

pub mod config;
pub mod dtos;
pub mod models;
pub mod services;

pub use config::{CalculatorKind, Config, TaxJarConfig};
pub use dtos::{LineItem, NexusAddress, TaxCalculationRequest, TaxRateRequest};
pub use models::{
    RequestStatus, TaxCalcData, TaxCalculationResult, TaxRateData, TaxRateResult,
};
pub use services::{
    CalculatorError, SalesTaxCalculator, SalesTaxService, StubTaxCalculator, TaxJarCalculator,
};
