pub mod stub;
pub mod taxjar;

pub use stub::StubTaxCalculator;
pub use taxjar::TaxJarCalculator;

use crate::config::{CalculatorKind, Config};
use crate::dtos::{TaxCalculationRequest, TaxRateRequest};
use crate::models::{TaxCalculationResult, TaxRateResult};
use anyhow::Result;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

/// Failure modes of a provider-backed calculator. These never cross the
/// [`SalesTaxCalculator`] boundary; implementations fold them into the
/// returned result value.
#[derive(Debug, Error)]
pub enum CalculatorError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("HTTP request failed: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("HTTP response code: {code} - {reason}")]
    UnexpectedStatus {
        code: u16,
        reason: String,
        /// Response body, kept out of the display string and logged
        /// separately for diagnostics.
        body: String,
    },

    #[error("failed to parse provider response: {0}")]
    Parse(#[source] serde_json::Error),

    #[error("no tax data found in provider response")]
    MissingData,
}

/// Contract implemented by every calculator variant.
///
/// Both operations are synchronous and block until a definitive result is
/// known; callers always receive a well-formed result value, never an error.
pub trait SalesTaxCalculator: Send + Sync {
    /// Calculates the sales tax amount for a given order.
    fn calculate_tax(&self, request: &TaxCalculationRequest) -> TaxCalculationResult;

    /// Retrieves the sales tax rates for a given geographical location.
    fn get_tax_rate(&self, request: &TaxRateRequest) -> TaxRateResult;
}

/// Sales tax service facade, agnostic to the specific provider behind it.
///
/// Validates request inputs before dispatch and otherwise delegates to the
/// configured calculator without inspecting or modifying results.
pub struct SalesTaxService {
    calculator: Box<dyn SalesTaxCalculator>,
}

impl SalesTaxService {
    pub fn new(calculator: Box<dyn SalesTaxCalculator>) -> Self {
        Self { calculator }
    }

    /// Builds the service with the calculator selected by `config`.
    /// Selecting the TaxJar calculator without an API token is a fatal
    /// configuration error, not a runtime failure.
    pub fn from_config(config: &Config) -> Result<Self> {
        let calculator: Box<dyn SalesTaxCalculator> = match config.calculator {
            CalculatorKind::Stub => Box::new(StubTaxCalculator),
            CalculatorKind::TaxJar => Box::new(TaxJarCalculator::new(config.taxjar.clone())?),
        };
        Ok(Self::new(calculator))
    }

    /// Calculates the tax amount for a given order. Returns the default
    /// `Fail` result without invoking the calculator when validation fails.
    pub fn calculate_tax(&self, request: &TaxCalculationRequest) -> TaxCalculationResult {
        if let Err(errors) = request.validate() {
            log_validation_errors(&errors);
            return TaxCalculationResult::default();
        }
        self.calculator.calculate_tax(request)
    }

    /// Retrieves the sales tax rates for a given geographical location.
    pub fn get_tax_rate(&self, request: &TaxRateRequest) -> TaxRateResult {
        if let Err(errors) = request.validate() {
            log_validation_errors(&errors);
            return TaxRateResult::default();
        }
        self.calculator.get_tax_rate(request)
    }

    /// Convenience lookup keyed on zip code alone.
    pub fn get_tax_rate_for_zip(&self, zip: &str) -> TaxRateResult {
        self.get_tax_rate(&TaxRateRequest::for_zip(zip))
    }
}

// Validation is deliberately minimal (required zip codes only); the derive
// rules on the DTOs are the place to grow it.
fn log_validation_errors(errors: &ValidationErrors) {
    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            match &error.message {
                Some(message) => {
                    tracing::error!(field, %message, "request input validation failed")
                }
                None => {
                    tracing::error!(field, code = %error.code, "request input validation failed")
                }
            }
        }
    }
}
