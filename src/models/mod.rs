//! Unified result models returned by every calculator implementation.
//!
//! Both result types default to `Fail` with all payload fields absent; that
//! is the value returned whenever validation fails or an error stops the
//! pipeline before the provider produced data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    #[default]
    Fail,
    Success,
}

/// Outcome of a sales tax calculation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxCalculationResult {
    pub status: RequestStatus,
    /// Transport-level error description from the provider call, when one
    /// was available.
    pub provider_error: Option<String>,
    pub data: Option<TaxCalcData>,
}

/// Tax amounts extracted from a successful provider response. Every field
/// except `amount_to_collect` is independently optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxCalcData {
    /// Tax to collect, pre-computed by the provider; never recalculated
    /// locally.
    pub amount_to_collect: f64,
    pub rate: Option<f64>,
    pub freight_taxable: bool,
    pub order_total_amount: Option<f64>,
    pub shipping: Option<f64>,
    pub taxable_amount: Option<f64>,
}

/// Outcome of a tax rate lookup request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxRateResult {
    pub status: RequestStatus,
    pub provider_error: Option<String>,
    pub data: Option<TaxRateData>,
}

/// Jurisdiction identifiers and rates for a location, each independently
/// optional. Rates are floating-point fractions (0.0625 = 6.25%).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxRateData {
    pub country: Option<String>,
    pub state: Option<String>,
    pub county: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub combined_rate: Option<f64>,
    pub combined_district_rate: Option<f64>,
    pub country_rate: Option<f64>,
    pub state_rate: Option<f64>,
    pub county_rate: Option<f64>,
    pub city_rate: Option<f64>,
    pub freight_taxable: bool,
}
