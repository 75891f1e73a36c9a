//! Fixed-data calculator for tests and offline operation.

use super::SalesTaxCalculator;
use crate::dtos::{TaxCalculationRequest, TaxRateRequest};
use crate::models::{
    RequestStatus, TaxCalcData, TaxCalculationResult, TaxRateData, TaxRateResult,
};

const KNOWN_ZIP: &str = "01463";
const CALC_RATE: f64 = 0.065;
const STATE_RATE: f64 = 0.0625;

/// Calculator that recognizes exactly one destination zip code and answers
/// with fixed data; every other zip yields the default `Fail` result. A pure
/// function of its input, with no network dependency.
pub struct StubTaxCalculator;

impl SalesTaxCalculator for StubTaxCalculator {
    fn calculate_tax(&self, request: &TaxCalculationRequest) -> TaxCalculationResult {
        if request.to_zip != KNOWN_ZIP {
            return TaxCalculationResult::default();
        }

        TaxCalculationResult {
            status: RequestStatus::Success,
            provider_error: None,
            data: Some(TaxCalcData {
                amount_to_collect: request.amount * CALC_RATE,
                rate: Some(CALC_RATE),
                freight_taxable: false,
                order_total_amount: Some(request.amount + request.shipping),
                shipping: Some(request.shipping),
                taxable_amount: Some(request.amount),
            }),
        }
    }

    fn get_tax_rate(&self, request: &TaxRateRequest) -> TaxRateResult {
        if request.zip != KNOWN_ZIP {
            return TaxRateResult::default();
        }

        TaxRateResult {
            status: RequestStatus::Success,
            provider_error: None,
            data: Some(TaxRateData {
                country: Some("US".to_string()),
                state: Some("MA".to_string()),
                county: None,
                city: None,
                zip: Some(KNOWN_ZIP.to_string()),
                combined_rate: Some(STATE_RATE),
                combined_district_rate: None,
                country_rate: Some(0.0),
                state_rate: Some(STATE_RATE),
                county_rate: Some(0.0),
                city_rate: Some(0.0),
                freight_taxable: false,
            }),
        }
    }
}
