//! TaxJar sales tax provider client.
//!
//! Builds TaxJar protocol requests from the unified input models, performs
//! one blocking HTTP round trip per call, and maps the response JSON back
//! into the unified result shapes. Every failure mode is folded into the
//! returned result value; nothing here panics or propagates errors to the
//! caller.

use super::{CalculatorError, SalesTaxCalculator};
use crate::config::TaxJarConfig;
use crate::dtos::{TaxCalculationRequest, TaxRateRequest};
use crate::models::{
    RequestStatus, TaxCalcData, TaxCalculationResult, TaxRateData, TaxRateResult,
};
use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, USER_AGENT};
use reqwest::{StatusCode, Url};
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::time::Duration;

/// Client for the TaxJar API.
///
/// The underlying HTTP client is built once at construction, carries the
/// bearer token and user agent on every request, and is safe to share across
/// threads; no per-call mutable state exists.
pub struct TaxJarCalculator {
    client: Client,
    base_url: String,
}

/// Response envelope for `POST /taxes/`.
#[derive(Debug, Deserialize)]
struct TaxResponse {
    tax: Option<TaxPayload>,
}

#[derive(Debug, Deserialize)]
struct TaxPayload {
    amount_to_collect: Option<f64>,
    rate: Option<f64>,
    freight_taxable: Option<bool>,
    order_total_amount: Option<f64>,
    shipping: Option<f64>,
    taxable_amount: Option<f64>,
}

/// Response envelope for `GET /rates/{zip}`.
#[derive(Debug, Deserialize)]
struct RateResponse {
    rate: Option<RatePayload>,
}

#[derive(Debug, Deserialize)]
struct RatePayload {
    country: Option<String>,
    state: Option<String>,
    county: Option<String>,
    city: Option<String>,
    zip: Option<String>,
    #[serde(default, deserialize_with = "rate_field")]
    combined_rate: Option<f64>,
    #[serde(default, deserialize_with = "rate_field")]
    combined_district_rate: Option<f64>,
    #[serde(default, deserialize_with = "rate_field")]
    country_rate: Option<f64>,
    #[serde(default, deserialize_with = "rate_field")]
    state_rate: Option<f64>,
    #[serde(default, deserialize_with = "rate_field")]
    county_rate: Option<f64>,
    #[serde(default, deserialize_with = "rate_field")]
    city_rate: Option<f64>,
    freight_taxable: Option<bool>,
}

/// TaxJar serializes rate numbers as JSON strings on the rates endpoint
/// (`"state_rate":"0.0625"`); accept both forms.
fn rate_field<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RateField {
        Number(f64),
        Text(String),
    }

    match Option::<RateField>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RateField::Number(value)) => Ok(Some(value)),
        Some(RateField::Text(text)) => text.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl TaxJarCalculator {
    /// Builds the client with the bearer token and a descriptive user agent
    /// attached to every request. Requests time out after
    /// `config.timeout_seconds` (30 by default); there is no cancellation
    /// contract beyond that timeout.
    pub fn new(config: TaxJarConfig) -> Result<Self> {
        if config.api_token.expose_secret().is_empty() {
            anyhow::bail!("TaxJar API token is not configured");
        }

        let mut headers = HeaderMap::new();
        let mut auth =
            HeaderValue::from_str(&format!("Bearer {}", config.api_token.expose_secret()))
                .context("TaxJar API token is not a valid header value")?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let user_agent = format!(
            "SalesTaxService Client/Rust ({}; {}; v{})",
            std::env::consts::OS,
            std::env::consts::ARCH,
            env!("CARGO_PKG_VERSION"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_str(&user_agent)?);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("failed to build TaxJar HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn send_calculate_tax(
        &self,
        request: &TaxCalculationRequest,
    ) -> std::result::Result<String, CalculatorError> {
        let url = format!("{}/taxes/", self.base_url);
        let response = self.client.post(&url).json(request).send()?;
        Self::read_ok_body(response)
    }

    fn send_get_tax_rate(&self, url: Url) -> std::result::Result<String, CalculatorError> {
        let response = self.client.get(url).send()?;
        Self::read_ok_body(response)
    }

    /// Reads the response body, turning any status other than TaxJar's
    /// defined OK status into an error that also carries the body.
    fn read_ok_body(response: Response) -> std::result::Result<String, CalculatorError> {
        let status = response.status();
        let body = response.text()?;
        if status != StatusCode::OK {
            return Err(CalculatorError::UnexpectedStatus {
                code: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .unwrap_or("unknown status")
                    .to_string(),
                body,
            });
        }
        Ok(body)
    }

    /// Builds the rate lookup URL, appending a query parameter only for each
    /// present optional field. When all are absent the URL carries no query
    /// string at all.
    fn rate_request_url(
        &self,
        request: &TaxRateRequest,
    ) -> std::result::Result<Url, CalculatorError> {
        let mut url = Url::parse(&format!("{}/rates/{}", self.base_url, request.zip))
            .map_err(|e| CalculatorError::Configuration(e.to_string()))?;

        {
            let mut query = url.query_pairs_mut();
            if let Some(country) = &request.country {
                query.append_pair("country", country);
            }
            if let Some(state) = &request.state {
                query.append_pair("state", state);
            }
            if let Some(city) = &request.city {
                query.append_pair("city", city);
            }
            if let Some(street) = &request.street {
                query.append_pair("street", street);
            }
        }
        // query_pairs_mut leaves an empty query (trailing '?') behind when
        // nothing was appended.
        if url.query() == Some("") {
            url.set_query(None);
        }
        Ok(url)
    }

    /// Extracts tax calculation data from a response body. The amount to
    /// collect is required; its absence means the provider found no data.
    /// The remaining fields are independently optional.
    fn parse_calculate_tax_body(body: &str) -> std::result::Result<TaxCalcData, CalculatorError> {
        let response: TaxResponse = serde_json::from_str(body).map_err(CalculatorError::Parse)?;
        let tax = response.tax.ok_or(CalculatorError::MissingData)?;
        let amount_to_collect = tax.amount_to_collect.ok_or(CalculatorError::MissingData)?;

        Ok(TaxCalcData {
            amount_to_collect,
            rate: tax.rate,
            freight_taxable: tax.freight_taxable.unwrap_or(false),
            order_total_amount: tax.order_total_amount,
            shipping: tax.shipping,
            taxable_amount: tax.taxable_amount,
        })
    }

    /// Extracts the rate section from a response body; every field is
    /// independently optional.
    fn parse_tax_rate_body(body: &str) -> std::result::Result<TaxRateData, CalculatorError> {
        let response: RateResponse = serde_json::from_str(body).map_err(CalculatorError::Parse)?;
        let rate = response.rate.ok_or(CalculatorError::MissingData)?;

        Ok(TaxRateData {
            country: rate.country,
            state: rate.state,
            county: rate.county,
            city: rate.city,
            zip: rate.zip,
            combined_rate: rate.combined_rate,
            combined_district_rate: rate.combined_district_rate,
            country_rate: rate.country_rate,
            state_rate: rate.state_rate,
            county_rate: rate.county_rate,
            city_rate: rate.city_rate,
            freight_taxable: rate.freight_taxable.unwrap_or(false),
        })
    }

    fn log_transport_error(error: &CalculatorError, operation: &str) {
        tracing::error!("TaxJar {operation} request failed: {error}");
        if let CalculatorError::UnexpectedStatus { body, .. } = error {
            if !body.is_empty() {
                tracing::error!(content = %body, "TaxJar error response content");
            }
        }
    }
}

impl SalesTaxCalculator for TaxJarCalculator {
    fn calculate_tax(&self, request: &TaxCalculationRequest) -> TaxCalculationResult {
        let body = match self.send_calculate_tax(request) {
            Ok(body) => body,
            Err(error) => {
                Self::log_transport_error(&error, "tax calculation");
                return TaxCalculationResult {
                    status: RequestStatus::Fail,
                    provider_error: Some(error.to_string()),
                    data: None,
                };
            }
        };

        match Self::parse_calculate_tax_body(&body) {
            Ok(data) => TaxCalculationResult {
                status: RequestStatus::Success,
                provider_error: None,
                data: Some(data),
            },
            Err(error) => {
                tracing::error!("failed to extract tax calculation data: {error}");
                TaxCalculationResult::default()
            }
        }
    }

    fn get_tax_rate(&self, request: &TaxRateRequest) -> TaxRateResult {
        let body = match self
            .rate_request_url(request)
            .and_then(|url| self.send_get_tax_rate(url))
        {
            Ok(body) => body,
            Err(error) => {
                Self::log_transport_error(&error, "tax rate");
                return TaxRateResult {
                    status: RequestStatus::Fail,
                    provider_error: Some(error.to_string()),
                    data: None,
                };
            }
        };

        match Self::parse_tax_rate_body(&body) {
            Ok(data) => TaxRateResult {
                status: RequestStatus::Success,
                provider_error: None,
                data: Some(data),
            },
            Err(error) => {
                tracing::error!("failed to extract tax rate data: {error}");
                TaxRateResult::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::{LineItem, NexusAddress};
    use secrecy::Secret;

    fn test_config() -> TaxJarConfig {
        TaxJarConfig {
            api_base_url: "https://api.taxjar.com/v2".to_string(),
            api_token: Secret::new("test-token".to_string()),
            timeout_seconds: 30,
        }
    }

    fn test_calculator() -> TaxJarCalculator {
        TaxJarCalculator::new(test_config()).unwrap()
    }

    fn single_item_order() -> TaxCalculationRequest {
        let mut request = TaxCalculationRequest {
            from_country: "US".to_string(),
            from_zip: "92093".to_string(),
            from_state: "CA".to_string(),
            from_city: "La Jolla".to_string(),
            from_street: "9500 Gilman Drive".to_string(),
            to_country: "US".to_string(),
            to_zip: "90002".to_string(),
            to_state: "CA".to_string(),
            to_city: "Los Angeles".to_string(),
            to_street: "1335 E 103rd St".to_string(),
            amount: 15.0,
            shipping: 1.5,
            ..TaxCalculationRequest::default()
        };
        request.add_nexus_address(NexusAddress {
            id: "Main Location".to_string(),
            country: "US".to_string(),
            zip: "92093".to_string(),
            state: "CA".to_string(),
            city: "La Jolla".to_string(),
            street: "9500 Gilman Drive".to_string(),
        });
        request.add_line_item(LineItem {
            id: "1".to_string(),
            quantity: 1,
            product_tax_code: "20010".to_string(),
            unit_price: 15.0,
            discount: 0.0,
        });
        request
    }

    #[test]
    fn new_without_token_fails() {
        let config = TaxJarConfig {
            api_token: Secret::new(String::new()),
            ..test_config()
        };
        assert!(TaxJarCalculator::new(config).is_err());
    }

    #[test]
    fn calculate_tax_request_serialization_is_stable() {
        let serialized = serde_json::to_string(&single_item_order()).unwrap();
        let expected = concat!(
            r#"{"from_country":"US","from_zip":"92093","from_state":"CA","#,
            r#""from_city":"La Jolla","from_street":"9500 Gilman Drive","#,
            r#""to_country":"US","to_zip":"90002","to_state":"CA","#,
            r#""to_city":"Los Angeles","to_street":"1335 E 103rd St","#,
            r#""amount":15.0,"shipping":1.5,"#,
            r#""nexus_addresses":[{"id":"Main Location","country":"US","#,
            r#""zip":"92093","state":"CA","city":"La Jolla","#,
            r#""street":"9500 Gilman Drive"}],"#,
            r#""line_items":[{"id":"1","quantity":1,"product_tax_code":"20010","#,
            r#""unit_price":15.0,"discount":0.0}]}"#,
        );
        assert_eq!(serialized, expected);
    }

    #[test]
    fn rate_request_url_with_all_optional_fields() {
        let request = TaxRateRequest {
            zip: "90404".to_string(),
            country: Some("US".to_string()),
            state: Some("CA".to_string()),
            city: Some("Santa Monica".to_string()),
            street: None,
        };
        let url = test_calculator().rate_request_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.taxjar.com/v2/rates/90404?country=US&state=CA&city=Santa+Monica"
        );
    }

    #[test]
    fn rate_request_url_with_some_optional_fields() {
        let request = TaxRateRequest {
            zip: "01463".to_string(),
            country: Some("US".to_string()),
            state: Some("MA".to_string()),
            city: None,
            street: None,
        };
        let url = test_calculator().rate_request_url(&request).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.taxjar.com/v2/rates/01463?country=US&state=MA"
        );
    }

    #[test]
    fn rate_request_url_without_optional_fields_has_no_query() {
        let url = test_calculator()
            .rate_request_url(&TaxRateRequest::for_zip("01463"))
            .unwrap();
        assert_eq!(url.as_str(), "https://api.taxjar.com/v2/rates/01463");
        assert!(url.query().is_none());
    }

    #[test]
    fn parse_calculate_tax_body_extracts_all_fields() {
        let body = r#"{"tax":{"amount_to_collect":1.43,"rate":0.095,
            "freight_taxable":false,"order_total_amount":16.5,
            "shipping":1.5,"taxable_amount":15.0,"has_nexus":true}}"#;

        let data = TaxJarCalculator::parse_calculate_tax_body(body).unwrap();
        assert!((data.amount_to_collect - 1.43).abs() < 1e-9);
        assert_eq!(data.rate, Some(0.095));
        assert!(!data.freight_taxable);
        assert_eq!(data.order_total_amount, Some(16.5));
        assert_eq!(data.shipping, Some(1.5));
        assert_eq!(data.taxable_amount, Some(15.0));
    }

    #[test]
    fn parse_calculate_tax_body_with_only_amount_to_collect() {
        let body = r#"{"tax":{"amount_to_collect":1.43}}"#;

        let data = TaxJarCalculator::parse_calculate_tax_body(body).unwrap();
        assert!((data.amount_to_collect - 1.43).abs() < 1e-9);
        assert_eq!(data.rate, None);
        assert!(!data.freight_taxable);
        assert_eq!(data.order_total_amount, None);
        assert_eq!(data.shipping, None);
        assert_eq!(data.taxable_amount, None);
    }

    #[test]
    fn parse_calculate_tax_body_without_amount_to_collect_is_missing_data() {
        let body = r#"{"tax":{"rate":0.095,"order_total_amount":16.5}}"#;
        let error = TaxJarCalculator::parse_calculate_tax_body(body).unwrap_err();
        assert!(matches!(error, CalculatorError::MissingData));
    }

    #[test]
    fn parse_calculate_tax_body_without_tax_section_is_missing_data() {
        let error = TaxJarCalculator::parse_calculate_tax_body("{}").unwrap_err();
        assert!(matches!(error, CalculatorError::MissingData));
    }

    #[test]
    fn parse_calculate_tax_body_rejects_malformed_json() {
        let error = TaxJarCalculator::parse_calculate_tax_body("{\"tax\":").unwrap_err();
        assert!(matches!(error, CalculatorError::Parse(_)));
    }

    #[test]
    fn parse_tax_rate_body_accepts_string_rates() {
        let body = r#"{"rate":{"city":null,"city_rate":"0.0",
            "combined_district_rate":"0.0","combined_rate":"0.0625",
            "country":"US","country_rate":"0.0","county":null,
            "county_rate":"0.0","freight_taxable":false,"state":"MA",
            "state_rate":"0.0625","zip":"01463"}}"#;

        let data = TaxJarCalculator::parse_tax_rate_body(body).unwrap();
        assert_eq!(data.combined_rate, Some(0.0625));
        assert_eq!(data.state_rate, Some(0.0625));
        assert_eq!(data.combined_district_rate, Some(0.0));
        assert_eq!(data.state.as_deref(), Some("MA"));
        assert_eq!(data.country.as_deref(), Some("US"));
        assert!(data.county.is_none());
        assert!(data.city.is_none());
        assert_eq!(data.zip.as_deref(), Some("01463"));
        assert!(!data.freight_taxable);
    }

    #[test]
    fn parse_tax_rate_body_accepts_numeric_rates() {
        let body = r#"{"rate":{"combined_rate":0.0625,"state":"MA"}}"#;

        let data = TaxJarCalculator::parse_tax_rate_body(body).unwrap();
        assert_eq!(data.combined_rate, Some(0.0625));
        assert_eq!(data.state.as_deref(), Some("MA"));
        assert_eq!(data.country_rate, None);
    }

    #[test]
    fn parse_tax_rate_body_without_rate_section_is_missing_data() {
        let error = TaxJarCalculator::parse_tax_rate_body("{}").unwrap_err();
        assert!(matches!(error, CalculatorError::MissingData));
    }

    #[test]
    fn parse_tax_rate_body_rejects_truncated_json() {
        let error = TaxJarCalculator::parse_tax_rate_body("{\"rate\":{\"zip\"").unwrap_err();
        assert!(matches!(error, CalculatorError::Parse(_)));
    }
}
