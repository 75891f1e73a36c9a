//! Request input models shared by every calculator implementation.
//!
//! Field names on [`TaxCalculationRequest`] are the TaxJar wire names; the
//! struct serializes directly into the provider's request body, so renaming a
//! field here changes the wire contract.

use serde::Serialize;
use validator::Validate;

/// Order input for a sales tax calculation.
#[derive(Debug, Clone, Default, Serialize, Validate)]
pub struct TaxCalculationRequest {
    pub from_country: String,
    #[validate(length(
        min = 1,
        message = "'from' zip code in calculate sales tax request input is empty"
    ))]
    pub from_zip: String,
    pub from_state: String,
    pub from_city: String,
    pub from_street: String,
    pub to_country: String,
    #[validate(length(
        min = 1,
        message = "'to' zip code in calculate sales tax request input is empty"
    ))]
    pub to_zip: String,
    pub to_state: String,
    pub to_city: String,
    pub to_street: String,
    /// Order amount, excluding shipping, as a currency-agnostic unit.
    pub amount: f64,
    pub shipping: f64,
    pub nexus_addresses: Vec<NexusAddress>,
    pub line_items: Vec<LineItem>,
}

impl TaxCalculationRequest {
    pub fn add_nexus_address(&mut self, address: NexusAddress) {
        self.nexus_addresses.push(address);
    }

    pub fn add_line_item(&mut self, item: LineItem) {
        self.line_items.push(item);
    }
}

/// A location where the seller has a tax-collection obligation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NexusAddress {
    pub id: String,
    pub country: String,
    pub zip: String,
    pub state: String,
    pub city: String,
    pub street: String,
}

/// One orderable unit within a transaction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LineItem {
    pub id: String,
    pub quantity: u32,
    pub product_tax_code: String,
    pub unit_price: f64,
    pub discount: f64,
}

/// Location input for a tax rate lookup. Only the zip code is required;
/// absent optional fields are omitted from the provider query entirely.
#[derive(Debug, Clone, Default, Validate)]
pub struct TaxRateRequest {
    #[validate(length(
        min = 1,
        message = "zip code in sales tax rate request input is empty"
    ))]
    pub zip: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
}

impl TaxRateRequest {
    pub fn for_zip(zip: impl Into<String>) -> Self {
        Self {
            zip: zip.into(),
            ..Self::default()
        }
    }
}
