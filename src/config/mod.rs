use anyhow::Result;
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub calculator: CalculatorKind,
    pub taxjar: TaxJarConfig,
}

/// Which calculator implementation the service should delegate to.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CalculatorKind {
    Stub,
    TaxJar,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TaxJarConfig {
    pub api_base_url: String,
    pub api_token: Secret<String>,
    pub timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let calculator = match env::var("TAX_CALCULATOR")
            .unwrap_or_else(|_| "taxjar".to_string())
            .to_lowercase()
            .as_str()
        {
            "stub" => CalculatorKind::Stub,
            "taxjar" => CalculatorKind::TaxJar,
            other => anyhow::bail!("unknown TAX_CALCULATOR value: {other}"),
        };

        let api_base_url = env::var("TAXJAR_API_BASE_URL")
            .unwrap_or_else(|_| "https://api.taxjar.com/v2".to_string());
        let api_token = env::var("TAXJAR_API_TOKEN").unwrap_or_default();
        let timeout_seconds = env::var("TAXJAR_TIMEOUT_SECONDS")
            .unwrap_or_else(|_| "30".to_string())
            .parse()?;

        Ok(Self {
            calculator,
            taxjar: TaxJarConfig {
                api_base_url,
                api_token: Secret::new(api_token),
                timeout_seconds,
            },
        })
    }
}
