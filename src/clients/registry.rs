use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::config::RegistryConfig;
use crate::ingest::csv_import::normalize_tax_id;

/// Errors from the statistical-registry vendor
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Registry request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Registry API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Invalid tax id: {0}")]
    InvalidTaxId(String),
}

#[derive(Debug, Deserialize)]
struct RegistryResponse {
    result: RegistryResult,
}

#[derive(Debug, Deserialize)]
struct RegistryResult {
    subject: Option<RegistrySubject>,
}

#[derive(Debug, Deserialize)]
struct RegistrySubject {
    name: String,
    #[serde(rename = "workingAddress")]
    working_address: Option<String>,
    #[serde(rename = "pkdMain")]
    pkd_main: Option<String>,
    #[serde(rename = "statusVat")]
    status_vat: Option<String>,
}

/// Company master data looked up by tax id
#[derive(Debug, Clone)]
pub struct RegistryCompany {
    pub name: String,
    pub address: Option<String>,
    /// Main activity (PKD) code
    pub activity_code: Option<String>,
    pub vat_active: bool,
}

/// Client for the statistical-registry lookup used by lead enrichment
pub struct RegistryClient {
    client: Client,
    config: RegistryConfig,
}

impl RegistryClient {
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.api.timeout)
                .build()
                .unwrap_or_default(),
            config,
        }
    }

    /// Look up company master data; None when the registry has no entry
    pub async fn lookup(&self, tax_id: &str) -> Result<Option<RegistryCompany>, RegistryError> {
        let normalized = normalize_tax_id(tax_id)
            .ok_or_else(|| RegistryError::InvalidTaxId(tax_id.to_string()))?;

        let url = format!("{}/search/nip/{}", self.config.api.base_url, normalized);

        let response = self
            .client
            .get(&url)
            .query(&[("key", &self.config.api.api_key)])
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RegistryError::Status(response.status()));
        }

        let body: RegistryResponse = response.json().await?;

        Ok(body.result.subject.map(|subject| RegistryCompany {
            name: subject.name,
            address: subject.working_address,
            activity_code: subject.pkd_main,
            vat_active: subject.status_vat.as_deref() == Some("Czynny"),
        }))
    }
}
