//! Ownership dataset adapter
//!
//! The scraper publishes the foreign ownership table as a JSON document,
//! either on disk next to the data directory or on the frontend's static
//! path depending on the deployment.

use crate::config::{AppConfig, OwnershipLocation};
use crate::error::Result;
use crate::model::OwnershipRecord;
use reqwest::Client;
use tracing::{info, warn};

/// Loader for the scraped ownership JSON
pub struct OwnershipSource {
    client: Client,
}

impl OwnershipSource {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Load the ownership table, degrading to an empty dataset on failure
    pub async fn load(&self, config: &AppConfig) -> Vec<OwnershipRecord> {
        match self.try_load(config).await {
            Ok(records) => {
                info!("Loaded {} ownership records", records.len());
                records
            }
            Err(e) => {
                warn!("Ownership source unavailable: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_load(&self, config: &AppConfig) -> Result<Vec<OwnershipRecord>> {
        let body = match &config.ownership_data {
            OwnershipLocation::File(path) => tokio::fs::read_to_string(path).await?,
            OwnershipLocation::Remote(url) => {
                self.client
                    .get(url.clone())
                    .send()
                    .await?
                    .error_for_status()?
                    .text()
                    .await?
            }
        };

        Ok(serde_json::from_str(&body)?)
    }
}

impl Default for OwnershipSource {
    fn default() -> Self {
        Self::new()
    }
}
