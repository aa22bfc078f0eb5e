//! Earnings dataset adapter
//!
//! The extraction backend serves its results as a CSV table with a header
//! row. Every header and value is trimmed; rows without a company symbol are
//! dropped.

use crate::backend::ExtractionBackend;
use crate::error::{AppError, Result};
use crate::model::EarningsRecord;
use csv::ReaderBuilder;
use tracing::{info, warn};

/// Loader for the extracted earnings CSV
pub struct EarningsSource;

impl EarningsSource {
    /// Load the earnings table, degrading to an empty dataset on failure
    pub async fn load(backend: &dyn ExtractionBackend) -> Vec<EarningsRecord> {
        match Self::try_load(backend).await {
            Ok(records) => {
                info!("Loaded {} earnings records", records.len());
                records
            }
            Err(e) => {
                warn!("Earnings source unavailable: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_load(backend: &dyn ExtractionBackend) -> Result<Vec<EarningsRecord>> {
        let payload = backend.fetch_earnings_csv().await?;
        parse_earnings_csv(&payload)
    }
}

/// Parse the earnings CSV payload using header-based field mapping
pub(crate) fn parse_earnings_csv(payload: &str) -> Result<Vec<EarningsRecord>> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(payload.as_bytes());

    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|header| header == name);

    let symbol_idx = column("company_symbol").ok_or_else(|| {
        AppError::Validation("Earnings CSV is missing the company_symbol column".to_string())
    })?;
    let retained_idx = column("retained_earnings");
    let reinvested_idx = column("reinvested_earnings");
    let year_idx = column("year");
    let error_idx = column("error");

    let cell = |record: &csv::StringRecord, idx: Option<usize>| -> String {
        idx.and_then(|i| record.get(i))
            .unwrap_or_default()
            .to_string()
    };

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let symbol = row.get(symbol_idx).unwrap_or_default().to_string();
        if symbol.is_empty() {
            continue;
        }

        records.push(EarningsRecord {
            symbol,
            retained_earnings: cell(&row, retained_idx),
            reinvested_earnings: cell(&row, reinvested_idx),
            year: cell(&row, year_idx),
            extraction_error: cell(&row, error_idx),
        });
    }

    Ok(records)
}
