//! Export Service
//!
//! Spreadsheet exports are generated by the backend; this service decides
//! what to send it and hands the binary stream through.

use crate::backend::types::ExportedFile;
use crate::error::{AppError, Result};
use crate::extraction::{self, ExtractionColumn, MetricField};
use crate::state::AppState;
use tracing::info;

pub struct ExportService;

impl ExportService {
    /// Backend-prepared workbook of the company table
    pub async fn export_dashboard(state: &AppState) -> Result<ExportedFile> {
        let file = state.backend.export_excel().await?;
        info!("Exported dashboard workbook '{}'", file.filename);
        Ok(file)
    }

    /// Workbook of the currently displayed *successful* extraction columns.
    /// Failed columns never reach the export.
    pub async fn export_extractions(state: &AppState) -> Result<ExportedFile> {
        let columns = state.extractions.list()?;
        let (successful, _) = extraction::partition(&columns);

        if successful.is_empty() {
            return Err(AppError::Validation(
                "No extraction data to export".to_string(),
            ));
        }

        let rows: Vec<serde_json::Value> = successful.iter().map(|c| column_to_row(c)).collect();
        let file = state.backend.export_current_table(&rows).await?;
        info!(
            "Exported {} extraction rows to '{}'",
            rows.len(),
            file.filename
        );
        Ok(file)
    }
}

/// One export row: every fixed field, empty string when absent
fn column_to_row(column: &ExtractionColumn) -> serde_json::Value {
    let mut row = serde_json::Map::new();
    for field in MetricField::ALL {
        let value = column
            .data
            .get(field.as_str())
            .cloned()
            .unwrap_or_default();
        row.insert(field.as_str().to_string(), serde_json::Value::String(value));
    }
    serde_json::Value::Object(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn export_rows_carry_every_fixed_field() {
        let mut data = BTreeMap::new();
        data.insert("DATE".to_string(), "2024-11-14".to_string());
        data.insert(
            "Foreign_ValueTraded_Total".to_string(),
            "98765".to_string(),
        );
        let column = ExtractionColumn {
            filename: "report.pdf".to_string(),
            data,
            screenshot_paths: Vec::new(),
            extraction_error: None,
        };

        let row = column_to_row(&column);

        assert_eq!(row["DATE"], "2024-11-14");
        assert_eq!(row["Foreign_ValueTraded_Total"], "98765");
        assert_eq!(row["GCC_ValueTraded_Total"], "");
        assert_eq!(
            row.as_object().unwrap().len(),
            MetricField::ALL.len()
        );
    }
}
