//! Extraction backend adapter
//!
//! Everything the dashboard needs from the Python extraction service, behind
//! one async trait. `HttpBackend` is the real implementation; tests stub the
//! trait instead of running a backend.

pub mod types;

use crate::error::{AppError, Result};
use async_trait::async_trait;
use reqwest::multipart;
use reqwest::{Client, StatusCode};
use types::*;
use url::Url;

const SPREADSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// REST operations offered by the extraction backend
#[async_trait]
pub trait ExtractionBackend: Send + Sync {
    /// Raw CSV payload of the reinvested earnings table
    async fn fetch_earnings_csv(&self) -> Result<String>;

    /// Evidence (screenshot + context snippet) for one company
    async fn fetch_evidence(&self, symbol: &str) -> Result<EvidenceResponse>;

    /// Submit a correction for a company's retained earnings figure
    async fn submit_correction(&self, request: &CorrectionRequest) -> Result<CorrectionResponse>;

    /// Submit a correction for one field of one uploaded report
    async fn submit_extraction_correction(
        &self,
        filename: &str,
        field: &str,
        correct_value: &str,
        feedback: &str,
    ) -> Result<CorrectionResponse>;

    /// Kick off the backend scrape/recalculate pipeline
    async fn trigger_refresh(&self) -> Result<StatusResponse>;

    /// Backend-prepared workbook of the company table
    async fn export_excel(&self) -> Result<ExportedFile>;

    /// Workbook built from the rows currently displayed
    async fn export_current_table(&self, rows: &[serde_json::Value]) -> Result<ExportedFile>;

    /// Archived quarterly ownership snapshots
    async fn list_snapshots(&self) -> Result<Vec<SnapshotEntry>>;

    /// Exports generated by dashboard users
    async fn list_user_exports(&self) -> Result<Vec<UserExport>>;

    /// Delete one user export by filename
    async fn delete_user_export(&self, filename: &str) -> Result<StatusResponse>;

    /// Upload a batch of report PDFs for extraction
    async fn upload_pdfs(&self, files: Vec<UploadFile>) -> Result<UploadResponse>;

    /// Ask the backend to clear its persisted extraction data
    async fn clear_data(&self) -> Result<StatusResponse>;
}

/// reqwest-based backend client
pub struct HttpBackend {
    base_url: Url,
    client: Client,
}

impl HttpBackend {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Read a binary export response, recovering the filename from the
    /// Content-Disposition header when the backend provides one.
    async fn read_export(response: reqwest::Response, fallback: &str) -> Result<ExportedFile> {
        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(filename_from_content_disposition)
            .unwrap_or_else(|| fallback.to_string());

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or(SPREADSHEET_CONTENT_TYPE)
            .to_string();

        let bytes = response.bytes().await?.to_vec();

        Ok(ExportedFile {
            filename,
            content_type,
            bytes,
        })
    }
}

#[async_trait]
impl ExtractionBackend for HttpBackend {
    async fn fetch_earnings_csv(&self) -> Result<String> {
        let response = self
            .client
            .get(self.endpoint("/api/reinvested_earnings_results.csv"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }

    async fn fetch_evidence(&self, symbol: &str) -> Result<EvidenceResponse> {
        let response = self
            .client
            .get(self.endpoint(&format!("/api/evidence/{}", urlencoding::encode(symbol))))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!(
                "No evidence available for {}",
                symbol
            )));
        }

        Ok(response.error_for_status()?.json().await?)
    }

    async fn submit_correction(&self, request: &CorrectionRequest) -> Result<CorrectionResponse> {
        let response = self
            .client
            .post(self.endpoint("/api/correct_retained_earnings"))
            .json(request)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn submit_extraction_correction(
        &self,
        filename: &str,
        field: &str,
        correct_value: &str,
        feedback: &str,
    ) -> Result<CorrectionResponse> {
        // Same endpoint as company corrections; the report correction is
        // keyed by filename + field instead of company symbol.
        let payload = serde_json::json!({
            "company_symbol": filename,
            "field": field,
            "correct_value": correct_value,
            "feedback": feedback,
        });

        let response = self
            .client
            .post(self.endpoint("/api/correct_retained_earnings"))
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn trigger_refresh(&self) -> Result<StatusResponse> {
        let response = self
            .client
            .post(self.endpoint("/api/refresh"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn export_excel(&self) -> Result<ExportedFile> {
        let response = self
            .client
            .get(self.endpoint("/api/export_excel"))
            .send()
            .await?
            .error_for_status()?;
        Self::read_export(response, "ownership_dashboard.xlsx").await
    }

    async fn export_current_table(&self, rows: &[serde_json::Value]) -> Result<ExportedFile> {
        let response = self
            .client
            .post(self.endpoint("/api/export_current_table"))
            .json(&serde_json::json!({ "data": rows }))
            .send()
            .await?
            .error_for_status()?;
        Self::read_export(response, "current_table_data.xlsx").await
    }

    async fn list_snapshots(&self) -> Result<Vec<SnapshotEntry>> {
        let response = self
            .client
            .get(self.endpoint("/api/ownership_snapshots"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn list_user_exports(&self) -> Result<Vec<UserExport>> {
        let response = self
            .client
            .get(self.endpoint("/api/user_exports"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn delete_user_export(&self, filename: &str) -> Result<StatusResponse> {
        let response = self
            .client
            .delete(self.endpoint(&format!(
                "/api/user_exports/{}",
                urlencoding::encode(filename)
            )))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound(format!("Export '{}' not found", filename)));
        }

        Ok(response.error_for_status()?.json().await?)
    }

    async fn upload_pdfs(&self, files: Vec<UploadFile>) -> Result<UploadResponse> {
        let mut form = multipart::Form::new();
        for file in files {
            let part = multipart::Part::bytes(file.bytes)
                .file_name(file.filename)
                .mime_str("application/pdf")?;
            form = form.part("files[]", part);
        }

        let response = self
            .client
            .post(self.endpoint("/api/upload_multiple_pdfs"))
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }

    async fn clear_data(&self) -> Result<StatusResponse> {
        let response = self
            .client
            .post(self.endpoint("/api/clear_data"))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json().await?)
    }
}

/// Pull the filename out of a Content-Disposition header value
fn filename_from_content_disposition(header: &str) -> Option<String> {
    let marker = "filename=";
    let start = header.find(marker)? + marker.len();
    let rest = header[start..].trim();

    let filename = match rest.strip_prefix('"') {
        Some(quoted) => quoted.split('"').next()?,
        None => rest.split(';').next()?.trim(),
    };

    if filename.is_empty() {
        None
    } else {
        Some(filename.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_recovered_from_content_disposition() {
        assert_eq!(
            filename_from_content_disposition(
                "attachment; filename=\"pdf_extraction_data_20241114_093000.xlsx\""
            )
            .as_deref(),
            Some("pdf_extraction_data_20241114_093000.xlsx")
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename=export.xlsx; size=42")
                .as_deref(),
            Some("export.xlsx")
        );
        assert_eq!(filename_from_content_disposition("inline"), None);
        assert_eq!(filename_from_content_disposition("attachment; filename=\"\""), None);
    }

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let backend = HttpBackend::new(Url::parse("http://127.0.0.1:5002/").unwrap());
        assert_eq!(
            backend.endpoint("/api/refresh"),
            "http://127.0.0.1:5002/api/refresh"
        );
        assert_eq!(
            backend.endpoint("api/refresh"),
            "http://127.0.0.1:5002/api/refresh"
        );
    }
}
