//! Extraction backend payload types
//!
//! The backend is a Python service and is loose about value types: numeric
//! fields arrive as strings, integers, or floats depending on the code path
//! that produced them. The deserialization helpers below absorb that.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Flexible Deserialization Helpers
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum Stringly {
    String(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Stringly {
    fn into_string(self) -> Option<String> {
        match self {
            Stringly::String(s) => Some(s),
            Stringly::Int(i) => Some(i.to_string()),
            Stringly::Float(f) => Some(f.to_string()),
            Stringly::Bool(b) => Some(b.to_string()),
            Stringly::Null => None,
        }
    }
}

/// Deserialize a value that could be a string, a number, or null
fn deserialize_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Stringly>::deserialize(deserializer)?.and_then(Stringly::into_string))
}

/// Deserialize a map whose values could be strings, numbers, or null.
/// Null values are kept as empty strings so field presence survives.
fn deserialize_stringly_map<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<BTreeMap<String, String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Stringly>>::deserialize(deserializer)?;
    Ok(raw.map(|map| {
        map.into_iter()
            .map(|(key, value)| (key, value.into_string().unwrap_or_default()))
            .collect()
    }))
}

// ============================================================================
// Backend Responses
// ============================================================================

/// Generic status-only response
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// Message text, falling back to the status tag
    pub fn message_or_status(&self) -> String {
        self.message.clone().unwrap_or_else(|| self.status.clone())
    }
}

/// Evidence for one extracted figure: screenshot plus surrounding text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvidenceResponse {
    #[serde(default)]
    pub company_symbol: Option<String>,
    #[serde(default)]
    pub screenshot_url: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub extracted_value: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
}

/// Correction submission payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRequest {
    pub company_symbol: String,
    pub correct_value: String,
    #[serde(default)]
    pub feedback: String,
}

/// Fields the backend reports back after accepting a correction
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdatedEarnings {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub retained_earnings: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub reinvested_earnings: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub error: Option<String>,
}

/// Response to a correction submission
#[derive(Debug, Clone, Deserialize)]
pub struct CorrectionResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub updated: Option<UpdatedEarnings>,
}

impl CorrectionResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Per-file outcome of a batch upload
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFileResult {
    #[serde(default)]
    pub filename: String,
    pub success: bool,
    #[serde(default, deserialize_with = "deserialize_stringly_map")]
    pub data: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub screenshot_paths: Vec<String>,
}

/// Batch upload response
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default)]
    pub total_files: u32,
    #[serde(default)]
    pub successful_uploads: u32,
    #[serde(default)]
    pub results: Vec<UploadFileResult>,
}

/// One archived quarterly snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotEntry {
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub year: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_string")]
    pub quarter: Option<String>,
    #[serde(default)]
    pub snapshot_date: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// One user-generated export file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserExport {
    /// `YYYY-MM-DD HH:mm:ss`
    #[serde(default)]
    pub export_date: String,
    pub filename: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

// ============================================================================
// Client-side request types
// ============================================================================

/// One file ready for the multipart upload call
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// A binary spreadsheet streamed back by an export call
#[derive(Debug, Clone)]
pub struct ExportedFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stringly_values_normalize_to_strings() {
        let response: UploadFileResult = serde_json::from_str(
            r#"{
                "filename": "report.pdf",
                "success": true,
                "data": {"DATE": "2024-11-14", "Saudi_ValueTraded_Individuals": 1234567, "GCC_ValueTraded_Total": null}
            }"#,
        )
        .unwrap();

        let data = response.data.unwrap();
        assert_eq!(data["DATE"], "2024-11-14");
        assert_eq!(data["Saudi_ValueTraded_Individuals"], "1234567");
        assert_eq!(data["GCC_ValueTraded_Total"], "");
    }

    #[test]
    fn updated_fields_accept_numbers() {
        let response: CorrectionResponse = serde_json::from_str(
            r#"{"status": "success", "updated": {"retained_earnings": 4200.5, "year": "2023"}}"#,
        )
        .unwrap();

        assert!(response.is_success());
        let updated = response.updated.unwrap();
        assert_eq!(updated.retained_earnings.as_deref(), Some("4200.5"));
        assert_eq!(updated.year.as_deref(), Some("2023"));
        assert_eq!(updated.reinvested_earnings, None);
    }
}
