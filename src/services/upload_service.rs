//! Upload Service
//!
//! PDF batch uploads: all-or-nothing client-side validation, one multipart
//! request, and per-file partitioning of the backend's results. Partial
//! success is the expected common case, not an error state.

use crate::backend::types::{UploadFile, UploadFileResult};
use crate::error::{AppError, Result};
use crate::events::DashboardEvent;
use crate::extraction::ExtractionColumn;
use crate::state::AppState;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::info;

/// Declared content type every selected file must carry
const EXPECTED_CONTENT_TYPE: &str = "application/pdf";

/// One file selected in the UI, before any network call
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Why an entire selection was rejected
#[derive(Debug, Clone, Serialize)]
pub struct SelectionRejection {
    pub duplicates: Vec<String>,
    pub wrong_type: Vec<String>,
}

impl fmt::Display for SelectionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.duplicates.is_empty() {
            write!(f, "Already uploaded: {}", self.duplicates.join(", "))?;
            if !self.wrong_type.is_empty() {
                write!(f, "; ")?;
            }
        }
        if !self.wrong_type.is_empty() {
            write!(f, "Not PDF files: {}", self.wrong_type.join(", "))?;
        }
        Ok(())
    }
}

/// One file the backend failed to process
#[derive(Debug, Clone, Serialize)]
pub struct UploadFailure {
    pub filename: String,
    pub reason: String,
}

/// Outcome of a batch upload
#[derive(Debug, Serialize)]
pub struct UploadReport {
    pub total_files: usize,
    pub accepted: Vec<String>,
    pub failed: Vec<UploadFailure>,
}

/// PDF batch upload logic
pub struct UploadService;

impl UploadService {
    /// Validate a selection against the already-stored filenames.
    ///
    /// All-or-nothing: one duplicate filename or one non-PDF file rejects
    /// the whole selection, naming every offender.
    pub fn validate_selection(
        existing: &[String],
        candidates: &[PendingUpload],
    ) -> std::result::Result<(), SelectionRejection> {
        let known: HashSet<&str> = existing.iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut duplicates = Vec::new();
        let mut wrong_type = Vec::new();

        for candidate in candidates {
            let name = candidate.filename.as_str();
            if known.contains(name) || !seen.insert(name) {
                duplicates.push(candidate.filename.clone());
            }
            if candidate.content_type != EXPECTED_CONTENT_TYPE {
                wrong_type.push(candidate.filename.clone());
            }
        }

        if duplicates.is_empty() && wrong_type.is_empty() {
            Ok(())
        } else {
            Err(SelectionRejection {
                duplicates,
                wrong_type,
            })
        }
    }

    /// Validate, upload, and store the successful extractions.
    pub async fn upload_batch(state: &AppState, files: Vec<PendingUpload>) -> Result<UploadReport> {
        if files.is_empty() {
            return Err(AppError::Validation("No files selected".to_string()));
        }

        let existing = state.extractions.filenames()?;
        Self::validate_selection(&existing, &files)
            .map_err(|rejection| AppError::Validation(rejection.to_string()))?;

        let payload: Vec<UploadFile> = files
            .into_iter()
            .map(|file| UploadFile {
                filename: file.filename,
                bytes: file.bytes,
            })
            .collect();
        let total_files = payload.len();

        let response = state.backend.upload_pdfs(payload).await?;
        let (columns, failed) = partition_batch(response.results);

        for column in &columns {
            state.extractions.insert(column)?;
        }
        if !columns.is_empty() {
            state.events.publish(DashboardEvent::ExtractionsChanged);
        }

        info!(
            "Upload batch: {}/{} files extracted",
            columns.len(),
            total_files
        );

        Ok(UploadReport {
            total_files,
            accepted: columns.into_iter().map(|c| c.filename).collect(),
            failed,
        })
    }
}

/// Split per-file results into storable columns and individual failures
fn partition_batch(results: Vec<UploadFileResult>) -> (Vec<ExtractionColumn>, Vec<UploadFailure>) {
    let mut columns = Vec::new();
    let mut failed = Vec::new();

    for result in results {
        match (result.success, result.data) {
            (true, Some(data)) if !data.is_empty() => columns.push(ExtractionColumn {
                filename: result.filename,
                data,
                screenshot_paths: result.screenshot_paths,
                extraction_error: None,
            }),
            (_, _) => failed.push(UploadFailure {
                filename: result.filename,
                reason: result
                    .error
                    .unwrap_or_else(|| "Extraction produced no data".to_string()),
            }),
        }
    }

    (columns, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn pending(filename: &str, content_type: &str) -> PendingUpload {
        PendingUpload {
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            bytes: vec![0x25, 0x50, 0x44, 0x46],
        }
    }

    fn file_result(filename: &str, success: bool, error: Option<&str>) -> UploadFileResult {
        let data = success.then(|| {
            let mut map = BTreeMap::new();
            map.insert("DATE".to_string(), "2024-11-14".to_string());
            map
        });
        UploadFileResult {
            filename: filename.to_string(),
            success,
            data,
            error: error.map(str::to_string),
            screenshot_paths: Vec::new(),
        }
    }

    #[test]
    fn duplicate_rejection_is_all_or_nothing() {
        let existing = vec!["week-46.pdf".to_string()];
        let selection = vec![pending("week-47.pdf", "application/pdf"),
                             pending("week-46.pdf", "application/pdf")];

        let rejection = UploadService::validate_selection(&existing, &selection).unwrap_err();

        assert_eq!(rejection.duplicates, vec!["week-46.pdf"]);
        assert!(rejection.wrong_type.is_empty());
        assert!(rejection.to_string().contains("week-46.pdf"));
    }

    #[test]
    fn duplicates_within_the_selection_are_caught() {
        let selection = vec![pending("a.pdf", "application/pdf"),
                             pending("a.pdf", "application/pdf")];

        let rejection = UploadService::validate_selection(&[], &selection).unwrap_err();

        assert_eq!(rejection.duplicates, vec!["a.pdf"]);
    }

    #[test]
    fn wrong_content_type_names_every_offender() {
        let selection = vec![
            pending("fine.pdf", "application/pdf"),
            pending("notes.txt", "text/plain"),
            pending("scan.png", "image/png"),
        ];

        let rejection = UploadService::validate_selection(&[], &selection).unwrap_err();

        assert_eq!(rejection.wrong_type, vec!["notes.txt", "scan.png"]);
    }

    #[test]
    fn clean_selection_passes() {
        let selection = vec![pending("a.pdf", "application/pdf")];
        assert!(UploadService::validate_selection(&[], &selection).is_ok());
    }

    #[test]
    fn partition_keeps_successes_and_reports_failures_individually() {
        let results = vec![
            file_result("one.pdf", true, None),
            file_result("two.pdf", false, Some("no headings found")),
            file_result("three.pdf", true, None),
        ];

        let (columns, failed) = partition_batch(results);

        let kept: Vec<&str> = columns.iter().map(|c| c.filename.as_str()).collect();
        assert_eq!(kept, vec!["one.pdf", "three.pdf"]);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].filename, "two.pdf");
        assert_eq!(failed[0].reason, "no headings found");
    }

    #[test]
    fn success_without_data_counts_as_failure() {
        let mut result = file_result("odd.pdf", true, None);
        result.data = Some(BTreeMap::new());

        let (columns, failed) = partition_batch(vec![result]);

        assert!(columns.is_empty());
        assert_eq!(failed[0].reason, "Extraction produced no data");
    }
}
