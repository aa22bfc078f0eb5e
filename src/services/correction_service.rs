//! Correction Service
//!
//! The only server-to-client feedback loop: a user override is sent to the
//! backend and, on success, patched into the in-memory model. Failures
//! propagate to the submitting control instead of vanishing.

use crate::backend::types::CorrectionRequest;
use crate::error::{AppError, Result};
use crate::events::DashboardEvent;
use crate::extraction::MetricField;
use crate::state::{AppState, RowPatch};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What a correction submission did
#[derive(Debug, Clone, Serialize)]
pub struct CorrectionOutcome {
    pub target: String,
    /// False when the backend accepted the correction but no local row
    /// matched (e.g. the table was refreshed while the form was open)
    pub applied: bool,
}

/// Correction for one field of one uploaded report
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionCorrectionRequest {
    pub filename: String,
    pub field: String,
    pub correct_value: String,
    #[serde(default)]
    pub feedback: String,
}

/// Correction submission logic
pub struct CorrectionService;

impl CorrectionService {
    /// Submit a company correction and patch the matching unified row
    pub async fn submit(state: &AppState, request: CorrectionRequest) -> Result<CorrectionOutcome> {
        let symbol = request.company_symbol.trim().to_string();
        if symbol.is_empty() {
            return Err(AppError::Validation(
                "A correction needs a company symbol".to_string(),
            ));
        }

        let response = state.backend.submit_correction(&request).await?;
        if !response.is_success() {
            return Err(AppError::Backend(
                response
                    .message
                    .unwrap_or_else(|| "Correction rejected".to_string()),
            ));
        }

        let patch = RowPatch::from(response.updated.unwrap_or_default());
        let applied = state.rows.patch(&symbol, &patch);

        if applied {
            state.evidence_cache.remove(&symbol);
            state.events.publish(DashboardEvent::CorrectionApplied {
                symbol: symbol.clone(),
            });
            info!("Applied correction for {}", symbol);
        } else {
            warn!("Correction accepted for {} but no local row matched", symbol);
        }

        Ok(CorrectionOutcome {
            target: symbol,
            applied,
        })
    }

    /// Submit a report correction and patch the extraction store
    pub async fn submit_extraction(
        state: &AppState,
        request: ExtractionCorrectionRequest,
    ) -> Result<CorrectionOutcome> {
        let field = MetricField::parse(&request.field).ok_or_else(|| {
            AppError::Validation(format!("Unknown metric field '{}'", request.field))
        })?;

        let response = state
            .backend
            .submit_extraction_correction(
                &request.filename,
                field.as_str(),
                &request.correct_value,
                &request.feedback,
            )
            .await?;
        if !response.is_success() {
            return Err(AppError::Backend(
                response
                    .message
                    .unwrap_or_else(|| "Correction rejected".to_string()),
            ));
        }

        let applied =
            state
                .extractions
                .patch_field(&request.filename, field.as_str(), &request.correct_value)?;

        if applied {
            state
                .events
                .publish(DashboardEvent::ExtractionCorrectionApplied {
                    filename: request.filename.clone(),
                    field: field.as_str().to_string(),
                });
            info!(
                "Applied correction for {} / {}",
                request.filename,
                field.as_str()
            );
        } else {
            warn!(
                "Correction accepted for {} but the file is not in the local table",
                request.filename
            );
        }

        Ok(CorrectionOutcome {
            target: request.filename,
            applied,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::*;
    use crate::backend::ExtractionBackend;
    use crate::config::{AppConfig, OwnershipLocation};
    use crate::error::Result;
    use crate::extraction::ExtractionStore;
    use crate::model::{OwnershipRecord, UnifiedRow};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tempfile::TempDir;
    use url::Url;

    /// Stub backend that accepts every correction
    struct AcceptingBackend {
        updated: UpdatedEarnings,
    }

    #[async_trait]
    impl ExtractionBackend for AcceptingBackend {
        async fn fetch_earnings_csv(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn fetch_evidence(&self, _symbol: &str) -> Result<EvidenceResponse> {
            Err(AppError::NotFound("no evidence".to_string()))
        }

        async fn submit_correction(
            &self,
            _request: &CorrectionRequest,
        ) -> Result<CorrectionResponse> {
            Ok(CorrectionResponse {
                status: "success".to_string(),
                message: None,
                updated: Some(self.updated.clone()),
            })
        }

        async fn submit_extraction_correction(
            &self,
            _filename: &str,
            _field: &str,
            _correct_value: &str,
            _feedback: &str,
        ) -> Result<CorrectionResponse> {
            Ok(CorrectionResponse {
                status: "success".to_string(),
                message: None,
                updated: None,
            })
        }

        async fn trigger_refresh(&self) -> Result<StatusResponse> {
            Ok(StatusResponse {
                status: "success".to_string(),
                message: None,
            })
        }

        async fn export_excel(&self) -> Result<ExportedFile> {
            unimplemented!()
        }

        async fn export_current_table(
            &self,
            _rows: &[serde_json::Value],
        ) -> Result<ExportedFile> {
            unimplemented!()
        }

        async fn list_snapshots(&self) -> Result<Vec<SnapshotEntry>> {
            Ok(Vec::new())
        }

        async fn list_user_exports(&self) -> Result<Vec<UserExport>> {
            Ok(Vec::new())
        }

        async fn delete_user_export(&self, _filename: &str) -> Result<StatusResponse> {
            unimplemented!()
        }

        async fn upload_pdfs(&self, _files: Vec<UploadFile>) -> Result<UploadResponse> {
            unimplemented!()
        }

        async fn clear_data(&self) -> Result<StatusResponse> {
            Ok(StatusResponse {
                status: "success".to_string(),
                message: None,
            })
        }
    }

    fn test_state(dir: &TempDir, updated: UpdatedEarnings) -> AppState {
        let config = AppConfig {
            backend_url: Url::parse("http://127.0.0.1:5002").unwrap(),
            host: "127.0.0.1".to_string(),
            port: 0,
            data_dir: dir.path().to_path_buf(),
            ownership_data: OwnershipLocation::File(dir.path().join("ownership.json")),
        };
        let store = Arc::new(ExtractionStore::new(&dir.path().join("store.db")).unwrap());
        AppState::with_backend(config, Arc::new(AcceptingBackend { updated }), store)
    }

    fn seed_rows(state: &AppState, symbols: &[&str]) {
        let generation = state.rows.begin_refresh();
        let rows: Vec<UnifiedRow> = symbols
            .iter()
            .map(|symbol| {
                UnifiedRow::joined(
                    OwnershipRecord {
                        symbol: symbol.to_string(),
                        company_name: format!("Company {}", symbol),
                        foreign_ownership: String::new(),
                        max_allowed: String::new(),
                        investor_limit: String::new(),
                    },
                    None,
                )
            })
            .collect();
        state.rows.install(generation, rows);
    }

    #[tokio::test]
    async fn accepted_correction_patches_the_matching_row() {
        let dir = TempDir::new().unwrap();
        let state = test_state(
            &dir,
            UpdatedEarnings {
                retained_earnings: Some("777".to_string()),
                year: Some("2024".to_string()),
                ..Default::default()
            },
        );
        seed_rows(&state, &["1050", "2010"]);
        let mut events = state.events.subscribe();

        let outcome = CorrectionService::submit(
            &state,
            CorrectionRequest {
                company_symbol: "1050".to_string(),
                correct_value: "777".to_string(),
                feedback: "was misread".to_string(),
            },
        )
        .await
        .unwrap();

        assert!(outcome.applied);
        let rows = state.rows.snapshot();
        assert_eq!(rows[0].retained_earnings, "777");
        assert_eq!(rows[0].year, "2024");
        assert_eq!(rows[1].retained_earnings, "");

        assert!(matches!(
            events.try_recv().unwrap(),
            crate::events::DashboardEvent::CorrectionApplied { .. }
        ));
    }

    #[tokio::test]
    async fn blank_symbol_is_rejected_before_any_network_call() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, UpdatedEarnings::default());

        let result = CorrectionService::submit(
            &state,
            CorrectionRequest {
                company_symbol: "  ".to_string(),
                correct_value: "1".to_string(),
                feedback: String::new(),
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn extraction_correction_rejects_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let state = test_state(&dir, UpdatedEarnings::default());

        let result = CorrectionService::submit_extraction(
            &state,
            ExtractionCorrectionRequest {
                filename: "report.pdf".to_string(),
                field: "Not_A_Field".to_string(),
                correct_value: "1".to_string(),
                feedback: String::new(),
            },
        )
        .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
