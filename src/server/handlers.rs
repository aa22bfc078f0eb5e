//! Dashboard API endpoint handlers
//!
//! Thin shells over the services layer; every error surfaces as an
//! `ErrorResponse` with a matching status code.

use crate::backend::types::{
    CorrectionRequest, EvidenceResponse, ExportedFile, SnapshotEntry, UserExport,
};
use crate::error::{AppError, Result};
use crate::model::UnifiedRow;
use crate::services::{
    ArchiveService, ClearOutcome, CorrectionOutcome, CorrectionService, DashboardService,
    EvidenceService, ExportService, ExtractionCorrectionRequest, PendingUpload, UploadReport,
    UploadService,
};
use crate::state::AppState;
use crate::view::{self, ExtractionView};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Health check endpoint - GET /health or GET /
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "ownership-desk",
    }))
}

// ============================================================================
// Company grid
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Serialize)]
pub struct RowsResponse {
    pub total: usize,
    pub rows: Vec<UnifiedRow>,
}

/// The filtered, sorted company grid - GET /app/rows?search=
pub async fn get_rows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<RowsResponse> {
    let rows = DashboardService::search(&state, &params.search);
    Json(RowsResponse {
        total: rows.len(),
        rows,
    })
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: String,
    pub row_count: usize,
}

/// Run the backend pipeline and rebuild the table - POST /app/refresh
pub async fn refresh(State(state): State<Arc<AppState>>) -> Result<Json<RefreshResponse>> {
    let row_count = DashboardService::refresh(&state).await?;
    Ok(Json(RefreshResponse {
        status: "success".to_string(),
        row_count,
    }))
}

/// Evidence behind one extracted figure - GET /app/evidence/{symbol}
pub async fn get_evidence(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<Json<EvidenceResponse>> {
    Ok(Json(EvidenceService::fetch(&state, &symbol).await?))
}

/// Submit a company correction - POST /app/corrections
pub async fn submit_correction(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CorrectionRequest>,
) -> Result<Json<CorrectionOutcome>> {
    Ok(Json(CorrectionService::submit(&state, request).await?))
}

/// Company table workbook - GET /app/export
pub async fn export_dashboard(State(state): State<Arc<AppState>>) -> Result<Response> {
    let file = ExportService::export_dashboard(&state).await?;
    Ok(spreadsheet_response(file))
}

// ============================================================================
// PDF-extraction table
// ============================================================================

/// The hierarchical extraction grid - GET /app/extractions
pub async fn get_extractions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ExtractionView>> {
    let columns = state.extractions.list()?;
    Ok(Json(view::derive_extraction_view(&columns)))
}

/// Upload a PDF batch - POST /app/extractions/upload (multipart)
pub async fn upload_extractions(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadReport>> {
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload payload: {}", e)))?
    {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read '{}': {}", filename, e)))?
            .to_vec();

        files.push(PendingUpload {
            filename,
            content_type,
            bytes,
        });
    }

    Ok(Json(UploadService::upload_batch(&state, files).await?))
}

/// Submit a report correction - POST /app/extractions/corrections
pub async fn submit_extraction_correction(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ExtractionCorrectionRequest>,
) -> Result<Json<CorrectionOutcome>> {
    Ok(Json(
        CorrectionService::submit_extraction(&state, request).await?,
    ))
}

/// Clear the extraction table - POST /app/extractions/clear
pub async fn clear_extractions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ClearOutcome>> {
    Ok(Json(ArchiveService::clear_extractions(&state).await?))
}

/// Extraction table workbook (successful columns only) - GET /app/extractions/export
pub async fn export_extractions(State(state): State<Arc<AppState>>) -> Result<Response> {
    let file = ExportService::export_extractions(&state).await?;
    Ok(spreadsheet_response(file))
}

/// Drop one uploaded report - DELETE /app/extractions/{filename}
pub async fn delete_extraction(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<serde_json::Value>> {
    ArchiveService::remove_extraction(&state, &filename)?;
    Ok(Json(serde_json::json!({
        "status": "success",
        "filename": filename,
    })))
}

// ============================================================================
// Archive drawer
// ============================================================================

/// Archived quarterly snapshots - GET /app/archive/snapshots
pub async fn get_snapshots(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SnapshotEntry>>> {
    Ok(Json(ArchiveService::snapshots(&state).await?))
}

/// User export files - GET /app/archive/exports
pub async fn get_user_exports(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<UserExport>>> {
    Ok(Json(ArchiveService::user_exports(&state).await?))
}

/// Delete one user export - DELETE /app/archive/exports/{filename}
pub async fn delete_user_export(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let status = ArchiveService::delete_user_export(&state, &filename).await?;
    Ok(Json(serde_json::json!({
        "status": status.status,
        "filename": filename,
    })))
}

/// Stream a workbook back as a browser download
fn spreadsheet_response(file: ExportedFile) -> Response {
    (
        [
            (header::CONTENT_TYPE, file.content_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file.filename),
            ),
        ],
        file.bytes,
    )
        .into_response()
}
