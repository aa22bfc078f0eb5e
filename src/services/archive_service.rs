//! Archive Service
//!
//! Snapshot and user-export listings, export deletion, and the clear-all
//! workflow. Clearing resets the local extraction table first; the backend
//! clear is best-effort and never rolls the local reset back.

use crate::backend::types::{SnapshotEntry, StatusResponse, UserExport};
use crate::error::{AppError, Result};
use crate::events::DashboardEvent;
use crate::state::AppState;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::cmp::Reverse;
use tracing::{info, warn};

const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Outcome of a clear-all: the local table is always gone, the backend side
/// may have failed
#[derive(Debug, Serialize)]
pub struct ClearOutcome {
    pub backend_cleared: bool,
    pub backend_error: Option<String>,
}

pub struct ArchiveService;

impl ArchiveService {
    /// Archived quarterly snapshots
    pub async fn snapshots(state: &AppState) -> Result<Vec<SnapshotEntry>> {
        state.backend.list_snapshots().await
    }

    /// User-generated export files, newest first
    pub async fn user_exports(state: &AppState) -> Result<Vec<UserExport>> {
        let mut exports = state.backend.list_user_exports().await?;
        sort_newest_first(&mut exports);
        Ok(exports)
    }

    /// Delete one user export by filename
    pub async fn delete_user_export(state: &AppState, filename: &str) -> Result<StatusResponse> {
        if filename.trim().is_empty() {
            return Err(AppError::Validation("Missing export filename".to_string()));
        }

        let status = state.backend.delete_user_export(filename).await?;
        if !status.is_success() {
            return Err(AppError::Backend(status.message_or_status()));
        }

        info!("Deleted export '{}'", filename);
        Ok(status)
    }

    /// Drop one uploaded report from the local extraction table. The
    /// backend contract has no per-file delete; its store is only cleared
    /// wholesale.
    pub fn remove_extraction(state: &AppState, filename: &str) -> Result<()> {
        if !state.extractions.remove(filename)? {
            return Err(AppError::NotFound(format!(
                "'{}' is not in the extraction table",
                filename
            )));
        }

        state.events.publish(DashboardEvent::ExtractionsChanged);
        info!("Removed '{}' from the extraction table", filename);
        Ok(())
    }

    /// Clear the extraction table, locally and (best-effort) on the backend
    pub async fn clear_extractions(state: &AppState) -> Result<ClearOutcome> {
        state.extractions.clear()?;
        state.events.publish(DashboardEvent::ExtractionsChanged);
        info!("Cleared local extraction table");

        match state.backend.clear_data().await {
            Ok(status) if status.is_success() => Ok(ClearOutcome {
                backend_cleared: true,
                backend_error: None,
            }),
            Ok(status) => {
                warn!("Backend refused to clear: {}", status.message_or_status());
                Ok(ClearOutcome {
                    backend_cleared: false,
                    backend_error: Some(status.message_or_status()),
                })
            }
            Err(e) => {
                warn!("Backend clear failed: {}", e);
                Ok(ClearOutcome {
                    backend_cleared: false,
                    backend_error: Some(e.to_string()),
                })
            }
        }
    }
}

/// Sort exports newest first; unparseable dates sink to the end
fn sort_newest_first(exports: &mut [UserExport]) {
    exports.sort_by_key(|export| {
        Reverse(NaiveDateTime::parse_from_str(&export.export_date, EXPORT_DATE_FORMAT).ok())
    });
}
