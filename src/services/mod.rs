//! Services Layer
//!
//! Business logic shared by every dashboard surface; the HTTP handlers stay
//! thin and call into these.
//!
//! # Services
//!
//! - `DashboardService` - Fetch both sources, reconcile, derive the grid
//! - `CorrectionService` - Submit corrections, patch the row model
//! - `EvidenceService` - Evidence lookup with per-symbol caching
//! - `UploadService` - PDF batch validation, upload, result partitioning
//! - `ExportService` - Spreadsheet export calls
//! - `ArchiveService` - Snapshot/export listings, delete, clear-all

pub mod archive_service;
pub mod correction_service;
pub mod dashboard_service;
pub mod evidence_service;
pub mod export_service;
pub mod upload_service;

pub use archive_service::{ArchiveService, ClearOutcome};
pub use correction_service::{CorrectionService, CorrectionOutcome, ExtractionCorrectionRequest};
pub use dashboard_service::DashboardService;
pub use evidence_service::EvidenceService;
pub use export_service::ExportService;
pub use upload_service::{PendingUpload, SelectionRejection, UploadFailure, UploadReport, UploadService};
