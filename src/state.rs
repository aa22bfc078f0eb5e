//! Application state management

use crate::backend::types::{EvidenceResponse, UpdatedEarnings};
use crate::backend::{ExtractionBackend, HttpBackend};
use crate::config::AppConfig;
use crate::error::Result;
use crate::events::EventBus;
use crate::extraction::ExtractionStore;
use crate::model::UnifiedRow;
use crate::sources::OwnershipSource;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Extraction store filename under the data directory
const STORE_FILE: &str = "ownership_desk.db";

/// Fields of a unified row a correction may overwrite
#[derive(Debug, Clone, Default)]
pub struct RowPatch {
    pub retained_earnings: Option<String>,
    pub reinvested_earnings: Option<String>,
    pub year: Option<String>,
    pub extraction_error: Option<String>,
}

impl From<UpdatedEarnings> for RowPatch {
    fn from(updated: UpdatedEarnings) -> Self {
        Self {
            retained_earnings: updated.retained_earnings,
            reinvested_earnings: updated.reinvested_earnings,
            year: updated.year,
            extraction_error: updated.error,
        }
    }
}

/// The single shared unified row collection.
///
/// All writers go through these methods. Refreshes carry a generation token
/// so a late-arriving stale fetch is discarded instead of overwriting newer
/// data.
pub struct RowStore {
    rows: RwLock<Vec<UnifiedRow>>,
    generation: AtomicU64,
}

impl RowStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            generation: AtomicU64::new(0),
        }
    }

    /// Start a refresh; the returned generation must be handed to `install`
    pub fn begin_refresh(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replace the collection if `generation` is still the latest refresh.
    /// Returns whether the rows were installed.
    pub fn install(&self, generation: u64, rows: Vec<UnifiedRow>) -> bool {
        let mut guard = self.rows.write();
        if self.generation.load(Ordering::SeqCst) != generation {
            return false;
        }
        *guard = rows;
        true
    }

    /// Clone of the current collection
    pub fn snapshot(&self) -> Vec<UnifiedRow> {
        self.rows.read().clone()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    /// Patch the earnings-side fields of the one row matching `symbol`.
    ///
    /// Fields the patch omits are reset to the empty string, matching what
    /// the backend reports after a correction. Never inserts or removes
    /// rows. Returns whether a row matched.
    pub fn patch(&self, symbol: &str, patch: &RowPatch) -> bool {
        let symbol = symbol.trim();
        let mut rows = self.rows.write();

        match rows.iter_mut().find(|row| row.symbol.trim() == symbol) {
            Some(row) => {
                row.retained_earnings = patch.retained_earnings.clone().unwrap_or_default();
                row.reinvested_earnings = patch.reinvested_earnings.clone().unwrap_or_default();
                row.year = patch.year.clone().unwrap_or_default();
                row.extraction_error = patch.extraction_error.clone().unwrap_or_default();
                true
            }
            None => false,
        }
    }
}

impl Default for RowStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Application state shared across all handlers
pub struct AppState {
    /// Runtime configuration
    pub config: AppConfig,

    /// Extraction backend client
    pub backend: Arc<dyn ExtractionBackend>,

    /// Ownership JSON loader
    pub ownership: OwnershipSource,

    /// The unified company table
    pub rows: RowStore,

    /// Durable PDF-extraction table
    pub extractions: Arc<ExtractionStore>,

    /// Evidence responses by symbol, invalidated on refresh
    pub evidence_cache: DashMap<String, EvidenceResponse>,

    /// Dashboard event bus
    pub events: EventBus,
}

impl AppState {
    /// Create new application state with the real HTTP backend
    pub fn new(config: AppConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;
        tracing::info!("Data directory: {:?}", config.data_dir);

        let backend = Arc::new(HttpBackend::new(config.backend_url.clone()));
        let extractions = Arc::new(ExtractionStore::new(&config.data_dir.join(STORE_FILE))?);

        Ok(Self::with_backend(config, backend, extractions))
    }

    /// Assemble state around an arbitrary backend implementation
    pub fn with_backend(
        config: AppConfig,
        backend: Arc<dyn ExtractionBackend>,
        extractions: Arc<ExtractionStore>,
    ) -> Self {
        Self {
            config,
            backend,
            ownership: OwnershipSource::new(),
            rows: RowStore::new(),
            extractions,
            evidence_cache: DashMap::new(),
            events: EventBus::new(),
        }
    }
}
