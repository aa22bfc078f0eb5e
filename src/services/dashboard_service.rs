//! Dashboard Service
//!
//! Owns the fetch/reconcile cycle for the company grid.

use crate::error::{AppError, Result};
use crate::events::DashboardEvent;
use crate::model::UnifiedRow;
use crate::reconcile::reconcile;
use crate::sources::EarningsSource;
use crate::state::AppState;
use tracing::{debug, info};

/// Dashboard orchestration
pub struct DashboardService;

impl DashboardService {
    /// Fetch both sources concurrently, reconcile, and install the result.
    ///
    /// Sources degrade to empty datasets individually; the table is only
    /// rebuilt once both have settled. A rebuild that lost the race to a
    /// newer one is discarded. Returns the installed row count.
    pub async fn rebuild(state: &AppState) -> Result<usize> {
        let generation = state.rows.begin_refresh();

        let (ownership, earnings) = tokio::join!(
            state.ownership.load(&state.config),
            EarningsSource::load(state.backend.as_ref()),
        );

        let rows = reconcile(ownership, earnings);
        let count = rows.len();

        if state.rows.install(generation, rows) {
            state.evidence_cache.clear();
            state
                .events
                .publish(DashboardEvent::RowsRefreshed { row_count: count });
            info!("Reconciled {} rows (generation {})", count, generation);
            Ok(count)
        } else {
            debug!("Discarded stale rebuild (generation {})", generation);
            Ok(state.rows.len())
        }
    }

    /// Run the backend scrape/recalculate pipeline, then rebuild locally
    pub async fn refresh(state: &AppState) -> Result<usize> {
        let status = state.backend.trigger_refresh().await?;
        if !status.is_success() {
            return Err(AppError::Backend(status.message_or_status()));
        }

        Self::rebuild(state).await
    }

    /// Derive the filtered, sorted grid for a search term
    pub fn search(state: &AppState, term: &str) -> Vec<UnifiedRow> {
        crate::view::derive_view(&state.rows.snapshot(), term)
    }
}
