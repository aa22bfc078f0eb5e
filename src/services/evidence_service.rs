//! Evidence Service
//!
//! On-demand lookup of the screenshot + text snippet behind an extracted
//! figure. Responses are cached per symbol; the cache is dropped whenever
//! the table is rebuilt or the symbol's figure is corrected.

use crate::backend::types::EvidenceResponse;
use crate::error::Result;
use crate::state::AppState;
use tracing::debug;

pub struct EvidenceService;

impl EvidenceService {
    /// Fetch evidence for one company symbol
    pub async fn fetch(state: &AppState, symbol: &str) -> Result<EvidenceResponse> {
        if let Some(hit) = state.evidence_cache.get(symbol) {
            debug!("Evidence cache hit for {}", symbol);
            return Ok(hit.clone());
        }

        let evidence = state.backend.fetch_evidence(symbol).await?;
        state
            .evidence_cache
            .insert(symbol.to_string(), evidence.clone());

        Ok(evidence)
    }
}
