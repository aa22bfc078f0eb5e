//! Unified dashboard row model
//!
//! The dashboard joins two datasets by company symbol: the scraped foreign
//! ownership table and the retained/reinvested earnings figures extracted
//! from financial reports. Numeric fields stay display strings end to end;
//! the no-data sentinel is normalized at render time only.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One company row from the ownership source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipRecord {
    pub symbol: String,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub foreign_ownership: String,
    #[serde(default)]
    pub max_allowed: String,
    #[serde(default)]
    pub investor_limit: String,
}

/// One extracted earnings row, keyed by company symbol
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EarningsRecord {
    pub symbol: String,
    pub retained_earnings: String,
    pub reinvested_earnings: String,
    pub year: String,
    pub extraction_error: String,
}

/// The joined, presentation-ready row: one ownership record plus the
/// earnings fields of its matching extraction (empty strings when unmatched).
///
/// `row_id` is a freshly generated UUID; `symbol` is only the join key and
/// is not assumed unique across refreshes.
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedRow {
    pub row_id: Uuid,
    pub symbol: String,
    pub company_name: String,
    pub foreign_ownership: String,
    pub max_allowed: String,
    pub investor_limit: String,
    pub retained_earnings: String,
    pub reinvested_earnings: String,
    pub year: String,
    pub extraction_error: String,
}

impl UnifiedRow {
    /// Combine an ownership record with its matched earnings record, if any
    pub fn joined(company: OwnershipRecord, earnings: Option<&EarningsRecord>) -> Self {
        let matched = earnings.cloned().unwrap_or_default();
        Self {
            row_id: Uuid::new_v4(),
            symbol: company.symbol,
            company_name: company.company_name,
            foreign_ownership: company.foreign_ownership,
            max_allowed: company.max_allowed,
            investor_limit: company.investor_limit,
            retained_earnings: matched.retained_earnings,
            reinvested_earnings: matched.reinvested_earnings,
            year: matched.year,
            extraction_error: matched.extraction_error,
        }
    }
}
