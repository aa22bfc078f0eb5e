//! PDF-extraction table
//!
//! One column per uploaded report file, keyed by filename. The
//! successful/failed split is recomputed on every render rather than stored.

pub mod fields;
mod store;

pub use fields::{header_rows, HeaderCell, MetricField};
pub use store::ExtractionStore;

use std::collections::BTreeMap;

/// Extracted metrics for one uploaded file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionColumn {
    /// Natural key; duplicate filenames are rejected at selection time
    pub filename: String,
    /// Wire field name -> extracted display value
    pub data: BTreeMap<String, String>,
    pub screenshot_paths: Vec<String>,
    pub extraction_error: Option<String>,
}

impl ExtractionColumn {
    /// A column renders in the main grid only when extraction produced data
    /// and recorded no error.
    pub fn is_successful(&self) -> bool {
        let clean = match &self.extraction_error {
            Some(error) => error.trim().is_empty(),
            None => true,
        };
        clean && !self.data.is_empty()
    }
}

/// Split columns into (successful, failed) for display and export
pub fn partition(columns: &[ExtractionColumn]) -> (Vec<&ExtractionColumn>, Vec<&ExtractionColumn>) {
    columns.iter().partition(|column| column.is_successful())
}
