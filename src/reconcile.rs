//! Reconciliation engine
//!
//! Joins the ownership table with the extracted earnings table by trimmed
//! company symbol. Earnings rows never introduce table rows: the unified
//! table has exactly one row per ownership record, in ownership order, and
//! unmatched earnings rows are dropped.

use crate::model::{EarningsRecord, OwnershipRecord, UnifiedRow};
use std::collections::HashMap;

/// Join ownership records with earnings records.
///
/// Duplicate symbols on the earnings side resolve last-write-wins in input
/// order. Missing matches degrade to empty-string earnings fields; this
/// function has no failure mode of its own.
pub fn reconcile(ownership: Vec<OwnershipRecord>, earnings: Vec<EarningsRecord>) -> Vec<UnifiedRow> {
    let mut by_symbol: HashMap<String, EarningsRecord> = HashMap::with_capacity(earnings.len());
    for record in earnings {
        by_symbol.insert(record.symbol.trim().to_string(), record);
    }

    ownership
        .into_iter()
        .map(|company| {
            let matched = by_symbol.get(company.symbol.trim());
            UnifiedRow::joined(company, matched)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn company(symbol: &str, name: &str) -> OwnershipRecord {
        OwnershipRecord {
            symbol: symbol.to_string(),
            company_name: name.to_string(),
            foreign_ownership: "3.5%".to_string(),
            max_allowed: "49%".to_string(),
            investor_limit: "10%".to_string(),
        }
    }

    fn earnings(symbol: &str, retained: &str) -> EarningsRecord {
        EarningsRecord {
            symbol: symbol.to_string(),
            retained_earnings: retained.to_string(),
            reinvested_earnings: "0".to_string(),
            year: "2023".to_string(),
            extraction_error: String::new(),
        }
    }

    #[test]
    fn one_unified_row_per_ownership_record() {
        let ownership = vec![company("2010", "SABIC"), company("1050", "BSF")];
        let extra = vec![earnings("2010", "100"), earnings("9999", "55")];

        let rows = reconcile(ownership, extra);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].symbol, "2010");
        assert_eq!(rows[0].retained_earnings, "100");
        // Unmatched earnings row 9999 is dropped, unmatched company defaults to empty
        assert_eq!(rows[1].symbol, "1050");
        assert_eq!(rows[1].retained_earnings, "");
        assert_eq!(rows[1].year, "");
        assert_eq!(rows[1].extraction_error, "");
    }

    #[test]
    fn ownership_fields_carry_through() {
        let rows = reconcile(vec![company("2222", "Aramco")], vec![]);

        assert_eq!(rows[0].company_name, "Aramco");
        assert_eq!(rows[0].foreign_ownership, "3.5%");
        assert_eq!(rows[0].max_allowed, "49%");
        assert_eq!(rows[0].investor_limit, "10%");
    }

    #[test]
    fn duplicate_earnings_symbols_resolve_last_write_wins() {
        let rows = reconcile(
            vec![company("2010", "SABIC")],
            vec![earnings("2010", "A"), earnings("2010", "B")],
        );

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].retained_earnings, "B");
    }

    #[test]
    fn symbols_match_after_trimming() {
        let rows = reconcile(vec![company(" 2010 ", "SABIC")], vec![earnings("2010  ", "42")]);

        assert_eq!(rows[0].retained_earnings, "42");
    }

    #[test]
    fn ownership_order_is_preserved() {
        let ownership = vec![
            company("3030", "C"),
            company("1010", "A"),
            company("2020", "B"),
        ];

        let rows = reconcile(ownership, vec![]);
        let symbols: Vec<&str> = rows.iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(symbols, vec!["3030", "1010", "2020"]);
    }

    #[test]
    fn row_ids_are_unique() {
        let rows = reconcile(
            vec![company("2010", "SABIC"), company("2010", "SABIC duplicate")],
            vec![],
        );

        assert_ne!(rows[0].row_id, rows[1].row_id);
    }
}
