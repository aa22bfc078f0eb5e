//! View derivation
//!
//! Pure functions from the canonical row model to what the grids render.
//! Recomputed on every request; never mutates the model.

use crate::extraction::{self, ExtractionColumn, HeaderCell, MetricField};
use crate::model::UnifiedRow;
use serde::Serialize;

/// Localized label shown for absent values
pub const NO_DATA_LABEL: &str = "لا توجد بيانات";

/// Sign classification for numeric cells (presentational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueTone {
    Negative,
    Zero,
    Positive,
}

/// A metric value prepared for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedValue {
    pub display: String,
    /// Set only for numeric values
    pub tone: Option<ValueTone>,
}

/// Derive the flat company grid: substring filter, then a stable descending
/// sort by retained earnings parsed as a number.
///
/// The filter is a literal case-sensitive substring match against company
/// name or symbol; an empty term passes every row. Non-numeric and absent
/// retained earnings sink below every numeric value (a missing figure is not
/// a zero), and ties keep filter-relative order.
pub fn derive_view(rows: &[UnifiedRow], search: &str) -> Vec<UnifiedRow> {
    let mut view: Vec<UnifiedRow> = rows
        .iter()
        .filter(|row| {
            search.is_empty() || row.company_name.contains(search) || row.symbol.contains(search)
        })
        .cloned()
        .collect();

    view.sort_by(|a, b| {
        sort_key(&b.retained_earnings).total_cmp(&sort_key(&a.retained_earnings))
    });

    view
}

fn sort_key(raw: &str) -> f64 {
    if is_no_data(Some(raw)) {
        return f64::NEG_INFINITY;
    }
    raw.trim().parse::<f64>().unwrap_or(f64::NEG_INFINITY)
}

/// True when a raw value means "no data": absent field, empty string, or the
/// literal `null`/`undefined` artifacts the sources emit interchangeably.
pub fn is_no_data(raw: Option<&str>) -> bool {
    match raw {
        None => true,
        Some(value) => {
            let value = value.trim();
            value.is_empty() || value == "null" || value == "undefined"
        }
    }
}

/// Format one metric value for display.
///
/// Absent values get the localized no-data label, plain decimal values get
/// thousands separators and a sign tone, anything else passes through
/// verbatim.
pub fn format_metric(raw: Option<&str>) -> FormattedValue {
    if is_no_data(raw) {
        return FormattedValue {
            display: NO_DATA_LABEL.to_string(),
            tone: None,
        };
    }

    let raw = raw.unwrap_or_default();
    let trimmed = raw.trim();

    match split_decimal(trimmed) {
        Some((negative, int_digits, frac_digits)) => {
            let mut display = String::new();
            if negative {
                display.push('-');
            }
            display.push_str(&group_thousands(int_digits));
            if let Some(frac) = frac_digits {
                if !frac.is_empty() {
                    display.push('.');
                    display.push_str(frac);
                }
            }

            let value: f64 = trimmed.parse().unwrap_or(0.0);
            let tone = if value < 0.0 {
                ValueTone::Negative
            } else if value == 0.0 {
                ValueTone::Zero
            } else {
                ValueTone::Positive
            };

            FormattedValue {
                display,
                tone: Some(tone),
            }
        }
        None => FormattedValue {
            display: raw.to_string(),
            tone: None,
        },
    }
}

/// Split a plain decimal string into sign, integer digits, fraction digits.
/// Returns None for anything that isn't a plain signed decimal.
fn split_decimal(raw: &str) -> Option<(bool, &str, Option<&str>)> {
    let (negative, rest) = match raw.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };

    let (int_digits, frac_digits) = match rest.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (rest, None),
    };

    if int_digits.is_empty() || !int_digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some(frac) = frac_digits {
        if !frac.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
    }

    Some((negative, int_digits, frac_digits))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;

    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && idx % 3 == offset {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    grouped
}

// ============================================================================
// PDF-extraction grid
// ============================================================================

/// The hierarchical extraction grid, ready to render
#[derive(Debug, Serialize)]
pub struct ExtractionView {
    /// Three header rows: section, nationality, leaf
    pub header_rows: Vec<Vec<HeaderCell>>,
    pub successful: Vec<ExtractionViewColumn>,
    pub failed: Vec<FailedExtraction>,
}

/// One successful column with every metric cell formatted
#[derive(Debug, Serialize)]
pub struct ExtractionViewColumn {
    pub filename: String,
    pub cells: Vec<MetricCell>,
}

#[derive(Debug, Serialize)]
pub struct MetricCell {
    pub field: String,
    #[serde(flatten)]
    pub value: FormattedValue,
}

#[derive(Debug, Serialize)]
pub struct FailedExtraction {
    pub filename: String,
    pub reason: String,
}

/// Derive the extraction grid: recompute the successful/failed split and
/// format each fixed metric field independently.
pub fn derive_extraction_view(columns: &[ExtractionColumn]) -> ExtractionView {
    let (successful, failed) = extraction::partition(columns);

    ExtractionView {
        header_rows: extraction::header_rows(),
        successful: successful
            .into_iter()
            .map(|column| ExtractionViewColumn {
                filename: column.filename.clone(),
                cells: MetricField::ALL
                    .iter()
                    .map(|field| MetricCell {
                        field: field.as_str().to_string(),
                        value: format_metric(
                            column.data.get(field.as_str()).map(String::as_str),
                        ),
                    })
                    .collect(),
            })
            .collect(),
        failed: failed
            .into_iter()
            .map(|column| FailedExtraction {
                filename: column.filename.clone(),
                reason: column
                    .extraction_error
                    .clone()
                    .filter(|error| !error.trim().is_empty())
                    .unwrap_or_else(|| "No extracted data".to_string()),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn row(symbol: &str, name: &str, retained: &str) -> UnifiedRow {
        UnifiedRow {
            row_id: uuid::Uuid::new_v4(),
            symbol: symbol.to_string(),
            company_name: name.to_string(),
            foreign_ownership: String::new(),
            max_allowed: String::new(),
            investor_limit: String::new(),
            retained_earnings: retained.to_string(),
            reinvested_earnings: String::new(),
            year: String::new(),
            extraction_error: String::new(),
        }
    }

    #[test]
    fn empty_search_passes_every_row() {
        let rows = vec![row("2010", "SABIC", "5"), row("1050", "BSF", "5")];

        let view = derive_view(&rows, "");

        assert_eq!(view.len(), 2);
        // Equal sort keys keep input order
        assert_eq!(view[0].symbol, "2010");
        assert_eq!(view[1].symbol, "1050");
    }

    #[test]
    fn search_matches_symbol_or_company_name() {
        let rows = vec![
            row("2010", "SABIC", ""),
            row("1050", "Banque Saudi Fransi", ""),
            row("8210", "Bupa 2010 Fund", ""),
        ];

        let view = derive_view(&rows, "2010");
        let symbols: Vec<&str> = view.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["2010", "8210"]);

        // Literal, case-sensitive match only
        assert!(derive_view(&rows, "sabic").is_empty());
    }

    #[test]
    fn sort_is_descending_numeric_and_stable() {
        let rows = vec![
            row("a", "", ""),
            row("b", "", "100"),
            row("c", "", "abc"),
            row("d", "", "-50"),
            row("e", "", "100"),
        ];

        let view = derive_view(&rows, "");
        let order: Vec<&str> = view.iter().map(|r| r.symbol.as_str()).collect();

        // Numerics descending, non-numerics sink in input order
        assert_eq!(order, vec!["b", "e", "d", "a", "c"]);
    }

    #[test]
    fn missing_figures_rank_below_negative_numbers() {
        let rows = vec![row("a", "", ""), row("b", "", "0"), row("c", "", "-50")];

        let view = derive_view(&rows, "");
        let order: Vec<&str> = view.iter().map(|r| r.symbol.as_str()).collect();

        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn derive_view_leaves_input_untouched() {
        let rows = vec![row("a", "", "1"), row("b", "", "2")];

        let _ = derive_view(&rows, "");

        assert_eq!(rows[0].symbol, "a");
        assert_eq!(rows[1].symbol, "b");
    }

    #[test]
    fn no_data_sentinels_render_identically() {
        let expected = format_metric(None);
        assert_eq!(expected.display, NO_DATA_LABEL);
        assert_eq!(expected.tone, None);

        for raw in ["", "null", "undefined", "  "] {
            assert_eq!(format_metric(Some(raw)), expected, "sentinel {:?}", raw);
        }

        // The sentinel is not a numeric zero
        assert_ne!(expected.display, "0");
        assert_ne!(expected, format_metric(Some("0")));
    }

    #[test]
    fn numbers_get_thousands_separators_and_tone() {
        let positive = format_metric(Some("1234567"));
        assert_eq!(positive.display, "1,234,567");
        assert_eq!(positive.tone, Some(ValueTone::Positive));

        let negative = format_metric(Some("-50000"));
        assert_eq!(negative.display, "-50,000");
        assert_eq!(negative.tone, Some(ValueTone::Negative));

        let zero = format_metric(Some("0"));
        assert_eq!(zero.display, "0");
        assert_eq!(zero.tone, Some(ValueTone::Zero));

        let fractional = format_metric(Some("12345.67"));
        assert_eq!(fractional.display, "12,345.67");
        assert_eq!(fractional.tone, Some(ValueTone::Positive));
    }

    #[test]
    fn non_numeric_values_pass_through_verbatim() {
        let value = format_metric(Some("NOT_FOUND"));
        assert_eq!(value.display, "NOT_FOUND");
        assert_eq!(value.tone, None);

        // Already-formatted values are not numeric
        assert_eq!(format_metric(Some("1,234")).display, "1,234");
    }

    #[test]
    fn extraction_view_formats_every_fixed_field() {
        let mut data = BTreeMap::new();
        data.insert("DATE".to_string(), "2024-11-14".to_string());
        data.insert(
            "Saudi_ValueTraded_Individuals".to_string(),
            "1000000".to_string(),
        );

        let columns = vec![
            ExtractionColumn {
                filename: "ok.pdf".to_string(),
                data,
                screenshot_paths: Vec::new(),
                extraction_error: None,
            },
            ExtractionColumn {
                filename: "bad.pdf".to_string(),
                data: BTreeMap::new(),
                screenshot_paths: Vec::new(),
                extraction_error: Some("no table found".to_string()),
            },
        ];

        let view = derive_extraction_view(&columns);

        assert_eq!(view.successful.len(), 1);
        assert_eq!(view.failed.len(), 1);
        assert_eq!(view.failed[0].reason, "no table found");

        let cells = &view.successful[0].cells;
        assert_eq!(cells.len(), MetricField::ALL.len());
        assert_eq!(cells[0].value.display, "2024-11-14");
        assert_eq!(cells[1].value.display, "1,000,000");
        // Missing fields fall back to the no-data label
        assert_eq!(cells[2].value.display, NO_DATA_LABEL);
    }
}
