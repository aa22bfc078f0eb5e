//! Fixed metric field set for the PDF-extraction table
//!
//! The weekly trading and ownership report carries the same
//! Saudi/GCC/Foreign breakdown across four sections. Field names below are
//! the wire names used by the extraction backend and the export payload.

use serde::Serialize;

/// One column field of the extraction table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricField {
    Date,
    SaudiValueTradedIndividuals,
    SaudiValueTradedInstitutions,
    GccValueTradedTotal,
    ForeignValueTradedTotal,
    SaudiWeeklyChangeIndividuals,
    SaudiWeeklyChangeInstitutions,
    GccWeeklyChangeTotal,
    ForeignWeeklyChangeTotal,
    SaudiHoldingValueIndividuals,
    SaudiHoldingValueInstitutions,
    GccHoldingValueTotal,
    ForeignHoldingValueTotal,
    SaudiOwnershipValueIndividuals,
    SaudiOwnershipValueInstitutions,
    GccOwnershipValueTotal,
    ForeignOwnershipValueTotal,
}

impl MetricField {
    /// All fields, in display/export column order
    pub const ALL: [MetricField; 17] = [
        MetricField::Date,
        MetricField::SaudiValueTradedIndividuals,
        MetricField::SaudiValueTradedInstitutions,
        MetricField::GccValueTradedTotal,
        MetricField::ForeignValueTradedTotal,
        MetricField::SaudiWeeklyChangeIndividuals,
        MetricField::SaudiWeeklyChangeInstitutions,
        MetricField::GccWeeklyChangeTotal,
        MetricField::ForeignWeeklyChangeTotal,
        MetricField::SaudiHoldingValueIndividuals,
        MetricField::SaudiHoldingValueInstitutions,
        MetricField::GccHoldingValueTotal,
        MetricField::ForeignHoldingValueTotal,
        MetricField::SaudiOwnershipValueIndividuals,
        MetricField::SaudiOwnershipValueInstitutions,
        MetricField::GccOwnershipValueTotal,
        MetricField::ForeignOwnershipValueTotal,
    ];

    /// Wire name as used by the backend and the export payload
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::Date => "DATE",
            MetricField::SaudiValueTradedIndividuals => "Saudi_ValueTraded_Individuals",
            MetricField::SaudiValueTradedInstitutions => "Saudi_ValueTraded_Institutions",
            MetricField::GccValueTradedTotal => "GCC_ValueTraded_Total",
            MetricField::ForeignValueTradedTotal => "Foreign_ValueTraded_Total",
            MetricField::SaudiWeeklyChangeIndividuals => "Saudi_WeeklyChange_Individuals",
            MetricField::SaudiWeeklyChangeInstitutions => "Saudi_WeeklyChange_Institutions",
            MetricField::GccWeeklyChangeTotal => "GCC_WeeklyChange_Total",
            MetricField::ForeignWeeklyChangeTotal => "Foreign_WeeklyChange_Total",
            MetricField::SaudiHoldingValueIndividuals => "Saudi_Holding_Value_Individuals",
            MetricField::SaudiHoldingValueInstitutions => "Saudi_Holding_Value_Institutions",
            MetricField::GccHoldingValueTotal => "GCC_Holding_Value_Total",
            MetricField::ForeignHoldingValueTotal => "Foreign_Holding_Value_Total",
            MetricField::SaudiOwnershipValueIndividuals => "Saudi_OwnershipValue_Individuals",
            MetricField::SaudiOwnershipValueInstitutions => "Saudi_OwnershipValue_Institutions",
            MetricField::GccOwnershipValueTotal => "GCC_OwnershipValue_Total",
            MetricField::ForeignOwnershipValueTotal => "Foreign_OwnershipValue_Total",
        }
    }

    /// Parse a wire name back to a field
    pub fn parse(name: &str) -> Option<MetricField> {
        let name = name.trim();
        MetricField::ALL.iter().copied().find(|f| f.as_str() == name)
    }
}

/// One cell of the multi-row column header, spanning `span` leaf columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderCell {
    pub title: String,
    pub span: usize,
}

impl HeaderCell {
    fn new(title: &str, span: usize) -> Self {
        Self {
            title: title.to_string(),
            span,
        }
    }
}

const SECTIONS: [&str; 4] = [
    "Value Traded",
    "Weekly Change",
    "Holding Value",
    "Ownership Value",
];

const NATIONALITIES: [(&str, usize); 3] = [("Saudi", 2), ("GCC", 1), ("Foreign", 1)];

const LEAVES: [&str; 4] = ["Individuals", "Institutions", "Total", "Total"];

/// The three header rows of the hierarchical grid: section, nationality, leaf.
/// The DATE column occupies the first cell of every row.
pub fn header_rows() -> Vec<Vec<HeaderCell>> {
    let mut sections = vec![HeaderCell::new("DATE", 1)];
    let mut nationalities = vec![HeaderCell::new("", 1)];
    let mut leaves = vec![HeaderCell::new("", 1)];

    for section in SECTIONS {
        sections.push(HeaderCell::new(section, LEAVES.len()));
        for (nationality, span) in NATIONALITIES {
            nationalities.push(HeaderCell::new(nationality, span));
        }
        for leaf in LEAVES {
            leaves.push(HeaderCell::new(leaf, 1));
        }
    }

    vec![sections, nationalities, leaves]
}
