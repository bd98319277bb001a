use serde::{Deserialize, Serialize};

/// Closed set of line-item categories. The calculator can only emit these;
/// pass-through items (tolls, insurance) are reimbursements and carry no
/// margin.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum LineItemKind {
    Base,
    Fee,
    Surcharge,
    PassThrough,
    Imponderables,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub kind: LineItemKind,
    pub label: String,
    pub amount: f64,
}

impl LineItem {
    pub fn new(kind: LineItemKind, label: impl Into<String>, amount: f64) -> Self {
        Self {
            kind,
            label: label.into(),
            amount,
        }
    }
}

/// Fully itemized quote. Invariant: the line items sum to `subtotal`
/// (tax is the only post-subtotal figure); aggregates are rounded to
/// cents once, at the very end of the calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub vehicle: String,
    pub items: Vec<LineItem>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
    pub utility: f64,
    pub utility_percent: f64,
    pub operational_cost_per_km: f64,
}
