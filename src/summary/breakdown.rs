use rust_decimal::Decimal;

use crate::query::Aggregation;

pub(crate) const NO_RESULTS: &str = "No transactions found for the selected filters.";

/// One line of the period × category table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BreakdownRow {
    Entry {
        period: String,
        category: String,
        amount: Decimal,
        count: usize,
    },
    /// Emitted after a period's entries when more than one category contributed.
    Subtotal { period: String, amount: Decimal },
    GrandTotal {
        period_count: usize,
        unit: String,
        amount: Decimal,
    },
    Placeholder(String),
}

impl BreakdownRow {
    /// The text shown in the leading (period/label) column.
    pub(crate) fn label(&self) -> String {
        match self {
            Self::Entry { period, .. } => period.clone(),
            Self::Subtotal { period, .. } => format!("{period} Total"),
            Self::GrandTotal {
                period_count, unit, ..
            } => format!("Grand Total ({period_count} {unit})"),
            Self::Placeholder(text) => text.clone(),
        }
    }

    pub(crate) fn amount(&self) -> Option<Decimal> {
        match self {
            Self::Entry { amount, .. }
            | Self::Subtotal { amount, .. }
            | Self::GrandTotal { amount, .. } => Some(*amount),
            Self::Placeholder(_) => None,
        }
    }

    pub(crate) fn is_total(&self) -> bool {
        matches!(self, Self::Subtotal { .. } | Self::GrandTotal { .. })
    }
}

pub(crate) fn breakdown(aggregation: &Aggregation) -> Vec<BreakdownRow> {
    if aggregation.is_empty() {
        return vec![BreakdownRow::Placeholder(NO_RESULTS.to_string())];
    }

    let mut rows = Vec::new();
    let mut grand_total = Decimal::ZERO;
    for bucket in &aggregation.periods {
        let label = bucket.label();
        let period_total = bucket.total();
        grand_total = grand_total.saturating_add(period_total);

        rows.extend(bucket.categories.iter().map(|c| BreakdownRow::Entry {
            period: label.clone(),
            category: c.name.clone(),
            amount: c.amount,
            count: c.count,
        }));
        if bucket.categories.len() > 1 {
            rows.push(BreakdownRow::Subtotal {
                period: label,
                amount: period_total,
            });
        }
    }

    if rows.len() > 1 {
        let period_count = aggregation.periods.len();
        rows.push(BreakdownRow::GrandTotal {
            period_count,
            unit: aggregation.granularity.unit(period_count),
            amount: grand_total,
        });
    }
    rows
}
