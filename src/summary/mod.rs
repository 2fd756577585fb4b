mod breakdown;
mod budget;

pub(crate) use breakdown::{breakdown, BreakdownRow, NO_RESULTS};
pub(crate) use budget::{budget_status, recent_notes, total_budget, BudgetLevel, BudgetStatus};

use rust_decimal::Decimal;

use crate::query::Aggregation;

/// Scalar statistics over an aggregation. Every field is zero when there are
/// no periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct Summary {
    pub(crate) total: Decimal,
    pub(crate) average: Decimal,
    pub(crate) highest: Decimal,
    pub(crate) period_count: usize,
    pub(crate) transaction_count: usize,
}

pub(crate) fn summarize(aggregation: &Aggregation) -> Summary {
    let totals = aggregation.period_totals();
    let period_count = totals.len();
    let total = aggregation.grand_total();
    let highest = totals.iter().copied().max().unwrap_or(Decimal::ZERO);
    let average = if period_count == 0 {
        Decimal::ZERO
    } else {
        total
            .checked_div(Decimal::from(period_count))
            .unwrap_or(Decimal::ZERO)
    };

    Summary {
        total,
        average,
        highest,
        period_count,
        transaction_count: aggregation.transaction_count(),
    }
}

#[cfg(test)]
mod tests;
