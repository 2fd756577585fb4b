use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::{sum_amounts, Category, CategoryId, Transaction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BudgetLevel {
    Healthy,
    Warning,
    Critical,
}

impl BudgetLevel {
    fn from_percent(percent: Decimal) -> Self {
        if percent > Decimal::from(90) {
            Self::Critical
        } else if percent > Decimal::from(70) {
            Self::Warning
        } else {
            Self::Healthy
        }
    }
}

/// Lifetime spending of one category against its budget.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct BudgetStatus {
    pub(crate) category_id: CategoryId,
    pub(crate) name: String,
    pub(crate) color: String,
    pub(crate) budget: Decimal,
    pub(crate) spent: Decimal,
    /// Negative once the budget is exceeded.
    pub(crate) remaining: Decimal,
    /// Share of the budget used, capped at 100.
    pub(crate) percent: Decimal,
    pub(crate) level: BudgetLevel,
}

impl BudgetStatus {
    /// `percent` as a 0.0..=1.0 ratio, for gauges.
    pub(crate) fn ratio(&self) -> f64 {
        use rust_decimal::prelude::ToPrimitive;
        (self.percent / Decimal::ONE_HUNDRED).to_f64().unwrap_or(0.0)
    }
}

pub(crate) fn budget_status(categories: &[Category], transactions: &[Transaction]) -> Vec<BudgetStatus> {
    let mut spent: HashMap<CategoryId, Decimal> = HashMap::new();
    for txn in transactions {
        let entry = spent.entry(txn.category_id).or_default();
        *entry = entry.saturating_add(txn.amount);
    }

    categories
        .iter()
        .map(|cat| {
            let spent = spent.get(&cat.id).copied().unwrap_or_default();
            let percent = if cat.budget > Decimal::ZERO {
                spent
                    .checked_mul(Decimal::ONE_HUNDRED)
                    .and_then(|scaled| scaled.checked_div(cat.budget))
                    .map_or(Decimal::ONE_HUNDRED, |p| p.min(Decimal::ONE_HUNDRED))
            } else {
                Decimal::ZERO
            };
            BudgetStatus {
                category_id: cat.id,
                name: cat.name.clone(),
                color: cat.color.clone(),
                budget: cat.budget,
                spent,
                remaining: cat.budget.saturating_sub(spent),
                percent,
                level: BudgetLevel::from_percent(percent),
            }
        })
        .collect()
}

pub(crate) fn total_budget(categories: &[Category]) -> Decimal {
    sum_amounts(categories.iter().map(|c| c.budget))
}

/// The latest `limit` transactions carrying a non-blank note, newest date first.
pub(crate) fn recent_notes(transactions: &[Transaction], limit: usize) -> Vec<&Transaction> {
    let mut noted: Vec<&Transaction> = transactions.iter().filter(|t| t.has_note()).collect();
    noted.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    noted.truncate(limit);
    noted
}
