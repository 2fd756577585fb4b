use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::period::{Granularity, Period};
use crate::models::{sum_amounts, Category, CategoryId, Transaction, UNKNOWN_CATEGORY};

/// Amount and transaction count for one category inside one period.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CategoryTotal {
    pub(crate) name: String,
    pub(crate) amount: Decimal,
    pub(crate) count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PeriodBucket {
    pub(crate) period: Period,
    /// Contributing categories in order of first appearance.
    pub(crate) categories: Vec<CategoryTotal>,
}

impl PeriodBucket {
    fn new(period: Period) -> Self {
        Self {
            period,
            categories: Vec::new(),
        }
    }

    fn add(&mut self, name: &str, amount: Decimal) {
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(entry) => {
                entry.amount = entry.amount.saturating_add(amount);
                entry.count += 1;
            }
            None => self.categories.push(CategoryTotal {
                name: name.to_string(),
                amount,
                count: 1,
            }),
        }
    }

    pub(crate) fn label(&self) -> String {
        self.period.label()
    }

    pub(crate) fn total(&self) -> Decimal {
        sum_amounts(self.categories.iter().map(|c| c.amount))
    }

    pub(crate) fn count(&self) -> usize {
        self.categories.iter().map(|c| c.count).sum()
    }

    pub(crate) fn amount_for(&self, category: &str) -> Decimal {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .map_or(Decimal::ZERO, |c| c.amount)
    }
}

/// One chart line: a category's amount in every period, zero-filled.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Series {
    pub(crate) name: String,
    /// `None` for the "Unknown" pseudo-category and other unresolved names.
    pub(crate) color: Option<String>,
    pub(crate) values: Vec<Decimal>,
}

/// Filtered transactions bucketed into chronological periods.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Aggregation {
    pub(crate) granularity: Granularity,
    pub(crate) periods: Vec<PeriodBucket>,
    /// Every category name present in the input, in order of first appearance.
    pub(crate) categories: Vec<String>,
    colors: HashMap<String, String>,
}

impl Aggregation {
    pub(crate) fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub(crate) fn labels(&self) -> Vec<String> {
        self.periods.iter().map(PeriodBucket::label).collect()
    }

    pub(crate) fn period_totals(&self) -> Vec<Decimal> {
        self.periods.iter().map(PeriodBucket::total).collect()
    }

    pub(crate) fn grand_total(&self) -> Decimal {
        sum_amounts(self.periods.iter().map(PeriodBucket::total))
    }

    pub(crate) fn transaction_count(&self) -> usize {
        self.periods.iter().map(PeriodBucket::count).sum()
    }

    /// Dense per-category series over all periods, for the chart collaborator.
    pub(crate) fn series(&self) -> Vec<Series> {
        self.categories
            .iter()
            .map(|name| Series {
                name: name.clone(),
                color: self.colors.get(name).cloned(),
                values: self.periods.iter().map(|p| p.amount_for(name)).collect(),
            })
            .collect()
    }
}

/// Bucket `transactions` by `granularity`, summing amounts and counts per
/// (period, category). Category ids that no longer resolve are grouped under
/// "Unknown".
pub(crate) fn group_by_period<'a>(
    transactions: impl IntoIterator<Item = &'a Transaction>,
    categories: &[Category],
    granularity: Granularity,
) -> Aggregation {
    let lookup: HashMap<CategoryId, &Category> = categories.iter().map(|c| (c.id, c)).collect();
    let mut buckets: BTreeMap<Period, PeriodBucket> = BTreeMap::new();
    let mut names: Vec<String> = Vec::new();
    let mut colors: HashMap<String, String> = HashMap::new();

    for txn in transactions {
        let name = match lookup.get(&txn.category_id) {
            Some(cat) => {
                colors
                    .entry(cat.name.clone())
                    .or_insert_with(|| cat.color.clone());
                cat.name.as_str()
            }
            None => UNKNOWN_CATEGORY,
        };
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }

        let period = granularity.period_of(txn.date);
        buckets
            .entry(period)
            .or_insert_with(|| PeriodBucket::new(period))
            .add(name, txn.amount);
    }

    let aggregation = Aggregation {
        granularity,
        periods: buckets.into_values().collect(),
        categories: names,
        colors,
    };
    tracing::debug!(
        granularity = granularity.as_str(),
        periods = aggregation.periods.len(),
        categories = aggregation.categories.len(),
        "grouped transactions"
    );
    aggregation
}
