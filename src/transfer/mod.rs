mod json;
mod report;
mod tabular;

pub(crate) use json::export_json;
pub(crate) use report::{escape_html, export_report, export_spreadsheet};
pub(crate) use tabular::export_csv;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

use crate::error::TransferError;
use crate::models::{
    check_amount, next_id, random_color, Category, CategoryId, Transaction, TransactionId,
    MAX_AMOUNT,
};
use crate::store::{AppState, Snapshot};

/// How many items of each kind an import preview lists.
pub(crate) const PREVIEW_ITEMS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExportFormat {
    Json,
    Csv,
    Report,
    Spreadsheet,
}

impl ExportFormat {
    pub(crate) fn all() -> &'static [ExportFormat] {
        &[Self::Json, Self::Csv, Self::Report, Self::Spreadsheet]
    }

    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Report => "report",
            Self::Spreadsheet => "sheet",
        }
    }

    pub(crate) fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Report => "html",
            Self::Spreadsheet => "xls",
        }
    }

    /// e.g. `budget-data-2024-03-15.csv`
    pub(crate) fn default_file_name(&self, now: DateTime<Utc>) -> String {
        let stem = match self {
            Self::Report => "budget-report",
            _ => "budget-data",
        };
        format!("{stem}-{}.{}", now.format("%Y-%m-%d"), self.extension())
    }

    pub(crate) fn render(&self, snapshot: Snapshot<'_>, now: DateTime<Utc>) -> Result<String> {
        match self {
            Self::Json => export_json(snapshot, now).context("Failed to serialize export"),
            Self::Csv => export_csv(snapshot),
            Self::Report => Ok(export_report(snapshot, now)),
            Self::Spreadsheet => Ok(export_spreadsheet(snapshot, now)),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "report" | "html" | "pdf" => Ok(Self::Report),
            "sheet" | "excel" | "xls" => Ok(Self::Spreadsheet),
            other => anyhow::bail!("Unknown export format '{other}': use json, csv, report or sheet"),
        }
    }
}

/// Render `format` and write it to `path`.
pub(crate) fn write_export(
    snapshot: Snapshot<'_>,
    format: ExportFormat,
    now: DateTime<Utc>,
    path: &Path,
) -> Result<()> {
    let content = format.render(snapshot, now)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write export: {}", path.display()))?;
    info!(
        format = format.as_str(),
        path = %path.display(),
        categories = snapshot.categories.len(),
        transactions = snapshot.transactions.len(),
        "exported data"
    );
    Ok(())
}

// ── Import ────────────────────────────────────────────────────

/// Candidate collections read from an import file, not yet committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct ImportData {
    pub(crate) categories: Vec<Category>,
    pub(crate) transactions: Vec<Transaction>,
}

impl ImportData {
    pub(crate) fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.transactions.is_empty()
    }

    /// Reject what the input forms would never produce: a category id used
    /// twice (its transactions could not be told apart) or an amount outside
    /// the accepted range.
    pub(crate) fn check(&self) -> Result<(), TransferError> {
        let mut seen = HashSet::new();
        for cat in &self.categories {
            if !seen.insert(cat.id) {
                return Err(TransferError::Malformed(format!(
                    "category id {} appears more than once",
                    cat.id
                )));
            }
            if cat.budget < Decimal::ZERO || cat.budget > MAX_AMOUNT {
                return Err(TransferError::Malformed(format!(
                    "category '{}' has budget {} outside 0 to {MAX_AMOUNT}",
                    cat.name, cat.budget
                )));
            }
        }
        for txn in &self.transactions {
            check_amount(txn.amount)
                .map_err(|e| TransferError::Malformed(format!("transaction {}: {e}", txn.id)))?;
        }
        Ok(())
    }

    pub(crate) fn preview(&self) -> ImportPreview {
        ImportPreview {
            category_count: self.categories.len(),
            transaction_count: self.transactions.len(),
            categories: self
                .categories
                .iter()
                .take(PREVIEW_ITEMS)
                .map(|c| (c.name.clone(), c.budget))
                .collect(),
            transactions: self
                .transactions
                .iter()
                .take(PREVIEW_ITEMS)
                .map(|t| PreviewTransaction {
                    date: t.date,
                    amount: t.amount,
                    category: Category::name_or_unknown(&self.categories, t.category_id)
                        .to_string(),
                })
                .collect(),
        }
    }
}

/// Parse an import file's text: the structured (JSON) format first, then the
/// sectioned CSV format. Nothing is mutated.
pub(crate) fn parse_import(text: &str, now: DateTime<Utc>) -> Result<ImportData, TransferError> {
    if let Some(data) = json::parse_json(text)? {
        return accept(data);
    }
    match tabular::parse_csv(text, now.timestamp_millis())? {
        Some(data) => accept(data),
        None => Err(TransferError::Unrecognized(
            serde_json::from_str::<serde_json::Value>(text)
                .err()
                .map(|e| e.to_string())
                .unwrap_or_default(),
        )),
    }
}

fn accept(data: ImportData) -> Result<ImportData, TransferError> {
    if data.is_empty() {
        return Err(TransferError::NoData);
    }
    data.check()?;
    Ok(data)
}

pub(crate) fn read_import(path: &Path, now: DateTime<Utc>) -> Result<ImportData> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read import file: {}", path.display()))?;
    let data = parse_import(&text, now)?;
    info!(
        path = %path.display(),
        categories = data.categories.len(),
        transactions = data.transactions.len(),
        "parsed import file"
    );
    Ok(data)
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PreviewTransaction {
    pub(crate) date: chrono::NaiveDate,
    pub(crate) amount: Decimal,
    pub(crate) category: String,
}

/// What an import would bring in: counts plus the first few items.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ImportPreview {
    pub(crate) category_count: usize,
    pub(crate) transaction_count: usize,
    pub(crate) categories: Vec<(String, Decimal)>,
    pub(crate) transactions: Vec<PreviewTransaction>,
}

impl ImportPreview {
    pub(crate) fn lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        if self.category_count > 0 {
            lines.push(format!("Categories to import: {}", self.category_count));
            for (name, budget) in &self.categories {
                lines.push(format!("  • {name}: ${}", budget.normalize()));
            }
            if self.category_count > self.categories.len() {
                lines.push(format!(
                    "  ... and {} more",
                    self.category_count - self.categories.len()
                ));
            }
        }
        if self.transaction_count > 0 {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            lines.push(format!("Transactions to import: {}", self.transaction_count));
            for t in &self.transactions {
                lines.push(format!(
                    "  • {}: ${} ({})",
                    t.date.format("%Y-%m-%d"),
                    t.amount.normalize(),
                    t.category
                ));
            }
            if self.transaction_count > self.transactions.len() {
                lines.push(format!(
                    "  ... and {} more",
                    self.transaction_count - self.transactions.len()
                ));
            }
        }
        lines
    }
}

impl std::fmt::Display for ImportPreview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ImportMode {
    Replace,
    #[default]
    Merge,
}

impl ImportMode {
    pub(crate) fn as_str(&self) -> &'static str {
        match self {
            Self::Replace => "replace",
            Self::Merge => "merge",
        }
    }
}

impl FromStr for ImportMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => anyhow::bail!("Unknown import mode '{other}': use replace or merge"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ImportOutcome {
    pub(crate) categories_added: usize,
    pub(crate) categories_updated: usize,
    pub(crate) transactions_added: usize,
}

impl std::fmt::Display for ImportOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} categories added, {} updated, {} transactions added",
            self.categories_added, self.categories_updated, self.transactions_added
        )
    }
}

/// Apply parsed import data to `state` and persist it.
///
/// `Replace` swaps both collections. `Merge` matches categories by exact name:
/// a match keeps its id and takes the imported budget and color (a zero
/// placeholder budget never overwrites a real one), and imported transactions
/// are pointed at it. Everything else is appended; ids already in use are
/// reassigned.
/// Data failing [`ImportData::check`] is rejected before anything changes.
pub(crate) fn commit_import(
    state: &mut AppState,
    data: ImportData,
    mode: ImportMode,
) -> Result<ImportOutcome> {
    data.check()?;
    let now_millis = state.now().timestamp_millis();
    let (mut categories, mut transactions) = match mode {
        ImportMode::Replace => (Vec::new(), Vec::new()),
        ImportMode::Merge => (state.categories().to_vec(), state.transactions().to_vec()),
    };
    let mut outcome = ImportOutcome::default();
    let mut remap: HashMap<CategoryId, CategoryId> = HashMap::new();

    for mut incoming in data.categories {
        if incoming.color.is_empty() {
            incoming.color = random_color().to_string();
        }
        if let Some(existing) = categories.iter_mut().find(|c| c.name == incoming.name) {
            if incoming.budget > Decimal::ZERO || existing.budget <= Decimal::ZERO {
                existing.budget = incoming.budget;
            }
            existing.color = incoming.color;
            remap.insert(incoming.id, existing.id);
            outcome.categories_updated += 1;
            continue;
        }
        let id = if categories.iter().any(|c| c.id == incoming.id) {
            CategoryId(next_id(now_millis, categories.iter().map(|c| c.id.0)))
        } else {
            incoming.id
        };
        remap.insert(incoming.id, id);
        incoming.id = id;
        categories.push(incoming);
        outcome.categories_added += 1;
    }

    let mut used: HashSet<TransactionId> = transactions.iter().map(|t| t.id).collect();
    for mut incoming in data.transactions {
        if let Some(id) = remap.get(&incoming.category_id) {
            incoming.category_id = *id;
        }
        if used.contains(&incoming.id) {
            incoming.id = TransactionId(next_id(now_millis, used.iter().map(|t| t.0)));
        }
        used.insert(incoming.id);
        transactions.push(incoming);
        outcome.transactions_added += 1;
    }

    state.replace_all(categories, transactions)?;
    info!(mode = mode.as_str(), %outcome, "committed import");
    Ok(outcome)
}
