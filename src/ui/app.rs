use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use crate::config::AppConfig;
use crate::models::{Category, Transaction, TransactionId};
use crate::query::{
    filter_transactions, group_by_period, Aggregation, CategoryFilter, Granularity, NoteQuery,
    TransactionFilter,
};
use crate::store::AppState;
use crate::summary::{breakdown, summarize, BreakdownRow, BudgetStatus, Summary};
use crate::transfer::{read_import, ExportFormat, ImportData, ImportMode, ImportPreview};

use super::util::ListCursor;

/// Notes shown under the budget gauges.
pub(crate) const RECENT_NOTES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Screen {
    Trends,
    Transactions,
    Categories,
    Transfer,
}

impl Screen {
    pub(crate) fn all() -> &'static [Screen] {
        &[
            Self::Trends,
            Self::Transactions,
            Self::Categories,
            Self::Transfer,
        ]
    }
}

impl std::fmt::Display for Screen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trends => write!(f, "Trends"),
            Self::Transactions => write!(f, "Transactions"),
            Self::Categories => write!(f, "Categories"),
            Self::Transfer => write!(f, "Transfer"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum InputMode {
    Normal,
    Command,
    Search,
    Editing,
    Confirm,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Normal => write!(f, "NORMAL"),
            Self::Command => write!(f, "COMMAND"),
            Self::Search => write!(f, "SEARCH"),
            Self::Editing => write!(f, "EDIT"),
            Self::Confirm => write!(f, "CONFIRM"),
        }
    }
}

/// Pending action that requires user confirmation.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingAction {
    DeleteTransaction { id: TransactionId, label: String },
    DeleteCategory { category: Category, transactions: usize },
    ClearAll,
    ImportCommit,
}

pub(crate) struct App {
    pub(crate) running: bool,
    pub(crate) screen: Screen,
    pub(crate) input_mode: InputMode,
    pub(crate) command_input: String,
    pub(crate) search_input: String,
    pub(crate) status_message: String,
    pub(crate) show_help: bool,
    pub(crate) note_min_chars: usize,

    // Trends
    pub(crate) filter: TransactionFilter,
    pub(crate) granularity: Granularity,
    pub(crate) aggregation: Aggregation,
    pub(crate) summary: Summary,
    pub(crate) breakdown: Vec<BreakdownRow>,
    pub(crate) breakdown_cursor: ListCursor,

    // Transactions
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) transaction_cursor: ListCursor,
    pub(crate) transaction_count: usize,

    // Categories
    pub(crate) categories: Vec<Category>,
    pub(crate) budget_status: Vec<BudgetStatus>,
    pub(crate) total_budget: Decimal,
    pub(crate) recent_notes: Vec<Transaction>,
    pub(crate) category_cursor: ListCursor,

    // Transfer
    pub(crate) export_cursor: ListCursor,
    pub(crate) export_dir: PathBuf,
    pub(crate) import_mode: ImportMode,
    pub(crate) import_path: Option<PathBuf>,
    pub(crate) import_data: Option<ImportData>,
    pub(crate) import_preview: Option<ImportPreview>,
    pub(crate) last_backup: Option<DateTime<Utc>>,

    // Confirmation
    pub(crate) pending_action: Option<PendingAction>,
    pub(crate) confirm_message: String,

    // Layout (updated each render frame)
    pub(crate) visible_rows: usize,
}

impl App {
    pub(crate) fn new(config: &AppConfig) -> Self {
        let granularity = config.granularity();
        let filter = TransactionFilter {
            timeframe: config.timeframe(),
            ..TransactionFilter::default()
        };

        Self {
            running: true,
            screen: Screen::Trends,
            input_mode: InputMode::Normal,
            command_input: String::new(),
            search_input: String::new(),
            status_message: String::new(),
            show_help: false,
            note_min_chars: config.note_search_min_chars,

            filter,
            granularity,
            aggregation: group_by_period(std::iter::empty(), &[], granularity),
            summary: Summary::default(),
            breakdown: Vec::new(),
            breakdown_cursor: ListCursor::default(),

            transactions: Vec::new(),
            transaction_cursor: ListCursor::default(),
            transaction_count: 0,

            categories: Vec::new(),
            budget_status: Vec::new(),
            total_budget: Decimal::ZERO,
            recent_notes: Vec::new(),
            category_cursor: ListCursor::default(),

            export_cursor: ListCursor::default(),
            export_dir: directories::UserDirs::new()
                .map(|d| d.home_dir().to_path_buf())
                .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))),
            import_mode: ImportMode::default(),
            import_path: None,
            import_data: None,
            import_preview: None,
            last_backup: None,

            pending_action: None,
            confirm_message: String::new(),

            visible_rows: 20,
        }
    }

    /// Re-run filter, grouping and summary. An invalid custom range leaves the
    /// previous results on screen and reports the problem instead.
    pub(crate) fn refresh_trends(&mut self, state: &AppState) -> Result<()> {
        match filter_transactions(state.transactions(), &self.filter, state.today()) {
            Ok(filtered) => {
                self.aggregation = group_by_period(filtered, state.categories(), self.granularity);
                self.summary = summarize(&self.aggregation);
                self.breakdown = breakdown(&self.aggregation);
                self.breakdown_cursor.clamp(self.breakdown.len());
            }
            Err(e) => self.set_status(e.to_string()),
        }
        Ok(())
    }

    /// The transaction list shares the category and note predicates with the
    /// trends view; the search box, when non-empty, takes over the note query.
    pub(crate) fn refresh_transactions(&mut self, state: &AppState) -> Result<()> {
        let note = if self.search_input.is_empty() {
            self.filter.note.clone()
        } else {
            NoteQuery::new(&self.search_input, self.note_min_chars)
        };
        self.transactions = state
            .list_transactions(self.filter.category, &note)
            .into_iter()
            .cloned()
            .collect();
        self.transaction_count = state.transactions().len();
        self.transaction_cursor.clamp(self.transactions.len());
        Ok(())
    }

    pub(crate) fn refresh_categories(&mut self, state: &AppState) -> Result<()> {
        self.categories = state.categories().to_vec();
        self.budget_status = state.budget_status();
        self.total_budget = state.total_budget();
        self.recent_notes = state
            .recent_notes(RECENT_NOTES)
            .into_iter()
            .cloned()
            .collect();
        self.category_cursor.clamp(self.categories.len());
        if let CategoryFilter::Only(id) = self.filter.category {
            if state.category(id).is_none() {
                self.filter.category = CategoryFilter::All;
            }
        }
        Ok(())
    }

    pub(crate) fn refresh_transfer(&mut self, state: &AppState) -> Result<()> {
        self.last_backup = state.last_backup()?;
        Ok(())
    }

    pub(crate) fn refresh_all(&mut self, state: &AppState) -> Result<()> {
        self.refresh_categories(state)?;
        self.refresh_trends(state)?;
        self.refresh_transactions(state)?;
        self.refresh_transfer(state)?;
        Ok(())
    }

    pub(crate) fn selected_transaction(&self) -> Option<&Transaction> {
        self.transactions.get(self.transaction_cursor.selected)
    }

    pub(crate) fn selected_category(&self) -> Option<&Category> {
        self.categories.get(self.category_cursor.selected)
    }

    pub(crate) fn selected_export(&self) -> ExportFormat {
        ExportFormat::all()
            .get(self.export_cursor.selected)
            .copied()
            .unwrap_or(ExportFormat::Json)
    }

    pub(crate) fn category_name(&self, txn: &Transaction) -> &str {
        Category::name_or_unknown(&self.categories, txn.category_id)
    }

    /// Parse `path` and hold the result for preview. Nothing is committed.
    pub(crate) fn load_import(&mut self, path: &Path, now: DateTime<Utc>) -> Result<()> {
        let data = read_import(path, now)?;
        let preview = data.preview();
        self.set_status(format!(
            "{} categories, {} transactions ready to import ({})",
            preview.category_count,
            preview.transaction_count,
            self.import_mode.as_str()
        ));
        self.import_path = Some(path.to_path_buf());
        self.import_preview = Some(preview);
        self.import_data = Some(data);
        Ok(())
    }

    pub(crate) fn clear_import(&mut self) {
        self.import_path = None;
        self.import_data = None;
        self.import_preview = None;
    }

    /// Short description of the active trends filter for headers.
    pub(crate) fn filter_summary(&self) -> String {
        let window = match self.filter.custom_range() {
            Ok(range) if self.filter.timeframe == crate::query::Timeframe::Custom => {
                format!("{} to {}", range.start(), range.end())
            }
            _ => self.filter.timeframe.describe().to_string(),
        };
        let category = match self.filter.category {
            CategoryFilter::All => "All categories".to_string(),
            CategoryFilter::Only(id) => Category::name_or_unknown(&self.categories, id).to_string(),
        };
        let mut out = format!("{window} | by {} | {category}", self.granularity);
        if self.filter.note.is_active() {
            out.push_str(&format!(" | note ~ \"{}\"", self.filter.note.text()));
        }
        out
    }

    pub(crate) fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }
}

#[cfg(test)]
#[path = "app_tests.rs"]
mod tests;
