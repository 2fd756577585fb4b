mod kv;
mod schema;
mod sqlite;

pub(crate) use kv::{KeyValueStore, MemoryStore};
pub(crate) use sqlite::SqliteStore;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::clock::{Clock, FixedClock};
use crate::error::{TransferError, ValidationError};
use crate::models::{
    next_id, Category, CategoryDraft, CategoryId, Transaction, TransactionDraft, TransactionId,
};
use crate::query::{list_transactions, CategoryFilter, NoteQuery};
use crate::summary::{self, BudgetStatus};

pub(crate) const CATEGORIES_KEY: &str = "budgetCategories";
pub(crate) const TRANSACTIONS_KEY: &str = "budgetTransactions";
pub(crate) const BACKUP_KEY: &str = "budgetBackup";
pub(crate) const LAST_BACKUP_KEY: &str = "lastBackup";

pub(crate) const FORMAT_VERSION: &str = "1.0";

/// Borrowed view of both collections, handed to the export adapters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Snapshot<'a> {
    pub(crate) categories: &'a [Category],
    pub(crate) transactions: &'a [Transaction],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackupMetadata {
    #[serde(rename = "type")]
    pub(crate) kind: String,
    pub(crate) backup_date: DateTime<Utc>,
    pub(crate) version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BackupSettings {
    pub(crate) last_backup: DateTime<Utc>,
}

/// The full-backup blob kept under [`BACKUP_KEY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct BackupDocument {
    pub(crate) metadata: BackupMetadata,
    pub(crate) categories: Vec<Category>,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) settings: BackupSettings,
}

/// All application data plus the store it is persisted to.
///
/// Mutations validate first, change the in-memory collections, then save the
/// affected blobs before returning. A failed save is reported as an error.
pub(crate) struct AppState {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    categories: Vec<Category>,
    transactions: Vec<Transaction>,
    warnings: Vec<String>,
}

impl AppState {
    pub(crate) fn load(mut store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Result<Self> {
        let mut warnings = Vec::new();
        let categories: Vec<Category> = load_blob(store.as_mut(), CATEGORIES_KEY, &mut warnings)?;
        let transactions: Vec<Transaction> =
            load_blob(store.as_mut(), TRANSACTIONS_KEY, &mut warnings)?;
        info!(
            categories = categories.len(),
            transactions = transactions.len(),
            "loaded data"
        );
        Ok(Self {
            store,
            clock,
            categories,
            transactions,
            warnings,
        })
    }

    #[cfg(test)]
    pub(crate) fn in_memory(clock: impl Clock + 'static) -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            clock: Box::new(clock),
            categories: Vec::new(),
            transactions: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A throwaway copy of the current data over a [`MemoryStore`], for
    /// rehearsing an import without touching the real store.
    pub(crate) fn scratch(&self) -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            clock: Box::new(FixedClock::frozen(self.clock.as_ref())),
            categories: self.categories.clone(),
            transactions: self.transactions.clone(),
            warnings: Vec::new(),
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    // ── Reads ─────────────────────────────────────────────────

    pub(crate) fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub(crate) fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub(crate) fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            categories: &self.categories,
            transactions: &self.transactions,
        }
    }

    /// Problems found while loading, e.g. a blob that was not valid JSON.
    pub(crate) fn load_warnings(&self) -> &[String] {
        &self.warnings
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub(crate) fn category(&self, id: CategoryId) -> Option<&Category> {
        Category::find_by_id(&self.categories, id)
    }

    pub(crate) fn category_name(&self, id: CategoryId) -> &str {
        Category::name_or_unknown(&self.categories, id)
    }

    pub(crate) fn transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub(crate) fn total_budget(&self) -> Decimal {
        summary::total_budget(&self.categories)
    }

    pub(crate) fn budget_status(&self) -> Vec<BudgetStatus> {
        summary::budget_status(&self.categories, &self.transactions)
    }

    pub(crate) fn recent_notes(&self, limit: usize) -> Vec<&Transaction> {
        summary::recent_notes(&self.transactions, limit)
    }

    pub(crate) fn list_transactions(
        &self,
        category: CategoryFilter,
        note: &NoteQuery,
    ) -> Vec<&Transaction> {
        list_transactions(&self.transactions, category, note)
    }

    // ── Categories ────────────────────────────────────────────

    pub(crate) fn add_category(&mut self, draft: CategoryDraft) -> Result<CategoryId> {
        let id = CategoryId(next_id(
            self.now().timestamp_millis(),
            self.categories.iter().map(|c| c.id.0),
        ));
        let category = Category::new(id, draft);
        info!(id = id.0, name = %category.name, "added category");
        self.categories.push(category);
        self.save_categories()?;
        Ok(id)
    }

    /// Delete a category and every transaction that references it.
    /// Returns how many transactions went with it.
    pub(crate) fn delete_category(&mut self, id: CategoryId) -> Result<usize> {
        let Some(pos) = self.categories.iter().position(|c| c.id == id) else {
            return Err(ValidationError::UnknownCategory(id.to_string()).into());
        };
        let before = self.transactions.len();
        self.transactions.retain(|t| t.category_id != id);
        let removed = before - self.transactions.len();
        let category = self.categories.remove(pos);
        info!(id = id.0, name = %category.name, removed, "deleted category");
        self.save_all()?;
        Ok(removed)
    }

    // ── Transactions ──────────────────────────────────────────

    pub(crate) fn add_transaction(&mut self, draft: TransactionDraft) -> Result<TransactionId> {
        draft.validate(&self.categories, self.today())?;
        let now = self.now().timestamp_millis();
        let id = TransactionId(next_id(now, self.transactions.iter().map(|t| t.id.0)));
        debug!(id = id.0, amount = %draft.amount, date = %draft.date, "adding transaction");
        self.transactions.push(Transaction::new(id, draft, now));
        self.save_transactions()?;
        Ok(id)
    }

    pub(crate) fn edit_transaction(&mut self, id: TransactionId, draft: TransactionDraft) -> Result<()> {
        draft.validate(&self.categories, self.today())?;
        let txn = self
            .transactions
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| ValidationError::UnknownTransaction(id.to_string()))?;
        txn.apply(draft);
        info!(id = id.0, "edited transaction");
        self.save_transactions()
    }

    pub(crate) fn delete_transaction(&mut self, id: TransactionId) -> Result<Transaction> {
        let pos = self
            .transactions
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| ValidationError::UnknownTransaction(id.to_string()))?;
        let removed = self.transactions.remove(pos);
        info!(id = id.0, "deleted transaction");
        self.save_transactions()?;
        Ok(removed)
    }

    /// Swap in new collections wholesale (import commit).
    pub(crate) fn replace_all(
        &mut self,
        categories: Vec<Category>,
        transactions: Vec<Transaction>,
    ) -> Result<()> {
        self.categories = categories;
        self.transactions = transactions;
        info!(
            categories = self.categories.len(),
            transactions = self.transactions.len(),
            "replaced data"
        );
        self.save_all()
    }

    // ── Backup ────────────────────────────────────────────────

    /// Store a full backup of the current data and record when it was taken.
    pub(crate) fn create_backup(&mut self) -> Result<DateTime<Utc>> {
        let now = self.now();
        let doc = BackupDocument {
            metadata: BackupMetadata {
                kind: "full-backup".to_string(),
                backup_date: now,
                version: FORMAT_VERSION.to_string(),
            },
            categories: self.categories.clone(),
            transactions: self.transactions.clone(),
            settings: BackupSettings { last_backup: now },
        };
        let blob = serde_json::to_string(&doc).context("Failed to serialize backup")?;
        self.store
            .set_many(&[(BACKUP_KEY, blob), (LAST_BACKUP_KEY, now.to_rfc3339())])?;
        info!(
            categories = doc.categories.len(),
            transactions = doc.transactions.len(),
            "created backup"
        );
        Ok(now)
    }

    pub(crate) fn last_backup(&self) -> Result<Option<DateTime<Utc>>> {
        let Some(raw) = self.store.get(LAST_BACKUP_KEY)? else {
            return Ok(None);
        };
        match DateTime::parse_from_rfc3339(raw.trim()) {
            Ok(at) => Ok(Some(at.with_timezone(&Utc))),
            Err(e) => {
                warn!(value = %raw, error = %e, "ignoring unreadable lastBackup");
                Ok(None)
            }
        }
    }

    /// The stored backup blob, verbatim.
    pub(crate) fn backup_json(&self) -> Result<String> {
        self.store
            .get(BACKUP_KEY)?
            .ok_or_else(|| TransferError::NoBackup.into())
    }

    pub(crate) fn export_backup(&self, path: &Path) -> Result<()> {
        let blob = self.backup_json()?;
        std::fs::write(path, blob)
            .with_context(|| format!("Failed to write backup: {}", path.display()))?;
        info!(path = %path.display(), "exported backup");
        Ok(())
    }

    /// Back up, then delete every category and transaction.
    pub(crate) fn clear_all(&mut self) -> Result<()> {
        self.create_backup()?;
        self.categories.clear();
        self.transactions.clear();
        self.store.remove(CATEGORIES_KEY)?;
        self.store.remove(TRANSACTIONS_KEY)?;
        warn!("cleared all data");
        Ok(())
    }

    // ── Persistence ───────────────────────────────────────────

    fn save_categories(&mut self) -> Result<()> {
        let blob = to_blob(&self.categories, CATEGORIES_KEY)?;
        self.store.set(CATEGORIES_KEY, &blob)
    }

    fn save_transactions(&mut self) -> Result<()> {
        let blob = to_blob(&self.transactions, TRANSACTIONS_KEY)?;
        self.store.set(TRANSACTIONS_KEY, &blob)
    }

    fn save_all(&mut self) -> Result<()> {
        let entries = [
            (CATEGORIES_KEY, to_blob(&self.categories, CATEGORIES_KEY)?),
            (TRANSACTIONS_KEY, to_blob(&self.transactions, TRANSACTIONS_KEY)?),
        ];
        self.store.set_many(&entries)
    }
}

fn to_blob<T: Serialize>(value: &T, key: &str) -> Result<String> {
    serde_json::to_string(value).with_context(|| format!("Failed to serialize '{key}'"))
}

/// Absent keys are empty collections. So are blobs that fail to parse; the raw
/// text is set aside under `<key>.corrupt` and the problem is reported back
/// through `warnings`.
fn load_blob<T: DeserializeOwned>(
    store: &mut dyn KeyValueStore,
    key: &str,
    warnings: &mut Vec<String>,
) -> Result<Vec<T>> {
    let Some(raw) = store.get(key)? else {
        return Ok(Vec::new());
    };
    match serde_json::from_str(&raw) {
        Ok(items) => Ok(items),
        Err(e) => {
            warn!(key, error = %e, "stored data is corrupt, starting empty");
            store.set(&corrupt_key(key), &raw)?;
            warnings.push(format!("Stored '{key}' could not be read and was ignored: {e}"));
            Ok(Vec::new())
        }
    }
}

pub(crate) fn corrupt_key(key: &str) -> String {
    format!("{key}.corrupt")
}

#[cfg(test)]
mod tests;
