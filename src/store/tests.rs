#![allow(clippy::unwrap_used)]

use super::*;
use crate::clock::{Clock, FixedClock};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn clock() -> FixedClock {
    FixedClock::on(date(2024, 3, 15))
}

fn state() -> AppState {
    AppState::in_memory(clock())
}

fn add_category(state: &mut AppState, name: &str) -> CategoryId {
    state
        .add_category(CategoryDraft::new(name, dec!(500)).unwrap())
        .unwrap()
}

fn add_txn(state: &mut AppState, category: CategoryId, amount: Decimal, on: NaiveDate) -> TransactionId {
    state
        .add_transaction(TransactionDraft::new(category, amount, on, "").unwrap())
        .unwrap()
}

// ── Key-value backends ────────────────────────────────────────

#[test]
fn test_memory_store_get_set_remove() {
    let mut store = MemoryStore::new();
    assert_eq!(store.get("k").unwrap(), None);
    store.set("k", "v1").unwrap();
    store.set("k", "v2").unwrap();
    assert_eq!(store.get("k").unwrap().as_deref(), Some("v2"));
    store.remove("k").unwrap();
    assert_eq!(store.get("k").unwrap(), None);
}

#[test]
fn test_sqlite_store_fresh_schema() {
    let store = SqliteStore::open_in_memory().unwrap();
    assert_eq!(store.schema_version().unwrap(), schema::CURRENT_VERSION);
}

#[test]
fn test_sqlite_store_upsert_and_remove() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store.set("budgetCategories", "[]").unwrap();
    store.set("budgetCategories", "[1]").unwrap();
    assert_eq!(store.get("budgetCategories").unwrap().as_deref(), Some("[1]"));
    store.remove("budgetCategories").unwrap();
    assert_eq!(store.get("budgetCategories").unwrap(), None);
    // removing a missing key is not an error
    store.remove("budgetCategories").unwrap();
}

#[test]
fn test_sqlite_store_set_many() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    store
        .set_many(&[("a", "1".to_string()), ("b", "2".to_string())])
        .unwrap();
    assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    assert_eq!(store.get("b").unwrap().as_deref(), Some("2"));
}

#[test]
fn test_sqlite_reopen_keeps_version_and_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendlens.db");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        store.set("lastBackup", "x").unwrap();
    }
    let store = SqliteStore::open(&path).unwrap();
    assert_eq!(store.schema_version().unwrap(), schema::CURRENT_VERSION);
    assert_eq!(store.get("lastBackup").unwrap().as_deref(), Some("x"));
}

// ── Load / save ───────────────────────────────────────────────

#[test]
fn test_load_absent_keys_is_empty() {
    let state = AppState::load(Box::new(MemoryStore::new()), Box::new(clock())).unwrap();
    assert!(state.categories().is_empty());
    assert!(state.transactions().is_empty());
    assert!(state.load_warnings().is_empty());
}

#[test]
fn test_load_corrupt_blob_is_empty_with_warning() {
    let mut store = MemoryStore::new();
    store.set(CATEGORIES_KEY, "{not json").unwrap();
    store
        .set(
            TRANSACTIONS_KEY,
            r#"[{"id":5,"categoryId":1,"amount":12.5,"date":"2024-01-02","note":null,"timestamp":0}]"#,
        )
        .unwrap();

    let state = AppState::load(Box::new(store), Box::new(clock())).unwrap();
    assert!(state.categories().is_empty());
    assert_eq!(state.transactions().len(), 1);
    assert_eq!(state.transactions()[0].amount, dec!(12.5));
    assert_eq!(state.load_warnings().len(), 1);
    assert!(state.load_warnings()[0].contains(CATEGORIES_KEY));
    assert_eq!(
        state.store().get(&corrupt_key(CATEGORIES_KEY)).unwrap().as_deref(),
        Some("{not json")
    );
}

#[test]
fn test_mutations_persist_across_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spendlens.db");
    let (food, txn) = {
        let store = SqliteStore::open(&path).unwrap();
        let mut state = AppState::load(Box::new(store), Box::new(clock())).unwrap();
        let food = add_category(&mut state, "Food");
        let txn = add_txn(&mut state, food, dec!(19.99), date(2024, 3, 1));
        (food, txn)
    };

    let store = SqliteStore::open(&path).unwrap();
    let state = AppState::load(Box::new(store), Box::new(clock())).unwrap();
    assert_eq!(state.categories().len(), 1);
    assert_eq!(state.categories()[0].id, food);
    assert_eq!(state.categories()[0].name, "Food");
    assert_eq!(state.transaction(txn).unwrap().amount, dec!(19.99));
    assert_eq!(state.transaction(txn).unwrap().category_id, food);
}

#[test]
fn test_blob_shape_is_camel_case_array() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    add_txn(&mut state, food, dec!(3), date(2024, 3, 1));
    let raw = state.store().get(TRANSACTIONS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value.as_array().unwrap()[0];
    assert_eq!(first["categoryId"], serde_json::json!(food.0));
    assert_eq!(first["amount"], serde_json::json!(3.0));
    assert_eq!(first["date"], "2024-03-01");
}

// ── Categories ────────────────────────────────────────────────

#[test]
fn test_add_category_assigns_unique_ids_and_palette_color() {
    let mut state = state();
    let a = add_category(&mut state, "Food");
    let b = add_category(&mut state, "Rent");
    assert_ne!(a, b);
    assert_eq!(a.0, Clock::now(&clock()).timestamp_millis());
    assert_eq!(b.0, a.0 + 1);
    for cat in state.categories() {
        assert!(crate::models::PALETTE.contains(&cat.color.as_str()));
    }
}

#[test]
fn test_delete_category_cascades() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    let rent = add_category(&mut state, "Rent");
    add_txn(&mut state, food, dec!(1), date(2024, 1, 1));
    add_txn(&mut state, rent, dec!(2), date(2024, 1, 2));
    add_txn(&mut state, food, dec!(3), date(2024, 1, 3));

    let before = state.transactions().len();
    let removed = state.delete_category(food).unwrap();
    assert_eq!(removed, 2);
    assert_eq!(state.transactions().len(), before - removed);
    assert!(state.transactions().iter().all(|t| t.category_id == rent));
    assert!(state.category(food).is_none());

    let saved: Vec<Transaction> =
        serde_json::from_str(&state.store().get(TRANSACTIONS_KEY).unwrap().unwrap()).unwrap();
    assert_eq!(saved.len(), 1);
}

#[test]
fn test_delete_unknown_category_is_rejected() {
    let mut state = state();
    let err = state.delete_category(CategoryId(42)).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::UnknownCategory("42".into()))
    );
}

#[test]
fn test_category_name_falls_back_to_unknown() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    assert_eq!(state.category_name(food), "Food");
    assert_eq!(state.category_name(CategoryId(7)), "Unknown");
}

#[test]
fn test_total_budget_and_status() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    add_category(&mut state, "Rent");
    add_txn(&mut state, food, dec!(450), date(2024, 3, 1));
    assert_eq!(state.total_budget(), dec!(1000));
    let status = state.budget_status();
    assert_eq!(status[0].percent, dec!(90));
    assert_eq!(status[0].level, crate::summary::BudgetLevel::Warning);
}

// ── Transactions ──────────────────────────────────────────────

#[test]
fn test_add_transaction_rejects_future_date() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    let draft = TransactionDraft::new(food, dec!(5), date(2024, 3, 16), "").unwrap();
    let err = state.add_transaction(draft).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::FutureDate(date(2024, 3, 16)))
    );
    assert!(state.transactions().is_empty());

    // today itself is fine
    add_txn(&mut state, food, dec!(5), date(2024, 3, 15));
}

#[test]
fn test_add_transaction_rejects_unknown_category() {
    let mut state = state();
    let draft = TransactionDraft::new(CategoryId(9), dec!(5), date(2024, 3, 1), "").unwrap();
    assert!(state.add_transaction(draft).is_err());
    assert!(state.transactions().is_empty());
}

#[test]
fn test_edit_transaction_keeps_identity() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    let rent = add_category(&mut state, "Rent");
    let id = add_txn(&mut state, food, dec!(5), date(2024, 3, 1));
    let timestamp = state.transaction(id).unwrap().timestamp;

    let draft = TransactionDraft::new(rent, dec!(900), date(2024, 2, 1), " monthly ").unwrap();
    state.edit_transaction(id, draft).unwrap();

    let txn = state.transaction(id).unwrap();
    assert_eq!(txn.category_id, rent);
    assert_eq!(txn.amount, dec!(900));
    assert_eq!(txn.date, date(2024, 2, 1));
    assert_eq!(txn.note, "monthly");
    assert_eq!(txn.timestamp, timestamp);
}

#[test]
fn test_edit_rejects_invalid_draft_without_change() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    let id = add_txn(&mut state, food, dec!(5), date(2024, 3, 1));
    let draft = TransactionDraft::new(food, dec!(7), date(2030, 1, 1), "").unwrap();
    assert!(state.edit_transaction(id, draft).is_err());
    assert_eq!(state.transaction(id).unwrap().amount, dec!(5));
}

#[test]
fn test_delete_transaction() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    let keep = add_txn(&mut state, food, dec!(5), date(2024, 3, 1));
    let gone = add_txn(&mut state, food, dec!(6), date(2024, 3, 1));
    assert_ne!(keep, gone);

    let removed = state.delete_transaction(gone).unwrap();
    assert_eq!(removed.amount, dec!(6));
    assert_eq!(state.transactions().len(), 1);
    assert!(state.delete_transaction(gone).is_err());
}

// ── Backup ────────────────────────────────────────────────────

#[test]
fn test_no_backup_yet() {
    let state = state();
    assert_eq!(state.last_backup().unwrap(), None);
    let err = state.backup_json().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<TransferError>(),
        Some(TransferError::NoBackup)
    ));
}

#[test]
fn test_create_backup_document() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    add_txn(&mut state, food, dec!(5), date(2024, 3, 1));

    let at = state.create_backup().unwrap();
    assert_eq!(state.last_backup().unwrap(), Some(at));

    let doc: BackupDocument = serde_json::from_str(&state.backup_json().unwrap()).unwrap();
    assert_eq!(doc.metadata.kind, "full-backup");
    assert_eq!(doc.metadata.version, "1.0");
    assert_eq!(doc.metadata.backup_date, at);
    assert_eq!(doc.settings.last_backup, at);
    assert_eq!(doc.categories, state.categories());
    assert_eq!(doc.transactions, state.transactions());

    let raw: serde_json::Value = serde_json::from_str(&state.backup_json().unwrap()).unwrap();
    assert_eq!(raw["metadata"]["type"], "full-backup");
    assert!(raw["settings"]["lastBackup"].is_string());
}

#[test]
fn test_export_backup_writes_file() {
    let mut state = state();
    add_category(&mut state, "Food");
    state.create_backup().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("backup.json");
    state.export_backup(&path).unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), state.backup_json().unwrap());
}

#[test]
fn test_clear_all_backs_up_first() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    add_txn(&mut state, food, dec!(5), date(2024, 3, 1));

    state.clear_all().unwrap();
    assert!(state.categories().is_empty());
    assert!(state.transactions().is_empty());
    assert_eq!(state.store().get(CATEGORIES_KEY).unwrap(), None);
    assert_eq!(state.store().get(TRANSACTIONS_KEY).unwrap(), None);

    let doc: BackupDocument = serde_json::from_str(&state.backup_json().unwrap()).unwrap();
    assert_eq!(doc.categories.len(), 1);
    assert_eq!(doc.transactions.len(), 1);
}

// ── Scratch copies ────────────────────────────────────────────

#[test]
fn test_scratch_mutations_stay_local() {
    let mut state = state();
    let food = add_category(&mut state, "Food");
    add_txn(&mut state, food, dec!(5), date(2024, 3, 1));

    let mut scratch = state.scratch();
    assert_eq!(scratch.today(), state.today());
    add_txn(&mut scratch, food, dec!(7), date(2024, 3, 2));
    scratch.delete_category(food).unwrap();

    assert_eq!(state.categories().len(), 1);
    assert_eq!(state.transactions().len(), 1);
    assert!(scratch.categories().is_empty());
    assert!(state.store().get(CATEGORIES_KEY).unwrap().is_some());
}
