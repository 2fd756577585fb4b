#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::clock::FixedClock;
use crate::config::AppConfig;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn setup() -> (App, AppState) {
    let mut state = AppState::in_memory(FixedClock::on(date("2024-03-15")));
    state
        .add_category(CategoryDraft::new("Food", dec!(500)).unwrap())
        .unwrap();
    state
        .add_category(CategoryDraft::new("Food & Dining", dec!(300)).unwrap())
        .unwrap();
    let mut app = App::new(&AppConfig::default());
    app.refresh_all(&state).unwrap();
    (app, state)
}

fn run(input: &str, app: &mut App, state: &mut AppState) {
    handle_command(input, app, state).unwrap();
}

// ── Levenshtein ──────────────────────────────────────────────

#[test]
fn test_levenshtein_identical() {
    assert_eq!(levenshtein("export", "export"), 0);
}

#[test]
fn test_levenshtein_one_edit() {
    assert_eq!(levenshtein("exprt", "export"), 1);
    assert_eq!(levenshtein("grup", "group"), 1);
}

#[test]
fn test_levenshtein_empty() {
    assert_eq!(levenshtein("", "abc"), 3);
    assert_eq!(levenshtein("abc", ""), 3);
}

#[test]
fn test_find_closest_skips_single_letter_aliases() {
    assert_eq!(find_closest("timefram"), "timeframe");
    assert_eq!(find_closest("imprt"), "import");
}

#[test]
fn test_unknown_command_suggests() {
    let (mut app, mut state) = setup();
    run("backp", &mut app, &mut state);
    assert!(app.status_message.contains("Did you mean :backup?"));
}

// ── Category parsing ─────────────────────────────────────────

#[test]
fn test_split_category_prefers_longest_name() {
    let (app, _) = setup();
    let (cat, rest) = split_category(&app.categories, "food & dining 12.50 dinner").unwrap();
    assert_eq!(cat.name, "Food & Dining");
    assert_eq!(rest, "12.50 dinner");
}

#[test]
fn test_split_category_requires_word_boundary() {
    let (app, _) = setup();
    let (cat, rest) = split_category(&app.categories, "Food 4").unwrap();
    assert_eq!(cat.name, "Food");
    assert_eq!(rest, "4");
    assert!(split_category(&app.categories, "Foodie 4").is_none());
}

#[test]
fn test_split_category_by_id() {
    let (app, _) = setup();
    let id = app.categories[0].id;
    let input = format!("{id} 9");
    let (cat, rest) = split_category(&app.categories, &input).unwrap();
    assert_eq!(cat.id, id);
    assert_eq!(rest, "9");
}

#[test]
fn test_add_category_multi_word_name() {
    let (mut app, mut state) = setup();
    run("category Rent & Utilities 1200", &mut app, &mut state);
    let cat = Category::resolve(state.categories(), "Rent & Utilities").unwrap();
    assert_eq!(cat.budget, dec!(1200));
    assert_eq!(app.categories.len(), 3);
}

#[test]
fn test_add_category_rejects_zero_budget() {
    let (mut app, mut state) = setup();
    run("category Fun 0", &mut app, &mut state);
    assert!(app.status_message.starts_with("Error:"));
    assert_eq!(state.categories().len(), 2);
}

// ── Adding and editing transactions ─────────────────────────

#[test]
fn test_add_with_date_and_note() {
    let (mut app, mut state) = setup();
    run("add Food & Dining 12.50 2024-03-01 team lunch", &mut app, &mut state);
    let txn = &state.transactions()[0];
    assert_eq!(txn.amount, dec!(12.50));
    assert_eq!(txn.date, date("2024-03-01"));
    assert_eq!(txn.note, "team lunch");
    assert_eq!(state.category_name(txn.category_id), "Food & Dining");
}

#[test]
fn test_add_defaults_to_today() {
    let (mut app, mut state) = setup();
    run("a Food 4.50 coffee", &mut app, &mut state);
    let txn = &state.transactions()[0];
    assert_eq!(txn.date, date("2024-03-15"));
    assert_eq!(txn.note, "coffee");
}

#[test]
fn test_add_rejects_future_date() {
    let (mut app, mut state) = setup();
    run("add Food 10 2024-04-01", &mut app, &mut state);
    assert!(app.status_message.starts_with("Error:"));
    assert!(state.transactions().is_empty());
}

#[test]
fn test_add_unknown_category() {
    let (mut app, mut state) = setup();
    run("add Travel 10", &mut app, &mut state);
    assert!(app.status_message.contains("No category matches"));
    assert!(state.transactions().is_empty());
}

#[test]
fn test_amount_edits_selected_transaction() {
    let (mut app, mut state) = setup();
    run("add Food 10 2024-03-01 snacks", &mut app, &mut state);
    app.screen = Screen::Transactions;
    run("amount 15.25", &mut app, &mut state);
    let txn = &state.transactions()[0];
    assert_eq!(txn.amount, dec!(15.25));
    assert_eq!(txn.note, "snacks");
}

#[test]
fn test_edit_requires_transactions_screen() {
    let (mut app, mut state) = setup();
    run("add Food 10", &mut app, &mut state);
    run("amount 20", &mut app, &mut state);
    assert!(app.status_message.contains("Navigate to Transactions"));
    assert_eq!(state.transactions()[0].amount, dec!(10));
}

#[test]
fn test_recat_and_note() {
    let (mut app, mut state) = setup();
    run("add Food 10", &mut app, &mut state);
    app.screen = Screen::Transactions;
    run("recat Food & Dining", &mut app, &mut state);
    edit_note(&mut app, &mut state, "  brunch ").unwrap();
    let txn = &state.transactions()[0];
    assert_eq!(state.category_name(txn.category_id), "Food & Dining");
    assert_eq!(txn.note, "brunch");
}

#[test]
fn test_delete_txn_asks_for_confirmation() {
    let (mut app, mut state) = setup();
    run("add Food 10", &mut app, &mut state);
    app.screen = Screen::Transactions;
    run("delete-txn", &mut app, &mut state);
    assert_eq!(app.input_mode, InputMode::Confirm);
    assert!(matches!(
        app.pending_action,
        Some(PendingAction::DeleteTransaction { .. })
    ));
    // nothing removed until confirmed
    assert_eq!(state.transactions().len(), 1);
}

// ── Filters ─────────────────────────────────────────────────

#[test]
fn test_group_and_timeframe() {
    let (mut app, mut state) = setup();
    run("group week", &mut app, &mut state);
    assert_eq!(app.granularity, Granularity::Week);
    run("tf all", &mut app, &mut state);
    assert_eq!(app.filter.timeframe, Timeframe::AllTime);
}

#[test]
fn test_group_invalid_reports_error() {
    let (mut app, mut state) = setup();
    run("group fortnight", &mut app, &mut state);
    assert!(app.status_message.starts_with("Error:"));
    assert_eq!(app.granularity, Granularity::Month);
}

#[test]
fn test_timeframe_custom_without_bounds_rejected() {
    let (mut app, mut state) = setup();
    run("timeframe custom", &mut app, &mut state);
    assert!(app.status_message.starts_with("Error:"));
    assert_ne!(app.filter.timeframe, Timeframe::Custom);
}

#[test]
fn test_range_applies_custom_window() {
    let (mut app, mut state) = setup();
    run("range 2024-01-01 2024-01-31", &mut app, &mut state);
    assert_eq!(app.filter.timeframe, Timeframe::Custom);
    assert_eq!(app.filter.custom_start, Some(date("2024-01-01")));
    assert_eq!(app.filter.custom_end, Some(date("2024-01-31")));
}

#[test]
fn test_range_inverted_leaves_filter_unchanged() {
    let (mut app, mut state) = setup();
    let before = app.filter.timeframe;
    run("range 2024-02-01 2024-01-01", &mut app, &mut state);
    assert!(app.status_message.starts_with("Error:"));
    assert_eq!(app.filter.timeframe, before);
    assert_eq!(app.filter.custom_start, None);
}

#[test]
fn test_filter_and_clear_filters() {
    let (mut app, mut state) = setup();
    run("filter Food", &mut app, &mut state);
    assert!(matches!(app.filter.category, CategoryFilter::Only(_)));
    run("note coffee", &mut app, &mut state);
    assert!(app.filter.note.is_active());
    run("clear-filters", &mut app, &mut state);
    assert_eq!(app.filter.category, CategoryFilter::All);
    assert!(!app.filter.note.is_active());
}

#[test]
fn test_note_below_threshold_is_inactive() {
    let (mut app, mut state) = setup();
    app.note_min_chars = 3;
    run("note ab", &mut app, &mut state);
    assert!(!app.filter.note.is_active());
    assert!(app.status_message.contains("at least 3"));
}

// ── Deletion and transfer ───────────────────────────────────

#[test]
fn test_delete_category_sets_up_confirm() {
    let (mut app, mut state) = setup();
    run("add Food 10", &mut app, &mut state);
    run("delete-category Food", &mut app, &mut state);
    assert_eq!(app.input_mode, InputMode::Confirm);
    let food = Category::resolve(state.categories(), "Food").cloned().unwrap();
    assert_eq!(
        app.pending_action,
        Some(PendingAction::DeleteCategory {
            category: food,
            transactions: 1,
        })
    );
    assert!(app.confirm_message.contains("1 transaction?"));
}

#[test]
fn test_delete_category_without_args_outside_categories() {
    let (mut app, mut state) = setup();
    run("delete-category", &mut app, &mut state);
    assert!(app.status_message.starts_with("Usage"));
    assert!(app.pending_action.is_none());
}

#[test]
fn test_clear_all_needs_confirmation() {
    let (mut app, mut state) = setup();
    run("clear-all", &mut app, &mut state);
    assert_eq!(app.pending_action, Some(PendingAction::ClearAll));
    assert_eq!(state.categories().len(), 2);
}

#[test]
fn test_export_writes_file() {
    let (mut app, mut state) = setup();
    run("add Food 10 2024-03-01 lunch", &mut app, &mut state);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    run(&format!("export csv {}", path.display()), &mut app, &mut state);
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("lunch"));
    assert!(app.status_message.starts_with("Exported csv"));
}

#[test]
fn test_export_defaults_to_export_dir() {
    let (mut app, mut state) = setup();
    let dir = tempfile::tempdir().unwrap();
    app.export_dir = dir.path().to_path_buf();
    run("export json", &mut app, &mut state);
    let name = ExportFormat::Json.default_file_name(state.now());
    assert!(dir.path().join(name).exists());
}

#[test]
fn test_import_mode_toggle_and_set() {
    let (mut app, mut state) = setup();
    assert_eq!(app.import_mode, ImportMode::Merge);
    run("mode", &mut app, &mut state);
    assert_eq!(app.import_mode, ImportMode::Replace);
    run("mode merge", &mut app, &mut state);
    assert_eq!(app.import_mode, ImportMode::Merge);
}

#[test]
fn test_import_loads_preview_on_transfer_screen() {
    let (mut app, mut state) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("in.csv");
    std::fs::write(&path, "CATEGORIES\nName,Budget\nTravel,250\n").unwrap();
    run(&format!("import {}", path.display()), &mut app, &mut state);
    assert_eq!(app.screen, Screen::Transfer);
    assert_eq!(app.import_preview.as_ref().unwrap().category_count, 1);
    assert_eq!(state.categories().len(), 2);
}

#[test]
fn test_backup_records_timestamp() {
    let (mut app, mut state) = setup();
    assert!(app.last_backup.is_none());
    run("backup", &mut app, &mut state);
    assert!(app.last_backup.is_some());
}
