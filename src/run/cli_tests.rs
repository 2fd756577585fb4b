#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;
use crate::clock::FixedClock;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn state_with_food() -> AppState {
    let mut state = AppState::in_memory(FixedClock::on(date("2024-03-15")));
    state
        .add_category(CategoryDraft::new("Food", dec!(500)).unwrap())
        .unwrap();
    state
}

fn run(state: &mut AppState, list: &[&str]) -> Result<()> {
    let mut full = vec!["spendlens"];
    full.extend_from_slice(list);
    as_cli(&args(&full), state, &AppConfig::default())
}

// ── Argument helpers ─────────────────────────────────────────

#[test]
fn test_flag_reads_following_value() {
    let a = args(&["Food", "12", "--note", "lunch", "--date", "2024-01-02"]);
    assert_eq!(flag(&a, "--note"), Some("lunch"));
    assert_eq!(flag(&a, "--date"), Some("2024-01-02"));
    assert_eq!(flag(&a, "--mode"), None);
}

#[test]
fn test_positionals_skip_flag_values_and_switches() {
    let a = args(&["--note", "lunch", "Food", "--dry-run", "12"]);
    assert_eq!(positionals(&a), vec!["Food", "12"]);
}

#[test]
fn test_shellexpand_passthrough() {
    assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
    assert_eq!(shellexpand("relative.json"), "relative.json");
}

#[test]
fn test_bar_scales_to_max() {
    assert_eq!(bar(dec!(100), dec!(100), 10).chars().count(), 10);
    assert_eq!(bar(dec!(50), dec!(100), 10).chars().count(), 5);
    // small but non-zero amounts still get a sliver
    assert_eq!(bar(dec!(0.01), dec!(100), 10).chars().count(), 1);
    assert_eq!(bar(dec!(0), dec!(0), 10), "");
}

// ── Trends filter ────────────────────────────────────────────

#[test]
fn test_trends_filter_uses_config_defaults() {
    let config = AppConfig::default();
    let (filter, granularity) = trends_filter(&[], &[], &config).unwrap();
    assert_eq!(granularity, Granularity::Month);
    assert_eq!(filter.timeframe, Timeframe::Last30Days);
    assert_eq!(filter.category, CategoryFilter::All);
    assert!(!filter.note.is_active());
}

#[test]
fn test_trends_filter_from_to_implies_custom() {
    let a = args(&["--from", "2024-01-01", "--to", "2024-01-31", "--group", "week"]);
    let (filter, granularity) = trends_filter(&a, &[], &AppConfig::default()).unwrap();
    assert_eq!(filter.timeframe, Timeframe::Custom);
    assert_eq!(granularity, Granularity::Week);
    assert_eq!(filter.custom_start, Some(date("2024-01-01")));
    assert_eq!(filter.custom_end, Some(date("2024-01-31")));
}

#[test]
fn test_trends_filter_rejects_inverted_range() {
    let a = args(&["--from", "2024-02-01", "--to", "2024-01-01"]);
    let err = trends_filter(&a, &[], &AppConfig::default()).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ValidationError>(),
        Some(ValidationError::InvertedRange { .. })
    ));
}

#[test]
fn test_trends_filter_custom_needs_both_bounds() {
    let a = args(&["--timeframe", "custom", "--from", "2024-02-01"]);
    let err = trends_filter(&a, &[], &AppConfig::default()).unwrap_err();
    assert_eq!(
        err.downcast_ref::<ValidationError>(),
        Some(&ValidationError::IncompleteRange)
    );
}

#[test]
fn test_trends_filter_resolves_category() {
    let state = state_with_food();
    let food = state.categories()[0].id;
    let a = args(&["--category", "food"]);
    let (filter, _) = trends_filter(&a, state.categories(), &AppConfig::default()).unwrap();
    assert_eq!(filter.category, CategoryFilter::Only(food));

    let a = args(&["--category", "Rent"]);
    assert!(trends_filter(&a, state.categories(), &AppConfig::default()).is_err());
}

#[test]
fn test_trends_filter_note_honours_threshold() {
    let config = AppConfig {
        note_search_min_chars: 3,
        ..AppConfig::default()
    };
    let (filter, _) = trends_filter(&args(&["--note", "co"]), &[], &config).unwrap();
    assert!(!filter.note.is_active());
    let (filter, _) = trends_filter(&args(&["--note", "cof"]), &[], &config).unwrap();
    assert!(filter.note.is_active());
}

// ── Commands ─────────────────────────────────────────────────

#[test]
fn test_add_edit_delete_transaction() {
    let mut state = state_with_food();
    run(&mut state, &["add", "Food", "12.50", "--date", "2024-03-01", "--note", "lunch"]).unwrap();
    assert_eq!(state.transactions().len(), 1);
    let id = state.transactions()[0].id;
    let id_arg = id.to_string();
    assert_eq!(state.transactions()[0].amount, dec!(12.50));
    assert_eq!(state.transactions()[0].note, "lunch");

    run(&mut state, &["edit", id_arg.as_str(), "--amount", "20"]).unwrap();
    let txn = state.transaction(id).unwrap();
    assert_eq!(txn.amount, dec!(20));
    assert_eq!(txn.note, "lunch");
    assert_eq!(txn.date, date("2024-03-01"));

    run(&mut state, &["delete", id_arg.as_str()]).unwrap();
    assert!(state.transactions().is_empty());
}

#[test]
fn test_add_defaults_to_today() {
    let mut state = state_with_food();
    run(&mut state, &["add", "Food", "5"]).unwrap();
    assert_eq!(state.transactions()[0].date, date("2024-03-15"));
}

#[test]
fn test_add_rejects_future_date() {
    let mut state = state_with_food();
    assert!(run(&mut state, &["add", "Food", "5", "--date", "2024-03-16"]).is_err());
    assert!(state.transactions().is_empty());
}

#[test]
fn test_add_category_and_cascade_delete() {
    let mut state = state_with_food();
    run(&mut state, &["add-category", "Rent", "1200"]).unwrap();
    run(&mut state, &["add", "Rent", "1200", "--date", "2024-03-01"]).unwrap();
    run(&mut state, &["add", "Food", "10", "--date", "2024-03-01"]).unwrap();

    run(&mut state, &["delete-category", "rent"]).unwrap();
    assert_eq!(state.categories().len(), 1);
    assert_eq!(state.transactions().len(), 1);
}

#[test]
fn test_add_category_rejects_zero_budget() {
    let mut state = state_with_food();
    assert!(run(&mut state, &["add-category", "Rent", "0"]).is_err());
    assert_eq!(state.categories().len(), 1);
}

#[test]
fn test_summary_and_list_run_on_empty_data() {
    let mut state = AppState::in_memory(FixedClock::on(date("2024-03-15")));
    run(&mut state, &["summary", "--timeframe", "all"]).unwrap();
    run(&mut state, &["list"]).unwrap();
    run(&mut state, &["categories"]).unwrap();
}

#[test]
fn test_clear_requires_yes() {
    let mut state = state_with_food();
    assert!(run(&mut state, &["clear"]).is_err());
    assert_eq!(state.categories().len(), 1);
    run(&mut state, &["clear", "--yes"]).unwrap();
    assert!(state.categories().is_empty());
    assert!(state.backup_json().is_ok());
}

#[test]
fn test_export_then_dry_run_import_leaves_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    let path_str = path.to_str().unwrap();
    let mut state = state_with_food();
    run(&mut state, &["export", "json", path_str]).unwrap();
    assert!(path.exists());

    let mut fresh = AppState::in_memory(FixedClock::on(date("2024-03-15")));
    run(&mut fresh, &["import", path_str, "--dry-run"]).unwrap();
    assert!(fresh.categories().is_empty());

    run(&mut fresh, &["import", path_str, "--mode", "replace"]).unwrap();
    assert_eq!(fresh.categories().len(), 1);
}

#[test]
fn test_unknown_command_is_an_error() {
    let mut state = state_with_food();
    assert!(run(&mut state, &["frobnicate"]).is_err());
}
