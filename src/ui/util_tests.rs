#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::util::*;

// ── Amounts ──────────────────────────────────────────────────

#[test]
fn test_format_amount_groups_thousands() {
    assert_eq!(format_amount(dec!(1200)), "$1,200.00");
    assert_eq!(format_amount(dec!(987654321.5)), "$987,654,321.50");
    assert_eq!(format_amount(dec!(640.1)), "$640.10");
}

#[test]
fn test_format_amount_rounds_half_cents_up() {
    assert_eq!(format_amount(dec!(12.345)), "$12.35");
    assert_eq!(format_amount(dec!(0.004)), "$0.00");
}

#[test]
fn test_format_amount_overspent_remainder() {
    assert_eq!(format_amount(dec!(-50)), "-$50.00");
    assert_eq!(format_amount(dec!(-1234.5)), "-$1,234.50");
    // rounds to zero, so no sign
    assert_eq!(format_amount(dec!(-0.001)), "$0.00");
}

#[test]
fn test_format_amount_extremes() {
    assert_eq!(format_amount(Decimal::ZERO), "$0.00");
    assert_eq!(
        format_amount(crate::models::MAX_AMOUNT),
        "$1,000,000,000,000,000.00"
    );
    assert!(format_amount(Decimal::MAX).starts_with("$79,228,162,514"));
}

#[test]
fn test_spent_of() {
    assert_eq!(spent_of(dec!(120), dec!(500)), "$120.00 / $500.00");
}

// ── Truncation ───────────────────────────────────────────────

#[test]
fn test_truncate_keeps_fitting_names() {
    assert_eq!(truncate("Groceries", 9), "Groceries");
    assert_eq!(truncate("Rent", 20), "Rent");
    assert_eq!(truncate("", 3), "");
}

#[test]
fn test_truncate_marks_the_cut() {
    assert_eq!(truncate("Food & Dining", 8), "Food & …");
    assert_eq!(truncate("Travel", 1), "…");
    assert_eq!(truncate("Travel", 0), "");
}

#[test]
fn test_truncate_counts_characters_not_bytes() {
    assert_eq!(truncate("Café crème brûlée", 6), "Café …");
    assert_eq!(truncate("🍕🍔🌮🍣", 3), "🍕🍔…");
}

// ── List cursor ──────────────────────────────────────────────

#[test]
fn test_cursor_scrolls_to_keep_selection_visible() {
    let mut cursor = ListCursor::default();
    for _ in 0..4 {
        cursor.next(10, 3);
    }
    assert_eq!(cursor.selected, 4);
    assert_eq!(cursor.start(3), 2);

    cursor.prev();
    cursor.prev();
    cursor.prev();
    assert_eq!(cursor.selected, 1);
    assert_eq!(cursor.start(3), 1);
}

#[test]
fn test_cursor_stops_at_ends() {
    let mut cursor = ListCursor::default();
    cursor.prev();
    assert_eq!(cursor.selected, 0);
    cursor.last(5, 2);
    assert_eq!(cursor.selected, 4);
    assert_eq!(cursor.start(2), 3);
    cursor.next(5, 2);
    assert_eq!(cursor.selected, 4);
    cursor.first();
    assert_eq!(cursor, ListCursor::default());
}

#[test]
fn test_cursor_empty_list() {
    let mut cursor = ListCursor::default();
    cursor.next(0, 10);
    cursor.last(0, 10);
    assert_eq!(cursor.selected, 0);
    assert_eq!(cursor.start(10), 0);
}

#[test]
fn test_cursor_clamp_after_list_shrinks() {
    let mut cursor = ListCursor::default();
    cursor.last(20, 5);
    cursor.clamp(3);
    assert_eq!(cursor.selected, 2);
    assert_eq!(cursor.start(5), 2);
    cursor.clamp(0);
    assert_eq!(cursor.selected, 0);
}

#[test]
fn test_cursor_start_follows_smaller_window() {
    let mut cursor = ListCursor::default();
    cursor.last(30, 20);
    assert_eq!(cursor.start(20), 10);
    // a shorter panel still shows the selected row
    assert_eq!(cursor.start(4), 26);
}
