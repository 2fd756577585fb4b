#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::*;
use crate::models::{Category, CategoryId, Transaction, TransactionId};
use crate::query::{group_by_period, Granularity};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn category(id: i64, name: &str, budget: Decimal) -> Category {
    Category {
        id: CategoryId(id),
        name: name.into(),
        budget,
        color: "#667eea".into(),
    }
}

fn txn(id: i64, category_id: i64, amount: Decimal, on: NaiveDate, note: &str) -> Transaction {
    Transaction {
        id: TransactionId(id),
        category_id: CategoryId(category_id),
        amount,
        date: on,
        note: note.into(),
        timestamp: 0,
    }
}

fn food_scenario() -> (Vec<Category>, Vec<Transaction>) {
    (
        vec![category(1, "Food", dec!(500))],
        vec![
            txn(1, 1, dec!(120), date(2024, 1, 5), ""),
            txn(2, 1, dec!(80), date(2024, 1, 20), ""),
            txn(3, 1, dec!(50), date(2024, 2, 10), ""),
        ],
    )
}

// ── Scalar summary ────────────────────────────────────────────

#[test]
fn test_summary_month_scenario() {
    let (cats, txns) = food_scenario();
    let summary = summarize(&group_by_period(&txns, &cats, Granularity::Month));
    assert_eq!(summary.total, dec!(250));
    assert_eq!(summary.average, dec!(125));
    assert_eq!(summary.highest, dec!(200));
    assert_eq!(summary.period_count, 2);
    assert_eq!(summary.transaction_count, 3);
}

#[test]
fn test_summary_empty_is_zero() {
    let none: Vec<Transaction> = Vec::new();
    let summary = summarize(&group_by_period(&none, &[], Granularity::Week));
    assert_eq!(summary, Summary::default());
    assert_eq!(summary.average, Decimal::ZERO);
}

#[test]
fn test_average_is_total_over_periods() {
    let cats = vec![category(1, "Food", dec!(500))];
    let txns = vec![
        txn(1, 1, dec!(10), date(2024, 1, 1), ""),
        txn(2, 1, dec!(10), date(2024, 1, 2), ""),
        txn(3, 1, dec!(10), date(2024, 1, 3), ""),
    ];
    let by_day = summarize(&group_by_period(&txns, &cats, Granularity::Day));
    assert_eq!(by_day.average, dec!(10));
    let by_year = summarize(&group_by_period(&txns, &cats, Granularity::Year));
    assert_eq!(by_year.average, dec!(30));
    assert_eq!(by_day.total, by_year.total);
}

// ── Breakdown table ───────────────────────────────────────────

#[test]
fn test_breakdown_empty_placeholder() {
    let none: Vec<Transaction> = Vec::new();
    let rows = breakdown(&group_by_period(&none, &[], Granularity::Month));
    assert_eq!(rows, vec![BreakdownRow::Placeholder(NO_RESULTS.to_string())]);
    assert_eq!(rows[0].amount(), None);
}

#[test]
fn test_breakdown_single_row_has_no_totals() {
    let cats = vec![category(1, "Food", dec!(500))];
    let txns = vec![txn(1, 1, dec!(42), date(2024, 3, 3), "")];
    let rows = breakdown(&group_by_period(&txns, &cats, Granularity::Month));
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].is_total());
    assert_eq!(rows[0].label(), "March 2024");
}

#[test]
fn test_breakdown_subtotals_and_grand_total() {
    let cats = vec![category(1, "Food", dec!(500)), category(2, "Rent", dec!(1000))];
    let txns = vec![
        txn(1, 1, dec!(30), date(2024, 1, 5), ""),
        txn(2, 2, dec!(900), date(2024, 1, 1), ""),
        txn(3, 1, dec!(20), date(2024, 1, 9), ""),
        txn(4, 1, dec!(15), date(2024, 2, 2), ""),
    ];
    let rows = breakdown(&group_by_period(&txns, &cats, Granularity::Month));
    assert_eq!(
        rows,
        vec![
            BreakdownRow::Entry {
                period: "January 2024".into(),
                category: "Food".into(),
                amount: dec!(50),
                count: 2,
            },
            BreakdownRow::Entry {
                period: "January 2024".into(),
                category: "Rent".into(),
                amount: dec!(900),
                count: 1,
            },
            BreakdownRow::Subtotal {
                period: "January 2024".into(),
                amount: dec!(950),
            },
            BreakdownRow::Entry {
                period: "February 2024".into(),
                category: "Food".into(),
                amount: dec!(15),
                count: 1,
            },
            BreakdownRow::GrandTotal {
                period_count: 2,
                unit: "months".into(),
                amount: dec!(965),
            },
        ]
    );
    assert_eq!(rows[2].label(), "January 2024 Total");
    assert_eq!(rows[4].label(), "Grand Total (2 months)");
}

#[test]
fn test_grand_total_unit_is_singular_for_one_period() {
    let cats = vec![category(1, "Food", dec!(500)), category(2, "Rent", dec!(1000))];
    let txns = vec![
        txn(1, 1, dec!(5), date(2024, 6, 1), ""),
        txn(2, 2, dec!(7), date(2024, 6, 1), ""),
    ];
    let rows = breakdown(&group_by_period(&txns, &cats, Granularity::Year));
    assert_eq!(rows.last().unwrap().label(), "Grand Total (1 year)");
    assert_eq!(rows.last().unwrap().amount(), Some(dec!(12)));
}

// ── Budgets and notes ─────────────────────────────────────────

#[test]
fn test_budget_levels() {
    let cats = vec![
        category(1, "Food", dec!(100)),
        category(2, "Rent", dec!(100)),
        category(3, "Fun", dec!(100)),
        category(4, "Travel", dec!(100)),
    ];
    let txns = vec![
        txn(1, 1, dec!(70), date(2024, 1, 1), ""),
        txn(2, 2, dec!(71), date(2024, 1, 1), ""),
        txn(3, 3, dec!(91), date(2024, 1, 1), ""),
        txn(4, 4, dec!(150), date(2024, 1, 1), ""),
    ];
    let status = budget_status(&cats, &txns);
    let levels: Vec<BudgetLevel> = status.iter().map(|s| s.level).collect();
    assert_eq!(
        levels,
        vec![
            BudgetLevel::Healthy,
            BudgetLevel::Warning,
            BudgetLevel::Critical,
            BudgetLevel::Critical
        ]
    );
    assert_eq!(status[3].percent, dec!(100));
    assert_eq!(status[3].remaining, dec!(-50));
    assert!((status[0].ratio() - 0.7).abs() < 1e-9);
}

#[test]
fn test_budget_status_zero_budget() {
    let cats = vec![category(1, "Imported", Decimal::ZERO)];
    let txns = vec![txn(1, 1, dec!(12), date(2024, 1, 1), "")];
    let status = budget_status(&cats, &txns);
    assert_eq!(status[0].percent, Decimal::ZERO);
    assert_eq!(status[0].spent, dec!(12));
}

#[test]
fn test_budget_status_extreme_values_cap_at_full() {
    let cats = vec![
        category(1, "Tiny", Decimal::new(1, 28)),
        category(2, "Huge", Decimal::MAX),
    ];
    let txns = vec![
        txn(1, 1, Decimal::MAX, date(2024, 1, 1), ""),
        txn(2, 1, Decimal::MAX, date(2024, 1, 2), ""),
        txn(3, 2, Decimal::MAX, date(2024, 1, 3), ""),
    ];
    let status = budget_status(&cats, &txns);
    assert_eq!(status[0].spent, Decimal::MAX);
    assert_eq!(status[0].percent, dec!(100));
    assert_eq!(status[0].level, BudgetLevel::Critical);
    assert_eq!(status[1].percent, dec!(100));
    assert_eq!(status[1].remaining, Decimal::ZERO);
    assert_eq!(total_budget(&cats), Decimal::MAX);

    let agg = group_by_period(&txns, &cats, Granularity::Year);
    let summary = summarize(&agg);
    assert_eq!(summary.total, Decimal::MAX);
    assert!(breakdown(&agg).iter().any(|row| row.amount() == Some(Decimal::MAX)));
}

#[test]
fn test_budget_status_ignores_orphans() {
    let cats = vec![category(1, "Food", dec!(100))];
    let txns = vec![txn(1, 9, dec!(12), date(2024, 1, 1), "")];
    let status = budget_status(&cats, &txns);
    assert_eq!(status.len(), 1);
    assert_eq!(status[0].spent, Decimal::ZERO);
}

#[test]
fn test_total_budget() {
    let cats = vec![category(1, "Food", dec!(100.50)), category(2, "Rent", dec!(900))];
    assert_eq!(total_budget(&cats), dec!(1000.50));
    assert_eq!(total_budget(&[]), Decimal::ZERO);
}

#[test]
fn test_recent_notes() {
    let mut txns: Vec<Transaction> = (1..=12)
        .map(|i| txn(i, 1, dec!(1), date(2024, 1, i as u32), "note"))
        .collect();
    txns.push(txn(13, 1, dec!(1), date(2024, 2, 1), "   "));
    let notes = recent_notes(&txns, 10);
    assert_eq!(notes.len(), 10);
    assert_eq!(notes[0].id, TransactionId(12));
    assert_eq!(notes[9].id, TransactionId(3));
}
