use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt::Write;

use crate::models::{sum_amounts, Category};
use crate::store::Snapshot;
use crate::summary::budget_status;
use crate::ui::util::format_amount;

const REPORT_STYLE: &str = "body { font-family: Arial, sans-serif; padding: 20px; }
h1 { color: #667eea; border-bottom: 2px solid #667eea; padding-bottom: 10px; }
.report-section { margin: 30px 0; }
table { width: 100%; border-collapse: collapse; margin: 10px 0; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #f8f9fa; }
.total-row { font-weight: bold; background-color: #f8f9fa; }
.over { color: red; }
.under { color: green; }
.footer { margin-top: 50px; text-align: center; color: #666; font-size: 0.9em; }";

const SHEET_STYLE: &str = "body { font-family: Arial, sans-serif; }
table { border-collapse: collapse; width: 100%; margin: 20px 0; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; }
th { background-color: #667eea; color: white; }";

/// Escape text for HTML element content and attribute values.
pub(crate) fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn page(title: &str, style: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>\n{style}\n</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

/// Printable summary: totals, then budget/spent/remaining per category.
pub(crate) fn export_report(snapshot: Snapshot<'_>, now: DateTime<Utc>) -> String {
    let total_spent = sum_amounts(snapshot.transactions.iter().map(|t| t.amount));
    let mut body = String::new();

    let _ = writeln!(body, "<h1>Budget Tracker Report</h1>");
    let _ = writeln!(body, "<p>Generated: {}</p>", now.format("%Y-%m-%d %H:%M UTC"));

    let _ = writeln!(body, "<div class=\"report-section\">\n<h2>Budget Summary</h2>\n<table>");
    let _ = writeln!(
        body,
        "<tr><th>Total Categories</th><td>{}</td></tr>",
        snapshot.categories.len()
    );
    let _ = writeln!(
        body,
        "<tr><th>Total Transactions</th><td>{}</td></tr>",
        snapshot.transactions.len()
    );
    let _ = writeln!(
        body,
        "<tr class=\"total-row\"><th>Total Spent</th><td>{}</td></tr>",
        format_amount(total_spent)
    );
    let _ = writeln!(body, "</table>\n</div>");

    let _ = writeln!(body, "<div class=\"report-section\">\n<h2>Categories</h2>\n<table>");
    let _ = writeln!(
        body,
        "<thead><tr><th>Category</th><th>Budget</th><th>Spent</th><th>Remaining</th></tr></thead>\n<tbody>"
    );
    for status in budget_status(snapshot.categories, snapshot.transactions) {
        let class = if status.remaining >= Decimal::ZERO {
            "under"
        } else {
            "over"
        };
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{class}\">{}</td></tr>",
            escape_html(&status.name),
            format_amount(status.budget),
            format_amount(status.spent),
            format_amount(status.remaining)
        );
    }
    let _ = writeln!(body, "</tbody>\n</table>\n</div>");
    let _ = writeln!(
        body,
        "<div class=\"footer\"><p>Report generated by Budget Tracker App</p></div>"
    );

    page("Budget Report", REPORT_STYLE, &body)
}

/// Both collections as HTML tables, which spreadsheet programs open directly.
pub(crate) fn export_spreadsheet(snapshot: Snapshot<'_>, now: DateTime<Utc>) -> String {
    let mut body = String::new();
    let _ = writeln!(body, "<h1>Budget Tracker Export</h1>");
    let _ = writeln!(body, "<p>Exported: {}</p>", now.format("%Y-%m-%d %H:%M UTC"));

    let _ = writeln!(
        body,
        "<h2>Categories</h2>\n<table>\n<thead><tr><th>Name</th><th>Budget</th><th>Color</th></tr></thead>\n<tbody>"
    );
    for cat in snapshot.categories {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&cat.name),
            format_amount(cat.budget),
            escape_html(&cat.color)
        );
    }
    let _ = writeln!(body, "</tbody>\n</table>");

    let _ = writeln!(
        body,
        "<h2>Transactions</h2>\n<table>\n<thead><tr><th>Date</th><th>Category</th><th>Amount</th><th>Note</th></tr></thead>\n<tbody>"
    );
    for txn in snapshot.transactions {
        let _ = writeln!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            txn.date.format("%Y-%m-%d"),
            escape_html(Category::name_or_unknown(snapshot.categories, txn.category_id)),
            format_amount(txn.amount),
            escape_html(&txn.note)
        );
    }
    let _ = writeln!(body, "</tbody>\n</table>");

    page("Budget Data", SHEET_STYLE, &body)
}
