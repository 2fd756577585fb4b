use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use super::ImportData;
use crate::error::TransferError;
use crate::models::{
    parse_amount, parse_date, random_color, Category, CategoryId, Transaction, TransactionId,
    MAX_AMOUNT, UNKNOWN_CATEGORY,
};
use crate::store::Snapshot;

const CATEGORIES_SECTION: &str = "CATEGORIES";
const TRANSACTIONS_SECTION: &str = "TRANSACTIONS";
const CATEGORIES_HEADER: &str = "Name,Budget,Color";
const TRANSACTIONS_HEADER: &str = "Date,Category,Amount,Note";

/// Two-section CSV: categories, a blank line, then transactions.
/// Text fields are quoted; numbers are not.
pub(crate) fn export_csv(snapshot: Snapshot<'_>) -> Result<String> {
    let mut categories = section_writer();
    for cat in snapshot.categories {
        categories
            .write_record([
                cat.name.as_str(),
                cat.budget.normalize().to_string().as_str(),
                cat.color.as_str(),
            ])
            .context("Failed to write category row")?;
    }

    let mut transactions = section_writer();
    for txn in snapshot.transactions {
        let name = Category::name_or_unknown(snapshot.categories, txn.category_id);
        transactions
            .write_record([
                txn.date.format("%Y-%m-%d").to_string().as_str(),
                name,
                txn.amount.normalize().to_string().as_str(),
                txn.note.as_str(),
            ])
            .context("Failed to write transaction row")?;
    }

    Ok(format!(
        "{CATEGORIES_SECTION}\n{CATEGORIES_HEADER}\n{}\n{TRANSACTIONS_SECTION}\n{TRANSACTIONS_HEADER}\n{}",
        finish(categories)?,
        finish(transactions)?
    ))
}

fn section_writer() -> csv::Writer<Vec<u8>> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::NonNumeric)
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer.into_inner().context("Failed to flush CSV")?;
    String::from_utf8(bytes).context("CSV output was not UTF-8")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Categories,
    Transactions,
}

/// `Ok(None)` when neither section marker is present.
///
/// The whole text goes through one CSV reader, so quoted fields may span
/// lines. A record holding nothing but a section name starts that section and
/// the record after it is its header. Transactions naming a category that the
/// file does not list get a placeholder category with a zero budget. Ids are
/// assigned from `base_id` upwards, separately for each collection.
pub(crate) fn parse_csv(text: &str, base_id: i64) -> Result<Option<ImportData>, TransferError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());
    let mut current: Option<Section> = None;
    let mut skip_header = false;
    let mut category_rows: Vec<(usize, csv::StringRecord)> = Vec::new();
    let mut transaction_rows: Vec<(usize, csv::StringRecord)> = Vec::new();

    for result in reader.records() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line() as usize);
            row_error(line, &e.to_string())
        })?;
        if let Some(section) = section_marker(&record) {
            current = Some(section);
            skip_header = true;
            continue;
        }
        if record.iter().all(str::is_empty) {
            continue;
        }
        if skip_header {
            skip_header = false;
            continue;
        }
        let line = record.position().map_or(0, |p| p.line() as usize);
        match current {
            Some(Section::Categories) => category_rows.push((line, record)),
            Some(Section::Transactions) => transaction_rows.push((line, record)),
            None => {}
        }
    }

    if current.is_none() {
        return Ok(None);
    }

    let mut categories: Vec<Category> = Vec::new();
    for (line, record) in &category_rows {
        let line = *line;
        let name = record.get(0).unwrap_or_default();
        if name.is_empty() {
            return Err(row_error(line, "category name is empty"));
        }
        let budget = record.get(1).unwrap_or_default();
        let budget = parse_budget(budget).ok_or_else(|| {
            row_error(line, &format!("invalid budget '{budget}'"))
        })?;
        let color = record
            .get(2)
            .filter(|s| !s.is_empty())
            .map_or_else(|| random_color().to_string(), str::to_string);
        categories.push(Category {
            id: CategoryId(base_id + categories.len() as i64),
            name: name.to_string(),
            budget,
            color,
        });
    }

    let mut transactions: Vec<Transaction> = Vec::new();
    for (line, record) in &transaction_rows {
        let line = *line;
        if record.len() < 3 {
            return Err(row_error(line, "expected Date,Category,Amount[,Note]"));
        }
        let date = parse_date(&record[0]).map_err(|e| row_error(line, &e.to_string()))?;
        let amount = parse_amount(&record[2]).map_err(|e| row_error(line, &e.to_string()))?;
        let category_id = find_or_add_category(&mut categories, &record[1], base_id);
        transactions.push(Transaction {
            id: TransactionId(base_id + transactions.len() as i64),
            category_id,
            amount,
            date,
            note: record.get(3).unwrap_or_default().to_string(),
            timestamp: midnight_millis(date),
        });
    }

    Ok(Some(ImportData {
        categories,
        transactions,
    }))
}

fn section_marker(record: &csv::StringRecord) -> Option<Section> {
    if record.len() != 1 {
        return None;
    }
    match record.get(0)? {
        CATEGORIES_SECTION => Some(Section::Categories),
        TRANSACTIONS_SECTION => Some(Section::Transactions),
        _ => None,
    }
}

fn find_or_add_category(categories: &mut Vec<Category>, name: &str, base_id: i64) -> CategoryId {
    let name = if name.is_empty() { UNKNOWN_CATEGORY } else { name };
    if let Some(existing) = categories.iter().find(|c| c.name == name) {
        return existing.id;
    }
    let id = CategoryId(base_id + categories.len() as i64);
    categories.push(Category {
        id,
        name: name.to_string(),
        budget: Decimal::ZERO,
        color: random_color().to_string(),
    });
    id
}

/// Budgets in files may be zero (placeholder categories round-trip that way).
fn parse_budget(s: &str) -> Option<Decimal> {
    Decimal::from_str(&s.replace(['$', ','], ""))
        .ok()
        .filter(|b| *b >= Decimal::ZERO && *b <= MAX_AMOUNT)
}

fn midnight_millis(date: NaiveDate) -> i64 {
    date.and_time(chrono::NaiveTime::default())
        .and_utc()
        .timestamp_millis()
}

fn row_error(line: usize, reason: &str) -> TransferError {
    TransferError::Row {
        line,
        reason: reason.to_string(),
    }
}
