use anyhow::Result;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::path::Path;

use crate::config::AppConfig;
use crate::error::ValidationError;
use crate::models::{
    parse_amount, parse_date, sum_amounts, Category, CategoryDraft, TransactionDraft, TransactionId,
};
use crate::query::{
    filter_transactions, group_by_period, CategoryFilter, Granularity, NoteQuery, Timeframe,
    TransactionFilter,
};
use crate::store::AppState;
use crate::summary::{breakdown, summarize, BreakdownRow};
use crate::transfer::{commit_import, read_import, write_export, ExportFormat, ImportMode};
use crate::ui::util::{format_amount, truncate};

/// Flags that take a value; everything else starting with `--` is a switch.
const VALUE_FLAGS: &[&str] = &[
    "--group",
    "--timeframe",
    "--from",
    "--to",
    "--category",
    "--note",
    "--date",
    "--amount",
    "--mode",
];

const BAR_WIDTH: usize = 30;

pub(crate) fn as_cli(args: &[String], state: &mut AppState, config: &AppConfig) -> Result<()> {
    for warning in state.load_warnings() {
        eprintln!("Warning: {warning}");
    }
    match args[1].as_str() {
        "summary" | "s" => cli_summary(&args[2..], state, config),
        "list" | "ls" => cli_list(&args[2..], state, config),
        "categories" | "c" => cli_categories(state),
        "notes" => cli_notes(state),
        "add-category" => cli_add_category(&args[2..], state),
        "delete-category" => cli_delete_category(&args[2..], state),
        "add" => cli_add(&args[2..], state),
        "edit" => cli_edit(&args[2..], state),
        "delete" => cli_delete(&args[2..], state),
        "export" => cli_export(&args[2..], state),
        "import" => cli_import(&args[2..], state),
        "backup" => cli_backup(&args[2..], state),
        "clear" => cli_clear(&args[2..], state),
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        "--version" | "-V" | "version" => {
            println!("spendlens {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("SpendLens - local-only spending tracker");
    println!();
    println!("Usage: spendlens [command]");
    println!();
    println!("Commands:");
    println!("  (none)                          Launch interactive TUI");
    println!("  summary                         Spending trends: totals, average, breakdown");
    println!("    --group <day|week|month|year> Period size (default from config)");
    println!("    --timeframe <7days|30days|3months|6months|1year|all|custom>");
    println!("    --from/--to <YYYY-MM-DD>      Custom range (implies --timeframe custom)");
    println!("    --category <name|id>          Only this category");
    println!("    --note <text>                 Notes containing text");
    println!("  list [--category ..] [--note ..] List transactions, newest first");
    println!("  categories                      Budget status per category");
    println!("  notes                           Most recent notes");
    println!("  add-category <name> <budget>    Create a category");
    println!("  delete-category <name|id>       Delete a category and its transactions");
    println!("  add <category> <amount>         Record a transaction");
    println!("    --date <YYYY-MM-DD>           Date (default: today)");
    println!("    --note <text>                 Note");
    println!("  edit <id> [--category ..] [--amount ..] [--date ..] [--note ..]");
    println!("  delete <id>                     Delete a transaction");
    println!("  export <json|csv|report|sheet> [path]");
    println!("  import <file> [--mode replace|merge] [--dry-run]");
    println!("  backup [path]                   Store a backup, optionally write it to path");
    println!("  clear --yes                     Back up, then delete all data");
    println!("  --help, -h                      Show this help");
    println!("  --version, -V                   Show version");
}

// ── Argument helpers ─────────────────────────────────────────

fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn has_switch(args: &[String], name: &str) -> bool {
    args.iter().any(|a| a == name)
}

/// Arguments that are neither flags nor flag values.
fn positionals(args: &[String]) -> Vec<&str> {
    let mut out = Vec::new();
    let mut skip_value = false;
    for arg in args {
        if skip_value {
            skip_value = false;
        } else if VALUE_FLAGS.contains(&arg.as_str()) {
            skip_value = true;
        } else if !arg.starts_with("--") {
            out.push(arg.as_str());
        }
    }
    out
}

fn category_filter(categories: &[Category], reference: Option<&str>) -> Result<CategoryFilter> {
    match reference {
        None => Ok(CategoryFilter::All),
        Some(r) if r.eq_ignore_ascii_case("all") => Ok(CategoryFilter::All),
        Some(r) => Category::resolve(categories, r)
            .map(|c| CategoryFilter::Only(c.id))
            .ok_or_else(|| ValidationError::UnknownCategory(r.to_string()).into()),
    }
}

/// Build the trends filter from flags, falling back to the configured defaults.
/// `--from`/`--to` without `--timeframe` select the custom range.
fn trends_filter(
    args: &[String],
    categories: &[Category],
    config: &AppConfig,
) -> Result<(TransactionFilter, Granularity)> {
    let granularity = match flag(args, "--group") {
        Some(g) => g.parse()?,
        None => config.granularity(),
    };
    let custom_start = flag(args, "--from").map(parse_date).transpose()?;
    let custom_end = flag(args, "--to").map(parse_date).transpose()?;
    let timeframe = match flag(args, "--timeframe") {
        Some(t) => t.parse()?,
        None if custom_start.is_some() || custom_end.is_some() => Timeframe::Custom,
        None => config.timeframe(),
    };
    let filter = TransactionFilter {
        category: category_filter(categories, flag(args, "--category"))?,
        note: NoteQuery::new(flag(args, "--note").unwrap_or(""), config.note_search_min_chars),
        timeframe,
        custom_start,
        custom_end,
    };
    filter.validate()?;
    Ok((filter, granularity))
}

fn bar(value: Decimal, max: Decimal, width: usize) -> String {
    if max <= Decimal::ZERO {
        return String::new();
    }
    let ratio = value
        .checked_div(max)
        .and_then(|r| r.to_f64())
        .unwrap_or(1.0)
        .clamp(0.0, 1.0);
    let filled = (ratio * width as f64).round() as usize;
    "█".repeat(filled.max(usize::from(value > Decimal::ZERO)))
}

// ── Commands ─────────────────────────────────────────────────

fn cli_summary(args: &[String], state: &mut AppState, config: &AppConfig) -> Result<()> {
    let (filter, granularity) = trends_filter(args, state.categories(), config)?;
    let filtered = filter_transactions(state.transactions(), &filter, state.today())?;
    let aggregation = group_by_period(filtered, state.categories(), granularity);
    let summary = summarize(&aggregation);

    let window = match filter.custom_range() {
        Ok(range) if filter.timeframe == Timeframe::Custom => {
            format!("{} to {}", range.start(), range.end())
        }
        _ => filter.timeframe.describe().to_string(),
    };
    println!("SpendLens: {window}, by {granularity}");
    println!("{}", "─".repeat(48));
    println!("  Total:              {}", format_amount(summary.total));
    println!(
        "  Average per {:<7} {}",
        format!("{}:", granularity.as_str()),
        format_amount(summary.average)
    );
    println!(
        "  Highest {:<11} {}",
        format!("{}:", granularity.as_str()),
        format_amount(summary.highest)
    );
    println!("  Periods:            {}", summary.period_count);
    println!("  Transactions:       {}", summary.transaction_count);

    if !aggregation.is_empty() {
        println!();
        for (label, total) in aggregation.labels().iter().zip(aggregation.period_totals()) {
            println!(
                "  {label:<22} {:>14}  {}",
                format_amount(total),
                bar(total, summary.highest, BAR_WIDTH)
            );
        }

        println!();
        println!("  By category");
        for series in aggregation.series() {
            let spent = sum_amounts(series.values.iter().copied());
            let active = series.values.iter().filter(|v| !v.is_zero()).count();
            println!(
                "  {:<22} {:>14}  {active} {}",
                truncate(&series.name, 22),
                format_amount(spent),
                granularity.unit(active)
            );
        }
    }

    println!();
    println!("{:<24} {:<20} {:>14} {:>6}", "Period", "Category", "Amount", "Count");
    println!("{}", "─".repeat(67));
    for row in breakdown(&aggregation) {
        match &row {
            BreakdownRow::Entry {
                period,
                category,
                amount,
                count,
            } => println!(
                "{:<24} {:<20} {:>14} {count:>6}",
                truncate(period, 24),
                truncate(category, 20),
                format_amount(*amount)
            ),
            BreakdownRow::Subtotal { amount, .. } | BreakdownRow::GrandTotal { amount, .. } => {
                println!("{:<45} {:>14}", truncate(&row.label(), 45), format_amount(*amount))
            }
            BreakdownRow::Placeholder(text) => println!("{text}"),
        }
    }
    Ok(())
}

fn cli_list(args: &[String], state: &mut AppState, config: &AppConfig) -> Result<()> {
    let category = category_filter(state.categories(), flag(args, "--category"))?;
    let note = NoteQuery::new(flag(args, "--note").unwrap_or(""), config.note_search_min_chars);
    let listed = state.list_transactions(category, &note);
    if listed.is_empty() {
        println!("No transactions");
        return Ok(());
    }

    println!(
        "{:<15} {:<12} {:<20} {:>12}  Note",
        "ID", "Date", "Category", "Amount"
    );
    println!("{}", "─".repeat(75));
    for txn in &listed {
        println!(
            "{:<15} {:<12} {:<20} {:>12}  {}",
            txn.id,
            txn.date.format("%Y-%m-%d"),
            truncate(state.category_name(txn.category_id), 20),
            format_amount(txn.amount),
            txn.note,
        );
    }
    println!("{} transactions", listed.len());
    Ok(())
}

fn cli_categories(state: &mut AppState) -> Result<()> {
    let statuses = state.budget_status();
    if statuses.is_empty() {
        println!("No categories");
        return Ok(());
    }

    println!(
        "{:<15} {:<20} {:>12} {:>12} {:>12} {:>6}",
        "ID", "Name", "Budget", "Spent", "Remaining", "Used"
    );
    println!("{}", "─".repeat(82));
    for status in &statuses {
        println!(
            "{:<15} {:<20} {:>12} {:>12} {:>12} {:>5}%",
            status.category_id,
            truncate(&status.name, 20),
            format_amount(status.budget),
            format_amount(status.spent),
            format_amount(status.remaining),
            status.percent.round(),
        );
    }
    println!();
    println!("Total budget: {}", format_amount(state.total_budget()));
    Ok(())
}

fn cli_notes(state: &mut AppState) -> Result<()> {
    let notes = state.recent_notes(10);
    if notes.is_empty() {
        println!("No notes");
        return Ok(());
    }
    for txn in notes {
        println!(
            "{}  {:<20} {:>12}  {}",
            txn.date.format("%Y-%m-%d"),
            truncate(state.category_name(txn.category_id), 20),
            format_amount(txn.amount),
            txn.note
        );
    }
    Ok(())
}

fn cli_add_category(args: &[String], state: &mut AppState) -> Result<()> {
    let [name, budget] = positionals(args)[..] else {
        anyhow::bail!("Usage: spendlens add-category <name> <budget>");
    };
    let draft = CategoryDraft::parse(name, budget)?;
    let id = state.add_category(draft)?;
    println!("Added category '{}' ({id})", name.trim());
    Ok(())
}

fn cli_delete_category(args: &[String], state: &mut AppState) -> Result<()> {
    let [reference] = positionals(args)[..] else {
        anyhow::bail!("Usage: spendlens delete-category <name|id>");
    };
    let category = Category::resolve(state.categories(), reference)
        .cloned()
        .ok_or_else(|| ValidationError::UnknownCategory(reference.to_string()))?;
    let removed = state.delete_category(category.id)?;
    println!(
        "Deleted category '{}' and {removed} transaction{}",
        category.name,
        if removed == 1 { "" } else { "s" }
    );
    Ok(())
}

fn cli_add(args: &[String], state: &mut AppState) -> Result<()> {
    let [category, amount] = positionals(args)[..] else {
        anyhow::bail!("Usage: spendlens add <category> <amount> [--date YYYY-MM-DD] [--note text]");
    };
    let today = state.today().format("%Y-%m-%d").to_string();
    let draft = TransactionDraft::parse(
        state.categories(),
        category,
        amount,
        flag(args, "--date").unwrap_or(&today),
        flag(args, "--note").unwrap_or(""),
    )?;
    let id = state.add_transaction(draft)?;
    println!("Added transaction {id}");
    Ok(())
}

fn cli_edit(args: &[String], state: &mut AppState) -> Result<()> {
    let [id] = positionals(args)[..] else {
        anyhow::bail!("Usage: spendlens edit <id> [--category ..] [--amount ..] [--date ..] [--note ..]");
    };
    let id: TransactionId = id.parse()?;
    let current = state
        .transaction(id)
        .cloned()
        .ok_or_else(|| ValidationError::UnknownTransaction(id.to_string()))?;

    let category_id = match flag(args, "--category") {
        Some(r) => {
            Category::resolve(state.categories(), r)
                .ok_or_else(|| ValidationError::UnknownCategory(r.to_string()))?
                .id
        }
        None => current.category_id,
    };
    let amount = flag(args, "--amount")
        .map(parse_amount)
        .transpose()?
        .unwrap_or(current.amount);
    let date = flag(args, "--date")
        .map(parse_date)
        .transpose()?
        .unwrap_or(current.date);
    let note = flag(args, "--note").unwrap_or(&current.note);

    let draft = TransactionDraft::new(category_id, amount, date, note)?;
    state.edit_transaction(id, draft)?;
    println!("Updated transaction {id}");
    Ok(())
}

fn cli_delete(args: &[String], state: &mut AppState) -> Result<()> {
    let [id] = positionals(args)[..] else {
        anyhow::bail!("Usage: spendlens delete <id>");
    };
    let removed = state.delete_transaction(id.parse()?)?;
    println!(
        "Deleted transaction {} ({} on {})",
        removed.id,
        format_amount(removed.amount),
        removed.date
    );
    Ok(())
}

fn cli_export(args: &[String], state: &mut AppState) -> Result<()> {
    let positional = positionals(args);
    let Some(format) = positional.first() else {
        anyhow::bail!("Usage: spendlens export <json|csv|report|sheet> [path]");
    };
    let format: ExportFormat = format.parse()?;
    let now = state.now();
    let output_path = positional
        .get(1)
        .map(|p| shellexpand(p))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            format!("{home}/{}", format.default_file_name(now))
        });

    write_export(state.snapshot(), format, now, Path::new(&output_path))?;
    println!(
        "Exported {} categories and {} transactions to {output_path}",
        state.categories().len(),
        state.transactions().len()
    );
    Ok(())
}

fn cli_import(args: &[String], state: &mut AppState) -> Result<()> {
    let Some(file_path) = positionals(args).first().map(|p| shellexpand(p)) else {
        anyhow::bail!("Usage: spendlens import <file> [--mode replace|merge] [--dry-run]");
    };
    let path = Path::new(&file_path);
    if !path.exists() {
        anyhow::bail!("File not found: {file_path}");
    }
    let mode: ImportMode = match flag(args, "--mode") {
        Some(m) => m.parse()?,
        None => ImportMode::default(),
    };

    let data = read_import(path, state.now())?;
    println!("{}", data.preview());

    if has_switch(args, "--dry-run") {
        let outcome = commit_import(&mut state.scratch(), data, mode)?;
        println!();
        println!("Dry run ({}): would import {outcome}", mode.as_str());
        println!("Nothing was written");
        return Ok(());
    }

    let outcome = commit_import(state, data, mode)?;
    println!();
    println!("Imported ({}): {outcome}", mode.as_str());
    Ok(())
}

fn cli_backup(args: &[String], state: &mut AppState) -> Result<()> {
    if let Some(previous) = state.last_backup()? {
        println!("Previous backup: {}", previous.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    let at = state.create_backup()?;
    println!("Backup stored at {}", at.format("%Y-%m-%d %H:%M:%S UTC"));

    if let Some(target) = positionals(args).first().map(|p| shellexpand(p)) {
        state.export_backup(Path::new(&target))?;
        println!("Backup written to {target}");
    }
    Ok(())
}

fn cli_clear(args: &[String], state: &mut AppState) -> Result<()> {
    if !has_switch(args, "--yes") {
        anyhow::bail!("This deletes every category and transaction. Re-run with --yes to confirm");
    }
    let categories = state.categories().len();
    let transactions = state.transactions().len();
    state.clear_all()?;
    println!(
        "Cleared {categories} categories and {transactions} transactions (a backup was stored first)"
    );
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
