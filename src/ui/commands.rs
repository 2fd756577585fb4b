use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use super::app::{App, InputMode, PendingAction, Screen};
use crate::models::{parse_amount, parse_date, Category, CategoryDraft, TransactionDraft};
use crate::query::{CategoryFilter, Granularity, NoteQuery, Timeframe};
use crate::store::AppState;
use crate::transfer::{write_export, ExportFormat, ImportMode};

pub(crate) struct Command {
    pub(crate) description: &'static str,
    pub(crate) run: fn(&str, &mut App, &mut AppState) -> anyhow::Result<()>,
}

macro_rules! register_command {
    ($name:expr, $desc:expr, $func:expr, $registry:expr) => {{
        $registry.insert(
            $name,
            Command {
                description: $desc,
                run: $func,
            },
        );
    }};
}

pub(crate) static COMMANDS: LazyLock<HashMap<&str, Command>> = LazyLock::new(|| {
    let mut r: HashMap<&str, Command> = HashMap::new();

    register_command!("q", "Quit SpendLens", cmd_quit, r);
    register_command!("quit", "Quit SpendLens", cmd_quit, r);
    register_command!("tr", "Go to Trends", cmd_trends, r);
    register_command!("trends", "Go to Trends", cmd_trends, r);
    register_command!("t", "Go to Transactions", cmd_transactions, r);
    register_command!("transactions", "Go to Transactions", cmd_transactions, r);
    register_command!("c", "Go to Categories", cmd_categories, r);
    register_command!("categories", "Go to Categories", cmd_categories, r);
    register_command!("x", "Go to Transfer", cmd_transfer, r);
    register_command!("transfer", "Go to Transfer", cmd_transfer, r);
    register_command!("help", "Show available commands", cmd_help, r);
    register_command!("h", "Show available commands", cmd_help, r);
    register_command!(
        "group",
        "Group trends by period (e.g. :group week)",
        cmd_group,
        r
    );
    register_command!(
        "timeframe",
        "Trends window (e.g. :timeframe 3months, :timeframe all)",
        cmd_timeframe,
        r
    );
    register_command!("tf", "Trends window (e.g. :tf 7days)", cmd_timeframe, r);
    register_command!(
        "range",
        "Custom date range (e.g. :range 2024-01-01 2024-03-31)",
        cmd_range,
        r
    );
    register_command!(
        "filter",
        "Filter by category (e.g. :filter Food, :filter all)",
        cmd_filter_category,
        r
    );
    register_command!(
        "note",
        "Filter by note text (e.g. :note coffee, :note to clear)",
        cmd_note,
        r
    );
    register_command!(
        "clear-filters",
        "Reset category, note and custom range filters",
        cmd_clear_filters,
        r
    );
    register_command!(
        "category",
        "Create category (e.g. :category Food & Dining 500)",
        cmd_add_category,
        r
    );
    register_command!(
        "delete-category",
        "Delete a category and its transactions",
        cmd_delete_category,
        r
    );
    register_command!(
        "add",
        "Add transaction (e.g. :add Food 12.50 2024-01-15 lunch)",
        cmd_add,
        r
    );
    register_command!("a", "Add transaction (e.g. :a Food 4.50)", cmd_add, r);
    register_command!(
        "amount",
        "Change amount of selected transaction",
        cmd_amount,
        r
    );
    register_command!("date", "Change date of selected transaction", cmd_date, r);
    register_command!(
        "recat",
        "Re-categorize selected transaction",
        cmd_recat,
        r
    );
    register_command!(
        "delete-txn",
        "Delete selected transaction",
        cmd_delete_txn,
        r
    );
    register_command!(
        "export",
        "Export data (e.g. :export csv ~/budget.csv)",
        cmd_export,
        r
    );
    register_command!(
        "import",
        "Preview an import file (e.g. :import ~/budget.json)",
        cmd_import,
        r
    );
    register_command!(
        "mode",
        "Import mode: replace or merge",
        cmd_import_mode,
        r
    );
    register_command!(
        "backup",
        "Store a backup (e.g. :backup ~/backup.json)",
        cmd_backup,
        r
    );
    register_command!(
        "clear-all",
        "Back up, then delete all data",
        cmd_clear_all,
        r
    );

    r
});

/// Run a `:` command. Failures are reported in the status bar rather than
/// ending the session.
pub(crate) fn handle_command(input: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    let trimmed = input.trim();
    let mut parts = trimmed.splitn(2, ' ');
    let cmd_name = parts.next().unwrap_or("");
    let args = parts.next().unwrap_or("").trim();

    if let Some(cmd) = COMMANDS.get(cmd_name) {
        if let Err(e) = (cmd.run)(args, app, state) {
            tracing::warn!(command = cmd_name, error = %e, "command failed");
            app.set_status(format!("Error: {e}"));
        }
    } else {
        let suggestion = find_closest(cmd_name);
        app.set_status(format!(
            "Unknown command: :{cmd_name}. Did you mean :{suggestion}?"
        ));
    }

    Ok(())
}

fn find_closest(input: &str) -> String {
    COMMANDS
        .keys()
        .filter(|k| k.len() > 1) // skip single-letter aliases for suggestions
        .min_by_key(|k| levenshtein(input, k))
        .unwrap_or(&"help")
        .to_string()
}

fn levenshtein(a: &str, b: &str) -> usize {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Split a leading category reference off `args`. The longest category name
/// that prefixes the input wins, so multi-word names need no quoting; failing
/// that, the first word is tried as a name or id.
pub(crate) fn split_category<'a, 'c>(
    categories: &'c [Category],
    args: &'a str,
) -> Option<(&'c Category, &'a str)> {
    let mut by_length: Vec<&Category> = categories.iter().collect();
    by_length.sort_by_key(|c| std::cmp::Reverse(c.name.len()));
    for cat in by_length {
        let (Some(head), Some(rest)) = (args.get(..cat.name.len()), args.get(cat.name.len()..))
        else {
            continue;
        };
        if head.to_lowercase() == cat.name.to_lowercase() && (rest.is_empty() || rest.starts_with(' ')) {
            return Some((cat, rest.trim_start()));
        }
    }

    let (first, rest) = args.split_once(' ').unwrap_or((args, ""));
    Category::resolve(categories, first).map(|cat| (cat, rest.trim_start()))
}

// ── Command implementations ──────────────────────────────────

fn cmd_quit(_args: &str, app: &mut App, _state: &mut AppState) -> anyhow::Result<()> {
    app.running = false;
    Ok(())
}

fn cmd_trends(_args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    app.screen = Screen::Trends;
    app.refresh_trends(state)?;
    Ok(())
}

fn cmd_transactions(_args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    app.screen = Screen::Transactions;
    app.refresh_transactions(state)?;
    Ok(())
}

fn cmd_categories(_args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    app.screen = Screen::Categories;
    app.refresh_categories(state)?;
    Ok(())
}

fn cmd_transfer(_args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    app.screen = Screen::Transfer;
    app.refresh_transfer(state)?;
    Ok(())
}

fn cmd_help(_args: &str, app: &mut App, _state: &mut AppState) -> anyhow::Result<()> {
    app.show_help = true;
    Ok(())
}

fn cmd_group(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    if args.is_empty() {
        let names: Vec<&str> = Granularity::all().iter().map(|g| g.as_str()).collect();
        app.set_status(format!("Usage: :group <{}>", names.join("|")));
        return Ok(());
    }
    app.granularity = args.parse()?;
    app.refresh_trends(state)?;
    app.set_status(format!("Grouping by {}", app.granularity));
    Ok(())
}

fn cmd_timeframe(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    if args.is_empty() {
        let names: Vec<&str> = Timeframe::all().iter().map(|t| t.as_str()).collect();
        app.set_status(format!("Usage: :timeframe <{}>", names.join("|")));
        return Ok(());
    }
    let timeframe: Timeframe = args.parse()?;
    if timeframe == Timeframe::Custom {
        // Switching to custom is only useful with both bounds present.
        let mut candidate = app.filter.clone();
        candidate.timeframe = Timeframe::Custom;
        candidate.validate()?;
    }
    app.filter.timeframe = timeframe;
    app.refresh_trends(state)?;
    app.set_status(format!("Timeframe: {}", app.filter_summary()));
    Ok(())
}

fn cmd_range(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    let mut parts = args.split_whitespace();
    let (Some(start), Some(end)) = (parts.next(), parts.next()) else {
        app.set_status("Usage: :range <YYYY-MM-DD> <YYYY-MM-DD>");
        return Ok(());
    };
    let mut candidate = app.filter.clone();
    candidate.timeframe = Timeframe::Custom;
    candidate.custom_start = Some(parse_date(start)?);
    candidate.custom_end = Some(parse_date(end)?);
    // Rejected ranges leave the current view untouched.
    candidate.validate()?;
    app.filter = candidate;
    app.refresh_trends(state)?;
    app.set_status(format!("Range: {}", app.filter_summary()));
    Ok(())
}

fn cmd_filter_category(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    if args.is_empty() || args.eq_ignore_ascii_case("all") {
        app.filter.category = CategoryFilter::All;
        app.set_status("Showing all categories");
    } else {
        let Some(cat) = Category::resolve(state.categories(), args) else {
            app.set_status(format!("Category '{args}' not found"));
            return Ok(());
        };
        app.filter.category = CategoryFilter::Only(cat.id);
        app.set_status(format!("Filtering by {}", cat.name));
    }
    app.transaction_cursor.first();
    app.refresh_trends(state)?;
    app.refresh_transactions(state)?;
    Ok(())
}

fn cmd_note(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    app.filter.note = NoteQuery::new(args, app.note_min_chars);
    app.refresh_trends(state)?;
    app.refresh_transactions(state)?;
    if args.is_empty() {
        app.set_status("Note filter cleared");
    } else if !app.filter.note.is_active() {
        app.set_status(format!(
            "Note filter needs at least {} characters",
            app.note_min_chars
        ));
    } else {
        app.set_status(format!("Notes containing \"{}\"", app.filter.note.text()));
    }
    Ok(())
}

fn cmd_clear_filters(_args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    app.filter.category = CategoryFilter::All;
    app.filter.note = NoteQuery::default();
    app.filter.custom_start = None;
    app.filter.custom_end = None;
    if app.filter.timeframe == Timeframe::Custom {
        app.filter.timeframe = Timeframe::default();
    }
    app.search_input.clear();
    app.refresh_trends(state)?;
    app.refresh_transactions(state)?;
    app.set_status("Filters cleared");
    Ok(())
}

fn cmd_add_category(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    let Some((name, budget)) = args.rsplit_once(' ') else {
        app.set_status("Usage: :category <name> <budget>");
        return Ok(());
    };
    let draft = CategoryDraft::parse(name, budget)?;
    let name = draft.name.clone();
    state.add_category(draft)?;
    app.refresh_all(state)?;
    app.set_status(format!("Created category: {name}"));
    Ok(())
}

fn cmd_delete_category(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    let category = if args.is_empty() {
        if app.screen != Screen::Categories {
            app.set_status("Usage: :delete-category <name|id>, or select one on Categories");
            return Ok(());
        }
        app.selected_category().cloned()
    } else {
        Category::resolve(state.categories(), args).cloned()
    };
    let Some(category) = category else {
        app.set_status(format!("Category '{args}' not found"));
        return Ok(());
    };

    let transactions = state
        .transactions()
        .iter()
        .filter(|t| t.category_id == category.id)
        .count();
    app.confirm_message = format!(
        "Delete '{}' and its {transactions} transaction{}?",
        category.name,
        if transactions == 1 { "" } else { "s" }
    );
    app.pending_action = Some(PendingAction::DeleteCategory {
        category,
        transactions,
    });
    app.input_mode = InputMode::Confirm;
    Ok(())
}

fn cmd_add(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :add <category> <amount> [YYYY-MM-DD] [note]");
        return Ok(());
    }
    let Some((category, rest)) = split_category(state.categories(), args) else {
        app.set_status(format!("No category matches '{args}'"));
        return Ok(());
    };
    let category_id = category.id;

    let (amount, rest) = rest.split_once(' ').unwrap_or((rest, ""));
    let amount = parse_amount(amount)?;
    let rest = rest.trim_start();
    let (date, note) = match rest.split_once(' ').unwrap_or((rest, "")) {
        (first, note) if parse_date(first).is_ok() => (parse_date(first)?, note),
        _ => (state.today(), rest),
    };

    let draft = TransactionDraft::new(category_id, amount, date, note)?;
    state.add_transaction(draft)?;
    app.refresh_all(state)?;
    app.set_status(format!(
        "Added {} to {} on {date}",
        super::util::format_amount(amount),
        state.category_name(category_id)
    ));
    Ok(())
}

/// Rebuild the selected transaction with one field changed and save it.
fn edit_selected(
    app: &mut App,
    state: &mut AppState,
    change: impl FnOnce(&mut TransactionDraft),
) -> anyhow::Result<bool> {
    if app.screen != Screen::Transactions {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(false);
    }
    let Some(txn) = app.selected_transaction().cloned() else {
        app.set_status("No transaction selected");
        return Ok(false);
    };
    let mut draft = TransactionDraft::new(txn.category_id, txn.amount, txn.date, &txn.note)?;
    change(&mut draft);
    state.edit_transaction(txn.id, draft)?;
    app.refresh_all(state)?;
    Ok(true)
}

pub(crate) fn edit_note(app: &mut App, state: &mut AppState, note: &str) -> anyhow::Result<()> {
    let note = note.trim().to_string();
    if edit_selected(app, state, |d| d.note = note)? {
        app.set_status("Note updated");
    }
    Ok(())
}

fn cmd_amount(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    let amount = parse_amount(args)?;
    if edit_selected(app, state, |d| d.amount = amount)? {
        app.set_status(format!("Amount set to {}", super::util::format_amount(amount)));
    }
    Ok(())
}

fn cmd_date(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    let date = parse_date(args)?;
    if edit_selected(app, state, |d| d.date = date)? {
        app.set_status(format!("Date set to {date}"));
    }
    Ok(())
}

fn cmd_recat(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :recat <category>");
        return Ok(());
    }
    let Some(cat) = Category::resolve(state.categories(), args).cloned() else {
        app.set_status(format!("Category '{args}' not found"));
        return Ok(());
    };
    if edit_selected(app, state, |d| d.category_id = cat.id)? {
        app.set_status(format!("Categorized as: {}", cat.name));
    }
    Ok(())
}

fn cmd_delete_txn(_args: &str, app: &mut App, _state: &mut AppState) -> anyhow::Result<()> {
    if app.screen != Screen::Transactions || app.transactions.is_empty() {
        app.set_status("Navigate to Transactions and select one first");
        return Ok(());
    }

    if let Some(txn) = app.selected_transaction() {
        let label = format!(
            "{} {} ({})",
            txn.date,
            super::util::format_amount(txn.amount),
            app.category_name(txn)
        );
        let id = txn.id;
        app.confirm_message = format!("Delete {label}?");
        app.pending_action = Some(PendingAction::DeleteTransaction { id, label });
        app.input_mode = InputMode::Confirm;
    }

    Ok(())
}

fn cmd_export(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    let (format, path) = args.split_once(' ').unwrap_or((args, ""));
    let format: ExportFormat = if format.is_empty() {
        app.selected_export()
    } else {
        format.parse()?
    };
    let now = state.now();
    let path = if path.trim().is_empty() {
        app.export_dir.join(format.default_file_name(now))
    } else {
        crate::run::shellexpand(path.trim()).into()
    };

    write_export(state.snapshot(), format, now, &path)?;
    app.set_status(format!("Exported {} to {}", format.as_str(), path.display()));
    Ok(())
}

fn cmd_import(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    if args.is_empty() {
        app.set_status("Usage: :import <path>");
        return Ok(());
    }
    let path = crate::run::shellexpand(args);
    app.screen = Screen::Transfer;
    app.clear_import();
    app.load_import(Path::new(&path), state.now())?;
    Ok(())
}

fn cmd_import_mode(args: &str, app: &mut App, _state: &mut AppState) -> anyhow::Result<()> {
    app.import_mode = if args.is_empty() {
        match app.import_mode {
            ImportMode::Merge => ImportMode::Replace,
            ImportMode::Replace => ImportMode::Merge,
        }
    } else {
        args.parse()?
    };
    app.set_status(format!("Import mode: {}", app.import_mode.as_str()));
    Ok(())
}

fn cmd_backup(args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    let at = state.create_backup()?;
    if args.is_empty() {
        app.set_status(format!("Backup stored at {}", at.format("%Y-%m-%d %H:%M UTC")));
    } else {
        let path = crate::run::shellexpand(args);
        state.export_backup(Path::new(&path))?;
        app.set_status(format!("Backup written to {path}"));
    }
    app.refresh_transfer(state)?;
    Ok(())
}

fn cmd_clear_all(_args: &str, app: &mut App, state: &mut AppState) -> anyhow::Result<()> {
    app.confirm_message = format!(
        "Delete all {} categories and {} transactions? A backup is stored first.",
        state.categories().len(),
        state.transactions().len()
    );
    app.pending_action = Some(PendingAction::ClearAll);
    app.input_mode = InputMode::Confirm;
    Ok(())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
