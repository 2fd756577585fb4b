use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use tracing::warn;

use crate::config::AppConfig;
use crate::store::AppState;
use crate::transfer::{commit_import, ExportFormat, ImportMode};
use crate::ui::app::{App, InputMode, PendingAction, Screen};
use crate::ui::commands;
use crate::ui::util::ListCursor;

pub(crate) fn as_tui(state: &mut AppState, config: &AppConfig) -> Result<()> {
    let mut app = App::new(config);
    app.refresh_all(state)?;
    if let Some(warning) = state.load_warnings().first() {
        app.set_status(format!("Warning: {warning}"));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e:?}");
    }

    result
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    state: &mut AppState,
) -> Result<()> {
    while app.running {
        terminal.draw(|f| {
            // header, footer, prompt, borders and table header
            let content_height = f.area().height.saturating_sub(6) as usize;
            app.visible_rows = content_height.max(1);
            crate::ui::render::render(f, app);
        })?;

        if let Event::Key(key) = event::read()? {
            if app.show_help {
                app.show_help = false;
                continue;
            }
            let handled = match app.input_mode {
                InputMode::Normal => handle_normal_input(key, app, state),
                InputMode::Command => handle_command_input(key, app, state),
                InputMode::Search => handle_search_input(key, app, state),
                InputMode::Editing => handle_editing_input(key, app, state),
                InputMode::Confirm => handle_confirm_input(key, app, state),
            };
            if let Err(e) = handled {
                warn!(error = %e, "action failed");
                app.input_mode = InputMode::Normal;
                app.set_status(format!("Error: {e}"));
            }
        }
    }
    Ok(())
}

// ── Input handlers ───────────────────────────────────────────

fn handle_normal_input(key: event::KeyEvent, app: &mut App, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Char(':') => {
            app.input_mode = InputMode::Command;
            app.command_input.clear();
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
            app.search_input.clear();
            if app.screen != Screen::Transactions {
                switch_screen(app, state, Screen::Transactions)?;
            }
        }
        KeyCode::Char('q') | KeyCode::Char('c')
            if key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.running = false;
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_down(app);
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            for _ in 0..app.visible_rows / 2 {
                handle_move_up(app);
            }
        }
        KeyCode::Char('j') | KeyCode::Down => handle_move_down(app),
        KeyCode::Char('k') | KeyCode::Up => handle_move_up(app),
        KeyCode::Char('g') => handle_goto_top(app),
        KeyCode::Char('G') => handle_goto_bottom(app),
        KeyCode::Char(c @ '1'..='4') => {
            let idx = (c as usize) - ('1' as usize);
            if let Some(&screen) = Screen::all().get(idx) {
                switch_screen(app, state, screen)?;
            }
        }
        KeyCode::Tab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let next = (idx + 1) % screens.len();
            switch_screen(app, state, screens[next])?;
        }
        KeyCode::BackTab => {
            let screens = Screen::all();
            let idx = screens.iter().position(|s| *s == app.screen).unwrap_or(0);
            let prev = if idx == 0 { screens.len() - 1 } else { idx - 1 };
            switch_screen(app, state, screens[prev])?;
        }
        KeyCode::Char('?') => {
            app.show_help = true;
        }
        KeyCode::Char('p') if app.screen == Screen::Trends => {
            app.granularity = app.granularity.next();
            app.refresh_trends(state)?;
            app.set_status(format!("Grouping by {}", app.granularity));
        }
        KeyCode::Char('t') if app.screen == Screen::Trends => {
            app.filter.timeframe = app.filter.timeframe.next_relative();
            app.refresh_trends(state)?;
            app.set_status(format!("Timeframe: {}", app.filter.timeframe));
        }
        KeyCode::Char('D') if app.screen == Screen::Transactions => {
            commands::handle_command("delete-txn", app, state)?;
        }
        KeyCode::Char('e') if app.screen == Screen::Transactions => {
            if let Some(txn) = app.selected_transaction() {
                app.command_input = txn.note.clone();
                app.input_mode = InputMode::Editing;
            }
        }
        KeyCode::Char('D') if app.screen == Screen::Categories => {
            commands::handle_command("delete-category", app, state)?;
        }
        KeyCode::Char('m') if app.screen == Screen::Transfer => {
            commands::handle_command("mode", app, state)?;
        }
        KeyCode::Char('b') if app.screen == Screen::Transfer => {
            commands::handle_command("backup", app, state)?;
        }
        KeyCode::Enter => handle_enter(app, state)?,
        KeyCode::Esc => handle_escape(app, state)?,
        _ => {}
    }
    Ok(())
}

fn handle_command_input(key: event::KeyEvent, app: &mut App, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let input = app.command_input.clone();
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
            commands::handle_command(&input, app, state)?;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.command_input.clear();
        }
        KeyCode::Backspace => {
            app.command_input.pop();
            if app.command_input.is_empty() {
                app.input_mode = InputMode::Normal;
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_search_input(key: event::KeyEvent, app: &mut App, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.search_input.clear();
            app.refresh_transactions(state)?;
        }
        KeyCode::Backspace => {
            app.search_input.pop();
            app.transaction_cursor.first();
            app.refresh_transactions(state)?;
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            app.transaction_cursor.first();
            app.refresh_transactions(state)?;
        }
        _ => {}
    }
    Ok(())
}

/// Editing the note of the selected transaction.
fn handle_editing_input(key: event::KeyEvent, app: &mut App, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Enter => {
            let note = std::mem::take(&mut app.command_input);
            app.input_mode = InputMode::Normal;
            commands::edit_note(app, state, &note)?;
        }
        KeyCode::Esc => {
            app.command_input.clear();
            app.input_mode = InputMode::Normal;
            app.set_status("Edit cancelled");
        }
        KeyCode::Backspace => {
            app.command_input.pop();
        }
        KeyCode::Char(c) => {
            app.command_input.push(c);
        }
        _ => {}
    }
    Ok(())
}

fn handle_confirm_input(key: event::KeyEvent, app: &mut App, state: &mut AppState) -> Result<()> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            if let Some(action) = app.pending_action.take() {
                run_pending(action, app, state)?;
            }
        }
        _ => {
            app.pending_action = None;
            app.input_mode = InputMode::Normal;
            app.confirm_message.clear();
            app.set_status("Cancelled");
        }
    }
    Ok(())
}

fn run_pending(action: PendingAction, app: &mut App, state: &mut AppState) -> Result<()> {
    match action {
        PendingAction::DeleteTransaction { id, label } => {
            state.delete_transaction(id)?;
            app.refresh_all(state)?;
            app.set_status(format!("Deleted: {label}"));
        }
        PendingAction::DeleteCategory { category, .. } => {
            let removed = state.delete_category(category.id)?;
            app.refresh_all(state)?;
            app.set_status(format!(
                "Deleted category '{}' and {removed} transaction{}",
                category.name,
                if removed == 1 { "" } else { "s" }
            ));
        }
        PendingAction::ClearAll => {
            state.clear_all()?;
            app.refresh_all(state)?;
            app.set_status("All data cleared. A backup was stored first.");
        }
        PendingAction::ImportCommit => {
            let Some(data) = app.import_data.take() else {
                app.set_status("Nothing to import");
                return Ok(());
            };
            let mode = app.import_mode;
            let outcome = commit_import(state, data, mode)?;
            app.clear_import();
            app.refresh_all(state)?;
            app.set_status(format!("Imported ({}): {outcome}", mode.as_str()));
        }
    }
    Ok(())
}

// ── Navigation helpers ───────────────────────────────────────

fn switch_screen(app: &mut App, state: &mut AppState, screen: Screen) -> Result<()> {
    app.screen = screen;
    match screen {
        Screen::Trends => app.refresh_trends(state)?,
        Screen::Transactions => app.refresh_transactions(state)?,
        Screen::Categories => app.refresh_categories(state)?,
        Screen::Transfer => app.refresh_transfer(state)?,
    }
    app.set_status(format!("{screen}"));
    Ok(())
}

/// The cursor of the list on the current screen, with that list's length.
fn active_list(app: &mut App) -> (&mut ListCursor, usize) {
    match app.screen {
        Screen::Trends => (&mut app.breakdown_cursor, app.breakdown.len()),
        Screen::Transactions => (&mut app.transaction_cursor, app.transactions.len()),
        Screen::Categories => (&mut app.category_cursor, app.categories.len()),
        Screen::Transfer => (&mut app.export_cursor, ExportFormat::all().len()),
    }
}

fn handle_move_down(app: &mut App) {
    let page = app.visible_rows;
    let (cursor, len) = active_list(app);
    cursor.next(len, page);
}

fn handle_move_up(app: &mut App) {
    active_list(app).0.prev();
}

fn handle_goto_top(app: &mut App) {
    active_list(app).0.first();
}

fn handle_goto_bottom(app: &mut App) {
    let page = app.visible_rows;
    let (cursor, len) = active_list(app);
    cursor.last(len, page);
}

fn handle_enter(app: &mut App, state: &mut AppState) -> Result<()> {
    match app.screen {
        Screen::Transfer if app.import_preview.is_some() => {
            let verb = match app.import_mode {
                ImportMode::Replace => "Replace all data with",
                ImportMode::Merge => "Merge",
            };
            if let Some(preview) = &app.import_preview {
                app.confirm_message = format!(
                    "{verb} {} categories and {} transactions?",
                    preview.category_count, preview.transaction_count
                );
            }
            app.pending_action = Some(PendingAction::ImportCommit);
            app.input_mode = InputMode::Confirm;
        }
        Screen::Transfer => commands::handle_command("export", app, state)?,
        Screen::Categories => {
            // Show the selected category's transactions.
            if let Some(cat) = app.selected_category() {
                let command = format!("filter {}", cat.id);
                commands::handle_command(&command, app, state)?;
                switch_screen(app, state, Screen::Transactions)?;
            }
        }
        _ => {}
    }
    Ok(())
}

fn handle_escape(app: &mut App, state: &mut AppState) -> Result<()> {
    match app.screen {
        Screen::Transfer if app.import_preview.is_some() => {
            app.clear_import();
            app.set_status("Import discarded");
        }
        _ => {
            app.status_message.clear();
            if !app.search_input.is_empty() {
                app.search_input.clear();
                app.refresh_transactions(state)?;
            }
        }
    }
    Ok(())
}
