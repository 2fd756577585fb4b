use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, spent_of, truncate};

const GAUGE_WIDTH: usize = 20;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    render_budget_status(f, chunks[0], app);
    render_recent_notes(f, chunks[1], app);
}

fn render_budget_status(f: &mut Frame, area: Rect, app: &App) {
    let title = format!(
        " Budgets ({}) | total {} ",
        app.budget_status.len(),
        format_amount(app.total_budget)
    );
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title(Span::styled(title, theme::title_style()));

    if app.budget_status.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("No categories yet", theme::dim_style())),
            Line::from(""),
            Line::from(Span::styled(
                "Use :category <name> <budget> to create one",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    // Two lines per category: name and amounts, then the gauge.
    let per_page = (area.height.saturating_sub(2) as usize / 2).max(1);
    let skip = app.category_cursor.start(per_page);

    let items: Vec<ListItem> = app
        .budget_status
        .iter()
        .enumerate()
        .skip(skip)
        .take(per_page)
        .map(|(i, status)| {
            let color = theme::level_color(status.level);
            let name_style = if i == app.category_cursor.selected {
                theme::selected_style()
            } else {
                Style::default()
                    .fg(theme::category_color(&status.color))
                    .add_modifier(Modifier::BOLD)
            };
            let remaining_style = if status.remaining < rust_decimal::Decimal::ZERO {
                Style::default().fg(theme::RED)
            } else {
                theme::dim_style()
            };

            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{:<22}", truncate(&status.name, 21)), name_style),
                    Span::styled(
                        format!("{} ", spent_of(status.spent, status.budget)),
                        theme::normal_style(),
                    ),
                    Span::styled(
                        format!("({} left)", format_amount(status.remaining)),
                        remaining_style,
                    ),
                ]),
                Line::from(vec![
                    Span::raw("  "),
                    Span::styled(
                        create_progress_bar(status.ratio(), GAUGE_WIDTH),
                        Style::default().fg(color),
                    ),
                    Span::styled(
                        format!(" {}%", status.percent.round()),
                        Style::default().fg(color).add_modifier(Modifier::BOLD),
                    ),
                ]),
            ])
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn render_recent_notes(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" Recent Notes ", theme::title_style()));

    if app.recent_notes.is_empty() {
        let msg = Paragraph::new(Line::from(Span::styled(
            "No notes yet",
            theme::dim_style(),
        )))
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .recent_notes
        .iter()
        .map(|txn| {
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!("{} ", txn.date), theme::dim_style()),
                    Span::styled(
                        truncate(app.category_name(txn), 16),
                        Style::default().fg(theme::ACCENT),
                    ),
                    Span::styled(
                        format!(" {}", format_amount(txn.amount)),
                        theme::amount_style(),
                    ),
                ]),
                Line::from(Span::styled(
                    format!("  {}", truncate(&txn.note, width.saturating_sub(2))),
                    theme::normal_style(),
                )),
            ])
        })
        .collect();

    f.render_widget(List::new(items).block(block), area);
}

fn create_progress_bar(ratio: f64, width: usize) -> String {
    let filled = (ratio.clamp(0.0, 1.0) * width as f64) as usize;
    let empty = width.saturating_sub(filled);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}
