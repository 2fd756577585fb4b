use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};

use crate::models::Category;
use crate::query::CategoryFilter;
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    if app.transactions.is_empty() {
        let msg = if !app.search_input.is_empty() {
            vec![
                Line::from(""),
                Line::from(Span::styled(
                    format!("No notes matching '{}'", app.search_input),
                    theme::dim_style(),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    "Press Esc to clear the search",
                    theme::dim_style(),
                )),
            ]
        } else {
            vec![
                Line::from(""),
                Line::from(Span::styled("No transactions", theme::dim_style())),
                Line::from(""),
                Line::from(Span::styled(
                    "Add one with :add <category> <amount> or import a file with :import",
                    theme::dim_style(),
                )),
            ]
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Transactions (0) ", theme::title_style()));
        f.render_widget(Paragraph::new(msg).centered().block(block), area);
        return;
    }

    let header_cells = ["Date", "Category", "Amount", "Note"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let page = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = app
        .transactions
        .iter()
        .enumerate()
        .skip(app.transaction_cursor.start(page))
        .take(page)
        .map(|(i, txn)| {
            let style = if i == app.transaction_cursor.selected {
                theme::selected_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };

            let swatch = app
                .categories
                .iter()
                .find(|c| c.id == txn.category_id)
                .map_or(theme::TEXT_DIM, |c| theme::category_color(&c.color));

            Row::new(vec![
                Cell::from(format!("  {}", txn.date)),
                Cell::from(Line::from(vec![
                    Span::styled("● ", Style::default().fg(swatch)),
                    Span::raw(truncate(app.category_name(txn), 20)),
                ])),
                Cell::from(Span::styled(format_amount(txn.amount), theme::amount_style())),
                Cell::from(truncate(&txn.note, 60)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(14),
        Constraint::Length(24),
        Constraint::Length(14),
        Constraint::Min(20),
    ];

    let mut title = format!(" Transactions ({}) ", app.transactions.len());
    if let CategoryFilter::Only(id) = app.filter.category {
        let name = Category::name_or_unknown(&app.categories, id);
        title.push_str(&format!("in {name} "));
    }
    if !app.search_input.is_empty() {
        title.push_str(&format!("search: '{}' ", app.search_input));
    } else if app.filter.note.is_active() {
        title.push_str(&format!("note: '{}' ", app.filter.note.text()));
    }

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(
                title,
                Style::default()
                    .fg(theme::TEXT_DIM)
                    .add_modifier(Modifier::BOLD),
            )),
    );

    f.render_widget(table, area);
}
