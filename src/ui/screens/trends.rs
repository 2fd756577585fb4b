use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::summary::{BreakdownRow, NO_RESULTS};
use crate::ui::app::App;
use crate::ui::theme;
use crate::ui::util::{format_amount, truncate};

const MIN_BAR_WIDTH: u16 = 5;
const MAX_BAR_WIDTH: u16 = 14;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),      // Summary cards
            Constraint::Percentage(45), // Period chart
            Constraint::Min(6),         // Breakdown table
        ])
        .split(area);

    render_summary_cards(f, chunks[0], app);
    render_period_chart(f, chunks[1], app);
    render_breakdown(f, chunks[2], app);
}

fn render_summary_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let unit = app.granularity.as_str();
    let summary = &app.summary;
    render_card(
        f,
        cards[0],
        "Total Spent",
        format_amount(summary.total),
        theme::RED,
        format!("{} txns", summary.transaction_count),
    );
    render_card(
        f,
        cards[1],
        &format!("Average per {unit}"),
        format_amount(summary.average),
        theme::ACCENT,
        String::new(),
    );
    render_card(
        f,
        cards[2],
        &format!("Highest {unit}"),
        format_amount(summary.highest),
        theme::YELLOW,
        String::new(),
    );
    render_card(
        f,
        cards[3],
        "Periods",
        summary.period_count.to_string(),
        theme::GREEN,
        app.granularity.unit(summary.period_count),
    );
}

fn render_card(
    f: &mut Frame,
    area: Rect,
    title: &str,
    value: String,
    color: ratatui::style::Color,
    subtitle: String,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(format!(" {title} "), theme::title_style()));

    let text = Paragraph::new(vec![
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(subtitle, theme::dim_style())),
    ])
    .centered()
    .block(block);

    f.render_widget(text, area);
}

fn render_period_chart(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(
            format!(" Spending | {} ", app.filter_summary()),
            theme::title_style(),
        ));

    if app.aggregation.is_empty() {
        let msg = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(NO_RESULTS, theme::dim_style())),
            Line::from(Span::styled(
                "Try :timeframe all, :clear-filters or add one with :add",
                theme::dim_style(),
            )),
        ])
        .centered()
        .block(block);
        f.render_widget(msg, area);
        return;
    }

    // Latest periods win when they do not all fit.
    let inner_width = area.width.saturating_sub(2);
    let capacity = usize::from((inner_width / (MIN_BAR_WIDTH + 1)).max(1));
    let labels = app.aggregation.labels();
    let totals = app.aggregation.period_totals();
    let skip = labels.len().saturating_sub(capacity);
    let shown = labels.len() - skip;
    let bar_width = (inner_width / shown.max(1) as u16)
        .saturating_sub(1)
        .clamp(MIN_BAR_WIDTH, MAX_BAR_WIDTH);

    let bars: Vec<Bar> = labels
        .iter()
        .zip(&totals)
        .skip(skip)
        .map(|(label, total)| {
            Bar::default()
                .value(bar_value(*total))
                .text_value(format_amount(*total))
                .label(Line::from(truncate(label, bar_width as usize)))
                .style(Style::default().fg(theme::ACCENT))
                .value_style(
                    Style::default()
                        .fg(theme::HEADER_BG)
                        .bg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                )
        })
        .collect();

    let chart = BarChart::default()
        .block(block)
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(1)
        .bar_style(Style::default().fg(theme::ACCENT));

    f.render_widget(chart, area);
}

/// Bar heights in whole cents so small periods still register.
fn bar_value(amount: Decimal) -> u64 {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|cents| cents.round().to_u64())
        .unwrap_or(u64::MAX)
}

fn render_breakdown(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::OVERLAY))
        .title(Span::styled(" Breakdown ", theme::title_style()));

    if let [BreakdownRow::Placeholder(text)] = app.breakdown.as_slice() {
        let msg = Paragraph::new(Line::from(Span::styled(text.as_str(), theme::dim_style())))
            .centered()
            .block(block);
        f.render_widget(msg, area);
        return;
    }

    let header_cells = ["Period", "Category", "Amount", "Count"]
        .iter()
        .map(|h| Cell::from(*h).style(theme::header_style()));
    let header = Row::new(header_cells).height(1);

    let page = area.height.saturating_sub(3) as usize;
    let rows: Vec<Row> = app
        .breakdown
        .iter()
        .enumerate()
        .skip(app.breakdown_cursor.start(page))
        .take(page)
        .map(|(i, row)| {
            let cells = match row {
                BreakdownRow::Entry {
                    period,
                    category,
                    amount,
                    count,
                } => vec![
                    Cell::from(period.clone()),
                    Cell::from(truncate(category, 24)),
                    Cell::from(Span::styled(format_amount(*amount), theme::amount_style())),
                    Cell::from(count.to_string()),
                ],
                BreakdownRow::Subtotal { amount, .. } | BreakdownRow::GrandTotal { amount, .. } => {
                    vec![
                        Cell::from(row.label()),
                        Cell::from(""),
                        Cell::from(format_amount(*amount)),
                        Cell::from(""),
                    ]
                }
                BreakdownRow::Placeholder(text) => vec![Cell::from(text.clone())],
            };
            let style = if i == app.breakdown_cursor.selected {
                theme::selected_style()
            } else if row.is_total() {
                theme::total_style()
            } else if i % 2 == 1 {
                theme::alt_row_style()
            } else {
                theme::normal_style()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(24),
        Constraint::Length(26),
        Constraint::Length(16),
        Constraint::Length(7),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    f.render_widget(table, area);
}
