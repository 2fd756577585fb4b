use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use super::app::{App, InputMode, Screen};
use super::commands;
use super::theme;
use super::util::truncate;

type Hint = (&'static str, &'static str);

const TRENDS_HINTS: &[Hint] = &[("p", "group"), ("t", "timeframe"), (":range", "custom"), ("?", "help")];
const TRANSACTIONS_HINTS: &[Hint] = &[("/", "search"), ("e", "note"), ("D", "delete"), ("?", "help")];
const CATEGORIES_HINTS: &[Hint] = &[("Enter", "txns"), ("D", "delete"), (":category", "add"), ("?", "help")];
const EXPORT_HINTS: &[Hint] = &[("Enter", "export"), (":import", "file"), ("b", "backup")];
const PREVIEW_HINTS: &[Hint] = &[("Enter", "import"), ("m", "mode"), ("Esc", "discard")];

/// Keys shown in the help popup, two pairs per row.
const KEY_HELP: &[(Hint, Hint)] = &[
    (("j/k Up/Down", "Move"), ("1-4", "Switch screen")),
    (("Tab/S-Tab", "Cycle screens"), ("g/G", "Top/Bottom")),
    (("Ctrl-d/u", "Half page"), ("Ctrl-q", "Quit")),
    ((":", "Command"), ("/", "Search notes")),
    (("p/t", "Group/Timeframe"), ("e", "Edit note")),
    (("D", "Delete selected"), ("Enter", "Select/Confirm")),
    (("m/b", "Import mode/Backup"), ("Esc", "Cancel")),
];

pub(crate) fn render(f: &mut Frame, app: &App) {
    let [header, body, footer, prompt] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(5),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(f.area());

    render_header(f, header, app);
    match app.screen {
        Screen::Trends => super::screens::trends::render(f, body, app),
        Screen::Transactions => super::screens::transactions::render(f, body, app),
        Screen::Categories => super::screens::categories::render(f, body, app),
        Screen::Transfer => super::screens::transfer::render(f, body, app),
    }
    render_footer(f, footer, app);
    render_prompt(f, prompt, app);

    if app.show_help {
        render_help(f, f.area());
    }
}

/// Screen tabs on the left, the active filters on the right.
fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let summary = format!(" {} ", app.filter_summary());
    let summary_width = (summary.chars().count() as u16).min(area.width / 2);
    let [tabs_area, summary_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(summary_width)]).areas(area);

    let titles: Vec<Line> = Screen::all()
        .iter()
        .zip(1..)
        .map(|(screen, n)| {
            let style = if *screen == app.screen {
                Style::default()
                    .fg(theme::ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                theme::dim_style()
            };
            Line::from(Span::styled(format!("{n} {screen}"), style))
        })
        .collect();
    let tabs = Tabs::new(titles)
        .divider(Span::styled("·", Style::default().fg(theme::OVERLAY)))
        .style(Style::default().bg(theme::HEADER_BG));
    f.render_widget(tabs, tabs_area);

    let summary = Paragraph::new(truncate(&summary, summary_width as usize))
        .style(Style::default().fg(theme::TEXT_DIM).bg(theme::HEADER_BG))
        .right_aligned();
    f.render_widget(summary, summary_area);
}

fn mode_color(mode: InputMode) -> Color {
    match mode {
        InputMode::Normal => theme::ACCENT,
        InputMode::Command | InputMode::Editing => theme::GREEN,
        InputMode::Search => theme::YELLOW,
        InputMode::Confirm => theme::RED,
    }
}

fn hints(app: &App) -> &'static [Hint] {
    match app.screen {
        Screen::Trends => TRENDS_HINTS,
        Screen::Transactions => TRANSACTIONS_HINTS,
        Screen::Categories => CATEGORIES_HINTS,
        Screen::Transfer if app.import_preview.is_some() => PREVIEW_HINTS,
        Screen::Transfer => EXPORT_HINTS,
    }
}

/// Mode badge, record count, then the current screen's key hints.
fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let badge = Style::default()
        .fg(theme::HEADER_BG)
        .bg(mode_color(app.input_mode))
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(format!(" {} ", app.input_mode), badge),
        Span::raw(format!(" {} transactions ", app.transaction_count)),
    ];
    for (key, action) in hints(app) {
        spans.push(Span::styled(format!(" {key}"), Style::default().fg(theme::ACCENT)));
        spans.push(Span::raw(format!(" {action}")));
    }

    f.render_widget(
        Paragraph::new(Line::from(spans)).style(theme::status_bar_style()),
        area,
    );
}

/// Prefix and colour for the modes that take typed input.
fn prompt_prefix(mode: InputMode) -> Option<(&'static str, Color)> {
    match mode {
        InputMode::Command => Some((":", theme::ACCENT)),
        InputMode::Search => Some(("/", theme::YELLOW)),
        InputMode::Editing => Some(("note> ", theme::GREEN)),
        InputMode::Normal | InputMode::Confirm => None,
    }
}

fn render_prompt(f: &mut Frame, area: Rect, app: &App) {
    let line = match (app.input_mode, prompt_prefix(app.input_mode)) {
        (InputMode::Confirm, _) => Line::from(vec![
            Span::styled(&app.confirm_message, Style::default().fg(theme::YELLOW)),
            Span::styled(" [y/N] ", Style::default().fg(theme::RED)),
        ]),
        (mode, Some((prefix, color))) => {
            let typed = if mode == InputMode::Search {
                &app.search_input
            } else {
                &app.command_input
            };
            let mut spans = vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::styled(typed.as_str(), theme::command_bar_style()),
            ];
            if mode == InputMode::Search && !typed.is_empty() {
                spans.push(Span::styled(
                    format!("  ({} matches)", app.transactions.len()),
                    theme::dim_style(),
                ));
            }
            let column = prefix.chars().count() + typed.chars().count();
            f.set_cursor_position((area.x + column as u16, area.y));
            Line::from(spans)
        }
        (_, None) if app.status_message.is_empty() => Line::from(Span::styled(
            " : command   / search   ? help",
            theme::dim_style(),
        )),
        (_, None) => Line::from(Span::styled(&app.status_message, theme::command_bar_style())),
    };

    f.render_widget(
        Paragraph::new(line).style(Style::default().bg(theme::COMMAND_BG)),
        area,
    );
}

fn section(title: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!(" {title}"),
        Style::default()
            .fg(theme::YELLOW)
            .add_modifier(Modifier::BOLD),
    ))
}

fn render_help(f: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            " SpendLens ",
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Keys"),
    ];
    for ((left_key, left), (right_key, right)) in KEY_HELP {
        lines.push(Line::from(vec![
            Span::styled(format!("  {left_key:<12}"), Style::default().fg(theme::ACCENT)),
            Span::styled(format!("{left:<20}"), theme::normal_style()),
            Span::styled(format!("{right_key:<8}"), Style::default().fg(theme::ACCENT)),
            Span::styled(*right, theme::normal_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines.push(section("Commands"));
    // one line per command, under its longest name
    let mut entries: Vec<(&str, &str)> = Vec::new();
    for (&name, cmd) in commands::COMMANDS.iter() {
        match entries.iter_mut().find(|(_, desc)| *desc == cmd.description) {
            Some(entry) if name.len() > entry.0.len() => entry.0 = name,
            Some(_) => {}
            None => entries.push((name, cmd.description)),
        }
    }
    entries.sort_unstable();
    lines.extend(entries.iter().map(|(name, desc)| {
        Line::from(vec![
            Span::styled(format!("  :{name:<18}"), Style::default().fg(theme::ACCENT)),
            Span::styled(*desc, theme::normal_style()),
        ])
    }));

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " any key closes this ",
        theme::dim_style(),
    )));

    let popup = centered(area, 74, lines.len() as u16 + 2);
    f.render_widget(Clear, popup);
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme::ACCENT))
                .style(Style::default().bg(theme::HEADER_BG)),
        ),
        popup,
    );
}

/// A `width` x `height` box in the middle of `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
