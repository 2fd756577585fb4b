use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use crate::transfer::ExportFormat;
use crate::ui::app::App;
use crate::ui::theme;

pub(crate) fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(5)])
        .split(chunks[0]);

    render_export(f, left[0], app);
    render_backup(f, left[1], app);
    render_import(f, chunks[1], app);
}

fn render_export(f: &mut Frame, area: Rect, app: &App) {
    let now = Utc::now();
    let items: Vec<ListItem> = ExportFormat::all()
        .iter()
        .enumerate()
        .map(|(i, format)| {
            let (marker, style) = if i == app.export_cursor.selected {
                ("▸ ", theme::selected_style())
            } else {
                ("  ", theme::normal_style())
            };
            ListItem::new(vec![
                Line::from(Span::styled(
                    format!("{marker}{:<8}", format.as_str()),
                    style.add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("    {}", format.default_file_name(now)),
                    theme::dim_style(),
                )),
            ])
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::ACCENT))
        .title(Span::styled(" Export ", theme::title_style()))
        .title_bottom(Span::styled(
            format!(" to {} ", app.export_dir.display()),
            theme::dim_style(),
        ));

    f.render_widget(List::new(items).block(block), area);
}

fn render_backup(f: &mut Frame, area: Rect, app: &App) {
    let last = match app.last_backup {
        Some(at) => Span::styled(
            at.format("%Y-%m-%d %H:%M UTC").to_string(),
            Style::default().fg(theme::GREEN),
        ),
        None => Span::styled("never", Style::default().fg(theme::YELLOW)),
    };

    let text = Paragraph::new(vec![
        Line::from(vec![Span::styled("Last backup: ", theme::dim_style()), last]),
        Line::from(Span::styled(
            "b or :backup [path] writes a full JSON copy",
            theme::dim_style(),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Backup ", theme::title_style())),
    );

    f.render_widget(text, area);
}

fn render_import(f: &mut Frame, area: Rect, app: &App) {
    let mode = Line::from(vec![
        Span::styled("Mode: ", theme::dim_style()),
        Span::styled(
            app.import_mode.as_str(),
            Style::default()
                .fg(theme::YELLOW)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (m to toggle)", theme::dim_style()),
    ]);

    let mut lines = vec![mode, Line::from("")];
    match (&app.import_preview, &app.import_path) {
        (Some(preview), path) => {
            if let Some(path) = path {
                lines.push(Line::from(Span::styled(
                    path.display().to_string(),
                    Style::default().fg(theme::ACCENT),
                )));
                lines.push(Line::from(""));
            }
            lines.extend(
                preview
                    .lines()
                    .into_iter()
                    .map(|l| Line::from(Span::styled(l, theme::normal_style()))),
            );
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Enter to import, Esc to discard",
                theme::dim_style(),
            )));
        }
        (None, _) => {
            lines.push(Line::from(Span::styled(
                "Load a JSON or CSV file with :import <path>",
                theme::dim_style(),
            )));
            lines.push(Line::from(Span::styled(
                "Nothing is written until you confirm the preview",
                theme::dim_style(),
            )));
        }
    }

    let text = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme::OVERLAY))
            .title(Span::styled(" Import ", theme::title_style())),
    );

    f.render_widget(text, area);
}
