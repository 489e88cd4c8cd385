use std::sync::OnceLock;

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};
use time::format_description::FormatItem;

use crate::model::FileKind;

use super::app::{App, StatusKind};

fn status_time_format() -> &'static [FormatItem<'static>] {
    static FMT: OnceLock<Vec<FormatItem<'static>>> = OnceLock::new();
    FMT.get_or_init(|| {
        time::format_description::parse("[hour]:[minute]:[second]").unwrap_or_default()
    })
}

pub(super) fn draw(frame: &mut ratatui::Frame, app: &App) {
    let banner = app.view().banner();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(if banner.is_some() { 4 } else { 0 }),
            Constraint::Min(0),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    if let Some(banner) = banner {
        let mut lines = vec![Line::from(banner.text())];
        if let Some(url) = banner.merge_request_url {
            lines.push(Line::from(vec![
                Span::styled("Create merge request: ", Style::default().fg(Color::Green)),
                Span::raw(url),
            ]));
        }
        frame.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: false })
                .block(Block::default().borders(Borders::ALL).title("Commit status")),
            chunks[1],
        );
    }

    draw_table(frame, app, chunks[2]);
    draw_status(frame, app, chunks[3]);

    frame.render_widget(
        Paragraph::new("Enter: open  Backspace: up  r: reload  m: merge request  q: quit")
            .style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );
}

fn draw_header(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let project = app.project();
    let branch = app
        .view()
        .effective_branch()
        .unwrap_or_else(|| project.default_branch.clone());
    let path = app
        .view()
        .identity()
        .map(|i| i.path.clone())
        .unwrap_or_default();
    let header = Line::from(vec![
        Span::styled(
            format!("{}/{}", project.namespace, project.slug),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::styled(branch, Style::default().fg(Color::Cyan)),
        Span::raw("  /"),
        Span::raw(path),
    ]);
    frame.render_widget(
        Paragraph::new(header).block(Block::default().borders(Borders::BOTTOM)),
        area,
    );
}

fn draw_table(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let table = app.view().table();
    let title = if table.waiting {
        format!("{} (loading...)", table.headers.join(" "))
    } else {
        table.headers.join(" ")
    };

    let mut items = Vec::new();
    if table.show_navigate_up {
        items.push(ListItem::new(".."));
    }
    for row in &table.rows {
        let (name, style) = match row.kind {
            FileKind::Tree => (
                format!("{}/", row.name),
                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            ),
            FileKind::Blob => (row.name.clone(), Style::default()),
        };
        items.push(ListItem::new(Span::styled(name, style)));
    }
    if items.is_empty() {
        items.push(ListItem::new(if table.waiting { "" } else { "(empty)" }));
    }

    let mut state = ListState::default();
    if app.row_count() > 0 {
        state.select(Some(app.selected));
    }
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_status(frame: &mut ratatui::Frame, app: &App, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = app
        .status
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|s| {
            let color = match s.kind {
                StatusKind::Info => Color::Gray,
                StatusKind::Error => Color::Red,
            };
            let ts = s.at.format(status_time_format()).unwrap_or_default();
            Line::from(vec![
                Span::styled(format!("{} ", ts), Style::default().fg(Color::DarkGray)),
                Span::styled(s.text.clone(), Style::default().fg(color)),
            ])
        })
        .collect();
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Messages")),
        area,
    );
}
