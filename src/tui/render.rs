use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::model::task::{FilterKind, Task};
use crate::ops::stats::Stats;

use super::app::{App, Mode};

/// Draw the whole screen for one frame
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tab bar (2 rows) | task list | stats row | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_tab_bar(frame, app, chunks[0]);
    render_task_list(frame, app, chunks[1]);
    render_stats_row(frame, app, chunks[2]);
    render_status_row(frame, app, chunks[3]);

    if app.show_help {
        render_help_overlay(frame, app, area);
    }
}

pub fn tab_label(filter: FilterKind) -> &'static str {
    match filter {
        FilterKind::All => "All",
        FilterKind::Active => "Active",
        FilterKind::Completed => "Completed",
        FilterKind::Important => "Important",
        FilterKind::DueToday => "Due Today",
    }
}

fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let mut spans = vec![Span::styled(
        format!(" {} ", app.store.username()),
        Style::default()
            .fg(app.theme.highlight)
            .bg(bg)
            .add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::styled("│", Style::default().fg(app.theme.dim).bg(bg)));

    for (i, kind) in FilterKind::ALL.iter().enumerate() {
        let selected = *kind == app.filter;
        let style = if selected {
            Style::default()
                .fg(app.theme.text_bright)
                .bg(app.theme.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.dim).bg(bg)
        };
        spans.push(Span::styled(
            format!(" {}:{} ", i + 1, tab_label(*kind)),
            style,
        ));
    }

    let separator = "─".repeat(area.width as usize);
    let lines = vec![
        Line::from(spans),
        Line::from(Span::styled(
            separator,
            Style::default().fg(app.theme.dim).bg(bg),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).style(Style::default().bg(bg)), area);
}

fn render_task_list(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let view: Vec<Task> = app.visible().into_iter().cloned().collect();

    if view.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "  (no tasks to show; press 'a' to add one)",
            Style::default().fg(app.theme.dim).bg(bg),
        )))
        .style(Style::default().bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    // Keep the cursor row on screen
    let height = area.height as usize;
    if app.cursor < app.scroll_offset {
        app.scroll_offset = app.cursor;
    } else if height > 0 && app.cursor >= app.scroll_offset + height {
        app.scroll_offset = app.cursor - height + 1;
    }

    let mut lines = Vec::new();
    for (i, task) in view.iter().enumerate().skip(app.scroll_offset).take(height) {
        lines.push(task_line(app, task, i == app.cursor, area.width as usize));
    }
    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(bg)),
        area,
    );
}

fn task_line<'a>(app: &App, task: &Task, selected: bool, width: usize) -> Line<'a> {
    let row_bg = if selected {
        app.theme.selection_bg
    } else {
        app.theme.background
    };

    let text_style = if task.completed {
        Style::default()
            .fg(app.theme.dim)
            .bg(row_bg)
            .add_modifier(Modifier::CROSSED_OUT)
    } else if selected {
        Style::default().fg(app.theme.text_bright).bg(row_bg)
    } else {
        Style::default().fg(app.theme.text).bg(row_bg)
    };

    let check = if task.completed { "[x]" } else { "[ ]" };
    let due = task.due_date.with_timezone(&Local).format("%Y-%m-%d");

    let mut spans = vec![
        Span::styled(
            format!(" {} ", task.priority.glyph()),
            Style::default()
                .fg(app.theme.priority_color(task.priority))
                .bg(row_bg),
        ),
        Span::styled(check.to_string(), Style::default().fg(app.theme.text).bg(row_bg)),
        Span::styled(
            format!(" {:>3}  ", task.display_number),
            Style::default().fg(app.theme.dim).bg(row_bg),
        ),
        Span::styled(task.text.clone(), text_style),
        Span::styled(
            format!("  due {}", due),
            Style::default().fg(app.theme.dim).bg(row_bg),
        ),
    ];
    if task.important {
        spans.push(Span::styled(
            " ★",
            Style::default().fg(app.theme.yellow).bg(row_bg),
        ));
    }

    // Pad the row so the selection background reaches the edge
    let used: usize = spans.iter().map(|s| s.content.width()).sum();
    if used < width {
        spans.push(Span::styled(
            " ".repeat(width - used),
            Style::default().bg(row_bg),
        ));
    }
    Line::from(spans)
}

/// One-line stat summary shown above the status row.
pub fn format_stats_row(stats: &Stats) -> String {
    format!(
        " {} tasks • {} active • {} done • {} ★ • {} due today",
        stats.total, stats.active, stats.completed, stats.important, stats.due_today
    )
}

fn render_stats_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let line = Line::from(Span::styled(
        format_stats_row(&app.stats()),
        Style::default().fg(app.theme.text).bg(bg),
    ));
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let line = match app.mode {
        Mode::Insert => {
            // Add prompt: add: text▌
            let mut spans = vec![
                Span::styled(" add: ", Style::default().fg(app.theme.highlight).bg(bg)),
                Span::styled(
                    app.input.clone(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            let hint = "Enter add  Esc cancel";
            let used: usize = spans.iter().map(|s| s.content.width()).sum();
            if used + hint.width() < width {
                spans.push(Span::styled(
                    " ".repeat(width - used - hint.width()),
                    Style::default().bg(bg),
                ));
                spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
            }
            Line::from(spans)
        }
        Mode::Navigate => {
            if let Some(message) = app.notification() {
                Line::from(Span::styled(
                    format!(" {}", message),
                    Style::default().fg(app.theme.highlight).bg(bg),
                ))
            } else {
                Line::from(Span::styled(
                    " a add  space toggle  s star  d delete  tab filter  ? help  q quit",
                    Style::default().fg(app.theme.dim).bg(bg),
                ))
            }
        }
    };

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}

fn render_help_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let lines = [
        "j/k, ↑/↓     move cursor",
        "space, x     toggle completed",
        "s, *         toggle important",
        "d, del       delete task",
        "a, i         add a task",
        "tab, 1-5     switch filter",
        "g/G          first/last task",
        "q, esc       quit",
        "",
        "press any key to close",
    ];

    let height = (lines.len() + 2).min(area.height as usize) as u16;
    let width = 44.min(area.width);
    let popup = Rect {
        x: area.x + (area.width.saturating_sub(width)) / 2,
        y: area.y + (area.height.saturating_sub(height)) / 2,
        width,
        height,
    };

    frame.render_widget(Clear, popup);
    let text: Vec<Line> = lines
        .iter()
        .map(|l| {
            Line::from(Span::styled(
                format!(" {}", l),
                Style::default().fg(app.theme.text).bg(app.theme.background),
            ))
        })
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" keys ")
        .style(
            Style::default()
                .fg(app.theme.highlight)
                .bg(app.theme.background),
        );
    frame.render_widget(Paragraph::new(text).block(block), popup);
}
