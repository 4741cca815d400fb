//! Drawing the session state.
//!
//! Layout, top to bottom: status bar, the two panes, notice line, input
//! line. Help is drawn as a centered overlay on top.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Row, Table};
use ratatui::Frame;

use fac_core::config::Orientation;
use fac_core::conflict::{Conflict, ConflictFile, Resolution};
use fac_core::session::SessionContext;

pub fn draw(frame: &mut Frame, ctx: &SessionContext, input: &str) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let cursor = ctx.registry.cursor();
    let conflict = ctx.registry.active();
    let file = ctx.registry.file_of(cursor);

    render_status(frame, ctx, conflict, chunks[0]);
    render_panes(frame, ctx, conflict, file, chunks[1]);
    render_notice(frame, ctx, chunks[2]);
    render_input(frame, ctx, input, chunks[3]);

    if ctx.presenter.show_help {
        render_help(frame, ctx, area);
    }
}

fn render_status(frame: &mut Frame, ctx: &SessionContext, conflict: &Conflict, area: Rect) {
    let resolved = ctx.registry.iter().filter(|c| c.is_resolved()).count();
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", conflict.file_name()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(
            "— conflict {}/{}",
            ctx.registry.cursor() + 1,
            ctx.registry.size()
        )),
        Span::styled(
            format!("  [{resolved} resolved]"),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("  {}", conflict.resolution()),
            resolution_style(conflict.resolution()),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(line).style(Style::default().bg(Color::Blue).fg(Color::White)),
        area,
    );
}

fn resolution_style(resolution: Resolution) -> Style {
    if resolution.is_resolved() {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::Yellow)
    }
}

fn render_panes(
    frame: &mut Frame,
    ctx: &SessionContext,
    conflict: &Conflict,
    file: &ConflictFile,
    area: Rect,
) {
    let direction = match ctx.presenter.orientation {
        Orientation::Vertical => Direction::Horizontal,
        Orientation::Horizontal => Direction::Vertical,
    };
    let panes = Layout::default()
        .direction(direction)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let resolution = conflict.resolution();
    let sides = [
        (
            conflict.local_label(),
            "local",
            conflict.local(),
            matches!(resolution, Resolution::Local | Resolution::Both),
            Color::Cyan,
        ),
        (
            conflict.incoming_label(),
            "incoming",
            conflict.incoming(),
            matches!(resolution, Resolution::Incoming | Resolution::Both),
            Color::Magenta,
        ),
    ];

    for ((label, fallback_label, body, chosen, color), pane) in sides.into_iter().zip(panes.iter())
    {
        let title = if label.is_empty() {
            format!(" {fallback_label} ")
        } else {
            format!(" {fallback_label}: {label} ")
        };
        let border = if chosen {
            Style::default().fg(Color::Green)
        } else {
            Style::default()
        };
        let lines = pane_lines(conflict, file, body, color);
        let widget = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(title)
                    .borders(Borders::ALL)
                    .border_style(border),
            )
            .scroll((u16::try_from(ctx.presenter.scroll).unwrap_or(u16::MAX), 0));
        frame.render_widget(widget, *pane);
    }
}

/// Context above, the side's lines, context below.
fn pane_lines<'a>(
    conflict: &Conflict,
    file: &'a ConflictFile,
    body: &'a [String],
    color: Color,
) -> Vec<Line<'a>> {
    let (start, end) = conflict.span();
    let context = Style::default().fg(Color::DarkGray);
    let above = (start - conflict.top_peek.min(start))..start;
    let below = (end + 1)..(end + 1 + conflict.bottom_peek);

    let mut lines: Vec<Line<'a>> = above
        .filter_map(|i| file.line(i))
        .map(|l| Line::styled(l, context))
        .collect();
    lines.extend(body.iter().map(|l| Line::styled(l.as_str(), Style::default().fg(color))));
    lines.extend(
        below
            .filter_map(|i| file.line(i))
            .map(|l| Line::styled(l, context)),
    );
    lines
}

fn render_notice(frame: &mut Frame, ctx: &SessionContext, area: Rect) {
    if let Some(notice) = ctx.presenter.notice() {
        frame.render_widget(
            Paragraph::new(notice).style(Style::default().fg(Color::Yellow)),
            area,
        );
    }
}

fn render_input(frame: &mut Frame, ctx: &SessionContext, input: &str, area: Rect) {
    let prompt = ctx.presenter.prompt();
    let line = Line::from(vec![
        Span::styled(prompt, Style::default().fg(Color::Green)),
        Span::raw(input),
    ]);
    frame.render_widget(Paragraph::new(line), area);

    let width = u16::try_from(prompt.chars().count() + input.chars().count()).unwrap_or(u16::MAX);
    frame.set_cursor_position((area.x + width.min(area.width.saturating_sub(1)), area.y));
}

fn render_help(frame: &mut Frame, ctx: &SessionContext, area: Rect) {
    let rows: Vec<Row> = ctx
        .presenter
        .help_rows()
        .into_iter()
        .map(|(key, description)| {
            Row::new(vec![
                Span::styled(key, Style::default().fg(Color::Cyan)),
                Span::raw(description),
            ])
        })
        .collect();
    let height = u16::try_from(rows.len()).unwrap_or(u16::MAX).saturating_add(2);

    let popup = centered(area, 56, height);
    let table = Table::new(rows, [Constraint::Length(8), Constraint::Min(10)])
        .block(Block::default().title(" Help ").borders(Borders::ALL));
    frame.render_widget(Clear, popup);
    frame.render_widget(table, popup);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
