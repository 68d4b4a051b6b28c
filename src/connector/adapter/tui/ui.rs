use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::domain::{Message, Sender};

use super::app::ChatApp;

const WELCOME_TITLE: &str = "Start a new chat";
const WELCOME_SUBTITLE: &str = "Send a message below to begin";

pub fn render(frame: &mut Frame, app: &ChatApp) {
    let controller = app.controller();
    let banner = controller.error_banner();

    let mut constraints = vec![Constraint::Length(1)];
    if banner.is_some() {
        constraints.push(Constraint::Length(3));
    }
    constraints.extend([
        Constraint::Min(3),
        Constraint::Length(3),
        Constraint::Length(1),
    ]);
    let chunks = Layout::vertical(constraints).split(frame.area());

    let mut idx = 0;
    render_header(frame, chunks[idx], app);
    idx += 1;

    if let Some(text) = banner {
        render_banner(frame, chunks[idx], text);
        idx += 1;
    }

    render_messages(frame, chunks[idx], app);
    render_input(frame, chunks[idx + 1], app);
    render_footer(frame, chunks[idx + 2], app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &ChatApp) {
    let settings = app.controller().settings();
    let header = Line::from(vec![
        Span::styled(
            " chatrelay ",
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw(format!(
            " model: {} | {}",
            settings.model,
            app.controller().inference_client().describe()
        )),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

fn render_banner(frame: &mut Frame, area: Rect, text: &str) {
    let banner = Paragraph::new(text.to_string())
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Error (Esc to dismiss) "),
        );
    frame.render_widget(banner, area);
}

fn render_messages(frame: &mut Frame, area: Rect, app: &ChatApp) {
    let block = Block::default().borders(Borders::ALL).title(" Conversation ");
    let inner = block.inner(area);
    let conversation = app.controller().conversation();

    let lines: Vec<Line> = if conversation.is_empty() && !conversation.has_pending() {
        vec![
            Line::from(Span::styled(
                WELCOME_TITLE,
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(WELCOME_SUBTITLE),
        ]
    } else {
        conversation
            .render_order()
            .flat_map(|m| message_lines(m, inner.width as usize, app.tick()))
            .collect()
    };

    // Keep the latest entry in view.
    let scroll = lines.len().saturating_sub(inner.height as usize) as u16;
    let paragraph = Paragraph::new(lines).block(block).scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn message_lines(message: &Message, width: usize, tick: usize) -> Vec<Line<'static>> {
    let (label, label_style) = match message.sender() {
        Sender::User => ("You", Style::default().fg(Color::Green)),
        Sender::Assistant if message.is_error() => ("Assistant", Style::default().fg(Color::Red)),
        Sender::Assistant => ("Assistant", Style::default().fg(Color::Cyan)),
    };
    let body_style = if message.is_error() {
        Style::default().fg(Color::Red)
    } else {
        Style::default()
    };

    let mut lines = vec![Line::from(Span::styled(
        label,
        label_style.add_modifier(Modifier::BOLD),
    ))];

    if message.is_pending() {
        let dots = ".".repeat(tick % 3 + 1);
        lines.push(Line::from(Span::styled(
            format!("  {dots}"),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for row in wrap_text(message.text(), width.saturating_sub(2)) {
            lines.push(Line::from(Span::styled(format!("  {row}"), body_style)));
        }
    }

    lines.push(Line::default());
    lines
}

fn render_input(frame: &mut Frame, area: Rect, app: &ChatApp) {
    let controller = app.controller();
    let (title, style) = if controller.is_clear_requested() {
        (
            " Clear the whole conversation? (y/n) ",
            Style::default().fg(Color::Yellow),
        )
    } else if app.input_enabled() {
        (" Send a message (Enter) ", Style::default())
    } else {
        (" waiting... ", Style::default().fg(Color::DarkGray))
    };

    let input = Paragraph::new(app.input().to_string())
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(input, area);

    if app.input_enabled() && !controller.is_clear_requested() {
        let visible = app.input().chars().count() as u16;
        let x = area.x + 1 + visible.min(area.width.saturating_sub(3));
        frame.set_cursor_position((x, area.y + 1));
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &ChatApp) {
    let count = app.controller().conversation().len();
    let footer = Line::from(vec![
        Span::styled(
            " Enter send  Ctrl-L clear  Esc dismiss/quit  Ctrl-C quit ",
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw(format!(" {count} messages")),
    ]);
    frame.render_widget(Paragraph::new(footer), area);
}

/// Greedy word wrap; words longer than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    rows.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                rows.push(word.into_iter().collect());
                word = rest;
            }

            let needed = if current_len == 0 { word.len() } else { word.len() + 1 };
            if current_len + needed > width && current_len > 0 {
                rows.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }

        rows.push(current);
    }

    rows
}
