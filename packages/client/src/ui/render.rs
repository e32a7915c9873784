//! Frame layout.
//!
//! ```text
//! notice
//! ==========
//! [12:00:00] alice: hi
//! ...
//! ==========
//! >>_ input
//! ```

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::Paragraph,
};

use crate::{
    history::ChatMessage,
    terminal::{Screen, View},
};

const PROMPT: &str = ">>_ ";
const ELLIPSIS: &str = "...";
const PRESS_ANY_KEY: &str = "Press any key to exit.";

/// Draw one frame of `view`.
pub fn draw(frame: &mut Frame, view: &View<'_>) {
    if view.screen == Screen::ConnectFailed {
        draw_connect_failed(frame, view);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let [notice_area, top_rule, history_area, bottom_rule, input_area] = chunks.as_ref() else {
        return;
    };

    let notice_style = match view.screen {
        Screen::ConnectionLost => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    };
    let width = usize::from(notice_area.width);
    frame.render_widget(
        Paragraph::new(truncate_line(view.notice, width)).style(notice_style),
        *notice_area,
    );
    frame.render_widget(rule(*top_rule), *top_rule);
    draw_history(frame, view, *history_area);
    frame.render_widget(rule(*bottom_rule), *bottom_rule);
    draw_input(frame, view, *input_area);
}

fn rule(area: Rect) -> Paragraph<'static> {
    Paragraph::new("=".repeat(usize::from(area.width)))
}

/// Newest messages at the bottom; older ones scroll off the top.
fn draw_history(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let height = usize::from(area.height);
    let width = usize::from(area.width);
    let skip = view.history.len().saturating_sub(height);
    let padding = height.saturating_sub(view.history.len());

    let lines: Vec<Line> = std::iter::repeat_n(Line::default(), padding)
        .chain(view.history.iter().skip(skip).map(|message| {
            Line::styled(
                truncate_line(&message.format_line(), width),
                sender_style(message, view.user_name),
            )
        }))
        .collect();

    frame.render_widget(Paragraph::new(lines), area);
}

fn sender_style(message: &ChatMessage, user_name: &str) -> Style {
    if message.is_system() {
        Style::default().fg(Color::Cyan)
    } else if message.sender == user_name {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Magenta)
    }
}

fn draw_input(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let prompt_width = PROMPT.chars().count();
    let input_width = usize::from(area.width).saturating_sub(prompt_width + 1);

    // Keep the tail of a long input line visible
    let input_len = view.input_text.chars().count();
    let visible: String = view
        .input_text
        .chars()
        .skip(input_len.saturating_sub(input_width))
        .collect();
    let cursor_offset = prompt_width + visible.chars().count();

    frame.render_widget(Paragraph::new(format!("{}{}", PROMPT, visible)), area);

    if view.screen == Screen::Chat {
        let offset = u16::try_from(cursor_offset).unwrap_or(u16::MAX);
        let cursor_x = area
            .x
            .saturating_add(offset)
            .min(area.right().saturating_sub(1));
        frame.set_cursor_position((cursor_x, area.y));
    }
}

fn draw_connect_failed(frame: &mut Frame, view: &View<'_>) {
    let lines = vec![
        Line::from(view.notice.to_string()),
        Line::default(),
        Line::from(PRESS_ANY_KEY),
    ];
    frame.render_widget(Paragraph::new(lines), frame.area());
}

/// Shorten `line` to at most `width` characters, ending in `...` when cut.
pub fn truncate_line(line: &str, width: usize) -> String {
    if line.chars().count() <= width {
        return line.to_string();
    }
    if width <= ELLIPSIS.len() {
        return ".".repeat(width);
    }

    let mut truncated: String = line.chars().take(width - ELLIPSIS.len()).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}
