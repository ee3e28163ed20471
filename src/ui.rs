pub mod home;
pub mod progress;
pub mod quiz;
pub mod screen;
pub mod simulation;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;

pub const HORIZONTAL_MARGIN: u16 = 4;
pub const VERTICAL_MARGIN: u16 = 1;

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

pub fn accent() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

pub fn success() -> Style {
    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
}

pub fn failure() -> Style {
    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
}

/// Draw whichever screen matches the app state
pub fn draw(app: &App, f: &mut Frame) {
    let area = f.area();
    screen::current_screen(&app.state).render(app, area, f.buffer_mut());
}

/// Splits `**bold**` runs into styled spans
fn inline_spans(text: &str, base: Style) -> Vec<Span<'static>> {
    text.split("**")
        .enumerate()
        .filter(|(_, part)| !part.is_empty())
        .map(|(idx, part)| {
            let style = if idx % 2 == 1 { base.patch(bold()) } else { base };
            Span::styled(part.to_string(), style)
        })
        .collect()
}

/// Just enough markdown for step descriptions and articles: headings,
/// bullets, numbered items and bold runs
pub fn markdown_lines(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|raw| {
            let line = raw.trim_end();
            if let Some(heading) = line.strip_prefix("## ") {
                Line::from(Span::styled(heading.to_string(), accent()))
            } else if let Some(heading) = line.strip_prefix("# ") {
                Line::from(Span::styled(
                    heading.to_uppercase(),
                    accent().add_modifier(Modifier::UNDERLINED),
                ))
            } else if let Some(item) = line.strip_prefix("- ") {
                let mut spans = vec![Span::raw("  • ")];
                spans.extend(inline_spans(item, Style::default()));
                Line::from(spans)
            } else {
                Line::from(inline_spans(line, Style::default()))
            }
        })
        .collect()
}

/// One-line key legend at the bottom of a screen
pub fn render_legend(text: &str, area: Rect, buf: &mut Buffer) {
    Paragraph::new(Span::styled(text.to_string(), italic())).render(area, buf);
}

/// Error or status text; truncated to the width instead of wrapping
pub fn render_message(message: Option<&str>, area: Rect, buf: &mut Buffer) {
    let Some(message) = message else {
        return;
    };
    let mut text = message.to_string();
    while text.width() > area.width as usize && !text.is_empty() {
        text.pop();
    }
    Paragraph::new(Span::styled(text, failure())).render(area, buf);
}

#[cfg(test)]
pub(crate) fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    let mut out = String::new();
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            out.push_str(buf[(x, y)].symbol());
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_heading_and_bold() {
        let lines = markdown_lines("# Title\nplain **strong** text\n- item");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].spans[0].content, "TITLE");
        assert_eq!(lines[1].spans.len(), 3);
        assert_eq!(lines[1].spans[1].content, "strong");
        assert!(lines[1].spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(lines[2].spans[0].content, "  • ");
    }

    #[test]
    fn test_render_message_truncates() {
        let area = Rect::new(0, 0, 5, 1);
        let mut buf = Buffer::empty(area);
        render_message(Some("not found"), area, &mut buf);
        assert_eq!(buffer_text(&buf), "not f\n");
    }
}
