use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use crate::app::App;
use crate::steps::SimulationKind;
use crate::ui::{accent, bold, dim, render_legend, render_message, HORIZONTAL_MARGIN, VERTICAL_MARGIN};

fn entry_line(selected: bool, title: &str, detail: String) -> Line<'static> {
    let (marker, style) = if selected {
        ("> ", accent())
    } else {
        ("  ", Style::default())
    };
    Line::from(vec![
        Span::styled(marker, style),
        Span::styled(title.to_string(), style),
        Span::styled(format!("  {detail}"), dim()),
    ])
}

pub fn render_home(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(vec![
        Line::from(Span::styled("web3setgo", accent())),
        Line::from(Span::styled(
            "practice web3 safely: quizzes and guided simulations",
            dim(),
        )),
    ])
    .render(chunks[0], buf);

    let home = &app.home;
    let mut lines = vec![Line::from(Span::styled("Quizzes", bold()))];
    for (idx, quiz) in home.quizzes.iter().enumerate() {
        lines.push(entry_line(
            home.cursor == idx,
            &quiz.title,
            format!("{} · {} questions", quiz.kind, quiz.question_count()),
        ));
    }
    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Simulations", bold())));
    for (idx, sim) in home.simulations.iter().enumerate() {
        let available = if SimulationKind::resolve(sim).is_some() {
            sim.duration.clone()
        } else {
            "coming soon".to_string()
        };
        lines.push(entry_line(
            home.cursor == home.quizzes.len() + idx,
            &sim.title,
            format!("{} · {}", sim.difficulty, available),
        ));
    }
    if home.is_empty() {
        lines = vec![Line::from(Span::styled("No published content yet.", dim()))];
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: false })
        .render(chunks[1], buf);

    render_message(app.message.as_deref(), chunks[2], buf);
    render_legend("↑/↓ choose · enter open · esc quit", chunks[3], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::ContentStore;
    use crate::ui::buffer_text;

    #[test]
    fn test_home_renders_both_sections() {
        let store = ContentStore::open_in_memory().unwrap();
        let mut app = App::new(Box::new(store), Config::default());
        app.load_home().unwrap();

        let area = Rect::new(0, 0, 90, 24);
        let mut buf = Buffer::empty(area);
        render_home(&app, area, &mut buf);
        let text = buffer_text(&buf);

        assert!(text.contains("Quizzes"));
        assert!(text.contains("Simulations"));
        assert!(text.contains("> "));
        assert!(text.contains("Create Your First Wallet"));
        assert!(text.contains("coming soon"));
    }
}
