use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::app::QuizView;
use crate::scoring::QuizOutcome;
use crate::ui::progress::progress_percent;
use crate::ui::{
    accent, bold, dim, failure, italic, render_legend, render_message, success,
    HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};

pub fn render_question(view: &QuizView, area: Rect, buf: &mut Buffer) {
    let session = &view.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled(session.quiz.title.clone(), accent()),
        Span::styled(format!("  {} answered", session.answered_count()), dim()),
    ]))
    .render(chunks[0], buf);

    let count = session.quiz.question_count();
    Gauge::default()
        .gauge_style(accent())
        .percent(progress_percent(session.current_index(), count))
        .label(format!(
            "Question {} of {}",
            session.current_index() + 1,
            count
        ))
        .render(chunks[1], buf);

    let Some(question) = session.current_question() else {
        return;
    };
    let selected = session.selected();

    let mut lines = vec![
        Line::from(Span::styled(question.prompt.clone(), bold())),
        Line::default(),
    ];
    for (idx, option) in question.options.iter().enumerate() {
        let mark = if selected == Some(option.id.as_str()) {
            "(•)"
        } else {
            "( )"
        };
        let style = if idx == view.cursor {
            accent()
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(if idx == view.cursor { "> " } else { "  " }, style),
            Span::styled(format!("{mark} {}", option.text), style),
        ]));
    }

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: true })
        .render(chunks[3], buf);

    let legend = if session.can_advance() {
        "↑/↓ choose · space select · enter next · ← back · esc leave"
    } else {
        "↑/↓ choose · enter select and continue · ← back · esc leave"
    };
    render_legend(legend, chunks[4], buf);
}

fn outcome_lines(outcome: &QuizOutcome) -> Vec<Line<'static>> {
    match outcome {
        QuizOutcome::Knowledge(score) => {
            let verdict = if score.passed {
                Span::styled("Passed", success())
            } else {
                Span::styled("Not passed yet", failure())
            };
            vec![
                Line::from(Span::styled(
                    format!("{}%", score.percentage),
                    accent(),
                )),
                Line::from(format!(
                    "{} of {} answered correctly",
                    score.score, score.total
                )),
                Line::default(),
                Line::from(verdict),
            ]
        }
        QuizOutcome::Personality(result) => {
            let mut lines = vec![
                Line::from(Span::styled(result.result.title.clone(), accent())),
                Line::default(),
                Line::from(result.result.description.clone()),
            ];
            if !result.result.advice.is_empty() {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled(
                    result.result.advice.clone(),
                    italic(),
                )));
            }
            if !result.totals.is_empty() {
                lines.push(Line::default());
                let totals = result
                    .totals
                    .iter()
                    .map(|(c, v)| format!("{c} {v}"))
                    .collect::<Vec<_>>()
                    .join(" · ");
                lines.push(Line::from(Span::styled(totals, dim())));
            }
            lines
        }
    }
}

pub fn render_result(view: &QuizView, message: Option<&str>, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Span::styled(view.session.quiz.title.clone(), bold())).render(chunks[0], buf);

    if let Some(outcome) = view.session.outcome() {
        Paragraph::new(outcome_lines(outcome))
            .block(Block::default().borders(Borders::TOP))
            .wrap(Wrap { trim: true })
            .render(chunks[1], buf);
    }

    render_message(message, chunks[2], buf);
    render_legend("(r)etake · (n) try another · (esc)ape", chunks[3], buf);
}
