use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget, Wrap},
};

use crate::app::SimulationView;
use crate::simulation::{PendingKind, Transition, WalletStep, VERIFY_POSITIONS};
use crate::ui::progress::{format_countdown, progress_percent, step_label};
use crate::ui::{
    accent, bold, dim, failure, italic, markdown_lines, render_legend, render_message, success,
    HORIZONTAL_MARGIN, VERTICAL_MARGIN,
};
use crate::wallet::shorten_address;

const MASK: &str = "••••••";

fn pending_line(view: &SimulationView) -> Option<Line<'static>> {
    let pending = view.engine.pending?;
    let text = match pending.kind {
        PendingKind::Generating => format!(
            "Generating your wallet... {}",
            format_countdown(pending.remaining)
        ),
        PendingKind::Verified => "Verified! Moving on...".to_string(),
        PendingKind::Copied => "Address copied!".to_string(),
    };
    let style = match pending.kind {
        PendingKind::Generating => accent(),
        _ => success(),
    };
    Some(Line::from(Span::styled(text, style)))
}

fn phrase_lines(words: &[String], revealed: bool) -> Vec<Line<'static>> {
    words
        .iter()
        .enumerate()
        .chunks(3)
        .into_iter()
        .map(|row| {
            let spans = row
                .map(|(idx, word)| {
                    let shown = if revealed { word.as_str() } else { MASK };
                    Span::styled(format!("{:>2}. {:<12}", idx + 1, shown), bold())
                })
                .collect::<Vec<_>>();
            Line::from(spans)
        })
        .collect()
}

fn verify_lines(view: &SimulationView) -> Vec<Line<'static>> {
    let Some(challenge) = &view.engine.challenge else {
        return vec![];
    };
    let mut lines = Vec::new();
    for (slot, pos) in VERIFY_POSITIONS.iter().enumerate() {
        let picked = challenge.selections[slot].as_deref().unwrap_or("____");
        let style = if slot == view.verify_slot {
            accent()
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(if slot == view.verify_slot { "> " } else { "  " }, style),
            Span::styled(format!("Word #{}: ", pos + 1), style),
            Span::styled(picked.to_string(), bold()),
        ]));
    }
    lines.push(Line::default());
    let pool = challenge
        .pool
        .iter()
        .enumerate()
        .map(|(idx, word)| format!("{}) {word}", idx + 1))
        .join("   ");
    lines.push(Line::from(Span::raw(pool)));

    if view.last_transition == Some(Transition::Rejected) && view.engine.pending.is_none() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "Those words don't match your phrase. Check the positions and try again.",
            failure(),
        )));
    }
    lines
}

fn step_body(view: &SimulationView) -> Vec<Line<'static>> {
    let engine = &view.engine;
    let wallet = engine.wallet();
    let mut lines = match engine.step() {
        WalletStep::Welcome => vec![Line::from("Press enter to begin.")],
        WalletStep::Generate => vec![Line::from("Press enter to generate your wallet.")],
        WalletStep::Backup => {
            let mut lines = phrase_lines(&wallet.seed_phrase, engine.phrase_revealed);
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                "Press enter once you have written it down.",
                dim(),
            )));
            lines
        }
        WalletStep::Verify => verify_lines(view),
        WalletStep::Address => vec![
            Line::from(Span::styled(wallet.address.clone(), bold())),
            Line::from(Span::styled(
                format!("short form: {}", shorten_address(&wallet.address)),
                dim(),
            )),
            Line::from(format!("balance: {} ETH (practice funds)", wallet.balance)),
        ],
        WalletStep::SecurityTips => vec![Line::from("Press enter to continue.")],
        WalletStep::Complete => vec![Line::from("Press enter to finish.")],
    };
    if let Some(pending) = pending_line(view) {
        lines.push(Line::default());
        lines.push(pending);
    }
    lines
}

fn legend_for(step: WalletStep) -> &'static str {
    match step {
        WalletStep::Backup => "enter continue · (s)how/hide phrase · (h)int · (r)estart · esc leave",
        WalletStep::Verify => {
            "1-6 pick word · ←/→ position · enter verify · (h)int · (r)estart · esc leave"
        }
        WalletStep::Address => "(c)opy address · (h)int · (r)estart · esc leave",
        _ => "enter continue · (h)int · (r)estart · esc leave",
    }
}

pub fn render_step(view: &SimulationView, area: Rect, buf: &mut Buffer) {
    let step_idx = view.engine.session.current_step;
    let count = view.steps.len();
    let hint_lines: Vec<Line> = match view.current_step() {
        Some(step) if view.engine.hint_visible && step.has_hints() => step
            .hints
            .iter()
            .map(|h| Line::from(Span::styled(format!("• {h}"), italic())))
            .collect(),
        _ => vec![],
    };
    let hint_height = if hint_lines.is_empty() {
        0
    } else {
        hint_lines.len() as u16 + 2
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(4),
            Constraint::Length(hint_height),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(Line::from(vec![
        Span::styled(view.simulation.title.clone(), accent()),
        Span::styled(format!("  {}", step_label(step_idx, count)), dim()),
    ]))
    .render(chunks[0], buf);

    Gauge::default()
        .gauge_style(Style::default().fg(Color::Green))
        .percent(progress_percent(step_idx, count))
        .render(chunks[1], buf);

    let mut lines = Vec::new();
    if let Some(step) = view.current_step() {
        lines.push(Line::from(Span::styled(step.title.clone(), bold())));
        lines.push(Line::default());
        lines.extend(markdown_lines(&step.description));
        lines.push(Line::default());
    }
    lines.extend(step_body(view));

    Paragraph::new(lines)
        .block(Block::default().borders(Borders::TOP))
        .wrap(Wrap { trim: false })
        .render(chunks[2], buf);

    if !hint_lines.is_empty() {
        Paragraph::new(hint_lines)
            .block(Block::default().borders(Borders::ALL).title("Hint"))
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);
    }

    render_legend(legend_for(view.engine.step()), chunks[4], buf);
}

pub fn render_complete(
    view: &SimulationView,
    message: Option<&str>,
    area: Rect,
    buf: &mut Buffer,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let mut lines = vec![Line::from(Span::styled(
        format!("{} complete!", view.simulation.title),
        success(),
    ))];
    if let Some(summary) = &view.summary {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled("What you learned", bold())));
        for title in &summary.learned {
            lines.push(Line::from(format!("  ✓ {title}")));
        }
        lines.push(Line::default());
        if let Some(address) = &summary.short_address {
            lines.push(Line::from(format!("practice wallet: {address}")));
        }
        lines.push(Line::from(Span::styled(
            format!("hints viewed: {}", summary.hints_viewed),
            dim(),
        )));
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(chunks[0], buf);
    render_message(message, chunks[1], buf);
    render_legend("(r)estart · enter/esc back", chunks[2], buf);
}

pub fn render_coming_soon(view: &SimulationView, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let mut lines = vec![
        Line::from(Span::styled(view.simulation.title.clone(), accent())),
        Line::default(),
        Line::from(Span::styled("Coming soon", bold())),
        Line::from(Span::styled(
            format!(
                "'{}' simulations are not interactive yet.",
                view.simulation.component_type
            ),
            dim(),
        )),
    ];
    if !view.steps.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from("Planned steps:"));
        for (idx, step) in view.steps.iter().enumerate() {
            lines.push(Line::from(format!("  {}. {}", idx + 1, step.title)));
        }
    }

    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(chunks[0], buf);
    render_legend("enter/esc back", chunks[1], buf);
}
