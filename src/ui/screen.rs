use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, AppState};
use crate::ui::{home, quiz, simulation};

/// A UI Screen boundary: renders one app state
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

pub struct HomeScreen;

impl Screen for HomeScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        home::render_home(app, area, buf);
    }
}

pub struct QuizScreen;

impl Screen for QuizScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if let Some(view) = &app.quiz {
            quiz::render_question(view, area, buf);
        }
    }
}

pub struct QuizResultScreen;

impl Screen for QuizResultScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if let Some(view) = &app.quiz {
            quiz::render_result(view, app.message.as_deref(), area, buf);
        }
    }
}

pub struct SimulationScreen;

impl Screen for SimulationScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if let Some(view) = &app.simulation {
            simulation::render_step(view, area, buf);
        }
    }
}

pub struct SimulationCompleteScreen;

impl Screen for SimulationCompleteScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if let Some(view) = &app.simulation {
            simulation::render_complete(view, app.message.as_deref(), area, buf);
        }
    }
}

pub struct ComingSoonScreen;

impl Screen for ComingSoonScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        if let Some(view) = &app.simulation {
            simulation::render_coming_soon(view, area, buf);
        }
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Home => Box::new(HomeScreen),
        AppState::Quiz => Box::new(QuizScreen),
        AppState::QuizResult => Box::new(QuizResultScreen),
        AppState::Simulation => Box::new(SimulationScreen),
        AppState::SimulationComplete => Box::new(SimulationCompleteScreen),
        AppState::ComingSoon => Box::new(ComingSoonScreen),
    }
}
