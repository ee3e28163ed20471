use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{info, warn};

use crate::config::Config;
use crate::content::{QuizDefinition, Simulation};
use crate::error::{Error, Result};
use crate::history::{QuizAttempt, SimulationRun};
use crate::quiz::{QuizPhase, QuizSession};
use crate::scoring::{summarize_simulation, CompletionSummary};
use crate::simulation::{Transition, WalletSimulation, WalletStep, OPTION_POOL_SIZE, VERIFY_POSITIONS};
use crate::steps::{steps_for, SimulationKind, StepDefinition};
use crate::store::ContentSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Home,
    Quiz,
    QuizResult,
    Simulation,
    SimulationComplete,
    /// simulation whose component type has no engine yet
    ComingSoon,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HomeEntry {
    Quiz(String),
    Simulation(String),
}

#[derive(Debug, Default)]
pub struct HomeMenu {
    pub quizzes: Vec<QuizDefinition>,
    pub simulations: Vec<Simulation>,
    pub cursor: usize,
}

impl HomeMenu {
    /// Quizzes first, then simulations, in store order
    pub fn entries(&self) -> Vec<HomeEntry> {
        self.quizzes
            .iter()
            .map(|q| HomeEntry::Quiz(q.slug.clone()))
            .chain(
                self.simulations
                    .iter()
                    .map(|s| HomeEntry::Simulation(s.slug.clone())),
            )
            .collect()
    }

    pub fn len(&self) -> usize {
        self.quizzes.len() + self.simulations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn selected(&self) -> Option<HomeEntry> {
        self.entries().into_iter().nth(self.cursor)
    }
}

#[derive(Debug)]
pub struct QuizView {
    pub session: QuizSession,
    pub cursor: usize,
    recorded: bool,
}

impl QuizView {
    fn new(quiz: QuizDefinition) -> Self {
        Self {
            session: QuizSession::new(quiz),
            cursor: 0,
            recorded: false,
        }
    }

    /// Cursor follows the stored answer when moving between questions
    fn sync_cursor(&mut self) {
        let selected = self.session.selected().map(str::to_string);
        self.cursor = self
            .session
            .current_question()
            .and_then(|q| {
                selected.and_then(|id| q.options.iter().position(|o| o.id == id))
            })
            .unwrap_or(0);
    }
}

#[derive(Debug)]
pub struct SimulationView {
    pub simulation: Simulation,
    pub kind: Option<SimulationKind>,
    pub steps: Vec<StepDefinition>,
    pub engine: WalletSimulation,
    /// which verify position the number keys fill
    pub verify_slot: usize,
    pub last_transition: Option<Transition>,
    pub summary: Option<CompletionSummary>,
}

impl SimulationView {
    pub fn current_step(&self) -> Option<&StepDefinition> {
        self.steps.get(self.engine.session.current_step)
    }
}

/// Everything the TUI shows, plus the store it reads from
pub struct App {
    pub store: Box<dyn ContentSource>,
    pub config: Config,
    pub state: AppState,
    pub home: HomeMenu,
    pub quiz: Option<QuizView>,
    pub simulation: Option<SimulationView>,
    pub message: Option<String>,
    pub should_quit: bool,
    /// started from `quiz`/`simulate`: leaving the run quits instead of going home
    pub direct: bool,
    seed: Option<u64>,
}

impl App {
    pub fn new(store: Box<dyn ContentSource>, config: Config) -> Self {
        Self {
            store,
            config,
            state: AppState::Home,
            home: HomeMenu::default(),
            quiz: None,
            simulation: None,
            message: None,
            should_quit: false,
            direct: false,
            seed: None,
        }
    }

    /// Fixed seed for generated wallets and shuffles
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn load_home(&mut self) -> Result<()> {
        self.home.quizzes = self.store.fetch_quizzes(self.config.default_quiz_kind)?;
        self.home.simulations = self.store.fetch_simulations()?;
        self.home.cursor = self.home.cursor.min(self.home.len().saturating_sub(1));
        self.state = AppState::Home;
        self.quiz = None;
        self.simulation = None;
        Ok(())
    }

    pub fn open_quiz(&mut self, slug: &str) -> Result<()> {
        let quiz = self
            .store
            .fetch_quiz_by_slug(slug)?
            .ok_or_else(|| Error::not_found("quiz", slug))?;
        info!(quiz = %quiz.slug, questions = quiz.question_count(), "quiz started");
        self.quiz = Some(QuizView::new(quiz));
        self.state = AppState::Quiz;
        self.message = None;
        self.after_quiz_change();
        Ok(())
    }

    pub fn open_simulation(&mut self, slug: &str) -> Result<()> {
        let simulation = self
            .store
            .fetch_simulation_by_slug(slug)?
            .ok_or_else(|| Error::not_found("simulation", slug))?;
        let kind = SimulationKind::resolve(&simulation);
        let stored = self.store.fetch_simulation_steps(&simulation.id)?;
        let mut steps = steps_for(&simulation, stored);

        if kind == Some(SimulationKind::WalletCreation) && steps.len() != WalletStep::COUNT {
            warn!(
                slug = %simulation.slug,
                stored = steps.len(),
                "stored steps don't fit the wallet walkthrough, using built-in steps"
            );
            steps = SimulationKind::WalletCreation.step_metadata();
        }

        let engine = match self.seed {
            Some(seed) => WalletSimulation::with_seed(seed),
            None => WalletSimulation::new(),
        };
        info!(simulation = %simulation.slug, kind = ?kind, "simulation started");

        self.state = if kind.is_some() {
            AppState::Simulation
        } else {
            AppState::ComingSoon
        };
        self.simulation = Some(SimulationView {
            simulation,
            kind,
            steps,
            engine,
            verify_slot: 0,
            last_transition: None,
            summary: None,
        });
        self.message = None;
        self.apply_hint_preference();
        Ok(())
    }

    fn leave_run(&mut self) {
        if self.direct {
            self.should_quit = true;
            return;
        }
        if let Err(e) = self.load_home() {
            self.message = Some(e.to_string());
        }
    }

    fn open_selected(&mut self) {
        let opened = match self.home.selected() {
            Some(HomeEntry::Quiz(slug)) => self.open_quiz(&slug),
            Some(HomeEntry::Simulation(slug)) => self.open_simulation(&slug),
            None => Ok(()),
        };
        if let Err(e) = opened {
            self.message = Some(e.to_string());
        }
    }

    /// Returns false once the app should exit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return false;
        }

        match self.state {
            AppState::Home => self.home_key(key),
            AppState::Quiz | AppState::QuizResult => self.quiz_key(key),
            AppState::Simulation | AppState::SimulationComplete | AppState::ComingSoon => {
                self.simulation_key(key)
            }
        }
        !self.should_quit
    }

    fn home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up => self.home.cursor = self.home.cursor.saturating_sub(1),
            KeyCode::Down => {
                if self.home.cursor + 1 < self.home.len() {
                    self.home.cursor += 1;
                }
            }
            KeyCode::Enter => self.open_selected(),
            _ => {}
        }
    }

    fn quiz_key(&mut self, key: KeyEvent) {
        let Some(view) = self.quiz.as_mut() else {
            return;
        };

        if self.state == AppState::QuizResult {
            match key.code {
                KeyCode::Char('r') => {
                    view.session.retake();
                    view.recorded = false;
                    view.cursor = 0;
                    self.after_quiz_change();
                }
                KeyCode::Char('n') | KeyCode::Esc => self.leave_run(),
                _ => {}
            }
            return;
        }

        let option_count = view
            .session
            .current_question()
            .map(|q| q.options.len())
            .unwrap_or(0);

        match key.code {
            KeyCode::Esc => self.leave_run(),
            KeyCode::Up => view.cursor = view.cursor.saturating_sub(1),
            KeyCode::Down => {
                if view.cursor + 1 < option_count {
                    view.cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                select_at_cursor(view);
            }
            KeyCode::Enter => {
                select_at_cursor(view);
                if view.session.next() {
                    view.sync_cursor();
                }
                self.after_quiz_change();
            }
            KeyCode::Left => {
                if view.session.back() {
                    view.sync_cursor();
                }
            }
            _ => {}
        }
    }

    /// Moves to the result screen and records the attempt once per pass
    fn after_quiz_change(&mut self) {
        let Some(view) = self.quiz.as_mut() else {
            return;
        };
        let QuizPhase::Result(outcome) = &view.session.phase else {
            self.state = AppState::Quiz;
            return;
        };
        self.state = AppState::QuizResult;
        if view.recorded {
            return;
        }
        view.recorded = true;
        let attempt = QuizAttempt::from_outcome(&view.session.quiz.slug, outcome);
        if let Err(e) = self.store.record_quiz_attempt(&attempt) {
            warn!(error = %e, "could not record quiz attempt");
            self.message = Some(e.to_string());
        }
    }

    fn simulation_key(&mut self, key: KeyEvent) {
        let Some(view) = self.simulation.as_mut() else {
            return;
        };

        if matches!(self.state, AppState::ComingSoon | AppState::SimulationComplete) {
            match key.code {
                KeyCode::Char('r') if self.state == AppState::SimulationComplete => {
                    view.engine.restart();
                    view.summary = None;
                    view.verify_slot = 0;
                    self.state = AppState::Simulation;
                    self.apply_hint_preference();
                }
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char('n') => self.leave_run(),
                _ => {}
            }
            return;
        }

        let transition = match key.code {
            KeyCode::Esc => {
                self.leave_run();
                return;
            }
            KeyCode::Enter => view.engine.primary_action(),
            KeyCode::Char('h') => {
                view.engine.toggle_hint();
                Transition::Updated
            }
            KeyCode::Char('s') => view.engine.toggle_phrase(),
            KeyCode::Char('c') => view.engine.copy_address(),
            KeyCode::Char('r') => {
                view.engine.restart();
                view.verify_slot = 0;
                Transition::Updated
            }
            KeyCode::Left => {
                view.verify_slot = (view.verify_slot + VERIFY_POSITIONS.len() - 1)
                    % VERIFY_POSITIONS.len();
                Transition::Updated
            }
            KeyCode::Right => {
                view.verify_slot = (view.verify_slot + 1) % VERIFY_POSITIONS.len();
                Transition::Updated
            }
            KeyCode::Char(c @ '1'..='6') => {
                let pool_idx = (c as usize) - ('1' as usize);
                debug_assert!(pool_idx < OPTION_POOL_SIZE);
                let t = view.engine.select_word(view.verify_slot, pool_idx);
                if t == Transition::Updated && view.verify_slot + 1 < VERIFY_POSITIONS.len() {
                    view.verify_slot += 1;
                }
                t
            }
            _ => Transition::Ignored,
        };
        self.after_transition(transition);
    }

    fn after_transition(&mut self, transition: Transition) {
        let Some(view) = self.simulation.as_mut() else {
            return;
        };
        if transition != Transition::Ignored {
            view.last_transition = Some(transition);
        }
        match transition {
            Transition::Advanced(step) => {
                if step == WalletStep::Verify {
                    view.verify_slot = 0;
                }
                self.apply_hint_preference();
            }
            Transition::Finished => self.finish_simulation(),
            _ => {}
        }
    }

    fn finish_simulation(&mut self) {
        let Some(view) = self.simulation.as_mut() else {
            return;
        };
        let hints_viewed = view.engine.session.hints_viewed.len();
        view.summary = Some(summarize_simulation(
            &view.simulation.title,
            &view.steps,
            hints_viewed,
            view.engine.wallet(),
        ));
        self.state = AppState::SimulationComplete;

        let run = SimulationRun::new(&view.simulation.slug, hints_viewed);
        if let Err(e) = self.store.record_simulation_run(&run) {
            warn!(error = %e, "could not record simulation run");
            self.message = Some(e.to_string());
        }
    }

    /// `show_hints` opens the hint panel on every new step
    fn apply_hint_preference(&mut self) {
        if !self.config.show_hints {
            return;
        }
        if let Some(view) = self.simulation.as_mut() {
            let has_hints = view.current_step().is_some_and(|s| s.has_hints());
            if has_hints && !view.engine.hint_visible {
                view.engine.toggle_hint();
            }
        }
    }

    pub fn on_tick(&mut self, elapsed: Duration) {
        if self.state != AppState::Simulation {
            return;
        }
        let Some(view) = self.simulation.as_mut() else {
            return;
        };
        if !view.engine.is_pending() {
            return;
        }
        let transition = view.engine.on_tick(elapsed);
        self.after_transition(transition);
    }

    /// True while a delayed transition needs redraws on ticks
    pub fn is_animating(&self) -> bool {
        self.state == AppState::Simulation
            && self
                .simulation
                .as_ref()
                .is_some_and(|v| v.engine.is_pending())
    }
}

fn select_at_cursor(view: &mut QuizView) -> bool {
    let option_id = view
        .session
        .current_question()
        .and_then(|q| q.options.get(view.cursor))
        .map(|o| o.id.clone());
    match option_id {
        Some(id) => view.session.select(&id),
        None => false,
    }
}
