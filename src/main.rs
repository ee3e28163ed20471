use std::{
    fs,
    io::{self, stdin, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
};

use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info, warn};

use web3setgo::{
    admin::AdminGate,
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    content::QuizKind,
    history::{attempt_lines, export_attempts_csv, run_lines},
    logging,
    runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner},
    steps::SimulationKind,
    store::{ContentSource, ContentStore},
    ui, App, Error, Result,
};

const HISTORY_LIMIT: usize = 20;

/// practice web3 safely: guided simulations, quizzes and short reads in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Walk through creating a practice wallet, take knowledge and personality quizzes, and read beginner articles. Nothing touches a real network."
)]
pub struct Cli {
    /// content database to use instead of the configured one
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// take a quiz
    Quiz { slug: String },
    /// run a simulation
    Simulate { slug: String },
    /// list published content
    List {
        #[clap(subcommand)]
        target: ListTarget,
    },
    /// print an article
    Read { slug: String },
    /// recent quiz attempts and simulation runs
    History {
        /// write quiz attempts to stdout in the given format
        #[clap(long, value_enum)]
        export: Option<ExportFormat>,

        #[clap(long, default_value_t = HISTORY_LIMIT)]
        limit: usize,
    },
    /// manage content (requires `admin login`)
    Admin {
        #[clap(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum ListTarget {
    Quizzes {
        #[clap(long, value_parser = parse_kind)]
        kind: Option<QuizKind>,
    },
    Simulations,
    Blogs,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum AdminAction {
    /// start a 24h admin session; prompts when no password is given
    Login { password: Option<String> },
    Logout,
    /// set the admin password; changing an existing one needs a session
    SetPassword { password: Option<String> },
    ImportQuiz { file: PathBuf },
    DeleteQuiz { slug: String },
    ImportBlog { file: PathBuf },
    DeleteBlog { slug: String },
    ImportSimulation { file: PathBuf },
    DeleteSimulation { slug: String },
    /// replace a simulation's steps with a JSON array of steps
    ImportSteps { slug: String, file: PathBuf },
    /// put a simulation's steps in the given id order
    ReorderSteps {
        slug: String,
        #[clap(required = true)]
        ids: Vec<String>,
    },
}

#[derive(Debug, Copy, Clone, ValueEnum, PartialEq, Eq)]
enum ExportFormat {
    Csv,
}

fn parse_kind(s: &str) -> std::result::Result<QuizKind, String> {
    QuizKind::parse(s).ok_or_else(|| format!("unknown quiz kind '{s}' (knowledge, personality)"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_path) = AppDirs::log_path() {
        logging::init(&log_path);
    }
    let config = FileConfigStore::new().load();

    match run(cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if e.is_not_found() {
                warn!(error = %e, "lookup failed");
            } else {
                error!(error = %e, "command failed");
            }
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: Config) -> Result<()> {
    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| config.resolved_database_path());
    let mut store = ContentStore::open(&db_path)?;
    info!(db = %db_path.display(), "content store opened");

    match cli.command {
        None => {
            let mut app = App::new(Box::new(store), config);
            app.load_home()?;
            run_tui(app)
        }
        Some(Command::Quiz { slug }) => {
            let mut app = App::new(Box::new(store), config);
            app.open_quiz(&slug)?;
            app.direct = true;
            run_tui(app)
        }
        Some(Command::Simulate { slug }) => {
            let mut app = App::new(Box::new(store), config);
            app.open_simulation(&slug)?;
            app.direct = true;
            run_tui(app)
        }
        Some(Command::List { target }) => list(&store, target),
        Some(Command::Read { slug }) => read(&store, &slug),
        Some(Command::History { export, limit }) => history(&store, export, limit),
        Some(Command::Admin { action }) => admin(&mut store, &AdminGate::new(), action),
    }
}

fn list(store: &ContentStore, target: ListTarget) -> Result<()> {
    let mut out = io::stdout().lock();
    match target {
        ListTarget::Quizzes { kind } => {
            for quiz in store.fetch_quizzes(kind)? {
                writeln!(
                    out,
                    "{:<24} {:<36} {} · {} questions",
                    quiz.slug,
                    quiz.title,
                    quiz.kind,
                    quiz.question_count()
                )?;
            }
        }
        ListTarget::Simulations => {
            for sim in store.fetch_simulations()? {
                let status = if SimulationKind::resolve(&sim).is_some() {
                    sim.duration.clone()
                } else {
                    "coming soon".to_string()
                };
                writeln!(
                    out,
                    "{:<32} {:<36} {} · {}",
                    sim.slug, sim.title, sim.difficulty, status
                )?;
            }
        }
        ListTarget::Blogs => {
            for blog in store.fetch_blogs()? {
                writeln!(
                    out,
                    "{:<32} {:<40} {}",
                    blog.slug, blog.title, blog.read_time
                )?;
            }
        }
    }
    Ok(())
}

fn read(store: &ContentStore, slug: &str) -> Result<()> {
    let blog = store
        .fetch_blog_by_slug(slug)?
        .ok_or_else(|| Error::not_found("blog", slug))?;
    let mut out = io::stdout().lock();
    writeln!(out, "{}", blog.title)?;
    let meta = [&blog.category, &blog.difficulty, &blog.read_time]
        .into_iter()
        .filter(|s| !s.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" · ");
    if !meta.is_empty() {
        writeln!(out, "{meta}")?;
    }
    writeln!(out)?;
    writeln!(out, "{}", blog.content.trim_end())?;
    Ok(())
}

fn history(store: &ContentStore, export: Option<ExportFormat>, limit: usize) -> Result<()> {
    let attempts = store.recent_quiz_attempts(limit)?;
    if export == Some(ExportFormat::Csv) {
        return export_attempts_csv(&attempts, io::stdout().lock());
    }

    let runs = store.recent_simulation_runs(limit)?;
    let mut out = io::stdout().lock();
    writeln!(out, "Quiz attempts")?;
    if attempts.is_empty() {
        writeln!(out, "  none yet")?;
    }
    for line in attempt_lines(&attempts) {
        writeln!(out, "  {line}")?;
    }
    writeln!(out)?;
    writeln!(out, "Simulation runs")?;
    if runs.is_empty() {
        writeln!(out, "  none yet")?;
    }
    for line in run_lines(&runs) {
        writeln!(out, "  {line}")?;
    }
    Ok(())
}

fn prompt_password(given: Option<String>) -> Result<String> {
    if let Some(password) = given {
        return Ok(password);
    }
    eprint!("password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn admin(store: &mut ContentStore, gate: &AdminGate, action: AdminAction) -> Result<()> {
    match action {
        AdminAction::Login { password } => {
            let password = prompt_password(password)?;
            if gate.login(store, &password)? {
                println!("admin mode on for 24 hours");
                Ok(())
            } else {
                Err(Error::Validation("wrong password".into()))
            }
        }
        AdminAction::Logout => {
            gate.logout()?;
            println!("admin mode off");
            Ok(())
        }
        AdminAction::SetPassword { password } => {
            let password = prompt_password(password)?;
            gate.set_password(store, &password)?;
            println!("admin password updated");
            Ok(())
        }
        AdminAction::ImportQuiz { file } => {
            gate.require()?;
            let quiz = store.import_quiz(&fs::read_to_string(file)?)?;
            println!("imported quiz {}", quiz.slug);
            Ok(())
        }
        AdminAction::ImportBlog { file } => {
            gate.require()?;
            let blog = store.import_blog(&fs::read_to_string(file)?)?;
            println!("imported blog {}", blog.slug);
            Ok(())
        }
        AdminAction::ImportSimulation { file } => {
            gate.require()?;
            let sim = store.import_simulation(&fs::read_to_string(file)?)?;
            println!("imported simulation {}", sim.slug);
            Ok(())
        }
        AdminAction::ImportSteps { slug, file } => {
            gate.require()?;
            let steps = store.import_steps(&slug, &fs::read_to_string(file)?)?;
            println!("{slug} now has {} steps", steps.len());
            Ok(())
        }
        AdminAction::ReorderSteps { slug, ids } => {
            gate.require()?;
            store.reorder_steps_by_slug(&slug, &ids)?;
            println!("reordered {} steps of {slug}", ids.len());
            Ok(())
        }
        AdminAction::DeleteQuiz { slug } => {
            gate.require()?;
            deleted("quiz", &slug, store.delete_quiz(&slug)?)
        }
        AdminAction::DeleteBlog { slug } => {
            gate.require()?;
            deleted("blog", &slug, store.delete_blog(&slug)?)
        }
        AdminAction::DeleteSimulation { slug } => {
            gate.require()?;
            deleted("simulation", &slug, store.delete_simulation(&slug)?)
        }
    }
}

fn deleted(kind: &'static str, slug: &str, removed: bool) -> Result<()> {
    if !removed {
        return Err(Error::not_found(kind, slug));
    }
    println!("deleted {kind} {slug}");
    Ok(())
}

fn run_tui(mut app: App) -> Result<()> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::from_millis(app.config.tick_rate_ms),
    );

    terminal.draw(|f| ui::draw(app, f))?;
    loop {
        match runner.step() {
            AppEvent::Key(key) => {
                if !app.handle_key(key) {
                    break;
                }
                terminal.draw(|f| ui::draw(app, f))?;
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui::draw(app, f))?;
            }
            AppEvent::Tick(elapsed) => {
                // redraw while a countdown runs and once more when it lands
                let animating = app.is_animating();
                app.on_tick(elapsed);
                if animating {
                    terminal.draw(|f| ui::draw(app, f))?;
                }
            }
        }
    }
    Ok(())
}
