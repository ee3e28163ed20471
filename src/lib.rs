// Library surface for headless/integration tests and reuse.
// main.rs only parses arguments and owns the terminal.
pub mod admin;
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod content;
pub mod error;
pub mod history;
pub mod logging;
pub mod quiz;
pub mod runtime;
pub mod scoring;
pub mod session;
pub mod simulation;
pub mod steps;
pub mod store;
pub mod ui;
pub mod util;
pub mod wallet;

pub use app::{App, AppState};
pub use error::{Error, Result};

/// Default redraw/timer resolution
pub const TICK_RATE_MS: u64 = 100;
