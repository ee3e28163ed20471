use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

/// Environment variable holding the tracing filter directive
pub const LOG_ENV: &str = "WEB3SETGO_LOG";

/// Install a file-backed subscriber.
///
/// The TUI owns the terminal, so events never go to stdout/stderr. Returns
/// false when the log file cannot be opened; the app keeps running unlogged.
pub fn init(log_path: &Path) -> bool {
    if let Some(parent) = log_path.parent() {
        if fs::create_dir_all(parent).is_err() {
            return false;
        }
    }

    let file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .is_ok()
}
