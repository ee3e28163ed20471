use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "web3setgo";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// State directory under $HOME/.local/state, falling back to the platform data dir
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn db_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("content.db"))
    }

    pub fn log_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("web3setgo.log"))
    }

    pub fn admin_session_path() -> Option<PathBuf> {
        Self::state_dir().map(|dir| dir.join("admin_session.json"))
    }

    pub fn config_path() -> PathBuf {
        if let Some(pd) = ProjectDirs::from("", "", APP_NAME) {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("web3setgo_config.json")
        }
    }
}
