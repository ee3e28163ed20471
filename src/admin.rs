use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{info, warn};

use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};
use crate::store::ContentStore;

pub const SESSION_HOURS: i64 = 24;

/// Lowercase hex SHA-256 of `password`
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

#[derive(Debug, Serialize, Deserialize)]
struct AdminSession {
    timestamp: DateTime<Local>,
}

/// Local "admin mode" switch: a password check plus a session file that expires.
/// Anyone with access to the database can bypass it.
#[derive(Debug, Clone)]
pub struct AdminGate {
    session_path: PathBuf,
}

impl Default for AdminGate {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminGate {
    pub fn new() -> Self {
        let session_path =
            AppDirs::admin_session_path().unwrap_or_else(|| PathBuf::from("admin_session.json"));
        Self { session_path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            session_path: p.as_ref().to_path_buf(),
        }
    }

    /// Writes a session on success; no stored hash means nobody can log in
    pub fn login(&self, store: &ContentStore, password: &str) -> Result<bool> {
        let Some(stored) = store.admin_password_hash()? else {
            warn!("admin login attempted but no password is set");
            return Ok(false);
        };
        if hash_password(password) != stored {
            info!(success = false, "admin login");
            return Ok(false);
        }
        self.write_session(Local::now())?;
        info!(success = true, "admin login");
        Ok(true)
    }

    fn write_session(&self, at: DateTime<Local>) -> Result<()> {
        if let Some(parent) = self.session_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let session = AdminSession { timestamp: at };
        fs::write(&self.session_path, serde_json::to_string(&session)?)?;
        Ok(())
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin_at(Local::now())
    }

    /// Expired or unreadable session files are removed
    pub fn is_admin_at(&self, now: DateTime<Local>) -> bool {
        let Ok(contents) = fs::read_to_string(&self.session_path) else {
            return false;
        };
        let valid = serde_json::from_str::<AdminSession>(&contents)
            .map(|s| now.signed_duration_since(s.timestamp) < Duration::hours(SESSION_HOURS))
            .unwrap_or(false);
        if !valid {
            let _ = fs::remove_file(&self.session_path);
        }
        valid
    }

    pub fn logout(&self) -> Result<()> {
        match fs::remove_file(&self.session_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn require(&self) -> Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(Error::AdminRequired)
        }
    }

    /// First password may be set without a session; changing it needs one
    pub fn set_password(&self, store: &ContentStore, password: &str) -> Result<()> {
        if store.admin_password_hash()?.is_some() {
            self.require()?;
        }
        if password.trim().is_empty() {
            return Err(Error::Validation("password is empty".into()));
        }
        store.set_admin_password(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tempfile::TempDir;

    fn setup() -> (TempDir, AdminGate, ContentStore) {
        let dir = TempDir::new().unwrap();
        let gate = AdminGate::with_path(dir.path().join("session.json"));
        let store = ContentStore::open_in_memory().unwrap();
        (dir, gate, store)
    }

    #[test]
    fn test_hash_is_lowercase_hex_sha256() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_login_without_hash_fails() {
        let (_dir, gate, store) = setup();
        assert!(!gate.login(&store, "anything").unwrap());
        assert!(!gate.is_admin());
    }

    #[test]
    fn test_login_logout() {
        let (_dir, gate, store) = setup();
        gate.set_password(&store, "correct horse").unwrap();

        assert!(!gate.login(&store, "wrong").unwrap());
        assert!(!gate.is_admin());
        assert_matches!(gate.require(), Err(Error::AdminRequired));

        assert!(gate.login(&store, "correct horse").unwrap());
        assert!(gate.is_admin());
        assert!(gate.require().is_ok());

        gate.logout().unwrap();
        assert!(!gate.is_admin());
        gate.logout().unwrap();
    }

    #[test]
    fn test_session_expires_after_a_day() {
        let (_dir, gate, _store) = setup();
        let start = Local::now();
        gate.write_session(start).unwrap();

        assert!(gate.is_admin_at(start + Duration::hours(23)));
        assert!(!gate.is_admin_at(start + Duration::hours(25)));
        // expired file was removed
        assert!(!gate.session_path.exists());
    }

    #[test]
    fn test_malformed_session_is_removed() {
        let (_dir, gate, _store) = setup();
        fs::write(&gate.session_path, "not json").unwrap();
        assert!(!gate.is_admin());
        assert!(!gate.session_path.exists());
    }

    #[test]
    fn test_changing_password_needs_session() {
        let (_dir, gate, store) = setup();
        gate.set_password(&store, "first").unwrap();
        assert_matches!(
            gate.set_password(&store, "second"),
            Err(Error::AdminRequired)
        );
        gate.login(&store, "first").unwrap();
        gate.set_password(&store, "second").unwrap();
        assert!(gate.login(&store, "second").unwrap());
    }
}
