use thiserror::Error;

/// Errors surfaced by the content store, importers and the admin gate.
///
/// None of these are fatal to a running session: the TUI shows them as a
/// message and the CLI maps them to an exit status.
#[derive(Debug, Error)]
pub enum Error {
    #[error("content store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("{kind} '{slug}' not found")]
    NotFound { kind: &'static str, slug: String },

    #[error("invalid content: {0}")]
    Validation(String),

    #[error("admin mode required, run `web3setgo admin login` first")]
    AdminRequired,
}

impl Error {
    pub fn not_found(kind: &'static str, slug: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            slug: slug.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_kind_and_slug() {
        let err = Error::not_found("quiz", "bull-or-bear");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "quiz 'bull-or-bear' not found");
    }

    #[test]
    fn json_errors_convert() {
        let parse = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err: Error = parse.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(!err.is_not_found());
    }
}
