use std::fs;
use std::path::PathBuf;

use tracing::debug;

/// Source of the bearer token attached to every request.
pub trait TokenStore: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// Token fixed at startup (e.g. from `LOGVIEWER_TOKEN`).
#[derive(Debug, Clone, Default)]
pub struct StaticTokenStore {
    token: Option<String>,
}

impl StaticTokenStore {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
        }
    }
}

impl TokenStore for StaticTokenStore {
    fn token(&self) -> Option<String> {
        self.token.clone()
    }
}

/// Token kept in a file, re-read on every request.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        match fs::read_to_string(&self.path) {
            Ok(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "token file not readable");
                None
            }
        }
    }
}
