use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use validator::Validate;

use crate::core::client::token_store::{FileTokenStore, StaticTokenStore, TokenStore};
use crate::errors::{ClientResult, LogViewerError};

pub const DEFAULT_BASE_URL: &str = "http://localhost:9000";
pub const DEFAULT_DEPLOYMENT_ROOT: &str = "/api";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Client settings, read from `LOGVIEWER_*` environment variables.
#[derive(Debug, Clone, Validate)]
pub struct ClientConfig {
    /// Scheme and authority of the log server.
    #[validate(url)]
    pub base_url: String,
    /// Path prefix every request is rooted at.
    pub deployment_root: String,
    /// Bearer token; takes precedence over `token_file`.
    pub token: Option<String>,
    pub token_file: Option<PathBuf>,
    #[validate(range(min = 100, max = 3_600_000))]
    pub poll_interval_ms: u64,
    #[validate(range(min = 100))]
    pub request_timeout_ms: u64,
    pub log_level: String,
    /// Enables a daily rolling log file in this directory.
    pub log_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            deployment_root: DEFAULT_DEPLOYMENT_ROOT.into(),
            token: None,
            token_file: None,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            log_level: "info".into(),
            log_dir: None,
        }
    }
}

impl ClientConfig {
    /// Loads `.env` (if any) and then the process environment.
    pub fn from_env() -> ClientResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ClientResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("LOGVIEWER_BASE_URL") {
            cfg.base_url = v;
        }
        if let Some(v) = get("LOGVIEWER_DEPLOYMENT_ROOT") {
            cfg.deployment_root = v;
        }
        cfg.token = get("LOGVIEWER_TOKEN");
        cfg.token_file = get("LOGVIEWER_TOKEN_FILE").map(PathBuf::from);
        if let Some(v) = get("LOGVIEWER_POLL_INTERVAL_MS") {
            cfg.poll_interval_ms = parse_number("LOGVIEWER_POLL_INTERVAL_MS", &v)?;
        }
        if let Some(v) = get("LOGVIEWER_REQUEST_TIMEOUT_MS") {
            cfg.request_timeout_ms = parse_number("LOGVIEWER_REQUEST_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = get("LOGVIEWER_LOG_LEVEL") {
            cfg.log_level = v;
        }
        cfg.log_dir = get("LOGVIEWER_LOG_DIR").map(PathBuf::from);

        Ok(cfg)
    }

    pub fn validated(self) -> ClientResult<Self> {
        self.validate()
            .map_err(|e| LogViewerError::InvalidConfig(e.to_string()))?;
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn token_store(&self) -> Arc<dyn TokenStore> {
        match (&self.token, &self.token_file) {
            (Some(token), _) => Arc::new(StaticTokenStore::new(Some(token.clone()))),
            (None, Some(path)) => Arc::new(FileTokenStore::new(path.clone())),
            (None, None) => Arc::new(StaticTokenStore::default()),
        }
    }
}

fn parse_number(key: &str, raw: &str) -> ClientResult<u64> {
    raw.parse()
        .map_err(|_| LogViewerError::InvalidConfig(format!("{} must be a number, got '{}'", key, raw)))
}
