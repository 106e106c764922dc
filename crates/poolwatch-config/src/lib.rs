//! Configuration and session persistence for poolwatch.
//!
//! TOML settings with `POOLWATCH_*` environment overrides, resolved
//! through platform config directories, plus the file-backed
//! [`SessionStore`](poolwatch_core::SessionStore) implementation that
//! lets a restarted process resume its session.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use poolwatch_api::transport::TransportConfig;
use poolwatch_core::{CoreError, PersistedSession, SessionStore};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Top-level TOML settings.
///
/// Every field can be overridden with a `POOLWATCH_*` environment
/// variable (e.g. `POOLWATCH_API_BASE_URL`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Backend base URL; `/api/...` is appended by the client.
    pub api_base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Dashboard auto-refresh period in seconds.
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Where the persisted session lives. Defaults to the platform
    /// data dir.
    pub session_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".into(),
            timeout_secs: default_timeout_secs(),
            refresh_interval_secs: default_refresh_interval_secs(),
            session_file: None,
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}
fn default_refresh_interval_secs() -> u64 {
    30
}

impl Settings {
    /// Load settings from the canonical config file and environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_path())
    }

    /// Load settings from an explicit TOML path (missing file is fine)
    /// plus `POOLWATCH_*` environment overrides.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let figment = Figment::new()
            .merge(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed("POOLWATCH_"));

        let settings: Self = figment.extract()?;
        Ok(settings)
    }

    /// The backend base URL, validated.
    pub fn base_url(&self) -> Result<url::Url, ConfigError> {
        self.api_base_url
            .parse()
            .map_err(|_| ConfigError::Validation {
                field: "api_base_url".into(),
                reason: format!("invalid URL: {}", self.api_base_url),
            })
    }

    /// Bridge to the HTTP adapter's transport settings.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    /// Resolved session file path: explicit setting or the platform
    /// data dir default.
    pub fn session_path(&self) -> PathBuf {
        self.session_file.clone().unwrap_or_else(session_path)
    }

    /// Write the settings back out as TOML, creating parent dirs.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let rendered = toml::to_string_pretty(self)?;
        std::fs::write(path, rendered)?;
        Ok(())
    }
}

// ── Paths ───────────────────────────────────────────────────────────

/// Canonical config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "poolwatch", "poolwatch").map_or_else(
        || dirs_fallback().join("poolwatch.toml"),
        |dirs| dirs.config_dir().join("poolwatch.toml"),
    )
}

/// Default persisted-session path.
pub fn session_path() -> PathBuf {
    ProjectDirs::from("com", "poolwatch", "poolwatch").map_or_else(
        || dirs_fallback().join("session.json"),
        |dirs| dirs.data_dir().join("session.json"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("poolwatch");
    p
}

// ── FileSessionStore ────────────────────────────────────────────────

/// JSON-file-backed [`SessionStore`].
///
/// A file that exists but fails to parse is treated as absent: the
/// contents are discarded with a warning rather than failing startup.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<PersistedSession>, CoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CoreError::Persistence(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding corrupt session file");
                let _ = std::fs::remove_file(&self.path);
                Ok(None)
            }
        }
    }

    fn save(&self, session: &PersistedSession) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoreError::Persistence(format!("failed to create {}: {e}", parent.display()))
            })?;
        }
        let raw = serde_json::to_string_pretty(session)
            .map_err(|e| CoreError::Persistence(format!("failed to serialize session: {e}")))?;
        std::fs::write(&self.path, raw).map_err(|e| {
            CoreError::Persistence(format!("failed to write {}: {e}", self.path.display()))
        })
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Persistence(format!(
                "failed to remove {}: {e}",
                self.path.display()
            ))),
        }
    }
}
