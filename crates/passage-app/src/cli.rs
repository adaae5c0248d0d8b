//! CLI argument definitions for the Passage application.
//!
//! Uses `clap` with derive macros for ergonomic argument parsing.
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Passage — chat with a document-grounded QA backend, citations included.
#[derive(Parser, Debug)]
#[command(name = "passage", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Prediction endpoint of the answering backend.
    #[arg(short = 'b', long = "backend-url")]
    pub backend_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level")]
    pub log_level: Option<String>,

    /// Name of the signed-in user. Without one the session is refused.
    #[arg(short = 'u', long = "user")]
    pub user: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > PASSAGE_CONFIG env var > ~/.passage/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("PASSAGE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend endpoint.
    ///
    /// Priority: --backend-url flag > PASSAGE_BACKEND env var > config file value.
    pub fn resolve_backend_url(&self, config_endpoint: &str) -> String {
        if let Some(ref url) = self.backend_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("PASSAGE_BACKEND") {
            return url;
        }
        config_endpoint.to_string()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > config file value.
    /// Returns `None` if not overridden.
    pub fn resolve_log_level(&self) -> Option<String> {
        self.log_level.clone()
    }

    /// Resolve the current user.
    ///
    /// Priority: --user flag > PASSAGE_USER env var. `None` means nobody is
    /// signed in and the application must not start a session.
    pub fn resolve_user(&self) -> Option<String> {
        if let Some(ref user) = self.user {
            return Some(user.clone());
        }
        std::env::var("PASSAGE_USER").ok()
    }
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".passage").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".passage").join("config.toml");
    }
    PathBuf::from("config.toml")
}
