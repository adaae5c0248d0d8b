use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{ChatError, Result};

/// Top-level configuration for the Passage application.
///
/// Loaded from `~/.passage/config.toml` by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PassageConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub suggestions: SuggestionsConfig,
}

impl PassageConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: PassageConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| ChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Check a log level against the known set (trace, debug, info, warn,
/// error; case-insensitive). Anything else falls back to "info".
pub fn validate_log_level(level: &str) -> String {
    let lower = level.to_ascii_lowercase();
    match lower.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => lower,
        _ => {
            warn!(requested = %level, "Unknown log level, using info");
            "info".to_string()
        }
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Answering backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Prediction endpoint of the answering service.
    pub endpoint: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000/api/v1/prediction/default".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Follow-up suggestion service settings. Disabled by default; only one
/// deployment runs the collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionsConfig {
    pub enabled: bool,
    /// Endpoint of the suggestion service, when enabled.
    pub endpoint: String,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: String::new(),
        }
    }
}
