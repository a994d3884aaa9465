//! Board configuration loaded with Figment.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. `kanban-grid.{toml,yaml,yml,json}` in the given directory, if present
//! 3. Environment variables prefixed `KANBAN_GRID_` (e.g. `KANBAN_GRID_RETRY_ATTEMPTS`)

use crate::error::{KanbanError, Result};
use figment::{
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, trace};
use url::Url;

/// Base name of the config file, without extension
pub const CONFIG_FILE_STEM: &str = "kanban-grid";

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "KANBAN_GRID_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    /// Root of the REST API; endpoint paths are appended to it
    pub api_base_url: String,
    /// Attempts per fetch (1 = no retry). Mutating calls are sent once.
    pub retry_attempts: u32,
    pub request_timeout_ms: u64,
    /// Attributed in the activity log
    pub actor: Option<String>,
    /// `tracing` filter used when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api/".to_string(),
            retry_attempts: 3,
            request_timeout_ms: 10_000,
            actor: None,
            log_filter: "info".to_string(),
        }
    }
}

impl BoardConfig {
    /// Load from defaults, an optional config file in `dir`, and the environment
    pub fn load(dir: Option<&Path>) -> Result<Self> {
        Self::from_figment(Self::figment(dir))
    }

    /// The merged source stack, before extraction
    pub fn figment(dir: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(BoardConfig::default()));

        if let Some(dir) = dir {
            let toml = dir.join(format!("{CONFIG_FILE_STEM}.toml"));
            let yaml = dir.join(format!("{CONFIG_FILE_STEM}.yaml"));
            let yml = dir.join(format!("{CONFIG_FILE_STEM}.yml"));
            let json = dir.join(format!("{CONFIG_FILE_STEM}.json"));
            trace!(dir = %dir.display(), "looking for config files");
            figment = figment
                .merge(Toml::file(toml))
                .merge(Yaml::file(yaml))
                .merge(Yaml::file(yml))
                .merge(Json::file(json));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: BoardConfig = figment.extract()?;
        config.validate()?;
        debug!(api = %config.api_base_url, retries = config.retry_attempts, "loaded board config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry_attempts == 0 {
            return Err(KanbanError::invalid_value(
                "retry_attempts",
                "must be at least 1",
            ));
        }
        let url = self.base_url()?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(KanbanError::invalid_value(
                "api_base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        Ok(())
    }

    /// Parsed base URL, always ending in `/` so paths join below it
    pub fn base_url(&self) -> Result<Url> {
        let mut raw = self.api_base_url.trim().to_string();
        if !raw.ends_with('/') {
            raw.push('/');
        }
        Url::parse(&raw).map_err(|e| KanbanError::invalid_value("api_base_url", e.to_string()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
