//! Service configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use model_client::ModelConfig;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown analysis mode: {0} (expected online, offline or auto)")]
    InvalidMode(String),

    #[error("Unknown cluster strategy: {0} (expected primaries or valence)")]
    InvalidClusterStrategy(String),
}

/// Which pipeline analyses should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// Always call the remote model.
    Online,
    /// Never call the remote model.
    Offline,
    /// Remote iff an API key is configured.
    #[default]
    Auto,
}

impl FromStr for AnalysisMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "auto" => Ok(Self::Auto),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

/// How galaxies are formed from the final emotions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterStrategy {
    /// Primary-cluster catalog; unmapped labels are left out.
    #[default]
    Primaries,
    /// Negative / neutral / positive buckets.
    Valence,
}

impl FromStr for ClusterStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "primaries" => Ok(Self::Primaries),
            "valence" => Ok(Self::Valence),
            _ => Err(ConfigError::InvalidClusterStrategy(s.to_string())),
        }
    }
}

/// The pipeline chosen for an analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Remote,
    Local,
}

/// Configuration for [`crate::EmotionService`].
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub mode: AnalysisMode,
    pub clusters: ClusterStrategy,
    pub model: ModelConfig,
}

impl ServiceConfig {
    /// Offline configuration; never touches the network.
    pub fn offline() -> Self {
        Self {
            mode: AnalysisMode::Offline,
            ..Default::default()
        }
    }

    /// Create config from environment variables.
    ///
    /// Unrecognized values are logged and replaced by defaults.
    pub fn from_env() -> Self {
        Self {
            mode: env_or_default("EMOTION_MODE"),
            clusters: env_or_default("EMOTION_CLUSTERS"),
            model: ModelConfig::from_env(),
        }
    }

    pub fn with_mode(mut self, mode: AnalysisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_clusters(mut self, clusters: ClusterStrategy) -> Self {
        self.clusters = clusters;
        self
    }

    /// Pure function of the configuration.
    pub fn route(&self) -> Route {
        match self.mode {
            AnalysisMode::Online => Route::Remote,
            AnalysisMode::Offline => Route::Local,
            AnalysisMode::Auto if self.model.has_credentials() => Route::Remote,
            AnalysisMode::Auto => Route::Local,
        }
    }
}

fn env_or_default<T>(var: &str) -> T
where
    T: FromStr<Err = ConfigError> + Default,
{
    match std::env::var(var) {
        Ok(raw) => raw.parse().unwrap_or_else(|e| {
            warn!("{}: {}; using default", var, e);
            T::default()
        }),
        Err(_) => T::default(),
    }
}
