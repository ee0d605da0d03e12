//! Engine configuration
//!
//! All sections have defaults, so a configuration file only needs the
//! values that differ:
//!
//! ```json
//! {
//!   "search": { "maxEvaluations": 5000, "seed": 7 },
//!   "controller": { "host": "localhost", "port": 40100 }
//! }
//! ```

use crate::problem::rest::{
    BlockingHttpClient, ControllerResult, HttpError, HttpRemoteController, SamplerConfig,
    DEFAULT_TARGETS_PER_REQUEST,
};
use crate::search::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Type alias for configuration results
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Where the remote controller of the SUT listens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ControllerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 40100,
            timeout_ms: 10_000,
        }
    }
}

impl ControllerConfig {
    pub fn connect(&self) -> ControllerResult<HttpRemoteController> {
        HttpRemoteController::new(&self.host, self.port, Duration::from_millis(self.timeout_ms))
    }
}

/// Calls towards the SUT
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpConfig {
    /// Per-call timeout; a call running longer counts as failed
    pub timeout_ms: u64,

    /// Maximum number of target ids in one coverage request
    pub targets_per_request: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            targets_per_request: DEFAULT_TARGETS_PER_REQUEST,
        }
    }
}

impl HttpConfig {
    pub fn client(&self) -> Result<BlockingHttpClient, HttpError> {
        BlockingHttpClient::new(Duration::from_millis(self.timeout_ms))
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub search: SearchConfig,
    pub sampler: SamplerConfig,
    pub controller: ControllerConfig,
    pub http: HttpConfig,
}

impl EngineConfig {
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Check the values that serde cannot: probabilities, budgets and sizes
    pub fn validate(&self) -> ConfigResult<()> {
        let probabilities = [
            ("search.probabilityOfRandomSampling", self.search.probability_of_random_sampling),
            ("search.structureMutationProbability", self.search.structure_mutation_probability),
            ("sampler.probabilityOfSmartSampling", self.sampler.probability_of_smart_sampling),
            ("sampler.probabilityOfDbSeeding", self.sampler.probability_of_db_seeding),
        ];
        for (name, p) in probabilities {
            if !(0.0..=1.0).contains(&p) {
                return Err(ConfigError::Invalid(format!("{} must lie in [0, 1], got {}", name, p)));
            }
        }
        if self.search.max_evaluations.is_none() && self.search.max_time_seconds.is_none() {
            return Err(ConfigError::Invalid(
                "either search.maxEvaluations or search.maxTimeSeconds must be set".to_string(),
            ));
        }
        if self.sampler.max_test_size == 0 {
            return Err(ConfigError::Invalid("sampler.maxTestSize must be positive".to_string()));
        }
        if self.http.targets_per_request == 0 {
            return Err(ConfigError::Invalid("http.targetsPerRequest must be positive".to_string()));
        }
        if self.controller.port == 0 {
            return Err(ConfigError::Invalid("controller.port must be positive".to_string()));
        }
        Ok(())
    }
}
