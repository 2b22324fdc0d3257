// file: src/config.rs
// description: application configuration management with toml and environment support
// reference: https://docs.rs/config

use crate::error::ConfigError;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";

type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub service: ServiceConfig,
    pub search: SearchConfig,
    pub images: ImageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ServiceConfig {
    /// Raw endpoint as the user wrote it; resolved when a client is built.
    pub endpoint: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct SearchConfig {
    pub limit: usize,
    pub score_threshold: f64,
    /// Pause between relaxation attempts. Cosmetic pacing only.
    pub relax_delay_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ImageConfig {
    pub similar_limit: usize,
    pub similar_threshold: f64,
}

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SearchConfig {
    pub fn relax_delay(&self) -> Duration {
        Duration::from_millis(self.relax_delay_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        dotenv().ok();

        let defaults = Self::default_config();
        let mut builder = config::Config::builder()
            .set_default("service.endpoint", defaults.service.endpoint)
            .and_then(|b| b.set_default("service.timeout_secs", defaults.service.timeout_secs))
            .and_then(|b| b.set_default("search.limit", defaults.search.limit as u64))
            .and_then(|b| b.set_default("search.score_threshold", defaults.search.score_threshold))
            .and_then(|b| b.set_default("search.relax_delay_ms", defaults.search.relax_delay_ms))
            .and_then(|b| {
                b.set_default("images.similar_limit", defaults.images.similar_limit as u64)
            })
            .and_then(|b| {
                b.set_default("images.similar_threshold", defaults.images.similar_threshold)
            })
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        } else {
            builder = builder
                .add_source(config::File::from(Path::new("config/default.toml")).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("TIDYDATA")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            service: ServiceConfig {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                timeout_secs: 30,
            },
            search: SearchConfig {
                limit: 10,
                score_threshold: 0.1,
                relax_delay_ms: 300,
            },
            images: ImageConfig {
                similar_limit: 5,
                similar_threshold: 0.3,
            },
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.service.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "service.timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.search.limit == 0 || self.images.similar_limit == 0 {
            return Err(ConfigError::Invalid(
                "result limits must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("search.score_threshold", self.search.score_threshold),
            ("images.similar_threshold", self.images.similar_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        Ok(())
    }
}
