use config::{Config, ConfigError};
use serde::Deserialize;

use crate::domain::core::BookingRules;

pub mod domain;
pub mod infrastructure;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TidyConfig {
    pub booking: BookingRules,
    pub web: Web,
    pub logger: Logger,
}

impl TidyConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("tidy.toml").required(false))
            .add_source(
                config::Environment::with_prefix("TIDY")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize::<TidyConfig>()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Web {
    pub addr: String,
    pub tls_cert: Option<String>,
    pub tls_key: Option<String>,
}

impl Default for Web {
    fn default() -> Self {
        Self {
            addr: "0.0.0.0:8080".to_owned(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Logger {
    pub level: Level,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub enum Level {
    TRACE,
    DEBUG,
    #[default]
    INFO,
    WARN,
    ERROR,
}

impl From<&Level> for tracing::Level {
    fn from(value: &Level) -> Self {
        match value {
            Level::TRACE => tracing::Level::TRACE,
            Level::DEBUG => tracing::Level::DEBUG,
            Level::INFO => tracing::Level::INFO,
            Level::WARN => tracing::Level::WARN,
            Level::ERROR => tracing::Level::ERROR,
        }
    }
}
