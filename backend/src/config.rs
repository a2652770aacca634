//! Runtime configuration read from the environment.
//!
//! - `HOST` / `PORT`: listen address (default `0.0.0.0:3000`)
//! - `STORE_BACKEND`: `memory` (default) | `redis`
//! - `REDIS_URL`: Redis connection URL (default `redis://127.0.0.1:6379`)
//! - `TABLE_NAME`: key namespace for stored tasks (default `todos`)
//! - `LOG_FORMAT`: `pretty` (default) | `json`

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::store::{InMemoryTaskStore, RedisTaskStore, TaskStore};

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_TABLE_NAME: &str = "todos";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    #[default]
    Memory,
    Redis,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "in_memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigError::InvalidValue {
                name: "STORE_BACKEND",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue {
                name: "LOG_FORMAT",
                value: value.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub backend: StoreBackend,
    pub redis_url: String,
    pub table_name: String,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            backend: StoreBackend::default(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a configuration from any variable lookup; unset and blank
    /// variables fall back to the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let host = match var("HOST") {
            Some(value) => parse::<IpAddr>("HOST", &value)?,
            None => defaults.addr.ip(),
        };
        let port = match var("PORT") {
            Some(value) => parse::<u16>("PORT", &value)?,
            None => defaults.addr.port(),
        };

        Ok(Self {
            addr: SocketAddr::new(host, port),
            backend: var("STORE_BACKEND")
                .map(|value| value.parse::<StoreBackend>())
                .transpose()?
                .unwrap_or(defaults.backend),
            redis_url: var("REDIS_URL").unwrap_or(defaults.redis_url),
            table_name: var("TABLE_NAME").unwrap_or(defaults.table_name),
            log_format: var("LOG_FORMAT")
                .map(|value| value.parse::<LogFormat>())
                .transpose()?
                .unwrap_or(defaults.log_format),
        })
    }

    /// Connects the configured storage backend.
    pub async fn connect_store(&self) -> Result<Arc<dyn TaskStore>, ConfigError> {
        Ok(match self.backend {
            StoreBackend::Memory => Arc::new(InMemoryTaskStore::new()),
            StoreBackend::Redis => {
                Arc::new(RedisTaskStore::connect(&self.redis_url, self.table_name.clone()).await?)
            }
        })
    }
}

fn parse<T: FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}
