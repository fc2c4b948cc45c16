use config::{Config, Environment, File};
use serde::Deserialize;
use std::{env, path::Path};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub trace: TraceConfig,
    #[serde(default)]
    pub rewards: RewardsConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TraceConfig {
    pub console: Option<TraceConsoleConfig>,
    pub file: Option<TraceFileConfig>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            console: Some(TraceConsoleConfig::default()),
            file: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TraceConsoleConfig {
    pub filter: String,
    pub format: TraceFormat,
    pub buffer_limit: usize,
    pub lossy: bool,
}

impl Default for TraceConsoleConfig {
    fn default() -> Self {
        Self {
            filter: "info".into(),
            format: TraceFormat::Compact,
            buffer_limit: 128_000,
            lossy: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TraceFileConfig {
    pub filter: String,
    pub format: TraceFormat,
    pub directory: String,
    pub filename: String,
    pub buffer_limit: usize,
    pub lossy: bool,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TraceFormat {
    Json,
    Pretty,
    Full,
    Compact,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    #[serde(default)]
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Eco-point amounts granted by the workflows.
#[derive(Debug, Deserialize, Clone)]
pub struct RewardsConfig {
    pub completion_points: i32,
}

impl Default for RewardsConfig {
    fn default() -> Self {
        Self {
            completion_points: 10,
        }
    }
}

/// Reverse geocoding endpoint. Without an endpoint, complaint addresses
/// fall back to the raw coordinates.
#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    pub endpoint: Option<String>,
    pub timeout_ms: u64,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_ms: 3_000,
        }
    }
}

impl AppConfig {
    pub fn new<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let run_mode = env::var("APP_ENV").unwrap_or_else(|_| "".into());
        Self::load_with_options(path, Some(run_mode), None)
    }

    pub fn load_with_options<P: AsRef<Path>>(
        path: P,
        run_mode: Option<String>,
        overrides: Option<std::collections::HashMap<String, String>>,
    ) -> crate::Result<Self> {
        let dir = path.as_ref().to_string_lossy();
        let run_mode = run_mode.unwrap_or_else(|| "".into());
        let mut builder = Config::builder()
            .add_source(File::with_name(&format!("{}/default", dir)))
            // environment specific, optional
            .add_source(
                File::with_name(&format!("{}/{}", dir, run_mode))
                    .required(false),
            )
            // developer overrides, never committed
            .add_source(
                File::with_name(&format!("{}/local", dir)).required(false),
            )
            // NIRAMAY_DATABASE__URL -> database.url
            .add_source(
                Environment::with_prefix("NIRAMAY")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Some(overrides) = overrides {
            for (key, value) in overrides {
                builder = builder
                    .set_override(key, value)
                    .map_err(|e| crate::Error::Config(anyhow::anyhow!(e)))?;
            }
        }

        let s = builder
            .build()
            .map_err(|e| crate::Error::Config(anyhow::anyhow!(e)))?;

        s.try_deserialize()
            .map_err(|e| crate::Error::Config(anyhow::anyhow!(e)))
    }
}
