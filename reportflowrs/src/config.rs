//! Configuration system for reportflow.
//!
//! Supports TOML-based configuration with global defaults and per-datasource overrides.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dialect::DialectKind;
use crate::error::{Result, ReportflowError};

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportflowConfig {
    /// Global defaults applied to all datasources unless overridden.
    pub defaults: GlobalDefaults,

    /// Per-datasource configuration overrides (keyed by datasource name).
    #[serde(default)]
    pub datasources: HashMap<String, DatasourceConfig>,
}

/// Global default settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalDefaults {
    /// Dialect used by datasources that do not name one (default: postgres).
    pub dialect: String,
    pub query: QueryConfig,
    pub pool: PoolConfig,
    pub validation: ValidationConfig,
}

/// Paging defaults for grid requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Page size when the request carries no usable `length` (default: 10).
    pub default_page_length: u64,
    /// Largest page a request may ask for (0 = unlimited).
    pub max_page_length: u64,
}

/// Connection pooling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum pool size (default: 16).
    pub size: usize,
}

/// Validation configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
#[derive(Default)]
pub struct ValidationConfig {
    /// Log report definition problems instead of failing (default: false).
    pub warn_only: bool,
}

/// Per-datasource configuration (can override globals).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasourceConfig {
    pub dialect: Option<String>,
    pub query: Option<QueryConfig>,
    pub pool: Option<PoolConfig>,

    /// DuckDB-specific options.
    pub duckdb: Option<DuckDbConfig>,
}

/// DuckDB-specific configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DuckDbConfig {
    /// Maximum concurrent queries (default: 16).
    pub max_concurrency: usize,
}

impl Default for GlobalDefaults {
    fn default() -> Self {
        Self {
            dialect: "postgres".to_string(),
            query: QueryConfig::default(),
            pool: PoolConfig::default(),
            validation: ValidationConfig::default(),
        }
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_length: crate::models::DEFAULT_PAGE_LENGTH,
            max_page_length: 0,
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self { size: 16 }
    }
}

impl Default for DuckDbConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 16,
        }
    }
}

impl ReportflowConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ReportflowError::Config(format!("failed to read config file: {e}")))?;
        Self::from_toml(&contents)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str)
            .map_err(|e| ReportflowError::Config(format!("failed to parse config: {e}")))
    }

    /// Load from default locations (env var, cwd, user config dir, or defaults).
    ///
    /// Search order:
    /// 1. `REPORTFLOW_CONFIG` environment variable
    /// 2. `./reportflow.toml` (current directory)
    /// 3. `~/.config/reportflow/config.toml` (user config dir)
    /// 4. Built-in defaults
    pub fn load_default() -> Self {
        if let Ok(path) = std::env::var("REPORTFLOW_CONFIG") {
            match Self::from_file(&path) {
                Ok(cfg) => {
                    tracing::info!(path = %path, "loaded config from REPORTFLOW_CONFIG");
                    return cfg;
                }
                Err(e) => tracing::warn!(path = %path, error = %e, "ignoring REPORTFLOW_CONFIG"),
            }
        }

        if let Ok(cfg) = Self::from_file("reportflow.toml") {
            tracing::info!("loaded config from ./reportflow.toml");
            return cfg;
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("reportflow").join("config.toml");
            if let Ok(cfg) = Self::from_file(&user_config) {
                tracing::info!(path = %user_config.display(), "loaded config from user config dir");
                return cfg;
            }
        }

        tracing::debug!("no config file found, using defaults");
        Self::default()
    }

    /// Get resolved config for a specific datasource (merges global defaults).
    pub fn for_datasource(&self, name: &str) -> ResolvedDatasourceConfig {
        let ds_config = self.datasources.get(name);
        ResolvedDatasourceConfig::merge(&self.defaults, ds_config)
    }
}

/// Fully resolved configuration for a datasource (no Option fields).
#[derive(Debug, Clone)]
pub struct ResolvedDatasourceConfig {
    pub dialect: String,
    pub query: QueryConfig,
    pub pool: PoolConfig,
    pub duckdb: DuckDbConfig,
}

impl ResolvedDatasourceConfig {
    fn merge(defaults: &GlobalDefaults, override_cfg: Option<&DatasourceConfig>) -> Self {
        match override_cfg {
            Some(ds) => Self {
                dialect: ds
                    .dialect
                    .clone()
                    .unwrap_or_else(|| defaults.dialect.clone()),
                query: ds.query.clone().unwrap_or_else(|| defaults.query.clone()),
                pool: ds.pool.clone().unwrap_or_else(|| defaults.pool.clone()),
                duckdb: ds.duckdb.clone().unwrap_or_default(),
            },
            None => Self {
                dialect: defaults.dialect.clone(),
                query: defaults.query.clone(),
                pool: defaults.pool.clone(),
                duckdb: DuckDbConfig::default(),
            },
        }
    }

    /// Resolve the configured dialect name against the supported engines.
    pub fn dialect_kind(&self) -> Result<DialectKind> {
        DialectKind::from_name(&self.dialect)
    }
}
