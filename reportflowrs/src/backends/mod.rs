//! Database backend implementations.
//!
//! Each backend is implemented in its own file and gated behind a feature flag.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::{ReportflowConfig, ResolvedDatasourceConfig};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
}

/// Rows returned by a backend, each keyed by output column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<ColumnMeta>,
    pub rows: Vec<Map<String, Value>>,
}

impl RowSet {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// A live session against one database. The engine never opens sessions
/// itself; callers hand one in per call and own its lifetime.
#[async_trait]
pub trait BackendConnection: Send + Sync {
    /// Run one statement with positional parameters.
    async fn execute_sql(&self, sql: &str, params: &[Value]) -> Result<RowSet>;
}

/// Minimal connection manager keyed by data source name.
#[derive(Clone, Default)]
pub struct ConnectionManager {
    connections: HashMap<String, Arc<dyn BackendConnection>>,
    config: Option<ReportflowConfig>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
            config: None,
        }
    }

    /// Create a connection manager with configuration.
    pub fn with_config(config: ReportflowConfig) -> Self {
        Self {
            connections: HashMap::new(),
            config: Some(config),
        }
    }

    /// Get the configuration, if set.
    pub fn config(&self) -> Option<&ReportflowConfig> {
        self.config.as_ref()
    }

    /// Get resolved configuration for a specific datasource.
    pub fn config_for(&self, name: &str) -> ResolvedDatasourceConfig {
        match &self.config {
            Some(cfg) => cfg.for_datasource(name),
            None => ReportflowConfig::default().for_datasource(name),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, conn: Arc<dyn BackendConnection>) {
        self.connections.insert(name.into(), conn);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn BackendConnection>> {
        self.connections.get(name)
    }
}

// Feature-gated backend implementations
#[cfg(feature = "duckdb")]
mod duckdb;
#[cfg(feature = "duckdb")]
pub use self::duckdb::DuckDbConnection;

#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub use self::postgres::PostgresConnection;
