//! DuckDB backend implementation.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use duckdb::types::Value as DuckValue;
use serde_json::{Map, Value};
use tokio::sync::{Mutex, Semaphore, SemaphorePermit};

use crate::config::DuckDbConfig;
use crate::error::{Result, ReportflowError};

use super::{BackendConnection, ColumnMeta, RowSet};

/// File-backed DuckDB session pool implementing the backend trait.
#[derive(Clone)]
pub struct DuckDbConnection {
    database_path: PathBuf,
    max_concurrency: usize,
    limiter: Arc<Semaphore>,
    pool: Arc<Mutex<Vec<duckdb::Connection>>>,
}

impl DuckDbConnection {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self::with_config(path, &DuckDbConfig::default())
    }

    pub fn with_config<P: AsRef<Path>>(path: P, config: &DuckDbConfig) -> Self {
        let path = path.as_ref().to_path_buf();
        tracing::info!(
            path = %path.display(),
            max_concurrency = config.max_concurrency,
            "creating DuckDB connection"
        );
        let max_concurrency = config.max_concurrency.max(1);
        Self {
            database_path: path,
            max_concurrency,
            limiter: Arc::new(Semaphore::new(max_concurrency)),
            pool: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Statements allowed to run at once against this file.
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    async fn acquire_slot(&self) -> Result<SemaphorePermit<'_>> {
        if self.limiter.available_permits() == 0 {
            tracing::debug!("all DuckDB slots in use, waiting for permit");
        }
        self.limiter
            .acquire()
            .await
            .map_err(|e| ReportflowError::Execution(format!("limiter closed: {e}")))
    }

    async fn checkout_connection(&self) -> Result<duckdb::Connection> {
        let mut guard = self.pool.lock().await;
        if let Some(conn) = guard.pop() {
            let pool_size = guard.len();
            drop(guard);
            tracing::trace!(pool_remaining = pool_size, "reusing pooled DuckDB connection");
            return Ok(conn);
        }
        drop(guard);
        tracing::debug!(path = %self.database_path.display(), "opening new DuckDB connection");
        duckdb::Connection::open(self.database_path.clone())
            .map_err(|e| ReportflowError::Execution(format!("open duckdb: {e}")))
    }
}

#[async_trait]
impl BackendConnection for DuckDbConnection {
    async fn execute_sql(&self, sql: &str, params: &[Value]) -> Result<RowSet> {
        let sql = sql.to_string();
        let bound: Vec<DuckValue> = params.iter().map(json_to_duck_value).collect();
        let _permit = self.acquire_slot().await?;
        let conn = self.checkout_connection().await?;
        let pool = self.pool.clone();
        let result = tokio::task::spawn_blocking(move || {
            let start = Instant::now();
            // Hand the connection back even when the statement fails.
            let outcome = run_statement(&conn, &sql, bound);
            tracing::debug!(
                ok = outcome.is_ok(),
                ms = start.elapsed().as_millis(),
                "duckdb execute_sql"
            );
            (outcome, conn)
        })
        .await
        .map_err(|e| ReportflowError::Execution(format!("task join error: {e}")))?;

        let (outcome, conn) = result;
        {
            let mut guard = pool.lock().await;
            guard.push(conn);
        }
        outcome
    }
}

fn run_statement(conn: &duckdb::Connection, sql: &str, bound: Vec<DuckValue>) -> Result<RowSet> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows_iter = stmt.query(duckdb::params_from_iter(bound))?;
    let stmt_ref = rows_iter
        .as_ref()
        .ok_or_else(|| ReportflowError::Execution("statement missing".to_string()))?;
    let mut column_names = Vec::new();
    for idx in 0..stmt_ref.column_count() {
        let name = stmt_ref
            .column_name(idx)
            .map_err(|e| ReportflowError::Execution(e.to_string()))?;
        column_names.push(name.to_string());
    }

    let mut rows = Vec::new();
    while let Some(row) = rows_iter.next()? {
        let mut map = Map::new();
        for (idx, name) in column_names.iter().enumerate() {
            map.insert(name.clone(), duck_value_to_json(row.get_ref(idx)?.to_owned()));
        }
        rows.push(map);
    }

    tracing::trace!(rows = rows.len(), columns = column_names.len(), "duckdb rows fetched");
    Ok(RowSet {
        columns: column_names
            .into_iter()
            .map(|name| ColumnMeta { name })
            .collect(),
        rows,
    })
}

fn json_to_duck_value(value: &Value) -> DuckValue {
    match value {
        Value::Null => DuckValue::Null,
        Value::Bool(b) => DuckValue::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => DuckValue::BigInt(i),
            None => DuckValue::Double(n.as_f64().unwrap_or_default()),
        },
        Value::String(s) => DuckValue::Text(s.clone()),
        other => DuckValue::Text(other.to_string()),
    }
}

pub(crate) fn duck_value_to_json(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(b) => Value::Bool(b),
        DuckValue::TinyInt(i) => Value::from(i),
        DuckValue::SmallInt(i) => Value::from(i),
        DuckValue::Int(i) => Value::from(i),
        DuckValue::BigInt(i) => Value::from(i),
        DuckValue::HugeInt(i) => Value::String(i.to_string()),
        DuckValue::UTinyInt(i) => Value::from(i),
        DuckValue::USmallInt(i) => Value::from(i),
        DuckValue::UInt(i) => Value::from(i),
        DuckValue::UBigInt(i) => Value::from(i),
        DuckValue::Float(f) => Value::from(f),
        DuckValue::Double(f) => Value::from(f),
        DuckValue::Decimal(d) => Value::String(d.to_string()),
        DuckValue::Timestamp(unit, t) => Value::String(format!("{t} ({unit:?})")),
        DuckValue::Text(s) => Value::String(s),
        DuckValue::Blob(bytes) => Value::String(hex::encode(bytes)),
        DuckValue::Date32(d) => Value::from(d),
        DuckValue::Time64(unit, t) => Value::String(format!("{t} ({unit:?})")),
        DuckValue::Interval {
            months,
            days,
            nanos,
        } => Value::String(format!("{months} months {days} days {nanos} nanos")),
        DuckValue::List(items) | DuckValue::Array(items) => {
            Value::Array(items.into_iter().map(duck_value_to_json).collect())
        }
        DuckValue::Enum(s) => Value::String(s),
        DuckValue::Struct(fields) => {
            let mut map = Map::new();
            for (key, val) in fields.iter() {
                map.insert(key.clone(), duck_value_to_json(val.clone()));
            }
            Value::Object(map)
        }
        DuckValue::Map(entries) => Value::Array(
            entries
                .iter()
                .map(|(k, v)| {
                    Value::Array(vec![
                        duck_value_to_json(k.clone()),
                        duck_value_to_json(v.clone()),
                    ])
                })
                .collect(),
        ),
        DuckValue::Union(inner) => duck_value_to_json(*inner),
    }
}
