//! Report execution: renders the statement set for a request, runs it
//! against a caller-supplied session, and assembles the grid response.

use std::time::Instant;

use serde_json::{Map, Value};

use crate::backends::{BackendConnection, RowSet};
use crate::config::QueryConfig;
use crate::dialect::{Dialect, DialectKind, ROW_NUMBER_ALIAS};
use crate::error::{Result, ReportflowError};
use crate::models::{PageRequest, QueryResult, Report};
use crate::query_builder::{ReportQueries, SqlBuilder};

/// Runs reports for one dialect. Cheap to share: holds no per-call state.
#[derive(Debug, Clone)]
pub struct ReportExecutor {
    kind: DialectKind,
    config: QueryConfig,
    builder: SqlBuilder,
}

impl ReportExecutor {
    /// Fails immediately for an unknown dialect name.
    pub fn new(dialect: &str) -> Result<Self> {
        Self::with_config(dialect, &QueryConfig::default())
    }

    pub fn with_config(dialect: &str, config: &QueryConfig) -> Result<Self> {
        let kind = DialectKind::from_name(dialect)?;
        Ok(Self::for_kind(kind, config))
    }

    pub fn for_kind(kind: DialectKind, config: &QueryConfig) -> Self {
        tracing::debug!(
            dialect = kind.dialect().name(),
            max_page_length = config.max_page_length,
            "creating report executor"
        );
        Self {
            kind,
            config: config.clone(),
            builder: SqlBuilder::new(config.max_page_length),
        }
    }

    pub fn kind(&self) -> DialectKind {
        self.kind
    }

    /// Paging settings used both to parse raw parameters and to clamp pages.
    pub fn query_config(&self) -> &QueryConfig {
        &self.config
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        self.kind.dialect()
    }

    /// Render every statement a call would run, without executing anything.
    pub fn build_queries(&self, report: &Report, request: &PageRequest) -> ReportQueries {
        self.builder
            .build_with_dialect(report, request, self.dialect())
    }

    /// Run a report page. Execution failures never escape: they come back as
    /// a zero-count, empty-data result with `error` set.
    pub async fn execute_report(
        &self,
        session: &dyn BackendConnection,
        report: &Report,
        request: &PageRequest,
    ) -> QueryResult {
        let start = Instant::now();
        let queries = self.build_queries(report, request);
        match self.run(session, &queries).await {
            Ok(result) => {
                tracing::debug!(
                    report = report.name.as_str(),
                    draw = request.draw,
                    rows = result.data.len(),
                    records_total = result.total,
                    records_filtered = result.filtered,
                    ms = start.elapsed().as_millis(),
                    "report executed"
                );
                QueryResult {
                    draw: request.draw,
                    records_total: result.total,
                    records_filtered: result.filtered,
                    data: result.data,
                    headers: result.headers,
                    error: None,
                }
            }
            Err(e) => {
                tracing::error!(
                    report = report.name.as_str(),
                    draw = request.draw,
                    error = %e,
                    "report execution failed"
                );
                QueryResult::failed(request.draw, queries.columns, e.to_string())
            }
        }
    }

    /// Parse raw grid parameters with this executor's paging settings, then
    /// run the report.
    pub async fn execute_report_params<I, K, V>(
        &self,
        session: &dyn BackendConnection,
        report: &Report,
        params: I,
    ) -> QueryResult
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = PageRequest::from_params_with(params, &self.config);
        self.execute_report(session, report, &request).await
    }

    async fn run(&self, session: &dyn BackendConnection, queries: &ReportQueries) -> Result<Page> {
        tracing::debug!(sql = %queries.paginated, "running paginated query");
        let page = session.execute_sql(&queries.paginated, &[]).await?;
        let windowed = !self.dialect().supports_native_paging();
        let (headers, data) = map_rows(&queries.columns, page, windowed);

        tracing::debug!(sql = %queries.total_count, "running total count query");
        let total = fetch_count(session, &queries.total_count).await?;

        let filtered = match &queries.filtered_count {
            Some(sql) => {
                tracing::debug!(sql = %sql, "running filtered count query");
                fetch_count(session, sql).await?
            }
            None => total,
        };

        Ok(Page {
            headers,
            data,
            total,
            filtered,
        })
    }
}

struct Page {
    headers: Vec<String>,
    data: Vec<Map<String, Value>>,
    total: u64,
    filtered: u64,
}

/// Re-key each row in header order. Without declared columns, headers come
/// from the result itself, minus the row-number helper when the statement
/// was windowed.
fn map_rows(
    columns: &[String],
    page: RowSet,
    windowed: bool,
) -> (Vec<String>, Vec<Map<String, Value>>) {
    let headers: Vec<String> = if columns.is_empty() {
        page.column_names()
            .into_iter()
            .filter(|name| !windowed || name != ROW_NUMBER_ALIAS)
            .collect()
    } else {
        columns.to_vec()
    };

    let data = page
        .rows
        .into_iter()
        .map(|mut row| {
            headers
                .iter()
                .map(|name| (name.clone(), row.remove(name).unwrap_or(Value::Null)))
                .collect()
        })
        .collect();

    (headers, data)
}

async fn fetch_count(session: &dyn BackendConnection, sql: &str) -> Result<u64> {
    let rows = session.execute_sql(sql, &[]).await?;
    let row = rows
        .rows
        .first()
        .ok_or_else(|| ReportflowError::Execution("count query returned no rows".to_string()))?;
    let value = row
        .get("count")
        .or_else(|| row.values().next())
        .ok_or_else(|| ReportflowError::Execution("count query returned no columns".to_string()))?;
    count_from_value(value)
}

fn count_from_value(value: &Value) -> Result<u64> {
    let parsed = match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| ReportflowError::Execution(format!("unexpected count value {value}")))
}
