//! SQL dialect abstractions for the supported database engines.
//!
//! The engine set is closed: [`DialectKind`] names every variant and the
//! lookup table maps engine names (and their aliases) onto it. Each variant
//! lives in its own file and implements [`Dialect`].

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::error::{Result, ReportflowError};
use crate::models::SortDirection;
use crate::query_builder::{filters, variables};

/// Dialects render paging, counting and quoting for one engine. Filter and
/// variable rendering is engine-neutral and shared through default methods.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    fn quote_ident(&self, ident: &str) -> String;

    fn row_number_syntax(&self) -> &'static str {
        "ROW_NUMBER() OVER"
    }

    /// True when the engine pages with `LIMIT`/`OFFSET` instead of a row-number window.
    fn supports_native_paging(&self) -> bool {
        true
    }

    fn build_paginated_query(
        &self,
        base_query: &str,
        columns: &[String],
        filters: &[String],
        order_by_clause: &str,
        limit: u64,
        offset: u64,
    ) -> String;

    fn build_count_query(&self, base_query: &str, filters: Option<&[String]>) -> String {
        format!(
            "SELECT COUNT(*) AS count FROM ({base_query}) AS counted{}",
            where_clause(filters.unwrap_or_default())
        )
    }

    /// One-row probe used to discover a query's output columns.
    fn build_probe_query(&self, base_query: &str) -> String {
        format!("SELECT * FROM ({base_query}) AS probe LIMIT 1")
    }

    fn render_order_by(&self, column: &str, direction: SortDirection) -> String {
        format!("ORDER BY {} {}", self.quote_ident(column), direction.as_sql())
    }

    fn render_projection(&self, columns: &[String]) -> String {
        if columns.is_empty() {
            return "*".to_string();
        }
        columns
            .iter()
            .map(|c| self.quote_ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn process_variables(&self, query: &str, vars: &IndexMap<String, String>) -> String {
        variables::process_variables(query, vars)
    }

    fn build_filter_conditions(
        &self,
        columns: &[String],
        column_search: &IndexMap<String, String>,
        global_search: &str,
    ) -> Vec<String> {
        filters::build_filter_conditions(columns, column_search, global_search)
    }
}

/// Renders `WHERE a AND b` with a leading space, or nothing.
pub(crate) fn where_clause(filters: &[String]) -> String {
    if filters.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", filters.join(" AND "))
    }
}

mod mssql;
mod mysql;
mod postgres;

pub use mssql::{MsSqlDialect, ROW_NUMBER_ALIAS};
pub use mysql::MySqlDialect;
pub use postgres::PostgresDialect;

/// The fixed set of supported engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKind {
    /// Row-number windowing, bracket quoting.
    MsSql,
    /// Native `LIMIT`/`OFFSET`, double-quote quoting.
    Postgres,
    /// Native `LIMIT`/`OFFSET`, backtick quoting.
    MySql,
}

static DIALECTS: Lazy<HashMap<&'static str, DialectKind>> = Lazy::new(|| {
    HashMap::from([
        ("mssql", DialectKind::MsSql),
        ("sqlserver", DialectKind::MsSql),
        ("tsql", DialectKind::MsSql),
        ("postgres", DialectKind::Postgres),
        ("postgresql", DialectKind::Postgres),
        ("duckdb", DialectKind::Postgres),
        ("sqlite", DialectKind::Postgres),
        ("mysql", DialectKind::MySql),
        ("mariadb", DialectKind::MySql),
    ])
});

impl DialectKind {
    /// Look up an engine by name (case-insensitive, aliases allowed).
    pub fn from_name(name: &str) -> Result<Self> {
        let key = name.trim().to_lowercase();
        DIALECTS.get(key.as_str()).copied().ok_or_else(|| {
            let mut known: Vec<_> = DIALECTS.keys().copied().collect();
            known.sort_unstable();
            ReportflowError::Config(format!(
                "unsupported dialect {name:?} (expected one of: {})",
                known.join(", ")
            ))
        })
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        match self {
            DialectKind::MsSql => &MsSqlDialect,
            DialectKind::Postgres => &PostgresDialect,
            DialectKind::MySql => &MySqlDialect,
        }
    }
}

impl std::str::FromStr for DialectKind {
    type Err = ReportflowError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}
