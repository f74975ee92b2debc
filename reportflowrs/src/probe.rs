//! Column discovery for reports without declared column metadata.

use indexmap::IndexMap;

use crate::backends::BackendConnection;
use crate::dialect::{Dialect, DialectKind};
use crate::error::{Result, ReportflowError};
use crate::models::ColumnDescriptor;
use crate::query_builder::strip_terminator;

/// Runs one-row probes of a base query. Unlike the executor, failures are
/// returned to the caller: probing is an administrative operation.
#[derive(Debug, Clone, Copy)]
pub struct SchemaProber {
    kind: DialectKind,
}

impl SchemaProber {
    pub fn new(dialect: &str) -> Result<Self> {
        Ok(Self::for_kind(DialectKind::from_name(dialect)?))
    }

    pub fn for_kind(kind: DialectKind) -> Self {
        Self { kind }
    }

    pub fn dialect(&self) -> &'static dyn Dialect {
        self.kind.dialect()
    }

    /// Probe `base_query` (after substituting `params`) and describe its
    /// output columns with a `text` placeholder type.
    pub async fn test_query(
        &self,
        session: &dyn BackendConnection,
        base_query: &str,
        params: &IndexMap<String, String>,
    ) -> Result<Vec<ColumnDescriptor>> {
        let dialect = self.dialect();
        let query = dialect.process_variables(strip_terminator(base_query), params);
        let sql = dialect.build_probe_query(&query);
        tracing::debug!(sql = %sql, "probing report query");

        let rows = session.execute_sql(&sql, &[]).await.map_err(|e| {
            tracing::warn!(error = %e, "report probe failed");
            ReportflowError::Probe(format!("failed to probe query: {e}"))
        })?;

        // Some drivers only report names through the rows themselves.
        let names: Vec<String> = if rows.columns.is_empty() {
            rows.rows
                .first()
                .map(|row| row.keys().cloned().collect::<Vec<_>>())
                .unwrap_or_default()
        } else {
            rows.column_names()
        };

        Ok(names.into_iter().map(ColumnDescriptor::named).collect())
    }
}
