//! Statement planning for a report call: column resolution, ordering,
//! variable substitution, filters and the dialect-specific statement set.

use crate::dialect::Dialect;
use crate::models::{PageRequest, Report};

pub mod filters;
pub mod variables;

pub use filters::build_filter_conditions;
pub use variables::{process_variables, strip_terminator};

/// Every statement one report call may run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQueries {
    pub paginated: String,
    pub total_count: String,
    /// Only present when the request carries filters.
    pub filtered_count: Option<String>,
    /// Resolved column names; empty means "whatever the query returns".
    pub columns: Vec<String>,
    pub filters: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SqlBuilder {
    /// Upper bound for the requested page length (0 = unlimited).
    pub max_page_length: u64,
}

impl SqlBuilder {
    pub fn new(max_page_length: u64) -> Self {
        Self { max_page_length }
    }

    /// Report column metadata wins; otherwise the names the request declares.
    pub fn resolve_columns(report: &Report, request: &PageRequest) -> Vec<String> {
        if !report.columns.is_empty() {
            report.column_names()
        } else {
            request.columns.clone()
        }
    }

    pub fn page_length(&self, request: &PageRequest) -> u64 {
        if self.max_page_length > 0 && request.length > self.max_page_length {
            self.max_page_length
        } else {
            request.length
        }
    }

    pub fn build_with_dialect(
        &self,
        report: &Report,
        request: &PageRequest,
        dialect: &dyn Dialect,
    ) -> ReportQueries {
        let columns = Self::resolve_columns(report, request);

        let order_by = request
            .order_column_index
            .and_then(|idx| columns.get(idx))
            .map(|column| dialect.render_order_by(column, request.order_direction))
            .unwrap_or_default();

        let base_query =
            dialect.process_variables(strip_terminator(&report.base_query), &request.variables);

        let filters =
            dialect.build_filter_conditions(&columns, &request.column_search, &request.search_value);

        let paginated = dialect.build_paginated_query(
            &base_query,
            &columns,
            &filters,
            &order_by,
            self.page_length(request),
            request.start,
        );
        let total_count = dialect.build_count_query(&base_query, None);
        let filtered_count = (!filters.is_empty())
            .then(|| dialect.build_count_query(&base_query, Some(filters.as_slice())));

        tracing::debug!(
            report = report.name.as_str(),
            dialect = dialect.name(),
            columns = columns.len(),
            filters = filters.len(),
            "planned report statements"
        );

        ReportQueries {
            paginated,
            total_count,
            filtered_count,
            columns,
            filters,
        }
    }
}
