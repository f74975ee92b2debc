//! SQL Server dialect: pages through a `ROW_NUMBER()` window.

use super::{where_clause, Dialect};

#[derive(Debug, Default, Clone, Copy)]
pub struct MsSqlDialect;

/// Name of the window column added around the base query.
pub const ROW_NUMBER_ALIAS: &str = "RowNo";

impl Dialect for MsSqlDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("[{}]", ident.replace(']', "]]"))
    }

    fn supports_native_paging(&self) -> bool {
        false
    }

    /// Window bounds are `RowNo > offset AND RowNo <= offset + limit`.
    /// `ROW_NUMBER()` starts at 1, so this exclusive/inclusive pair selects
    /// exactly rows `offset + 1 ..= offset + limit`.
    fn build_paginated_query(
        &self,
        base_query: &str,
        columns: &[String],
        filters: &[String],
        order_by_clause: &str,
        limit: u64,
        offset: u64,
    ) -> String {
        // ROW_NUMBER() requires an ORDER BY inside OVER().
        let window_order = if order_by_clause.trim().is_empty() {
            "ORDER BY (SELECT NULL)"
        } else {
            order_by_clause.trim()
        };
        let upper = offset.saturating_add(limit);
        format!(
            "SELECT {projection} FROM (SELECT {row_number} ({window_order}) AS {ROW_NUMBER_ALIAS}, \
             base_query.* FROM ({base_query}) AS base_query{filters}) AS numbered \
             WHERE {ROW_NUMBER_ALIAS} > {offset} AND {ROW_NUMBER_ALIAS} <= {upper} \
             ORDER BY {ROW_NUMBER_ALIAS}",
            projection = self.render_projection(columns),
            row_number = self.row_number_syntax(),
            filters = where_clause(filters),
        )
    }

    fn build_probe_query(&self, base_query: &str) -> String {
        format!("SELECT TOP 1 * FROM ({base_query}) AS probe")
    }
}
