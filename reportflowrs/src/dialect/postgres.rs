//! PostgreSQL dialect. Also serves DuckDB and SQLite, which share its
//! quoting and paging syntax.

use super::{where_clause, Dialect};

#[derive(Debug, Default, Clone, Copy)]
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn build_paginated_query(
        &self,
        base_query: &str,
        columns: &[String],
        filters: &[String],
        order_by_clause: &str,
        limit: u64,
        offset: u64,
    ) -> String {
        native_paginated_query(
            &self.render_projection(columns),
            base_query,
            filters,
            order_by_clause,
            limit,
            offset,
        )
    }
}

/// Shared `LIMIT`/`OFFSET` shape for engines with native row skipping.
pub(super) fn native_paginated_query(
    projection: &str,
    base_query: &str,
    filters: &[String],
    order_by_clause: &str,
    limit: u64,
    offset: u64,
) -> String {
    let mut sql = format!(
        "SELECT {projection} FROM ({base_query}) AS base_query{}",
        where_clause(filters)
    );
    let order_by = order_by_clause.trim();
    if !order_by.is_empty() {
        sql.push(' ');
        sql.push_str(order_by);
    }
    sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
    sql
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_with_limit_and_offset() {
        let sql = PostgresDialect.build_paginated_query(
            "SELECT id, name FROM widgets",
            &["id".to_string(), "name".to_string()],
            &[],
            "ORDER BY \"id\" DESC",
            10,
            10,
        );
        assert_eq!(
            sql,
            "SELECT \"id\", \"name\" FROM (SELECT id, name FROM widgets) AS base_query \
             ORDER BY \"id\" DESC LIMIT 10 OFFSET 10"
        );
    }

    #[test]
    fn filters_and_empty_order() {
        let sql = PostgresDialect.build_paginated_query(
            "SELECT * FROM t",
            &[],
            &["a LIKE '%x%'".to_string()],
            "",
            25,
            0,
        );
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT * FROM t) AS base_query WHERE a LIKE '%x%' LIMIT 25 OFFSET 0"
        );
    }

    #[test]
    fn double_quotes_are_escaped() {
        assert_eq!(PostgresDialect.quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
