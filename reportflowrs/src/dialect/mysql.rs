//! MySQL / MariaDB dialect.

use super::postgres::native_paginated_query;
use super::Dialect;

#[derive(Debug, Default, Clone, Copy)]
pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
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
