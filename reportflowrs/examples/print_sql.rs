use reportflow::{Dialect, DialectKind, PageRequest, Report, ReportExecutor};

fn main() -> anyhow::Result<()> {
    let report = Report::new(
        "orders_by_region",
        "SELECT id, customer, total FROM orders WHERE region = '{region}';",
    )
    .with_columns(["id", "customer", "total"]);

    let request = PageRequest::from_query_string(
        "draw=1&start=20&length=10&order[0][column]=2&order[0][dir]=desc\
         &search[value]=acme&vars[region]=EMEA",
    );

    for name in ["mssql", "postgres", "mysql"] {
        let executor = ReportExecutor::new(name)?;
        let queries = executor.build_queries(&report, &request);
        let kind: DialectKind = name.parse()?;
        println!("-- {} ({:?})", executor.dialect().name(), kind);
        println!("{}", queries.paginated);
        println!("{}", queries.total_count);
        if let Some(filtered) = &queries.filtered_count {
            println!("{filtered}");
        }
        println!();
    }
    Ok(())
}
