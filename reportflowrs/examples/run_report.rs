use std::{fs, path::Path, sync::Arc};

use reportflow::{
    backends::DuckDbConnection, runtime::run_report, ConnectionManager, Report, ReportflowConfig,
};
use tracing_subscriber::EnvFilter;

fn bootstrap_duckdb(path: &Path) -> anyhow::Result<()> {
    let conn = duckdb::Connection::open(path)?;
    conn.execute_batch(
        "
        CREATE TABLE orders (
            id INTEGER PRIMARY KEY,
            customer VARCHAR,
            region VARCHAR,
            total DOUBLE
        );
        INSERT INTO orders VALUES
            (1, 'Acme', 'EMEA', 100.0),
            (2, 'Globex', 'EMEA', 50.0),
            (3, 'Initech', 'AMER', 25.0),
            (4, 'Acme Labs', 'EMEA', 75.0);
        ",
    )?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let db_path = Path::new("demo_reports.duckdb");
    if db_path.exists() {
        fs::remove_file(db_path)?;
    }
    bootstrap_duckdb(db_path)?;

    let config = ReportflowConfig::from_toml(
        r#"
[datasources.default]
dialect = "duckdb"

[datasources.default.duckdb]
max_concurrency = 4
"#,
    )?;
    let resolved = config.for_datasource("default");
    let conn = DuckDbConnection::with_config(db_path, &resolved.duckdb);
    let mut connections = ConnectionManager::with_config(config);
    connections.insert("default", Arc::new(conn));

    let report = Report::new(
        "orders_by_region",
        "SELECT id, customer, total FROM orders WHERE region = '{region}'",
    )
    .with_columns(["id", "customer", "total"]);
    let registry = reportflow::registry::ReportRegistry::from_reports(vec![report]);

    let params = [
        ("draw", "1"),
        ("length", "2"),
        ("order[0][column]", "2"),
        ("order[0][dir]", "desc"),
        ("columns[customer][search][value]", "Acme"),
        ("vars[region]", "EMEA"),
    ];
    let result = run_report(&registry, &connections, "orders_by_region", params).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
