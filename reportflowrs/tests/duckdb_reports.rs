//! End-to-end report runs against a real DuckDB file.
#![cfg(feature = "duckdb")]

use std::path::Path;
use std::sync::Arc;

use reportflow::backends::{BackendConnection, ConnectionManager, DuckDbConnection};
use reportflow::config::DuckDbConfig;
use reportflow::registry::ReportRegistry;
use reportflow::runtime::{probe_report, run_report};
use reportflow::{Dialect, PageRequest, Report, ReportExecutor, ReportflowConfig};
use serde_json::json;

fn bootstrap_duckdb(db_path: &Path) -> anyhow::Result<()> {
    let conn = duckdb::Connection::open(db_path)?;
    conn.execute_batch(
        "
        CREATE TABLE widgets (
            id INTEGER PRIMARY KEY,
            name VARCHAR,
            colour VARCHAR
        );
        INSERT INTO widgets VALUES
            (1, 'bolt', 'red'),
            (2, 'nut', 'blue'),
            (3, 'washer', 'red'),
            (4, 'bracket', 'green'),
            (5, 'hinge', 'blue');
        ",
    )?;
    Ok(())
}

fn widgets_db() -> anyhow::Result<(tempfile::TempDir, DuckDbConnection)> {
    widgets_db_with(&DuckDbConfig::default())
}

fn widgets_db_with(
    config: &DuckDbConfig,
) -> anyhow::Result<(tempfile::TempDir, DuckDbConnection)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("widgets.duckdb");
    bootstrap_duckdb(&path)?;
    Ok((dir, DuckDbConnection::with_config(&path, config)))
}

fn widgets_report() -> Report {
    Report::new("widgets", "SELECT id, name, colour FROM widgets;")
        .with_columns(["id", "name", "colour"])
}

#[tokio::test]
async fn count_query_matches_base_row_count() -> anyhow::Result<()> {
    let (_dir, conn) = widgets_db()?;
    let executor = ReportExecutor::new("duckdb")?;
    let sql = executor
        .dialect()
        .build_count_query("SELECT id, name, colour FROM widgets", None);
    let rows = conn.execute_sql(&sql, &[]).await?;
    assert_eq!(rows.rows[0]["count"], json!(5));
    Ok(())
}

#[tokio::test]
async fn pages_sort_and_count() -> anyhow::Result<()> {
    let (_dir, conn) = widgets_db()?;
    let executor = ReportExecutor::new("postgres")?;
    let request = PageRequest::from_params([
        ("draw", "7"),
        ("start", "2"),
        ("length", "2"),
        ("order[0][column]", "0"),
        ("order[0][dir]", "DESC"),
    ]);

    let result = executor
        .execute_report(&conn, &widgets_report(), &request)
        .await;

    assert_eq!(result.error, None);
    assert_eq!(result.draw, 7);
    assert_eq!(result.records_total, 5);
    assert_eq!(result.records_filtered, 5);
    let ids: Vec<_> = result.data.iter().map(|row| row["id"].clone()).collect();
    assert_eq!(ids, vec![json!(3), json!(2)]);
    Ok(())
}

#[tokio::test]
async fn column_search_narrows_filtered_count() -> anyhow::Result<()> {
    let (_dir, conn) = widgets_db()?;
    let executor = ReportExecutor::new("postgres")?;

    let request = PageRequest::from_params([("columns[2][search][value]", "red")]);
    let result = executor
        .execute_report(&conn, &widgets_report(), &request)
        .await;
    assert_eq!(result.error, None);
    assert_eq!(result.records_total, 5);
    assert_eq!(result.records_filtered, 2);
    assert_eq!(result.data.len(), 2);

    // A term every row matches leaves the counts equal.
    let request = PageRequest::from_params([("columns[colour][search][value]", "e")]);
    let result = executor
        .execute_report(&conn, &widgets_report(), &request)
        .await;
    assert_eq!(result.records_filtered, result.records_total);
    Ok(())
}

#[tokio::test]
async fn global_search_over_text_columns() -> anyhow::Result<()> {
    let (_dir, conn) = widgets_db()?;
    let executor = ReportExecutor::new("duckdb")?;
    let report =
        Report::new("names", "SELECT name, colour FROM widgets").with_columns(["name", "colour"]);

    let request = PageRequest::from_params([("search[value]", "n")]);
    let result = executor.execute_report(&conn, &report, &request).await;

    assert_eq!(result.error, None);
    assert_eq!(result.records_total, 5);
    // "nut" and "hinge" match by name, "green" by colour.
    assert_eq!(result.records_filtered, 3);
    Ok(())
}

#[tokio::test]
async fn broken_report_yields_error_envelope() -> anyhow::Result<()> {
    let (_dir, conn) = widgets_db()?;
    let executor = ReportExecutor::new("postgres")?;
    let report = Report::new("broken", "SELECT * FROM no_such_table");

    let result = executor
        .execute_report(&conn, &report, &PageRequest::default())
        .await;

    assert!(result.is_error());
    assert_eq!(result.records_total, 0);
    assert_eq!(result.records_filtered, 0);
    assert!(result.data.is_empty());
    Ok(())
}

#[tokio::test]
async fn runtime_resolves_report_and_probes_columns() -> anyhow::Result<()> {
    let config = ReportflowConfig::from_toml(
        r#"
[datasources.default]
dialect = "duckdb"

[datasources.default.query]
default_page_length = 3

[datasources.default.duckdb]
max_concurrency = 2
"#,
    )?;
    let (_dir, conn) = widgets_db_with(&config.for_datasource("default").duckdb)?;
    assert_eq!(conn.max_concurrency(), 2);
    let mut connections = ConnectionManager::with_config(config);
    connections.insert("default", Arc::new(conn));

    let mut bare = Report::new("bare", "SELECT id, name FROM widgets WHERE colour = '{colour}'");
    bare.data_source = Some("default".to_string());
    let registry = ReportRegistry::from_reports(vec![widgets_report(), bare]);

    let result = run_report(&registry, &connections, "widgets", [("draw", "1")]).await?;
    assert_eq!(result.data.len(), 3);
    assert_eq!(result.headers, vec!["id", "name", "colour"]);

    let vars = [("colour".to_string(), "blue".to_string())].into_iter().collect();
    let columns = probe_report(&registry, &connections, "bare", &vars).await?;
    let names: Vec<_> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name"]);

    // Bare report: headers come from the result set.
    let result = run_report(
        &registry,
        &connections,
        "bare",
        [("vars[colour]", "blue")],
    )
    .await?;
    assert_eq!(result.headers, vec!["id", "name"]);
    assert_eq!(result.records_total, 2);

    assert!(run_report(&registry, &connections, "missing", Vec::<(String, String)>::new())
        .await
        .is_err());
    Ok(())
}
