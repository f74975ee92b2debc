//! Statement rendering across the supported dialects.

use reportflow::dialect::{Dialect, DialectKind, MsSqlDialect, MySqlDialect, PostgresDialect};
use reportflow::models::{PageRequest, Report, SortDirection};
use reportflow::query_builder::{build_filter_conditions, process_variables, SqlBuilder};

fn widgets() -> Report {
    Report::new("widgets", "SELECT id, name FROM widgets").with_columns(["id", "name"])
}

fn page(start: u64, length: u64) -> PageRequest {
    PageRequest {
        start,
        length,
        order_column_index: Some(0),
        ..Default::default()
    }
}

#[test]
fn windowed_pages_do_not_overlap_or_skip() {
    let builder = SqlBuilder::default();
    let first = builder.build_with_dialect(&widgets(), &page(0, 10), &MsSqlDialect);
    let second = builder.build_with_dialect(&widgets(), &page(10, 10), &MsSqlDialect);
    assert!(first.paginated.contains("RowNo > 0 AND RowNo <= 10"));
    assert!(second.paginated.contains("RowNo > 10 AND RowNo <= 20"));
}

#[test]
fn native_dialects_map_start_and_length_directly() {
    for dialect in [&PostgresDialect as &dyn Dialect, &MySqlDialect] {
        let sql = SqlBuilder::default()
            .build_with_dialect(&widgets(), &page(10, 10), dialect)
            .paginated;
        assert!(sql.ends_with("LIMIT 10 OFFSET 10"), "{sql}");
        assert!(dialect.supports_native_paging());
    }
    assert!(!MsSqlDialect.supports_native_paging());
}

#[test]
fn every_dialect_quotes_projected_columns() {
    let expectations = [
        (DialectKind::MsSql, "SELECT [id], [name] FROM"),
        (DialectKind::Postgres, "SELECT \"id\", \"name\" FROM"),
        (DialectKind::MySql, "SELECT `id`, `name` FROM"),
    ];
    for (kind, prefix) in expectations {
        let sql = SqlBuilder::default()
            .build_with_dialect(&widgets(), &page(0, 10), kind.dialect())
            .paginated;
        assert!(sql.starts_with(prefix), "{sql}");
    }
}

#[test]
fn descending_order_reaches_the_statement() {
    let mut request = page(0, 5);
    request.order_column_index = Some(1);
    request.order_direction = SortDirection::from_input("Desc");
    let sql = SqlBuilder::default()
        .build_with_dialect(&widgets(), &request, &PostgresDialect)
        .paginated;
    assert!(sql.contains("ORDER BY \"name\" DESC"));

    request.order_direction = SortDirection::from_input("banana");
    let sql = SqlBuilder::default()
        .build_with_dialect(&widgets(), &request, &PostgresDialect)
        .paginated;
    assert!(sql.contains("ORDER BY \"name\" ASC"));
}

#[test]
fn global_search_fragment_matches_contract() {
    let columns = vec!["a".to_string(), "b".to_string()];
    assert!(build_filter_conditions(&columns, &Default::default(), "").is_empty());
    assert_eq!(
        build_filter_conditions(&columns, &Default::default(), "x"),
        vec!["(a LIKE '%x%' OR b LIKE '%x%')".to_string()]
    );
}

#[test]
fn variables_substitute_literally() {
    let vars = [("id".to_string(), "5".to_string())].into_iter().collect();
    assert_eq!(
        process_variables("SELECT * FROM t WHERE id={id}", &vars),
        "SELECT * FROM t WHERE id=5"
    );
}

#[test]
fn row_number_phrase_is_reported() {
    for kind in [DialectKind::MsSql, DialectKind::Postgres, DialectKind::MySql] {
        assert_eq!(kind.dialect().row_number_syntax(), "ROW_NUMBER() OVER");
    }
}

#[test]
fn probe_idioms_differ_per_engine() {
    assert_eq!(
        MsSqlDialect.build_probe_query("SELECT 1 AS x"),
        "SELECT TOP 1 * FROM (SELECT 1 AS x) AS probe"
    );
    assert_eq!(
        MySqlDialect.build_probe_query("SELECT 1 AS x"),
        "SELECT * FROM (SELECT 1 AS x) AS probe LIMIT 1"
    );
}
