//! Loading report definitions from YAML files.

use std::fs;

use reportflow::registry::ReportRegistry;
use reportflow::{load_and_validate, ReportflowError, Validator};

const ORDERS_YAML: &str = r#"
name: orders
data_source: sales
description: Open orders by customer
base_query: |
  SELECT id, customer, total FROM orders WHERE region = '{region}';
columns:
  - id
  - name: customer
    display: Customer
  - name: total
    display: Order total
    type: number
    desc: Gross amount
"#;

#[test]
fn loads_reports_from_yaml_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("orders.yaml"), ORDERS_YAML).unwrap();
    fs::write(
        dir.path().join("bare.yml"),
        "name: bare\nbase_query: SELECT 1 AS one\n",
    )
    .unwrap();
    fs::write(dir.path().join("notes.txt"), "not a report").unwrap();

    let registry = ReportRegistry::load_from_dir(dir.path()).unwrap();
    assert_eq!(registry.len(), 2);

    let orders = registry.get_report("orders").unwrap();
    assert_eq!(orders.data_source_name(), "sales");
    assert_eq!(orders.column_names(), vec!["id", "customer", "total"]);
    assert_eq!(orders.columns[0].display, "id");
    assert_eq!(orders.columns[0].data_type, "text");
    assert_eq!(orders.columns[1].display, "Customer");
    assert_eq!(orders.columns[2].data_type, "number");
    assert_eq!(orders.columns[2].description, "Gross amount");

    let bare = registry.get_report("bare").unwrap();
    assert_eq!(bare.data_source_name(), "default");
    assert!(bare.columns.is_empty());
}

#[test]
fn missing_directory_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ReportRegistry::load_from_dir(dir.path().join("absent")).unwrap_err();
    assert!(matches!(err, ReportflowError::Validation(_)));
}

#[test]
fn malformed_yaml_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("broken.yaml"), "name: [unterminated").unwrap();
    let err = ReportRegistry::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, ReportflowError::Yaml(_)));
}

#[test]
fn strict_validation_rejects_duplicate_columns() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("dupes.yaml"),
        "name: dupes\nbase_query: SELECT a, a FROM t\ncolumns: [a, a]\n",
    )
    .unwrap();

    let err = load_and_validate(dir.path(), &Validator::new(false)).unwrap_err();
    assert!(matches!(err, ReportflowError::Validation(_)));

    let registry = load_and_validate(dir.path(), &Validator::new(true)).unwrap();
    assert!(registry.get_report("dupes").is_some());
}
