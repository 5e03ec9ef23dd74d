mod common;

use std::fs;

use common::{column, init_tracing, sales_schema};
use sqexpr::query::aggregate::create_expr_with_options;
use sqexpr::query::AggregateFunction;
use sqexpr::{Config, Error};
use tempfile::tempdir;

#[test]
fn loads_options_from_file() {
    init_tracing();
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("sqexpr.toml");
    fs::write(
        &path,
        "[aggregation]\naggregate_non_numeric_fields = true\npreferred = \"min\"\n",
    )
    .expect("write config");
    let config = Config::load(&path).expect("load");
    assert!(config.aggregation.aggregate_non_numeric_fields);
    assert_eq!(config.aggregation.preferred, Some(AggregateFunction::Min));
    assert!(config.validation.check_value_types);

    let schema = sales_schema();
    let region = create_expr_with_options(&column("Region"), &schema, &config.aggregation);
    assert_eq!(
        region.as_aggregation().map(|a| a.func),
        Some(AggregateFunction::CountNonNull)
    );
    let amount = create_expr_with_options(&column("Amount"), &schema, &config.aggregation);
    assert_eq!(amount.as_aggregation().map(|a| a.func), Some(AggregateFunction::Min));
}

#[test]
fn missing_file_reports_path() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("absent.toml");
    match Config::load(&path) {
        Err(Error::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected io error, got {other:?}"),
    }
    assert_eq!(
        Config::load_or_default(Some(path)).expect("defaults"),
        Config::default()
    );
    assert_eq!(Config::load_or_default(None).expect("defaults"), Config::default());
}
