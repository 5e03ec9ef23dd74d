mod common;

use std::io::Write;

use common::{column, init_tracing, measure, sales, sales_schema};
use sqexpr::config::ValidationOptions;
use sqexpr::query::builder::*;
use sqexpr::query::errors::ValidationErrorWithCode;
use sqexpr::query::metadata::{grouping_keys, is_column, is_measure, PropertyKind};
use sqexpr::query::{
    AggregateFunction, ComparisonKind, FederatedSchema, SqExpr, SqExprValidationError, ValueType,
};
use sqexpr::Error;

#[test]
fn missing_property_yields_single_column_error() {
    init_tracing();
    let schema = sales_schema();
    let errors = column("DoesNotExist").validate(&schema);
    assert_eq!(
        errors,
        vec![SqExprValidationError::InvalidColumnReference {
            entity: "Sales".into(),
            property: "DoesNotExist".into(),
        }]
    );
}

#[test]
fn text_column_compared_to_integer_is_invalid() {
    init_tracing();
    let schema = sales_schema();
    let errors = equal(column("Region"), integer(1)).validate(&schema);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code(), "InvalidValueType");
    assert_eq!(
        ValidationErrorWithCode(&errors[0]).to_string(),
        "[InvalidValueType] integer value is not compatible with text"
    );
}

#[test]
fn numeric_types_are_assignable() {
    let schema = sales_schema();
    let expr = and(
        compare(ComparisonKind::LessThan, column("Discount"), integer(3)),
        compare(ComparisonKind::GreaterThanOrEqual, column("Amount"), decimal(2.5)),
    );
    assert!(expr.validate(&schema).is_empty());
}

#[test]
fn errors_accumulate_across_the_tree() {
    init_tracing();
    let schema = sales_schema();
    let expr = and(
        equal(column_ref(entity("missing", "Sales", None), "Region"), text("x")),
        and(
            exists(measure("Region")),
            starts_with(measure("Revenue"), text("R")),
        ),
    );
    let codes: Vec<_> = expr.validate(&schema).iter().map(|e| e.code()).collect();
    assert_eq!(
        codes,
        vec![
            "InvalidSchemaReference",
            "InvalidMeasureReference",
            "InvalidLeftOperandType",
        ]
    );
}

#[test]
fn caller_supplied_list_is_appended() {
    let schema = sales_schema();
    let mut errors = vec![SqExprValidationError::InvalidSchemaReference {
        schema: "earlier".into(),
    }];
    column("Legacy").validate_with(&schema, &ValidationOptions::default(), &mut errors);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[1].code(), "InvalidColumnReference");
}

#[test]
fn type_checks_can_be_disabled() {
    let schema = sales_schema();
    let options = ValidationOptions {
        check_value_types: false,
        ..ValidationOptions::default()
    };
    let mut errors = Vec::new();
    equal(column("Region"), integer(1)).validate_with(&schema, &options, &mut errors);
    assert!(errors.is_empty());
}

#[test]
fn aggregates_are_checked_against_the_column() {
    let schema = sales_schema();
    assert!(aggregate(column("Amount"), AggregateFunction::Median)
        .validate(&schema)
        .is_empty());
    let errors = aggregate(column("ProductId"), AggregateFunction::Sum).validate(&schema);
    assert_eq!(errors[0].code(), "InvalidAggregateFunction");
    let errors = aggregate(column("OrderDate"), AggregateFunction::Avg).validate(&schema);
    assert_eq!(errors.len(), 1);
}

#[test]
fn variation_hierarchy_levels_resolve() {
    let schema = sales_schema();
    let level = hierarchy_level(
        hierarchy(
            property_variation_source(sales(), "Variation", "OrderDate"),
            "Date Hierarchy",
        ),
        "Year",
    );
    assert!(is_column(&level));
    let metadata = level.metadata(&schema).expect("level resolves");
    assert_eq!(metadata.kind, PropertyKind::Column);
    assert_eq!(metadata.ty, ValueType::Integer);
    assert!(equal(level, integer(2024)).validate(&schema).is_empty());
}

#[test]
fn metadata_reports_format_and_measures() {
    let schema = sales_schema();
    let amount = column("Amount").metadata(&schema).expect("metadata");
    assert_eq!(amount.format.as_deref(), Some("#,0"));
    let revenue = measure("Revenue");
    assert!(is_measure(&revenue));
    assert_eq!(
        revenue.metadata(&schema).map(|m| m.kind),
        Some(PropertyKind::Measure)
    );
    assert!(now().metadata(&schema).is_none());
}

#[test]
fn grouping_uses_declared_keys() {
    let schema = sales_schema();
    let keys = grouping_keys(&column("Product"), &schema);
    assert_eq!(keys.len(), 1);
    assert!(SqExpr::equals(&keys[0], &column("ProductId"), false));
}

#[test]
fn json_fixture_loads_from_disk() {
    let mut file = tempfile::Builder::new()
        .suffix(".json")
        .tempfile()
        .expect("temp file");
    write!(
        file,
        r#"{{"schemas": {{"m": {{"entities": {{"T": {{"properties": {{
            "Name": {{"kind": "column", "type": "text"}}
        }}}}}}}}}}}}"#
    )
    .expect("write");
    let schema = FederatedSchema::load(file.path()).expect("load");
    let name = column_ref(entity("m", "T", None), "Name");
    assert!(name.validate(&schema).is_empty());
}

#[test]
fn dangling_variation_is_rejected() {
    let input = r#"
        [schemas.s.entities.Sales.properties.Date]
        kind = "column"
        type = "dateTime"

        [[schemas.s.entities.Sales.properties.Date.column.variations]]
        name = "Variation"
        target_entity = "Nowhere"
    "#;
    let err = FederatedSchema::from_toml_str(input).expect_err("dangling variation");
    assert!(matches!(err, Error::InvalidSchema(_)));
}
