mod common;

use common::{column, init_tracing, measure, sales_schema};
use sqexpr::config::AggregationOptions;
use sqexpr::query::aggregate::create_expr_with_options;
use sqexpr::query::builder::*;
use sqexpr::query::{
    create_expr_with_aggregate, remove_aggregate, remove_entity_variables, set_aggregate,
    AggregateFunction, ExprKind, SqExpr,
};

#[test]
fn set_then_remove_round_trips() {
    let sales = column("Sales");
    let restored = remove_aggregate(&set_aggregate(&sales, AggregateFunction::Sum));
    assert!(SqExpr::equals(&restored, &sales, false));
}

#[test]
fn set_aggregate_is_idempotent() {
    let once = set_aggregate(&column("Amount"), AggregateFunction::Avg);
    let twice = set_aggregate(&once, AggregateFunction::Avg);
    assert!(SqExpr::equals(&once, &twice, false));
}

#[test]
fn remove_aggregate_leaves_bare_columns() {
    let amount = column("Amount");
    assert!(SqExpr::ptr_eq(&remove_aggregate(&amount), &amount));
}

#[test]
fn aliases_are_stripped_inside_predicates() {
    let aliased = column_ref(entity("s", "Sales", Some("s0")), "Region");
    let expr = in_expr(vec![aliased], vec![vec![text("West")]]);
    let stripped = remove_entity_variables(&expr);
    let node = stripped.as_in().expect("still an In");
    let ExprKind::ColumnRef(region) = node.args[0].node() else {
        panic!("expected a column reference");
    };
    assert_eq!(region.source.as_entity().and_then(|e| e.variable.clone()), None);
    assert!(SqExpr::equals(&stripped, &expr, false));
}

#[test]
fn create_expr_prefers_supported_preferred_aggregate() {
    init_tracing();
    let schema = sales_schema();
    let wrapped = create_expr_with_aggregate(
        &column("Amount"),
        &schema,
        false,
        Some(AggregateFunction::Max),
    );
    assert_eq!(wrapped.as_aggregation().map(|a| a.func), Some(AggregateFunction::Max));
}

#[test]
fn create_expr_falls_back_to_declared_default() {
    let schema = sales_schema();
    let wrapped = create_expr_with_aggregate(&column("Amount"), &schema, false, None);
    assert_eq!(wrapped.as_aggregation().map(|a| a.func), Some(AggregateFunction::Sum));

    let discount = column("Discount");
    let unchanged = create_expr_with_aggregate(&discount, &schema, false, None);
    assert!(SqExpr::ptr_eq(&unchanged, &discount));
}

#[test]
fn non_numeric_fields_count_when_requested() {
    let schema = sales_schema();
    let region = column("Region");
    assert!(SqExpr::ptr_eq(
        &create_expr_with_aggregate(&region, &schema, false, None),
        &region
    ));
    let counted = create_expr_with_aggregate(&region, &schema, true, None);
    assert_eq!(
        counted.as_aggregation().map(|a| a.func),
        Some(AggregateFunction::CountNonNull)
    );
}

#[test]
fn measures_are_never_wrapped_by_default() {
    let schema = sales_schema();
    let options = AggregationOptions {
        aggregate_non_numeric_fields: false,
        preferred: Some(AggregateFunction::Sum),
    };
    let revenue = measure("Revenue");
    assert!(SqExpr::ptr_eq(
        &create_expr_with_options(&revenue, &schema, &options),
        &revenue
    ));
}
