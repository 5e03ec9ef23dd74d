//! Aggregate selection for field expressions.

use tracing::trace;

use crate::config::AggregationOptions;
use crate::query::ast::{AggregateFunction, ExprKind, SqExpr};
use crate::query::builder;
use crate::query::metadata::{
    resolve_field, ConceptualDefaultAggregate, PropertyKind, SchemaProvider,
};
use crate::query::value::ValueType;

const NUMERIC_AGGREGATES: &[AggregateFunction] = &[
    AggregateFunction::Sum,
    AggregateFunction::Avg,
    AggregateFunction::Min,
    AggregateFunction::Max,
    AggregateFunction::Count,
    AggregateFunction::CountNonNull,
    AggregateFunction::Median,
    AggregateFunction::StandardDeviation,
    AggregateFunction::Variance,
];

const TEMPORAL_AGGREGATES: &[AggregateFunction] = &[
    AggregateFunction::Min,
    AggregateFunction::Max,
    AggregateFunction::Count,
    AggregateFunction::CountNonNull,
];

const COUNT_AGGREGATES: &[AggregateFunction] =
    &[AggregateFunction::Count, AggregateFunction::CountNonNull];

/// Aggregates the field underlying `expr` can be wrapped in.
///
/// Unresolvable fields and measures support nothing. A column's explicit aggregate
/// list wins; key columns only support counting; otherwise the set follows the
/// column type.
pub fn supported_aggregates(expr: &SqExpr, provider: &dyn SchemaProvider) -> Vec<AggregateFunction> {
    let Some(field) = resolve_field(expr, provider) else {
        return Vec::new();
    };
    let property = field.property;
    if property.kind == PropertyKind::Measure {
        return Vec::new();
    }
    let column = property.column.as_ref();
    if let Some(explicit) = column.and_then(|c| c.aggregates.as_ref()) {
        return explicit.clone();
    }
    if column.is_some_and(|c| c.id_on_entity_key) {
        return COUNT_AGGREGATES.to_vec();
    }
    if property.ty.is_numeric() {
        NUMERIC_AGGREGATES.to_vec()
    } else if property.ty.is_temporal() {
        TEMPORAL_AGGREGATES.to_vec()
    } else {
        COUNT_AGGREGATES.to_vec()
    }
}

/// Returns true when `func` is in [`supported_aggregates`] for `expr`.
pub fn is_supported_aggregate(
    expr: &SqExpr,
    provider: &dyn SchemaProvider,
    func: AggregateFunction,
) -> bool {
    supported_aggregates(expr, provider).contains(&func)
}

fn type_default(ty: ValueType) -> AggregateFunction {
    if ty.is_numeric() {
        AggregateFunction::Sum
    } else {
        AggregateFunction::Count
    }
}

impl SqExpr {
    /// Aggregate a field is wrapped in when the caller does not choose one.
    ///
    /// Numeric columns use their declared default, or the type default when the
    /// declaration is `Default`; a declared `None` suppresses aggregation. With
    /// `force`, columns left without an aggregate get the type default. Measures,
    /// aggregations, and unresolvable expressions have no default.
    pub fn default_aggregate(
        &self,
        provider: &dyn SchemaProvider,
        force: bool,
    ) -> Option<AggregateFunction> {
        if matches!(self.node(), ExprKind::Aggregation(_)) {
            return None;
        }
        let property = resolve_field(self, provider)?.property;
        if property.kind != PropertyKind::Column {
            return None;
        }
        let declared = property
            .column
            .as_ref()
            .map(|c| c.default_aggregate)
            .unwrap_or_default();
        let mut aggregate = None;
        if property.ty.is_numeric() && declared != ConceptualDefaultAggregate::None {
            aggregate = declared
                .to_aggregate_function()
                .or_else(|| Some(type_default(property.ty)));
        }
        if aggregate.is_none() && force {
            aggregate = Some(type_default(property.ty));
        }
        aggregate
    }
}

/// Wraps `expr` in the aggregate a visual would apply to it.
///
/// `preferred` wins when the field supports it; otherwise the field's unforced
/// default applies; otherwise `CountNonNull` when `aggregate_non_numeric_fields`
/// is set. Without any of these `expr` comes back unchanged.
pub fn create_expr_with_aggregate(
    expr: &SqExpr,
    provider: &dyn SchemaProvider,
    aggregate_non_numeric_fields: bool,
    preferred: Option<AggregateFunction>,
) -> SqExpr {
    let aggregate = preferred
        .filter(|func| is_supported_aggregate(expr, provider, *func))
        .or_else(|| expr.default_aggregate(provider, false))
        .or(aggregate_non_numeric_fields.then_some(AggregateFunction::CountNonNull));
    match aggregate {
        Some(func) => {
            trace!(%expr, %func, "wrapping field in aggregate");
            builder::aggregate(expr.clone(), func)
        }
        None => expr.clone(),
    }
}

/// [`create_expr_with_aggregate`] driven by configured options.
pub fn create_expr_with_options(
    expr: &SqExpr,
    provider: &dyn SchemaProvider,
    options: &AggregationOptions,
) -> SqExpr {
    create_expr_with_aggregate(
        expr,
        provider,
        options.aggregate_non_numeric_fields,
        options.preferred,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::builder::*;
    use crate::query::metadata::{ConceptualEntity, ConceptualProperty, FederatedSchema};

    fn schema() -> FederatedSchema {
        FederatedSchema::new().with_entity(
            "s",
            "Sales",
            ConceptualEntity::new()
                .with_property("Amount", ConceptualProperty::column(ValueType::Double))
                .with_property(
                    "Units",
                    ConceptualProperty::column(ValueType::Integer)
                        .with_default_aggregate(ConceptualDefaultAggregate::Average),
                )
                .with_property(
                    "Code",
                    ConceptualProperty::column(ValueType::Integer)
                        .with_default_aggregate(ConceptualDefaultAggregate::None),
                )
                .with_property("Region", ConceptualProperty::column(ValueType::Text))
                .with_property("OrderDate", ConceptualProperty::column(ValueType::DateTime))
                .with_property(
                    "Id",
                    ConceptualProperty::column(ValueType::Integer).with_id_on_entity_key(),
                )
                .with_property(
                    "Price",
                    ConceptualProperty::column(ValueType::Decimal)
                        .with_aggregates([AggregateFunction::Min, AggregateFunction::Max]),
                )
                .with_property("Total", ConceptualProperty::measure(ValueType::Double)),
        )
    }

    fn field(name: &str) -> SqExpr {
        column_ref(entity("s", "Sales", None), name)
    }

    #[test]
    fn supported_sets_follow_type_and_declarations() {
        let schema = schema();
        assert!(supported_aggregates(&field("Amount"), &schema).contains(&AggregateFunction::Median));
        assert_eq!(
            supported_aggregates(&field("OrderDate"), &schema),
            TEMPORAL_AGGREGATES.to_vec()
        );
        assert_eq!(supported_aggregates(&field("Region"), &schema), COUNT_AGGREGATES.to_vec());
        assert_eq!(supported_aggregates(&field("Id"), &schema), COUNT_AGGREGATES.to_vec());
        assert_eq!(
            supported_aggregates(&field("Price"), &schema),
            vec![AggregateFunction::Min, AggregateFunction::Max]
        );
        let total = measure_ref(entity("s", "Sales", None), "Total");
        assert!(supported_aggregates(&total, &schema).is_empty());
        assert!(supported_aggregates(&field("Missing"), &schema).is_empty());
    }

    #[test]
    fn default_aggregate_priority() {
        let schema = schema();
        assert_eq!(field("Amount").default_aggregate(&schema, false), Some(AggregateFunction::Sum));
        assert_eq!(field("Units").default_aggregate(&schema, false), Some(AggregateFunction::Avg));
        assert_eq!(field("Code").default_aggregate(&schema, false), None);
        assert_eq!(field("Code").default_aggregate(&schema, true), Some(AggregateFunction::Sum));
        assert_eq!(field("Region").default_aggregate(&schema, false), None);
        assert_eq!(field("Region").default_aggregate(&schema, true), Some(AggregateFunction::Count));
    }

    #[test]
    fn preferred_aggregate_requires_support() {
        let schema = schema();
        let region = field("Region");
        let unchanged =
            create_expr_with_aggregate(&region, &schema, false, Some(AggregateFunction::Sum));
        assert!(SqExpr::ptr_eq(&unchanged, &region));

        let counted = create_expr_with_aggregate(
            &field("Region"),
            &schema,
            true,
            Some(AggregateFunction::Sum),
        );
        assert_eq!(
            counted.as_aggregation().map(|a| a.func),
            Some(AggregateFunction::CountNonNull)
        );

        let preferred = create_expr_with_aggregate(
            &field("Amount"),
            &schema,
            false,
            Some(AggregateFunction::Max),
        );
        assert_eq!(preferred.as_aggregation().map(|a| a.func), Some(AggregateFunction::Max));
    }
}
