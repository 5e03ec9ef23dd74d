//! Schema validation of expression trees.
//!
//! Validation is a rewrite pass that hands back the tree it was given and records
//! every problem it finds against the conceptual schema. Nothing is rejected eagerly;
//! callers inspect the collected [`SqExprValidationError`] list and decide.

use tracing::trace;

use crate::config::ValidationOptions;
use crate::query::aggregate::supported_aggregates;
use crate::query::ast::{
    AggregationExpr, BinaryExpr, CompareExpr, EntityExpr, ExprKind, InExpr, PropRefExpr, SqExpr,
};
use crate::query::errors::SqExprValidationError;
use crate::query::metadata::{resolve_entity, resolve_field, PropertyKind, SchemaProvider};
use crate::query::visitor::{rewrite_children, SqExprRewriter};

impl SqExpr {
    /// Validates the tree with default options.
    ///
    /// An empty result means the tree is valid against `provider`.
    pub fn validate(&self, provider: &dyn SchemaProvider) -> Vec<SqExprValidationError> {
        let mut errors = Vec::new();
        self.validate_with(provider, &ValidationOptions::default(), &mut errors);
        errors
    }

    /// Validates the tree, appending errors to `errors`, and returns the tree.
    pub fn validate_with(
        &self,
        provider: &dyn SchemaProvider,
        options: &ValidationOptions,
        errors: &mut Vec<SqExprValidationError>,
    ) -> SqExpr {
        let mut visitor = SqExprValidationVisitor::new(provider, *options, errors);
        self.rewrite(&mut visitor)
    }
}

/// Rewriter that checks every node it passes against the schema.
pub struct SqExprValidationVisitor<'s, 'e> {
    provider: &'s dyn SchemaProvider,
    options: ValidationOptions,
    errors: &'e mut Vec<SqExprValidationError>,
}

impl<'s, 'e> SqExprValidationVisitor<'s, 'e> {
    /// Creates a visitor appending to `errors`.
    pub fn new(
        provider: &'s dyn SchemaProvider,
        options: ValidationOptions,
        errors: &'e mut Vec<SqExprValidationError>,
    ) -> Self {
        Self {
            provider,
            options,
            errors,
        }
    }

    fn register(&mut self, error: SqExprValidationError) {
        trace!(code = error.code(), %error, "validation error");
        self.errors.push(error);
    }

    /// Checks a property reference whose source resolves to an entity.
    ///
    /// Unresolvable sources are skipped; the entity check reports them.
    fn validate_property(&mut self, node: &PropRefExpr, expected: PropertyKind) {
        let Some(source) = node.source.as_entity() else {
            return;
        };
        let Some(entity) = resolve_entity(self.provider, &source.schema, &source.entity) else {
            return;
        };
        let valid = entity.property(&node.name).is_some_and(|property| {
            property.kind == expected
                && (property.is_queryable() || !self.options.reject_unqueryable)
        });
        if valid {
            return;
        }
        let entity = source.entity.clone();
        let property = node.name.clone();
        self.register(match expected {
            PropertyKind::Column => SqExprValidationError::InvalidColumnReference { entity, property },
            PropertyKind::Measure => SqExprValidationError::InvalidMeasureReference { entity, property },
        });
    }

    fn validate_compatible(&mut self, left: &SqExpr, right: &SqExpr) {
        if !self.options.check_value_types {
            return;
        }
        let (Some(left), Some(right)) = (left.metadata(self.provider), right.metadata(self.provider))
        else {
            return;
        };
        if !left.ty.is_compatible_from(right.ty) {
            self.register(SqExprValidationError::InvalidValueType {
                expected: left.ty,
                found: right.ty,
            });
        }
    }

    /// Operand checks are independent; compatibility is only checked when both pass.
    fn validate_text_predicate(&mut self, operator: &'static str, node: &BinaryExpr) {
        let left_ok = matches!(node.left.node(), ExprKind::ColumnRef(_));
        if !left_ok {
            self.register(SqExprValidationError::InvalidLeftOperandType { operator });
        }
        let right_ok = node.right.as_constant().is_some_and(|c| c.ty().is_text());
        if !right_ok {
            self.register(SqExprValidationError::InvalidRightOperandType { operator });
        }
        if left_ok && right_ok {
            self.validate_compatible(&node.left, &node.right);
        }
    }
}

impl SqExprRewriter for SqExprValidationVisitor<'_, '_> {
    fn rewrite_entity(&mut self, expr: &SqExpr, node: &EntityExpr) -> SqExpr {
        match self.provider.schema(&node.schema) {
            None => self.register(SqExprValidationError::InvalidSchemaReference {
                schema: node.schema.clone(),
            }),
            Some(schema) if schema.entity(&node.entity).is_none() => {
                self.register(SqExprValidationError::InvalidEntityReference {
                    schema: node.schema.clone(),
                    entity: node.entity.clone(),
                })
            }
            Some(_) => {}
        }
        expr.clone()
    }

    fn rewrite_column_ref(&mut self, expr: &SqExpr, node: &PropRefExpr) -> SqExpr {
        let expr = rewrite_children(self, expr);
        self.validate_property(node, PropertyKind::Column);
        expr
    }

    fn rewrite_measure_ref(&mut self, expr: &SqExpr, node: &PropRefExpr) -> SqExpr {
        let expr = rewrite_children(self, expr);
        self.validate_property(node, PropertyKind::Measure);
        expr
    }

    fn rewrite_aggregation(&mut self, expr: &SqExpr, node: &AggregationExpr) -> SqExpr {
        let expr = rewrite_children(self, expr);
        if let Some(field) = resolve_field(&expr, self.provider) {
            if !supported_aggregates(&expr, self.provider).contains(&node.func) {
                self.register(SqExprValidationError::InvalidAggregateFunction {
                    func: node.func,
                    property: field.property_name.to_owned(),
                });
            }
        }
        expr
    }

    fn rewrite_compare(&mut self, expr: &SqExpr, node: &CompareExpr) -> SqExpr {
        let expr = rewrite_children(self, expr);
        self.validate_compatible(&node.left, &node.right);
        expr
    }

    fn rewrite_in(&mut self, expr: &SqExpr, node: &InExpr) -> SqExpr {
        let expr = rewrite_children(self, expr);
        for tuple in &node.values {
            for (arg, value) in node.args.iter().zip(tuple) {
                self.validate_compatible(arg, value);
            }
        }
        expr
    }

    fn rewrite_contains(&mut self, expr: &SqExpr, node: &BinaryExpr) -> SqExpr {
        let expr = rewrite_children(self, expr);
        self.validate_text_predicate("contains", node);
        expr
    }

    fn rewrite_starts_with(&mut self, expr: &SqExpr, node: &BinaryExpr) -> SqExpr {
        let expr = rewrite_children(self, expr);
        self.validate_text_predicate("startsWith", node);
        expr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::{AggregateFunction, ComparisonKind};
    use crate::query::builder::*;
    use crate::query::metadata::{
        ConceptualEntity, ConceptualProperty, FederatedSchema, QueryableState,
    };
    use crate::query::value::ValueType;

    fn schema() -> FederatedSchema {
        FederatedSchema::new().with_entity(
            "s",
            "Sales",
            ConceptualEntity::new()
                .with_property("Region", ConceptualProperty::column(ValueType::Text))
                .with_property("Amount", ConceptualProperty::column(ValueType::Integer))
                .with_property(
                    "Legacy",
                    ConceptualProperty::column(ValueType::Text)
                        .with_queryable(QueryableState::Error),
                )
                .with_property("Total", ConceptualProperty::measure(ValueType::Double)),
        )
    }

    fn sales() -> SqExpr {
        entity("s", "Sales", None)
    }

    #[test]
    fn valid_tree_has_no_errors() {
        let expr = and(
            equal(column_ref(sales(), "Region"), text("West")),
            compare(
                ComparisonKind::GreaterThan,
                aggregate(column_ref(sales(), "Amount"), AggregateFunction::Sum),
                double(10.0),
            ),
        );
        assert!(expr.validate(&schema()).is_empty());
    }

    #[test]
    fn returns_same_tree() {
        let schema = schema();
        let expr = equal(column_ref(sales(), "Nope"), text("x"));
        let mut errors = Vec::new();
        let out = expr.validate_with(&schema, &ValidationOptions::default(), &mut errors);
        assert!(SqExpr::ptr_eq(&out, &expr));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn unknown_schema_and_entity() {
        let schema = schema();
        let errors = column_ref(entity("x", "Sales", None), "Region").validate(&schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "InvalidSchemaReference");
        let errors = column_ref(entity("s", "Nope", None), "Region").validate(&schema);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code(), "InvalidEntityReference");
    }

    #[test]
    fn kind_mismatch_and_unqueryable() {
        let schema = schema();
        let errors = measure_ref(sales(), "Region").validate(&schema);
        assert_eq!(errors[0].code(), "InvalidMeasureReference");
        let errors = column_ref(sales(), "Total").validate(&schema);
        assert_eq!(errors[0].code(), "InvalidColumnReference");

        let legacy = column_ref(sales(), "Legacy");
        assert_eq!(legacy.validate(&schema).len(), 1);
        let lenient = ValidationOptions {
            reject_unqueryable: false,
            ..ValidationOptions::default()
        };
        let mut errors = Vec::new();
        legacy.validate_with(&schema, &lenient, &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn aggregate_must_be_supported() {
        let schema = schema();
        let errors = aggregate(column_ref(sales(), "Region"), AggregateFunction::Sum).validate(&schema);
        assert_eq!(
            errors,
            vec![SqExprValidationError::InvalidAggregateFunction {
                func: AggregateFunction::Sum,
                property: "Region".into(),
            }]
        );
        let errors = aggregate(measure_ref(sales(), "Total"), AggregateFunction::Sum).validate(&schema);
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn text_predicates_check_operands() {
        let schema = schema();
        let region = column_ref(sales(), "Region");
        let errors = contains(text("a"), text("b")).validate(&schema);
        assert_eq!(errors[0].code(), "InvalidLeftOperandType");
        let errors = starts_with(region.clone(), integer(1)).validate(&schema);
        assert_eq!(errors[0].code(), "InvalidRightOperandType");
        let errors = contains(column_ref(sales(), "Amount"), text("1")).validate(&schema);
        assert_eq!(errors[0].code(), "InvalidValueType");
        assert!(contains(region, text("We")).validate(&schema).is_empty());
    }

    #[test]
    fn text_predicate_reports_both_bad_operands() {
        let schema = schema();
        let codes: Vec<_> = contains(text("a"), integer(1))
            .validate(&schema)
            .iter()
            .map(SqExprValidationError::code)
            .collect();
        assert_eq!(codes, vec!["InvalidLeftOperandType", "InvalidRightOperandType"]);

        let errors = starts_with(measure_ref(sales(), "Total"), column_ref(sales(), "Region"))
            .validate(&schema);
        assert_eq!(
            errors,
            vec![
                SqExprValidationError::InvalidLeftOperandType { operator: "startsWith" },
                SqExprValidationError::InvalidRightOperandType { operator: "startsWith" },
            ]
        );
    }

    #[test]
    fn in_checks_each_value() {
        let schema = schema();
        let expr = in_expr(
            vec![column_ref(sales(), "Amount")],
            vec![vec![integer(1)], vec![text("two")], vec![null_constant()]],
        );
        let errors = expr.validate(&schema);
        assert_eq!(
            errors,
            vec![SqExprValidationError::InvalidValueType {
                expected: ValueType::Integer,
                found: ValueType::Text,
            }]
        );
    }
}
