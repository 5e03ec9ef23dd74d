//! Builder functions, one per expression kind.
//!
//! These are the only way to obtain an [`SqExpr`]. Constant builders compute the
//! encoded form so a constant's native value and encoding never disagree.

use time::PrimitiveDateTime;
use tracing::trace;

use crate::query::ast::{
    AggregateFunction, AggregationExpr, BetweenExpr, BinaryExpr, CompareExpr, ComparisonKind,
    ConstantExpr, DateAddExpr, DateSpanExpr, EntityExpr, ExprKind, HierarchyExpr,
    HierarchyLevelExpr, InExpr, PropRefExpr, PropertyVariationSourceExpr, SqExpr, TimeUnit,
    UnaryExpr,
};
use crate::query::equality::sequence_equal;
use crate::query::value::PrimitiveValue;

/// Entity reference with an optional query-local alias.
pub fn entity(
    schema: impl Into<String>,
    entity: impl Into<String>,
    variable: Option<&str>,
) -> SqExpr {
    SqExpr::new(ExprKind::Entity(EntityExpr {
        schema: schema.into(),
        entity: entity.into(),
        variable: variable.map(str::to_owned),
    }))
}

/// Column property of `source`.
pub fn column_ref(source: SqExpr, name: impl Into<String>) -> SqExpr {
    SqExpr::new(ExprKind::ColumnRef(PropRefExpr {
        source,
        name: name.into(),
    }))
}

/// Measure property of `source`.
pub fn measure_ref(source: SqExpr, name: impl Into<String>) -> SqExpr {
    SqExpr::new(ExprKind::MeasureRef(PropRefExpr {
        source,
        name: name.into(),
    }))
}

/// Aggregate `func` applied to `arg`.
pub fn aggregate(arg: SqExpr, func: AggregateFunction) -> SqExpr {
    SqExpr::new(ExprKind::Aggregation(AggregationExpr { arg, func }))
}

/// Variation `name` declared on column `property` of `arg`.
pub fn property_variation_source(
    arg: SqExpr,
    name: impl Into<String>,
    property: impl Into<String>,
) -> SqExpr {
    SqExpr::new(ExprKind::PropertyVariationSource(
        PropertyVariationSourceExpr {
            arg,
            name: name.into(),
            property: property.into(),
        },
    ))
}

/// Hierarchy `hierarchy` on `arg`.
pub fn hierarchy(arg: SqExpr, hierarchy: impl Into<String>) -> SqExpr {
    SqExpr::new(ExprKind::Hierarchy(HierarchyExpr {
        arg,
        hierarchy: hierarchy.into(),
    }))
}

/// Level `level` of the hierarchy expression `arg`.
pub fn hierarchy_level(arg: SqExpr, level: impl Into<String>) -> SqExpr {
    SqExpr::new(ExprKind::HierarchyLevel(HierarchyLevelExpr {
        arg,
        level: level.into(),
    }))
}

/// Conjunction of two predicates.
pub fn and(left: SqExpr, right: SqExpr) -> SqExpr {
    SqExpr::new(ExprKind::And(BinaryExpr { left, right }))
}

/// Conjunction that degrades to the present operand when the other is absent.
pub fn and_opt(left: Option<SqExpr>, right: Option<SqExpr>) -> Option<SqExpr> {
    match (left, right) {
        (Some(left), Some(right)) => Some(and(left, right)),
        (left, right) => left.or(right),
    }
}

/// Disjunction of two predicates.
///
/// Two In predicates over identical argument lists merge into one In whose value
/// tuples are the left tuples followed by the right tuples.
pub fn or(left: SqExpr, right: SqExpr) -> SqExpr {
    if let (Some(l), Some(r)) = (left.as_in(), right.as_in()) {
        if sequence_equal(&l.args, &r.args, false) {
            trace!(args = l.args.len(), "merging In predicates under Or");
            let values = l.values.iter().chain(&r.values).cloned().collect();
            return in_expr(l.args.clone(), values);
        }
    }
    SqExpr::new(ExprKind::Or(BinaryExpr { left, right }))
}

/// Disjunction that degrades to the present operand when the other is absent.
pub fn or_opt(left: Option<SqExpr>, right: Option<SqExpr>) -> Option<SqExpr> {
    match (left, right) {
        (Some(left), Some(right)) => Some(or(left, right)),
        (left, right) => left.or(right),
    }
}

/// Range predicate `lower <= arg <= upper`.
pub fn between(arg: SqExpr, lower: SqExpr, upper: SqExpr) -> SqExpr {
    SqExpr::new(ExprKind::Between(BetweenExpr { arg, lower, upper }))
}

/// Set membership of the `args` tuple in `values`.
///
/// Every tuple in `values` must have exactly `args.len()` entries.
pub fn in_expr(args: Vec<SqExpr>, values: Vec<Vec<SqExpr>>) -> SqExpr {
    debug_assert!(
        values.iter().all(|tuple| tuple.len() == args.len()),
        "In value tuples must match the argument count"
    );
    SqExpr::new(ExprKind::In(InExpr { args, values }))
}

/// Binary comparison.
pub fn compare(comparison: ComparisonKind, left: SqExpr, right: SqExpr) -> SqExpr {
    SqExpr::new(ExprKind::Compare(CompareExpr {
        comparison,
        left,
        right,
    }))
}

/// Equality comparison.
pub fn equal(left: SqExpr, right: SqExpr) -> SqExpr {
    compare(ComparisonKind::Equal, left, right)
}

/// Text containment.
pub fn contains(left: SqExpr, right: SqExpr) -> SqExpr {
    SqExpr::new(ExprKind::Contains(BinaryExpr { left, right }))
}

/// Text prefix match.
pub fn starts_with(left: SqExpr, right: SqExpr) -> SqExpr {
    SqExpr::new(ExprKind::StartsWith(BinaryExpr { left, right }))
}

/// Existence predicate.
pub fn exists(arg: SqExpr) -> SqExpr {
    SqExpr::new(ExprKind::Exists(UnaryExpr { arg }))
}

/// Boolean negation.
pub fn not(arg: SqExpr) -> SqExpr {
    SqExpr::new(ExprKind::Not(UnaryExpr { arg }))
}

/// Adds `amount` units to the date expression `arg`.
pub fn date_add(unit: TimeUnit, amount: i64, arg: SqExpr) -> SqExpr {
    SqExpr::new(ExprKind::DateAdd(DateAddExpr { unit, amount, arg }))
}

/// Truncates the date expression `arg` to `unit`.
pub fn date_span(unit: TimeUnit, arg: SqExpr) -> SqExpr {
    SqExpr::new(ExprKind::DateSpan(DateSpanExpr { unit, arg }))
}

/// Current date and time, evaluated by the query engine.
pub fn now() -> SqExpr {
    SqExpr::new(ExprKind::Now)
}

/// Marker for the column default.
pub fn default_value() -> SqExpr {
    SqExpr::new(ExprKind::DefaultValue)
}

/// Marker matching any value.
pub fn any_value() -> SqExpr {
    SqExpr::new(ExprKind::AnyValue)
}

/// Constant holding `value`, encoded canonically.
pub fn typed_constant(value: PrimitiveValue) -> SqExpr {
    let encoded = value.encode();
    SqExpr::new(ExprKind::Constant(ConstantExpr { value, encoded }))
}

/// Boolean constant.
pub fn boolean(value: bool) -> SqExpr {
    typed_constant(PrimitiveValue::Boolean(value))
}

/// Date-time constant; sub-millisecond precision survives in the encoding.
pub fn date_time(value: PrimitiveDateTime) -> SqExpr {
    typed_constant(PrimitiveValue::DateTime(value))
}

/// Decimal constant.
pub fn decimal(value: f64) -> SqExpr {
    typed_constant(PrimitiveValue::Decimal(value))
}

/// Decimal constant keeping a caller-supplied encoding such as `"1.50M"`.
pub fn decimal_with_encoding(value: f64, encoded: impl Into<String>) -> SqExpr {
    with_encoding(PrimitiveValue::Decimal(value), encoded.into())
}

/// Double constant.
pub fn double(value: f64) -> SqExpr {
    typed_constant(PrimitiveValue::Double(value))
}

/// Double constant keeping a caller-supplied encoding such as `"1.0D"`.
pub fn double_with_encoding(value: f64, encoded: impl Into<String>) -> SqExpr {
    with_encoding(PrimitiveValue::Double(value), encoded.into())
}

/// Integer constant.
pub fn integer(value: i64) -> SqExpr {
    typed_constant(PrimitiveValue::Integer(value))
}

/// The `null` literal.
pub fn null_constant() -> SqExpr {
    typed_constant(PrimitiveValue::Null)
}

/// Text constant.
pub fn text(value: impl Into<String>) -> SqExpr {
    typed_constant(PrimitiveValue::Text(value.into()))
}

fn with_encoding(value: PrimitiveValue, encoded: String) -> SqExpr {
    debug_assert!(
        PrimitiveValue::decode(&encoded).is_some_and(|decoded| decoded.same_datum(&value)),
        "constant encoding {encoded:?} must describe {value:?}"
    );
    SqExpr::new(ExprKind::Constant(ConstantExpr { value, encoded }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::ast::SqExprKind;

    fn sales() -> SqExpr {
        entity("s", "Sales", None)
    }

    #[test]
    fn and_opt_returns_present_operand() {
        let left = equal(column_ref(sales(), "Region"), text("West"));
        let combined = and_opt(Some(left.clone()), None).expect("left survives");
        assert!(SqExpr::ptr_eq(&combined, &left));
        assert!(and_opt(None, None).is_none());
    }

    #[test]
    fn or_merges_in_over_same_args() {
        let region = column_ref(sales(), "Region");
        let merged = or(
            in_expr(vec![region.clone()], vec![vec![integer(1)]]),
            in_expr(vec![region.clone()], vec![vec![integer(2)]]),
        );
        let node = merged.as_in().expect("merged into In");
        assert_eq!(node.values.len(), 2);
        assert_eq!(node.values[1][0].as_constant().map(|c| c.encoded()), Some("2L"));
    }

    #[test]
    fn or_keeps_generic_node_for_different_args() {
        let merged = or(
            in_expr(vec![column_ref(sales(), "Region")], vec![vec![integer(1)]]),
            in_expr(vec![column_ref(sales(), "Store")], vec![vec![integer(2)]]),
        );
        assert_eq!(merged.kind(), SqExprKind::Or);
    }

    #[test]
    fn constants_carry_encoding() {
        assert_eq!(text("it's").as_constant().map(|c| c.encoded()), Some("'it''s'"));
        assert_eq!(
            decimal_with_encoding(1.5, "1.50M")
                .as_constant()
                .map(|c| c.encoded()),
            Some("1.50M")
        );
        assert_eq!(null_constant().to_string(), "null");
    }

    #[test]
    fn nan_constant_with_encoding() {
        let nan = double_with_encoding(f64::NAN, "NaND");
        let constant = nan.as_constant().expect("constant");
        assert_eq!(constant.encoded(), "NaND");
        assert!(matches!(constant.value(), PrimitiveValue::Double(v) if v.is_nan()));
    }

    #[test]
    fn date_time_constants_differing_below_a_millisecond_are_distinct() {
        use time::macros::datetime;
        let fine = date_time(datetime!(2020-01-01 0:00:00.0005));
        let whole = date_time(datetime!(2020-01-01 0:00:00));
        assert!(!SqExpr::equals(&fine, &whole, false));
        assert!(SqExpr::equals(&fine, &date_time(datetime!(2020-01-01 0:00:00.0005)), false));
    }
}
