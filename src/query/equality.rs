//! Structural equality between expression trees.
//!
//! Two trees are equal when they have the same shape and field values; handle
//! identity only serves as a shortcut. Constants compare by their encoded form.
//! Entity aliases are compared only when both sides carry one.

use crate::query::ast::{
    AggregationExpr, BetweenExpr, BinaryExpr, CompareExpr, ConstantExpr, DateAddExpr,
    DateSpanExpr, EntityExpr, ExprKind, HierarchyExpr, HierarchyLevelExpr, InExpr,
    PropRefExpr, PropertyVariationSourceExpr, SqExpr, UnaryExpr,
};
use crate::query::visitor::SqExprVisitor;

impl SqExpr {
    /// Structural equality; `ignore_case` relaxes comparison of text constants only.
    pub fn equals(x: &SqExpr, y: &SqExpr, ignore_case: bool) -> bool {
        SqExprEqualityVisitor::new(ignore_case).equals(x, y)
    }

    /// Structural equality over possibly absent trees.
    ///
    /// Two absent trees are equal; absent never equals present.
    pub fn equals_opt(x: Option<&SqExpr>, y: Option<&SqExpr>, ignore_case: bool) -> bool {
        match (x, y) {
            (None, None) => true,
            (Some(x), Some(y)) => SqExpr::equals(x, y, ignore_case),
            _ => false,
        }
    }
}

/// Returns true when both lists have the same length and pairwise-equal entries.
pub fn sequence_equal(xs: &[SqExpr], ys: &[SqExpr], ignore_case: bool) -> bool {
    SqExprEqualityVisitor::new(ignore_case).equals_all(xs, ys)
}

/// Position of the first entry of `exprs` structurally equal to `target`.
pub fn index_of_expr(exprs: &[SqExpr], target: &SqExpr) -> Option<usize> {
    exprs
        .iter()
        .position(|expr| SqExpr::equals(expr, target, false))
}

/// Visitor comparing the visited node against the comparand passed as argument.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqExprEqualityVisitor {
    ignore_case: bool,
}

impl SqExprEqualityVisitor {
    /// Creates a visitor; `ignore_case` applies to text constants.
    pub fn new(ignore_case: bool) -> Self {
        Self { ignore_case }
    }

    /// Compares two trees.
    pub fn equals(&mut self, x: &SqExpr, y: &SqExpr) -> bool {
        if SqExpr::ptr_eq(x, y) {
            return true;
        }
        x.accept(self, y)
    }

    fn equals_all(&mut self, xs: &[SqExpr], ys: &[SqExpr]) -> bool {
        xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| self.equals(x, y))
    }

    fn equals_binary(&mut self, x: &BinaryExpr, y: &BinaryExpr) -> bool {
        self.equals(&x.left, &y.left) && self.equals(&x.right, &y.right)
    }

    fn equals_prop_ref(&mut self, x: &PropRefExpr, y: &PropRefExpr) -> bool {
        x.name == y.name && self.equals(&x.source, &y.source)
    }
}

fn optional_equal(x: Option<&str>, y: Option<&str>) -> bool {
    match (x, y) {
        (Some(x), Some(y)) => x == y,
        _ => true,
    }
}

impl<'c> SqExprVisitor<&'c SqExpr> for SqExprEqualityVisitor {
    type Output = bool;

    fn visit_entity(&mut self, _expr: &SqExpr, node: &EntityExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::Entity(other) => {
                node.schema == other.schema
                    && node.entity == other.entity
                    && optional_equal(node.variable.as_deref(), other.variable.as_deref())
            }
            _ => false,
        }
    }

    fn visit_column_ref(&mut self, _expr: &SqExpr, node: &PropRefExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::ColumnRef(other) => self.equals_prop_ref(node, other),
            _ => false,
        }
    }

    fn visit_measure_ref(&mut self, _expr: &SqExpr, node: &PropRefExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::MeasureRef(other) => self.equals_prop_ref(node, other),
            _ => false,
        }
    }

    fn visit_aggregation(
        &mut self,
        _expr: &SqExpr,
        node: &AggregationExpr,
        comparand: &'c SqExpr,
    ) -> bool {
        match comparand.node() {
            ExprKind::Aggregation(other) => {
                node.func == other.func && self.equals(&node.arg, &other.arg)
            }
            _ => false,
        }
    }

    fn visit_property_variation_source(
        &mut self,
        _expr: &SqExpr,
        node: &PropertyVariationSourceExpr,
        comparand: &'c SqExpr,
    ) -> bool {
        match comparand.node() {
            ExprKind::PropertyVariationSource(other) => {
                node.name == other.name
                    && node.property == other.property
                    && self.equals(&node.arg, &other.arg)
            }
            _ => false,
        }
    }

    fn visit_hierarchy(&mut self, _expr: &SqExpr, node: &HierarchyExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::Hierarchy(other) => {
                node.hierarchy == other.hierarchy && self.equals(&node.arg, &other.arg)
            }
            _ => false,
        }
    }

    fn visit_hierarchy_level(
        &mut self,
        _expr: &SqExpr,
        node: &HierarchyLevelExpr,
        comparand: &'c SqExpr,
    ) -> bool {
        match comparand.node() {
            ExprKind::HierarchyLevel(other) => {
                node.level == other.level && self.equals(&node.arg, &other.arg)
            }
            _ => false,
        }
    }

    fn visit_and(&mut self, _expr: &SqExpr, node: &BinaryExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::And(other) => self.equals_binary(node, other),
            _ => false,
        }
    }

    fn visit_or(&mut self, _expr: &SqExpr, node: &BinaryExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::Or(other) => self.equals_binary(node, other),
            _ => false,
        }
    }

    fn visit_compare(&mut self, _expr: &SqExpr, node: &CompareExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::Compare(other) => {
                node.comparison == other.comparison
                    && self.equals(&node.left, &other.left)
                    && self.equals(&node.right, &other.right)
            }
            _ => false,
        }
    }

    fn visit_between(&mut self, _expr: &SqExpr, node: &BetweenExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::Between(other) => {
                self.equals(&node.arg, &other.arg)
                    && self.equals(&node.lower, &other.lower)
                    && self.equals(&node.upper, &other.upper)
            }
            _ => false,
        }
    }

    fn visit_in(&mut self, _expr: &SqExpr, node: &InExpr, comparand: &'c SqExpr) -> bool {
        let ExprKind::In(other) = comparand.node() else {
            return false;
        };
        if !self.equals_all(&node.args, &other.args) || node.values.len() != other.values.len() {
            return false;
        }
        node.values
            .iter()
            .zip(&other.values)
            .all(|(x, y)| self.equals_all(x, y))
    }

    fn visit_contains(&mut self, _expr: &SqExpr, node: &BinaryExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::Contains(other) => self.equals_binary(node, other),
            _ => false,
        }
    }

    fn visit_starts_with(&mut self, _expr: &SqExpr, node: &BinaryExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::StartsWith(other) => self.equals_binary(node, other),
            _ => false,
        }
    }

    fn visit_exists(&mut self, _expr: &SqExpr, node: &UnaryExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::Exists(other) => self.equals(&node.arg, &other.arg),
            _ => false,
        }
    }

    fn visit_not(&mut self, _expr: &SqExpr, node: &UnaryExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::Not(other) => self.equals(&node.arg, &other.arg),
            _ => false,
        }
    }

    fn visit_constant(&mut self, _expr: &SqExpr, node: &ConstantExpr, comparand: &'c SqExpr) -> bool {
        let ExprKind::Constant(other) = comparand.node() else {
            return false;
        };
        if node.ty() != other.ty() {
            return false;
        }
        if self.ignore_case && node.ty().is_text() {
            node.encoded().to_lowercase() == other.encoded().to_lowercase()
        } else {
            node.encoded() == other.encoded()
        }
    }

    fn visit_date_span(&mut self, _expr: &SqExpr, node: &DateSpanExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::DateSpan(other) => node.unit == other.unit && self.equals(&node.arg, &other.arg),
            _ => false,
        }
    }

    fn visit_date_add(&mut self, _expr: &SqExpr, node: &DateAddExpr, comparand: &'c SqExpr) -> bool {
        match comparand.node() {
            ExprKind::DateAdd(other) => {
                node.unit == other.unit
                    && node.amount == other.amount
                    && self.equals(&node.arg, &other.arg)
            }
            _ => false,
        }
    }

    fn visit_now(&mut self, _expr: &SqExpr, comparand: &'c SqExpr) -> bool {
        matches!(comparand.node(), ExprKind::Now)
    }

    fn visit_default_value(&mut self, _expr: &SqExpr, comparand: &'c SqExpr) -> bool {
        matches!(comparand.node(), ExprKind::DefaultValue)
    }

    fn visit_any_value(&mut self, _expr: &SqExpr, comparand: &'c SqExpr) -> bool {
        matches!(comparand.node(), ExprKind::AnyValue)
    }

    fn visit_default(&mut self, expr: &SqExpr, _comparand: &'c SqExpr) -> bool {
        unreachable!("no equality rule for {:?}", expr.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::builder::*;

    #[test]
    fn alias_only_compared_when_both_present() {
        let bare = entity("s", "Sales", None);
        let aliased = entity("s", "Sales", Some("s1"));
        let other_alias = entity("s", "Sales", Some("s2"));
        assert!(SqExpr::equals(&bare, &aliased, false));
        assert!(SqExpr::equals(&aliased, &bare, false));
        assert!(!SqExpr::equals(&aliased, &other_alias, false));
    }

    #[test]
    fn absent_trees() {
        let expr = now();
        assert!(SqExpr::equals_opt(None, None, false));
        assert!(!SqExpr::equals_opt(Some(&expr), None, false));
        assert!(!SqExpr::equals_opt(None, Some(&expr), true));
    }

    #[test]
    fn constant_types_must_match() {
        assert!(!SqExpr::equals(&integer(1), &double(1.0), false));
        assert!(!SqExpr::equals(&decimal_with_encoding(1.5, "1.50M"), &decimal(1.5), false));
    }

    #[test]
    fn in_equality_is_order_sensitive() {
        let e = entity("s", "Sales", None);
        let region = column_ref(e, "Region");
        let a = in_expr(vec![region.clone()], vec![vec![integer(1)], vec![integer(2)]]);
        let b = in_expr(vec![region.clone()], vec![vec![integer(2)], vec![integer(1)]]);
        let c = in_expr(vec![region], vec![vec![integer(1)]]);
        assert!(!SqExpr::equals(&a, &b, false));
        assert!(!SqExpr::equals(&a, &c, false));
    }

    #[test]
    fn index_of_uses_structure() {
        let e = entity("s", "Sales", None);
        let list = vec![column_ref(e.clone(), "A"), column_ref(e.clone(), "B")];
        assert_eq!(index_of_expr(&list, &column_ref(e.clone(), "B")), Some(1));
        assert_eq!(index_of_expr(&list, &measure_ref(e, "B")), None);
    }
}
