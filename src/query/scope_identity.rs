//! Recovers key/value pairs from a row identity predicate.
//!
//! An identity predicate is a conjunction of `column = constant` comparisons. The
//! extractor collects the columns (or hierarchy levels) and constants in encounter
//! order so the identity can be turned back into a single In filter.

use smallvec::SmallVec;
use tracing::debug;

use crate::query::ast::{
    BinaryExpr, CompareExpr, ComparisonKind, ConstantExpr, HierarchyLevelExpr, PropRefExpr, SqExpr,
};
use crate::query::builder;
use crate::query::visitor::SqExprVisitor;

/// Position of the visited node inside the identity grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Role {
    Predicate,
    Key,
    Value,
}

#[derive(Default)]
struct KeysVisitor {
    keys: SmallVec<[SqExpr; 4]>,
    values: SmallVec<[SqExpr; 4]>,
    malformed: bool,
}

impl SqExprVisitor<Role> for KeysVisitor {
    type Output = ();

    fn visit_and(&mut self, expr: &SqExpr, node: &BinaryExpr, role: Role) {
        if role != Role::Predicate {
            return self.visit_default(expr, role);
        }
        node.left.accept(self, Role::Predicate);
        node.right.accept(self, Role::Predicate);
    }

    fn visit_compare(&mut self, expr: &SqExpr, node: &CompareExpr, role: Role) {
        if role != Role::Predicate || node.comparison != ComparisonKind::Equal {
            return self.visit_default(expr, role);
        }
        node.left.accept(self, Role::Key);
        node.right.accept(self, Role::Value);
    }

    fn visit_column_ref(&mut self, expr: &SqExpr, _node: &PropRefExpr, role: Role) {
        if role != Role::Key {
            return self.visit_default(expr, role);
        }
        self.keys.push(expr.clone());
    }

    fn visit_hierarchy_level(&mut self, expr: &SqExpr, _node: &HierarchyLevelExpr, role: Role) {
        if role != Role::Key {
            return self.visit_default(expr, role);
        }
        self.keys.push(expr.clone());
    }

    fn visit_constant(&mut self, expr: &SqExpr, _node: &ConstantExpr, role: Role) {
        if role != Role::Value {
            return self.visit_default(expr, role);
        }
        self.values.push(expr.clone());
    }

    fn visit_default(&mut self, expr: &SqExpr, role: Role) {
        if !self.malformed {
            debug!(%expr, ?role, "scope identity is malformed");
        }
        self.malformed = true;
    }
}

fn collect(expr: &SqExpr) -> Option<KeysVisitor> {
    let mut visitor = KeysVisitor::default();
    expr.accept(&mut visitor, Role::Predicate);
    if visitor.malformed || visitor.keys.is_empty() {
        return None;
    }
    Some(visitor)
}

/// Entry points for scope identity extraction.
pub struct ScopeIdentityExtractor;

impl ScopeIdentityExtractor {
    /// Key expressions of the identity, or `None` when `expr` is not an identity.
    pub fn keys(expr: &SqExpr) -> Option<Vec<SqExpr>> {
        collect(expr).map(|visitor| visitor.keys.into_vec())
    }

    /// Single-tuple In over the identity keys, or `None` when `expr` is not an identity.
    pub fn in_expr(expr: &SqExpr) -> Option<SqExpr> {
        let visitor = collect(expr)?;
        Some(builder::in_expr(
            visitor.keys.into_vec(),
            vec![visitor.values.into_vec()],
        ))
    }
}
