#![allow(missing_docs)]

//! Double-dispatch traversal over [`SqExpr`] trees.
//!
//! [`SqExpr::accept`] selects the visitor method for the node's kind and hands it the
//! node together with a caller-chosen argument. Visitors recurse by calling `accept`
//! on child handles. Every per-kind method falls back to
//! [`SqExprVisitor::visit_default`], so a visitor only spells out the kinds it cares
//! about.
//!
//! Two rewriting bases sit on top of the visitor:
//!
//! - [`SqExprRewriter`] rebuilds the tree bottom-up, returning the original handle for
//!   every subtree that did not change.
//! - [`SqExprRootRewriter`] only looks at the node it is handed and returns it
//!   unchanged unless a per-kind method is overridden.

use crate::query::ast::{
    AggregationExpr, BetweenExpr, BinaryExpr, CompareExpr, ConstantExpr, DateAddExpr,
    DateSpanExpr, EntityExpr, ExprKind, HierarchyExpr, HierarchyLevelExpr, InExpr,
    PropRefExpr, PropertyVariationSourceExpr, SqExpr, UnaryExpr,
};

/// Visitor with one method per expression kind.
///
/// `A` is the per-call argument threaded through [`SqExpr::accept`].
pub trait SqExprVisitor<A> {
    /// Value produced for each visited node.
    type Output;

    fn visit_entity(&mut self, expr: &SqExpr, _node: &EntityExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_column_ref(&mut self, expr: &SqExpr, _node: &PropRefExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_measure_ref(&mut self, expr: &SqExpr, _node: &PropRefExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_aggregation(
        &mut self,
        expr: &SqExpr,
        _node: &AggregationExpr,
        arg: A,
    ) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_property_variation_source(
        &mut self,
        expr: &SqExpr,
        _node: &PropertyVariationSourceExpr,
        arg: A,
    ) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_hierarchy(&mut self, expr: &SqExpr, _node: &HierarchyExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_hierarchy_level(
        &mut self,
        expr: &SqExpr,
        _node: &HierarchyLevelExpr,
        arg: A,
    ) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_and(&mut self, expr: &SqExpr, _node: &BinaryExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_or(&mut self, expr: &SqExpr, _node: &BinaryExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_compare(&mut self, expr: &SqExpr, _node: &CompareExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_between(&mut self, expr: &SqExpr, _node: &BetweenExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_in(&mut self, expr: &SqExpr, _node: &InExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_contains(&mut self, expr: &SqExpr, _node: &BinaryExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_starts_with(&mut self, expr: &SqExpr, _node: &BinaryExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_exists(&mut self, expr: &SqExpr, _node: &UnaryExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_not(&mut self, expr: &SqExpr, _node: &UnaryExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_constant(&mut self, expr: &SqExpr, _node: &ConstantExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_date_span(&mut self, expr: &SqExpr, _node: &DateSpanExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_date_add(&mut self, expr: &SqExpr, _node: &DateAddExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_now(&mut self, expr: &SqExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_default_value(&mut self, expr: &SqExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    fn visit_any_value(&mut self, expr: &SqExpr, arg: A) -> Self::Output {
        self.visit_default(expr, arg)
    }

    /// Fallback for every kind the visitor does not override.
    fn visit_default(&mut self, expr: &SqExpr, arg: A) -> Self::Output;
}

impl SqExpr {
    /// Dispatches to the visitor method matching this node's kind.
    pub fn accept<V, A>(&self, visitor: &mut V, arg: A) -> V::Output
    where
        V: SqExprVisitor<A> + ?Sized,
    {
        match self.node() {
            ExprKind::Entity(node) => visitor.visit_entity(self, node, arg),
            ExprKind::ColumnRef(node) => visitor.visit_column_ref(self, node, arg),
            ExprKind::MeasureRef(node) => visitor.visit_measure_ref(self, node, arg),
            ExprKind::Aggregation(node) => visitor.visit_aggregation(self, node, arg),
            ExprKind::PropertyVariationSource(node) => {
                visitor.visit_property_variation_source(self, node, arg)
            }
            ExprKind::Hierarchy(node) => visitor.visit_hierarchy(self, node, arg),
            ExprKind::HierarchyLevel(node) => visitor.visit_hierarchy_level(self, node, arg),
            ExprKind::And(node) => visitor.visit_and(self, node, arg),
            ExprKind::Or(node) => visitor.visit_or(self, node, arg),
            ExprKind::Compare(node) => visitor.visit_compare(self, node, arg),
            ExprKind::Between(node) => visitor.visit_between(self, node, arg),
            ExprKind::In(node) => visitor.visit_in(self, node, arg),
            ExprKind::Contains(node) => visitor.visit_contains(self, node, arg),
            ExprKind::StartsWith(node) => visitor.visit_starts_with(self, node, arg),
            ExprKind::Exists(node) => visitor.visit_exists(self, node, arg),
            ExprKind::Not(node) => visitor.visit_not(self, node, arg),
            ExprKind::Constant(node) => visitor.visit_constant(self, node, arg),
            ExprKind::DateSpan(node) => visitor.visit_date_span(self, node, arg),
            ExprKind::DateAdd(node) => visitor.visit_date_add(self, node, arg),
            ExprKind::Now => visitor.visit_now(self, arg),
            ExprKind::DefaultValue => visitor.visit_default_value(self, arg),
            ExprKind::AnyValue => visitor.visit_any_value(self, arg),
        }
    }

    /// Runs a recursive rewriter over the tree rooted at this node.
    pub fn rewrite<R>(&self, rewriter: &mut R) -> SqExpr
    where
        R: SqExprRewriter + ?Sized,
    {
        self.accept(&mut RewriteDispatch(rewriter), ())
    }

    /// Runs a root-only rewriter on this node.
    pub fn rewrite_root<R>(&self, rewriter: &mut R) -> SqExpr
    where
        R: SqExprRootRewriter + ?Sized,
    {
        self.accept(&mut RootRewriteDispatch(rewriter), ())
    }
}

/// Recursive rewriter.
///
/// Every default method delegates to [`rewrite_children`], which rewrites the node's
/// children and allocates a new node only when at least one child handle changed.
/// Overrides call [`rewrite_children`] themselves to keep recursing.
pub trait SqExprRewriter {
    fn rewrite_entity(&mut self, expr: &SqExpr, _node: &EntityExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_column_ref(&mut self, expr: &SqExpr, _node: &PropRefExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_measure_ref(&mut self, expr: &SqExpr, _node: &PropRefExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_aggregation(&mut self, expr: &SqExpr, _node: &AggregationExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_property_variation_source(
        &mut self,
        expr: &SqExpr,
        _node: &PropertyVariationSourceExpr,
    ) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_hierarchy(&mut self, expr: &SqExpr, _node: &HierarchyExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_hierarchy_level(&mut self, expr: &SqExpr, _node: &HierarchyLevelExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_and(&mut self, expr: &SqExpr, _node: &BinaryExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_or(&mut self, expr: &SqExpr, _node: &BinaryExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_compare(&mut self, expr: &SqExpr, _node: &CompareExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_between(&mut self, expr: &SqExpr, _node: &BetweenExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_in(&mut self, expr: &SqExpr, _node: &InExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_contains(&mut self, expr: &SqExpr, _node: &BinaryExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_starts_with(&mut self, expr: &SqExpr, _node: &BinaryExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_exists(&mut self, expr: &SqExpr, _node: &UnaryExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_not(&mut self, expr: &SqExpr, _node: &UnaryExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_constant(&mut self, expr: &SqExpr, _node: &ConstantExpr) -> SqExpr {
        expr.clone()
    }

    fn rewrite_date_span(&mut self, expr: &SqExpr, _node: &DateSpanExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    fn rewrite_date_add(&mut self, expr: &SqExpr, _node: &DateAddExpr) -> SqExpr {
        rewrite_children(self, expr)
    }

    /// Nullary markers (`Now`, `DefaultValue`, `AnyValue`).
    fn rewrite_nullary(&mut self, expr: &SqExpr) -> SqExpr {
        expr.clone()
    }
}

/// Rewrites the children of `expr` with `rewriter` and rebuilds the node when any
/// child changed. Leaves come back as the same handle.
pub fn rewrite_children<R: SqExprRewriter + ?Sized>(rewriter: &mut R, expr: &SqExpr) -> SqExpr {
    let rebuilt = match expr.node() {
        ExprKind::Entity(_)
        | ExprKind::Constant(_)
        | ExprKind::Now
        | ExprKind::DefaultValue
        | ExprKind::AnyValue => None,
        ExprKind::ColumnRef(node) => rewrite_prop_ref(rewriter, node).map(ExprKind::ColumnRef),
        ExprKind::MeasureRef(node) => rewrite_prop_ref(rewriter, node).map(ExprKind::MeasureRef),
        ExprKind::Aggregation(node) => rewrite_child(rewriter, &node.arg).map(|arg| {
            ExprKind::Aggregation(AggregationExpr {
                arg,
                func: node.func,
            })
        }),
        ExprKind::PropertyVariationSource(node) => rewrite_child(rewriter, &node.arg).map(|arg| {
            ExprKind::PropertyVariationSource(PropertyVariationSourceExpr {
                arg,
                name: node.name.clone(),
                property: node.property.clone(),
            })
        }),
        ExprKind::Hierarchy(node) => rewrite_child(rewriter, &node.arg).map(|arg| {
            ExprKind::Hierarchy(HierarchyExpr {
                arg,
                hierarchy: node.hierarchy.clone(),
            })
        }),
        ExprKind::HierarchyLevel(node) => rewrite_child(rewriter, &node.arg).map(|arg| {
            ExprKind::HierarchyLevel(HierarchyLevelExpr {
                arg,
                level: node.level.clone(),
            })
        }),
        ExprKind::And(node) => rewrite_binary(rewriter, node).map(ExprKind::And),
        ExprKind::Or(node) => rewrite_binary(rewriter, node).map(ExprKind::Or),
        ExprKind::Contains(node) => rewrite_binary(rewriter, node).map(ExprKind::Contains),
        ExprKind::StartsWith(node) => rewrite_binary(rewriter, node).map(ExprKind::StartsWith),
        ExprKind::Compare(node) => {
            let left = node.left.rewrite(rewriter);
            let right = node.right.rewrite(rewriter);
            let unchanged =
                SqExpr::ptr_eq(&left, &node.left) && SqExpr::ptr_eq(&right, &node.right);
            (!unchanged).then(|| {
                ExprKind::Compare(CompareExpr {
                    comparison: node.comparison,
                    left,
                    right,
                })
            })
        }
        ExprKind::Between(node) => {
            let arg = node.arg.rewrite(rewriter);
            let lower = node.lower.rewrite(rewriter);
            let upper = node.upper.rewrite(rewriter);
            let unchanged = SqExpr::ptr_eq(&arg, &node.arg)
                && SqExpr::ptr_eq(&lower, &node.lower)
                && SqExpr::ptr_eq(&upper, &node.upper);
            (!unchanged).then(|| ExprKind::Between(BetweenExpr { arg, lower, upper }))
        }
        ExprKind::In(node) => {
            let args = rewrite_list(rewriter, &node.args);
            let mut values_changed = false;
            let values: Vec<Vec<SqExpr>> = node
                .values
                .iter()
                .map(|tuple| match rewrite_list(rewriter, tuple) {
                    Some(tuple) => {
                        values_changed = true;
                        tuple
                    }
                    None => tuple.clone(),
                })
                .collect();
            (args.is_some() || values_changed).then(|| {
                ExprKind::In(InExpr {
                    args: args.unwrap_or_else(|| node.args.clone()),
                    values,
                })
            })
        }
        ExprKind::Exists(node) => {
            rewrite_child(rewriter, &node.arg).map(|arg| ExprKind::Exists(UnaryExpr { arg }))
        }
        ExprKind::Not(node) => {
            rewrite_child(rewriter, &node.arg).map(|arg| ExprKind::Not(UnaryExpr { arg }))
        }
        ExprKind::DateSpan(node) => rewrite_child(rewriter, &node.arg).map(|arg| {
            ExprKind::DateSpan(DateSpanExpr {
                unit: node.unit,
                arg,
            })
        }),
        ExprKind::DateAdd(node) => rewrite_child(rewriter, &node.arg).map(|arg| {
            ExprKind::DateAdd(DateAddExpr {
                unit: node.unit,
                amount: node.amount,
                arg,
            })
        }),
    };
    match rebuilt {
        Some(kind) => SqExpr::new(kind),
        None => expr.clone(),
    }
}

fn rewrite_child<R: SqExprRewriter + ?Sized>(rewriter: &mut R, child: &SqExpr) -> Option<SqExpr> {
    let rewritten = child.rewrite(rewriter);
    (!SqExpr::ptr_eq(&rewritten, child)).then_some(rewritten)
}

fn rewrite_prop_ref<R: SqExprRewriter + ?Sized>(
    rewriter: &mut R,
    node: &PropRefExpr,
) -> Option<PropRefExpr> {
    rewrite_child(rewriter, &node.source).map(|source| PropRefExpr {
        source,
        name: node.name.clone(),
    })
}

fn rewrite_binary<R: SqExprRewriter + ?Sized>(
    rewriter: &mut R,
    node: &BinaryExpr,
) -> Option<BinaryExpr> {
    let left = node.left.rewrite(rewriter);
    let right = node.right.rewrite(rewriter);
    if SqExpr::ptr_eq(&left, &node.left) && SqExpr::ptr_eq(&right, &node.right) {
        return None;
    }
    Some(BinaryExpr { left, right })
}

fn rewrite_list<R: SqExprRewriter + ?Sized>(
    rewriter: &mut R,
    exprs: &[SqExpr],
) -> Option<Vec<SqExpr>> {
    let rewritten: Vec<SqExpr> = exprs.iter().map(|e| e.rewrite(rewriter)).collect();
    let changed = rewritten
        .iter()
        .zip(exprs)
        .any(|(new, old)| !SqExpr::ptr_eq(new, old));
    changed.then_some(rewritten)
}

struct RewriteDispatch<'r, R: ?Sized>(&'r mut R);

impl<R: SqExprRewriter + ?Sized> SqExprVisitor<()> for RewriteDispatch<'_, R> {
    type Output = SqExpr;

    fn visit_entity(&mut self, expr: &SqExpr, node: &EntityExpr, _: ()) -> SqExpr {
        self.0.rewrite_entity(expr, node)
    }

    fn visit_column_ref(&mut self, expr: &SqExpr, node: &PropRefExpr, _: ()) -> SqExpr {
        self.0.rewrite_column_ref(expr, node)
    }

    fn visit_measure_ref(&mut self, expr: &SqExpr, node: &PropRefExpr, _: ()) -> SqExpr {
        self.0.rewrite_measure_ref(expr, node)
    }

    fn visit_aggregation(&mut self, expr: &SqExpr, node: &AggregationExpr, _: ()) -> SqExpr {
        self.0.rewrite_aggregation(expr, node)
    }

    fn visit_property_variation_source(
        &mut self,
        expr: &SqExpr,
        node: &PropertyVariationSourceExpr,
        _: (),
    ) -> SqExpr {
        self.0.rewrite_property_variation_source(expr, node)
    }

    fn visit_hierarchy(&mut self, expr: &SqExpr, node: &HierarchyExpr, _: ()) -> SqExpr {
        self.0.rewrite_hierarchy(expr, node)
    }

    fn visit_hierarchy_level(&mut self, expr: &SqExpr, node: &HierarchyLevelExpr, _: ()) -> SqExpr {
        self.0.rewrite_hierarchy_level(expr, node)
    }

    fn visit_and(&mut self, expr: &SqExpr, node: &BinaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_and(expr, node)
    }

    fn visit_or(&mut self, expr: &SqExpr, node: &BinaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_or(expr, node)
    }

    fn visit_compare(&mut self, expr: &SqExpr, node: &CompareExpr, _: ()) -> SqExpr {
        self.0.rewrite_compare(expr, node)
    }

    fn visit_between(&mut self, expr: &SqExpr, node: &BetweenExpr, _: ()) -> SqExpr {
        self.0.rewrite_between(expr, node)
    }

    fn visit_in(&mut self, expr: &SqExpr, node: &InExpr, _: ()) -> SqExpr {
        self.0.rewrite_in(expr, node)
    }

    fn visit_contains(&mut self, expr: &SqExpr, node: &BinaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_contains(expr, node)
    }

    fn visit_starts_with(&mut self, expr: &SqExpr, node: &BinaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_starts_with(expr, node)
    }

    fn visit_exists(&mut self, expr: &SqExpr, node: &UnaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_exists(expr, node)
    }

    fn visit_not(&mut self, expr: &SqExpr, node: &UnaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_not(expr, node)
    }

    fn visit_constant(&mut self, expr: &SqExpr, node: &ConstantExpr, _: ()) -> SqExpr {
        self.0.rewrite_constant(expr, node)
    }

    fn visit_date_span(&mut self, expr: &SqExpr, node: &DateSpanExpr, _: ()) -> SqExpr {
        self.0.rewrite_date_span(expr, node)
    }

    fn visit_date_add(&mut self, expr: &SqExpr, node: &DateAddExpr, _: ()) -> SqExpr {
        self.0.rewrite_date_add(expr, node)
    }

    fn visit_default(&mut self, expr: &SqExpr, _: ()) -> SqExpr {
        self.0.rewrite_nullary(expr)
    }
}

/// Rewriter that inspects only the node it is handed.
///
/// Every per-kind method defaults to [`SqExprRootRewriter::rewrite_default`], which
/// returns the same handle. Children are never visited.
pub trait SqExprRootRewriter {
    fn rewrite_entity(&mut self, expr: &SqExpr, _node: &EntityExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_column_ref(&mut self, expr: &SqExpr, _node: &PropRefExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_measure_ref(&mut self, expr: &SqExpr, _node: &PropRefExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_aggregation(&mut self, expr: &SqExpr, _node: &AggregationExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_property_variation_source(
        &mut self,
        expr: &SqExpr,
        _node: &PropertyVariationSourceExpr,
    ) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_hierarchy(&mut self, expr: &SqExpr, _node: &HierarchyExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_hierarchy_level(&mut self, expr: &SqExpr, _node: &HierarchyLevelExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_and(&mut self, expr: &SqExpr, _node: &BinaryExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_or(&mut self, expr: &SqExpr, _node: &BinaryExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_compare(&mut self, expr: &SqExpr, _node: &CompareExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_between(&mut self, expr: &SqExpr, _node: &BetweenExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_in(&mut self, expr: &SqExpr, _node: &InExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_contains(&mut self, expr: &SqExpr, _node: &BinaryExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_starts_with(&mut self, expr: &SqExpr, _node: &BinaryExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_exists(&mut self, expr: &SqExpr, _node: &UnaryExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_not(&mut self, expr: &SqExpr, _node: &UnaryExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_constant(&mut self, expr: &SqExpr, _node: &ConstantExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_date_span(&mut self, expr: &SqExpr, _node: &DateSpanExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_date_add(&mut self, expr: &SqExpr, _node: &DateAddExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_now(&mut self, expr: &SqExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_default_value(&mut self, expr: &SqExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    fn rewrite_any_value(&mut self, expr: &SqExpr) -> SqExpr {
        self.rewrite_default(expr)
    }

    /// Fallback shared by every kind; identity unless overridden.
    fn rewrite_default(&mut self, expr: &SqExpr) -> SqExpr {
        expr.clone()
    }
}

struct RootRewriteDispatch<'r, R: ?Sized>(&'r mut R);

impl<R: SqExprRootRewriter + ?Sized> SqExprVisitor<()> for RootRewriteDispatch<'_, R> {
    type Output = SqExpr;

    fn visit_entity(&mut self, expr: &SqExpr, node: &EntityExpr, _: ()) -> SqExpr {
        self.0.rewrite_entity(expr, node)
    }

    fn visit_column_ref(&mut self, expr: &SqExpr, node: &PropRefExpr, _: ()) -> SqExpr {
        self.0.rewrite_column_ref(expr, node)
    }

    fn visit_measure_ref(&mut self, expr: &SqExpr, node: &PropRefExpr, _: ()) -> SqExpr {
        self.0.rewrite_measure_ref(expr, node)
    }

    fn visit_aggregation(&mut self, expr: &SqExpr, node: &AggregationExpr, _: ()) -> SqExpr {
        self.0.rewrite_aggregation(expr, node)
    }

    fn visit_property_variation_source(
        &mut self,
        expr: &SqExpr,
        node: &PropertyVariationSourceExpr,
        _: (),
    ) -> SqExpr {
        self.0.rewrite_property_variation_source(expr, node)
    }

    fn visit_hierarchy(&mut self, expr: &SqExpr, node: &HierarchyExpr, _: ()) -> SqExpr {
        self.0.rewrite_hierarchy(expr, node)
    }

    fn visit_hierarchy_level(&mut self, expr: &SqExpr, node: &HierarchyLevelExpr, _: ()) -> SqExpr {
        self.0.rewrite_hierarchy_level(expr, node)
    }

    fn visit_and(&mut self, expr: &SqExpr, node: &BinaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_and(expr, node)
    }

    fn visit_or(&mut self, expr: &SqExpr, node: &BinaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_or(expr, node)
    }

    fn visit_compare(&mut self, expr: &SqExpr, node: &CompareExpr, _: ()) -> SqExpr {
        self.0.rewrite_compare(expr, node)
    }

    fn visit_between(&mut self, expr: &SqExpr, node: &BetweenExpr, _: ()) -> SqExpr {
        self.0.rewrite_between(expr, node)
    }

    fn visit_in(&mut self, expr: &SqExpr, node: &InExpr, _: ()) -> SqExpr {
        self.0.rewrite_in(expr, node)
    }

    fn visit_contains(&mut self, expr: &SqExpr, node: &BinaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_contains(expr, node)
    }

    fn visit_starts_with(&mut self, expr: &SqExpr, node: &BinaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_starts_with(expr, node)
    }

    fn visit_exists(&mut self, expr: &SqExpr, node: &UnaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_exists(expr, node)
    }

    fn visit_not(&mut self, expr: &SqExpr, node: &UnaryExpr, _: ()) -> SqExpr {
        self.0.rewrite_not(expr, node)
    }

    fn visit_constant(&mut self, expr: &SqExpr, node: &ConstantExpr, _: ()) -> SqExpr {
        self.0.rewrite_constant(expr, node)
    }

    fn visit_date_span(&mut self, expr: &SqExpr, node: &DateSpanExpr, _: ()) -> SqExpr {
        self.0.rewrite_date_span(expr, node)
    }

    fn visit_date_add(&mut self, expr: &SqExpr, node: &DateAddExpr, _: ()) -> SqExpr {
        self.0.rewrite_date_add(expr, node)
    }

    fn visit_now(&mut self, expr: &SqExpr, _: ()) -> SqExpr {
        self.0.rewrite_now(expr)
    }

    fn visit_default_value(&mut self, expr: &SqExpr, _: ()) -> SqExpr {
        self.0.rewrite_default_value(expr)
    }

    fn visit_any_value(&mut self, expr: &SqExpr, _: ()) -> SqExpr {
        self.0.rewrite_any_value(expr)
    }

    fn visit_default(&mut self, expr: &SqExpr, _: ()) -> SqExpr {
        self.0.rewrite_default(expr)
    }
}
