//! Rewriters that adjust aggregation and entity aliases.

use tracing::trace;

use crate::query::ast::{AggregateFunction, AggregationExpr, EntityExpr, PropRefExpr, SqExpr};
use crate::query::builder;
use crate::query::visitor::{SqExprRewriter, SqExprRootRewriter};

/// Wraps a bare column in `func`, or swaps the function of an existing aggregation.
pub struct ChangeAggregateRewriter {
    func: AggregateFunction,
}

impl ChangeAggregateRewriter {
    /// Rewriter targeting `func`.
    pub fn new(func: AggregateFunction) -> Self {
        Self { func }
    }
}

impl SqExprRootRewriter for ChangeAggregateRewriter {
    fn rewrite_column_ref(&mut self, expr: &SqExpr, _node: &PropRefExpr) -> SqExpr {
        builder::aggregate(expr.clone(), self.func)
    }

    fn rewrite_aggregation(&mut self, expr: &SqExpr, node: &AggregationExpr) -> SqExpr {
        if node.func == self.func {
            return expr.clone();
        }
        builder::aggregate(node.arg.clone(), self.func)
    }
}

/// Strips the outermost aggregation.
pub struct RemoveAggregateRewriter;

impl SqExprRootRewriter for RemoveAggregateRewriter {
    fn rewrite_aggregation(&mut self, _expr: &SqExpr, node: &AggregationExpr) -> SqExpr {
        node.arg.clone()
    }
}

/// Drops the alias from every entity in the tree.
pub struct RemoveEntityVariablesRewriter;

impl SqExprRewriter for RemoveEntityVariablesRewriter {
    fn rewrite_entity(&mut self, expr: &SqExpr, node: &EntityExpr) -> SqExpr {
        if node.variable.is_none() {
            return expr.clone();
        }
        builder::entity(node.schema.as_str(), node.entity.as_str(), None)
    }
}

/// Aggregates `expr` with `func`; see [`ChangeAggregateRewriter`].
pub fn set_aggregate(expr: &SqExpr, func: AggregateFunction) -> SqExpr {
    trace!(%expr, %func, "set aggregate");
    expr.rewrite_root(&mut ChangeAggregateRewriter::new(func))
}

/// Returns the argument of an aggregation, or `expr` itself.
pub fn remove_aggregate(expr: &SqExpr) -> SqExpr {
    expr.rewrite_root(&mut RemoveAggregateRewriter)
}

/// Returns `expr` with every entity alias removed.
pub fn remove_entity_variables(expr: &SqExpr) -> SqExpr {
    expr.rewrite(&mut RemoveEntityVariablesRewriter)
}
