#![forbid(unsafe_code)]

//! Semantic query expressions.
//!
//! Trees are assembled with the [`builder`] functions, inspected through the
//! [`visitor`] traits, and checked against a conceptual schema before they are
//! attached to a query or persisted as a filter.

/// Aggregate selection against the conceptual schema.
pub mod aggregate;

/// Schema validation pass.
pub mod analyze;

/// Expression node model.
///
/// Defines the [`SqExpr`] handle and the closed set of node kinds.
pub mod ast;

/// Builder functions, the only way to create expression nodes.
pub mod builder;

/// Structural equality.
pub mod equality;

/// Validation error values.
pub mod errors;

/// Conceptual schema collaborator and field resolution.
pub mod metadata;

/// Aggregate and alias rewriters.
pub mod rewrite;

/// Identity predicate extraction.
pub mod scope_identity;

/// Constant values and value types.
pub mod value;

/// Double-dispatch visitor and rewriter bases.
pub mod visitor;

pub use aggregate::{create_expr_with_aggregate, is_supported_aggregate, supported_aggregates};
pub use ast::{AggregateFunction, ComparisonKind, ExprKind, SqExpr, SqExprKind, TimeUnit};
pub use equality::{index_of_expr, sequence_equal, SqExprEqualityVisitor};
pub use errors::SqExprValidationError;
pub use metadata::{FederatedSchema, SchemaProvider, SqExprMetadata};
pub use rewrite::{remove_aggregate, remove_entity_variables, set_aggregate};
pub use scope_identity::ScopeIdentityExtractor;
pub use value::{PrimitiveValue, ValueType};
pub use visitor::{SqExprRewriter, SqExprRootRewriter, SqExprVisitor};
