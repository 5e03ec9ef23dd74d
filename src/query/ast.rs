//! Immutable semantic query expression trees.
//!
//! Every node is reached through an [`SqExpr`] handle, a reference-counted pointer to
//! an [`ExprKind`]. Handles are cheap to clone and share their node; nothing exposes
//! mutable access, so a tree never changes after the builder returned it. New
//! handles are only minted by the functions in [`crate::query::builder`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::query::value::{PrimitiveValue, ValueType};

/// Shared handle to an immutable expression node.
#[derive(Clone)]
pub struct SqExpr(Arc<ExprKind>);

impl SqExpr {
    pub(crate) fn new(kind: ExprKind) -> Self {
        SqExpr(Arc::new(kind))
    }

    /// Returns the node this handle points at.
    pub fn node(&self) -> &ExprKind {
        &self.0
    }

    /// Returns the fieldless discriminant of the node.
    pub fn kind(&self) -> SqExprKind {
        self.0.kind()
    }

    /// Returns true when both handles point at the same node allocation.
    pub fn ptr_eq(a: &SqExpr, b: &SqExpr) -> bool {
        Arc::ptr_eq(&a.0, &b.0)
    }

    /// Returns the entity node when this is an entity reference.
    pub fn as_entity(&self) -> Option<&EntityExpr> {
        match self.node() {
            ExprKind::Entity(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the constant node when this is a literal.
    pub fn as_constant(&self) -> Option<&ConstantExpr> {
        match self.node() {
            ExprKind::Constant(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the aggregation node when this is an aggregate.
    pub fn as_aggregation(&self) -> Option<&AggregationExpr> {
        match self.node() {
            ExprKind::Aggregation(node) => Some(node),
            _ => None,
        }
    }

    /// Returns the In node when this is a set-membership predicate.
    pub fn as_in(&self) -> Option<&InExpr> {
        match self.node() {
            ExprKind::In(node) => Some(node),
            _ => None,
        }
    }
}

impl fmt::Debug for SqExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

/// Closed set of expression node variants.
#[derive(Clone, Debug)]
pub enum ExprKind {
    /// Reference to a schema entity.
    Entity(EntityExpr),
    /// Column property of a source expression.
    ColumnRef(PropRefExpr),
    /// Measure property of a source expression.
    MeasureRef(PropRefExpr),
    /// Aggregate function applied to an expression.
    Aggregation(AggregationExpr),
    /// Declared variation of a column, such as a date hierarchy.
    PropertyVariationSource(PropertyVariationSourceExpr),
    /// Hierarchy on an entity or variation source.
    Hierarchy(HierarchyExpr),
    /// Level within a hierarchy.
    HierarchyLevel(HierarchyLevelExpr),
    /// Boolean conjunction.
    And(BinaryExpr),
    /// Boolean disjunction.
    Or(BinaryExpr),
    /// Binary comparison.
    Compare(CompareExpr),
    /// Inclusive range predicate.
    Between(BetweenExpr),
    /// Set membership over one or more columns.
    In(InExpr),
    /// Text containment predicate.
    Contains(BinaryExpr),
    /// Text prefix predicate.
    StartsWith(BinaryExpr),
    /// Existence predicate.
    Exists(UnaryExpr),
    /// Boolean negation.
    Not(UnaryExpr),
    /// Literal value.
    Constant(ConstantExpr),
    /// Truncation of a date to a unit.
    DateSpan(DateSpanExpr),
    /// Date arithmetic.
    DateAdd(DateAddExpr),
    /// The current instant.
    Now,
    /// Placeholder for a parameter's default value.
    DefaultValue,
    /// Placeholder matching any value.
    AnyValue,
}

impl ExprKind {
    /// Returns the fieldless discriminant of the variant.
    pub fn kind(&self) -> SqExprKind {
        match self {
            ExprKind::Entity(_) => SqExprKind::Entity,
            ExprKind::ColumnRef(_) => SqExprKind::ColumnRef,
            ExprKind::MeasureRef(_) => SqExprKind::MeasureRef,
            ExprKind::Aggregation(_) => SqExprKind::Aggregation,
            ExprKind::PropertyVariationSource(_) => SqExprKind::PropertyVariationSource,
            ExprKind::Hierarchy(_) => SqExprKind::Hierarchy,
            ExprKind::HierarchyLevel(_) => SqExprKind::HierarchyLevel,
            ExprKind::And(_) => SqExprKind::And,
            ExprKind::Or(_) => SqExprKind::Or,
            ExprKind::Compare(_) => SqExprKind::Compare,
            ExprKind::Between(_) => SqExprKind::Between,
            ExprKind::In(_) => SqExprKind::In,
            ExprKind::Contains(_) => SqExprKind::Contains,
            ExprKind::StartsWith(_) => SqExprKind::StartsWith,
            ExprKind::Exists(_) => SqExprKind::Exists,
            ExprKind::Not(_) => SqExprKind::Not,
            ExprKind::Constant(_) => SqExprKind::Constant,
            ExprKind::DateSpan(_) => SqExprKind::DateSpan,
            ExprKind::DateAdd(_) => SqExprKind::DateAdd,
            ExprKind::Now => SqExprKind::Now,
            ExprKind::DefaultValue => SqExprKind::DefaultValue,
            ExprKind::AnyValue => SqExprKind::AnyValue,
        }
    }
}

/// Fieldless mirror of [`ExprKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SqExprKind {
    Entity,
    ColumnRef,
    MeasureRef,
    Aggregation,
    PropertyVariationSource,
    Hierarchy,
    HierarchyLevel,
    And,
    Or,
    Compare,
    Between,
    In,
    Contains,
    StartsWith,
    Exists,
    Not,
    Constant,
    DateSpan,
    DateAdd,
    Now,
    DefaultValue,
    AnyValue,
}

/// Entity reference, optionally aliased by a query-local variable.
#[derive(Clone, Debug)]
pub struct EntityExpr {
    /// Schema name.
    pub schema: String,
    /// Entity name within the schema.
    pub entity: String,
    /// Optional query-local alias.
    pub variable: Option<String>,
}

/// Property access on a source expression.
#[derive(Clone, Debug)]
pub struct PropRefExpr {
    /// Expression owning the property, usually an entity.
    pub source: SqExpr,
    /// Property name.
    pub name: String,
}

/// Aggregate applied to an argument.
#[derive(Clone, Debug)]
pub struct AggregationExpr {
    /// Aggregated expression.
    pub arg: SqExpr,
    /// Aggregate function.
    pub func: AggregateFunction,
}

/// Reference into a column's declared variation.
#[derive(Clone, Debug)]
pub struct PropertyVariationSourceExpr {
    /// Expression owning the column, usually an entity.
    pub arg: SqExpr,
    /// Variation name.
    pub name: String,
    /// Column declaring the variation.
    pub property: String,
}

/// Hierarchy navigation.
#[derive(Clone, Debug)]
pub struct HierarchyExpr {
    /// Entity or variation source owning the hierarchy.
    pub arg: SqExpr,
    /// Hierarchy name.
    pub hierarchy: String,
}

/// Level navigation within a hierarchy.
#[derive(Clone, Debug)]
pub struct HierarchyLevelExpr {
    /// Hierarchy expression.
    pub arg: SqExpr,
    /// Level name.
    pub level: String,
}

/// Two-operand node shared by the boolean combinators and the text predicates.
#[derive(Clone, Debug)]
pub struct BinaryExpr {
    /// Left operand.
    pub left: SqExpr,
    /// Right operand.
    pub right: SqExpr,
}

/// Binary comparison.
#[derive(Clone, Debug)]
pub struct CompareExpr {
    /// Comparison operator.
    pub comparison: ComparisonKind,
    /// Left operand.
    pub left: SqExpr,
    /// Right operand.
    pub right: SqExpr,
}

/// Range predicate.
#[derive(Clone, Debug)]
pub struct BetweenExpr {
    /// Tested expression.
    pub arg: SqExpr,
    /// Lower bound.
    pub lower: SqExpr,
    /// Upper bound.
    pub upper: SqExpr,
}

/// Set membership over a tuple of argument expressions.
///
/// Every value tuple has exactly `args.len()` entries.
#[derive(Clone, Debug)]
pub struct InExpr {
    /// Tested expressions.
    pub args: Vec<SqExpr>,
    /// Candidate value tuples.
    pub values: Vec<Vec<SqExpr>>,
}

/// Single-operand node shared by `Exists` and `Not`.
#[derive(Clone, Debug)]
pub struct UnaryExpr {
    /// Operand.
    pub arg: SqExpr,
}

/// Literal carrying its native value and the matching lossless encoding.
#[derive(Clone, Debug)]
pub struct ConstantExpr {
    pub(crate) value: PrimitiveValue,
    pub(crate) encoded: String,
}

impl ConstantExpr {
    /// Native value.
    pub fn value(&self) -> &PrimitiveValue {
        &self.value
    }

    /// Lossless string encoding of [`ConstantExpr::value`].
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    /// Type of the literal.
    pub fn ty(&self) -> ValueType {
        self.value.value_type()
    }
}

/// Date truncation.
#[derive(Clone, Debug)]
pub struct DateSpanExpr {
    /// Truncation unit.
    pub unit: TimeUnit,
    /// Date expression.
    pub arg: SqExpr,
}

/// Date arithmetic.
#[derive(Clone, Debug)]
pub struct DateAddExpr {
    /// Unit of `amount`.
    pub unit: TimeUnit,
    /// Number of units to add; negative values subtract.
    pub amount: i64,
    /// Date expression.
    pub arg: SqExpr,
}

/// Aggregate functions understood by the query layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)]
pub enum AggregateFunction {
    Sum,
    Avg,
    Count,
    Min,
    Max,
    CountNonNull,
    Median,
    StandardDeviation,
    Variance,
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum ComparisonKind {
    Equal,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl ComparisonKind {
    fn symbol(self) -> &'static str {
        match self {
            ComparisonKind::Equal => "=",
            ComparisonKind::GreaterThan => ">",
            ComparisonKind::GreaterThanOrEqual => ">=",
            ComparisonKind::LessThan => "<",
            ComparisonKind::LessThanOrEqual => "<=",
        }
    }
}

/// Calendar units used by date arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum TimeUnit {
    Day,
    Week,
    Month,
    Year,
    Decade,
    Second,
    Minute,
    Hour,
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl fmt::Display for SqExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.node() {
            ExprKind::Entity(node) => {
                if !node.schema.is_empty() {
                    write!(f, "{}.", node.schema)?;
                }
                write!(f, "{}", node.entity)?;
                if let Some(variable) = &node.variable {
                    write!(f, " as {variable}")?;
                }
                Ok(())
            }
            ExprKind::ColumnRef(node) | ExprKind::MeasureRef(node) => {
                write!(f, "{}.[{}]", node.source, node.name)
            }
            ExprKind::Aggregation(node) => write!(f, "{}({})", node.func, node.arg),
            ExprKind::PropertyVariationSource(node) => {
                write!(f, "{}.[{}].Variation({})", node.arg, node.property, node.name)
            }
            ExprKind::Hierarchy(node) => write!(f, "{}.Hierarchy({})", node.arg, node.hierarchy),
            ExprKind::HierarchyLevel(node) => write!(f, "{}.Level({})", node.arg, node.level),
            ExprKind::And(node) => write!(f, "({} AND {})", node.left, node.right),
            ExprKind::Or(node) => write!(f, "({} OR {})", node.left, node.right),
            ExprKind::Compare(node) => write!(
                f,
                "({} {} {})",
                node.left,
                node.comparison.symbol(),
                node.right
            ),
            ExprKind::Between(node) => write!(
                f,
                "({} BETWEEN {} AND {})",
                node.arg, node.lower, node.upper
            ),
            ExprKind::In(node) => {
                f.write_str("(")?;
                write_list(f, &node.args)?;
                f.write_str(") IN (")?;
                for (idx, tuple) in node.values.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str("(")?;
                    write_list(f, tuple)?;
                    f.write_str(")")?;
                }
                f.write_str(")")
            }
            ExprKind::Contains(node) => write!(f, "Contains({}, {})", node.left, node.right),
            ExprKind::StartsWith(node) => write!(f, "StartsWith({}, {})", node.left, node.right),
            ExprKind::Exists(node) => write!(f, "Exists({})", node.arg),
            ExprKind::Not(node) => write!(f, "NOT {}", node.arg),
            ExprKind::Constant(node) => f.write_str(&node.encoded),
            ExprKind::DateSpan(node) => write!(f, "DateSpan({}, {})", node.unit, node.arg),
            ExprKind::DateAdd(node) => {
                write!(f, "DateAdd({}, {}, {})", node.unit, node.amount, node.arg)
            }
            ExprKind::Now => f.write_str("Now()"),
            ExprKind::DefaultValue => f.write_str("DefaultValue"),
            ExprKind::AnyValue => f.write_str("AnyValue"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, exprs: &[SqExpr]) -> fmt::Result {
    for (idx, expr) in exprs.iter().enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{expr}")?;
    }
    Ok(())
}
