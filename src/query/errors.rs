#![allow(missing_docs)]

use std::fmt;

use thiserror::Error;

use crate::query::ast::AggregateFunction;
use crate::query::value::ValueType;

/// Structured errors collected while validating an expression against a schema.
///
/// Validation never fails fast; callers receive every error found in one pass and
/// decide whether to reject, warn, or ignore.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqExprValidationError {
    /// Aggregate is not in the supported set of the aggregated column.
    #[error("aggregate {func} not supported on '{property}'")]
    InvalidAggregateFunction {
        func: AggregateFunction,
        property: String,
    },
    /// Referenced schema is unknown to the provider.
    #[error("unknown schema '{schema}'")]
    InvalidSchemaReference { schema: String },
    /// Referenced entity does not exist in its schema.
    #[error("unknown entity '{entity}' in schema '{schema}'")]
    InvalidEntityReference { schema: String, entity: String },
    /// Column reference names a missing, non-column, or non-queryable property.
    #[error("'{property}' is not a queryable column of '{entity}'")]
    InvalidColumnReference { entity: String, property: String },
    /// Measure reference names a missing, non-measure, or non-queryable property.
    #[error("'{property}' is not a queryable measure of '{entity}'")]
    InvalidMeasureReference { entity: String, property: String },
    /// Left operand of a text predicate is not a column reference.
    #[error("{operator} requires a column reference on the left")]
    InvalidLeftOperandType { operator: &'static str },
    /// Right operand of a text predicate is not a text constant.
    #[error("{operator} requires a text constant on the right")]
    InvalidRightOperandType { operator: &'static str },
    /// Operand types are not assignment compatible.
    #[error("{found} value is not compatible with {expected}")]
    InvalidValueType { expected: ValueType, found: ValueType },
}

impl SqExprValidationError {
    /// Returns a machine-readable code for the error variant.
    pub fn code(&self) -> &'static str {
        match self {
            SqExprValidationError::InvalidAggregateFunction { .. } => "InvalidAggregateFunction",
            SqExprValidationError::InvalidSchemaReference { .. } => "InvalidSchemaReference",
            SqExprValidationError::InvalidEntityReference { .. } => "InvalidEntityReference",
            SqExprValidationError::InvalidColumnReference { .. } => "InvalidColumnReference",
            SqExprValidationError::InvalidMeasureReference { .. } => "InvalidMeasureReference",
            SqExprValidationError::InvalidLeftOperandType { .. } => "InvalidLeftOperandType",
            SqExprValidationError::InvalidRightOperandType { .. } => "InvalidRightOperandType",
            SqExprValidationError::InvalidValueType { .. } => "InvalidValueType",
        }
    }
}

/// Formats a validation error prefixed with its code.
pub struct ValidationErrorWithCode<'a>(pub &'a SqExprValidationError);

impl fmt::Display for ValidationErrorWithCode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.0.code(), self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code() {
        let err = SqExprValidationError::InvalidValueType {
            expected: ValueType::Text,
            found: ValueType::Integer,
        };
        let rendered = ValidationErrorWithCode(&err).to_string();
        assert!(rendered.starts_with("[InvalidValueType] "));
    }
}
