//! Canonical scalar values carried by constant expressions, together with the
//! lossless string encoding every constant stores next to its native value.

use std::fmt;

use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::PrimitiveDateTime;

/// Primitive type tag used both by constants and by conceptual schema properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueType {
    /// The type of the `null` literal.
    Null,
    /// UTF-8 text.
    Text,
    /// Fixed-point decimal number.
    Decimal,
    /// Binary floating point number.
    Double,
    /// Signed 64-bit integer.
    Integer,
    /// Boolean.
    Boolean,
    /// Calendar date.
    Date,
    /// Date and time of day.
    DateTime,
    /// Time of day.
    Time,
    /// Elapsed duration.
    Duration,
    /// Opaque binary payload.
    Binary,
}

impl ValueType {
    /// Returns true for integer, double, and decimal types.
    pub fn is_numeric(self) -> bool {
        matches!(self, ValueType::Integer | ValueType::Double | ValueType::Decimal)
    }

    /// Returns true for the integer type.
    pub fn is_integer(self) -> bool {
        self == ValueType::Integer
    }

    /// Returns true for the text type.
    pub fn is_text(self) -> bool {
        self == ValueType::Text
    }

    /// Returns true for date, date-time, and time types.
    pub fn is_temporal(self) -> bool {
        matches!(self, ValueType::Date | ValueType::DateTime | ValueType::Time)
    }

    /// Returns true when a value of type `other` may be assigned to a slot of this type.
    ///
    /// Identical types are compatible, `null` is assignable everywhere, and numeric
    /// types accept each other.
    pub fn is_compatible_from(self, other: ValueType) -> bool {
        self == other || other == ValueType::Null || (self.is_numeric() && other.is_numeric())
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Null => "null",
            ValueType::Text => "text",
            ValueType::Decimal => "decimal",
            ValueType::Double => "double",
            ValueType::Integer => "integer",
            ValueType::Boolean => "boolean",
            ValueType::Date => "date",
            ValueType::DateTime => "dateTime",
            ValueType::Time => "time",
            ValueType::Duration => "duration",
            ValueType::Binary => "binary",
        };
        f.write_str(name)
    }
}

/// Native value held by a constant expression.
#[derive(Clone, Debug, PartialEq)]
pub enum PrimitiveValue {
    /// Null literal.
    Null,
    /// Boolean literal.
    Boolean(bool),
    /// Signed 64-bit integer literal.
    Integer(i64),
    /// 64-bit floating point literal.
    Double(f64),
    /// Decimal literal stored as a 64-bit float.
    Decimal(f64),
    /// UTF-8 string literal.
    Text(String),
    /// Date and time without offset.
    DateTime(PrimitiveDateTime),
}

impl PrimitiveValue {
    /// Returns the type tag of the value.
    pub fn value_type(&self) -> ValueType {
        match self {
            PrimitiveValue::Null => ValueType::Null,
            PrimitiveValue::Boolean(_) => ValueType::Boolean,
            PrimitiveValue::Integer(_) => ValueType::Integer,
            PrimitiveValue::Double(_) => ValueType::Double,
            PrimitiveValue::Decimal(_) => ValueType::Decimal,
            PrimitiveValue::Text(_) => ValueType::Text,
            PrimitiveValue::DateTime(_) => ValueType::DateTime,
        }
    }

    /// Produces the lossless string encoding of the value.
    pub fn encode(&self) -> String {
        match self {
            PrimitiveValue::Null => "null".to_owned(),
            PrimitiveValue::Boolean(v) => v.to_string(),
            PrimitiveValue::Integer(v) => format!("{v}L"),
            PrimitiveValue::Double(v) => format!("{v}D"),
            PrimitiveValue::Decimal(v) => format!("{v}M"),
            PrimitiveValue::Text(v) => format!("'{}'", v.replace('\'', "''")),
            PrimitiveValue::DateTime(v) => {
                let date = format!(
                    "datetime'{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
                    v.year(),
                    u8::from(v.month()),
                    v.day(),
                    v.hour(),
                    v.minute(),
                    v.second()
                );
                // Millisecond precision unless that would drop a sub-millisecond part.
                let nanos = v.nanosecond();
                if nanos % 1_000_000 == 0 {
                    format!("{date}.{:03}'", nanos / 1_000_000)
                } else {
                    format!("{date}.{nanos:09}'")
                }
            }
        }
    }

    /// Returns true when both values describe the same datum.
    ///
    /// Unlike `==`, floats compare by bit pattern and any two NaNs match.
    pub fn same_datum(&self, other: &PrimitiveValue) -> bool {
        match (self, other) {
            (PrimitiveValue::Double(a), PrimitiveValue::Double(b))
            | (PrimitiveValue::Decimal(a), PrimitiveValue::Decimal(b)) => {
                (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits()
            }
            (a, b) => a == b,
        }
    }

    /// Decodes a string produced by [`PrimitiveValue::encode`].
    ///
    /// Returns `None` when the input is not a recognised encoding.
    pub fn decode(encoded: &str) -> Option<PrimitiveValue> {
        match encoded {
            "null" => return Some(PrimitiveValue::Null),
            "true" => return Some(PrimitiveValue::Boolean(true)),
            "false" => return Some(PrimitiveValue::Boolean(false)),
            _ => {}
        }
        if let Some(body) = encoded
            .strip_prefix("datetime'")
            .and_then(|rest| rest.strip_suffix('\''))
        {
            let format = format_description!(
                "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]"
            );
            return PrimitiveDateTime::parse(body, format)
                .ok()
                .map(PrimitiveValue::DateTime);
        }
        if encoded.len() >= 2 && encoded.starts_with('\'') && encoded.ends_with('\'') {
            let body = &encoded[1..encoded.len() - 1];
            return Some(PrimitiveValue::Text(body.replace("''", "'")));
        }
        let suffix = encoded.chars().last()?;
        let number = &encoded[..encoded.len() - suffix.len_utf8()];
        match suffix {
            'L' => number.parse().ok().map(PrimitiveValue::Integer),
            'D' => number.parse().ok().map(PrimitiveValue::Double),
            'M' => number.parse().ok().map(PrimitiveValue::Decimal),
            _ => None,
        }
    }
}

impl From<&str> for PrimitiveValue {
    fn from(value: &str) -> Self {
        PrimitiveValue::Text(value.to_owned())
    }
}

impl From<String> for PrimitiveValue {
    fn from(value: String) -> Self {
        PrimitiveValue::Text(value)
    }
}

impl From<bool> for PrimitiveValue {
    fn from(value: bool) -> Self {
        PrimitiveValue::Boolean(value)
    }
}

impl From<i64> for PrimitiveValue {
    fn from(value: i64) -> Self {
        PrimitiveValue::Integer(value)
    }
}

impl From<f64> for PrimitiveValue {
    fn from(value: f64) -> Self {
        PrimitiveValue::Double(value)
    }
}

impl From<PrimitiveDateTime> for PrimitiveValue {
    fn from(value: PrimitiveDateTime) -> Self {
        PrimitiveValue::DateTime(value)
    }
}
