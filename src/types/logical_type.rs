use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Physical/logical type of a column or of a flattened JSON field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalType {
    Boolean,
    TinyInt,
    SmallInt,
    Int,
    BigInt,
    LargeInt,
    Float,
    Double,
    Varchar,
    Date,
    Datetime,
    Json,
}

impl LogicalType {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            LogicalType::TinyInt
                | LogicalType::SmallInt
                | LogicalType::Int
                | LogicalType::BigInt
                | LogicalType::LargeInt
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, LogicalType::Float | LogicalType::Double)
    }

    /// Integers, floats and booleans all convert between each other.
    pub fn is_numeric_like(self) -> bool {
        self.is_integer() || self.is_float() || self == LogicalType::Boolean
    }

    /// Inclusive value range of an integer type, `None` for anything else.
    pub fn integer_bounds(self) -> Option<(i128, i128)> {
        match self {
            LogicalType::TinyInt => Some((i8::MIN as i128, i8::MAX as i128)),
            LogicalType::SmallInt => Some((i16::MIN as i128, i16::MAX as i128)),
            LogicalType::Int => Some((i32::MIN as i128, i32::MAX as i128)),
            LogicalType::BigInt => Some((i64::MIN as i128, i64::MAX as i128)),
            LogicalType::LargeInt => Some((i128::MIN, i128::MAX)),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            LogicalType::Boolean => "BOOLEAN",
            LogicalType::TinyInt => "TINYINT",
            LogicalType::SmallInt => "SMALLINT",
            LogicalType::Int => "INT",
            LogicalType::BigInt => "BIGINT",
            LogicalType::LargeInt => "LARGEINT",
            LogicalType::Float => "FLOAT",
            LogicalType::Double => "DOUBLE",
            LogicalType::Varchar => "VARCHAR",
            LogicalType::Date => "DATE",
            LogicalType::Datetime => "DATETIME",
            LogicalType::Json => "JSON",
        }
    }
}

impl Display for LogicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
