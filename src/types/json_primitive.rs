use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::LogicalType;

/// Coarse shape of a JSON value found at a flattened path.
///
/// Used by the flattener to reject values that can never land in a given
/// target type before attempting a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JsonPrimitive {
    /// JSON null
    Null,
    /// JSON boolean
    Bool,
    /// Integer number
    Int,
    /// Floating-point number
    Float,
    /// String
    String,
    /// JSON object (map)
    Object,
    /// JSON array
    Array,
}

impl JsonPrimitive {
    /// Classify a serde_json `Value` into a `JsonPrimitive`.
    pub fn of_value(v: &Value) -> JsonPrimitive {
        match v {
            Value::Null => JsonPrimitive::Null,
            Value::Bool(_) => JsonPrimitive::Bool,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    JsonPrimitive::Int
                } else {
                    JsonPrimitive::Float
                }
            }
            Value::String(_) => JsonPrimitive::String,
            Value::Array(_) => JsonPrimitive::Array,
            Value::Object(_) => JsonPrimitive::Object,
        }
    }

    /// Whether a value of this shape can possibly be represented as `target`.
    ///
    /// Containers only fit JSON and VARCHAR (serialized); null fits nothing
    /// because it always becomes a null field.
    pub fn may_convert_to(self, target: LogicalType) -> bool {
        use JsonPrimitive::*;
        match (self, target) {
            (Null, _) => false,
            (_, LogicalType::Json) | (_, LogicalType::Varchar) => true,
            (Object | Array, _) => false,
            (Bool | Int | Float, t) => t.is_numeric_like(),
            (String, _) => true,
        }
    }
}
