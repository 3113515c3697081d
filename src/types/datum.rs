use std::{cmp::Ordering, fmt::Display};

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use serde_json::{Number, Value};

use crate::types::LogicalType;

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single non-null value of one `LogicalType`.
///
/// Nullness never lives here: nullable columns keep a separate null mask and
/// store a placeholder datum for null rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datum {
    Boolean(bool),
    TinyInt(i8),
    SmallInt(i16),
    Int(i32),
    BigInt(i64),
    LargeInt(i128),
    Float(OrderedFloat<f32>),
    Double(OrderedFloat<f64>),
    Varchar(String),
    Date(NaiveDate),
    Datetime(NaiveDateTime),
    Json(Value),
}

impl Datum {
    pub fn logical_type(&self) -> LogicalType {
        match self {
            Datum::Boolean(_) => LogicalType::Boolean,
            Datum::TinyInt(_) => LogicalType::TinyInt,
            Datum::SmallInt(_) => LogicalType::SmallInt,
            Datum::Int(_) => LogicalType::Int,
            Datum::BigInt(_) => LogicalType::BigInt,
            Datum::LargeInt(_) => LogicalType::LargeInt,
            Datum::Float(_) => LogicalType::Float,
            Datum::Double(_) => LogicalType::Double,
            Datum::Varchar(_) => LogicalType::Varchar,
            Datum::Date(_) => LogicalType::Date,
            Datum::Datetime(_) => LogicalType::Datetime,
            Datum::Json(_) => LogicalType::Json,
        }
    }

    /// Placeholder stored under a null slot of a nullable column.
    pub fn default_for(ty: LogicalType) -> Datum {
        match ty {
            LogicalType::Boolean => Datum::Boolean(false),
            LogicalType::TinyInt => Datum::TinyInt(0),
            LogicalType::SmallInt => Datum::SmallInt(0),
            LogicalType::Int => Datum::Int(0),
            LogicalType::BigInt => Datum::BigInt(0),
            LogicalType::LargeInt => Datum::LargeInt(0),
            LogicalType::Float => Datum::Float(OrderedFloat(0.0)),
            LogicalType::Double => Datum::Double(OrderedFloat(0.0)),
            LogicalType::Varchar => Datum::Varchar(String::new()),
            LogicalType::Date => Datum::Date(NaiveDate::default()),
            LogicalType::Datetime => Datum::Datetime(NaiveDateTime::default()),
            LogicalType::Json => Datum::Json(Value::Null),
        }
    }

    /// Integer view of integer and boolean datums.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Datum::Boolean(b) => Some(*b as i128),
            Datum::TinyInt(v) => Some(*v as i128),
            Datum::SmallInt(v) => Some(*v as i128),
            Datum::Int(v) => Some(*v as i128),
            Datum::BigInt(v) => Some(*v as i128),
            Datum::LargeInt(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Float(v) => Some(v.into_inner() as f64),
            Datum::Double(v) => Some(v.into_inner()),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    /// Build an integer datum of type `ty`, `None` when `value` is out of range.
    pub fn from_i128(ty: LogicalType, value: i128) -> Option<Datum> {
        let (min, max) = ty.integer_bounds()?;
        if value < min || value > max {
            return None;
        }
        Some(match ty {
            LogicalType::TinyInt => Datum::TinyInt(value as i8),
            LogicalType::SmallInt => Datum::SmallInt(value as i16),
            LogicalType::Int => Datum::Int(value as i32),
            LogicalType::BigInt => Datum::BigInt(value as i64),
            _ => Datum::LargeInt(value),
        })
    }

    /// Ordering used by zone maps. Integers of different widths and floats
    /// compare numerically; anything else only compares with its own kind.
    /// JSON values are not ordered.
    pub fn compare(&self, other: &Datum) -> Option<Ordering> {
        match (self, other) {
            (Datum::Varchar(a), Datum::Varchar(b)) => Some(a.cmp(b)),
            (Datum::Date(a), Datum::Date(b)) => Some(a.cmp(b)),
            (Datum::Datetime(a), Datum::Datetime(b)) => Some(a.cmp(b)),
            (Datum::Json(_), _) | (_, Datum::Json(_)) => None,
            (Datum::Boolean(a), Datum::Boolean(b)) => Some(a.cmp(b)),
            (a, b) if a.logical_type().is_integer() && b.logical_type().is_integer() => {
                Some(a.as_i128()?.cmp(&b.as_i128()?))
            }
            (a, b) if a.logical_type().is_numeric_like() && b.logical_type().is_numeric_like() => {
                a.as_f64()?.partial_cmp(&b.as_f64()?)
            }
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Datum::Boolean(b) => Value::Bool(*b),
            Datum::TinyInt(v) => Value::Number(Number::from(*v)),
            Datum::SmallInt(v) => Value::Number(Number::from(*v)),
            Datum::Int(v) => Value::Number(Number::from(*v)),
            Datum::BigInt(v) => Value::Number(Number::from(*v)),
            Datum::LargeInt(v) => match i64::try_from(*v) {
                Ok(small) => Value::Number(Number::from(small)),
                Err(_) => Value::String(v.to_string()),
            },
            Datum::Float(v) => Self::json_f(v.into_inner() as f64),
            Datum::Double(v) => Self::json_f(v.into_inner()),
            Datum::Varchar(s) => Value::String(s.clone()),
            Datum::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
            Datum::Datetime(d) => Value::String(d.format(DATETIME_FORMAT).to_string()),
            Datum::Json(v) => v.clone(),
        }
    }

    fn json_f(f: f64) -> Value {
        Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Datum::Boolean(b) => write!(f, "{b}"),
            Datum::TinyInt(v) => write!(f, "{v}"),
            Datum::SmallInt(v) => write!(f, "{v}"),
            Datum::Int(v) => write!(f, "{v}"),
            Datum::BigInt(v) => write!(f, "{v}"),
            Datum::LargeInt(v) => write!(f, "{v}"),
            Datum::Float(v) => write!(f, "{v}"),
            Datum::Double(v) => write!(f, "{v}"),
            Datum::Varchar(s) => f.write_str(s),
            Datum::Date(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Datum::Datetime(d) => write!(f, "{}", d.format(DATETIME_FORMAT)),
            Datum::Json(v) => write!(f, "{v}"),
        }
    }
}
