//! Value-level conversion rules shared by cast expressions and the JSON
//! flattener. Every function answers `None` when the value has no
//! representation in the target type; callers decide whether that is a
//! null or an error.

use chrono::{NaiveDate, NaiveDateTime};
use ordered_float::OrderedFloat;
use serde_json::Value;

use crate::types::{DATE_FORMAT, DATETIME_FORMAT, Datum, LogicalType};

const ISO_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Whether a cast from `from` to `to` can be built at all.
pub fn is_castable(from: LogicalType, to: LogicalType) -> bool {
    use LogicalType::*;
    if from == to || matches!(from, Json | Varchar) || matches!(to, Json | Varchar) {
        return true;
    }
    match (from, to) {
        (f, t) if f.is_numeric_like() && t.is_numeric_like() => true,
        (Datetime, Date) | (Date, Datetime) => true,
        _ => false,
    }
}

pub fn cast_datum(value: &Datum, to: LogicalType) -> Option<Datum> {
    if value.logical_type() == to {
        return Some(value.clone());
    }
    match to {
        LogicalType::Json => Some(Datum::Json(value.to_json())),
        LogicalType::Varchar => Some(Datum::Varchar(match value {
            Datum::Json(Value::String(s)) => s.clone(),
            other => other.to_string(),
        })),
        LogicalType::Boolean => cast_to_boolean(value),
        LogicalType::Float | LogicalType::Double => cast_to_float(value, to),
        LogicalType::Date => cast_to_date(value),
        LogicalType::Datetime => cast_to_datetime(value),
        integer => cast_to_integer(value, integer),
    }
}

fn cast_to_integer(value: &Datum, to: LogicalType) -> Option<Datum> {
    let v = match value {
        Datum::Float(_) | Datum::Double(_) => truncate(value.as_f64()?)?,
        Datum::Varchar(s) | Datum::Json(Value::String(s)) => parse_integer(s)?,
        Datum::Json(Value::Bool(b)) => *b as i128,
        Datum::Json(Value::Number(n)) => match n.as_i64() {
            Some(i) => i as i128,
            None => match n.as_u64() {
                Some(u) => u as i128,
                None => truncate(n.as_f64()?)?,
            },
        },
        Datum::Json(_) => return None,
        other => other.as_i128()?,
    };
    Datum::from_i128(to, v)
}

fn truncate(f: f64) -> Option<i128> {
    let t = f.trunc();
    if !t.is_finite() || t < i128::MIN as f64 || t > i128::MAX as f64 {
        return None;
    }
    Some(t as i128)
}

fn parse_integer(s: &str) -> Option<i128> {
    let s = s.trim();
    s.parse::<i128>().ok().or_else(|| truncate(s.parse::<f64>().ok()?))
}

fn cast_to_float(value: &Datum, to: LogicalType) -> Option<Datum> {
    let f = match value {
        Datum::Varchar(s) | Datum::Json(Value::String(s)) => s.trim().parse::<f64>().ok()?,
        Datum::Json(Value::Number(n)) => n.as_f64()?,
        Datum::Json(Value::Bool(b)) => *b as i32 as f64,
        Datum::Json(_) => return None,
        other => other.as_f64()?,
    };
    match to {
        LogicalType::Float => {
            if f.is_finite() && f.abs() > f32::MAX as f64 {
                return None;
            }
            Some(Datum::Float(OrderedFloat(f as f32)))
        }
        _ => Some(Datum::Double(OrderedFloat(f))),
    }
}

fn cast_to_boolean(value: &Datum) -> Option<Datum> {
    match value {
        Datum::Varchar(s) | Datum::Json(Value::String(s)) => {
            match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" => Some(Datum::Boolean(true)),
                "false" | "0" => Some(Datum::Boolean(false)),
                _ => None,
            }
        }
        Datum::Json(Value::Bool(b)) => Some(Datum::Boolean(*b)),
        Datum::Json(Value::Number(n)) => n.as_f64().map(|f| Datum::Boolean(f != 0.0)),
        Datum::Json(_) => None,
        other => other.as_f64().map(|f| Datum::Boolean(f != 0.0)),
    }
}

fn cast_to_date(value: &Datum) -> Option<Datum> {
    match value {
        Datum::Datetime(dt) => Some(Datum::Date(dt.date())),
        Datum::Varchar(s) | Datum::Json(Value::String(s)) => parse_date(s).map(Datum::Date),
        _ => None,
    }
}

fn cast_to_datetime(value: &Datum) -> Option<Datum> {
    match value {
        Datum::Date(d) => d.and_hms_opt(0, 0, 0).map(Datum::Datetime),
        Datum::Varchar(s) | Datum::Json(Value::String(s)) => parse_datetime(s).map(Datum::Datetime),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date()))
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, DATETIME_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, ISO_DATETIME_FORMAT))
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, DATE_FORMAT).ok()?.and_hms_opt(0, 0, 0))
}
