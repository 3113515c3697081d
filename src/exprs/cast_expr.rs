use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    column::{Chunk, Column},
    common::{Result, StorageError},
    exprs::{ColumnRef, cast_datum, is_castable},
    types::{Datum, LogicalType},
};

/// What a cast does with a value that has no representation in the target type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastMode {
    /// The value becomes NULL.
    #[default]
    Lenient,
    /// Evaluation fails with `StorageError::CastFailed`.
    Strict,
}

/// Shape of an evaluated cast.
#[derive(Debug, Clone, PartialEq)]
pub enum CastResult {
    /// Every input row is null.
    OnlyNull,
    /// Every input row maps to the same value; holds that value as a one-row column.
    Constant(Column),
    /// One output row per input row.
    Column(Column),
}

impl CastResult {
    /// Append `rows` rows of this result to `target`.
    pub fn append_to(&self, target: &mut Column, rows: usize) -> Result<()> {
        match self {
            CastResult::OnlyNull => target.append_nulls(rows),
            CastResult::Constant(data) => target.append_value_multiple_times(data, 0, rows),
            CastResult::Column(column) => target.append(column, 0, rows),
        }
    }
}

/// Cast of one referenced column from `from` to `to`.
#[derive(Debug, Clone)]
pub struct CastExpr {
    from: LogicalType,
    to: LogicalType,
    child: ColumnRef,
    mode: CastMode,
}

impl CastExpr {
    pub fn child(&self) -> &ColumnRef {
        &self.child
    }

    pub fn evaluate_checked(&self, chunk: &Chunk) -> Result<CastResult> {
        let input = self.child.evaluate(chunk)?;
        if input.only_null() {
            return Ok(CastResult::OnlyNull);
        }

        if let Column::Const(constant) = input {
            let value = match constant.data_column().get(0) {
                Some(v) => self.cast_value(&v)?,
                None => None,
            };
            return Ok(match value {
                Some(v) => {
                    let mut data = Column::create(self.to, false);
                    data.append_datum(Some(v))?;
                    CastResult::Constant(data)
                }
                None => CastResult::OnlyNull,
            });
        }

        let mut result = Column::create(self.to, true);
        for row in 0..input.size() {
            let value = match input.get(row) {
                Some(v) => self.cast_value(&v)?,
                None => None,
            };
            result.append_datum(value)?;
        }
        result.set_delete_state(input.delete_state());
        Ok(CastResult::Column(result))
    }

    fn cast_value(&self, value: &Datum) -> Result<Option<Datum>> {
        if value.logical_type() != self.from {
            return StorageError::Internal(format!(
                "cast expects {} input, got {}",
                self.from,
                value.logical_type()
            ))
            .err();
        }
        // a json null is a SQL null, not a value to convert
        if matches!(value, Datum::Json(Value::Null)) {
            return Ok(None);
        }
        match (cast_datum(value, self.to), self.mode) {
            (Some(v), _) => Ok(Some(v)),
            (None, CastMode::Lenient) => Ok(None),
            (None, CastMode::Strict) => {
                tracing::warn!(from = %self.from, to = %self.to, value = %value, "strict cast failed");
                StorageError::CastFailed(format!("cannot cast {} '{}' to {}", self.from, value, self.to))
                    .err()
            }
        }
    }
}

/// Builds cast expressions, rejecting type pairs that cannot be converted.
pub struct VectorizedCastExprFactory;

impl VectorizedCastExprFactory {
    pub fn from_type(from: LogicalType, to: LogicalType, child: ColumnRef, mode: CastMode) -> Result<CastExpr> {
        if !is_castable(from, to) {
            return StorageError::NotSupported(format!("cast from {from} to {to}")).err();
        }
        debug_assert_eq!(child.ty, from);
        Ok(CastExpr { from, to, child, mode })
    }
}
