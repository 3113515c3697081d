use serde::{Deserialize, Serialize};

use crate::{
    column::{ConstColumn, JsonColumn, NullableColumn, ScalarColumn},
    common::{Result, StorageError},
    types::{Datum, LogicalType},
};

/// Soft-delete marking carried alongside column data.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeleteState {
    /// No row of the column matches the delete condition.
    #[default]
    NotSatisfied,
    /// Every row matches the delete condition.
    Satisfied,
    /// Some rows match; they must be checked one by one.
    PartialSatisfied,
}

/// An in-memory column batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Scalar(ScalarColumn),
    Nullable(NullableColumn),
    Json(JsonColumn),
    Const(ConstColumn),
}

impl Column {
    /// Create an empty column able to hold values of `ty`.
    pub fn create(ty: LogicalType, nullable: bool) -> Column {
        let data = match ty {
            LogicalType::Json => Column::Json(JsonColumn::new()),
            other => Column::Scalar(ScalarColumn::new(other)),
        };
        if nullable {
            Column::Nullable(NullableColumn::new(data))
        } else {
            data
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Column::Scalar(c) => c.size(),
            Column::Nullable(c) => c.size(),
            Column::Json(c) => c.size(),
            Column::Const(c) => c.size(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Column::Nullable(_))
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Column::Const(_))
    }

    /// True when the column has rows and every one of them is null.
    pub fn only_null(&self) -> bool {
        match self {
            Column::Nullable(c) => c.size() > 0 && c.null_count() == c.size(),
            Column::Const(c) => c.size() > 0 && c.data_column().only_null(),
            _ => false,
        }
    }

    /// Empty column of the same shape. JSON columns come back in raw layout.
    pub fn clone_empty(&self) -> Column {
        match self {
            Column::Scalar(c) => Column::Scalar(ScalarColumn::new(c.logical_type())),
            Column::Nullable(c) => Column::Nullable(NullableColumn::new(c.data_column().clone_empty())),
            Column::Json(_) => Column::Json(JsonColumn::new()),
            Column::Const(c) => c.data_column().clone_empty(),
        }
    }

    pub fn delete_state(&self) -> DeleteState {
        match self {
            Column::Scalar(c) => c.delete_state(),
            Column::Nullable(c) => c.delete_state(),
            Column::Json(c) => c.delete_state(),
            Column::Const(c) => c.delete_state(),
        }
    }

    pub fn set_delete_state(&mut self, state: DeleteState) {
        match self {
            Column::Scalar(c) => c.set_delete_state(state),
            Column::Nullable(c) => c.set_delete_state(state),
            Column::Json(c) => c.set_delete_state(state),
            Column::Const(c) => c.set_delete_state(state),
        }
    }

    /// Value at `row`; `None` for null rows and out-of-range rows.
    ///
    /// A flattened JSON row is reassembled into a document.
    pub fn get(&self, row: usize) -> Option<Datum> {
        match self {
            Column::Scalar(c) => c.values().get(row).cloned(),
            Column::Nullable(c) => {
                if row >= c.size() || c.is_null(row) {
                    None
                } else {
                    c.data_column().get(row)
                }
            }
            Column::Json(c) => c.get_json(row).map(Datum::Json),
            Column::Const(c) => {
                if row < c.size() {
                    c.data_column().get(0)
                } else {
                    None
                }
            }
        }
    }

    pub fn append_datum(&mut self, value: Option<Datum>) -> Result<()> {
        match (self, value) {
            (Column::Nullable(c), value) => c.push(value),
            (Column::Scalar(c), Some(d)) => c.push(d),
            (Column::Json(c), Some(Datum::Json(v))) => c.push_json(v),
            (Column::Json(_), Some(other)) => StorageError::InvalidArgument(format!(
                "cannot append {} value to a json column",
                other.logical_type()
            ))
            .err(),
            (Column::Const(_), _) => {
                StorageError::NotSupported("append to a const column".into()).err()
            }
            (column, None) => StorageError::InvalidArgument(format!(
                "null appended to non-nullable column of {} rows",
                column.size()
            ))
            .err(),
        }
    }

    /// Append placeholder rows: nulls for nullable columns, type defaults otherwise.
    pub fn append_default(&mut self, count: usize) {
        match self {
            Column::Scalar(c) => c.push_default(count),
            Column::Nullable(c) => c.push_nulls(count),
            Column::Json(c) => c.push_default(count),
            Column::Const(c) => c.resize(c.size() + count),
        }
    }

    pub fn append_nulls(&mut self, count: usize) -> Result<()> {
        match self {
            Column::Nullable(c) => {
                c.push_nulls(count);
                Ok(())
            }
            _ => StorageError::InvalidArgument("append nulls to non-nullable column".into()).err(),
        }
    }

    /// Append `count` rows of `src` starting at `offset`.
    pub fn append(&mut self, src: &Column, offset: usize, count: usize) -> Result<()> {
        if offset + count > src.size() {
            return StorageError::InvalidArgument(format!(
                "append range {}..{} exceeds source size {}",
                offset,
                offset + count,
                src.size()
            ))
            .err();
        }
        match (self, src) {
            (dst, Column::Const(c)) => dst.append_value_multiple_times(c.data_column(), 0, count),
            (Column::Scalar(d), Column::Scalar(s)) => d.append(s, offset, count),
            (Column::Nullable(d), Column::Nullable(s)) => d.append(s, offset, count),
            (Column::Nullable(d), other) => d.append_not_null(other, offset, count),
            (Column::Json(d), Column::Json(s)) => d.append(s, offset, count),
            (dst, Column::Nullable(s)) => {
                if (offset..offset + count).any(|row| s.is_null(row)) {
                    return StorageError::InvalidArgument(
                        "null rows appended to non-nullable column".into(),
                    )
                    .err();
                }
                dst.append(s.data_column(), offset, count)
            }
            (dst, src) => StorageError::NotSupported(format!(
                "append {} column into {} column",
                src.kind_name(),
                dst.kind_name()
            ))
            .err(),
        }
    }

    /// Append row `index` of `src` `count` times.
    pub fn append_value_multiple_times(&mut self, src: &Column, index: usize, count: usize) -> Result<()> {
        if index >= src.size() {
            return StorageError::InvalidArgument(format!(
                "row {} out of range for column of {} rows",
                index,
                src.size()
            ))
            .err();
        }
        let value = src.get(index);
        for _ in 0..count {
            self.append_datum(value.clone())?;
        }
        Ok(())
    }

    pub fn as_nullable(&self) -> Option<&NullableColumn> {
        match self {
            Column::Nullable(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_nullable_mut(&mut self) -> Option<&mut NullableColumn> {
        match self {
            Column::Nullable(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonColumn> {
        match self {
            Column::Json(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_json_mut(&mut self) -> Option<&mut JsonColumn> {
        match self {
            Column::Json(c) => Some(c),
            _ => None,
        }
    }

    /// The JSON value part of a JSON column, looking through a nullable wrapper.
    pub fn json_data(&self) -> Option<&JsonColumn> {
        match self {
            Column::Json(c) => Some(c),
            Column::Nullable(c) => c.data_column().as_json(),
            _ => None,
        }
    }

    pub fn json_data_mut(&mut self) -> Option<&mut JsonColumn> {
        match self {
            Column::Json(c) => Some(c),
            Column::Nullable(c) => c.data_column_mut().as_json_mut(),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Column::Scalar(_) => "scalar",
            Column::Nullable(_) => "nullable",
            Column::Json(_) => "json",
            Column::Const(_) => "const",
        }
    }
}
