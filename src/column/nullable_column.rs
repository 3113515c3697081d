use crate::{
    column::{Column, DeleteState, ScalarColumn},
    common::Result,
    types::{Datum, LogicalType},
};

/// A data column paired with a per-row null mask.
///
/// The mask is itself a non-nullable BOOLEAN column so that an ordinary
/// column iterator can read it in place. `has_null` is a cached summary of
/// the mask and must be refreshed after the mask is written from outside.
#[derive(Debug, Clone, PartialEq)]
pub struct NullableColumn {
    data: Box<Column>,
    nulls: Box<Column>,
    has_null: bool,
    delete_state: DeleteState,
}

impl NullableColumn {
    pub fn new(data: Column) -> Self {
        debug_assert!(data.is_empty(), "nullable column must wrap an empty data column");
        Self {
            data: Box::new(data),
            nulls: Box::new(Column::Scalar(ScalarColumn::new(LogicalType::Boolean))),
            has_null: false,
            delete_state: DeleteState::default(),
        }
    }

    pub fn data_column(&self) -> &Column {
        &self.data
    }

    pub fn data_column_mut(&mut self) -> &mut Column {
        &mut self.data
    }

    pub fn null_column(&self) -> &Column {
        &self.nulls
    }

    pub fn null_column_mut(&mut self) -> &mut Column {
        &mut self.nulls
    }

    pub fn has_null(&self) -> bool {
        self.has_null
    }

    pub fn set_has_null(&mut self, has_null: bool) {
        self.has_null = has_null;
    }

    /// Recompute `has_null` from the mask.
    pub fn update_has_null(&mut self) -> bool {
        self.has_null = self.null_count() > 0;
        self.has_null
    }

    pub fn size(&self) -> usize {
        self.nulls.size()
    }

    pub fn is_null(&self, row: usize) -> bool {
        matches!(self.nulls.get(row), Some(Datum::Boolean(true)))
    }

    pub fn null_count(&self) -> usize {
        match self.nulls.as_ref() {
            Column::Scalar(mask) => mask.values().iter().filter(|v| **v == Datum::Boolean(true)).count(),
            _ => 0,
        }
    }

    pub fn delete_state(&self) -> DeleteState {
        self.delete_state
    }

    pub fn set_delete_state(&mut self, state: DeleteState) {
        self.delete_state = state;
    }

    pub fn push(&mut self, value: Option<Datum>) -> Result<()> {
        match value {
            Some(v) => {
                self.data.append_datum(Some(v))?;
                self.nulls.append_datum(Some(Datum::Boolean(false)))
            }
            None => {
                self.push_nulls(1);
                Ok(())
            }
        }
    }

    pub fn push_nulls(&mut self, count: usize) {
        self.data.append_default(count);
        self.push_mask(true, count);
        if count > 0 {
            self.has_null = true;
        }
    }

    fn push_mask(&mut self, is_null: bool, count: usize) {
        if let Column::Scalar(mask) = self.nulls.as_mut() {
            mask.push_repeated(Datum::Boolean(is_null), count);
        }
    }

    pub fn append(&mut self, src: &NullableColumn, offset: usize, count: usize) -> Result<()> {
        self.data.append(&src.data, offset, count)?;
        self.nulls.append(&src.nulls, offset, count)?;
        self.has_null |= (offset..offset + count).any(|row| src.is_null(row));
        Ok(())
    }

    pub fn append_not_null(&mut self, src: &Column, offset: usize, count: usize) -> Result<()> {
        self.data.append(src, offset, count)?;
        self.push_mask(false, count);
        Ok(())
    }
}
