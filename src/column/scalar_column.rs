use crate::{
    column::DeleteState,
    common::{Result, StorageError},
    types::{Datum, LogicalType},
};

/// Non-nullable column of datums that all share one logical type.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarColumn {
    ty: LogicalType,
    values: Vec<Datum>,
    delete_state: DeleteState,
}

impl ScalarColumn {
    pub fn new(ty: LogicalType) -> Self {
        Self { ty, values: Vec::new(), delete_state: DeleteState::default() }
    }

    pub fn logical_type(&self) -> LogicalType {
        self.ty
    }

    pub fn values(&self) -> &[Datum] {
        &self.values
    }

    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn delete_state(&self) -> DeleteState {
        self.delete_state
    }

    pub fn set_delete_state(&mut self, state: DeleteState) {
        self.delete_state = state;
    }

    pub fn push(&mut self, value: Datum) -> Result<()> {
        if value.logical_type() != self.ty {
            return StorageError::InvalidArgument(format!(
                "cannot append {} value to {} column",
                value.logical_type(),
                self.ty
            ))
            .err();
        }
        self.values.push(value);
        Ok(())
    }

    pub fn push_default(&mut self, count: usize) {
        let default = Datum::default_for(self.ty);
        self.values.extend(std::iter::repeat_n(default, count));
    }

    pub(crate) fn push_repeated(&mut self, value: Datum, count: usize) {
        debug_assert_eq!(value.logical_type(), self.ty);
        self.values.extend(std::iter::repeat_n(value, count));
    }

    pub fn append(&mut self, src: &ScalarColumn, offset: usize, count: usize) -> Result<()> {
        if src.ty != self.ty {
            return StorageError::InvalidArgument(format!(
                "cannot append {} column to {} column",
                src.ty, self.ty
            ))
            .err();
        }
        self.values.extend_from_slice(&src.values[offset..offset + count]);
        Ok(())
    }
}
