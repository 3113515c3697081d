use crate::{
    column::{Chunk, Column, SlotId},
    common::{Result, StorageError},
    types::LogicalType,
};

/// Reference to the column bound to `slot_id` in a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnRef {
    pub slot_id: SlotId,
    pub ty: LogicalType,
}

impl ColumnRef {
    pub fn new(slot_id: SlotId, ty: LogicalType) -> Self {
        Self { slot_id, ty }
    }

    pub fn evaluate<'a>(&self, chunk: &'a Chunk) -> Result<&'a Column> {
        chunk
            .get_column_by_slot_id(self.slot_id)
            .ok_or_else(|| StorageError::Internal(format!("slot {} not found in chunk", self.slot_id)))
    }
}
