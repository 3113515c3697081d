use indexmap::IndexMap;

use crate::column::Column;

pub type SlotId = usize;

/// A small row batch: columns addressed by slot id.
#[derive(Debug, Default)]
pub struct Chunk {
    columns: Vec<Column>,
    slot_id_to_index: IndexMap<SlotId, usize>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column` under `slot_id`, replacing any column already bound to it.
    pub fn append_column(&mut self, column: Column, slot_id: SlotId) {
        match self.slot_id_to_index.get(&slot_id) {
            Some(&index) => self.columns[index] = column,
            None => {
                self.slot_id_to_index.insert(slot_id, self.columns.len());
                self.columns.push(column);
            }
        }
    }

    pub fn get_column_by_slot_id(&self, slot_id: SlotId) -> Option<&Column> {
        self.slot_id_to_index.get(&slot_id).map(|index| &self.columns[*index])
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map(Column::size).unwrap_or(0)
    }
}
