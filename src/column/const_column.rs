use crate::column::{Column, DeleteState};

/// One value logically repeated `size` times.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstColumn {
    data: Box<Column>,
    size: usize,
    delete_state: DeleteState,
}

impl ConstColumn {
    /// `data` holds exactly one row: the repeated value (possibly null).
    pub fn new(data: Column, size: usize) -> Self {
        debug_assert_eq!(data.size(), 1, "const column wraps a single-row column");
        Self { data: Box::new(data), size, delete_state: DeleteState::default() }
    }

    pub fn data_column(&self) -> &Column {
        &self.data
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn resize(&mut self, size: usize) {
        self.size = size;
    }

    pub fn delete_state(&self) -> DeleteState {
        self.delete_state
    }

    pub fn set_delete_state(&mut self, state: DeleteState) {
        self.delete_state = state;
    }
}
