pub mod common;
pub use common::{Result, StorageError};

pub mod types;
pub use types::{Datum, LogicalType};

pub mod column;
pub use column::{Column, ColumnAccessPath, DeleteState, JsonColumn};

pub mod exprs;
pub use exprs::{CastMode, CastResult, VectorizedCastExprFactory};

pub mod util;

pub mod storage;
pub use storage::{
    ColumnIterator, ColumnIteratorOptions, ColumnReader, ReaderStatistics, SparseRange, create_json_dynamic_flat_iterator,
    create_json_flat_iterator,
};
