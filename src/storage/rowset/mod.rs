pub mod column_iterator;
pub use column_iterator::*;

pub mod column_iterator_options;
pub use column_iterator_options::*;

pub mod column_reader;
pub use column_reader::*;

pub mod scalar_column_iterator;
pub use scalar_column_iterator::*;

pub mod json_flat_iterator;
pub use json_flat_iterator::*;

pub mod json_dynamic_flat_iterator;
pub use json_dynamic_flat_iterator::*;

#[cfg(test)]
mod _tests;
