pub mod column;
pub use column::*;

pub mod scalar_column;
pub use scalar_column::*;

pub mod nullable_column;
pub use nullable_column::*;

pub mod const_column;
pub use const_column::*;

pub mod json_column;
pub use json_column::*;

pub mod chunk;
pub use chunk::*;

pub mod column_access_path;
pub use column_access_path::*;
