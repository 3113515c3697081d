pub mod logical_type;
pub use logical_type::*;

pub mod datum;
pub use datum::*;

pub mod json_primitive;
pub use json_primitive::*;
