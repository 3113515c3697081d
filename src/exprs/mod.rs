pub mod column_ref;
pub use column_ref::*;

pub mod cast;
pub use cast::*;

pub mod cast_expr;
pub use cast_expr::*;
