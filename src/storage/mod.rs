pub mod range;
pub use range::*;

pub mod column_predicate;
pub use column_predicate::*;

pub mod reader_statistics;
pub use reader_statistics::*;

pub mod rowset;
pub use rowset::*;
