pub mod json_flattener;
pub use json_flattener::*;

pub mod runtime_profile;
pub use runtime_profile::*;
