pub mod context;
pub mod table;

pub use context::*;
pub use table::*;
