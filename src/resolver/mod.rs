pub mod errors;
pub mod labels;

pub use errors::*;
pub use labels::*;
