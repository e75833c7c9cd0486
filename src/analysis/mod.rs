pub mod errors;
pub mod scope;
pub mod types;

pub use errors::*;
pub use scope::*;
pub use types::*;
