pub mod ast;
pub mod errors;
pub mod expressions;
pub mod statements;

pub use ast::*;
pub use errors::*;
pub use expressions::{Parser, MAX_THREE};
pub use statements::*;
