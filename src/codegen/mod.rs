pub mod errors;
pub mod generator;
pub mod instr;

pub use errors::*;
pub use generator::*;
pub use instr::*;
