//! SPL Compiler
//!
//! Compiles the SPL teaching language into a numbered, BASIC-style
//! instruction listing with GOTO/GOSUB jumps.

pub mod analysis;
pub mod codegen;
pub mod compiler;
pub mod lexer;
pub mod parser;
pub mod resolver;
pub mod symbol;

pub use compiler::*;
