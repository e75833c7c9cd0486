use thiserror::Error;
use crate::lexer::Position;

/// Code generation error types. A program that passed analysis never
/// produces one; they guard callers that skip the analysis gates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("Variable '{0}' at {1} was never resolved to a declaration")]
    UnresolvedVariable(String, Position),

    #[error("Call to unknown subroutine '{0}' at {1}")]
    UnknownSubroutine(String, Position),

    #[error("Procedure '{0}' at {1} has no value to assign")]
    ProcedureValue(String, Position),
}

/// A line of a textual listing that is not a label or an instruction
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Malformed instruction '{line}': {reason}")]
pub struct LineParseError {
    pub line: String,
    pub reason: String,
}

impl LineParseError {
    pub fn new(line: &str, reason: impl Into<String>) -> Self {
        Self {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
