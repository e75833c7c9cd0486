use thiserror::Error;

use crate::codegen::LineParseError;

/// Label resolution failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Jump to undefined label '{0}'")]
    UndefinedLabel(String),

    #[error("Label '{0}' is declared more than once")]
    DuplicateLabel(String),

    #[error("Line {0}: {1}")]
    MalformedLine(usize, LineParseError),
}
