use thiserror::Error;
use crate::lexer::Position;

/// Parser error types. Parsing stops at the first one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParserError {
    #[error("Unexpected token '{0}' at {1}")]
    UnexpectedToken(String, Position),

    #[error("Expected '{0}' but found '{1}' at {2}")]
    ExpectedToken(String, String, Position),

    #[error("Expected atom but found '{0}' at {1}")]
    ExpectedAtom(String, Position),

    #[error("Expected term but found '{0}' at {1}")]
    ExpectedTerm(String, Position),

    #[error("Expected instruction but found '{0}' at {1}")]
    ExpectedInstruction(String, Position),

    #[error("Trailing input '{0}' after main program at {1}")]
    TrailingInput(String, Position),
}

impl ParserError {
    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            ParserError::UnexpectedToken(_, pos)
            | ParserError::ExpectedToken(_, _, pos)
            | ParserError::ExpectedAtom(_, pos)
            | ParserError::ExpectedTerm(_, pos)
            | ParserError::ExpectedInstruction(_, pos)
            | ParserError::TrailingInput(_, pos) => *pos,
        }
    }
}
