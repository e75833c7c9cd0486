use thiserror::Error;

/// Position in source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Lexer error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexerError {
    #[error("Vocabulary violation: invalid character '{0}' at {1}")]
    UnexpectedChar(char, Position),

    #[error("Vocabulary violation: uppercase letter '{0}' not allowed at {1}")]
    UppercaseLetter(char, Position),

    #[error("Unterminated string literal at {0}")]
    UnterminatedString(Position),

    #[error("String literal longer than {0} characters at {1}")]
    StringTooLong(usize, Position),

    #[error("Invalid number format '{0}' at {1}")]
    InvalidNumber(String, Position),
}
