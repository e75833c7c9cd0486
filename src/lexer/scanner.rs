use crate::lexer::{Keyword, LexerError, Position, Token, TokenKind};

/// Default upper bound on the number of characters between string quotes
pub const DEFAULT_MAX_STRING_LEN: usize = 15;

pub struct Scanner {
    input: Vec<char>,
    current: usize,
    line: usize,
    column: usize,
    max_string_len: usize,
    tokens: Vec<Token>,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            current: 0,
            line: 1,
            column: 1,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            tokens: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_max_string_len(mut self, max_string_len: usize) -> Self {
        self.max_string_len = max_string_len;
        self
    }

    /// Scan the whole input, ending the stream with an `Eof` token
    /// # Errors
    /// On the first vocabulary violation
    pub fn scan_all(mut self) -> Result<Vec<Token>, LexerError> {
        loop {
            self.skip_whitespace_and_comments();
            if self.is_at_end() {
                break;
            }

            let token = self.scan_token()?;
            self.tokens.push(token);
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            self.current_position(),
            String::new(),
        ));

        tracing::debug!(count = self.tokens.len(), "tokenized input");
        Ok(self.tokens)
    }

    fn current_position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.current).copied()
    }

    fn peek_ahead(&self, offset: usize) -> Option<char> {
        self.input.get(self.current + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.current += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn text(&self, start: usize) -> String {
        self.input[start..self.current].iter().collect()
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                ' ' | '\t' | '\r' | '\n' => {
                    self.advance();
                }
                '/' if self.peek_ahead(1) == Some('/') => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token, LexerError> {
        let start_pos = self.current_position();
        let start_idx = self.current;

        let Some(ch) = self.peek() else {
            return Ok(Token::new(TokenKind::Eof, start_pos, String::new()));
        };

        let kind = match ch {
            '(' => TokenKind::OpenParen,
            ')' => TokenKind::CloseParen,
            '{' => TokenKind::OpenBrace,
            '}' => TokenKind::CloseBrace,
            ';' => TokenKind::Semicolon,
            '=' => TokenKind::Assign,
            '>' => TokenKind::Greater,

            '"' => return self.scan_string_literal(start_pos),
            '0'..='9' => return self.scan_number(start_pos),
            'a'..='z' => return Ok(self.scan_identifier_or_keyword(start_pos)),

            ch if ch.is_uppercase() => return Err(LexerError::UppercaseLetter(ch, start_pos)),
            _ => return Err(LexerError::UnexpectedChar(ch, start_pos)),
        };

        self.advance();
        Ok(Token::new(kind, start_pos, self.text(start_idx)))
    }

    fn scan_string_literal(&mut self, start_pos: Position) -> Result<Token, LexerError> {
        let start_idx = self.current;
        self.advance(); // opening quote

        let mut value = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => return Err(LexerError::UnterminatedString(start_pos)),
                Some('"') => break,
                Some(ch) => {
                    if value.chars().count() == self.max_string_len {
                        return Err(LexerError::StringTooLong(self.max_string_len, start_pos));
                    }
                    value.push(ch);
                    self.advance();
                }
            }
        }
        self.advance(); // closing quote

        Ok(Token::new(
            TokenKind::StringLiteral(value),
            start_pos,
            self.text(start_idx),
        ))
    }

    /// Numbers follow `0 | [1-9][0-9]*`
    fn scan_number(&mut self, start_pos: Position) -> Result<Token, LexerError> {
        let start_idx = self.current;
        let first = self.advance();

        if first == Some('0') {
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
                return Err(LexerError::InvalidNumber(self.text(start_idx), start_pos));
            }
        } else {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let lexeme = self.text(start_idx);
        let value: i64 = lexeme
            .parse()
            .map_err(|_| LexerError::InvalidNumber(lexeme.clone(), start_pos))?;

        Ok(Token::new(TokenKind::Number(value), start_pos, lexeme))
    }

    /// User-defined names follow `[a-z]+[0-9]*` and must not be keywords
    fn scan_identifier_or_keyword(&mut self, start_pos: Position) -> Token {
        let start_idx = self.current;

        while self.peek().is_some_and(|c| c.is_ascii_lowercase()) {
            self.advance();
        }
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let text = self.text(start_idx);

        if let Some(keyword) = Keyword::from_str(&text) {
            return Token::new(TokenKind::Keyword(keyword), start_pos, text);
        }

        Token::new(TokenKind::Identifier(text.clone()), start_pos, text)
    }
}

/// Tokenize SPL source with the default string length bound
/// # Errors
/// On the first vocabulary violation
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexerError> {
    Scanner::new(input).scan_all()
}
