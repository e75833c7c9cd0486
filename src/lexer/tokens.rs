use crate::lexer::Position;
use std::fmt;

/// Reserved words of the SPL vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Glob,
    Proc,
    Func,
    Main,
    Var,
    Local,
    Return,
    Halt,
    Print,
    If,
    Else,
    While,
    Do,
    Until,
    Neg,
    Not,
    Eq,
    Or,
    And,
    Plus,
    Minus,
    Mult,
    Div,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Keyword::Glob => "glob",
            Keyword::Proc => "proc",
            Keyword::Func => "func",
            Keyword::Main => "main",
            Keyword::Var => "var",
            Keyword::Local => "local",
            Keyword::Return => "return",
            Keyword::Halt => "halt",
            Keyword::Print => "print",
            Keyword::If => "if",
            Keyword::Else => "else",
            Keyword::While => "while",
            Keyword::Do => "do",
            Keyword::Until => "until",
            Keyword::Neg => "neg",
            Keyword::Not => "not",
            Keyword::Eq => "eq",
            Keyword::Or => "or",
            Keyword::And => "and",
            Keyword::Plus => "plus",
            Keyword::Minus => "minus",
            Keyword::Mult => "mult",
            Keyword::Div => "div",
        };
        write!(f, "{s}")
    }
}

impl Keyword {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "glob" => Some(Keyword::Glob),
            "proc" => Some(Keyword::Proc),
            "func" => Some(Keyword::Func),
            "main" => Some(Keyword::Main),
            "var" => Some(Keyword::Var),
            "local" => Some(Keyword::Local),
            "return" => Some(Keyword::Return),
            "halt" => Some(Keyword::Halt),
            "print" => Some(Keyword::Print),
            "if" => Some(Keyword::If),
            "else" => Some(Keyword::Else),
            "while" => Some(Keyword::While),
            "do" => Some(Keyword::Do),
            "until" => Some(Keyword::Until),
            "neg" => Some(Keyword::Neg),
            "not" => Some(Keyword::Not),
            "eq" => Some(Keyword::Eq),
            "or" => Some(Keyword::Or),
            "and" => Some(Keyword::And),
            "plus" => Some(Keyword::Plus),
            "minus" => Some(Keyword::Minus),
            "mult" => Some(Keyword::Mult),
            "div" => Some(Keyword::Div),
            _ => None,
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Punctuation
    OpenParen,          // (
    CloseParen,         // )
    OpenBrace,          // {
    CloseBrace,         // }
    Semicolon,          // ;
    Assign,             // =
    Greater,            // >

    // Literals and identifiers
    Number(i64),
    StringLiteral(String),
    Identifier(String),
    Keyword(Keyword),

    Eof,
}

/// A token with position information
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub pos: Position,
    pub lexeme: String,
}

impl Token {
    pub fn new(kind: TokenKind, pos: Position, lexeme: String) -> Self {
        Self { kind, pos, lexeme }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TokenKind::OpenParen => write!(f, "("),
            TokenKind::CloseParen => write!(f, ")"),
            TokenKind::OpenBrace => write!(f, "{{"),
            TokenKind::CloseBrace => write!(f, "}}"),
            TokenKind::Semicolon => write!(f, ";"),
            TokenKind::Assign => write!(f, "="),
            TokenKind::Greater => write!(f, ">"),
            TokenKind::Number(n) => write!(f, "{n}"),
            TokenKind::StringLiteral(s) => write!(f, "\"{s}\""),
            TokenKind::Identifier(s) => write!(f, "{s}"),
            TokenKind::Keyword(kw) => write!(f, "{kw}"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}
