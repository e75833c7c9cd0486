use crate::lexer::{Keyword, Position, Token, TokenKind};
use crate::parser::{Atom, BinaryOp, Call, Name, NodeId, ParserError, Term, TermKind, UnaryOp, VarRef};
use crate::symbol::Context;

/// Call inputs, parameter lists and local lists hold at most this many items
pub const MAX_THREE: usize = 3;

/// Recursive-descent parser over a token stream. Node ids come from the
/// shared `Context` in pre-order.
pub struct Parser<'a> {
    tokens: Vec<Token>,
    current: usize,
    ctx: &'a mut Context,
}

impl<'a> Parser<'a> {
    pub fn new(mut tokens: Vec<Token>, ctx: &'a mut Context) -> Self {
        if !matches!(tokens.last(), Some(Token { kind: TokenKind::Eof, .. })) {
            let pos = tokens.last().map(|t| t.pos).unwrap_or_default();
            tokens.push(Token::new(TokenKind::Eof, pos, String::new()));
        }

        Self {
            tokens,
            current: 0,
            ctx,
        }
    }

    /// Fresh node id for the node about to be built
    pub(crate) fn node_id(&mut self) -> NodeId {
        self.ctx.next_node_id()
    }

    /// Check if we've reached the end of tokens
    pub(crate) fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    /// Peek at current token without consuming it
    pub(crate) fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    /// Peek ahead n tokens
    pub(crate) fn peek_ahead(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.current + n)
    }

    pub(crate) fn position(&self) -> Position {
        self.peek().pos
    }

    /// Advance to next token, returning the consumed one
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if !self.is_at_end() {
            self.current += 1;
        }
        token
    }

    /// Cursor position to come back to
    pub(crate) fn checkpoint(&self) -> usize {
        self.current
    }

    pub(crate) fn rewind(&mut self, checkpoint: usize) {
        self.current = checkpoint;
    }

    /// Check if current token matches a kind
    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    /// Check if current token is a keyword
    pub(crate) fn check_keyword(&self, keyword: Keyword) -> bool {
        matches!(&self.peek().kind, TokenKind::Keyword(k) if *k == keyword)
    }

    pub(crate) fn check_identifier(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Identifier(_))
    }

    /// Consume a token if it matches the expected kind
    pub(crate) fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            return true;
        }
        false
    }

    /// Expect a specific token kind and consume it
    pub(crate) fn expect(&mut self, kind: &TokenKind, message: &str) -> Result<Token, ParserError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.expected(message))
        }
    }

    pub(crate) fn expect_keyword(&mut self, keyword: Keyword) -> Result<Token, ParserError> {
        if self.check_keyword(keyword) {
            Ok(self.advance())
        } else {
            Err(self.expected(&keyword.to_string()))
        }
    }

    pub(crate) fn expect_identifier(&mut self) -> Result<Name, ParserError> {
        let pos = self.position();
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = Name::new(name.clone(), pos);
                self.advance();
                Ok(name)
            }
            _ => Err(self.expected("identifier")),
        }
    }

    pub(crate) fn expected(&self, message: &str) -> ParserError {
        ParserError::ExpectedToken(
            message.to_string(),
            self.peek().kind.to_string(),
            self.peek().pos,
        )
    }

    /// Greedy list of at most three identifiers
    pub(crate) fn parse_max_three(&mut self) -> Result<Vec<Name>, ParserError> {
        let mut names = Vec::new();
        while names.len() < MAX_THREE && self.check_identifier() {
            names.push(self.expect_identifier()?);
        }
        Ok(names)
    }

    /// Parse an atom: a variable reference or a number literal
    pub(crate) fn parse_atom(&mut self) -> Result<Atom, ParserError> {
        let pos = self.position();
        match &self.peek().kind {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                let id = self.node_id();
                Ok(Atom::Var(VarRef { id, name, pos }))
            }
            TokenKind::Number(value) => {
                let value = *value;
                self.advance();
                let id = self.node_id();
                Ok(Atom::Number { id, value, pos })
            }
            other => Err(ParserError::ExpectedAtom(other.to_string(), pos)),
        }
    }

    fn check_atom(&self) -> bool {
        matches!(
            self.peek().kind,
            TokenKind::Identifier(_) | TokenKind::Number(_)
        )
    }

    /// Parse a term: an atom or a fully parenthesized unary or binary form.
    /// Binary forms are accepted in prefix `(op t t)` and infix `(t op t)`
    /// order, and `(t)` parses as `t`.
    pub(crate) fn parse_term(&mut self) -> Result<Term, ParserError> {
        let pos = self.position();

        if self.check_atom() {
            let id = self.node_id();
            let atom = self.parse_atom()?;
            return Ok(Term::new(id, TermKind::Atom(atom), pos));
        }

        if !self.check(&TokenKind::OpenParen) {
            return Err(ParserError::ExpectedTerm(self.peek().kind.to_string(), pos));
        }

        let id = self.node_id();
        self.advance(); // consume '('

        if let Some(op) = unary_op(&self.peek().kind) {
            self.advance();
            let operand = self.parse_term()?;
            self.expect(&TokenKind::CloseParen, ")")?;
            return Ok(Term::new(
                id,
                TermKind::Unary {
                    op,
                    operand: Box::new(operand),
                },
                pos,
            ));
        }

        if let Some(op) = binary_op(&self.peek().kind) {
            self.advance();
            let left = self.parse_term()?;
            let right = self.parse_term()?;
            self.expect(&TokenKind::CloseParen, ")")?;
            return Ok(binary(id, left, op, right, pos));
        }

        let left = self.parse_term()?;

        if let Some(op) = binary_op(&self.peek().kind) {
            self.advance();
            let right = self.parse_term()?;
            self.expect(&TokenKind::CloseParen, ")")?;
            return Ok(binary(id, left, op, right, pos));
        }

        self.expect(&TokenKind::CloseParen, ")")?;
        Ok(left)
    }

    /// Parse `name(atom atom atom)` once the callee name has been consumed
    pub(crate) fn parse_call(&mut self, name: Name) -> Result<Call, ParserError> {
        let id = self.node_id();
        self.expect(&TokenKind::OpenParen, "(")?;

        let mut args = Vec::new();
        while args.len() < MAX_THREE && self.check_atom() {
            args.push(self.parse_atom()?);
        }

        self.expect(&TokenKind::CloseParen, ")")?;

        Ok(Call {
            id,
            name: name.name,
            args,
            pos: name.pos,
        })
    }
}

fn binary(id: NodeId, left: Term, op: BinaryOp, right: Term, pos: Position) -> Term {
    Term::new(
        id,
        TermKind::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        },
        pos,
    )
}

fn unary_op(kind: &TokenKind) -> Option<UnaryOp> {
    match kind {
        TokenKind::Keyword(Keyword::Neg) => Some(UnaryOp::Neg),
        TokenKind::Keyword(Keyword::Not) => Some(UnaryOp::Not),
        _ => None,
    }
}

fn binary_op(kind: &TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Keyword(Keyword::Eq) => Some(BinaryOp::Eq),
        TokenKind::Greater => Some(BinaryOp::Greater),
        TokenKind::Keyword(Keyword::Or) => Some(BinaryOp::Or),
        TokenKind::Keyword(Keyword::And) => Some(BinaryOp::And),
        TokenKind::Keyword(Keyword::Plus) => Some(BinaryOp::Plus),
        TokenKind::Keyword(Keyword::Minus) => Some(BinaryOp::Minus),
        TokenKind::Keyword(Keyword::Mult) => Some(BinaryOp::Mult),
        TokenKind::Keyword(Keyword::Div) => Some(BinaryOp::Div),
        _ => None,
    }
}
