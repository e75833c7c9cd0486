use crate::lexer::{Keyword, Token, TokenKind};
use crate::parser::expressions::Parser;
use crate::parser::{
    Algo, AssignValue, FuncDef, Instr, InstrKind, LoopKind, MainProg, Name, Output, ParserError,
    ProcDef, Program, VarRef,
};
use crate::symbol::Context;

/// Parse a whole token stream into a program, drawing node ids from `ctx`
/// # Errors
/// On the first token that does not fit the grammar
#[tracing::instrument(skip_all)]
pub fn parse(tokens: Vec<Token>, ctx: &mut Context) -> Result<Program, ParserError> {
    let program = Parser::new(tokens, ctx).parse_program()?;
    tracing::debug!(
        globals = program.globals.len(),
        procedures = program.procedures.len(),
        functions = program.functions.len(),
        "parsed program"
    );
    Ok(program)
}

impl Parser<'_> {
    /// `glob{VARS} proc{PDEFS} func{FDEFS} main{var{VARS} ALGO}`
    /// # Errors
    /// On the first token that does not fit the grammar
    pub fn parse_program(&mut self) -> Result<Program, ParserError> {
        let id = self.node_id();

        self.expect_keyword(Keyword::Glob)?;
        self.expect(&TokenKind::OpenBrace, "{")?;
        let globals = self.parse_variables()?;
        self.expect(&TokenKind::CloseBrace, "}")?;

        self.expect_keyword(Keyword::Proc)?;
        self.expect(&TokenKind::OpenBrace, "{")?;
        let mut procedures = Vec::new();
        while self.check_identifier() {
            procedures.push(self.parse_proc_def()?);
        }
        self.expect(&TokenKind::CloseBrace, "}")?;

        self.expect_keyword(Keyword::Func)?;
        self.expect(&TokenKind::OpenBrace, "{")?;
        let mut functions = Vec::new();
        while self.check_identifier() {
            functions.push(self.parse_func_def()?);
        }
        self.expect(&TokenKind::CloseBrace, "}")?;

        let main = self.parse_main()?;

        if !self.is_at_end() {
            let token = self.peek();
            return Err(ParserError::TrailingInput(token.kind.to_string(), token.pos));
        }

        Ok(Program {
            id,
            globals,
            procedures,
            functions,
            main,
        })
    }

    /// Zero or more identifiers
    fn parse_variables(&mut self) -> Result<Vec<Name>, ParserError> {
        let mut names = Vec::new();
        while self.check_identifier() {
            names.push(self.expect_identifier()?);
        }
        Ok(names)
    }

    /// `name(MAXTHREE){local{MAXTHREE} ALGO}`
    fn parse_proc_def(&mut self) -> Result<ProcDef, ParserError> {
        let id = self.node_id();
        let name = self.expect_identifier()?;
        let params = self.parse_params()?;

        self.expect(&TokenKind::OpenBrace, "{")?;
        let locals = self.parse_locals()?;
        let body = self.parse_algo()?;
        self.expect(&TokenKind::CloseBrace, "}")?;

        Ok(ProcDef {
            id,
            name,
            params,
            locals,
            body,
        })
    }

    /// `name(MAXTHREE){local{MAXTHREE} ALGO; return ATOM}`. A missing return
    /// is left for the type analyzer to report.
    fn parse_func_def(&mut self) -> Result<FuncDef, ParserError> {
        let id = self.node_id();
        let name = self.expect_identifier()?;
        let params = self.parse_params()?;

        self.expect(&TokenKind::OpenBrace, "{")?;
        let locals = self.parse_locals()?;
        let body = self.parse_algo()?;

        let ret = if self.check_keyword(Keyword::Return) {
            self.advance();
            Some(self.parse_atom()?)
        } else {
            None
        };
        self.expect(&TokenKind::CloseBrace, "}")?;

        Ok(FuncDef {
            id,
            name,
            params,
            locals,
            body,
            ret,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<Name>, ParserError> {
        self.expect(&TokenKind::OpenParen, "(")?;
        let params = self.parse_max_three()?;
        self.expect(&TokenKind::CloseParen, ")")?;
        Ok(params)
    }

    fn parse_locals(&mut self) -> Result<Vec<Name>, ParserError> {
        self.expect_keyword(Keyword::Local)?;
        self.expect(&TokenKind::OpenBrace, "{")?;
        let locals = self.parse_max_three()?;
        self.expect(&TokenKind::CloseBrace, "}")?;
        Ok(locals)
    }

    /// `main{var{VARS} ALGO}`
    fn parse_main(&mut self) -> Result<MainProg, ParserError> {
        let pos = self.position();
        self.expect_keyword(Keyword::Main)?;
        let id = self.node_id();
        self.expect(&TokenKind::OpenBrace, "{")?;

        self.expect_keyword(Keyword::Var)?;
        self.expect(&TokenKind::OpenBrace, "{")?;
        let variables = self.parse_variables()?;
        self.expect(&TokenKind::CloseBrace, "}")?;

        let body = self.parse_algo()?;
        self.expect(&TokenKind::CloseBrace, "}")?;

        Ok(MainProg {
            id,
            variables,
            body,
            pos,
        })
    }

    fn at_algo_end(&self) -> bool {
        self.check(&TokenKind::CloseBrace)
            || self.check_keyword(Keyword::Return)
            || self.check_keyword(Keyword::Until)
    }

    /// Semicolon separated instructions. The list may be empty and may end
    /// with a stray `;`.
    pub(crate) fn parse_algo(&mut self) -> Result<Algo, ParserError> {
        let id = self.node_id();
        let pos = self.position();
        let mut instrs = Vec::new();

        while !self.at_algo_end() {
            instrs.push(self.parse_instruction()?);
            if !self.match_token(&TokenKind::Semicolon) {
                break;
            }
        }

        Ok(Algo { id, instrs, pos })
    }

    pub(crate) fn parse_instruction(&mut self) -> Result<Instr, ParserError> {
        let token = self.peek().clone();

        match &token.kind {
            TokenKind::Keyword(Keyword::Halt) => {
                let id = self.node_id();
                self.advance();
                Ok(Instr::new(id, InstrKind::Halt, token.pos))
            }
            TokenKind::Keyword(Keyword::Print) => self.parse_print(),
            TokenKind::Keyword(Keyword::While) => self.parse_while(),
            TokenKind::Keyword(Keyword::Do) => self.parse_do_until(),
            TokenKind::Keyword(Keyword::If) => self.parse_branch(),
            TokenKind::Identifier(_) => match self.peek_ahead(1).map(|t| &t.kind) {
                Some(TokenKind::OpenParen) => {
                    let id = self.node_id();
                    let name = self.expect_identifier()?;
                    let call = self.parse_call(name)?;
                    Ok(Instr::new(id, InstrKind::Call(call), token.pos))
                }
                Some(TokenKind::Assign) => self.parse_assignment(),
                _ => {
                    let next = self.peek_ahead(1).unwrap_or(&token);
                    Err(ParserError::UnexpectedToken(next.kind.to_string(), next.pos))
                }
            },
            other => Err(ParserError::ExpectedInstruction(other.to_string(), token.pos)),
        }
    }

    fn parse_print(&mut self) -> Result<Instr, ParserError> {
        let pos = self.position();
        let id = self.node_id();
        self.advance(); // consume 'print'

        let output = match &self.peek().kind {
            TokenKind::StringLiteral(text) => {
                let text = text.clone();
                self.advance();
                Output::Text(text)
            }
            _ => Output::Atom(self.parse_atom()?),
        };

        Ok(Instr::new(id, InstrKind::Print(output), pos))
    }

    /// `var = name(ATOMS)` or `var = TERM`. Both start with an identifier,
    /// so the callee form is tried first and the cursor rewound if it fails.
    fn parse_assignment(&mut self) -> Result<Instr, ParserError> {
        let pos = self.position();
        let id = self.node_id();

        let target = self.expect_identifier()?;
        let target = VarRef {
            id: self.node_id(),
            name: target.name,
            pos: target.pos,
        };
        self.expect(&TokenKind::Assign, "=")?;

        let checkpoint = self.checkpoint();
        let value = match self.expect_identifier() {
            Ok(callee) if self.check(&TokenKind::OpenParen) => {
                AssignValue::Call(self.parse_call(callee)?)
            }
            _ => {
                self.rewind(checkpoint);
                AssignValue::Term(self.parse_term()?)
            }
        };

        Ok(Instr::new(id, InstrKind::Assign { target, value }, pos))
    }

    /// `while TERM {ALGO}`
    fn parse_while(&mut self) -> Result<Instr, ParserError> {
        let pos = self.position();
        let id = self.node_id();
        self.advance(); // consume 'while'

        let condition = self.parse_term()?;
        let body = self.parse_block()?;

        Ok(Instr::new(
            id,
            InstrKind::Loop {
                kind: LoopKind::While,
                condition,
                body,
            },
            pos,
        ))
    }

    /// `do {ALGO} until TERM`
    fn parse_do_until(&mut self) -> Result<Instr, ParserError> {
        let pos = self.position();
        let id = self.node_id();
        self.advance(); // consume 'do'

        let body = self.parse_block()?;
        self.expect_keyword(Keyword::Until)?;
        let condition = self.parse_term()?;

        Ok(Instr::new(
            id,
            InstrKind::Loop {
                kind: LoopKind::DoUntil,
                condition,
                body,
            },
            pos,
        ))
    }

    /// `if TERM {ALGO} [else {ALGO}]`
    fn parse_branch(&mut self) -> Result<Instr, ParserError> {
        let pos = self.position();
        let id = self.node_id();
        self.advance(); // consume 'if'

        let condition = self.parse_term()?;
        let then_body = self.parse_block()?;

        let else_body = if self.check_keyword(Keyword::Else) {
            self.advance();
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Instr::new(
            id,
            InstrKind::Branch {
                condition,
                then_body,
                else_body,
            },
            pos,
        ))
    }

    /// `{ALGO}`
    fn parse_block(&mut self) -> Result<Algo, ParserError> {
        self.expect(&TokenKind::OpenBrace, "{")?;
        let body = self.parse_algo()?;
        self.expect(&TokenKind::CloseBrace, "}")?;
        Ok(body)
    }
}
