//! Compilation driver: runs every phase in order and stops at the first
//! phase that leaves errors behind.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use thiserror::Error;

use crate::analysis::{analyze_scopes, analyze_types, SemanticError, Warning};
use crate::codegen::{generate, CodegenError, Line, ResolvedInstruction};
use crate::lexer::{LexerError, Scanner, DEFAULT_MAX_STRING_LEN};
use crate::parser::{parse, ParserError, Program};
use crate::resolver::{resolve, ResolveError};
use crate::symbol::Context;

/// How listing lines are numbered. Jump targets use the same numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Numbering {
    /// 1, 2, 3, ...
    #[default]
    Unit,
    /// 10, 20, 30, ...
    Tens,
}

impl Numbering {
    #[must_use]
    pub fn number(self, index: usize) -> usize {
        match self {
            Numbering::Unit => index,
            Numbering::Tens => index * 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompileOptions {
    pub numbering: Numbering,
    pub max_string_len: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            numbering: Numbering::Unit,
            max_string_len: DEFAULT_MAX_STRING_LEN,
        }
    }
}

/// Any reason a compilation stopped
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileFailure {
    #[error("Lexer error: {0}")]
    Lex(#[from] LexerError),

    #[error("Syntax error: {0}")]
    Syntax(#[from] ParserError),

    #[error("Semantic analysis failed with {} error(s)", .errors.len())]
    Semantic {
        errors: Vec<SemanticError>,
        warnings: Vec<Warning>,
    },

    #[error("Code generation error: {0}")]
    Codegen(#[from] CodegenError),

    #[error("Label resolution error: {0}")]
    Resolve(#[from] ResolveError),
}

impl CompileFailure {
    /// Human readable report: warnings first, then errors
    #[must_use]
    pub fn report(&self) -> String {
        let mut out = String::new();
        match self {
            CompileFailure::Semantic { errors, warnings } => {
                for warning in warnings {
                    let _ = writeln!(out, "warning: {warning}");
                }
                for error in errors {
                    let _ = writeln!(out, "error: {error}");
                }
            }
            other => {
                let _ = writeln!(out, "error: {other}");
            }
        }
        out
    }
}

/// Result of a successful compilation
#[derive(Debug, Clone, PartialEq)]
pub struct Compilation {
    pub symbolic: Vec<Line>,
    pub instructions: Vec<ResolvedInstruction>,
    pub labels: BTreeMap<String, usize>,
    pub warnings: Vec<Warning>,
}

impl Compilation {
    /// The symbolic code, one label or instruction per line
    #[must_use]
    pub fn symbolic_listing(&self) -> String {
        self.symbolic.iter().fold(String::new(), |mut out, line| {
            let _ = writeln!(out, "{line}");
            out
        })
    }

    /// Numbered listing of the resolved instructions
    #[must_use]
    pub fn listing(&self, numbering: Numbering) -> String {
        let mut out = String::new();
        for (index, instr) in self.instructions.iter().enumerate() {
            let instr = instr.clone().map_target(|target| numbering.number(target));
            let _ = writeln!(out, "{} {instr}", numbering.number(index + 1));
        }
        out
    }

    /// Write the numbered listing to `path`
    /// # Errors
    /// If the file cannot be written
    pub fn write_listing(&self, path: impl AsRef<Path>, numbering: Numbering) -> std::io::Result<()> {
        std::fs::write(path, self.listing(numbering))
    }
}

/// Compile SPL source text
/// # Errors
/// On the first phase that fails
#[tracing::instrument(skip_all)]
pub fn compile(source: &str, options: &CompileOptions) -> Result<Compilation, CompileFailure> {
    let tokens = Scanner::new(source)
        .with_max_string_len(options.max_string_len)
        .scan_all()?;

    let mut ctx = Context::new();
    let program = parse(tokens, &mut ctx)?;

    continue_compilation(&program, &mut ctx)
}

fn semantic_failure(ctx: &Context) -> CompileFailure {
    CompileFailure::Semantic {
        errors: ctx.errors().to_vec(),
        warnings: ctx.warnings().to_vec(),
    }
}

/// Run analysis, generation and resolution on an already parsed program.
/// Any frontend that builds a `Program` with ids from `ctx` may call this.
/// # Errors
/// On the first phase that fails
#[tracing::instrument(skip_all)]
pub fn continue_compilation(program: &Program, ctx: &mut Context) -> Result<Compilation, CompileFailure> {
    analyze_scopes(program, ctx);
    if ctx.has_errors() {
        tracing::warn!(errors = ctx.errors().len(), "scope analysis failed");
        return Err(semantic_failure(ctx));
    }

    let well_typed = analyze_types(program, ctx);
    if !well_typed || ctx.has_errors() {
        tracing::warn!(errors = ctx.errors().len(), "type analysis failed");
        return Err(semantic_failure(ctx));
    }

    let symbolic = generate(program, ctx)?;
    let resolution = resolve(&symbolic)?;

    Ok(Compilation {
        symbolic,
        instructions: resolution.instructions,
        labels: resolution.labels,
        warnings: ctx.warnings().to_vec(),
    })
}
