use crate::lexer::Position;
use std::fmt;

/// Identity of an AST node or symbol entry, handed out by the `Context`
pub type NodeId = usize;

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "neg"),
            UnaryOp::Not => write!(f, "not"),
        }
    }
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Comparison
    Eq,
    Greater,

    // Boolean
    Or,
    And,

    // Arithmetic
    Plus,
    Minus,
    Mult,
    Div,
}

impl BinaryOp {
    #[must_use]
    pub fn is_comparison(self) -> bool {
        matches!(self, BinaryOp::Eq | BinaryOp::Greater)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            BinaryOp::Eq => "eq",
            BinaryOp::Greater => ">",
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Plus => "plus",
            BinaryOp::Minus => "minus",
            BinaryOp::Mult => "mult",
            BinaryOp::Div => "div",
        };
        write!(f, "{s}")
    }
}

/// A declared name in a variable, parameter or local list
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub name: String,
    pub pos: Position,
}

impl Name {
    pub fn new(name: impl Into<String>, pos: Position) -> Self {
        Self {
            name: name.into(),
            pos,
        }
    }
}

/// A use of a variable
#[derive(Debug, Clone, PartialEq)]
pub struct VarRef {
    pub id: NodeId,
    pub name: String,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Var(VarRef),
    Number { id: NodeId, value: i64, pos: Position },
}

impl Atom {
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Atom::Var(var) => var.id,
            Atom::Number { id, .. } => *id,
        }
    }

    #[must_use]
    pub fn pos(&self) -> Position {
        match self {
            Atom::Var(var) => var.pos,
            Atom::Number { pos, .. } => *pos,
        }
    }
}

/// Term variants
#[derive(Debug, Clone, PartialEq)]
pub enum TermKind {
    Atom(Atom),
    Unary {
        op: UnaryOp,
        operand: Box<Term>,
    },
    Binary {
        left: Box<Term>,
        op: BinaryOp,
        right: Box<Term>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub id: NodeId,
    pub kind: TermKind,
    pub pos: Position,
}

impl Term {
    pub fn new(id: NodeId, kind: TermKind, pos: Position) -> Self {
        Self { id, kind, pos }
    }
}

/// Invocation of a procedure or function
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub id: NodeId,
    pub name: String,
    pub args: Vec<Atom>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Atom(Atom),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AssignValue {
    Term(Term),
    Call(Call),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    While,
    DoUntil,
}

/// Instruction variants
#[derive(Debug, Clone, PartialEq)]
pub enum InstrKind {
    Halt,
    Print(Output),
    Call(Call),
    Assign {
        target: VarRef,
        value: AssignValue,
    },
    Loop {
        kind: LoopKind,
        condition: Term,
        body: Algo,
    },
    Branch {
        condition: Term,
        then_body: Algo,
        else_body: Option<Algo>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Instr {
    pub id: NodeId,
    pub kind: InstrKind,
    pub pos: Position,
}

impl Instr {
    pub fn new(id: NodeId, kind: InstrKind, pos: Position) -> Self {
        Self { id, kind, pos }
    }
}

/// A semicolon separated instruction sequence
#[derive(Debug, Clone, PartialEq)]
pub struct Algo {
    pub id: NodeId,
    pub instrs: Vec<Instr>,
    pub pos: Position,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcDef {
    pub id: NodeId,
    pub name: Name,
    pub params: Vec<Name>,
    pub locals: Vec<Name>,
    pub body: Algo,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FuncDef {
    pub id: NodeId,
    pub name: Name,
    pub params: Vec<Name>,
    pub locals: Vec<Name>,
    pub body: Algo,
    pub ret: Option<Atom>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MainProg {
    pub id: NodeId,
    pub variables: Vec<Name>,
    pub body: Algo,
    pub pos: Position,
}

/// Complete program AST
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub id: NodeId,
    pub globals: Vec<Name>,
    pub procedures: Vec<ProcDef>,
    pub functions: Vec<FuncDef>,
    pub main: MainProg,
}
