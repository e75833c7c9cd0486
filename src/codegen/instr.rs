use std::fmt;
use std::str::FromStr;

use crate::codegen::LineParseError;
use crate::parser::BinaryOp;

/// A value an instruction reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Var(String),
    Num(i64),
}

impl Operand {
    pub fn var(name: impl Into<String>) -> Self {
        Operand::Var(name.into())
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Operand::Var(name) => write!(f, "{name}"),
            Operand::Num(value) => write!(f, "{value}"),
        }
    }
}

impl FromStr for Operand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(value) = s.parse::<i64>() {
            return Ok(Operand::Num(value));
        }
        let valid = !s.is_empty()
            && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            && !s.starts_with(|c: char| c.is_ascii_digit());
        if valid {
            Ok(Operand::Var(s.to_string()))
        } else {
            Err(format!("'{s}' is not a variable or number"))
        }
    }
}

/// Intermediate-code operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Gt,
    And,
    Or,
}

impl From<BinaryOp> for Operator {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Plus => Operator::Add,
            BinaryOp::Minus => Operator::Sub,
            BinaryOp::Mult => Operator::Mul,
            BinaryOp::Div => Operator::Div,
            BinaryOp::Eq => Operator::Eq,
            BinaryOp::Greater => Operator::Gt,
            BinaryOp::And => Operator::And,
            BinaryOp::Or => Operator::Or,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Div => "/",
            Operator::Eq => "=",
            Operator::Gt => ">",
            Operator::And => "AND",
            Operator::Or => "OR",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "+" => Ok(Operator::Add),
            "-" => Ok(Operator::Sub),
            "*" => Ok(Operator::Mul),
            "/" => Ok(Operator::Div),
            "=" => Ok(Operator::Eq),
            ">" => Ok(Operator::Gt),
            "AND" => Ok(Operator::And),
            "OR" => Ok(Operator::Or),
            other => Err(format!("unknown operator '{other}'")),
        }
    }
}

/// Right-hand side of an assignment, also used as an `IF` condition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rvalue {
    Operand(Operand),
    Binary(Operand, Operator, Operand),
}

impl fmt::Display for Rvalue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Rvalue::Operand(operand) => write!(f, "{operand}"),
            Rvalue::Binary(left, op, right) => write!(f, "{left} {op} {right}"),
        }
    }
}

impl FromStr for Rvalue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [operand] => Ok(Rvalue::Operand(operand.parse()?)),
            [left, op, right] => Ok(Rvalue::Binary(left.parse()?, op.parse()?, right.parse()?)),
            _ => Err(format!("'{s}' is not a value or a binary operation")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintValue {
    Operand(Operand),
    Text(String),
}

impl fmt::Display for PrintValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrintValue::Operand(operand) => write!(f, "{operand}"),
            PrintValue::Text(text) => write!(f, "\"{text}\""),
        }
    }
}

/// One executable instruction. `T` is the jump target: a label name before
/// resolution, a line number after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction<T> {
    Stop,
    Print(PrintValue),
    Assign { target: String, value: Rvalue },
    Goto(T),
    Gosub(T),
    Return,
    If { condition: Rvalue, target: T },
}

pub type SymbolicInstruction = Instruction<String>;
pub type ResolvedInstruction = Instruction<usize>;

impl<T> Instruction<T> {
    /// The jump or call target, if this instruction transfers control
    pub fn target(&self) -> Option<&T> {
        match self {
            Instruction::Goto(target)
            | Instruction::Gosub(target)
            | Instruction::If { target, .. } => Some(target),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_jump(&self) -> bool {
        self.target().is_some()
    }

    /// Rewrite the target, leaving every other instruction untouched
    /// # Errors
    /// Whatever `f` fails with
    pub fn try_map_target<U, E>(
        self,
        mut f: impl FnMut(T) -> Result<U, E>,
    ) -> Result<Instruction<U>, E> {
        Ok(match self {
            Instruction::Stop => Instruction::Stop,
            Instruction::Print(value) => Instruction::Print(value),
            Instruction::Assign { target, value } => Instruction::Assign { target, value },
            Instruction::Goto(target) => Instruction::Goto(f(target)?),
            Instruction::Gosub(target) => Instruction::Gosub(f(target)?),
            Instruction::Return => Instruction::Return,
            Instruction::If { condition, target } => Instruction::If {
                condition,
                target: f(target)?,
            },
        })
    }

    pub fn map_target<U>(self, mut f: impl FnMut(T) -> U) -> Instruction<U> {
        match self.try_map_target(|target| Ok::<U, std::convert::Infallible>(f(target))) {
            Ok(instruction) => instruction,
            Err(never) => match never {},
        }
    }
}

impl<T: fmt::Display> fmt::Display for Instruction<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instruction::Stop => write!(f, "STOP"),
            Instruction::Print(value) => write!(f, "PRINT {value}"),
            Instruction::Assign { target, value } => write!(f, "{target} = {value}"),
            Instruction::Goto(target) => write!(f, "GOTO {target}"),
            Instruction::Gosub(target) => write!(f, "GOSUB {target}"),
            Instruction::Return => write!(f, "RETURN"),
            Instruction::If { condition, target } => write!(f, "IF {condition} THEN {target}"),
        }
    }
}

/// A line of symbolic code: a label declaration or an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Label(String),
    Instr(SymbolicInstruction),
}

impl Line {
    #[must_use]
    pub fn is_label(&self) -> bool {
        matches!(self, Line::Label(_))
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Line::Label(name) => write!(f, "{name}:"),
            Line::Instr(instr) => write!(f, "{instr}"),
        }
    }
}

fn parse_label_name(s: &str) -> Result<String, String> {
    let valid = !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(s.to_string())
    } else {
        Err(format!("'{s}' is not a label name"))
    }
}

impl FromStr for Line {
    type Err = LineParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let fail = |reason: String| LineParseError::new(text, reason);

        if let Some(label) = text.strip_suffix(':') {
            return parse_label_name(label).map(Line::Label).map_err(fail);
        }

        let instr = match text {
            "STOP" => Instruction::Stop,
            "RETURN" => Instruction::Return,
            _ => {
                if let Some(target) = text.strip_prefix("GOTO ") {
                    Instruction::Goto(parse_label_name(target.trim()).map_err(fail)?)
                } else if let Some(target) = text.strip_prefix("GOSUB ") {
                    Instruction::Gosub(parse_label_name(target.trim()).map_err(fail)?)
                } else if let Some(rest) = text.strip_prefix("IF ") {
                    let (condition, target) = rest
                        .rsplit_once(" THEN ")
                        .ok_or_else(|| fail("IF without THEN".to_string()))?;
                    Instruction::If {
                        condition: condition.parse().map_err(fail)?,
                        target: parse_label_name(target.trim()).map_err(fail)?,
                    }
                } else if let Some(value) = text.strip_prefix("PRINT ") {
                    let value = value.trim();
                    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
                        Some(text) => Instruction::Print(PrintValue::Text(text.to_string())),
                        None => Instruction::Print(PrintValue::Operand(value.parse().map_err(fail)?)),
                    }
                } else if let Some((target, value)) = text.split_once(" = ") {
                    let target = match target.trim().parse::<Operand>().map_err(fail)? {
                        Operand::Var(name) => name,
                        Operand::Num(_) => return Err(fail("cannot assign to a number".to_string())),
                    };
                    Instruction::Assign {
                        target,
                        value: value.parse().map_err(fail)?,
                    }
                } else {
                    return Err(fail("unknown instruction".to_string()));
                }
            }
        };

        Ok(Line::Instr(instr))
    }
}
