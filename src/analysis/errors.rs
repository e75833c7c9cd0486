use thiserror::Error;

use crate::lexer::Position;
use crate::parser::{BinaryOp, UnaryOp};
use crate::symbol::VarType;

/// Violations of the name/scope rules
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NameRuleViolation {
    #[error("double-declaration: duplicate global variable '{0}' at {1}")]
    DuplicateGlobal(String, Position),

    #[error("double-declaration: duplicate procedure '{0}' at {1}")]
    DuplicateProcedure(String, Position),

    #[error("double-declaration: duplicate function '{0}' at {1}")]
    DuplicateFunction(String, Position),

    #[error("variable name '{0}' conflicts with procedure name at {1}")]
    VariableProcedureClash(String, Position),

    #[error("variable name '{0}' conflicts with function name at {1}")]
    VariableFunctionClash(String, Position),

    #[error("function name '{0}' conflicts with procedure name at {1}")]
    ProcedureFunctionClash(String, Position),

    #[error("double-declaration: duplicate parameter '{0}' in {1} at {2}")]
    DuplicateParameter(String, String, Position),

    #[error("double-declaration: duplicate local variable '{0}' in {1} at {2}")]
    DuplicateLocal(String, String, Position),

    #[error("shadowing: local variable '{0}' shadows a parameter in {1} at {2}")]
    Shadowing(String, String, Position),

    #[error("double-declaration: duplicate variable '{0}' in main at {1}")]
    DuplicateMainVariable(String, Position),
}

/// References that resolve to no reachable declaration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UndeclaredReference {
    #[error("undeclared variable '{0}' in {1} at {2}")]
    Variable(String, String, Position),

    #[error("undeclared procedure or function '{0}' at {1}")]
    Subroutine(String, Position),
}

/// Type analysis failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("{0} declares {1} parameters (max 3) at {2}")]
    TooManyParameters(String, usize, Position),

    #[error("{0} declares {1} local variables (max 3) at {2}")]
    TooManyLocals(String, usize, Position),

    #[error("call to '{0}' passes {1} arguments (max 3) at {2}")]
    TooManyArguments(String, usize, Position),

    #[error("'{0}' expects {1} arguments but got {2} at {3}")]
    ArityMismatch(String, usize, usize, Position),

    #[error("argument {1} of call to '{0}' is not numeric at {2}")]
    ArgumentNotNumeric(String, usize, Position),

    #[error("procedure '{0}' produces no value to assign at {1}")]
    ProcedureHasNoValue(String, Position),

    #[error("assignment to '{0}': term is {1}, expected numeric at {2}")]
    AssignNotNumeric(String, VarType, Position),

    #[error("printed atom is not numeric at {0}")]
    PrintNotNumeric(Position),

    #[error("loop condition must be boolean, got {0} at {1}")]
    LoopCondition(VarType, Position),

    #[error("branch condition must be boolean or numeric, got {0} at {1}")]
    BranchCondition(VarType, Position),

    #[error("return value of function '{0}' is not numeric at {1}")]
    ReturnNotNumeric(String, Position),

    #[error("function '{0}' is missing its return statement at {1}")]
    MissingReturn(String, Position),

    #[error("operator '{0}' cannot be applied to {1} at {2}")]
    UnaryOperand(UnaryOp, VarType, Position),

    #[error("operator '{0}' cannot be applied to {1} and {2} at {3}")]
    BinaryOperands(BinaryOp, VarType, VarType, Position),
}

/// Accumulated analysis errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SemanticError {
    #[error("NAME-RULE-VIOLATION: {0}")]
    NameRule(#[from] NameRuleViolation),

    #[error("UNDECLARED: {0}")]
    Undeclared(#[from] UndeclaredReference),

    #[error("TYPE-ERROR: {0}")]
    Type(#[from] TypeError),
}

/// Non-fatal findings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Warning {
    #[error("main variable '{0}' hides the global variable of the same name at {1}")]
    MainHidesGlobal(String, Position),
}
