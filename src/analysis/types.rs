use crate::analysis::TypeError;
use crate::parser::{
    Algo, AssignValue, Atom, BinaryOp, Call, InstrKind, Name, Output, Program, Term, TermKind,
    UnaryOp, MAX_THREE,
};
use crate::symbol::{Context, SubroutineKind, VarType};

/// Operator class used to pick the typing rule of a binary term
fn operator_class(op: BinaryOp) -> VarType {
    match op {
        BinaryOp::Eq | BinaryOp::Greater => VarType::Comparison,
        BinaryOp::Or | BinaryOp::And => VarType::Boolean,
        BinaryOp::Plus | BinaryOp::Minus | BinaryOp::Mult | BinaryOp::Div => VarType::Numeric,
    }
}

/// Attribute-grammar type checker. Every failure is recorded and checking
/// continues, so one run reports all type errors of a program.
pub struct TypeAnalyzer<'a> {
    ctx: &'a mut Context,
    errors: usize,
}

impl<'a> TypeAnalyzer<'a> {
    pub fn new(ctx: &'a mut Context) -> Self {
        Self { ctx, errors: 0 }
    }

    /// Returns whether the program is well typed
    #[tracing::instrument(skip_all)]
    pub fn analyze(&mut self, program: &Program) -> bool {
        self.mark_variables_numeric();

        for proc in &program.procedures {
            self.check_declarations(&proc.name, &proc.params, &proc.locals);
            self.check_algo(&proc.body);
        }

        for func in &program.functions {
            self.check_declarations(&func.name, &func.params, &func.locals);
            self.check_algo(&func.body);
            match &func.ret {
                Some(atom) => {
                    if self.type_atom(atom) != VarType::Numeric {
                        self.error(TypeError::ReturnNotNumeric(func.name.name.clone(), atom.pos()));
                    }
                }
                None => self.error(TypeError::MissingReturn(
                    func.name.name.clone(),
                    func.name.pos,
                )),
            }
        }

        self.check_algo(&program.main.body);

        tracing::debug!(errors = self.errors, "type analysis finished");
        self.errors == 0
    }

    fn error(&mut self, error: TypeError) {
        self.errors += 1;
        self.ctx.add_error(error);
    }

    /// Every variable in SPL holds a number
    fn mark_variables_numeric(&mut self) {
        let ids: Vec<_> = self.ctx.symbols().iter().map(|s| s.id).collect();
        for id in ids {
            self.ctx.symbols_mut().set_type(id, VarType::Numeric);
        }
    }

    fn check_declarations(&mut self, name: &Name, params: &[Name], locals: &[Name]) {
        if params.len() > MAX_THREE {
            self.error(TypeError::TooManyParameters(
                name.name.clone(),
                params.len(),
                name.pos,
            ));
        }
        if locals.len() > MAX_THREE {
            self.error(TypeError::TooManyLocals(name.name.clone(), locals.len(), name.pos));
        }
    }

    fn check_algo(&mut self, algo: &Algo) {
        for instr in &algo.instrs {
            match &instr.kind {
                InstrKind::Halt | InstrKind::Print(Output::Text(_)) => {}
                InstrKind::Print(Output::Atom(atom)) => {
                    if self.type_atom(atom) != VarType::Numeric {
                        self.error(TypeError::PrintNotNumeric(atom.pos()));
                    }
                }
                InstrKind::Call(call) => {
                    self.check_call(call);
                }
                InstrKind::Assign { target, value } => match value {
                    AssignValue::Term(term) => {
                        if let Some(ty) = self.type_term(term) {
                            if ty != VarType::Numeric {
                                self.error(TypeError::AssignNotNumeric(
                                    target.name.clone(),
                                    ty,
                                    term.pos,
                                ));
                            }
                        }
                    }
                    AssignValue::Call(call) => {
                        if self.check_call(call) == Some(SubroutineKind::Procedure) {
                            self.error(TypeError::ProcedureHasNoValue(call.name.clone(), call.pos));
                        }
                    }
                },
                InstrKind::Loop { condition, body, .. } => {
                    if let Some(ty) = self.type_term(condition) {
                        if ty != VarType::Boolean {
                            self.error(TypeError::LoopCondition(ty, condition.pos));
                        }
                    }
                    self.check_algo(body);
                }
                InstrKind::Branch {
                    condition,
                    then_body,
                    else_body,
                } => {
                    if let Some(ty) = self.type_term(condition) {
                        if !matches!(ty, VarType::Boolean | VarType::Numeric) {
                            self.error(TypeError::BranchCondition(ty, condition.pos));
                        }
                    }
                    self.check_algo(then_body);
                    if let Some(else_body) = else_body {
                        self.check_algo(else_body);
                    }
                }
            }
        }
    }

    /// Check arguments against the callee. Returns the callee kind when known.
    fn check_call(&mut self, call: &Call) -> Option<SubroutineKind> {
        if call.args.len() > MAX_THREE {
            self.error(TypeError::TooManyArguments(
                call.name.clone(),
                call.args.len(),
                call.pos,
            ));
        }

        for (index, arg) in call.args.iter().enumerate() {
            if self.type_atom(arg) != VarType::Numeric {
                self.error(TypeError::ArgumentNotNumeric(call.name.clone(), index + 1, arg.pos()));
            }
        }

        // Unknown callees were already reported as undeclared
        let (kind, arity) = {
            let sub = self.ctx.symbols().subroutine(&call.name)?;
            (sub.kind, sub.arity)
        };
        if arity != call.args.len() {
            self.error(TypeError::ArityMismatch(
                call.name.clone(),
                arity,
                call.args.len(),
                call.pos,
            ));
        }
        Some(kind)
    }

    fn type_atom(&self, atom: &Atom) -> VarType {
        match atom {
            Atom::Number { .. } => VarType::Numeric,
            Atom::Var(var) => self
                .ctx
                .resolution(var.id)
                .map_or(VarType::Numeric, |symbol| symbol.var_type),
        }
    }

    /// Type of a term, or `None` once an error inside it has been recorded
    fn type_term(&mut self, term: &Term) -> Option<VarType> {
        match &term.kind {
            TermKind::Atom(atom) => Some(self.type_atom(atom)),
            TermKind::Unary { op, operand } => {
                let operand_ty = self.type_term(operand)?;
                let ok = match op {
                    UnaryOp::Neg => operand_ty == VarType::Numeric,
                    UnaryOp::Not => matches!(operand_ty, VarType::Boolean | VarType::Numeric),
                };
                if !ok {
                    self.error(TypeError::UnaryOperand(*op, operand_ty, term.pos));
                    return None;
                }
                Some(match op {
                    UnaryOp::Neg => VarType::Numeric,
                    UnaryOp::Not => VarType::Boolean,
                })
            }
            TermKind::Binary { left, op, right } => {
                let left_ty = self.type_term(left);
                let right_ty = self.type_term(right);
                let (left_ty, right_ty) = (left_ty?, right_ty?);

                let (operand, result) = match operator_class(*op) {
                    VarType::Boolean => (VarType::Boolean, VarType::Boolean),
                    VarType::Comparison => (VarType::Numeric, VarType::Boolean),
                    _ => (VarType::Numeric, VarType::Numeric),
                };
                if left_ty != operand || right_ty != operand {
                    self.error(TypeError::BinaryOperands(*op, left_ty, right_ty, term.pos));
                    return None;
                }
                Some(result)
            }
        }
    }
}

/// Run type analysis, returning whether the program is well typed
pub fn analyze_types(program: &Program, ctx: &mut Context) -> bool {
    TypeAnalyzer::new(ctx).analyze(program)
}
