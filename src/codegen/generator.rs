use crate::codegen::{
    CodegenError, Instruction, Line, Operand, Operator, PrintValue, Rvalue, SymbolicInstruction,
};
use crate::parser::{
    Algo, AssignValue, Atom, Call, InstrKind, LoopKind, Name, Output, Program, Term, TermKind,
    UnaryOp, VarRef,
};
use crate::symbol::{Context, SubroutineKind};

/// Label placed in front of main when subroutines precede it
pub const MAIN_LABEL: &str = "_MAIN";

#[must_use]
pub fn subroutine_label(name: &str) -> String {
    format!("_SUB_{name}")
}

/// Variable a caller fills with the `index`th (1-based) argument.
/// Generated names start with `_`; renamed locals start with their owner's
/// name, which is always a letter.
#[must_use]
pub fn argument_name(callee: &str, index: usize) -> String {
    format!("_arg_{callee}_{index}")
}

/// Variable a function leaves its result in
#[must_use]
pub fn return_name(callee: &str) -> String {
    format!("_ret_{callee}")
}

/// Emits one flat symbolic instruction stream for a well-typed program.
/// Subroutines come first and are entered with `GOSUB`.
pub struct CodeGenerator<'a> {
    ctx: &'a mut Context,
    code: Vec<Line>,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(ctx: &'a mut Context) -> Self {
        Self {
            ctx,
            code: Vec::new(),
        }
    }

    /// Generate symbolic code for a program
    /// # Errors
    /// If a variable or callee was never resolved by the analysis phases
    #[tracing::instrument(skip_all)]
    pub fn generate(mut self, program: &Program) -> Result<Vec<Line>, CodegenError> {
        let has_subroutines = !program.procedures.is_empty() || !program.functions.is_empty();
        if has_subroutines {
            self.emit(Instruction::Goto(MAIN_LABEL.to_string()));
        }

        for proc in &program.procedures {
            self.generate_subroutine(&proc.name, &proc.params, &proc.body)?;
            self.emit(Instruction::Return);
        }

        for func in &program.functions {
            self.generate_subroutine(&func.name, &func.params, &func.body)?;
            let value = match &func.ret {
                Some(atom) => self.operand(atom)?,
                None => Operand::Num(0),
            };
            self.emit(Instruction::Assign {
                target: return_name(&func.name.name),
                value: Rvalue::Operand(value),
            });
            self.emit(Instruction::Return);
        }

        if has_subroutines {
            self.label(MAIN_LABEL.to_string());
        }
        self.generate_algo(&program.main.body)?;

        if !matches!(self.code.last(), Some(Line::Instr(_))) {
            self.emit(Instruction::Stop);
        }

        tracing::debug!(lines = self.code.len(), "generated symbolic code");
        Ok(self.code)
    }

    fn emit(&mut self, instr: SymbolicInstruction) {
        tracing::trace!(%instr, "emit");
        self.code.push(Line::Instr(instr));
    }

    fn label(&mut self, name: String) {
        tracing::trace!(%name, "label");
        self.code.push(Line::Label(name));
    }

    /// Entry label, then parameters copied out of the argument variables
    fn generate_subroutine(
        &mut self,
        name: &Name,
        params: &[Name],
        body: &Algo,
    ) -> Result<(), CodegenError> {
        self.label(subroutine_label(&name.name));

        for (index, param) in params.iter().enumerate() {
            self.emit(Instruction::Assign {
                target: format!("{}_{}", name.name, param.name),
                value: Rvalue::Operand(Operand::var(argument_name(&name.name, index + 1))),
            });
        }

        self.generate_algo(body)
    }

    fn generate_algo(&mut self, algo: &Algo) -> Result<(), CodegenError> {
        for instr in &algo.instrs {
            match &instr.kind {
                InstrKind::Halt => self.emit(Instruction::Stop),
                InstrKind::Print(Output::Text(text)) => {
                    self.emit(Instruction::Print(PrintValue::Text(text.clone())));
                }
                InstrKind::Print(Output::Atom(atom)) => {
                    let value = self.operand(atom)?;
                    self.emit(Instruction::Print(PrintValue::Operand(value)));
                }
                InstrKind::Call(call) => {
                    self.generate_call(call)?;
                }
                InstrKind::Assign { target, value } => {
                    let target = self.variable_name(target)?;
                    let value = match value {
                        AssignValue::Term(term) => self.flatten(term)?,
                        AssignValue::Call(call) => {
                            if self.generate_call(call)? == SubroutineKind::Procedure {
                                return Err(CodegenError::ProcedureValue(
                                    call.name.clone(),
                                    call.pos,
                                ));
                            }
                            Operand::var(return_name(&call.name))
                        }
                    };
                    self.emit(Instruction::Assign {
                        target,
                        value: Rvalue::Operand(value),
                    });
                }
                InstrKind::Loop {
                    kind: LoopKind::While,
                    condition,
                    body,
                } => {
                    let start = self.ctx.new_label();
                    let enter = self.ctx.new_label();
                    let exit = self.ctx.new_label();

                    self.label(start.clone());
                    let condition = self.condition(condition)?;
                    self.emit(Instruction::If {
                        condition,
                        target: enter.clone(),
                    });
                    self.emit(Instruction::Goto(exit.clone()));
                    self.label(enter);
                    self.generate_algo(body)?;
                    self.emit(Instruction::Goto(start));
                    self.label(exit);
                }
                InstrKind::Loop {
                    kind: LoopKind::DoUntil,
                    condition,
                    body,
                } => {
                    let start = self.ctx.new_label();
                    let exit = self.ctx.new_label();

                    self.label(start.clone());
                    self.generate_algo(body)?;
                    let condition = self.condition(condition)?;
                    self.emit(Instruction::If {
                        condition,
                        target: exit.clone(),
                    });
                    self.emit(Instruction::Goto(start));
                    self.label(exit);
                }
                InstrKind::Branch {
                    condition,
                    then_body,
                    else_body,
                } => {
                    let then_label = self.ctx.new_label();
                    let exit = self.ctx.new_label();

                    let condition = self.condition(condition)?;
                    self.emit(Instruction::If {
                        condition,
                        target: then_label.clone(),
                    });
                    if let Some(else_body) = else_body {
                        self.generate_algo(else_body)?;
                    }
                    self.emit(Instruction::Goto(exit.clone()));
                    self.label(then_label);
                    self.generate_algo(then_body)?;
                    self.label(exit);
                }
            }
        }
        Ok(())
    }

    /// Copy arguments into the callee's argument variables and jump to it
    fn generate_call(&mut self, call: &Call) -> Result<SubroutineKind, CodegenError> {
        let kind = self
            .ctx
            .symbols()
            .subroutine(&call.name)
            .map(|sub| sub.kind)
            .ok_or_else(|| CodegenError::UnknownSubroutine(call.name.clone(), call.pos))?;

        for (index, arg) in call.args.iter().enumerate() {
            let value = self.operand(arg)?;
            self.emit(Instruction::Assign {
                target: argument_name(&call.name, index + 1),
                value: Rvalue::Operand(value),
            });
        }
        self.emit(Instruction::Gosub(subroutine_label(&call.name)));
        Ok(kind)
    }

    /// Comparisons become the `IF` condition itself; anything else is
    /// evaluated to an operand first.
    fn condition(&mut self, term: &Term) -> Result<Rvalue, CodegenError> {
        if let TermKind::Binary { left, op, right } = &term.kind {
            if op.is_comparison() {
                let left = self.flatten(left)?;
                let right = self.flatten(right)?;
                return Ok(Rvalue::Binary(left, Operator::from(*op), right));
            }
        }
        Ok(Rvalue::Operand(self.flatten(term)?))
    }

    /// Reduce a term to an operand, emitting one temporary per operator
    fn flatten(&mut self, term: &Term) -> Result<Operand, CodegenError> {
        let value = match &term.kind {
            TermKind::Atom(atom) => return self.operand(atom),
            TermKind::Unary { op, operand } => {
                let operand = self.flatten(operand)?;
                match op {
                    UnaryOp::Neg => Rvalue::Binary(Operand::Num(0), Operator::Sub, operand),
                    UnaryOp::Not => Rvalue::Binary(operand, Operator::Eq, Operand::Num(0)),
                }
            }
            TermKind::Binary { left, op, right } => {
                let left = self.flatten(left)?;
                let right = self.flatten(right)?;
                Rvalue::Binary(left, Operator::from(*op), right)
            }
        };

        let temp = self.ctx.new_temp();
        self.emit(Instruction::Assign {
            target: temp.clone(),
            value,
        });
        Ok(Operand::Var(temp))
    }

    fn operand(&self, atom: &Atom) -> Result<Operand, CodegenError> {
        match atom {
            Atom::Number { value, .. } => Ok(Operand::Num(*value)),
            Atom::Var(var) => Ok(Operand::Var(self.variable_name(var)?)),
        }
    }

    /// Parameters and locals are prefixed with their owner's name; globals
    /// and main variables keep the source name.
    fn variable_name(&self, var: &VarRef) -> Result<String, CodegenError> {
        let symbol = self
            .ctx
            .resolution(var.id)
            .ok_or_else(|| CodegenError::UnresolvedVariable(var.name.clone(), var.pos))?;

        Ok(match symbol.owner() {
            Some(owner) => format!("{}_{}", owner.name(), symbol.name),
            None => symbol.name.clone(),
        })
    }
}

/// Generate symbolic code for a program that passed analysis
/// # Errors
/// If a variable or callee was never resolved
pub fn generate(program: &Program, ctx: &mut Context) -> Result<Vec<Line>, CodegenError> {
    CodeGenerator::new(ctx).generate(program)
}
