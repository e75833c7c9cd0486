use std::collections::HashSet;

use crate::analysis::{NameRuleViolation, UndeclaredReference, Warning};
use crate::parser::{
    Algo, AssignValue, Atom, Call, InstrKind, Name, Output, Program, Term, TermKind, VarRef,
};
use crate::symbol::{
    Context, LocalRole, Lookup, Owner, ScopeKind, Subroutine, SubroutineKind, SymbolScope,
    VarType,
};

/// Populates the symbol table and enforces the naming rules. Violations are
/// accumulated in the `Context`; nothing here aborts early.
pub struct ScopeAnalyzer<'a> {
    ctx: &'a mut Context,
}

impl<'a> ScopeAnalyzer<'a> {
    pub fn new(ctx: &'a mut Context) -> Self {
        Self { ctx }
    }

    #[tracing::instrument(skip_all)]
    pub fn analyze(&mut self, program: &Program) {
        let errors_before = self.ctx.errors().len();

        self.ctx.push_scope(ScopeKind::Everywhere, None);
        self.collect_everywhere(program);

        for proc in &program.procedures {
            let owner = Owner::Procedure(proc.name.name.clone());
            self.analyze_subroutine(&owner, &proc.params, &proc.locals, &proc.body, None);
        }
        for func in &program.functions {
            let owner = Owner::Function(func.name.name.clone());
            self.analyze_subroutine(&owner, &func.params, &func.locals, &func.body, func.ret.as_ref());
        }

        self.analyze_main(program);
        self.ctx.pop_scope();

        tracing::debug!(
            symbols = self.ctx.symbols().len(),
            errors = self.ctx.errors().len() - errors_before,
            "scope analysis finished"
        );
    }

    /// Global variable, procedure and function names share one namespace
    fn collect_everywhere(&mut self, program: &Program) {
        let mut globals = HashSet::new();
        for global in &program.globals {
            if globals.insert(global.name.as_str()) {
                self.ctx.declare(&global.name, SymbolScope::Global, global.pos);
            } else {
                self.ctx.add_error(NameRuleViolation::DuplicateGlobal(
                    global.name.clone(),
                    global.pos,
                ));
            }
        }

        let mut procedures = HashSet::new();
        for proc in &program.procedures {
            let name = &proc.name;
            if !procedures.insert(name.name.as_str()) {
                self.ctx.add_error(NameRuleViolation::DuplicateProcedure(name.name.clone(), name.pos));
                continue;
            }
            self.ctx.symbols_mut().add_subroutine(Subroutine {
                id: proc.id,
                name: name.name.clone(),
                kind: SubroutineKind::Procedure,
                var_type: VarType::Typeless,
                arity: proc.params.len(),
                pos: name.pos,
            });
        }

        let mut functions = HashSet::new();
        for func in &program.functions {
            let name = &func.name;
            if !functions.insert(name.name.as_str()) {
                self.ctx.add_error(NameRuleViolation::DuplicateFunction(name.name.clone(), name.pos));
                continue;
            }
            if procedures.contains(name.name.as_str()) {
                self.ctx.add_error(NameRuleViolation::ProcedureFunctionClash(
                    name.name.clone(),
                    name.pos,
                ));
                continue;
            }
            self.ctx.symbols_mut().add_subroutine(Subroutine {
                id: func.id,
                name: name.name.clone(),
                kind: SubroutineKind::Function,
                var_type: VarType::Typeless,
                arity: func.params.len(),
                pos: name.pos,
            });
        }

        for global in &program.globals {
            if procedures.contains(global.name.as_str()) {
                self.ctx.add_error(NameRuleViolation::VariableProcedureClash(
                    global.name.clone(),
                    global.pos,
                ));
            }
            if functions.contains(global.name.as_str()) {
                self.ctx.add_error(NameRuleViolation::VariableFunctionClash(
                    global.name.clone(),
                    global.pos,
                ));
            }
        }
    }

    fn analyze_subroutine(
        &mut self,
        owner: &Owner,
        params: &[Name],
        locals: &[Name],
        body: &Algo,
        ret: Option<&Atom>,
    ) {
        self.ctx.push_scope(ScopeKind::Local, Some(owner.clone()));

        let mut seen_params = HashSet::new();
        for param in params {
            if seen_params.insert(param.name.as_str()) {
                let scope = SymbolScope::Local {
                    owner: owner.clone(),
                    role: LocalRole::Parameter,
                };
                self.ctx.declare(&param.name, scope, param.pos);
            } else {
                self.ctx.add_error(NameRuleViolation::DuplicateParameter(
                    param.name.clone(),
                    owner.to_string(),
                    param.pos,
                ));
            }
        }

        let mut seen_locals = HashSet::new();
        for local in locals {
            if seen_params.contains(local.name.as_str()) {
                self.ctx.add_error(NameRuleViolation::Shadowing(
                    local.name.clone(),
                    owner.to_string(),
                    local.pos,
                ));
            } else if !seen_locals.insert(local.name.as_str()) {
                self.ctx.add_error(NameRuleViolation::DuplicateLocal(
                    local.name.clone(),
                    owner.to_string(),
                    local.pos,
                ));
            } else {
                let scope = SymbolScope::Local {
                    owner: owner.clone(),
                    role: LocalRole::Declared,
                };
                self.ctx.declare(&local.name, scope, local.pos);
            }
        }

        let lookup = Lookup::Local(owner);
        self.visit_algo(body, lookup);
        if let Some(atom) = ret {
            self.visit_atom(atom, lookup);
        }

        self.ctx.pop_scope();
    }

    fn analyze_main(&mut self, program: &Program) {
        self.ctx.push_scope(ScopeKind::Main, None);

        let globals: HashSet<&str> = program.globals.iter().map(|g| g.name.as_str()).collect();
        let mut seen = HashSet::new();
        for var in &program.main.variables {
            if !seen.insert(var.name.as_str()) {
                self.ctx.add_error(NameRuleViolation::DuplicateMainVariable(
                    var.name.clone(),
                    var.pos,
                ));
                continue;
            }
            if globals.contains(var.name.as_str()) {
                self.ctx.add_warning(Warning::MainHidesGlobal(var.name.clone(), var.pos));
            }
            self.ctx.declare(&var.name, SymbolScope::Main, var.pos);
        }

        self.visit_algo(&program.main.body, Lookup::Main);
        self.ctx.pop_scope();
    }

    fn visit_algo(&mut self, algo: &Algo, lookup: Lookup<'_>) {
        for instr in &algo.instrs {
            match &instr.kind {
                InstrKind::Halt | InstrKind::Print(Output::Text(_)) => {}
                InstrKind::Print(Output::Atom(atom)) => self.visit_atom(atom, lookup),
                InstrKind::Call(call) => self.visit_call(call, lookup),
                InstrKind::Assign { target, value } => {
                    self.visit_var(target, lookup);
                    match value {
                        AssignValue::Term(term) => self.visit_term(term, lookup),
                        AssignValue::Call(call) => self.visit_call(call, lookup),
                    }
                }
                InstrKind::Loop { condition, body, .. } => {
                    self.visit_term(condition, lookup);
                    self.visit_algo(body, lookup);
                }
                InstrKind::Branch {
                    condition,
                    then_body,
                    else_body,
                } => {
                    self.visit_term(condition, lookup);
                    self.visit_algo(then_body, lookup);
                    if let Some(else_body) = else_body {
                        self.visit_algo(else_body, lookup);
                    }
                }
            }
        }
    }

    fn visit_call(&mut self, call: &Call, lookup: Lookup<'_>) {
        if self.ctx.symbols().subroutine(&call.name).is_none() {
            self.ctx
                .add_error(UndeclaredReference::Subroutine(call.name.clone(), call.pos));
        }
        for arg in &call.args {
            self.visit_atom(arg, lookup);
        }
    }

    fn visit_term(&mut self, term: &Term, lookup: Lookup<'_>) {
        match &term.kind {
            TermKind::Atom(atom) => self.visit_atom(atom, lookup),
            TermKind::Unary { operand, .. } => self.visit_term(operand, lookup),
            TermKind::Binary { left, right, .. } => {
                self.visit_term(left, lookup);
                self.visit_term(right, lookup);
            }
        }
    }

    fn visit_atom(&mut self, atom: &Atom, lookup: Lookup<'_>) {
        if let Atom::Var(var) = atom {
            self.visit_var(var, lookup);
        }
    }

    fn visit_var(&mut self, var: &VarRef, lookup: Lookup<'_>) {
        if self.ctx.resolve_use(var.id, &var.name, lookup).is_some() {
            return;
        }
        let scope = match lookup {
            Lookup::Main => "main".to_string(),
            Lookup::Local(owner) => owner.to_string(),
        };
        self.ctx
            .add_error(UndeclaredReference::Variable(var.name.clone(), scope, var.pos));
    }
}

/// Run scope analysis over `program`, recording entries and errors in `ctx`
pub fn analyze_scopes(program: &Program, ctx: &mut Context) {
    ScopeAnalyzer::new(ctx).analyze(program);
}
