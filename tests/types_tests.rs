use spl_compiler::analysis::{analyze_scopes, analyze_types, SemanticError, TypeError};
use spl_compiler::lexer::tokenize;
use spl_compiler::parser::{parse, BinaryOp, UnaryOp};
use spl_compiler::symbol::{Context, VarType};

/// Run scope and type analysis; returns the verdict and the type errors
fn check(source: &str) -> (bool, Vec<TypeError>, Context) {
    let tokens = tokenize(source).expect("source should tokenize");
    let mut ctx = Context::new();
    let program = parse(tokens, &mut ctx).expect("source should parse");

    analyze_scopes(&program, &mut ctx);
    assert!(!ctx.has_errors(), "scope errors: {:?}", ctx.errors());

    let well_typed = analyze_types(&program, &mut ctx);
    let errors = ctx
        .errors()
        .iter()
        .filter_map(|e| match e {
            SemanticError::Type(t) => Some(t.clone()),
            _ => None,
        })
        .collect();
    (well_typed, errors, ctx)
}

fn main_body(body: &str) -> String {
    format!(
        "glob {{ }} \
         proc {{ p(a) {{ local {{ }} print a }} }} \
         func {{ f(a) {{ local {{ }} return a }} }} \
         main {{ var {{ x y }} {body} }}"
    )
}

#[test]
fn test_well_typed_program() {
    let (ok, errors, _) = check(&main_body(
        "x = 1; y = (neg (x mult 2)); p(y); x = f(y); \
         if ((x > 1) and (not (y eq 2))) { print \"big\" } else { print x }; \
         do { x = (x minus 1) } until (x eq 0)",
    ));
    assert!(ok, "unexpected errors: {errors:?}");
    assert!(errors.is_empty());
}

#[test]
fn test_loop_condition_must_be_boolean() {
    let (ok, errors, _) = check(&main_body("x = 1; while x { x = 0 }"));
    assert!(!ok);
    assert!(matches!(
        errors.as_slice(),
        [TypeError::LoopCondition(VarType::Numeric, _)]
    ));

    let (ok, _, _) = check(&main_body("x = 1; do { x = 0 } until x"));
    assert!(!ok);
}

#[test]
fn test_branch_condition_accepts_numeric() {
    let (ok, errors, _) = check(&main_body("x = 1; if x { print x }"));
    assert!(ok, "unexpected errors: {errors:?}");
}

#[test]
fn test_not_coerces_numeric() {
    let (ok, errors, _) = check(&main_body("while (not x) { x = 1 }"));
    assert!(ok, "unexpected errors: {errors:?}");
}

#[test]
fn test_and_or_require_booleans() {
    let (ok, errors, _) = check(&main_body("if (x and (y > 1)) { halt }"));
    assert!(!ok);
    assert!(matches!(
        errors.as_slice(),
        [TypeError::BinaryOperands(BinaryOp::And, VarType::Numeric, VarType::Boolean, _)]
    ));
}

#[test]
fn test_arithmetic_rejects_booleans() {
    let (ok, errors, _) = check(&main_body("x = ((x > 1) plus 1)"));
    assert!(!ok);
    assert!(matches!(
        errors.as_slice(),
        [TypeError::BinaryOperands(BinaryOp::Plus, VarType::Boolean, VarType::Numeric, _)]
    ));
}

#[test]
fn test_neg_rejects_boolean() {
    let (ok, errors, _) = check(&main_body("x = (neg (x eq 1))"));
    assert!(!ok);
    assert!(matches!(
        errors.as_slice(),
        [TypeError::UnaryOperand(UnaryOp::Neg, VarType::Boolean, _)]
    ));
}

#[test]
fn test_assignment_must_be_numeric() {
    let (ok, errors, _) = check(&main_body("x = (y > 1)"));
    assert!(!ok);
    assert!(matches!(
        errors.as_slice(),
        [TypeError::AssignNotNumeric(name, VarType::Boolean, _)] if name == "x"
    ));
}

#[test]
fn test_procedure_has_no_value() {
    let (ok, errors, _) = check(&main_body("x = p(1)"));
    assert!(!ok);
    assert!(matches!(
        errors.as_slice(),
        [TypeError::ProcedureHasNoValue(name, _)] if name == "p"
    ));
}

#[test]
fn test_function_call_as_statement_allowed() {
    let (ok, errors, _) = check(&main_body("f(1)"));
    assert!(ok, "unexpected errors: {errors:?}");
}

#[test]
fn test_arity_mismatch() {
    let (ok, errors, _) = check(&main_body("p(1 2); x = f()"));
    assert!(!ok);
    assert!(matches!(
        errors.as_slice(),
        [
            TypeError::ArityMismatch(first, 1, 2, _),
            TypeError::ArityMismatch(second, 1, 0, _),
        ] if first == "p" && second == "f"
    ));
}

#[test]
fn test_missing_return() {
    let (ok, errors, _) = check(
        "glob { } proc { } func { f(a) { local { } halt } } main { var { } halt }",
    );
    assert!(!ok);
    assert!(matches!(
        errors.as_slice(),
        [TypeError::MissingReturn(name, _)] if name == "f"
    ));
}

#[test]
fn test_errors_accumulate_across_program() {
    let (ok, errors, ctx) = check(&main_body("while x { halt }; y = (x > 1); x = p(2)"));
    assert!(!ok);
    assert_eq!(errors.len(), 3);
    assert!(ctx.errors()[0].to_string().starts_with("TYPE-ERROR"));
}

#[test]
fn test_variables_recorded_numeric() {
    let (ok, _, ctx) = check(&main_body("halt"));
    assert!(ok);
    assert!(ctx.symbols().iter().all(|s| s.var_type == VarType::Numeric));
    assert_eq!(ctx.symbols().len(), 4);
}

/// Programs built without the parser, so list bounds reach the type analyzer
mod built_programs {
    use spl_compiler::analysis::{SemanticError, TypeError};
    use spl_compiler::lexer::Position;
    use spl_compiler::parser::{
        Algo, Atom, Call, FuncDef, Instr, InstrKind, MainProg, Name, ProcDef, Program,
    };
    use spl_compiler::symbol::Context;
    use spl_compiler::{continue_compilation, CompileFailure};

    fn pos() -> Position {
        Position::new(1, 1)
    }

    fn names(list: &[&str]) -> Vec<Name> {
        list.iter().map(|name| Name::new(*name, pos())).collect()
    }

    fn algo(ctx: &mut Context, instrs: Vec<Instr>) -> Algo {
        Algo {
            id: ctx.next_node_id(),
            instrs,
            pos: pos(),
        }
    }

    fn number(ctx: &mut Context, value: i64) -> Atom {
        Atom::Number {
            id: ctx.next_node_id(),
            value,
            pos: pos(),
        }
    }

    fn program(
        ctx: &mut Context,
        procedures: Vec<ProcDef>,
        functions: Vec<FuncDef>,
        main_instrs: Vec<Instr>,
    ) -> Program {
        let main = MainProg {
            id: ctx.next_node_id(),
            variables: Vec::new(),
            body: algo(ctx, main_instrs),
            pos: pos(),
        };
        Program {
            id: ctx.next_node_id(),
            globals: Vec::new(),
            procedures,
            functions,
            main,
        }
    }

    fn type_errors(program: &Program, ctx: &mut Context) -> Vec<TypeError> {
        match continue_compilation(program, ctx) {
            Err(CompileFailure::Semantic { errors, .. }) => errors
                .into_iter()
                .map(|e| match e {
                    SemanticError::Type(t) => t,
                    other => panic!("expected only type errors, got {other}"),
                })
                .collect(),
            other => panic!("expected a semantic failure, got {other:?}"),
        }
    }

    #[test]
    fn test_four_parameters_rejected() {
        let mut ctx = Context::new();
        let func = FuncDef {
            id: ctx.next_node_id(),
            name: Name::new("f", pos()),
            params: names(&["a", "b", "c", "d"]),
            locals: Vec::new(),
            body: algo(&mut ctx, Vec::new()),
            ret: Some(number(&mut ctx, 1)),
        };
        let program = program(&mut ctx, Vec::new(), vec![func], Vec::new());

        let errors = type_errors(&program, &mut ctx);
        assert!(matches!(
            errors.as_slice(),
            [TypeError::TooManyParameters(name, 4, _)] if name == "f"
        ));
    }

    #[test]
    fn test_four_locals_rejected() {
        let mut ctx = Context::new();
        let proc = ProcDef {
            id: ctx.next_node_id(),
            name: Name::new("p", pos()),
            params: Vec::new(),
            locals: names(&["w", "x", "y", "z"]),
            body: algo(&mut ctx, Vec::new()),
        };
        let program = program(&mut ctx, vec![proc], Vec::new(), Vec::new());

        let errors = type_errors(&program, &mut ctx);
        assert!(matches!(
            errors.as_slice(),
            [TypeError::TooManyLocals(name, 4, _)] if name == "p"
        ));
    }

    #[test]
    fn test_four_arguments_rejected() {
        let mut ctx = Context::new();
        let proc = ProcDef {
            id: ctx.next_node_id(),
            name: Name::new("p", pos()),
            params: names(&["a", "b", "c"]),
            locals: Vec::new(),
            body: algo(&mut ctx, Vec::new()),
        };

        let call_id = ctx.next_node_id();
        let args = (1..=4).map(|value| number(&mut ctx, value)).collect();
        let call = Instr::new(
            ctx.next_node_id(),
            InstrKind::Call(Call {
                id: call_id,
                name: "p".to_string(),
                args,
                pos: pos(),
            }),
            pos(),
        );
        let program = program(&mut ctx, vec![proc], Vec::new(), vec![call]);

        let errors = type_errors(&program, &mut ctx);
        assert!(matches!(
            errors.as_slice(),
            [
                TypeError::TooManyArguments(name, 4, _),
                TypeError::ArityMismatch(_, 3, 4, _),
            ] if name == "p"
        ));
    }
}
