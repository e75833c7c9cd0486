use std::collections::HashSet;

use spl_compiler::lexer::tokenize;
use spl_compiler::parser::{
    parse, Algo, AssignValue, Atom, BinaryOp, InstrKind, LoopKind, Output, ParserError, Program,
    Term, TermKind, UnaryOp,
};
use spl_compiler::symbol::Context;

fn parse_source(source: &str) -> Result<Program, ParserError> {
    let tokens = tokenize(source).expect("source should tokenize");
    let mut ctx = Context::new();
    parse(tokens, &mut ctx)
}

fn main_only(body: &str) -> String {
    format!("glob {{ }} proc {{ }} func {{ }} main {{ var {{ a b x }} {body} }}")
}

fn first_assigned_term(program: &Program) -> &Term {
    match &program.main.body.instrs[0].kind {
        InstrKind::Assign {
            value: AssignValue::Term(term),
            ..
        } => term,
        other => panic!("expected assignment of a term, got {other:?}"),
    }
}

/// Collect (parent, child) id pairs of every term below `term`
fn term_ids(term: &Term, ids: &mut Vec<usize>, edges: &mut Vec<(usize, usize)>) {
    ids.push(term.id);
    match &term.kind {
        TermKind::Atom(atom) => {
            ids.push(atom.id());
            edges.push((term.id, atom.id()));
        }
        TermKind::Unary { operand, .. } => {
            edges.push((term.id, operand.id));
            term_ids(operand, ids, edges);
        }
        TermKind::Binary { left, right, .. } => {
            edges.push((term.id, left.id));
            edges.push((term.id, right.id));
            term_ids(left, ids, edges);
            term_ids(right, ids, edges);
        }
    }
}

fn algo_ids(algo: &Algo, ids: &mut Vec<usize>, edges: &mut Vec<(usize, usize)>) {
    ids.push(algo.id);
    for instr in &algo.instrs {
        ids.push(instr.id);
        edges.push((algo.id, instr.id));
        match &instr.kind {
            InstrKind::Assign { target, value } => {
                ids.push(target.id);
                edges.push((instr.id, target.id));
                if let AssignValue::Term(term) = value {
                    edges.push((instr.id, term.id));
                    term_ids(term, ids, edges);
                }
            }
            InstrKind::Loop { condition, body, .. } => {
                edges.push((instr.id, condition.id));
                edges.push((instr.id, body.id));
                term_ids(condition, ids, edges);
                algo_ids(body, ids, edges);
            }
            InstrKind::Branch {
                condition,
                then_body,
                else_body,
            } => {
                edges.push((instr.id, condition.id));
                term_ids(condition, ids, edges);
                algo_ids(then_body, ids, edges);
                if let Some(else_body) = else_body {
                    algo_ids(else_body, ids, edges);
                }
            }
            _ => {}
        }
    }
}

#[test]
fn test_minimal_program() {
    let program = parse_source("glob { } proc { } func { } main { var { } halt }")
        .expect("minimal program should parse");

    assert_eq!(program.id, 1);
    assert!(program.globals.is_empty());
    assert!(program.procedures.is_empty());
    assert!(program.functions.is_empty());
    assert_eq!(program.main.body.instrs.len(), 1);
    assert_eq!(program.main.body.instrs[0].kind, InstrKind::Halt);
}

#[test]
fn test_node_ids_unique_and_preorder() {
    let program = parse_source(&main_only(
        "x = (neg (a plus b)); while (x > 0) { x = (x minus 1) }; if (not x) { halt } else { print x }",
    ))
    .expect("program should parse");

    let mut ids = vec![program.id, program.main.id];
    let mut edges = Vec::new();
    algo_ids(&program.main.body, &mut ids, &mut edges);

    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), ids.len(), "node ids must be unique");
    for (parent, child) in edges {
        assert!(parent < child, "parent {parent} must be numbered before child {child}");
    }
}

#[test]
fn test_prefix_and_infix_binary_terms_agree() {
    let infix = parse_source(&main_only("x = (a plus b)")).expect("infix should parse");
    let prefix = parse_source(&main_only("x = (plus a b)")).expect("prefix should parse");

    for program in [&infix, &prefix] {
        match &first_assigned_term(program).kind {
            TermKind::Binary { left, op, right } => {
                assert_eq!(*op, BinaryOp::Plus);
                assert!(matches!(&left.kind, TermKind::Atom(Atom::Var(v)) if v.name == "a"));
                assert!(matches!(&right.kind, TermKind::Atom(Atom::Var(v)) if v.name == "b"));
            }
            other => panic!("expected a binary term, got {other:?}"),
        }
    }
}

#[test]
fn test_parenthesized_single_term() {
    let program = parse_source(&main_only("x = ((a))")).expect("should parse");
    assert!(matches!(
        &first_assigned_term(&program).kind,
        TermKind::Atom(Atom::Var(v)) if v.name == "a"
    ));
}

#[test]
fn test_comparison_and_unary_operators() {
    let program = parse_source(&main_only("x = (not (a eq 1)); b = (> a 2)")).expect("should parse");

    match &first_assigned_term(&program).kind {
        TermKind::Unary { op, operand } => {
            assert_eq!(*op, UnaryOp::Not);
            assert!(matches!(&operand.kind, TermKind::Binary { op: BinaryOp::Eq, .. }));
        }
        other => panic!("expected a unary term, got {other:?}"),
    }

    match &program.main.body.instrs[1].kind {
        InstrKind::Assign {
            value: AssignValue::Term(term),
            ..
        } => assert!(matches!(&term.kind, TermKind::Binary { op: BinaryOp::Greater, .. })),
        other => panic!("expected assignment, got {other:?}"),
    }
}

#[test]
fn test_call_assignment_uses_checkpoint() {
    let program = parse_source(&main_only("x = f(a 1); b = a")).expect("should parse");

    match &program.main.body.instrs[0].kind {
        InstrKind::Assign {
            target,
            value: AssignValue::Call(call),
        } => {
            assert_eq!(target.name, "x");
            assert_eq!(call.name, "f");
            assert_eq!(call.args.len(), 2);
        }
        other => panic!("expected call assignment, got {other:?}"),
    }

    match &program.main.body.instrs[1].kind {
        InstrKind::Assign {
            value: AssignValue::Term(term),
            ..
        } => assert!(matches!(&term.kind, TermKind::Atom(Atom::Var(v)) if v.name == "a")),
        other => panic!("expected term assignment, got {other:?}"),
    }
}

#[test]
fn test_empty_algo_and_trailing_semicolon() {
    let program = parse_source("glob { } proc { } func { } main { var { } }").expect("empty main");
    assert!(program.main.body.instrs.is_empty());

    let program = parse_source(&main_only("halt; print \"bye\";")).expect("trailing ;");
    assert_eq!(program.main.body.instrs.len(), 2);
    assert_eq!(
        program.main.body.instrs[1].kind,
        InstrKind::Print(Output::Text("bye".to_string()))
    );
}

#[test]
fn test_loops_and_branches() {
    let program = parse_source(&main_only(
        "while (a > b) { a = (a minus 1) }; do { b = (b plus 1) } until (b eq a); if a { halt }",
    ))
    .expect("should parse");

    let instrs = &program.main.body.instrs;
    assert!(matches!(instrs[0].kind, InstrKind::Loop { kind: LoopKind::While, .. }));
    assert!(matches!(instrs[1].kind, InstrKind::Loop { kind: LoopKind::DoUntil, .. }));
    assert!(matches!(instrs[2].kind, InstrKind::Branch { else_body: None, .. }));
}

#[test]
fn test_subroutine_definitions() {
    let program = parse_source(
        "glob { g } proc { p(a b) { local { t } t = a } } \
         func { f(n) { local { } halt; return n } g2() { local { } return 0 } } \
         main { var { } p(1 2) }",
    )
    .expect("should parse");

    assert_eq!(program.procedures.len(), 1);
    assert_eq!(program.procedures[0].params.len(), 2);
    assert_eq!(program.procedures[0].locals.len(), 1);

    assert_eq!(program.functions.len(), 2);
    assert!(matches!(&program.functions[0].ret, Some(Atom::Var(v)) if v.name == "n"));
    assert!(matches!(&program.functions[1].ret, Some(Atom::Number { value: 0, .. })));
    assert!(program.functions[1].body.instrs.is_empty());
}

#[test]
fn test_missing_return_left_to_type_analysis() {
    let program = parse_source(
        "glob { } proc { } func { f(n) { local { } halt } } main { var { } halt }",
    )
    .expect("should parse");
    assert!(program.functions[0].ret.is_none());
}

#[test]
fn test_four_parameters_rejected() {
    let source = std::fs::read_to_string("tests/programs/too_many_params.spl")
        .expect("failed to read too_many_params.spl");
    match parse_source(&source) {
        Err(ParserError::ExpectedToken(expected, found, _)) => {
            assert_eq!(expected, ")");
            assert_eq!(found, "d");
        }
        other => panic!("expected a syntax error, got {other:?}"),
    }
}

#[test]
fn test_four_arguments_rejected() {
    assert!(matches!(
        parse_source(&main_only("f(a b x 1)")),
        Err(ParserError::ExpectedToken(expected, _, _)) if expected == ")"
    ));
}

#[test]
fn test_unexpected_tokens() {
    assert!(matches!(
        parse_source(&main_only("x x")),
        Err(ParserError::UnexpectedToken(..))
    ));
    assert!(matches!(
        parse_source(&main_only("else")),
        Err(ParserError::ExpectedInstruction(..))
    ));
    assert!(matches!(
        parse_source(&main_only("x = ")),
        Err(ParserError::ExpectedTerm(..))
    ));
    assert!(matches!(
        parse_source("glob { } proc { } func { } main { var { } halt } halt"),
        Err(ParserError::TrailingInput(..))
    ));
    assert!(matches!(
        parse_source("proc { } main { var { } halt }"),
        Err(ParserError::ExpectedToken(..))
    ));
}
