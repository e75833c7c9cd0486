use std::fs;

use tempfile::NamedTempFile;

use spl_compiler::analysis::{SemanticError, UndeclaredReference, Warning};
use spl_compiler::codegen::{Instruction, Line};
use spl_compiler::parser::ParserError;
use spl_compiler::resolver::resolve;
use spl_compiler::{compile, Compilation, CompileFailure, CompileOptions, Numbering};

/// Helper function to compile an SPL program from tests/programs
fn compile_program(name: &str) -> Result<Compilation, CompileFailure> {
    let path = format!("tests/programs/{name}");
    let source = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read source file {path}: {e}"));
    compile(&source, &CompileOptions::default())
}

fn jump_targets(compilation: &Compilation) -> Vec<usize> {
    compilation
        .instructions
        .iter()
        .filter_map(|instr| instr.target().copied())
        .collect()
}

#[test]
fn test_halt_program() {
    let compilation = compile_program("halt.spl").expect("Failed to compile halt.spl");
    assert_eq!(compilation.instructions, vec![Instruction::Stop]);
    assert!(compilation.labels.is_empty());
    assert_eq!(compilation.listing(Numbering::Unit), "1 STOP\n");
}

#[test]
fn test_branch_program() {
    let compilation = compile_program("branch.spl").expect("Failed to compile branch.spl");

    assert_eq!(compilation.labels.len(), 2);
    let ifs = compilation
        .instructions
        .iter()
        .filter(|i| matches!(i, Instruction::If { .. }))
        .count();
    let gotos = compilation
        .instructions
        .iter()
        .filter(|i| matches!(i, Instruction::Goto(_)))
        .count();
    assert_eq!((ifs, gotos), (1, 1));

    let count = compilation.instructions.len();
    assert!(jump_targets(&compilation).iter().all(|&t| t >= 1 && t <= count));

    assert_eq!(
        compilation.listing(Numbering::Unit),
        "1 x = 10\n2 IF x > 5 THEN 4\n3 GOTO 5\n4 PRINT x\n5 STOP\n"
    );
}

#[test]
fn test_undeclared_call_stops_before_codegen() {
    let failure = compile(
        "glob { } proc { } func { } main { var { } foo() }",
        &CompileOptions::default(),
    )
    .expect_err("undeclared call must fail");

    match &failure {
        CompileFailure::Semantic { errors, .. } => {
            assert!(matches!(
                errors.as_slice(),
                [SemanticError::Undeclared(UndeclaredReference::Subroutine(name, _))] if name == "foo"
            ));
        }
        other => panic!("expected a semantic failure, got {other:?}"),
    }
    assert!(failure.report().contains("UNDECLARED"));
}

#[test]
fn test_four_parameters_rejected() {
    let failure = compile_program("too_many_params.spl").expect_err("4 parameters must fail");
    assert!(matches!(
        failure,
        CompileFailure::Syntax(ParserError::ExpectedToken(..))
    ));
}

#[test]
fn test_trailing_label_resolves_past_end() {
    let compilation = compile_program("branch.spl").expect("Failed to compile branch.spl");

    // Drop the STOP the generator appends after the exit label
    let mut symbolic = compilation.symbolic.clone();
    assert_eq!(symbolic.pop(), Some(Line::Instr(Instruction::Stop)));
    assert!(symbolic.last().is_some_and(Line::is_label));

    let resolution = resolve(&symbolic).expect("should resolve");
    let executable = resolution.instructions.len();
    assert_eq!(executable, 4);
    assert_eq!(resolution.labels["_L2"], executable + 1);
}

#[test]
fn test_subroutines_tens_numbering() {
    let compilation = compile_program("subroutines.spl").expect("Failed to compile subroutines.spl");
    let expected = "\
10 GOTO 100
20 report_v = _arg_report_1
30 PRINT report_v
40 RETURN
50 square_n = _arg_square_1
60 _t1 = square_n * square_n
70 square_r = _t1
80 _ret_square = square_r
90 RETURN
100 x = 4
110 _arg_square_1 = x
120 GOSUB 50
130 y = _ret_square
140 total = y
150 _arg_report_1 = total
160 GOSUB 20
170 STOP
";
    assert_eq!(compilation.listing(Numbering::Tens), expected);
    assert_eq!(compilation.labels["_MAIN"], 10);
    assert_eq!(compilation.labels["_SUB_square"], 5);
}

#[test]
fn test_loops_resolve_within_listing() {
    let compilation = compile_program("loops.spl").expect("Failed to compile loops.spl");
    let count = compilation.instructions.len();
    assert_eq!(count, 14);
    assert!(jump_targets(&compilation).iter().all(|&t| t >= 1 && t <= count));
    assert_eq!(compilation.labels["_L3"], 10);
    assert_eq!(compilation.labels["_L4"], 10);
}

#[test]
fn test_write_listing() {
    let compilation = compile_program("branch.spl").expect("Failed to compile branch.spl");

    let out = NamedTempFile::new().expect("Failed to create temp file");
    compilation
        .write_listing(out.path(), Numbering::Tens)
        .expect("Failed to write listing");

    let written = fs::read_to_string(out.path()).expect("Failed to read listing back");
    assert_eq!(written, compilation.listing(Numbering::Tens));
    assert!(written.starts_with("10 x = 10\n20 IF x > 5 THEN 40\n"));
}

#[test]
fn test_warnings_reported_with_success() {
    let compilation = compile(
        "glob { x } proc { } func { } main { var { x } x = 1 }",
        &CompileOptions::default(),
    )
    .expect("hiding a global is only a warning");
    assert!(matches!(
        compilation.warnings.as_slice(),
        [Warning::MainHidesGlobal(name, _)] if name == "x"
    ));
}

#[test]
fn test_report_lists_warnings_before_errors() {
    let failure = compile(
        "glob { x } proc { } func { } main { var { x } while x { halt } }",
        &CompileOptions::default(),
    )
    .expect_err("numeric loop condition must fail");

    let report = failure.report();
    let warning_at = report.find("warning:").expect("report should contain the warning");
    let error_at = report.find("error:").expect("report should contain the error");
    assert!(warning_at < error_at);
    assert!(report.contains("TYPE-ERROR"));
}

#[test]
fn test_lexer_failure() {
    let failure = compile(
        "glob { } proc { } func { } main { var { } print \"this string is too long\" }",
        &CompileOptions::default(),
    )
    .expect_err("over-long string must fail");
    assert!(matches!(failure, CompileFailure::Lex(_)));

    let options = CompileOptions {
        max_string_len: 50,
        ..CompileOptions::default()
    };
    assert!(compile(
        "glob { } proc { } func { } main { var { } print \"this string is too long\" }",
        &options,
    )
    .is_ok());
}
