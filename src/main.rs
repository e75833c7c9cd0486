use anyhow::{bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use spl_compiler::analysis::{analyze_scopes, analyze_types};
use spl_compiler::lexer::{Scanner, DEFAULT_MAX_STRING_LEN};
use spl_compiler::parser::parse;
use spl_compiler::symbol::Context as SplContext;
use spl_compiler::{compile, CompileOptions, Numbering};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::EnvFilter;

/// Keeps log lines short; the compiler runs for milliseconds
struct NoTimestamp;

impl FormatTime for NoTimestamp {
    fn format_time(&self, _w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        Ok(())
    }
}

#[derive(ClapParser)]
#[command(name = "splc")]
#[command(about = "Compiler for the SPL teaching language", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum NumberingArg {
    /// 1, 2, 3, ...
    Unit,
    /// 10, 20, 30, ...
    Tens,
}

impl From<NumberingArg> for Numbering {
    fn from(arg: NumberingArg) -> Self {
        match arg {
            NumberingArg::Unit => Numbering::Unit,
            NumberingArg::Tens => Numbering::Tens,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Tokenize the input file and print tokens
    Lex {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Parse the input file and print the AST
    Parse {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Run scope and type analysis and print the symbol table
    Check {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Compile the input file to a numbered instruction listing
    Compile {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file path (defaults to stdout)
        #[arg(short, long, value_name = "OUTPUT")]
        output: Option<PathBuf>,

        /// Print the listing to stdout even when writing to file
        #[arg(short, long)]
        print: bool,

        /// Line numbering of the listing
        #[arg(long, value_enum, default_value = "unit")]
        numbering: NumberingArg,

        /// Longest string literal accepted by the lexer
        #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_STRING_LEN)]
        max_string_len: usize,
    },
}

fn main() -> Result<()> {
    if let Ok(filter) = EnvFilter::try_from_env("SPL_LOG") {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_timer(NoTimestamp)
            .with_writer(std::io::stderr)
            .init();
    }

    let cli = Cli::parse();

    match cli.command {
        Commands::Lex { file } => lex_file(&file)?,
        Commands::Parse { file } => parse_file(&file)?,
        Commands::Check { file } => check_file(&file)?,
        Commands::Compile {
            file,
            output,
            print,
            numbering,
            max_string_len,
        } => {
            let options = CompileOptions {
                numbering: numbering.into(),
                max_string_len,
            };
            compile_file(&file, output.as_deref(), print, &options)?;
        }
    }

    Ok(())
}

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read file '{}'", path.display()))
}

fn lex_file(path: &Path) -> Result<()> {
    let input = read_source(path)?;

    let tokens = Scanner::new(&input)
        .scan_all()
        .with_context(|| format!("failed to tokenize '{}'", path.display()))?;

    println!("Tokens:");
    println!("-------");
    for token in &tokens {
        println!(
            "{}:{}:{} {:?} {}",
            path.display(),
            token.pos.line,
            token.pos.column,
            token.kind,
            token.lexeme
        );
    }

    println!("\nTotal tokens: {}", tokens.len());

    Ok(())
}

fn parse_file(path: &Path) -> Result<()> {
    let input = read_source(path)?;

    let tokens = Scanner::new(&input)
        .scan_all()
        .with_context(|| format!("failed to tokenize '{}'", path.display()))?;

    let mut ctx = SplContext::new();
    let program = parse(tokens, &mut ctx)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;

    println!("Program AST:");
    println!("============\n");
    println!("{program:#?}");
    println!("\nParsing completed successfully!");

    Ok(())
}

fn check_file(path: &Path) -> Result<()> {
    let input = read_source(path)?;

    let tokens = Scanner::new(&input)
        .scan_all()
        .with_context(|| format!("failed to tokenize '{}'", path.display()))?;

    let mut ctx = SplContext::new();
    let program = parse(tokens, &mut ctx)
        .with_context(|| format!("failed to parse '{}'", path.display()))?;

    analyze_scopes(&program, &mut ctx);
    if !ctx.has_errors() {
        analyze_types(&program, &mut ctx);
    }

    for warning in ctx.warnings() {
        eprintln!("warning: {warning}");
    }
    for error in ctx.errors() {
        eprintln!("error: {error}");
    }
    if ctx.has_errors() {
        bail!("'{}' failed semantic analysis", path.display());
    }

    println!("Symbols:");
    for symbol in ctx.symbols().iter() {
        let internal = symbol.internal_name.as_deref().unwrap_or(&symbol.name);
        println!(
            "  [{}] {} ({:?}, {}) -> {internal}",
            symbol.id, symbol.name, symbol.scope, symbol.var_type
        );
    }
    println!("\nNo errors found.");

    Ok(())
}

fn compile_file(
    path: &Path,
    output: Option<&Path>,
    print: bool,
    options: &CompileOptions,
) -> Result<()> {
    let input = read_source(path)?;

    let compilation = match compile(&input, options) {
        Ok(compilation) => compilation,
        Err(failure) => {
            eprint!("{}", failure.report());
            bail!("failed to compile '{}'", path.display());
        }
    };

    for warning in &compilation.warnings {
        eprintln!("warning: {warning}");
    }

    let listing = compilation.listing(options.numbering);

    if let Some(output_path) = output {
        compilation
            .write_listing(output_path, options.numbering)
            .with_context(|| format!("failed to write listing to '{}'", output_path.display()))?;
        if print {
            print!("{listing}");
        } else {
            println!("Listing written to: {}", output_path.display());
        }
    } else {
        print!("{listing}");
    }

    Ok(())
}
