//! rillc-drv - Compiler Driver
//!
//! Orchestrates the pipeline: read the source, lex, parse, analyze, emit,
//! write the module. Each stage's diagnostics land in one shared handler;
//! after a stage that produced errors, the driver prints everything
//! collected so far and stops with that stage's exit code:
//!
//! | code | meaning |
//! |------|---------|
//! | 0 | success |
//! | 1 | I/O failure (source, import/export table, or output) |
//! | 2 | lexical errors |
//! | 3 | syntax errors |
//! | 4 | semantic errors |
//! | 5 | code generation error |

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use rillc_lex::Lexer;
use rillc_sem::analyze;
use rillc_util::{Handler, Stage};
use rillc_wasm::{emit, Iet};

/// rillc - compiler for the rill language
///
/// Compiles a single source file into a binary WebAssembly module bound to
/// a JSON-declared import/export table.
#[derive(Parser, Debug)]
#[command(name = "rillc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Compile rill source files to WebAssembly", long_about = None)]
pub struct Cli {
    /// Source file to compile
    pub source: PathBuf,

    /// Dump the token stream to stdout and exit
    #[arg(short = 't', long = "tokens")]
    pub dump_tokens: bool,

    /// Output path for the module (default: `<source>.wasm`)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Path to the JSON import/export table (required when emitting)
    #[arg(short = 'i', long = "iet")]
    pub iet: Option<PathBuf>,
}

impl Cli {
    /// The module path: `-o` if given, else the source path with `.wasm`
    /// appended.
    fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(path) => path.clone(),
            None => {
                let mut os = OsString::from(self.source.as_os_str());
                os.push(".wasm");
                PathBuf::from(os)
            }
        }
    }
}

/// Runs the compiler, returning the process exit code.
pub fn run(cli: &Cli) -> i32 {
    let file = cli.source.display().to_string();

    let source = match read_source(cli) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("{}: io error: {:#}", file, error);
            return Stage::Io.exit_code();
        }
    };

    let mut handler = Handler::new();
    let tokens = Lexer::tokenize(&source, &mut handler);

    if cli.dump_tokens {
        for token in &tokens {
            if !token.is_eof() {
                println!("{}", token.dump());
            }
        }
        return 0;
    }

    let ast = rillc_par::Parser::new(tokens, &mut handler).parse();

    if handler.errors_in(Stage::Lex) > 0 {
        report(&handler, &file);
        return Stage::Lex.exit_code();
    }
    if handler.errors_in(Stage::Parse) > 0 {
        report(&handler, &file);
        return Stage::Parse.exit_code();
    }

    let iet = match load_iet(cli) {
        Ok(iet) => iet,
        Err(error) => {
            eprintln!("{}: io error: {:#}", file, error);
            return Stage::Io.exit_code();
        }
    };

    let analysis = analyze(&ast, &iet.extern_sigs(), &mut handler);
    if handler.errors_in(Stage::Sem) > 0 {
        report(&handler, &file);
        return Stage::Sem.exit_code();
    }

    let module = match emit(&ast, &analysis, &iet) {
        Ok(module) => module,
        Err(error) => {
            handler.error(Stage::Codegen, error.to_string(), error.span());
            report(&handler, &file);
            return Stage::Codegen.exit_code();
        }
    };

    let output = cli.output_path();
    if let Err(error) = std::fs::write(&output, &module)
        .with_context(|| format!("cannot write `{}`", output.display()))
    {
        eprintln!("{}: io error: {:#}", file, error);
        return Stage::Io.exit_code();
    }

    // Surface any warnings even on success.
    report(&handler, &file);
    0
}

fn read_source(cli: &Cli) -> anyhow::Result<String> {
    std::fs::read_to_string(&cli.source)
        .with_context(|| format!("cannot read `{}`", cli.source.display()))
}

fn load_iet(cli: &Cli) -> anyhow::Result<Iet> {
    let path = cli
        .iet
        .as_ref()
        .context("an import/export table (-i <path>) is required to emit a module")?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read `{}`", path.display()))?;
    let iet = Iet::from_json(&text)
        .with_context(|| format!("invalid import/export table `{}`", path.display()))?;
    Ok(iet)
}

/// Prints every collected diagnostic to stderr in emission order.
fn report(handler: &Handler, file: &str) {
    for diagnostic in handler.diagnostics() {
        eprintln!("{}", diagnostic.render(file));
    }
}
