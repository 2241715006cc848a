//! `tinyc`: the command-line driver for the TinyC compiler core in
//! `lib.rs`. Parses arguments, runs the pipeline, writes assembly, and
//! (unless `--compile-only`) shells out to an assembler and linker to
//! produce an executable. None of this is part of the compiler core
//! itself (spec.md §1: "the command-line driver ... is a thin adapter").

use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use clap::Parser;
use log::{debug, error, info, warn};

use tinyc::{ast, compile_source, lexer::Lexer};

/// CLI surface per spec.md §6, plus the `-v`/`--verbose` flag every
/// binary this crate is modeled on exposes for its own log level.
#[derive(Parser, Debug)]
#[command(author, version, about = "Ahead-of-time compiler for TinyC, targeting x86-64 SysV assembly.")]
struct Cli {
    /// TinyC source file to compile.
    file: PathBuf,

    /// Assembly output path.
    #[arg(short = 'o', long = "output", default_value = "out.s")]
    output: PathBuf,

    /// Pretty-print the token stream before parsing.
    #[arg(long = "debug-tokens")]
    debug_tokens: bool,

    /// Pretty-print the AST after parsing.
    #[arg(long = "debug-ast")]
    debug_ast: bool,

    /// Reserved for a future symbol-table dump.
    #[arg(long = "debug-symbols")]
    debug_symbols: bool,

    /// Stop after writing assembly; do not assemble/link.
    #[arg(long = "compile-only")]
    compile_only: bool,

    /// Increase log verbosity (repeatable: warn -> info -> debug -> trace).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn level_for(count: u8) -> log::LevelFilter {
    match count {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    simple_logger::SimpleLogger::new()
        .with_level(level_for(cli.verbose))
        .init()
        .unwrap();

    let source = fs::read_to_string(&cli.file)
        .map_err(|err| format!("cannot read '{}': {err}", cli.file.display()))?;

    if cli.debug_tokens {
        print!("{}", Lexer::pretty_print(&source));
    }

    if cli.debug_symbols {
        warn!("--debug-symbols is reserved for a future symbol-table dump; ignoring");
    }

    let output = compile_source(&source);

    if cli.debug_ast {
        if let Some(tree) = &output.ast {
            println!("{}", ast::pretty_print(tree));
        }
    }

    if output.diagnostics.has_errors() {
        error!("compilation failed with {} error(s)", output.diagnostics.len());
        output.diagnostics.print_errors();
        std::process::exit(1);
    }

    let assembly = output
        .assembly
        .expect("a diagnostics-free compile always produces assembly");

    fs::write(&cli.output, assembly)?;
    info!("Code generation complete: wrote '{}'", cli.output.display());

    if cli.compile_only {
        return Ok(());
    }

    let binary_path = cli.output.with_extension("");
    assemble_and_link(&cli.output, &binary_path)?;
    info!("wrote executable '{}'", binary_path.display());

    Ok(())
}

/// Assembles `asm_path` with GAS and links it with `cc` against the
/// tiny runtime, producing `binary_path`. Driver plumbing only (spec.md
/// §1's "external collaborators"); the compiler core never calls this.
fn assemble_and_link(asm_path: &PathBuf, binary_path: &PathBuf) -> Result<(), Box<dyn Error>> {
    let object_path = asm_path.with_extension("o");

    debug!("assembling '{}' -> '{}'", asm_path.display(), object_path.display());
    let assemble = Command::new("as")
        .args(["-o", &object_path.to_string_lossy(), &asm_path.to_string_lossy()])
        .output()?;
    if !assemble.status.success() {
        error!("{}", String::from_utf8_lossy(&assemble.stderr));
        return Err("assembly failed".into());
    }

    let runtime_path = runtime_source_path();
    debug!("linking '{}' against '{}'", object_path.display(), runtime_path.display());
    let link = Command::new("cc")
        .args([
            "-o",
            &binary_path.to_string_lossy(),
            &object_path.to_string_lossy(),
            &runtime_path.to_string_lossy(),
        ])
        .output()?;
    if !link.status.success() {
        error!("{}", String::from_utf8_lossy(&link.stderr));
        return Err("linking failed".into());
    }

    Ok(())
}

/// The tiny runtime lives at `runtime/runtime.c` next to `Cargo.toml`
/// (spec.md §1's out-of-scope "tiny runtime C file"), found relative to
/// the crate's manifest directory so `cargo run`/an installed binary
/// both locate it without a separate install step.
fn runtime_source_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("runtime/runtime.c")
}
