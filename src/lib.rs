//! `tinyc`: an ahead-of-time compiler for TinyC, targeting x86-64
//! System V assembly in AT&T (GAS) syntax.
//!
//! The pipeline is four stages sharing one diagnostics model: lex →
//! parse → analyze → generate. Each stage accumulates [`diagnostics::Diagnostics`]
//! rather than failing fast; [`compile_source`] stops after the first
//! stage that reports an error.

pub mod ast;
pub mod codegen;
pub mod cursor;
pub mod diagnostics;
pub mod lexer;
pub mod parser;
pub mod sema;
pub mod symbol;

use ast::Node;
use diagnostics::Diagnostics;
use parser::Parser;
use sema::Analyzer;

/// Everything a caller might want out of a full compile, before assembly
/// and linking: the annotated AST, all diagnostics gathered across every
/// stage that ran, and the generated assembly text if code generation
/// ran at all.
pub struct CompileOutput {
    pub ast: Option<Node>,
    pub assembly: Option<String>,
    pub diagnostics: Diagnostics,
}

/// Runs the full pipeline over `source`, stopping after parsing or
/// semantic analysis if either reports an error (§1: "the pipeline
/// driver checks `has_errors()` between stages").
pub fn compile_source(source: &str) -> CompileOutput {
    let (mut ast, parse_diagnostics) = Parser::new(source).parse_program();
    let mut diagnostics = parse_diagnostics;

    if diagnostics.has_errors() {
        return CompileOutput {
            ast: Some(ast),
            assembly: None,
            diagnostics,
        };
    }

    let sema_diagnostics = Analyzer::new().analyze(&mut ast);
    diagnostics.extend(sema_diagnostics);

    if diagnostics.has_errors() {
        return CompileOutput {
            ast: Some(ast),
            assembly: None,
            diagnostics,
        };
    }

    let assembly = codegen::CodeGenerator::new().generate(&ast);

    CompileOutput {
        ast: Some(ast),
        assembly: Some(assembly),
        diagnostics,
    }
}
