//! Shared diagnostic type and per-stage collector.
//!
//! Every stage (lexer, parser, semantic analyzer) accumulates its failures
//! into a [`Diagnostics`] list instead of aborting; the driver checks
//! `has_errors()` between stages and stops the pipeline there.

use std::fmt::{self, Display};

/// Which stage raised a diagnostic. Used only for the `<Stage> error` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lexer,
    Parser,
    Semantic,
}

impl Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Lexer => "Lexer",
            Stage::Parser => "Parser",
            Stage::Semantic => "Semantic",
        })
    }
}

/// A single positioned error. `line`/`column` are 1-based; semantic
/// diagnostics that cannot yet be tied to a source position (no AST node
/// position was available) report `0, 0` per the known limitation in
/// spec.md §7 — this crate avoids that limitation by stamping every AST
/// node with the position of its first token (see `ast::Position`), so in
/// practice semantic diagnostics carry real positions too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub context: Option<String>,
}

impl Diagnostic {
    pub fn new(stage: Stage, message: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            stage,
            message: message.into(),
            line,
            column,
            context: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} error [at line {}, column {}]",
            self.stage, self.line, self.column
        )?;
        if let Some(context) = &self.context {
            write!(f, " [in {context}]")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Append-only list of diagnostics owned by one stage.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Print every diagnostic to stderr, one per line, in the §7 wire format.
    pub fn print_errors(&self) {
        for diagnostic in &self.entries {
            eprintln!("{diagnostic}");
        }
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
