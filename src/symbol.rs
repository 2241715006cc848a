//! Symbol table and scope stack. §3/§4.4: a scope is a hashed name→symbol
//! map with a parent back-reference; the scope stack is a linked chain
//! whose current scope is its head and whose level-0 entry is the global
//! scope. Modeled here as a `Vec` of hash tables — each index *is* a
//! level, and the previous index *is* its parent — which gives the same
//! lookup semantics as an explicit linked chain without the pointer
//! plumbing.

use std::collections::HashMap;

use crate::ast::DataType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Variable,
    Function,
    Parameter,
}

/// Why `Scope::declare_function` rejected a top-level function
/// declaration. Both variants are `Diagnostic`-worthy, but with
/// different messages, so callers match on this rather than getting a
/// single opaque error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionDeclError {
    /// A previous declaration of this name already had a body.
    AlreadyDefined,
    /// The two declarations disagree on return type or parameter types.
    SignatureMismatch,
}

/// Present iff `kind == Function`; `defined` is true iff the declaration
/// that produced this symbol had a body.
#[derive(Debug, Clone)]
pub struct FunctionInfo {
    pub parameter_types: Vec<DataType>,
    pub defined: bool,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub data_type: DataType,
    pub scope_level: usize,
    pub function_info: Option<FunctionInfo>,
}

impl Symbol {
    pub fn variable(name: impl Into<String>, data_type: DataType, scope_level: usize) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Variable,
            data_type,
            scope_level,
            function_info: None,
        }
    }

    pub fn parameter(name: impl Into<String>, data_type: DataType, scope_level: usize) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Parameter,
            data_type,
            scope_level,
            function_info: None,
        }
    }

    pub fn function(
        name: impl Into<String>,
        return_type: DataType,
        parameter_types: Vec<DataType>,
        defined: bool,
    ) -> Self {
        Self {
            name: name.into(),
            kind: SymbolKind::Function,
            data_type: return_type,
            scope_level: 0,
            function_info: Some(FunctionInfo {
                parameter_types,
                defined,
            }),
        }
    }
}

/// The scope stack. Level 0 (`stacks[0]`) is the global scope; the
/// current scope is `stacks.last()`.
#[derive(Debug, Clone)]
pub struct Scope {
    stacks: Vec<HashMap<String, Symbol>>,
}

impl Scope {
    pub fn new() -> Self {
        Self {
            stacks: vec![HashMap::new()],
        }
    }

    pub fn level(&self) -> usize {
        self.stacks.len() - 1
    }

    pub fn push_scope(&mut self) {
        self.stacks.push(HashMap::new());
    }

    pub fn pop_scope(&mut self) {
        debug_assert!(self.stacks.len() > 1, "cannot pop the global scope");
        self.stacks.pop();
    }

    /// Declare `symbol` in the current scope. Returns `Err` (without
    /// mutating anything) if a symbol with the same name already exists
    /// in this scope — duplicates at different levels are shadowing, not
    /// an error (§3 invariant: "a name may appear at most once per
    /// scope").
    pub fn declare(&mut self, symbol: Symbol) -> Result<(), ()> {
        let current = self.stacks.last_mut().expect("global scope always present");
        if current.contains_key(&symbol.name) {
            return Err(());
        }
        current.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Declare a top-level function symbol in the global scope, merging
    /// with a previous forward declaration of the same name rather than
    /// rejecting it outright: Pass A may see a prototype and its
    /// matching definition in either order (§4.4's mutual-recursion
    /// support depends on this). A name collision is only an error when
    /// the two declarations disagree on signature, or both carry a body.
    pub fn declare_function(&mut self, symbol: Symbol) -> Result<(), FunctionDeclError> {
        debug_assert_eq!(symbol.kind, SymbolKind::Function);
        let new_info = symbol
            .function_info
            .clone()
            .expect("function symbol always carries function_info");

        if let Some(existing) = self.lookup_global(&symbol.name) {
            let existing_info = existing
                .function_info
                .as_ref()
                .expect("function symbol always carries function_info");
            let mismatch = existing.data_type != symbol.data_type
                || existing_info.parameter_types != new_info.parameter_types;
            let both_defined = existing_info.defined && new_info.defined;

            if mismatch {
                return Err(FunctionDeclError::SignatureMismatch);
            }
            if both_defined {
                return Err(FunctionDeclError::AlreadyDefined);
            }
            if new_info.defined {
                self.stacks[0].insert(symbol.name.clone(), symbol);
            }
            return Ok(());
        }

        self.stacks[0].insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Lookup walks current → parent → … → global, returning the first
    /// hit.
    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.stacks
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
    }

    /// Lookup restricted to the global scope, used by Pass A to find
    /// previously-declared top-level functions without being shadowed by
    /// whatever scope is current.
    pub fn lookup_global(&self, name: &str) -> Option<&Symbol> {
        self.stacks[0].get(name)
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}
