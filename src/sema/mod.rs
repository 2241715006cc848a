//! Semantic analyzer: two-pass name resolution and type checking over a
//! parsed AST. See spec.md §4.4. Mutates the tree in place (annotating
//! `data_type` on every expression node) rather than rebuilding it.

use crate::ast::{DataType, Node};
use crate::diagnostics::{Diagnostic, Diagnostics, Stage};
use crate::symbol::{FunctionDeclError, Scope, Symbol};

/// Current-function state machine (§4.4): `return` is only legal while
/// `Active`.
enum FunctionContext {
    Uninitialized,
    Active { name: String, return_type: DataType },
}

pub struct Analyzer {
    diagnostics: Diagnostics,
    scope: Scope,
    context: FunctionContext,
}

impl Analyzer {
    pub fn new() -> Self {
        Self {
            diagnostics: Diagnostics::new(),
            scope: Scope::new(),
            context: FunctionContext::Uninitialized,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn print_errors(&self) {
        self.diagnostics.print_errors();
    }

    /// Consumes the analyzer, returning its accumulated diagnostics.
    pub fn analyze(mut self, program: &mut Node) -> Diagnostics {
        let Node::Program(program) = program else {
            panic!("analyze expects a Program root");
        };

        // Pass A: declare every top-level function before any body is
        // examined, so forward references and mutual recursion resolve.
        for decl in program.declarations.iter() {
            if let Node::FunctionDecl(function) = decl {
                let parameter_types = function
                    .parameters
                    .iter()
                    .map(|p| match p {
                        Node::Parameter(p) => p.param_type,
                        _ => unreachable!("function parameters are always Parameter nodes"),
                    })
                    .collect();
                let symbol = Symbol::function(
                    &function.name,
                    function.return_type,
                    parameter_types,
                    function.body.is_some(),
                );
                match self.scope.declare_function(symbol) {
                    Ok(()) => {}
                    Err(FunctionDeclError::AlreadyDefined) => {
                        self.error(
                            function.position,
                            format!("Function '{}' already declared", function.name),
                        );
                    }
                    Err(FunctionDeclError::SignatureMismatch) => {
                        self.error(
                            function.position,
                            format!(
                                "Function '{}' redeclared with a different signature",
                                function.name
                            ),
                        );
                    }
                }
            }
        }

        // Pass B: globals and function bodies, in source order.
        for decl in program.declarations.iter_mut() {
            match decl {
                Node::VariableDecl(var) => {
                    let initializer_type = var
                        .initializer
                        .as_deref_mut()
                        .map(|init| self.analyze_expr(init));
                    if let Some(init_type) = initializer_type {
                        if init_type != var.var_type {
                            self.error(
                                var.position,
                                format!(
                                    "Cannot initialize variable '{}' of type '{}' with expression of type '{}'",
                                    var.name, var.var_type, init_type
                                ),
                            );
                        }
                    }
                    let symbol = Symbol::variable(&var.name, var.var_type, self.scope.level());
                    if self.scope.declare(symbol).is_err() {
                        self.error(
                            var.position,
                            format!("Variable '{}' already declared in this scope", var.name),
                        );
                    }
                }
                Node::FunctionDecl(function) => {
                    let Some(body) = function.body.as_deref_mut() else {
                        continue;
                    };

                    self.scope.push_scope();
                    for param in function.parameters.iter() {
                        let Node::Parameter(param) = param else {
                            unreachable!("function parameters are always Parameter nodes");
                        };
                        let symbol =
                            Symbol::parameter(&param.name, param.param_type, self.scope.level());
                        if self.scope.declare(symbol).is_err() {
                            self.error(
                                param.position,
                                format!("Parameter '{}' already declared", param.name),
                            );
                        }
                    }

                    self.context = FunctionContext::Active {
                        name: function.name.clone(),
                        return_type: function.return_type,
                    };
                    self.analyze_stmt(body);
                    self.context = FunctionContext::Uninitialized;
                    self.scope.pop_scope();
                }
                _ => {}
            }
        }

        log::info!("Type checking complete");
        self.diagnostics
    }

    fn error(&mut self, position: (usize, usize), message: impl Into<String>) {
        let mut diagnostic = Diagnostic::new(Stage::Semantic, message, position.0, position.1);
        if let FunctionContext::Active { name, .. } = &self.context {
            diagnostic = diagnostic.with_context(name.clone());
        }
        self.diagnostics.push(diagnostic);
    }

    // ---- statements -------------------------------------------------

    fn analyze_stmt(&mut self, node: &mut Node) {
        match node {
            Node::CompoundStmt(block) => {
                self.scope.push_scope();
                for stmt in block.statements.iter_mut() {
                    self.analyze_stmt(stmt);
                }
                self.scope.pop_scope();
            }
            Node::VariableDecl(var) => {
                let initializer_type = var
                    .initializer
                    .as_deref_mut()
                    .map(|init| self.analyze_expr(init));
                if let Some(init_type) = initializer_type {
                    if init_type != var.var_type {
                        self.error(
                            var.position,
                            format!(
                                "Cannot initialize variable '{}' of type '{}' with expression of type '{}'",
                                var.name, var.var_type, init_type
                            ),
                        );
                    }
                }
                let symbol = Symbol::variable(&var.name, var.var_type, self.scope.level());
                if self.scope.declare(symbol).is_err() {
                    self.error(
                        var.position,
                        format!("Variable '{}' already declared in this scope", var.name),
                    );
                }
            }
            Node::IfStmt(if_stmt) => {
                self.check_condition(&mut if_stmt.condition);
                self.analyze_stmt(&mut if_stmt.then_branch);
                if let Some(else_branch) = if_stmt.else_branch.as_deref_mut() {
                    self.analyze_stmt(else_branch);
                }
            }
            Node::WhileStmt(while_stmt) => {
                self.check_condition(&mut while_stmt.condition);
                self.analyze_stmt(&mut while_stmt.body);
            }
            Node::ForStmt(for_stmt) => {
                self.scope.push_scope();
                if let Some(init) = for_stmt.init.as_deref_mut() {
                    self.analyze_stmt(init);
                }
                if let Some(condition) = for_stmt.condition.as_deref_mut() {
                    self.check_condition(condition);
                }
                self.analyze_stmt(&mut for_stmt.body);
                if let Some(update) = for_stmt.update.as_deref_mut() {
                    self.analyze_expr(update);
                }
                self.scope.pop_scope();
            }
            Node::ReturnStmt(return_stmt) => {
                let Some((name, return_type)) = self.active_function() else {
                    self.error(return_stmt.position, "'return' is only legal inside a function body");
                    return;
                };
                match return_stmt.value.as_deref_mut() {
                    Some(value) => {
                        let value_type = self.analyze_expr(value);
                        if value_type != return_type {
                            self.error(
                                return_stmt.position,
                                format!(
                                    "Cannot return value of type '{value_type}' from function '{name}' returning '{return_type}'"
                                ),
                            );
                        }
                    }
                    None => {
                        if return_type != DataType::Void {
                            self.error(
                                return_stmt.position,
                                format!(
                                    "Function '{name}' must return a value of type '{return_type}'"
                                ),
                            );
                        }
                    }
                }
            }
            Node::ExpressionStmt(stmt) => {
                if let Some(expression) = stmt.expression.as_deref_mut() {
                    self.analyze_expr(expression);
                }
            }
            _ => unreachable!("not a statement node"),
        }
    }

    fn active_function(&self) -> Option<(String, DataType)> {
        match &self.context {
            FunctionContext::Active { name, return_type } => Some((name.clone(), *return_type)),
            FunctionContext::Uninitialized => None,
        }
    }

    fn check_condition(&mut self, condition: &mut Node) {
        let position = condition.position();
        let condition_type = self.analyze_expr(condition);
        if !condition_type.is_numeric() {
            self.error(
                position,
                format!("Condition must be numeric, found '{condition_type}'"),
            );
        }
    }

    // ---- expressions --------------------------------------------------

    /// Infers, checks, and annotates (`set_data_type`) the type of an
    /// expression node, returning that type.
    fn analyze_expr(&mut self, node: &mut Node) -> DataType {
        let result_type = match node {
            Node::Number(_) => DataType::Int,
            Node::String(_) => DataType::CharPtr,
            Node::Identifier(identifier) => match self.scope.lookup(&identifier.name) {
                Some(symbol) => symbol.data_type,
                None => {
                    self.error(
                        identifier.position,
                        format!("Undefined identifier '{}'", identifier.name),
                    );
                    DataType::Void
                }
            },
            Node::BinaryOp(binary) if binary.op == "=" => {
                let left_type = self.analyze_expr(&mut binary.left);
                let right_type = self.analyze_expr(&mut binary.right);
                if left_type != right_type {
                    self.error(
                        binary.position,
                        format!(
                            "Cannot assign value of type '{right_type}' to variable of type '{left_type}'"
                        ),
                    );
                }
                left_type
            }
            Node::BinaryOp(binary) => {
                let op = binary.op.clone();
                let left_type = self.analyze_expr(&mut binary.left);
                let right_type = self.analyze_expr(&mut binary.right);
                match op.as_str() {
                    "+" | "-" | "*" | "/" | "%" => {
                        if !left_type.is_numeric() || !right_type.is_numeric() {
                            self.error(
                                binary.position,
                                format!(
                                    "Cannot apply '{op}' to operands of type '{left_type}' and '{right_type}'"
                                ),
                            );
                        }
                        DataType::Int
                    }
                    "&&" | "||" => {
                        if !left_type.is_numeric() || !right_type.is_numeric() {
                            self.error(
                                binary.position,
                                format!(
                                    "Cannot apply '{op}' to operands of type '{left_type}' and '{right_type}'"
                                ),
                            );
                        }
                        DataType::Int
                    }
                    // == != < <= > >=
                    _ => {
                        if left_type != right_type {
                            self.error(
                                binary.position,
                                format!(
                                    "Cannot apply '{op}' to operands of type '{left_type}' and '{right_type}'"
                                ),
                            );
                        }
                        DataType::Int
                    }
                }
            }
            Node::UnaryOp(unary) => {
                let operand_type = self.analyze_expr(&mut unary.operand);
                if !operand_type.is_numeric() {
                    self.error(
                        unary.position,
                        format!("Cannot apply '{}' to operand of type '{operand_type}'", unary.op),
                    );
                }
                DataType::Int
            }
            Node::FunctionCall(call) => {
                self.analyze_call(call)
            }
            _ => unreachable!("not an expression node"),
        };
        node.set_data_type(result_type);
        result_type
    }

    fn analyze_call(&mut self, call: &mut crate::ast::FunctionCall) -> DataType {
        let Node::Identifier(callee) = call.callee.as_mut() else {
            // The parser has already reported "Can only call identifiers";
            // still analyze the callee and arguments for completeness.
            self.analyze_expr(&mut call.callee);
            for argument in call.arguments.iter_mut() {
                self.analyze_expr(argument);
            }
            return DataType::Void;
        };

        let symbol = match self.scope.lookup(&callee.name) {
            Some(symbol) => symbol.clone(),
            None => {
                self.error(
                    call.position,
                    format!("Undefined function '{}'", callee.name),
                );
                for argument in call.arguments.iter_mut() {
                    self.analyze_expr(argument);
                }
                return DataType::Void;
            }
        };

        let Some(function_info) = &symbol.function_info else {
            self.error(call.position, format!("'{}' is not a function", callee.name));
            for argument in call.arguments.iter_mut() {
                self.analyze_expr(argument);
            }
            return DataType::Void;
        };

        if call.arguments.len() != function_info.parameter_types.len() {
            self.error(
                call.position,
                format!(
                    "Function '{}' expects {} arguments, got {}",
                    callee.name,
                    function_info.parameter_types.len(),
                    call.arguments.len()
                ),
            );
        }

        for (index, argument) in call.arguments.iter_mut().enumerate() {
            let argument_type = self.analyze_expr(argument);
            if let Some(&expected) = function_info.parameter_types.get(index) {
                if argument_type != expected {
                    self.error(
                        call.position,
                        format!(
                            "Argument {} of '{}' has type '{argument_type}', expected '{expected}'",
                            index + 1,
                            callee.name
                        ),
                    );
                }
            }
        }

        callee.data_type = symbol.data_type;
        symbol.data_type
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn analyze(source: &str) -> Diagnostics {
        let (mut ast, parse_diagnostics) = Parser::new(source).parse_program();
        assert!(!parse_diagnostics.has_errors(), "{:?}", parse_diagnostics.iter().collect::<Vec<_>>());
        Analyzer::new().analyze(&mut ast)
    }

    #[test]
    fn well_typed_program_has_no_errors() {
        let diagnostics = analyze("int main() { int x = 1; int y = 2; return x + y; }");
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn undefined_identifier_is_reported() {
        let diagnostics = analyze("int main() { return undeclared; }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message == "Undefined identifier 'undeclared'"));
    }

    #[test]
    fn duplicate_function_declaration_is_reported() {
        let diagnostics = analyze("int f() { return 0; } int f() { return 1; }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message == "Function 'f' already declared"));
    }

    #[test]
    fn forward_declared_function_is_not_a_duplicate() {
        let diagnostics =
            analyze("int f(int n); int f(int n) { return n; } int main() { return f(1); }");
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.iter().collect::<Vec<_>>());
    }

    #[test]
    fn redeclaration_with_a_different_signature_is_reported() {
        let diagnostics = analyze("int f(int n); char f(int n) { return 0; }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message == "Function 'f' redeclared with a different signature"));
    }

    #[test]
    fn assignment_type_mismatch_is_reported() {
        let diagnostics = analyze("int main() { int x; x = \"hi\"; return x; }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message == "Cannot assign value of type 'char*' to variable of type 'int'"));
    }

    #[test]
    fn initializer_type_mismatch_is_reported() {
        let diagnostics = analyze("int main() { int x = \"hi\"; return x; }");
        assert!(diagnostics.iter().any(|d| d.message
            == "Cannot initialize variable 'x' of type 'int' with expression of type 'char*'"));
    }

    #[test]
    fn shadowing_resolves_to_innermost_scope() {
        let diagnostics = analyze(
            "int main() { int x = 1; { int x = 2; return x; } return x; }",
        );
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn forward_reference_between_functions_resolves() {
        let diagnostics = analyze("int main() { return helper(); } int helper() { return 1; }");
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn call_with_wrong_argument_count_is_reported() {
        let diagnostics = analyze("int f(int a) { return a; } int main() { return f(1, 2); }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message == "Function 'f' expects 1 arguments, got 2"));
    }

    #[test]
    fn calling_a_non_function_is_reported() {
        let diagnostics = analyze("int main() { int x = 0; return x(); }");
        assert!(diagnostics.iter().any(|d| d.message == "'x' is not a function"));
    }

    #[test]
    fn non_numeric_condition_is_reported() {
        let diagnostics = analyze("int main() { if (\"hi\") { return 1; } return 0; }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message.contains("Condition must be numeric")));
    }

    #[test]
    fn bare_return_in_non_void_function_is_reported() {
        let diagnostics = analyze("int main() { return; }");
        assert!(diagnostics
            .iter()
            .any(|d| d.message == "Function 'main' must return a value of type 'int'"));
    }

    #[test]
    fn char_parameter_is_numeric_for_arithmetic() {
        // CHAR and INT are both "numeric" for arithmetic even though they
        // are not assignment-compatible (§4.4, §9 design note 7).
        let diagnostics = analyze("int add(char a, int b) { return a + b; }");
        assert!(!diagnostics.has_errors());
    }
}
