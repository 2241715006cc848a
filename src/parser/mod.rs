//! Recursive-descent parser with operator-precedence climbing and
//! panic-mode error recovery. See spec.md §4.2 for the authoritative
//! grammar and recovery rules.

use crate::ast::{
    BinaryOp, CompoundStmt, DataType, ExpressionStmt, ForStmt, FunctionCall, FunctionDecl,
    Identifier, IfStmt, Node, Number, Parameter, Position, Program, ReturnStmt, StringLit,
    UnaryOp, VariableDecl, WhileStmt,
};
use crate::diagnostics::{Diagnostic, Diagnostics, Stage};
use crate::lexer::{Lexer, Token, TokenKind};

/// §4.2: "A hard cap of MAX_PARSE_ERRORS = 50 errors terminates parsing
/// with a final 'too many parse errors' message."
const MAX_PARSE_ERRORS: usize = 50;

pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    previous: Token,
    diagnostics: Diagnostics,
    panic_mode: bool,
    terminated: bool,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let previous = current.clone();
        Self {
            lexer,
            current,
            previous,
            diagnostics: Diagnostics::new(),
            panic_mode: false,
            terminated: false,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    pub fn print_errors(&self) {
        self.diagnostics.print_errors();
    }

    /// `parse_program()`: the sole entry point. Always returns a
    /// `Node::Program`, even when riddled with errors — callers consult
    /// `has_errors()`/`into_diagnostics()` to decide whether to proceed.
    pub fn parse_program(mut self) -> (Node, Diagnostics) {
        let mut declarations = vec![];
        while !self.check(TokenKind::Eof) && !self.terminated {
            match self.declaration() {
                Some(decl) => declarations.push(decl),
                None => {
                    if self.panic_mode {
                        self.synchronize();
                    } else if !self.check(TokenKind::Eof) {
                        // Defensive: guarantee forward progress even if a
                        // production returned None without reporting an
                        // error or entering panic mode.
                        self.advance();
                    }
                }
            }
        }
        log::info!("Lexing complete: {} tokens", self.lexer.token_count());
        log::info!(
            "Parsing complete: {} declarations ({} errors)",
            declarations.len(),
            self.diagnostics.len()
        );
        (Node::Program(Program { declarations }), self.diagnostics)
    }

    // ---- token stream plumbing -------------------------------------

    fn advance(&mut self) {
        self.previous = std::mem::replace(&mut self.current, self.lexer.next_token());
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Option<Token> {
        if self.check(kind) {
            let token = self.current.clone();
            self.advance();
            Some(token)
        } else {
            self.error_at_current(message);
            None
        }
    }

    fn error_at_current(&mut self, message: impl Into<String>) {
        let token = self.current.clone();
        self.error_at(&token, message);
    }

    fn error_at(&mut self, token: &Token, message: impl Into<String>) {
        if self.panic_mode || self.terminated {
            return;
        }
        self.panic_mode = true;

        // A lexer ERROR token's lexeme *is* the diagnostic message
        // (§2: "lexer errors surface as error tokens the parser reports").
        let message = if token.is_error() {
            token.lexeme.clone().unwrap_or_else(|| message.into())
        } else {
            message.into()
        };

        self.diagnostics.push(Diagnostic::new(
            Stage::Parser,
            message,
            token.line,
            token.column,
        ));

        if self.diagnostics.len() >= MAX_PARSE_ERRORS {
            self.diagnostics.push(Diagnostic::new(
                Stage::Parser,
                "Too many parse errors",
                token.line,
                token.column,
            ));
            self.terminated = true;
        }
    }

    /// Advance until the previous token was `;` or the current token
    /// starts a new statement/declaration, then clear panic mode (§4.2).
    fn synchronize(&mut self) {
        self.panic_mode = false;
        while !self.check(TokenKind::Eof) {
            if self.previous.kind == TokenKind::Semicolon {
                return;
            }
            if self.current.kind.starts_statement_or_declaration() {
                return;
            }
            self.advance();
        }
    }

    // ---- declarations -------------------------------------------------

    fn declaration(&mut self) -> Option<Node> {
        let position = self.current.position();
        let ty = self.parse_type()?;
        let name = self.consume_identifier("Expected identifier")?;

        if self.check(TokenKind::LParen) {
            self.function_tail(ty, name, position)
        } else {
            self.var_tail(ty, name, position)
        }
    }

    fn parse_type(&mut self) -> Option<DataType> {
        if self.matches(TokenKind::Int) {
            Some(DataType::Int)
        } else if self.matches(TokenKind::Char) {
            if self.matches(TokenKind::Star) {
                Some(DataType::CharPtr)
            } else {
                Some(DataType::Char)
            }
        } else if self.matches(TokenKind::Void) {
            Some(DataType::Void)
        } else {
            self.error_at_current("Expected type");
            None
        }
    }

    fn consume_identifier(&mut self, message: &str) -> Option<String> {
        let token = self.consume(TokenKind::Identifier, message)?;
        Some(token.lexeme.unwrap_or_default())
    }

    fn function_tail(&mut self, return_type: DataType, name: String, position: Position) -> Option<Node> {
        self.consume(TokenKind::LParen, "Expected '(' after function name")?;
        let mut parameters = vec![];
        if !self.check(TokenKind::RParen) {
            parameters = self.param_list()?;
        }
        self.consume(TokenKind::RParen, "Expected ')' after parameters")?;

        let body = if self.matches(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.compound_stmt()?))
        };

        Some(Node::FunctionDecl(FunctionDecl {
            name,
            return_type,
            parameters,
            body,
            position,
        }))
    }

    fn param_list(&mut self) -> Option<Vec<Node>> {
        let mut params = vec![self.param()?];
        while self.matches(TokenKind::Comma) {
            params.push(self.param()?);
        }
        Some(params)
    }

    fn param(&mut self) -> Option<Node> {
        let position = self.current.position();
        let param_type = self.parse_type()?;
        let name = self.consume_identifier("Expected identifier")?;
        Some(Node::Parameter(Parameter {
            name,
            param_type,
            position,
        }))
    }

    fn var_tail(&mut self, var_type: DataType, name: String, position: Position) -> Option<Node> {
        let initializer = if self.matches(TokenKind::Assign) {
            Some(Box::new(self.expression()?))
        } else {
            None
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after variable declaration")?;
        Some(Node::VariableDecl(VariableDecl {
            name,
            var_type,
            initializer,
            position,
        }))
    }

    // ---- statements -----------------------------------------------

    fn statement(&mut self) -> Option<Node> {
        match self.current.kind {
            TokenKind::LBrace => self.compound_stmt(),
            TokenKind::If => self.if_stmt(),
            TokenKind::While => self.while_stmt(),
            TokenKind::For => self.for_stmt(),
            TokenKind::Return => self.return_stmt(),
            TokenKind::Int | TokenKind::Char | TokenKind::Void => self.var_decl_stmt(),
            _ => self.expression_stmt(),
        }
    }

    fn var_decl_stmt(&mut self) -> Option<Node> {
        let position = self.current.position();
        let ty = self.parse_type()?;
        let name = self.consume_identifier("Expected identifier")?;
        self.var_tail(ty, name, position)
    }

    fn compound_stmt(&mut self) -> Option<Node> {
        let open = self.consume(TokenKind::LBrace, "Expected '{'")?;
        let mut statements = vec![];
        while !self.check(TokenKind::RBrace) && !self.check(TokenKind::Eof) && !self.terminated {
            match self.statement() {
                Some(stmt) => statements.push(stmt),
                None => {
                    if self.panic_mode {
                        self.synchronize();
                    } else {
                        break;
                    }
                }
            }
        }
        self.consume(TokenKind::RBrace, "Expected '}' after block")?;
        Some(Node::CompoundStmt(CompoundStmt {
            statements,
            position: open.position(),
        }))
    }

    fn if_stmt(&mut self) -> Option<Node> {
        let position = self.current.position();
        self.advance(); // 'if'
        self.consume(TokenKind::LParen, "Expected '(' after 'if'")?;
        let condition = Box::new(self.expression()?);
        self.consume(TokenKind::RParen, "Expected ')' after condition")?;
        let then_branch = Box::new(self.statement()?);
        let else_branch = if self.matches(TokenKind::Else) {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Some(Node::IfStmt(IfStmt {
            condition,
            then_branch,
            else_branch,
            position,
        }))
    }

    fn while_stmt(&mut self) -> Option<Node> {
        let position = self.current.position();
        self.advance(); // 'while'
        self.consume(TokenKind::LParen, "Expected '(' after 'while'")?;
        let condition = Box::new(self.expression()?);
        self.consume(TokenKind::RParen, "Expected ')' after condition")?;
        let body = Box::new(self.statement()?);
        Some(Node::WhileStmt(WhileStmt {
            condition,
            body,
            position,
        }))
    }

    fn for_stmt(&mut self) -> Option<Node> {
        let position = self.current.position();
        self.advance(); // 'for'
        self.consume(TokenKind::LParen, "Expected '(' after 'for'")?;

        let init = if self.check(TokenKind::Semicolon) {
            self.advance();
            None
        } else if matches!(self.current.kind, TokenKind::Int | TokenKind::Char | TokenKind::Void) {
            Some(Box::new(self.var_decl_stmt()?))
        } else {
            Some(Box::new(self.expression_stmt()?))
        };

        let condition = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.expression()?))
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after loop condition")?;

        let update = if self.check(TokenKind::RParen) {
            None
        } else {
            Some(Box::new(self.expression()?))
        };
        self.consume(TokenKind::RParen, "Expected ')' after for clauses")?;

        let body = Box::new(self.statement()?);

        Some(Node::ForStmt(ForStmt {
            init,
            condition,
            update,
            body,
            position,
        }))
    }

    fn return_stmt(&mut self) -> Option<Node> {
        let position = self.current.position();
        self.advance(); // 'return'
        let value = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.expression()?))
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after return statement")?;
        Some(Node::ReturnStmt(ReturnStmt { value, position }))
    }

    fn expression_stmt(&mut self) -> Option<Node> {
        let position = self.current.position();
        let expression = if self.check(TokenKind::Semicolon) {
            None
        } else {
            Some(Box::new(self.expression()?))
        };
        self.consume(TokenKind::Semicolon, "Expected ';' after expression")?;
        Some(Node::ExpressionStmt(ExpressionStmt {
            expression,
            position,
        }))
    }

    // ---- expressions: precedence ladder, lowest to highest --------

    fn expression(&mut self) -> Option<Node> {
        self.assignment()
    }

    fn assignment(&mut self) -> Option<Node> {
        let left = self.logical_or()?;
        if self.check(TokenKind::Assign) {
            let position = self.current.position();
            self.advance();
            let right = self.assignment()?; // right-associative
            return Some(Node::BinaryOp(BinaryOp {
                op: "=".to_string(),
                left: Box::new(left),
                right: Box::new(right),
                data_type: DataType::Void,
                position,
            }));
        }
        Some(left)
    }

    fn logical_or(&mut self) -> Option<Node> {
        self.left_assoc_binary(Self::logical_and, &[(TokenKind::Or, "||")])
    }

    fn logical_and(&mut self) -> Option<Node> {
        self.left_assoc_binary(Self::equality, &[(TokenKind::And, "&&")])
    }

    fn equality(&mut self) -> Option<Node> {
        self.left_assoc_binary(
            Self::relational,
            &[(TokenKind::Eq, "=="), (TokenKind::Ne, "!=")],
        )
    }

    fn relational(&mut self) -> Option<Node> {
        self.left_assoc_binary(
            Self::additive,
            &[
                (TokenKind::Lt, "<"),
                (TokenKind::Le, "<="),
                (TokenKind::Gt, ">"),
                (TokenKind::Ge, ">="),
            ],
        )
    }

    fn additive(&mut self) -> Option<Node> {
        self.left_assoc_binary(
            Self::multiplicative,
            &[(TokenKind::Plus, "+"), (TokenKind::Minus, "-")],
        )
    }

    fn multiplicative(&mut self) -> Option<Node> {
        self.left_assoc_binary(
            Self::unary,
            &[
                (TokenKind::Star, "*"),
                (TokenKind::Slash, "/"),
                (TokenKind::Percent, "%"),
            ],
        )
    }

    /// Shared left-associative binary-operator level: parse one operand
    /// at `next`, then fold in `(op operand)*` for any operator in `ops`.
    fn left_assoc_binary(
        &mut self,
        next: fn(&mut Self) -> Option<Node>,
        ops: &[(TokenKind, &str)],
    ) -> Option<Node> {
        let mut left = next(self)?;
        loop {
            let Some(&(_, op_text)) = ops.iter().find(|(kind, _)| self.check(*kind)) else {
                break;
            };
            let position = self.current.position();
            self.advance();
            let right = next(self)?;
            left = Node::BinaryOp(BinaryOp {
                op: op_text.to_string(),
                left: Box::new(left),
                right: Box::new(right),
                data_type: DataType::Void,
                position,
            });
        }
        Some(left)
    }

    fn unary(&mut self) -> Option<Node> {
        let op = match self.current.kind {
            TokenKind::Not => "!",
            TokenKind::Minus => "-",
            TokenKind::Plus => "+",
            _ => return self.postfix(),
        };
        let position = self.current.position();
        self.advance();
        // Chained unaries (`!-!x`) are allowed: recurse into `unary` again
        // rather than dropping straight to `postfix` (§9 design note 6).
        let operand = Box::new(self.unary()?);
        Some(Node::UnaryOp(UnaryOp {
            op: op.to_string(),
            operand,
            data_type: DataType::Void,
            position,
        }))
    }

    fn postfix(&mut self) -> Option<Node> {
        let mut expr = self.primary()?;
        while self.check(TokenKind::LParen) {
            let position = self.current.position();
            if !matches!(expr, Node::Identifier(_)) {
                self.error_at_current("Can only call identifiers");
            }
            self.advance(); // '('
            let mut arguments = vec![];
            if !self.check(TokenKind::RParen) {
                arguments.push(self.expression()?);
                while self.matches(TokenKind::Comma) {
                    arguments.push(self.expression()?);
                }
            }
            self.consume(TokenKind::RParen, "Expected ')' after arguments")?;
            expr = Node::FunctionCall(FunctionCall {
                callee: Box::new(expr),
                arguments,
                data_type: DataType::Void,
                position,
            });
        }
        Some(expr)
    }

    fn primary(&mut self) -> Option<Node> {
        let token = self.current.clone();
        match token.kind {
            TokenKind::Number => {
                self.advance();
                let value = token
                    .lexeme
                    .as_deref()
                    .and_then(|lexeme| lexeme.parse::<i32>().ok())
                    .unwrap_or(0);
                Some(Node::Number(Number {
                    value,
                    position: token.position(),
                }))
            }
            TokenKind::String => {
                self.advance();
                Some(Node::String(StringLit {
                    value: token.lexeme.unwrap_or_default(),
                    position: token.position(),
                }))
            }
            TokenKind::Identifier => {
                self.advance();
                Some(Node::Identifier(Identifier {
                    name: token.lexeme.unwrap_or_default(),
                    data_type: DataType::Void,
                    position: token.position(),
                }))
            }
            TokenKind::LParen => {
                self.advance();
                let expr = self.expression()?;
                self.consume(TokenKind::RParen, "Expected ')' after expression")?;
                Some(expr)
            }
            TokenKind::Error => {
                self.error_at(&token, "Lexical error");
                self.advance();
                None
            }
            _ => {
                self.error_at_current("Expected expression");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> (Node, Diagnostics) {
        Parser::new(source).parse_program()
    }

    fn first_function(program: &Node) -> &FunctionDecl {
        let Node::Program(program) = program else {
            panic!("expected Program");
        };
        match &program.declarations[0] {
            Node::FunctionDecl(f) => f,
            other => panic!("expected FunctionDecl, got {other:?}"),
        }
    }

    #[test]
    fn parses_minimal_function() {
        let (ast, diagnostics) = parse("int main() { return 42; }");
        assert!(!diagnostics.has_errors());
        let function = first_function(&ast);
        assert_eq!(function.name, "main");
        assert_eq!(function.return_type, DataType::Int);
        let Node::CompoundStmt(body) = function.body.as_deref().unwrap() else {
            panic!("expected body");
        };
        assert_eq!(body.statements.len(), 1);
    }

    #[test]
    fn additive_binds_looser_than_multiplicative() {
        // a + b * c should parse as a + (b * c)
        let (ast, diagnostics) = parse("int main() { return 1 + 2 * 3; }");
        assert!(!diagnostics.has_errors());
        let function = first_function(&ast);
        let Node::CompoundStmt(body) = function.body.as_deref().unwrap() else {
            panic!()
        };
        let Node::ReturnStmt(ret) = &body.statements[0] else {
            panic!()
        };
        let Node::BinaryOp(top) = ret.value.as_deref().unwrap() else {
            panic!()
        };
        assert_eq!(top.op, "+");
        assert!(matches!(top.right.as_ref(), Node::BinaryOp(inner) if inner.op == "*"));
    }

    #[test]
    fn assignment_is_right_associative() {
        let (ast, diagnostics) = parse("int main() { int a; int b; int c; a = b = c; return 0; }");
        assert!(!diagnostics.has_errors());
        let function = first_function(&ast);
        let Node::CompoundStmt(body) = function.body.as_deref().unwrap() else {
            panic!()
        };
        let Node::ExpressionStmt(stmt) = &body.statements[3] else {
            panic!("expected assignment statement, got {:?}", body.statements[3]);
        };
        let Node::BinaryOp(outer) = stmt.expression.as_deref().unwrap() else {
            panic!()
        };
        assert_eq!(outer.op, "=");
        assert!(matches!(outer.right.as_ref(), Node::BinaryOp(inner) if inner.op == "="));
    }

    #[test]
    fn additive_is_left_associative() {
        let (ast, diagnostics) = parse("int main() { return 1 - 2 - 3; }");
        assert!(!diagnostics.has_errors());
        let function = first_function(&ast);
        let Node::CompoundStmt(body) = function.body.as_deref().unwrap() else {
            panic!()
        };
        let Node::ReturnStmt(ret) = &body.statements[0] else {
            panic!()
        };
        let Node::BinaryOp(top) = ret.value.as_deref().unwrap() else {
            panic!()
        };
        assert_eq!(top.op, "-");
        // left should itself be (1 - 2), i.e. (1 - 2) - 3
        assert!(matches!(top.left.as_ref(), Node::BinaryOp(inner) if inner.op == "-"));
        assert!(matches!(top.right.as_ref(), Node::Number(n) if n.value == 3));
    }

    #[test]
    fn call_on_non_identifier_is_an_error() {
        let (_ast, diagnostics) = parse("int main() { return (1)(2); }");
        assert!(diagnostics.has_errors());
        assert!(diagnostics
            .iter()
            .any(|d| d.message == "Can only call identifiers"));
    }

    #[test]
    fn panic_mode_recovers_at_next_statement() {
        let (ast, diagnostics) = parse("int main() { int x = ; return 0; }");
        assert!(diagnostics.has_errors());
        // exactly one error: recovery should swallow everything up to the
        // next synchronization point without cascading further errors.
        assert_eq!(diagnostics.len(), 1);
        let function = first_function(&ast);
        let Node::CompoundStmt(body) = function.body.as_deref().unwrap() else {
            panic!()
        };
        // the `return 0;` statement should still have been parsed.
        assert!(matches!(body.statements.last(), Some(Node::ReturnStmt(_))));
    }

    #[test]
    fn chained_unary_operators_are_allowed() {
        let (_ast, diagnostics) = parse("int main() { return !-!1; }");
        assert!(!diagnostics.has_errors());
    }

    #[test]
    fn for_loop_parses_optional_clauses() {
        let (ast, diagnostics) = parse("int main() { for (;;) { } return 0; }");
        assert!(!diagnostics.has_errors());
        let function = first_function(&ast);
        let Node::CompoundStmt(body) = function.body.as_deref().unwrap() else {
            panic!()
        };
        let Node::ForStmt(for_stmt) = &body.statements[0] else {
            panic!("expected for statement")
        };
        assert!(for_stmt.init.is_none());
        assert!(for_stmt.condition.is_none());
        assert!(for_stmt.update.is_none());
    }

    #[test]
    fn function_prototype_without_body_is_allowed() {
        let (ast, diagnostics) = parse("int foo(int x);");
        assert!(!diagnostics.has_errors());
        let function = first_function(&ast);
        assert!(function.body.is_none());
        assert_eq!(function.parameters.len(), 1);
    }
}
