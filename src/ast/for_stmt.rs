use super::{Node, Position};

/// `'for' '(' (var_decl | expression_stmt) expression? ';' expression? ')' statement`.
/// `init` may be absent, a `Node::VariableDecl`, or a `Node::ExpressionStmt`.
/// `condition` and `update` may both be absent. Pushes its own scope so
/// `init`'s declaration is visible only to this loop (§4.4).
#[derive(Debug, Clone)]
pub struct ForStmt {
    pub init: Option<Box<Node>>,
    pub condition: Option<Box<Node>>,
    pub update: Option<Box<Node>>,
    pub body: Box<Node>,
    pub position: Position,
}
