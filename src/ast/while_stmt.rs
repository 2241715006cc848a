use super::{Node, Position};

/// `'while' '(' expression ')' statement`. Like `if`, does not push its
/// own scope.
#[derive(Debug, Clone)]
pub struct WhileStmt {
    pub condition: Box<Node>,
    pub body: Box<Node>,
    pub position: Position,
}
