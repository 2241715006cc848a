use super::{Node, Position};

/// `'if' '(' expression ')' statement ('else' statement)?`. Does not push
/// a scope of its own — only its (usually compound) branches do.
#[derive(Debug, Clone)]
pub struct IfStmt {
    pub condition: Box<Node>,
    pub then_branch: Box<Node>,
    pub else_branch: Option<Box<Node>>,
    pub position: Position,
}
