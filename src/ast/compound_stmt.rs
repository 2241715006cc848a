use super::{Node, Position};

/// `'{' statement* '}'`. Pushes its own lexical scope (§4.4 scope policy).
#[derive(Debug, Clone)]
pub struct CompoundStmt {
    pub statements: Vec<Node>,
    pub position: Position,
}
