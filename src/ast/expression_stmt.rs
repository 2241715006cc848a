use super::{Node, Position};

/// `expression? ';'`. A bare `;` is a no-op statement (`expression` is
/// `None`).
#[derive(Debug, Clone)]
pub struct ExpressionStmt {
    pub expression: Option<Box<Node>>,
    pub position: Position,
}
