use super::{Node, Position};

/// `'return' expression? ';'`. `value` is `None` iff the enclosing
/// function returns `void`.
#[derive(Debug, Clone)]
pub struct ReturnStmt {
    pub value: Option<Box<Node>>,
    pub position: Position,
}
