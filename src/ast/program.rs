use super::Node;

/// The root of every TinyC AST: an ordered sequence of top-level
/// declarations (function or variable declarations), per the grammar's
/// `program := declaration*`.
#[derive(Debug, Clone)]
pub struct Program {
    pub declarations: Vec<Node>,
}
