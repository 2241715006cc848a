use super::{DataType, Node, Position};

/// `type IDENTIFIER ('=' expression)? ';'` — a local or global variable
/// declaration. `initializer` is `None` when the declaration has no `=`.
#[derive(Debug, Clone)]
pub struct VariableDecl {
    pub name: String,
    pub var_type: DataType,
    pub initializer: Option<Box<Node>>,
    pub position: Position,
}
