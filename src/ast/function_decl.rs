use super::{DataType, Node, Position};

/// A function declaration or definition. `body` is `None` for a
/// prototype (`function_tail := '(' param_list? ')' ';'`) and `Some`
/// (holding a `Node::CompoundStmt`) for a definition.
#[derive(Debug, Clone)]
pub struct FunctionDecl {
    pub name: String,
    pub return_type: DataType,
    pub parameters: Vec<Node>,
    pub body: Option<Box<Node>>,
    pub position: Position,
}
