use super::{DataType, Node, Position};

/// `IDENTIFIER '(' args ')'`. The grammar only allows a call suffix on an
/// identifier primary (§4.2); `callee` is always a `Node::Identifier`
/// once parsing succeeds.
#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub callee: Box<Node>,
    pub arguments: Vec<Node>,
    pub data_type: DataType,
    pub position: Position,
}
