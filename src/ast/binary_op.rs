use super::{DataType, Node, Position};

/// A binary operator application, including assignment (`=`) — the
/// textual operator is stored as-is (e.g. `"=="`, `"&&"`) and consulted
/// by semantic analysis and codegen (§4.2's "Operator representation").
#[derive(Debug, Clone)]
pub struct BinaryOp {
    pub op: String,
    pub left: Box<Node>,
    pub right: Box<Node>,
    pub data_type: DataType,
    pub position: Position,
}
