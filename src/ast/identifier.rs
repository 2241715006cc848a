use super::{DataType, Position};

/// A name reference. `data_type` is filled in by semantic analysis from
/// the symbol the name resolves to.
#[derive(Debug, Clone)]
pub struct Identifier {
    pub name: String,
    pub data_type: DataType,
    pub position: Position,
}
