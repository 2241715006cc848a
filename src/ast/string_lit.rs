use super::Position;

/// A string literal, holding the raw (unescaped) character sequence from
/// the source, exactly as the lexer preserved it. Always typed `CHAR_PTR`.
#[derive(Debug, Clone)]
pub struct StringLit {
    pub value: String,
    pub position: Position,
}
