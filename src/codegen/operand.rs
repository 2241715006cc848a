use std::fmt::{self, Display};

use super::reg::Reg;

/// Operand width, driving both the register sub-name (`%eax` vs `%al`)
/// and the instruction mnemonic suffix (`movl` vs `movb`) used by AT&T
/// syntax. Mirrors `DataType::size()` (§4.5: INT→4, CHAR→1, CHAR_PTR→8).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Q,
    D,
    B,
}

impl Size {
    pub fn suffix(self) -> char {
        match self {
            Size::Q => 'q',
            Size::D => 'l',
            Size::B => 'b',
        }
    }

    pub fn from_bytes(bytes: usize) -> Self {
        match bytes {
            1 => Size::B,
            4 => Size::D,
            _ => Size::Q,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Operand {
    Reg(Reg, Size),
    Imm(i64),
    /// Stack slot at `offset(%rbp)`; `offset` is negative for locals.
    Mem(i64),
    /// A string-literal label used as an immediate, e.g. `$.LC0`.
    LabelRef(String),
    /// A global variable's storage, addressed RIP-relative.
    GlobalMem(String),
}

impl Operand {
    pub fn reg(reg: Reg, size: Size) -> Self {
        Operand::Reg(reg, size)
    }
}

impl Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Reg(reg, size) => {
                let name = match size {
                    Size::Q => reg.q(),
                    Size::D => reg.d(),
                    Size::B => reg.b(),
                };
                write!(f, "%{name}")
            }
            Operand::Imm(value) => write!(f, "${value}"),
            Operand::Mem(offset) => write!(f, "{offset}(%rbp)"),
            Operand::LabelRef(label) => write!(f, "${label}"),
            Operand::GlobalMem(name) => write!(f, "{name}(%rip)"),
        }
    }
}
