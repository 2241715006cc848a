use std::fmt::{self, Display};

/// The pseudo-register pool the expression evaluator allocates from
/// (§4.5: "RAX..R9"). `Rax` is index 0 so the "falls back to RAX when all
/// eight are in use" rule coincides with lowest-index allocation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
    Rax,
    Rcx,
    Rdx,
    Rbx,
    Rsi,
    Rdi,
    R8,
    R9,
}

impl Reg {
    pub const POOL: [Reg; 8] = [
        Reg::Rax,
        Reg::Rcx,
        Reg::Rdx,
        Reg::Rbx,
        Reg::Rsi,
        Reg::Rdi,
        Reg::R8,
        Reg::R9,
    ];

    fn index(self) -> usize {
        Self::POOL.iter().position(|&r| r == self).unwrap()
    }

    /// 8-byte form, e.g. `%rax`.
    pub fn q(self) -> &'static str {
        const NAMES: [&str; 8] = ["rax", "rcx", "rdx", "rbx", "rsi", "rdi", "r8", "r9"];
        NAMES[self.index()]
    }

    /// 4-byte form, e.g. `%eax`.
    pub fn d(self) -> &'static str {
        const NAMES: [&str; 8] = ["eax", "ecx", "edx", "ebx", "esi", "edi", "r8d", "r9d"];
        NAMES[self.index()]
    }

    /// 1-byte form, e.g. `%al`.
    pub fn b(self) -> &'static str {
        const NAMES: [&str; 8] = ["al", "cl", "dl", "bl", "sil", "dil", "r8b", "r9b"];
        NAMES[self.index()]
    }
}

impl Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.q())
    }
}
