use std::fmt::{self, Display};

use super::operand::{Operand, Size};
use super::reg::Reg;

/// One line of emitted assembly. AT&T operand order (`src, dst`), per
/// spec.md §4.5.
#[derive(Debug, Clone)]
pub enum Instr {
    Comment(String),
    Label(String),
    Global(String),
    SectionData,
    SectionText,
    /// `.LCk: .asciz "..."` — a string literal's data definition.
    Asciz(String, String),

    Pushq(Reg),
    Popq(Reg),

    Mov(Size, Operand, Operand),
    Movzbl(Operand, Operand),
    Movsbl(Operand, Operand),

    Addq(Operand, Operand),
    Subq(Operand, Operand),
    Imulq(Operand, Operand),
    Andq(Operand, Operand),
    Orq(Operand, Operand),
    Negq(Operand),

    Cmpq(Operand, Operand),
    Testq(Operand, Operand),
    Setl(Operand),
    Setle(Operand),
    Setg(Operand),
    Setge(Operand),
    Sete(Operand),
    Setne(Operand),

    Cqto,
    Idivq(Operand),

    Jmp(String),
    Jz(String),

    Call(String),
    Ret,

    /// Escape hatch for the handful of prologue/epilogue lines that name
    /// `%rbp`/`%rsp` directly — those aren't in the pseudo-register pool.
    Raw(String),
}

impl Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Comment(text) => write!(f, "\t# {text}"),
            Instr::Label(label) => write!(f, "{label}:"),
            Instr::Global(name) => write!(f, "\t.global {name}"),
            Instr::SectionData => write!(f, "\t.section .data"),
            Instr::SectionText => write!(f, "\t.section .text"),
            Instr::Asciz(label, escaped) => write!(f, "{label}:\n\t.asciz \"{escaped}\""),

            Instr::Pushq(reg) => write!(f, "\tpushq\t{reg}"),
            Instr::Popq(reg) => write!(f, "\tpopq\t{reg}"),

            Instr::Mov(size, src, dst) => write!(f, "\tmov{}\t{src}, {dst}", size.suffix()),
            Instr::Movzbl(src, dst) => write!(f, "\tmovzbl\t{src}, {dst}"),
            Instr::Movsbl(src, dst) => write!(f, "\tmovsbl\t{src}, {dst}"),

            Instr::Addq(src, dst) => write!(f, "\taddq\t{src}, {dst}"),
            Instr::Subq(src, dst) => write!(f, "\tsubq\t{src}, {dst}"),
            Instr::Imulq(src, dst) => write!(f, "\timulq\t{src}, {dst}"),
            Instr::Andq(src, dst) => write!(f, "\tandq\t{src}, {dst}"),
            Instr::Orq(src, dst) => write!(f, "\torq\t{src}, {dst}"),
            Instr::Negq(dst) => write!(f, "\tnegq\t{dst}"),

            Instr::Cmpq(src, dst) => write!(f, "\tcmpq\t{src}, {dst}"),
            Instr::Testq(a, b) => write!(f, "\ttestq\t{a}, {b}"),
            Instr::Setl(dst) => write!(f, "\tsetl\t{dst}"),
            Instr::Setle(dst) => write!(f, "\tsetle\t{dst}"),
            Instr::Setg(dst) => write!(f, "\tsetg\t{dst}"),
            Instr::Setge(dst) => write!(f, "\tsetge\t{dst}"),
            Instr::Sete(dst) => write!(f, "\tsete\t{dst}"),
            Instr::Setne(dst) => write!(f, "\tsetne\t{dst}"),

            Instr::Cqto => write!(f, "\tcqto"),
            Instr::Idivq(divisor) => write!(f, "\tidivq\t{divisor}"),

            Instr::Jmp(label) => write!(f, "\tjmp\t{label}"),
            Instr::Jz(label) => write!(f, "\tjz\t{label}"),

            Instr::Call(name) => write!(f, "\tcall\t{name}"),
            Instr::Ret => write!(f, "\tret"),
            Instr::Raw(text) => write!(f, "\t{text}"),
        }
    }
}
