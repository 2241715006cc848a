//! Code generator: type-checked AST → x86-64 System V assembly text in
//! AT&T (GAS) syntax. See spec.md §4.5. Builds each function's body into
//! an instruction buffer first, then prepends its prologue once the
//! final stack size is known, mirroring how activation-record-based
//! code generators conventionally defer the frame-size-dependent `sub`
//! until the whole body has been walked.

mod frame;
mod instr;
mod operand;
mod reg;
mod registers;
mod strings;

pub use instr::Instr;
pub use operand::{Operand, Size};
pub use reg::Reg;

use std::collections::HashMap;
use std::fmt::Write as _;

use crate::ast::{DataType, FunctionCall, Node};
use frame::Frame;
use registers::RegisterAllocator;
use strings::StringTable;

/// SysV integer/pointer argument registers, in order, for the first six
/// arguments (§9 design note 2).
const ABI_ARGS: [Reg; 6] = [Reg::Rdi, Reg::Rsi, Reg::Rdx, Reg::Rcx, Reg::R8, Reg::R9];

pub struct CodeGenerator {
    strings: StringTable,
    globals: HashMap<String, DataType>,
    label_counter: usize,
    registers: RegisterAllocator,
    frame: Frame,
    out: Vec<Instr>,
    has_main: bool,
}

impl CodeGenerator {
    pub fn new() -> Self {
        Self {
            strings: StringTable::new(),
            globals: HashMap::new(),
            label_counter: 0,
            registers: RegisterAllocator::new(),
            frame: Frame::new(""),
            out: vec![],
            has_main: false,
        }
    }

    /// Entry point: a type-checked `Node::Program` → full assembly text.
    pub fn generate(mut self, program: &Node) -> String {
        let Node::Program(program) = program else {
            panic!("generate expects a Program root");
        };

        for decl in &program.declarations {
            if let Node::VariableDecl(var) = decl {
                self.globals.insert(var.name.clone(), var.var_type);
            }
        }

        self.has_main = program.declarations.iter().any(|decl| {
            matches!(decl, Node::FunctionDecl(function) if function.name == "main" && function.body.is_some())
        });

        let mut functions = vec![];
        for decl in &program.declarations {
            if let Node::FunctionDecl(function) = decl {
                if function.body.is_some() {
                    functions.push(self.generate_function(function));
                }
            }
        }

        self.assemble(functions)
    }

    fn assemble(&self, functions: Vec<Vec<Instr>>) -> String {
        let mut out = String::new();

        if !self.globals.is_empty() {
            for name in self.globals.keys() {
                let _ = writeln!(out, "{}", Instr::Raw(format!(".lcomm {name}, 8")));
            }
        }

        let _ = writeln!(out, "{}", Instr::SectionData);
        for (value, label) in self.strings.entries() {
            let _ = writeln!(out, "{}", Instr::Asciz(label.clone(), escape(value)));
        }

        let _ = writeln!(out, "{}", Instr::SectionText);
        if self.has_main {
            let _ = writeln!(out, "{}", Instr::Global("main".to_string()));
        }
        for function in functions {
            for instr in function {
                let _ = writeln!(out, "{instr}");
            }
        }

        out
    }

    fn next_label(&mut self) -> usize {
        self.label_counter += 1;
        self.label_counter
    }

    fn push(&mut self, instr: Instr) {
        self.out.push(instr);
    }

    // ---- functions ----------------------------------------------------

    fn generate_function(&mut self, function: &crate::ast::FunctionDecl) -> Vec<Instr> {
        self.frame = Frame::new(&function.name);
        self.registers = RegisterAllocator::new();
        self.out = vec![];

        let mut param_copies = vec![];
        for (index, param) in function.parameters.iter().enumerate() {
            let Node::Parameter(param) = param else {
                unreachable!("function parameters are always Parameter nodes");
            };
            let offset = self.frame.allocate(&param.name, param.param_type);
            if index < ABI_ARGS.len() {
                let size = Size::from_bytes(param.param_type.size());
                param_copies.push(Instr::Mov(
                    size,
                    Operand::reg(ABI_ARGS[index], size),
                    Operand::Mem(offset),
                ));
            }
            // Parameters beyond the first six would need stack-slot
            // arguments at the call site; out of scope here (§9 note 2
            // only covers the register-passed first six).
        }

        let body = function
            .body
            .as_deref()
            .expect("generate_function is only called on functions with a body");
        self.generate_stmt(body);

        let body_instrs = std::mem::take(&mut self.out);

        let mut instrs = vec![Instr::Label(function.name.clone())];
        instrs.push(Instr::Raw("pushq %rbp".to_string()));
        instrs.push(Instr::Raw("movq %rsp, %rbp".to_string()));
        let aligned = self.frame.aligned_stack_size();
        if aligned > 0 {
            instrs.push(Instr::Raw(format!("subq ${aligned}, %rsp")));
        }
        instrs.extend(param_copies);
        instrs.extend(body_instrs);
        instrs.push(Instr::Label(".Lreturn".to_string()));
        if function.return_type == DataType::Void {
            instrs.push(Instr::Mov(Size::Q, Operand::Imm(0), Operand::reg(Reg::Rax, Size::Q)));
        }
        instrs.push(Instr::Raw("movq %rbp, %rsp".to_string()));
        instrs.push(Instr::Raw("popq %rbp".to_string()));
        instrs.push(Instr::Ret);
        instrs
    }

    // ---- statements -----------------------------------------------

    fn generate_stmt(&mut self, node: &Node) {
        match node {
            Node::CompoundStmt(block) => {
                for stmt in &block.statements {
                    self.generate_stmt(stmt);
                }
            }
            Node::VariableDecl(var) => {
                let offset = self.frame.allocate(&var.name, var.var_type);
                if let Some(init) = &var.initializer {
                    let value = self.generate_expr(init);
                    self.store(offset, var.var_type, value);
                    self.registers.free(value);
                }
            }
            Node::IfStmt(if_stmt) => {
                let label = self.next_label();
                let else_label = format!(".Lelse{label}");
                let end_label = format!(".Lendif{label}");
                let target = if if_stmt.else_branch.is_some() {
                    &else_label
                } else {
                    &end_label
                };

                let cond = self.generate_expr(&if_stmt.condition);
                self.push(Instr::Testq(
                    Operand::reg(cond, Size::Q),
                    Operand::reg(cond, Size::Q),
                ));
                self.registers.free(cond);
                self.push(Instr::Jz(target.clone()));

                self.generate_stmt(&if_stmt.then_branch);

                if let Some(else_branch) = &if_stmt.else_branch {
                    self.push(Instr::Jmp(end_label.clone()));
                    self.push(Instr::Label(else_label));
                    self.generate_stmt(else_branch);
                }
                self.push(Instr::Label(end_label));
            }
            Node::WhileStmt(while_stmt) => {
                let label = self.next_label();
                let while_label = format!(".Lwhile{label}");
                let end_label = format!(".Lendwhile{label}");

                self.push(Instr::Label(while_label.clone()));
                let cond = self.generate_expr(&while_stmt.condition);
                self.push(Instr::Testq(
                    Operand::reg(cond, Size::Q),
                    Operand::reg(cond, Size::Q),
                ));
                self.registers.free(cond);
                self.push(Instr::Jz(end_label.clone()));

                self.generate_stmt(&while_stmt.body);
                self.push(Instr::Jmp(while_label));
                self.push(Instr::Label(end_label));
            }
            Node::ForStmt(for_stmt) => {
                let label = self.next_label();
                let for_label = format!(".Lfor{label}");
                let update_label = format!(".Lforupdate{label}");
                let end_label = format!(".Lendfor{label}");

                if let Some(init) = &for_stmt.init {
                    self.generate_stmt(init);
                }
                self.push(Instr::Label(for_label.clone()));
                if let Some(condition) = &for_stmt.condition {
                    let cond = self.generate_expr(condition);
                    self.push(Instr::Testq(
                        Operand::reg(cond, Size::Q),
                        Operand::reg(cond, Size::Q),
                    ));
                    self.registers.free(cond);
                    self.push(Instr::Jz(end_label.clone()));
                }
                self.generate_stmt(&for_stmt.body);
                self.push(Instr::Label(update_label));
                if let Some(update) = &for_stmt.update {
                    let value = self.generate_expr(update);
                    self.registers.free(value);
                }
                self.push(Instr::Jmp(for_label));
                self.push(Instr::Label(end_label));
            }
            Node::ReturnStmt(return_stmt) => {
                if let Some(value) = &return_stmt.value {
                    let reg = self.generate_expr(value);
                    if reg != Reg::Rax {
                        self.push(Instr::Mov(
                            Size::Q,
                            Operand::reg(reg, Size::Q),
                            Operand::reg(Reg::Rax, Size::Q),
                        ));
                    }
                    self.registers.free(reg);
                }
                self.push(Instr::Jmp(".Lreturn".to_string()));
            }
            Node::ExpressionStmt(stmt) => {
                if let Some(expression) = &stmt.expression {
                    let reg = self.generate_expr(expression);
                    self.registers.free(reg);
                }
            }
            _ => unreachable!("not a statement node"),
        }
    }

    /// Store `value` (a full 64-bit-width register) into the slot at
    /// `offset`, truncated to `data_type`'s width per §4.5's assignment
    /// rule (`mov<sfx> %R<size>, off(%rbp)`).
    fn store(&mut self, offset: i64, data_type: DataType, value: Reg) {
        let size = Size::from_bytes(data_type.size());
        self.push(Instr::Mov(size, Operand::reg(value, size), Operand::Mem(offset)));
    }

    fn store_global(&mut self, name: &str, data_type: DataType, value: Reg) {
        let size = Size::from_bytes(data_type.size());
        self.push(Instr::Mov(
            size,
            Operand::reg(value, size),
            Operand::GlobalMem(name.to_string()),
        ));
    }

    // ---- expressions --------------------------------------------------

    /// Lowers an expression, returning the pseudo-register holding its
    /// result (always a full 64-bit value; loads widen on the way in).
    fn generate_expr(&mut self, node: &Node) -> Reg {
        match node {
            Node::Number(number) => {
                let reg = self.registers.allocate();
                self.push(Instr::Mov(
                    Size::Q,
                    Operand::Imm(number.value as i64),
                    Operand::reg(reg, Size::Q),
                ));
                reg
            }
            Node::String(string) => {
                let label = self.strings.intern(&string.value);
                let reg = self.registers.allocate();
                self.push(Instr::Mov(
                    Size::Q,
                    Operand::LabelRef(label),
                    Operand::reg(reg, Size::Q),
                ));
                reg
            }
            Node::Identifier(identifier) => self.load_identifier(&identifier.name),
            Node::BinaryOp(binary) if binary.op == "=" => {
                let value = self.generate_expr(&binary.right);
                if let Node::Identifier(target) = binary.left.as_ref() {
                    self.store_variable(&target.name, target.data_type, value);
                }
                // else: non-identifier assignment target — parser/sema
                // already reported "Can only call identifiers" or type
                // errors upstream for malformed programs; well-typed
                // programs never reach this branch with a non-identifier
                // left-hand side at codegen time.
                value
            }
            Node::BinaryOp(binary) => self.generate_binary(binary),
            Node::UnaryOp(unary) => self.generate_unary(unary),
            Node::FunctionCall(call) => self.generate_call(call),
            _ => unreachable!("not an expression node"),
        }
    }

    fn load_identifier(&mut self, name: &str) -> Reg {
        let reg = self.registers.allocate();
        if let Some(local) = self.frame.lookup(name) {
            match local.data_type {
                DataType::Char => {
                    self.push(Instr::Movsbl(
                        Operand::Mem(local.offset),
                        Operand::reg(reg, Size::D),
                    ));
                }
                DataType::Int => {
                    self.push(Instr::Mov(
                        Size::D,
                        Operand::Mem(local.offset),
                        Operand::reg(reg, Size::D),
                    ));
                }
                DataType::CharPtr | DataType::Void => {
                    self.push(Instr::Mov(
                        Size::Q,
                        Operand::Mem(local.offset),
                        Operand::reg(reg, Size::Q),
                    ));
                }
            }
        } else if let Some(&data_type) = self.globals.get(name) {
            let size = Size::from_bytes(data_type.size());
            self.push(Instr::Mov(
                size,
                Operand::GlobalMem(name.to_string()),
                Operand::reg(reg, size),
            ));
        }
        // A name that resolves to neither a local nor a global is a
        // function reference used as a value; semantic analysis already
        // typed it, but there is no storage to load from, so it reads
        // as zero.
        reg
    }

    fn store_variable(&mut self, name: &str, data_type: DataType, value: Reg) {
        if let Some(local) = self.frame.lookup(name) {
            self.store(local.offset, local.data_type, value);
        } else if self.globals.contains_key(name) {
            self.store_global(name, data_type, value);
        }
    }

    fn generate_binary(&mut self, binary: &crate::ast::BinaryOp) -> Reg {
        if binary.op == "/" || binary.op == "%" {
            let left = self.generate_expr(&binary.left);
            let right = self.generate_expr(&binary.right);
            return self.generate_div_mod(&binary.op, left, right);
        }

        let left = self.generate_expr(&binary.left);
        let right = self.generate_expr(&binary.right);
        let l = Operand::reg(left, Size::Q);
        let r = Operand::reg(right, Size::Q);

        match binary.op.as_str() {
            "+" => self.push(Instr::Addq(r.clone(), l.clone())),
            "-" => self.push(Instr::Subq(r.clone(), l.clone())),
            "*" => self.push(Instr::Imulq(r.clone(), l.clone())),
            "<" | "<=" | ">" | ">=" | "==" | "!=" => {
                self.push(Instr::Cmpq(r.clone(), l.clone()));
                let lb = Operand::reg(left, Size::B);
                let ld = Operand::reg(left, Size::D);
                match binary.op.as_str() {
                    "<" => self.push(Instr::Setl(lb)),
                    "<=" => self.push(Instr::Setle(lb)),
                    ">" => self.push(Instr::Setg(lb)),
                    ">=" => self.push(Instr::Setge(lb)),
                    "==" => self.push(Instr::Sete(lb)),
                    _ => self.push(Instr::Setne(lb)),
                }
                self.push(Instr::Movzbl(Operand::reg(left, Size::B), ld));
            }
            "&&" => {
                // Bitwise AND on raw values is wrong when both operands
                // are truthy but share no set bits (e.g. 5 && 2); each
                // side is normalized to 0/1 first.
                self.normalize_bool(left);
                self.normalize_bool(right);
                self.push(Instr::Andq(r, l));
            }
            "||" => {
                // Bitwise OR is zero iff both operands are zero, so a
                // single normalization at the end suffices here.
                self.push(Instr::Orq(r, l));
                self.normalize_bool(left);
            }
            other => unreachable!("unhandled binary operator '{other}'"),
        }

        self.registers.free(right);
        left
    }

    fn normalize_bool(&mut self, reg: Reg) {
        self.push(Instr::Testq(Operand::reg(reg, Size::Q), Operand::reg(reg, Size::Q)));
        self.push(Instr::Setne(Operand::reg(reg, Size::B)));
        self.push(Instr::Movzbl(Operand::reg(reg, Size::B), Operand::reg(reg, Size::D)));
    }

    /// `/` and `%` need `%rax`/`%rdx` for `cqto`/`idivq`; neither operand
    /// register may already be one of those without care (§9 note 2's
    /// spirit — implement the operator fully rather than leave it
    /// silently wrong, per design note 1).
    fn generate_div_mod(&mut self, op: &str, left: Reg, right: Reg) -> Reg {
        use Reg::{Rax, Rdx};

        let divisor = if right == Rax || right == Rdx {
            let scratch = self.registers.allocate();
            self.push(Instr::Mov(
                Size::Q,
                Operand::reg(right, Size::Q),
                Operand::reg(scratch, Size::Q),
            ));
            scratch
        } else {
            right
        };

        let save_rax = left != Rax && divisor != Rax;
        let save_rdx = left != Rdx && divisor != Rdx;
        if save_rax {
            self.push(Instr::Pushq(Rax));
        }
        if save_rdx {
            self.push(Instr::Pushq(Rdx));
        }

        if left != Rax {
            self.push(Instr::Mov(Size::Q, Operand::reg(left, Size::Q), Operand::reg(Rax, Size::Q)));
        }
        self.push(Instr::Cqto);
        self.push(Instr::Idivq(Operand::reg(divisor, Size::Q)));

        let result_source = if op == "/" { Rax } else { Rdx };
        if left != result_source {
            self.push(Instr::Mov(
                Size::Q,
                Operand::reg(result_source, Size::Q),
                Operand::reg(left, Size::Q),
            ));
        }

        if save_rdx {
            self.push(Instr::Popq(Rdx));
        }
        if save_rax {
            self.push(Instr::Popq(Rax));
        }

        if divisor != right {
            self.registers.free(divisor);
        }
        self.registers.free(right);
        left
    }

    fn generate_unary(&mut self, unary: &crate::ast::UnaryOp) -> Reg {
        let operand = self.generate_expr(&unary.operand);
        match unary.op.as_str() {
            "-" => self.push(Instr::Negq(Operand::reg(operand, Size::Q))),
            "!" => {
                self.push(Instr::Testq(
                    Operand::reg(operand, Size::Q),
                    Operand::reg(operand, Size::Q),
                ));
                self.push(Instr::Sete(Operand::reg(operand, Size::B)));
                self.push(Instr::Movzbl(
                    Operand::reg(operand, Size::B),
                    Operand::reg(operand, Size::D),
                ));
            }
            "+" => {}
            other => unreachable!("unhandled unary operator '{other}'"),
        }
        operand
    }

    fn generate_call(&mut self, call: &FunctionCall) -> Reg {
        let Node::Identifier(callee) = call.callee.as_ref() else {
            // Parser/sema already reported this program as malformed;
            // still generate the arguments' side effects and a call to
            // nothing meaningful is unreachable for well-typed input.
            for argument in &call.arguments {
                let reg = self.generate_expr(argument);
                self.registers.free(reg);
            }
            return self.registers.allocate();
        };

        // Every pool register already holding a value from an enclosing
        // expression (e.g. the left operand of `n * fact(n - 1)`) is a
        // real physical register, and `generate_function` hands the
        // callee a fresh `RegisterAllocator` that starts all eight free
        // — the callee may clobber any of them for its own parameter
        // copy-in or locals. Caller-save them around the call.
        let live = self.registers.in_use();
        for &reg in &live {
            self.push(Instr::Pushq(reg));
        }

        let mut pushed = 0usize;
        for (index, argument) in call.arguments.iter().enumerate() {
            let reg = self.generate_expr(argument);
            if index < ABI_ARGS.len() {
                self.push(Instr::Pushq(reg));
                pushed += 1;
            } else if index == ABI_ARGS.len() {
                self.push(Instr::Comment(format!(
                    "arguments beyond the sixth are not passed to '{}' (not supported)",
                    callee.name
                )));
            }
            self.registers.free(reg);
        }
        for index in 0..pushed {
            let slot = pushed - index - 1;
            self.push(Instr::Popq(ABI_ARGS[slot]));
        }

        self.push(Instr::Call(callee.name.clone()));

        let result = self.registers.allocate();
        if result != Reg::Rax {
            self.push(Instr::Mov(
                Size::Q,
                Operand::reg(Reg::Rax, Size::Q),
                Operand::reg(result, Size::Q),
            ));
        }

        // Restore the caller-saved registers after pulling the return
        // value out of %rax, so a saved %rax (if any) doesn't clobber
        // `result` before it's read.
        for &reg in live.iter().rev() {
            self.push(Instr::Popq(reg));
        }

        result
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Escapes a raw string-literal value for embedding in a GAS `.asciz`
/// directive. The lexer preserves backslash escape pairs verbatim, so
/// only the characters that would break the surrounding quotes need
/// attention here.
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
