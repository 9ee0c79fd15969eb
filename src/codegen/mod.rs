//! Assembly emission.
//!
//! [generate] renders an [IrModule] as one GNU AT&T-syntax x86-64 text. The
//! output starts with a fixed header, then one block per function in module
//! order, then the interned string literals (`.rodata`) and global variable
//! definitions (`.data`) when present.
//!
//! Every value lives in an 8-byte stack slot addressed off `%rbp`; there is
//! no register allocation. Each function body is rendered into a buffer
//! first so the prologue can reserve the exact frame the body ended up
//! needing (never less than the conservative `8 * (temps + 16)` estimate),
//! rounded to 16 bytes to keep calls ABI-aligned.

mod stack;

use crate::ir::{BinaryOp, Identifier, Instruction, IrFunction, IrModule, LabelId, Value};
use stack::{Home, StackAllocator};
use std::collections::{BTreeMap, HashMap};
use std::fmt::{self, Write};

/// System V AMD64 integer argument registers, in order.
const ARG_REGISTERS: [&str; 6] = ["%rdi", "%rsi", "%rdx", "%rcx", "%r8", "%r9"];

pub fn generate(module: &IrModule) -> String {
    Asm(module).to_string()
}

struct Asm<'a>(&'a IrModule);

impl fmt::Display for Asm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let module = self.0;
        write!(f, ".text\n.global main\n\n")?;

        let mut pool = StringPool::new();
        for func in &module.functions {
            emit_function(f, func, &module.global_vars, &mut pool)?;
        }

        pool.emit(f)?;
        emit_globals(f, &module.global_vars)?;
        Ok(())
    }
}

fn emit_function(
    f: &mut fmt::Formatter,
    func: &IrFunction,
    globals: &BTreeMap<Identifier, i64>,
    pool: &mut StringPool,
) -> fmt::Result {
    let mut frame = Frame {
        func,
        globals,
        stack: StackAllocator::new(),
        pending_args: Vec::new(),
    };

    let mut body = String::new();
    for inst in &func.instructions {
        writeln!(body, "    # {inst}")?;
        frame.emit(&mut body, inst, pool)?;
    }

    writeln!(f, "{}:", func.name)?;
    writeln!(f, "    pushq %rbp")?;
    writeln!(f, "    movq %rsp, %rbp")?;
    writeln!(f, "    subq ${}, %rsp", frame.size())?;
    f.write_str(&body)?;
    // functions without an explicit trailing return still return cleanly
    emit_epilogue(f)?;
    writeln!(f)
}

fn emit_epilogue(out: &mut impl Write) -> fmt::Result {
    writeln!(out, "    movq %rbp, %rsp")?;
    writeln!(out, "    popq %rbp")?;
    writeln!(out, "    ret")
}

fn condition_code(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Eq => "e",
        BinaryOp::Ne => "ne",
        BinaryOp::Lt => "l",
        BinaryOp::Le => "le",
        BinaryOp::Gt => "g",
        BinaryOp::Ge => "ge",
        _ => unreachable!("not a comparison"),
    }
}

struct Frame<'a> {
    func: &'a IrFunction,
    globals: &'a BTreeMap<Identifier, i64>,
    stack: StackAllocator,
    pending_args: Vec<Value>,
}

impl Frame<'_> {
    /// IR labels are function-local, so the emitted names carry the function
    /// name to stay unique across the whole output.
    fn label(&self, id: LabelId) -> String {
        format!(".L{}_{}", self.func.name, id)
    }

    fn size(&self) -> i64 {
        let conservative = 8 * (i64::from(self.func.temp_counter) + 16);
        let size = conservative.max(self.stack.used_bytes());
        (size + 15) / 16 * 16
    }

    /// Loads an operand into `reg`: immediates directly, slotted values from
    /// their slot, unslotted names from the global `name(%rip)`.
    fn load(&self, out: &mut String, value: &Value, reg: &str) -> fmt::Result {
        match value {
            Value::Const(v) => writeln!(out, "    movq ${v}, {reg}"),
            _ => match self.stack.slot_of(value) {
                Some(offset) => writeln!(out, "    movq -{offset}(%rbp), {reg}"),
                None => match value {
                    Value::Var(name) => writeln!(out, "    movq {name}(%rip), {reg}"),
                    // a temp read before any write; nothing meaningful to load
                    _ => writeln!(out, "    movq $0, {reg}"),
                },
            },
        }
    }

    /// Stores `%rax` into a freshly assigned (or reused) slot for `dst`.
    fn store_result(&mut self, out: &mut String, dst: &Value) -> fmt::Result {
        if let Some(home) = Home::of(dst) {
            let offset = self.stack.allocate(home);
            writeln!(out, "    movq %rax, -{offset}(%rbp)")?;
        }
        Ok(())
    }

    fn emit(&mut self, out: &mut String, inst: &Instruction, pool: &mut StringPool) -> fmt::Result {
        match inst {
            Instruction::Copy { dst, src } => {
                self.load(out, src, "%rax")?;
                self.store_result(out, dst)
            }
            Instruction::StringConst { dst, value } => {
                let label = pool.intern(value);
                writeln!(out, "    leaq {label}(%rip), %rax")?;
                self.store_result(out, dst)
            }
            Instruction::Load { dst, src } => {
                match self.stack.get(&Home::Var(src.clone())) {
                    Some(offset) => writeln!(out, "    movq -{offset}(%rbp), %rax")?,
                    None => writeln!(out, "    movq {src}(%rip), %rax")?,
                }
                self.store_result(out, dst)
            }
            Instruction::LoadIndex { dst, base, index } => {
                self.load(out, index, "%rax")?;
                match self.stack.get(&Home::Var(base.clone())) {
                    Some(offset) => writeln!(out, "    leaq -{offset}(%rbp), %rcx")?,
                    None => writeln!(out, "    leaq {base}(%rip), %rcx")?,
                }
                writeln!(out, "    movq (%rcx,%rax,8), %rax")?;
                self.store_result(out, dst)
            }
            Instruction::Store { dst, src } => {
                self.load(out, src, "%rax")?;
                if let Some(offset) = self.stack.get(&Home::Var(dst.clone())) {
                    writeln!(out, "    movq %rax, -{offset}(%rbp)")
                } else if self.globals.contains_key(dst) {
                    writeln!(out, "    movq %rax, {dst}(%rip)")
                } else {
                    let offset = self.stack.allocate(Home::Var(dst.clone()));
                    writeln!(out, "    movq %rax, -{offset}(%rbp)")
                }
            }
            Instruction::Binary { op, dst, lhs, rhs } => self.emit_binary(out, *op, dst, lhs, rhs),
            Instruction::Not { dst, src } => {
                self.load(out, src, "%rax")?;
                writeln!(out, "    cmpq $0, %rax")?;
                writeln!(out, "    sete %al")?;
                writeln!(out, "    movzbq %al, %rax")?;
                self.store_result(out, dst)
            }
            Instruction::Label(id) => writeln!(out, "{}:", self.label(*id)),
            Instruction::Jump(id) => writeln!(out, "    jmp {}", self.label(*id)),
            Instruction::Branch {
                cond,
                if_true,
                if_false,
            } => {
                self.load(out, cond, "%rax")?;
                writeln!(out, "    cmpq $0, %rax")?;
                writeln!(out, "    jne {}", self.label(*if_true))?;
                writeln!(out, "    jmp {}", self.label(*if_false))
            }
            Instruction::Return(value) => {
                if let Some(value) = value {
                    self.load(out, value, "%rax")?;
                }
                emit_epilogue(out)
            }
            Instruction::Param(value) => {
                // arguments are materialized at the call site
                self.pending_args.push(value.clone());
                Ok(())
            }
            Instruction::Call { dst, name } => self.emit_call(out, dst, name),
            Instruction::Alloc { name, size } => {
                self.stack.allocate_sized(Home::Var(name.clone()), *size);
                Ok(())
            }
        }
    }

    fn emit_binary(
        &mut self,
        out: &mut String,
        op: BinaryOp,
        dst: &Value,
        lhs: &Value,
        rhs: &Value,
    ) -> fmt::Result {
        match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
                let mnemonic = match op {
                    BinaryOp::Add => "addq",
                    BinaryOp::Sub => "subq",
                    _ => "imulq",
                };
                self.load(out, lhs, "%rax")?;
                self.load(out, rhs, "%rbx")?;
                writeln!(out, "    {mnemonic} %rbx, %rax")?;
                self.store_result(out, dst)
            }
            BinaryOp::Div | BinaryOp::Mod => {
                self.load(out, lhs, "%rax")?;
                writeln!(out, "    cqto")?;
                self.load(out, rhs, "%rbx")?;
                writeln!(out, "    idivq %rbx")?;
                if op == BinaryOp::Mod {
                    writeln!(out, "    movq %rdx, %rax")?;
                }
                self.store_result(out, dst)
            }
            BinaryOp::Eq
            | BinaryOp::Ne
            | BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge => {
                self.load(out, lhs, "%rax")?;
                self.load(out, rhs, "%rbx")?;
                writeln!(out, "    cmpq %rbx, %rax")?;
                writeln!(out, "    set{} %al", condition_code(op))?;
                writeln!(out, "    movzbq %al, %rax")?;
                self.store_result(out, dst)
            }
            BinaryOp::And | BinaryOp::Or => {
                let mnemonic = if op == BinaryOp::And { "andq" } else { "orq" };
                // both sides are normalized to 0/1 first; no short-circuit
                self.load(out, lhs, "%rax")?;
                writeln!(out, "    cmpq $0, %rax")?;
                writeln!(out, "    setne %al")?;
                writeln!(out, "    movzbq %al, %rax")?;
                writeln!(out, "    movq %rax, %rcx")?;
                self.load(out, rhs, "%rax")?;
                writeln!(out, "    cmpq $0, %rax")?;
                writeln!(out, "    setne %al")?;
                writeln!(out, "    movzbq %al, %rax")?;
                writeln!(out, "    {mnemonic} %rcx, %rax")?;
                self.store_result(out, dst)
            }
        }
    }

    fn emit_call(&mut self, out: &mut String, dst: &Value, name: &str) -> fmt::Result {
        let args = std::mem::take(&mut self.pending_args);
        let stack_args = args.len().saturating_sub(ARG_REGISTERS.len());
        // odd number of pushed arguments would leave %rsp misaligned
        let padding = (stack_args % 2) * 8;
        if padding != 0 {
            writeln!(out, "    subq ${padding}, %rsp")?;
        }

        for (arg, reg) in args.iter().zip(ARG_REGISTERS) {
            self.load(out, arg, reg)?;
        }
        for arg in args.iter().skip(ARG_REGISTERS.len()).rev() {
            self.load(out, arg, "%rax")?;
            writeln!(out, "    pushq %rax")?;
        }

        writeln!(out, "    call {name}")?;

        let cleanup = 8 * stack_args as i64 + padding as i64;
        if cleanup != 0 {
            writeln!(out, "    addq ${cleanup}, %rsp")?;
        }

        self.store_result(out, dst)
    }
}

struct StringPool {
    entries: Vec<String>,
    index: HashMap<String, usize>,
}

impl StringPool {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Returns the `.LC<k>` label of `value`, interning it on first sight.
    fn intern(&mut self, value: &str) -> String {
        let k = if let Some(k) = self.index.get(value) {
            *k
        } else {
            let k = self.entries.len();
            self.entries.push(value.to_owned());
            self.index.insert(value.to_owned(), k);
            k
        };
        format!(".LC{k}")
    }

    fn emit(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.entries.is_empty() {
            return Ok(());
        }
        writeln!(f, ".section .rodata")?;
        for (k, value) in self.entries.iter().enumerate() {
            writeln!(f, ".LC{k}:")?;
            writeln!(f, "    .string \"{}\"", escape_asm(value))?;
        }
        writeln!(f)
    }
}

fn emit_globals(f: &mut fmt::Formatter, globals: &BTreeMap<Identifier, i64>) -> fmt::Result {
    if globals.is_empty() {
        return Ok(());
    }
    writeln!(f, ".data")?;
    for (name, value) in globals {
        writeln!(f, "{name}:")?;
        writeln!(f, "    .quad {value}")?;
    }
    Ok(())
}

/// Re-escapes a decoded literal for the assembler's `.string` directive.
fn escape_asm(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'"' => out.push_str("\\\""),
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\t' => out.push_str("\\t"),
            b'\r' => out.push_str("\\r"),
            0x20..=0x7e => out.push(byte as char),
            _ => out.push_str(&format!("\\{byte:03o}")),
        }
    }
    out
}
