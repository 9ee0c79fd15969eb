//! Dead-code elimination.
//!
//! Drops any pure instruction whose result temporary is never read. Control
//! flow, stores, calls, parameter pushes and allocations always survive, as
//! do writes to named variables.

use crate::ir::{Instruction, IrFunction, Value};
use std::collections::HashSet;

pub fn run(func: &mut IrFunction) -> bool {
    let mut used: HashSet<u32> = HashSet::new();
    for inst in &func.instructions {
        collect_uses(inst, &mut used);
    }

    let before = func.instructions.len();
    func.instructions.retain(|inst| match inst {
        Instruction::Binary { dst, .. }
        | Instruction::Not { dst, .. }
        | Instruction::Copy { dst, .. }
        | Instruction::StringConst { dst, .. }
        | Instruction::Load { dst, .. }
        | Instruction::LoadIndex { dst, .. } => match dst {
            Value::Temp(t) => used.contains(t),
            _ => true,
        },
        // side effects: STORE, CALL, RETURN, JUMP, BRANCH, LABEL, PARAM, ALLOC
        _ => true,
    });

    func.instructions.len() != before
}

fn collect_uses(inst: &Instruction, used: &mut HashSet<u32>) {
    match inst {
        Instruction::Binary { lhs, rhs, .. } => {
            mark(lhs, used);
            mark(rhs, used);
        }
        Instruction::Not { src, .. } | Instruction::Copy { src, .. } => mark(src, used),
        Instruction::LoadIndex { index, .. } => mark(index, used),
        Instruction::Store { src, .. } => mark(src, used),
        Instruction::Branch { cond, .. } => mark(cond, used),
        Instruction::Return(Some(value)) | Instruction::Param(value) => mark(value, used),
        _ => (),
    }
}

fn mark(value: &Value, used: &mut HashSet<u32>) {
    if let Value::Temp(t) = value {
        used.insert(*t);
    }
}
