//! Constant propagation.
//!
//! A linear scan records which temporaries hold known constants and rewrites
//! later source operands to the literal. `STORE` and `CALL` clear the whole
//! map to stay conservative about aliasing. `RETURN` and `PARAM` operands
//! are left alone; dead-code elimination keeps their defining moves.

use crate::ir::{Instruction, IrFunction, Value};
use std::collections::HashMap;

pub fn run(func: &mut IrFunction) -> bool {
    let mut changed = false;
    let mut constants: HashMap<u32, i64> = HashMap::new();

    for inst in &mut func.instructions {
        if let Instruction::Copy {
            dst: Value::Temp(t),
            src: Value::Const(v),
        } = inst
        {
            constants.insert(*t, *v);
            continue;
        }

        match inst {
            Instruction::Binary { lhs, rhs, .. } => {
                changed |= substitute(lhs, &constants);
                changed |= substitute(rhs, &constants);
            }
            Instruction::Not { src, .. } | Instruction::Copy { src, .. } => {
                changed |= substitute(src, &constants);
            }
            Instruction::Branch { cond, .. } => {
                changed |= substitute(cond, &constants);
            }
            Instruction::LoadIndex { index, .. } => {
                changed |= substitute(index, &constants);
            }
            Instruction::Store { src, .. } => {
                changed |= substitute(src, &constants);
                constants.clear();
            }
            Instruction::Call { .. } => constants.clear(),
            _ => (),
        }
    }

    changed
}

fn substitute(value: &mut Value, constants: &HashMap<u32, i64>) -> bool {
    if let Value::Temp(t) = value {
        if let Some(v) = constants.get(t) {
            *value = Value::Const(*v);
            return true;
        }
    }
    false
}
