//! Constant folding.
//!
//! Arithmetic instructions whose operands are both constants are replaced
//! with a plain constant move. Division and remainder by zero are kept
//! verbatim.

use crate::ir::{BinaryOp, Instruction, IrFunction, Value};

pub fn run(func: &mut IrFunction) -> bool {
    let mut changed = false;

    for inst in &mut func.instructions {
        let replacement = match inst {
            Instruction::Binary {
                op,
                dst,
                lhs: Value::Const(lhs),
                rhs: Value::Const(rhs),
            } if op.is_arithmetic() => eval(*op, *lhs, *rhs).map(|value| Instruction::Copy {
                dst: dst.clone(),
                src: Value::Const(value),
            }),
            _ => None,
        };

        if let Some(replacement) = replacement {
            *inst = replacement;
            changed = true;
        }
    }

    changed
}

/// Two's-complement int semantics; wrapping also sidesteps the
/// `i32::MIN / -1` overflow.
fn eval(op: BinaryOp, lhs: i64, rhs: i64) -> Option<i64> {
    let (lhs, rhs) = (lhs as i32, rhs as i32);
    let value = match op {
        BinaryOp::Add => lhs.wrapping_add(rhs),
        BinaryOp::Sub => lhs.wrapping_sub(rhs),
        BinaryOp::Mul => lhs.wrapping_mul(rhs),
        BinaryOp::Div if rhs != 0 => lhs.wrapping_div(rhs),
        BinaryOp::Mod if rhs != 0 => lhs.wrapping_rem(rhs),
        _ => return None,
    };
    Some(i64::from(value))
}
