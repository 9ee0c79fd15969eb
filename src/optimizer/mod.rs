//! IR-to-IR optimization.
//!
//! Three dataflow passes run in a fixed order - constant folding, constant
//! propagation, dead-code elimination - and the triple is iterated until no
//! pass reports a change, capped at ten rounds. Each pass only
//! ever shrinks or rewrites instructions in place, so the instruction count
//! never grows and a fixed point always exists.
//!
//! Functions are optimized independently; the module's global-variable table
//! passes through untouched.

mod dce;
mod fold;
#[cfg(test)]
mod optimizer_tests;
mod propagate;

use crate::ir::{IrFunction, IrModule};

const MAX_ITERATIONS: u32 = 10;

pub fn optimize(module: IrModule) -> IrModule {
    let functions = module
        .functions
        .into_iter()
        .map(optimize_function)
        .collect();

    IrModule {
        functions,
        global_vars: module.global_vars,
    }
}

pub fn optimize_function(mut func: IrFunction) -> IrFunction {
    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        changed |= fold::run(&mut func);
        changed |= propagate::run(&mut func);
        changed |= dce::run(&mut func);
        if !changed {
            break;
        }
    }
    func
}
