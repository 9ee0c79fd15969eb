//! Lowering of the syntax tree to three-address code.
//!
//! [emit_ir] walks the tree in source order. Each expression helper returns
//! the [Value] naming its result, so results flow to parents as plain return
//! values. Control flow gets fresh labels per construct; `break` and
//! `continue` resolve against a stack of enclosing-loop label pairs and do
//! nothing outside a loop.

mod inst;
mod semantic_error;

use crate::ast::{
    self, Block, Declaration, Exp, FunctionDef, If, Program, Statement, UnaryOp, VarDecl, While,
};
pub use inst::{BinaryOp, Identifier, Instruction, IrFunction, IrModule, LabelId, Value};
pub use semantic_error::SemanticError;

type Result<T> = std::result::Result<T, SemanticError>;

/// Jump targets of the innermost enclosing loop.
struct LoopLabels {
    break_to: LabelId,
    continue_to: LabelId,
}

impl From<ast::BinaryOp> for BinaryOp {
    fn from(value: ast::BinaryOp) -> Self {
        match value {
            ast::BinaryOp::Add => Self::Add,
            ast::BinaryOp::Subtract => Self::Sub,
            ast::BinaryOp::Multiply => Self::Mul,
            ast::BinaryOp::Divide => Self::Div,
            ast::BinaryOp::Modulo => Self::Mod,
            ast::BinaryOp::IsEqual => Self::Eq,
            ast::BinaryOp::IsNotEqual => Self::Ne,
            ast::BinaryOp::LessThan => Self::Lt,
            ast::BinaryOp::LessOrEqual => Self::Le,
            ast::BinaryOp::GreaterThan => Self::Gt,
            ast::BinaryOp::GreaterOrEqual => Self::Ge,
            ast::BinaryOp::LogicalAnd => Self::And,
            ast::BinaryOp::LogicalOr => Self::Or,
        }
    }
}

fn emit_expression(e: Exp, func: &mut IrFunction) -> Result<Value> {
    match e {
        Exp::IntLiteral(v) => {
            let dst = func.new_temp();
            func.add(Instruction::Copy {
                dst: dst.clone(),
                src: Value::Const(v),
            });
            Ok(dst)
        }
        Exp::CharLiteral(c) => {
            let dst = func.new_temp();
            func.add(Instruction::Copy {
                dst: dst.clone(),
                src: Value::Const(i64::from(c)),
            });
            Ok(dst)
        }
        Exp::StringLiteral(value) => {
            let dst = func.new_temp();
            func.add(Instruction::StringConst {
                dst: dst.clone(),
                value,
            });
            Ok(dst)
        }
        Exp::Var(name) => {
            let dst = func.new_temp();
            func.add(Instruction::Load {
                dst: dst.clone(),
                src: name,
            });
            Ok(dst)
        }
        Exp::ArrayAccess(name, index) => {
            let index = emit_expression(*index, func)?;
            let dst = func.new_temp();
            func.add(Instruction::LoadIndex {
                dst: dst.clone(),
                base: name,
                index,
            });
            Ok(dst)
        }
        Exp::Assignment(lhs, rhs) => {
            let Exp::Var(name) = *lhs else {
                return Err(SemanticError::InvalidAssignTarget);
            };
            let src = emit_expression(*rhs, func)?;
            func.add(Instruction::Store {
                dst: name,
                src: src.clone(),
            });
            // the assignment's value is its right-hand side
            Ok(src)
        }
        Exp::Binary(op, left, right) => {
            let lhs = emit_expression(*left, func)?;
            let rhs = emit_expression(*right, func)?;
            let dst = func.new_temp();
            func.add(Instruction::Binary {
                op: op.into(),
                dst: dst.clone(),
                lhs,
                rhs,
            });
            Ok(dst)
        }
        Exp::Unary(UnaryOp::Plus, operand) => emit_expression(*operand, func),
        Exp::Unary(UnaryOp::Negate, operand) => {
            let src = emit_expression(*operand, func)?;
            let dst = func.new_temp();
            func.add(Instruction::Binary {
                op: BinaryOp::Sub,
                dst: dst.clone(),
                lhs: Value::Const(0),
                rhs: src,
            });
            Ok(dst)
        }
        Exp::Unary(UnaryOp::LogicalNot, operand) => {
            let src = emit_expression(*operand, func)?;
            let dst = func.new_temp();
            func.add(Instruction::Not {
                dst: dst.clone(),
                src,
            });
            Ok(dst)
        }
        Exp::Unary(op, _) => Err(SemanticError::UnsupportedUnary(op)),
        Exp::Call(name, args) => {
            for arg in args {
                let value = emit_expression(arg, func)?;
                func.add(Instruction::Param(value));
            }
            let dst = func.new_temp();
            func.add(Instruction::Call {
                dst: dst.clone(),
                name,
            });
            Ok(dst)
        }
        Exp::Member(_) => Err(SemanticError::UnsupportedMemberAccess),
    }
}

fn emit_if(if_st: If, func: &mut IrFunction, loops: &mut Vec<LoopLabels>) -> Result<()> {
    // three labels are minted either way; the else label goes unused when
    // there is no else branch, keeping temp/label numbering predictable
    let then_label = func.new_label();
    let else_label = func.new_label();
    let end_label = func.new_label();

    let condition = emit_expression(if_st.condition, func)?;
    let if_false = if if_st.els.is_some() {
        else_label
    } else {
        end_label
    };
    func.add(Instruction::Branch {
        cond: condition,
        if_true: then_label,
        if_false,
    });

    func.add(Instruction::Label(then_label));
    emit_statement(*if_st.then, func, loops)?;
    func.add(Instruction::Jump(end_label));

    if let Some(els) = if_st.els {
        func.add(Instruction::Label(else_label));
        emit_statement(*els, func, loops)?;
        func.add(Instruction::Jump(end_label));
    }

    func.add(Instruction::Label(end_label));
    Ok(())
}

fn emit_while(while_st: While, func: &mut IrFunction, loops: &mut Vec<LoopLabels>) -> Result<()> {
    let loop_label = func.new_label();
    let body_label = func.new_label();
    let end_label = func.new_label();

    loops.push(LoopLabels {
        break_to: end_label,
        continue_to: loop_label,
    });

    func.add(Instruction::Label(loop_label));
    let condition = emit_expression(while_st.condition, func)?;
    func.add(Instruction::Branch {
        cond: condition,
        if_true: body_label,
        if_false: end_label,
    });

    func.add(Instruction::Label(body_label));
    emit_statement(*while_st.body, func, loops)?;
    func.add(Instruction::Jump(loop_label));

    func.add(Instruction::Label(end_label));

    loops.pop();
    Ok(())
}

fn emit_local_decl(d: VarDecl, func: &mut IrFunction) -> Result<()> {
    // arrays reserve a full 8-byte slot per element; scalars keep the
    // nominal int size and the backend rounds the reservation up
    let size = if d.is_array { d.array_size * 8 } else { 4 };
    func.add(Instruction::Alloc {
        name: d.name.clone(),
        size,
    });

    if let Some(init) = d.init {
        let value = emit_expression(init, func)?;
        func.add(Instruction::Store {
            dst: d.name,
            src: value,
        });
    }
    Ok(())
}

fn emit_statement(
    statement: Statement,
    func: &mut IrFunction,
    loops: &mut Vec<LoopLabels>,
) -> Result<()> {
    match statement {
        Statement::Decl(d) => emit_local_decl(d, func),
        Statement::Exp(e) => {
            emit_expression(e, func)?;
            Ok(())
        }
        Statement::Compound(block) => emit_block(block, func, loops),
        Statement::If(if_st) => emit_if(if_st, func, loops),
        Statement::While(while_st) => emit_while(while_st, func, loops),
        Statement::Break => {
            // silently ignored outside a loop
            if let Some(labels) = loops.last() {
                func.add(Instruction::Jump(labels.break_to));
            }
            Ok(())
        }
        Statement::Continue => {
            if let Some(labels) = loops.last() {
                func.add(Instruction::Jump(labels.continue_to));
            }
            Ok(())
        }
        Statement::Return(Some(e)) => {
            let value = emit_expression(e, func)?;
            func.add(Instruction::Return(Some(value)));
            Ok(())
        }
        Statement::Return(None) => {
            func.add(Instruction::Return(None));
            Ok(())
        }
    }
}

fn emit_block(block: Block, func: &mut IrFunction, loops: &mut Vec<LoopLabels>) -> Result<()> {
    for statement in block.statements {
        emit_statement(statement, func, loops)?;
    }
    Ok(())
}

fn emit_function(f: FunctionDef) -> Result<IrFunction> {
    let mut func = IrFunction::new(f.name, f.return_type);
    for (_, name) in &f.params {
        func.params.push(name.clone());
    }

    let mut loops = Vec::new();
    emit_block(f.body, &mut func, &mut loops)?;

    Ok(func)
}

pub fn emit_ir(program: Program) -> Result<IrModule> {
    let mut module = IrModule::new();

    for declaration in program.declarations {
        match declaration {
            Declaration::Fun(f) => {
                let function = emit_function(f)?;
                module.functions.push(function);
            }
            // global initializers are not evaluated; every global starts at 0
            Declaration::Var(v) => {
                module.global_vars.insert(v.name, 0);
            }
        }
    }

    Ok(module)
}
