//! Constant folding (§4.4).

use crate::ir::{ConstValue, Cfg, Operator};

/// Folds every binary/unary instruction whose operands are already `Const`
/// into a `MOVE result <- Const`. Division/modulus by a zero divisor is left
/// unfolded -- it is deferred to run time (§7) rather than treated as a
/// translator bug, since the divisor may itself come from `READ`.
pub fn run(cfg: &mut Cfg) -> bool {
    let mut changed = false;
    for block in &mut cfg.blocks {
        for instr in &mut block.instructions {
            let folded = if instr.op.is_binary() {
                match (instr.arg1.as_const(), instr.arg2.as_const()) {
                    (Some(a), Some(b)) => fold_binary(instr.op, a, b),
                    _ => None,
                }
            } else if instr.op.is_unary() && instr.arg2.is_empty() {
                instr.arg1.as_const().and_then(|a| fold_unary(instr.op, a))
            } else if instr.op == Operator::Convert {
                instr.arg1.as_const().and_then(fold_convert)
            } else {
                None
            };

            if let Some(value) = folded {
                instr.rewrite_as_const_move(value);
                changed = true;
            }
        }
    }
    changed
}

fn fold_convert(value: ConstValue) -> Option<ConstValue> {
    match value {
        ConstValue::Int(_) => Some(crate::arith::eval_convert(value)),
        _ => None,
    }
}

fn fold_unary(op: Operator, value: ConstValue) -> Option<ConstValue> {
    match (op, value) {
        (Operator::Plus, _)
        | (Operator::Minus, ConstValue::Int(_))
        | (Operator::Minus, ConstValue::Real(_))
        | (Operator::Not, ConstValue::Bool(_)) => Some(crate::arith::eval_unary(op, value)),
        _ => None,
    }
}

/// `None` signals "do not fold" (division/modulus by zero, or a type
/// mismatch that is a translator bug rather than this pass's concern).
fn fold_binary(op: Operator, a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    use ConstValue::*;
    match (a, b) {
        (Int(_), Int(_)) | (Real(_), Real(_)) | (Bool(_), Bool(_)) => {
            crate::arith::eval_binary(op, a, b).ok()
        }
        _ => None,
    }
}
