//! Constant arithmetic shared by the constant-folding pass and the
//! interpreter (§3, §8), so optimizing a program can never change what it
//! would have printed.

use crate::error::InterpError;
use crate::ir::{ConstValue, Operator};

/// `a` and `b` are assumed to already be the same variant; callers match on
/// `(ConstValue, ConstValue)` before reaching here.
pub fn eval_binary(op: Operator, a: ConstValue, b: ConstValue) -> Result<ConstValue, InterpError> {
    use ConstValue::*;
    match (a, b) {
        (Int(x), Int(y)) => eval_int(op, x, y),
        (Real(x), Real(y)) => Ok(eval_real(op, x, y)),
        (Bool(x), Bool(y)) => Ok(eval_bool(op, x, y)),
        _ => unreachable!("binary operand type mismatch: {a:?} {op:?} {b:?}"),
    }
}

/// 32-bit two's-complement wrap-on-overflow arithmetic.
fn eval_int(op: Operator, x: i32, y: i32) -> Result<ConstValue, InterpError> {
    use Operator::*;
    Ok(match op {
        Sum => ConstValue::Int(x.wrapping_add(y)),
        Sub => ConstValue::Int(x.wrapping_sub(y)),
        Mul => ConstValue::Int(x.wrapping_mul(y)),
        Div => {
            if y == 0 {
                return Err(InterpError::DivisionByZero);
            }
            ConstValue::Int(x.wrapping_div(y))
        }
        Mod => {
            if y == 0 {
                return Err(InterpError::DivisionByZero);
            }
            ConstValue::Int(x.wrapping_rem(y))
        }
        Pow => ConstValue::Int(if y >= 0 { x.wrapping_pow(y as u32) } else { 0 }),
        Eq => ConstValue::Bool(x == y),
        Ne => ConstValue::Bool(x != y),
        Lt => ConstValue::Bool(x < y),
        Le => ConstValue::Bool(x <= y),
        Gt => ConstValue::Bool(x > y),
        Ge => ConstValue::Bool(x >= y),
        other => unreachable!("{other:?} is not a binary int operator"),
    })
}

/// IEEE-754 double arithmetic. NaN/Inf propagate as the hardware defines.
fn eval_real(op: Operator, x: f64, y: f64) -> ConstValue {
    use Operator::*;
    match op {
        Sum => ConstValue::Real(x + y),
        Sub => ConstValue::Real(x - y),
        Mul => ConstValue::Real(x * y),
        Div => ConstValue::Real(x / y),
        Mod => ConstValue::Real(x % y),
        Pow => ConstValue::Real(x.powf(y)),
        Eq => ConstValue::Bool(x == y),
        Ne => ConstValue::Bool(x != y),
        Lt => ConstValue::Bool(x < y),
        Le => ConstValue::Bool(x <= y),
        Gt => ConstValue::Bool(x > y),
        Ge => ConstValue::Bool(x >= y),
        other => unreachable!("{other:?} is not a binary real operator"),
    }
}

fn eval_bool(op: Operator, x: bool, y: bool) -> ConstValue {
    match op {
        Operator::Eq => ConstValue::Bool(x == y),
        Operator::Ne => ConstValue::Bool(x != y),
        other => unreachable!("{other:?} is not a binary bool operator"),
    }
}

pub fn eval_unary(op: Operator, value: ConstValue) -> ConstValue {
    match (op, value) {
        (Operator::Plus, v) => v,
        (Operator::Minus, ConstValue::Int(i)) => ConstValue::Int(i.wrapping_neg()),
        (Operator::Minus, ConstValue::Real(r)) => ConstValue::Real(-r),
        (Operator::Not, ConstValue::Bool(b)) => ConstValue::Bool(!b),
        (op, v) => unreachable!("{op:?} is not a valid unary operator for {v:?}"),
    }
}

pub fn eval_convert(value: ConstValue) -> ConstValue {
    match value {
        ConstValue::Int(i) => ConstValue::Real(f64::from(i)),
        other => unreachable!("CONVERT expects an int operand, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_division_by_zero_is_an_error_not_a_panic() {
        let result = eval_binary(Operator::Div, ConstValue::Int(1), ConstValue::Int(0));
        assert!(matches!(result, Err(InterpError::DivisionByZero)));
    }

    #[test]
    fn negative_integer_power_degrades_to_zero() {
        let result = eval_binary(Operator::Pow, ConstValue::Int(2), ConstValue::Int(-1)).unwrap();
        assert_eq!(result, ConstValue::Int(0));
    }
}
