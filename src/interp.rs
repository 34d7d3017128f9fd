//! The tree-walking interpreter over the SSA CFG (§4.5).
//!
//! Gives the optimization pipeline an executable semantics: every end-to-end
//! test runs a program before and after `optimize_ssa` and checks the two
//! interpretations agree.

use crate::arith;
use crate::error::InterpError;
use crate::ir::{BlockId, Cfg, ConstValue, Operand, Operator, Temp, TempVersion, Type};
use std::collections::HashMap;
use std::io::{BufRead, Write};

/// `mem : Operand -> value` (§4.5). Pre-SSA `Temp`s and SSA `TempVersion`s
/// are both representable since `ALLOCA` may still appear if a caller hands
/// the interpreter a CFG that skipped `construct_ssa`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Key {
    Plain(Temp),
    Versioned(TempVersion),
}

fn key_of(operand: &Operand) -> Option<Key> {
    match operand {
        Operand::Temp(t) => Some(Key::Plain(*t)),
        Operand::TempVersion(tv) => Some(Key::Versioned(*tv)),
        _ => None,
    }
}

fn default_value(ty: Type) -> ConstValue {
    match ty {
        Type::Int => ConstValue::Int(0),
        Type::Real => ConstValue::Real(0.0),
        Type::Bool => ConstValue::Bool(false),
    }
}

/// Executes `cfg` to completion (or until a runtime error stops it),
/// prompting on `input` and writing `output: `/diagnostic lines to `output`.
pub fn interpret<R: BufRead, W: Write>(
    cfg: &Cfg,
    input: &mut R,
    output: &mut W,
) -> Result<(), InterpError> {
    let mut mem: HashMap<Key, ConstValue> = HashMap::new();
    let mut prev: Option<BlockId> = None;
    let mut current = cfg.entry();

    loop {
        let block = cfg.block(current);
        let mut next: Option<BlockId> = None;

        for instr in &block.instructions {
            match instr.op {
                Operator::Label => {}
                Operator::Phi => {
                    let paths = instr.arg1.as_phi().expect("phi carries a Phi operand");
                    let value = prev
                        .and_then(|p| paths.iter().find(|(src, _)| *src == p))
                        .map(|(_, v)| mem[&Key::Versioned(*v)])
                        .unwrap_or_else(|| {
                            default_value(
                                instr
                                    .result
                                    .as_temp_version()
                                    .map(|tv| tv.origin.ty)
                                    .unwrap_or(Type::Int),
                            )
                        });
                    mem.insert(key_of(&instr.result).expect("phi result is a temp"), value);
                }
                Operator::Alloca => {
                    let ty = instr.result.as_temp().map(|t| t.ty).unwrap_or(Type::Int);
                    mem.insert(
                        key_of(&instr.result).expect("alloca result is a temp"),
                        default_value(ty),
                    );
                }
                Operator::Store | Operator::Load | Operator::Move => {
                    let value = eval(&instr.arg1, &mem);
                    mem.insert(key_of(&instr.result).expect("assignment result is a temp"), value);
                }
                Operator::If => {
                    let cond = eval(&instr.arg1, &mem);
                    let target = if cond.is_truthy() {
                        instr.arg2.as_label()
                    } else {
                        instr.result.as_label()
                    }
                    .expect("if targets are labels");
                    next = Some(cfg.label_to_block[&target]);
                    break;
                }
                Operator::Goto => {
                    let target = instr.result.as_label().expect("goto target is a label");
                    next = Some(cfg.label_to_block[&target]);
                    break;
                }
                Operator::Print => {
                    let value = eval(&instr.arg1, &mem);
                    writeln!(output, "output: {}", format_print(value))
                        .expect("writing interpreter output");
                }
                Operator::Read => {
                    write!(output, "input: ").expect("writing interpreter prompt");
                    output.flush().ok();
                    let ty = instr.result.as_temp_version().map(|tv| tv.origin.ty).unwrap_or(
                        instr.result.as_temp().map(|t| t.ty).unwrap_or(Type::Int),
                    );
                    let mut line = String::new();
                    let read_ok = input.read_line(&mut line).is_ok();
                    let parsed = read_ok.then(|| parse_input(line.trim(), ty)).flatten();
                    match parsed {
                        Some(value) => {
                            mem.insert(
                                key_of(&instr.result).expect("read result is a temp"),
                                value,
                            );
                        }
                        None => {
                            writeln!(output, "{}", InterpError::InvalidInput)
                                .expect("writing interpreter diagnostic");
                            return Err(InterpError::InvalidInput);
                        }
                    }
                }
                Operator::Convert => {
                    let value = arith::eval_convert(eval(&instr.arg1, &mem));
                    mem.insert(key_of(&instr.result).expect("convert result is a temp"), value);
                }
                Operator::Plus | Operator::Minus | Operator::Not => {
                    let value = arith::eval_unary(instr.op, eval(&instr.arg1, &mem));
                    mem.insert(key_of(&instr.result).expect("unary result is a temp"), value);
                }
                _ => {
                    let a = eval(&instr.arg1, &mem);
                    let b = eval(&instr.arg2, &mem);
                    let value = arith::eval_binary(instr.op, a, b)?;
                    mem.insert(key_of(&instr.result).expect("binary result is a temp"), value);
                }
            }
        }

        current = match next.or_else(|| block.successors.first().copied()) {
            Some(id) => id,
            None => return Ok(()),
        };
        prev = Some(block.id);
    }
}

fn eval(operand: &Operand, mem: &HashMap<Key, ConstValue>) -> ConstValue {
    match operand {
        Operand::Const(c) => *c,
        other => {
            let key = key_of(other).expect("operand being evaluated is a value-bearing operand");
            mem[&key]
        }
    }
}

/// Reals print with exactly four fractional digits, ints as plain decimal,
/// booleans as `0`/`1` (§4.5, §6).
fn format_print(value: ConstValue) -> String {
    match value {
        ConstValue::Int(i) => format!("{i}"),
        ConstValue::Real(r) => format!("{r:.4}"),
        ConstValue::Bool(b) => format!("{}", i32::from(b)),
    }
}

fn parse_input(text: &str, ty: Type) -> Option<ConstValue> {
    match ty {
        Type::Int => text.parse::<i32>().ok().map(ConstValue::Int),
        Type::Real => text.parse::<f64>().ok().map(ConstValue::Real),
        Type::Bool => match text {
            "0" => Some(ConstValue::Bool(false)),
            "1" => Some(ConstValue::Bool(true)),
            _ => text.parse::<bool>().ok().map(ConstValue::Bool),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Expr, LiteralValue, Program, Stmt};
    use crate::builder::IrBuilder;
    use crate::ssa::construct_ssa;
    use std::io::Cursor;

    fn run_program(program: &Program, stdin: &str) -> String {
        let mut cfg = IrBuilder::new().build(program).unwrap();
        construct_ssa(&mut cfg);
        let mut input = Cursor::new(stdin.as_bytes().to_vec());
        let mut output = Vec::new();
        interpret(&cfg, &mut input, &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn prints_an_integer_as_plain_decimal() {
        let program = Program {
            statements: vec![Stmt::Write {
                value: Expr::Literal(LiteralValue::Int(14)),
            }],
        };
        assert_eq!(run_program(&program, ""), "output: 14\n");
    }

    #[test]
    fn prints_a_real_with_four_fractional_digits() {
        let program = Program {
            statements: vec![Stmt::Write {
                value: Expr::Literal(LiteralValue::Real(1.5)),
            }],
        };
        assert_eq!(run_program(&program, ""), "output: 1.5000\n");
    }

    #[test]
    fn while_loop_sums_and_prints_the_accumulator() {
        let program = Program {
            statements: vec![
                Stmt::Decl {
                    name: "i".to_string(),
                    ty: Type::Int,
                },
                Stmt::Decl {
                    name: "acc".to_string(),
                    ty: Type::Int,
                },
                Stmt::Assign {
                    name: "i".to_string(),
                    value: Expr::Literal(LiteralValue::Int(0)),
                },
                Stmt::Assign {
                    name: "acc".to_string(),
                    value: Expr::Literal(LiteralValue::Int(0)),
                },
                Stmt::While {
                    cond: Expr::Binary(
                        BinOp::Lt,
                        Box::new(Expr::Var("i".to_string())),
                        Box::new(Expr::Literal(LiteralValue::Int(3))),
                    ),
                    body: vec![
                        Stmt::Assign {
                            name: "acc".to_string(),
                            value: Expr::Binary(
                                BinOp::Sum,
                                Box::new(Expr::Var("acc".to_string())),
                                Box::new(Expr::Var("i".to_string())),
                            ),
                        },
                        Stmt::Assign {
                            name: "i".to_string(),
                            value: Expr::Binary(
                                BinOp::Sum,
                                Box::new(Expr::Var("i".to_string())),
                                Box::new(Expr::Literal(LiteralValue::Int(1))),
                            ),
                        },
                    ],
                },
                Stmt::Write {
                    value: Expr::Var("acc".to_string()),
                },
            ],
        };
        assert_eq!(run_program(&program, ""), "output: 3\n");
    }

    #[test]
    fn read_parses_input_per_the_declared_type() {
        let program = Program {
            statements: vec![
                Stmt::Decl {
                    name: "x".to_string(),
                    ty: Type::Int,
                },
                Stmt::Read {
                    name: "x".to_string(),
                },
                Stmt::Write {
                    value: Expr::Var("x".to_string()),
                },
            ],
        };
        assert_eq!(run_program(&program, "42\n"), "input: output: 42\n");
    }

    #[test]
    fn invalid_read_input_stops_interpretation_gracefully() {
        let program = Program {
            statements: vec![
                Stmt::Decl {
                    name: "x".to_string(),
                    ty: Type::Int,
                },
                Stmt::Read {
                    name: "x".to_string(),
                },
                Stmt::Write {
                    value: Expr::Var("x".to_string()),
                },
            ],
        };
        let mut cfg = IrBuilder::new().build(&program).unwrap();
        construct_ssa(&mut cfg);
        let mut input = Cursor::new(b"not-a-number\n".to_vec());
        let mut output = Vec::new();
        let result = interpret(&cfg, &mut input, &mut output);
        assert_eq!(result, Err(InterpError::InvalidInput));
        let text = String::from_utf8(output).unwrap();
        assert!(text.ends_with("Entrada de dados inválida! Interpretação encerrada.\n"));
    }

    #[test]
    fn integer_division_by_zero_is_reported_as_a_runtime_error() {
        let program = Program {
            statements: vec![Stmt::Write {
                value: Expr::Binary(
                    BinOp::Div,
                    Box::new(Expr::Literal(LiteralValue::Int(1))),
                    Box::new(Expr::Literal(LiteralValue::Int(0))),
                ),
            }],
        };
        let mut cfg = IrBuilder::new().build(&program).unwrap();
        // deliberately skip `construct_ssa`'s constant folding by interpreting
        // the pre-SSA form directly: the divisor is still a literal `0`.
        let mut input = Cursor::new(Vec::new());
        let mut output = Vec::new();
        let result = interpret(&cfg, &mut input, &mut output);
        assert_eq!(result, Err(InterpError::DivisionByZero));
    }
}
