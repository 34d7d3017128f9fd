//! Liveness via linear scan over a flattened instruction stream (§4.6,
//! secondary: shares the dataflow machinery with the optimizer but is not
//! part of the fixed-point pipeline).

use crate::ir::{BlockId, Cfg, Instruction, Label, Operand, Operator, TempVersion};
use std::collections::HashMap;

/// `[start, end]` are indices into the CFG's instructions in `bb_sequence`
/// order, flattened into one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveRange {
    pub temp: TempVersion,
    pub start: usize,
    pub end: usize,
}

fn block_start_index(cfg: &Cfg, target: BlockId) -> usize {
    let mut idx = 0;
    for block in &cfg.blocks {
        if block.id == target {
            return idx;
        }
        idx += block.instructions.len();
    }
    idx
}

/// One [`LiveRange`] per distinct `TempVersion` referenced anywhere in
/// `cfg`: `start`/`end` are its first and last appearance as either a
/// definition or a use, including inside φ path maps. A second pass then
/// extends any range alive at a back-edge's target to span the whole loop
/// body (§4.6).
pub fn compute(cfg: &Cfg) -> Vec<LiveRange> {
    let mut spans: HashMap<TempVersion, (usize, usize)> = HashMap::new();

    let mut idx = 0;
    for block in &cfg.blocks {
        for instr in &block.instructions {
            touch(&instr.arg1, idx, &mut spans);
            touch(&instr.arg2, idx, &mut spans);
            touch(&instr.result, idx, &mut spans);
            idx += 1;
        }
    }

    let mut ranges: Vec<LiveRange> = spans
        .into_iter()
        .map(|(temp, (start, end))| LiveRange { temp, start, end })
        .collect();

    extend_across_back_edges(cfg, &mut ranges);
    ranges.sort_by_key(|r| r.start);
    ranges
}

fn touch(operand: &Operand, idx: usize, spans: &mut HashMap<TempVersion, (usize, usize)>) {
    match operand {
        Operand::TempVersion(tv) => record(*tv, idx, spans),
        Operand::Phi(paths) => {
            for (_, value) in paths {
                record(*value, idx, spans);
            }
        }
        _ => {}
    }
}

fn record(tv: TempVersion, idx: usize, spans: &mut HashMap<TempVersion, (usize, usize)>) {
    spans
        .entry(tv)
        .and_modify(|(start, end)| {
            *start = (*start).min(idx);
            *end = (*end).max(idx);
        })
        .or_insert((idx, idx));
}

fn branch_targets(instr: &Instruction) -> Vec<Label> {
    match instr.op {
        Operator::Goto => instr.result.as_label().into_iter().collect(),
        Operator::If => [instr.arg2.as_label(), instr.result.as_label()]
            .into_iter()
            .flatten()
            .collect(),
        _ => Vec::new(),
    }
}

fn extend_across_back_edges(cfg: &Cfg, ranges: &mut [LiveRange]) {
    let mut current_idx = 0;
    for block in &cfg.blocks {
        for instr in &block.instructions {
            for label in branch_targets(instr) {
                let Some(&target_block) = cfg.label_to_block.get(&label) else {
                    continue;
                };
                let target_idx = block_start_index(cfg, target_block);
                if target_idx < current_idx {
                    for range in ranges.iter_mut() {
                        if range.start <= target_idx && range.end >= target_idx {
                            range.end = range.end.max(current_idx);
                        }
                    }
                }
            }
            current_idx += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Expr, LiteralValue, Program, Stmt};
    use crate::builder::IrBuilder;
    use crate::ir::Type;
    use crate::ssa::construct_ssa;

    fn loop_cfg() -> Cfg {
        let program = Program {
            statements: vec![
                Stmt::Decl {
                    name: "i".to_string(),
                    ty: Type::Int,
                },
                Stmt::Assign {
                    name: "i".to_string(),
                    value: Expr::Literal(LiteralValue::Int(0)),
                },
                Stmt::While {
                    cond: Expr::Binary(
                        BinOp::Lt,
                        Box::new(Expr::Var("i".to_string())),
                        Box::new(Expr::Literal(LiteralValue::Int(3))),
                    ),
                    body: vec![Stmt::Assign {
                        name: "i".to_string(),
                        value: Expr::Binary(
                            BinOp::Sum,
                            Box::new(Expr::Var("i".to_string())),
                            Box::new(Expr::Literal(LiteralValue::Int(1))),
                        ),
                    }],
                },
                Stmt::Write {
                    value: Expr::Var("i".to_string()),
                },
            ],
        };
        let mut cfg = IrBuilder::new().build(&program).unwrap();
        construct_ssa(&mut cfg);
        cfg
    }

    #[test]
    fn loop_carried_temp_spans_the_back_edge() {
        let cfg = loop_cfg();
        let ranges = compute(&cfg);
        // the loop header's phi-defined version of `i` must stay live across
        // the whole loop body since the back-edge GOTO targets the header.
        let longest = ranges.iter().max_by_key(|r| r.end - r.start).unwrap();
        assert!(longest.end > longest.start);
    }

    #[test]
    fn straight_line_range_is_a_single_point_when_defined_and_never_used() {
        let program = Program {
            statements: vec![
                Stmt::Decl {
                    name: "x".to_string(),
                    ty: Type::Int,
                },
                Stmt::Assign {
                    name: "x".to_string(),
                    value: Expr::Literal(LiteralValue::Int(1)),
                },
            ],
        };
        let mut cfg = IrBuilder::new().build(&program).unwrap();
        construct_ssa(&mut cfg);
        let ranges = compute(&cfg);
        assert!(ranges.iter().all(|r| r.start <= r.end));
    }
}
