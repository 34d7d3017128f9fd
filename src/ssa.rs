//! SSA construction (§4.3): mem2reg lowering, dominance-frontier φ
//! placement, stack-based renaming, and trivial-φ pruning.

use crate::dominance::{self, Dominance};
use crate::ir::{BlockId, Cfg, Instruction, Operand, Operator, Temp, TempVersion};
use std::collections::{HashMap, HashSet};

/// Transforms a pre-SSA [`Cfg`] (as produced by [`crate::builder::IrBuilder`])
/// in place into pruned SSA form. The CFG's block/edge shape is unchanged
/// (§4.3 invariant); only instructions and operands are rewritten.
pub fn construct_ssa(cfg: &mut Cfg) {
    mem2reg(cfg);
    let dom = dominance::compute(cfg);
    place_phis(cfg, &dom);
    rename(cfg, &dom);
    prune_dead_phis(cfg);
}

/// §4.3a: strips `ALLOCA` and retargets `STORE`/`LOAD` to `MOVE`. After this
/// pass every address-temp behaves as an ordinary scalar value.
fn mem2reg(cfg: &mut Cfg) {
    for block in &mut cfg.blocks {
        block.instructions.retain_mut(|instr| {
            match instr.op {
                Operator::Alloca => false,
                Operator::Store | Operator::Load => {
                    instr.op = Operator::Move;
                    true
                }
                _ => true,
            }
        });
    }
}

/// Blocks that assign each source temp directly (`result == Temp(v)`),
/// i.e. `defsites(v)` from §4.3b.
fn compute_defsites(cfg: &Cfg) -> HashMap<Temp, HashSet<BlockId>> {
    let mut defsites: HashMap<Temp, HashSet<BlockId>> = HashMap::new();
    for block in &cfg.blocks {
        for instr in &block.instructions {
            if let Some(t) = instr.result.as_temp() {
                defsites.entry(t).or_default().insert(block.id);
            }
        }
    }
    defsites
}

/// §4.3b, φ placement half: for every variable defined in more than one
/// block, iteratively places φ placeholders at the dominance frontier of
/// every block that (transitively, through newly-added φs) defines it.
fn place_phis(cfg: &mut Cfg, dom: &Dominance) {
    let defsites = compute_defsites(cfg);
    for (var, sites) in defsites {
        if sites.len() <= 1 {
            continue;
        }
        let mut has_phi: HashSet<BlockId> = HashSet::new();
        let mut queued: HashSet<BlockId> = sites.clone();
        let mut worklist: Vec<BlockId> = sites.into_iter().collect();
        while let Some(n) = worklist.pop() {
            for &d in dom.frontier(n) {
                if has_phi.insert(d) {
                    insert_phi_placeholder(cfg, d, var);
                }
                if queued.insert(d) {
                    worklist.push(d);
                }
            }
        }
    }
}

/// Inserts an empty φ for `var` in `block`, immediately after the leading
/// `LABEL` if present (§3's block layout invariant). The φ's `result` is
/// left as a plain `Temp` placeholder; renaming assigns it a real
/// `TempVersion` when it visits `block`.
fn insert_phi_placeholder(cfg: &mut Cfg, block: BlockId, var: Temp) {
    // `result` is left as a plain `Temp` rather than a `TempVersion` --
    // renaming hasn't assigned this phi a version yet. `phi_var` reads
    // either form back out.
    let instr = Instruction {
        op: Operator::Phi,
        arg1: Operand::Phi(Vec::new()),
        arg2: Operand::Empty,
        result: Operand::Temp(var),
    };
    let blk = cfg.block_mut(block);
    let insert_pos = usize::from(
        blk.instructions
            .first()
            .is_some_and(|i| i.op == Operator::Label),
    );
    blk.instructions.insert(insert_pos, instr);
}

/// Reads the variable a (possibly not-yet-renamed) φ belongs to.
fn phi_var(instr: &Instruction) -> Temp {
    match &instr.result {
        Operand::Temp(t) => *t,
        Operand::TempVersion(tv) => tv.origin,
        other => unreachable!("phi result must be Temp or TempVersion, got {other:?}"),
    }
}

fn substitute(operand: &mut Operand, stacks: &HashMap<Temp, Vec<TempVersion>>) {
    if let Operand::Temp(t) = *operand {
        if let Some(&top) = stacks.get(&t).and_then(|s| s.last()) {
            *operand = Operand::TempVersion(top);
        }
    }
}

/// §4.3b, renaming half: a pre-order DFS over the dominator tree.
fn rename(cfg: &mut Cfg, dom: &Dominance) {
    let mut stacks: HashMap<Temp, Vec<TempVersion>> = HashMap::new();
    let mut counters: HashMap<Temp, u32> = HashMap::new();
    rename_block(cfg, dom, &mut stacks, &mut counters, cfg.entry());
}

fn rename_block(
    cfg: &mut Cfg,
    dom: &Dominance,
    stacks: &mut HashMap<Temp, Vec<TempVersion>>,
    counters: &mut HashMap<Temp, u32>,
    block: BlockId,
) {
    let mut pushed: Vec<Temp> = Vec::new();

    let instr_count = cfg.block(block).instructions.len();
    for i in 0..instr_count {
        let is_phi = cfg.block(block).instructions[i].is_phi();
        if is_phi {
            let var = phi_var(&cfg.block(block).instructions[i]);
            let version = next_version(counters, var);
            let tv = TempVersion { origin: var, version };
            stacks.entry(var).or_default().push(tv);
            pushed.push(var);
            cfg.block_mut(block).instructions[i].result = Operand::TempVersion(tv);
            continue;
        }

        {
            let instr = &mut cfg.block_mut(block).instructions[i];
            substitute(&mut instr.arg1, stacks);
            substitute(&mut instr.arg2, stacks);
        }
        let result_temp = cfg.block(block).instructions[i].result.as_temp();
        if let Some(t) = result_temp {
            let version = next_version(counters, t);
            let tv = TempVersion { origin: t, version };
            stacks.entry(t).or_default().push(tv);
            pushed.push(t);
            cfg.block_mut(block).instructions[i].result = Operand::TempVersion(tv);
        }
    }

    let successors = cfg.block(block).successors.clone();
    for s in successors {
        let phi_indices: Vec<usize> = cfg
            .block(s)
            .instructions
            .iter()
            .enumerate()
            .filter(|(_, i)| i.is_phi())
            .map(|(i, _)| i)
            .collect();
        for idx in phi_indices {
            let var = phi_var(&cfg.block(s).instructions[idx]);
            if let Some(&top) = stacks.get(&var).and_then(|st| st.last()) {
                if let Some(paths) = cfg.block_mut(s).instructions[idx].arg1.as_phi_mut() {
                    paths.push((block, top));
                }
            }
        }
    }

    for &child in dom.dom_tree_children(block) {
        rename_block(cfg, dom, stacks, counters, child);
    }

    for var in pushed {
        stacks.get_mut(&var).unwrap().pop();
    }
}

fn next_version(counters: &mut HashMap<Temp, u32>, var: Temp) -> u32 {
    let counter = counters.entry(var).or_insert(0);
    let version = *counter;
    *counter += 1;
    version
}

/// §4.3c: deletes φs whose path set has zero distinct incoming values.
/// One-distinct-value φs are left for the optimizer's φ-simplification pass
/// (§4.4), which folds them into a `MOVE` as part of the regular
/// fixed-point pipeline instead of duplicating that logic here.
fn prune_dead_phis(cfg: &mut Cfg) {
    for block in &mut cfg.blocks {
        block.instructions.retain(|instr| {
            if !instr.is_phi() {
                return true;
            }
            let paths = instr.arg1.as_phi().expect("phi arg1 is a Phi operand");
            !paths.is_empty()
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinOp, Expr, LiteralValue, Program, Stmt};
    use crate::builder::IrBuilder;
    use crate::ir::Type;
    use std::collections::HashSet as StdHashSet;

    fn build(program: &Program) -> Cfg {
        let mut cfg = IrBuilder::new().build(program).unwrap();
        construct_ssa(&mut cfg);
        cfg
    }

    fn while_count_program() -> Program {
        Program {
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
        }
    }

    #[test]
    fn loop_header_gets_a_phi_with_two_paths() {
        let cfg = build(&while_count_program());
        let header = cfg
            .blocks
            .iter()
            .find(|b| b.predecessors.len() == 2)
            .expect("loop header");
        let phi = header.instructions.iter().find(|i| i.is_phi()).expect("phi");
        let paths = phi.arg1.as_phi().unwrap();
        assert_eq!(paths.len(), 2);
        let srcs: StdHashSet<_> = paths.iter().map(|(b, _)| *b).collect();
        assert_eq!(srcs, header.predecessors.iter().copied().collect());
    }

    #[test]
    fn every_temp_version_is_written_once() {
        let cfg = build(&while_count_program());
        let mut seen = StdHashSet::new();
        for block in &cfg.blocks {
            for instr in &block.instructions {
                if let Some(tv) = instr.result.as_temp_version() {
                    assert!(seen.insert(tv), "TempVersion {tv} written twice");
                }
            }
        }
    }

    #[test]
    fn straight_line_program_needs_no_phis() {
        let program = Program {
            statements: vec![
                Stmt::Decl {
                    name: "x".to_string(),
                    ty: Type::Int,
                },
                Stmt::Assign {
                    name: "x".to_string(),
                    value: Expr::Literal(LiteralValue::Int(5)),
                },
                Stmt::Write {
                    value: Expr::Var("x".to_string()),
                },
            ],
        };
        let cfg = build(&program);
        assert!(cfg.blocks.iter().all(|b| b.phis().count() == 0));
    }
}
