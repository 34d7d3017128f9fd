//! Block merging (§4.4).

use crate::ir::{BlockId, Cfg, Operator};

/// If block `p` has exactly one successor `s`, and `s` has exactly one
/// predecessor `p`, and `s != p`: folds `s` into `p`. The now-unreachable
/// shell of `s` is left for the next round's unreachable-block elimination
/// to sweep, rather than renumbered here.
pub fn run(cfg: &mut Cfg) -> bool {
    let mut changed = false;
    for p in cfg.block_ids().collect::<Vec<_>>() {
        let target = {
            let block = cfg.block(p);
            (block.successors.len() == 1).then(|| block.successors[0])
        };
        let Some(s) = target else { continue };
        if s == p {
            continue;
        }
        let sole_predecessor = cfg.block(s).predecessors == [p];
        if !sole_predecessor {
            continue;
        }
        merge(cfg, p, s);
        changed = true;
    }
    changed
}

fn merge(cfg: &mut Cfg, p: BlockId, s: BlockId) {
    if cfg.block(p).terminator().is_some_and(|i| i.op == Operator::Goto) {
        cfg.block_mut(p).instructions.pop();
    }

    let mut incoming = cfg.block(s).instructions.clone();
    if incoming.first().is_some_and(|i| i.op == Operator::Label) {
        incoming.remove(0);
    }
    cfg.block_mut(p).instructions.extend(incoming);

    let grandchildren = cfg.block(s).successors.clone();
    cfg.block_mut(p).successors = grandchildren.clone();

    for g in grandchildren {
        let block = cfg.block_mut(g);
        for pred in &mut block.predecessors {
            if *pred == s {
                *pred = p;
            }
        }
        for instr in block.phis_mut() {
            if let Some(paths) = instr.arg1.as_phi_mut() {
                for (src, _) in paths.iter_mut() {
                    if *src == s {
                        *src = p;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicBlock, ConstValue, Instruction, Label, Operand};

    #[test]
    fn merges_a_goto_only_successor_into_its_sole_predecessor() {
        let mut cfg = Cfg::new();
        let mut p = BasicBlock::new(BlockId(0));
        p.instructions.push(Instruction::goto(Label(0)));
        cfg.blocks.push(p);
        let s = cfg.block_for_label(Label(0));
        cfg.add_edge(BlockId(0), s);
        cfg.block_mut(s)
            .instructions
            .push(Instruction::print(Operand::Const(ConstValue::Int(1))));

        assert!(run(&mut cfg));
        let merged = cfg.block(BlockId(0));
        assert!(merged.instructions.iter().any(|i| i.op == Operator::Print));
        assert!(merged.successors.is_empty());
    }
}
