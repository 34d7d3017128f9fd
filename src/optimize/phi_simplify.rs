//! φ simplification (§4.4).

use crate::ir::{Cfg, Operand, TempVersion};

/// For every φ: drops path entries whose source block is no longer a
/// predecessor (e.g. after branch folding removed that edge), then, if at
/// most one distinct value remains, rewrites the φ to a `MOVE` -- or removes
/// it outright if no sources remain at all.
pub fn run(cfg: &mut Cfg) -> bool {
    let mut changed = false;

    for block in &mut cfg.blocks {
        let preds = block.predecessors.clone();
        for instr in instr_iter_phis(block) {
            let paths = instr.arg1.as_phi_mut().expect("phi carries a Phi operand");
            let before = paths.len();
            paths.retain(|(src, _)| preds.contains(src));
            if paths.len() != before {
                changed = true;
            }

            let mut distinct: Vec<TempVersion> = Vec::new();
            for (_, value) in paths.iter() {
                if !distinct.contains(value) {
                    distinct.push(*value);
                }
            }
            if distinct.len() == 1 {
                instr.rewrite_as_move(Operand::TempVersion(distinct[0]));
                changed = true;
            }
        }

        let before_count = block.instructions.len();
        block
            .instructions
            .retain(|i| !(i.is_phi() && i.arg1.as_phi().is_some_and(Vec::is_empty)));
        if block.instructions.len() != before_count {
            changed = true;
        }
    }

    changed
}

fn instr_iter_phis(
    block: &mut crate::ir::BasicBlock,
) -> impl Iterator<Item = &mut crate::ir::Instruction> {
    block.instructions.iter_mut().filter(|i| i.is_phi())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicBlock, BlockId, Instruction, Temp, Type};

    fn tv(id: u32, version: u32) -> TempVersion {
        TempVersion {
            origin: Temp {
                id,
                ty: Type::Int,
                is_address: false,
            },
            version,
        }
    }

    #[test]
    fn single_remaining_source_becomes_a_move() {
        let mut cfg = Cfg::new();
        let mut block = BasicBlock::new(BlockId(0));
        block.predecessors = vec![BlockId(1)];
        block
            .instructions
            .push(Instruction::phi(tv(0, 2), vec![(BlockId(1), tv(0, 0))]));
        cfg.blocks.push(block);

        assert!(run(&mut cfg));
        assert_eq!(cfg.blocks[0].instructions[0].op, crate::ir::Operator::Move);
    }

    #[test]
    fn zero_remaining_sources_removes_the_phi() {
        let mut cfg = Cfg::new();
        let mut block = BasicBlock::new(BlockId(0));
        block.predecessors = vec![];
        block
            .instructions
            .push(Instruction::phi(tv(0, 2), vec![(BlockId(1), tv(0, 0))]));
        cfg.blocks.push(block);

        assert!(run(&mut cfg));
        assert!(cfg.blocks[0].instructions.is_empty());
    }
}
