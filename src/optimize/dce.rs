//! Dead-code elimination (§4.4).

use crate::ir::{Cfg, Operand, TempVersion};
use std::collections::HashSet;

/// Removes any instruction whose result is an unused `TempVersion` and
/// whose operator has no side effects. Uses are counted across every
/// instruction operand, including the values inside φ path maps.
pub fn run(cfg: &mut Cfg) -> bool {
    let mut used: HashSet<TempVersion> = HashSet::new();
    for block in &cfg.blocks {
        for instr in &block.instructions {
            count_uses(&instr.arg1, &mut used);
            count_uses(&instr.arg2, &mut used);
        }
    }

    let mut changed = false;
    for block in &mut cfg.blocks {
        let before = block.instructions.len();
        block.instructions.retain(|instr| {
            if instr.op.has_side_effects() {
                return true;
            }
            match instr.result.as_temp_version() {
                Some(tv) => used.contains(&tv),
                None => true,
            }
        });
        if block.instructions.len() != before {
            changed = true;
        }
    }
    changed
}

fn count_uses(operand: &Operand, used: &mut HashSet<TempVersion>) {
    match operand {
        Operand::TempVersion(tv) => {
            used.insert(*tv);
        }
        Operand::Phi(paths) => {
            for (_, value) in paths {
                used.insert(*value);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BasicBlock, BlockId, ConstValue, Instruction, Operator, Temp, Type};

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
    fn unused_pure_instruction_is_removed() {
        let mut cfg = Cfg::new();
        let mut block = BasicBlock::new(BlockId(0));
        block.instructions.push(Instruction::mov(
            Operand::Const(ConstValue::Int(1)),
            Operand::TempVersion(tv(0, 0)),
        ));
        block
            .instructions
            .push(Instruction::print(Operand::Const(ConstValue::Int(7))));
        cfg.blocks.push(block);

        assert!(run(&mut cfg));
        assert_eq!(cfg.blocks[0].instructions.len(), 1);
        assert_eq!(cfg.blocks[0].instructions[0].op, Operator::Print);
    }

    #[test]
    fn read_is_never_removed_even_if_unused() {
        let mut cfg = Cfg::new();
        let mut block = BasicBlock::new(BlockId(0));
        block
            .instructions
            .push(Instruction::read(Operand::TempVersion(tv(0, 0))));
        cfg.blocks.push(block);

        assert!(!run(&mut cfg));
        assert_eq!(cfg.blocks[0].instructions.len(), 1);
    }
}
