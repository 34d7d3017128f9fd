//! Conditional-branch folding (§4.4).

use crate::ir::{Cfg, Instruction, Operator};

/// Rewrites every `IF arg1 -> Ltrue | Lfalse` whose `arg1` is already
/// `Const` into `GOTO Lkept`, dropping the edge to the branch not taken from
/// both sides.
pub fn run(cfg: &mut Cfg) -> bool {
    let mut changed = false;
    let ids: Vec<_> = cfg.block_ids().collect();
    for id in ids {
        let fold = cfg.block(id).terminator().and_then(|instr| {
            if instr.op != Operator::If {
                return None;
            }
            let truthy = instr.arg1.as_const()?.is_truthy();
            let true_label = instr.arg2.as_label()?;
            let false_label = instr.result.as_label()?;
            Some(if truthy {
                (true_label, false_label)
            } else {
                (false_label, true_label)
            })
        });

        if let Some((kept, dropped)) = fold {
            let dropped_id = cfg.block_for_label(dropped);
            *cfg.block_mut(id).terminator_mut().expect("still has terminator") =
                Instruction::goto(kept);
            cfg.remove_edge(id, dropped_id);
            changed = true;
        }
    }
    changed
}
