//! Copy propagation (§4.4).

use crate::ir::{Cfg, Operand, Operator, TempVersion};
use std::collections::HashMap;

/// Collects `copies[target] := source` for every `MOVE target <- source`,
/// resolves each to its transitive root, then substitutes `arg1`/`arg2` of
/// every non-φ instruction. φs are never substituted into: doing so can
/// break SSA dominance (a φ's incoming value must remain the value defined
/// on that specific predecessor edge, not a rewritten root from elsewhere).
pub fn run(cfg: &mut Cfg) -> bool {
    let mut copies: HashMap<TempVersion, Operand> = HashMap::new();
    for block in &cfg.blocks {
        for instr in &block.instructions {
            if instr.op == Operator::Move {
                if let Some(target) = instr.result.as_temp_version() {
                    copies.insert(target, instr.arg1.clone());
                }
            }
        }
    }

    let mut changed = false;
    for block in &mut cfg.blocks {
        for instr in &mut block.instructions {
            if instr.is_phi() {
                continue;
            }
            if substitute(&mut instr.arg1, &copies) {
                changed = true;
            }
            if substitute(&mut instr.arg2, &copies) {
                changed = true;
            }
        }
    }
    changed
}

/// Replaces `operand` with its transitive copy-chain root, if any mapping
/// applies. Returns whether the operand actually changed.
fn substitute(operand: &mut Operand, copies: &HashMap<TempVersion, Operand>) -> bool {
    let mut current = operand.clone();
    let mut visited = std::collections::HashSet::new();
    loop {
        match &current {
            Operand::TempVersion(tv) => {
                if !visited.insert(*tv) {
                    break; // defensive cycle guard; SSA def-use is acyclic
                }
                match copies.get(tv) {
                    Some(next) => current = next.clone(),
                    None => break,
                }
            }
            _ => break,
        }
    }
    if current != *operand {
        *operand = current;
        true
    } else {
        false
    }
}
