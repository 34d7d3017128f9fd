//! Unreachable-block elimination (§4.4).

use crate::ir::Cfg;
use std::collections::HashSet;

/// Computes the forward-reachable closure from the entry block over
/// successor edges and drops every block outside it from `bb_sequence`,
/// renumbering survivors and every `BlockId` reference to them.
pub fn run(cfg: &mut Cfg) -> bool {
    let entry = cfg.entry();
    let mut reachable = HashSet::new();
    let mut stack = vec![entry];
    while let Some(id) = stack.pop() {
        if reachable.insert(id) {
            for &succ in &cfg.block(id).successors {
                stack.push(succ);
            }
        }
    }

    let dropped_any = cfg.blocks.len() != reachable.len();
    if dropped_any {
        cfg.retain_blocks(|id| reachable.contains(&id));
    }
    dropped_any
}
