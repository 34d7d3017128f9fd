//! Dominance computation: dominator sets, immediate dominators, the
//! dominator tree, and dominance frontiers (§4.2).

use crate::ir::{BlockId, Cfg};
use std::collections::HashSet;

/// The dominance facts SSA construction needs about one [`Cfg`].
pub struct Dominance {
    /// `idom[b]` is `b`'s immediate dominator, or `None` for the entry block.
    idom: Vec<Option<BlockId>>,
    /// Children of each block in the dominator tree.
    children: Vec<Vec<BlockId>>,
    /// The dominance frontier of each block.
    frontier: Vec<Vec<BlockId>>,
}

impl Dominance {
    pub fn idom(&self, b: BlockId) -> Option<BlockId> {
        self.idom[b.0]
    }

    pub fn dom_tree_children(&self, b: BlockId) -> &[BlockId] {
        &self.children[b.0]
    }

    pub fn frontier(&self, b: BlockId) -> &[BlockId] {
        &self.frontier[b.0]
    }

    /// `true` if `a` dominates `b` (reflexively: every block dominates
    /// itself).
    pub fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        let mut cur = b;
        loop {
            if cur == a {
                return true;
            }
            match self.idom[cur.0] {
                Some(next) => cur = next,
                None => return cur == a,
            }
        }
    }

    /// A pre-order walk of the dominator tree starting at `entry`, used by
    /// SSA renaming (§4.3b).
    pub fn preorder(&self, entry: BlockId) -> Vec<BlockId> {
        let mut order = Vec::new();
        let mut stack = vec![entry];
        while let Some(b) = stack.pop() {
            order.push(b);
            // Push in reverse so children are visited in their natural
            // (insertion) order.
            for &child in self.children[b.0].iter().rev() {
                stack.push(child);
            }
        }
        order
    }
}

/// Computes the classical iterative dataflow of §4.2:
/// `Dom(entry) = {entry}`; `Dom(b) = {b} ∪ ⋂_{p ∈ pred(b)} Dom(p)`.
pub fn compute(cfg: &Cfg) -> Dominance {
    let n = cfg.blocks.len();
    let entry = cfg.entry();
    let all: HashSet<BlockId> = cfg.block_ids().collect();

    let mut dom: Vec<HashSet<BlockId>> = (0..n)
        .map(|i| {
            if BlockId(i) == entry {
                let mut s = HashSet::new();
                s.insert(entry);
                s
            } else {
                all.clone()
            }
        })
        .collect();

    let mut changed = true;
    while changed {
        changed = false;
        for id in cfg.block_ids() {
            if id == entry {
                continue;
            }
            let block = cfg.block(id);
            let mut new_dom: Option<HashSet<BlockId>> = None;
            for &pred in &block.predecessors {
                new_dom = Some(match new_dom {
                    None => dom[pred.0].clone(),
                    Some(acc) => acc.intersection(&dom[pred.0]).copied().collect(),
                });
            }
            let mut new_dom = new_dom.unwrap_or_default();
            new_dom.insert(id);
            if new_dom != dom[id.0] {
                dom[id.0] = new_dom;
                changed = true;
            }
        }
    }

    // idom(b) is the strict dominator of b whose own dominator set is
    // largest -- dominators of a node form a chain ordered by dominance, so
    // this picks the one closest to b.
    let mut idom = vec![None; n];
    for id in cfg.block_ids() {
        if id == entry {
            continue;
        }
        let mut best: Option<BlockId> = None;
        for &candidate in dom[id.0].iter().filter(|&&d| d != id) {
            let better = match best {
                None => true,
                Some(b) => dom[candidate.0].len() > dom[b.0].len(),
            };
            if better {
                best = Some(candidate);
            }
        }
        idom[id.0] = best;
    }

    let mut children = vec![Vec::new(); n];
    for id in cfg.block_ids() {
        if let Some(parent) = idom[id.0] {
            children[parent.0].push(id);
        }
    }

    let mut frontier = vec![Vec::new(); n];
    for id in cfg.block_ids() {
        let block = cfg.block(id);
        if block.predecessors.len() < 2 {
            continue;
        }
        for &pred in &block.predecessors {
            let mut runner = pred;
            while Some(runner) != idom[id.0] {
                if !frontier[runner.0].contains(&id) {
                    frontier[runner.0].push(id);
                }
                match idom[runner.0] {
                    Some(next) => runner = next,
                    None => break,
                }
            }
        }
    }

    Dominance {
        idom,
        children,
        frontier,
    }
}
