//! The control-flow graph of basic blocks (`§3`'s `SSA_IC`).

use super::block::{BasicBlock, BlockId};
use super::instr::Instruction;
use super::operand::Label;
use std::collections::HashMap;

/// An ordered sequence of basic blocks; `blocks[0]` is always the entry
/// block. `label_to_block` lets the builder and later passes materialize a
/// jump target lazily, before the block it names has necessarily been
/// populated (§4.1's "block stitching contract").
#[derive(Debug, Clone, Default)]
pub struct Cfg {
    pub blocks: Vec<BasicBlock>,
    pub label_to_block: HashMap<Label, BlockId>,
}

impl Cfg {
    pub fn new() -> Self {
        Cfg::default()
    }

    pub fn entry(&self) -> BlockId {
        BlockId(0)
    }

    pub fn block(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.0]
    }

    pub fn block_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.0]
    }

    /// Creates a fresh, empty block and returns its id.
    pub fn new_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(BasicBlock::new(id));
        id
    }

    /// Returns the block already registered for `label`, creating and
    /// registering a fresh one if this is the label's first mention.
    pub fn block_for_label(&mut self, label: Label) -> BlockId {
        if let Some(&id) = self.label_to_block.get(&label) {
            return id;
        }
        let id = self.new_block();
        self.blocks[id.0].label = Some(label);
        self.label_to_block.insert(label, id);
        id
    }

    /// Records a directed edge `from -> to`, keeping both blocks'
    /// predecessor/successor lists reciprocal (§3 invariant).
    pub fn add_edge(&mut self, from: BlockId, to: BlockId) {
        self.block_mut(from).add_successor(to);
        self.block_mut(to).add_predecessor(from);
    }

    pub fn remove_edge(&mut self, from: BlockId, to: BlockId) {
        self.block_mut(from).remove_successor(to);
        self.block_mut(to).remove_predecessor(from);
    }

    /// Iterates blocks in `bb_sequence` order.
    pub fn block_ids(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.blocks.iter().map(|b| b.id)
    }

    /// Keeps only the blocks whose id satisfies `keep`, renumbering the
    /// survivors to a dense `0..n` range and rewriting every `BlockId`
    /// reference (`predecessors`, `successors`, φ path keys, and
    /// `label_to_block`) to match. Used by unreachable-block elimination
    /// (§4.4), which the spec requires to actually drop blocks from
    /// `bb_sequence` rather than tombstone them in place.
    pub fn retain_blocks(&mut self, keep: impl Fn(BlockId) -> bool) {
        let mut remap: HashMap<BlockId, BlockId> = HashMap::new();
        let mut kept = Vec::new();
        for block in self.blocks.drain(..) {
            if keep(block.id) {
                let new_id = BlockId(kept.len());
                remap.insert(block.id, new_id);
                kept.push(block);
            }
        }
        for block in &mut kept {
            block.id = remap[&block.id];
            block.predecessors.retain(|p| remap.contains_key(p));
            for p in &mut block.predecessors {
                *p = remap[p];
            }
            block.successors.retain(|s| remap.contains_key(s));
            for s in &mut block.successors {
                *s = remap[s];
            }
            for instr in &mut block.instructions {
                if let Some(paths) = instr.arg1.as_phi_mut() {
                    paths.retain(|(src, _)| remap.contains_key(src));
                    for (src, _) in paths.iter_mut() {
                        *src = remap[src];
                    }
                }
            }
        }
        self.blocks = kept;
        self.label_to_block
            .retain(|_, id| remap.contains_key(id));
        for id in self.label_to_block.values_mut() {
            *id = remap[id];
        }
    }

    pub fn instructions(&self, id: BlockId) -> &[Instruction] {
        &self.block(id).instructions
    }
}
