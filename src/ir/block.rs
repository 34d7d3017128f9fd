//! Basic blocks, indexed by position in the owning CFG's block vector.

use super::instr::Instruction;
use super::operand::Label;

/// An index into `Cfg::blocks`. Using an index rather than a shared pointer
/// keeps the CFG's predecessor/successor cycles free of ownership cycles and
/// makes block identity trivial to hash and compare (§9 design note).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub usize);

/// A maximal straight-line run of instructions with a single entry and, once
/// the builder has finished, a single control-transferring exit.
#[derive(Debug, Clone)]
pub struct BasicBlock {
    pub id: BlockId,
    pub label: Option<Label>,
    pub instructions: Vec<Instruction>,
    /// Insertion order is significant: it is the order φ paths key against.
    pub predecessors: Vec<BlockId>,
    pub successors: Vec<BlockId>,
}

impl BasicBlock {
    pub fn new(id: BlockId) -> Self {
        BasicBlock {
            id,
            label: None,
            instructions: Vec::new(),
            predecessors: Vec::new(),
            successors: Vec::new(),
        }
    }

    pub fn add_predecessor(&mut self, pred: BlockId) {
        if !self.predecessors.contains(&pred) {
            self.predecessors.push(pred);
        }
    }

    pub fn add_successor(&mut self, succ: BlockId) {
        if !self.successors.contains(&succ) {
            self.successors.push(succ);
        }
    }

    pub fn remove_predecessor(&mut self, pred: BlockId) {
        self.predecessors.retain(|&p| p != pred);
    }

    pub fn remove_successor(&mut self, succ: BlockId) {
        self.successors.retain(|&s| s != succ);
    }

    /// Every φ in this block, in the order they appear (immediately after
    /// the leading `LABEL`, per §3's layout invariant).
    pub fn phis(&self) -> impl Iterator<Item = &Instruction> {
        self.instructions.iter().filter(|i| i.is_phi())
    }

    pub fn phis_mut(&mut self) -> impl Iterator<Item = &mut Instruction> {
        self.instructions.iter_mut().filter(|i| i.is_phi())
    }

    /// The trailing control-transfer instruction, if the block has one.
    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|i| i.op.is_terminator())
    }

    pub fn terminator_mut(&mut self) -> Option<&mut Instruction> {
        if self
            .instructions
            .last()
            .is_some_and(|i| i.op.is_terminator())
        {
            self.instructions.last_mut()
        } else {
            None
        }
    }
}
