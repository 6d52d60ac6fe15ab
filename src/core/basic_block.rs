//! Basic blocks.
//!
//! A block owns its instructions and records its control flow edges by
//! [`BlockId`], never by reference. Predecessors are derived data, see
//! [`Code::recompute_predecessors`](super::code::Code::recompute_predecessors).

use std::fmt;

use super::inst::Inst;

/// Index of a block in its [`Code`](super::code::Code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(pub u32);

impl BlockId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Weighted control flow edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Successor {
    pub block: BlockId,
    pub frequency: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    index: BlockId,
    frequency: f64,
    insts: Vec<Inst>,
    successors: Vec<Successor>,
    predecessors: Vec<BlockId>,
}

impl BasicBlock {
    pub(crate) fn new(index: BlockId, frequency: f64) -> Self {
        Self {
            index,
            frequency,
            insts: Vec::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
        }
    }

    pub fn index(&self) -> BlockId {
        self.index
    }

    /// Relative execution weight.
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    /// The instruction vector itself, e.g. as an
    /// [`InsertionSet`](super::insertion_set::InsertionSet) target.
    pub fn insts_mut(&mut self) -> &mut Vec<Inst> {
        &mut self.insts
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn append(&mut self, inst: Inst) {
        self.insts.push(inst);
    }

    pub fn last(&self) -> Option<&Inst> {
        self.insts.last()
    }

    pub fn successors(&self) -> &[Successor] {
        &self.successors
    }

    pub fn successors_mut(&mut self) -> &mut Vec<Successor> {
        &mut self.successors
    }

    pub fn add_successor(&mut self, block: BlockId, frequency: f64) {
        self.successors.push(Successor { block, frequency });
    }

    pub fn successor_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.successors.iter().map(|successor| successor.block)
    }

    pub fn predecessors(&self) -> &[BlockId] {
        &self.predecessors
    }

    pub(crate) fn predecessors_mut(&mut self) -> &mut Vec<BlockId> {
        &mut self.predecessors
    }

    /// Write the block header, its instructions and its edges.
    pub fn print_deep(&self, f: &mut impl fmt::Write) -> fmt::Result {
        writeln!(f, "BB{}: ; frequency = {}", self.index, self.frequency)?;
        if !self.predecessors.is_empty() {
            writeln!(f, "  Predecessors: {}", join(self.predecessors.iter()))?;
        }
        for inst in &self.insts {
            writeln!(f, "    {inst}")?;
        }
        if !self.successors.is_empty() {
            writeln!(f, "  Successors: {}", join(self.successor_blocks()))?;
        }
        Ok(())
    }
}

fn join<T: fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index)
    }
}
