// This module implements Code, the owning container for one compilation unit of Air. Code
// holds the block arena, the stack slot arena and the two independent virtual tmp counters
// (GP and FP never share a numbering space), together with the frame facts phases agree on:
// the outgoing call argument area size, the frame size written by stack allocation and the
// set of pinned registers. Everything inside a Code refers to blocks, slots and tmps by index,
// so the structure stays relocatable and Rust's ownership gives phases exclusive access
// through &mut Code. hash() folds blocks, instructions, successor indices and stack slots
// into a 32-bit structural hash that deliberately ignores frequencies; Display is the
// deterministic text dump. validate() checks that every index stored in the IR points inside
// its arena, which the phase harness runs after each phase.

//! The Air compilation unit.

use std::fmt;
use std::ops::{Index, IndexMut};

use super::basic_block::{BasicBlock, BlockId};
use super::error::{AirError, AirResult};
use super::reg::{Reg, RegBitSet};
use super::stack_slot::{StackSlot, StackSlotId, StackSlotKind};
use super::tmp::{Location, Tmp};
use super::types::Bank;

/// Alignment of the stack pointer at call boundaries.
pub const STACK_ALIGNMENT_BYTES: u32 = 16;

const BLOCK_HASH_MULTIPLIER: u32 = 1_000_001;
const INST_HASH_MULTIPLIER: u32 = 97;
const SUCCESSOR_HASH_MULTIPLIER: u32 = 7;
const STACK_SLOT_HASH_MULTIPLIER: u32 = 101;

fn round_up_to_stack_alignment(size: u32) -> AirResult<u32> {
    size.checked_next_multiple_of(STACK_ALIGNMENT_BYTES)
        .ok_or(AirError::CallArgAreaTooLarge { size })
}

#[derive(Debug, Clone, Default)]
pub struct Code {
    blocks: Vec<BasicBlock>,
    stack_slots: Vec<StackSlot>,
    gp_tmp_count: u32,
    fp_tmp_count: u32,
    call_arg_area_size: u32,
    frame_size: u32,
    pinned_registers: RegBitSet,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an empty block with frequency 1.
    pub fn add_block(&mut self) -> BlockId {
        self.add_block_with_frequency(1.0)
    }

    pub fn add_block_with_frequency(&mut self, frequency: f64) -> BlockId {
        let id = BlockId(self.blocks.len() as u32);
        log::trace!("add block {id} (frequency {frequency})");
        self.blocks.push(BasicBlock::new(id, frequency));
        id
    }

    pub fn add_stack_slot(&mut self, byte_size: u32, kind: StackSlotKind) -> StackSlotId {
        let id = StackSlotId(self.stack_slots.len() as u32);
        log::trace!("add {kind:?} stack slot {id} of {byte_size} bytes");
        self.stack_slots.push(StackSlot::new(id, byte_size, kind));
        id
    }

    /// Fresh virtual tmp from the `bank` arena.
    pub fn new_tmp(&mut self, bank: Bank) -> Tmp {
        let counter = match bank {
            Bank::Gp => &mut self.gp_tmp_count,
            Bank::Fp => &mut self.fp_tmp_count,
        };
        let tmp = Tmp::new_virtual(bank, *counter);
        *counter += 1;
        log::trace!("new tmp {tmp}");
        tmp
    }

    pub fn tmp_count(&self, bank: Bank) -> u32 {
        match bank {
            Bank::Gp => self.gp_tmp_count,
            Bank::Fp => self.fp_tmp_count,
        }
    }

    pub fn blocks(&self) -> &[BasicBlock] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [BasicBlock] {
        &mut self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.index())
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(id.index())
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    pub fn stack_slots(&self) -> &[StackSlot] {
        &self.stack_slots
    }

    pub fn stack_slots_mut(&mut self) -> &mut [StackSlot] {
        &mut self.stack_slots
    }

    pub fn stack_slot(&self, id: StackSlotId) -> Option<&StackSlot> {
        self.stack_slots.get(id.index())
    }

    pub fn stack_slot_mut(&mut self, id: StackSlotId) -> Option<&mut StackSlot> {
        self.stack_slots.get_mut(id.index())
    }

    pub fn call_arg_area_size(&self) -> u32 {
        self.call_arg_area_size
    }

    /// Grow the outgoing argument area to hold `size` bytes. Never shrinks.
    pub fn request_call_arg_area_size(&mut self, size: u32) -> AirResult<()> {
        let aligned = round_up_to_stack_alignment(size)?;
        self.call_arg_area_size = self.call_arg_area_size.max(aligned);
        Ok(())
    }

    pub fn frame_size(&self) -> u32 {
        self.frame_size
    }

    pub fn set_frame_size(&mut self, frame_size: u32) {
        self.frame_size = frame_size;
    }

    /// Keep `reg` away from allocation for the whole unit.
    pub fn pin_register(&mut self, reg: Reg) {
        self.pinned_registers.set(reg);
    }

    pub fn pin_registers(&mut self, regs: &RegBitSet) {
        self.pinned_registers.union(regs);
    }

    pub fn unpin_register(&mut self, reg: Reg) {
        self.pinned_registers.clear(reg);
    }

    pub fn is_pinned(&self, reg: Reg) -> bool {
        self.pinned_registers.contains(reg)
    }

    pub fn pinned_registers(&self) -> RegBitSet {
        self.pinned_registers
    }

    /// Pinned registers a prologue has to preserve.
    pub fn pinned_callee_saves(&self) -> RegBitSet {
        let mut saves = Reg::callee_saves();
        saves.intersect(&self.pinned_registers);
        saves
    }

    /// Rebuild every block's predecessor list from the successor edges.
    pub fn recompute_predecessors(&mut self) -> AirResult<()> {
        self.validate_successors()?;
        for block in &mut self.blocks {
            block.predecessors_mut().clear();
        }
        for from in 0..self.blocks.len() {
            let edges: Vec<BlockId> = self.blocks[from].successor_blocks().collect();
            let from = BlockId(from as u32);
            for to in edges {
                let predecessors = self.blocks[to.index()].predecessors_mut();
                if !predecessors.contains(&from) {
                    predecessors.push(from);
                }
            }
        }
        Ok(())
    }

    fn validate_successors(&self) -> AirResult<()> {
        for block in &self.blocks {
            for target in block.successor_blocks() {
                if target.index() >= self.blocks.len() {
                    return Err(AirError::DanglingReference {
                        what: format!("successor {target} of block {}", block.index()),
                    });
                }
            }
        }
        Ok(())
    }

    fn validate_tmp(&self, tmp: Tmp) -> Result<(), String> {
        match tmp {
            Tmp::Virtual { bank, index } if index >= self.tmp_count(bank) => {
                Err(format!("{tmp} beyond the {bank} tmp arena"))
            }
            Tmp::Assigned(Location::Stack { slot, .. }) if slot.index() >= self.stack_slots.len() => {
                Err(format!("{tmp} names a missing stack slot"))
            }
            _ => Ok(()),
        }
    }

    /// Check that every block, slot and tmp index stored in the IR lies
    /// inside its arena.
    pub fn validate(&self) -> AirResult<()> {
        self.validate_successors()?;
        for block in &self.blocks {
            if let Some(pred) = block
                .predecessors()
                .iter()
                .find(|pred| pred.index() >= self.blocks.len())
            {
                return Err(AirError::DanglingReference {
                    what: format!("predecessor {pred} of block {}", block.index()),
                });
            }
            for inst in block.insts() {
                for arg in inst.args() {
                    if let Some(slot) = arg.stack_slot() {
                        if slot.index() >= self.stack_slots.len() {
                            return Err(AirError::DanglingReference {
                                what: format!("{slot} in `{inst}` of block {}", block.index()),
                            });
                        }
                    }
                    let mut problem = None;
                    arg.for_each_tmp_fast(|tmp| {
                        if problem.is_none() {
                            problem = self.validate_tmp(tmp).err();
                        }
                        None
                    });
                    if let Some(problem) = problem {
                        return Err(AirError::DanglingReference {
                            what: format!("{problem} in `{inst}` of block {}", block.index()),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Structural hash of blocks, instructions, successor indices and stack
    /// slots. Frequencies do not contribute.
    pub fn hash(&self) -> u32 {
        let mut result: u32 = 0;
        for block in &self.blocks {
            result = result.wrapping_mul(BLOCK_HASH_MULTIPLIER);
            for inst in block.insts() {
                result = result
                    .wrapping_mul(INST_HASH_MULTIPLIER)
                    .wrapping_add(inst.hash());
            }
            for successor in block.successor_blocks() {
                result = result
                    .wrapping_mul(SUCCESSOR_HASH_MULTIPLIER)
                    .wrapping_add(successor.0);
            }
        }
        for slot in &self.stack_slots {
            result = result
                .wrapping_mul(STACK_SLOT_HASH_MULTIPLIER)
                .wrapping_add(slot.hash());
        }
        result
    }
}

impl Index<BlockId> for Code {
    type Output = BasicBlock;

    fn index(&self, id: BlockId) -> &BasicBlock {
        &self.blocks[id.index()]
    }
}

impl IndexMut<BlockId> for Code {
    fn index_mut(&mut self, id: BlockId) -> &mut BasicBlock {
        &mut self.blocks[id.index()]
    }
}

impl Index<StackSlotId> for Code {
    type Output = StackSlot;

    fn index(&self, id: StackSlotId) -> &StackSlot {
        &self.stack_slots[id.index()]
    }
}

impl IndexMut<StackSlotId> for Code {
    fn index_mut(&mut self, id: StackSlotId) -> &mut StackSlot {
        &mut self.stack_slots[id.index()]
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            block.print_deep(f)?;
        }
        if !self.stack_slots.is_empty() {
            writeln!(f, "Stack slots:")?;
            for slot in &self.stack_slots {
                writeln!(f, "    {slot}")?;
            }
        }
        if self.frame_size != 0 {
            writeln!(f, "Frame size: {}", self.frame_size)?;
        }
        if self.call_arg_area_size != 0 {
            writeln!(f, "Call arg area size: {}", self.call_arg_area_size)?;
        }
        Ok(())
    }
}
