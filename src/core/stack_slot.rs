// This module implements abstract stack storage for the Air IR. A StackSlot is created by
// Code::add_stack_slot with an initial byte size and a kind: Locked slots are fixed storage
// requested by the program, Spill slots are scratch storage the allocator may place freely.
// Until the external stack allocation phase assigns a frame-pointer-relative offset, a slot's
// size may only grow (ensure_size); afterwards growing fails with StackSlotAlreadyAllocated.
// Alignment is a pure function of the byte size. Operands refer to slots only through a
// StackSlotId arena index, and the extract/for_each helpers let a rewriting phase substitute
// one slot for another (e.g. when coalescing) without per-call-site matching on Arg.

//! Stack slots: abstract frame storage referenced by index.

use std::fmt;

use super::arg::{Arg, Role};
use super::error::{AirError, AirResult};
use super::types::{Bank, Width};

/// Index of a stack slot in its [`Code`](super::code::Code).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StackSlotId(pub u32);

impl StackSlotId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StackSlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StackSlotKind {
    /// Storage the program asked for; its address may be taken.
    Locked,
    /// Storage introduced for spilling.
    Spill,
}

/// Abstract stack storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackSlot {
    index: StackSlotId,
    byte_size: u32,
    kind: StackSlotKind,
    offset_from_fp: Option<i32>,
}

impl StackSlot {
    pub(crate) fn new(index: StackSlotId, byte_size: u32, kind: StackSlotKind) -> Self {
        Self {
            index,
            byte_size,
            kind,
            offset_from_fp: None,
        }
    }

    pub fn index(&self) -> StackSlotId {
        self.index
    }

    pub fn byte_size(&self) -> u32 {
        self.byte_size
    }

    pub fn kind(&self) -> StackSlotKind {
        self.kind
    }

    pub fn is_locked(&self) -> bool {
        self.kind == StackSlotKind::Locked
    }

    pub fn is_spill(&self) -> bool {
        self.kind == StackSlotKind::Spill
    }

    /// Grow the slot to at least `size` bytes. Never shrinks.
    pub fn ensure_size(&mut self, size: u32) -> AirResult<()> {
        if let Some(offset) = self.offset_from_fp {
            return Err(AirError::StackSlotAlreadyAllocated {
                slot: self.index.0,
                offset,
            });
        }
        self.byte_size = self.byte_size.max(size);
        Ok(())
    }

    pub fn alignment(&self) -> u32 {
        match self.byte_size {
            0 | 1 => 1,
            2 => 2,
            3 | 4 => 4,
            _ => 8,
        }
    }

    pub fn offset_from_fp(&self) -> Option<i32> {
        self.offset_from_fp
    }

    pub fn is_allocated(&self) -> bool {
        self.offset_from_fp.is_some()
    }

    /// Record the slot's final frame position. Only the stack allocation
    /// phase calls this; the size is frozen from here on.
    pub fn set_offset_from_fp(&mut self, offset: i32) {
        log::trace!("{} placed at FP{:+}", self.index, offset);
        self.offset_from_fp = Some(offset);
    }

    /// Structural hash over kind, size and placement.
    pub fn hash(&self) -> u32 {
        let spill = i32::from(self.is_spill());
        let size = (self.byte_size as i32).wrapping_mul(3);
        let offset = self.offset_from_fp.unwrap_or(0).wrapping_mul(7);
        spill.wrapping_add(size).wrapping_add(offset) as u32
    }

    /// The slot a stack operand refers to.
    pub fn extract(arg: &Arg) -> Option<StackSlotId> {
        arg.stack_slot()
    }

    /// Offer the slot of a stack operand to `func`. A returned replacement
    /// yields a new stack operand with the same offset.
    pub fn for_each_fast<F>(arg: &Arg, mut func: F) -> Option<Arg>
    where
        F: FnMut(StackSlotId) -> Option<StackSlotId>,
    {
        match *arg {
            Arg::Stack { slot, offset } => func(slot).map(|replacement| Arg::stack(replacement, offset)),
            _ => None,
        }
    }

    /// Like [`StackSlot::for_each_fast`], passing the occurrence's role, bank
    /// and width along.
    pub fn for_each<F>(arg: &Arg, role: Role, bank: Bank, width: Width, mut func: F) -> Option<Arg>
    where
        F: FnMut(StackSlotId, Role, Bank, Width) -> Option<StackSlotId>,
    {
        match *arg {
            Arg::Stack { slot, offset } => {
                func(slot, role, bank, width).map(|replacement| Arg::stack(replacement, offset))
            }
            _ => None,
        }
    }
}

impl fmt::Display for StackSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_spill() { "spill" } else { "stack" };
        write!(f, "{}{}<{}", prefix, self.index.0, self.byte_size)?;
        if let Some(offset) = self.offset_from_fp {
            write!(f, ", offset = {offset}")?;
        }
        f.write_str(">")
    }
}
