//! Virtual operand identities.
//!
//! A [`Tmp`] starts life as a virtual `(bank, index)` pair handed out by
//! [`Code::new_tmp`](super::code::Code::new_tmp). An external allocation
//! phase may later rewrite operands so that they name a concrete [`Location`]
//! instead; this crate only provides both shapes and the arenas' numbering.

use std::fmt;

use super::arg::Arg;
use super::reg::Reg;
use super::stack_slot::StackSlotId;
use super::types::Bank;
use crate::x64::registers::{FPR_COUNT, GPR_COUNT};

/// Hash offset separating stack-assigned tmps from registers and virtuals.
const STACK_LOCATION_HASH_BASE: i32 = 0x2000_0000;

/// Where an assigned tmp lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    Reg(Reg),
    Stack { slot: StackSlotId, bank: Bank },
}

/// Operand identity: virtual before allocation, a location after.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tmp {
    Virtual { bank: Bank, index: u32 },
    Assigned(Location),
}

impl Tmp {
    /// Virtual tmp with the given arena index. Use `Code::new_tmp` to draw a
    /// fresh one.
    pub(crate) fn new_virtual(bank: Bank, index: u32) -> Self {
        Tmp::Virtual { bank, index }
    }

    pub fn from_reg(reg: Reg) -> Self {
        Tmp::Assigned(Location::Reg(reg))
    }

    pub fn from_stack(slot: StackSlotId, bank: Bank) -> Self {
        Tmp::Assigned(Location::Stack { slot, bank })
    }

    pub fn bank(self) -> Bank {
        match self {
            Tmp::Virtual { bank, .. } => bank,
            Tmp::Assigned(Location::Reg(reg)) => reg.bank(),
            Tmp::Assigned(Location::Stack { bank, .. }) => bank,
        }
    }

    pub fn is_gp(self) -> bool {
        self.bank().is_gp()
    }

    pub fn is_fp(self) -> bool {
        self.bank().is_fp()
    }

    pub fn is_virtual(self) -> bool {
        matches!(self, Tmp::Virtual { .. })
    }

    pub fn is_reg(self) -> bool {
        self.reg().is_some()
    }

    pub fn reg(self) -> Option<Reg> {
        match self {
            Tmp::Assigned(Location::Reg(reg)) => Some(reg),
            _ => None,
        }
    }

    pub fn is_gpr(self) -> bool {
        self.reg().is_some_and(Reg::is_gp)
    }

    pub fn is_fpr(self) -> bool {
        self.reg().is_some_and(Reg::is_fp)
    }

    /// Arena index of a virtual tmp.
    pub fn virtual_index(self) -> Option<u32> {
        match self {
            Tmp::Virtual { index, .. } => Some(index),
            Tmp::Assigned(_) => None,
        }
    }

    pub fn location(self) -> Option<Location> {
        match self {
            Tmp::Virtual { .. } => None,
            Tmp::Assigned(location) => Some(location),
        }
    }

    /// Structural hash. Registers keep their own hash; virtual tmps are
    /// numbered after the register file, positive for GP and negative for FP.
    pub fn hash(self) -> i32 {
        match self {
            Tmp::Assigned(Location::Reg(reg)) => reg.hash(),
            Tmp::Virtual { bank: Bank::Gp, index } => {
                (GPR_COUNT as i32 + 1).wrapping_add(index as i32)
            }
            Tmp::Virtual { bank: Bank::Fp, index } => {
                (-(FPR_COUNT as i32) - 1).wrapping_sub(index as i32)
            }
            Tmp::Assigned(Location::Stack { slot, bank }) => {
                let hash = STACK_LOCATION_HASH_BASE.wrapping_add(slot.0 as i32);
                match bank {
                    Bank::Gp => hash,
                    Bank::Fp => hash.wrapping_neg(),
                }
            }
        }
    }

    pub fn extract(arg: &Arg) -> Option<Tmp> {
        arg.as_tmp()
    }
}

impl From<Reg> for Tmp {
    fn from(reg: Reg) -> Self {
        Tmp::from_reg(reg)
    }
}

impl fmt::Display for Tmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tmp::Virtual { bank: Bank::Gp, index } => write!(f, "%tmp{index}"),
            Tmp::Virtual { bank: Bank::Fp, index } => write!(f, "%ftmp{index}"),
            Tmp::Assigned(Location::Reg(reg)) => write!(f, "{reg}"),
            Tmp::Assigned(Location::Stack { slot, .. }) => write!(f, "%slot{}", slot.0),
        }
    }
}
