//! Physical registers and register sets.
//!
//! A [`Reg`] is an immutable identity drawn from the process-wide catalog
//! described in [`crate::x64::registers`]. The catalog is a compile time
//! table, so every `Reg` is a two byte `Copy` value and comparing registers
//! is comparing `(bank, index)` pairs.
//!
//! [`RegBitSet`] tracks sets of registers (callee-saves, pinned registers)
//! with one bit mask per bank.

use std::fmt;

use super::arg::Arg;
use super::types::Bank;
use crate::x64::registers as x64;

/// Physical register identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reg {
    bank: Bank,
    index: u8,
}

impl Reg {
    /// Register that stack slots are addressed from once the frame is laid out.
    pub const CALL_FRAME: Reg = Reg::new_unchecked(Bank::Gp, x64::FRAME_POINTER);

    pub const STACK_POINTER: Reg = Reg::new_unchecked(Bank::Gp, x64::STACK_POINTER);

    const fn new_unchecked(bank: Bank, index: u8) -> Self {
        Self { bank, index }
    }

    /// General purpose register by encoding index.
    pub fn gpr(index: usize) -> Option<Reg> {
        (index < x64::GPR_COUNT).then(|| Reg::new_unchecked(Bank::Gp, index as u8))
    }

    /// Floating point register by encoding index.
    pub fn fpr(index: usize) -> Option<Reg> {
        (index < x64::FPR_COUNT).then(|| Reg::new_unchecked(Bank::Fp, index as u8))
    }

    pub fn gprs() -> impl Iterator<Item = Reg> {
        (0..x64::GPR_COUNT).map(|i| Reg::new_unchecked(Bank::Gp, i as u8))
    }

    pub fn fprs() -> impl Iterator<Item = Reg> {
        (0..x64::FPR_COUNT).map(|i| Reg::new_unchecked(Bank::Fp, i as u8))
    }

    /// Every register in the catalog, GPRs first.
    pub fn all() -> impl Iterator<Item = Reg> {
        Self::gprs().chain(Self::fprs())
    }

    /// Number of registers in `bank`.
    pub fn count(bank: Bank) -> usize {
        match bank {
            Bank::Gp => x64::GPR_COUNT,
            Bank::Fp => x64::FPR_COUNT,
        }
    }

    pub fn by_name(name: &str) -> Option<Reg> {
        Self::all().find(|reg| reg.name() == name)
    }

    /// Registers a callee must preserve.
    pub fn callee_saves() -> RegBitSet {
        let mut set = RegBitSet::new();
        for reg in Self::all().filter(|reg| reg.is_callee_save()) {
            set.set(reg);
        }
        set
    }

    pub fn bank(self) -> Bank {
        self.bank
    }

    pub fn is_gp(self) -> bool {
        self.bank.is_gp()
    }

    pub fn is_fp(self) -> bool {
        self.bank.is_fp()
    }

    /// Dense index within the register's bank.
    pub fn index(self) -> usize {
        self.index as usize
    }

    pub fn name(self) -> &'static str {
        match self.bank {
            Bank::Gp => x64::GPR_NAMES[self.index()],
            Bank::Fp => x64::FPR_NAMES[self.index()],
        }
    }

    pub fn is_callee_save(self) -> bool {
        match self.bank {
            Bank::Gp => x64::CALLEE_SAVE_GPRS.contains(&self.index),
            Bank::Fp => x64::CALLEE_SAVE_FPRS.contains(&self.index),
        }
    }

    /// Structural hash: positive for GPRs, negative for FPRs.
    pub fn hash(self) -> i32 {
        match self.bank {
            Bank::Gp => 1 + self.index as i32,
            Bank::Fp => -1 - self.index as i32,
        }
    }

    /// The register an operand names directly, if any.
    pub fn extract(arg: &Arg) -> Option<Reg> {
        arg.as_reg()
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.name())
    }
}

/// Bit set for efficiently tracking register sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegBitSet {
    /// Bit mask for each register bank.
    banks: [u64; 2],
}

impl RegBitSet {
    /// Create empty register set.
    pub fn new() -> Self {
        Self { banks: [0; 2] }
    }

    fn slot(bank: Bank) -> usize {
        match bank {
            Bank::Gp => 0,
            Bank::Fp => 1,
        }
    }

    /// Check if register is set.
    pub fn contains(&self, reg: Reg) -> bool {
        (self.banks[Self::slot(reg.bank)] & (1u64 << reg.index)) != 0
    }

    /// Set a register.
    pub fn set(&mut self, reg: Reg) {
        self.banks[Self::slot(reg.bank)] |= 1u64 << reg.index;
    }

    /// Clear a register.
    pub fn clear(&mut self, reg: Reg) {
        self.banks[Self::slot(reg.bank)] &= !(1u64 << reg.index);
    }

    /// Set union with another set.
    pub fn union(&mut self, other: &RegBitSet) {
        for i in 0..self.banks.len() {
            self.banks[i] |= other.banks[i];
        }
    }

    /// Set intersection with another set.
    pub fn intersect(&mut self, other: &RegBitSet) {
        for i in 0..self.banks.len() {
            self.banks[i] &= other.banks[i];
        }
    }

    pub fn is_empty(&self) -> bool {
        self.banks.iter().all(|&mask| mask == 0)
    }

    /// Registers in the set, GPRs first, each bank in index order.
    pub fn iter(&self) -> impl Iterator<Item = Reg> + '_ {
        Reg::all().filter(move |&reg| self.contains(reg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_shape() {
        assert_eq!(Reg::gprs().count(), 16);
        assert_eq!(Reg::fprs().count(), 16);
        assert_eq!(Reg::CALL_FRAME.name(), "rbp");
        assert_eq!(Reg::STACK_POINTER.name(), "rsp");
        assert_eq!(Reg::by_name("xmm3"), Reg::fpr(3));
        assert_eq!(Reg::gpr(16), None);
        assert_eq!(Reg::gpr(0).map(|r| r.to_string()), Some("%rax".to_string()));
    }

    #[test]
    fn test_callee_saves() {
        let saves = Reg::callee_saves();
        let names: Vec<_> = saves.iter().map(|r| r.name()).collect();
        assert_eq!(names, ["rbx", "r12", "r13", "r14", "r15"]);
        assert!(saves.iter().all(Reg::is_gp));
        assert!(!Reg::CALL_FRAME.is_callee_save());
    }

    #[test]
    fn test_hash_partition() {
        for reg in Reg::gprs() {
            assert!(reg.hash() >= 1);
        }
        for reg in Reg::fprs() {
            assert!(reg.hash() <= -1);
        }
        let mut hashes: Vec<_> = Reg::all().map(Reg::hash).collect();
        hashes.sort_unstable();
        hashes.dedup();
        assert_eq!(hashes.len(), 32);
    }

    #[test]
    fn test_regbitset_operations() {
        let mut set = RegBitSet::new();
        let reg = Reg::gpr(5).unwrap();

        assert!(!set.contains(reg));
        set.set(reg);
        assert!(set.contains(reg));
        assert!(!set.contains(Reg::fpr(5).unwrap()));
        set.clear(reg);
        assert!(!set.contains(reg));
        assert!(set.is_empty());
    }

    #[test]
    fn test_regbitset_union_intersect() {
        let mut a = RegBitSet::new();
        a.set(Reg::gpr(1).unwrap());
        a.set(Reg::fpr(2).unwrap());
        let mut b = RegBitSet::new();
        b.set(Reg::fpr(2).unwrap());

        let mut both = a;
        both.intersect(&b);
        assert_eq!(both.iter().collect::<Vec<_>>(), vec![Reg::fpr(2).unwrap()]);

        b.union(&a);
        assert_eq!(b, a);
        b.clear(Reg::gpr(1).unwrap());
        b.clear(Reg::fpr(2).unwrap());
        assert!(b.is_empty());
    }
}
