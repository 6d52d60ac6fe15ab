//! Things an operand can denote.
//!
//! [`Operand`] lets traversal code be written once and instantiated for
//! whole args, tmps, registers or stack slots, e.g.
//! `inst.for_each::<Tmp, _>(...)` visits every tmp an instruction touches.

use super::arg::{Arg, Role};
use super::reg::Reg;
use super::stack_slot::{StackSlot, StackSlotId};
use super::tmp::Tmp;
use super::types::{Bank, Width};

pub trait Operand: Copy {
    /// The `Self` an operand directly denotes, if any.
    fn extract(arg: &Arg) -> Option<Self>;

    /// Offer every `Self` inside `arg` to `func`. Returns the rebuilt operand
    /// when `func` replaced something.
    fn for_each_fast<F>(arg: &Arg, func: F) -> Option<Arg>
    where
        F: FnMut(Self) -> Option<Self>;

    /// Like [`Operand::for_each_fast`], with the occurrence's role, bank and
    /// width.
    fn for_each<F>(arg: &Arg, role: Role, bank: Bank, width: Width, func: F) -> Option<Arg>
    where
        F: FnMut(Self, Role, Bank, Width) -> Option<Self>;
}

impl Operand for Arg {
    fn extract(arg: &Arg) -> Option<Self> {
        Some(*arg)
    }

    fn for_each_fast<F>(arg: &Arg, mut func: F) -> Option<Arg>
    where
        F: FnMut(Self) -> Option<Self>,
    {
        func(*arg)
    }

    fn for_each<F>(arg: &Arg, role: Role, bank: Bank, width: Width, mut func: F) -> Option<Arg>
    where
        F: FnMut(Self, Role, Bank, Width) -> Option<Self>,
    {
        func(*arg, role, bank, width)
    }
}

impl Operand for Tmp {
    fn extract(arg: &Arg) -> Option<Self> {
        Tmp::extract(arg)
    }

    fn for_each_fast<F>(arg: &Arg, func: F) -> Option<Arg>
    where
        F: FnMut(Self) -> Option<Self>,
    {
        arg.for_each_tmp_fast(func)
    }

    fn for_each<F>(arg: &Arg, role: Role, bank: Bank, width: Width, func: F) -> Option<Arg>
    where
        F: FnMut(Self, Role, Bank, Width) -> Option<Self>,
    {
        arg.for_each_tmp(role, bank, width, func)
    }
}

impl Operand for Reg {
    fn extract(arg: &Arg) -> Option<Self> {
        Reg::extract(arg)
    }

    fn for_each_fast<F>(arg: &Arg, mut func: F) -> Option<Arg>
    where
        F: FnMut(Self) -> Option<Self>,
    {
        arg.for_each_tmp_fast(|tmp| func(tmp.reg()?).map(Tmp::from_reg))
    }

    fn for_each<F>(arg: &Arg, role: Role, bank: Bank, width: Width, mut func: F) -> Option<Arg>
    where
        F: FnMut(Self, Role, Bank, Width) -> Option<Self>,
    {
        arg.for_each_tmp(role, bank, width, |tmp, role, bank, width| {
            func(tmp.reg()?, role, bank, width).map(Tmp::from_reg)
        })
    }
}

impl Operand for StackSlotId {
    fn extract(arg: &Arg) -> Option<Self> {
        StackSlot::extract(arg)
    }

    fn for_each_fast<F>(arg: &Arg, func: F) -> Option<Arg>
    where
        F: FnMut(Self) -> Option<Self>,
    {
        StackSlot::for_each_fast(arg, func)
    }

    fn for_each<F>(arg: &Arg, role: Role, bank: Bank, width: Width, func: F) -> Option<Arg>
    where
        F: FnMut(Self, Role, Bank, Width) -> Option<Self>,
    {
        StackSlot::for_each(arg, role, bank, width, func)
    }
}
