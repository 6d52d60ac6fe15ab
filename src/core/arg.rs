// This module implements Arg, the tagged operand of an Air instruction, together with Role,
// the annotation describing how an instruction touches an operand occurrence. Arg covers
// every operand shape the backend needs: tmps (virtual or assigned), 32-bit and 64-bit
// immediates (plain and bit-pattern flavours), base+offset and base+index*scale addresses,
// abstract stack slot references, outgoing call argument area references, the three
// condition families, width tags and the special marker. Args are small Copy values; an
// operand never owns the storage it names, it refers to tmps and slots by identity or arena
// index. Traversal annotations (role, bank, width) are never stored on the Arg: they come
// from the opcode's argument convention while iterating an instruction. The tmp and "thing"
// iteration helpers rebuild an Arg when a visitor returns a replacement, which is how
// rewriting phases substitute operands. hash() and Display give the structural identity and
// the textual form used by Code's hash and dump.

//! Instruction operands and operand roles.

use std::fmt;

use super::cond::{DoubleCond, RelCond, ResCond};
use super::operand::Operand;
use super::reg::Reg;
use super::stack_slot::StackSlotId;
use super::tmp::Tmp;
use super::types::{Bank, Width};

/// How an instruction touches an operand occurrence.
///
/// "Early" actions happen before the instruction executes, "late" ones
/// after it. Cold uses are uses on a rarely executed path and should not
/// keep a value in a register by themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Read at the start of the instruction.
    Use,
    /// Read at the start, on a cold path.
    ColdUse,
    /// Read at the end of the instruction.
    LateUse,
    LateColdUse,
    /// Written at the end of the instruction.
    Def,
    /// Written, with the bits above the width zero-filled.
    ZDef,
    UseDef,
    UseZDef,
    /// Written at the start of the instruction, clobbering any early use.
    EarlyDef,
    /// Clobbered for the whole instruction.
    Scratch,
    /// Only the address of a memory operand is computed.
    UseAddr,
}

impl Role {
    pub fn is_any_use(self) -> bool {
        matches!(
            self,
            Role::Use
                | Role::ColdUse
                | Role::UseDef
                | Role::UseZDef
                | Role::LateUse
                | Role::LateColdUse
                | Role::Scratch
        )
    }

    pub fn is_cold_use(self) -> bool {
        matches!(self, Role::ColdUse | Role::LateColdUse)
    }

    pub fn is_warm_use(self) -> bool {
        self.is_any_use() && !self.is_cold_use()
    }

    /// The same role on a cold path. Only plain uses change.
    pub fn cooled(self) -> Role {
        match self {
            Role::Use => Role::ColdUse,
            Role::LateUse => Role::LateColdUse,
            other => other,
        }
    }

    pub fn is_early_use(self) -> bool {
        matches!(self, Role::Use | Role::ColdUse | Role::UseDef | Role::UseZDef)
    }

    pub fn is_late_use(self) -> bool {
        matches!(self, Role::LateUse | Role::LateColdUse | Role::Scratch)
    }

    pub fn is_any_def(self) -> bool {
        matches!(
            self,
            Role::Def | Role::UseDef | Role::ZDef | Role::UseZDef | Role::EarlyDef | Role::Scratch
        )
    }

    pub fn is_early_def(self) -> bool {
        matches!(self, Role::EarlyDef | Role::Scratch)
    }

    pub fn is_late_def(self) -> bool {
        matches!(self, Role::Def | Role::UseDef | Role::ZDef | Role::UseZDef)
    }

    pub fn is_zdef(self) -> bool {
        matches!(self, Role::ZDef | Role::UseZDef)
    }
}

/// Discriminant of an [`Arg`], with a stable numeric code for hashing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArgKind {
    Tmp,
    Imm,
    BigImm,
    BitImm,
    BitImm64,
    Addr,
    Stack,
    CallArg,
    Index,
    RelCond,
    ResCond,
    DoubleCond,
    Special,
    Width,
}

impl ArgKind {
    pub fn code(self) -> i32 {
        match self {
            ArgKind::Tmp => 1,
            ArgKind::Imm => 2,
            ArgKind::BigImm => 3,
            ArgKind::BitImm => 4,
            ArgKind::BitImm64 => 5,
            ArgKind::Addr => 6,
            ArgKind::Stack => 7,
            ArgKind::CallArg => 8,
            ArgKind::Index => 9,
            ArgKind::RelCond => 10,
            ArgKind::ResCond => 11,
            ArgKind::DoubleCond => 12,
            ArgKind::Special => 13,
            ArgKind::Width => 14,
        }
    }
}

/// Instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Tmp(Tmp),
    /// Immediate used as a number.
    Imm(i32),
    BigImm { low: i32, high: i32 },
    /// Immediate used as a bit pattern.
    BitImm(i32),
    BitImm64 { low: i32, high: i32 },
    Addr { base: Tmp, offset: i32 },
    /// Abstract stack storage, resolved to an address once the frame is laid out.
    Stack { slot: StackSlotId, offset: i32 },
    /// Outgoing call argument area, addressed from the stack pointer.
    CallArg { offset: i32 },
    Index { base: Tmp, index: Tmp, scale: u8, offset: i32 },
    RelCond(RelCond),
    ResCond(ResCond),
    DoubleCond(DoubleCond),
    Special,
    Width(Width),
}

impl Arg {
    pub fn tmp(tmp: Tmp) -> Arg {
        Arg::Tmp(tmp)
    }

    pub fn reg(reg: Reg) -> Arg {
        Arg::Tmp(Tmp::from_reg(reg))
    }

    pub fn imm(value: i32) -> Arg {
        Arg::Imm(value)
    }

    pub fn big_imm(low: i32, high: i32) -> Arg {
        Arg::BigImm { low, high }
    }

    pub fn bit_imm(value: i32) -> Arg {
        Arg::BitImm(value)
    }

    pub fn bit_imm64(low: i32, high: i32) -> Arg {
        Arg::BitImm64 { low, high }
    }

    pub fn addr(base: Tmp, offset: i32) -> Arg {
        Arg::Addr { base, offset }
    }

    pub fn stack(slot: StackSlotId, offset: i32) -> Arg {
        Arg::Stack { slot, offset }
    }

    pub fn call_arg(offset: i32) -> Arg {
        Arg::CallArg { offset }
    }

    pub fn index(base: Tmp, index: Tmp, scale: u8, offset: i32) -> Arg {
        Arg::Index {
            base,
            index,
            scale,
            offset,
        }
    }

    pub fn rel_cond(cond: RelCond) -> Arg {
        Arg::RelCond(cond)
    }

    pub fn res_cond(cond: ResCond) -> Arg {
        Arg::ResCond(cond)
    }

    pub fn double_cond(cond: DoubleCond) -> Arg {
        Arg::DoubleCond(cond)
    }

    pub fn special() -> Arg {
        Arg::Special
    }

    pub fn width(width: Width) -> Arg {
        Arg::Width(width)
    }

    /// Address of frame storage at `offset_from_fp`, falling back to an
    /// SP-relative form when the FP-relative one cannot encode `width`.
    pub fn stack_addr(offset_from_fp: i32, frame_size: u32, width: Width) -> Arg {
        let result = Arg::addr(Tmp::from_reg(Reg::CALL_FRAME), offset_from_fp);
        if result.is_valid_form(width) {
            return result;
        }
        Arg::addr(
            Tmp::from_reg(Reg::STACK_POINTER),
            offset_from_fp.wrapping_add(frame_size as i32),
        )
    }

    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Tmp(_) => ArgKind::Tmp,
            Arg::Imm(_) => ArgKind::Imm,
            Arg::BigImm { .. } => ArgKind::BigImm,
            Arg::BitImm(_) => ArgKind::BitImm,
            Arg::BitImm64 { .. } => ArgKind::BitImm64,
            Arg::Addr { .. } => ArgKind::Addr,
            Arg::Stack { .. } => ArgKind::Stack,
            Arg::CallArg { .. } => ArgKind::CallArg,
            Arg::Index { .. } => ArgKind::Index,
            Arg::RelCond(_) => ArgKind::RelCond,
            Arg::ResCond(_) => ArgKind::ResCond,
            Arg::DoubleCond(_) => ArgKind::DoubleCond,
            Arg::Special => ArgKind::Special,
            Arg::Width(_) => ArgKind::Width,
        }
    }

    pub fn is_tmp(&self) -> bool {
        matches!(self, Arg::Tmp(_))
    }

    pub fn is_some_imm(&self) -> bool {
        matches!(self, Arg::Imm(_) | Arg::BitImm(_))
    }

    pub fn is_some_big_imm(&self) -> bool {
        matches!(self, Arg::BigImm { .. } | Arg::BitImm64 { .. })
    }

    pub fn is_stack(&self) -> bool {
        matches!(self, Arg::Stack { .. })
    }

    pub fn is_memory(&self) -> bool {
        matches!(
            self,
            Arg::Addr { .. } | Arg::Stack { .. } | Arg::CallArg { .. } | Arg::Index { .. }
        )
    }

    /// Memory that lives in the current frame.
    pub fn is_stack_memory(&self) -> bool {
        match self {
            Arg::Addr { base, .. } => {
                matches!(base.reg(), Some(reg) if reg == Reg::CALL_FRAME || reg == Reg::STACK_POINTER)
            }
            Arg::Stack { .. } | Arg::CallArg { .. } => true,
            _ => false,
        }
    }

    pub fn is_condition(&self) -> bool {
        matches!(self, Arg::RelCond(_) | Arg::ResCond(_) | Arg::DoubleCond(_))
    }

    pub fn is_width(&self) -> bool {
        matches!(self, Arg::Width(_))
    }

    pub fn is_special(&self) -> bool {
        matches!(self, Arg::Special)
    }

    /// Operands that carry a value liveness has to track.
    pub fn is_alive(&self) -> bool {
        self.is_tmp() || self.is_stack()
    }

    pub fn as_tmp(&self) -> Option<Tmp> {
        match *self {
            Arg::Tmp(tmp) => Some(tmp),
            _ => None,
        }
    }

    pub fn as_reg(&self) -> Option<Reg> {
        self.as_tmp().and_then(Tmp::reg)
    }

    pub fn is_reg(&self) -> bool {
        self.as_reg().is_some()
    }

    pub fn is_gp_tmp(&self) -> bool {
        self.as_tmp().is_some_and(Tmp::is_gp)
    }

    pub fn is_fp_tmp(&self) -> bool {
        self.as_tmp().is_some_and(Tmp::is_fp)
    }

    /// Value of a 32-bit immediate.
    pub fn value(&self) -> Option<i32> {
        match *self {
            Arg::Imm(value) | Arg::BitImm(value) => Some(value),
            _ => None,
        }
    }

    /// `(low, high)` halves of a 64-bit immediate.
    pub fn big_value(&self) -> Option<(i32, i32)> {
        match *self {
            Arg::BigImm { low, high } | Arg::BitImm64 { low, high } => Some((low, high)),
            _ => None,
        }
    }

    pub fn base(&self) -> Option<Tmp> {
        match *self {
            Arg::Addr { base, .. } | Arg::Index { base, .. } => Some(base),
            _ => None,
        }
    }

    pub fn offset(&self) -> Option<i32> {
        match *self {
            Arg::Addr { offset, .. }
            | Arg::Index { offset, .. }
            | Arg::Stack { offset, .. }
            | Arg::CallArg { offset } => Some(offset),
            _ => None,
        }
    }

    pub fn stack_slot(&self) -> Option<StackSlotId> {
        match *self {
            Arg::Stack { slot, .. } => Some(slot),
            _ => None,
        }
    }

    pub fn as_width(&self) -> Option<Width> {
        match *self {
            Arg::Width(width) => Some(width),
            _ => None,
        }
    }

    pub fn is_gp(&self) -> bool {
        match self {
            Arg::Tmp(tmp) => tmp.is_gp(),
            _ => true,
        }
    }

    pub fn is_fp(&self) -> bool {
        match self {
            Arg::Tmp(tmp) => tmp.is_fp(),
            Arg::Addr { .. }
            | Arg::Index { .. }
            | Arg::Stack { .. }
            | Arg::CallArg { .. }
            | Arg::BigImm { .. } => true,
            Arg::Imm(_)
            | Arg::BitImm(_)
            | Arg::BitImm64 { .. }
            | Arg::RelCond(_)
            | Arg::ResCond(_)
            | Arg::DoubleCond(_)
            | Arg::Width(_)
            | Arg::Special => false,
        }
    }

    /// Whether the operand pins down a bank on its own. Memory can be read
    /// into either bank.
    pub fn has_type(&self) -> bool {
        matches!(
            self,
            Arg::Imm(_) | Arg::BitImm(_) | Arg::BitImm64 { .. } | Arg::Tmp(_)
        )
    }

    pub fn bank(&self) -> Bank {
        if self.is_gp() {
            Bank::Gp
        } else {
            Bank::Fp
        }
    }

    pub fn is_bank(&self, bank: Bank) -> bool {
        match bank {
            Bank::Gp => self.is_gp(),
            Bank::Fp => self.is_fp(),
        }
    }

    pub fn is_compatible_bank(&self, other: &Arg) -> bool {
        if self.has_type() {
            return other.is_bank(self.bank());
        }
        if other.has_type() {
            return self.is_bank(other.bank());
        }
        true
    }

    pub fn is_valid_imm_form(value: i64) -> bool {
        i32::try_from(value).is_ok()
    }

    pub fn is_valid_scale(scale: u8) -> bool {
        matches!(scale, 1 | 2 | 4 | 8)
    }

    pub fn log_scale(scale: u8) -> Option<u32> {
        Self::is_valid_scale(scale).then(|| scale.trailing_zeros())
    }

    /// Whether the operand can be encoded for an access of `width`.
    pub fn is_valid_form(&self, _width: Width) -> bool {
        match *self {
            Arg::Index { scale, .. } => Self::is_valid_scale(scale),
            _ => true,
        }
    }

    pub fn is_invertible(&self) -> bool {
        match *self {
            Arg::RelCond(_) | Arg::DoubleCond(_) => true,
            Arg::ResCond(cond) => cond.invert().is_some(),
            _ => false,
        }
    }

    /// The condition testing the opposite outcome.
    pub fn inverted(&self) -> Option<Arg> {
        match *self {
            Arg::RelCond(cond) => Some(Arg::RelCond(cond.invert())),
            Arg::ResCond(cond) => cond.invert().map(Arg::ResCond),
            Arg::DoubleCond(cond) => Some(Arg::DoubleCond(cond.invert())),
            _ => None,
        }
    }

    /// Offer every tmp the operand mentions to `func`; returns a rebuilt
    /// operand if any tmp was replaced.
    pub fn for_each_tmp_fast<F>(&self, mut func: F) -> Option<Arg>
    where
        F: FnMut(Tmp) -> Option<Tmp>,
    {
        match *self {
            Arg::Tmp(tmp) => func(tmp).map(Arg::Tmp),
            Arg::Addr { base, offset } => func(base).map(|base| Arg::Addr { base, offset }),
            Arg::Index {
                base,
                index,
                scale,
                offset,
            } => {
                let new_base = func(base);
                let new_index = func(index);
                if new_base.is_none() && new_index.is_none() {
                    return None;
                }
                Some(Arg::Index {
                    base: new_base.unwrap_or(base),
                    index: new_index.unwrap_or(index),
                    scale,
                    offset,
                })
            }
            _ => None,
        }
    }

    /// Like [`Arg::for_each_tmp_fast`] with the occurrence's annotations.
    /// Tmps inside an address are GP uses of pointer width, or of the
    /// access width when only the address is computed.
    pub fn for_each_tmp<F>(&self, role: Role, bank: Bank, width: Width, mut func: F) -> Option<Arg>
    where
        F: FnMut(Tmp, Role, Bank, Width) -> Option<Tmp>,
    {
        let address_width = if role == Role::UseAddr { width } else { Width::PTR };
        match *self {
            Arg::Tmp(tmp) => func(tmp, role, bank, width).map(Arg::Tmp),
            Arg::Addr { base, offset } => func(base, Role::Use, Bank::Gp, address_width)
                .map(|base| Arg::Addr { base, offset }),
            Arg::Index {
                base,
                index,
                scale,
                offset,
            } => {
                let new_base = func(base, Role::Use, Bank::Gp, address_width);
                let new_index = func(index, Role::Use, Bank::Gp, address_width);
                if new_base.is_none() && new_index.is_none() {
                    return None;
                }
                Some(Arg::Index {
                    base: new_base.unwrap_or(base),
                    index: new_index.unwrap_or(index),
                    scale,
                    offset,
                })
            }
            _ => None,
        }
    }

    pub fn uses_tmp(&self, expected: Tmp) -> bool {
        let mut found = false;
        self.for_each_tmp_fast(|tmp| {
            found |= tmp == expected;
            None
        });
        found
    }

    /// Whether the operand denotes a `T`.
    pub fn is<T: Operand>(&self) -> bool {
        T::extract(self).is_some()
    }

    pub fn extract<T: Operand>(&self) -> Option<T> {
        T::extract(self)
    }

    /// Offer every `T` inside the operand to `func`, e.g.
    /// `arg.for_each::<StackSlotId, _>(role, bank, width, ...)`.
    pub fn for_each<T, F>(&self, role: Role, bank: Bank, width: Width, func: F) -> Option<Arg>
    where
        T: Operand,
        F: FnMut(T, Role, Bank, Width) -> Option<T>,
    {
        T::for_each(self, role, bank, width, func)
    }

    pub fn for_each_fast<T, F>(&self, func: F) -> Option<Arg>
    where
        T: Operand,
        F: FnMut(T) -> Option<T>,
    {
        T::for_each_fast(self, func)
    }

    /// Structural hash: kind code plus payload, 32-bit wrapping.
    pub fn hash(&self) -> u32 {
        let mut result = self.kind().code();
        match *self {
            Arg::Special => {}
            Arg::Tmp(tmp) => result = result.wrapping_add(tmp.hash()),
            Arg::Imm(value) | Arg::BitImm(value) => result = result.wrapping_add(value),
            Arg::BigImm { low, high } | Arg::BitImm64 { low, high } => {
                result = result.wrapping_add(low).wrapping_add(high);
            }
            Arg::CallArg { offset } => result = result.wrapping_add(offset),
            Arg::RelCond(cond) => result = result.wrapping_add(cond.code()),
            Arg::ResCond(cond) => result = result.wrapping_add(cond.code()),
            Arg::DoubleCond(cond) => result = result.wrapping_add(cond.code()),
            Arg::Width(width) => result = result.wrapping_add(width.bits() as i32),
            Arg::Addr { base, offset } => {
                result = result.wrapping_add(offset).wrapping_add(base.hash());
            }
            Arg::Index {
                base,
                index,
                scale,
                offset,
            } => {
                result = result
                    .wrapping_add(offset)
                    .wrapping_add(i32::from(scale))
                    .wrapping_add(base.hash())
                    .wrapping_add(index.hash());
            }
            Arg::Stack { slot, offset } => {
                result = result.wrapping_add(offset).wrapping_add(slot.0 as i32);
            }
        }
        result as u32
    }
}

impl From<Tmp> for Arg {
    fn from(tmp: Tmp) -> Self {
        Arg::Tmp(tmp)
    }
}

impl From<Reg> for Arg {
    fn from(reg: Reg) -> Self {
        Arg::reg(reg)
    }
}

/// Writes `offset` unless it is zero.
struct OptionalOffset(i32);

impl fmt::Display for OptionalOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 != 0 {
            write!(f, "{}", self.0)?;
        }
        Ok(())
    }
}

/// Hex digits with a leading minus for negative values.
struct SignedHex(i32);

impl fmt::Display for SignedHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "{:x}", self.0.unsigned_abs())
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Arg::Tmp(tmp) => write!(f, "{tmp}"),
            Arg::Imm(value) | Arg::BitImm(value) => write!(f, "${value}"),
            Arg::BigImm { low, high } | Arg::BitImm64 { low, high } => {
                write!(f, "$0x{}:{}", SignedHex(high), SignedHex(low))
            }
            Arg::Addr { base, offset } => write!(f, "{}({base})", OptionalOffset(offset)),
            Arg::Index {
                base,
                index,
                scale,
                offset,
            } => {
                write!(f, "{}({base},{index}", OptionalOffset(offset))?;
                if scale != 1 {
                    write!(f, ",{scale}")?;
                }
                f.write_str(")")
            }
            Arg::Stack { slot, offset } => write!(f, "{}({slot})", OptionalOffset(offset)),
            Arg::CallArg { offset } => write!(f, "{}(callArg)", OptionalOffset(offset)),
            Arg::RelCond(cond) => write!(f, "{cond}"),
            Arg::ResCond(cond) => write!(f, "{cond}"),
            Arg::DoubleCond(cond) => write!(f, "{cond}"),
            Arg::Special => f.write_str("special"),
            Arg::Width(width) => write!(f, "{width}"),
        }
    }
}
