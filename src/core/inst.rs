// This module implements Inst, one Air instruction: an opcode, its ordered operand list and
// the metadata some custom conventions read. Instructions do not know their own argument
// convention; every traversal takes the OpcodeTable the instruction is interpreted against
// and asks it how each operand position is annotated. for_each_arg is the read-only walk
// that liveness and other analyses consume. for_each_arg_mut and the generic for_each::<T>
// let a rewriting phase replace operands or the tmps, registers and slots inside them in
// place. Effects that are not visible through operands or control flow are also a property
// of the convention. hash() and Display feed Code's structural hash and text dump.

//! Air instructions.

use std::fmt;

use super::arg::{Arg, Role};
use super::error::{AirError, AirResult};
use super::opcode::{ArgSpec, Convention, Opcode, OpcodeTable};
use super::operand::Operand;
use super::types::{Bank, ValueType, Width};

/// Per-instruction data read by custom conventions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstMeta {
    #[default]
    None,
    /// Operand annotations of a patchpoint.
    Patch {
        args: Vec<ArgSpec>,
        has_non_arg_effects: bool,
    },
    /// Signature of a native call.
    CCall {
        return_type: ValueType,
        arg_types: Vec<ValueType>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inst {
    opcode: Opcode,
    args: Vec<Arg>,
    meta: InstMeta,
}

impl Inst {
    pub fn new(opcode: Opcode, args: Vec<Arg>) -> Self {
        Self {
            opcode,
            args,
            meta: InstMeta::None,
        }
    }

    pub fn with_meta(opcode: Opcode, args: Vec<Arg>, meta: InstMeta) -> Self {
        Self { opcode, args, meta }
    }

    pub fn patch(args: Vec<Arg>, specs: Vec<ArgSpec>, has_non_arg_effects: bool) -> Self {
        Self::with_meta(
            Opcode::PATCH,
            args,
            InstMeta::Patch {
                args: specs,
                has_non_arg_effects,
            },
        )
    }

    /// Call with operands `callee, [result,] args...`.
    pub fn ccall(return_type: ValueType, arg_types: Vec<ValueType>, args: Vec<Arg>) -> Self {
        Self::with_meta(
            Opcode::CCALL,
            args,
            InstMeta::CCall {
                return_type,
                arg_types,
            },
        )
    }

    pub fn cold_ccall(return_type: ValueType, arg_types: Vec<ValueType>, args: Vec<Arg>) -> Self {
        Self::with_meta(
            Opcode::COLD_CCALL,
            args,
            InstMeta::CCall {
                return_type,
                arg_types,
            },
        )
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut [Arg] {
        &mut self.args
    }

    pub fn meta(&self) -> &InstMeta {
        &self.meta
    }

    pub fn append(&mut self, arg: Arg) {
        self.args.push(arg);
    }

    /// Call `func` with the index and annotation of every operand position
    /// the opcode's convention iterates.
    pub fn for_each_spec<F>(&self, table: &OpcodeTable, mut func: F) -> AirResult<()>
    where
        F: FnMut(usize, ArgSpec),
    {
        match table.convention(self.opcode)? {
            Convention::Default { forms, .. } => {
                let form = forms
                    .iter()
                    .find(|form| form.len() == self.args.len())
                    .ok_or(AirError::NoMatchingForm {
                        opcode: self.opcode.name(),
                        arity: self.args.len(),
                    })?;
                for (index, spec) in form.iter().enumerate() {
                    func(index, *spec);
                }
                Ok(())
            }
            Convention::Custom(custom) => custom.for_each_spec(self, func),
        }
    }

    pub fn for_each_arg<F>(&self, table: &OpcodeTable, mut func: F) -> AirResult<()>
    where
        F: FnMut(&Arg, Role, Bank, Width),
    {
        self.for_each_spec(table, |index, spec| {
            func(&self.args[index], spec.role, spec.bank, spec.width)
        })
    }

    pub fn for_each_arg_mut<F>(&mut self, table: &OpcodeTable, mut func: F) -> AirResult<()>
    where
        F: FnMut(&mut Arg, Role, Bank, Width),
    {
        let mut specs = Vec::with_capacity(self.args.len());
        self.for_each_spec(table, |index, spec| specs.push((index, spec)))?;
        for (index, spec) in specs {
            func(&mut self.args[index], spec.role, spec.bank, spec.width);
        }
        Ok(())
    }

    /// Visit every `T` inside the operands, replacing it with whatever
    /// `func` returns.
    pub fn for_each<T, F>(&mut self, table: &OpcodeTable, mut func: F) -> AirResult<()>
    where
        T: Operand,
        F: FnMut(T, Role, Bank, Width) -> Option<T>,
    {
        self.for_each_arg_mut(table, |arg, role, bank, width| {
            if let Some(replacement) = T::for_each(arg, role, bank, width, &mut func) {
                *arg = replacement;
            }
        })
    }

    pub fn has_non_arg_non_control_effects(&self, table: &OpcodeTable) -> AirResult<bool> {
        match table.convention(self.opcode)? {
            Convention::Default { effects, .. } => Ok(*effects),
            Convention::Custom(custom) => custom.has_non_arg_non_control_effects(self),
        }
    }

    /// Opcode code plus every operand hash, 32-bit wrapping.
    pub fn hash(&self) -> u32 {
        self.args
            .iter()
            .fold(u32::from(self.opcode.code()), |acc, arg| acc.wrapping_add(arg.hash()))
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, arg) in self.args.iter().enumerate() {
            let separator = if i == 0 { " " } else { ", " };
            write!(f, "{separator}{arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::stack_slot::StackSlotId;
    use crate::core::tmp::Tmp;

    fn gp(index: u32) -> Tmp {
        Tmp::new_virtual(Bank::Gp, index)
    }

    #[test]
    fn test_default_form_selected_by_arity() {
        let table = OpcodeTable::standard();
        let inst = Inst::new(Opcode::ADD32, vec![Arg::imm(1), Arg::tmp(gp(0)), Arg::tmp(gp(1))]);
        let mut roles = Vec::new();
        inst.for_each_arg(table, |_, role, _, width| roles.push((role, width)))
            .unwrap();
        assert_eq!(
            roles,
            vec![
                (Role::Use, Width::W32),
                (Role::Use, Width::W32),
                (Role::ZDef, Width::W32)
            ]
        );

        let bad = Inst::new(Opcode::MOVE, vec![Arg::imm(1)]);
        assert_eq!(
            bad.for_each_arg(table, |_, _, _, _| {}),
            Err(AirError::NoMatchingForm {
                opcode: "Move",
                arity: 1
            })
        );
    }

    #[test]
    fn test_unrecognized_opcode() {
        let inst = Inst::new(Opcode::new(900, "Mystery"), vec![]);
        let table = OpcodeTable::standard();
        assert_eq!(
            inst.has_non_arg_non_control_effects(table),
            Err(AirError::UnrecognizedOpcode { opcode: "Mystery" })
        );
    }

    #[test]
    fn test_for_each_tmp_rewrites_in_place() {
        let table = OpcodeTable::standard();
        let mut inst = Inst::new(Opcode::MOVE, vec![Arg::addr(gp(0), 8), Arg::tmp(gp(1))]);
        inst.for_each::<Tmp, _>(table, |tmp, role, _, _| {
            if role != Role::Def {
                return None;
            }
            Some(Tmp::new_virtual(Bank::Gp, tmp.virtual_index()? + 10))
        })
        .unwrap();
        assert_eq!(inst.args()[0], Arg::addr(gp(0), 8));
        assert_eq!(inst.args()[1], Arg::tmp(gp(11)));
    }

    #[test]
    fn test_for_each_slot() {
        let table = OpcodeTable::standard();
        let mut inst = Inst::new(Opcode::MOVE, vec![Arg::stack(StackSlotId(0), 4), Arg::tmp(gp(0))]);
        inst.for_each::<StackSlotId, _>(table, |_, _, _, _| Some(StackSlotId(2)))
            .unwrap();
        assert_eq!(inst.args()[0], Arg::stack(StackSlotId(2), 4));
    }

    #[test]
    fn test_hash_and_display() {
        let inst = Inst::new(Opcode::MOVE, vec![Arg::imm(5), Arg::tmp(gp(0))]);
        assert_eq!(inst.hash(), 1 + 7 + 18);
        assert_eq!(inst.to_string(), "Move $5, %tmp0");
        assert_eq!(Inst::new(Opcode::NOP, vec![]).to_string(), "Nop");
    }
}
