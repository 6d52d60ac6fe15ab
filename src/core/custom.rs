//! Custom argument conventions.
//!
//! Most opcodes annotate operand positions from a fixed form. The opcodes
//! here derive the annotations from the instruction itself: its operand
//! count, its operands, or the metadata it carries.

use super::arg::Role;
use super::error::{AirError, AirResult};
use super::inst::{Inst, InstMeta};
use super::opcode::ArgSpec;
use super::types::{Bank, ValueType, Width};

/// Closed set of custom conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Custom {
    /// Parallel moves in `(src, dst, width)` triples.
    Shuffle,
    /// Operand annotations carried by the instruction.
    Patch,
    /// Native call: callee, optional result, one use per argument.
    CCall,
    /// A [`Custom::CCall`] on a cold path.
    ColdCCall,
}

impl Custom {
    /// Call `func` with each annotated operand position of `inst`.
    pub fn for_each_spec<F>(self, inst: &Inst, mut func: F) -> AirResult<()>
    where
        F: FnMut(usize, ArgSpec),
    {
        match self {
            Custom::Shuffle => shuffle_specs(inst, func),
            Custom::Patch => patch_specs(inst, func),
            Custom::CCall => ccall_specs(inst, func),
            Custom::ColdCCall => ccall_specs(inst, |index, spec| {
                func(
                    index,
                    ArgSpec {
                        role: spec.role.cooled(),
                        ..spec
                    },
                )
            }),
        }
    }

    pub fn has_non_arg_non_control_effects(self, inst: &Inst) -> AirResult<bool> {
        match self {
            Custom::Shuffle => Ok(false),
            Custom::Patch => match inst.meta() {
                InstMeta::Patch {
                    has_non_arg_effects,
                    ..
                } => Ok(*has_non_arg_effects),
                _ => Err(malformed(inst, "missing patch metadata")),
            },
            Custom::CCall | Custom::ColdCCall => Ok(true),
        }
    }
}

fn malformed(inst: &Inst, reason: impl Into<String>) -> AirError {
    AirError::MalformedInst {
        opcode: inst.opcode().name(),
        reason: reason.into(),
    }
}

fn shuffle_specs<F>(inst: &Inst, mut func: F) -> AirResult<()>
where
    F: FnMut(usize, ArgSpec),
{
    let args = inst.args();
    // A trailing incomplete group is not part of the shuffle.
    for (group, triple) in args.chunks_exact(3).enumerate() {
        let (src, dst, tag) = (&triple[0], &triple[1], &triple[2]);
        let width = tag
            .as_width()
            .ok_or_else(|| malformed(inst, format!("shuffle width tag {tag} is not a width")))?;
        let bank = if src.is_gp() && dst.is_gp() {
            Bank::Gp
        } else {
            Bank::Fp
        };
        let base = group * 3;
        func(base, ArgSpec::new(Role::Use, bank, width));
        func(base + 1, ArgSpec::new(Role::Def, bank, width));
        func(base + 2, ArgSpec::new(Role::Use, Bank::Gp, Width::W8));
    }
    Ok(())
}

fn patch_specs<F>(inst: &Inst, mut func: F) -> AirResult<()>
where
    F: FnMut(usize, ArgSpec),
{
    let InstMeta::Patch { args: specs, .. } = inst.meta() else {
        return Err(malformed(inst, "missing patch metadata"));
    };
    if specs.len() != inst.args().len() {
        return Err(malformed(
            inst,
            format!(
                "{} operand specs for {} operands",
                specs.len(),
                inst.args().len()
            ),
        ));
    }
    for (index, spec) in specs.iter().enumerate() {
        func(index, *spec);
    }
    Ok(())
}

fn value_spec(inst: &Inst, role: Role, ty: ValueType) -> AirResult<ArgSpec> {
    match (ty.bank(), ty.width()) {
        (Some(bank), Some(width)) => Ok(ArgSpec::new(role, bank, width)),
        _ => Err(malformed(inst, format!("{ty:?} is not an operand type"))),
    }
}

fn ccall_specs<F>(inst: &Inst, mut func: F) -> AirResult<()>
where
    F: FnMut(usize, ArgSpec),
{
    let InstMeta::CCall {
        return_type,
        arg_types,
    } = inst.meta()
    else {
        return Err(malformed(inst, "missing call signature"));
    };
    let has_result = *return_type != ValueType::Void;
    let expected = 1 + usize::from(has_result) + arg_types.len();
    if inst.args().len() != expected {
        return Err(malformed(
            inst,
            format!("expected {expected} operands, found {}", inst.args().len()),
        ));
    }

    let mut specs = Vec::with_capacity(expected);
    specs.push(ArgSpec::new(Role::Use, Bank::Gp, Width::PTR));
    if has_result {
        specs.push(value_spec(inst, Role::Def, *return_type)?);
    }
    for ty in arg_types {
        specs.push(value_spec(inst, Role::Use, *ty)?);
    }
    for (index, spec) in specs.into_iter().enumerate() {
        func(index, spec);
    }
    Ok(())
}
