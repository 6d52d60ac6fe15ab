//! Air - a compact backend IR.
//!
//! Air represents one compilation unit as a [`Code`]: basic blocks of
//! instructions over virtual tmps, physical registers and abstract stack
//! slots, all referenced by index into `Code`-owned arenas. Phases mutate a
//! `Code` through `&mut` access and stage bulk edits through an
//! [`InsertionSet`]; a harness compares [`Code::hash`] before and after each
//! phase.
//!
//! # Primary Usage
//!
//! ```
//! use air::{Arg, Bank, Code, Inst, InsertionSet, Opcode, StackSlotKind};
//!
//! let mut code = Code::new();
//! let entry = code.add_block();
//! let a = code.new_tmp(Bank::Gp);
//! let b = code.new_tmp(Bank::Gp);
//! let slot = code.add_stack_slot(4, StackSlotKind::Spill);
//!
//! code[entry].append(Inst::new(Opcode::MOVE32, vec![Arg::imm(1), Arg::tmp(a)]));
//! code[entry].append(Inst::new(Opcode::ADD32, vec![Arg::tmp(a), Arg::tmp(b)]));
//! code[entry].append(Inst::new(Opcode::RET32, vec![Arg::tmp(b)]));
//!
//! let mut insertions = InsertionSet::new();
//! insertions.append(2, Inst::new(Opcode::MOVE32, vec![Arg::tmp(b), Arg::stack(slot, 0)]));
//! insertions.execute(code[entry].insts_mut())?;
//!
//! assert_eq!(code[entry].len(), 4);
//! println!("{code}");
//! # Ok::<(), air::AirError>(())
//! ```
//!
//! # Architecture
//!
//! - [`core`] - The IR: operands, instructions, blocks, `Code`, utilities
//! - [`x64`] - The x86-64 register file the IR names

pub mod core;
pub mod x64;

// Re-export common types from organized modules
pub use core::{
    // Operands
    Arg, ArgKind, Bank, DoubleCond, Location, Operand, Reg, RegBitSet, RelCond, ResCond, Role,
    StackSlot, StackSlotId, StackSlotKind, Tmp, ValueType, Width,
    // Instructions
    ArgSpec, Convention, Custom, Inst, InstMeta, Opcode, OpcodeTable,
    // Containers
    BasicBlock, BlockId, Code, Insertion, InsertionSet, Successor, STACK_ALIGNMENT_BYTES,
    // Driver
    run_phase, Phase, PhaseReport,
    // Errors
    AirError, AirResult,
};
