// This module serves as the central hub for the Air IR core, the target independent part of
// the backend representation. It exports and organizes the key subsystems: operand
// identities (physical registers, virtual tmps, stack slots), the tagged operand model with
// its roles and conditions, opcodes and their argument conventions (the default per-arity
// forms and the closed set of custom strategies), instructions, basic blocks and the Code
// container that owns them, the InsertionSet batching utility, and the phase driver that
// brackets external passes with structural hashes. Everything inside a Code is addressed
// by index into Code-owned arenas and all fallible operations report AirError.

//! Air IR core.
//!
//! # Key Components
//!
//! ## Operand identities (`reg`, `tmp`, `stack_slot`)
//! - Fixed register catalog with GP/FP banks and callee-save flags
//! - Virtual tmps drawn from two independent arenas
//! - Abstract stack slots that may only grow until they are placed
//!
//! ## Operands (`arg`, `cond`, `operand`)
//! - `Arg` covers tmps, immediates, addresses, slots, conditions and widths
//! - Roles, banks and widths are annotations supplied during traversal
//! - `Operand` makes traversal generic over args, tmps, registers and slots
//!
//! ## Instructions (`opcode`, `custom`, `inst`)
//! - Opcode table binding each opcode to one argument convention
//! - Shuffle, Patch, CCall and ColdCCall custom conventions
//!
//! ## Containers (`basic_block`, `code`, `insertion_set`)
//! - Blocks with weighted successor edges
//! - `Code` arenas, structural hash and text dump
//! - Batched stable insertion into instruction vectors
//!
//! ## Driver (`phase`)
//! - Early and late hashes around an external phase

pub mod types;
pub mod error;
pub mod reg;
pub mod tmp;
pub mod stack_slot;
pub mod cond;
pub mod arg;
pub mod operand;
pub mod opcode;
pub mod custom;
pub mod inst;
pub mod basic_block;
pub mod code;
pub mod insertion_set;
pub mod phase;

// Re-export core components
pub use types::{Bank, ValueType, Width};

pub use error::{AirError, AirResult};

pub use reg::{Reg, RegBitSet};

pub use tmp::{Location, Tmp};

pub use stack_slot::{StackSlot, StackSlotId, StackSlotKind};

pub use cond::{DoubleCond, RelCond, ResCond};

pub use arg::{Arg, ArgKind, Role};

pub use operand::Operand;

pub use opcode::{ArgSpec, Convention, Opcode, OpcodeTable};

pub use custom::Custom;

pub use inst::{Inst, InstMeta};

pub use basic_block::{BasicBlock, BlockId, Successor};

pub use code::{Code, STACK_ALIGNMENT_BYTES};

pub use insertion_set::{Insertion, InsertionSet};

pub use phase::{run_phase, Phase, PhaseReport};
