// This module defines opcodes and the table binding each opcode to its argument convention.
// An opcode is a small numeric identity with a printable name. Its convention is either the
// default one, a list of operand forms keyed by arity where every position carries a fixed
// (role, bank, width) annotation plus a flag saying whether the instruction has effects
// beyond its operands, or one of the closed set of custom strategies in custom.rs. The
// standard table covering the opcodes this crate ships is built on first use and shared
// read-only for the life of the process; callers that need more opcodes build their own
// OpcodeTable and bind conventions to it. Looking up an opcode nothing was bound to is the
// UnrecognizedOpcode error.

//! Opcodes, argument specs and the opcode table.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::LazyLock;

use hashbrown::HashMap;

use super::arg::Role;
use super::custom::Custom;
use super::error::{AirError, AirResult};
use super::types::{Bank, Width};

/// Instruction opcode. Two opcodes are the same opcode when their codes match.
#[derive(Debug, Clone, Copy)]
pub struct Opcode {
    code: u16,
    name: &'static str,
}

impl Opcode {
    pub const NOP: Opcode = Opcode::new(0, "Nop");
    pub const MOVE: Opcode = Opcode::new(1, "Move");
    pub const MOVE32: Opcode = Opcode::new(2, "Move32");
    pub const MOVE_DOUBLE: Opcode = Opcode::new(3, "MoveDouble");
    pub const ADD32: Opcode = Opcode::new(4, "Add32");
    pub const ADD64: Opcode = Opcode::new(5, "Add64");
    pub const ADD_DOUBLE: Opcode = Opcode::new(6, "AddDouble");
    pub const SUB32: Opcode = Opcode::new(7, "Sub32");
    pub const SUB64: Opcode = Opcode::new(8, "Sub64");
    pub const MUL32: Opcode = Opcode::new(9, "Mul32");
    pub const LEA: Opcode = Opcode::new(10, "Lea");
    pub const BRANCH32: Opcode = Opcode::new(11, "Branch32");
    pub const BRANCH_TEST32: Opcode = Opcode::new(12, "BranchTest32");
    pub const JUMP: Opcode = Opcode::new(13, "Jump");
    pub const RET32: Opcode = Opcode::new(14, "Ret32");
    pub const RET64: Opcode = Opcode::new(15, "Ret64");
    pub const OOPS: Opcode = Opcode::new(16, "Oops");
    pub const MEMORY_FENCE: Opcode = Opcode::new(17, "MemoryFence");
    pub const SHUFFLE: Opcode = Opcode::new(18, "Shuffle");
    pub const PATCH: Opcode = Opcode::new(19, "Patch");
    pub const CCALL: Opcode = Opcode::new(20, "CCall");
    pub const COLD_CCALL: Opcode = Opcode::new(21, "ColdCCall");

    pub const fn new(code: u16, name: &'static str) -> Self {
        Self { code, name }
    }

    pub fn code(self) -> u16 {
        self.code
    }

    pub fn name(self) -> &'static str {
        self.name
    }
}

impl PartialEq for Opcode {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Opcode {}

impl Hash for Opcode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Annotation of one operand position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub role: Role,
    pub bank: Bank,
    pub width: Width,
}

impl ArgSpec {
    pub const fn new(role: Role, bank: Bank, width: Width) -> Self {
        Self { role, bank, width }
    }
}

/// How an opcode's operands are iterated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Convention {
    /// One spec list per supported arity.
    Default { forms: Vec<Vec<ArgSpec>>, effects: bool },
    Custom(Custom),
}

impl Convention {
    pub fn pure(forms: Vec<Vec<ArgSpec>>) -> Self {
        Convention::Default {
            forms,
            effects: false,
        }
    }

    pub fn effectful(forms: Vec<Vec<ArgSpec>>) -> Self {
        Convention::Default {
            forms,
            effects: true,
        }
    }
}

/// Opcode to convention bindings.
#[derive(Debug, Clone, Default)]
pub struct OpcodeTable {
    conventions: HashMap<Opcode, Convention>,
}

static STANDARD: LazyLock<OpcodeTable> = LazyLock::new(OpcodeTable::build_standard);

impl OpcodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The table for the opcodes defined on [`Opcode`], built on first use.
    pub fn standard() -> &'static OpcodeTable {
        &STANDARD
    }

    /// Bind `opcode`, returning the convention it replaced.
    pub fn bind(&mut self, opcode: Opcode, convention: Convention) -> Option<Convention> {
        self.conventions.insert(opcode, convention)
    }

    pub fn convention(&self, opcode: Opcode) -> AirResult<&Convention> {
        self.conventions
            .get(&opcode)
            .ok_or(AirError::UnrecognizedOpcode {
                opcode: opcode.name(),
            })
    }

    pub fn contains(&self, opcode: Opcode) -> bool {
        self.conventions.contains_key(&opcode)
    }

    pub fn len(&self) -> usize {
        self.conventions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conventions.is_empty()
    }

    fn build_standard() -> OpcodeTable {
        use Bank::{Fp, Gp};
        use Role::*;
        use Width::{W32, W64};

        let spec = ArgSpec::new;
        let mut table = OpcodeTable::new();

        table.bind(Opcode::NOP, Convention::pure(vec![vec![]]));
        table.bind(
            Opcode::MOVE,
            Convention::pure(vec![vec![spec(Use, Gp, W64), spec(Def, Gp, W64)]]),
        );
        table.bind(
            Opcode::MOVE32,
            Convention::pure(vec![vec![spec(Use, Gp, W32), spec(ZDef, Gp, W32)]]),
        );
        table.bind(
            Opcode::MOVE_DOUBLE,
            Convention::pure(vec![vec![spec(Use, Fp, W64), spec(Def, Fp, W64)]]),
        );
        table.bind(
            Opcode::ADD32,
            Convention::pure(vec![
                vec![spec(Use, Gp, W32), spec(UseZDef, Gp, W32)],
                vec![spec(Use, Gp, W32), spec(Use, Gp, W32), spec(ZDef, Gp, W32)],
            ]),
        );
        table.bind(
            Opcode::ADD64,
            Convention::pure(vec![
                vec![spec(Use, Gp, W64), spec(UseDef, Gp, W64)],
                vec![spec(Use, Gp, W64), spec(Use, Gp, W64), spec(Def, Gp, W64)],
            ]),
        );
        table.bind(
            Opcode::ADD_DOUBLE,
            Convention::pure(vec![
                vec![spec(Use, Fp, W64), spec(UseDef, Fp, W64)],
                vec![spec(Use, Fp, W64), spec(Use, Fp, W64), spec(Def, Fp, W64)],
            ]),
        );
        table.bind(
            Opcode::SUB32,
            Convention::pure(vec![vec![spec(Use, Gp, W32), spec(UseZDef, Gp, W32)]]),
        );
        table.bind(
            Opcode::SUB64,
            Convention::pure(vec![vec![spec(Use, Gp, W64), spec(UseDef, Gp, W64)]]),
        );
        table.bind(
            Opcode::MUL32,
            Convention::pure(vec![
                vec![spec(Use, Gp, W32), spec(UseZDef, Gp, W32)],
                vec![spec(Use, Gp, W32), spec(Use, Gp, W32), spec(ZDef, Gp, W32)],
            ]),
        );
        table.bind(
            Opcode::LEA,
            Convention::pure(vec![vec![spec(UseAddr, Gp, W64), spec(Def, Gp, W64)]]),
        );
        // Condition operand first, then the compared values.
        table.bind(
            Opcode::BRANCH32,
            Convention::pure(vec![vec![
                spec(Use, Gp, W32),
                spec(Use, Gp, W32),
                spec(Use, Gp, W32),
            ]]),
        );
        table.bind(
            Opcode::BRANCH_TEST32,
            Convention::pure(vec![vec![
                spec(Use, Gp, W32),
                spec(Use, Gp, W32),
                spec(Use, Gp, W32),
            ]]),
        );
        table.bind(Opcode::JUMP, Convention::pure(vec![vec![]]));
        table.bind(Opcode::RET32, Convention::pure(vec![vec![spec(Use, Gp, W32)]]));
        table.bind(Opcode::RET64, Convention::pure(vec![vec![spec(Use, Gp, W64)]]));
        table.bind(Opcode::OOPS, Convention::effectful(vec![vec![]]));
        table.bind(Opcode::MEMORY_FENCE, Convention::effectful(vec![vec![]]));
        table.bind(Opcode::SHUFFLE, Convention::Custom(Custom::Shuffle));
        table.bind(Opcode::PATCH, Convention::Custom(Custom::Patch));
        table.bind(Opcode::CCALL, Convention::Custom(Custom::CCall));
        table.bind(Opcode::COLD_CCALL, Convention::Custom(Custom::ColdCCall));

        log::debug!("standard opcode table built with {} opcodes", table.len());
        table
    }
}
