// This module defines error types for the Air IR core using the thiserror crate for
// idiomatic Rust error handling. AirError is the single error enum covering every way an
// operation on the IR can fail: growing a stack slot after the frame has been laid out,
// inserting past the end of a sequence or out of order through an InsertionSet, iterating
// the operands of an instruction whose opcode has no convention, operand lists that do not
// agree with their convention, byte counts with no width, dangling arena indices, and golden
// hash mismatches reported by the phase harness. Each variant carries the context needed to
// find the offending element. All of these are programming errors local to one Code: callers
// propagate them with `?` and abandon that compilation unit.

//! Error types for the Air IR core.
//!
//! Using thiserror for more idiomatic error handling.

use thiserror::Error;

/// Main error type for operations on the IR.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AirError {
    #[error("Stack slot {slot} already allocated at offset {offset} from FP")]
    StackSlotAlreadyAllocated { slot: u32, offset: i32 },

    #[error("Out-of-bounds insertion at index {index} into a sequence of length {len}")]
    OutOfBoundsInsertion { index: usize, len: usize },

    #[error("Insertions out of order: index {index} sorted after index {previous}")]
    InsertionOrderViolation { index: usize, previous: usize },

    #[error("Unrecognized opcode: {opcode}")]
    UnrecognizedOpcode { opcode: &'static str },

    #[error("No {arity}-operand form of {opcode}")]
    NoMatchingForm { opcode: &'static str, arity: usize },

    #[error("Malformed {opcode} instruction: {reason}")]
    MalformedInst { opcode: &'static str, reason: String },

    #[error("Call argument area of {size} bytes cannot be aligned to the stack")]
    CallArgAreaTooLarge { size: u32 },

    #[error("Bad number of bytes: {bytes}")]
    BadWidth { bytes: u32 },

    #[error("Dangling reference: {what}")]
    DanglingReference { what: String },

    #[error("Hash mismatch after {phase} ({stage}): expected {expected:#010x}, got {actual:#010x}")]
    HashMismatch {
        phase: String,
        stage: &'static str,
        expected: u32,
        actual: u32,
    },
}

/// Result type alias for IR operations.
pub type AirResult<T> = Result<T, AirError>;
