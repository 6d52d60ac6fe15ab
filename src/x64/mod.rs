//! x86-64 architecture-specific components.
//!
//! The IR core is target independent except for the register file it
//! names, which is described here.

pub mod registers;

pub use registers::{
    CALLEE_SAVE_FPRS, CALLEE_SAVE_GPRS, FPR_COUNT, FPR_NAMES, FRAME_POINTER, GPR_COUNT,
    GPR_NAMES, STACK_POINTER,
};
