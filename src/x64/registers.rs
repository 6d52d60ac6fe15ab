// This module describes the x86-64 register file the Air IR targets. It lists the sixteen
// general purpose registers in hardware encoding order (RAX, RCX, RDX, RBX, RSP, RBP, RSI,
// RDI, R8-R15) and the sixteen XMM registers, names the frame pointer (RBP) and stack
// pointer (RSP), and records which GP registers the System V ABI makes callee-saved (RBX,
// R12-R15). The tables are plain constants: the register catalog in core::reg is built from
// them at compile time, so there is exactly one catalog per process and it never changes.

//! x86-64 register file description.

/// Number of general purpose registers.
pub const GPR_COUNT: usize = 16;

/// Number of XMM registers.
pub const FPR_COUNT: usize = 16;

/// GP register names in encoding order.
pub const GPR_NAMES: [&str; GPR_COUNT] = [
    "rax", "rcx", "rdx", "rbx", "rsp", "rbp", "rsi", "rdi",
    "r8", "r9", "r10", "r11", "r12", "r13", "r14", "r15",
];

/// XMM register names in encoding order.
pub const FPR_NAMES: [&str; FPR_COUNT] = [
    "xmm0", "xmm1", "xmm2", "xmm3", "xmm4", "xmm5", "xmm6", "xmm7",
    "xmm8", "xmm9", "xmm10", "xmm11", "xmm12", "xmm13", "xmm14", "xmm15",
];

/// RSP.
pub const STACK_POINTER: u8 = 4;

/// RBP, which addresses stack slots once the frame is laid out.
pub const FRAME_POINTER: u8 = 5;

/// Callee-saved GP registers: RBX, R12-R15.
pub const CALLEE_SAVE_GPRS: [u8; 5] = [3, 12, 13, 14, 15];

/// No XMM register survives a System V call.
pub const CALLEE_SAVE_FPRS: [u8; 0] = [];
