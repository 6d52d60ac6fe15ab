//! Test the phase harness with a small stack layout phase.

use air::{
    run_phase, AirError, AirResult, Arg, Bank, Code, Inst, Opcode, OpcodeTable, Phase,
    StackSlotId, StackSlotKind, Width,
};

/// Places slots downward from the frame pointer in creation order and
/// rewrites stack operands into frame addresses.
struct LinearStackLayout;

impl Phase for LinearStackLayout {
    fn name(&self) -> &str {
        "linearStackLayout"
    }

    fn run(&mut self, code: &mut Code) -> AirResult<()> {
        let mut offset: i32 = 0;
        for slot in code.stack_slots_mut() {
            let align = slot.alignment() as i32;
            offset -= slot.byte_size() as i32;
            offset &= -align;
            slot.set_offset_from_fp(offset);
        }
        let frame_size = (-offset as u32).div_ceil(16) * 16;
        code.set_frame_size(frame_size);

        let offsets: Vec<i32> = code
            .stack_slots()
            .iter()
            .map(|slot| slot.offset_from_fp().unwrap_or(0))
            .collect();
        let table = OpcodeTable::standard();
        for block in code.blocks_mut() {
            for inst in block.insts_mut() {
                inst.for_each_arg_mut(table, |arg, _, _, width| {
                    if let Arg::Stack { slot, offset } = *arg {
                        *arg = Arg::stack_addr(offsets[slot.index()] + offset, frame_size, width);
                    }
                })?;
            }
        }
        Ok(())
    }
}

/// Grows a slot that was already placed.
struct LateGrowth(StackSlotId);

impl Phase for LateGrowth {
    fn name(&self) -> &str {
        "lateGrowth"
    }

    fn run(&mut self, code: &mut Code) -> AirResult<()> {
        code[self.0].ensure_size(64)
    }
}

fn build() -> (Code, StackSlotId) {
    let mut code = Code::new();
    let entry = code.add_block();
    let value = code.new_tmp(Bank::Gp);
    let wide = code.add_stack_slot(8, StackSlotKind::Locked);
    let narrow = code.add_stack_slot(4, StackSlotKind::Spill);
    code[entry].append(Inst::new(Opcode::MOVE, vec![Arg::imm(1), Arg::stack(wide, 0)]));
    code[entry].append(Inst::new(Opcode::MOVE32, vec![Arg::stack(narrow, 0), Arg::tmp(value)]));
    code[entry].append(Inst::new(Opcode::RET32, vec![Arg::tmp(value)]));
    (code, wide)
}

#[test]
fn test_layout_phase_changes_late_hash() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut code, _) = build();
    let report = run_phase(&mut code, &mut LinearStackLayout).unwrap();
    assert!(report.changed());
    assert_eq!(report.phase, "linearStackLayout");
    assert_eq!(code.frame_size(), 16);
    assert_eq!(code.stack_slots()[0].offset_from_fp(), Some(-8));
    assert_eq!(code.stack_slots()[1].offset_from_fp(), Some(-12));

    let insts = code.blocks()[0].insts();
    assert_eq!(insts[0].to_string(), "Move $1, -8(%rbp)");
    assert_eq!(insts[1].to_string(), "Move32 -12(%rbp), %tmp0");
}

#[test]
fn test_golden_hashes() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut expected_code, _) = build();
    let golden_early = expected_code.hash();
    run_phase(&mut expected_code, &mut LinearStackLayout).unwrap();
    let golden_late = expected_code.hash();

    let (mut code, _) = build();
    let report = run_phase(&mut code, &mut LinearStackLayout).unwrap();
    assert_eq!(report.check(golden_early, golden_late), Ok(()));
    assert!(matches!(
        report.check(golden_early, golden_late.wrapping_add(1)),
        Err(AirError::HashMismatch { stage: "late", .. })
    ));
}

#[test]
fn test_growing_a_placed_slot_fails() {
    let _ = env_logger::builder().is_test(true).try_init();

    let (mut code, wide) = build();
    run_phase(&mut code, &mut LinearStackLayout).unwrap();
    assert_eq!(
        run_phase(&mut code, &mut LateGrowth(wide)),
        Err(AirError::StackSlotAlreadyAllocated { slot: 0, offset: -8 })
    );
    assert_eq!(code[wide].byte_size(), 8);
}

#[test]
fn test_stack_addr_width_is_respected() {
    let _ = env_logger::builder().is_test(true).try_init();

    assert_eq!(
        Arg::stack_addr(-4, 16, Width::W32).to_string(),
        "-4(%rbp)"
    );
}
