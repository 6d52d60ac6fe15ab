// This test suite exercises InsertionSet, the utility phases use to apply many insertions to
// an ordered sequence in one pass. It covers the empty batch (nothing changes and zero is
// reported), insertions spread across a sequence, several insertions at the same index
// (which must land in the order they were appended), an insertion past the end of the
// sequence (rejected before the target is touched), and the common case of staging new
// instructions against a block's instruction vector while the original indices are still
// meaningful.

//! Test batched insertion.

use air::{AirError, Arg, Bank, Code, Inst, InsertionSet, Opcode, StackSlotKind};

#[test]
fn test_empty_set_is_a_no_op() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut target = vec!["x0", "x1"];
    let mut set: InsertionSet<&str> = InsertionSet::new();
    assert_eq!(set.execute(&mut target), Ok(0));
    assert_eq!(target, vec!["x0", "x1"]);
}

#[test]
fn test_basic_batch_insert() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut target = vec!["x0", "x1", "x2", "x3"];
    let mut set = InsertionSet::new();
    set.append(1, "a");
    set.append(3, "b");
    assert_eq!(set.execute(&mut target), Ok(2));
    assert_eq!(target, vec!["x0", "a", "x1", "x2", "b", "x3"]);
}

#[test]
fn test_ties_keep_append_order() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut target = vec!["x0", "x1", "x2"];
    let mut set = InsertionSet::new();
    set.append(2, "a");
    set.append(0, "first");
    set.append(2, "b");
    set.append(2, "c");
    assert_eq!(set.execute(&mut target), Ok(4));
    assert_eq!(target, vec!["first", "x0", "x1", "a", "b", "c", "x2"]);
}

#[test]
fn test_out_of_bounds_insertion() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut target = vec![0u8, 1];
    let mut set = InsertionSet::new();
    set.append(5, 9);
    assert_eq!(
        set.execute(&mut target),
        Err(AirError::OutOfBoundsInsertion { index: 5, len: 2 })
    );
    assert_eq!(target, vec![0, 1]);
}

#[test]
fn test_insert_spill_code_into_block() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut code = Code::new();
    let entry = code.add_block();
    let value = code.new_tmp(Bank::Gp);
    let slot = code.add_stack_slot(4, StackSlotKind::Spill);
    code[entry].append(Inst::new(Opcode::MOVE32, vec![Arg::imm(7), Arg::tmp(value)]));
    code[entry].append(Inst::new(Opcode::RET32, vec![Arg::tmp(value)]));

    let mut set = InsertionSet::new();
    set.append(1, Inst::new(Opcode::MOVE32, vec![Arg::tmp(value), Arg::stack(slot, 0)]));
    set.append(1, Inst::new(Opcode::MOVE32, vec![Arg::stack(slot, 0), Arg::tmp(value)]));
    assert_eq!(set.execute(code[entry].insts_mut()), Ok(2));

    let dump: Vec<String> = code[entry].insts().iter().map(ToString::to_string).collect();
    assert_eq!(
        dump,
        vec![
            "Move32 $7, %tmp0",
            "Move32 %tmp0, (slot0)",
            "Move32 (slot0), %tmp0",
            "Ret32 %tmp0",
        ]
    );
    assert_eq!(code.validate(), Ok(()));
}
