// This test suite validates operand iteration for the opcodes whose argument convention is
// computed from the instruction rather than read from a fixed form. Shuffle instructions are
// parallel moves grouped in (source, destination, width) triples; the test checks that the
// bank of each group follows its operands, that the width comes from the tag operand and
// that a trailing incomplete group is ignored. Patch instructions replay the annotations they
// carry. CCall annotates the callee, an optional result and one use per argument, and
// ColdCCall must visit exactly the same positions with every role cooled. The suite also
// checks the effect classification of each convention and that a rewrite through
// Inst::for_each reaches the operands a custom convention iterates.

//! Test custom argument conventions.

use air::{
    AirError, Arg, ArgSpec, Bank, Code, Inst, Opcode, OpcodeTable, Role, StackSlotId,
    StackSlotKind, Tmp, ValueType, Width,
};

fn visit(inst: &Inst) -> Vec<(Arg, Role, Bank, Width)> {
    let mut seen = Vec::new();
    inst.for_each_arg(OpcodeTable::standard(), |arg, role, bank, width| {
        seen.push((*arg, role, bank, width))
    })
    .unwrap();
    seen
}

#[test]
fn test_shuffle_groups() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut code = Code::new();
    let a = Arg::tmp(code.new_tmp(Bank::Gp));
    let b = Arg::tmp(code.new_tmp(Bank::Gp));
    let f = Arg::tmp(code.new_tmp(Bank::Fp));
    let slot = Arg::stack(code.add_stack_slot(8, StackSlotKind::Spill), 0);

    let inst = Inst::new(
        Opcode::SHUFFLE,
        vec![
            a, b, Arg::width(Width::W32),
            slot, f, Arg::width(Width::W64),
            b, // incomplete trailing group
        ],
    );
    assert_eq!(
        visit(&inst),
        vec![
            (a, Role::Use, Bank::Gp, Width::W32),
            (b, Role::Def, Bank::Gp, Width::W32),
            (Arg::width(Width::W32), Role::Use, Bank::Gp, Width::W8),
            (slot, Role::Use, Bank::Fp, Width::W64),
            (f, Role::Def, Bank::Fp, Width::W64),
            (Arg::width(Width::W64), Role::Use, Bank::Gp, Width::W8),
        ]
    );
    assert_eq!(inst.has_non_arg_non_control_effects(OpcodeTable::standard()), Ok(false));
}

#[test]
fn test_patch_replays_metadata() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut code = Code::new();
    let a = Arg::tmp(code.new_tmp(Bank::Gp));
    let d = Arg::tmp(code.new_tmp(Bank::Fp));
    let specs = vec![
        ArgSpec::new(Role::EarlyDef, Bank::Gp, Width::W64),
        ArgSpec::new(Role::LateColdUse, Bank::Fp, Width::W32),
    ];
    let pure = Inst::patch(vec![a, d], specs.clone(), false);
    assert_eq!(
        visit(&pure),
        vec![
            (a, Role::EarlyDef, Bank::Gp, Width::W64),
            (d, Role::LateColdUse, Bank::Fp, Width::W32),
        ]
    );
    assert_eq!(pure.has_non_arg_non_control_effects(OpcodeTable::standard()), Ok(false));

    let effectful = Inst::patch(vec![a, d], specs, true);
    assert_eq!(effectful.has_non_arg_non_control_effects(OpcodeTable::standard()), Ok(true));

    let short = Inst::patch(vec![a], vec![], false);
    assert!(matches!(
        short.for_each_arg(OpcodeTable::standard(), |_, _, _, _| {}),
        Err(AirError::MalformedInst { opcode: "Patch", .. })
    ));
}

#[test]
fn test_ccall_and_cold_ccall_agree_up_to_cooling() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut code = Code::new();
    let callee = Arg::tmp(code.new_tmp(Bank::Gp));
    let result = Arg::tmp(code.new_tmp(Bank::Gp));
    let x = Arg::tmp(code.new_tmp(Bank::Gp));
    let y = Arg::tmp(code.new_tmp(Bank::Fp));
    let args = vec![callee, result, x, y];
    let arg_types = vec![ValueType::Int64, ValueType::Float];

    let hot = Inst::ccall(ValueType::Int32, arg_types.clone(), args.clone());
    let cold = Inst::cold_ccall(ValueType::Int32, arg_types, args);

    let hot_seen = visit(&hot);
    assert_eq!(
        hot_seen,
        vec![
            (callee, Role::Use, Bank::Gp, Width::PTR),
            (result, Role::Def, Bank::Gp, Width::W32),
            (x, Role::Use, Bank::Gp, Width::W64),
            (y, Role::Use, Bank::Fp, Width::W32),
        ]
    );

    let cooled: Vec<_> = hot_seen
        .iter()
        .map(|&(arg, role, bank, width)| (arg, role.cooled(), bank, width))
        .collect();
    assert_eq!(visit(&cold), cooled);
    assert_eq!(cooled[0].1, Role::ColdUse);
    assert_eq!(cooled[1].1, Role::Def);

    let table = OpcodeTable::standard();
    assert_eq!(hot.has_non_arg_non_control_effects(table), Ok(true));
    assert_eq!(cold.has_non_arg_non_control_effects(table), Ok(true));
}

#[test]
fn test_ccall_arity_must_match_signature() {
    let _ = env_logger::builder().is_test(true).try_init();

    let inst = Inst::ccall(ValueType::Void, vec![ValueType::Int32], vec![Arg::imm(0)]);
    assert!(matches!(
        inst.for_each_arg(OpcodeTable::standard(), |_, _, _, _| {}),
        Err(AirError::MalformedInst { opcode: "CCall", .. })
    ));
}

#[test]
fn test_rewrite_through_custom_convention() {
    let _ = env_logger::builder().is_test(true).try_init();

    let mut code = Code::new();
    let a = code.new_tmp(Bank::Gp);
    let b = code.new_tmp(Bank::Gp);
    let s0 = code.add_stack_slot(8, StackSlotKind::Spill);
    let s1 = code.add_stack_slot(8, StackSlotKind::Spill);
    let mut inst = Inst::new(
        Opcode::SHUFFLE,
        vec![Arg::stack(s0, 4), Arg::tmp(a), Arg::width(Width::W64)],
    );

    let table = OpcodeTable::standard();
    inst.for_each::<StackSlotId, _>(table, |slot, role, _, _| {
        assert_eq!(role, Role::Use);
        (slot == s0).then_some(s1)
    })
    .unwrap();
    inst.for_each::<Tmp, _>(table, |tmp, role, _, _| (role == Role::Def && tmp == a).then_some(b))
        .unwrap();

    assert_eq!(
        inst.args(),
        &[Arg::stack(s1, 4), Arg::tmp(b), Arg::width(Width::W64)]
    );
}
