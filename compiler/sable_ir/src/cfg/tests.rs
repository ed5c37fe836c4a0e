use std::mem;

use pretty_assertions::assert_eq;

use super::*;

fn v(n: u32) -> ValueId {
    ValueId::new(n)
}

fn b(n: u32) -> BlockId {
    BlockId::new(n)
}

#[test]
fn id_sizes() {
    assert_eq!(mem::size_of::<ValueId>(), 4);
    assert_eq!(mem::size_of::<BlockId>(), 4);
}

#[test]
fn switch_successors_keep_duplicate_edges() {
    let term = Terminator::SwitchValue {
        scrutinee: v(0),
        cases: vec![(0, b(1)), (1, b(1)), (2, b(2))],
        default: Some(b(3)),
    };
    assert_eq!(term.successors().as_slice(), &[b(1), b(1), b(2), b(3)]);

    let no_default = Terminator::SwitchEnum {
        scrutinee: v(0),
        cases: vec![(0, b(4))],
        default: None,
    };
    assert_eq!(no_default.successors().as_slice(), &[b(4)]);
}

#[test]
fn exiting_and_terminating_terminators() {
    assert!(Terminator::Return { value: v(0) }.is_function_exiting());
    assert!(Terminator::Throw { value: v(0) }.is_function_exiting());
    assert!(!Terminator::Terminate.is_function_exiting());
    assert!(Terminator::Terminate.is_program_terminating());
    assert!(!Terminator::Unreachable.is_program_terminating());
    assert!(!Terminator::Unreachable.is_function_exiting());
    assert!(Terminator::Unreachable.successors().is_empty());
}

#[test]
fn load_effects_depend_on_kind() {
    let load = |kind| Instr::Load {
        dst: v(1),
        addr: v(0),
        kind,
    };
    assert_eq!(load(LoadKind::Trivial).effects(), MemoryEffects::READ);
    assert!(load(LoadKind::Take).effects().may_write());
    assert!(load(LoadKind::Copy).effects().may_write());
    assert_eq!(
        Instr::Store {
            src: v(1),
            addr: v(0)
        }
        .effects(),
        MemoryEffects::WRITE
    );
}

#[test]
fn apply_operands_include_receiver() {
    let site = ApplySite::new(
        Callee::ClassMethod {
            class: Name::from_raw(1),
            method: Name::from_raw(2),
            receiver: v(7),
        },
        vec![v(1), v(2)],
    );
    let instr = Instr::Apply { dst: v(3), site };
    assert_eq!(instr.operands(), vec![v(7), v(1), v(2)]);
    assert_eq!(instr.defined_value(), Some(v(3)));
    assert_eq!(instr.effects(), MemoryEffects::READ_WRITE);
    assert!(instr.full_apply().is_some());
}

#[test]
fn partial_apply_is_not_a_full_apply() {
    let instr = Instr::PartialApply {
        dst: v(2),
        callee: Callee::Function(Name::from_raw(5)),
        args: vec![v(0)],
    };
    assert!(instr.full_apply().is_none());
    assert_eq!(instr.operands(), vec![v(0)]);
}

#[test]
fn try_apply_is_a_full_apply_terminator() {
    let term = Terminator::TryApply {
        site: ApplySite::new(Callee::Function(Name::from_raw(5)), vec![v(0)])
            .with_effects(MemoryEffects::empty()),
        normal: b(1),
        error: b(2),
    };
    assert_eq!(
        term.full_apply().and_then(ApplySite::referenced_function),
        Some(Name::from_raw(5))
    );
    assert!(term.effects().is_empty());
    assert_eq!(term.successors().as_slice(), &[b(1), b(2)]);
}

#[test]
fn function_spans_include_terminator_slot() {
    let mut func = Function::new(
        Name::from_raw(1),
        vec![v(0)],
        vec![Block::new(
            b(0),
            vec![Instr::Literal { dst: v(1), value: 3 }],
            Terminator::Return { value: v(1) },
        )],
    );
    assert_eq!(func.spans, vec![vec![None, None]]);
    assert_eq!(func.instruction_count(), 2);

    func.set_span(b(0), 1, Span::new(10, 14));
    func.set_span(b(3), 0, Span::new(0, 1));
    assert_eq!(func.span(b(0), 1), Some(Span::new(10, 14)));
    assert_eq!(func.span(b(0), 0), None);
    assert_eq!(func.span(b(3), 0), None);
    assert!(!func.was_deserialized());
}
