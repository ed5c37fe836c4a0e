use pretty_assertions::assert_eq;
use sable_ir::{
    AccessKind, ApplySite, Callee, Function, Instr, LoadKind, MemoryEffects, Terminator,
};

use super::*;
use crate::graph::ValueDefs;
use crate::test_helpers::{
    b, block, branch, call, call_self, empty_module, fatal_error, jump, make_func,
    pure_call_self, ret, v, OTHER, SELF,
};

fn info_of(func: &Function, block: usize, invariants: Invariants) -> BlockInfo {
    let defs = ValueDefs::new(func);
    BlockInfo::new(
        &func.blocks[block],
        func,
        invariants,
        &defs,
        &empty_module(),
    )
}

fn forwarding_all(func: &Function) -> Invariants {
    let defs = ValueDefs::new(func);
    let site = ApplySite::new(Callee::Function(SELF), func.params.clone());
    Invariants::from_forwarding_arguments(&site, func, &defs)
}

#[test]
fn return_block_reaches_return() {
    let func = make_func(1, vec![block(0, vec![], ret(0))]);
    assert_eq!(
        info_of(&func, 0, Invariants::empty()),
        BlockInfo {
            recursive_call: None,
            num_succs_not_reaching_return: 0,
            has_invariant_condition: false,
            reaches_return: true,
            reachable_from_entry: false,
        }
    );
}

#[test]
fn throw_and_terminate_count_as_return() {
    let func = make_func(
        1,
        vec![
            block(0, vec![], Terminator::Throw { value: v(0) }),
            block(1, vec![], Terminator::Terminate),
            block(2, vec![], Terminator::Unreachable),
        ],
    );
    assert!(info_of(&func, 0, Invariants::empty()).reaches_return);
    assert!(info_of(&func, 1, Invariants::empty()).reaches_return);
    assert!(!info_of(&func, 2, Invariants::empty()).reaches_return);
}

#[test]
fn recursive_call_recorded_and_scan_stops() {
    let func = make_func(
        1,
        vec![block(0, vec![call_self(1, &[0]), call(2, OTHER, &[])], ret(1))],
    );
    let info = info_of(&func, 0, Invariants::empty());
    assert_eq!(info.recursive_call, Some(0));
    assert!(!info.reaches_return);
}

#[test]
fn termination_point_hides_later_recursive_call() {
    let func = make_func(
        1,
        vec![block(0, vec![fatal_error(1), call_self(2, &[0])], ret(0))],
    );
    let info = info_of(&func, 0, Invariants::empty());
    assert_eq!(info.recursive_call, None);
    assert!(!info.reaches_return);
}

#[test]
fn non_forwarding_call_ignored_under_argument_invariance() {
    let func = make_func(
        1,
        vec![block(
            0,
            vec![
                Instr::Literal { dst: v(1), value: 1 },
                pure_call_self(2, &[1]),
            ],
            ret(0),
        )],
    );
    let arg0 = forwarding_all(&func);
    let info = info_of(&func, 0, arg0);
    assert_eq!(info.recursive_call, None);
    assert!(info.reaches_return);

    assert_eq!(info_of(&func, 0, Invariants::empty()).recursive_call, Some(1));
}

#[test]
fn write_breaks_memory_invariance() {
    let func = make_func(
        1,
        vec![block(
            0,
            vec![
                Instr::Store {
                    src: v(0),
                    addr: v(0),
                },
                call_self(1, &[0]),
            ],
            Terminator::Unreachable,
        )],
    );
    let mem = Invariants::empty().with_memory_invariant();
    let info = info_of(&func, 0, mem);
    assert!(info.reaches_return);
    assert_eq!(info.recursive_call, None);

    let info = info_of(&func, 0, Invariants::empty());
    assert!(!info.reaches_return);
    assert_eq!(info.recursive_call, Some(1));
}

#[test]
fn loads_and_access_markers_do_not_count_as_writes() {
    let func = make_func(
        1,
        vec![block(
            0,
            vec![
                Instr::BeginAccess {
                    dst: v(1),
                    addr: v(0),
                    kind: AccessKind::Modify,
                },
                Instr::Load {
                    dst: v(2),
                    addr: v(1),
                    kind: LoadKind::Take,
                },
                Instr::EndAccess { access: v(1) },
                call_self(3, &[0]),
            ],
            Terminator::Unreachable,
        )],
    );
    let info = info_of(&func, 0, Invariants::empty().with_memory_invariant());
    assert_eq!(info.recursive_call, Some(3));
    assert!(!info.reaches_return);
}

#[test]
fn writing_non_recursive_call_breaks_memory_invariance() {
    let func = make_func(
        1,
        vec![block(0, vec![call(1, OTHER, &[])], jump(1)), block(1, vec![], ret(0))],
    );
    assert!(info_of(&func, 0, Invariants::empty().with_memory_invariant()).reaches_return);
    assert!(!info_of(&func, 0, Invariants::empty()).reaches_return);
}

#[test]
fn try_apply_recursion_is_at_terminator_position() {
    let func = make_func(
        1,
        vec![
            block(
                0,
                vec![Instr::Literal { dst: v(1), value: 0 }],
                Terminator::TryApply {
                    site: ApplySite::new(Callee::Function(SELF), vec![v(0)])
                        .with_effects(MemoryEffects::empty()),
                    normal: b(1),
                    error: b(2),
                },
            ),
            block(1, vec![], ret(0)),
            block(2, vec![], ret(0)),
        ],
    );
    let info = info_of(&func, 0, Invariants::empty());
    assert_eq!(info.recursive_call, Some(1));
    assert_eq!(info.num_succs_not_reaching_return, 2);
}

#[test]
fn counter_starts_at_edge_count() {
    let func = make_func(
        1,
        vec![
            block(
                0,
                vec![],
                Terminator::SwitchEnum {
                    scrutinee: v(0),
                    cases: vec![(0, b(1)), (1, b(1)), (2, b(1))],
                    default: None,
                },
            ),
            block(1, vec![], ret(0)),
        ],
    );
    let info = info_of(&func, 0, forwarding_all(&func));
    assert_eq!(info.num_succs_not_reaching_return, 3);
    assert!(info.has_invariant_condition);
}

#[test]
fn partial_apply_is_not_a_call() {
    let func = make_func(
        1,
        vec![block(
            0,
            vec![Instr::PartialApply {
                dst: v(1),
                callee: Callee::Function(SELF),
                args: vec![v(0)],
            }],
            branch(0, 1, 1),
        )],
    );
    let info = info_of(&func, 0, Invariants::empty());
    assert_eq!(info.recursive_call, None);
    assert!(!info.reaches_return);
}
