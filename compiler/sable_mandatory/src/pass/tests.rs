use pretty_assertions::assert_eq;
use sable_ir::{FunctionOrigin, Name, Span};

use super::*;
use crate::infinite_recursion::DiagnoseInfiniteRecursion;
use crate::test_helpers::{block, call, empty_module, jump, make_func, ret, span_at};

/// `f(x) { f(x) }`, named `name`, with its call at `offset`.
fn recursive(name: u32, offset: u32) -> Function {
    let name = Name::from_raw(name);
    let mut func = make_func(1, vec![block(0, vec![call(1, name, &[0])], ret(1))]);
    func.name = name;
    func.set_span(sable_ir::BlockId::new(0), 0, Span::new(offset, offset + 4));
    func
}

fn non_recursive(name: u32) -> Function {
    let mut func = make_func(1, vec![block(0, vec![], ret(0))]);
    func.name = Name::from_raw(name);
    func
}

/// Recursive, but the entry block branches to itself.
fn malformed(name: u32) -> Function {
    let name = Name::from_raw(name);
    let mut func = make_func(1, vec![block(0, vec![call(1, name, &[0])], jump(0))]);
    func.name = name;
    func
}

fn sample_module() -> Module {
    let mut deserialized = recursive(12, 300);
    deserialized.origin = FunctionOrigin::Deserialized;

    let mut module = empty_module();
    module.functions = vec![
        recursive(10, 500),
        non_recursive(11),
        deserialized,
        malformed(13),
        recursive(14, 100),
    ];
    module
}

fn primary_spans(diags: &[Diagnostic]) -> Vec<Option<Span>> {
    diags.iter().map(Diagnostic::primary_span).collect()
}

#[test]
fn default_config() {
    let config = PassConfig::default();
    assert!(config.skip_deserialized);
    assert!(config.parallel);
    assert_eq!(config.verify_cfg, cfg!(debug_assertions));
}

#[test]
fn diagnostics_follow_module_order() {
    let module = sample_module();
    let config = PassConfig {
        verify_cfg: true,
        ..PassConfig::default()
    };
    let diags = run_module(&module, &[&DiagnoseInfiniteRecursion], &config);
    assert_eq!(
        primary_spans(&diags),
        vec![Some(Span::new(500, 504)), Some(Span::new(100, 104))]
    );
}

#[test]
fn parallel_and_sequential_agree() {
    let mut module = sample_module();
    for i in 0..64 {
        module.functions.push(recursive(100 + i, 1000 + i * 10));
        module.functions.push(non_recursive(200 + i));
    }
    let passes: [&dyn FunctionPass; 1] = [&DiagnoseInfiniteRecursion];

    let parallel = run_module(
        &module,
        &passes,
        &PassConfig {
            parallel: true,
            verify_cfg: true,
            ..PassConfig::default()
        },
    );
    let sequential = run_module(
        &module,
        &passes,
        &PassConfig {
            parallel: false,
            verify_cfg: true,
            ..PassConfig::default()
        },
    );
    assert_eq!(parallel, sequential);
    assert_eq!(parallel.len(), 66);
}

#[test]
fn malformed_function_analyzed_without_verification() {
    let module = sample_module();
    let config = PassConfig {
        verify_cfg: false,
        parallel: false,
        ..PassConfig::default()
    };
    let diags = run_module(&module, &[&DiagnoseInfiniteRecursion], &config);
    assert_eq!(
        primary_spans(&diags),
        vec![
            Some(Span::new(500, 504)),
            Some(span_at(0, 0)),
            Some(Span::new(100, 104)),
        ]
    );
}

#[test]
fn deserialized_functions_skipped_by_pass_too() {
    let module = sample_module();
    let config = PassConfig {
        skip_deserialized: false,
        verify_cfg: true,
        parallel: false,
    };
    let diags = run_module(&module, &[&DiagnoseInfiniteRecursion], &config);
    assert_eq!(diags.len(), 2);
}

#[test]
fn no_passes_no_diagnostics() {
    let diags = run_module(&sample_module(), &[], &PassConfig::default());
    assert!(diags.is_empty());
}
