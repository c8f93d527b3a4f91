//! Tests for incoming calls over workspace sources

use crate::common::*;
use callhier::HierarchyKind;

fn call_hierarchy_uri() -> String {
    uri(HELLO_ROOT, CALL_HIERARCHY_PATH)
}

#[test]
fn test_incoming_calls_of_method() {
    let host = hello_host();
    //     public void <|>bar() {
    let bar = prepare_one(&host, &call_hierarchy_uri(), 26, 16);
    assert_item(&bar, "bar()", HierarchyKind::Method, "void", false, 26);

    let calls = incoming(&host, &bar);
    assert_eq!(calls.len(), 3);
    // Workspace scan order: callers by position of their first call site
    assert_item(&calls[0].from, "main(String[])", HierarchyKind::Method, "void", true, 5);
    assert_item(&calls[1].from, "method_1()", HierarchyKind::Method, "void", false, 33);
    assert_item(&calls[2].from, "Child()", HierarchyKind::Constructor, "", false, 42);

    for call in &calls {
        assert_eq!(call.from_ranges.len(), 1, "{}", call.from.name);
        assert_eq!(call.from.uri, call_hierarchy_uri());
    }
    assert_eq!(calls[0].from_ranges[0].start.line, 6);
    assert_eq!(calls[1].from_ranges[0].start.line, 35);
    assert_eq!(calls[2].from_ranges[0].start.line, 44);
}

#[test]
fn test_multiple_sites_in_one_caller() {
    let host = hello_host();
    //     public void <|>foo() {
    let foo = prepare_one(&host, &call_hierarchy_uri(), 22, 16);
    assert_item(&foo, "foo()", HierarchyKind::Method, "void", false, 22);

    let calls = incoming(&host, &foo);
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].from.name, "method_1()");
    assert_eq!(calls[0].from_ranges.len(), 1);

    assert_eq!(calls[1].from.name, "twice()");
    let lines: Vec<u32> = calls[1].from_ranges.iter().map(|r| r.start.line).collect();
    assert_eq!(lines, vec![39, 40]);
}

#[test]
fn test_incoming_references_of_field() {
    let host = hello_host();
    let field = prepare_one(&host, &call_hierarchy_uri(), 14, 18);

    let calls = incoming(&host, &field);
    assert_eq!(calls.len(), 1);
    assert_item(&calls[0].from, "Base()", HierarchyKind::Constructor, "", false, 18);
    assert_eq!(calls[0].from_ranges[0].start.line, 20);
}

#[test]
fn test_incoming_calls_of_constructors() {
    let host = hello_host();

    // `super()` in `Child()` binds to `Base()`
    let base = prepare_one(&host, &call_hierarchy_uri(), 18, 12);
    assert_item(&base, "Base()", HierarchyKind::Constructor, "", false, 18);
    let calls = incoming(&host, &base);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from.name, "Child()");
    assert_eq!(calls[0].from_ranges[0].start.line, 43);

    let child = prepare_one(&host, &call_hierarchy_uri(), 42, 12);
    let callers: Vec<String> = incoming(&host, &child)
        .into_iter()
        .map(|call| call.from.name)
        .collect();
    assert_eq!(callers, vec!["main(String[])", "bar()"]);
}

#[test]
fn test_incoming_chain_through_implicit_constructor() {
    let host = hello_host();
    let other = uri(HELLO_ROOT, CALL_HIERARCHY_OTHER_PATH);

    //   @Deprecated public static class <|>X {
    let x = prepare_one(&host, &other, 11, 34);
    assert_item(&x, "X", HierarchyKind::Class, "", true, 11);

    let calls = incoming(&host, &x);
    assert_eq!(calls.len(), 1);
    assert_item(&calls[0].from, "FooBuilder()", HierarchyKind::Constructor, "", false, 9);

    let callers = incoming(&host, &calls[0].from);
    assert_eq!(callers.len(), 1);
    assert_item(&callers[0].from, "{...}", HierarchyKind::Constructor, "", false, 4);

    // Initializers are not invocable
    assert!(incoming(&host, &callers[0].from).is_empty());
}

#[test]
fn test_uncalled_declaration_has_no_callers() {
    let host = hello_host();
    let class = prepare_one(&host, &call_hierarchy_uri(), 2, 13);
    assert!(incoming(&host, &class).is_empty());
}
