//! Tests for outgoing calls

use crate::common::*;
use callhier::{ContentId, HierarchyKind};

fn call_hierarchy_uri() -> String {
    uri(HELLO_ROOT, CALL_HIERARCHY_PATH)
}

#[test]
fn test_outgoing_calls_in_textual_order() {
    let host = hello_host();
    //     protected void <|>method_1() {
    let method = prepare_one(&host, &call_hierarchy_uri(), 33, 19);
    assert_item(&method, "method_1()", HierarchyKind::Method, "void", false, 33);

    let calls = outgoing(&host, &method);
    assert_eq!(calls.len(), 2);
    assert_item(&calls[0].to, "foo()", HierarchyKind::Method, "void", false, 22);
    assert_item(&calls[1].to, "bar()", HierarchyKind::Method, "void", false, 26);
    assert_eq!(calls[0].from_ranges[0].start.line, 34);
    assert_eq!(calls[1].from_ranges[0].start.line, 35);
}

#[test]
fn test_outgoing_into_library() {
    let host = hello_host();
    let method = prepare_one(&host, &call_hierarchy_uri(), 33, 19);
    let calls = outgoing(&host, &method);

    let bar_calls = outgoing(&host, &calls[1].to);
    assert_eq!(bar_calls.len(), 2);
    assert_item(&bar_calls[0].to, "Child()", HierarchyKind::Constructor, "", false, 42);
    assert_item(
        &bar_calls[1].to,
        "currentThread()",
        HierarchyKind::Method,
        "Thread",
        false,
        4,
    );

    let thread_uri = &bar_calls[1].to.uri;
    assert_eq!(
        thread_uri,
        "jdt://contents/rt.jar/java.lang/Thread.class?format=source"
    );
    assert!(!ContentId::parse(thread_uri).unwrap().is_editable());
    // The call site itself is in the workspace file
    assert_eq!(bar_calls[1].from_ranges[0].start.line, 28);
}

#[test]
fn test_multiple_sites_to_one_callee() {
    let host = hello_host();
    //     void <|>twice() {
    let twice = prepare_one(&host, &call_hierarchy_uri(), 38, 9);
    let calls = outgoing(&host, &twice);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to.name, "foo()");
    let lines: Vec<u32> = calls[0].from_ranges.iter().map(|r| r.start.line).collect();
    assert_eq!(lines, vec![39, 40]);
}

#[test]
fn test_explicit_and_implicit_constructor_calls() {
    let host = hello_host();
    let child = prepare_one(&host, &call_hierarchy_uri(), 42, 12);
    let callees: Vec<String> = outgoing(&host, &child)
        .into_iter()
        .map(|call| call.to.name)
        .collect();
    assert_eq!(callees, vec!["Base()", "bar()"]);

    let other = uri(HELLO_ROOT, CALL_HIERARCHY_OTHER_PATH);
    //     public <|>FooBuilder() { new X(); }
    let builder = prepare_one(&host, &other, 9, 11);
    assert_item(&builder, "FooBuilder()", HierarchyKind::Constructor, "", false, 9);
    let calls = outgoing(&host, &builder);
    assert_eq!(calls.len(), 1);
    // No declared constructor: the call lands on the type
    assert_item(&calls[0].to, "X", HierarchyKind::Class, "", true, 11);

    let init = prepare_one(&host, &other, 5, 4);
    let calls = outgoing(&host, &init);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].to.name, "FooBuilder()");
}

#[test]
fn test_no_outgoing_calls() {
    let host = hello_host();
    // Types
    let class = prepare_one(&host, &call_hierarchy_uri(), 2, 13);
    assert!(outgoing(&host, &class).is_empty());
    // Field reads and writes are not calls
    let base = prepare_one(&host, &call_hierarchy_uri(), 18, 12);
    assert!(outgoing(&host, &base).is_empty());
    let field = prepare_one(&host, &call_hierarchy_uri(), 14, 18);
    assert!(outgoing(&host, &field).is_empty());
}
