//! Tests for resolving a position into a call hierarchy item

use crate::common::*;
use callhier::{CallHierarchyHandler, CancellationToken, HierarchyError, HierarchyKind, Position};

#[test]
fn test_no_item_between_members() {
    let host = hello_host();
    let uri = uri(HELLO_ROOT, CALL_HIERARCHY_PATH);
    // Line 16: the blank line after `protectedField`
    assert!(prepare(&host, &uri, 15, 0).is_none());
    // Line 8: blank line inside `CallHierarchyOther`
    let other = uri_of_other();
    assert!(prepare(&host, &other, 7, 0).is_none());
}

#[test]
fn test_field() {
    let host = hello_host();
    let uri = uri(HELLO_ROOT, CALL_HIERARCHY_PATH);
    //     protected int <|>protectedField = 200;
    let item = prepare_one(&host, &uri, 14, 18);
    assert_item(&item, "protectedField", HierarchyKind::Field, "", false, 14);
    assert_eq!(item.uri, uri);
}

#[test]
fn test_enclosing_constructor() {
    let host = hello_host();
    let uri = uri(HELLO_ROOT, CALL_HIERARCHY_PATH);
    // <|>/*should resolve to enclosing "method/constructor/initializer"*/
    let item = prepare_one(&host, &uri, 19, 0);
    assert_item(&item, "Base()", HierarchyKind::Constructor, "", false, 18);
}

#[test]
fn test_methods_and_deprecation() {
    let host = hello_host();
    let uri = uri(HELLO_ROOT, CALL_HIERARCHY_PATH);

    //     public void <|>bar() {
    let bar = prepare_one(&host, &uri, 26, 16);
    assert_item(&bar, "bar()", HierarchyKind::Method, "void", false, 26);

    //     public static void <|>main(String[] args) {
    let main = prepare_one(&host, &uri, 5, 23);
    assert_item(&main, "main(String[])", HierarchyKind::Method, "void", true, 5);

    // Inside the body of `method_1`
    let method = prepare_one(&host, &uri, 34, 9);
    assert_item(&method, "method_1()", HierarchyKind::Method, "void", false, 33);
}

#[test]
fn test_types_and_initializers() {
    let host = hello_host();
    let uri = uri(HELLO_ROOT, CALL_HIERARCHY_PATH);
    // public class <|>CallHierarchy {
    let class = prepare_one(&host, &uri, 2, 13);
    assert_item(&class, "CallHierarchy", HierarchyKind::Class, "", false, 2);

    let other = uri_of_other();
    //   @Deprecated public static class <|>X {
    let x = prepare_one(&host, &other, 11, 34);
    assert_item(&x, "X", HierarchyKind::Class, "", true, 11);

    // Inside the instance initializer block
    let init = prepare_one(&host, &other, 5, 4);
    assert_item(&init, "{...}", HierarchyKind::Constructor, "", false, 4);
}

#[test]
fn test_selection_inside_range() {
    let host = hello_host();
    let uri = uri(HELLO_ROOT, CALL_HIERARCHY_PATH);
    for (line, character) in [(14, 18), (19, 0), (26, 16), (5, 23), (2, 13), (42, 12)] {
        let item = prepare_one(&host, &uri, line, character);
        assert!(
            item.range.encloses(&item.selection_range),
            "{} selection escapes its range",
            item.name
        );
    }
}

#[test]
fn test_unknown_file_has_no_item() {
    let host = hello_host();
    let missing = uri(HELLO_ROOT, "src/org/sample/Missing.java");
    assert!(prepare(&host, &missing, 0, 0).is_none());
}

#[test]
fn test_invalid_uri_is_an_error() {
    let host = hello_host();
    let result = CallHierarchyHandler::new(&host).prepare_call_hierarchy(
        "http://example.com/A.java",
        Position::new(0, 0),
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(HierarchyError::InvalidUri { .. })));
}

#[test]
fn test_wire_shape() {
    let host = hello_host();
    let uri = uri(HELLO_ROOT, CALL_HIERARCHY_PATH);

    let main = prepare_one(&host, &uri, 5, 23);
    let json = serde_json::to_value(&main).unwrap();
    assert_eq!(json["name"], "main(String[])");
    assert_eq!(json["kind"], 6);
    assert_eq!(json["detail"], "void");
    assert_eq!(json["tags"], serde_json::json!([1]));
    assert_eq!(json["selectionRange"]["start"]["line"], 5);
    assert_eq!(json["selectionRange"]["start"]["character"], 23);
    assert_eq!(json["uri"], uri.as_str());

    let bar = prepare_one(&host, &uri, 26, 16);
    let json = serde_json::to_value(&bar).unwrap();
    assert!(json.get("tags").is_none());
    assert_eq!(json["range"]["start"]["line"], 26);
}

fn uri_of_other() -> String {
    uri(HELLO_ROOT, CALL_HIERARCHY_OTHER_PATH)
}
