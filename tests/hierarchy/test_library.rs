//! Tests for traversal into library artifacts

use crate::common::*;
use callhier::{
    CallHierarchyHandler, CancellationToken, ContentId, HierarchyError, HierarchyKind, Position,
    ViewFormat,
};

fn salut_uri() -> String {
    uri(SALUT_ROOT, SALUT_CALL_HIERARCHY_PATH)
}

fn word_utils_uri() -> String {
    ContentId::synthetic(COMMONS_LANG, WORD_UTILS, ViewFormat::Source).uri()
}

#[test]
fn test_outgoing_chain_through_library() {
    let host = salut_host();
    //     public Object <|>build() {
    let build = prepare_one(&host, &salut_uri(), 14, 18);
    assert_item(&build, "build()", HierarchyKind::Method, "Object", false, 14);

    let calls = outgoing(&host, &build);
    assert_eq!(calls.len(), 1);
    assert_item(&calls[0].to, "capitalize(String)", HierarchyKind::Method, "String", false, 8);

    let nested = outgoing(&host, &calls[0].to);
    assert_eq!(nested.len(), 1);
    assert_item(
        &nested[0].to,
        "capitalize(String, char...)",
        HierarchyKind::Method,
        "String",
        false,
        12,
    );

    let jar_uri = &nested[0].to.uri;
    assert!(jar_uri.starts_with("jdt://"));
    assert!(jar_uri.contains("org.apache.commons.lang3.text"));
    assert!(jar_uri.contains("WordUtils.class"));
    assert_eq!(jar_uri, &word_utils_uri());

    // A third level, still inside the library view
    let deeper = outgoing(&host, &nested[0].to);
    assert_eq!(deeper.len(), 1);
    assert_item(
        &deeper[0].to,
        "isDelimiter(char, char[])",
        HierarchyKind::Method,
        "boolean",
        false,
        31,
    );
}

#[test]
fn test_incoming_calls_from_library_and_workspace() {
    let host = salut_host();
    //     public static String <|>capitalize(final String str, final char... delimiters) {
    let varargs = prepare_one(&host, &word_utils_uri(), 12, 25);
    assert_item(
        &varargs,
        "capitalize(String, char...)",
        HierarchyKind::Method,
        "String",
        false,
        12,
    );

    let calls = incoming(&host, &varargs);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].from.name, "capitalize(String)");
    assert_eq!(calls[0].from.uri, word_utils_uri());
    assert_eq!(calls[0].from_ranges[0].start.line, 9);

    let callers = incoming(&host, &calls[0].from);
    assert_eq!(callers.len(), 1);
    assert_item(&callers[0].from, "build()", HierarchyKind::Method, "Object", false, 14);
    assert_eq!(callers[0].from.uri, salut_uri());
}

#[test]
fn test_library_identities_are_stable() {
    let host = salut_host();
    let build = prepare_one(&host, &salut_uri(), 14, 18);
    let first = outgoing(&host, &build);
    let second = outgoing(&host, &build);
    assert_eq!(first, second);
    assert_eq!(first[0].to.data, second[0].to.data);
}

#[test]
fn test_type_without_source_fails_to_materialize() {
    let host = salut_host();
    let object = ContentId::synthetic(RT_JAR, "java.lang.Object", ViewFormat::Source).uri();
    let result = CallHierarchyHandler::new(&host).prepare_call_hierarchy(
        &object,
        Position::new(0, 0),
        &CancellationToken::new(),
    );
    assert!(matches!(result, Err(HierarchyError::Materialize(_))));

    // Unknown library types are simply not there
    let missing = ContentId::synthetic(RT_JAR, "java.lang.Missing", ViewFormat::Source).uri();
    assert!(prepare(&host, &missing, 0, 0).is_none());
}
