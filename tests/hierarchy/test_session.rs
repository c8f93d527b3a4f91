//! Tests for request lifecycle: determinism, cancellation and stale items

use crate::common::*;
use callhier::{
    CallHierarchy, CallHierarchyHandler, CancellationToken, ContentId, HierarchyError, Outcome,
    Position, RequestState, WorkspaceHost,
};
use std::thread;

fn call_hierarchy_uri() -> String {
    uri(HELLO_ROOT, CALL_HIERARCHY_PATH)
}

#[test]
fn test_repeated_queries_are_identical() {
    let host = hello_host();
    let bar = prepare_one(&host, &call_hierarchy_uri(), 26, 16);
    assert_eq!(incoming(&host, &bar), incoming(&host, &bar));

    let method = prepare_one(&host, &call_hierarchy_uri(), 33, 19);
    assert_eq!(outgoing(&host, &method), outgoing(&host, &method));
}

#[test]
fn test_sequential_and_parallel_scans_agree() {
    let mut host = hello_host();
    let bar = prepare_one(&host, &call_hierarchy_uri(), 26, 16);
    let parallel = incoming(&host, &bar);

    host.set_parallel_scan(false, 0);
    assert_eq!(incoming(&host, &bar), parallel);

    host.set_parallel_scan(true, 2);
    assert_eq!(incoming(&host, &bar), parallel);
}

#[test]
fn test_cancelled_requests_return_nothing() {
    let host = hello_host();
    let handler = CallHierarchyHandler::new(&host);
    let bar = prepare_one(&host, &call_hierarchy_uri(), 26, 16);

    let token = CancellationToken::new();
    token.cancel();

    let prepared = handler
        .prepare_call_hierarchy(&call_hierarchy_uri(), Position::new(26, 16), &token)
        .unwrap();
    assert!(prepared.is_none());
    assert!(handler.incoming_calls(&bar, &token).unwrap().is_empty());
    assert!(handler.outgoing_calls(&bar, &token).unwrap().is_empty());
}

#[test]
fn test_session_states() {
    let host = hello_host();
    let snapshot = host.snapshot().unwrap();
    let content = ContentId::parse(&call_hierarchy_uri()).unwrap();
    let token = CancellationToken::new();

    let mut session = CallHierarchy::new(snapshot.clone());
    assert_eq!(session.state(), RequestState::Idle);
    let outcome = session.prepare(&content, Position::new(15, 0), &token).unwrap();
    assert_eq!(outcome, Outcome::Empty);
    assert_eq!(session.state(), RequestState::Empty);

    let mut session = CallHierarchy::new(snapshot.clone());
    let Outcome::Ready(items) = session.prepare(&content, Position::new(26, 16), &token).unwrap()
    else {
        panic!("expected an item for bar()");
    };
    assert_eq!(session.state(), RequestState::Ready);

    let cancelled = CancellationToken::new();
    cancelled.cancel();
    let mut session = CallHierarchy::new(snapshot);
    let outcome = session.incoming(&items[0], &cancelled).unwrap();
    assert_eq!(outcome, Outcome::Cancelled);
    assert_eq!(session.state(), RequestState::Cancelled);
}

#[test]
fn test_stale_item_after_edit() {
    let mut host = hello_host();
    let bar = prepare_one(&host, &call_hierarchy_uri(), 26, 16);

    // bar() gains a parameter: the old item no longer matches
    host.set_file(
        CALL_HIERARCHY_PATH,
        CALL_HIERARCHY.replace("public void bar() {", "public void bar(int times) {"),
    );
    let err = CallHierarchyHandler::new(&host)
        .incoming_calls(&bar, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, HierarchyError::StaleIdentity { .. }));
    assert_eq!(err.status_code(), "STALE_IDENTITY");

    // The file disappears altogether
    assert!(host.remove_file(CALL_HIERARCHY_PATH));
    let err = CallHierarchyHandler::new(&host)
        .outgoing_calls(&bar, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(err, HierarchyError::StaleIdentity { .. }));
}

#[test]
fn test_item_survives_unrelated_edit() {
    let mut host = hello_host();
    let bar = prepare_one(&host, &call_hierarchy_uri(), 26, 16);
    host.set_file("src/org/sample/Unrelated.java", "package org.sample; class Unrelated {}");
    assert_eq!(incoming(&host, &bar).len(), 3);
}

#[test]
fn test_unloaded_workspace_is_unavailable() {
    let host = WorkspaceHost::new(HELLO_ROOT);
    let result = CallHierarchyHandler::new(&host).prepare_call_hierarchy(
        &call_hierarchy_uri(),
        Position::new(0, 0),
        &CancellationToken::new(),
    );
    let err = result.unwrap_err();
    assert!(matches!(err, HierarchyError::IndexUnavailable { .. }));
    assert!(!err.recovery_suggestions().is_empty());
}

#[test]
fn test_concurrent_requests() {
    let host = hello_host();
    let bar = prepare_one(&host, &call_hierarchy_uri(), 26, 16);
    let method = prepare_one(&host, &call_hierarchy_uri(), 33, 19);
    let expected_in = incoming(&host, &bar);
    let expected_out = outgoing(&host, &method);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let token = CancellationToken::new();
                    let handler = CallHierarchyHandler::new(&host);
                    (
                        handler.incoming_calls(&bar, &token).unwrap(),
                        handler.outgoing_calls(&method, &token).unwrap(),
                    )
                })
            })
            .collect();
        for handle in handles {
            let (found_in, found_out) = handle.join().unwrap();
            assert_eq!(found_in, expected_in);
            assert_eq!(found_out, expected_out);
        }
    });
}
