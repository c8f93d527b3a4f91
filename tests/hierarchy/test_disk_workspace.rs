//! Tests for workspaces loaded from disk through settings

use crate::common::*;
use callhier::config::LibraryConfig;
use callhier::{HierarchyKind, Settings, WorkspaceHost};
use std::path::PathBuf;

fn settings_for(project: &DiskProject) -> Settings {
    Settings {
        workspace_root: Some(project.path().to_path_buf()),
        libraries: vec![LibraryConfig {
            id: RT_JAR.to_string(),
            sources: PathBuf::from("lib/rt"),
        }],
        ..Settings::default()
    }
}

#[test]
fn test_host_from_settings() {
    let project = DiskProject::hello();
    let host = WorkspaceHost::from_settings(&settings_for(&project));
    assert_eq!(host.file_count(), 2);

    let bar = prepare_one(&host, &project.uri(CALL_HIERARCHY_PATH), 26, 16);
    assert_item(&bar, "bar()", HierarchyKind::Method, "void", false, 26);
    assert_eq!(incoming(&host, &bar).len(), 3);

    let callees = outgoing(&host, &bar);
    assert_eq!(callees.len(), 2);
    assert_eq!(callees[1].to.name, "currentThread()");
    assert!(callees[1].to.uri.starts_with("jdt://contents/rt.jar/"));
}

#[test]
fn test_settings_round_trip_through_toml() {
    let project = DiskProject::hello();
    let settings = settings_for(&project);
    let path = project.path().join(".callhier/settings.toml");
    settings.save(&path).unwrap();

    let loaded = Settings::load_from(&path).unwrap();
    assert_eq!(loaded.libraries, settings.libraries);
    assert_eq!(loaded.source_roots, vec![PathBuf::from("src")]);

    let host = WorkspaceHost::from_settings(&loaded);
    assert_eq!(host.file_count(), 2);
}

#[test]
fn test_missing_library_directory_makes_index_unavailable() {
    let project = DiskProject::hello();
    let mut settings = settings_for(&project);
    settings.libraries[0].sources = PathBuf::from("lib/missing");

    let host = WorkspaceHost::from_settings(&settings);
    let err = host.snapshot().unwrap_err();
    assert_eq!(err.status_code(), "INDEX_UNAVAILABLE");
}
