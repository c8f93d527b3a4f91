//! Workspace sources, library artifacts and immutable snapshots

mod host;
mod library;
mod snapshot;
mod walker;

pub use host::WorkspaceHost;
pub use library::{
    AttachedSourceMaterializer, LibraryArtifact, Materializer, SyntheticView, ViewCache,
};
pub use snapshot::{DeclRef, ScanOptions, Snapshot};
pub use walker::{FileWalker, JAVA_EXTENSION};
