//! Call hierarchy engine for Java workspaces and their library dependencies
//!
//! Given a position in a Java file, [`CallHierarchyHandler`] finds the
//! declaration there and answers incoming-call and outgoing-call queries
//! across workspace sources and library artifacts.

pub mod config;
pub mod error;
pub mod hierarchy;
pub mod logging;
pub mod parsing;
pub mod symbol;
pub mod types;
pub mod workspace;

// Explicit exports for better API clarity
pub use config::Settings;
pub use error::{
    HierarchyError, HierarchyResult, MaterializeError, ParseError, ParseResult, WorkspaceError,
    WorkspaceResult,
};
pub use hierarchy::{
    CallHierarchy, CallHierarchyHandler, HierarchyKind, HierarchyNode, IncomingCall, Outcome,
    OutgoingCall, RequestState, SymbolTag,
};
pub use symbol::{DeclKey, DeclKind, Declaration, MemberKey, Modifiers};
pub use types::{ContentId, DeclId, FileId, Position, Range, UnitId, ViewFormat};
pub use workspace::{
    AttachedSourceMaterializer, LibraryArtifact, Materializer, Snapshot, SyntheticView,
    WorkspaceHost,
};

pub use tokio_util::sync::CancellationToken;
