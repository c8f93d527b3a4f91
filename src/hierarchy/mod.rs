//! Call hierarchy: prepare, incoming calls and outgoing calls

pub mod aggregate;
pub mod handler;
pub mod identity;
pub mod incoming;
pub mod locator;
pub mod node;
pub mod outgoing;
pub mod presenter;
pub mod session;

pub use aggregate::CallSite;
pub use handler::CallHierarchyHandler;
pub use node::{HierarchyKind, HierarchyNode, IncomingCall, OutgoingCall, SymbolTag};
pub use session::{CallHierarchy, Outcome, RequestState};
