//! Request boundary for the three call hierarchy operations
//!
//! Each call takes a fresh snapshot from the host, so concurrent requests
//! never share mutable state. Empty and cancelled outcomes are folded into
//! `None`/empty lists here; stale items and an unavailable index stay errors.

use super::node::{HierarchyNode, IncomingCall, OutgoingCall};
use super::session::{CallHierarchy, Outcome};
use crate::error::HierarchyResult;
use crate::types::{ContentId, Position};
use crate::workspace::WorkspaceHost;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy)]
pub struct CallHierarchyHandler<'h> {
    host: &'h WorkspaceHost,
}

impl<'h> CallHierarchyHandler<'h> {
    pub fn new(host: &'h WorkspaceHost) -> Self {
        Self { host }
    }

    /// `None` when nothing at the position can anchor a call hierarchy
    pub fn prepare_call_hierarchy(
        &self,
        uri: &str,
        position: Position,
        token: &CancellationToken,
    ) -> HierarchyResult<Option<Vec<HierarchyNode>>> {
        let content = ContentId::parse(uri)?;
        let mut session = CallHierarchy::new(self.host.snapshot()?);
        Ok(match session.prepare(&content, position, token)? {
            Outcome::Ready(nodes) => Some(nodes),
            Outcome::Empty | Outcome::Cancelled => None,
        })
    }

    pub fn incoming_calls(
        &self,
        item: &HierarchyNode,
        token: &CancellationToken,
    ) -> HierarchyResult<Vec<IncomingCall>> {
        let mut session = CallHierarchy::new(self.host.snapshot()?);
        Ok(session.incoming(item, token)?.unwrap_or_default())
    }

    pub fn outgoing_calls(
        &self,
        item: &HierarchyNode,
        token: &CancellationToken,
    ) -> HierarchyResult<Vec<OutgoingCall>> {
        let mut session = CallHierarchy::new(self.host.snapshot()?);
        Ok(session.outgoing(item, token)?.unwrap_or_default())
    }
}
