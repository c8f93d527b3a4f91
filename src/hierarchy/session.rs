//! One call hierarchy request over one snapshot
//!
//! A [`CallHierarchy`] serves a single request: it resolves its input,
//! runs the query and records how the request ended. Nothing survives the
//! request except what the returned nodes carry.

use super::aggregate::{aggregate_incoming, aggregate_outgoing};
use super::incoming::find_callers;
use super::locator::declaration_at;
use super::node::{HierarchyNode, IncomingCall, OutgoingCall};
use super::outgoing::find_callees;
use super::presenter::present;
use crate::error::{HierarchyError, HierarchyResult};
use crate::types::{ContentId, DeclId, Position};
use crate::workspace::{DeclRef, Snapshot};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, debug_span};

/// Lifecycle of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Idle,
    Resolving,
    Ready,
    Empty,
    Cancelled,
    Failed,
}

/// How a request ended, short of failing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Ready(T),
    /// Nothing eligible at the requested position
    Empty,
    Cancelled,
}

impl<T: Default> Outcome<T> {
    /// The result, or its default when empty or cancelled
    pub fn unwrap_or_default(self) -> T {
        match self {
            Outcome::Ready(value) => value,
            Outcome::Empty | Outcome::Cancelled => T::default(),
        }
    }
}

#[derive(Debug)]
pub struct CallHierarchy {
    snapshot: Arc<Snapshot>,
    state: RequestState,
}

impl CallHierarchy {
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self {
            snapshot,
            state: RequestState::Idle,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Nodes for the declaration at `position`
    pub fn prepare(
        &mut self,
        content: &ContentId,
        position: Position,
        token: &CancellationToken,
    ) -> HierarchyResult<Outcome<Vec<HierarchyNode>>> {
        let _span = debug_span!("prepare", uri = %content, %position).entered();
        self.state = RequestState::Resolving;
        let result = self.locate(content, position, token);
        match result {
            Ok(None) => {
                debug!("no call hierarchy declaration at position");
                self.state = RequestState::Empty;
                Ok(Outcome::Empty)
            }
            Ok(Some(decl)) => self.finish(Ok(vec![present(&decl.unit, decl.decl())])),
            Err(e) => self.finish(Err(e)),
        }
    }

    fn locate(
        &self,
        content: &ContentId,
        position: Position,
        token: &CancellationToken,
    ) -> HierarchyResult<Option<DeclRef>> {
        if token.is_cancelled() {
            return Err(HierarchyError::Cancelled);
        }
        let (unit_id, unit) = match self.snapshot.unit_for_content(content) {
            Ok(found) => found,
            Err(HierarchyError::UnknownContent { uri }) => {
                debug!(%uri, "content is not part of the workspace");
                return Ok(None);
            }
            Err(e) => return Err(e),
        };
        let Some(index) = declaration_at(&unit, position) else {
            return Ok(None);
        };
        Ok(Some(DeclRef {
            id: DeclId::new(unit_id, index),
            unit,
        }))
    }

    /// Callers of the declaration behind `node`
    pub fn incoming(
        &mut self,
        node: &HierarchyNode,
        token: &CancellationToken,
    ) -> HierarchyResult<Outcome<Vec<IncomingCall>>> {
        let _span = debug_span!("incoming", name = %node.name).entered();
        self.state = RequestState::Resolving;
        let result = self.resolve_node(node).and_then(|target| {
            let sites = find_callers(&self.snapshot, &target, token)?;
            Ok(aggregate_incoming(&self.snapshot, &sites))
        });
        self.finish(result)
    }

    /// Callees of the declaration behind `node`
    pub fn outgoing(
        &mut self,
        node: &HierarchyNode,
        token: &CancellationToken,
    ) -> HierarchyResult<Outcome<Vec<OutgoingCall>>> {
        let _span = debug_span!("outgoing", name = %node.name).entered();
        self.state = RequestState::Resolving;
        let result = self.resolve_node(node).and_then(|target| {
            let sites = find_callees(&self.snapshot, &target, token)?;
            Ok(aggregate_outgoing(&self.snapshot, &sites))
        });
        self.finish(result)
    }

    /// Find the declaration a node was produced from in this snapshot
    fn resolve_node(&self, node: &HierarchyNode) -> HierarchyResult<DeclRef> {
        let stale = |reason: &str| HierarchyError::StaleIdentity {
            name: node.name.clone(),
            uri: node.uri.clone(),
            reason: reason.to_string(),
        };

        let key = node
            .data
            .as_ref()
            .ok_or_else(|| stale("item carries no declaration key"))?;
        let content = ContentId::parse(&node.uri)?;
        let (unit_id, unit) = match self.snapshot.unit_for_content(&content) {
            Ok(found) => found,
            Err(HierarchyError::UnknownContent { .. }) => {
                return Err(stale("its file is no longer part of the workspace"));
            }
            Err(e) => return Err(e),
        };
        let index = unit
            .find_key(key)
            .ok_or_else(|| stale("declaration was removed or its signature changed"))?;
        Ok(DeclRef {
            id: DeclId::new(unit_id, index),
            unit,
        })
    }

    fn finish<T>(&mut self, result: HierarchyResult<Vec<T>>) -> HierarchyResult<Outcome<Vec<T>>> {
        match result {
            Ok(items) => {
                self.state = RequestState::Ready;
                debug!(items = items.len(), "request finished");
                Ok(Outcome::Ready(items))
            }
            Err(HierarchyError::Cancelled) => {
                debug!("request cancelled");
                self.state = RequestState::Cancelled;
                Ok(Outcome::Cancelled)
            }
            Err(e) => {
                self.state = RequestState::Failed;
                Err(e)
            }
        }
    }
}
