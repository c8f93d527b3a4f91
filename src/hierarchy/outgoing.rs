//! Outbound calls from one declaration's executable code

use super::aggregate::CallSite;
use crate::error::{HierarchyError, HierarchyResult};
use crate::parsing::{Binder, SiteKind, UnitRef};
use crate::types::Range;
use crate::workspace::{DeclRef, Snapshot};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Node kinds that invoke a method or constructor
fn is_call_node(kind: &str) -> bool {
    SiteKind::ALL
        .iter()
        .any(|site| site.is_call() && site.node_kind() == kind)
}

/// Every bound call inside `target`'s bodies, in pre-order.
///
/// Code in lambdas and anonymous class bodies counts as the target's own.
/// Calls that do not bind are skipped.
pub fn find_callees(
    snapshot: &Snapshot,
    target: &DeclRef,
    token: &CancellationToken,
) -> HierarchyResult<Vec<CallSite>> {
    let decl = target.decl();
    if decl.kind.is_type() {
        return Ok(Vec::new());
    }

    let unit = &target.unit;
    let at = UnitRef::new(target.id.unit, unit);
    let binder = Binder::new(snapshot);
    let mut sites = Vec::new();

    for body in &decl.bodies {
        let Some(root) = unit.node_covering(body) else {
            continue;
        };
        let mut cursor = root.walk();
        'walk: loop {
            if token.is_cancelled() {
                return Err(HierarchyError::Cancelled);
            }
            let node = cursor.node();
            if is_call_node(node.kind()) {
                match binder.bind_site(at, node) {
                    Some(callee) => sites.push(CallSite {
                        caller: target.id,
                        callee,
                        span: Range::of_node(&node),
                    }),
                    None => trace!(call = unit.text(&node), "unresolved call"),
                }
            }

            if cursor.goto_first_child() {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    break 'walk;
                }
            }
        }
    }
    Ok(sites)
}
