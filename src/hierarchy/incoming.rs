//! Reference search: every site that refers to a declaration
//!
//! Candidate sites come from each unit's name index; each candidate is
//! bound and kept when it lands on the target. Workspace units are scanned
//! first, in path order, then library views in artifact and type order.

use super::aggregate::CallSite;
use crate::error::{HierarchyError, HierarchyResult};
use crate::parsing::{Binder, CONSTRUCTOR_CALL_KEY, CompilationUnit, SiteKind, UnitRef};
use crate::symbol::DeclKind;
use crate::types::{DeclId, Range, UnitId};
use crate::workspace::{DeclRef, Snapshot};
use std::collections::HashSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use tree_sitter::Node;

/// Which names to look up, which site shapes qualify and which bound
/// declarations count as the target
#[derive(Debug)]
struct TargetQuery {
    names: Vec<String>,
    kinds: &'static [SiteKind],
    accepted: HashSet<DeclId>,
    /// Argument counts the target can accept, when it is a single invocable
    arity: Option<Arity>,
}

#[derive(Debug, Clone, Copy)]
struct Arity {
    fixed: usize,
    varargs: bool,
}

impl Arity {
    fn admits(&self, count: usize) -> bool {
        if self.varargs {
            count >= self.fixed
        } else {
            count == self.fixed
        }
    }
}

const METHOD_SITES: &[SiteKind] = &[SiteKind::Invocation, SiteKind::MethodReference];
const CONSTRUCTOR_SITES: &[SiteKind] = &[
    SiteKind::Creation,
    SiteKind::CreationReference,
    SiteKind::ExplicitConstructor,
];
const FIELD_SITES: &[SiteKind] = &[SiteKind::FieldAccess, SiteKind::Identifier];

impl TargetQuery {
    fn for_target(target: &DeclRef) -> Option<Self> {
        let decl = target.decl();
        let type_name = || {
            target
                .unit
                .declaration(decl.parent?)
                .map(|owner| owner.name.clone())
        };
        let arity = Some(Arity {
            fixed: decl.fixed_arity(),
            varargs: decl.varargs,
        });
        let query = match decl.kind {
            DeclKind::Method => Self {
                names: vec![decl.name.clone()],
                kinds: METHOD_SITES,
                accepted: HashSet::from([target.id]),
                arity,
            },
            DeclKind::Constructor => Self {
                names: vec![type_name()?, CONSTRUCTOR_CALL_KEY.to_string()],
                kinds: CONSTRUCTOR_SITES,
                accepted: HashSet::from([target.id]),
                arity,
            },
            DeclKind::Field | DeclKind::EnumConstant => Self {
                names: vec![decl.name.clone()],
                kinds: FIELD_SITES,
                accepted: HashSet::from([target.id]),
                arity: None,
            },
            DeclKind::Initializer => return None,
            _ => {
                // A type stands for its implicit constructor and its declared ones
                let mut accepted = HashSet::from([target.id]);
                accepted.extend(
                    target
                        .unit
                        .members_of(target.id.index)
                        .filter(|(_, member)| member.kind == DeclKind::Constructor)
                        .map(|(index, _)| DeclId::new(target.id.unit, index)),
                );
                Self {
                    names: vec![decl.name.clone(), CONSTRUCTOR_CALL_KEY.to_string()],
                    kinds: CONSTRUCTOR_SITES,
                    accepted,
                    arity: None,
                }
            }
        };
        Some(query)
    }
}

/// All sites referring to `target`, in scan order
pub fn find_callers(
    snapshot: &Snapshot,
    target: &DeclRef,
    token: &CancellationToken,
) -> HierarchyResult<Vec<CallSite>> {
    let Some(query) = TargetQuery::for_target(target) else {
        debug!("initializers have no callers");
        return Ok(Vec::new());
    };
    trace!(?query, "reference query");

    let mut sites = Vec::new();
    let per_unit = snapshot.scan_workspace(|id, unit| scan_unit(snapshot, &query, id, unit, token));
    for found in per_unit {
        sites.extend(found?);
    }

    for (id, unit) in snapshot.library_units() {
        if token.is_cancelled() {
            return Err(HierarchyError::Cancelled);
        }
        match unit {
            Ok(unit) => sites.extend(scan_unit(snapshot, &query, id, &unit, token)?),
            Err(e) => debug!(?id, "skipping library type: {e}"),
        }
    }

    debug!(sites = sites.len(), "reference scan finished");
    Ok(sites)
}

fn scan_unit(
    snapshot: &Snapshot,
    query: &TargetQuery,
    id: UnitId,
    unit: &CompilationUnit,
    token: &CancellationToken,
) -> HierarchyResult<Vec<CallSite>> {
    if token.is_cancelled() {
        return Err(HierarchyError::Cancelled);
    }
    let candidates = unit
        .names
        .candidates(&query.names, |kind| query.kinds.contains(&kind));
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let binder = Binder::new(snapshot);
    let at = UnitRef::new(id, unit);
    let mut out = Vec::new();
    for site in candidates {
        if token.is_cancelled() {
            return Err(HierarchyError::Cancelled);
        }
        let Some(node) = unit.node_for(&site.bytes, site.kind.node_kind()) else {
            continue;
        };
        if let (Some(arity), Some(count)) = (query.arity, argument_count(&node)) {
            if !arity.admits(count) {
                continue;
            }
        }
        let Some(bound) = binder.bind_site(at, node) else {
            trace!(site = unit.text(&node), "unresolved reference candidate");
            continue;
        };
        if !query.accepted.contains(&bound) {
            continue;
        }
        // References outside any member (annotation values on types) have no caller
        let Some(caller) = unit.enclosing_member(site.bytes.start) else {
            continue;
        };
        out.push(CallSite {
            caller: DeclId::new(id, caller),
            callee: bound,
            span: Range::of_node(&node),
        });
    }
    Ok(out)
}

/// Number of arguments at a call site with an argument list
fn argument_count(node: &Node) -> Option<usize> {
    let args = node.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    let count = args
        .named_children(&mut cursor)
        .filter(|arg| !arg.kind().ends_with("comment"))
        .count();
    Some(count)
}
