//! Grouping of raw call sites into hierarchy records

use super::node::{IncomingCall, OutgoingCall};
use super::presenter::present;
use crate::types::{DeclId, Range};
use crate::workspace::Snapshot;
use indexmap::IndexMap;
use tracing::debug;

/// One resolved reference: `caller` refers to `callee` at `span`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub caller: DeclId,
    pub callee: DeclId,
    /// Range of the call expression inside the caller's content
    pub span: Range,
}

/// Spans per key in first-seen order, duplicates removed
fn group_by(sites: &[CallSite], key: impl Fn(&CallSite) -> DeclId) -> IndexMap<DeclId, Vec<Range>> {
    let mut groups: IndexMap<DeclId, Vec<Range>> = IndexMap::new();
    for site in sites {
        let spans = groups.entry(key(site)).or_default();
        if !spans.contains(&site.span) {
            spans.push(site.span);
        }
    }
    groups
}

pub fn aggregate_incoming(snapshot: &Snapshot, sites: &[CallSite]) -> Vec<IncomingCall> {
    group_by(sites, |site| site.caller)
        .into_iter()
        .filter_map(|(caller, from_ranges)| {
            let Some(caller) = snapshot.decl(caller) else {
                debug!(?caller, "caller vanished from snapshot");
                return None;
            };
            Some(IncomingCall {
                from: present(&caller.unit, caller.decl()),
                from_ranges,
            })
        })
        .collect()
}

pub fn aggregate_outgoing(snapshot: &Snapshot, sites: &[CallSite]) -> Vec<OutgoingCall> {
    group_by(sites, |site| site.callee)
        .into_iter()
        .filter_map(|(callee, from_ranges)| {
            let Some(callee) = snapshot.decl(callee) else {
                debug!(?callee, "callee vanished from snapshot");
                return None;
            };
            Some(OutgoingCall {
                to: present(&callee.unit, callee.decl()),
                from_ranges,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FileId, UnitId};

    fn site(caller: u32, callee: u32, line: u32) -> CallSite {
        let unit = UnitId::Workspace(FileId(0));
        CallSite {
            caller: DeclId::new(unit, caller),
            callee: DeclId::new(unit, callee),
            span: Range::new(line, 8, line, 13),
        }
    }

    #[test]
    fn test_grouping_keeps_first_seen_order() {
        let sites = [site(3, 1, 10), site(2, 1, 20), site(3, 1, 11)];
        let groups = group_by(&sites, |s| s.caller);
        let keys: Vec<u32> = groups.keys().map(|id| id.index).collect();
        assert_eq!(keys, vec![3, 2]);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn test_duplicate_spans_collapse() {
        let sites = [site(3, 1, 10), site(3, 1, 10), site(3, 2, 10)];
        let by_caller = group_by(&sites, |s| s.caller);
        assert_eq!(by_caller.len(), 1);
        assert_eq!(by_caller[0], vec![Range::new(10, 8, 10, 13)]);

        let by_callee = group_by(&sites, |s| s.callee);
        assert_eq!(by_callee.len(), 2);
    }
}
