//! Structural integrity of an article body.
//!
//! The store keeps `order` and `nodes` in step on add/remove, but nothing
//! stops a caller from loading a document, reordering, or removing a
//! section child in ways that break the pairing. This module reports those
//! problems and provides the arena helpers the store uses to enforce them
//! under [`IntegrityPolicy::Strict`].

use std::collections::{BTreeSet, HashMap, HashSet};
use std::str::FromStr;

use palika_sdk::{NodeId, Structure};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// How strictly the store validates cross-node references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegrityPolicy {
    /// Accept reorders and section child lists verbatim.
    Permissive,
    /// Reject reorders that are not permutations and section children that
    /// do not resolve.
    #[default]
    Strict,
}

impl IntegrityPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            IntegrityPolicy::Permissive => "permissive",
            IntegrityPolicy::Strict => "strict",
        }
    }
}

impl FromStr for IntegrityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "permissive" => Ok(IntegrityPolicy::Permissive),
            "strict" => Ok(IntegrityPolicy::Strict),
            other => Err(format!(
                "unknown integrity policy '{other}' (expected 'strict' or 'permissive')"
            )),
        }
    }
}

/// A section that lists an id with no node in the bag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DanglingChild {
    pub section: NodeId,
    pub child: NodeId,
}

/// Problems found by [`check_integrity`]. Each list is sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrityReport {
    pub duplicate_order_ids: Vec<NodeId>,
    pub order_without_node: Vec<NodeId>,
    pub nodes_without_order: Vec<NodeId>,
    pub duplicate_node_ids: Vec<NodeId>,
    pub dangling_children: Vec<DanglingChild>,
    pub section_cycles: Vec<NodeId>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.duplicate_order_ids.is_empty()
            && self.order_without_node.is_empty()
            && self.nodes_without_order.is_empty()
            && self.duplicate_node_ids.is_empty()
            && self.dangling_children.is_empty()
            && self.section_cycles.is_empty()
    }

    /// Total number of problems.
    pub fn issue_count(&self) -> usize {
        self.duplicate_order_ids.len()
            + self.order_without_node.len()
            + self.nodes_without_order.len()
            + self.duplicate_node_ids.len()
            + self.dangling_children.len()
            + self.section_cycles.len()
    }
}

/// Inspect a structure without modifying it.
pub fn check_integrity(structure: &Structure) -> IntegrityReport {
    let node_ids: HashSet<&NodeId> = structure.nodes.iter().map(|n| &n.id).collect();
    let order_ids: HashSet<&NodeId> = structure.order.iter().collect();

    let mut report = IntegrityReport {
        duplicate_order_ids: duplicates(structure.order.iter()),
        duplicate_node_ids: duplicates(structure.nodes.iter().map(|n| &n.id)),
        ..IntegrityReport::default()
    };

    report.order_without_node = sorted(
        order_ids
            .iter()
            .filter(|id| !node_ids.contains(*id))
            .map(|id| (*id).clone()),
    );
    report.nodes_without_order = sorted(
        node_ids
            .iter()
            .filter(|id| !order_ids.contains(*id))
            .map(|id| (*id).clone()),
    );

    let mut dangling = Vec::new();
    for node in &structure.nodes {
        let Some(children) = node.body.section_children() else {
            continue;
        };
        for child in children.iter().filter(|c| !node_ids.contains(c)) {
            dangling.push(DanglingChild {
                section: node.id.clone(),
                child: child.clone(),
            });
        }
    }
    dangling.sort_by(|a, b| (&a.section, &a.child).cmp(&(&b.section, &b.child)));
    dangling.dedup();
    report.dangling_children = dangling;

    report.section_cycles = section_cycles(structure);
    report
}

fn duplicates<'a>(ids: impl Iterator<Item = &'a NodeId>) -> Vec<NodeId> {
    let mut seen = HashSet::new();
    sorted(ids.filter(|id| !seen.insert(*id)).cloned())
}

fn sorted(ids: impl Iterator<Item = NodeId>) -> Vec<NodeId> {
    ids.collect::<BTreeSet<_>>().into_iter().collect()
}

/// Section child lists keyed by section id.
fn section_graph(structure: &Structure) -> HashMap<&NodeId, &[NodeId]> {
    structure
        .nodes
        .iter()
        .filter_map(|n| n.body.section_children().map(|kids| (&n.id, kids)))
        .collect()
}

/// Sections that can reach themselves through child lists.
fn section_cycles(structure: &Structure) -> Vec<NodeId> {
    let graph = section_graph(structure);
    let mut cyclic = BTreeSet::new();

    for start in graph.keys() {
        let mut stack: Vec<&NodeId> = graph
            .get(start)
            .map(|k| k.iter().collect())
            .unwrap_or_default();
        let mut visited = HashSet::new();
        while let Some(id) = stack.pop() {
            if id == *start {
                cyclic.insert((*start).clone());
                break;
            }
            if !visited.insert(id) {
                continue;
            }
            if let Some(kids) = graph.get(id) {
                stack.extend(kids.iter());
            }
        }
    }

    cyclic.into_iter().collect()
}

/// Check that `new_order` is a permutation of the ids currently in the bag.
pub fn validate_permutation(structure: &Structure, new_order: &[NodeId]) -> StoreResult<()> {
    let node_ids: HashSet<&NodeId> = structure.nodes.iter().map(|n| &n.id).collect();
    let proposed: HashSet<&NodeId> = new_order.iter().collect();

    let duplicates = duplicates(new_order.iter());
    let unknown = sorted(
        proposed
            .iter()
            .filter(|id| !node_ids.contains(*id))
            .map(|id| (*id).clone()),
    );
    let missing = sorted(
        node_ids
            .iter()
            .filter(|id| !proposed.contains(*id))
            .map(|id| (*id).clone()),
    );

    match (duplicates.len(), missing.len(), unknown.len()) {
        (0, 0, 0) => Ok(()),
        (0, 0, _) => Err(StoreError::UnknownReference {
            owner: "order".to_string(),
            missing: unknown,
        }),
        _ => Err(StoreError::InvalidPermutation {
            duplicates,
            missing,
            unknown,
        }),
    }
}

/// Ids in `children` that have no node in the bag, sorted and deduplicated.
pub fn unresolved(structure: &Structure, children: &[NodeId]) -> Vec<NodeId> {
    sorted(
        children
            .iter()
            .filter(|c| !structure.contains(c.as_str()))
            .cloned(),
    )
}

/// Whether `target` is reachable from `from` through section child lists.
pub fn reaches(structure: &Structure, from: &NodeId, target: &NodeId) -> bool {
    let graph = section_graph(structure);
    let mut seen = HashSet::new();
    let mut stack = vec![from];
    while let Some(id) = stack.pop() {
        if id == target {
            return true;
        }
        if !seen.insert(id) {
            continue;
        }
        if let Some(kids) = graph.get(id) {
            stack.extend(kids.iter());
        }
    }
    false
}

/// `root` plus every node reachable from it through section child lists,
/// in discovery order. Cycles and dangling ids are tolerated.
pub fn cascade_targets(structure: &Structure, root: &NodeId) -> Vec<NodeId> {
    let graph = section_graph(structure);
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut stack = vec![root];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) || !structure.contains(id.as_str()) {
            continue;
        }
        out.push(id.clone());
        if let Some(kids) = graph.get(id) {
            stack.extend(kids.iter().rev());
        }
    }

    out
}
