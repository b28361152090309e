#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common helpers for kernel integration tests.
//!
//! Stores are built with the real kernel code; fixtures come from
//! `palika-test-utils`.

#![allow(dead_code)]

use std::collections::HashSet;

use palika_kernel::content::{ContentStore, StoreOptions};
use palika_sdk::{Article, NodeId, Structure};

/// A store that stores any reorder verbatim.
pub fn permissive_store() -> ContentStore {
    ContentStore::new(StoreOptions::permissive())
}

/// A store that enforces structural references.
pub fn strict_store() -> ContentStore {
    ContentStore::new(StoreOptions::strict())
}

/// Serialized document, for byte-for-byte comparisons.
pub fn snapshot(store: &ContentStore) -> String {
    serde_json::to_string(store.article()).unwrap()
}

/// Whether `order` and `nodes` have equal lengths and the same id set.
pub fn order_matches_nodes(structure: &Structure) -> bool {
    let order: HashSet<&NodeId> = structure.order.iter().collect();
    let nodes: HashSet<&NodeId> = structure.nodes.iter().map(|n| &n.id).collect();
    structure.order.len() == structure.nodes.len() && order == nodes
}

/// Child ids of the section `id`.
pub fn section_children<'a>(article: &'a Article, id: &NodeId) -> &'a [NodeId] {
    article
        .structure
        .node(id.as_str())
        .and_then(|n| n.body.section_children())
        .expect("expected a section")
}
