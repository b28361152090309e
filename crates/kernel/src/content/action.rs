//! Serializable editor actions.
//!
//! The editing UI talks to the store by dispatching actions. Actions are
//! plain data (`{"action": "addNode", "node": {...}}`) so they can come from
//! a script file, a test, or a UI event handler alike.

use palika_sdk::{ArticleId, NewNode, NodeId};
use serde::{Deserialize, Serialize};

use crate::content::patch::{MetadataPatch, NodePatch, SettingsPatch};
use crate::content::store::ContentStore;
use crate::error::{BatchError, StoreResult};

/// One store operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum StoreAction {
    InitializeArticle,
    UpdateMetadata {
        patch: MetadataPatch,
    },
    UpdateSettings {
        patch: SettingsPatch,
    },
    AddNode {
        node: NewNode,
    },
    UpdateNode {
        id: NodeId,
        patch: NodePatch,
    },
    RemoveNode {
        id: NodeId,
        #[serde(default)]
        cascade: bool,
    },
    ReorderNodes {
        order: Vec<NodeId>,
    },
    MoveIntoSection {
        node: NodeId,
        section: NodeId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<usize>,
    },
    TogglePreviewMode,
    SetActiveNode {
        #[serde(default)]
        id: Option<NodeId>,
    },
}

impl StoreAction {
    /// The wire name of this action.
    pub fn name(&self) -> &'static str {
        match self {
            StoreAction::InitializeArticle => "initializeArticle",
            StoreAction::UpdateMetadata { .. } => "updateMetadata",
            StoreAction::UpdateSettings { .. } => "updateSettings",
            StoreAction::AddNode { .. } => "addNode",
            StoreAction::UpdateNode { .. } => "updateNode",
            StoreAction::RemoveNode { .. } => "removeNode",
            StoreAction::ReorderNodes { .. } => "reorderNodes",
            StoreAction::MoveIntoSection { .. } => "moveIntoSection",
            StoreAction::TogglePreviewMode => "togglePreviewMode",
            StoreAction::SetActiveNode { .. } => "setActiveNode",
        }
    }
}

/// What a successful action did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum ActionOutcome {
    #[serde(rename_all = "camelCase")]
    Initialized {
        article_id: ArticleId,
    },
    NodeAdded {
        id: NodeId,
    },
    NodesRemoved {
        ids: Vec<NodeId>,
    },
    PreviewMode {
        enabled: bool,
    },
    Applied,
}

impl ContentStore {
    /// Apply a single action.
    pub fn dispatch(&mut self, action: StoreAction) -> StoreResult<ActionOutcome> {
        let outcome = match action {
            StoreAction::InitializeArticle => ActionOutcome::Initialized {
                article_id: self.initialize_article().id.clone(),
            },
            StoreAction::UpdateMetadata { patch } => {
                self.update_metadata(patch);
                ActionOutcome::Applied
            }
            StoreAction::UpdateSettings { patch } => {
                self.update_settings(patch)?;
                ActionOutcome::Applied
            }
            StoreAction::AddNode { node } => ActionOutcome::NodeAdded {
                id: self.add_node(node)?,
            },
            StoreAction::UpdateNode { id, patch } => {
                self.update_node(id.as_str(), patch)?;
                ActionOutcome::Applied
            }
            StoreAction::RemoveNode { id, cascade: false } => ActionOutcome::NodesRemoved {
                ids: vec![self.remove_node(id.as_str())?.id],
            },
            StoreAction::RemoveNode { id, cascade: true } => ActionOutcome::NodesRemoved {
                ids: self
                    .remove_node_cascade(id.as_str())?
                    .into_iter()
                    .map(|n| n.id)
                    .collect(),
            },
            StoreAction::ReorderNodes { order } => {
                self.reorder_nodes(order)?;
                ActionOutcome::Applied
            }
            StoreAction::MoveIntoSection {
                node,
                section,
                index,
            } => {
                self.move_into_section(node.as_str(), section.as_str(), index)?;
                ActionOutcome::Applied
            }
            StoreAction::TogglePreviewMode => ActionOutcome::PreviewMode {
                enabled: self.toggle_preview_mode(),
            },
            StoreAction::SetActiveNode { id } => {
                self.set_active_node(id);
                ActionOutcome::Applied
            }
        };
        Ok(outcome)
    }

    /// Apply actions in order, all or nothing.
    ///
    /// On the first failure the store is restored to its state before the
    /// batch and the failing index is reported.
    pub fn apply_batch(
        &mut self,
        actions: impl IntoIterator<Item = StoreAction>,
    ) -> Result<Vec<ActionOutcome>, BatchError> {
        let checkpoint = self.checkpoint();
        let mut outcomes = Vec::new();

        for (index, action) in actions.into_iter().enumerate() {
            let name = action.name();
            match self.dispatch(action) {
                Ok(outcome) => outcomes.push(outcome),
                Err(source) => {
                    tracing::warn!(index, action = name, error = %source, "batch rolled back");
                    self.restore(checkpoint);
                    return Err(BatchError { index, source });
                }
            }
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::content::store::StoreOptions;
    use crate::error::StoreError;
    use serde_json::json;

    fn actions(value: serde_json::Value) -> Vec<StoreAction> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn actions_decode_from_camel_case_json() {
        let decoded = actions(json!([
            { "action": "initializeArticle" },
            { "action": "addNode", "node": { "type": "paragraph" } },
            { "action": "removeNode", "id": "x", "cascade": true },
            { "action": "moveIntoSection", "node": "a", "section": "s", "index": 0 },
            { "action": "setActiveNode" },
            { "action": "updateMetadata", "patch": { "slug": "ward-notice" } }
        ]));
        assert_eq!(decoded.len(), 6);
        assert_eq!(decoded[1].name(), "addNode");
        assert!(matches!(decoded[2], StoreAction::RemoveNode { cascade: true, .. }));
        assert!(matches!(decoded[4], StoreAction::SetActiveNode { id: None }));
    }

    #[test]
    fn dispatch_add_returns_generated_id() {
        let mut store = ContentStore::default();
        let outcome = store
            .dispatch(StoreAction::AddNode {
                node: serde_json::from_value(json!({ "type": "toc" })).unwrap(),
            })
            .unwrap();
        let ActionOutcome::NodeAdded { id } = outcome else {
            panic!("expected NodeAdded");
        };
        assert_eq!(store.article().structure.order, vec![id]);
    }

    #[test]
    fn batch_commits_all_actions() {
        let mut store = ContentStore::default();
        let outcomes = store
            .apply_batch(actions(json!([
                { "action": "addNode", "node": { "type": "paragraph" } },
                { "action": "togglePreviewMode" }
            ])))
            .unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[1], ActionOutcome::PreviewMode { enabled: true });
        assert_eq!(store.article().structure.len(), 1);
    }

    #[test]
    fn batch_rolls_back_on_failure() {
        let mut store = ContentStore::new(StoreOptions::strict());
        store
            .add_node(serde_json::from_value(json!({ "type": "paragraph" })).unwrap())
            .unwrap();
        let before = store.article().clone();
        let revision = store.revision();

        let err = store
            .apply_batch(actions(json!([
                { "action": "addNode", "node": { "type": "quote" } },
                { "action": "togglePreviewMode" },
                { "action": "removeNode", "id": "does-not-exist" }
            ])))
            .unwrap_err();

        assert_eq!(err.index, 2);
        assert!(matches!(err.source, StoreError::NotFound(_)));
        assert_eq!(store.article(), &before);
        assert_eq!(store.revision(), revision);
        assert!(!store.is_preview_mode());
    }

    #[test]
    fn outcome_serializes_with_tag() {
        let json = serde_json::to_value(ActionOutcome::PreviewMode { enabled: false }).unwrap();
        assert_eq!(json, json!({ "outcome": "previewMode", "enabled": false }));
    }
}
