//! In-memory content store for one article.
//!
//! The store owns a single [`Article`] plus the editor's UI flags (preview
//! mode, active node). Every operation is synchronous and replaces the
//! affected part of the document; a failed operation changes nothing.
//! There is no global instance: construct one per editing session and pass
//! it to whoever needs it.

use chrono::Utc;
use palika_sdk::{Article, ArticleSettings, NewNode, Node, NodeBody, NodeId};
use tracing::{debug, info, warn};

use crate::content::integrity::{self, IntegrityPolicy, IntegrityReport};
use crate::content::patch::{MetadataPatch, NodePatch, SettingsPatch};
use crate::error::{StoreError, StoreResult};

/// Construction options for a [`ContentStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub policy: IntegrityPolicy,
    /// Settings given to every freshly initialised article.
    pub default_settings: ArticleSettings,
    /// Languages the editor offers. The first entry is the primary language.
    pub languages: Vec<String>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            policy: IntegrityPolicy::default(),
            default_settings: ArticleSettings::default(),
            languages: vec![
                palika_sdk::ENGLISH.to_string(),
                palika_sdk::NEPALI.to_string(),
            ],
        }
    }
}

impl StoreOptions {
    pub fn permissive() -> Self {
        Self {
            policy: IntegrityPolicy::Permissive,
            ..Self::default()
        }
    }

    pub fn strict() -> Self {
        Self {
            policy: IntegrityPolicy::Strict,
            ..Self::default()
        }
    }
}

/// Editing state for one article.
#[derive(Debug, Clone)]
pub struct ContentStore {
    article: Article,
    options: StoreOptions,
    preview_mode: bool,
    active_node: Option<NodeId>,
    revision: u64,
}

impl ContentStore {
    /// Create a store holding a freshly initialised article.
    pub fn new(options: StoreOptions) -> Self {
        let article = Article::new(options.default_settings.clone());
        Self {
            article,
            options,
            preview_mode: false,
            active_node: None,
            revision: 0,
        }
    }

    /// Wrap an existing article, e.g. one loaded from disk.
    pub fn from_article(article: Article, options: StoreOptions) -> Self {
        Self {
            article,
            options,
            preview_mode: false,
            active_node: None,
            revision: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn article(&self) -> &Article {
        &self.article
    }

    /// Consume the store and return the document.
    pub fn into_article(self) -> Article {
        self.article
    }

    pub fn policy(&self) -> IntegrityPolicy {
        self.options.policy
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.article.structure.node(id)
    }

    /// Nodes in render order, skipping ids that do not resolve.
    pub fn ordered_nodes(&self) -> impl Iterator<Item = &Node> {
        self.article.structure.ordered_nodes()
    }

    pub fn is_preview_mode(&self) -> bool {
        self.preview_mode
    }

    pub fn active_node(&self) -> Option<&NodeId> {
        self.active_node.as_ref()
    }

    /// Increases by one on every successful mutation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn check_integrity(&self) -> IntegrityReport {
        integrity::check_integrity(&self.article.structure)
    }

    // -----------------------------------------------------------------------
    // Document operations
    // -----------------------------------------------------------------------

    /// Replace the document with a fresh default article. Unsaved edits are
    /// discarded.
    pub fn initialize_article(&mut self) -> &Article {
        self.article = Article::new(self.options.default_settings.clone());
        self.preview_mode = false;
        self.active_node = None;
        self.bump();
        info!(article_id = %self.article.id, "article initialized");
        &self.article
    }

    /// Shallow-merge metadata fields and stamp `metadata.updated`.
    pub fn update_metadata(&mut self, patch: MetadataPatch) {
        patch.apply_to(&mut self.article.metadata);
        self.article.metadata.updated = Utc::now();
        self.bump();
        debug!(article_id = %self.article.id, "metadata updated");
    }

    /// Shallow-merge settings fields.
    ///
    /// A default language the editor does not offer is rejected.
    pub fn update_settings(&mut self, patch: SettingsPatch) -> StoreResult<()> {
        let offered = &self.options.languages;
        if let Some(lang) = &patch.default_language
            && !offered.is_empty()
            && !offered.contains(lang)
        {
            warn!(language = %lang, "rejected unsupported default language");
            return Err(StoreError::InvalidUpdate(format!(
                "default language {lang} is not one of {}",
                offered.join(", ")
            )));
        }

        patch.apply_to(&mut self.article.settings);
        self.bump();
        debug!(article_id = %self.article.id, "settings updated");
        Ok(())
    }

    /// Append a node and return its generated id.
    ///
    /// Unknown node types are stored as-is. Under the strict policy a
    /// section whose children do not resolve is rejected.
    pub fn add_node(&mut self, node: NewNode) -> StoreResult<NodeId> {
        if self.is_strict()
            && let Some(children) = node.body.section_children()
        {
            let missing = integrity::unresolved(&self.article.structure, children);
            if !missing.is_empty() {
                warn!(missing = ?missing, "rejected section with unknown children");
                return Err(StoreError::UnknownReference {
                    owner: "new section".to_string(),
                    missing,
                });
            }
        }

        let id = self.fresh_id();
        let node = Node::from_new(id.clone(), node);
        debug!(node_id = %id, node_type = node.type_tag(), "node added");

        let structure = &mut self.article.structure;
        structure.order.push(id.clone());
        structure.nodes.push(node);
        self.bump();
        Ok(id)
    }

    /// Merge `patch` into the node with `id`.
    ///
    /// Top-level keys replace; `data` merges one level deeper. A missing id
    /// is [`StoreError::NotFound`] and leaves the document untouched.
    pub fn update_node(&mut self, id: &str, patch: NodePatch) -> StoreResult<()> {
        let Some(position) = self.article.structure.position(id) else {
            return Err(StoreError::NotFound(NodeId::new(id)));
        };

        let current = &self.article.structure.nodes[position];
        let updated = patch.apply(current)?;

        // Only children the patch introduces are checked; a dangling child
        // left behind by `remove_node` must not lock the section.
        if self.is_strict()
            && let Some(children) = updated.body.section_children()
        {
            let held = current.body.section_children().unwrap_or_default();
            let added: Vec<NodeId> = children
                .iter()
                .filter(|c| !held.contains(c))
                .cloned()
                .collect();
            self.check_section_children(&updated.id, &added)?;
        }

        debug!(node_id = %id, node_type = updated.type_tag(), "node updated");
        self.article.structure.nodes[position] = updated;
        self.bump();
        Ok(())
    }

    /// Remove a node from both `order` and `nodes`.
    ///
    /// Does not cascade: sections that listed the node keep the now dangling
    /// id. Use [`remove_node_cascade`](Self::remove_node_cascade) to clean up.
    pub fn remove_node(&mut self, id: &str) -> StoreResult<Node> {
        let Some(position) = self.article.structure.position(id) else {
            return Err(StoreError::NotFound(NodeId::new(id)));
        };

        let structure = &mut self.article.structure;
        let removed = structure.nodes.remove(position);
        structure.order.retain(|o| o != id);
        if self.active_node.as_ref().is_some_and(|a| a == id) {
            self.active_node = None;
        }
        self.bump();
        debug!(node_id = %id, node_type = removed.type_tag(), "node removed");
        Ok(removed)
    }

    /// Remove a node, every node nested under it through section child
    /// lists, and every reference to any of them from remaining sections.
    ///
    /// Returns the removed nodes, root first.
    pub fn remove_node_cascade(&mut self, id: &str) -> StoreResult<Vec<Node>> {
        let root = NodeId::new(id);
        if !self.article.structure.contains(id) {
            return Err(StoreError::NotFound(root));
        }

        let targets = integrity::cascade_targets(&self.article.structure, &root);
        let structure = &mut self.article.structure;

        let mut removed = Vec::with_capacity(targets.len());
        for target in &targets {
            if let Some(position) = structure.position(target.as_str()) {
                removed.push(structure.nodes.remove(position));
            }
        }
        structure.order.retain(|o| !targets.contains(o));
        for node in &mut structure.nodes {
            if let NodeBody::Section(section) = &mut node.body {
                section.nodes.retain(|child| !targets.contains(child));
            }
        }
        if let Some(active) = &self.active_node
            && targets.contains(active)
        {
            self.active_node = None;
        }

        self.bump();
        debug!(node_id = %id, removed = removed.len(), "node removed with descendants");
        Ok(removed)
    }

    /// Replace the render order.
    ///
    /// Permissive: `new_order` is stored verbatim, even with duplicates,
    /// drops, or unknown ids. Strict: it must be a permutation of the
    /// current node ids.
    pub fn reorder_nodes(&mut self, new_order: Vec<NodeId>) -> StoreResult<()> {
        if self.is_strict()
            && let Err(e) = integrity::validate_permutation(&self.article.structure, &new_order)
        {
            warn!(error = %e, "rejected reorder");
            return Err(e);
        }

        self.article.structure.order = new_order;
        self.bump();
        debug!(len = self.article.structure.order.len(), "nodes reordered");
        Ok(())
    }

    /// Move `child` into the section `target` at `index` (appended when
    /// `None` or past the end), detaching it from any section that held it.
    ///
    /// Both steps are applied together or not at all.
    pub fn move_into_section(
        &mut self,
        child: &str,
        target: &str,
        index: Option<usize>,
    ) -> StoreResult<()> {
        let structure = &self.article.structure;
        if !structure.contains(child) {
            return Err(StoreError::NotFound(NodeId::new(child)));
        }
        let Some(target_node) = structure.node(target) else {
            return Err(StoreError::NotFound(NodeId::new(target)));
        };
        if !matches!(target_node.body, NodeBody::Section(_)) {
            return Err(StoreError::NotASection(NodeId::new(target)));
        }

        let child_id = NodeId::new(child);
        let target_id = NodeId::new(target);
        if child_id == target_id || integrity::reaches(structure, &child_id, &target_id) {
            return Err(StoreError::InvalidUpdate(format!(
                "moving {child} into {target} would create a section cycle"
            )));
        }

        let mut next = structure.clone();
        for node in &mut next.nodes {
            if let NodeBody::Section(section) = &mut node.body {
                section.nodes.retain(|c| *c != child_id);
            }
        }
        let Some(NodeBody::Section(section)) = next.node_mut(target).map(|n| &mut n.body) else {
            return Err(StoreError::NotASection(target_id));
        };
        let len = section.nodes.len();
        let at = index.unwrap_or(len).min(len);
        section.nodes.insert(at, child_id);

        self.article.structure = next;
        self.bump();
        debug!(node_id = %child, section_id = %target, index = at, "node moved into section");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // UI flags
    // -----------------------------------------------------------------------

    /// Flip preview mode and return the new value.
    pub fn toggle_preview_mode(&mut self) -> bool {
        self.preview_mode = !self.preview_mode;
        self.bump();
        self.preview_mode
    }

    /// Set (or clear) the node the editor is focused on. Not validated.
    pub fn set_active_node(&mut self, id: Option<NodeId>) {
        self.active_node = id;
        self.bump();
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn is_strict(&self) -> bool {
        self.options.policy == IntegrityPolicy::Strict
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// A generated id not already present in the bag or the order.
    fn fresh_id(&self) -> NodeId {
        loop {
            let id = NodeId::generate();
            let structure = &self.article.structure;
            if !structure.contains(id.as_str()) && !structure.order.contains(&id) {
                return id;
            }
        }
    }

    fn check_section_children(&self, section: &NodeId, children: &[NodeId]) -> StoreResult<()> {
        let structure = &self.article.structure;
        let missing = integrity::unresolved(structure, children);
        if !missing.is_empty() {
            warn!(section_id = %section, missing = ?missing, "rejected unknown section children");
            return Err(StoreError::UnknownReference {
                owner: format!("section {section}"),
                missing,
            });
        }
        if children
            .iter()
            .any(|c| c == section || integrity::reaches(structure, c, section))
        {
            warn!(section_id = %section, "rejected section cycle");
            return Err(StoreError::InvalidUpdate(format!(
                "section {section} would contain itself"
            )));
        }
        Ok(())
    }

    /// Snapshot of everything a batch may change, for rollback.
    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            article: self.article.clone(),
            preview_mode: self.preview_mode,
            active_node: self.active_node.clone(),
            revision: self.revision,
        }
    }

    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.article = checkpoint.article;
        self.preview_mode = checkpoint.preview_mode;
        self.active_node = checkpoint.active_node;
        self.revision = checkpoint.revision;
    }
}

impl Default for ContentStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

pub(crate) struct Checkpoint {
    article: Article,
    preview_mode: bool,
    active_node: Option<NodeId>,
    revision: u64,
}
