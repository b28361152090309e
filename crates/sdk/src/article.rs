//! Article aggregate: metadata, settings, and the node structure.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::multilingual::{ENGLISH, MultilingualContent};
use crate::node::{Node, NodeId};

/// Document format version written into new articles.
pub const ARTICLE_FORMAT_VERSION: &str = "1.0.0";

/// Opaque article identifier. New articles get a UUIDv7, but any string
/// loaded from disk is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArticleId(String);

impl ArticleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Root aggregate for one authored article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub version: String,
    pub metadata: ArticleMetadata,
    pub settings: ArticleSettings,
    #[serde(default)]
    pub structure: Structure,
}

impl Article {
    /// A fresh, empty article with a new id.
    pub fn new(settings: ArticleSettings) -> Self {
        Self {
            id: ArticleId::generate(),
            version: ARTICLE_FORMAT_VERSION.to_string(),
            metadata: ArticleMetadata::new(Utc::now()),
            settings,
            structure: Structure::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Review,
    Published,
    Archived,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MultilingualContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<MultilingualContent>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Authorship, workflow status, SEO, and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleMetadata {
    #[serde(default)]
    pub title: MultilingualContent,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub status: ArticleStatus,
    #[serde(default)]
    pub seo: SeoMetadata,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl ArticleMetadata {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            title: MultilingualContent::default(),
            slug: String::new(),
            authors: Vec::new(),
            status: ArticleStatus::Draft,
            seo: SeoMetadata::default(),
            tags: Vec::new(),
            created: now,
            updated: now,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

/// Per-article feature switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureFlags {
    #[serde(default = "enabled")]
    pub table_of_contents: bool,
    #[serde(default)]
    pub comments: bool,
    #[serde(default = "enabled")]
    pub sharing: bool,
    #[serde(default)]
    pub printable: bool,
}

fn enabled() -> bool {
    true
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            table_of_contents: true,
            comments: false,
            sharing: true,
            printable: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSettings {
    pub default_language: String,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub features: FeatureFlags,
}

impl Default for ArticleSettings {
    fn default() -> Self {
        Self {
            default_language: ENGLISH.to_string(),
            theme: Theme::default(),
            features: FeatureFlags::default(),
        }
    }
}

/// The article body: render order plus an unordered bag of nodes.
///
/// Every id in `order` is expected to match exactly one node in `nodes` and
/// the reverse. Section children reference ids in the same bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Structure {
    #[serde(default)]
    pub order: Vec<NodeId>,
    #[serde(default)]
    pub nodes: Vec<Node>,
}

impl Structure {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Index of a node in the bag.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == *id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == *id)
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == *id)
    }

    /// Nodes in render order. Ids with no matching node are skipped.
    pub fn ordered_nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|id| self.node(id.as_str()))
    }

    /// Every id held in some section's child list.
    pub fn referenced_children(&self) -> HashSet<&NodeId> {
        self.nodes
            .iter()
            .filter_map(|n| n.body.section_children())
            .flatten()
            .collect()
    }

    /// The first section whose child list contains `child`.
    pub fn owner_of(&self, child: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| {
            n.body
                .section_children()
                .is_some_and(|kids| kids.iter().any(|k| k == child))
        })
    }

    /// Node count per type tag.
    pub fn type_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for node in &self.nodes {
            *counts.entry(node.type_tag()).or_insert(0) += 1;
        }
        counts
    }
}
