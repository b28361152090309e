//! Node type registry: maps a node's `type` tag to its editor and preview
//! renderers.
//!
//! A node whose tag is not registered renders as nothing. That is the only
//! handling of unknown variants.

use std::collections::HashMap;
use std::fmt;

use palika_sdk::{Node, NodeType};

use crate::content::render::{self, RenderContext, RenderMode};

/// Renders one node to an HTML fragment.
pub type RenderFn = fn(&Node, &mut RenderContext<'_>) -> String;

/// Definition of a single node type.
#[derive(Clone)]
pub struct NodeTypeDefinition {
    /// Wire tag of the node type (e.g. "paragraph", "heading").
    pub type_name: String,
    /// Human-readable label (e.g. "Paragraph", "Heading").
    pub label: String,
    /// Renderer used while editing.
    pub editor: RenderFn,
    /// Renderer used for the reader-facing preview.
    pub preview: RenderFn,
}

impl fmt::Debug for NodeTypeDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeTypeDefinition")
            .field("type_name", &self.type_name)
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Registry of node type definitions, keyed by type tag.
#[derive(Debug, Clone)]
pub struct NodeRegistry {
    types: HashMap<String, NodeTypeDefinition>,
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            types: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with all 13 standard node types.
    pub fn with_standard_types() -> Self {
        let mut registry = Self::new();
        registry.register_standard_types();
        registry
    }

    /// Register a node type, replacing any earlier definition for the tag.
    pub fn register(&mut self, definition: NodeTypeDefinition) {
        self.types.insert(definition.type_name.clone(), definition);
    }

    pub fn get(&self, type_name: &str) -> Option<&NodeTypeDefinition> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// All registered type names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.keys().cloned().collect();
        names.sort();
        names
    }

    /// Render `node` with the renderer for `ctx`'s mode.
    ///
    /// Returns `None` when the node's tag is not registered.
    pub fn render(&self, node: &Node, ctx: &mut RenderContext<'_>) -> Option<String> {
        let definition = self.get(node.type_tag())?;
        let render = match ctx.mode() {
            RenderMode::Editor => definition.editor,
            RenderMode::Preview => definition.preview,
        };
        Some(render(node, ctx))
    }

    /// Register the standard node types: heading, paragraph, list, quote,
    /// image, video, table, chart, section, callout, toc, button, form.
    pub fn register_standard_types(&mut self) {
        for node_type in NodeType::ALL {
            let preview: RenderFn = match node_type {
                NodeType::Heading => render::preview_heading,
                NodeType::Paragraph => render::preview_paragraph,
                NodeType::List => render::preview_list,
                NodeType::Quote => render::preview_quote,
                NodeType::Image => render::preview_image,
                NodeType::Video => render::preview_video,
                NodeType::Table => render::preview_table,
                NodeType::Chart => render::preview_chart,
                NodeType::Section => render::preview_section,
                NodeType::Callout => render::preview_callout,
                NodeType::Toc => render::preview_toc,
                NodeType::Button => render::preview_button,
                NodeType::Form => render::preview_form,
            };
            self.register(NodeTypeDefinition {
                type_name: node_type.as_str().to_string(),
                label: standard_label(node_type).to_string(),
                editor: render::editor_frame,
                preview,
            });
        }
    }
}

fn standard_label(node_type: NodeType) -> &'static str {
    match node_type {
        NodeType::Heading => "Heading",
        NodeType::Paragraph => "Paragraph",
        NodeType::List => "List",
        NodeType::Quote => "Quote",
        NodeType::Image => "Image",
        NodeType::Video => "Video",
        NodeType::Table => "Table",
        NodeType::Chart => "Chart",
        NodeType::Section => "Section",
        NodeType::Callout => "Callout",
        NodeType::Toc => "Table of contents",
        NodeType::Button => "Button",
        NodeType::Form => "Form",
    }
}
