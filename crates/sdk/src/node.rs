//! Content nodes.
//!
//! A node is one block of an article body. Nodes serialize flat: the `type`
//! tag and the variant payload sit next to `id` and the optional common
//! fields (`metadata`, `visibility`, `animation`, `styling`).
//!
//! Unrecognised `type` tags are preserved as [`NodeBody::Unknown`] so a
//! document written by a newer editor survives a round trip. A recognised
//! tag with a malformed payload is a decode error.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::{Error as _, SerializeMap};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::multilingual::MultilingualContent;

/// Opaque node identifier, unique within one article.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh identifier (UUIDv7, time-sortable).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for NodeId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for NodeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The node variants the editor knows how to build and render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeType {
    Heading,
    Paragraph,
    List,
    Quote,
    Image,
    Video,
    Table,
    Chart,
    Section,
    Callout,
    Toc,
    Button,
    Form,
}

impl NodeType {
    /// Every known variant, in palette order.
    pub const ALL: [NodeType; 13] = [
        NodeType::Heading,
        NodeType::Paragraph,
        NodeType::List,
        NodeType::Quote,
        NodeType::Image,
        NodeType::Video,
        NodeType::Table,
        NodeType::Chart,
        NodeType::Section,
        NodeType::Callout,
        NodeType::Toc,
        NodeType::Button,
        NodeType::Form,
    ];

    /// The wire tag for this variant.
    pub fn as_str(self) -> &'static str {
        match self {
            NodeType::Heading => "heading",
            NodeType::Paragraph => "paragraph",
            NodeType::List => "list",
            NodeType::Quote => "quote",
            NodeType::Image => "image",
            NodeType::Video => "video",
            NodeType::Table => "table",
            NodeType::Chart => "chart",
            NodeType::Section => "section",
            NodeType::Callout => "callout",
            NodeType::Toc => "toc",
            NodeType::Button => "button",
            NodeType::Form => "form",
        }
    }

    /// Parse a wire tag. Returns `None` for unknown tags.
    pub fn parse(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Variant payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Heading {
    /// 1..=6; renderers clamp out-of-range values.
    pub level: u8,
    #[serde(default)]
    pub content: MultilingualContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paragraph {
    #[serde(default)]
    pub content: MultilingualContent,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Ordered,
    #[default]
    Unordered,
    Checklist,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    #[serde(default)]
    pub content: MultilingualContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct List {
    #[serde(default)]
    pub style: ListStyle,
    #[serde(default)]
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(default)]
    pub content: MultilingualContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation: Option<MultilingualContent>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub src: String,
    #[serde(default)]
    pub alt: MultilingualContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<MultilingualContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub src: String,
    /// Hosting service, e.g. "youtube". `None` means a direct file URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<MultilingualContent>,
    #[serde(default)]
    pub autoplay: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableColumn {
    pub id: String,
    #[serde(default)]
    pub header: MultilingualContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableRow {
    pub id: String,
    /// Column id to cell text.
    #[serde(default)]
    pub cells: BTreeMap<String, MultilingualContent>,
}

/// Table payload. `rowOrder`/`columnOrder` define display order over the
/// unordered `rows`/`columns` collections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableData {
    #[serde(default)]
    pub columns: Vec<TableColumn>,
    #[serde(default)]
    pub rows: Vec<TableRow>,
    #[serde(default)]
    pub row_order: Vec<String>,
    #[serde(default)]
    pub column_order: Vec<String>,
}

impl TableData {
    pub fn column(&self, id: &str) -> Option<&TableColumn> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn row(&self, id: &str) -> Option<&TableRow> {
        self.rows.iter().find(|r| r.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    #[serde(default)]
    pub data: TableData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<MultilingualContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSeries {
    pub id: String,
    #[serde(default)]
    pub name: MultilingualContent,
    #[serde(default)]
    pub values: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Chart payload. `options` is handed to the charting library untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    /// e.g. "bar", "line", "pie".
    pub chart_type: String,
    #[serde(default)]
    pub categories: Vec<MultilingualContent>,
    #[serde(default)]
    pub series: Vec<ChartSeries>,
    #[serde(default)]
    pub options: Value,
}

impl Default for ChartData {
    fn default() -> Self {
        Self {
            chart_type: "bar".to_string(),
            categories: Vec::new(),
            series: Vec::new(),
            options: Value::Object(Map::new()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chart {
    #[serde(default)]
    pub data: ChartData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MultilingualContent>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectionLayout {
    #[default]
    Stack,
    TwoColumn,
    ThreeColumn,
}

/// A container whose children are ids into the same flat node bag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MultilingualContent>,
    #[serde(default)]
    pub nodes: Vec<NodeId>,
    #[serde(default)]
    pub layout: SectionLayout,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutVariant {
    #[default]
    Info,
    Success,
    Warning,
    Danger,
}

impl CalloutVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            CalloutVariant::Info => "info",
            CalloutVariant::Success => "success",
            CalloutVariant::Warning => "warning",
            CalloutVariant::Danger => "danger",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Callout {
    #[serde(default)]
    pub variant: CalloutVariant,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MultilingualContent>,
    #[serde(default)]
    pub content: MultilingualContent,
}

fn default_toc_depth() -> u8 {
    3
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Toc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MultilingualContent>,
    /// Deepest heading level listed.
    #[serde(default = "default_toc_depth")]
    pub max_depth: u8,
}

impl Default for Toc {
    fn default() -> Self {
        Self {
            title: None,
            max_depth: default_toc_depth(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonVariant {
    #[default]
    Primary,
    Secondary,
    Link,
}

impl ButtonVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "primary",
            ButtonVariant::Secondary => "secondary",
            ButtonVariant::Link => "link",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Button {
    #[serde(default)]
    pub label: MultilingualContent,
    #[serde(default)]
    pub href: String,
    #[serde(default)]
    pub variant: ButtonVariant,
    #[serde(default)]
    pub new_tab: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFieldType {
    #[default]
    Text,
    Email,
    Number,
    Textarea,
    Select,
    Checkbox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormOption {
    pub value: String,
    #[serde(default)]
    pub label: MultilingualContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    #[serde(default)]
    pub label: MultilingualContent,
    #[serde(default)]
    pub field_type: FormFieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FormOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Form {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<MultilingualContent>,
    #[serde(default)]
    pub fields: Vec<FormField>,
    #[serde(default)]
    pub submit_label: MultilingualContent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

/// Payload of a node whose `type` tag is not recognised.
#[derive(Debug, Clone, PartialEq)]
pub struct UnknownNode {
    pub type_tag: String,
    pub fields: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// NodeBody: tagged union over the variants
// ---------------------------------------------------------------------------

/// The `type`-tagged part of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeBody {
    Heading(Heading),
    Paragraph(Paragraph),
    List(List),
    Quote(Quote),
    Image(Image),
    Video(Video),
    Table(Table),
    Chart(Chart),
    Section(Section),
    Callout(Callout),
    Toc(Toc),
    Button(Button),
    Form(Form),
    Unknown(UnknownNode),
}

impl NodeBody {
    /// The wire tag, including unknown tags.
    pub fn type_tag(&self) -> &str {
        match self {
            NodeBody::Unknown(u) => &u.type_tag,
            known => known.node_type().map(NodeType::as_str).unwrap_or_default(),
        }
    }

    /// The known variant, or `None` for [`NodeBody::Unknown`].
    pub fn node_type(&self) -> Option<NodeType> {
        let t = match self {
            NodeBody::Heading(_) => NodeType::Heading,
            NodeBody::Paragraph(_) => NodeType::Paragraph,
            NodeBody::List(_) => NodeType::List,
            NodeBody::Quote(_) => NodeType::Quote,
            NodeBody::Image(_) => NodeType::Image,
            NodeBody::Video(_) => NodeType::Video,
            NodeBody::Table(_) => NodeType::Table,
            NodeBody::Chart(_) => NodeType::Chart,
            NodeBody::Section(_) => NodeType::Section,
            NodeBody::Callout(_) => NodeType::Callout,
            NodeBody::Toc(_) => NodeType::Toc,
            NodeBody::Button(_) => NodeType::Button,
            NodeBody::Form(_) => NodeType::Form,
            NodeBody::Unknown(_) => return None,
        };
        Some(t)
    }

    /// Child ids if this is a section.
    pub fn section_children(&self) -> Option<&[NodeId]> {
        match self {
            NodeBody::Section(s) => Some(&s.nodes),
            _ => None,
        }
    }

    fn payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            NodeBody::Heading(p) => serde_json::to_value(p),
            NodeBody::Paragraph(p) => serde_json::to_value(p),
            NodeBody::List(p) => serde_json::to_value(p),
            NodeBody::Quote(p) => serde_json::to_value(p),
            NodeBody::Image(p) => serde_json::to_value(p),
            NodeBody::Video(p) => serde_json::to_value(p),
            NodeBody::Table(p) => serde_json::to_value(p),
            NodeBody::Chart(p) => serde_json::to_value(p),
            NodeBody::Section(p) => serde_json::to_value(p),
            NodeBody::Callout(p) => serde_json::to_value(p),
            NodeBody::Toc(p) => serde_json::to_value(p),
            NodeBody::Button(p) => serde_json::to_value(p),
            NodeBody::Form(p) => serde_json::to_value(p),
            NodeBody::Unknown(u) => Ok(Value::Object(u.fields.clone())),
        }
    }

    fn from_payload(tag: &str, payload: Map<String, Value>) -> Result<Self, serde_json::Error> {
        let Some(node_type) = NodeType::parse(tag) else {
            return Ok(NodeBody::Unknown(UnknownNode {
                type_tag: tag.to_string(),
                fields: payload,
            }));
        };
        let value = Value::Object(payload);
        let body = match node_type {
            NodeType::Heading => NodeBody::Heading(serde_json::from_value(value)?),
            NodeType::Paragraph => NodeBody::Paragraph(serde_json::from_value(value)?),
            NodeType::List => NodeBody::List(serde_json::from_value(value)?),
            NodeType::Quote => NodeBody::Quote(serde_json::from_value(value)?),
            NodeType::Image => NodeBody::Image(serde_json::from_value(value)?),
            NodeType::Video => NodeBody::Video(serde_json::from_value(value)?),
            NodeType::Table => NodeBody::Table(serde_json::from_value(value)?),
            NodeType::Chart => NodeBody::Chart(serde_json::from_value(value)?),
            NodeType::Section => NodeBody::Section(serde_json::from_value(value)?),
            NodeType::Callout => NodeBody::Callout(serde_json::from_value(value)?),
            NodeType::Toc => NodeBody::Toc(serde_json::from_value(value)?),
            NodeType::Button => NodeBody::Button(serde_json::from_value(value)?),
            NodeType::Form => NodeBody::Form(serde_json::from_value(value)?),
        };
        Ok(body)
    }
}

impl Serialize for NodeBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let payload = self.payload().map_err(S::Error::custom)?;
        let Value::Object(fields) = payload else {
            return Err(S::Error::custom("node payload must serialize to an object"));
        };
        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
        map.serialize_entry("type", self.type_tag())?;
        for (key, value) in fields.iter().filter(|(k, _)| k.as_str() != "type") {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for NodeBody {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let Value::Object(mut fields) = Value::deserialize(deserializer)? else {
            return Err(D::Error::custom("node must be a JSON object"));
        };
        let tag = match fields.remove("type") {
            Some(Value::String(tag)) => tag,
            Some(_) => return Err(D::Error::custom("node `type` must be a string")),
            None => return Err(D::Error::missing_field("type")),
        };
        NodeBody::from_payload(&tag, fields)
            .map_err(|e| D::Error::custom(format!("invalid `{tag}` node: {e}")))
    }
}

macro_rules! impl_from_payload {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for NodeBody {
                fn from(payload: $variant) -> Self {
                    NodeBody::$variant(payload)
                }
            }
        )*
    };
}

impl_from_payload!(
    Heading, Paragraph, List, Quote, Image, Video, Table, Chart, Section, Callout, Toc, Button,
    Form,
);

// ---------------------------------------------------------------------------
// Common fields
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visibility {
    #[serde(default)]
    pub hidden: bool,
    /// Languages this node is shown in. Empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

impl Visibility {
    /// Whether the node shows in `lang` previews.
    pub fn is_visible_in(&self, lang: &str) -> bool {
        !self.hidden && (self.languages.is_empty() || self.languages.iter().any(|l| l == lang))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    /// e.g. "fade-in", "slide-up".
    pub effect: String,
    #[serde(default)]
    pub duration_ms: u32,
    #[serde(default)]
    pub delay_ms: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Styling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub align: Option<Align>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
}

// ---------------------------------------------------------------------------
// Node / NewNode
// ---------------------------------------------------------------------------

/// A node stored in an article's structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,

    #[serde(flatten)]
    pub body: NodeBody,

    /// Free-form editor metadata.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styling: Option<Styling>,
}

impl Node {
    /// Attach an id to a new node.
    pub fn from_new(id: NodeId, node: NewNode) -> Self {
        Self {
            id,
            body: node.body,
            metadata: node.metadata,
            visibility: node.visibility,
            animation: node.animation,
            styling: node.styling,
        }
    }

    pub fn type_tag(&self) -> &str {
        self.body.type_tag()
    }

    pub fn node_type(&self) -> Option<NodeType> {
        self.body.node_type()
    }

    /// Whether the node shows in `lang` previews.
    pub fn is_visible_in(&self, lang: &str) -> bool {
        self.visibility
            .as_ref()
            .is_none_or(|v| v.is_visible_in(lang))
    }
}

/// A node that has not been given an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewNode {
    #[serde(flatten)]
    pub body: NodeBody,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styling: Option<Styling>,
}

impl NewNode {
    pub fn new(body: impl Into<NodeBody>) -> Self {
        Self {
            body: body.into(),
            metadata: None,
            visibility: None,
            animation: None,
            styling: None,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    pub fn with_styling(mut self, styling: Styling) -> Self {
        self.styling = Some(styling);
        self
    }

    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn type_tag(&self) -> &str {
        self.body.type_tag()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn heading_serializes_flat_with_type_tag() {
        let node = Node::from_new(
            NodeId::new("h1"),
            NewNode::new(Heading {
                level: 1,
                content: MultilingualContent::en_ne("Title", ""),
                anchor: None,
            }),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(
            json,
            json!({
                "id": "h1",
                "type": "heading",
                "level": 1,
                "content": { "fallbackContent": "", "content": { "en": "Title", "ne": "" } }
            })
        );
    }

    #[test]
    fn node_decodes_every_known_type() {
        for node_type in NodeType::ALL {
            let mut json = json!({ "id": "n", "type": node_type.as_str() });
            match node_type {
                NodeType::Heading => json["level"] = json!(2),
                NodeType::Image | NodeType::Video => json["src"] = json!("https://example.com/x"),
                _ => {}
            }
            let node: Node = serde_json::from_value(json).unwrap();
            assert_eq!(node.node_type(), Some(node_type));
        }
    }

    #[test]
    fn unknown_type_round_trips() {
        let json = json!({ "id": "x", "type": "carousel", "slides": [1, 2, 3] });
        let node: Node = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(node.type_tag(), "carousel");
        assert_eq!(node.node_type(), None);
        assert_eq!(serde_json::to_value(&node).unwrap(), json);
    }

    #[test]
    fn malformed_known_type_is_an_error() {
        let json = json!({ "id": "x", "type": "heading", "level": "big" });
        let err = serde_json::from_value::<Node>(json).unwrap_err();
        assert!(err.to_string().contains("heading"), "{err}");
    }

    #[test]
    fn missing_type_is_an_error() {
        let err = serde_json::from_value::<Node>(json!({ "id": "x" })).unwrap_err();
        assert!(err.to_string().contains("type"), "{err}");
    }

    #[test]
    fn common_fields_sit_beside_payload() {
        let json = json!({
            "id": "p",
            "type": "paragraph",
            "content": { "fallbackContent": "Hi", "content": {} },
            "visibility": { "hidden": true },
            "styling": { "className": "lead" }
        });
        let node: Node = serde_json::from_value(json).unwrap();
        assert!(!node.is_visible_in("en"));
        assert_eq!(
            node.styling.as_ref().and_then(|s| s.class_name.as_deref()),
            Some("lead")
        );
        assert!(matches!(node.body, NodeBody::Paragraph(_)));
    }

    #[test]
    fn table_uses_camel_case_order_fields() {
        let json = json!({
            "id": "t",
            "type": "table",
            "data": {
                "columns": [{ "id": "c1" }],
                "rows": [{ "id": "r1", "cells": { "c1": { "fallbackContent": "1" } } }],
                "rowOrder": ["r1"],
                "columnOrder": ["c1"]
            }
        });
        let node: Node = serde_json::from_value(json).unwrap();
        let NodeBody::Table(table) = &node.body else {
            panic!("expected table");
        };
        assert_eq!(table.data.row_order, vec!["r1".to_string()]);
        assert!(table.data.column("c1").is_some());
    }

    #[test]
    fn visibility_language_filter() {
        let v = Visibility {
            hidden: false,
            languages: vec!["ne".to_string()],
        };
        assert!(v.is_visible_in("ne"));
        assert!(!v.is_visible_in("en"));
        assert!(Visibility::default().is_visible_in("en"));
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = NodeId::generate();
        let b = NodeId::generate();
        assert_ne!(a, b);
    }
}
