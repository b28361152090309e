//! Partial updates for nodes, article metadata, and article settings.
//!
//! Node patches are JSON objects merged into the node's flat JSON form:
//! top-level keys replace, `data` merges one level deeper, `null` removes a
//! key. The merged object must still decode as a [`Node`].

use palika_sdk::article::{
    ArticleMetadata, ArticleSettings, ArticleStatus, FeatureFlags, SeoMetadata, Theme,
};
use palika_sdk::{MultilingualContent, Node};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// Key whose object value is merged instead of replaced.
const NESTED_MERGE_KEY: &str = "data";

/// A partial node update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodePatch(Map<String, Value>);

impl NodePatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a patch from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> StoreResult<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(StoreError::InvalidUpdate(format!(
                "patch must be a JSON object, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Set a top-level key.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Set a top-level key from any serializable value.
    pub fn set_json<T: Serialize>(self, key: impl Into<String>, value: &T) -> StoreResult<Self> {
        Ok(self.set(key, serde_json::to_value(value)?))
    }

    /// Remove an optional key from the node.
    pub fn unset(self, key: impl Into<String>) -> Self {
        self.set(key, Value::Null)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merge this patch into `node`, returning the updated node.
    ///
    /// `node` itself is never modified, so a failed merge leaves no trace.
    pub fn apply(&self, node: &Node) -> StoreResult<Node> {
        let Value::Object(mut merged) = serde_json::to_value(node)? else {
            return Err(StoreError::InvalidUpdate(
                "node did not serialize to an object".to_string(),
            ));
        };

        for (key, value) in &self.0 {
            if key == "id" {
                if value.as_str() != Some(node.id.as_str()) {
                    return Err(StoreError::ImmutableField("id".to_string()));
                }
                continue;
            }

            if value.is_null() {
                merged.remove(key);
                continue;
            }

            if key == NESTED_MERGE_KEY
                && let (Some(Value::Object(existing)), Value::Object(incoming)) =
                    (merged.get_mut(key), value)
            {
                for (inner_key, inner_value) in incoming {
                    if inner_value.is_null() {
                        existing.remove(inner_key);
                    } else {
                        existing.insert(inner_key.clone(), inner_value.clone());
                    }
                }
                continue;
            }

            merged.insert(key.clone(), value.clone());
        }

        serde_json::from_value(Value::Object(merged))
            .map_err(|e| StoreError::InvalidUpdate(e.to_string()))
    }
}

impl From<Map<String, Value>> for NodePatch {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Shallow update of article metadata. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetadataPatch {
    pub title: Option<MultilingualContent>,
    pub slug: Option<String>,
    pub authors: Option<Vec<String>>,
    pub status: Option<ArticleStatus>,
    pub seo: Option<SeoMetadata>,
    pub tags: Option<Vec<String>>,
}

impl MetadataPatch {
    pub(crate) fn apply_to(self, metadata: &mut ArticleMetadata) {
        if let Some(title) = self.title {
            metadata.title = title;
        }
        if let Some(slug) = self.slug {
            metadata.slug = slug;
        }
        if let Some(authors) = self.authors {
            metadata.authors = authors;
        }
        if let Some(status) = self.status {
            metadata.status = status;
        }
        if let Some(seo) = self.seo {
            metadata.seo = seo;
        }
        if let Some(tags) = self.tags {
            metadata.tags = tags;
        }
    }
}

/// Shallow update of article settings. `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SettingsPatch {
    pub default_language: Option<String>,
    pub theme: Option<Theme>,
    pub features: Option<FeatureFlags>,
}

impl SettingsPatch {
    pub(crate) fn apply_to(self, settings: &mut ArticleSettings) {
        if let Some(lang) = self.default_language {
            settings.default_language = lang;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(features) = self.features {
            settings.features = features;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use palika_sdk::NodeId;
    use palika_sdk::node::{Chart, ChartData, Heading, NewNode, NodeBody};
    use serde_json::json;

    fn heading() -> Node {
        Node::from_new(
            NodeId::new("h1"),
            NewNode::new(Heading {
                level: 1,
                content: MultilingualContent::en_ne("Title", ""),
                anchor: Some("top".to_string()),
            }),
        )
    }

    fn chart() -> Node {
        Node::from_new(
            NodeId::new("c1"),
            NewNode::new(Chart {
                data: ChartData {
                    chart_type: "bar".to_string(),
                    options: json!({ "stacked": true }),
                    ..ChartData::default()
                },
                title: None,
            }),
        )
    }

    #[test]
    fn top_level_key_replaces() {
        let updated = NodePatch::new().set("level", 2).apply(&heading()).unwrap();
        let NodeBody::Heading(h) = &updated.body else {
            panic!("expected heading");
        };
        assert_eq!(h.level, 2);
        assert_eq!(h.content, MultilingualContent::en_ne("Title", ""));
        assert_eq!(h.anchor.as_deref(), Some("top"));
    }

    #[test]
    fn data_merges_one_level_deep() {
        let patch = NodePatch::from_value(json!({ "data": { "chartType": "line" } })).unwrap();
        let updated = patch.apply(&chart()).unwrap();
        let NodeBody::Chart(c) = &updated.body else {
            panic!("expected chart");
        };
        assert_eq!(c.data.chart_type, "line");
        assert_eq!(c.data.options, json!({ "stacked": true }));
    }

    #[test]
    fn nested_content_is_replaced_wholesale() {
        let patch = NodePatch::from_value(json!({
            "content": { "content": { "ne": "शीर्षक" } }
        }))
        .unwrap();
        let updated = patch.apply(&heading()).unwrap();
        let NodeBody::Heading(h) = &updated.body else {
            panic!("expected heading");
        };
        assert_eq!(h.content.get("en"), None);
        assert_eq!(h.content.get("ne"), Some("शीर्षक"));
    }

    #[test]
    fn null_removes_optional_key() {
        let updated = NodePatch::new().unset("anchor").apply(&heading()).unwrap();
        let NodeBody::Heading(h) = &updated.body else {
            panic!("expected heading");
        };
        assert!(h.anchor.is_none());
    }

    #[test]
    fn id_cannot_change() {
        let err = NodePatch::new()
            .set("id", "other")
            .apply(&heading())
            .unwrap_err();
        assert!(matches!(err, StoreError::ImmutableField(ref f) if f == "id"));
        assert!(NodePatch::new().set("id", "h1").apply(&heading()).is_ok());
    }

    #[test]
    fn undecodable_result_is_rejected() {
        let err = NodePatch::new()
            .set("level", "huge")
            .apply(&heading())
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidUpdate(_)));
    }

    #[test]
    fn type_change_allowed_when_payload_fits() {
        let updated = NodePatch::new()
            .set("type", "paragraph")
            .apply(&heading())
            .unwrap();
        assert_eq!(updated.type_tag(), "paragraph");
        assert_eq!(updated.id, "h1");
    }

    #[test]
    fn non_object_patch_rejected() {
        let err = NodePatch::from_value(json!([1, 2])).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn metadata_patch_is_shallow() {
        let mut metadata = ArticleMetadata::new(chrono::Utc::now());
        metadata.tags = vec!["old".to_string()];
        let patch: MetadataPatch =
            serde_json::from_value(json!({ "slug": "ward-5", "status": "review" })).unwrap();
        patch.apply_to(&mut metadata);
        assert_eq!(metadata.slug, "ward-5");
        assert_eq!(metadata.status, ArticleStatus::Review);
        assert_eq!(metadata.tags, vec!["old".to_string()]);
    }

    #[test]
    fn settings_patch_updates_only_given_fields() {
        let mut settings = ArticleSettings::default();
        SettingsPatch {
            theme: Some(Theme::Dark),
            ..SettingsPatch::default()
        }
        .apply_to(&mut settings);
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.default_language, "en");
    }
}
