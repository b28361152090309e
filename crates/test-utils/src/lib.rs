//! Palika test utilities.
//!
//! Fixture builders for nodes and articles, plus assertion helpers for
//! rendered HTML and JSON.

use palika_sdk::node::{
    Callout, CalloutVariant, Chart, ChartData, ChartSeries, Heading, List, ListItem, ListStyle,
    Paragraph, Section, Table, TableColumn, TableData, TableRow, Toc, Visibility,
};
use palika_sdk::{Article, ArticleSettings, MultilingualContent, NewNode, Node, NodeId};

/// English-only text.
pub fn text(en: &str) -> MultilingualContent {
    MultilingualContent::new().with(palika_sdk::ENGLISH, en)
}

/// Create a heading node.
pub fn heading(level: u8, en: &str) -> NewNode {
    NewNode::new(Heading {
        level,
        content: text(en),
        anchor: None,
    })
}

/// Create a paragraph node.
pub fn paragraph(en: &str) -> NewNode {
    NewNode::new(Paragraph { content: text(en) })
}

/// Create a paragraph with English and Nepali variants.
pub fn bilingual_paragraph(en: &str, ne: &str) -> NewNode {
    NewNode::new(Paragraph {
        content: MultilingualContent::en_ne(en, ne),
    })
}

/// Create an unordered list node.
pub fn list(items: &[&str]) -> NewNode {
    NewNode::new(List {
        style: ListStyle::Unordered,
        items: items
            .iter()
            .enumerate()
            .map(|(i, item)| ListItem {
                id: format!("item-{i}"),
                content: text(item),
                checked: None,
            })
            .collect(),
    })
}

/// Create a section node holding `children`.
pub fn section(children: &[&NodeId]) -> NewNode {
    NewNode::new(Section {
        title: None,
        nodes: children.iter().map(|id| (*id).clone()).collect(),
        layout: Default::default(),
    })
}

/// Create a table node. Column ids are `c0..`, row ids `r0..`, both in
/// natural display order.
pub fn table(headers: &[&str], rows: &[&[&str]]) -> NewNode {
    let columns: Vec<TableColumn> = headers
        .iter()
        .enumerate()
        .map(|(i, header)| TableColumn {
            id: format!("c{i}"),
            header: text(header),
            align: None,
        })
        .collect();
    let rows: Vec<TableRow> = rows
        .iter()
        .enumerate()
        .map(|(r, cells)| TableRow {
            id: format!("r{r}"),
            cells: cells
                .iter()
                .enumerate()
                .map(|(c, cell)| (format!("c{c}"), text(cell)))
                .collect(),
        })
        .collect();
    NewNode::new(Table {
        data: TableData {
            column_order: columns.iter().map(|c| c.id.clone()).collect(),
            row_order: rows.iter().map(|r| r.id.clone()).collect(),
            columns,
            rows,
        },
        caption: None,
    })
}

/// Create a bar chart with one series.
pub fn bar_chart(series_name: &str, values: &[f64]) -> NewNode {
    NewNode::new(Chart {
        data: ChartData {
            series: vec![ChartSeries {
                id: "s0".to_string(),
                name: text(series_name),
                values: values.to_vec(),
                color: None,
            }],
            ..ChartData::default()
        },
        title: None,
    })
}

/// Create an info callout.
pub fn callout(en: &str) -> NewNode {
    NewNode::new(Callout {
        variant: CalloutVariant::Info,
        title: None,
        content: text(en),
    })
}

/// Create a table-of-contents node.
pub fn toc() -> NewNode {
    NewNode::new(Toc::default())
}

/// Mark a node hidden.
pub fn hidden(node: NewNode) -> NewNode {
    node.with_visibility(Visibility {
        hidden: true,
        languages: Vec::new(),
    })
}

/// Start building a test article.
pub fn test_article() -> TestArticle {
    TestArticle {
        article: Article::new(ArticleSettings::default()),
    }
}

/// An article builder with caller-chosen node ids.
#[derive(Debug, Clone)]
pub struct TestArticle {
    article: Article,
}

impl TestArticle {
    /// Set the English title.
    pub fn titled(mut self, en: &str) -> Self {
        self.article.metadata.title = text(en);
        self
    }

    /// Append a node with a fixed id to both `order` and `nodes`.
    pub fn with_node(mut self, id: &str, node: NewNode) -> Self {
        let id = NodeId::new(id);
        self.article.structure.order.push(id.clone());
        self.article.structure.nodes.push(Node::from_new(id, node));
        self
    }

    /// Add a node to the bag only, e.g. a child held by a section.
    pub fn with_unordered_node(mut self, id: &str, node: NewNode) -> Self {
        self.article
            .structure
            .nodes
            .push(Node::from_new(NodeId::new(id), node));
        self
    }

    /// Append an id to `order` without a node.
    pub fn with_order_entry(mut self, id: &str) -> Self {
        self.article.structure.order.push(NodeId::new(id));
        self
    }

    pub fn build(self) -> Article {
        self.article
    }
}

/// The article's `order` as plain strings.
pub fn order_of(article: &Article) -> Vec<&str> {
    article
        .structure
        .order
        .iter()
        .map(NodeId::as_str)
        .collect()
}

/// Assertion helpers for rendered output.
pub mod assert {
    use serde_json::Value;

    /// Assert that a JSON value has a specific key.
    pub fn has_key(value: &Value, key: &str) {
        assert!(
            value.get(key).is_some(),
            "Expected JSON to have key '{key}', got: {value}"
        );
    }

    /// Assert that a string contains a substring.
    pub fn contains(haystack: &str, needle: &str) {
        assert!(
            haystack.contains(needle),
            "Expected string to contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that a string does not contain a substring.
    pub fn not_contains(haystack: &str, needle: &str) {
        assert!(
            !haystack.contains(needle),
            "Expected string to NOT contain '{needle}'\nActual: {haystack}"
        );
    }

    /// Assert that `first` occurs before `second`.
    pub fn appears_before(haystack: &str, first: &str, second: &str) {
        let a = haystack.find(first);
        let b = haystack.find(second);
        assert!(
            matches!((a, b), (Some(a), Some(b)) if a < b),
            "Expected '{first}' before '{second}'\nActual: {haystack}"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palika_sdk::NodeBody;

    #[test]
    fn article_builder_keeps_order() {
        let article = test_article()
            .titled("Ward notice")
            .with_node("a", heading(1, "Notice"))
            .with_node("b", paragraph("Body"))
            .build();

        assert_eq!(order_of(&article), vec!["a", "b"]);
        assert_eq!(article.metadata.title.resolve("en"), "Ward notice");
        assert_eq!(article.structure.nodes.len(), 2);
    }

    #[test]
    fn unordered_nodes_stay_out_of_order() {
        let child = NodeId::new("p");
        let article = test_article()
            .with_node("s", section(&[&child]))
            .with_unordered_node("p", paragraph("inside"))
            .build();
        assert_eq!(order_of(&article), vec!["s"]);
        assert!(article.structure.node("p").is_some());
    }

    #[test]
    fn table_fixture_orders_rows_and_columns() {
        let node = table(&["Ward", "Budget"], &[&["1", "10"], &["2", "20"]]);
        let NodeBody::Table(table) = node.body else {
            panic!("expected table");
        };
        assert_eq!(table.data.column_order, vec!["c0", "c1"]);
        assert_eq!(table.data.row_order, vec!["r0", "r1"]);
        assert_eq!(
            table.data.row("r1").and_then(|r| r.cells.get("c1")),
            Some(&text("20"))
        );
    }

    #[test]
    fn assertions() {
        let json = serde_json::json!({"name": "test"});
        assert::has_key(&json, "name");
        assert::contains("hello world", "world");
        assert::not_contains("hello world", "foo");
        assert::appears_before("<h1></h1><p></p>", "<h1>", "<p>");
    }
}
