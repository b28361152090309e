#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Whole-article rendering through the node registry.

mod common;

use common::permissive_store;
use palika_kernel::content::{
    NodeRegistry, NodeTypeDefinition, RenderContext, RenderMode, RenderOptions, render_article,
};
use palika_sdk::{Node, NodeId};
use palika_test_utils::{
    assert, bilingual_paragraph, heading, hidden, paragraph, section, table, test_article,
};
use serde_json::json;

fn preview(article: &palika_sdk::Article, lang: &str) -> String {
    render_article(
        article,
        &NodeRegistry::with_standard_types(),
        RenderOptions::preview(lang),
    )
}

#[test]
fn article_renders_nodes_in_order_with_title() {
    let article = test_article()
        .titled("Ward 5 budget")
        .with_node("intro", heading(2, "Overview"))
        .with_node("body", paragraph("Allocations for the year."))
        .build();

    let html = preview(&article, "en");
    assert::contains(&html, "<header><h1>Ward 5 budget</h1></header>");
    assert::appears_before(&html, "<h2 id=\"intro\">Overview</h2>", "<p>Allocations");
    assert!(html.starts_with("<article class=\"palika-article theme-light\""));
    assert!(html.ends_with("</article>"));
}

#[test]
fn language_selection_and_fallback() {
    let article = test_article()
        .with_node("p", bilingual_paragraph("Hello", "नमस्ते"))
        .with_node("q", paragraph("English only"))
        .build();

    let ne = preview(&article, "ne");
    assert::contains(&ne, "<p>नमस्ते</p>");
    assert::contains(&ne, "<p>English only</p>");
    assert::contains(&ne, "lang=\"ne\"");
}

#[test]
fn section_children_render_once_inside_their_section() {
    let child = NodeId::new("p");
    let article = test_article()
        .with_node("s", section(&[&child]))
        .with_node("p", paragraph("nested"))
        .build();

    let html = preview(&article, "en");
    assert_eq!(html.matches("<p>nested</p>").count(), 1);
    assert::contains(
        &html,
        "<section class=\"palika-section layout-stack\"><p>nested</p></section>",
    );
}

#[test]
fn dangling_children_and_unresolved_order_render_nothing() {
    let ghost = NodeId::new("ghost");
    let article = test_article()
        .with_node("s", section(&[&ghost]))
        .with_order_entry("missing")
        .build();

    let html = preview(&article, "en");
    assert::contains(
        &html,
        "<section class=\"palika-section layout-stack\"></section>",
    );
    assert::not_contains(&html, "ghost");
    assert::not_contains(&html, "missing");
}

#[test]
fn unknown_types_render_nothing_in_both_modes() {
    let mut store = permissive_store();
    let node = serde_json::from_value(json!({ "type": "gisLayer", "layer": "wards" })).unwrap();
    store.add_node(node).unwrap();
    store.add_node(paragraph("after")).unwrap();

    let registry = NodeRegistry::with_standard_types();
    for mode in [RenderMode::Preview, RenderMode::Editor] {
        let options = RenderOptions {
            mode,
            lang: "en",
            active: None,
        };
        let html = render_article(store.article(), &registry, options);
        assert::not_contains(&html, "gisLayer");
        assert::contains(&html, "<p>after</p>");
    }
}

#[test]
fn editor_mode_frames_every_node_and_shows_hidden_ones() {
    let article = test_article()
        .with_node("a", paragraph("visible"))
        .with_node("b", hidden(paragraph("draft note")))
        .build();
    let registry = NodeRegistry::with_standard_types();
    let active = NodeId::new("a");

    let editor = render_article(
        &article,
        &registry,
        RenderOptions::editor("en").with_active(Some(&active)),
    );
    assert::contains(
        &editor,
        "<div class=\"palika-node is-active\" data-node-id=\"a\" data-node-type=\"paragraph\">",
    );
    assert::contains(
        &editor,
        "<div class=\"palika-node is-hidden\" data-node-id=\"b\" data-node-type=\"paragraph\">",
    );

    let reader = preview(&article, "en");
    assert::not_contains(&reader, "draft note");
    assert::not_contains(&reader, "palika-node");
}

#[test]
fn table_renders_in_display_order() {
    let rows: &[&[&str]] = &[&["1", "10"], &["2", "20"]];
    let article = test_article()
        .with_node("t", table(&["Ward", "Budget"], rows))
        .build();
    let html = preview(&article, "en");
    assert::appears_before(&html, "<th>Ward</th>", "<th>Budget</th>");
    assert::appears_before(&html, "<td>10</td>", "<td>2</td>");
}

fn banner(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let lang = ctx.lang();
    format!("<div class=\"banner\" lang=\"{lang}\">{}</div>", node.id)
}

#[test]
fn custom_types_render_once_registered() {
    let banner_node = json!({ "type": "banner" });
    let article = test_article()
        .with_node("b", serde_json::from_value(banner_node).unwrap())
        .build();

    let mut registry = NodeRegistry::with_standard_types();
    assert::not_contains(
        &render_article(&article, &registry, RenderOptions::preview("en")),
        "banner",
    );

    registry.register(NodeTypeDefinition {
        type_name: "banner".to_string(),
        label: "Banner".to_string(),
        editor: banner,
        preview: banner,
    });
    assert::contains(
        &render_article(&article, &registry, RenderOptions::preview("ne")),
        "<div class=\"banner\" lang=\"ne\">b</div>",
    );
}
