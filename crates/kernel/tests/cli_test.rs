#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Command handlers driven end to end through JSON files.

use std::fs;
use std::path::Path;

use palika_kernel::cli::{self, Command};
use palika_kernel::config::Config;
use palika_kernel::content::{IntegrityPolicy, RenderMode};
use palika_sdk::Article;
use serde_json::json;

fn run(command: Command, config: &Config) -> (bool, String) {
    let mut out = Vec::new();
    let clean = cli::run(command, config, &mut out).unwrap();
    (clean, String::from_utf8(out).unwrap())
}

fn write_json(path: &Path, value: &serde_json::Value) {
    fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}

fn new_article_file(dir: &Path, config: &Config) -> std::path::PathBuf {
    let path = dir.join("article.json");
    run(
        Command::New {
            out: Some(path.clone()),
            title: Some("Ward notice".to_string()),
        },
        config,
    );
    path
}

#[test]
fn new_writes_article_to_stdout() {
    let (clean, out) = run(
        Command::New {
            out: None,
            title: None,
        },
        &Config::default(),
    );
    assert!(clean);
    let article: Article = serde_json::from_str(&out).unwrap();
    assert!(article.structure.is_empty());
}

#[test]
fn apply_then_render_and_check() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();
    let article_path = new_article_file(dir.path(), &config);

    let actions_path = dir.path().join("actions.json");
    write_json(
        &actions_path,
        &json!([
            { "action": "addNode", "node": {
                "type": "heading", "level": 1,
                "content": {
                    "fallbackContent": "",
                    "content": { "en": "Title", "ne": "शीर्षक" }
                }
            } },
            { "action": "addNode", "node": {
                "type": "paragraph",
                "content": { "fallbackContent": "Body", "content": {} }
            } }
        ]),
    );
    let (clean, _) = run(
        Command::Apply {
            article: article_path.clone(),
            actions: actions_path,
            out: None,
        },
        &config,
    );
    assert!(clean);

    let saved = cli::read_article(&article_path).unwrap();
    assert_eq!(saved.structure.len(), 2);
    assert_eq!(saved.metadata.title.resolve("en"), "Ward notice");

    let (_, html) = run(
        Command::Render {
            article: article_path.clone(),
            mode: RenderMode::Preview,
            lang: Some("ne".to_string()),
        },
        &config,
    );
    assert!(html.contains(">शीर्षक</h1>"), "{html}");
    assert!(html.contains("<p>Body</p>"), "{html}");

    let (clean, report) = run(
        Command::Check {
            article: article_path,
        },
        &config,
    );
    assert!(clean);
    let report: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(report["danglingChildren"], json!([]));
}

#[test]
fn failed_batch_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::default();
    let article_path = new_article_file(dir.path(), &config);
    let before = fs::read_to_string(&article_path).unwrap();

    let actions_path = dir.path().join("actions.json");
    write_json(
        &actions_path,
        &json!([
            { "action": "addNode", "node": { "type": "paragraph" } },
            { "action": "removeNode", "id": "missing" }
        ]),
    );
    let mut out = Vec::new();
    let err = cli::run(
        Command::Apply {
            article: article_path.clone(),
            actions: actions_path,
            out: None,
        },
        &config,
        &mut out,
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("not_found"), "{err:#}");
    assert_eq!(fs::read_to_string(&article_path).unwrap(), before);
}

#[test]
fn strict_apply_refuses_dangling_references_but_permissive_saves() {
    let dir = tempfile::tempdir().unwrap();
    let strict = Config::default();
    let article_path = new_article_file(dir.path(), &strict);

    let mut article = cli::read_article(&article_path).unwrap();
    article.structure = serde_json::from_value(json!({
        "order": ["s", "p"],
        "nodes": [
            { "id": "s", "type": "section", "nodes": ["p"] },
            { "id": "p", "type": "paragraph" }
        ]
    }))
    .unwrap();
    fs::write(&article_path, serde_json::to_string(&article).unwrap()).unwrap();

    let actions_path = dir.path().join("actions.json");
    let actions = json!([{ "action": "removeNode", "id": "p" }]);
    write_json(&actions_path, &actions);

    let out_path = dir.path().join("out.json");
    let mut sink = Vec::new();
    let err = cli::run(
        Command::Apply {
            article: article_path.clone(),
            actions: actions_path.clone(),
            out: Some(out_path.clone()),
        },
        &strict,
        &mut sink,
    )
    .unwrap_err();
    assert!(err.to_string().contains("integrity"), "{err}");
    assert!(!out_path.exists());

    let permissive = Config {
        integrity: IntegrityPolicy::Permissive,
        ..Config::default()
    };
    run(
        Command::Apply {
            article: article_path,
            actions: actions_path,
            out: Some(out_path.clone()),
        },
        &permissive,
    );
    let (clean, report) = run(Command::Check { article: out_path }, &permissive);
    assert!(!clean);
    let report: serde_json::Value = serde_json::from_str(&report).unwrap();
    assert_eq!(
        report["danglingChildren"],
        json!([{ "section": "s", "child": "p" }])
    );
}
