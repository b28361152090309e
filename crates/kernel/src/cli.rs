//! Command-line front end for the headless editor.
//!
//! Articles and action scripts are JSON files. Each command handler is a
//! plain function so it can be driven from tests without a process.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use palika_sdk::{Article, MultilingualContent};
use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::content::{
    ContentStore, IntegrityPolicy, IntegrityReport, MetadataPatch, NodeRegistry, RenderMode,
    RenderOptions, StoreAction, StoreOptions, render_article,
};

#[derive(Debug, Parser)]
#[command(name = "palika")]
#[command(about = "Headless article editor for the municipal portal", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Write a fresh, empty article
    New {
        /// Output file (default: stdout)
        #[arg(long)]
        out: Option<PathBuf>,
        /// Title in the default language
        #[arg(long)]
        title: Option<String>,
    },
    /// Apply a JSON list of actions to an article, all or nothing
    Apply {
        /// Article JSON file
        #[arg(long)]
        article: PathBuf,
        /// Actions JSON file
        #[arg(long)]
        actions: PathBuf,
        /// Output file (default: overwrite the article)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render an article to HTML on stdout
    Render {
        /// Article JSON file
        #[arg(long)]
        article: PathBuf,
        /// "preview" or "editor"
        #[arg(long, default_value = "preview")]
        mode: RenderMode,
        /// Language (default: the article's default language)
        #[arg(long)]
        lang: Option<String>,
    },
    /// Print the integrity report; exits non-zero if problems are found
    Check {
        /// Article JSON file
        #[arg(long)]
        article: PathBuf,
    },
    /// List registered node types
    Types,
}

/// Run a command. Returns `false` when `check` found problems.
pub fn run(command: Command, config: &Config, stdout: &mut impl Write) -> Result<bool> {
    match command {
        Command::New { out, title } => {
            let article = new_article(config, title.as_deref());
            write_json(&article, out.as_deref(), stdout)?;
        }
        Command::Apply {
            article,
            actions,
            out,
        } => {
            let doc = read_article(&article)?;
            let actions = read_actions(&actions)?;
            let updated = apply_actions(config, doc, actions)?;
            let target = out.unwrap_or(article);
            write_json(&updated, Some(target.as_path()), stdout)?;
        }
        Command::Render {
            article,
            mode,
            lang,
        } => {
            let doc = read_article(&article)?;
            let html = render(&doc, mode, lang.as_deref());
            writeln!(stdout, "{html}")?;
        }
        Command::Check { article } => {
            let doc = read_article(&article)?;
            let report = check(&doc);
            write_json(&report, None, stdout)?;
            return Ok(report.is_clean());
        }
        Command::Types => {
            for name in NodeRegistry::with_standard_types().type_names() {
                writeln!(stdout, "{name}")?;
            }
        }
    }
    Ok(true)
}

/// A fresh article using the configured defaults.
pub fn new_article(config: &Config, title: Option<&str>) -> Article {
    let mut store = ContentStore::new(StoreOptions::from(config));
    if let Some(title) = title {
        store.update_metadata(MetadataPatch {
            title: Some(MultilingualContent::new().with(config.default_language.clone(), title)),
            ..MetadataPatch::default()
        });
    }
    store.into_article()
}

/// Apply `actions` as one batch.
///
/// Under the strict policy the result must also pass the integrity check.
pub fn apply_actions(
    config: &Config,
    article: Article,
    actions: Vec<StoreAction>,
) -> Result<Article> {
    let mut store = ContentStore::from_article(article, StoreOptions::from(config));
    let count = actions.len();
    store.apply_batch(actions).map_err(|e| {
        let code = e.source.code();
        anyhow::Error::new(e).context(format!("actions rejected ({code}); article unchanged"))
    })?;

    if store.policy() == IntegrityPolicy::Strict {
        let report = store.check_integrity();
        if !report.is_clean() {
            warn!(
                issues = report.issue_count(),
                "refusing to save inconsistent article"
            );
            bail!(
                "article has {} integrity issue(s) after applying actions; run `palika check`",
                report.issue_count()
            );
        }
    }

    info!(
        actions = count,
        revision = store.revision(),
        "actions applied"
    );
    Ok(store.into_article())
}

/// Render with the standard node types.
pub fn render(article: &Article, mode: RenderMode, lang: Option<&str>) -> String {
    let registry = NodeRegistry::with_standard_types();
    let lang = lang.unwrap_or(&article.settings.default_language);
    let options = RenderOptions {
        mode,
        lang,
        active: None,
    };
    render_article(article, &registry, options)
}

pub fn check(article: &Article) -> IntegrityReport {
    crate::content::check_integrity(&article.structure)
}

pub fn read_article(path: &Path) -> Result<Article> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read article {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid article JSON in {}", path.display()))
}

pub fn read_actions(path: &Path) -> Result<Vec<StoreAction>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read actions {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("invalid actions JSON in {}", path.display()))
}

fn write_json<T: Serialize>(value: &T, path: Option<&Path>, stdout: &mut impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    match path {
        Some(path) => fs::write(path, format!("{json}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => writeln!(stdout, "{json}")?,
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_render_mode() {
        let args = ["palika", "render", "--article", "a", "--mode", "editor"];
        let cli = Cli::try_parse_from(args).unwrap();
        let Command::Render { mode, lang, .. } = cli.command else {
            panic!("expected render");
        };
        assert_eq!(mode, RenderMode::Editor);
        assert_eq!(lang, None);
    }

    #[test]
    fn new_article_sets_title_in_default_language() {
        let config = Config {
            default_language: "ne".to_string(),
            ..Config::default()
        };
        let article = new_article(&config, Some("वडा सूचना"));
        assert_eq!(article.metadata.title.get("ne"), Some("वडा सूचना"));
        assert_eq!(article.settings.default_language, "ne");
        assert!(article.structure.is_empty());
    }

    #[test]
    fn types_lists_standard_node_types() {
        let mut out = Vec::new();
        assert!(run(Command::Types, &Config::default(), &mut out).unwrap());
        let listed = String::from_utf8(out).unwrap();
        assert_eq!(listed.lines().count(), 13);
        assert!(listed.lines().any(|l| l == "section"));
    }
}
