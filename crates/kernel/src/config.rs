//! Configuration loaded from environment variables.

use std::env;

use anyhow::{Context, Result, bail};
use palika_sdk::{ArticleSettings, Theme};

use crate::content::{IntegrityPolicy, StoreOptions};

/// Editor configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Language new articles default to (default: en).
    pub default_language: String,

    /// Languages offered by the editor (comma-separated, default: "en,ne").
    pub languages: Vec<String>,

    /// How strictly structural references are enforced (default: strict).
    pub integrity: IntegrityPolicy,

    /// Theme for new articles: "light", "dark", or "system" (default: light).
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_language: palika_sdk::ENGLISH.to_string(),
            languages: vec![
                palika_sdk::ENGLISH.to_string(),
                palika_sdk::NEPALI.to_string(),
            ],
            integrity: IntegrityPolicy::default(),
            theme: Theme::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let default_language = lookup("PALIKA_DEFAULT_LANGUAGE")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| palika_sdk::ENGLISH.to_string());

        let languages: Vec<String> = lookup("PALIKA_LANGUAGES")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| {
                vec![
                    palika_sdk::ENGLISH.to_string(),
                    palika_sdk::NEPALI.to_string(),
                ]
            });
        if !languages.contains(&default_language) {
            bail!(
                "PALIKA_LANGUAGES ({}) must include PALIKA_DEFAULT_LANGUAGE ({default_language})",
                languages.join(",")
            );
        }

        let integrity = lookup("PALIKA_INTEGRITY")
            .unwrap_or_else(|| "strict".to_string())
            .parse::<IntegrityPolicy>()
            .map_err(anyhow::Error::msg)
            .context("PALIKA_INTEGRITY must be \"strict\" or \"permissive\"")?;

        let theme = match lookup("PALIKA_THEME")
            .unwrap_or_else(|| "light".to_string())
            .trim()
            .to_lowercase()
            .as_str()
        {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            "system" => Theme::System,
            other => bail!(
                "PALIKA_THEME must be \"light\", \"dark\", or \"system\", got {other:?}"
            ),
        };

        Ok(Self {
            default_language,
            languages,
            integrity,
            theme,
        })
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        StoreOptions {
            policy: config.integrity,
            default_settings: ArticleSettings {
                default_language: config.default_language.clone(),
                theme: config.theme,
                ..ArticleSettings::default()
            },
            languages: config.languages.clone(),
        }
    }
}
