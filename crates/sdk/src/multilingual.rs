//! Multilingual text values.
//!
//! Every user-facing string in an article is a [`MultilingualContent`]: a
//! fallback plus per-language variants keyed by language code.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// English language code.
pub const ENGLISH: &str = "en";

/// Nepali language code.
pub const NEPALI: &str = "ne";

/// A text value with a fallback and per-language variants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultilingualContent {
    /// Text used when the requested language has no variant.
    #[serde(default)]
    pub fallback_content: String,

    /// Language code to text.
    #[serde(default)]
    pub content: BTreeMap<String, String>,
}

impl MultilingualContent {
    /// Create an empty value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a value carrying only a fallback.
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            fallback_content: text.into(),
            content: BTreeMap::new(),
        }
    }

    /// Create a value with English and Nepali variants and an empty fallback.
    pub fn en_ne(en: impl Into<String>, ne: impl Into<String>) -> Self {
        Self::new().with(ENGLISH, en).with(NEPALI, ne)
    }

    /// Set the variant for a language, consuming and returning self.
    pub fn with(mut self, lang: impl Into<String>, text: impl Into<String>) -> Self {
        self.set(lang, text);
        self
    }

    /// Set the variant for a language.
    pub fn set(&mut self, lang: impl Into<String>, text: impl Into<String>) {
        self.content.insert(lang.into(), text.into());
    }

    /// Get the raw variant for a language, if present.
    pub fn get(&self, lang: &str) -> Option<&str> {
        self.content.get(lang).map(String::as_str)
    }

    /// Resolve the text to show for `lang`.
    ///
    /// Order: non-empty variant for `lang`, non-empty fallback, first
    /// non-empty variant by language code, empty string.
    pub fn resolve(&self, lang: &str) -> &str {
        if let Some(text) = self.get(lang).filter(|t| !t.is_empty()) {
            return text;
        }
        if !self.fallback_content.is_empty() {
            return &self.fallback_content;
        }
        self.content
            .values()
            .find(|t| !t.is_empty())
            .map(String::as_str)
            .unwrap_or("")
    }

    /// True when neither the fallback nor any variant has text.
    pub fn is_blank(&self) -> bool {
        self.fallback_content.trim().is_empty()
            && self.content.values().all(|t| t.trim().is_empty())
    }

    /// Language codes that carry a non-empty variant.
    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.content
            .iter()
            .filter(|(_, text)| !text.is_empty())
            .map(|(lang, _)| lang.as_str())
    }
}
