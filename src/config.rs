//! Site configuration module.
//!
//! Handles loading and validating the optional `config.toml` at the content
//! root. Configuration supplies what the filesystem cannot: the site title,
//! the default author substituted when front-matter omits one, and
//! human-readable labels for category slugs.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! title = "Blog"
//! base_url = "/"
//!
//! [author]
//! name = ""                 # Default author for articles without one
//!
//! # Category labels. The key is the directory name (lowercase).
//! [categories.tech]
//! display_name = "Tech"
//! title = "Tech Notes"
//! description = "Engineering write-ups"
//! ```
//!
//! ## Category label lookup
//!
//! [`SiteConfig::category_entry`] matches case-insensitively and tolerates
//! singular/plural mismatches (a lookup for `essays` finds the `essay`
//! entry). When no entry exists, [`SiteConfig::category_label`] falls back
//! to the capitalized raw slug, so unconfigured categories still render.
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

const CONFIG_FILENAME: &str = "config.toml";

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Site title, used in page titles and the header.
    pub title: String,
    /// Base URL prefix for generated links.
    pub base_url: String,
    /// Default author applied when front-matter omits one.
    pub author: AuthorConfig,
    /// Category slug → human-readable labels.
    pub categories: BTreeMap<String, CategoryConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthorConfig {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CategoryConfig {
    /// Short label used in navigation and on article cards.
    pub display_name: String,
    /// Page title for the category's listing page.
    pub title: String,
    /// Blurb shown under the category page title.
    pub description: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            title: "Blog".to_string(),
            base_url: "/".to_string(),
            author: AuthorConfig::default(),
            categories: BTreeMap::new(),
        }
    }
}

impl SiteConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with('/') && !self.base_url.starts_with("http") {
            return Err(ConfigError::Validation(
                "base_url must start with `/` or be an absolute URL".into(),
            ));
        }
        for key in self.categories.keys() {
            if key.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(ConfigError::Validation(format!(
                    "category key `{key}` must be lowercase (keys name directories, which are case-folded)"
                )));
            }
        }
        Ok(())
    }

    /// Find the configured entry for a category slug.
    ///
    /// Matching is case-insensitive and singular/plural tolerant: a trailing
    /// `s` on either the key or the query is ignored.
    pub fn category_entry(&self, slug: &str) -> Option<&CategoryConfig> {
        let query = slug.to_ascii_lowercase();
        if let Some(entry) = self.categories.get(&query) {
            return Some(entry);
        }
        self.categories
            .iter()
            .find(|(key, _)| strip_plural(key) == strip_plural(&query))
            .map(|(_, entry)| entry)
    }

    /// Display label for a category slug, falling back to the capitalized
    /// raw slug when unconfigured.
    pub fn category_label(&self, slug: &str) -> String {
        match self.category_entry(slug) {
            Some(entry) if !entry.display_name.is_empty() => entry.display_name.clone(),
            _ => capitalize(slug),
        }
    }
}

fn strip_plural(s: &str) -> &str {
    s.strip_suffix('s').unwrap_or(s)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Load the site config from `<root>/config.toml`, or defaults if absent.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let path = root.join(CONFIG_FILENAME);
    if !path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// A documented stock config, printed by the `gen-config` command.
pub fn stock_config_toml() -> String {
    r#"# glasspress site configuration
# All options are optional; defaults shown.

# Site title, used in page titles and the header.
title = "Blog"

# Base URL prefix for generated links.
base_url = "/"

[author]
# Default author for articles whose front-matter omits one.
name = ""

# Category labels. The key is the content directory name (lowercase).
# Unconfigured categories fall back to the capitalized directory name.
#
# [categories.tech]
# display_name = "Tech"
# title = "Tech Notes"
# description = "Engineering write-ups"
#
# [categories.essay]
# display_name = "Essays"
# title = "Essays"
# description = "Short, untitled thoughts on a timeline"
"#
    .to_string()
}
