//! Site configuration module.
//!
//! Handles loading, validating, and merging the project's `config.toml`.
//! Stock defaults are the base layer; the user file overrides only the keys it
//! names.
//!
//! ## Config File Location
//!
//! ```text
//! my-site/
//! ├── config.toml              # Optional, overrides stock defaults
//! └── content/
//!     └── tutorials/           # Content root (configurable)
//!         ├── basics.mdx
//!         └── intro/
//!             └── setup.mdx
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_root = "content/tutorials"  # Relative to the project directory
//! extension = "mdx"                   # Content file extension (no dot)
//! route_prefix = "blog"               # URL prefix for every post
//! static_dir = "tutorial_files"       # Where linked files are copied
//! include_drafts = false              # Render pages marked `draft: true`
//!
//! [site]
//! title = "Tutorials"
//! max_width = "1100px"                # Layout container width
//!
//! [code]
//! default_language = "js"             # Used when a fence has no language
//! padding = "20px"
//! background = "#011627"
//! foreground = "#d6deeb"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
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

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. User config files need only specify the values
/// they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Content root, relative to the project directory.
    pub content_root: String,
    /// Extension (without the dot) that marks a file as content.
    pub extension: String,
    /// First URL segment for every post: `/{route_prefix}/{route}`.
    pub route_prefix: String,
    /// Output subdirectory receiving files linked from content.
    pub static_dir: String,
    /// Whether pages with `draft: true` are rendered.
    pub include_drafts: bool,
    /// Site-wide presentation settings.
    pub site: SiteSection,
    /// Code block appearance.
    pub code: CodeConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_root: "content/tutorials".to_string(),
            extension: "mdx".to_string(),
            route_prefix: "blog".to_string(),
            static_dir: "tutorial_files".to_string(),
            include_drafts: false,
            site: SiteSection::default(),
            code: CodeConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content_root.trim().is_empty() {
            return Err(ConfigError::Validation(
                "content_root must not be empty".into(),
            ));
        }
        if self.extension.is_empty() || self.extension.contains(['.', '/', '\\']) {
            return Err(ConfigError::Validation(
                "extension must be a bare extension such as \"mdx\"".into(),
            ));
        }
        for (key, value) in [
            ("route_prefix", &self.route_prefix),
            ("static_dir", &self.static_dir),
        ] {
            if !is_url_segment(value) {
                return Err(ConfigError::Validation(format!(
                    "{key} must be a single non-empty path segment, got {value:?}"
                )));
            }
        }
        if self.route_prefix == self.static_dir {
            return Err(ConfigError::Validation(
                "route_prefix and static_dir must differ".into(),
            ));
        }
        Ok(())
    }

    /// Absolute (or cwd-relative) content root for a project directory.
    pub fn content_root_in(&self, project: &Path) -> PathBuf {
        project.join(&self.content_root)
    }
}

fn is_url_segment(value: &str) -> bool {
    !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '?', '#', ' '])
}

/// Site-wide presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    /// Title of the index page and suffix of every page `<title>`.
    pub title: String,
    /// CSS `max-width` of the layout container.
    pub max_width: String,
}

impl Default for SiteSection {
    fn default() -> Self {
        Self {
            title: "Tutorials".to_string(),
            max_width: "1100px".to_string(),
        }
    }
}

/// Code block appearance. Defaults follow the Night Owl palette.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CodeConfig {
    /// Language assumed for fences without an info string.
    pub default_language: String,
    /// CSS padding inside the `<pre>`.
    pub padding: String,
    /// Background color.
    pub background: String,
    /// Plain text color.
    pub foreground: String,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            default_language: "js".to_string(),
            padding: "20px".to_string(),
            background: "#011627".to_string(),
            foreground: "#d6deeb".to_string(),
        }
    }
}

impl CodeConfig {
    /// Inline style applied to every rendered `<pre>`.
    pub fn pre_style(&self) -> String {
        format!(
            "color: {}; background-color: {}; padding: {};",
            self.foreground, self.background, self.padding
        )
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(SiteConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from the project directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(project: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = project.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Load config for a project directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(project: &Path) -> Result<SiteConfig, ConfigError> {
    let merged = match load_raw_config(project)? {
        Some(overlay) => merge_toml(stock_defaults_value(), overlay),
        None => stock_defaults_value(),
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    tracing::debug!(content_root = %config.content_root, "loaded site config");
    Ok(config)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Tutorial Press Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Directory holding the content files, relative to the project directory.
content_root = "content/tutorials"

# Extension (without the dot) of content files.
extension = "mdx"

# Every post is published at /<route_prefix>/<dir>/<dir>/<name>/.
route_prefix = "blog"

# Files linked from content (images, downloads) are copied here.
static_dir = "tutorial_files"

# Render pages whose front matter says `draft: true`.
include_drafts = false

# ---------------------------------------------------------------------------
# Site
# ---------------------------------------------------------------------------
[site]
title = "Tutorials"

# CSS max-width of the centered layout container.
max_width = "1100px"

# ---------------------------------------------------------------------------
# Code blocks
# ---------------------------------------------------------------------------
[code]
# Language class used when a fence has no info string.
default_language = "js"
padding = "20px"
background = "#011627"
foreground = "#d6deeb"
"##
}
