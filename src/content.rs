//! Loading content files: module statements, metadata, and body.
//!
//! An MDX file is markdown plus a few JavaScript-flavoured module lines:
//!
//! ```text
//! import Chart from "../components/chart"     ← module statement (dropped)
//!
//! export const meta = {                       ← metadata (parsed)
//!   title: "Setting up",
//!   tags: ["intro", "tooling"],
//! };
//!
//! # Setting up                                ← body (rendered)
//! ```
//!
//! Metadata is accepted in three forms, first match wins:
//!
//! 1. YAML front matter between `---` lines
//! 2. TOML front matter between `+++` lines
//! 3. An `export const meta = { ... }` statement
//!
//! The `meta` object literal is read leniently: bare or quoted keys; string,
//! number, boolean and array values; trailing commas. Anything else (a
//! function call, say) is kept as its source text.
//!
//! ## Title Resolution
//!
//! `meta.title` → first `# heading` in the body → last route segment with
//! dashes turned into spaces.

use crate::resolve::{Route, RouteSegments};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid front matter in {path}: {message}")]
    FrontMatter { path: PathBuf, message: String },
}

/// Metadata attached to a content file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub draft: bool,
    /// Every other field, preserved for templates and the route manifest.
    #[serde(default, flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// A content file loaded from disk and ready to render.
#[derive(Debug, Clone)]
pub struct ContentFile {
    pub route: RouteSegments,
    pub source: PathBuf,
    pub meta: PageMeta,
    /// Resolved display title (see module docs).
    pub title: String,
    /// Markdown body with front matter and module statements removed.
    pub body: String,
}

impl ContentFile {
    /// Read and parse the file behind a resolved route.
    pub fn load(route: Route) -> Result<Self, ContentError> {
        let text = fs::read_to_string(&route.source).map_err(|source| ContentError::Io {
            path: route.source.clone(),
            source,
        })?;
        Self::parse(route.segments, route.source, &text)
    }

    /// Parse file text that has already been read.
    pub fn parse(route: RouteSegments, source: PathBuf, text: &str) -> Result<Self, ContentError> {
        let (front_matter, rest) = match split_front_matter(text) {
            Some((fm, body)) => (Some(fm), body),
            None => (None, text),
        };

        let module = split_module_statements(rest);

        let meta = match front_matter {
            Some(FrontMatter::Yaml(raw)) => parse_yaml_meta(raw, &source)?,
            Some(FrontMatter::Toml(raw)) => parse_toml_meta(raw, &source)?,
            None => match module.meta_literal.as_deref() {
                Some(literal) => parse_meta_literal(literal, &source)?,
                None => PageMeta::default(),
            },
        };

        let title = meta
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| first_heading(&module.body))
            .unwrap_or_else(|| route.name().replace('-', " "));

        Ok(Self {
            route,
            source,
            meta,
            title,
            body: module.body,
        })
    }

    /// Route key (`intro/setup`), the URL suffix of this page.
    pub fn base_path(&self) -> String {
        self.route.key()
    }
}

// ============================================================================
// Front matter
// ============================================================================

#[derive(Debug, PartialEq)]
enum FrontMatter<'a> {
    Yaml(&'a str),
    Toml(&'a str),
}

/// Detect `---`/`+++` front matter at the top of the file.
///
/// Returns the raw front matter and the remaining text.
fn split_front_matter(text: &str) -> Option<(FrontMatter<'_>, &str)> {
    let trimmed = text.trim_start_matches(['\u{feff}', '\n', '\r']);
    for (fence, yaml) in [("---", true), ("+++", false)] {
        let Some(after_open) = trimmed.strip_prefix(fence) else {
            continue;
        };
        // The opening fence must be alone on its line.
        let Some(after_open) = after_open
            .strip_prefix("\r\n")
            .or_else(|| after_open.strip_prefix('\n'))
        else {
            continue;
        };
        let close = format!("\n{fence}");
        let (raw, rest) = if after_open.starts_with(fence) {
            ("", &after_open[fence.len()..])
        } else {
            let end = after_open.find(&close)?;
            (&after_open[..end], &after_open[end + close.len()..])
        };
        let rest = rest.trim_start_matches(['\r', '\n']);
        let fm = if yaml {
            FrontMatter::Yaml(raw)
        } else {
            FrontMatter::Toml(raw)
        };
        return Some((fm, rest));
    }
    None
}

fn parse_yaml_meta(raw: &str, path: &Path) -> Result<PageMeta, ContentError> {
    if raw.trim().is_empty() {
        return Ok(PageMeta::default());
    }
    serde_yaml::from_str(raw).map_err(|e| ContentError::FrontMatter {
        path: path.to_path_buf(),
        message: format!("Invalid YAML: {e}"),
    })
}

fn parse_toml_meta(raw: &str, path: &Path) -> Result<PageMeta, ContentError> {
    let err = |message: String| ContentError::FrontMatter {
        path: path.to_path_buf(),
        message,
    };
    let value: toml::Value = toml::from_str(raw).map_err(|e| err(format!("Invalid TOML: {e}")))?;
    serde_json::from_value(toml_to_json(value)).map_err(|e| err(e.to_string()))
}

/// Convert TOML into JSON, rendering datetimes as their TOML text.
fn toml_to_json(value: toml::Value) -> serde_json::Value {
    use serde_json::Value as Json;
    match value {
        toml::Value::String(s) => Json::String(s),
        toml::Value::Integer(i) => Json::from(i),
        toml::Value::Float(f) => Json::from(f),
        toml::Value::Boolean(b) => Json::Bool(b),
        toml::Value::Datetime(d) => Json::String(d.to_string()),
        toml::Value::Array(items) => Json::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Json::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

// ============================================================================
// Module statements
// ============================================================================

static MODULE_STATEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(import|export)\s").expect("static regex"));
static META_EXPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^export\s+const\s+meta\s*=\s*").expect("static regex"));

#[derive(Debug, Default)]
struct ModuleSplit {
    body: String,
    /// Source of the `{ ... }` literal from `export const meta = ...`.
    meta_literal: Option<String>,
}

/// Remove top-level `import`/`export` statements from an MDX body.
///
/// A statement continues onto following lines while its brackets are open.
/// Lines inside fenced code blocks are never treated as statements.
fn split_module_statements(text: &str) -> ModuleSplit {
    let mut split = ModuleSplit::default();
    let mut fence: Option<String> = None;
    let mut statement: Option<String> = None;
    let mut depth: i32 = 0;

    for line in text.lines() {
        if let Some(stmt) = statement.as_mut() {
            stmt.push('\n');
            stmt.push_str(line);
            depth += bracket_delta(line);
            if depth <= 0 {
                finish_statement(&mut split, statement.take().unwrap_or_default());
                depth = 0;
            }
            continue;
        }

        if let Some(open) = &fence {
            if is_fence_close(line, open) {
                fence = None;
            }
        } else if let Some(open) = fence_marker(line) {
            fence = Some(open);
        } else if MODULE_STATEMENT.is_match(line) {
            depth = bracket_delta(line);
            if depth > 0 {
                statement = Some(line.to_string());
            } else {
                finish_statement(&mut split, line.to_string());
                depth = 0;
            }
            continue;
        }

        split.body.push_str(line);
        split.body.push('\n');
    }

    // Unterminated statement at end of file: keep what we have.
    if let Some(stmt) = statement {
        finish_statement(&mut split, stmt);
    }

    let leading = split.body.len() - split.body.trim_start_matches('\n').len();
    split.body.drain(..leading);
    split
}

fn finish_statement(split: &mut ModuleSplit, statement: String) {
    if split.meta_literal.is_some() {
        return;
    }
    if let Some(m) = META_EXPORT.find(&statement) {
        let literal = statement[m.end()..].trim().trim_end_matches(';').trim_end();
        split.meta_literal = Some(literal.to_string());
    }
}

/// Net change in open `{`, `[`, `(` on a line, ignoring quoted text.
fn bracket_delta(line: &str) -> i32 {
    let mut delta = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for c in line.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' | '[' | '(' => delta += 1,
            '}' | ']' | ')' => delta -= 1,
            _ => {}
        }
    }
    delta
}

/// Opening code fence marker (three or more backticks or tildes), if any.
pub(crate) fn fence_marker(line: &str) -> Option<String> {
    let trimmed = line.trim_start();
    if line.len() - trimmed.len() > 3 {
        return None;
    }
    let first = trimmed.chars().next()?;
    if first != '`' && first != '~' {
        return None;
    }
    let run: String = trimmed.chars().take_while(|&c| c == first).collect();
    (run.len() >= 3).then_some(run)
}

pub(crate) fn is_fence_close(line: &str, open: &str) -> bool {
    let trimmed = line.trim();
    let marker = open.chars().next().unwrap_or('`');
    trimmed.len() >= open.len() && trimmed.chars().all(|c| c == marker)
}

/// First `# heading` outside fenced code.
fn first_heading(body: &str) -> Option<String> {
    let mut fence: Option<String> = None;
    for line in body.lines() {
        if let Some(open) = &fence {
            if is_fence_close(line, open) {
                fence = None;
            }
            continue;
        }
        if let Some(open) = fence_marker(line) {
            fence = Some(open);
            continue;
        }
        if let Some(heading) = line.strip_prefix("# ") {
            let heading = heading.trim();
            if !heading.is_empty() {
                return Some(heading.to_string());
            }
        }
    }
    None
}

// ============================================================================
// `export const meta = { ... }` literal
// ============================================================================

fn parse_meta_literal(literal: &str, path: &Path) -> Result<PageMeta, ContentError> {
    let err = |message: String| ContentError::FrontMatter {
        path: path.to_path_buf(),
        message,
    };
    let inner = literal
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .ok_or_else(|| err("`export const meta` must be an object literal".into()))?;

    let mut object = serde_json::Map::new();
    for entry in split_top_level(inner, ',') {
        let entry = entry.trim();
        if entry.is_empty() || entry.starts_with("//") {
            continue;
        }
        let Some((key, value)) = split_key_value(entry) else {
            return Err(err(format!("expected `key: value`, found {entry:?}")));
        };
        object.insert(unquote(key.trim()).to_string(), literal_value(value.trim()));
    }

    serde_json::from_value(serde_json::Value::Object(object)).map_err(|e| err(e.to_string()))
}

/// Split on `sep` where it is not nested in brackets or quotes.
fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' | '`' => quote = Some(c),
            '{' | '[' | '(' => depth += 1,
            '}' | ']' | ')' => depth -= 1,
            c if c == sep && depth == 0 => {
                parts.push(&text[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}

fn split_key_value(entry: &str) -> Option<(&str, &str)> {
    let parts = split_top_level(entry, ':');
    let key = parts.first()?;
    if parts.len() < 2 {
        return None;
    }
    Some((key, &entry[key.len() + 1..]))
}

fn unquote(s: &str) -> &str {
    for q in ['"', '\'', '`'] {
        if s.len() >= 2 && s.starts_with(q) && s.ends_with(q) {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn literal_value(raw: &str) -> serde_json::Value {
    use serde_json::Value as Json;
    match raw {
        "true" => return Json::Bool(true),
        "false" => return Json::Bool(false),
        "null" | "undefined" => return Json::Null,
        _ => {}
    }
    if let Some(items) = raw.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        return Json::Array(
            split_top_level(items, ',')
                .into_iter()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(literal_value)
                .collect(),
        );
    }
    let unquoted = unquote(raw);
    if unquoted.len() != raw.len() {
        return Json::String(unescape(unquoted));
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Json::from(n);
    }
    if let Ok(f) = raw.parse::<f64>() {
        return Json::from(f);
    }
    Json::String(raw.to_string())
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
